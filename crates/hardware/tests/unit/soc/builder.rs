//! # System Assembly Tests
//!
//! End-to-end builds from a `Config`: component counts, workload binding,
//! parameter propagation, fatal errors and the serialized description.

use memhier_core::common::constants::GIB;
use memhier_core::common::{AddrRange, BuildError, Capacity, Frequency, ParamField};
use memhier_core::config::{Config, CpuType, L2Sharing, MemMode};
use memhier_core::params::ComponentClass;
use memhier_core::params::defaults::MEM_SIZE;
use memhier_core::sim::{EngineError, Simulation};
use memhier_core::soc::{ComponentId, SystemAssembler};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;

use crate::common::harness::{assemble, config, init_tracing, workload_for};
use crate::common::mocks::engine::MockEngine;

fn assemble_err(config: Config) -> BuildError {
    init_tracing();
    SystemAssembler::new(config).assemble().unwrap_err()
}

// ══════════════════════════════════════════════════════════
// 1. Reference builds
// ══════════════════════════════════════════════════════════

#[test]
fn test_single_cpu_build() {
    let (system, root) = assemble(config(1, "/bin/ls"));

    assert_eq!(system.num_cpus(), 1);
    assert_eq!(system.components().len(), 8);
    assert_eq!(system.connections().len(), 10);
    assert_eq!(system.count(ComponentClass::System), 1);
    assert_eq!(system.mem_ranges(), vec![AddrRange::with_size(MEM_SIZE)]);
    assert_eq!(system.mem_mode(), MemMode::Timing);
    assert!(!root.full_system());
    assert!(root.matches(&system));

    let process = system.process(0).unwrap();
    assert_eq!(process.pid(), 100);
    assert_eq!(process.argv(), ["/bin/ls"]);
}

#[test]
fn test_dual_cpu_build_binds_one_process_per_core() {
    let (system, _) = assemble(config(2, "/bin/ls;/bin/echo hi"));

    assert_eq!(system.num_cpus(), 2);
    assert_eq!(system.processes().len(), 2);
    assert_eq!(system.process(0).unwrap().executable().to_str(), Some("/bin/ls"));
    let echo = system.process(1).unwrap();
    assert_eq!(echo.pid(), 101);
    assert_eq!(echo.executable().to_str(), Some("/bin/echo"));
    assert_eq!(echo.args(), ["hi"]);
    assert_eq!(system.connections().len(), 18);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
#[case(8)]
fn test_private_hierarchy_scales_per_core(#[case] cpus: usize) {
    let (system, _) = assemble(config(cpus, &workload_for(cpus)));

    for class in [
        ComponentClass::Cpu,
        ComponentClass::L1InstructionCache,
        ComponentClass::L1DataCache,
        ComponentClass::L2Cache,
        ComponentClass::InterruptController,
    ] {
        assert_eq!(system.count(class), cpus, "{class}");
    }
    assert_eq!(system.count(ComponentClass::InterconnectBus), 1);
    assert_eq!(system.count(ComponentClass::MemoryController), 1);
    assert_eq!(system.processes().len(), cpus);
}

#[test]
fn test_shared_l2_is_built_once() {
    let mut cfg = config(4, &workload_for(4));
    cfg.cache.l2_sharing = L2Sharing::Shared;
    let (system, _) = assemble(cfg);

    assert_eq!(system.count(ComponentClass::L2Cache), 1);
    assert!(system.component(ComponentId::l2(None)).is_some());
    assert!(system.component(ComponentId::l2(Some(0))).is_none());
    assert_eq!(system.l2_sharing(), L2Sharing::Shared);
}

#[test]
fn test_uncached_build() {
    let mut cfg = config(2, &workload_for(2));
    cfg.cache.caches = false;
    cfg.cache.l2cache = false;
    let (system, _) = assemble(cfg);

    assert_eq!(system.count(ComponentClass::L1DataCache), 0);
    assert_eq!(system.count(ComponentClass::L2Cache), 0);
    assert_eq!(system.connections().len(), 12);
}

// ══════════════════════════════════════════════════════════
// 2. Parameter propagation
// ══════════════════════════════════════════════════════════

#[test]
fn test_overrides_reach_components() {
    let mut cfg = config(1, "/bin/ls");
    cfg.cache.l1_d.size = Some("64kB".to_string());
    cfg.cache.l1_d.assoc = Some(4);
    cfg.cpu.cpu_clock = Some("3GHz".to_string());
    cfg.system.mem_size = Some("1GB".to_string());
    let (system, _) = assemble(cfg);

    let dcache = system.component(ComponentId::dcache(0)).unwrap().params();
    assert_eq!(dcache.size(), Some(Capacity::from_bytes(64 * 1024)));
    assert_eq!(dcache.assoc(), Some(4));
    let icache = system.component(ComponentId::icache(0)).unwrap().params();
    assert_eq!(icache.assoc(), Some(2));
    let cpu = system.component(ComponentId::cpu(0)).unwrap().params();
    assert_eq!(cpu.clock(), Some(Frequency::from_hz(3_000_000_000)));
    assert_eq!(system.mem_ranges(), vec![AddrRange::with_size(GIB)]);
}

#[test]
fn test_atomic_cpu_selects_atomic_mode() {
    let mut cfg = config(1, "/bin/ls");
    cfg.cpu.cpu_type = CpuType::AtomicSimple;
    let (system, _) = assemble(cfg);
    assert_eq!(system.cpu_type(), CpuType::AtomicSimple);
    assert_eq!(system.mem_mode(), MemMode::Atomic);
}

#[test]
fn test_options_extend_arguments() {
    let cfg = config(2, "/bin/ls;/bin/echo hi").with_options("-l;there");
    let (system, _) = assemble(cfg);
    assert_eq!(system.process(0).unwrap().argv(), ["/bin/ls", "-l"]);
    assert_eq!(system.process(1).unwrap().argv(), ["/bin/echo", "hi", "there"]);
}

// ══════════════════════════════════════════════════════════
// 3. Failures
// ══════════════════════════════════════════════════════════

#[test]
fn test_workload_count_mismatch() {
    assert_eq!(
        assemble_err(config(2, "/bin/ls")),
        BuildError::WorkloadCountMismatch {
            expected: 2,
            found: 1,
        }
    );
    assert_eq!(
        assemble_err(config(1, "")),
        BuildError::WorkloadCountMismatch {
            expected: 1,
            found: 0,
        }
    );
}

#[test]
fn test_zero_associativity_is_fatal() {
    let mut cfg = config(1, "/bin/ls");
    cfg.cache.l1_d.assoc = Some(0);
    let err = assemble_err(cfg);
    assert!(err.is_fatal());
    match err {
        BuildError::InvalidParameter { field, .. } => assert_eq!(field, ParamField::Associativity),
        other => panic!("expected InvalidParameter, got {other:?}"),
    }
}

#[test]
fn test_zero_cpus_is_rejected() {
    match assemble_err(config(0, "")) {
        BuildError::InvalidParameter { field, .. } => assert_eq!(field, ParamField::CoreCount),
        other => panic!("expected InvalidParameter, got {other:?}"),
    }
}

#[test]
fn test_l2_without_l1_is_rejected() {
    let mut cfg = config(1, "/bin/ls");
    cfg.cache.caches = false;
    assert!(matches!(
        assemble_err(cfg),
        BuildError::InvalidParameter {
            field: ParamField::CacheHierarchy,
            ..
        }
    ));
}

#[test]
fn test_parameters_checked_before_workload() {
    let mut cfg = config(2, "/bin/ls");
    cfg.system.sys_clock = Some("fast".to_string());
    assert!(matches!(
        assemble_err(cfg),
        BuildError::InvalidParameter {
            field: ParamField::Clock,
            ..
        }
    ));
}

// ══════════════════════════════════════════════════════════
// 4. Root handle and serialization
// ══════════════════════════════════════════════════════════

#[test]
fn test_root_handle_identifies_its_description() {
    let (first, first_root) = assemble(config(1, "/bin/ls"));
    let (again, again_root) = assemble(config(1, "/bin/ls"));
    let (other, _) = assemble(config(2, "/bin/ls;/bin/ls"));

    assert_eq!(first, again);
    assert_eq!(first_root, again_root);
    assert!(first_root.matches(&again));
    assert!(!first_root.matches(&other));

    let (different_argv, _) = assemble(config(1, "/bin/echo"));
    assert!(!first_root.matches(&different_argv));
}

#[test]
fn test_root_handle_covers_parameters() {
    let (system, root) = assemble(config(1, "/bin/ls"));

    let mut larger = config(1, "/bin/ls");
    larger.cache.l1_d.size = Some("64kB".to_string());
    let (resized, _) = assemble(larger);

    assert_ne!(system, resized);
    assert!(!root.matches(&resized));

    let mut engine = MockEngine::new();
    let _ = engine.expect_run().times(0);
    let result = Simulation::new(resized, root).run(&mut engine);
    assert_eq!(result, Err(EngineError::RootMismatch));
}

#[test]
fn test_root_handle_covers_system_settings() {
    let (_, root) = assemble(config(1, "/bin/ls"));

    let mut atomic = config(1, "/bin/ls");
    atomic.cpu.cpu_type = CpuType::AtomicSimple;
    let (other_cpu, _) = assemble(atomic);
    assert!(!root.matches(&other_cpu));

    let mut shared = config(1, "/bin/ls");
    shared.cache.l2_sharing = L2Sharing::Shared;
    let (other_sharing, _) = assemble(shared);
    assert!(!root.matches(&other_sharing));
}

#[test]
fn test_json_describes_the_graph() {
    let (system, _) = assemble(config(2, &workload_for(2)));
    let json: Value = serde_json::from_str(&system.to_json().unwrap()).unwrap();

    assert_eq!(json["cpu_type"], "TimingSimpleCPU");
    assert_eq!(json["mem_mode"], "timing");
    assert_eq!(json["mem_type"], "DDR3_1600_8x8");
    assert_eq!(json["components"].as_array().unwrap().len(), system.components().len());
    assert_eq!(json["components"][1]["id"], "system.cpu0.icache");
    assert_eq!(json["connections"].as_array().unwrap().len(), 18);
    assert_eq!(json["connections"][0]["requestor"], "system.cpu0.icache_port");
    assert_eq!(json["ranges"][0]["component"], "system.mem_ctrl");
    assert_eq!(json["processes"]["1"]["pid"], 101);
}
