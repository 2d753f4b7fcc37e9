//! # Configuration Tests
//!
//! Verifies defaults, JSON and file loading, strictness toward unknown keys, and
//! the projection of configuration sections onto per-class overrides.

use std::io::Write;

use memhier_core::common::BuildError;
use memhier_core::config::*;
use memhier_core::params::{ComponentClass, Overrides};
use memhier_core::soc::CacheHierarchy;
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

// ══════════════════════════════════════════════════════════
// 1. Defaults
// ══════════════════════════════════════════════════════════

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.system.num_cpus, 1);
    assert_eq!(config.system.mem_type, MemoryType::Ddr3_1600);
    assert_eq!(config.cpu.cpu_type, CpuType::TimingSimple);
    assert!(config.cache.caches);
    assert!(config.cache.l2cache);
    assert_eq!(config.cache.l2_sharing, L2Sharing::Private);
    assert!(config.workload.cmd.is_empty());
    assert!(config.workload.options.is_empty());
}

#[test]
fn test_default_hierarchy_is_two_level() {
    assert_eq!(Config::default().hierarchy().unwrap(), CacheHierarchy::L1L2);
}

#[test]
fn test_empty_json_equals_default() {
    assert_eq!(Config::from_json("{}").unwrap(), Config::default());
}

#[test]
fn test_builders() {
    let config = Config::default()
        .with_num_cpus(4)
        .with_cmd("/bin/ls")
        .with_options("-l");
    assert_eq!(config.system.num_cpus, 4);
    assert_eq!(config.workload.cmd, "/bin/ls");
    assert_eq!(config.workload.options, "-l");
}

// ══════════════════════════════════════════════════════════
// 2. Deserialization
// ══════════════════════════════════════════════════════════

#[test]
fn test_full_json() {
    let json = r#"{
        "system": {
            "num_cpus": 2,
            "sys_clock": "1GHz",
            "sys_voltage": "1.0V",
            "mem_size": "512MB",
            "mem_type": "SimpleMemory"
        },
        "cpu": { "cpu_type": "O3CPU", "cpu_clock": "3GHz" },
        "cache": {
            "caches": true,
            "l2cache": true,
            "l2_sharing": "Shared",
            "block_size": 64,
            "l1_i": { "size": "16kB", "assoc": 2 },
            "l1_d": { "size": "64kB", "assoc": 4 },
            "l2": { "size": "256kB", "assoc": 8 }
        },
        "workload": { "cmd": "/bin/ls;/bin/echo hi", "options": "-l;" }
    }"#;
    let config = Config::from_json(json).unwrap();

    assert_eq!(config.system.num_cpus, 2);
    assert_eq!(config.system.mem_type, MemoryType::SimpleMemory);
    assert_eq!(config.cpu.cpu_type, CpuType::O3);
    assert_eq!(config.cpu.cpu_clock.as_deref(), Some("3GHz"));
    assert_eq!(config.cache.l2_sharing, L2Sharing::Shared);
    assert_eq!(config.cache.block_size, Some(64));
    assert_eq!(
        config.cache.l2,
        CacheLevelConfig {
            size: Some("256kB".into()),
            assoc: Some(8),
        }
    );
    assert_eq!(config.workload.options, "-l;");
}

#[test]
fn test_memory_type_names() {
    for (name, expected) in [
        ("DDR3_1600_8x8", MemoryType::Ddr3_1600),
        ("DDR4_2400_8x8", MemoryType::Ddr4_2400),
        ("SimpleMemory", MemoryType::SimpleMemory),
    ] {
        let json = format!(r#"{{ "system": {{ "mem_type": "{name}" }} }}"#);
        assert_eq!(Config::from_json(&json).unwrap().system.mem_type, expected);
    }
}

#[test]
fn test_cpu_type_alias() {
    let config = Config::from_json(r#"{ "cpu": { "cpu_type": "DerivO3CPU" } }"#).unwrap();
    assert_eq!(config.cpu.cpu_type, CpuType::O3);
}

#[test]
fn test_unknown_key_is_rejected() {
    let err = Config::from_json(r#"{ "cache": { "l1_d": { "sise": "32kB" } } }"#).unwrap_err();
    match err {
        BuildError::InvalidConfig(msg) => assert!(msg.contains("sise")),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn test_unknown_section_is_rejected() {
    assert!(Config::from_json(r#"{ "pipeline": {} }"#).is_err());
}

#[test]
fn test_negative_assoc_is_rejected_at_parse_time() {
    let err = Config::from_json(r#"{ "cache": { "l2": { "assoc": -1 } } }"#).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn test_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"{ "system": { "num_cpus": 3 } }"#).unwrap();
    file.flush().unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.system.num_cpus, 3);
}

#[test]
fn test_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, BuildError::InvalidConfig(msg) if msg.contains("absent.json")));
}

// ══════════════════════════════════════════════════════════
// 3. Derived settings
// ══════════════════════════════════════════════════════════

#[test]
fn test_mem_mode_follows_cpu_type() {
    assert_eq!(CpuType::TimingSimple.mem_mode(), MemMode::Timing);
    assert_eq!(CpuType::O3.mem_mode(), MemMode::Timing);
    assert_eq!(CpuType::AtomicSimple.mem_mode(), MemMode::Atomic);
}

#[test]
fn test_hierarchy_flags() {
    let mut config = Config::default();
    config.cache.l2cache = false;
    assert_eq!(config.hierarchy().unwrap(), CacheHierarchy::L1);

    config.cache.caches = false;
    assert_eq!(config.hierarchy().unwrap(), CacheHierarchy::Uncached);

    config.cache.l2cache = true;
    assert!(matches!(
        config.hierarchy(),
        Err(BuildError::InvalidParameter { .. })
    ));
}

// ══════════════════════════════════════════════════════════
// 4. Override projection
// ══════════════════════════════════════════════════════════

#[test]
fn test_default_config_has_no_overrides() {
    let config = Config::default();
    for class in ComponentClass::ALL {
        assert_eq!(config.overrides_for(class), Overrides::default(), "{class}");
    }
}

#[test]
fn test_cache_overrides_share_block_size() {
    let mut config = Config::default();
    config.cache.block_size = Some(128);
    config.cache.l1_d = CacheLevelConfig {
        size: Some("64kB".into()),
        assoc: Some(4),
    };

    assert_eq!(
        config.overrides_for(ComponentClass::L1DataCache),
        Overrides::default()
            .with_size("64kB")
            .with_assoc(4)
            .with_block_size(128)
    );
    assert_eq!(
        config.overrides_for(ComponentClass::L1InstructionCache),
        Overrides::default().with_block_size(128)
    );
    assert_eq!(
        config.overrides_for(ComponentClass::L2Cache),
        Overrides::default().with_block_size(128)
    );
}

#[test]
fn test_clock_domains() {
    let mut config = Config::default();
    config.cpu.cpu_clock = Some("3GHz".into());
    config.system.sys_clock = Some("800MHz".into());
    config.system.sys_voltage = Some("900mV".into());
    config.system.mem_size = Some("1GB".into());

    assert_eq!(
        config.overrides_for(ComponentClass::Cpu),
        Overrides::default().with_clock("3GHz").with_voltage("900mV")
    );
    let system_domain = Overrides::default().with_clock("800MHz").with_voltage("900mV");
    assert_eq!(config.overrides_for(ComponentClass::InterconnectBus), system_domain);
    assert_eq!(config.overrides_for(ComponentClass::InterruptController), system_domain);
    assert_eq!(
        config.overrides_for(ComponentClass::MemoryController),
        system_domain.with_size("1GB")
    );
}
