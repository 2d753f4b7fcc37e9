//! # Interconnect Tests
//!
//! Verifies connection rules, write-once ports, range binding and reachability.

use memhier_core::common::{AddrRange, BuildError};
use memhier_core::params::defaults::MEM_SIZE;
use memhier_core::soc::{
    CacheHierarchy, ComponentId, ComponentSet, ConnectionId, ConnectionSet, L2Sharing, PortName,
    PortRef,
};
use proptest::prelude::*;

use crate::common::harness::{create_components, topology};

fn l1l2_components() -> ComponentSet {
    create_components(&topology(CacheHierarchy::L1L2, L2Sharing::Private), 1)
}

fn port(component: ComponentId, name: PortName) -> PortRef {
    PortRef::new(component, name)
}

fn expect_incompatible(result: Result<ConnectionId, BuildError>) {
    assert!(
        matches!(result, Err(BuildError::IncompatiblePorts { .. })),
        "expected IncompatiblePorts, got {result:?}"
    );
}

// ══════════════════════════════════════════════════════════
// 1. Successful connections
// ══════════════════════════════════════════════════════════

#[test]
fn connect_records_edge_in_order() {
    let components = l1l2_components();
    let mut set = ConnectionSet::new();

    let first = set
        .connect(
            &components,
            port(ComponentId::cpu(0), PortName::IcachePort),
            port(ComponentId::icache(0), PortName::CpuSide),
        )
        .unwrap();
    let second = set
        .connect(
            &components,
            port(ComponentId::cpu(0), PortName::DcachePort),
            port(ComponentId::dcache(0), PortName::CpuSide),
        )
        .unwrap();

    assert_eq!(first, ConnectionId(0));
    assert_eq!(second, ConnectionId(1));
    assert_eq!(set.len(), 2);
    assert_eq!(set.connections()[0].responder.component, ComponentId::icache(0));
    assert!(set.is_connected(port(ComponentId::cpu(0), PortName::IcachePort)));
    assert!(!set.is_connected(port(ComponentId::icache(0), PortName::MemSide)));
}

#[test]
fn shared_port_accepts_fan_in() {
    let components = l1l2_components();
    let mut set = ConnectionSet::new();
    let l2_in = port(ComponentId::l2(Some(0)), PortName::CpuSide);

    let _ = set
        .connect(&components, port(ComponentId::icache(0), PortName::MemSide), l2_in)
        .unwrap();
    let _ = set
        .connect(&components, port(ComponentId::dcache(0), PortName::MemSide), l2_in)
        .unwrap();

    assert_eq!(set.connection_count(l2_in), 2);
}

#[test]
fn port_ref_renders_as_dotted_path() {
    let end = port(ComponentId::l2(None), PortName::MemSide);
    assert_eq!(end.to_string(), "system.l2cache.mem_side");
}

// ══════════════════════════════════════════════════════════
// 2. Rejected connections
// ══════════════════════════════════════════════════════════

#[test]
fn unknown_component_is_rejected() {
    let components = l1l2_components();
    let mut set = ConnectionSet::new();
    let result = set.connect(
        &components,
        port(ComponentId::cpu(5), PortName::IcachePort),
        port(ComponentId::icache(0), PortName::CpuSide),
    );
    assert_eq!(result, Err(BuildError::UnknownComponent(ComponentId::cpu(5))));
    assert!(set.is_empty());
}

#[test]
fn undeclared_port_is_rejected() {
    let components = l1l2_components();
    let mut set = ConnectionSet::new();
    let result = set.connect(
        &components,
        port(ComponentId::membus(), PortName::MemSidePorts),
        port(ComponentId::cpu(0), PortName::Pio),
    );
    assert_eq!(
        result,
        Err(BuildError::UnknownPort {
            component: ComponentId::cpu(0),
            port: PortName::Pio,
        })
    );
}

#[test]
fn self_loop_is_rejected() {
    let components = l1l2_components();
    let mut set = ConnectionSet::new();
    expect_incompatible(set.connect(
        &components,
        port(ComponentId::icache(0), PortName::MemSide),
        port(ComponentId::icache(0), PortName::CpuSide),
    ));
}

#[test]
fn role_mismatch_is_rejected() {
    let components = l1l2_components();
    let mut set = ConnectionSet::new();
    // Responder port on the requesting end.
    expect_incompatible(set.connect(
        &components,
        port(ComponentId::icache(0), PortName::CpuSide),
        port(ComponentId::membus(), PortName::CpuSidePorts),
    ));
    // Requestor port on the serving end.
    expect_incompatible(set.connect(
        &components,
        port(ComponentId::icache(0), PortName::MemSide),
        port(ComponentId::cpu(0), PortName::DcachePort),
    ));
    assert!(set.is_empty());
}

#[test]
fn single_port_is_write_once() {
    let components = l1l2_components();
    let mut set = ConnectionSet::new();
    let icache_port = port(ComponentId::cpu(0), PortName::IcachePort);

    let _ = set
        .connect(&components, icache_port, port(ComponentId::icache(0), PortName::CpuSide))
        .unwrap();
    let dcache_in = port(ComponentId::dcache(0), PortName::CpuSide);
    let result = set.connect(&components, icache_port, dcache_in);

    assert_eq!(
        result,
        Err(BuildError::AlreadyConnected {
            component: ComponentId::cpu(0),
            port: PortName::IcachePort,
        })
    );
    assert_eq!(set.len(), 1);
    assert_eq!(set.connections()[0].responder.component, ComponentId::icache(0));
}

#[test]
fn repeated_edge_between_shared_ports_is_rejected() {
    let components = l1l2_components();
    let mut set = ConnectionSet::new();
    let bus_out = port(ComponentId::membus(), PortName::MemSidePorts);
    let l2_in = port(ComponentId::l2(Some(0)), PortName::CpuSide);

    let _ = set.connect(&components, bus_out, l2_in).unwrap();
    assert_eq!(
        set.connect(&components, bus_out, l2_in),
        Err(BuildError::AlreadyConnected {
            component: ComponentId::membus(),
            port: PortName::MemSidePorts,
        })
    );
    assert_eq!(set.connection_count(l2_in), 1);
}

// ══════════════════════════════════════════════════════════
// 3. Range binding
// ══════════════════════════════════════════════════════════

#[test]
fn memory_controller_binds_one_range() {
    let components = l1l2_components();
    let mut set = ConnectionSet::new();
    let range = AddrRange::with_size(MEM_SIZE);

    set.bind_range(&components, ComponentId::mem_ctrl(), range).unwrap();
    assert_eq!(set.range_of(ComponentId::mem_ctrl()), Some(range));

    assert_eq!(
        set.bind_range(&components, ComponentId::mem_ctrl(), AddrRange::new(MEM_SIZE, 4096)),
        Err(BuildError::AlreadyBound {
            component: ComponentId::mem_ctrl(),
            range,
        })
    );
    assert_eq!(set.ranges().len(), 1);
}

#[test]
fn only_memory_controllers_bind_ranges() {
    let components = l1l2_components();
    let mut set = ConnectionSet::new();
    let result = set.bind_range(&components, ComponentId::membus(), AddrRange::with_size(MEM_SIZE));
    assert!(matches!(result, Err(BuildError::InvalidParameter { .. })));
    assert!(set.ranges().is_empty());
}

// ══════════════════════════════════════════════════════════
// 4. Reachability
// ══════════════════════════════════════════════════════════

#[test]
fn reachability_follows_request_direction() {
    let components = l1l2_components();
    let mut set = ConnectionSet::new();
    let cpu = ComponentId::cpu(0);
    let dcache = ComponentId::dcache(0);
    let l2 = ComponentId::l2(Some(0));

    let _ = set
        .connect(&components, port(cpu, PortName::DcachePort), port(dcache, PortName::CpuSide))
        .unwrap();
    let _ = set
        .connect(&components, port(dcache, PortName::MemSide), port(l2, PortName::CpuSide))
        .unwrap();

    assert!(set.reaches(cpu, l2));
    assert!(!set.reaches(l2, cpu));
    assert!(!set.reaches(cpu, ComponentId::mem_ctrl()));
    assert_eq!(set.downstream(cpu).collect::<Vec<_>>(), [dcache]);
    assert!(set.touches(l2));
    assert!(!set.touches(ComponentId::membus()));
}

proptest! {
    #[test]
    fn rewiring_any_edge_fails(
        cpus in 1usize..=4,
        hierarchy in prop::sample::select(vec![
            CacheHierarchy::Uncached,
            CacheHierarchy::L1,
            CacheHierarchy::L1L2,
        ]),
        pick in any::<prop::sample::Index>(),
    ) {
        let topo = topology(hierarchy, L2Sharing::Private);
        let components = create_components(&topo, cpus);
        let mut set = topo.wire(&components, cpus).unwrap();
        let before = set.len();

        let edge = set.connections()[pick.index(before)];
        let result = set.connect(&components, edge.requestor, edge.responder);

        prop_assert!(
            matches!(result, Err(BuildError::AlreadyConnected { .. })),
            "reconnecting {} -> {} gave {:?}", edge.requestor, edge.responder, result
        );
        prop_assert_eq!(set.len(), before);
    }
}
