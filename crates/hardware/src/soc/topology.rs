//! Topology builder.
//!
//! Wires created components into the canonical memory hierarchy, replicated per
//! core. It performs:
//! 1. **Planning:** Lists the identities a hierarchy needs for a given core count,
//!    so the assembler creates exactly the components the wiring will reference.
//! 2. **Wiring:** CPU ports to L1 caches, L1 caches to the L2 (or the bus), each L2
//!    to the bus, interrupt controllers to the bus in both directions, the system
//!    functional port to the bus, and finally the bus to the memory controller.
//! 3. **Range binding:** Attaches the system memory range to the memory controller.
//! 4. **Closure check:** Every component is attached, every CPU port, L1 CPU-side
//!    port and the system port is connected, every CPU reaches memory, and the
//!    bound range matches the controller's capacity.
//!
//! One code path serves every core count; a single core simply degenerates the
//! fan-in ports to one connection each.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::common::addr::AddrRange;
use crate::common::error::{BuildError, ParamField};
use crate::params::ComponentClass;
use crate::soc::component::{ComponentId, ComponentSet, PortName, ports_of};
use crate::soc::interconnect::{ConnectionSet, PortRef};

/// Cache levels placed between each CPU and the memory bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CacheHierarchy {
    /// CPU ports connect straight to the bus.
    Uncached,
    /// Split L1 instruction and data caches feeding the bus.
    L1,
    /// Split L1 caches feeding an L2, which feeds the bus.
    #[default]
    L1L2,
}

impl CacheHierarchy {
    /// Derives the hierarchy from gem5-style `caches` / `l2cache` flags.
    ///
    /// # Returns
    ///
    /// The hierarchy, or `BuildError::InvalidParameter` when an L2 is requested
    /// without L1 caches; the builder never infers a missing level.
    pub fn from_flags(caches: bool, l2cache: bool) -> Result<Self, BuildError> {
        match (caches, l2cache) {
            (false, false) => Ok(Self::Uncached),
            (true, false) => Ok(Self::L1),
            (true, true) => Ok(Self::L1L2),
            (false, true) => Err(BuildError::invalid_parameter(
                "system",
                ParamField::CacheHierarchy,
                "true",
                "an L2 cache requires L1 caches (`caches`)",
            )),
        }
    }

    /// Returns whether the hierarchy has L1 caches.
    pub const fn has_l1(self) -> bool {
        matches!(self, Self::L1 | Self::L1L2)
    }

    /// Returns whether the hierarchy has an L2 level.
    pub const fn has_l2(self) -> bool {
        matches!(self, Self::L1L2)
    }
}

/// Whether each core gets its own L2 or all cores share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum L2Sharing {
    /// One L2 per core (`system.cpu{i}.l2cache`).
    #[default]
    Private,
    /// A single L2 fed by every core (`system.l2cache`).
    Shared,
}

/// The shape of the memory hierarchy to wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    hierarchy: CacheHierarchy,
    l2_sharing: L2Sharing,
    mem_range: AddrRange,
}

impl Topology {
    /// Creates a topology description.
    ///
    /// # Arguments
    ///
    /// * `hierarchy` - Cache levels between the CPUs and the bus.
    /// * `l2_sharing` - L2 placement; ignored without an L2 level.
    /// * `mem_range` - System address range bound to the memory controller.
    pub const fn new(
        hierarchy: CacheHierarchy,
        l2_sharing: L2Sharing,
        mem_range: AddrRange,
    ) -> Self {
        Self {
            hierarchy,
            l2_sharing,
            mem_range,
        }
    }

    /// Returns the cache hierarchy.
    pub const fn hierarchy(&self) -> CacheHierarchy {
        self.hierarchy
    }

    /// Returns the L2 placement.
    pub const fn l2_sharing(&self) -> L2Sharing {
        self.l2_sharing
    }

    /// Returns the system memory range.
    pub const fn mem_range(&self) -> AddrRange {
        self.mem_range
    }

    /// Returns the identity of the L2 serving `core`.
    pub const fn l2_id(&self, core: usize) -> ComponentId {
        match self.l2_sharing {
            L2Sharing::Private => ComponentId::l2(Some(core)),
            L2Sharing::Shared => ComponentId::l2(None),
        }
    }

    /// Lists every component identity this topology needs for `cpu_count` cores.
    ///
    /// Per-core components come first, core by core, followed by the system-wide
    /// ones and finally the system root.
    ///
    /// # Returns
    ///
    /// The identities in creation order, or `BuildError::InvalidParameter` when
    /// `cpu_count` is zero.
    pub fn plan(&self, cpu_count: usize) -> Result<Vec<ComponentId>, BuildError> {
        check_cpu_count(cpu_count)?;

        let mut ids = Vec::new();
        for i in 0..cpu_count {
            ids.push(ComponentId::cpu(i));
            if self.hierarchy.has_l1() {
                ids.push(ComponentId::icache(i));
                ids.push(ComponentId::dcache(i));
            }
            if self.hierarchy.has_l2() && self.l2_sharing == L2Sharing::Private {
                ids.push(self.l2_id(i));
            }
            ids.push(ComponentId::interrupts(i));
        }
        if self.hierarchy.has_l2() && self.l2_sharing == L2Sharing::Shared {
            ids.push(ComponentId::l2(None));
        }
        ids.push(ComponentId::membus());
        ids.push(ComponentId::mem_ctrl());
        ids.push(ComponentId::system());
        Ok(ids)
    }

    /// Wires `components` into a connected hierarchy for `cpu_count` cores.
    ///
    /// # Arguments
    ///
    /// * `components` - Every component the topology references, already created.
    /// * `cpu_count` - Number of cores to wire.
    ///
    /// # Returns
    ///
    /// The validated `ConnectionSet`, or the first error raised while connecting or
    /// by the closure check.
    pub fn wire(
        &self,
        components: &ComponentSet,
        cpu_count: usize,
    ) -> Result<ConnectionSet, BuildError> {
        check_cpu_count(cpu_count)?;

        let membus = ComponentId::membus();
        let mem_ctrl = ComponentId::mem_ctrl();
        let bus_in = PortRef::new(membus, PortName::CpuSidePorts);
        let bus_out = PortRef::new(membus, PortName::MemSidePorts);
        let mut set = ConnectionSet::new();

        for i in 0..cpu_count {
            let cpu = ComponentId::cpu(i);
            let icache_port = PortRef::new(cpu, PortName::IcachePort);
            let dcache_port = PortRef::new(cpu, PortName::DcachePort);

            if self.hierarchy.has_l1() {
                let icache = ComponentId::icache(i);
                let dcache = ComponentId::dcache(i);
                let icache_in = PortRef::new(icache, PortName::CpuSide);
                let dcache_in = PortRef::new(dcache, PortName::CpuSide);
                let _ = set.connect(components, icache_port, icache_in)?;
                let _ = set.connect(components, dcache_port, dcache_in)?;

                let below = if self.hierarchy.has_l2() {
                    PortRef::new(self.l2_id(i), PortName::CpuSide)
                } else {
                    bus_in
                };
                let _ = set.connect(components, PortRef::new(icache, PortName::MemSide), below)?;
                let _ = set.connect(components, PortRef::new(dcache, PortName::MemSide), below)?;
            } else {
                let _ = set.connect(components, icache_port, bus_in)?;
                let _ = set.connect(components, dcache_port, bus_in)?;
            }

            if self.hierarchy.has_l2() && self.l2_sharing == L2Sharing::Private {
                let l2_out = PortRef::new(self.l2_id(i), PortName::MemSide);
                let _ = set.connect(components, l2_out, bus_in)?;
            }

            let interrupts = ComponentId::interrupts(i);
            let pio = PortRef::new(interrupts, PortName::Pio);
            let int_requestor = PortRef::new(interrupts, PortName::IntRequestor);
            let int_responder = PortRef::new(interrupts, PortName::IntResponder);
            let _ = set.connect(components, bus_out, pio)?;
            let _ = set.connect(components, int_requestor, bus_in)?;
            let _ = set.connect(components, bus_out, int_responder)?;
            debug!(core = i, connections = set.len(), "wired core");
        }

        if self.hierarchy.has_l2() && self.l2_sharing == L2Sharing::Shared {
            let l2_out = PortRef::new(ComponentId::l2(None), PortName::MemSide);
            let _ = set.connect(components, l2_out, bus_in)?;
        }

        let system_port = PortRef::new(ComponentId::system(), PortName::SystemPort);
        let _ = set.connect(components, system_port, bus_in)?;

        let _ = set.connect(components, bus_out, PortRef::new(mem_ctrl, PortName::Port))?;
        set.bind_range(components, mem_ctrl, self.mem_range)?;

        check_closure(components, &set, cpu_count)?;
        info!(
            cpus = cpu_count,
            hierarchy = ?self.hierarchy,
            sharing = ?self.l2_sharing,
            connections = set.len(),
            "topology wired"
        );
        Ok(set)
    }
}

fn check_cpu_count(cpu_count: usize) -> Result<(), BuildError> {
    if cpu_count == 0 {
        return Err(BuildError::invalid_parameter(
            "system",
            ParamField::CoreCount,
            "0",
            "at least one CPU is required",
        ));
    }
    Ok(())
}

/// Verifies that the wired graph is closed.
///
/// # Returns
///
/// `BuildError::DisconnectedTopology` naming the first component that fails.
pub fn check_closure(
    components: &ComponentSet,
    connections: &ConnectionSet,
    cpu_count: usize,
) -> Result<(), BuildError> {
    let disconnected = |component: ComponentId, reason: String| BuildError::DisconnectedTopology {
        component,
        reason,
    };

    for descriptor in components.iter() {
        if !connections.touches(descriptor.id()) {
            let reason = "component has no connections".to_string();
            return Err(disconnected(descriptor.id(), reason));
        }
    }

    for class in [
        ComponentClass::Cpu,
        ComponentClass::L1InstructionCache,
        ComponentClass::L1DataCache,
        ComponentClass::System,
    ] {
        for descriptor in components.of_class(class) {
            let required = ports_of(class)
                .iter()
                .filter(|port| !class.is_cache() || port.name == PortName::CpuSide);
            for port in required {
                if !connections.is_connected(PortRef::new(descriptor.id(), port.name)) {
                    let reason = format!("port `{}` is unconnected", port.name);
                    return Err(disconnected(descriptor.id(), reason));
                }
            }
        }
    }

    let _ = components.lookup(ComponentId::system())?;
    let mem_ctrl = ComponentId::mem_ctrl();
    let controller = components.lookup(mem_ctrl)?;
    for i in 0..cpu_count {
        let cpu = ComponentId::cpu(i);
        if !connections.reaches(cpu, mem_ctrl) {
            return Err(disconnected(cpu, format!("no path to {mem_ctrl}")));
        }
    }

    let Some(range) = connections.range_of(mem_ctrl) else {
        return Err(disconnected(mem_ctrl, "no address range bound".to_string()));
    };
    if let Some(capacity) = controller.params().size() {
        if capacity.bytes() != range.size() {
            return Err(disconnected(
                mem_ctrl,
                format!("bound range {range} does not match capacity {capacity}"),
            ));
        }
    }
    Ok(())
}
