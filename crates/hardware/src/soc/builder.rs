//! System assembly and the top-level `SystemDescription`.
//!
//! This module turns a `Config` into a validated system graph. It performs, in order:
//! 1. **Core count:** Rejects systems without CPUs.
//! 2. **Resolution:** Resolves the parameters of every component class before any
//!    component exists, so a bad option aborts the build up front.
//! 3. **Workload:** Parses the workload and binds one process per CPU.
//! 4. **Creation:** Instantiates every component the topology plans for.
//! 5. **Wiring:** Connects ports, binds the memory range and runs the closure check.
//! 6. **Aggregation:** Freezes everything into a `SystemDescription` plus `RootHandle`.
//!
//! Assembly is atomic: any failure returns the first error and drops all partial
//! state. The assembler never calls the simulation engine.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use tracing::info;

use crate::common::addr::AddrRange;
use crate::common::constants::MEM_BASE;
use crate::common::error::{BuildError, ParamField};
use crate::common::units::Capacity;
use crate::config::{Config, CpuType, L2Sharing, MemMode, MemoryType};
use crate::params::{ComponentClass, ParameterSet, defaults, resolve};
use crate::sim::workload::{ProcessDescriptor, WorkloadBinding, WorkloadSpec, bind};
use crate::soc::component::{ComponentDescriptor, ComponentId, ComponentSet};
use crate::soc::factory::ComponentFactory;
use crate::soc::interconnect::ConnectionSet;
use crate::soc::topology::{CacheHierarchy, Topology};

/// The immutable, validated system graph handed to a simulation engine.
///
/// Owns every component descriptor, connection, memory-range binding and bound
/// process by value. Serializes to the JSON equivalent of a gem5 `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemDescription {
    cpu_type: CpuType,
    mem_mode: MemMode,
    mem_type: MemoryType,
    hierarchy: CacheHierarchy,
    l2_sharing: L2Sharing,
    components: ComponentSet,
    #[serde(flatten)]
    connections: ConnectionSet,
    processes: WorkloadBinding,
}

impl SystemDescription {
    /// Returns the CPU model of every core.
    pub const fn cpu_type(&self) -> CpuType {
        self.cpu_type
    }

    /// Returns the memory access mode implied by the CPU model.
    pub const fn mem_mode(&self) -> MemMode {
        self.mem_mode
    }

    /// Returns the memory technology.
    pub const fn mem_type(&self) -> MemoryType {
        self.mem_type
    }

    /// Returns the cache hierarchy the system was wired with.
    pub const fn hierarchy(&self) -> CacheHierarchy {
        self.hierarchy
    }

    /// Returns the L2 placement.
    pub const fn l2_sharing(&self) -> L2Sharing {
        self.l2_sharing
    }

    /// Returns all component descriptors.
    pub const fn components(&self) -> &ComponentSet {
        &self.components
    }

    /// Returns the connections and memory-range bindings.
    pub const fn connections(&self) -> &ConnectionSet {
        &self.connections
    }

    /// Returns the memory address ranges, in binding order.
    pub fn mem_ranges(&self) -> Vec<AddrRange> {
        self.connections.ranges().iter().map(|b| b.range).collect()
    }

    /// Returns the per-CPU process bindings.
    pub const fn processes(&self) -> &WorkloadBinding {
        &self.processes
    }

    /// Returns the number of CPUs.
    pub fn num_cpus(&self) -> usize {
        self.components.count(ComponentClass::Cpu)
    }

    /// Returns the number of components of `class`.
    pub fn count(&self, class: ComponentClass) -> usize {
        self.components.count(class)
    }

    /// Returns the descriptor with identity `id`.
    pub fn component(&self, id: ComponentId) -> Option<&ComponentDescriptor> {
        self.components.get(id)
    }

    /// Returns the process bound to `cpu`.
    pub fn process(&self, cpu: usize) -> Option<&ProcessDescriptor> {
        self.processes.get(cpu)
    }

    /// Serializes the description to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, BuildError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.cpu_type.hash(&mut hasher);
        self.mem_mode.hash(&mut hasher);
        self.mem_type.hash(&mut hasher);
        self.hierarchy.hash(&mut hasher);
        self.l2_sharing.hash(&mut hasher);
        for component in self.components.iter() {
            component.id().hash(&mut hasher);
            hash_params(component.params(), &mut hasher);
        }
        self.connections.connections().hash(&mut hasher);
        self.connections.ranges().hash(&mut hasher);
        for (cpu, process) in self.processes.iter() {
            cpu.hash(&mut hasher);
            process.pid().hash(&mut hasher);
            process.argv().hash(&mut hasher);
        }
        hasher.finish()
    }
}

fn hash_params(params: &ParameterSet, hasher: &mut impl Hasher) {
    params.class().hash(hasher);
    params.size().hash(hasher);
    params.assoc().hash(hasher);
    params.block_size().hash(hasher);
    params.clock().hash(hasher);
    params.voltage().map(|v| v.volts().to_bits()).hash(hasher);
}

/// Opaque token for the top of an assembled system.
///
/// Produced together with exactly one `SystemDescription`; the engine handoff
/// rejects a handle paired with any other description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RootHandle {
    full_system: bool,
    fingerprint: u64,
}

impl RootHandle {
    pub(crate) fn for_system(system: &SystemDescription) -> Self {
        Self {
            full_system: false,
            fingerprint: system.fingerprint(),
        }
    }

    /// Returns whether the system boots a full OS; always `false` for
    /// syscall-emulation builds.
    pub const fn full_system(&self) -> bool {
        self.full_system
    }

    /// Returns whether this handle was produced for `system`.
    pub fn matches(&self, system: &SystemDescription) -> bool {
        self.fingerprint == system.fingerprint()
    }
}

/// Builds a `SystemDescription` from a configuration.
#[derive(Debug, Clone)]
pub struct SystemAssembler {
    config: Config,
}

impl SystemAssembler {
    /// Creates an assembler for `config`.
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the configuration being assembled.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Assembles the system.
    ///
    /// # Returns
    ///
    /// The description and its root handle, or the first `BuildError` raised by any
    /// stage. No partially built description is ever returned.
    pub fn assemble(&self) -> Result<(SystemDescription, RootHandle), BuildError> {
        let config = &self.config;
        let cpu_count = config.system.num_cpus;
        if cpu_count == 0 {
            return Err(BuildError::invalid_parameter(
                "system",
                ParamField::CoreCount,
                "0",
                "at least one CPU is required",
            ));
        }
        let hierarchy = config.hierarchy()?;

        let mut resolved: Vec<ParameterSet> = Vec::with_capacity(ComponentClass::ALL.len());
        for class in ComponentClass::ALL {
            resolved.push(resolve(class, &config.overrides_for(class))?);
        }
        let params_of = |class: ComponentClass| resolved[class as usize];
        info!(classes = resolved.len(), "resolved parameters");

        let workload = WorkloadSpec::parse(&config.workload.cmd, &config.workload.options)?;
        let processes = bind(&workload, cpu_count)?;
        info!(processes = processes.len(), "bound workload");

        let mem_size = params_of(ComponentClass::MemoryController)
            .size()
            .map_or(defaults::MEM_SIZE, Capacity::bytes);
        let topology = Topology::new(
            hierarchy,
            config.cache.l2_sharing,
            AddrRange::new(MEM_BASE, mem_size),
        );

        let mut factory = ComponentFactory::new();
        let mut components = ComponentSet::new();
        for id in topology.plan(cpu_count)? {
            components.insert(factory.create(id.class(), params_of(id.class()), id)?)?;
        }
        info!(components = components.len(), "created components");

        let connections = topology.wire(&components, cpu_count)?;

        let system = SystemDescription {
            cpu_type: config.cpu.cpu_type,
            mem_mode: config.cpu.cpu_type.mem_mode(),
            mem_type: config.system.mem_type,
            hierarchy,
            l2_sharing: config.cache.l2_sharing,
            components,
            connections,
            processes,
        };
        let root = RootHandle::for_system(&system);
        info!(
            cpus = system.num_cpus(),
            components = system.components.len(),
            connections = system.connections.len(),
            "system assembled"
        );
        Ok((system, root))
    }
}
