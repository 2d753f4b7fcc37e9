//! Component descriptors, identities and ports.
//!
//! This module defines the nodes of the system graph. It provides:
//! 1. **Identity:** `ComponentId`, a class plus optional core index, displayed as a
//!    gem5-style path (`system.cpu0.icache`).
//! 2. **Ports:** The fixed, ordered port list declared by each class, with a role
//!    (requestor or responder) and a kind (point-to-point or shared).
//! 3. **Descriptors:** `ComponentDescriptor`, a typed node holding its resolved
//!    parameters and ports.
//! 4. **Storage:** `ComponentSet`, an arena of descriptors with lookup by identity.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::common::error::BuildError;
use crate::params::{ComponentClass, ParameterSet};

/// Unique identity of a component within one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId {
    class: ComponentClass,
    core: Option<usize>,
}

impl ComponentId {
    /// Creates an identity from a class and an optional owning core.
    pub const fn new(class: ComponentClass, core: Option<usize>) -> Self {
        Self { class, core }
    }

    /// Identity of core `i`.
    pub const fn cpu(i: usize) -> Self {
        Self::new(ComponentClass::Cpu, Some(i))
    }

    /// Identity of core `i`'s L1 instruction cache.
    pub const fn icache(i: usize) -> Self {
        Self::new(ComponentClass::L1InstructionCache, Some(i))
    }

    /// Identity of core `i`'s L1 data cache.
    pub const fn dcache(i: usize) -> Self {
        Self::new(ComponentClass::L1DataCache, Some(i))
    }

    /// Identity of an L2 cache: private to `core`, or shared when `core` is `None`.
    pub const fn l2(core: Option<usize>) -> Self {
        Self::new(ComponentClass::L2Cache, core)
    }

    /// Identity of core `i`'s interrupt controller.
    pub const fn interrupts(i: usize) -> Self {
        Self::new(ComponentClass::InterruptController, Some(i))
    }

    /// Identity of the system memory bus.
    pub const fn membus() -> Self {
        Self::new(ComponentClass::InterconnectBus, None)
    }

    /// Identity of the memory controller.
    pub const fn mem_ctrl() -> Self {
        Self::new(ComponentClass::MemoryController, None)
    }

    /// Identity of the system root.
    pub const fn system() -> Self {
        Self::new(ComponentClass::System, None)
    }

    /// Returns the class this identity names.
    pub const fn class(&self) -> ComponentClass {
        self.class
    }

    /// Returns the owning core, if any.
    pub const fn core(&self) -> Option<usize> {
        self.core
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let segment = self.class.path_segment();
        match (self.class, self.core) {
            (ComponentClass::System, _) => f.write_str("system"),
            (ComponentClass::Cpu, Some(i)) => write!(f, "system.cpu{i}"),
            (_, Some(i)) => write!(f, "system.cpu{i}.{segment}"),
            (_, None) => write!(f, "system.{segment}"),
        }
    }
}

impl Serialize for ComponentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Name of a port declared by a component class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortName {
    /// CPU instruction-fetch port.
    IcachePort,
    /// CPU data port.
    DcachePort,
    /// Cache port facing the processor.
    CpuSide,
    /// Cache port facing memory.
    MemSide,
    /// Bus responder port set, fed by caches and interrupt requestors.
    CpuSidePorts,
    /// Bus requestor port set, driving memory and device ports.
    MemSidePorts,
    /// Memory controller port.
    Port,
    /// Interrupt controller programmed-I/O port.
    Pio,
    /// Interrupt controller port raising interrupt requests.
    IntRequestor,
    /// Interrupt controller port receiving interrupt messages.
    IntResponder,
    /// System functional-access port, used to load workloads into memory.
    SystemPort,
}

impl PortName {
    /// Returns the port name as written in system paths.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IcachePort => "icache_port",
            Self::DcachePort => "dcache_port",
            Self::CpuSide => "cpu_side",
            Self::MemSide => "mem_side",
            Self::CpuSidePorts => "cpu_side_ports",
            Self::MemSidePorts => "mem_side_ports",
            Self::Port => "port",
            Self::Pio => "pio",
            Self::IntRequestor => "int_requestor",
            Self::IntResponder => "int_responder",
            Self::SystemPort => "system_port",
        }
    }
}

impl fmt::Display for PortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PortRole {
    /// Issues requests.
    Requestor,
    /// Serves requests.
    Responder,
}

/// Connection multiplicity of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PortKind {
    /// Point-to-point; carries at most one connection.
    Single,
    /// Bus-style port set; carries any number of connections.
    Shared,
}

/// A named connection point declared by a component class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Port {
    /// Port name.
    pub name: PortName,
    /// Requestor or responder.
    pub role: PortRole,
    /// Point-to-point or shared.
    pub kind: PortKind,
}

impl Port {
    const fn single(name: PortName, role: PortRole) -> Self {
        Self {
            name,
            role,
            kind: PortKind::Single,
        }
    }

    const fn shared(name: PortName, role: PortRole) -> Self {
        Self {
            name,
            role,
            kind: PortKind::Shared,
        }
    }
}

const CPU_PORTS: &[Port] = &[
    Port::single(PortName::IcachePort, PortRole::Requestor),
    Port::single(PortName::DcachePort, PortRole::Requestor),
];

const L1_PORTS: &[Port] = &[
    Port::single(PortName::CpuSide, PortRole::Responder),
    Port::single(PortName::MemSide, PortRole::Requestor),
];

const L2_PORTS: &[Port] = &[
    Port::shared(PortName::CpuSide, PortRole::Responder),
    Port::single(PortName::MemSide, PortRole::Requestor),
];

const BUS_PORTS: &[Port] = &[
    Port::shared(PortName::CpuSidePorts, PortRole::Responder),
    Port::shared(PortName::MemSidePorts, PortRole::Requestor),
];

const MEM_CTRL_PORTS: &[Port] = &[Port::single(PortName::Port, PortRole::Responder)];

const INTERRUPT_PORTS: &[Port] = &[
    Port::single(PortName::Pio, PortRole::Responder),
    Port::single(PortName::IntRequestor, PortRole::Requestor),
    Port::single(PortName::IntResponder, PortRole::Responder),
];

const SYSTEM_PORTS: &[Port] = &[Port::single(PortName::SystemPort, PortRole::Requestor)];

/// Returns the fixed, ordered port list declared by `class`.
pub const fn ports_of(class: ComponentClass) -> &'static [Port] {
    match class {
        ComponentClass::Cpu => CPU_PORTS,
        ComponentClass::L1InstructionCache | ComponentClass::L1DataCache => L1_PORTS,
        ComponentClass::L2Cache => L2_PORTS,
        ComponentClass::InterconnectBus => BUS_PORTS,
        ComponentClass::MemoryController => MEM_CTRL_PORTS,
        ComponentClass::InterruptController => INTERRUPT_PORTS,
        ComponentClass::System => SYSTEM_PORTS,
    }
}

/// A typed node of the system graph.
///
/// Created only by `ComponentFactory`; connection state lives in the
/// `ConnectionSet`, so a descriptor never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentDescriptor {
    id: ComponentId,
    class: ComponentClass,
    params: ParameterSet,
    ports: &'static [Port],
}

impl ComponentDescriptor {
    pub(crate) const fn new(id: ComponentId, params: ParameterSet) -> Self {
        let class = id.class();
        Self {
            id,
            class,
            params,
            ports: ports_of(class),
        }
    }

    /// Returns the identity.
    pub const fn id(&self) -> ComponentId {
        self.id
    }

    /// Returns the class.
    pub const fn class(&self) -> ComponentClass {
        self.class
    }

    /// Returns the resolved parameters.
    pub const fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Returns the declared ports in declaration order.
    pub const fn ports(&self) -> &'static [Port] {
        self.ports
    }

    /// Looks up a declared port by name.
    pub fn port(&self, name: PortName) -> Option<&'static Port> {
        self.ports.iter().find(|port| port.name == name)
    }
}

/// Arena of component descriptors with lookup by identity.
///
/// Iteration follows insertion order, which the assembler keeps deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentSet {
    components: Vec<ComponentDescriptor>,
    index: HashMap<ComponentId, usize>,
}

impl ComponentSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor.
    ///
    /// # Returns
    ///
    /// `BuildError::DuplicateComponent` if a descriptor with the same identity is
    /// already present.
    pub fn insert(&mut self, descriptor: ComponentDescriptor) -> Result<(), BuildError> {
        let id = descriptor.id();
        if self.index.contains_key(&id) {
            return Err(BuildError::DuplicateComponent(id));
        }
        let _ = self.index.insert(id, self.components.len());
        self.components.push(descriptor);
        Ok(())
    }

    /// Returns the descriptor for `id`, if present.
    pub fn get(&self, id: ComponentId) -> Option<&ComponentDescriptor> {
        self.index.get(&id).map(|&slot| &self.components[slot])
    }

    /// Returns the descriptor for `id`, or `BuildError::UnknownComponent`.
    pub fn lookup(&self, id: ComponentId) -> Result<&ComponentDescriptor, BuildError> {
        self.get(id).ok_or(BuildError::UnknownComponent(id))
    }

    /// Returns whether `id` is present.
    pub fn contains(&self, id: ComponentId) -> bool {
        self.index.contains_key(&id)
    }

    /// Iterates over descriptors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.components.iter()
    }

    /// Iterates over descriptors of one class in insertion order.
    pub fn of_class(&self, class: ComponentClass) -> impl Iterator<Item = &ComponentDescriptor> {
        self.components.iter().filter(move |c| c.class() == class)
    }

    /// Returns the number of descriptors of `class`.
    pub fn count(&self, class: ComponentClass) -> usize {
        self.of_class(class).count()
    }

    /// Returns the total number of descriptors.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl Serialize for ComponentSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.components)
    }
}
