//! Port-level interconnect: connections and memory-range bindings.
//!
//! This module records the edges of the system graph. It provides:
//! 1. **Connection rules:** Both ends must exist and declare the named port, the
//!    requestor end must be a requestor port and the responder end a responder port,
//!    and the two ends must belong to different components.
//! 2. **Write-once ports:** A `Single` port carries at most one connection; a second
//!    attempt fails with `AlreadyConnected` instead of replacing the first.
//! 3. **Range bindings:** Memory controllers are bound to the address range they back.
//! 4. **Reachability:** Breadth-first search along requestor-to-responder edges, used
//!    by the closure check.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::{Serialize, Serializer};
use tracing::trace;

use crate::common::addr::AddrRange;
use crate::common::error::{BuildError, ParamField};
use crate::params::ComponentClass;
use crate::soc::component::{ComponentId, ComponentSet, Port, PortKind, PortName, PortRole};

/// One end of a connection: a port on a specific component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortRef {
    /// Owning component.
    pub component: ComponentId,
    /// Port name on that component.
    pub port: PortName,
}

impl PortRef {
    /// Creates a port reference.
    pub const fn new(component: ComponentId, port: PortName) -> Self {
        Self { component, port }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.port)
    }
}

impl Serialize for PortRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Position of a connection in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(pub usize);

/// A directed edge from a requestor port to a responder port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Connection {
    /// Creation-order identifier.
    pub id: ConnectionId,
    /// Issuing end.
    pub requestor: PortRef,
    /// Serving end.
    pub responder: PortRef,
}

/// A memory controller and the address range it backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RangeBinding {
    /// The memory controller.
    pub component: ComponentId,
    /// The backed range.
    pub range: AddrRange,
}

/// Ordered, write-once set of connections plus memory-range bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSet {
    connections: Vec<Connection>,
    usage: HashMap<PortRef, usize>,
    edges: HashSet<(PortRef, PortRef)>,
    ranges: Vec<RangeBinding>,
}

impl ConnectionSet {
    /// Creates an empty connection set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects `requestor` to `responder`.
    ///
    /// # Arguments
    ///
    /// * `components` - The components both ends must belong to.
    /// * `requestor` - Port issuing requests over the new edge.
    /// * `responder` - Port serving them.
    ///
    /// # Returns
    ///
    /// The new connection's id, or:
    /// * `UnknownComponent` if either component is missing from `components`,
    /// * `UnknownPort` if either class does not declare the named port,
    /// * `IncompatiblePorts` for a self-loop or a role mismatch,
    /// * `AlreadyConnected` if either end is a `Single` port that is already in use, or
    ///   the exact same edge already exists.
    pub fn connect(
        &mut self,
        components: &ComponentSet,
        requestor: PortRef,
        responder: PortRef,
    ) -> Result<ConnectionId, BuildError> {
        let req_port = Self::declared_port(components, requestor)?;
        let resp_port = Self::declared_port(components, responder)?;

        if requestor.component == responder.component {
            return Err(BuildError::IncompatiblePorts {
                requestor,
                responder,
                reason: "both ends belong to the same component",
            });
        }
        if req_port.role != PortRole::Requestor {
            return Err(BuildError::IncompatiblePorts {
                requestor,
                responder,
                reason: "requesting end is not a requestor port",
            });
        }
        if resp_port.role != PortRole::Responder {
            return Err(BuildError::IncompatiblePorts {
                requestor,
                responder,
                reason: "serving end is not a responder port",
            });
        }
        for (end, port) in [(requestor, req_port), (responder, resp_port)] {
            if port.kind == PortKind::Single && self.is_connected(end) {
                return Err(BuildError::AlreadyConnected {
                    component: end.component,
                    port: end.port,
                });
            }
        }
        if !self.edges.insert((requestor, responder)) {
            return Err(BuildError::AlreadyConnected {
                component: requestor.component,
                port: requestor.port,
            });
        }

        let id = ConnectionId(self.connections.len());
        *self.usage.entry(requestor).or_insert(0) += 1;
        *self.usage.entry(responder).or_insert(0) += 1;
        self.connections.push(Connection {
            id,
            requestor,
            responder,
        });
        trace!(%requestor, %responder, "connected");
        Ok(id)
    }

    fn declared_port(components: &ComponentSet, end: PortRef) -> Result<&'static Port, BuildError> {
        components
            .lookup(end.component)?
            .port(end.port)
            .ok_or(BuildError::UnknownPort {
                component: end.component,
                port: end.port,
            })
    }

    /// Binds a memory controller to the address range it backs.
    ///
    /// # Returns
    ///
    /// `UnknownComponent` if `component` is missing, `InvalidParameter` if it is not a
    /// memory controller or the range overlaps another binding, or `AlreadyBound` if
    /// the controller already backs a range.
    pub fn bind_range(
        &mut self,
        components: &ComponentSet,
        component: ComponentId,
        range: AddrRange,
    ) -> Result<(), BuildError> {
        let descriptor = components.lookup(component)?;
        if descriptor.class() != ComponentClass::MemoryController {
            return Err(BuildError::invalid_parameter(
                component,
                ParamField::Size,
                range.to_string(),
                "only a memory controller can back an address range",
            ));
        }
        if let Some(bound) = self.range_of(component) {
            return Err(BuildError::AlreadyBound {
                component,
                range: bound,
            });
        }
        if let Some(other) = self.ranges.iter().find(|b| b.range.overlaps(&range)) {
            return Err(BuildError::invalid_parameter(
                component,
                ParamField::Size,
                range.to_string(),
                format!("overlaps {} backed by {}", other.range, other.component),
            ));
        }
        self.ranges.push(RangeBinding { component, range });
        trace!(%component, %range, "bound address range");
        Ok(())
    }

    /// Returns the connections in creation order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Returns the memory-range bindings in creation order.
    pub fn ranges(&self) -> &[RangeBinding] {
        &self.ranges
    }

    /// Returns the number of connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns whether no connection has been made.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Returns how many connections use `port`.
    pub fn connection_count(&self, port: PortRef) -> usize {
        self.usage.get(&port).copied().unwrap_or(0)
    }

    /// Returns whether `port` carries at least one connection.
    pub fn is_connected(&self, port: PortRef) -> bool {
        self.connection_count(port) > 0
    }

    /// Returns whether any connection touches `component`.
    pub fn touches(&self, component: ComponentId) -> bool {
        self.connections
            .iter()
            .any(|c| c.requestor.component == component || c.responder.component == component)
    }

    /// Iterates over the components `component` sends requests to.
    pub fn downstream(&self, component: ComponentId) -> impl Iterator<Item = ComponentId> + '_ {
        self.connections
            .iter()
            .filter(move |c| c.requestor.component == component)
            .map(|c| c.responder.component)
    }

    /// Returns whether `to` is reachable from `from` along requestor-to-responder edges.
    pub fn reaches(&self, from: ComponentId, to: ComponentId) -> bool {
        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            if current == to {
                return true;
            }
            for next in self.downstream(current) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    /// Returns the range bound to `component`, if any.
    pub fn range_of(&self, component: ComponentId) -> Option<AddrRange> {
        self.ranges
            .iter()
            .find(|b| b.component == component)
            .map(|b| b.range)
    }
}

impl Serialize for ConnectionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ConnectionSet", 2)?;
        state.serialize_field("connections", &self.connections)?;
        state.serialize_field("ranges", &self.ranges)?;
        state.end()
    }
}
