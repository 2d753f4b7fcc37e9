//! Component factory.
//!
//! Creates typed descriptors from resolved parameters and keeps the set of
//! identities handed out during one build. A factory is owned by exactly one
//! assembly and dropped with it.

use std::collections::HashSet;

use tracing::debug;

use crate::common::error::{BuildError, ParamField};
use crate::params::{ComponentClass, ParameterSet};
use crate::soc::component::{ComponentDescriptor, ComponentId};

/// Instantiates component descriptors and enforces identity uniqueness.
#[derive(Debug, Default)]
pub struct ComponentFactory {
    created: HashSet<ComponentId>,
}

impl ComponentFactory {
    /// Creates a factory with an empty identity registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a descriptor of `class` with the given parameters and identity.
    ///
    /// The descriptor declares the class's full port list; every port starts
    /// unconnected.
    ///
    /// # Arguments
    ///
    /// * `class` - Class to instantiate.
    /// * `params` - Parameters resolved for `class`.
    /// * `id` - Identity of the new component; must name `class`.
    ///
    /// # Returns
    ///
    /// The new descriptor, `BuildError::InvalidParameter` if `params` or `id` belong
    /// to another class or the identity's core placement is impossible for the class,
    /// or `BuildError::DuplicateComponent` if `id` was already created by this factory.
    pub fn create(
        &mut self,
        class: ComponentClass,
        params: ParameterSet,
        id: ComponentId,
    ) -> Result<ComponentDescriptor, BuildError> {
        if params.class() != class {
            return Err(BuildError::invalid_parameter(
                id,
                ParamField::Class,
                params.class().name(),
                format!(
                    "parameters were resolved for {} but {class} was requested",
                    params.class()
                ),
            ));
        }
        if id.class() != class {
            return Err(BuildError::invalid_parameter(
                id,
                ParamField::Class,
                class.name(),
                format!("identity names a {}", id.class()),
            ));
        }
        if class.is_per_core() && id.core().is_none() {
            return Err(BuildError::invalid_parameter(
                id,
                ParamField::Class,
                class.name(),
                "per-core component needs a core index",
            ));
        }
        if class.is_system_wide() && id.core().is_some() {
            return Err(BuildError::invalid_parameter(
                id,
                ParamField::Class,
                class.name(),
                "system-wide component cannot belong to a core",
            ));
        }
        if !self.created.insert(id) {
            return Err(BuildError::DuplicateComponent(id));
        }

        debug!(%id, %class, "created component");
        Ok(ComponentDescriptor::new(id, params))
    }

    /// Returns the number of components created so far.
    pub fn created(&self) -> usize {
        self.created.len()
    }

    /// Returns whether `id` has already been created.
    pub fn has_created(&self, id: ComponentId) -> bool {
        self.created.contains(&id)
    }
}
