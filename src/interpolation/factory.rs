//! Name → builder registry for interpolation methods.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::config::Config;
use crate::remap_error::MeshRemapError;
use crate::runtime::Runtime;

use super::finite_element::FiniteElement;
use super::knn::KNearestNeighbours;
use super::method::Method;

pub type MethodBuilder =
    fn(Arc<dyn Runtime>, &Config) -> Result<Box<dyn Method>, MeshRemapError>;

/// Process-lifetime registry of interpolation method builders.
pub struct MethodRegistry {
    builders: RwLock<HashMap<String, MethodBuilder>>,
}

static REGISTRY: Lazy<MethodRegistry> = Lazy::new(|| {
    let registry = MethodRegistry {
        builders: RwLock::new(HashMap::new()),
    };
    registry
        .register("finite-element", |rt, _cfg| {
            Ok(Box::new(FiniteElement::new(rt)))
        })
        .expect("empty registry");
    registry
        .register("k-nearest-neighbours", |rt, cfg| {
            Ok(Box::new(KNearestNeighbours::new(rt, cfg)?))
        })
        .expect("empty registry");
    registry
        .register("nearest-neighbour", |rt, _cfg| {
            Ok(Box::new(KNearestNeighbours::nearest_neighbour(rt)))
        })
        .expect("empty registry");
    registry
});

impl MethodRegistry {
    /// The global registry, pre-populated with the built-in methods.
    pub fn global() -> &'static MethodRegistry {
        &REGISTRY
    }

    /// Register a builder under `name`. Registering an existing name is an
    /// error; replacing a method silently would change behaviour at a
    /// distance.
    pub fn register(
        &self,
        name: impl Into<String>,
        builder: MethodBuilder,
    ) -> Result<(), MeshRemapError> {
        let name = name.into();
        let mut builders = self.builders.write();
        if builders.contains_key(&name) {
            return Err(MeshRemapError::DuplicateMethod(name));
        }
        builders.insert(name, builder);
        Ok(())
    }

    /// Build the method registered under `name`.
    pub fn build(
        &self,
        name: &str,
        runtime: Arc<dyn Runtime>,
        config: &Config,
    ) -> Result<Box<dyn Method>, MeshRemapError> {
        let builder = *self
            .builders
            .read()
            .get(name)
            .ok_or_else(|| MeshRemapError::UnknownMethod(name.to_owned()))?;
        builder(runtime, config)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.builders.read().keys().cloned().collect();
        names.sort();
        names
    }
}
