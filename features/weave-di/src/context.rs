use std::{
    any::{type_name, TypeId},
    fmt::Debug,
    sync::Arc,
};

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::{
    errors::RequireError,
    types::{Injectable, Instance, TypeInfo, Value},
};

/// Registry of all constructed components and provided elements
///
/// Components are keyed by their type, one instance per type.
/// Provided elements are arbitrary values keyed by name.
/// Both maps keep insertion order, a replaced entry keeps its original position.
///
/// The handle is cheap to clone; all clones share the same maps.
/// Locks are only held for the duration of a single map operation.
#[derive(Clone, Default)]
pub struct Context(Arc<ContextInner>);

#[derive(Default)]
struct ContextInner {
    components: RwLock<IndexMap<TypeId, Instance>>,
    provided: RwLock<IndexMap<String, Value>>,
}
impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let components: Vec<_> = self
            .component_types()
            .into_iter()
            .map(|info| info.type_name)
            .collect();
        let provided: Vec<_> = self
            .0
            .provided
            .read()
            .iter()
            .map(|(name, value)| format!("{name}: {}", value.info.type_name))
            .collect();

        f.debug_struct("Context")
            .field("components", &components)
            .field("provided", &provided)
            .finish()
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `instance` as the component of type `T`, replacing any previous one
    pub fn register_component<T: Injectable>(&self, instance: T) {
        self.register_instance(Instance::new(instance));
    }

    pub fn register_shared<T: Injectable>(&self, instance: Arc<T>) {
        self.register_instance(Instance::from_arc(instance));
    }

    pub fn register_instance(&self, instance: Instance) {
        let info = instance.info();
        if self
            .0
            .components
            .write()
            .insert(info.type_id, instance)
            .is_some()
        {
            tracing::debug!("Replaced registered component {}", info.type_name);
        }
    }

    /// Returns the component of type `T` if one is registered
    pub fn component<T: Injectable>(&self) -> Option<Arc<T>> {
        self.instance(TypeId::of::<T>())?.downcast().ok()
    }

    /// Attempts to get the component of type `T`
    pub fn require<T: Injectable>(&self) -> Result<Arc<T>, RequireError> {
        match self.instance(TypeId::of::<T>()) {
            Some(instance) => {
                instance
                    .downcast()
                    .map_err(|actual_type| RequireError::DowncastFailed {
                        required_type: type_name::<T>(),
                        actual_type,
                    })
            }
            None => Err(RequireError::TypeMissing(type_name::<T>())),
        }
    }

    pub fn instance(&self, type_id: TypeId) -> Option<Instance> {
        self.0.components.read().get(&type_id).cloned()
    }

    /// Returns every component viewable as `Target`
    ///
    /// `Target` is either a concrete component type or an interface
    /// (e.g. `dyn Handler`) declared by the component. Results follow registration order.
    pub fn components<Target: ?Sized + 'static>(&self) -> Vec<Arc<Target>> {
        let target = TypeId::of::<Target>();
        let candidates: Vec<Instance> = self
            .0
            .components
            .read()
            .values()
            .filter(|instance| instance.is_viewable_as(target))
            .cloned()
            .collect();

        candidates
            .iter()
            .filter_map(|instance| instance.view::<Target>())
            .collect()
    }

    /// Types of all registered components in registration order
    pub fn component_types(&self) -> Vec<TypeInfo> {
        self.0
            .components
            .read()
            .values()
            .map(Instance::info)
            .collect()
    }

    pub fn contains_component(&self, type_id: TypeId) -> bool {
        self.0.components.read().contains_key(&type_id)
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.0.components.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.components.read().is_empty()
    }

    /// Stores `value` under `name`, the last write wins
    pub fn provide<V: Injectable>(&self, name: impl Into<String>, value: V) {
        self.provide_value(name, Value::new(value));
    }

    pub fn provide_shared<V: Injectable>(&self, name: impl Into<String>, value: Arc<V>) {
        self.provide_value(name, Value::from_arc(value));
    }

    pub fn provide_value(&self, name: impl Into<String>, value: Value) {
        let name = name.into();
        let info = value.info;
        if let Some(previous) = self.0.provided.write().insert(name.clone(), value) {
            tracing::debug!(
                "Provided element '{name}' replaced: {} -> {}",
                previous.info.type_name,
                info.type_name
            );
        }
    }

    /// Returns the element provided under `name` if it exists and is of type `V`
    pub fn provided<V: Injectable>(&self, name: &str) -> Option<Arc<V>> {
        self.provided_value(name)?.downcast().ok()
    }

    pub fn provided_value(&self, name: &str) -> Option<Value> {
        self.0.provided.read().get(name).cloned()
    }

    /// Returns the first provided element of type `V`, in provide order
    pub fn provided_by_type<V: Injectable>(&self) -> Option<Arc<V>> {
        self.provided_value_by_type(TypeId::of::<V>())?
            .downcast()
            .ok()
    }

    pub fn provided_value_by_type(&self, type_id: TypeId) -> Option<Value> {
        self.0
            .provided
            .read()
            .values()
            .find(|value| value.info.type_id == type_id)
            .cloned()
    }

    /// Names of all provided elements in provide order
    pub fn provided_names(&self) -> Vec<String> {
        self.0.provided.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Cache(u32);

    trait Named: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct Alpha;
    impl Named for Alpha {
        fn name(&self) -> &'static str {
            "alpha"
        }
    }

    struct Beta;
    impl Named for Beta {
        fn name(&self) -> &'static str {
            "beta"
        }
    }

    #[test]
    fn register_component_twice_keeps_latest() {
        let context = Context::new();
        context.register_component(Cache(1));
        context.register_component(Cache(2));

        assert_eq!(context.len(), 1);
        assert_eq!(*context.component::<Cache>().unwrap(), Cache(2));
    }

    #[test]
    fn missing_component_is_absent() {
        let context = Context::new();
        assert!(context.component::<Cache>().is_none());
        assert!(matches!(
            context.require::<Cache>(),
            Err(RequireError::TypeMissing(_))
        ));
    }

    #[test]
    fn components_by_interface() {
        use crate::types::Upcast;

        let context = Context::new();
        context.register_instance(Instance::with_upcasts(
            Arc::new(Alpha),
            vec![Upcast::new::<Alpha, dyn Named>(|a| a as Arc<dyn Named>)],
        ));
        context.register_instance(Instance::with_upcasts(
            Arc::new(Beta),
            vec![Upcast::new::<Beta, dyn Named>(|b| b as Arc<dyn Named>)],
        ));
        context.register_component(Cache(0));

        let names: Vec<_> = context
            .components::<dyn Named>()
            .iter()
            .map(|n| n.name())
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(context.components::<Cache>().len(), 1);
        assert!(context.components::<String>().is_empty());
    }

    #[test]
    fn provided_elements_last_write_wins() {
        let context = Context::new();
        context.provide("timeout", 10_u64);
        context.provide("timeout", 30_u64);

        assert_eq!(*context.provided::<u64>("timeout").unwrap(), 30);
        assert_eq!(context.provided_names(), vec!["timeout".to_string()]);
        assert!(context.provided::<String>("timeout").is_none());
        assert!(context.provided_value("missing").is_none());
    }

    #[test]
    fn provided_by_type_returns_first_in_provide_order() {
        let context = Context::new();
        context.provide("label", "first".to_string());
        context.provide("port", 8080_u16);
        context.provide("other", "second".to_string());

        assert_eq!(*context.provided_by_type::<String>().unwrap(), "first");
        assert_eq!(*context.provided_by_type::<u16>().unwrap(), 8080);
        assert!(context.provided_by_type::<u64>().is_none());
    }

    #[test]
    fn clones_share_state() {
        let context = Context::new();
        let clone = context.clone();
        clone.register_component(Cache(7));
        clone.provide("x", 1_i32);

        assert!(context.contains_component(TypeId::of::<Cache>()));
        assert_eq!(*context.provided::<i32>("x").unwrap(), 1);
        assert!(format!("{context:?}").contains("Cache"));
    }
}
