use std::{
    any::{Any, TypeId},
    fmt::Debug,
    sync::Arc,
};

/// All errors must be Send + Sync so they can cross the build boundary
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Anything stored in a [Context](crate::context::Context) is shared behind an `Arc`
/// and may be read from any thread once the build has completed.
/// So anything injectable needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// Type-erased shared pointer, the storage form of every component and provided element
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// A shared value of any injectable type, together with its runtime type
#[derive(Clone)]
pub struct Value {
    pub info: TypeInfo,
    pub value: AnyArc,
}
impl Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Value").field(&self.info.type_name).finish()
    }
}

impl Value {
    pub fn new<T: Injectable>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Injectable>(value: Arc<T>) -> Self {
        Value {
            info: TypeInfo::of::<T>(),
            value,
        }
    }

    /// Whether the runtime type of this value is exactly `T`
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.info.type_id == TypeId::of::<T>()
    }

    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.value.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.info.type_name),
        }
    }
}

type UpcastFn = dyn Fn(&AnyArc) -> Option<Box<dyn Any>> + Send + Sync;

/// Converts an erased instance into an `Arc<Target>` boxed as `Any`
#[derive(Clone)]
pub(crate) struct Upcast {
    pub target: TypeInfo,
    cast: Arc<UpcastFn>,
}

impl Upcast {
    pub(crate) fn new<T, Target>(cast: fn(Arc<T>) -> Arc<Target>) -> Self
    where
        T: Injectable,
        Target: ?Sized + 'static,
    {
        Upcast {
            target: TypeInfo::of::<Target>(),
            cast: Arc::new(move |instance: &AnyArc| {
                let concrete = instance.clone().downcast::<T>().ok()?;
                Some(Box::new(cast(concrete)) as Box<dyn Any>)
            }),
        }
    }

    pub(crate) fn identity<T: Injectable>() -> Self {
        Self::new::<T, T>(|instance| instance)
    }
}

/// Instance of a Component
///
/// Besides the value itself it knows every type it can be viewed as:
/// its own type plus the interfaces its component declared.
#[derive(Clone)]
pub struct Instance {
    pub value: Value,
    upcasts: Arc<[Upcast]>,
}
impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let views: Vec<_> = self.upcasts.iter().map(|u| u.target.type_name).collect();
        f.debug_struct("Instance")
            .field("type", &self.value.info.type_name)
            .field("views", &views)
            .finish()
    }
}

impl Instance {
    pub fn new<T: Injectable>(instance: T) -> Self {
        Self::from_arc(Arc::new(instance))
    }

    pub fn from_arc<T: Injectable>(instance: Arc<T>) -> Self {
        Self::with_upcasts(instance, Vec::new())
    }

    /// The identity view is always added in front of `upcasts`
    pub(crate) fn with_upcasts<T: Injectable>(instance: Arc<T>, upcasts: Vec<Upcast>) -> Self {
        let mut views = Vec::with_capacity(upcasts.len() + 1);
        views.push(Upcast::identity::<T>());
        views.extend(upcasts);

        Instance {
            value: Value::from_arc(instance),
            upcasts: views.into(),
        }
    }

    pub fn info(&self) -> TypeInfo {
        self.value.info
    }

    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        self.value.downcast()
    }

    /// Views the instance as `Target`, which is either its own type or a declared interface
    pub fn view<Target: ?Sized + 'static>(&self) -> Option<Arc<Target>> {
        let target = TypeId::of::<Target>();
        let upcast = self.upcasts.iter().find(|u| u.target.type_id == target)?;
        let boxed = (upcast.cast)(&self.value.value)?;
        boxed.downcast::<Arc<Target>>().ok().map(|arc| *arc)
    }

    /// Whether [Instance::view] would succeed for the given type
    pub fn is_viewable_as(&self, target: TypeId) -> bool {
        self.upcasts.iter().any(|u| u.target.type_id == target)
    }
}
