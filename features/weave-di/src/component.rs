use std::{fmt::Debug, sync::Arc};

use crate::{
    binding::{Export, ExportPoint, Fill, Import, WritePoint},
    lifecycle::{Hook, HookPoint},
    resolver::{Arguments, Constructor, Parameter},
    types::{DynError, Injectable, Instance, TypeInfo, Upcast},
};

/// A type the container constructs exactly once and wires into a [Context](crate::context::Context)
///
/// Everything besides the constructor is optional.
///
/// ```
/// use std::sync::Arc;
/// use weave_di::{Component, Constructor, Export, Fill, Hook, Priority, Slot};
///
/// #[derive(Default)]
/// struct Logger;
/// impl Component for Logger {
///     fn constructor() -> Constructor<Self> {
///         Constructor::default()
///     }
/// }
///
/// struct Service {
///     logger: Arc<Logger>,
///     timeout: Slot<u64>,
/// }
/// impl Component for Service {
///     fn constructor() -> Constructor<Self> {
///         Constructor::new(|args| {
///             Ok(Service {
///                 logger: args.next()?,
///                 timeout: Slot::empty(),
///             })
///         })
///         .param::<Logger>("logger")
///     }
///
///     fn fills() -> Vec<Fill<Self>> {
///         vec![Fill::field("timeout", |service: &Service| &service.timeout)]
///     }
///
///     fn hooks() -> Vec<Hook<Self>> {
///         vec![Hook::infallible("start", |_| {}).priority(Priority::High)]
///     }
/// }
/// ```
pub trait Component: Injectable + Sized {
    /// The single constructor of this component
    fn constructor() -> Constructor<Self>;

    /// Fields published as provided elements after construction
    fn exports() -> Vec<Export<Self>> {
        Vec::new()
    }

    /// Slots bound to other components after construction
    fn imports() -> Vec<Import<Self>> {
        Vec::new()
    }

    /// Slots bound to provided elements after construction
    fn fills() -> Vec<Fill<Self>> {
        Vec::new()
    }

    /// Lifecycle hooks, run once the whole context is wired
    fn hooks() -> Vec<Hook<Self>> {
        Vec::new()
    }

    /// Additional types this component can be looked up as
    fn interfaces() -> Vec<Interface<Self>> {
        Vec::new()
    }

    /// Returns the type erased description of this component
    fn descriptor() -> ComponentDescriptor {
        ComponentDescriptor::of::<Self>()
    }
}

/// Allows looking up a component as `Arc<dyn Trait>` through
/// [Context::components](crate::context::Context::components)
///
/// The trait object type has to match exactly, `dyn Trait` and
/// `dyn Trait + Send + Sync` are different interfaces.
pub struct Interface<T> {
    upcast: Upcast,
    _component: std::marker::PhantomData<fn() -> T>,
}

impl<T: Injectable> Interface<T> {
    pub fn of<Target: ?Sized + 'static>(cast: fn(Arc<T>) -> Arc<Target>) -> Self {
        Interface {
            upcast: Upcast::new(cast),
            _component: std::marker::PhantomData,
        }
    }
}

type ConstructFn = dyn Fn(&mut Arguments) -> Result<Instance, DynError> + Send + Sync;

/// Type erased, immutable description of a [Component]
#[derive(Clone)]
pub struct ComponentDescriptor(Arc<DescriptorInner>);

struct DescriptorInner {
    info: TypeInfo,
    parameters: Vec<Parameter>,
    construct: Box<ConstructFn>,
    exports: Vec<ExportPoint>,
    imports: Vec<WritePoint>,
    fills: Vec<WritePoint>,
    hooks: Vec<HookPoint>,
}
impl Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = &self.0;
        f.debug_struct("ComponentDescriptor")
            .field("type", &inner.info.type_name)
            .field("parameters", &inner.parameters)
            .field("exports", &inner.exports.len())
            .field("imports", &inner.imports.len())
            .field("fills", &inner.fills.len())
            .field("hooks", &inner.hooks.len())
            .finish()
    }
}

impl ComponentDescriptor {
    pub fn of<T: Component>() -> Self {
        let (parameters, build) = T::constructor().into_parts();
        let upcasts: Vec<Upcast> = T::interfaces().into_iter().map(|i| i.upcast).collect();

        let construct = move |args: &mut Arguments| -> Result<Instance, DynError> {
            let instance = build(args)?;
            Ok(Instance::with_upcasts(Arc::new(instance), upcasts.clone()))
        };

        ComponentDescriptor(Arc::new(DescriptorInner {
            info: TypeInfo::of::<T>(),
            parameters,
            construct: Box::new(construct),
            exports: T::exports().into_iter().map(Export::erase).collect(),
            imports: T::imports().into_iter().map(Import::erase).collect(),
            fills: T::fills().into_iter().map(Fill::erase).collect(),
            hooks: T::hooks().into_iter().map(Hook::erase).collect(),
        }))
    }

    /// The type this descriptor constructs
    pub fn info(&self) -> TypeInfo {
        self.0.info
    }

    /// Constructor parameters in declaration order
    pub fn parameters(&self) -> &[Parameter] {
        &self.0.parameters
    }

    pub(crate) fn construct(&self, mut args: Arguments) -> Result<Instance, DynError> {
        (self.0.construct)(&mut args)
    }

    pub(crate) fn exports(&self) -> &[ExportPoint] {
        &self.0.exports
    }

    pub(crate) fn imports(&self) -> &[WritePoint] {
        &self.0.imports
    }

    pub(crate) fn fills(&self) -> &[WritePoint] {
        &self.0.fills
    }

    pub(crate) fn hooks(&self) -> &[HookPoint] {
        &self.0.hooks
    }
}
