//! Inversion of control container
//!
//! Components are discovered at a module path, constructed exactly once with
//! their dependencies resolved from a shared [Context], bound to each other's
//! fields and finally started through prioritized lifecycle hooks.
//!
//! ```
//! mod app {
//!     use std::sync::Arc;
//!     use weave_di::{Component, Constructor};
//!
//!     #[derive(Default)]
//!     pub struct Logger;
//!     impl Component for Logger {
//!         fn constructor() -> Constructor<Self> {
//!             Constructor::default()
//!         }
//!     }
//!
//!     pub struct Service {
//!         pub logger: Arc<Logger>,
//!     }
//!     impl Component for Service {
//!         fn constructor() -> Constructor<Self> {
//!             Constructor::new(|args| Ok(Service { logger: args.next()? }))
//!                 .param::<Logger>("logger")
//!         }
//!     }
//!
//!     weave_di::register_component!(Logger, Service);
//! }
//!
//! fn main() {
//!     let context = weave_di::ContextBuilder::new()
//!         .initialize(&(module_path!().to_string() + "::app"))
//!         .unwrap();
//!     assert!(context.component::<app::Service>().is_some());
//! }
//! ```

pub mod binding;
pub mod builder;
pub mod component;
pub mod context;
pub mod controller;
pub mod dependency_graph;
pub mod discovery;
pub mod errors;
pub mod lifecycle;
pub mod options;
pub mod resolver;
pub mod types;

mod macros;
#[cfg(test)]
mod testing;

#[doc(hidden)]
pub use inventory;

pub use binding::{Export, Fill, Import, Slot};
pub use builder::ContextBuilder;
pub use component::{Component, ComponentDescriptor, Interface};
pub use context::Context;
pub use discovery::{Catalog, Discovery, InventoryDiscovery};
pub use errors::*;
pub use lifecycle::{Hook, Priority};
pub use options::{BuildOptions, SweepBudget};
pub use resolver::{Arguments, Constructor, Parameter};
pub use types::{DynError, Injectable, Instance, TypeInfo, Value};
