//! Process wide entry points
//!
//! Holds the [Context] of the last successful [initialize]. Builds use
//! [InventoryDiscovery](crate::discovery::InventoryDiscovery) unless a builder is passed.

use parking_lot::RwLock;

use crate::{builder::ContextBuilder, context::Context, discovery::Discovery, errors::BuildError};

static CONTEXT: RwLock<Option<Context>> = parking_lot::const_rwlock(None);

/// Builds a new context from the components registered at `location`
///
/// The current context is only replaced if the build succeeds.
pub fn initialize(location: &str) -> Result<Context, BuildError> {
    initialize_with(ContextBuilder::new(), location)
}

pub fn initialize_with<D: Discovery>(
    builder: ContextBuilder<D>,
    location: &str,
) -> Result<Context, BuildError> {
    let context = builder.initialize(location)?;
    *CONTEXT.write() = Some(context.clone());
    Ok(context)
}

/// Adds the components registered at `location` to the current context
pub fn attach(location: &str) -> Result<Context, BuildError> {
    attach_with(ContextBuilder::new(), location)
}

pub fn attach_with<D: Discovery>(
    builder: ContextBuilder<D>,
    location: &str,
) -> Result<Context, BuildError> {
    let context = self::context().ok_or(BuildError::ContextMissing)?;
    builder.attach(&context, location)
}

/// The current context, `None` before the first successful [initialize]
pub fn context() -> Option<Context> {
    CONTEXT.read().clone()
}
