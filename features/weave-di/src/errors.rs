use std::sync::Arc;

use thiserror::Error;

use crate::{
    dependency_graph::DependencyGraphError,
    lifecycle::Priority,
    resolver::Parameter,
    types::{DynError, TypeInfo},
};

/// Errors returned by [ContextBuilder](crate::builder::ContextBuilder) and the
/// [controller](crate::controller) entry points
#[derive(Error, Debug, Clone)]
pub enum BuildError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    /// A constructor was called with all its arguments and returned an error
    #[error("Constructor for '{product}' failed - error: {error}")]
    ConstructorFailed {
        product: &'static str,
        error: Arc<DynError>,
    },
    /// `attach` was called before any context was initialized
    #[error("Context doesn't exist, call `initialize` before `attach`")]
    ContextMissing,
}

/// Errors while enumerating candidate components
#[derive(Error, Debug, Clone)]
pub enum DiscoveryError {
    #[error("'{0}' is not a valid module path")]
    InvalidLocation(String),
    #[error("No components are registered at or below '{0}'")]
    LocationNotFound(String),
    /// A custom discovery failed
    #[error("Discovery at '{location}' failed - error: {error}")]
    Source {
        location: String,
        error: Arc<DynError>,
    },
}

/// A component which could not be constructor-resolved
#[derive(Debug, Clone)]
pub struct UnresolvedComponent {
    pub component: TypeInfo,
    /// The full constructor signature
    pub parameters: Vec<Parameter>,
    /// Parameters which found no value in any resolution tier
    pub missing: Vec<Parameter>,
}
impl std::fmt::Display for UnresolvedComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let signature = join(&self.parameters);
        let missing = join(&self.missing);
        write!(
            f,
            "{}(Parameters: {signature}) - missing: [{missing}]",
            self.component
        )
    }
}

fn join(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Not every component could be constructed within the sweep budget
#[derive(Error, Debug, Clone)]
pub struct ResolutionError {
    /// Sweeps performed before giving up
    pub sweeps: usize,
    /// `None` if sweeping stopped because no progress was made
    pub budget: Option<usize>,
    pub unresolved: Vec<UnresolvedComponent>,
    /// Missing providers and cycles found among the unresolved components
    pub diagnosis: Vec<DependencyGraphError>,
}
impl std::fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        match self.budget {
            Some(budget) => display.push(format!(
                "{} component(s) could not be instantiated within {} of {budget} sweep(s):",
                self.unresolved.len(),
                self.sweeps
            )),
            None => display.push(format!(
                "{} component(s) could not be instantiated, sweep {} made no progress:",
                self.unresolved.len(),
                self.sweeps
            )),
        }
        for unresolved in &self.unresolved {
            display.push(format!("- {unresolved}"));
        }
        for finding in &self.diagnosis {
            display.push(format!("  * {finding}"));
        }
        f.write_str(&display.join("\n"))
    }
}
impl ResolutionError {
    pub fn is_unresolved(&self, component: TypeInfo) -> bool {
        self.unresolved.iter().any(|u| u.component == component)
    }
}

/// A field or method of a component could not be accessed through its erased instance
#[derive(Error, Debug, Clone)]
#[error("Could not access '{member}' of '{owner}': instance is '{actual}'")]
pub struct AccessError {
    pub member: &'static str,
    pub owner: TypeInfo,
    pub actual: TypeInfo,
}

/// Errors while exporting, importing or filling fields
#[derive(Error, Debug, Clone)]
pub enum BindingError {
    #[error(transparent)]
    Access(#[from] AccessError),
    /// A named value exists but has a different type than the field
    #[error("Field '{field}' of '{owner}' expects '{expected}' but '{name}' is '{actual}'")]
    TypeMismatch {
        field: &'static str,
        owner: TypeInfo,
        name: String,
        expected: TypeInfo,
        actual: TypeInfo,
    },
}

/// Errors while running lifecycle hooks
#[derive(Error, Debug, Clone)]
pub enum LifecycleError {
    #[error("Hook '{hook}' ({priority:?}) of '{owner}' failed - error: {error}")]
    HookFailed {
        hook: &'static str,
        owner: TypeInfo,
        priority: Priority,
        error: Arc<DynError>,
    },
    /// The hook could not be invoked on the instance
    #[error(transparent)]
    Invocation(#[from] AccessError),
}

/// Errors when trying to require a certain type from a [Context](crate::context::Context)
#[derive(Error, Debug, Clone)]
pub enum RequireError {
    /// The required type is not registered
    #[error("The required type '{0}' is not registered.")]
    TypeMissing(&'static str),

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

/// Errors when a constructor reads its [Arguments](crate::resolver::Arguments)
#[derive(Error, Debug, Clone)]
pub enum ArgumentError {
    #[error("Constructor requested argument #{position} but only {count} were declared")]
    Exhausted { position: usize, count: usize },
    #[error("Argument #{position} is '{actual}', requested '{requested}'")]
    TypeMismatch {
        position: usize,
        requested: &'static str,
        actual: &'static str,
    },
}
