//! Finding the components to construct
//!
//! A location is a Rust module path such as `my_app::services`. It selects every
//! component registered in that module or any module below it.

use std::{any::TypeId, collections::HashSet};

use crate::{component::ComponentDescriptor, errors::DiscoveryError};

/// Enumerates the components available at a location
pub trait Discovery {
    fn discover(&self, location: &str) -> Result<Vec<ComponentDescriptor>, DiscoveryError>;
}

impl<F> Discovery for F
where
    F: Fn(&str) -> Result<Vec<ComponentDescriptor>, DiscoveryError>,
{
    fn discover(&self, location: &str) -> Result<Vec<ComponentDescriptor>, DiscoveryError> {
        self(location)
    }
}

/// Registration info for a component type collected via inventory
///
/// Created by [register_component!](crate::register_component).
pub struct Registration {
    pub module_path: &'static str,
    pub type_name: fn() -> &'static str,
    pub describe: fn() -> ComponentDescriptor,
}

inventory::collect!(Registration);

impl Registration {
    pub const fn new(
        module_path: &'static str,
        type_name: fn() -> &'static str,
        describe: fn() -> ComponentDescriptor,
    ) -> Self {
        Registration {
            module_path,
            type_name,
            describe,
        }
    }
}

/// Discovers components registered anywhere in the binary with
/// [register_component!](crate::register_component)
///
/// Results are ordered by module path, then type name.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryDiscovery;

impl Discovery for InventoryDiscovery {
    fn discover(&self, location: &str) -> Result<Vec<ComponentDescriptor>, DiscoveryError> {
        validate(location)?;

        let mut registrations: Vec<&Registration> = inventory::iter::<Registration>
            .into_iter()
            .filter(|registration| is_within(registration.module_path, location))
            .collect();
        registrations.sort_by_key(|registration| (registration.module_path, (registration.type_name)()));

        if registrations.is_empty() {
            return Err(DiscoveryError::LocationNotFound(location.to_string()));
        }

        let descriptors = registrations
            .into_iter()
            .map(|registration| (registration.describe)())
            .collect();
        Ok(deduplicate(descriptors))
    }
}

/// An explicit table of components by location, keeping insertion order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<(String, ComponentDescriptor)>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a component at `location`
    pub fn with<T: crate::component::Component>(mut self, location: impl Into<String>) -> Self {
        self.insert(location, T::descriptor());
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, descriptor: ComponentDescriptor) {
        self.entries.push((location.into(), descriptor));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Discovery for Catalog {
    fn discover(&self, location: &str) -> Result<Vec<ComponentDescriptor>, DiscoveryError> {
        validate(location)?;

        let descriptors: Vec<ComponentDescriptor> = self
            .entries
            .iter()
            .filter(|(path, _)| is_within(path, location))
            .map(|(_, descriptor)| descriptor.clone())
            .collect();

        if descriptors.is_empty() {
            return Err(DiscoveryError::LocationNotFound(location.to_string()));
        }
        Ok(deduplicate(descriptors))
    }
}

/// `path` is `location` itself or a module below it
fn is_within(path: &str, location: &str) -> bool {
    match path.strip_prefix(location) {
        Some(rest) => rest.is_empty() || rest.starts_with("::"),
        None => false,
    }
}

fn validate(location: &str) -> Result<(), DiscoveryError> {
    let valid = !location.is_empty()
        && location.split("::").all(|segment| {
            !segment.is_empty() && segment.chars().all(|c| c.is_alphanumeric() || c == '_')
        });

    match valid {
        true => Ok(()),
        false => Err(DiscoveryError::InvalidLocation(location.to_string())),
    }
}

/// Keeps the first descriptor of every type
fn deduplicate(descriptors: Vec<ComponentDescriptor>) -> Vec<ComponentDescriptor> {
    let mut seen = HashSet::<TypeId>::new();
    descriptors
        .into_iter()
        .filter(|descriptor| {
            let fresh = seen.insert(descriptor.info().type_id);
            if !fresh {
                tracing::debug!("Skipping duplicate registration of {}", descriptor.info());
            }
            fresh
        })
        .collect()
}
