//! Field binding: values flowing into and out of constructed components
//!
//! Runs after every component has been constructed, in three passes over the
//! discovered components:
//! 1. Export: declared fields are read and published as provided elements
//! 2. Import: [Slot]s are written with the registered component of their type
//! 3. Fill: [Slot]s are written with the provided element of their name
//!
//! Import and fill are best effort. A missing component or element leaves the
//! slot empty instead of failing the build.

use std::{any::Any, fmt::Debug, sync::Arc};

use parking_lot::RwLock;

use crate::{
    context::Context,
    errors::{AccessError, BindingError},
    resolver::Assembled,
    types::{Injectable, TypeInfo, Value},
};

pub(crate) type AnyRef = dyn Any + Send + Sync;

/// A field written by the container after construction
///
/// Only the container binds a slot, components read it with [Slot::get].
pub struct Slot<V>(RwLock<Option<Arc<V>>>);
impl<V> Default for Slot<V> {
    fn default() -> Self {
        Slot(RwLock::new(None))
    }
}
impl<V: Debug> Debug for Slot<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Slot").field(&*self.0.read()).finish()
    }
}

impl<V: Injectable> Slot<V> {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<V>> {
        self.0.read().clone()
    }

    pub fn is_bound(&self) -> bool {
        self.0.read().is_some()
    }

    pub(crate) fn set(&self, value: Option<Arc<V>>) {
        *self.0.write() = value;
    }
}

type ReadFn<T> = dyn Fn(&T) -> Value + Send + Sync;
type WriteFn<T> = dyn Fn(&T, Option<&Value>) -> Result<(), TypeInfo> + Send + Sync;

fn slot_writer<T: Injectable, V: Injectable>(slot: fn(&T) -> &Slot<V>) -> Box<WriteFn<T>> {
    Box::new(move |owner: &T, value: Option<&Value>| -> Result<(), TypeInfo> {
        let value = match value {
            Some(value) => Some(value.downcast::<V>().map_err(|_| value.info)?),
            None => None,
        };
        slot(owner).set(value);
        Ok(())
    })
}

/// A field whose value is published under a name after construction
pub struct Export<T> {
    field: &'static str,
    name: Option<&'static str>,
    read: Box<ReadFn<T>>,
}

impl<T: Injectable> Export<T> {
    /// Exports a copy of the field value
    pub fn field<V, F>(field: &'static str, read: F) -> Self
    where
        V: Injectable,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        Export {
            field,
            name: None,
            read: Box::new(move |owner: &T| Value::new(read(owner))),
        }
    }

    /// Exports a field which is already shared
    pub fn shared<V, F>(field: &'static str, read: F) -> Self
    where
        V: Injectable,
        F: Fn(&T) -> Arc<V> + Send + Sync + 'static,
    {
        Export {
            field,
            name: None,
            read: Box::new(move |owner: &T| Value::from_arc(read(owner))),
        }
    }

    /// Publishes under `name` instead of the field identifier
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name.unwrap_or(self.field)
    }

    pub(crate) fn erase(self) -> ExportPoint {
        let name = self.name();
        let read = self.read;
        ExportPoint {
            field: self.field,
            name,
            read: Box::new(move |owner: &AnyRef| owner.downcast_ref::<T>().map(|owner| read(owner))),
        }
    }
}

/// A [Slot] bound to the registered component of its type
pub struct Import<T> {
    field: &'static str,
    target: TypeInfo,
    write: Box<WriteFn<T>>,
}

impl<T: Injectable> Import<T> {
    pub fn field<V: Injectable>(field: &'static str, slot: fn(&T) -> &Slot<V>) -> Self {
        Import {
            field,
            target: TypeInfo::of::<V>(),
            write: slot_writer(slot),
        }
    }

    pub(crate) fn erase(self) -> WritePoint {
        WritePoint::erase(self.field, self.field, self.target, self.write)
    }
}

/// A [Slot] bound to the provided element of its name
pub struct Fill<T> {
    field: &'static str,
    name: Option<&'static str>,
    target: TypeInfo,
    write: Box<WriteFn<T>>,
}

impl<T: Injectable> Fill<T> {
    pub fn field<V: Injectable>(field: &'static str, slot: fn(&T) -> &Slot<V>) -> Self {
        Fill {
            field,
            name: None,
            target: TypeInfo::of::<V>(),
            write: slot_writer(slot),
        }
    }

    /// Reads the element provided under `name` instead of the field identifier
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name.unwrap_or(self.field)
    }

    pub(crate) fn erase(self) -> WritePoint {
        WritePoint::erase(self.field, self.name(), self.target, self.write)
    }
}

type ErasedRead = dyn Fn(&AnyRef) -> Option<Value> + Send + Sync;
type ErasedWrite = dyn Fn(&AnyRef, Option<&Value>) -> Result<(), WriteFailure> + Send + Sync;

pub(crate) struct ExportPoint {
    pub field: &'static str,
    pub name: &'static str,
    read: Box<ErasedRead>,
}

pub(crate) enum WriteFailure {
    /// The instance is not of the declaring type
    Inaccessible,
    /// The value has another type than the slot
    Mismatch(TypeInfo),
}

pub(crate) struct WritePoint {
    pub field: &'static str,
    /// Lookup key, the field identifier for imports
    pub name: &'static str,
    pub target: TypeInfo,
    write: Box<ErasedWrite>,
}

impl WritePoint {
    fn erase<T: Injectable>(
        field: &'static str,
        name: &'static str,
        target: TypeInfo,
        write: Box<WriteFn<T>>,
    ) -> Self {
        WritePoint {
            field,
            name,
            target,
            write: Box::new(move |owner: &AnyRef, value: Option<&Value>| -> Result<(), WriteFailure> {
                let owner = owner
                    .downcast_ref::<T>()
                    .ok_or(WriteFailure::Inaccessible)?;
                write(owner, value).map_err(WriteFailure::Mismatch)
            }),
        }
    }
}

/// Publishes every export of every assembled component
pub(crate) fn export(context: &Context, assembly: &[Assembled]) -> Result<(), BindingError> {
    for assembled in assembly {
        let owner = assembled.instance.info();
        for point in assembled.descriptor.exports() {
            let value = (point.read)(&*assembled.instance.value.value).ok_or(AccessError {
                member: point.field,
                owner: assembled.descriptor.info(),
                actual: owner,
            })?;

            tracing::trace!("Exporting {owner}.{} as '{}'", point.field, point.name);
            context.provide_value(point.name, value);
        }
    }
    Ok(())
}

/// Writes every import slot from the registered components
pub(crate) fn import(context: &Context, assembly: &[Assembled]) -> Result<(), BindingError> {
    for assembled in assembly {
        for point in assembled.descriptor.imports() {
            let value = context
                .instance(point.target.type_id)
                .map(|instance| instance.value);
            if value.is_none() {
                tracing::debug!(
                    "No component '{}' for import {}.{}, leaving it empty",
                    point.target,
                    assembled.descriptor.info(),
                    point.field
                );
            }
            write(point, assembled, value.as_ref())?;
        }
    }
    Ok(())
}

/// Writes every fill slot from the provided elements
pub(crate) fn fill(context: &Context, assembly: &[Assembled]) -> Result<(), BindingError> {
    for assembled in assembly {
        for point in assembled.descriptor.fills() {
            let value = context.provided_value(point.name);
            if value.is_none() {
                tracing::debug!(
                    "Nothing provided as '{}' for fill {}.{}, leaving it empty",
                    point.name,
                    assembled.descriptor.info(),
                    point.field
                );
            }
            write(point, assembled, value.as_ref())?;
        }
    }
    Ok(())
}

fn write(
    point: &WritePoint,
    assembled: &Assembled,
    value: Option<&Value>,
) -> Result<(), BindingError> {
    let owner = assembled.descriptor.info();
    match (point.write)(&*assembled.instance.value.value, value) {
        Ok(()) => Ok(()),
        Err(WriteFailure::Inaccessible) => Err(AccessError {
            member: point.field,
            owner,
            actual: assembled.instance.info(),
        }
        .into()),
        Err(WriteFailure::Mismatch(actual)) => Err(BindingError::TypeMismatch {
            field: point.field,
            owner,
            name: point.name.to_string(),
            expected: point.target,
            actual,
        }),
    }
}
