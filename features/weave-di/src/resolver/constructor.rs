use std::{fmt::Debug, sync::Arc};

use crate::{
    errors::ArgumentError,
    types::{DynError, Injectable, TypeInfo, Value},
};

/// A declared constructor parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub type_info: TypeInfo,
    /// Used for name based resolution against provided elements
    pub name: &'static str,
}
impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.type_info, self.name)
    }
}
impl Parameter {
    pub fn of<T: Injectable>(name: &'static str) -> Self {
        Parameter {
            type_info: TypeInfo::of::<T>(),
            name,
        }
    }
}

type BuildFn<T> = dyn Fn(&mut Arguments) -> Result<T, DynError> + Send + Sync;

/// The single constructor of a component
///
/// Parameters are resolved in declaration order and handed to the build
/// function as [Arguments], which must be read in the same order.
///
/// ```
/// use weave_di::Constructor;
/// # use std::sync::Arc;
/// # struct Logger;
/// struct Service {
///     logger: Arc<Logger>,
///     retries: Arc<u32>,
/// }
///
/// let constructor = Constructor::new(|args| {
///     Ok(Service {
///         logger: args.next()?,
///         retries: args.next()?,
///     })
/// })
/// .param::<Logger>("logger")
/// .param::<u32>("retries");
///
/// assert_eq!(constructor.parameters().len(), 2);
/// ```
pub struct Constructor<T> {
    parameters: Vec<Parameter>,
    build: Box<BuildFn<T>>,
}
impl<T> Debug for Constructor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Constructor").field(&self.parameters).finish()
    }
}

impl<T: Injectable> Constructor<T> {
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&mut Arguments) -> Result<T, DynError> + Send + Sync + 'static,
    {
        Constructor {
            parameters: Vec::new(),
            build: Box::new(build),
        }
    }

    /// A constructor without parameters
    pub fn from_fn<F>(build: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(move |_| Ok(build()))
    }

    /// Declares the next parameter
    pub fn param<P: Injectable>(mut self, name: &'static str) -> Self {
        self.parameters.push(Parameter::of::<P>(name));
        self
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub(crate) fn into_parts(self) -> (Vec<Parameter>, Box<BuildFn<T>>) {
        (self.parameters, self.build)
    }
}
impl<T: Injectable + Default> Default for Constructor<T> {
    fn default() -> Self {
        Self::new(|_| Ok(T::default()))
    }
}

/// Resolved constructor arguments, consumed in parameter order
#[derive(Debug)]
pub struct Arguments {
    values: Vec<Value>,
    position: usize,
}

impl Arguments {
    pub(crate) fn new(values: Vec<Value>) -> Self {
        Arguments {
            values,
            position: 0,
        }
    }

    /// Takes the next argument
    pub fn next<P: Injectable>(&mut self) -> Result<Arc<P>, ArgumentError> {
        let position = self.position;
        let value = self.values.get(position).ok_or(ArgumentError::Exhausted {
            position,
            count: self.values.len(),
        })?;

        let argument = value
            .downcast::<P>()
            .map_err(|actual| ArgumentError::TypeMismatch {
                position,
                requested: std::any::type_name::<P>(),
                actual,
            })?;

        self.position += 1;
        Ok(argument)
    }

    /// Number of arguments not taken yet
    pub fn remaining(&self) -> usize {
        self.values.len().saturating_sub(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_are_taken_in_order() {
        let mut args = Arguments::new(vec![Value::new(1_u8), Value::new("two".to_string())]);

        assert_eq!(*args.next::<u8>().unwrap(), 1);
        assert_eq!(args.remaining(), 1);
        assert_eq!(*args.next::<String>().unwrap(), "two");
        assert!(matches!(
            args.next::<u8>(),
            Err(ArgumentError::Exhausted {
                position: 2,
                count: 2
            })
        ));
    }

    #[test]
    fn mismatched_argument_is_not_consumed() {
        let mut args = Arguments::new(vec![Value::new(1_u8)]);

        assert!(matches!(
            args.next::<String>(),
            Err(ArgumentError::TypeMismatch { position: 0, .. })
        ));
        assert_eq!(*args.next::<u8>().unwrap(), 1);
    }

    #[test]
    fn constructor_declares_parameters_in_order() {
        let constructor = Constructor::<u64>::new(|args| Ok(*args.next::<u64>()? + 1))
            .param::<u64>("seed");

        assert_eq!(constructor.parameters(), &[Parameter::of::<u64>("seed")]);
        assert_eq!(constructor.parameters()[0].to_string(), "u64 seed");

        let (_, build) = constructor.into_parts();
        let mut args = Arguments::new(vec![Value::new(41_u64)]);
        assert_eq!(build(&mut args).unwrap(), 42);
    }
}
