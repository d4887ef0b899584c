//! Constructor resolution
//!
//! Every discovered component is constructed exactly once. Constructor
//! parameters are resolved from three tiers, first match wins:
//! 1. the component registered (or staged) for the parameter type
//! 2. the provided element named like the parameter, if it has the parameter type
//! 3. the first provided element of the parameter type
//!
//! Components without parameters are constructed first. The remaining
//! components are swept repeatedly, each sweep constructing everything whose
//! parameters resolve, until all are constructed or the [SweepBudget] runs out.
//! Instances are staged and only registered on the [Context] once every
//! component has been constructed.

use std::{any::TypeId, sync::Arc};

use indexmap::IndexMap;

use crate::{
    component::ComponentDescriptor,
    context::Context,
    dependency_graph::DependencyGraph,
    errors::{BuildError, ResolutionError, UnresolvedComponent},
    options::{BuildOptions, SweepBudget},
    types::{Instance, Value},
};

mod constructor;

pub use constructor::{Arguments, Constructor, Parameter};

/// A constructed component next to its descriptor
#[derive(Clone, Debug)]
pub(crate) struct Assembled {
    pub descriptor: ComponentDescriptor,
    pub instance: Instance,
}

/// Where a parameter was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tier {
    Component,
    Name,
    Type,
}

/// Constructs all `descriptors` and registers them on `context`
///
/// Returns the constructed components in discovery order.
pub(crate) fn resolve(
    context: &Context,
    descriptors: &[ComponentDescriptor],
    options: &BuildOptions,
) -> Result<Vec<Assembled>, BuildError> {
    let mut resolver = Resolver::new(context, options.budget);
    resolver.construct_all(descriptors, options.diagnose)?;

    let assembly = resolver.commit(descriptors);
    tracing::debug!("Registered {} components", assembly.len());
    Ok(assembly)
}

struct Resolver<'a> {
    context: &'a Context,
    budget: SweepBudget,
    /// Constructed but not yet registered
    staged: IndexMap<TypeId, Assembled>,
}

impl<'a> Resolver<'a> {
    fn new(context: &'a Context, budget: SweepBudget) -> Self {
        Resolver {
            context,
            budget,
            staged: IndexMap::new(),
        }
    }

    fn construct_all(
        &mut self,
        descriptors: &[ComponentDescriptor],
        diagnose: bool,
    ) -> Result<(), BuildError> {
        let (independent, mut remaining): (Vec<_>, Vec<_>) = descriptors
            .iter()
            .partition(|descriptor| descriptor.parameters().is_empty());

        for descriptor in independent {
            self.construct(descriptor, Vec::new())?;
        }

        let budget = self.budget.sweeps(descriptors.len());
        let mut sweeps = 0;

        while !remaining.is_empty() {
            if budget.is_some_and(|budget| sweeps >= budget) {
                return Err(self.unresolved(&remaining, sweeps, budget, diagnose).into());
            }
            sweeps += 1;

            tracing::debug!(
                "Sweep {sweeps}: {} components left to construct",
                remaining.len()
            );

            let pending = std::mem::take(&mut remaining);
            let pending_count = pending.len();
            for descriptor in pending {
                match self.arguments(descriptor) {
                    Some(arguments) => self.construct(descriptor, arguments)?,
                    None => remaining.push(descriptor),
                }
            }

            if budget.is_none() && remaining.len() == pending_count {
                return Err(self.unresolved(&remaining, sweeps, budget, diagnose).into());
            }
        }

        Ok(())
    }

    fn construct(
        &mut self,
        descriptor: &ComponentDescriptor,
        arguments: Vec<Value>,
    ) -> Result<(), BuildError> {
        let info = descriptor.info();
        let instance = descriptor
            .construct(Arguments::new(arguments))
            .map_err(|error| BuildError::ConstructorFailed {
                product: info.type_name,
                error: Arc::new(error),
            })?;

        tracing::debug!("Constructed instance of {}", info.type_name);
        self.staged.insert(
            info.type_id,
            Assembled {
                descriptor: descriptor.clone(),
                instance,
            },
        );
        Ok(())
    }

    /// Resolves every parameter or returns `None` at the first one that does not resolve
    fn arguments(&self, descriptor: &ComponentDescriptor) -> Option<Vec<Value>> {
        descriptor
            .parameters()
            .iter()
            .map(|parameter| self.lookup(parameter).map(|(value, _)| value))
            .collect()
    }

    fn lookup(&self, parameter: &Parameter) -> Option<(Value, Tier)> {
        let type_id = parameter.type_info.type_id;

        let component = self
            .staged
            .get(&type_id)
            .map(|assembled| assembled.instance.clone())
            .or_else(|| self.context.instance(type_id));
        if let Some(instance) = component {
            tracing::trace!("Parameter '{parameter}' resolved to a component");
            return Some((instance.value, Tier::Component));
        }

        if let Some(value) = self
            .context
            .provided_value(parameter.name)
            .filter(|value| value.info.type_id == type_id)
        {
            tracing::trace!("Parameter '{parameter}' resolved by name");
            return Some((value, Tier::Name));
        }

        if let Some(value) = self.context.provided_value_by_type(type_id) {
            tracing::trace!("Parameter '{parameter}' resolved by type");
            return Some((value, Tier::Type));
        }

        None
    }

    fn unresolved(
        &self,
        remaining: &[&ComponentDescriptor],
        sweeps: usize,
        budget: Option<usize>,
        diagnose: bool,
    ) -> ResolutionError {
        let unresolved: Vec<UnresolvedComponent> = remaining
            .iter()
            .map(|descriptor| UnresolvedComponent {
                component: descriptor.info(),
                parameters: descriptor.parameters().to_vec(),
                missing: descriptor
                    .parameters()
                    .iter()
                    .filter(|parameter| self.lookup(parameter).is_none())
                    .copied()
                    .collect(),
            })
            .collect();

        let diagnosis = match diagnose {
            true => DependencyGraph::new(&unresolved)
                .check()
                .err()
                .map(|errors| errors.errors)
                .unwrap_or_default(),
            false => Vec::new(),
        };

        let error = ResolutionError {
            sweeps,
            budget,
            unresolved,
            diagnosis,
        };
        tracing::error!("{error}");
        error
    }

    /// Registers all staged instances on the context, in discovery order
    fn commit(mut self, descriptors: &[ComponentDescriptor]) -> Vec<Assembled> {
        let assembly: Vec<Assembled> = descriptors
            .iter()
            .filter_map(|descriptor| self.staged.shift_remove(&descriptor.info().type_id))
            .collect();
        for assembled in &assembly {
            self.context.register_instance(assembled.instance.clone());
        }
        assembly
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        component::Component,
        dependency_graph::DependencyGraphError,
        testing::{Cache, CacheUser, CycleA, CycleB, Logger, Service},
        types::TypeInfo,
    };

    fn build(context: &Context, descriptors: &[ComponentDescriptor]) -> Result<Vec<Assembled>, BuildError> {
        resolve(context, descriptors, &BuildOptions::default())
    }

    #[test]
    fn forward_references_resolve_in_later_sweeps() {
        let context = Context::new();
        build(&context, &[Service::descriptor(), Logger::descriptor()]).unwrap();

        let service = context.component::<Service>().unwrap();
        let logger = context.component::<Logger>().unwrap();
        assert!(Arc::ptr_eq(&service.logger, &logger));
    }

    #[test]
    fn assembly_follows_discovery_order() {
        let context = Context::new();
        let assembly = build(&context, &[Service::descriptor(), Logger::descriptor()]).unwrap();

        let order: Vec<_> = assembly.iter().map(|a| a.descriptor.info()).collect();
        assert_eq!(order, vec![TypeInfo::of::<Service>(), TypeInfo::of::<Logger>()]);
        assert_eq!(context.component_types(), order);
    }

    #[test]
    fn name_match_wins_over_type_match() {
        let context = Context::new();
        context.provide("fallback", Cache::new("fallback"));
        context.provide("cache", Cache::new("named"));

        build(&context, &[CacheUser::descriptor()]).unwrap();

        assert_eq!(context.component::<CacheUser>().unwrap().cache.label, "named");
    }

    #[test]
    fn type_match_is_used_without_name_match() {
        let context = Context::new();
        context.provide("something", Cache::new("by-type"));

        build(&context, &[CacheUser::descriptor()]).unwrap();

        assert_eq!(context.component::<CacheUser>().unwrap().cache.label, "by-type");
    }

    #[test]
    fn same_name_with_other_type_falls_through() {
        let context = Context::new();
        context.provide("cache", "not a cache".to_string());
        context.provide("real", Cache::new("by-type"));

        let resolver = Resolver::new(&context, SweepBudget::Heuristic);
        let parameter = Parameter::of::<Cache>("cache");
        let (value, tier) = resolver.lookup(&parameter).unwrap();

        assert_eq!(tier, Tier::Type);
        assert_eq!(value.downcast::<Cache>().unwrap().label, "by-type");
    }

    #[test]
    fn registered_component_wins_over_provided() {
        let context = Context::new();
        context.register_component(Cache::new("component"));
        context.provide("cache", Cache::new("named"));

        let resolver = Resolver::new(&context, SweepBudget::Heuristic);
        let (_, tier) = resolver.lookup(&Parameter::of::<Cache>("cache")).unwrap();
        assert_eq!(tier, Tier::Component);
    }

    #[test]
    fn cycle_fails_and_lists_both_components() {
        let context = Context::new();
        let error = build(&context, &[CycleA::descriptor(), CycleB::descriptor()]).unwrap_err();

        let BuildError::Resolution(error) = error else {
            panic!("expected a resolution error, got {error:?}");
        };
        assert!(error.is_unresolved(TypeInfo::of::<CycleA>()));
        assert!(error.is_unresolved(TypeInfo::of::<CycleB>()));
        assert_eq!(error.sweeps, 3);
        assert_eq!(error.budget, Some(3));
        assert!(error
            .diagnosis
            .iter()
            .any(|finding| matches!(finding, DependencyGraphError::CircularDependency { .. })));
        assert!(context.is_empty(), "nothing is registered on failure");
    }

    #[test]
    fn zero_parameter_component_survives_unsatisfiable_peers() {
        let context = Context::new();
        let error = build(
            &context,
            &[CycleA::descriptor(), Logger::descriptor(), CycleB::descriptor()],
        )
        .unwrap_err();

        let BuildError::Resolution(error) = error else {
            panic!("expected a resolution error, got {error:?}");
        };
        assert_eq!(error.unresolved.len(), 2);
        assert!(!error.is_unresolved(TypeInfo::of::<Logger>()));
    }

    #[test]
    fn unresolved_reports_missing_parameters() {
        let context = Context::new();
        let error = build(&context, &[CacheUser::descriptor()]).unwrap_err();

        let BuildError::Resolution(error) = error else {
            panic!("expected a resolution error, got {error:?}");
        };
        let unresolved = &error.unresolved[0];
        assert_eq!(unresolved.missing, vec![Parameter::of::<Cache>("cache")]);
        assert!(matches!(
            error.diagnosis.as_slice(),
            [DependencyGraphError::MissingDependency { parameter: "cache", .. }]
        ));
        assert!(error.to_string().contains("cache"));
    }

    #[test]
    fn until_stable_stops_when_no_progress_is_made() {
        let context = Context::new();
        let options = BuildOptions {
            budget: SweepBudget::UntilStable,
            diagnose: false,
        };
        let error = resolve(&context, &[CycleA::descriptor(), CycleB::descriptor()], &options)
            .unwrap_err();

        let BuildError::Resolution(error) = error else {
            panic!("expected a resolution error, got {error:?}");
        };
        assert_eq!(error.sweeps, 1);
        assert_eq!(error.budget, None);
        assert!(error.diagnosis.is_empty());
    }

    #[test]
    fn fixed_budget_of_zero_rejects_parameterized_components() {
        let context = Context::new();
        let options = BuildOptions {
            budget: SweepBudget::Fixed(0),
            ..Default::default()
        };
        let result = resolve(&context, &[Logger::descriptor(), Service::descriptor()], &options);

        assert!(matches!(result, Err(BuildError::Resolution(ResolutionError { sweeps: 0, .. }))));
    }

    #[test]
    fn constructor_failure_is_reported_with_product() {
        struct Faulty;
        impl Component for Faulty {
            fn constructor() -> Constructor<Self> {
                Constructor::new(|_| Err("no disk".into()))
            }
        }

        let context = Context::new();
        let error = build(&context, &[Faulty::descriptor()]).unwrap_err();

        assert!(matches!(
            error,
            BuildError::ConstructorFailed { product, .. } if product.ends_with("Faulty")
        ));
    }
}
