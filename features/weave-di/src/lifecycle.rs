use std::sync::Arc;

use crate::{
    binding::AnyRef,
    errors::{AccessError, LifecycleError},
    resolver::Assembled,
    types::{DynError, Injectable},
};

/// Priority tier of a lifecycle hook
///
/// All hooks of a tier run, across all components, before any hook of the next tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Highest,
    High,
    #[default]
    Normal,
    Low,
    Lowest,
}

impl Priority {
    /// Every tier in execution order
    pub const ALL: [Priority; 5] = [
        Priority::Highest,
        Priority::High,
        Priority::Normal,
        Priority::Low,
        Priority::Lowest,
    ];
}

type HookFn<T> = dyn Fn(&T) -> Result<(), DynError> + Send + Sync;

/// A zero argument method run once the whole context is wired
pub struct Hook<T> {
    method: &'static str,
    priority: Priority,
    run: Box<HookFn<T>>,
}

impl<T: Injectable> Hook<T> {
    pub fn new<F>(method: &'static str, run: F) -> Self
    where
        F: Fn(&T) -> Result<(), DynError> + Send + Sync + 'static,
    {
        Hook {
            method,
            priority: Priority::default(),
            run: Box::new(run),
        }
    }

    /// A hook which can not fail
    pub fn infallible<F>(method: &'static str, run: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self::new(method, move |owner| {
            run(owner);
            Ok(())
        })
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub(crate) fn erase(self) -> HookPoint {
        let run = self.run;
        HookPoint {
            method: self.method,
            priority: self.priority,
            invoke: Box::new(move |owner: &AnyRef| owner.downcast_ref::<T>().map(|owner| run(owner))),
        }
    }
}

type ErasedInvoke = dyn Fn(&AnyRef) -> Option<Result<(), DynError>> + Send + Sync;

pub(crate) struct HookPoint {
    pub method: &'static str,
    pub priority: Priority,
    /// `None` if the instance is not of the declaring type
    invoke: Box<ErasedInvoke>,
}

/// Runs the hooks of all assembled components tier by tier
///
/// Within a tier components run in assembly (discovery) order.
/// The first failing hook aborts, later hooks and tiers are not run.
pub(crate) fn run(assembly: &[Assembled]) -> Result<usize, LifecycleError> {
    let mut invoked = 0;
    for priority in Priority::ALL {
        for assembled in assembly {
            let owner = assembled.descriptor.info();
            let hooks = assembled
                .descriptor
                .hooks()
                .iter()
                .filter(|hook| hook.priority == priority);

            for hook in hooks {
                tracing::debug!("Running {priority:?} hook {owner}.{}", hook.method);
                let result = (hook.invoke)(&*assembled.instance.value.value).ok_or(
                    AccessError {
                        member: hook.method,
                        owner,
                        actual: assembled.instance.info(),
                    },
                )?;

                result.map_err(|error| LifecycleError::HookFailed {
                    hook: hook.method,
                    owner,
                    priority,
                    error: Arc::new(error),
                })?;
                invoked += 1;
            }
        }
    }
    Ok(invoked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        component::{Component, ComponentDescriptor},
        resolver::Constructor,
        testing::assemble,
        types::Instance,
    };
    use parking_lot::Mutex;

    /// Journal shared by every hook, its entries record the run order
    static JOURNAL: Mutex<Vec<&'static str>> = parking_lot::const_mutex(Vec::new());

    #[derive(Default)]
    struct Early;
    impl Component for Early {
        fn constructor() -> Constructor<Self> {
            Constructor::default()
        }

        fn hooks() -> Vec<Hook<Self>> {
            vec![
                Hook::infallible("low", |_| JOURNAL.lock().push("early.low")).priority(Priority::Low),
                Hook::infallible("high", |_| JOURNAL.lock().push("early.high")).priority(Priority::High),
            ]
        }
    }

    #[derive(Default)]
    struct Late;
    impl Component for Late {
        fn constructor() -> Constructor<Self> {
            Constructor::default()
        }

        fn hooks() -> Vec<Hook<Self>> {
            vec![
                Hook::infallible("normal", |_| JOURNAL.lock().push("late.normal")),
                Hook::infallible("highest", |_| JOURNAL.lock().push("late.highest"))
                    .priority(Priority::Highest),
            ]
        }
    }

    #[derive(Default)]
    struct Broken;
    impl Component for Broken {
        fn constructor() -> Constructor<Self> {
            Constructor::default()
        }

        fn hooks() -> Vec<Hook<Self>> {
            vec![
                Hook::new("explode", |_| Err("boom".into())).priority(Priority::High),
                Hook::infallible("after", |_| panic!("must not run after a failed tier")),
            ]
        }
    }

    #[test]
    fn priority_tiers_run_in_order_across_components() {
        let assembly = vec![assemble(Early), assemble(Late)];

        JOURNAL.lock().clear();
        let invoked = run(&assembly).unwrap();
        let journal = std::mem::take(&mut *JOURNAL.lock());

        assert_eq!(invoked, 4);
        assert_eq!(
            journal,
            vec!["late.highest", "early.high", "late.normal", "early.low"]
        );
    }

    #[test]
    fn failing_hook_aborts_with_owner_and_method() {
        let assembly = vec![assemble(Broken)];

        let error = run(&assembly).unwrap_err();
        assert!(matches!(
            error,
            LifecycleError::HookFailed { hook: "explode", priority: Priority::High, owner, .. }
                if owner.type_name.ends_with("Broken")
        ));
    }

    #[test]
    fn hook_on_foreign_instance_is_an_invocation_error() {
        let assembled = Assembled {
            descriptor: ComponentDescriptor::of::<Broken>(),
            instance: Instance::new(Early),
        };

        let error = run(&[assembled]).unwrap_err();
        assert!(matches!(error, LifecycleError::Invocation(AccessError { member: "explode", .. })));
    }

    #[test]
    fn priorities_are_ordered() {
        let mut shuffled = vec![Priority::Low, Priority::Highest, Priority::Normal];
        shuffled.sort();
        assert_eq!(shuffled, vec![Priority::Highest, Priority::Normal, Priority::Low]);
    }
}
