use crate::{
    binding,
    context::Context,
    discovery::{Discovery, InventoryDiscovery},
    errors::BuildError,
    lifecycle,
    options::{BuildOptions, SweepBudget},
    resolver,
};

type PreBuildFn = Box<dyn FnOnce(&Context)>;

//////////////////////////////////////////////////////////////////////
///
/// A build consists of the following stages
/// 1. Discovery of all components at a location
/// 2. The pre build callback, e.g. to provide elements needed by constructors
/// 3. Construction of every component, see [resolver]
/// 4. Export, import and fill of fields, see [binding]
/// 5. Lifecycle hooks by priority, see [lifecycle]
///
/// The builder either initializes a new [Context] or attaches the newly
/// discovered components to an existing one.
pub struct ContextBuilder<D = InventoryDiscovery> {
    discovery: D,
    options: BuildOptions,
    pre_build: Option<PreBuildFn>,
}
impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::with_discovery(InventoryDiscovery)
    }
}
impl<D: Discovery> ContextBuilder<D> {
    pub fn with_discovery(discovery: D) -> Self {
        ContextBuilder {
            discovery,
            options: BuildOptions::default(),
            pre_build: None,
        }
    }

    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn budget(mut self, budget: SweepBudget) -> Self {
        self.options.budget = budget;
        self
    }

    pub fn diagnose(mut self, diagnose: bool) -> Self {
        self.options.diagnose = diagnose;
        self
    }

    /// Runs right before construction, with the context the components will be registered on
    pub fn pre_build<F: FnOnce(&Context) + 'static>(mut self, pre_build: F) -> Self {
        self.pre_build = Some(Box::new(pre_build));
        self
    }

    /// Builds a new context from the components at `location`
    pub fn initialize(self, location: &str) -> Result<Context, BuildError> {
        self.build(Context::new(), location)
    }

    /// Adds the components at `location` to an existing context
    ///
    /// Components and provided elements already in the context stay, unless a newly
    /// discovered component has the same type or an export uses the same name.
    /// Only the new components are bound and have their hooks run.
    pub fn attach(self, context: &Context, location: &str) -> Result<Context, BuildError> {
        self.build(context.clone(), location)
    }

    fn build(self, context: Context, location: &str) -> Result<Context, BuildError> {
        let ContextBuilder {
            discovery,
            options,
            pre_build,
        } = self;

        let descriptors = discovery.discover(location)?;
        tracing::debug!(
            "Discovered {} components at '{location}'",
            descriptors.len()
        );

        // Components may depend on the context itself
        context.register_component(context.clone());

        if let Some(pre_build) = pre_build {
            pre_build(&context);
        }

        let assembly = resolver::resolve(&context, &descriptors, &options)?;

        binding::export(&context, &assembly)?;
        binding::import(&context, &assembly)?;
        binding::fill(&context, &assembly)?;
        tracing::debug!("Bound fields of {} components", assembly.len());

        let hooks = lifecycle::run(&assembly)?;
        tracing::debug!("Ran {hooks} lifecycle hooks - build of '{location}' completed");

        Ok(context)
    }
}
