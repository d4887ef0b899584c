/// How many sweeps the resolver may make over components with parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SweepBudget {
    /// `ceil(components / 5) + 2` sweeps, assuming shallow dependency chains
    #[default]
    Heuristic,
    /// Exactly this many sweeps
    Fixed(usize),
    /// Sweep until a sweep constructs nothing new
    ///
    /// Never gives up on a graph that can still make progress, however deep it is.
    UntilStable,
}

impl SweepBudget {
    /// Sweep limit for `components` discovered components, `None` if unbounded
    pub fn sweeps(self, components: usize) -> Option<usize> {
        match self {
            SweepBudget::Heuristic => Some(components.div_ceil(5) + 2),
            SweepBudget::Fixed(sweeps) => Some(sweeps),
            SweepBudget::UntilStable => None,
        }
    }
}

/// Options of a single build
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub budget: SweepBudget,
    /// Analyse the dependency graph of unresolved components on failure
    pub diagnose: bool,
}
impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            budget: SweepBudget::default(),
            diagnose: true,
        }
    }
}
