use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::budget::{Budget, BudgetReport};

/// Duplicate key handling policy for mappings.
///
/// Applies both to keys that are equal in the source text and to keys that only become
/// equal after tag handlers have run (for example two different `!env` keys resolving to
/// the same string).
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicateKeyPolicy {
    /// Error out on a duplicate key.
    Error,
    /// Keep the first entry, drop later ones.
    FirstWins,
    /// Later entries overwrite the value, keeping the original position.
    LastWins,
}

/// Limits applied to alias expansion to harden against alias bombs.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasLimits {
    /// Maximum number of nodes materialized by the dispatcher across the whole document,
    /// counting every alias expansion.
    pub max_total_expanded_nodes: usize,
    /// Maximum number of times a single anchor may be referenced via alias.
    /// Use `usize::MAX` for "unlimited".
    pub max_alias_expansions_per_anchor: usize,
}

impl Default for AliasLimits {
    fn default() -> Self {
        Self {
            max_total_expanded_nodes: 1_000_000,
            max_alias_expansions_per_anchor: usize::MAX,
        }
    }
}

/// Callback receiving the final budget report of a parse.
pub type BudgetReportCallback = Rc<RefCell<dyn FnMut(BudgetReport) + 'static>>;

/// Parser configuration options.
///
/// ```rust
/// use yaml12::options::DuplicateKeyPolicy;
///
/// let options = yaml12::options! {
///     budget: Some(yaml12::budget! { max_documents: 2 }),
///     duplicate_keys: DuplicateKeyPolicy::LastWins,
///     max_depth: 64,
/// };
/// let handlers = yaml12::TagHandlers::<yaml12::Error>::new();
/// let value = yaml12::parse_with_options("name: app\n", &handlers, options).unwrap();
/// assert_eq!(value["name"].as_str(), Some("app"));
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Optional budget enforced on the raw parser events.
    pub budget: Option<Budget>,
    /// Invoked with the final budget report, both on success and when the budget was breached.
    #[serde(skip)]
    pub budget_report: Option<BudgetReportCallback>,
    /// Policy for colliding mapping keys.
    pub duplicate_keys: DuplicateKeyPolicy,
    /// Limits for alias expansion.
    pub alias_limits: AliasLimits,
    /// Maximum nesting depth for composing, fingerprinting and dispatching. Default: 512.
    ///
    /// Flow collections (`[...]`, `{...}`) are also capped by the parser at
    /// [`FLOW_NESTING_LIMIT`](crate::FLOW_NESTING_LIMIT) levels; both limits are reported as
    /// [`Error::DepthExceeded`](crate::Error::DepthExceeded).
    pub max_depth: usize,
    /// If true (default), errors carrying a location are wrapped with a rendered snippet
    /// of the input.
    pub with_snippet: bool,
    /// Horizontal crop radius (in characters) for snippets. `0` disables snippets.
    pub crop_radius: usize,
}

impl Options {
    /// Registers a budget-report callback. The closure may capture state.
    ///
    /// ```rust
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// let nodes = Rc::new(Cell::new(0));
    /// let seen = nodes.clone();
    /// let options = yaml12::Options::default()
    ///     .with_budget_report(move |report| seen.set(report.nodes));
    /// let handlers = yaml12::TagHandlers::<yaml12::Error>::new();
    /// yaml12::parse_with_options("[1, 2]", &handlers, options).unwrap();
    /// assert_eq!(nodes.get(), 3);
    /// ```
    pub fn with_budget_report<F>(mut self, cb: F) -> Self
    where
        F: FnMut(BudgetReport) + 'static,
    {
        self.budget_report = Some(Rc::new(RefCell::new(cb)));
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            budget: Some(Budget::default()),
            budget_report: None,
            duplicate_keys: DuplicateKeyPolicy::Error,
            alias_limits: AliasLimits::default(),
            max_depth: 512,
            with_snippet: true,
            crop_radius: 64,
        }
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("budget", &self.budget)
            .field(
                "budget_report",
                &if self.budget_report.is_some() { "set" } else { "none" },
            )
            .field("duplicate_keys", &self.duplicate_keys)
            .field("alias_limits", &self.alias_limits)
            .field("max_depth", &self.max_depth)
            .field("with_snippet", &self.with_snippet)
            .field("crop_radius", &self.crop_radius)
            .finish()
    }
}
