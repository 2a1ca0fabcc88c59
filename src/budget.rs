//! Streaming YAML budget checker over the `saphyr-parser` event stream.
//!
//! The enforcer inspects raw parser events before any node is built, stopping
//! resource-amplifying inputs (event floods, alias storms, huge scalars) early.

use std::borrow::Cow;

use nohash_hasher::IntSet;
use saphyr_parser::{Event, Parser, ScanError};
use serde::{Deserialize, Serialize};

/// Budgets for a streaming YAML scan.
///
/// The defaults are permissive for configuration-sized inputs while stopping
/// obvious amplification attacks.
///
/// ```rust
/// let budget = yaml12::budget! {
///     max_documents: 1,
///     max_aliases: 10,
/// };
/// let options = yaml12::options! { budget: Some(budget) };
/// let handlers = yaml12::TagHandlers::<yaml12::Error>::new();
/// let value = yaml12::parse_with_options("a: 1\n", &handlers, options).unwrap();
/// assert_eq!(value["a"], yaml12::Value::Int(1));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Budget {
    /// Maximum total parser events (counting every event).
    ///
    /// Default: 1,000,000
    pub max_events: usize,
    /// Maximum number of alias (`*ref`) events allowed.
    ///
    /// Default: 50,000
    pub max_aliases: usize,
    /// Maximal total number of anchors (distinct `&anchor` definitions).
    ///
    /// Default: 50,000
    pub max_anchors: usize,
    /// Maximum structural nesting depth (sequences + mappings).
    ///
    /// Default: 2,000
    pub max_depth: usize,
    /// Maximum number of YAML documents in the stream.
    ///
    /// Default: 1,024
    pub max_documents: usize,
    /// Maximum number of nodes (sequence starts, mapping starts and scalars).
    ///
    /// Default: 250,000
    pub max_nodes: usize,
    /// Maximum total bytes of scalar contents.
    ///
    /// Default: 67,108,864 (64 MiB)
    pub max_total_scalar_bytes: usize,
    /// If `true`, reject inputs using many aliases relative to defined anchors.
    ///
    /// Default: true
    pub enforce_alias_anchor_ratio: bool,
    /// Minimum number of aliases before the ratio heuristic is evaluated.
    ///
    /// Default: 100
    pub alias_anchor_min_aliases: usize,
    /// A breach occurs when `aliases > alias_anchor_ratio_multiplier * anchors`.
    ///
    /// Default: 10
    pub alias_anchor_ratio_multiplier: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_events: 1_000_000,
            max_aliases: 50_000,
            max_anchors: 50_000,
            max_depth: 2_000,
            max_documents: 1_024,
            max_nodes: 250_000,
            max_total_scalar_bytes: 64 * 1024 * 1024,
            enforce_alias_anchor_ratio: true,
            alias_anchor_min_aliases: 100,
            alias_anchor_ratio_multiplier: 10,
        }
    }
}

/// What tripped the budget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BudgetBreach {
    /// Total parser events exceeded [`Budget::max_events`].
    Events { events: usize },
    /// Alias events exceeded [`Budget::max_aliases`].
    Aliases { aliases: usize },
    /// Distinct anchors exceeded [`Budget::max_anchors`].
    Anchors { anchors: usize },
    /// Nesting exceeded [`Budget::max_depth`].
    Depth { depth: usize },
    /// Documents exceeded [`Budget::max_documents`].
    Documents { documents: usize },
    /// Nodes exceeded [`Budget::max_nodes`].
    Nodes { nodes: usize },
    /// Scalar bytes exceeded [`Budget::max_total_scalar_bytes`].
    ScalarBytes { total_scalar_bytes: usize },
    /// Aliases outnumber anchors beyond the configured ratio.
    AliasAnchorRatio { aliases: usize, anchors: usize },
    /// A closing event arrived without a matching opening event.
    SequenceUnbalanced,
    /// Alias expansion materialized more than
    /// [`AliasLimits::max_total_expanded_nodes`](crate::options::AliasLimits) nodes.
    ExpandedNodes { nodes: usize },
    /// A single anchor was referenced more than
    /// [`AliasLimits::max_alias_expansions_per_anchor`](crate::options::AliasLimits) times.
    AnchorExpansions { anchor: usize, expansions: usize },
}

/// Counters collected during a scan, with the breach if one occurred.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BudgetReport {
    /// `Some(..)` if a limit was exceeded.
    pub breached: Option<BudgetBreach>,
    pub events: usize,
    pub aliases: usize,
    pub anchors: usize,
    pub documents: usize,
    pub nodes: usize,
    /// Deepest nesting reached.
    pub max_depth: usize,
    pub total_scalar_bytes: usize,
}

/// Stateful helper that enforces a [`Budget`] while consuming parser [`Event`]s.
#[derive(Debug)]
pub struct BudgetEnforcer {
    budget: Budget,
    report: BudgetReport,
    depth: usize,
    defined_anchors: IntSet<usize>,
}

impl BudgetEnforcer {
    pub fn new(budget: Budget) -> Self {
        Self {
            budget,
            report: BudgetReport::default(),
            depth: 0,
            defined_anchors: IntSet::default(),
        }
    }

    /// Observe one event; returns the breach as soon as a limit is exceeded.
    pub fn observe(&mut self, ev: &Event) -> Result<(), BudgetBreach> {
        self.report.events += 1;
        if self.report.events > self.budget.max_events {
            return Err(BudgetBreach::Events {
                events: self.report.events,
            });
        }

        match ev {
            Event::StreamStart | Event::StreamEnd | Event::DocumentEnd | Event::Nothing => {}
            Event::DocumentStart(_) => {
                self.report.documents += 1;
                if self.report.documents > self.budget.max_documents {
                    return Err(BudgetBreach::Documents {
                        documents: self.report.documents,
                    });
                }
            }
            Event::Alias(_) => {
                self.report.aliases += 1;
                if self.report.aliases > self.budget.max_aliases {
                    return Err(BudgetBreach::Aliases {
                        aliases: self.report.aliases,
                    });
                }
            }
            Event::Scalar(value, _, anchor_id, _) => {
                self.bump_nodes()?;
                let len = match value {
                    Cow::Borrowed(s) => s.len(),
                    Cow::Owned(s) => s.len(),
                };
                self.report.total_scalar_bytes = self.report.total_scalar_bytes.saturating_add(len);
                if self.report.total_scalar_bytes > self.budget.max_total_scalar_bytes {
                    return Err(BudgetBreach::ScalarBytes {
                        total_scalar_bytes: self.report.total_scalar_bytes,
                    });
                }
                self.record_anchor(*anchor_id)?;
            }
            Event::SequenceStart(anchor_id, _) | Event::MappingStart(anchor_id, _) => {
                self.bump_nodes()?;
                self.depth = self.depth.saturating_add(1);
                self.report.max_depth = self.report.max_depth.max(self.depth);
                if self.depth > self.budget.max_depth {
                    return Err(BudgetBreach::Depth { depth: self.depth });
                }
                self.record_anchor(*anchor_id)?;
            }
            Event::SequenceEnd | Event::MappingEnd => {
                self.depth = self
                    .depth
                    .checked_sub(1)
                    .ok_or(BudgetBreach::SequenceUnbalanced)?;
            }
        }
        Ok(())
    }

    fn bump_nodes(&mut self) -> Result<(), BudgetBreach> {
        self.report.nodes += 1;
        if self.report.nodes > self.budget.max_nodes {
            return Err(BudgetBreach::Nodes {
                nodes: self.report.nodes,
            });
        }
        Ok(())
    }

    fn record_anchor(&mut self, anchor_id: usize) -> Result<(), BudgetBreach> {
        if anchor_id != 0 && self.defined_anchors.insert(anchor_id) {
            let count = self.defined_anchors.len();
            if count > self.budget.max_anchors {
                self.report.anchors = count;
                return Err(BudgetBreach::Anchors { anchors: count });
            }
        }
        self.report.anchors = self.defined_anchors.len();
        Ok(())
    }

    /// Consume the enforcer after a breach, recording it in the report.
    pub fn into_report(mut self, breach: BudgetBreach) -> BudgetReport {
        self.report.anchors = self.defined_anchors.len();
        self.report.breached = Some(breach);
        self.report
    }

    /// Finish the scan, applying the alias/anchor ratio heuristic.
    pub fn finalize(mut self) -> BudgetReport {
        self.report.anchors = self.defined_anchors.len();
        if self.budget.enforce_alias_anchor_ratio
            && self.report.aliases >= self.budget.alias_anchor_min_aliases
            && (self.report.anchors == 0
                || self.report.aliases
                    > self.budget.alias_anchor_ratio_multiplier * self.report.anchors)
        {
            self.report.breached = Some(BudgetBreach::AliasAnchorRatio {
                aliases: self.report.aliases,
                anchors: self.report.anchors,
            });
        }
        self.report
    }
}

/// Check `input` against `budget` without building any nodes.
///
/// Returns `Ok(report)`; `report.breached.is_none()` means within budget.
/// Returns `Err(ScanError)` if the text is not lexically valid YAML.
pub fn check_yaml_budget(input: &str, budget: &Budget) -> Result<BudgetReport, ScanError> {
    let parser = Parser::new_from_str(input);
    let mut enforcer = BudgetEnforcer::new(budget.clone());

    for item in parser {
        let (ev, _span) = item?;
        if let Err(breach) = enforcer.observe(&ev) {
            return Ok(enforcer.into_report(breach));
        }
    }
    Ok(enforcer.finalize())
}
