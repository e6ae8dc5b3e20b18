use std::{fmt, sync::OnceLock};

use log::{info, warn};

use crate::backend::{backend_ref::BackendRef, category::BackendCategory};

use super::{
    category_match::{exact_match, match_category, CategoryMatch},
    sort_key::SortKey,
};

/// Total order over the five backend categories; each appears exactly once
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriorityOrder {
    categories: [BackendCategory; 5],
}

impl PriorityOrder {
    pub fn categories(&self) -> &[BackendCategory] {
        &self.categories
    }

    /// Position of `category`, 0 is visited first
    pub fn rank(&self, category: BackendCategory) -> usize {
        self.categories
            .iter()
            .position(|c| *c == category)
            .unwrap_or(self.categories.len())
    }

    /// Stable sort by category rank; backends of the same category keep
    /// their scan order
    pub fn sort_backends(&self, backends: &mut [BackendRef]) {
        backends.sort_by_key(|backend| self.rank(backend.category()));
    }
}

impl Default for PriorityOrder {
    fn default() -> Self {
        Self {
            categories: BackendCategory::DEFAULT_ORDER,
        }
    }
}

impl fmt::Display for PriorityOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.categories.iter().map(|c| c.name()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// One note about how a configured entry was interpreted
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderDiagnostic {
    Corrected {
        entry: String,
        category: BackendCategory,
    },
    Ambiguous {
        entry: String,
        candidates: Vec<BackendCategory>,
    },
    Unrecognized {
        entry: String,
    },
    Duplicate {
        entry: String,
        category: BackendCategory,
    },
    Defaulted {
        category: BackendCategory,
    },
}

impl fmt::Display for OrderDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDiagnostic::Corrected { entry, category } => {
                write!(f, "'{}' interpreted as '{}'", entry, category)
            }
            OrderDiagnostic::Ambiguous { entry, candidates } => {
                let names: Vec<&str> = candidates.iter().map(|c| c.name()).collect();
                write!(f, "'{}' is ambiguous between {}, ignored", entry, names.join(", "))
            }
            OrderDiagnostic::Unrecognized { entry } => {
                write!(f, "'{}' matches no storage category, ignored", entry)
            }
            OrderDiagnostic::Duplicate { entry, category } => {
                write!(f, "'{}' repeats '{}', ignored", entry, category)
            }
            OrderDiagnostic::Defaulted { category } => {
                write!(f, "'{}' not configured, checked last", category)
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct OrderOutcome {
    pub order: PriorityOrder,
    pub diagnostics: Vec<OrderDiagnostic>,
}

/// Builds the category order from `(category name, sort key)` entries.
///
/// Never fails: unresolvable entries are dropped and unconfigured categories
/// are appended in [`BackendCategory::DEFAULT_ORDER`].
pub fn compute_order<K: AsRef<str>, V: AsRef<str>>(entries: &[(K, V)]) -> OrderOutcome {
    let mut diagnostics = Vec::new();
    let mut resolved: Vec<Option<BackendCategory>> = vec![None; entries.len()];
    let mut assigned: Vec<BackendCategory> = Vec::new();

    // exact names first, so a correctly spelled entry is never stolen by a
    // typo that happens to come earlier
    for (index, (name, _)) in entries.iter().enumerate() {
        let name = name.as_ref();
        if let Some(category) = exact_match(name, &BackendCategory::ALL) {
            if assigned.contains(&category) {
                diagnostics.push(OrderDiagnostic::Duplicate {
                    entry: name.to_string(),
                    category,
                });
            } else {
                assigned.push(category);
                resolved[index] = Some(category);
            }
        }
    }

    for (index, (name, _)) in entries.iter().enumerate() {
        let name = name.as_ref();
        if resolved[index].is_some() || exact_match(name, &BackendCategory::ALL).is_some() {
            continue;
        }

        let unassigned: Vec<BackendCategory> = BackendCategory::ALL
            .iter()
            .copied()
            .filter(|category| !assigned.contains(category))
            .collect();

        match match_category(name, &unassigned) {
            CategoryMatch::Exact(category) | CategoryMatch::Corrected { category, .. } => {
                diagnostics.push(OrderDiagnostic::Corrected {
                    entry: name.to_string(),
                    category,
                });
                assigned.push(category);
                resolved[index] = Some(category);
            }
            CategoryMatch::Ambiguous(candidates) => {
                diagnostics.push(OrderDiagnostic::Ambiguous {
                    entry: name.to_string(),
                    candidates,
                });
            }
            CategoryMatch::NoMatch => {
                diagnostics.push(OrderDiagnostic::Unrecognized {
                    entry: name.to_string(),
                });
            }
        }
    }

    let mut keyed: Vec<(SortKey, usize, BackendCategory)> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, (_, key))| {
            resolved[index].map(|category| (SortKey::parse(key.as_ref()), index, category))
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut ordered: Vec<BackendCategory> = keyed.into_iter().map(|(_, _, c)| c).collect();
    for category in BackendCategory::DEFAULT_ORDER {
        if !ordered.contains(&category) {
            ordered.push(category);
            diagnostics.push(OrderDiagnostic::Defaulted { category });
        }
    }

    let mut categories = BackendCategory::DEFAULT_ORDER;
    categories.copy_from_slice(&ordered);

    OrderOutcome {
        order: PriorityOrder { categories },
        diagnostics,
    }
}

/// Computes the category order from configuration once and keeps it for
/// the orderer's lifetime
pub struct PriorityOrderer {
    entries: Vec<(String, String)>,
    outcome: OnceLock<OrderOutcome>,
}

impl PriorityOrderer {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self {
            entries,
            outcome: OnceLock::new(),
        }
    }

    pub fn order(&self) -> PriorityOrder {
        self.outcome().order
    }

    pub fn diagnostics(&self) -> &[OrderDiagnostic] {
        &self.outcome().diagnostics
    }

    fn outcome(&self) -> &OrderOutcome {
        self.outcome.get_or_init(|| {
            let outcome = compute_order(self.entries.as_slice());
            for diagnostic in &outcome.diagnostics {
                match diagnostic {
                    OrderDiagnostic::Corrected { .. } | OrderDiagnostic::Defaulted { .. } => {
                        info!("PriorityOrderer: {}", diagnostic)
                    }
                    _ => warn!("PriorityOrderer: {}", diagnostic),
                }
            }
            info!("PriorityOrderer: storage priority {}", outcome.order);
            outcome
        })
    }
}
