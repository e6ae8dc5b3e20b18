//! Typo-tolerant resolution of configured category names.
//!
//! Pure functions over an input string and a candidate set, so they can be
//! tested without any configuration loading.

use crate::backend::category::BackendCategory;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryMatch {
    /// Case-insensitive exact name
    Exact(BackendCategory),
    /// Unique longest common prefix
    Corrected {
        category: BackendCategory,
        prefix_len: usize,
    },
    /// Two or more candidates share the longest prefix
    Ambiguous(Vec<BackendCategory>),
    NoMatch,
}

pub fn exact_match(input: &str, candidates: &[BackendCategory]) -> Option<BackendCategory> {
    let input = input.trim();
    candidates
        .iter()
        .copied()
        .find(|category| category.name().eq_ignore_ascii_case(input))
}

/// Length in characters of the case-insensitive common prefix
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(a, b)| a.to_ascii_lowercase() == b.to_ascii_lowercase())
        .count()
}

/// Resolves `input` against `candidates`: exact name first, otherwise the
/// single candidate sharing the longest prefix with it.
pub fn match_category(input: &str, candidates: &[BackendCategory]) -> CategoryMatch {
    if let Some(category) = exact_match(input, candidates) {
        return CategoryMatch::Exact(category);
    }

    let input = input.trim();
    let scored: Vec<(BackendCategory, usize)> = candidates
        .iter()
        .map(|category| (*category, common_prefix_len(input, category.name())))
        .collect();

    let Some(best) = scored.iter().map(|(_, len)| *len).max() else {
        return CategoryMatch::NoMatch;
    };

    let leaders: Vec<BackendCategory> = scored
        .iter()
        .filter(|(_, len)| *len == best)
        .map(|(category, _)| *category)
        .collect();

    if leaders.len() > 1 {
        return CategoryMatch::Ambiguous(leaders);
    }
    if best == 0 {
        return CategoryMatch::NoMatch;
    }

    CategoryMatch::Corrected {
        category: leaders[0],
        prefix_len: best,
    }
}
