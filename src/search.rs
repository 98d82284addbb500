//! Substring search over serialized rule text, plus sort-key ordering.

use crate::rule::Rule;

/// Ordering applied to a filtered projection. Sorting never touches the
/// store's own order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    NewestFirst,
    OldestFirst,
    TitleAsc,
    TitleDesc,
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortMode::NewestFirst => write!(f, "newest"),
            SortMode::OldestFirst => write!(f, "oldest"),
            SortMode::TitleAsc => write!(f, "title-asc"),
            SortMode::TitleDesc => write!(f, "title-desc"),
        }
    }
}

impl std::str::FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(SortMode::NewestFirst),
            "oldest" => Ok(SortMode::OldestFirst),
            "title-asc" | "az" => Ok(SortMode::TitleAsc),
            "title-desc" | "za" => Ok(SortMode::TitleDesc),
            _ => Err(format!(
                "Invalid sort mode '{}'. Valid modes: newest, oldest, title-asc, title-desc",
                s
            )),
        }
    }
}

/// A rule matches when the lowercased term is a substring of its full
/// serialized JSON text. An empty term matches everything.
pub fn search(rules: &[Rule], term: &str) -> Vec<Rule> {
    let term = term.trim().to_lowercase();
    rules
        .iter()
        .filter(|r| term.is_empty() || haystack(r).contains(&term))
        .cloned()
        .collect()
}

fn haystack(rule: &Rule) -> String {
    serde_json::to_string(rule).unwrap_or_default().to_lowercase()
}

/// Stable sort of a projection. Ties keep the order the rules arrived in,
/// i.e. the store's original order.
pub fn sort_rules(mut rules: Vec<Rule>, mode: SortMode) -> Vec<Rule> {
    match mode {
        SortMode::NewestFirst => rules.sort_by(|a, b| b.date_added.cmp(&a.date_added)),
        SortMode::OldestFirst => rules.sort_by(|a, b| a.date_added.cmp(&b.date_added)),
        SortMode::TitleAsc => {
            rules.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        }
        SortMode::TitleDesc => {
            rules.sort_by(|a, b| b.title.to_lowercase().cmp(&a.title.to_lowercase()))
        }
    }
    rules
}

/// The displayed projection is always `sort(search(term), mode)`, recomputed
/// from the full store.
pub fn projection(rules: &[Rule], term: &str, mode: SortMode) -> Vec<Rule> {
    sort_rules(search(rules, term), mode)
}
