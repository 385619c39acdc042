//! Free-text search over registry records
//!
//! A substring filter on names and descriptions, ranked by a simple score.

use serde::Serialize;

use crate::store::RecordStore;

/// Kind of record a hit refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Application,
    Module,
    Field,
}

impl SearchKind {
    fn route(&self) -> &'static str {
        match self {
            SearchKind::Application => "applications",
            SearchKind::Module => "modules",
            SearchKind::Field => "fields",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: SearchKind,
    pub reference: String,
    pub name: String,
    pub description: String,
    pub score: f64,
    /// Browse path, e.g. `/modules/site-details`
    pub path: String,
}

/// Relevance of `text` for `query`, 0 to 100
pub fn calculate_score(text: &str, query: &str) -> f64 {
    let text = text.to_lowercase();
    let query = query.to_lowercase();

    if text == query {
        return 100.0;
    }
    if text.starts_with(&query) {
        return 90.0;
    }
    if text.contains(&query) {
        return 70.0 + (query.chars().count() as f64 / text.chars().count() as f64) * 20.0;
    }

    let query_words: Vec<&str> = query.split_whitespace().collect();
    if query_words.is_empty() {
        return 0.0;
    }
    let text_words: Vec<&str> = text.split_whitespace().collect();
    let matched = query_words
        .iter()
        .filter(|q| text_words.iter().any(|t| t.contains(*q)))
        .count();

    matched as f64 / query_words.len() as f64 * 50.0
}

impl RecordStore {
    /// Application types, modules and fields whose name or description
    /// contains the query, best first. A blank query finds nothing.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();

        let candidates = self
            .application_types()
            .iter()
            .map(|a| (SearchKind::Application, &a.reference, &a.name, &a.description))
            .chain(
                self.modules()
                    .iter()
                    .map(|m| (SearchKind::Module, &m.reference, &m.name, &m.description)),
            )
            .chain(
                self.fields()
                    .iter()
                    .map(|f| (SearchKind::Field, &f.reference, &f.name, &f.description)),
            );

        let mut results: Vec<SearchResult> = candidates
            .filter(|(_, _, name, description)| {
                name.to_lowercase().contains(&needle) || description.to_lowercase().contains(&needle)
            })
            .map(|(kind, reference, name, description)| SearchResult {
                kind,
                reference: reference.clone(),
                name: name.clone(),
                description: description.clone(),
                score: calculate_score(&format!("{} {}", name, description), query),
                path: format!("/{}/{}", kind.route(), reference),
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results
    }
}
