//! Free-text validation rule translation
//!
//! Specification records carry validation rules as prose, e.g.
//! `"must be a maximum of 100 characters"` or
//! `"must match the pattern /^[A-Z]{2}\d+$/"`. Each matcher below looks for
//! one phrasing and yields a [`Constraint`]; phrasing no matcher recognises is
//! ignored. Translation never fails, it can only under-constrain.

use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use crate::schema::{SchemaKind, SchemaNode};

/// A schema constraint extracted from a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    MinLength(usize),
    MaxLength(usize),
    Pattern(String),
    UniqueItems,
}

type Matcher = fn(&str) -> Option<Constraint>;

/// Matchers in application order
const MATCHERS: &[Matcher] = &[length_bound, regex_pattern, uniqueness];

fn number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid regex"))
}

fn min_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bmin(imum)?\b").expect("valid regex"))
}

fn max_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bmax(imum)?\b").expect("valid regex"))
}

fn slashed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/(.+)/").expect("valid regex"))
}

/// `"... minimum 3 characters"` / `"... max 100 characters"`
pub fn length_bound(rule: &str) -> Option<Constraint> {
    if !rule.to_lowercase().contains("characters") {
        return None;
    }
    let length: usize = number().find(rule)?.as_str().parse().ok()?;

    if min_word().is_match(rule) {
        Some(Constraint::MinLength(length))
    } else if max_word().is_match(rule) {
        Some(Constraint::MaxLength(length))
    } else {
        None
    }
}

/// `"... pattern /regex/"` or `"... format /regex/"`
pub fn regex_pattern(rule: &str) -> Option<Constraint> {
    let lower = rule.to_lowercase();
    if !lower.contains("pattern") && !lower.contains("format") {
        return None;
    }
    let captured = slashed().captures(rule)?.get(1)?;
    Some(Constraint::Pattern(captured.as_str().to_string()))
}

/// `"... must be unique"`
pub fn uniqueness(rule: &str) -> Option<Constraint> {
    rule.to_lowercase().contains("unique").then_some(Constraint::UniqueItems)
}

/// Every constraint the matchers find in one rule
pub fn translate(rule: &str) -> Vec<Constraint> {
    MATCHERS.iter().filter_map(|matcher| matcher(rule)).collect()
}

/// Apply a constraint where the node kind supports it; otherwise a no-op
pub fn apply(schema: &mut SchemaNode, constraint: Constraint) {
    let kind = schema.type_name();
    match (&mut schema.kind, constraint) {
        (SchemaKind::String(s), Constraint::MinLength(n)) => s.min_length = Some(n),
        (SchemaKind::String(s), Constraint::MaxLength(n)) => s.max_length = Some(n),
        (SchemaKind::String(s), Constraint::Pattern(p)) => s.pattern = Some(p),
        (SchemaKind::Array(a), Constraint::UniqueItems) => a.unique_items = true,
        (_, constraint) => trace!(?constraint, kind, "Constraint does not apply"),
    }
}

/// Translate each rule and apply what it yields
pub fn apply_rules<'a>(schema: &mut SchemaNode, rules: impl IntoIterator<Item = &'a String>) {
    for rule in rules {
        for constraint in translate(rule) {
            apply(schema, constraint);
        }
    }
}
