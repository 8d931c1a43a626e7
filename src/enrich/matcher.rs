use std::collections::BTreeSet;

use crate::annotate::{AnnotatedSpan, Category};

/// Lexeme that triggers a location search, compared case-insensitively.
pub const CUE: &str = "remote";

/// Units searched on each side of a cue.
pub const WINDOW: usize = 5;

pub const LOCATION_CATEGORIES: &[Category] = &[
    Category::Place,
    Category::NationalityOrGroup,
    Category::GeopoliticalEntity,
    Category::TimeExpression,
];

/// Matched on surface text alone; annotators never label it.
pub const WORLDWIDE: &str = "worldwide";

/// Half-open range of unit indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub start: usize,
    pub end: usize,
}

/// Every unit equal to the cue, left to right.
pub fn find_cues(units: &[AnnotatedSpan]) -> Vec<Match> {
    units
        .iter()
        .enumerate()
        .filter(|(_, u)| u.text.to_lowercase() == CUE)
        .map(|(i, _)| Match { start: i, end: i + 1 })
        .collect()
}

/// Units from `window` before the match through `window` past its end,
/// inclusive, truncated at either edge of the text.
pub fn context_window(units: &[AnnotatedSpan], m: Match, window: usize) -> &[AnnotatedSpan] {
    let start = m.start.saturating_sub(window).min(units.len());
    let end = m.end.saturating_add(window).saturating_add(1).min(units.len());
    &units[start..end.max(start)]
}

/// Distinct surface texts in the window that indicate a location.
pub fn find_locations(window: &[AnnotatedSpan]) -> BTreeSet<&str> {
    window
        .iter()
        .filter(|u| u.has_any(LOCATION_CATEGORIES) || u.text.to_lowercase() == WORLDWIDE)
        .map(|u| u.text.as_str())
        .collect()
}
