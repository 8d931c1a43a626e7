pub mod lexicon;
pub mod tokens;

use std::collections::BTreeSet;
use std::fmt;

pub use lexicon::LexiconAnnotator;

/// Entity categories an annotator may attach to a unit of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Non-political places: continents, regions, bodies of water.
    Place,
    /// Nationalities, religious or political groups ("American", "European").
    NationalityOrGroup,
    /// Countries, cities, states, political unions.
    GeopoliticalEntity,
    /// Times smaller than a day, including time zones.
    TimeExpression,
    Organization,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Place => write!(f, "LOC"),
            Category::NationalityOrGroup => write!(f, "NORP"),
            Category::GeopoliticalEntity => write!(f, "GPE"),
            Category::TimeExpression => write!(f, "TIME"),
            Category::Organization => write!(f, "ORG"),
        }
    }
}

/// One annotated unit of a text. `start`/`end` are byte offsets into the
/// annotated string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedSpan {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub categories: BTreeSet<Category>,
}

impl AnnotatedSpan {
    pub fn new(text: &str, start: usize, end: usize) -> Self {
        AnnotatedSpan {
            text: text.to_string(),
            start,
            end,
            categories: BTreeSet::new(),
        }
    }

    #[cfg(test)]
    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.insert(category);
        self
    }

    pub fn has_any(&self, categories: &[Category]) -> bool {
        categories.iter().any(|c| self.categories.contains(c))
    }
}

/// Labels the units of a text with entity categories.
///
/// Implementations must be reentrant: one instance is shared across every
/// record of a batch, possibly from several threads.
pub trait Annotator: Send + Sync {
    fn annotate(&self, text: &str) -> Vec<AnnotatedSpan>;
}

/// Annotator that replays a fixed span list regardless of input text.
#[cfg(test)]
pub struct SpanAnnotator {
    pub spans: Vec<AnnotatedSpan>,
}

#[cfg(test)]
impl SpanAnnotator {
    /// Build spans from `(text, categories)` pairs, laying them out as if
    /// separated by single spaces.
    pub fn from_units(units: &[(&str, &[Category])]) -> Self {
        let mut offset = 0;
        let spans = units
            .iter()
            .map(|(text, cats)| {
                let mut span = AnnotatedSpan::new(text, offset, offset + text.len());
                span.categories.extend(cats.iter().copied());
                offset += text.len() + 1;
                span
            })
            .collect();
        SpanAnnotator { spans }
    }
}

#[cfg(test)]
impl Annotator for SpanAnnotator {
    fn annotate(&self, _text: &str) -> Vec<AnnotatedSpan> {
        self.spans.clone()
    }
}
