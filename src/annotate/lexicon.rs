use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};

use super::tokens::{is_word, tokenize};
use super::{AnnotatedSpan, Annotator, Category};
use crate::error::{Error, Result};

static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d{1,2}(?::\d{2})?(?:am|pm)$").unwrap());
static HOUR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,2}(?::\d{2})?$").unwrap());

const PLACES: &[&str] = &[
    "Africa", "Americas", "Antarctica", "APAC", "Asia", "Asia-Pacific", "Balkans", "Bay Area",
    "Caribbean", "Central America", "Central Europe", "East Coast", "Eastern Europe", "EMEA",
    "Europe", "LATAM", "LatAm", "Latin America", "Middle East", "Nordics", "North America",
    "Oceania", "Pacific Northwest", "Scandinavia", "South America", "Southeast Asia",
    "West Coast", "Western Europe",
];

const NATIONALITIES: &[&str] = &[
    "African", "American", "Argentinian", "Asian", "Australian", "Austrian", "Brazilian",
    "British", "Canadian", "Chinese", "Danish", "Dutch", "European", "Finnish", "French",
    "German", "Indian", "Irish", "Israeli", "Italian", "Japanese", "Korean", "Latin American",
    "Mexican", "Nordic", "Norwegian", "Polish", "Portuguese", "Scandinavian", "Spanish",
    "Swedish", "Swiss", "Ukrainian",
];

const GEOPOLITICAL: &[&str] = &[
    "Argentina", "Australia", "Austria", "Belgium", "Brazil", "Bulgaria", "Canada", "Chile",
    "China", "Colombia", "Croatia", "Czech Republic", "Czechia", "Denmark", "EEA", "Estonia",
    "EU", "E.U.", "European Union", "Finland", "France", "Germany", "Greece", "Hungary",
    "India", "Ireland", "Israel", "Italy", "Japan", "Latvia", "Lithuania", "Mexico",
    "Netherlands", "New Zealand", "Nigeria", "Norway", "Pakistan", "Philippines", "Poland",
    "Portugal", "Romania", "Serbia", "Singapore", "South Africa", "South Korea", "Spain",
    "Sweden", "Switzerland", "Turkey", "UK", "U.K.", "Ukraine", "United Kingdom",
    "United States", "United States of America", "US", "U.S.", "USA", "U.S.A.", "Vietnam",
    // cities
    "Amsterdam", "Austin", "Barcelona", "Berlin", "Boston", "Chicago", "Dublin", "Lisbon",
    "London", "Los Angeles", "Madrid", "Munich", "New York", "New York City", "NYC", "Paris",
    "San Francisco", "Seattle", "Stockholm", "Sydney", "Tel Aviv", "Tokyo", "Toronto",
    "Vancouver", "Warsaw", "Zurich",
    // states and provinces
    "Alberta", "British Columbia", "California", "Colorado", "Florida", "Massachusetts",
    "Ontario", "Oregon", "Quebec", "Texas", "Washington",
];

const TIME_ZONES: &[&str] = &[
    "AEDT", "AEST", "BST", "CDT", "CEST", "CET", "CST", "EDT", "EEST", "EET", "EST", "ET",
    "GMT", "HKT", "IST", "JST", "MDT", "MST", "MT", "NZST", "PDT", "PST", "PT", "SGT", "UTC",
    "WET",
];

/// Extra gazetteer entries, loaded from a JSON file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LexiconFile {
    pub place: Vec<String>,
    pub norp: Vec<String>,
    pub gpe: Vec<String>,
    pub time: Vec<String>,
    pub org: Vec<String>,
}

/// Gazetteer annotator: labels every unit of the longest known phrase that
/// starts at each position, plus clock times.
///
/// Matching is exact on surface case, so "US" is a country and "us" is not.
pub struct LexiconAnnotator {
    phrases: HashMap<String, BTreeSet<Category>>,
    /// Unit count of the longest phrase, bounding each lookup.
    max_units: usize,
}

impl Default for LexiconAnnotator {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LexiconAnnotator {
    pub fn builtin() -> Self {
        let mut annotator = LexiconAnnotator {
            phrases: HashMap::new(),
            max_units: 0,
        };
        annotator.extend(Category::Place, PLACES.iter().copied());
        annotator.extend(Category::NationalityOrGroup, NATIONALITIES.iter().copied());
        annotator.extend(Category::GeopoliticalEntity, GEOPOLITICAL.iter().copied());
        annotator.extend(Category::TimeExpression, TIME_ZONES.iter().copied());
        annotator
    }

    /// Built-in gazetteer extended with the entries of a lexicon file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::Lexicon {
            path: path.to_path_buf(),
            source,
        })?;
        let file: LexiconFile = serde_json::from_str(&raw).map_err(|source| Error::LexiconFormat {
            path: path.to_path_buf(),
            source,
        })?;

        let mut annotator = Self::builtin();
        let before = annotator.len();
        annotator.extend(Category::Place, file.place.iter().map(String::as_str));
        annotator.extend(Category::NationalityOrGroup, file.norp.iter().map(String::as_str));
        annotator.extend(Category::GeopoliticalEntity, file.gpe.iter().map(String::as_str));
        annotator.extend(Category::TimeExpression, file.time.iter().map(String::as_str));
        annotator.extend(Category::Organization, file.org.iter().map(String::as_str));
        info!(
            path = %path.display(),
            added = annotator.len().saturating_sub(before),
            "Loaded lexicon"
        );
        Ok(annotator)
    }

    /// Load the configured lexicon, or the built-in one when none is set.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::builtin()),
        }
    }

    fn len(&self) -> usize {
        self.phrases.len()
    }

    fn extend<'a>(&mut self, category: Category, entries: impl Iterator<Item = &'a str>) {
        for entry in entries {
            let units = tokenize(entry);
            if units.is_empty() {
                continue;
            }
            self.max_units = self.max_units.max(units.len());
            let key = phrase_key(&units);
            self.phrases.entry(key).or_default().insert(category);
        }
    }

    /// Longest known phrase starting at `start`, as (unit count, categories).
    fn longest_phrase(&self, units: &[AnnotatedSpan], start: usize) -> Option<(usize, &BTreeSet<Category>)> {
        let max = self.max_units.min(units.len() - start);
        (1..=max).rev().find_map(|n| {
            let key = phrase_key(&units[start..start + n]);
            self.phrases.get(&key).map(|cats| (n, cats))
        })
    }
}

impl Annotator for LexiconAnnotator {
    fn annotate(&self, text: &str) -> Vec<AnnotatedSpan> {
        let mut units = tokenize(text);
        let mut i = 0;

        while i < units.len() {
            if !is_word(&units[i]) {
                i += 1;
                continue;
            }

            if let Some((n, cats)) = self.longest_phrase(&units, i) {
                for unit in &mut units[i..i + n] {
                    unit.categories.extend(cats.iter().copied());
                }
                i += n;
                continue;
            }

            if CLOCK_RE.is_match(&units[i].text) {
                units[i].categories.insert(Category::TimeExpression);
            } else if HOUR_RE.is_match(&units[i].text) {
                // "9 am": the meridiem arrives as its own unit
                let meridiem = units
                    .get(i + 1)
                    .map(|u| u.text.to_lowercase())
                    .is_some_and(|t| t == "am" || t == "pm");
                if meridiem {
                    units[i].categories.insert(Category::TimeExpression);
                    units[i + 1].categories.insert(Category::TimeExpression);
                    i += 2;
                    continue;
                }
            }
            i += 1;
        }

        debug!(
            units = units.len(),
            labelled = units.iter().filter(|u| !u.categories.is_empty()).count(),
            "Annotated text"
        );
        units
    }
}

fn phrase_key(units: &[AnnotatedSpan]) -> String {
    units.iter().map(|u| u.text.as_str()).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn labelled(annotator: &LexiconAnnotator, text: &str) -> Vec<(String, Vec<Category>)> {
        annotator
            .annotate(text)
            .into_iter()
            .filter(|u| !u.categories.is_empty())
            .map(|u| (u.text, u.categories.into_iter().collect()))
            .collect()
    }

    #[test]
    fn countries_and_unions() {
        let a = LexiconAnnotator::builtin();
        let found = labelled(&a, "Remote work available for US and EU applicants.");
        assert_eq!(
            found,
            vec![
                ("US".to_string(), vec![Category::GeopoliticalEntity]),
                ("EU".to_string(), vec![Category::GeopoliticalEntity]),
            ]
        );
    }

    #[test]
    fn lowercase_pronoun_is_not_a_country() {
        let a = LexiconAnnotator::builtin();
        assert!(labelled(&a, "Join us, remote first").is_empty());
    }

    #[test]
    fn multi_word_phrase_labels_every_unit() {
        let a = LexiconAnnotator::builtin();
        let found = labelled(&a, "Remote within Latin America or New York City");
        let texts: Vec<&str> = found.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["Latin", "America", "New", "York", "City"]);
        assert_eq!(found[0].1, vec![Category::Place]);
        assert_eq!(found[2].1, vec![Category::GeopoliticalEntity]);
    }

    #[test]
    fn hyphenated_region() {
        let a = LexiconAnnotator::builtin();
        let texts: Vec<String> = labelled(&a, "Remote across Asia-Pacific").into_iter().map(|(t, _)| t).collect();
        assert_eq!(texts, vec!["Asia", "-", "Pacific"]);
    }

    #[test]
    fn time_expressions() {
        let a = LexiconAnnotator::builtin();
        let found = labelled(&a, "Remote, overlap 9am to 5 pm CET");
        let texts: Vec<&str> = found.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["9am", "5", "pm", "CET"]);
        assert!(found.iter().all(|(_, c)| c == &vec![Category::TimeExpression]));
    }

    #[test]
    fn nationality() {
        let a = LexiconAnnotator::builtin();
        let found = labelled(&a, "Remote for European residents");
        assert_eq!(found, vec![("European".to_string(), vec![Category::NationalityOrGroup])]);
    }

    #[test]
    fn worldwide_is_not_labelled() {
        let a = LexiconAnnotator::builtin();
        assert!(labelled(&a, "This is a remote position, open to candidates worldwide.").is_empty());
    }

    #[test]
    fn lexicon_file_extends_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"gpe": ["Gran Canaria"], "org": ["Acme"]}}"#).unwrap();
        let a = LexiconAnnotator::from_file(file.path()).unwrap();
        assert_eq!(a.len(), LexiconAnnotator::builtin().len() + 2);
        let found = labelled(&a, "Remote from Gran Canaria at Acme, or Spain");
        let texts: Vec<&str> = found.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["Gran", "Canaria", "Acme", "Spain"]);
        assert_eq!(found[2].1, vec![Category::Organization]);
    }

    #[test]
    fn possessive_does_not_hide_the_name() {
        let a = LexiconAnnotator::builtin();
        let found = labelled(&a, "Fully remote within Canada's time zones, or the EU’s.");
        let texts: Vec<&str> = found.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["Canada", "EU"]);
    }

    #[test]
    fn long_lexicon_entries_still_match() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"gpe": ["Saint Vincent and the Grenadines"]}}"#).unwrap();
        let a = LexiconAnnotator::from_file(file.path()).unwrap();
        let found = labelled(&a, "Remote from Saint Vincent and the Grenadines");
        let texts: Vec<&str> = found.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["Saint", "Vincent", "and", "the", "Grenadines"]);
    }

    #[test]
    fn missing_lexicon_is_an_error() {
        let err = LexiconAnnotator::load(Some(Path::new("/nonexistent/lexicon.json"))).err().unwrap();
        assert!(matches!(err, Error::Lexicon { .. }));
    }

    #[test]
    fn malformed_lexicon_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = LexiconAnnotator::from_file(file.path()).err().unwrap();
        assert!(matches!(err, Error::LexiconFormat { .. }));
    }
}
