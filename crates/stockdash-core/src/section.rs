//! Declarative section tables and their assembly into chart groups.
//!
//! A [`SectionDefinition`] lists, in display order, which leaves of a payload
//! should be charted and under which label. [`assemble`] applies the tables to
//! a payload and returns one [`AssembledSection`] per definition, in the same
//! order, so chart layout stays stable across re-renders.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{NestedRecord, PathSpec, resolve};
use crate::series::{TimeSeries, normalize};

/// One labelled leaf of a section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionEntry {
    /// Chart label.
    pub label: String,
    /// Location of the date-keyed mapping in the payload.
    pub path: PathSpec,
}

impl SectionEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(label: impl Into<String>, path: PathSpec) -> Self {
        Self {
            label: label.into(),
            path,
        }
    }
}

/// A titled, ordered list of entries to chart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDefinition {
    /// Section heading.
    pub title: String,
    /// Entries in display order.
    pub entries: Vec<SectionEntry>,
}

impl SectionDefinition {
    /// Creates an empty section with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
        }
    }

    /// Appends an entry.
    #[must_use]
    pub fn with_entry(mut self, label: impl Into<String>, path: PathSpec) -> Self {
        self.entries.push(SectionEntry::new(label, path));
        self
    }
}

/// A section after its entries have been resolved against a payload.
///
/// Entries whose series came out empty are not present.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AssembledSection {
    /// Section heading.
    pub title: String,
    /// Labelled series in declared order.
    pub series: Vec<(String, TimeSeries)>,
}

impl AssembledSection {
    /// Returns true if no entry produced any data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Looks up a series by its label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&TimeSeries> {
        self.series
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, s)| s)
    }

    /// Returns the labels in display order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|(l, _)| l.as_str())
    }
}

/// Resolves one entry to its series. Absent or non-object leaves give an
/// empty series.
#[must_use]
pub fn resolve_series(record: &NestedRecord, path: &PathSpec) -> TimeSeries {
    match resolve(record, path) {
        Some(Value::Object(map)) => normalize(map),
        _ => TimeSeries::new(),
    }
}

/// Applies `defs` to `record`.
///
/// Every definition yields a section, even one whose entries are all empty;
/// within a section, empty entries are dropped and the rest keep their
/// declared order.
#[must_use]
pub fn assemble(record: &NestedRecord, defs: &[SectionDefinition]) -> Vec<AssembledSection> {
    defs.iter()
        .map(|def| AssembledSection {
            title: def.title.clone(),
            series: def
                .entries
                .iter()
                .filter_map(|entry| {
                    let series = resolve_series(record, &entry.path);
                    (!series.is_empty()).then(|| (entry.label.clone(), series))
                })
                .collect(),
        })
        .collect()
}

/// Drops sections that ended up with no series at all.
#[must_use]
pub fn visible_sections(sections: Vec<AssembledSection>) -> Vec<AssembledSection> {
    sections.into_iter().filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(keys: &[&str]) -> PathSpec {
        PathSpec::new(keys.iter().copied()).unwrap()
    }

    fn ratios() -> SectionDefinition {
        SectionDefinition::new("Ratios")
            .with_entry("Alpha", path(&["data", "alpha"]))
            .with_entry("Beta", path(&["data", "beta"]))
            .with_entry("Gamma", path(&["data", "gamma"]))
    }

    #[test]
    fn test_assemble_preserves_declared_order() {
        let record = json!({"data": {
            "gamma": {"2023-01-01": 3.0},
            "alpha": {"2023-01-01": 1.0},
            "beta": {"2023-01-01": 2.0}
        }});
        let sections = assemble(&record, &[ratios()]);
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections[0].labels().collect::<Vec<_>>(),
            vec!["Alpha", "Beta", "Gamma"]
        );
    }

    #[test]
    fn test_assemble_drops_empty_entries() {
        let record = json!({"data": {
            "alpha": {"2023-01-01": "n/a"},
            "beta": "unavailable",
            "gamma": {"2023-01-01": 3.0}
        }});
        let sections = assemble(&record, &[ratios()]);
        assert_eq!(sections[0].labels().collect::<Vec<_>>(), vec!["Gamma"]);
        assert!(sections[0].get("Alpha").is_none());
        assert_eq!(sections[0].get("Gamma").map(TimeSeries::len), Some(1));
    }

    #[test]
    fn test_assemble_emits_empty_sections() {
        let defs = vec![ratios(), SectionDefinition::new("Other")];
        let sections = assemble(&json!({}), &defs);
        assert_eq!(sections.len(), 2);
        assert!(sections.iter().all(AssembledSection::is_empty));
        assert_eq!(sections[1].title, "Other");

        assert!(visible_sections(sections).is_empty());
    }

    #[test]
    fn test_visible_sections_keeps_order() {
        let record = json!({"data": {"beta": {"2023-01-01": 2.0}}, "x": {"2023-01-01": 1.0}});
        let defs = vec![
            SectionDefinition::new("First").with_entry("X", path(&["x"])),
            SectionDefinition::new("Empty").with_entry("Y", path(&["y"])),
            ratios(),
        ];
        let visible = visible_sections(assemble(&record, &defs));
        let titles: Vec<_> = visible.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Ratios"]);
    }

    #[test]
    fn test_definitions_deserialize() {
        let def: SectionDefinition = serde_json::from_value(json!({
            "title": "Liquidity Analysis",
            "entries": [{"label": "Current Ratio", "path": ["Liquidity data", "Current ratio data"]}]
        }))
        .unwrap();
        assert_eq!(def.entries[0].path.len(), 2);
    }
}
