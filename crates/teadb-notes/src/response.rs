//! Pulling notes out of model output and tying them back to teas.
//!
//! Models are inconsistent about the wrapper: some return a bare array, some
//! an object keyed `notes` or `tasting_notes`, some an object with an
//! arbitrary key. Ids come back as numbers or strings, and occasionally
//! mangled, so name matching is the fallback.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use crate::error::NotesError;
use crate::prompt::TeaBrief;

/// A note as the model returned it, before matching.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawNote {
    #[serde(default)]
    pub tea_id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tea_name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// A note matched to a tea in the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedNote {
    pub tea_id: i64,
    pub tea_name: String,
    pub note: String,
}

/// Parses message content into raw notes.
///
/// Array elements that are not note objects are ignored. An object with no
/// array-valued field yields no notes.
///
/// # Errors
///
/// Returns [`NotesError::Parse`] if `content` is not JSON.
pub fn extract_notes(content: &str) -> Result<Vec<RawNote>, NotesError> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| NotesError::Parse(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let key = ["notes", "tasting_notes"]
                .into_iter()
                .find(|k| map.get(*k).is_some_and(Value::is_array))
                .map(str::to_owned)
                .or_else(|| {
                    map.iter()
                        .find(|(_, v)| v.is_array())
                        .map(|(k, _)| k.clone())
                });
            match key.and_then(|k| map.remove(&k)) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RawNote>(item).ok())
        .collect())
}

/// Matches raw notes to `batch` by id, then by exact name.
///
/// Blank notes, unmatched notes, and second notes for an already-matched
/// tea are dropped.
#[must_use]
pub fn match_notes(batch: &[TeaBrief], raw: Vec<RawNote>) -> Vec<GeneratedNote> {
    let mut seen = HashSet::new();
    let mut matched = Vec::with_capacity(raw.len());

    for note in raw {
        let Some(text) = note.note.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            continue;
        };

        let by_id = note
            .tea_id
            .as_ref()
            .and_then(id_of)
            .and_then(|id| batch.iter().find(|t| t.tea_id == id));
        let tea = by_id.or_else(|| {
            [note.name.as_deref(), note.tea_name.as_deref()]
                .into_iter()
                .flatten()
                .find_map(|name| batch.iter().find(|t| t.name == name))
        });

        let Some(tea) = tea else {
            tracing::debug!(tea_id = ?note.tea_id, name = ?note.name, "dropping unmatched note");
            continue;
        };

        if seen.insert(tea.tea_id) {
            matched.push(GeneratedNote {
                tea_id: tea.tea_id,
                tea_name: tea.name.clone(),
                note: text.to_owned(),
            });
        }
    }

    matched
}

fn id_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brief(id: i64, name: &str) -> TeaBrief {
        TeaBrief {
            tea_id: id,
            name: name.to_owned(),
            brand: "Numi".to_owned(),
            tea_type: "green".to_owned(),
            description: None,
            flavors: vec![],
            steep_temp: None,
            steep_time: None,
        }
    }

    #[test]
    fn bare_array_is_accepted() {
        let notes = extract_notes(r#"[{"tea_id": 1, "note": "grassy."}]"#).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].note.as_deref(), Some("grassy."));
    }

    #[test]
    fn notes_field_wins_over_other_arrays() {
        let content = r#"{"other": [{"note": "x"}], "notes": [{"tea_id": 2, "note": "y"}]}"#;
        let notes = extract_notes(content).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].note.as_deref(), Some("y"));
    }

    #[test]
    fn tasting_notes_field_is_accepted() {
        let content = r#"{"tasting_notes": [{"tea_id": "3", "note": "z"}]}"#;
        assert_eq!(extract_notes(content).unwrap().len(), 1);
    }

    #[test]
    fn first_array_field_is_the_fallback() {
        let content = r#"{"count": 1, "results": [{"tea_id": 4, "note": "w"}]}"#;
        assert_eq!(extract_notes(content).unwrap().len(), 1);
    }

    #[test]
    fn object_without_arrays_yields_nothing() {
        assert!(extract_notes(r#"{"error": "no"}"#).unwrap().is_empty());
    }

    #[test]
    fn non_object_elements_are_skipped() {
        let notes = extract_notes(r#"["text", 5, {"tea_id": 1, "note": "ok"}]"#).unwrap();
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(matches!(
            extract_notes("not json"),
            Err(NotesError::Parse(_))
        ));
    }

    #[test]
    fn matches_by_numeric_or_string_id() {
        let batch = [brief(10, "Sencha"), brief(11, "Bancha")];
        let raw = vec![
            RawNote {
                tea_id: Some(Value::from(11)),
                note: Some("toasty.".to_owned()),
                ..RawNote::default()
            },
            RawNote {
                tea_id: Some(Value::from("10")),
                note: Some("bright.".to_owned()),
                ..RawNote::default()
            },
        ];
        let matched = match_notes(&batch, raw);
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].tea_id, 11);
        assert_eq!(matched[1].tea_name, "Sencha");
    }

    #[test]
    fn mangled_id_falls_back_to_exact_name() {
        let batch = [brief(10, "Sencha"), brief(11, "Bancha")];
        let raw = vec![
            RawNote {
                tea_id: Some(Value::from("ten")),
                tea_name: Some("Bancha".to_owned()),
                note: Some("roasty.".to_owned()),
                ..RawNote::default()
            },
            RawNote {
                tea_id: Some(Value::from(999)),
                name: Some("sencha".to_owned()),
                note: Some("case differs, dropped.".to_owned()),
                ..RawNote::default()
            },
        ];
        let matched = match_notes(&batch, raw);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].tea_id, 11);
    }

    #[test]
    fn blank_and_duplicate_notes_are_dropped() {
        let batch = [brief(10, "Sencha")];
        let raw = vec![
            RawNote {
                tea_id: Some(Value::from(10)),
                note: Some("   ".to_owned()),
                ..RawNote::default()
            },
            RawNote {
                tea_id: Some(Value::from(10)),
                note: Some("first.".to_owned()),
                ..RawNote::default()
            },
            RawNote {
                tea_id: Some(Value::from(10)),
                note: Some("second.".to_owned()),
                ..RawNote::default()
            },
        ];
        let matched = match_notes(&batch, raw);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].note, "first.");
    }
}
