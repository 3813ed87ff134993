//! What the model is told, and the per-tea payload it receives.

use serde::Serialize;

/// Characters of description sent per tea.
const DESCRIPTION_PROMPT_CHARS: usize = 300;

pub const SYSTEM_PROMPT: &str = "You write tasting notes for Resteeped, a tea discovery app. \
Sound like a friend who got deep into tea recently: opinionated, never precious.

Rules:
- 1 to 3 sentences per tea. Concise and specific.
- Name real flavors instead of vague praise.
- Add a practical tip when it helps (water temperature, food pairing, time of day).
- Never use: \"curated\", \"artisanal\", \"elevate\", \"premium\", \"experience\", \"journey\", \"indulge\".
- Lowercase energy, direct, no exclamation marks.
- Say so plainly when a tea is exceptional; \"just fine\" is an acceptable verdict.

You receive a JSON array of teas. Respond with a JSON object whose \"notes\" field is an \
array of objects with \"tea_id\" and \"note\" fields, one per tea. Copy each tea_id exactly.";

/// One tea as presented to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeaBrief {
    pub tea_id: i64,
    pub name: String,
    pub brand: String,
    #[serde(rename = "type")]
    pub tea_type: String,
    pub description: Option<String>,
    pub flavors: Vec<String>,
    pub steep_temp: Option<i32>,
    pub steep_time: Option<String>,
}

/// Renders the user message for a batch.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if serialization fails.
pub fn user_message(teas: &[TeaBrief]) -> Result<String, serde_json::Error> {
    serde_json::to_string(teas)
}

/// The description cut to the length sent in prompts.
#[must_use]
pub fn brief_description(description: Option<&str>) -> Option<String> {
    description.map(|d| d.chars().take(DESCRIPTION_PROMPT_CHARS).collect())
}

/// `"3-5 min"` from a steep-time range; `None` without a lower bound.
#[must_use]
pub fn steep_time_label(min: Option<i32>, max: Option<i32>) -> Option<String> {
    let min = min?;
    Some(match max {
        Some(max) if max != min => format!("{min}-{max} min"),
        _ => format!("{min} min"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steep_time_label_formats_ranges() {
        assert_eq!(steep_time_label(Some(3), Some(5)).as_deref(), Some("3-5 min"));
        assert_eq!(steep_time_label(Some(4), Some(4)).as_deref(), Some("4 min"));
        assert_eq!(steep_time_label(Some(2), None).as_deref(), Some("2 min"));
        assert!(steep_time_label(None, Some(5)).is_none());
    }

    #[test]
    fn brief_description_caps_length_on_char_boundary() {
        let long = "é".repeat(400);
        let brief = brief_description(Some(&long)).unwrap();
        assert_eq!(brief.chars().count(), DESCRIPTION_PROMPT_CHARS);
        assert!(brief_description(None).is_none());
    }

    #[test]
    fn user_message_uses_prompt_field_names() {
        let brief = TeaBrief {
            tea_id: 7,
            name: "Sencha".to_owned(),
            brand: "Numi".to_owned(),
            tea_type: "green".to_owned(),
            description: None,
            flavors: vec!["grassy".to_owned()],
            steep_temp: Some(175),
            steep_time: Some("2-3 min".to_owned()),
        };
        let json: serde_json::Value =
            serde_json::from_str(&user_message(&[brief]).unwrap()).unwrap();
        assert_eq!(json[0]["tea_id"], 7);
        assert_eq!(json[0]["type"], "green");
        assert_eq!(json[0]["steep_time"], "2-3 min");
    }
}
