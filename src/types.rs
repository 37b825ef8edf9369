//! Core data types for the dedication card studio.
//!
//! This module defines the card state shared by the interactive preview and
//! the export renderer, plus the small enums it is built from.

use serde::{Deserialize, Serialize};

/// Horizontal alignment applied to every laid-out text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Lines anchor at the left padding edge
    Left,
    /// Lines center on the midpoint of the padded region
    Center,
    /// Lines anchor at the right padding edge
    Right,
}

impl Alignment {
    /// All alignments in the order the controls panel offers them.
    pub const ALL: [Alignment; 3] = [Alignment::Left, Alignment::Center, Alignment::Right];

    /// Human-readable label for the controls panel.
    pub fn label(&self) -> &'static str {
        match self {
            Alignment::Left => "Left",
            Alignment::Center => "Center",
            Alignment::Right => "Right",
        }
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Alignment::Center
    }
}

/// Everything the user has chosen about the card.
///
/// This is the single source of truth: the preview and the export renderer
/// both re-derive their layout from it independently and never exchange
/// layout results. Mutated field-by-field by the controls panel; the only
/// other writer is the overflow controller, which may lower `font_size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedicationState {
    /// Dedication text; may contain explicit line breaks
    pub text: String,
    /// Font size in canonical units, defined at the canonical reference width
    pub font_size: u32,
    /// Key into the font catalog; resolved to a typeface by each backend
    pub font_family: String,
    /// Horizontal alignment of every line
    pub alignment: Alignment,
    /// Vertical anchor of the text block's center, as a percentage of card
    /// height measured from the top
    pub position_y: u32,
    /// Normalized music link (`spotify:type:id`), or empty when no code is
    /// attached; the raw pasted URL is never stored here
    pub spotify_uri: String,
}

impl Default for DedicationState {
    /// Card settings used before any persisted values exist.
    fn default() -> Self {
        Self {
            text: "Escribe tu dedicatoria aquí...".to_string(),
            font_size: 25,
            font_family: "times".to_string(),
            alignment: Alignment::Center,
            position_y: 75,
            spotify_uri: String::new(),
        }
    }
}

impl DedicationState {
    /// Counts whitespace-delimited words in the dedication text.
    ///
    /// # Returns
    ///
    /// The number of non-empty tokens; zero for empty or whitespace-only text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Whether a normalized music link is attached to the card.
    pub fn has_spotify_uri(&self) -> bool {
        !self.spotify_uri.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = DedicationState::default();

        assert_eq!(state.font_size, 25);
        assert_eq!(state.font_family, "times");
        assert_eq!(state.alignment, Alignment::Center);
        assert_eq!(state.position_y, 75);
        assert!(state.spotify_uri.is_empty());
        assert!(!state.text.is_empty());
    }

    #[test]
    fn test_word_count_basic() {
        let mut state = DedicationState::default();
        state.text = "para ti con todo mi amor".to_string();

        assert_eq!(state.word_count(), 6);
    }

    #[test]
    fn test_word_count_collapses_whitespace() {
        let mut state = DedicationState::default();
        state.text = "  hello \n\n world  \t again ".to_string();

        assert_eq!(state.word_count(), 3);
    }

    #[test]
    fn test_word_count_empty_and_whitespace_only() {
        let mut state = DedicationState::default();

        state.text = String::new();
        assert_eq!(state.word_count(), 0);

        state.text = "   \n \t ".to_string();
        assert_eq!(state.word_count(), 0);
    }

    #[test]
    fn test_has_spotify_uri() {
        let mut state = DedicationState::default();
        assert!(!state.has_spotify_uri());

        state.spotify_uri = "spotify:track:abc123".to_string();
        assert!(state.has_spotify_uri());
    }

    #[test]
    fn test_alignment_serializes_lowercase() {
        let json = serde_json::to_string(&Alignment::Center).unwrap();
        assert_eq!(json, "\"center\"");

        let parsed: Alignment = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(parsed, Alignment::Right);
    }

    #[test]
    fn test_state_survives_json_roundtrip() {
        let mut state = DedicationState::default();
        state.text = "feliz cumpleaños\n\ncon cariño".to_string();
        state.alignment = Alignment::Left;
        state.position_y = 60;

        let json = serde_json::to_string(&state).unwrap();
        let restored: DedicationState = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, state);
    }

    #[test]
    fn test_state_fills_missing_fields_with_defaults() {
        let restored: DedicationState = serde_json::from_str(r#"{"text":"hola"}"#).unwrap();

        assert_eq!(restored.text, "hola");
        assert_eq!(restored.font_size, 25);
        assert_eq!(restored.alignment, Alignment::Center);
    }
}
