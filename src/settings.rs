//! Persisted card settings.
//!
//! Each state field lives under its own flat key in eframe's key-value
//! storage. Values are JSON-encoded so multi-line text, numbers, and enums
//! all round-trip through one code path. A missing or unreadable key falls
//! back to that field's default; there is no versioning, the shape is flat
//! and stable.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::DedicationState;

const KEY_TEXT: &str = "dedication.text";
const KEY_FONT_SIZE: &str = "dedication.font_size";
const KEY_FONT_FAMILY: &str = "dedication.font";
const KEY_ALIGNMENT: &str = "dedication.alignment";
const KEY_POSITION_Y: &str = "dedication.position_y";
const KEY_SPOTIFY_URI: &str = "dedication.spotify_uri";

fn read_field<T: DeserializeOwned>(storage: &dyn eframe::Storage, key: &str) -> Option<T> {
    let raw = storage.get_string(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring unreadable setting {}: {}", key, e);
            None
        }
    }
}

fn write_field<T: Serialize>(storage: &mut dyn eframe::Storage, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => storage.set_string(key, raw),
        Err(e) => log::warn!("could not encode setting {}: {}", key, e),
    }
}

/// Reads the persisted card state, falling back to defaults per field.
pub fn load(storage: &dyn eframe::Storage) -> DedicationState {
    let defaults = DedicationState::default();
    DedicationState {
        text: read_field(storage, KEY_TEXT).unwrap_or(defaults.text),
        font_size: read_field(storage, KEY_FONT_SIZE).unwrap_or(defaults.font_size),
        font_family: read_field(storage, KEY_FONT_FAMILY).unwrap_or(defaults.font_family),
        alignment: read_field(storage, KEY_ALIGNMENT).unwrap_or(defaults.alignment),
        position_y: read_field(storage, KEY_POSITION_Y).unwrap_or(defaults.position_y),
        spotify_uri: read_field(storage, KEY_SPOTIFY_URI).unwrap_or(defaults.spotify_uri),
    }
}

/// Writes every field of the card state to storage.
pub fn save(storage: &mut dyn eframe::Storage, state: &DedicationState) {
    write_field(storage, KEY_TEXT, &state.text);
    write_field(storage, KEY_FONT_SIZE, &state.font_size);
    write_field(storage, KEY_FONT_FAMILY, &state.font_family);
    write_field(storage, KEY_ALIGNMENT, &state.alignment);
    write_field(storage, KEY_POSITION_Y, &state.position_y);
    write_field(storage, KEY_SPOTIFY_URI, &state.spotify_uri);
}
