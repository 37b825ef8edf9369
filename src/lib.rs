//! # Dedication Studio
//!
//! An editor for personalized dedication cards: a fixed background artwork,
//! a freely styled message, and optionally the scannable code of a Spotify
//! track. The live preview and the high-resolution export feed the same
//! state through the same layout engine, so the saved card always matches
//! what the screen showed.
//!
//! ## Features
//! - In-place text editing directly on the card preview
//! - Font, size, alignment and vertical position controls
//! - Automatic one-step-per-frame size reduction when text overflows
//! - Spotify share link validation and scannable code placement
//! - 1200x1800 PNG export through a save dialog
//! - Settings persisted between sessions

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod constants;
mod types;
mod layout;
mod spotify;
mod fonts;
mod assets;
mod settings;
mod export;
mod ui;

// Re-export public types and functions
pub use layout::*;
pub use spotify::*;
pub use types::*;
use ui::DedicationApp;

use eframe::egui;

/// Runs the dedication editor with default settings.
///
/// This function starts a tokio runtime for background work (asset fetches
/// and exports), then initializes the egui application window and runs the
/// main event loop until the window closes.
///
/// # Returns
///
/// Returns `Ok(())` if the application runs successfully, or an error if
/// the runtime or the window cannot be initialized.
///
/// # Example
///
/// ```no_run
/// use dedication_studio::run_app;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     run_app()
/// }
/// ```
pub fn run_app() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    // Entered for the lifetime of the UI so widgets can spawn tasks.
    let _guard = runtime.enter();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1080.0, 780.0])
            .with_min_inner_size([760.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Creador de Dedicatorias",
        options,
        Box::new(|cc| Ok(Box::new(DedicationApp::new(cc)))),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_card_state() {
        let state = DedicationState::default();
        assert_eq!(state.font_size, 25);
        assert_eq!(state.alignment, Alignment::Center);
        assert_eq!(state.position_y, 75);
        assert!(!state.has_spotify_uri());
    }

    #[test]
    fn test_surfaces_share_the_scale_law() {
        // Two surfaces rendering the same state must agree once their
        // widths are normalized out.
        let base = 25.0;
        let narrow = effective_font_px(base, crate::constants::CANONICAL_WIDTH, 600.0);
        let wide = effective_font_px(base, crate::constants::CANONICAL_WIDTH, 1200.0);
        assert!((wide / narrow - 2.0).abs() < 1e-6);
    }
}
