//! Application state structures.
//!
//! Everything the editor tracks between frames lives here: the dedication
//! being edited, the shared font catalog, remote asset slots, link entry
//! state, the overflow controller, and export bookkeeping.

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use eframe::egui;

use crate::assets::AssetCache;
use crate::export::ExportOutcome;
use crate::fonts::FontLibrary;
use crate::layout::FitController;
use crate::settings;
use crate::spotify::LinkStatus;
use crate::types::DedicationState;

/// State of the track link entry controls.
pub struct LinkControls {
    /// Raw share URL exactly as typed, not yet applied
    pub input: String,
    /// Validation outcome of the last applied input
    pub status: LinkStatus,
}

impl Default for LinkControls {
    fn default() -> Self {
        Self {
            input: String::new(),
            status: LinkStatus::Idle,
        }
    }
}

/// Bookkeeping for the background export task.
///
/// At most one export runs at a time; the outcome comes back over the
/// channel so the task never touches UI state directly.
pub struct ExportState {
    /// True while a spawned export has not reported back
    pub in_flight: bool,
    /// Task-side handle for reporting the outcome
    pub sender: Sender<ExportOutcome>,
    /// UI-side end, drained once per frame
    pub receiver: Receiver<ExportOutcome>,
    /// Destination of the most recent successful export
    pub last_saved: Option<PathBuf>,
    /// Message from the most recent failed export
    pub last_error: Option<String>,
}

impl Default for ExportState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            in_flight: false,
            sender,
            receiver,
            last_saved: None,
            last_error: None,
        }
    }
}

/// The main application: one dedication card being edited, previewed and
/// exported.
pub struct DedicationApp {
    /// Card content and presentation settings
    pub state: DedicationState,
    /// Resolved font catalog, shared with export tasks
    pub fonts: Arc<FontLibrary>,
    /// Remote artwork and scannable-code slots
    pub assets: AssetCache,
    /// Link entry state
    pub link: LinkControls,
    /// Overflow controller driving automatic size reduction
    pub fit: FitController,
    /// Export task bookkeeping
    pub export: ExportState,
}

impl Default for DedicationApp {
    fn default() -> Self {
        Self {
            state: DedicationState::default(),
            fonts: Arc::new(FontLibrary::load_system()),
            assets: AssetCache::default(),
            link: LinkControls::default(),
            fit: FitController::default(),
            export: ExportState::default(),
        }
    }
}

impl DedicationApp {
    /// Builds the app at startup: restores persisted settings and registers
    /// the font catalog with egui so the preview renders with the same
    /// faces the export uses.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        let mut app = Self::default();
        if let Some(storage) = cc.storage {
            app.state = settings::load(storage);
        }
        // A restored link stays linked even though the share URL input
        // starts out blank.
        if app.state.has_spotify_uri() {
            app.link.status = LinkStatus::Valid;
        }
        app.fonts.register_egui_fonts(&cc.egui_ctx);
        app
    }
}
