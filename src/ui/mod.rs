//! User interface components and rendering logic for the dedication editor.
//!
//! This module contains all the UI-related code including the main application
//! struct, the live card preview, the controls panel, and the glue that moves
//! asset fetches and export outcomes back onto the UI thread.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main DedicationApp
//! - `preview` - The live card preview with in-place text editing
//! - `controls` - The right-hand panel of adjustment widgets

mod controls;
mod preview;
mod state;

pub use state::DedicationApp;

use std::sync::Arc;

use eframe::egui;

use crate::export::{self, ExportJob, ExportOutcome};
use crate::settings;

impl eframe::App for DedicationApp {
    /// Persist the card settings between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        settings::save(storage, &self.state);
    }

    /// Main update function called by egui for each frame.
    ///
    /// This method drains background work first (asset fetches, export
    /// outcomes) so widgets always draw against current state, then lays out
    /// the header, the controls panel, and the card preview.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context
    /// * `_frame` - The eframe frame
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Kick off and drain background work before drawing anything
        self.assets.ensure_background(ctx);
        self.assets.sync_code(ctx, &self.state.spotify_uri);
        self.assets.poll(ctx);
        self.poll_export_outcomes();

        // Header occupies the full width, above the panel split
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(6.0);
                ui.heading("Creador de Dedicatorias");
                ui.label(
                    egui::RichText::new(
                        "Personaliza tu tarjeta con un mensaje y una canción de Spotify.",
                    )
                    .weak(),
                );
                ui.add_space(6.0);
            });
        });

        // Controls live alongside the preview, below the header
        egui::SidePanel::right("controls_panel")
            .resizable(true)
            .default_width(320.0)
            .min_width(260.0)
            .show(ctx, |ui| {
                self.draw_controls(ui);
            });

        // Card preview takes the remaining space
        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_preview(ui);
        });
    }
}

impl DedicationApp {
    /// Drains export outcomes sent back by finished export tasks.
    fn poll_export_outcomes(&mut self) {
        while let Ok(outcome) = self.export.receiver.try_recv() {
            self.export.in_flight = false;
            match outcome {
                ExportOutcome::Saved(path) => {
                    log::info!("card saved to {}", path.display());
                    self.export.last_saved = Some(path);
                    self.export.last_error = None;
                }
                ExportOutcome::Cancelled => {}
                ExportOutcome::Failed(message) => {
                    log::error!("export failed: {message}");
                    self.export.last_error = Some(message);
                    self.export.last_saved = None;
                }
            }
        }
    }

    /// Spawns the export task for the current card, unless one is already
    /// running.
    ///
    /// The task gets a snapshot of the state plus whatever asset bytes the
    /// preview has cached; it re-fetches anything missing so an export can
    /// succeed even before the preview finished loading.
    fn start_export(&mut self, ctx: &egui::Context) {
        if self.export.in_flight {
            return;
        }
        self.export.in_flight = true;
        self.export.last_saved = None;
        self.export.last_error = None;

        let job = ExportJob {
            state: self.state.clone(),
            fonts: Arc::clone(&self.fonts),
            http: self.assets.http(),
            background: self.assets.background().bytes(),
            code: self.assets.code().bytes(),
        };
        let sender = self.export.sender.clone();
        let repaint = ctx.clone();
        tokio::spawn(async move {
            let outcome = export::run_export(job).await;
            let _ = sender.send(outcome);
            repaint.request_repaint();
        });
    }
}

// Test module for headless egui-driven UI unit tests.
// Placed inside the `ui` module so tests can access private methods like
// `draw_preview` and `start_export` without exposing them publicly.
#[cfg(test)]
mod tests;
