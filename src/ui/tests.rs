use super::*;
use crate::assets::{AssetSlot, ImageAsset};
use crate::constants;
use crate::layout::FitCheck;
use crate::spotify::LinkStatus;
use crate::types::Alignment;
use eframe::egui;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Run a single headless egui frame against an existing context.
///
/// The context is shared across frames so interaction state, uploaded
/// textures, and registered fonts persist like they do in the real app.
fn run_frame(ctx: &egui::Context, mut f: impl FnMut(&egui::Context)) -> egui::FullOutput {
    let mut raw = egui::RawInput::default();
    raw.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(900.0, 900.0),
    ));
    ctx.run(raw, |ctx| f(ctx))
}

/// One frame of just the preview, the way `update` lays it out.
fn preview_frame(ctx: &egui::Context, app: &mut DedicationApp) {
    run_frame(ctx, |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_preview(ui);
        });
    });
}

/// One frame of just the controls panel.
fn controls_frame(ctx: &egui::Context, app: &mut DedicationApp) {
    run_frame(ctx, |ctx| {
        egui::SidePanel::right("controls_panel").show(ctx, |ui| {
            app.draw_controls(ui);
        });
    });
}

/// App wired to the test context the same way `DedicationApp::new` wires
/// the real one.
fn preview_app(ctx: &egui::Context) -> DedicationApp {
    let app = DedicationApp::default();
    app.fonts.register_egui_fonts(ctx);
    app
}

/// A ready asset slot backed by a tiny uploaded texture.
fn ready_slot(ctx: &egui::Context, name: &str) -> AssetSlot {
    let size = [2usize, 3usize];
    let image = egui::ColorImage::from_rgba_unmultiplied(size, &[255u8; 2 * 3 * 4]);
    let texture = ctx.load_texture(name, image, egui::TextureOptions::LINEAR);
    AssetSlot::Ready(ImageAsset {
        bytes: Arc::new(vec![1, 2, 3]),
        size,
        texture,
    })
}

#[derive(Default)]
struct MemoryStorage(HashMap<String, String>);

impl eframe::Storage for MemoryStorage {
    fn get_string(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: String) {
        self.0.insert(key.to_string(), value);
    }

    fn flush(&mut self) {}
}

#[test]
fn preview_waits_for_background_before_fitting() {
    let ctx = egui::Context::default();
    let mut app = preview_app(&ctx);

    // Wildly overflowing text, but no background artwork yet.
    app.state.text = "palabras ".repeat(200);
    app.state.font_size = 30;

    preview_frame(&ctx, &mut app);

    // Nothing was laid out, so the size controller never engaged.
    assert_eq!(app.state.font_size, 30);
    assert!(!app.fit.is_shrinking());
}

#[test]
fn overflowing_text_shrinks_one_step_per_frame_until_it_fits() {
    let ctx = egui::Context::default();
    let mut app = preview_app(&ctx);
    app.assets.inject_background(ready_slot(&ctx, "bg"));

    app.state.text = "amor ".repeat(120);
    app.state.font_size = 30;

    // Drive frames until the size stops moving. Each overflowing frame may
    // reduce the size by exactly one unit; the bound is generous.
    let mut sizes = vec![app.state.font_size];
    for _ in 0..40 {
        preview_frame(&ctx, &mut app);
        sizes.push(app.state.font_size);
        let n = sizes.len();
        if sizes[n - 1] == sizes[n - 2] && !app.fit.is_shrinking() {
            break;
        }
    }

    // Monotonic, one unit at a time.
    for pair in sizes.windows(2) {
        assert!(pair[1] <= pair[0], "size grew: {:?}", sizes);
        assert!(pair[0] - pair[1] <= 1, "size skipped a step: {:?}", sizes);
    }
    assert!(
        app.state.font_size < 30,
        "text this long must trigger at least one reduction"
    );
    // Terminates either by fitting or by hitting the floor.
    assert!(!app.fit.is_shrinking() || app.state.font_size == constants::MIN_FONT_SIZE);

    // Shortening the text afterwards leaves the corrected size alone; growth
    // is strictly user-initiated.
    let settled = app.state.font_size;
    app.state.text = "hola".to_string();
    preview_frame(&ctx, &mut app);
    preview_frame(&ctx, &mut app);
    assert_eq!(app.state.font_size, settled);
    assert!(!app.fit.is_shrinking());
}

#[test]
fn applying_link_input_normalizes_and_flags_status() {
    let mut app = DedicationApp::default();

    // A full share URL, localized path segment and query noise included.
    app.link.input =
        "https://open.spotify.com/intl-es/track/3n3Ppam7vgaVa1iaRUc9Lp?si=abc123".to_string();
    app.apply_link_input();
    assert_eq!(app.state.spotify_uri, "spotify:track:3n3Ppam7vgaVa1iaRUc9Lp");
    assert_eq!(app.link.status, LinkStatus::Valid);

    // A non-Spotify URL detaches the link and flags the field.
    app.link.input = "https://example.com/not-spotify".to_string();
    app.apply_link_input();
    assert!(app.state.spotify_uri.is_empty());
    assert_eq!(app.link.status, LinkStatus::Invalid);

    // Applying an emptied field detaches and goes back to idle.
    app.link.input.clear();
    app.apply_link_input();
    assert!(app.state.spotify_uri.is_empty());
    assert_eq!(app.link.status, LinkStatus::Idle);
}

#[test]
fn export_outcomes_update_panel_state() {
    let mut app = DedicationApp::default();

    app.export.in_flight = true;
    app.export
        .sender
        .send(ExportOutcome::Failed("boom".to_string()))
        .unwrap();
    app.poll_export_outcomes();
    assert!(!app.export.in_flight);
    assert_eq!(app.export.last_error.as_deref(), Some("boom"));
    assert!(app.export.last_saved.is_none());

    // A later success clears the sticky error.
    app.export.in_flight = true;
    app.export
        .sender
        .send(ExportOutcome::Saved(PathBuf::from("/tmp/card.png")))
        .unwrap();
    app.poll_export_outcomes();
    assert!(!app.export.in_flight);
    assert!(app.export.last_error.is_none());
    assert_eq!(
        app.export.last_saved.as_deref(),
        Some(std::path::Path::new("/tmp/card.png"))
    );

    // Cancellation only releases the guard.
    app.export.in_flight = true;
    app.export.sender.send(ExportOutcome::Cancelled).unwrap();
    app.poll_export_outcomes();
    assert!(!app.export.in_flight);
    assert!(app.export.last_saved.is_some());
}

#[test]
fn second_export_cannot_start_while_one_is_running() {
    let ctx = egui::Context::default();
    let mut app = DedicationApp::default();

    app.export.in_flight = true;
    app.export.last_saved = Some(PathBuf::from("previous.png"));

    // There is no async runtime in this test, so spawning a task would
    // panic. Returning quietly proves the guard short-circuits first.
    app.start_export(&ctx);

    assert!(app.export.in_flight);
    assert!(app.export.last_saved.is_some());
}

#[test]
fn controls_panel_draws_in_both_fit_states() {
    let ctx = egui::Context::default();
    let mut app = DedicationApp::default();

    controls_frame(&ctx, &mut app);
    assert!(!app.fit.is_shrinking());

    // Force the shrinking state; the panel must render its disabled size
    // controls and the adjustment notice without touching the controller.
    let _ = app.fit.observe(FitCheck::Overflows, app.state.font_size);
    controls_frame(&ctx, &mut app);
    assert!(app.fit.is_shrinking());
}

#[test]
fn app_save_writes_every_setting() {
    let mut app = DedicationApp::default();
    app.state.text = "Para ti, con todo mi amor".to_string();
    app.state.font_size = 18;
    app.state.font_family = "georgia".to_string();
    app.state.alignment = Alignment::Right;
    app.state.position_y = 88;
    app.state.spotify_uri = "spotify:album:4aawyAB9vmqN3uQ7FjRGTy".to_string();

    let mut storage = MemoryStorage::default();
    eframe::App::save(&mut app, &mut storage);

    assert_eq!(settings::load(&storage), app.state);
}
