//! The live card preview.
//!
//! Draws the card at whatever size fits the central panel: background
//! artwork stretched over the card, the scannable code at its fixed spot,
//! and the dedication text laid out by the layout engine. The text itself
//! is an on-card editor, so typing happens exactly where the words will
//! print.
//!
//! Everything is recomputed per frame from
//! [`DedicationState`](crate::types::DedicationState), which is what keeps
//! the preview and the export in agreement: both feed the same state
//! through the same layout module, only at different surface widths.

use std::sync::Arc;

use eframe::egui;

use super::state::DedicationApp;
use crate::constants;
use crate::layout::{self, TextMeasure};
use crate::types::Alignment;

/// Stroke color of the dashed guide around the text region.
const GUIDE_COLOR: egui::Color32 = egui::Color32::from_rgb(168, 85, 247);

/// Measures candidate lines with the same glyphs the preview draws.
struct UiTextMeasure {
    ctx: egui::Context,
    font_id: egui::FontId,
}

impl TextMeasure for UiTextMeasure {
    fn line_width(&self, line: &str) -> f32 {
        self.ctx.fonts_mut(|f| {
            f.layout_no_wrap(line.to_owned(), self.font_id.clone(), egui::Color32::BLACK)
                .size()
                .x
        })
    }
}

/// Largest rect with the card's aspect ratio that fits `available`.
fn card_rect(available: egui::Rect) -> egui::Rect {
    let aspect = constants::EXPORT_WIDTH as f32 / constants::EXPORT_HEIGHT as f32;
    let mut size = available.size();
    if size.x / size.y > aspect {
        size.x = size.y * aspect;
    } else {
        size.y = size.x / aspect;
    }
    egui::Rect::from_center_size(available.center(), size)
}

/// Where the scannable code sits on the card, aspect preserved from the
/// fetched image's own dimensions.
fn code_rect(card: egui::Rect, source_size: [usize; 2]) -> egui::Rect {
    let width = card.width() * (1.0 - 2.0 * constants::CODE_SIDE_PADDING);
    let height = source_size[1] as f32 * width / (source_size[0] as f32).max(1.0);
    let center = egui::pos2(
        card.center().x,
        card.top() + card.height() * constants::CODE_CENTER_Y,
    );
    egui::Rect::from_center_size(center, egui::vec2(width, height))
}

fn full_uv() -> egui::Rect {
    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0))
}

fn dashed_rect(painter: &egui::Painter, rect: egui::Rect, stroke: egui::Stroke) {
    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];
    for i in 0..4 {
        let edge = [corners[i], corners[(i + 1) % 4]];
        painter.extend(egui::Shape::dashed_line(&edge, stroke, 6.0, 4.0));
    }
}

impl DedicationApp {
    /// Renders the card preview into the central panel.
    ///
    /// The code image, the text editor, and the word badge only appear once
    /// the background artwork is in; until then the card shows its loading
    /// state and nothing is drawn on top of it.
    pub(super) fn draw_preview(&mut self, ui: &mut egui::Ui) {
        let card = card_rect(ui.available_rect_before_wrap());
        if card.width() <= 0.0 {
            // Degenerate viewport; not renderable yet.
            return;
        }
        let painter = ui.painter_at(card.expand(1.0));

        if !self.draw_card_background(ui, &painter, card) {
            return;
        }
        self.draw_code_overlay(ui, &painter, card);
        self.draw_dedication_text(ui, &painter, card);
        self.draw_word_badge(ui, &painter, card);
    }

    /// Draws the background artwork, or the loading state when it is not
    /// ready. Returns whether the artwork was drawn.
    ///
    /// A failed fetch keeps the loading state up rather than replacing the
    /// card with an error surface; the failure itself is logged and, on
    /// export, reported.
    fn draw_card_background(&mut self, ui: &mut egui::Ui, painter: &egui::Painter, card: egui::Rect) -> bool {
        if let Some(asset) = self.assets.background().ready() {
            // Stretched over the full card, same as the export surface.
            painter.image(asset.texture.id(), card, full_uv(), egui::Color32::WHITE);
            return true;
        }

        painter.rect_filled(card, 0.0, ui.visuals().extreme_bg_color);
        let spinner = egui::Rect::from_center_size(card.center(), egui::vec2(32.0, 32.0));
        ui.put(spinner, egui::Spinner::new().size(32.0));
        false
    }

    fn draw_code_overlay(&mut self, ui: &mut egui::Ui, painter: &egui::Painter, card: egui::Rect) {
        if !self.state.has_spotify_uri() {
            return;
        }
        if let Some(asset) = self.assets.code().ready() {
            let rect = code_rect(card, asset.size);
            painter.image(asset.texture.id(), rect, full_uv(), egui::Color32::WHITE);
        } else if self.assets.code().is_loading() {
            let center = egui::pos2(
                card.center().x,
                card.top() + card.height() * constants::CODE_CENTER_Y,
            );
            let spinner = egui::Rect::from_center_size(center, egui::vec2(24.0, 24.0));
            ui.put(spinner, egui::Spinner::new().size(24.0));
        }
    }

    fn draw_dedication_text(&mut self, ui: &mut egui::Ui, painter: &egui::Painter, card: egui::Rect) {
        let font_px = layout::effective_font_px(
            self.state.font_size as f32,
            constants::CANONICAL_WIDTH,
            card.width(),
        );
        let line_height = font_px * constants::LINE_HEIGHT_FACTOR;
        let font_id = egui::FontId::new(font_px, self.fonts.egui_family(&self.state.font_family));
        let max_width = layout::padded_text_width(card.width());
        let anchor = card.top() + layout::anchor_y(self.state.position_y, card.height());

        let measure = UiTextMeasure {
            ctx: ui.ctx().clone(),
            font_id: font_id.clone(),
        };
        let block = layout::lay_out_block(&self.state.text, font_px, max_width, anchor, &measure);

        let edit_rect = egui::Rect::from_min_size(
            egui::pos2(card.left() + card.width() * constants::TEXT_SIDE_PADDING, block.top),
            egui::vec2(max_width, block.height.max(line_height)),
        );

        let halign = match self.state.alignment {
            Alignment::Left => egui::Align::LEFT,
            Alignment::Center => egui::Align::Center,
            Alignment::Right => egui::Align::RIGHT,
        };
        let widget_font = font_id.clone();
        let mut layouter = move |ui: &egui::Ui,
                                 text: &dyn egui::TextBuffer,
                                 wrap_width: f32|
              -> Arc<egui::Galley> {
            let format = egui::TextFormat {
                font_id: font_id.clone(),
                color: egui::Color32::BLACK,
                line_height: Some(line_height),
                ..Default::default()
            };
            let mut job = egui::text::LayoutJob::default();
            job.append(text.as_str(), 0.0, format);
            job.wrap.max_width = wrap_width;
            job.halign = halign;
            ui.fonts_mut(|f| f.layout_job(job))
        };

        ui.put(
            edit_rect,
            egui::TextEdit::multiline(&mut self.state.text)
                .id(egui::Id::new("dedication-text"))
                .font(widget_font)
                .text_color(egui::Color32::BLACK)
                .frame(false)
                .margin(egui::Margin::ZERO)
                .layouter(&mut layouter),
        );

        // Dashed guide outlining the designated text region.
        let box_height = card.height() * constants::TEXT_BOX_HEIGHT;
        let guide = egui::Rect::from_center_size(
            egui::pos2(card.center().x, anchor),
            egui::vec2(max_width, box_height),
        );
        dashed_rect(
            painter,
            guide,
            egui::Stroke::new(1.0, GUIDE_COLOR.gamma_multiply(0.7)),
        );

        // Overflow correction happens one frame at a time so every reduction
        // is remeasured with real glyphs before the next one.
        let check = layout::check_fit(block.height, box_height, constants::OVERFLOW_TOLERANCE);
        if let Some(reduced) = self.fit.observe(check, self.state.font_size) {
            self.state.font_size = reduced;
            ui.ctx().request_repaint();
        }
    }

    fn draw_word_badge(&mut self, ui: &mut egui::Ui, painter: &egui::Painter, card: egui::Rect) {
        let words = self.state.word_count();
        let over = words > constants::WORD_LIMIT;
        let color = if over {
            egui::Color32::from_rgb(200, 40, 40)
        } else {
            ui.visuals().weak_text_color()
        };
        painter.text(
            card.right_bottom() - egui::vec2(8.0, 6.0),
            egui::Align2::RIGHT_BOTTOM,
            format!("{}/{} palabras", words, constants::WORD_LIMIT),
            egui::FontId::proportional(12.0),
            color,
        );
    }
}
