//! The controls panel.
//!
//! Everything the user adjusts besides typing the text itself: the music
//! link, font family and size, alignment, the vertical anchor, and the save
//! action. Widgets write straight into the shared
//! [`DedicationState`](crate::types::DedicationState); the preview picks the
//! change up on the same frame.

use eframe::egui;

use super::state::DedicationApp;
use crate::constants;
use crate::fonts;
use crate::spotify::{self, LinkStatus};
use crate::types::Alignment;

/// Labels for the quick-pick size buttons, matching
/// [`constants::FONT_SIZE_PRESETS`] entry for entry.
const SIZE_PRESET_LABELS: [&str; 3] = ["Pequeño", "Mediano", "Grande"];

const VALID_COLOR: egui::Color32 = egui::Color32::from_rgb(60, 180, 90);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 70, 70);
const WARN_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 180, 60);

impl DedicationApp {
    /// Renders the controls panel into the right side panel.
    pub(super) fn draw_controls(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.add_space(4.0);
                ui.label(egui::RichText::new("Tu Mensaje").strong());
                ui.add(
                    egui::Label::new(
                        egui::RichText::new(
                            "Haz clic directamente en la caja de texto de la tarjeta \
                             para editar tu dedicatoria.",
                        )
                        .small()
                        .weak(),
                    )
                    .wrap(),
                );

                ui.separator();
                self.draw_link_controls(ui);
                ui.separator();
                self.draw_font_controls(ui);
                ui.separator();
                self.draw_alignment_controls(ui);
                ui.separator();
                self.draw_position_controls(ui);
                ui.separator();
                self.draw_save_controls(ui);
            });
    }

    fn draw_link_controls(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Canción de Spotify (Opcional)").strong());
        ui.horizontal(|ui| {
            let width = (ui.available_width() - 70.0).max(80.0);
            ui.add(
                egui::TextEdit::singleline(&mut self.link.input)
                    .hint_text("Pega el enlace de la canción aquí")
                    .desired_width(width),
            );
            // Applying an empty field detaches the link again.
            if ui.button("Aplicar").clicked() {
                self.apply_link_input();
            }
        });
        match self.link.status {
            LinkStatus::Idle => {}
            LinkStatus::Valid => {
                ui.colored_label(VALID_COLOR, "¡Enlace de Spotify válido!");
            }
            LinkStatus::Invalid => {
                ui.add(
                    egui::Label::new(
                        egui::RichText::new(
                            "Enlace no válido. Asegúrate de pegar un enlace \
                             completo de Spotify.",
                        )
                        .color(ERROR_COLOR)
                        .small(),
                    )
                    .wrap(),
                );
            }
        }
    }

    /// Normalizes whatever is in the link field into the card state.
    ///
    /// Empty input detaches the link; a non-match detaches it and flags the
    /// field invalid. Only a valid share URL attaches anything.
    pub(super) fn apply_link_input(&mut self) {
        let (uri, status) = spotify::normalize_input(&self.link.input);
        self.state.spotify_uri = uri;
        self.link.status = status;
    }

    fn draw_font_controls(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Fuente").strong());
        let selected_label = fonts::font_choice(&self.state.font_family)
            .map(|choice| choice.label)
            .unwrap_or(self.state.font_family.as_str());
        egui::ComboBox::from_id_source("font_family_combo")
            .selected_text(selected_label)
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                for choice in fonts::FONT_CHOICES {
                    ui.selectable_value(
                        &mut self.state.font_family,
                        choice.key.to_string(),
                        choice.label,
                    );
                }
            });

        ui.add_space(6.0);
        ui.label(egui::RichText::new("Tamaño de Letra").strong());
        // Size controls freeze while the overflow loop is stepping the size
        // down, so the user cannot fight the correction.
        let shrinking = self.fit.is_shrinking();
        ui.add_enabled_ui(!shrinking, |ui| {
            ui.horizontal(|ui| {
                for (label, size) in SIZE_PRESET_LABELS
                    .iter()
                    .zip(constants::FONT_SIZE_PRESETS)
                {
                    let selected = self.state.font_size == size && !shrinking;
                    if ui.selectable_label(selected, *label).clicked() {
                        self.state.font_size = size;
                    }
                }
            });
            ui.add(
                egui::DragValue::new(&mut self.state.font_size)
                    .range(constants::MIN_FONT_SIZE..=constants::MAX_FONT_SIZE),
            );
        });
        if shrinking {
            ui.add(
                egui::Label::new(
                    egui::RichText::new("Tamaño de letra ajustado para encajar el texto.")
                        .color(WARN_COLOR)
                        .small(),
                )
                .wrap(),
            );
        }
    }

    fn draw_alignment_controls(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Alineación").strong());
        ui.horizontal(|ui| {
            for alignment in Alignment::ALL {
                ui.selectable_value(&mut self.state.alignment, alignment, alignment.label());
            }
        });
    }

    fn draw_position_controls(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("Posición Vertical").strong());
        ui.add(
            egui::Slider::new(
                &mut self.state.position_y,
                constants::POSITION_Y_MIN..=constants::POSITION_Y_MAX,
            )
            .suffix("%"),
        );
    }

    fn draw_save_controls(&mut self, ui: &mut egui::Ui) {
        let busy = self.export.in_flight;
        ui.add_enabled_ui(!busy, |ui| {
            let label = if busy {
                "Generando..."
            } else {
                "Guardar Imagen"
            };
            if ui
                .add_sized([ui.available_width(), 32.0], egui::Button::new(label))
                .clicked()
            {
                self.start_export(ui.ctx());
            }
        });
        if busy {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(egui::RichText::new("Generando la tarjeta...").weak());
            });
        }
        if let Some(error) = &self.export.last_error {
            ui.colored_label(ERROR_COLOR, "No se pudo generar la imagen.");
            ui.add(egui::Label::new(egui::RichText::new(error).small().weak()).wrap());
        } else if let Some(path) = &self.export.last_saved {
            ui.add(
                egui::Label::new(
                    egui::RichText::new(format!("Guardada en {}", path.display()))
                        .small()
                        .weak(),
                )
                .wrap(),
            );
        }
    }
}
