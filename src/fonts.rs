//! Font catalog and typeface resolution.
//!
//! The same font files back both renderers. Each catalog key is resolved
//! through `fontdb` once at startup; the resolved face bytes are registered
//! into egui for the preview and parsed with `owned_ttf_parser` for
//! export-side measurement, so preview and export measure the same outlines.
//!
//! No font is ever embedded in the binary. A catalog key that resolves to
//! nothing falls back to egui's default proportional font in the preview and
//! is a fatal error for an export using that key.

use std::collections::HashMap;
use std::sync::Arc;

use eframe::egui;
use owned_ttf_parser::{AsFaceRef, OwnedFace};

use crate::layout::TextMeasure;

/// One user-selectable font choice.
pub struct FontChoice {
    /// Catalog key stored in state
    pub key: &'static str,
    /// Label shown in the controls panel
    pub label: &'static str,
    /// Family names tried in order when resolving
    families: &'static [&'static str],
    /// Generic family used when none of the named ones exist
    fallback: fontdb::Family<'static>,
}

/// The selectable fonts, in the order the controls panel offers them.
/// Each entry lists metric-compatible substitutes after the canonical name
/// so the card still renders sensibly on hosts without the original faces.
pub const FONT_CHOICES: &[FontChoice] = &[
    FontChoice {
        key: "times",
        label: "Times New Roman",
        families: &["Times New Roman", "Liberation Serif", "Tinos", "DejaVu Serif"],
        fallback: fontdb::Family::Serif,
    },
    FontChoice {
        key: "arial",
        label: "Arial",
        families: &["Arial", "Liberation Sans", "Arimo", "DejaVu Sans"],
        fallback: fontdb::Family::SansSerif,
    },
    FontChoice {
        key: "courier",
        label: "Courier New",
        families: &["Courier New", "Liberation Mono", "Cousine", "DejaVu Sans Mono"],
        fallback: fontdb::Family::Monospace,
    },
    FontChoice {
        key: "georgia",
        label: "Georgia",
        families: &["Georgia", "Gelasio", "Liberation Serif", "DejaVu Serif"],
        fallback: fontdb::Family::Serif,
    },
    FontChoice {
        key: "script",
        label: "Script",
        families: &["Brush Script MT", "URW Chancery L", "Z003", "Comic Sans MS"],
        fallback: fontdb::Family::Cursive,
    },
];

/// Looks up a catalog entry by its key.
pub fn font_choice(key: &str) -> Option<&'static FontChoice> {
    FONT_CHOICES.iter().find(|choice| choice.key == key)
}

/// The concrete face fontdb picked for one catalog key.
struct ResolvedFace {
    /// Family name of the picked face, used in SVG font-family attributes
    family: String,
    /// Raw font file bytes
    bytes: Arc<Vec<u8>>,
    /// Face index inside the font file (collections)
    index: u32,
}

/// Font database plus the per-key resolution both renderers share.
///
/// Construct once at startup and share behind an `Arc`; export tasks carry
/// a clone across threads.
pub struct FontLibrary {
    db: Arc<fontdb::Database>,
    resolved: HashMap<&'static str, ResolvedFace>,
}

impl FontLibrary {
    /// Loads the host's fonts and resolves every catalog entry against them.
    pub fn load_system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        Self::from_database(db)
    }

    pub(crate) fn from_database(db: fontdb::Database) -> Self {
        let mut resolved = HashMap::new();
        for choice in FONT_CHOICES {
            let families: Vec<fontdb::Family<'_>> = choice
                .families
                .iter()
                .map(|name| fontdb::Family::Name(name))
                .chain(std::iter::once(choice.fallback))
                .collect();
            let query = fontdb::Query {
                families: &families,
                ..fontdb::Query::default()
            };
            if let Some(id) = db.query(&query) {
                if let Some(face) = extract_face(&db, id) {
                    resolved.insert(choice.key, face);
                } else {
                    log::warn!("font '{}' matched but its data is unreadable", choice.key);
                }
            } else {
                log::warn!("no system font found for '{}'", choice.key);
            }
        }
        log::info!("resolved {} of {} font choices", resolved.len(), FONT_CHOICES.len());
        Self {
            db: Arc::new(db),
            resolved,
        }
    }

    /// Shared database handle for the SVG rasterizer.
    pub fn database(&self) -> Arc<fontdb::Database> {
        self.db.clone()
    }

    /// True when `key` resolved to a concrete face on this host.
    pub fn is_resolved(&self, key: &str) -> bool {
        self.resolved.contains_key(key)
    }

    /// Family name the SVG renderer should select for a catalog key.
    pub fn family_name(&self, key: &str) -> Option<&str> {
        self.resolved.get(key).map(|face| face.family.as_str())
    }

    /// Builds an export-side measurer for `key` at `font_px` pixels.
    ///
    /// # Returns
    ///
    /// `None` when the key never resolved or its face fails to parse.
    pub fn measurer(&self, key: &str, font_px: f32) -> Option<FaceMeasure> {
        let face = self.resolved.get(key)?;
        FaceMeasure::parse(&face.bytes, face.index, font_px)
    }

    /// Registers every resolved face into egui under its catalog key so the
    /// preview draws with the same files the export rasterizes.
    pub fn register_egui_fonts(&self, ctx: &egui::Context) {
        let mut definitions = egui::FontDefinitions::default();
        for choice in FONT_CHOICES {
            if let Some(face) = self.resolved.get(choice.key) {
                definitions.font_data.insert(
                    choice.key.to_owned(),
                    Arc::new(egui::FontData::from_owned((*face.bytes).clone())),
                );
                definitions.families.insert(
                    egui::FontFamily::Name(choice.key.into()),
                    vec![choice.key.to_owned()],
                );
            }
        }
        ctx.set_fonts(definitions);
    }

    /// egui family for a catalog key, or the proportional default when the
    /// key never resolved.
    pub fn egui_family(&self, key: &str) -> egui::FontFamily {
        if self.resolved.contains_key(key) {
            egui::FontFamily::Name(key.into())
        } else {
            egui::FontFamily::Proportional
        }
    }
}

fn extract_face(db: &fontdb::Database, id: fontdb::ID) -> Option<ResolvedFace> {
    let info = db.face(id)?;
    let family = info
        .families
        .first()
        .map(|(name, _)| name.clone())
        .unwrap_or_default();
    let index = info.index;
    match &info.source {
        fontdb::Source::Binary(data) => Some(ResolvedFace {
            family,
            bytes: Arc::new(data.as_ref().as_ref().to_vec()),
            index,
        }),
        fontdb::Source::File(path) => std::fs::read(path).ok().map(|bytes| ResolvedFace {
            family,
            bytes: Arc::new(bytes),
            index,
        }),
        _ => None,
    }
}

/// Measurement backend for the export renderer: glyph advances summed from
/// the parsed face, scaled from face units to pixels.
pub struct FaceMeasure {
    face: OwnedFace,
    font_px: f32,
}

impl FaceMeasure {
    fn parse(bytes: &Arc<Vec<u8>>, index: u32, font_px: f32) -> Option<Self> {
        let face = OwnedFace::from_vec((**bytes).clone(), index).ok()?;
        Some(Self { face, font_px })
    }

    fn scaling(&self) -> f32 {
        self.font_px / self.face.as_face_ref().units_per_em() as f32
    }

    /// Distance from a line's vertical center down to its text baseline.
    ///
    /// Centering the ascender-to-descender span on the line center puts the
    /// baseline at `center + (ascender + descender) / 2` in pixels; the
    /// descender is negative in face units, so this lands below the center
    /// for typical faces.
    pub fn baseline_from_center(&self) -> f32 {
        let face = self.face.as_face_ref();
        self.scaling() * (face.ascender() as f32 + face.descender() as f32) / 2.0
    }
}

impl TextMeasure for FaceMeasure {
    fn line_width(&self, line: &str) -> f32 {
        let face = self.face.as_face_ref();
        let scaling = self.scaling();
        line.chars()
            .filter_map(|ch| face.glyph_index(ch))
            .filter_map(|gid| face.glyph_hor_advance(gid))
            .map(|advance| advance as f32 * scaling)
            .sum()
    }
}
