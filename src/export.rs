//! Card export: fixed-resolution PNG rendering.
//!
//! The card is composed as an SVG document (background stretched to fill,
//! the optional scannable code, then every laid-out text line) and
//! rasterized with resvg into a 1200x1800 pixmap. Going through SVG keeps
//! text rendering on the same font files the preview registered, with the
//! layout engine supplying every coordinate.
//!
//! Steps are failure-isolated as the product requires: the background and
//! the text draw are load-bearing, the scannable code is best-effort.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use thiserror::Error;

use crate::assets;
use crate::constants;
use crate::fonts::FontLibrary;
use crate::layout::{self, TextMeasure};
use crate::spotify;
use crate::types::{Alignment, DedicationState};

/// Failure modes of an export attempt.
///
/// The scannable code image is deliberately absent here: its failures are
/// logged and skipped instead of aborting the export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Background bytes missing or not a decodable image
    #[error("background image unavailable: {0}")]
    Background(String),
    /// The chosen catalog key has no usable face on this host
    #[error("no usable font for '{0}'")]
    FontUnavailable(String),
    /// The composed SVG did not parse (indicates a composition bug)
    #[error("could not parse composed card: {0}")]
    Svg(String),
    /// Pixmap allocation failed
    #[error("could not allocate a {0}x{1} surface")]
    Surface(u32, u32),
    /// PNG serialization failed
    #[error("png encoding failed: {0}")]
    Encode(String),
}

/// Image bytes the export composites. Background is required; the code
/// image is optional and only drawn when the state carries a valid URI.
pub struct ExportAssets {
    /// Raw background artwork bytes
    pub background: Arc<Vec<u8>>,
    /// Raw scannable-code bytes, when fetched
    pub code: Option<Arc<Vec<u8>>>,
}

/// Renders the card to PNG bytes. Pure CPU work: no dialogs, no network.
///
/// Identical state, asset bytes, and font database produce byte-identical
/// output.
pub fn render_card(
    state: &DedicationState,
    assets: &ExportAssets,
    fonts: &FontLibrary,
) -> Result<Vec<u8>, ExportError> {
    let width = constants::EXPORT_WIDTH;
    let height = constants::EXPORT_HEIGHT;

    let font_px = layout::effective_font_px(
        state.font_size as f32,
        constants::CANONICAL_WIDTH,
        width as f32,
    );
    let measure = fonts
        .measurer(&state.font_family, font_px)
        .ok_or_else(|| ExportError::FontUnavailable(state.font_family.clone()))?;
    let family = fonts
        .family_name(&state.font_family)
        .ok_or_else(|| ExportError::FontUnavailable(state.font_family.clone()))?
        .to_string();

    let svg = compose_svg(
        state,
        &assets.background,
        assets.code.as_deref().map(|bytes| bytes.as_slice()),
        &family,
        measure.baseline_from_center(),
        &measure,
    )?;

    let mut options = usvg::Options::default();
    options.fontdb = fonts.database();
    let tree = usvg::Tree::from_data(svg.as_bytes(), &options)
        .map_err(|e| ExportError::Svg(e.to_string()))?;

    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(ExportError::Surface(width, height))?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| ExportError::Encode(e.to_string()))
}

/// Composes the card SVG. Measurement and baseline geometry are injected so
/// the composition is testable without any fonts on the host.
fn compose_svg(
    state: &DedicationState,
    background: &[u8],
    code: Option<&[u8]>,
    family: &str,
    baseline_from_center: f32,
    measure: &dyn TextMeasure,
) -> Result<String, ExportError> {
    let width = constants::EXPORT_WIDTH as f32;
    let height = constants::EXPORT_HEIGHT as f32;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
        constants::EXPORT_WIDTH,
        constants::EXPORT_HEIGHT,
        constants::EXPORT_WIDTH,
        constants::EXPORT_HEIGHT
    );

    // Background fills the whole surface exactly, stretching as the preview does.
    let background_mime = sniff_mime(background)
        .ok_or_else(|| ExportError::Background("unrecognized image format".to_string()))?;
    let _ = writeln!(
        out,
        "<image x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" xlink:href=\"data:{};base64,{}\" />",
        constants::EXPORT_WIDTH,
        constants::EXPORT_HEIGHT,
        background_mime,
        BASE64.encode(background)
    );

    // Scannable code: aspect preserved from its source dimensions, centered
    // at a fixed height. Any problem here downgrades to a plain card.
    if let Some(code_bytes) = code {
        match code_image_rect(code_bytes, width, height) {
            Ok((x, y, w, h)) => {
                let mime = sniff_mime(code_bytes).unwrap_or("image/png");
                let _ = writeln!(
                    out,
                    "<image x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" preserveAspectRatio=\"none\" xlink:href=\"data:{};base64,{}\" />",
                    x,
                    y,
                    w,
                    h,
                    mime,
                    BASE64.encode(code_bytes)
                );
            }
            Err(e) => log::warn!("exporting without code image: {}", e),
        }
    }

    // Text block, laid out by the shared engine at this surface's scale.
    let block = layout::lay_out_block(
        &state.text,
        font_px_for_export(state),
        layout::padded_text_width(width),
        layout::anchor_y(state.position_y, height),
        measure,
    );
    let anchor_x = layout::line_anchor_x(state.alignment, width);
    let anchor_attr = match state.alignment {
        Alignment::Left => "start",
        Alignment::Center => "middle",
        Alignment::Right => "end",
    };
    for (index, line) in block.lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let baseline_y = block.line_center_y(index) + baseline_from_center;
        let _ = writeln!(
            out,
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{:.2}\" fill=\"#000000\" text-anchor=\"{}\" xml:space=\"preserve\">{}</text>",
            anchor_x,
            baseline_y,
            escape_xml(family),
            block.font_px,
            anchor_attr,
            escape_xml(line)
        );
    }

    let _ = writeln!(out, "</svg>");
    Ok(out)
}

fn font_px_for_export(state: &DedicationState) -> f32 {
    layout::effective_font_px(
        state.font_size as f32,
        constants::CANONICAL_WIDTH,
        constants::EXPORT_WIDTH as f32,
    )
}

/// Placement of the code image on the export surface, from its source size.
fn code_image_rect(bytes: &[u8], width: f32, height: f32) -> Result<(f32, f32, f32, f32), String> {
    let decoded = image::load_from_memory(bytes).map_err(|e| format!("decode failed: {}", e))?;
    let (source_w, source_h) = (decoded.width() as f32, decoded.height() as f32);
    if source_w <= 0.0 {
        return Err("zero-width code image".to_string());
    }
    let target_w = width * (1.0 - 2.0 * constants::CODE_SIDE_PADDING);
    let target_h = source_h * (target_w / source_w);
    let x = width * constants::CODE_SIDE_PADDING;
    let y = height * constants::CODE_CENTER_Y - target_h / 2.0;
    Ok((x, y, target_w, target_h))
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        image::ImageFormat::Png => Some("image/png"),
        image::ImageFormat::Jpeg => Some("image/jpeg"),
        image::ImageFormat::Gif => Some("image/gif"),
        image::ImageFormat::WebP => Some("image/webp"),
        _ => Some("image/png"),
    }
}

fn escape_xml(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(ch),
        }
    }
    s
}

/// Outcome of an export task, delivered back to the UI thread.
#[derive(Debug)]
pub enum ExportOutcome {
    /// PNG written to the chosen path
    Saved(PathBuf),
    /// User dismissed the save dialog
    Cancelled,
    /// Export failed; the message is user-readable
    Failed(String),
}

/// Everything an export task needs, captured on the UI thread before
/// spawning so the task owns its inputs outright.
pub struct ExportJob {
    /// Snapshot of the card state at the moment the user hit save
    pub state: DedicationState,
    /// Shared font resolution
    pub fonts: Arc<FontLibrary>,
    /// HTTP client for assets the preview has not fetched yet
    pub http: reqwest::Client,
    /// Cached background bytes, when the preview already has them
    pub background: Option<Arc<Vec<u8>>>,
    /// Cached code bytes, when the preview already has them
    pub code: Option<Arc<Vec<u8>>>,
}

/// Runs one export to completion: resolves missing assets, renders, prompts
/// for a destination, writes the file. Bytes are fully encoded before the
/// dialog opens, so no partial file can ever be written.
pub async fn run_export(job: ExportJob) -> ExportOutcome {
    let background = match job.background {
        Some(bytes) => bytes,
        None => {
            match assets::fetch_bytes(&job.http, constants::BACKGROUND_IMAGE_URL).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    return ExportOutcome::Failed(ExportError::Background(e).to_string());
                }
            }
        }
    };

    let code = if job.state.has_spotify_uri() {
        match job.code {
            Some(bytes) => Some(bytes),
            None => {
                let url = spotify::scannable_code_url(&job.state.spotify_uri);
                match assets::fetch_bytes(&job.http, &url).await {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        log::warn!("exporting without code image: {}", e);
                        None
                    }
                }
            }
        }
    } else {
        None
    };

    let export_assets = ExportAssets { background, code };
    let png = match render_card(&job.state, &export_assets, &job.fonts) {
        Ok(png) => png,
        Err(e) => {
            log::error!("export failed: {}", e);
            return ExportOutcome::Failed(e.to_string());
        }
    };

    let Some(handle) = rfd::AsyncFileDialog::new()
        .add_filter("PNG", &["png"])
        .set_file_name(constants::EXPORT_FILE_NAME)
        .save_file()
        .await
    else {
        return ExportOutcome::Cancelled;
    };

    let path = handle.path().to_path_buf();
    match std::fs::write(&path, &png) {
        Ok(()) => {
            log::info!("card saved to {}", path.display());
            ExportOutcome::Saved(path)
        }
        Err(e) => ExportOutcome::Failed(format!("could not write {}: {}", path.display(), e)),
    }
}
