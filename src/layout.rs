//! Text layout and scale-consistency engine.
//!
//! This is the shared core both renderers consume. Everything in here is
//! pure: text measurement is injected through [`TextMeasure`], so the
//! interactive preview (backed by egui's font atlas) and the export renderer
//! (backed by parsed TTF faces) run identical wrapping and placement code
//! and can only drift apart through their measurement backends.
//!
//! Font sizes are "canonical": defined at [`constants::CANONICAL_WIDTH`] and
//! converted to real pixels for a concrete surface via the scale law before
//! any measurement happens.

use crate::constants;
use crate::types::Alignment;

/// Width measurement for a candidate line of text.
///
/// Implementations are bound to one concrete typeface and pixel size; the
/// layout engine never sees fonts directly.
pub trait TextMeasure {
    /// Width in pixels that `line` would occupy when drawn.
    fn line_width(&self, line: &str) -> f32;
}

/// Ratio between an actual rendering width and the canonical reference width.
///
/// Degenerate inputs (`actual_width <= 0`) produce a non-positive factor;
/// callers treat that as "not yet renderable" and skip drawing.
pub fn scale_factor(canonical_width: f32, actual_width: f32) -> f32 {
    actual_width / canonical_width
}

/// Converts a canonical font size into pixels for a surface of `actual_width`.
///
/// Preview and export must call this with the same canonical width constant;
/// that single shared constant is what keeps their proportions identical.
pub fn effective_font_px(base_size: f32, canonical_width: f32, actual_width: f32) -> f32 {
    base_size * scale_factor(canonical_width, actual_width)
}

/// Vertical anchor in surface pixels for a `position_y` percentage.
pub fn anchor_y(position_y: u32, surface_height: f32) -> f32 {
    surface_height * position_y as f32 / 100.0
}

/// Wraps raw text into lines no wider than `max_width`.
///
/// Paragraphs are split on explicit newlines; a paragraph that is blank
/// after trimming becomes one empty output line so paragraph spacing
/// survives. Within a paragraph, words are split on single spaces and
/// accumulated greedily: a word that would push the current line past
/// `max_width` starts a new line instead. A single word wider than
/// `max_width` is never broken apart; it becomes its own overflowing line.
///
/// # Arguments
///
/// * `text` - Raw multi-paragraph text
/// * `max_width` - Maximum line width in pixels
/// * `measure` - Measurement backend bound to the target font and size
///
/// # Returns
///
/// The wrapped lines, empty lines included, in original paragraph order.
pub fn wrap_text(text: &str, max_width: f32, measure: &dyn TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        for word in paragraph.split(' ') {
            let test_line = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current_line, word)
            };
            if measure.line_width(&test_line) > max_width && !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
                current_line = word.to_string();
            } else {
                current_line = test_line;
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    lines
}

/// A laid-out text block: wrapped lines plus their vertical geometry on a
/// concrete surface. Derived data, recomputed per frame or per export and
/// never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    /// Wrapped lines, empty lines included
    pub lines: Vec<String>,
    /// Font size in surface pixels the lines were measured at
    pub font_px: f32,
    /// Distance between successive line centers
    pub line_height: f32,
    /// Total block height (`lines.len() * line_height`)
    pub height: f32,
    /// Top edge of the block (anchor minus half the height)
    pub top: f32,
}

impl TextBlock {
    /// Vertical center of the line at `index`, in surface pixels.
    ///
    /// Backends that baseline text at the vertical middle of a line can use
    /// this directly; backends with font-baseline semantics derive their
    /// baseline from face metrics around this center.
    pub fn line_center_y(&self, index: usize) -> f32 {
        self.top + index as f32 * self.line_height + self.line_height / 2.0
    }
}

/// Wraps `text` and positions the resulting block centered on `anchor`.
///
/// Line height is `font_px` times [`constants::LINE_HEIGHT_FACTOR`]; the
/// block's vertical center lands exactly on `anchor`.
pub fn lay_out_block(
    text: &str,
    font_px: f32,
    max_width: f32,
    anchor: f32,
    measure: &dyn TextMeasure,
) -> TextBlock {
    let lines = wrap_text(text, max_width, measure);
    let line_height = font_px * constants::LINE_HEIGHT_FACTOR;
    let height = lines.len() as f32 * line_height;
    TextBlock {
        lines,
        font_px,
        line_height,
        height,
        top: anchor - height / 2.0,
    }
}

/// Horizontal anchor for a line on a surface of `surface_width` pixels.
///
/// Left and right anchor at the padding edges, center at the midpoint. The
/// returned coordinate is where the aligned edge (or center) of the line
/// goes, in surface-local pixels.
pub fn line_anchor_x(alignment: Alignment, surface_width: f32) -> f32 {
    let padding = surface_width * constants::TEXT_SIDE_PADDING;
    match alignment {
        Alignment::Left => padding,
        Alignment::Center => surface_width / 2.0,
        Alignment::Right => surface_width - padding,
    }
}

/// Usable line width on a surface after side padding.
pub fn padded_text_width(surface_width: f32) -> f32 {
    surface_width * (1.0 - 2.0 * constants::TEXT_SIDE_PADDING)
}

/// Outcome of comparing a laid-out block against its designated region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitCheck {
    /// Block height is within the region (plus tolerance)
    Fits,
    /// Block height exceeds the region beyond tolerance
    Overflows,
}

/// Pure overflow decision. `tolerance` absorbs subpixel rounding so the
/// correction loop cannot oscillate around the boundary.
pub fn check_fit(block_height: f32, box_height: f32, tolerance: f32) -> FitCheck {
    if block_height > box_height + tolerance {
        FitCheck::Overflows
    } else {
        FitCheck::Fits
    }
}

/// Observable state of the overflow-correction loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitState {
    /// Text fits its region; font size is wholly user-controlled
    Stable,
    /// Text overflows; the controller is stepping font size down
    Shrinking,
}

/// Iterative controller that shrinks font size until text fits its region.
///
/// Fed one [`FitCheck`] per layout recompute. On overflow it requests a one
/// unit decrement (down to [`constants::MIN_FONT_SIZE`]); each decrement
/// changes the state the caller re-lays out from, which produces the next
/// check. Termination is bounded by the floor: at most `initial - floor`
/// decrements. The controller never grows font size, even when shrinking
/// earlier left room to spare; growth is strictly user-initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitController {
    state: FitState,
}

impl Default for FitController {
    fn default() -> Self {
        Self {
            state: FitState::Stable,
        }
    }
}

impl FitController {
    /// Creates a controller in the stable state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one fit check; returns the corrected font size, if any.
    ///
    /// # Arguments
    ///
    /// * `check` - Result of [`check_fit`] for the current layout
    /// * `font_size` - Current canonical font size
    ///
    /// # Returns
    ///
    /// `Some(smaller_size)` when the caller should write a decremented size
    /// back into state, `None` when the size stays (either the text fits or
    /// the floor is reached).
    pub fn observe(&mut self, check: FitCheck, font_size: u32) -> Option<u32> {
        match check {
            FitCheck::Fits => {
                self.state = FitState::Stable;
                None
            }
            FitCheck::Overflows => {
                self.state = FitState::Shrinking;
                if font_size > constants::MIN_FONT_SIZE {
                    Some(font_size - 1)
                } else {
                    None
                }
            }
        }
    }

    /// Current loop state.
    pub fn state(&self) -> FitState {
        self.state
    }

    /// True while the controller is actively correcting an overflow. The UI
    /// disables manual size controls while this holds.
    pub fn is_shrinking(&self) -> bool {
        self.state == FitState::Shrinking
    }
}
