//! Shared application-wide constants.
//! Centralizes the card geometry contract that both renderers must agree on.

// Scale law
/// Reference width (logical pixels) at which canonical font sizes are defined.
/// Preview and export both scale font sizes relative to this width; if the two
/// call sites ever disagree on it, their proportions drift apart.
pub const CANONICAL_WIDTH: f32 = 400.0;

// Export surface
/// Width of the exported raster in pixels.
pub const EXPORT_WIDTH: u32 = 1200;
/// Height of the exported raster in pixels (2:3 card ratio).
pub const EXPORT_HEIGHT: u32 = 1800;

// Text block geometry
/// Leading multiplier: line height is font size times this factor.
pub const LINE_HEIGHT_FACTOR: f32 = 1.3;
/// Horizontal padding on each side of the text block, as a fraction of surface width.
pub const TEXT_SIDE_PADDING: f32 = 0.10;
/// Height of the designated text region as a fraction of surface height.
pub const TEXT_BOX_HEIGHT: f32 = 0.36;
/// Slack in preview pixels before block height counts as overflowing the region.
pub const OVERFLOW_TOLERANCE: f32 = 2.0;

// Scannable code geometry
/// Horizontal padding on each side of the code image, as a fraction of surface width.
pub const CODE_SIDE_PADDING: f32 = 0.20;
/// Vertical center of the code image as a fraction of surface height.
pub const CODE_CENTER_Y: f32 = 0.25;

// Font size domain (canonical units)
/// Smallest font size the auto-shrink loop or the user may reach.
pub const MIN_FONT_SIZE: u32 = 10;
/// Largest font size the size control offers.
pub const MAX_FONT_SIZE: u32 = 100;
/// Quick-pick sizes offered as preset buttons.
pub const FONT_SIZE_PRESETS: [u32; 3] = [18, 25, 32];

// Vertical anchor domain (percent of card height)
/// Lowest selectable text anchor.
pub const POSITION_Y_MIN: u32 = 50;
/// Highest selectable text anchor.
pub const POSITION_Y_MAX: u32 = 100;

// Advisory limits
/// Word count past which the counter is highlighted. Display only, never enforced.
pub const WORD_LIMIT: usize = 150;

// External assets
/// Hosted background artwork drawn behind the dedication.
pub const BACKGROUND_IMAGE_URL: &str =
    "https://cdn.shopify.com/s/files/1/0649/4083/4883/files/NUEVA_TARJETA_VITORA_7.png?v=1756765704";
/// Scannable-code service; append a normalized music URI to get a PNG.
pub const SCANNABLE_URL_PREFIX: &str =
    "https://scannables.scdn.co/uri/plain/png/FFFFFF/black/640/";

// Export output
/// Suggested filename for the exported card.
pub const EXPORT_FILE_NAME: &str = "dedicatoria-personalizada.png";
