//! Remote image acquisition and caching.
//!
//! The card needs two externally hosted images: the background artwork and,
//! when a music link is attached, its scannable code. Both are fetched on
//! the tokio runtime with a shared HTTP client; completed fetches come back
//! to the UI thread over an mpsc channel drained once per frame. Raw bytes
//! are kept alongside the preview texture so the export renderer composites
//! the exact bytes the preview showed.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use eframe::egui;

use crate::constants;
use crate::spotify;

/// Which remote image a fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// The fixed background artwork
    Background,
    /// The scannable code for the attached music link
    Code,
}

impl AssetKind {
    fn label(&self) -> &'static str {
        match self {
            AssetKind::Background => "background",
            AssetKind::Code => "code image",
        }
    }

    fn texture_name(&self) -> &'static str {
        match self {
            AssetKind::Background => "card-background",
            AssetKind::Code => "scannable-code",
        }
    }
}

/// A fetched, decoded image ready for both renderers.
pub struct ImageAsset {
    /// Raw fetched bytes, reused verbatim by the export renderer
    pub bytes: Arc<Vec<u8>>,
    /// Source dimensions in pixels
    pub size: [usize; 2],
    /// Preview texture, created on the UI thread when the fetch lands
    pub texture: egui::TextureHandle,
}

/// Lifecycle of one remote image.
pub enum AssetSlot {
    /// Nothing requested yet
    Idle,
    /// Fetch in flight
    Loading,
    /// Fetched and decoded
    Ready(ImageAsset),
    /// Fetch or decode failed
    Failed(String),
}

impl AssetSlot {
    /// The decoded asset, when this slot is ready.
    pub fn ready(&self) -> Option<&ImageAsset> {
        match self {
            AssetSlot::Ready(asset) => Some(asset),
            _ => None,
        }
    }

    /// Raw bytes for export reuse, when ready.
    pub fn bytes(&self) -> Option<Arc<Vec<u8>>> {
        self.ready().map(|asset| asset.bytes.clone())
    }

    /// True while a fetch for this slot is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, AssetSlot::Loading)
    }
}

enum FetchResult {
    Loaded {
        kind: AssetKind,
        uri: Option<String>,
        bytes: Arc<Vec<u8>>,
        image: egui::ColorImage,
    },
    Failed {
        kind: AssetKind,
        uri: Option<String>,
        message: String,
    },
}

/// Cache of the card's two remote images.
pub struct AssetCache {
    http: reqwest::Client,
    background: AssetSlot,
    code: AssetSlot,
    /// URI the code slot currently refers to; results for any other URI are stale
    code_uri: Option<String>,
    sender: Sender<FetchResult>,
    receiver: Receiver<FetchResult>,
}

impl Default for AssetCache {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            http: reqwest::Client::new(),
            background: AssetSlot::Idle,
            code: AssetSlot::Idle,
            code_uri: None,
            sender,
            receiver,
        }
    }
}

impl AssetCache {
    /// Slot holding the background artwork.
    pub fn background(&self) -> &AssetSlot {
        &self.background
    }

    /// Slot holding the scannable-code image.
    pub fn code(&self) -> &AssetSlot {
        &self.code
    }

    /// HTTP client handle for tasks that fetch on their own (export).
    pub fn http(&self) -> reqwest::Client {
        self.http.clone()
    }

    /// Starts the background fetch the first time it is needed.
    pub fn ensure_background(&mut self, ctx: &egui::Context) {
        if matches!(self.background, AssetSlot::Idle) {
            self.background = AssetSlot::Loading;
            self.spawn_fetch(
                ctx,
                AssetKind::Background,
                None,
                constants::BACKGROUND_IMAGE_URL.to_string(),
            );
        }
    }

    /// Keeps the code slot in sync with the state's URI.
    ///
    /// A changed URI triggers a fresh fetch; an emptied URI clears the slot
    /// immediately so the preview stops drawing the old code.
    pub fn sync_code(&mut self, ctx: &egui::Context, uri: &str) {
        if uri.is_empty() {
            if self.code_uri.is_some() || self.code.ready().is_some() {
                self.code = AssetSlot::Idle;
                self.code_uri = None;
            }
            return;
        }
        if self.code_uri.as_deref() == Some(uri) {
            return;
        }
        self.code_uri = Some(uri.to_string());
        self.code = AssetSlot::Loading;
        let url = spotify::scannable_code_url(uri);
        self.spawn_fetch(ctx, AssetKind::Code, Some(uri.to_string()), url);
    }

    fn spawn_fetch(&self, ctx: &egui::Context, kind: AssetKind, uri: Option<String>, url: String) {
        let ctx = ctx.clone();
        let sender = self.sender.clone();
        let client = self.http.clone();
        tokio::spawn(async move {
            let result = match fetch_image(&client, &url).await {
                Ok((bytes, image)) => FetchResult::Loaded {
                    kind,
                    uri,
                    bytes,
                    image,
                },
                Err(message) => {
                    log::warn!("{} fetch failed: {}", kind.label(), message);
                    FetchResult::Failed { kind, uri, message }
                }
            };
            let _ = sender.send(result);
            ctx.request_repaint();
        });
    }

    /// Puts a prepared asset into the background slot without a fetch.
    #[cfg(test)]
    pub(crate) fn inject_background(&mut self, slot: AssetSlot) {
        self.background = slot;
    }

    /// Puts a prepared asset into the code slot without a fetch.
    #[cfg(test)]
    pub(crate) fn inject_code(&mut self, uri: &str, slot: AssetSlot) {
        self.code_uri = Some(uri.to_string());
        self.code = slot;
    }

    /// Drains completed fetches and uploads their textures.
    ///
    /// Called once per frame from the UI thread; texture creation has to
    /// happen here because texture handles are tied to the egui context.
    pub fn poll(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.receiver.try_recv() {
            match result {
                FetchResult::Loaded {
                    kind,
                    uri,
                    bytes,
                    image,
                } => {
                    let size = image.size;
                    let texture =
                        ctx.load_texture(kind.texture_name(), image, egui::TextureOptions::LINEAR);
                    let asset = ImageAsset {
                        bytes,
                        size,
                        texture,
                    };
                    match kind {
                        AssetKind::Background => self.background = AssetSlot::Ready(asset),
                        AssetKind::Code => {
                            if uri == self.code_uri {
                                self.code = AssetSlot::Ready(asset);
                            }
                        }
                    }
                }
                FetchResult::Failed { kind, uri, message } => match kind {
                    AssetKind::Background => self.background = AssetSlot::Failed(message),
                    AssetKind::Code => {
                        if uri == self.code_uri {
                            self.code = AssetSlot::Failed(message);
                        }
                    }
                },
            }
        }
    }
}

/// Fetches one image over HTTP: raw bytes plus their decoded form.
async fn fetch_image(
    client: &reqwest::Client,
    url: &str,
) -> Result<(Arc<Vec<u8>>, egui::ColorImage), String> {
    let bytes = fetch_bytes(client, url).await?;
    let image = decode_color_image(&bytes)?;
    Ok((bytes, image))
}

/// Fetches raw bytes, failing on any non-success status.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Arc<Vec<u8>>, String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("request failed: {}", e))?;
    let response = response
        .error_for_status()
        .map_err(|e| format!("bad status: {}", e))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| format!("body read failed: {}", e))?;
    Ok(Arc::new(bytes.to_vec()))
}

/// Decodes fetched bytes into an image egui can upload as a texture.
pub fn decode_color_image(bytes: &[u8]) -> Result<egui::ColorImage, String> {
    let decoded = image::load_from_memory(bytes).map_err(|e| format!("decode failed: {}", e))?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(
        size,
        rgba.as_flat_samples().as_slice(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut png = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut png),
            image::ImageFormat::Png,
        )
        .unwrap();
        png
    }

    #[test]
    fn test_decode_color_image() {
        let png = tiny_png(3, 2);
        let color = decode_color_image(&png).unwrap();

        assert_eq!(color.size, [3, 2]);
        assert_eq!(color.pixels[0], egui::Color32::from_rgb(10, 20, 30));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_color_image(b"definitely not an image").is_err());
    }

    #[test]
    fn test_clearing_uri_resets_code_slot() {
        let ctx = egui::Context::default();
        let mut cache = AssetCache::default();
        cache.code_uri = Some("spotify:track:abc".to_string());
        cache.code = AssetSlot::Failed("old failure".to_string());

        cache.sync_code(&ctx, "");

        assert!(matches!(cache.code, AssetSlot::Idle));
        assert!(cache.code_uri.is_none());
    }

    #[test]
    fn test_poll_drops_stale_code_results() {
        let ctx = egui::Context::default();
        let mut cache = AssetCache::default();
        cache.code_uri = Some("spotify:track:current".to_string());
        cache.code = AssetSlot::Loading;

        let image = egui::ColorImage::from_rgba_unmultiplied([1, 1], &[255, 0, 0, 255]);
        cache
            .sender
            .send(FetchResult::Loaded {
                kind: AssetKind::Code,
                uri: Some("spotify:track:old".to_string()),
                bytes: Arc::new(vec![1, 2, 3]),
                image,
            })
            .unwrap();
        cache.poll(&ctx);

        // The result belongs to a URI the user already replaced.
        assert!(cache.code.is_loading());
    }

    #[test]
    fn test_poll_accepts_matching_code_result() {
        let ctx = egui::Context::default();
        let mut cache = AssetCache::default();
        cache.code_uri = Some("spotify:track:current".to_string());
        cache.code = AssetSlot::Loading;

        let image = egui::ColorImage::from_rgba_unmultiplied([1, 1], &[255, 0, 0, 255]);
        cache
            .sender
            .send(FetchResult::Loaded {
                kind: AssetKind::Code,
                uri: Some("spotify:track:current".to_string()),
                bytes: Arc::new(vec![1, 2, 3]),
                image,
            })
            .unwrap();
        cache.poll(&ctx);

        let asset = cache.code.ready().expect("slot should be ready");
        assert_eq!(asset.size, [1, 1]);
        assert_eq!(*asset.bytes, vec![1, 2, 3]);
    }
}
