use resvg::usvg::{self, Transform};
use std::io::Cursor;
use std::sync::{Arc, Mutex, OnceLock};
use tiny_skia::Pixmap;
use tokio::task::JoinHandle;

use crate::config::Capabilities;
use crate::encoder::{decode_data_uri, Blob};
use crate::error::RasterError;
use crate::save::{SavePayload, SaveTrigger};

pub const PNG_MIME: &str = "image/png";

/// A rasterized image, PNG encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl Bitmap {
    pub fn into_blob(self) -> Blob {
        Blob {
            bytes: self.bytes,
            mime: PNG_MIME,
        }
    }
}

/// Decodes SVG data URIs and draws them 1:1 onto a pixmap.
///
/// Fonts are loaded on the first draw, so exporters that never rasterize
/// never scan the system fonts.
pub struct Rasterizer {
    /// Font data waiting for the first draw
    pending_fonts: Mutex<Vec<(String, Vec<u8>)>>,
    /// Font database for text rendering
    fontdb: OnceLock<Arc<fontdb::Database>>,
}

impl Rasterizer {
    /// Create a rasterizer with fonts loaded from the provided data, plus
    /// system fonts as fallback
    pub fn with_fonts(fonts: Vec<(String, Vec<u8>)>) -> Self {
        Self {
            pending_fonts: Mutex::new(fonts),
            fontdb: OnceLock::new(),
        }
    }

    /// Create a rasterizer with system fonts only
    pub fn new() -> Self {
        Self::with_fonts(Vec::new())
    }

    /// Whether the font database has been built yet.
    pub fn fonts_loaded(&self) -> bool {
        self.fontdb.get().is_some()
    }

    fn fontdb(&self) -> Arc<fontdb::Database> {
        self.fontdb
            .get_or_init(|| {
                let fonts = self
                    .pending_fonts
                    .lock()
                    .map(|mut pending| std::mem::take(&mut *pending))
                    .unwrap_or_default();
                Arc::new(load_fonts(fonts))
            })
            .clone()
    }

    /// Decode `data_uri` and draw it onto a transparent pixmap of the
    /// image's natural size.
    pub fn draw(&self, data_uri: &str) -> Result<Pixmap, RasterError> {
        let svg_data = decode_data_uri(data_uri)?;

        let options = usvg::Options {
            fontdb: self.fontdb(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(&svg_data, &options)
            .map_err(|e| RasterError::SvgParse(e.to_string()))?;

        let size = tree.size();
        let width = size.width().ceil() as u32;
        let height = size.height().ceil() as u32;

        let mut pixmap = Pixmap::new(width, height).ok_or(RasterError::PixmapAllocation)?;
        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

        Ok(pixmap)
    }

    /// Extract the pixmap as a PNG bitmap.
    pub fn extract(&self, pixmap: &Pixmap) -> Result<Bitmap, RasterError> {
        let bytes = encode_png(pixmap)?;
        Ok(Bitmap {
            width: pixmap.width(),
            height: pixmap.height(),
            bytes,
        })
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

fn load_fonts(fonts: Vec<(String, Vec<u8>)>) -> fontdb::Database {
    let mut fontdb = fontdb::Database::new();

    for (name, data) in fonts {
        fontdb.load_font_data(data);
        tracing::debug!(font = %name, "Loaded font");
    }

    fontdb.load_system_fonts();

    tracing::debug!(
        font_count = fontdb.len(),
        "Loaded fonts for SVG text rendering"
    );

    fontdb
}

/// Encode a premultiplied pixmap as straight-alpha RGBA PNG.
fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, RasterError> {
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let color = pixel.demultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
        .collect();

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RasterError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(&data)
            .map_err(|e| RasterError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Where a finished bitmap goes.
pub enum Delivery {
    Save {
        filename: String,
        trigger: Arc<dyn SaveTrigger>,
    },
    Callback(Box<dyn FnOnce(Bitmap) + Send + 'static>),
}

/// Runs raster exports as background tasks.
#[derive(Clone)]
pub struct RasterPipeline {
    rasterizer: Arc<Rasterizer>,
    capabilities: Capabilities,
}

impl RasterPipeline {
    pub fn new(rasterizer: Arc<Rasterizer>, capabilities: Capabilities) -> Self {
        Self {
            rasterizer,
            capabilities,
        }
    }

    /// Rasterize `data_uri` and deliver the bitmap.
    ///
    /// Decoding and drawing run on the blocking pool; the task runs once and
    /// cannot be cancelled. Failures are logged and nothing is delivered.
    /// Must be called from within a tokio runtime.
    pub fn run(&self, data_uri: String, delivery: Delivery) -> RasterJob {
        let rasterizer = self.rasterizer.clone();
        let extraction = self.capabilities.bitmap_extraction;

        let handle = tokio::task::spawn_blocking(move || {
            let pixmap = match rasterizer.draw(&data_uri) {
                Ok(pixmap) => pixmap,
                Err(e) => {
                    tracing::warn!(%e, "Failed to decode image, nothing delivered");
                    return;
                }
            };

            if !extraction {
                tracing::debug!("Bitmap extraction unavailable, raster export skipped");
                return;
            }

            match rasterizer.extract(&pixmap) {
                Ok(bitmap) => deliver(bitmap, delivery),
                Err(e) => tracing::warn!(%e, "Failed to extract bitmap, nothing delivered"),
            }
        });

        RasterJob { handle }
    }
}

fn deliver(bitmap: Bitmap, delivery: Delivery) {
    match delivery {
        Delivery::Save { filename, trigger } => {
            match trigger.save(&filename, SavePayload::Blob(bitmap.into_blob())) {
                Ok(outcome) => tracing::debug!(
                    path = %outcome.path.display(),
                    bytes = outcome.bytes_written,
                    "Raster export saved"
                ),
                Err(e) => tracing::error!(%e, %filename, "Failed to save raster export"),
            }
        }
        Delivery::Callback(callback) => callback(bitmap),
    }
}

/// Handle to a running raster export. Dropping it detaches the task.
pub struct RasterJob {
    handle: JoinHandle<()>,
}

impl RasterJob {
    /// Wait until the export has delivered, or given up.
    pub async fn wait(self) {
        if let Err(e) = self.handle.await {
            tracing::error!(%e, "Raster task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::to_data_uri;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="30"><rect width="40" height="30" style="fill: red"/></svg>"#;

    fn uri(markup: &str) -> String {
        to_data_uri(markup, &Capabilities::default())
    }

    fn png_size(bytes: &[u8]) -> (u32, u32) {
        let decoder = png::Decoder::new(Cursor::new(bytes));
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        (info.width, info.height)
    }

    #[test]
    fn test_draw_uses_natural_size() {
        let rasterizer = Rasterizer::new();
        let pixmap = rasterizer.draw(&uri(SQUARE)).unwrap();

        assert_eq!((pixmap.width(), pixmap.height()), (40, 30));
        let center = pixmap.pixel(20, 15).unwrap().demultiply();
        assert_eq!(
            (center.red(), center.green(), center.blue(), center.alpha()),
            (255, 0, 0, 255)
        );
    }

    #[test]
    fn test_fonts_load_on_first_draw() {
        let rasterizer = Rasterizer::new();
        assert!(!rasterizer.fonts_loaded());

        rasterizer.draw(&uri(SQUARE)).unwrap();
        assert!(rasterizer.fonts_loaded());
    }

    #[test]
    fn test_draw_percent_encoded_uri() {
        let rasterizer = Rasterizer::new();
        let caps = Capabilities {
            base64: false,
            ..Default::default()
        };
        let pixmap = rasterizer.draw(&to_data_uri(SQUARE, &caps)).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (40, 30));
    }

    #[test]
    fn test_draw_invalid_svg() {
        let rasterizer = Rasterizer::new();
        let result = rasterizer.draw(&uri("<svg"));
        assert!(matches!(result, Err(RasterError::SvgParse(_))));
    }

    #[test]
    fn test_extract_png() {
        let rasterizer = Rasterizer::new();
        let pixmap = rasterizer.draw(&uri(SQUARE)).unwrap();
        let bitmap = rasterizer.extract(&pixmap).unwrap();

        assert_eq!(&bitmap.bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!((bitmap.width, bitmap.height), (40, 30));
        assert_eq!(png_size(&bitmap.bytes), (40, 30));
        assert_eq!(bitmap.into_blob().mime, "image/png");
    }

    #[tokio::test]
    async fn test_pipeline_callback_runs_once() {
        let pipeline = RasterPipeline::new(Arc::new(Rasterizer::new()), Capabilities::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let size = Arc::new(Mutex::new(None));

        let (calls_cb, size_cb) = (calls.clone(), size.clone());
        pipeline
            .run(
                uri(SQUARE),
                Delivery::Callback(Box::new(move |bitmap| {
                    calls_cb.fetch_add(1, Ordering::SeqCst);
                    *size_cb.lock().unwrap() = Some((bitmap.width, bitmap.height));
                })),
            )
            .wait()
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*size.lock().unwrap(), Some((40, 30)));
    }

    #[tokio::test]
    async fn test_pipeline_without_extraction_is_silent() {
        let caps = Capabilities {
            bitmap_extraction: false,
            ..Default::default()
        };
        let pipeline = RasterPipeline::new(Arc::new(Rasterizer::new()), caps);
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_cb = calls.clone();
        pipeline
            .run(
                uri(SQUARE),
                Delivery::Callback(Box::new(move |_| {
                    calls_cb.fetch_add(1, Ordering::SeqCst);
                })),
            )
            .wait()
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_pipeline_decode_failure_is_silent() {
        let pipeline = RasterPipeline::new(Arc::new(Rasterizer::new()), Capabilities::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_cb = calls.clone();
        pipeline
            .run(
                "data:image/svg+xml;base64,!!!".to_string(),
                Delivery::Callback(Box::new(move |_| {
                    calls_cb.fetch_add(1, Ordering::SeqCst);
                })),
            )
            .wait()
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
