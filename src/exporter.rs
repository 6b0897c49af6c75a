use std::sync::Arc;

use crate::config::{Capabilities, ExportConfig};
use crate::dom::HostDocument;
use crate::encoder::{self, Blob};
use crate::error::ExportError;
use crate::locator::{default_filename, encode_filename, locate, Target};
use crate::policy::Policy;
use crate::raster::{Bitmap, Delivery, RasterJob, RasterPipeline, Rasterizer};
use crate::save::{SaveOutcome, SavePayload, SaveTrigger};

/// Exports SVG elements as markup, SVG files or PNG files.
///
/// Holds no per-call state; one instance can serve every export of an
/// application, from any thread.
pub struct Exporter {
    policy: Arc<Policy>,
    capabilities: Capabilities,
    trigger: Arc<dyn SaveTrigger>,
    raster: RasterPipeline,
}

impl Exporter {
    /// Exporter with the built-in whitelists and all capabilities.
    pub fn new(trigger: Arc<dyn SaveTrigger>) -> Self {
        Self::with_config(&ExportConfig::default(), trigger)
    }

    pub fn with_config(config: &ExportConfig, trigger: Arc<dyn SaveTrigger>) -> Self {
        Self::with_rasterizer(config, trigger, Arc::new(Rasterizer::new()))
    }

    /// Share one rasterizer (and its font database) between exporters.
    pub fn with_rasterizer(
        config: &ExportConfig,
        trigger: Arc<dyn SaveTrigger>,
        rasterizer: Arc<Rasterizer>,
    ) -> Self {
        let policy = if config.attrs.is_none() && config.styles.is_none() {
            Policy::shared()
        } else {
            Arc::new(
                Policy::shared().with_overrides(config.attrs.as_deref(), config.styles.as_deref()),
            )
        };

        Self {
            policy,
            capabilities: config.capabilities,
            trigger,
            raster: RasterPipeline::new(rasterizer, config.capabilities),
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Cleaned, self-contained markup of the target element.
    pub fn get_markup<'d, H: HostDocument>(
        &self,
        host: &'d H,
        target: Target<H::Node<'d>>,
    ) -> Result<String, ExportError> {
        let node = locate(host, target)?;
        Ok(encoder::serialize(&node, &self.policy))
    }

    /// The markup as a `text/xml` blob.
    pub fn get_blob<'d, H: HostDocument>(
        &self,
        host: &'d H,
        target: Target<H::Node<'d>>,
    ) -> Result<Blob, ExportError> {
        Ok(encoder::to_blob(&self.get_markup(host, target)?))
    }

    /// The markup as an `image/svg+xml` data URI.
    pub fn get_data_uri<'d, H: HostDocument>(
        &self,
        host: &'d H,
        target: Target<H::Node<'d>>,
    ) -> Result<String, ExportError> {
        let markup = self.get_markup(host, target)?;
        Ok(encoder::to_data_uri(&markup, &self.capabilities))
    }

    /// Save the target element as an SVG file.
    ///
    /// The name defaults to the element's title (or `untitled`) with an
    /// `.svg` extension.
    pub fn export_as_vector<'d, H: HostDocument>(
        &self,
        host: &'d H,
        target: Target<H::Node<'d>>,
        filename: Option<&str>,
    ) -> Result<SaveOutcome, ExportError> {
        let node = locate(host, target)?;
        let filename = resolve_filename(filename, || default_filename(&node, "svg"));
        let markup = encoder::serialize(&node, &self.policy);

        let payload = if self.capabilities.binary_save {
            SavePayload::Blob(encoder::to_blob(&markup))
        } else {
            SavePayload::DataUri(encoder::to_data_uri(&markup, &self.capabilities))
        };

        tracing::debug!(%filename, bytes = markup.len(), "Exporting SVG");
        Ok(self.trigger.save(&filename, payload)?)
    }

    /// Save the target element as a PNG file.
    ///
    /// Element lookup fails synchronously; rasterizing and saving happen in
    /// the returned job.
    pub fn export_as_raster<'d, H: HostDocument>(
        &self,
        host: &'d H,
        target: Target<H::Node<'d>>,
        filename: Option<&str>,
    ) -> Result<RasterJob, ExportError> {
        let node = locate(host, target)?;
        let filename = resolve_filename(filename, || default_filename(&node, "png"));
        let markup = encoder::serialize(&node, &self.policy);
        let uri = encoder::to_data_uri(&markup, &self.capabilities);

        tracing::debug!(%filename, "Exporting PNG");
        Ok(self.raster.run(
            uri,
            Delivery::Save {
                filename,
                trigger: self.trigger.clone(),
            },
        ))
    }

    /// Rasterize the target element and hand the bitmap to `callback`.
    ///
    /// The callback runs at most once, on a blocking worker thread.
    pub fn export_as_raster_blob<'d, H, F>(
        &self,
        host: &'d H,
        target: Target<H::Node<'d>>,
        callback: F,
    ) -> Result<RasterJob, ExportError>
    where
        H: HostDocument,
        F: FnOnce(Bitmap) + Send + 'static,
    {
        let uri = self.get_data_uri(host, target)?;
        Ok(self.raster.run(uri, Delivery::Callback(Box::new(callback))))
    }
}

fn resolve_filename(given: Option<&str>, default: impl FnOnce() -> String) -> String {
    match given.filter(|name| !name.is_empty()) {
        Some(name) => encode_filename(name),
        None => default(),
    }
}
