use crate::core::{converter, exporter, extractor, resolver};
use crate::domain::model::{BatchSummary, ConvertedFile};
use crate::domain::ports::{ConfigProvider, RasterBackend, Storage};
use crate::utils::error::{ConvertError, Result};
use crate::utils::monitor::SystemMonitor;
use std::path::Path;

/// Drives one run: resolve inputs, then convert and export each file in turn.
pub struct BatchConverter<B: RasterBackend, S: Storage, C: ConfigProvider> {
    backend: B,
    storage: S,
    config: C,
    monitor: SystemMonitor,
}

impl<B: RasterBackend, S: Storage, C: ConfigProvider> BatchConverter<B, S, C> {
    pub fn new(backend: B, storage: S, config: C) -> Self {
        Self::new_with_monitoring(backend, storage, config, false)
    }

    pub fn new_with_monitoring(backend: B, storage: S, config: C, monitor_enabled: bool) -> Self {
        Self {
            backend,
            storage,
            config,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Converts everything `input` resolves to.
    ///
    /// Files the raster library cannot open are reported and skipped. Conversion
    /// failures abort the run unless the configuration asks to keep going.
    pub fn run(&self, input: &Path) -> Result<BatchSummary> {
        let files = resolver::resolve_inputs(input)?;
        tracing::info!(
            "Converting {} file(s) to {}",
            files.len(),
            self.config.format()
        );

        let mut summary = BatchSummary::default();
        for file in files {
            match self.process_file(&file) {
                Ok(converted) => summary.converted.push(converted),
                Err(e @ ConvertError::OpenFailure { .. }) => {
                    tracing::warn!("{}", e);
                    eprintln!("{}", e);
                    summary.skipped.push(file);
                }
                Err(e) if self.config.keep_going() && e.is_per_file() => {
                    tracing::error!("Failed to convert {}: {}", file.display(), e);
                    eprintln!("Error: {}", e);
                    summary.failed.push(file);
                }
                Err(e) => return Err(e),
            }
            self.monitor.log_stats("After file");
        }

        tracing::info!(
            "Done: {} converted, {} skipped, {} failed",
            summary.converted.len(),
            summary.skipped.len(),
            summary.failed.len()
        );
        for converted in &summary.converted {
            tracing::debug!(
                "{} -> {} + {}",
                converted.input.display(),
                converted.image.display(),
                converted.sidecar.display()
            );
        }
        for skipped in &summary.skipped {
            tracing::debug!("Skipped: {}", skipped.display());
        }
        for failed in &summary.failed {
            tracing::debug!("Failed: {}", failed.display());
        }
        self.monitor.log_final_stats();

        Ok(summary)
    }

    /// Converts a single file. The dataset is closed before this returns, on every path.
    pub fn process_file(&self, input: &Path) -> Result<ConvertedFile> {
        tracing::info!("Processing: {}", input.display());
        println!("Processing: {}", input.display());

        let dataset = self.backend.open(input)?;

        let format = self.config.format();
        let image = converter::output_image_path(input, self.config.output_folder(), format);
        let sidecar = converter::sidecar_path(&image);

        converter::convert_image(
            &self.backend,
            &dataset,
            &image,
            format,
            self.config.jpeg_quality(),
        )?;

        let metadata = extractor::extract_metadata(&dataset, input, &image)?;
        drop(dataset);

        exporter::export_metadata(&self.storage, &metadata, &sidecar)?;

        tracing::info!("  -> Image: {}", image.display());
        tracing::info!("  -> JSON : {}", sidecar.display());
        println!("  -> Image: {}", image.display());
        println!("  -> JSON : {}", sidecar.display());

        Ok(ConvertedFile {
            input: input.to_path_buf(),
            image,
            sidecar,
        })
    }
}
