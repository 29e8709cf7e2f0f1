use crate::tiff::errors::TiffResult;
use crate::utils::logger::Logger;

/// Main interface to the tiffweave library
pub struct RasterKit {
    logger: Logger,
}

impl RasterKit {
    /// Create a new RasterKit instance
    ///
    /// # Arguments
    /// * `log_file` - Optional path to log file, defaults to "rasterkit.log"
    ///
    /// # Returns
    /// A RasterKit instance or an error if initialization fails
    pub fn new(log_file: Option<&str>) -> TiffResult<Self> {
        let log_path = log_file.unwrap_or("rasterkit.log");
        let logger = Logger::new(log_path)?;
        Ok(RasterKit { logger })
    }

    /// Analyze a TIFF file and return information about its structure
    ///
    /// # Arguments
    /// * `input_path` - Path to the TIFF file to analyze
    ///
    /// # Returns
    /// String containing analysis information or an error
    pub fn analyze(&self, input_path: &str) -> TiffResult<String> {
        // Create a TIFF reader and load the file directly
        let mut reader = crate::tiff::TiffReader::new(&self.logger);
        let tiff = reader.load(input_path)?;

        // Format a summary of the file
        let mut result = format!("TIFF Analysis Results:\n");
        result.push_str(&format!("  Format: {}\n", if tiff.is_big_tiff { "BigTIFF" } else { "TIFF" }));
        result.push_str(&format!("  Number of IFDs: {}\n", tiff.ifd_count()));

        // Add details for each IFD
        for (i, ifd) in tiff.ifds.iter().enumerate() {
            result.push_str(&format!("\nIFD #{} (offset: {})\n", i, ifd.offset));
            result.push_str(&format!("  Number of entries: {}\n", ifd.entries.len()));

            if let Some((width, height)) = ifd.get_dimensions() {
                result.push_str(&format!("  Dimensions: {}x{}\n", width, height));
            }

            result.push_str(&format!("  Samples per pixel: {}\n", ifd.get_samples_per_pixel()));

            // Add compression info
            if let Some(entry) = ifd.get_entry(crate::tiff::constants::tags::COMPRESSION) {
                result.push_str(&format!("  Compression: {} ({})\n",
                                         entry.value_offset,
                                         crate::utils::tiff_code_translators::compression_code_to_name(entry.value_offset)));
            }
        }

        Ok(result)
    }
}
