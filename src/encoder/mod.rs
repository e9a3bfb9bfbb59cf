//! Image file encoding module

pub mod file;

pub use file::FileEncoder;

use std::path::Path;

use crate::{error::EncodingResult, types::RawImage};

/// Trait for encoders that persist a captured image
pub trait ImageEncoder {
    /// Encode `image` and write it to `path`.
    ///
    /// The parent directory must already exist; encoders never create it.
    fn encode_to(&self, image: &RawImage, path: &Path) -> EncodingResult<()>;

    /// File extension (without dot) of the files this encoder writes
    fn extension(&self) -> &str;

    /// Get encoder name
    fn name(&self) -> &str;
}

impl<E: ImageEncoder + ?Sized> ImageEncoder for &E {
    fn encode_to(&self, image: &RawImage, path: &Path) -> EncodingResult<()> {
        (**self).encode_to(image, path)
    }

    fn extension(&self) -> &str {
        (**self).extension()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Encoder statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncoderStats {
    /// Total images written
    pub images_encoded: u64,
    /// Total raw bytes processed
    pub bytes_processed: u64,
    /// Images that failed to encode or write
    pub failures: u64,
}

impl EncoderStats {
    /// Record a successful encoding of `input_size` raw bytes
    pub fn record_success(&mut self, input_size: usize) {
        self.images_encoded += 1;
        self.bytes_processed += input_size as u64;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }
}
