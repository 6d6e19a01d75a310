use crate::error::{RelayError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

/// Image bytes for the lifetime of a single request.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Accepts plain base64 or a `data:image/...;base64,` URI.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim();
        let data = match encoded.strip_prefix("data:image/") {
            Some(rest) => rest
                .split_once(";base64,")
                .map(|(_, data)| data)
                .ok_or_else(|| RelayError::Validation("Invalid image data URI format".into()))?,
            None => encoded,
        };

        let bytes = STANDARD
            .decode(data)
            .map_err(|e| RelayError::Validation(format!("Invalid base64 image format: {}", e)))?;

        Ok(Self { bytes })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::detect(&self.bytes)
    }

    /// Checks size against `limit` and that the bytes are JPEG or PNG.
    pub fn validate(&self, limit: usize) -> Result<ImageFormat> {
        if self.is_empty() {
            return Err(RelayError::Validation("No image file provided".into()));
        }
        if self.len() > limit {
            return Err(RelayError::SizeLimit(format!(
                "Image size {} bytes exceeds the {} byte limit",
                self.len(),
                limit
            )));
        }
        self.format().ok_or_else(|| {
            RelayError::Validation("Unsupported image format, expected JPEG or PNG".into())
        })
    }
}
