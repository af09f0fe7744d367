//! Photo payloads for the upload endpoints
//!
//! A [`FilePart`] owns the bytes of one file; [`FilePart::form`] borrows them
//! into the single-file `multipart/form-data` form the endpoints accept.

use std::path::Path;
use thiserror::Error;
use ureq::unversioned::multipart::{Form, Part};

/// 1x1 RGB PNG used when no photo is configured
pub const SAMPLE_PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01\x00\x00\x00\x01\x08\x02\x00\x00\x00\x90wS\xde\x00\x00\x00\tpHYs\x00\x00\x0b\x13\x00\x00\x0b\x13\x01\x00\x9a\x9c\x18\x00\x00\x00\nIDATx\x9cc\xf8\x00\x00\x00\x01\x00\x01\x00\x00\x00\x00IEND\xaeB`\x82";

#[derive(Error, Debug)]
pub enum MultipartError {
    #[error("Failed to read photo {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid content type '{content_type}': {source}")]
    ContentType {
        content_type: String,
        source: ureq::Error,
    },
}

/// One file field of a form
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(field: &str, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            field: field.to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        }
    }

    /// The built-in `test.png` sample
    pub fn sample_png(field: &str) -> Self {
        Self::new(field, "test.png", "image/png", SAMPLE_PNG.to_vec())
    }

    /// Read a file from disk, guessing its content type from the extension
    pub fn from_path(field: &str, path: &Path) -> Result<Self, MultipartError> {
        let bytes = std::fs::read(path).map_err(|source| MultipartError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        Ok(Self::new(field, &file_name, &content_type, bytes))
    }

    /// A form holding this file as its only part
    pub fn form(&self) -> Result<Form<'_>, MultipartError> {
        let part = Part::bytes(&self.bytes)
            .file_name(&self.file_name)
            .mime_str(&self.content_type)
            .map_err(|source| MultipartError::ContentType {
                content_type: self.content_type.clone(),
                source,
            })?;
        Ok(Form::new().part(&self.field, part))
    }
}
