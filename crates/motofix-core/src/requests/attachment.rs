//! Voice notes, photos and files sent with a request

use crate::error::{MotofixError, MotofixResult};
use std::path::Path;

/// Largest attachment the requests service accepts
pub const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

/// What an attachment is, which decides its multipart field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Voice,
    Photo,
    File,
}

impl AttachmentKind {
    /// Multipart form field name
    pub fn form_field(&self) -> &'static str {
        match self {
            Self::Voice => "voice",
            Self::Photo => "photos",
            Self::File => "files",
        }
    }
}

/// An in-memory attachment ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn from_bytes(
        kind: AttachmentKind,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> MotofixResult<Self> {
        let attachment = Self {
            kind,
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        };
        attachment.validate()?;
        Ok(attachment)
    }

    /// Read a file, deriving the MIME type from its extension
    pub async fn from_path(kind: AttachmentKind, path: impl AsRef<Path>) -> MotofixResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| MotofixError::io_with_path(e.to_string(), path.display().to_string()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        Self::from_bytes(kind, file_name, mime_for_path(path), bytes)
    }

    fn validate(&self) -> MotofixResult<()> {
        if self.bytes.is_empty() {
            return Err(MotofixError::invalid_field(
                self.kind.form_field(),
                format!("'{}' is empty", self.file_name),
            ));
        }
        if self.bytes.len() > MAX_ATTACHMENT_BYTES {
            return Err(MotofixError::invalid_field(
                self.kind.form_field(),
                format!(
                    "'{}' is larger than {} MB",
                    self.file_name,
                    MAX_ATTACHMENT_BYTES / (1024 * 1024)
                ),
            ));
        }
        if self.kind == AttachmentKind::Photo && !self.mime_type.starts_with("image/") {
            return Err(MotofixError::invalid_field(
                "photos",
                format!("'{}' is not an image", self.file_name),
            ));
        }
        Ok(())
    }
}

fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "webm" => "audio/webm",
        "ogg" | "oga" => "audio/ogg",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
