//! Uploaded photo checks and storage naming.

use std::path::Path;

use super::Error;
use super::resource::ResourceId;

/// A file received from a multipart upload.
///
/// Readers stop buffering once the configured maximum is exceeded and set
/// `oversize`; `bytes` then holds only a prefix and must not be stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoUpload {
    /// Client-supplied file name.
    pub file_name: Option<String>,
    /// Declared MIME type.
    pub content_type: Option<String>,
    /// File contents, possibly truncated.
    pub bytes: Vec<u8>,
    /// The upload exceeded the reader's byte budget.
    pub oversize: bool,
}

impl PhotoUpload {
    /// Run the content checks in order: a file is present, it declares an
    /// image type, and it fits within `max_bytes`.
    pub fn check(upload: Option<Self>, max_bytes: u64) -> Result<Self, Error> {
        let upload = upload.ok_or_else(|| Error::invalid_request("Please upload a file"))?;
        let is_image = upload
            .content_type
            .as_deref()
            .is_some_and(|mime| mime.trim().to_ascii_lowercase().starts_with("image"));
        if !is_image {
            return Err(Error::invalid_request("Please upload an image file"));
        }
        let too_large = u64::try_from(upload.bytes.len()).map_or(true, |len| len > max_bytes);
        if upload.oversize || too_large {
            return Err(Error::invalid_request(format!(
                "Please upload an image less than {max_bytes} bytes"
            )));
        }
        Ok(upload)
    }

    /// Deterministic stored name: `photo_<id>.<ext>`.
    ///
    /// The extension comes from the client file name, falling back to the
    /// MIME subtype (`image/png` gives `png`). Only ASCII alphanumerics are
    /// kept so the name never carries path separators.
    #[must_use]
    pub fn stored_name(&self, id: ResourceId) -> String {
        let from_name = self
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .and_then(sanitize_extension);
        let from_mime = || {
            self.content_type
                .as_deref()
                .and_then(|mime| mime.split_once('/'))
                .map(|(_, subtype)| subtype.split(['+', ';']).next().unwrap_or_default())
                .and_then(sanitize_extension)
        };
        match from_name.or_else(from_mime) {
            Some(ext) => format!("photo_{id}.{ext}"),
            None => format!("photo_{id}"),
        }
    }
}

fn sanitize_extension(raw: &str) -> Option<String> {
    let ext: String = raw
        .trim()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect();
    (!ext.is_empty()).then_some(ext)
}
