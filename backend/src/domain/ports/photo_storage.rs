//! Port for persisting uploaded bootcamp photos.

use async_trait::async_trait;

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Errors raised by photo storage adapters.
    pub enum PhotoStorageError {
        /// The target name would escape the upload directory.
        InvalidName { name: String } => "invalid photo file name: {name}",
        /// Writing the file failed.
        Io { message: String } => "photo storage write failed: {message}",
    }
}

impl From<PhotoStorageError> for Error {
    fn from(value: PhotoStorageError) -> Self {
        Self::upstream(format!("Problem with file upload: {value}"))
    }
}

/// Destination for uploaded files.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Write `bytes` under `file_name`, replacing any previous file.
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), PhotoStorageError>;
}
