//! Session signing key loading.

use std::path::{Path, PathBuf};

use actix_web::cookie::Key;
use tracing::warn;

/// Shortest key material accepted from disk.
const SESSION_KEY_MIN_LEN: usize = 64;

/// Build mode for key validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds fall back to a generated key.
    Debug,
    /// Release builds require key material unless explicitly overridden.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Errors raised while loading the session key.
#[derive(thiserror::Error, Debug)]
pub enum SessionKeyError {
    /// Reading the key file failed and no fallback is allowed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file is too short to derive a key from.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Load the session key from `path`, generating a throwaway one when the file
/// is unreadable and either the build is a debug build or `allow_ephemeral`
/// is set.
pub fn load_session_key(
    path: &Path,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionKeyError> {
    match std::fs::read(path) {
        Ok(bytes) if bytes.len() < SESSION_KEY_MIN_LEN => Err(SessionKeyError::KeyTooShort {
            path: path.to_path_buf(),
            length: bytes.len(),
            min_len: SESSION_KEY_MIN_LEN,
        }),
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(source) if mode == BuildMode::Debug || allow_ephemeral => {
            warn!(path = %path.display(), error = %source, "using temporary session key (dev only)");
            Ok(Key::generate())
        }
        Err(source) => Err(SessionKeyError::KeyRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}
