//! Filesystem photo storage rooted at the configured upload directory.
//!
//! Writes go through a `cap_std` directory handle so a file name can never
//! resolve outside the upload root. Each upload is staged under a temporary
//! name and renamed into place, so readers never observe a partial file.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use uuid::Uuid;

use crate::domain::ports::{PhotoStorage, PhotoStorageError};

/// Photo storage writing into a single flat directory.
#[derive(Clone)]
pub struct FsPhotoStorage {
    root: PathBuf,
    directory: Arc<Dir>,
}

impl FsPhotoStorage {
    /// Open (creating when missing) the upload directory at `root`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the directory cannot be created
    /// or opened.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        Dir::create_ambient_dir_all(&root, ambient_authority())?;
        let directory = Dir::open_ambient_dir(&root, ambient_authority())?;
        Ok(Self {
            root,
            directory: Arc::new(directory),
        })
    }

    /// Upload directory on the host filesystem.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }
}

fn validate_name(file_name: &str) -> Result<(), PhotoStorageError> {
    let invalid = file_name.is_empty()
        || file_name.starts_with('.')
        || file_name.contains(['/', '\\', '\0'])
        || file_name.contains("..");
    if invalid {
        return Err(PhotoStorageError::invalid_name(file_name));
    }
    Ok(())
}

fn write_staged(directory: &Dir, file_name: &str, bytes: &[u8]) -> io::Result<()> {
    let staged = format!(".upload-{}", Uuid::new_v4().simple());
    if let Err(error) = directory.write(Path::new(&staged), bytes) {
        let _cleanup_result = directory.remove_file(Path::new(&staged));
        return Err(error);
    }
    directory
        .rename(Path::new(&staged), directory, Path::new(file_name))
        .inspect_err(|_| {
            let _cleanup_result = directory.remove_file(Path::new(&staged));
        })
}

#[async_trait]
impl PhotoStorage for FsPhotoStorage {
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), PhotoStorageError> {
        validate_name(file_name)?;
        let directory = Arc::clone(&self.directory);
        let name = file_name.to_owned();
        tokio::task::spawn_blocking(move || write_staged(&directory, &name, &bytes))
            .await
            .map_err(|error| PhotoStorageError::io(format!("write task failed: {error}")))?
            .map_err(|error| PhotoStorageError::io(error.to_string()))?;
        tracing::debug!(file_name, root = %self.root.display(), "photo stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn storage() -> (tempfile::TempDir, FsPhotoStorage) {
        let temp = tempfile::tempdir().expect("temp dir");
        let storage = FsPhotoStorage::open(temp.path().join("uploads")).expect("open storage");
        (temp, storage)
    }

    #[tokio::test]
    async fn saves_and_replaces_files() {
        let (_temp, storage) = storage();
        storage
            .save("photo_1.jpg", b"first".to_vec())
            .await
            .expect("first write");
        storage
            .save("photo_1.jpg", b"second".to_vec())
            .await
            .expect("second write");

        let directory = Dir::open_ambient_dir(storage.root(), ambient_authority()).expect("open");
        let contents = directory.read(Path::new("photo_1.jpg")).expect("read back");
        assert_eq!(contents, b"second");
        let entries = directory.entries().expect("list").count();
        assert_eq!(entries, 1, "staging files are cleaned up");
    }

    #[rstest]
    #[case("")]
    #[case("../escape.jpg")]
    #[case("nested/photo.jpg")]
    #[case(".hidden")]
    #[tokio::test]
    async fn rejects_names_that_leave_the_root(#[case] name: &str) {
        let (_temp, storage) = storage();
        let error = storage
            .save(name, b"x".to_vec())
            .await
            .expect_err("name rejected");
        assert_eq!(error, PhotoStorageError::invalid_name(name));
    }
}
