//! Upload storage adapters.

mod fs_photo_storage;

pub use fs_photo_storage::FsPhotoStorage;
