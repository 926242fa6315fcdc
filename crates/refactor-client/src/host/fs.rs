use std::path::Path;

/// Synchronous filesystem queries
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
}

/// The local disk
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
