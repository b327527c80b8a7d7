//! Local file system object store for development and testing.

use std::path::Path;
use std::sync::Arc;

use object_store::{local::LocalFileSystem, Error as ObjectStoreError, ObjectStore};
use tempfile::TempDir;

/// Object store backed by a temporary directory that is cleaned up when the
/// value is dropped. Ideal for development and tests where nothing should
/// persist.
pub struct TemporaryFileSystem {
    temp_dir: TempDir,
    store: Arc<dyn ObjectStore>,
}

impl TemporaryFileSystem {
    pub fn new() -> Result<Self, ObjectStoreError> {
        let temp_dir = TempDir::new().map_err(|e| ObjectStoreError::Generic {
            store: "TemporaryFileSystem",
            source: Box::new(e),
        })?;

        let local_fs = LocalFileSystem::new_with_prefix(temp_dir.path())?;

        Ok(Self {
            temp_dir,
            store: Arc::new(local_fs),
        })
    }

    pub fn store(&self) -> Arc<dyn ObjectStore> {
        self.store.clone()
    }

    pub fn root_path(&self) -> &Path {
        self.temp_dir.path()
    }
}

#[cfg(test)]
mod tests {
    use object_store::{path::Path as ObjectPath, PutPayload};

    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let fs = TemporaryFileSystem::new().unwrap();
        let store = fs.store();

        let path = ObjectPath::from("events/t1/data.parquet");
        store
            .put(&path, PutPayload::from_static(b"hello"))
            .await
            .unwrap();

        let data = store.get(&path).await.unwrap().bytes().await.unwrap();
        assert_eq!(data.as_ref(), b"hello");
    }

    #[test]
    fn test_cleanup_on_drop() {
        let root = {
            let fs = TemporaryFileSystem::new().unwrap();
            let root = fs.root_path().to_path_buf();
            assert!(root.exists());
            root
        };

        assert!(!root.exists());
    }
}
