use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::path::PathBuf;

use super::AuthRecord;

/// A place `RefreshingAuthProvider` can load and persist an [`AuthRecord`] for one user.
///
/// Implementations are expected to be safe to call concurrently with themselves (the provider
/// never holds more than one `update` in flight per record, but makes no promises across
/// multiple provider instances sharing a store).
#[async_trait]
pub trait AuthStore: Debug + Send + Sync + 'static {
    type Error: Send + Sync + Debug + Display;

    async fn get(&self, user_id: &str) -> Result<AuthRecord, Self::Error>;
    async fn update(&self, record: &AuthRecord) -> Result<(), Self::Error>;
}

/// One JSON file per user, at `<dir>/auth.<user_id>.json`, pretty-printed with a two-space
/// indent and mode 0644 on unix. This is a reference implementation; nothing in the core
/// requires credentials to live on disk.
#[derive(Debug, Clone)]
pub struct FilesystemAuthStore {
    store_dir: PathBuf,
}

impl FilesystemAuthStore {
    pub fn new(store_dir: impl Into<PathBuf>) -> Result<FilesystemAuthStore, FilesystemStoreError> {
        let store_dir = store_dir.into();
        if store_dir.as_os_str().is_empty() {
            return Err(FilesystemStoreError::BlankStoreLocation);
        }
        Ok(FilesystemAuthStore { store_dir })
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        self.store_dir.join(format!("auth.{user_id}.json"))
    }
}

#[async_trait]
impl AuthStore for FilesystemAuthStore {
    type Error = FilesystemStoreError;

    async fn get(&self, user_id: &str) -> Result<AuthRecord, FilesystemStoreError> {
        let path = self.path_for(user_id);
        let contents = tokio::fs::read(&path).await?;
        let record = serde_json::from_slice(&contents)?;
        Ok(record)
    }

    async fn update(&self, record: &AuthRecord) -> Result<(), FilesystemStoreError> {
        let path = self.path_for(&record.user_id);
        let contents = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&path, contents).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o644);
            tokio::fs::set_permissions(&path, permissions).await?;
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FilesystemStoreError {
    #[error("store location must not be blank")]
    BlankStoreLocation,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed auth record JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(user_id: &str) -> AuthRecord {
        AuthRecord {
            access_token: "access".to_owned(),
            client_id: "client".to_owned(),
            client_secret: "secret".to_owned(),
            expires_in: 3600,
            login: "ynotnauk".to_owned(),
            refresh_token: "refresh".to_owned(),
            scope: vec!["chat:read".to_owned()],
            token_type: "bearer".to_owned(),
            user_id: user_id.to_owned(),
        }
    }

    #[tokio::test]
    async fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemAuthStore::new(dir.path()).unwrap();
        let record = sample_record("142216347");

        store.update(&record).await.unwrap();
        let loaded = store.get("142216347").await.unwrap();

        assert_eq!(loaded, record);
        assert!(dir.path().join("auth.142216347.json").exists());
    }

    #[test]
    fn rejects_blank_store_location() {
        let err = FilesystemAuthStore::new("").unwrap_err();
        assert!(matches!(err, FilesystemStoreError::BlankStoreLocation));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemAuthStore::new(dir.path()).unwrap();
        assert!(store.get("nobody").await.is_err());
    }
}
