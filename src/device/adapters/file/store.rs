//! File-backed implementation of the device store port.

use super::models::StoredRegistry;
use crate::device::{
    adapters::table::DeviceTable,
    domain::{DeviceAddress, DeviceId, DeviceRecord, DeviceUpdate},
    ports::{DeviceStore, DeviceStoreError, DeviceStoreResult},
};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Device store persisted to a single JSON document.
#[derive(Debug, Clone)]
pub struct FileDeviceStore {
    dir: Arc<Dir>,
    file_name: Arc<str>,
    state: Arc<RwLock<DeviceTable>>,
}

impl FileDeviceStore {
    /// Opens the store at `path`, loading any existing records.
    ///
    /// A missing file yields an empty store and missing parent directories
    /// are created.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceStoreError::Persistence`] when the directory or file
    /// cannot be accessed, and [`DeviceStoreError::InvalidPersistedData`] when
    /// the document is corrupt.
    pub async fn open(path: impl AsRef<Utf8Path>) -> DeviceStoreResult<Self> {
        let full_path = path.as_ref().to_owned();
        let (dir, file_name, records) =
            run_blocking(move || load_from_disk(&full_path)).await?;

        let table = DeviceTable::from_records(records)?;
        info!(
            path = %file_name,
            devices = table.list().len(),
            "device store loaded"
        );
        Ok(Self {
            dir: Arc::new(dir),
            file_name: Arc::from(file_name),
            state: Arc::new(RwLock::new(table)),
        })
    }

    async fn mutate<T, F>(&self, mutation: F) -> DeviceStoreResult<T>
    where
        F: FnOnce(&mut DeviceTable) -> DeviceStoreResult<T> + Send,
        T: Send,
    {
        let mut guard = self.state.write().await;
        let mut staged = guard.clone();
        let outcome = mutation(&mut staged)?;
        self.persist(&staged).await?;
        *guard = staged;
        Ok(outcome)
    }

    async fn persist(&self, table: &DeviceTable) -> DeviceStoreResult<()> {
        let document = StoredRegistry::from_records(&table.list());
        let contents =
            serde_json::to_vec_pretty(&document).map_err(DeviceStoreError::persistence)?;
        let dir = Arc::clone(&self.dir);
        let file_name = Arc::clone(&self.file_name);

        run_blocking(move || replace_atomically(&dir, &file_name, &contents)).await?;
        debug!(path = %self.file_name, devices = document.devices.len(), "device store written");
        Ok(())
    }
}

async fn run_blocking<F, T>(operation: F) -> DeviceStoreResult<T>
where
    F: FnOnce() -> DeviceStoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(operation)
        .await
        .map_err(DeviceStoreError::persistence)?
}

fn load_from_disk(path: &Utf8Path) -> DeviceStoreResult<(Dir, String, Vec<DeviceRecord>)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| {
            DeviceStoreError::persistence(std::io::Error::other(format!(
                "device store path '{path}' must name a file"
            )))
        })?
        .to_owned();
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_owned(),
        _ => Utf8PathBuf::from("."),
    };

    Dir::create_ambient_dir_all(&parent, ambient_authority())
        .map_err(DeviceStoreError::persistence)?;
    let dir =
        Dir::open_ambient_dir(&parent, ambient_authority()).map_err(DeviceStoreError::persistence)?;

    let records = match dir.read_to_string(&file_name) {
        Ok(contents) => serde_json::from_str::<StoredRegistry>(&contents)
            .map_err(DeviceStoreError::invalid_persisted_data)?
            .into_records()?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => return Err(DeviceStoreError::persistence(err)),
    };
    Ok((dir, file_name, records))
}

fn replace_atomically(dir: &Dir, file_name: &str, contents: &[u8]) -> DeviceStoreResult<()> {
    let staging_name = format!("{file_name}.tmp");
    let mut staging = dir
        .create(&staging_name)
        .map_err(DeviceStoreError::persistence)?;
    staging
        .write_all(contents)
        .and_then(|()| staging.sync_all())
        .map_err(DeviceStoreError::persistence)?;
    drop(staging);
    dir.rename(&staging_name, dir, file_name)
        .map_err(DeviceStoreError::persistence)
}

#[async_trait]
impl DeviceStore for FileDeviceStore {
    async fn get(&self, id: DeviceId) -> DeviceStoreResult<DeviceRecord> {
        self.state.read().await.get(id)
    }

    async fn find_by_ip(&self, ip: &DeviceAddress) -> DeviceStoreResult<Option<DeviceRecord>> {
        Ok(self.state.read().await.find_by_ip(ip))
    }

    async fn list(&self) -> DeviceStoreResult<Vec<DeviceRecord>> {
        Ok(self.state.read().await.list())
    }

    async fn put(&self, record: &DeviceRecord) -> DeviceStoreResult<()> {
        let owned = record.clone();
        self.mutate(move |table| table.put(owned)).await
    }

    async fn apply(&self, id: DeviceId, update: DeviceUpdate) -> DeviceStoreResult<DeviceRecord> {
        self.mutate(move |table| table.apply(id, update)).await
    }

    async fn delete(&self, id: DeviceId) -> DeviceStoreResult<()> {
        self.mutate(move |table| table.delete(id).map(|_| ()))
            .await
    }
}
