use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use pharmabot_core::domain::order::OrderRecord;

pub const ORDER_LOG_HEADER: [&str; 6] = ["datetime", "name", "phone", "address", "items", "total"];

#[derive(Debug, Error)]
pub enum OrderLogError {
    #[error("order log i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("order log csv error: {0}")]
    Csv(#[from] csv::Error),
}

#[async_trait]
pub trait OrderLog: Send + Sync {
    async fn append(&self, record: &OrderRecord) -> Result<(), OrderLogError>;
}

/// CSV file opened, appended and closed on every write. The header row is
/// written only when the file is created or empty.
pub struct CsvOrderLog {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvOrderLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Arc::new(Mutex::new(())) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl OrderLog for CsvOrderLog {
    async fn append(&self, record: &OrderRecord) -> Result<(), OrderLogError> {
        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();
        let row = [
            record.timestamp(),
            record.name.clone(),
            record.phone.clone(),
            record.address.clone(),
            record.items.clone(),
            record.total.clone(),
        ];

        tokio::task::spawn_blocking(move || append_row(&path, &row))
            .await
            .map_err(|error| OrderLogError::Io(io::Error::other(error.to_string())))?
    }
}

fn append_row(path: &Path, row: &[String; 6]) -> Result<(), OrderLogError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let needs_header = match fs::metadata(path) {
        Ok(metadata) => metadata.len() == 0,
        Err(error) if error.kind() == io::ErrorKind::NotFound => true,
        Err(error) => return Err(error.into()),
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    if needs_header {
        writer.write_record(ORDER_LOG_HEADER)?;
    }
    writer.write_record(row)?;
    writer.flush()?;
    Ok(())
}

#[derive(Default)]
pub struct InMemoryOrderLog {
    records: RwLock<Vec<OrderRecord>>,
}

impl InMemoryOrderLog {
    pub async fn records(&self) -> Vec<OrderRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl OrderLog for InMemoryOrderLog {
    async fn append(&self, record: &OrderRecord) -> Result<(), OrderLogError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}
