use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::storage::{ObjectStore, StoredObject, UploadTarget};

/// Records uploads in memory. Filenames listed in `fail_on` are rejected.
#[derive(Default)]
pub struct MemoryStore {
    pub uploads: Mutex<Vec<(UploadTarget, Vec<u8>)>>,
    pub fail_on: Vec<String>,
}

impl MemoryStore {
    pub fn failing_on(filenames: &[&str]) -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            fail_on: filenames.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn uploaded_filenames(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(target, _)| target.filename.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        target: &UploadTarget,
    ) -> Result<StoredObject, AppError> {
        if self.fail_on.contains(&target.filename) {
            return Err(AppError::Storage(format!("refusing {}", target.filename)));
        }
        let key = target.key();
        self.uploads.lock().unwrap().push((target.clone(), bytes));
        Ok(StoredObject {
            url: format!("memory://{key}"),
            key,
        })
    }
}
