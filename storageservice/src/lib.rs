// Storage service library for the notebook directory
//
// This crate provides storage abstraction with pluggable backends, plus the
// content-addressed cache for generated slide images.

use std::collections::BTreeMap;

use notebook_deck_core::{
    CreateNotebookRequest, Notebook, NotebookId, NotebookRecord, NotebookStatistics,
    NotebookSummary, RecordType, UpdateNotebookRequest,
};

pub mod image_cache;
pub mod local;

pub use image_cache::{cache_key, ImageCache};
pub use local::FileNotebookBackend;

/// Storage-related errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("ファイル入出力エラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("保存データの形式が不正です: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("無効なIDです: {0}")]
    InvalidId(String),

    #[error("ストレージがロックできません")]
    LockPoisoned,
}

/// Storage backend trait
pub trait NotebookBackend: Send + Sync {
    /// Summaries, most recently updated first
    fn list_notebooks(&self) -> Result<Vec<NotebookSummary>, StorageError>;
    fn get_notebook(&self, id: &NotebookId) -> Result<Option<Notebook>, StorageError>;
    fn create_notebook(&self, request: CreateNotebookRequest) -> Result<Notebook, StorageError>;
    fn update_notebook(
        &self,
        id: &NotebookId,
        request: UpdateNotebookRequest,
    ) -> Result<Option<Notebook>, StorageError>;
    /// Removes the notebook and everything in it; false if it did not exist
    fn delete_notebook(&self, id: &NotebookId) -> Result<bool, StorageError>;
    /// Append `record` to every existing notebook in `ids`; returns the ids it was added to
    fn add_record(
        &self,
        ids: &[NotebookId],
        record: &NotebookRecord,
    ) -> Result<Vec<NotebookId>, StorageError>;
    fn remove_record(&self, id: &NotebookId, record_id: &str) -> Result<bool, StorageError>;
}

/// Storage service with pluggable backend
pub struct StorageService<B: NotebookBackend> {
    backend: B,
}

impl<B: NotebookBackend> StorageService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn list_notebooks(&self) -> Result<Vec<NotebookSummary>, StorageError> {
        self.backend.list_notebooks()
    }

    pub fn get_notebook(&self, id: &NotebookId) -> Result<Option<Notebook>, StorageError> {
        self.backend.get_notebook(id)
    }

    pub fn create_notebook(&self, request: CreateNotebookRequest) -> Result<Notebook, StorageError> {
        self.backend.create_notebook(request)
    }

    pub fn update_notebook(
        &self,
        id: &NotebookId,
        request: UpdateNotebookRequest,
    ) -> Result<Option<Notebook>, StorageError> {
        self.backend.update_notebook(id, request)
    }

    pub fn delete_notebook(&self, id: &NotebookId) -> Result<bool, StorageError> {
        self.backend.delete_notebook(id)
    }

    pub fn add_record(
        &self,
        ids: &[NotebookId],
        record: &NotebookRecord,
    ) -> Result<Vec<NotebookId>, StorageError> {
        self.backend.add_record(ids, record)
    }

    pub fn remove_record(&self, id: &NotebookId, record_id: &str) -> Result<bool, StorageError> {
        self.backend.remove_record(id, record_id)
    }

    /// Totals across all notebooks plus the five most recent
    pub fn statistics(&self) -> Result<NotebookStatistics, StorageError> {
        let notebooks = self.backend.list_notebooks()?;

        let mut records_by_type: BTreeMap<RecordType, usize> =
            RecordType::ALL.iter().map(|t| (*t, 0)).collect();
        let mut total_records = 0;

        for summary in &notebooks {
            if let Some(notebook) = self.backend.get_notebook(&summary.id)? {
                for record in &notebook.records {
                    total_records += 1;
                    *records_by_type.entry(record.record_type).or_insert(0) += 1;
                }
            }
        }

        Ok(NotebookStatistics {
            total_notebooks: notebooks.len(),
            total_records,
            records_by_type,
            recent_notebooks: notebooks.into_iter().take(5).collect(),
        })
    }
}
