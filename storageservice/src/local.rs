// Local file backend: one JSON file per notebook plus an index file

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use notebook_deck_core::{
    CreateNotebookRequest, Notebook, NotebookId, NotebookRecord, NotebookSummary,
    UpdateNotebookRequest,
};
use serde::{Deserialize, Serialize};

use super::{NotebookBackend, StorageError};

const INDEX_FILE: &str = "notebooks_index.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct NotebookIndex {
    #[serde(default)]
    notebooks: Vec<NotebookSummary>,
}

/// File-system backend rooted at `base_dir`
pub struct FileNotebookBackend {
    base_dir: PathBuf,
    // Serializes read-modify-write cycles on the index
    lock: Mutex<()>,
}

impl FileNotebookBackend {
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;

        let backend = Self {
            base_dir,
            lock: Mutex::new(()),
        };
        if !backend.index_path().exists() {
            backend.save_index(&NotebookIndex::default())?;
        }
        Ok(backend)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn index_path(&self) -> PathBuf {
        self.base_dir.join(INDEX_FILE)
    }

    fn notebook_path(&self, id: &NotebookId) -> Result<PathBuf, StorageError> {
        let valid = !id.as_str().is_empty()
            && id
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidId(id.to_string()));
        }
        Ok(self.base_dir.join(format!("{}.json", id)))
    }

    fn load_index(&self) -> NotebookIndex {
        match fs::read_to_string(self.index_path()) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!("Notebook index unreadable, starting empty: {}", e);
                NotebookIndex::default()
            }),
            Err(_) => NotebookIndex::default(),
        }
    }

    fn save_index(&self, index: &NotebookIndex) -> Result<(), StorageError> {
        write_json(&self.index_path(), index)
    }

    fn load_notebook(&self, id: &NotebookId) -> Result<Option<Notebook>, StorageError> {
        let path = self.notebook_path(id)?;
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        match serde_json::from_str(&text) {
            Ok(notebook) => Ok(Some(notebook)),
            Err(e) => {
                tracing::warn!("Skipping unreadable notebook {}: {}", id, e);
                Ok(None)
            }
        }
    }

    fn save_notebook(&self, notebook: &Notebook) -> Result<(), StorageError> {
        write_json(&self.notebook_path(&notebook.id)?, notebook)
    }

    /// Refresh the index entry for `notebook`, appending it if missing
    fn sync_index(&self, notebook: &Notebook) -> Result<(), StorageError> {
        let mut index = self.load_index();
        let summary = notebook.summary();
        match index.notebooks.iter_mut().find(|nb| nb.id == notebook.id) {
            Some(entry) => *entry = summary,
            None => index.notebooks.push(summary),
        }
        self.save_index(&index)
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>, StorageError> {
        self.lock.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

/// Write via a temp file and rename so readers never see a partial file
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let text = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl NotebookBackend for FileNotebookBackend {
    fn list_notebooks(&self) -> Result<Vec<NotebookSummary>, StorageError> {
        let _guard = self.guard()?;
        let index = self.load_index();

        let mut notebooks = Vec::with_capacity(index.notebooks.len());
        for entry in &index.notebooks {
            // Notebook files are the source of truth; the index may lag
            if let Some(notebook) = self.load_notebook(&entry.id)? {
                notebooks.push(notebook.summary());
            }
        }

        notebooks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(notebooks)
    }

    fn get_notebook(&self, id: &NotebookId) -> Result<Option<Notebook>, StorageError> {
        let _guard = self.guard()?;
        self.load_notebook(id)
    }

    fn create_notebook(&self, request: CreateNotebookRequest) -> Result<Notebook, StorageError> {
        let _guard = self.guard()?;
        let notebook = Notebook::new(request.name, request.description, request.color, request.icon);
        self.save_notebook(&notebook)?;
        self.sync_index(&notebook)?;
        tracing::info!("Created notebook {} ({})", notebook.id, notebook.name);
        Ok(notebook)
    }

    fn update_notebook(
        &self,
        id: &NotebookId,
        request: UpdateNotebookRequest,
    ) -> Result<Option<Notebook>, StorageError> {
        let _guard = self.guard()?;
        let Some(mut notebook) = self.load_notebook(id)? else {
            return Ok(None);
        };

        if let Some(name) = request.name {
            notebook.name = name;
        }
        if let Some(description) = request.description {
            notebook.description = description;
        }
        if let Some(color) = request.color {
            notebook.color = color;
        }
        if let Some(icon) = request.icon {
            notebook.icon = icon;
        }
        notebook.touch();

        self.save_notebook(&notebook)?;
        self.sync_index(&notebook)?;
        Ok(Some(notebook))
    }

    fn delete_notebook(&self, id: &NotebookId) -> Result<bool, StorageError> {
        let _guard = self.guard()?;
        let path = self.notebook_path(id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;

        let mut index = self.load_index();
        index.notebooks.retain(|nb| &nb.id != id);
        self.save_index(&index)?;
        tracing::info!("Deleted notebook {}", id);
        Ok(true)
    }

    fn add_record(
        &self,
        ids: &[NotebookId],
        record: &NotebookRecord,
    ) -> Result<Vec<NotebookId>, StorageError> {
        let _guard = self.guard()?;
        let mut added_to = Vec::new();
        for id in ids {
            let mut notebook = match self.load_notebook(id) {
                Ok(Some(notebook)) => notebook,
                Ok(None) => {
                    tracing::debug!("add_record: notebook {} not found, skipped", id);
                    continue;
                }
                Err(StorageError::InvalidId(bad)) => {
                    tracing::warn!("add_record: invalid notebook id {:?}, skipped", bad);
                    continue;
                }
                Err(e) => return Err(e),
            };
            notebook.records.push(record.clone());
            notebook.touch();
            self.save_notebook(&notebook)?;
            self.sync_index(&notebook)?;
            added_to.push(id.clone());
        }
        Ok(added_to)
    }

    fn remove_record(&self, id: &NotebookId, record_id: &str) -> Result<bool, StorageError> {
        let _guard = self.guard()?;
        let Some(mut notebook) = self.load_notebook(id)? else {
            return Ok(false);
        };

        let before = notebook.records.len();
        notebook.records.retain(|r| r.id != record_id);
        if notebook.records.len() == before {
            return Ok(false);
        }

        notebook.touch();
        self.save_notebook(&notebook)?;
        self.sync_index(&notebook)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notebook_deck_core::RecordType;

    fn backend() -> (tempfile::TempDir, FileNotebookBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileNotebookBackend::new(dir.path().join("notebook")).unwrap();
        (dir, backend)
    }

    fn create(backend: &FileNotebookBackend, name: &str) -> Notebook {
        backend
            .create_notebook(CreateNotebookRequest {
                name: name.to_string(),
                description: "test".to_string(),
                color: "#3B82F6".to_string(),
                icon: "book".to_string(),
            })
            .unwrap()
    }

    fn record(title: &str) -> NotebookRecord {
        NotebookRecord::new(
            RecordType::Note,
            title.to_string(),
            String::new(),
            "body".to_string(),
            Default::default(),
            None,
        )
    }

    #[test]
    fn test_create_then_list() {
        let (_dir, backend) = backend();
        let created = create(&backend, "Alpha");

        let list = backend.list_notebooks().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, created.id);
        assert_eq!(list[0].name, "Alpha");
        assert_eq!(list[0].description, "test");
        assert_eq!(list[0].color, "#3B82F6");
        assert_eq!(list[0].record_count, 0);
    }

    #[test]
    fn test_delete_removes_from_list() {
        let (_dir, backend) = backend();
        let created = create(&backend, "Alpha");

        assert!(backend.delete_notebook(&created.id).unwrap());
        assert!(backend.list_notebooks().unwrap().is_empty());
        assert!(backend.get_notebook(&created.id).unwrap().is_none());
        assert!(!backend.delete_notebook(&created.id).unwrap());
    }

    #[test]
    fn test_partial_update() {
        let (_dir, backend) = backend();
        let created = create(&backend, "Alpha");

        let updated = backend
            .update_notebook(
                &created.id,
                UpdateNotebookRequest {
                    color: Some("#10B981".to_string()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Alpha");
        assert_eq!(updated.color, "#10B981");
        assert!(updated.updated_at >= updated.created_at);
        assert_eq!(updated.id, created.id);
    }

    #[test]
    fn test_update_missing_returns_none() {
        let (_dir, backend) = backend();
        let result = backend
            .update_notebook(&NotebookId::from("missing1"), UpdateNotebookRequest::default())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_records_update_count() {
        let (_dir, backend) = backend();
        let a = create(&backend, "A");
        let b = create(&backend, "B");

        let rec = record("first");
        let added = backend
            .add_record(&[a.id.clone(), NotebookId::from("ghost123"), b.id.clone()], &rec)
            .unwrap();
        assert_eq!(added, vec![a.id.clone(), b.id.clone()]);

        let list = backend.list_notebooks().unwrap();
        assert!(list.iter().all(|nb| nb.record_count == 1));

        assert!(backend.remove_record(&a.id, &rec.id).unwrap());
        assert!(!backend.remove_record(&a.id, &rec.id).unwrap());
        let a = backend.get_notebook(&a.id).unwrap().unwrap();
        assert!(a.records.is_empty());
    }

    #[test]
    fn test_add_record_skips_malformed_ids() {
        let (_dir, backend) = backend();
        let a = create(&backend, "A");
        let b = create(&backend, "B");

        let rec = record("mixed");
        let added = backend
            .add_record(&[a.id.clone(), NotebookId::from("bad/id"), b.id.clone()], &rec)
            .unwrap();
        assert_eq!(added, vec![a.id.clone(), b.id.clone()]);

        for id in [&a.id, &b.id] {
            let notebook = backend.get_notebook(id).unwrap().unwrap();
            assert_eq!(notebook.records.len(), 1);
            assert_eq!(notebook.records[0].id, rec.id);
        }
    }

    #[test]
    fn test_rejects_path_traversal_ids() {
        let (_dir, backend) = backend();
        let result = backend.get_notebook(&NotebookId::from("../etc"));
        assert!(matches!(result, Err(StorageError::InvalidId(_))));
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let backend = FileNotebookBackend::new(dir.path()).unwrap();
            create(&backend, "Persisted").id
        };
        let backend = FileNotebookBackend::new(dir.path()).unwrap();
        assert_eq!(backend.list_notebooks().unwrap()[0].id, id);
    }
}
