// Shared handler state

use std::sync::Arc;

use notebook_deck_storageservice::{FileNotebookBackend, ImageCache, StorageService};

use crate::config::{AppConfig, DeckSettings};
use crate::deck_service::DeckService;
use crate::errors::ApiResult;

pub type NotebookStore = StorageService<FileNotebookBackend>;

#[derive(Clone)]
pub struct AppState {
    pub notebooks: Arc<NotebookStore>,
    pub deck: Arc<DeckService>,
}

impl AppState {
    pub fn new(config: &AppConfig, settings: DeckSettings) -> ApiResult<Self> {
        let backend = FileNotebookBackend::new(config.server.notebook_dir())?;
        let cache = ImageCache::new(config.server.image_cache_dir());
        Ok(Self {
            notebooks: Arc::new(StorageService::new(backend)),
            deck: Arc::new(DeckService::new(settings, cache)?),
        })
    }
}
