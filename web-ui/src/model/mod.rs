// UI models: reducer stores and browser download

pub mod download;
pub mod store;

pub use download::download_bytes;
pub use store::{DirectoryStore, ExportStore};
