// API client library for Notebook Deck
//
// This crate provides HTTP client functionality for communicating
// with the notebook API server from the browser-based frontend.

pub mod errors;
pub mod http_client;

// Re-export commonly used items
pub use errors::ApiError;
pub use http_client::{
    create_notebook, delete_notebook, fetch_ppt_config, get_notebook, list_notebooks,
    request_outline, request_slide_image, update_notebook,
};
