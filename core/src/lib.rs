// Notebook Deck - Core Library

pub mod directory;
pub mod export_flow;
pub mod layout;
pub mod models;
pub mod outline;
pub mod validation;

pub use directory::*;
pub use export_flow::*;
pub use layout::*;
pub use models::*;
pub use outline::{
    effective_max_slides, normalize_color, normalize_outline, parse_outline, trim_source, OutlineError,
    DEFAULT_ACCENT_COLOR, DEFAULT_DECK_TITLE, DEFAULT_THEME_COLOR, MAX_SOURCE_CHARS,
};
pub use validation::*;
