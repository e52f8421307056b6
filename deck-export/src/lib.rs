// PPTX export for slide decks
//
// Builds a minimal PresentationML package from a `Deck` value. Geometry comes
// from the same layout plan the browser preview uses, so the exported slides
// match what was on screen.

mod package;
mod parts;
mod slide_xml;

use notebook_deck_core::Deck;

pub use package::PptxPackage;

/// 16:9 slide width in EMU (13.333 in)
pub const SLIDE_WIDTH_EMU: i64 = 12_192_000;

/// 16:9 slide height in EMU (7.5 in)
pub const SLIDE_HEIGHT_EMU: i64 = 6_858_000;

/// MIME type of the produced file
pub const PPTX_MIME: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("ZIP書き込みエラー: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("入出力エラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML生成エラー")]
    Xml(#[from] std::fmt::Error),
}

/// Assemble `deck` into PPTX bytes
pub fn build_pptx(deck: &Deck) -> Result<Vec<u8>, ExportError> {
    let package = PptxPackage::from_deck(deck)?;
    tracing::debug!(
        "Built PPTX package: {} slides, {} media parts",
        deck.slides.len(),
        package.media_count()
    );
    package.into_bytes()
}

/// Download name: alphanumerics and `._- ` kept, the rest replaced with `_`
pub fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim();

    let stem = if cleaned.is_empty() || cleaned.chars().all(|c| matches!(c, '.' | '_')) {
        "presentation"
    } else {
        cleaned
    };
    format!("{}.pptx", stem)
}
