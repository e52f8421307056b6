// Deck export flow: outline -> editing with background images -> PPTX
//
// The deck is owned by this state and replaced by value on every change.
// Image results carry the deck revision they were requested for; results for
// an older revision (modal closed or reopened) are dropped.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::layout::SlideLayout;
use crate::models::{Deck, ErrorCode, ProcessResult, Slide};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPhase {
    #[default]
    Idle,
    LoadingOutline,
    Editing,
    Exporting,
    Done,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportState {
    pub phase: ExportPhase,
    pub deck: Option<Deck>,
    pub revision: u32,
    /// Slides with an image request in flight
    pub generating: BTreeSet<usize>,
    /// Slides whose image request failed (placeholder stays)
    pub failed_images: BTreeSet<usize>,
    pub notice: Option<ProcessResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExportAction {
    /// Start a new flow; outline request goes out
    Open,
    OutlineLoaded(Deck),
    OutlineFailed(String),
    ImageStarted { revision: u32, index: usize },
    ImageResolved { revision: u32, index: usize, data_url: String },
    ImageFailed { revision: u32, index: usize },
    EditSlide { index: usize, slide: Slide },
    ChangeLayout { index: usize, layout: SlideLayout },
    ExportStarted,
    ExportFinished,
    ExportFailed(String),
    DismissNotice,
    Close,
}

impl ExportState {
    pub fn is_generating(&self, index: usize) -> bool {
        self.generating.contains(&index)
    }

    /// Export is allowed while images are still outstanding
    pub fn can_export(&self) -> bool {
        self.phase == ExportPhase::Editing && self.deck.is_some()
    }

    /// Slides that still need an image request: (index, prompt)
    pub fn pending_images(&self) -> Vec<(usize, String)> {
        let Some(deck) = &self.deck else {
            return Vec::new();
        };
        deck.slides
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.generating.contains(index) && !self.failed_images.contains(index))
            .filter_map(|(index, slide)| slide.pending_prompt().map(|p| (index, p.to_string())))
            .collect()
    }

    fn accepts_image(&self, revision: u32, index: usize) -> bool {
        revision == self.revision
            && matches!(self.phase, ExportPhase::Editing | ExportPhase::Exporting)
            && self.deck.as_ref().is_some_and(|d| index < d.slides.len())
    }

    pub fn reduce(self, action: ExportAction) -> Self {
        match action {
            ExportAction::Open => Self {
                phase: ExportPhase::LoadingOutline,
                deck: None,
                revision: self.revision.wrapping_add(1),
                generating: BTreeSet::new(),
                failed_images: BTreeSet::new(),
                notice: None,
            },
            ExportAction::OutlineLoaded(deck) if self.phase == ExportPhase::LoadingOutline => Self {
                phase: ExportPhase::Editing,
                deck: Some(deck),
                notice: Some(ProcessResult::success(ErrorCode::OutlineReady)),
                ..self
            },
            ExportAction::OutlineFailed(reason) if self.phase == ExportPhase::LoadingOutline => Self {
                phase: ExportPhase::Failed,
                notice: Some(
                    ProcessResult::error(ErrorCode::OutlineError)
                        .with_context(serde_json::json!({ "reason": reason })),
                ),
                ..self
            },
            ExportAction::ImageStarted { revision, index } if self.accepts_image(revision, index) => {
                let mut generating = self.generating.clone();
                let mut failed_images = self.failed_images.clone();
                generating.insert(index);
                failed_images.remove(&index);
                Self {
                    generating,
                    failed_images,
                    ..self
                }
            }
            ExportAction::ImageResolved {
                revision,
                index,
                data_url,
            } if self.accepts_image(revision, index) => {
                let mut generating = self.generating.clone();
                generating.remove(&index);
                let deck = self.deck.as_ref().map(|deck| {
                    let slide = deck.slides[index].with_image(Some(data_url));
                    deck.with_slide(index, slide)
                });
                Self {
                    deck,
                    generating,
                    ..self
                }
            }
            ExportAction::ImageFailed { revision, index } if self.accepts_image(revision, index) => {
                let mut generating = self.generating.clone();
                let mut failed_images = self.failed_images.clone();
                generating.remove(&index);
                failed_images.insert(index);
                Self {
                    generating,
                    failed_images,
                    notice: Some(
                        ProcessResult::error(ErrorCode::ImageGenerationFailed)
                            .with_context(serde_json::json!({ "slide": index + 1 })),
                    ),
                    ..self
                }
            }
            ExportAction::EditSlide { index, slide } if self.phase == ExportPhase::Editing => {
                let deck = self.deck.as_ref().map(|deck| deck.with_slide(index, slide));
                Self { deck, ..self }
            }
            // Points are kept whole so switching back restores hidden ones
            ExportAction::ChangeLayout { index, layout } if self.phase == ExportPhase::Editing => {
                let deck = self.deck.as_ref().map(|deck| match deck.slides.get(index) {
                    Some(slide) => deck.with_slide(index, slide.with_layout(layout)),
                    None => deck.clone(),
                });
                Self { deck, ..self }
            }
            ExportAction::ExportStarted if self.can_export() => Self {
                phase: ExportPhase::Exporting,
                ..self
            },
            ExportAction::ExportFinished if self.phase == ExportPhase::Exporting => Self {
                phase: ExportPhase::Done,
                deck: None,
                revision: self.revision.wrapping_add(1),
                generating: BTreeSet::new(),
                failed_images: BTreeSet::new(),
                notice: Some(ProcessResult::success(ErrorCode::ExportOk)),
            },
            ExportAction::ExportFailed(reason) if self.phase == ExportPhase::Exporting => Self {
                phase: ExportPhase::Editing,
                notice: Some(
                    ProcessResult::error(ErrorCode::ExportError)
                        .with_context(serde_json::json!({ "reason": reason })),
                ),
                ..self
            },
            ExportAction::DismissNotice => Self { notice: None, ..self },
            ExportAction::Close => Self {
                phase: ExportPhase::Idle,
                deck: None,
                revision: self.revision.wrapping_add(1),
                generating: BTreeSet::new(),
                failed_images: BTreeSet::new(),
                notice: None,
            },
            // Anything else arrived in the wrong phase or for a stale deck
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck() -> Deck {
        let mut with_prompt = Slide::new("Image", vec!["a".into()], SlideLayout::SplitImageLeft);
        with_prompt.image_prompt = Some("sunrise".to_string());
        let mut second = Slide::new("Top", vec!["b".into()], SlideLayout::TopImage);
        second.image_prompt = Some("ocean".to_string());
        Deck {
            title: "Deck".to_string(),
            subtitle: String::new(),
            theme_color: "#3b82f6".to_string(),
            accent_color: "#f59e0b".to_string(),
            slides: vec![
                with_prompt,
                second,
                Slide::new("Text", vec!["x".into(), "y".into()], SlideLayout::Typographic),
            ],
        }
    }

    fn editing() -> ExportState {
        ExportState::default()
            .reduce(ExportAction::Open)
            .reduce(ExportAction::OutlineLoaded(deck()))
    }

    #[test]
    fn test_outline_loaded_moves_to_editing() {
        let state = editing();
        assert_eq!(state.phase, ExportPhase::Editing);
        assert_eq!(state.pending_images(), vec![(0, "sunrise".to_string()), (1, "ocean".to_string())]);
    }

    #[test]
    fn test_outline_failure() {
        let state = ExportState::default()
            .reduce(ExportAction::Open)
            .reduce(ExportAction::OutlineFailed("boom".to_string()));
        assert_eq!(state.phase, ExportPhase::Failed);
        assert_eq!(state.notice.unwrap().code, ErrorCode::OutlineError);
    }

    #[test]
    fn test_image_lifecycle() {
        let state = editing();
        let revision = state.revision;
        let state = state.reduce(ExportAction::ImageStarted { revision, index: 0 });
        assert!(state.is_generating(0));
        assert_eq!(state.pending_images(), vec![(1, "ocean".to_string())]);

        let state = state.reduce(ExportAction::ImageResolved {
            revision,
            index: 0,
            data_url: "data:image/png;base64,AAAA".to_string(),
        });
        assert!(!state.is_generating(0));
        let deck = state.deck.as_ref().unwrap();
        assert_eq!(
            deck.slides[0].generated_image_url.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
        assert_eq!(deck.slides[0].title, "Image");
    }

    #[test]
    fn test_image_failure_does_not_block_export() {
        let state = editing();
        let revision = state.revision;
        let state = state
            .reduce(ExportAction::ImageStarted { revision, index: 0 })
            .reduce(ExportAction::ImageStarted { revision, index: 1 })
            .reduce(ExportAction::ImageFailed { revision, index: 1 });
        assert!(state.failed_images.contains(&1));
        assert!(state.deck.as_ref().unwrap().slides[1].generated_image_url.is_none());
        assert!(state.can_export());

        // slide 0 still generating: export goes ahead anyway
        let state = state.reduce(ExportAction::ExportStarted);
        assert_eq!(state.phase, ExportPhase::Exporting);
        let state = state.reduce(ExportAction::ExportFinished);
        assert_eq!(state.phase, ExportPhase::Done);
        assert!(state.deck.is_none());
    }

    #[test]
    fn test_results_out_of_request_order() {
        let state = editing();
        let revision = state.revision;
        let state = state
            .reduce(ExportAction::ImageStarted { revision, index: 0 })
            .reduce(ExportAction::ImageStarted { revision, index: 1 })
            .reduce(ExportAction::ImageResolved {
                revision,
                index: 1,
                data_url: "data:image/png;base64,BBBB".to_string(),
            })
            .reduce(ExportAction::ImageResolved {
                revision,
                index: 0,
                data_url: "data:image/png;base64,AAAA".to_string(),
            });
        assert!(state.generating.is_empty());
        let deck = state.deck.unwrap();
        assert!(deck.slides[0].generated_image_url.is_some());
        assert!(deck.slides[1].generated_image_url.is_some());
    }

    #[test]
    fn test_stale_results_are_discarded() {
        let state = editing();
        let old_revision = state.revision;
        let state = state
            .reduce(ExportAction::Close)
            .reduce(ExportAction::Open)
            .reduce(ExportAction::OutlineLoaded(deck()));
        let state = state.reduce(ExportAction::ImageResolved {
            revision: old_revision,
            index: 0,
            data_url: "data:image/png;base64,OLD".to_string(),
        });
        assert!(state.deck.unwrap().slides[0].generated_image_url.is_none());
    }

    #[test]
    fn test_results_after_close_are_ignored() {
        let state = editing();
        let revision = state.revision;
        let state = state.reduce(ExportAction::Close).reduce(ExportAction::ImageResolved {
            revision,
            index: 0,
            data_url: "data:image/png;base64,AAAA".to_string(),
        });
        assert_eq!(state.phase, ExportPhase::Idle);
        assert!(state.deck.is_none());
    }

    #[test]
    fn test_edit_slide_replaces_by_value() {
        let state = editing();
        let original = state.deck.as_ref().unwrap().slides[2].clone();
        let edited = original.with_point(1, "z".to_string());
        let state = state.reduce(ExportAction::EditSlide {
            index: 2,
            slide: edited,
        });
        let slide = &state.deck.as_ref().unwrap().slides[2];
        assert_eq!(slide.points, vec!["x".to_string(), "z".to_string()]);
        assert_eq!(slide.title, original.title);
    }

    #[test]
    fn test_change_layout_keeps_points() {
        let state = editing().reduce(ExportAction::ChangeLayout {
            index: 2,
            layout: SlideLayout::Overview,
        });
        let slide = &state.deck.as_ref().unwrap().slides[2];
        assert_eq!(slide.layout, SlideLayout::Overview);
        assert_eq!(slide.points.len(), 2);

        let unchanged = editing().reduce(ExportAction::ChangeLayout {
            index: 9,
            layout: SlideLayout::Quote,
        });
        assert_eq!(unchanged.deck, editing().deck);
    }

    #[test]
    fn test_edit_ignored_outside_editing() {
        let state = ExportState::default().reduce(ExportAction::EditSlide {
            index: 0,
            slide: Slide::new("x", vec![], SlideLayout::Quote),
        });
        assert!(state.deck.is_none());
    }

    #[test]
    fn test_export_failure_returns_to_editing() {
        let state = editing()
            .reduce(ExportAction::ExportStarted)
            .reduce(ExportAction::ExportFailed("zip".to_string()));
        assert_eq!(state.phase, ExportPhase::Editing);
        assert!(state.deck.is_some());
        assert_eq!(state.notice.unwrap().code, ErrorCode::ExportError);
    }

    #[test]
    fn test_state_is_serializable() {
        let state = editing();
        let json = serde_json::to_string(&state).unwrap();
        let back: ExportState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_dismiss_notice_keeps_deck() {
        let state = editing().reduce(ExportAction::DismissNotice);
        assert!(state.notice.is_none());
        assert_eq!(state.phase, ExportPhase::Editing);
        assert!(state.deck.is_some());
    }
}
