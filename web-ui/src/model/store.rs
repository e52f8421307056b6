// Reducible wrappers around the core state machines

use std::ops::Deref;
use std::rc::Rc;

use notebook_deck_core::{DirectoryAction, DirectoryState, ExportAction, ExportState};
use yew::Reducible;

/// Directory page state for `use_reducer`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryStore(pub DirectoryState);

impl Reducible for DirectoryStore {
    type Action = DirectoryAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        Rc::new(Self(self.0.clone().reduce(action)))
    }
}

impl Deref for DirectoryStore {
    type Target = DirectoryState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Export modal state for `use_reducer`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportStore(pub ExportState);

impl Reducible for ExportStore {
    type Action = ExportAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        Rc::new(Self(self.0.clone().reduce(action)))
    }
}

impl Deref for ExportStore {
    type Target = ExportState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notebook_deck_core::{Deck, ExportPhase, Slide, SlideLayout};

    #[test]
    fn test_export_store_drops_results_after_close() {
        let deck = Deck {
            title: "Deck".to_string(),
            subtitle: String::new(),
            theme_color: "#3b82f6".to_string(),
            accent_color: "#f59e0b".to_string(),
            slides: vec![Slide::new("One", vec![], SlideLayout::TopImage)],
        };

        let store = Rc::new(ExportStore::default());
        let store = store.reduce(ExportAction::Open);
        let store = store.reduce(ExportAction::OutlineLoaded(deck));
        assert_eq!(store.phase, ExportPhase::Editing);

        let revision = store.revision;
        let store = store.reduce(ExportAction::ImageStarted { revision, index: 0 });
        let store = store.reduce(ExportAction::Close);
        let store = store.reduce(ExportAction::ImageResolved {
            revision,
            index: 0,
            data_url: "data:image/png;base64,AA==".to_string(),
        });
        assert!(store.deck.is_none());
        assert_eq!(store.phase, ExportPhase::Idle);
    }

    #[test]
    fn test_directory_store_delegates_to_state() {
        let store = Rc::new(DirectoryStore::default());
        let store = store.reduce(DirectoryAction::SetSearch("alpha".to_string()));
        assert_eq!(store.search, "alpha");
    }
}
