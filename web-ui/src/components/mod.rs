// Components module

pub mod context_menu;
pub mod delete_confirm;
pub mod export_modal;
pub mod notebook_card;
pub mod notebook_form;
pub mod notice_bar;
pub mod slide_editor;

pub use context_menu::{ContextMenuView, MenuCommand};
pub use delete_confirm::DeleteConfirm;
pub use export_modal::ExportModal;
pub use notebook_card::{MenuRequest, NotebookCard};
pub use notebook_form::NotebookFormModal;
pub use notice_bar::NoticeBar;
pub use slide_editor::{AutoTextarea, SlideEditor};
