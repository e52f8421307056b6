// Notebook directory: search filtering and page state

use serde::{Deserialize, Serialize};

use crate::models::{
    CreateNotebookRequest, ErrorCode, NotebookId, NotebookSummary, ProcessResult,
    UpdateNotebookRequest, DEFAULT_NOTEBOOK_COLOR, DEFAULT_NOTEBOOK_ICON,
};
use crate::validation::ValidationError;

/// Case-insensitive substring match on name or description.
/// A blank term matches everything.
pub fn matches_search(notebook: &NotebookSummary, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    notebook.name.to_lowercase().contains(&term)
        || notebook.description.to_lowercase().contains(&term)
}

/// Filter preserving list order
pub fn filter_notebooks<'a>(notebooks: &'a [NotebookSummary], term: &str) -> Vec<&'a NotebookSummary> {
    notebooks
        .iter()
        .filter(|nb| matches_search(nb, term))
        .collect()
}

/// Modal currently open on the directory page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "notebook_id", rename_all = "snake_case")]
pub enum DirectoryModal {
    #[default]
    None,
    Create,
    Edit(NotebookId),
    Delete(NotebookId),
    Export(NotebookId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMenu {
    pub x: i32,
    pub y: i32,
    pub notebook_id: NotebookId,
}

/// Create/edit form contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookDraft {
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon: String,
}

impl Default for NotebookDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            color: DEFAULT_NOTEBOOK_COLOR.to_string(),
            icon: DEFAULT_NOTEBOOK_ICON.to_string(),
        }
    }
}

impl NotebookDraft {
    pub fn from_summary(summary: &NotebookSummary) -> Self {
        Self {
            name: summary.name.clone(),
            description: summary.description.clone(),
            color: summary.color.clone(),
            icon: summary.icon.clone(),
        }
    }

    pub fn to_create_request(&self) -> Result<CreateNotebookRequest, ValidationError> {
        let request = CreateNotebookRequest {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            color: self.color.clone(),
            icon: self.icon.clone(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn to_update_request(&self) -> Result<UpdateNotebookRequest, ValidationError> {
        let request = UpdateNotebookRequest {
            name: Some(self.name.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            color: Some(self.color.clone()),
            icon: Some(self.icon.clone()),
        };
        request.validate()?;
        Ok(request)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DraftField {
    Name(String),
    Description(String),
    Color(String),
}

/// Directory page state. Every transition goes through `reduce`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryState {
    pub notebooks: Vec<NotebookSummary>,
    pub search: String,
    pub modal: DirectoryModal,
    pub context_menu: Option<ContextMenu>,
    pub draft: NotebookDraft,
    pub loading: bool,
    /// Bumped by every successful mutation; each new value means one re-fetch
    pub refresh_seq: u64,
    pub notice: Option<ProcessResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DirectoryAction {
    LoadStarted,
    Loaded(Vec<NotebookSummary>),
    LoadFailed(ProcessResult),
    SetSearch(String),
    OpenContextMenu { x: i32, y: i32, notebook_id: NotebookId },
    CloseContextMenu,
    OpenCreate,
    OpenEdit(NotebookId),
    OpenDelete(NotebookId),
    OpenExport(NotebookId),
    CloseModal,
    EditDraft(DraftField),
    MutationSucceeded(ErrorCode),
    MutationFailed(ProcessResult),
    DismissNotice,
}

impl DirectoryState {
    pub fn visible(&self) -> Vec<&NotebookSummary> {
        filter_notebooks(&self.notebooks, &self.search)
    }

    pub fn find(&self, id: &NotebookId) -> Option<&NotebookSummary> {
        self.notebooks.iter().find(|nb| &nb.id == id)
    }

    pub fn reduce(self, action: DirectoryAction) -> Self {
        match action {
            DirectoryAction::LoadStarted => Self {
                loading: true,
                ..self
            },
            DirectoryAction::Loaded(notebooks) => Self {
                notebooks,
                loading: false,
                ..self
            },
            // Keep the previous list on failure
            DirectoryAction::LoadFailed(notice) => Self {
                loading: false,
                notice: Some(notice),
                ..self
            },
            DirectoryAction::SetSearch(search) => Self { search, ..self },
            DirectoryAction::OpenContextMenu { x, y, notebook_id } => Self {
                context_menu: Some(ContextMenu { x, y, notebook_id }),
                ..self
            },
            DirectoryAction::CloseContextMenu => Self {
                context_menu: None,
                ..self
            },
            DirectoryAction::OpenCreate => Self {
                modal: DirectoryModal::Create,
                draft: NotebookDraft::default(),
                context_menu: None,
                ..self
            },
            DirectoryAction::OpenEdit(id) => {
                let draft = self.find(&id).map(NotebookDraft::from_summary);
                match draft {
                    Some(draft) => Self {
                        modal: DirectoryModal::Edit(id),
                        draft,
                        context_menu: None,
                        ..self
                    },
                    None => Self {
                        context_menu: None,
                        ..self
                    },
                }
            }
            DirectoryAction::OpenDelete(id) => Self {
                modal: DirectoryModal::Delete(id),
                context_menu: None,
                ..self
            },
            DirectoryAction::OpenExport(id) => Self {
                modal: DirectoryModal::Export(id),
                context_menu: None,
                ..self
            },
            DirectoryAction::CloseModal => Self {
                modal: DirectoryModal::None,
                ..self
            },
            DirectoryAction::EditDraft(field) => {
                let mut draft = self.draft.clone();
                match field {
                    DraftField::Name(name) => draft.name = name,
                    DraftField::Description(description) => draft.description = description,
                    DraftField::Color(color) => draft.color = color,
                }
                Self { draft, ..self }
            }
            DirectoryAction::MutationSucceeded(code) => Self {
                modal: DirectoryModal::None,
                draft: NotebookDraft::default(),
                refresh_seq: self.refresh_seq.wrapping_add(1),
                notice: Some(ProcessResult::success(code)),
                ..self
            },
            // Modal stays open so the user can retry
            DirectoryAction::MutationFailed(notice) => Self {
                notice: Some(notice),
                ..self
            },
            DirectoryAction::DismissNotice => Self {
                notice: None,
                ..self
            },
        }
    }
}
