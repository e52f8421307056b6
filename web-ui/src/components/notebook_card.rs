// Notebook card in the directory grid

use notebook_deck_core::{NotebookId, NotebookSummary};
use yew::prelude::*;

/// Right-click (or ⋯ button) position and target notebook
#[derive(Debug, Clone, PartialEq)]
pub struct MenuRequest {
    pub x: i32,
    pub y: i32,
    pub notebook_id: NotebookId,
}

#[derive(Properties, PartialEq)]
pub struct NotebookCardProps {
    pub notebook: NotebookSummary,
    pub on_menu: Callback<MenuRequest>,
    pub on_export: Callback<NotebookId>,
}

fn format_updated(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

#[function_component(NotebookCard)]
pub fn notebook_card(props: &NotebookCardProps) -> Html {
    let notebook = &props.notebook;

    let open_menu = {
        let on_menu = props.on_menu.clone();
        let notebook_id = notebook.id.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            e.stop_propagation();
            on_menu.emit(MenuRequest {
                x: e.client_x(),
                y: e.client_y(),
                notebook_id: notebook_id.clone(),
            });
        })
    };

    let on_export_click = {
        let on_export = props.on_export.clone();
        let notebook_id = notebook.id.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_export.emit(notebook_id.clone());
        })
    };

    html! {
        <div class="notebook-card" oncontextmenu={open_menu.clone()}>
            <div class="notebook-card-stripe" style={format!("background:{};", notebook.color)} />
            <div class="notebook-card-body">
                <div class="notebook-card-header">
                    <span class="notebook-icon">{ &notebook.icon }</span>
                    <span class="notebook-name">{ &notebook.name }</span>
                    <button class="card-menu-button" onclick={open_menu} title="メニュー">{ "⋯" }</button>
                </div>
                if !notebook.description.is_empty() {
                    <p class="notebook-description">{ &notebook.description }</p>
                }
                <div class="notebook-card-footer">
                    <span class="record-count">{ format!("{}件の記録", notebook.record_count) }</span>
                    <span class="updated-at">{ format_updated(notebook.updated_at) }</span>
                    <button
                        class="export-btn"
                        onclick={on_export_click}
                        disabled={notebook.record_count == 0}
                    >
                        { "スライド出力" }
                    </button>
                </div>
            </div>
        </div>
    }
}
