// Context menu for a notebook card

use notebook_deck_core::{ContextMenu, NotebookId};
use yew::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Edit,
    Export,
    Delete,
}

#[derive(Properties, PartialEq)]
pub struct ContextMenuViewProps {
    pub menu: ContextMenu,
    pub on_command: Callback<(MenuCommand, NotebookId)>,
}

#[function_component(ContextMenuView)]
pub fn context_menu_view(props: &ContextMenuViewProps) -> Html {
    let item = |command: MenuCommand, label: &'static str, class: &'static str| {
        let on_command = props.on_command.clone();
        let notebook_id = props.menu.notebook_id.clone();
        let onclick = Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_command.emit((command, notebook_id.clone()));
        });
        html! { <button class={classes!("context-menu-item", class)} {onclick}>{ label }</button> }
    };

    html! {
        <div
            class="context-menu"
            style={format!("left:{}px;top:{}px;", props.menu.x, props.menu.y)}
        >
            { item(MenuCommand::Edit, "編集", "") }
            { item(MenuCommand::Export, "スライド出力", "") }
            { item(MenuCommand::Delete, "削除", "danger") }
        </div>
    }
}
