// Web UI library for Notebook Deck
//
// This crate provides the Yew components and UI models for the notebook
// directory page and its slide export flow.

use yew::prelude::*;

pub mod components;
pub mod errors;
pub mod messages;
pub mod model;

// Re-export components
pub use components::*;

use model::DirectoryStore;

/// Main application component（ノートブック一覧の状態管理とイベントハンドリング）
#[function_component(App)]
pub fn app() -> Html {
    use notebook_deck_api_client::{create_notebook, delete_notebook, list_notebooks, update_notebook};
    use notebook_deck_core::{
        DirectoryAction, DirectoryModal, ErrorCode, NotebookId, ProcessResult, ValidationError,
    };
    use wasm_bindgen_futures::spawn_local;

    let state = use_reducer(DirectoryStore::default);

    // Runs on mount and again for every successful mutation
    {
        let dispatcher = state.dispatcher();
        use_effect_with(state.refresh_seq, move |_| {
            dispatcher.dispatch(DirectoryAction::LoadStarted);
            spawn_local(async move {
                match list_notebooks().await {
                    Ok(notebooks) => dispatcher.dispatch(DirectoryAction::Loaded(notebooks)),
                    Err(e) => dispatcher.dispatch(DirectoryAction::LoadFailed(e.to_process_result())),
                }
            });
            || ()
        });
    }

    let on_search = {
        let dispatcher = state.dispatcher();
        Callback::from(move |e: InputEvent| {
            let input: web_sys::HtmlInputElement = e.target_unchecked_into();
            dispatcher.dispatch(DirectoryAction::SetSearch(input.value()));
        })
    };

    let on_create_click = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(DirectoryAction::OpenCreate))
    };

    let on_menu = {
        let dispatcher = state.dispatcher();
        Callback::from(move |request: MenuRequest| {
            dispatcher.dispatch(DirectoryAction::OpenContextMenu {
                x: request.x,
                y: request.y,
                notebook_id: request.notebook_id,
            })
        })
    };

    let on_export = {
        let dispatcher = state.dispatcher();
        Callback::from(move |id: NotebookId| dispatcher.dispatch(DirectoryAction::OpenExport(id)))
    };

    let on_command = {
        let dispatcher = state.dispatcher();
        Callback::from(move |(command, id): (MenuCommand, NotebookId)| {
            let action = match command {
                MenuCommand::Edit => DirectoryAction::OpenEdit(id),
                MenuCommand::Export => DirectoryAction::OpenExport(id),
                MenuCommand::Delete => DirectoryAction::OpenDelete(id),
            };
            dispatcher.dispatch(action);
        })
    };

    let close_menu = {
        let dispatcher = state.dispatcher();
        let menu_open = state.context_menu.is_some();
        Callback::from(move |_: MouseEvent| {
            if menu_open {
                dispatcher.dispatch(DirectoryAction::CloseContextMenu);
            }
        })
    };

    let on_field = {
        let dispatcher = state.dispatcher();
        Callback::from(move |field| dispatcher.dispatch(DirectoryAction::EditDraft(field)))
    };

    let close_modal = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: ()| dispatcher.dispatch(DirectoryAction::CloseModal))
    };

    let on_dismiss = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: ()| dispatcher.dispatch(DirectoryAction::DismissNotice))
    };

    let on_submit = {
        let dispatcher = state.dispatcher();
        let modal = state.modal.clone();
        let draft = state.draft.clone();
        Callback::from(move |_: ()| {
            let dispatcher = dispatcher.clone();
            let validation_failed = |e: ValidationError| {
                let mut result = ProcessResult::error(e.to_error_code());
                if let Some(context) = e.context() {
                    result = result.with_context(context);
                }
                DirectoryAction::MutationFailed(result)
            };

            match &modal {
                DirectoryModal::Create => match draft.to_create_request() {
                    Ok(request) => spawn_local(async move {
                        let action = match create_notebook(&request).await {
                            Ok(_) => DirectoryAction::MutationSucceeded(ErrorCode::NotebookCreated),
                            Err(e) => DirectoryAction::MutationFailed(e.to_process_result()),
                        };
                        dispatcher.dispatch(action);
                    }),
                    Err(e) => dispatcher.dispatch(validation_failed(e)),
                },
                DirectoryModal::Edit(id) => match draft.to_update_request() {
                    Ok(request) => {
                        let id = id.clone();
                        spawn_local(async move {
                            let action = match update_notebook(&id, &request).await {
                                Ok(_) => DirectoryAction::MutationSucceeded(ErrorCode::NotebookUpdated),
                                Err(e) => DirectoryAction::MutationFailed(e.to_process_result()),
                            };
                            dispatcher.dispatch(action);
                        })
                    }
                    Err(e) => dispatcher.dispatch(validation_failed(e)),
                },
                _ => {}
            }
        })
    };

    let on_delete_confirm = {
        let dispatcher = state.dispatcher();
        let modal = state.modal.clone();
        Callback::from(move |_: ()| {
            let DirectoryModal::Delete(id) = modal.clone() else {
                return;
            };
            let dispatcher = dispatcher.clone();
            spawn_local(async move {
                let action = match delete_notebook(&id).await {
                    Ok(()) => DirectoryAction::MutationSucceeded(ErrorCode::NotebookDeleted),
                    Err(e) => DirectoryAction::MutationFailed(e.to_process_result()),
                };
                dispatcher.dispatch(action);
            });
        })
    };

    // A finished export closes the modal and shows its notice here
    let on_export_notice = {
        let dispatcher = state.dispatcher();
        Callback::from(move |result: ProcessResult| {
            dispatcher.dispatch(DirectoryAction::MutationSucceeded(result.code))
        })
    };

    let modal = match &state.modal {
        DirectoryModal::None => html! {},
        DirectoryModal::Create | DirectoryModal::Edit(_) => html! {
            <NotebookFormModal
                editing={matches!(state.modal, DirectoryModal::Edit(_))}
                draft={state.draft.clone()}
                on_field={on_field}
                on_submit={on_submit}
                on_cancel={close_modal.clone()}
            />
        },
        DirectoryModal::Delete(id) => html! {
            <DeleteConfirm
                notebook_name={state.find(id).map(|nb| nb.name.clone()).unwrap_or_default()}
                on_confirm={on_delete_confirm}
                on_cancel={close_modal.clone()}
            />
        },
        DirectoryModal::Export(id) => html! {
            <ExportModal
                notebook_id={id.clone()}
                notebook_name={state.find(id).map(|nb| nb.name.clone()).unwrap_or_default()}
                on_close={close_modal.clone()}
                on_notice={on_export_notice}
            />
        },
    };

    let visible = state.visible();

    html! {
        <div class="app-container" onclick={close_menu}>
            <div class="main-content">
                // 処理メッセージ
                <NoticeBar notice={state.notice.clone()} on_dismiss={on_dismiss} />

                <div class="directory-header">
                    <h2>{ "ノートブック" }</h2>
                    <input
                        class="search-input"
                        type="search"
                        placeholder="名前・説明で検索"
                        value={state.search.clone()}
                        oninput={on_search}
                    />
                    <button class="primary-btn" onclick={on_create_click}>{ "新規作成" }</button>
                </div>

                if state.loading && state.notebooks.is_empty() {
                    <div class="directory-loading">{ "読み込み中..." }</div>
                } else if visible.is_empty() {
                    <div class="directory-empty">
                        { if state.search.trim().is_empty() { "ノートブックがありません" } else { "一致するノートブックがありません" } }
                    </div>
                } else {
                    <div class="notebook-grid">
                        { for visible.iter().map(|nb| html! {
                            <NotebookCard
                                key={nb.id.as_str().to_string()}
                                notebook={(*nb).clone()}
                                on_menu={on_menu.clone()}
                                on_export={on_export.clone()}
                            />
                        }) }
                    </div>
                }
            </div>

            if let Some(menu) = state.context_menu.clone() {
                <ContextMenuView {menu} {on_command} />
            }

            { modal }
        </div>
    }
}
