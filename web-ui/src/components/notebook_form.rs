// Create / edit notebook modal

use notebook_deck_core::{DraftField, NotebookDraft, NOTEBOOK_COLOR_PALETTE};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct NotebookFormModalProps {
    /// Editing an existing notebook rather than creating one
    pub editing: bool,
    pub draft: NotebookDraft,
    pub on_field: Callback<DraftField>,
    pub on_submit: Callback<()>,
    pub on_cancel: Callback<()>,
}

#[function_component(NotebookFormModal)]
pub fn notebook_form_modal(props: &NotebookFormModalProps) -> Html {
    let on_name = {
        let on_field = props.on_field.clone();
        Callback::from(move |e: InputEvent| {
            let input: web_sys::HtmlInputElement = e.target_unchecked_into();
            on_field.emit(DraftField::Name(input.value()));
        })
    };

    let on_description = {
        let on_field = props.on_field.clone();
        Callback::from(move |e: InputEvent| {
            let input: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
            on_field.emit(DraftField::Description(input.value()));
        })
    };

    let on_submit = {
        let on_submit = props.on_submit.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_submit.emit(());
        })
    };

    let on_cancel = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |_: MouseEvent| on_cancel.emit(()))
    };

    let swatch = |color: &'static str| {
        let on_field = props.on_field.clone();
        let selected = props.draft.color.eq_ignore_ascii_case(color);
        let onclick = Callback::from(move |_: MouseEvent| on_field.emit(DraftField::Color(color.to_string())));
        html! {
            <button
                type="button"
                class={classes!("color-swatch", selected.then_some("selected"))}
                style={format!("background:{};", color)}
                title={color}
                {onclick}
            />
        }
    };

    let title = if props.editing { "ノートブックを編集" } else { "新しいノートブック" };
    let submit_label = if props.editing { "保存" } else { "作成" };

    html! {
        <div class="modal-backdrop">
            <form class="modal notebook-form" onsubmit={on_submit}>
                <h3>{ title }</h3>
                <label class="form-label">
                    { "名前" }
                    <input
                        class="form-input"
                        type="text"
                        value={props.draft.name.clone()}
                        oninput={on_name}
                        placeholder="ノートブック名"
                    />
                </label>
                <label class="form-label">
                    { "説明" }
                    <textarea
                        class="form-textarea"
                        value={props.draft.description.clone()}
                        oninput={on_description}
                        placeholder="このノートブックの内容 (任意)"
                    />
                </label>
                <div class="form-label">
                    { "カラー" }
                    <div class="color-palette">
                        { for NOTEBOOK_COLOR_PALETTE.iter().map(|c| swatch(c)) }
                    </div>
                </div>
                <div class="modal-actions">
                    <button type="button" class="secondary-btn" onclick={on_cancel}>{ "キャンセル" }</button>
                    <button type="submit" class="primary-btn">{ submit_label }</button>
                </div>
            </form>
        </div>
    }
}
