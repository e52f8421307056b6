// Delete confirmation dialog

use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct DeleteConfirmProps {
    pub notebook_name: String,
    pub on_confirm: Callback<()>,
    pub on_cancel: Callback<()>,
}

#[function_component(DeleteConfirm)]
pub fn delete_confirm(props: &DeleteConfirmProps) -> Html {
    let on_confirm = {
        let on_confirm = props.on_confirm.clone();
        Callback::from(move |_: MouseEvent| on_confirm.emit(()))
    };
    let on_cancel = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |_: MouseEvent| on_cancel.emit(()))
    };

    html! {
        <div class="modal-backdrop">
            <div class="modal confirm-dialog">
                <h3>{ "ノートブックを削除" }</h3>
                <p>{ format!("「{}」とその記録をすべて削除します。元に戻せません。", props.notebook_name) }</p>
                <div class="modal-actions">
                    <button class="secondary-btn" onclick={on_cancel}>{ "キャンセル" }</button>
                    <button class="danger-btn" onclick={on_confirm}>{ "削除" }</button>
                </div>
            </div>
        </div>
    }
}
