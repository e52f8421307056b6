// Message bar with auto-dismiss for informational notices

use gloo_timers::callback::Timeout;
use notebook_deck_core::{ProcessResult, StatusLevel};
use yew::prelude::*;

use crate::messages::{get_message_class, get_message_from_result, MessageLevel};

/// Informational notices disappear after this many milliseconds
const INFO_DISMISS_MS: u32 = 4_000;

#[derive(Properties, PartialEq)]
pub struct NoticeBarProps {
    pub notice: Option<ProcessResult>,
    pub on_dismiss: Callback<()>,
}

#[function_component(NoticeBar)]
pub fn notice_bar(props: &NoticeBarProps) -> Html {
    {
        let on_dismiss = props.on_dismiss.clone();
        use_effect_with(props.notice.clone(), move |notice| {
            // Dropping the handle cancels the timer when the notice changes
            let handle = notice
                .as_ref()
                .filter(|n| n.level == StatusLevel::Info)
                .map(|_| Timeout::new(INFO_DISMISS_MS, move || on_dismiss.emit(())));
            move || drop(handle)
        });
    }

    let Some(notice) = &props.notice else {
        return html! { <div class="message-area" /> };
    };

    let level = MessageLevel::from(notice.level);
    let on_close = {
        let on_dismiss = props.on_dismiss.clone();
        Callback::from(move |_: MouseEvent| on_dismiss.emit(()))
    };

    html! {
        <div class="message-area">
            <div class={get_message_class(level)}>{ get_message_from_result(notice) }</div>
            <button class="message-close" onclick={on_close} title="閉じる">{ "×" }</button>
        </div>
    }
}
