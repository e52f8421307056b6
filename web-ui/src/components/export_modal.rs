// Slide export modal: outline -> edit with background images -> PPTX download

use notebook_deck_api_client::{fetch_ppt_config, get_notebook, request_outline, request_slide_image};
use notebook_deck_core::{
    Deck, DeckConfigResponse, ErrorCode, ExportAction, ExportPhase, NotebookId, OutlineRequest,
    ProcessResult, Slide, SlideLayout, StyleTemplate,
};
use notebook_deck_export::{build_pptx, sanitize_filename, PPTX_MIME};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::{NoticeBar, SlideEditor};
use crate::errors::UiError;
use crate::model::{download_bytes, ExportStore};

/// Custom style text box; selecting it ignores the templates
const CUSTOM_STYLE: &str = "__custom__";

#[derive(Debug, Clone, PartialEq)]
enum ConfigStatus {
    Loading,
    Ready(DeckConfigResponse),
    Unavailable(ProcessResult),
}

fn template_name(template: &StyleTemplate) -> String {
    template
        .get("name")
        .or_else(|| template.get("label"))
        .cloned()
        .unwrap_or_else(|| "テンプレート".to_string())
}

fn template_prompt(template: &StyleTemplate) -> Option<String> {
    template
        .get("prompt")
        .or_else(|| template.get("style_prompt"))
        .filter(|p| !p.trim().is_empty())
        .cloned()
}

/// Build the PPTX and hand it to the browser as a download
fn export_deck(deck: &Deck) -> Result<(), UiError> {
    let bytes = build_pptx(deck).map_err(|e| UiError::ExportError(e.to_string()))?;
    download_bytes(&bytes, PPTX_MIME, &sanitize_filename(&deck.title))
}

#[derive(Properties, PartialEq)]
pub struct ExportModalProps {
    pub notebook_id: NotebookId,
    pub notebook_name: String,
    pub on_close: Callback<()>,
    /// Final result reported to the directory page
    pub on_notice: Callback<ProcessResult>,
}

#[function_component(ExportModal)]
pub fn export_modal(props: &ExportModalProps) -> Html {
    let state = use_reducer(ExportStore::default);
    let config = use_state(|| ConfigStatus::Loading);
    let style_choice = use_state(String::new);
    let custom_style = use_state(String::new);
    let max_slides = use_state(|| None::<u32>);

    {
        let config = config.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match fetch_ppt_config().await {
                    Ok(response) if response.enabled => config.set(ConfigStatus::Ready(response)),
                    Ok(_) => config.set(ConfigStatus::Unavailable(ProcessResult::error(
                        ErrorCode::FeatureDisabled,
                    ))),
                    Err(e) => config.set(ConfigStatus::Unavailable(e.to_process_result())),
                }
            });
            || ()
        });
    }

    // Kick off one request per slide that still needs an image
    {
        let dispatcher = state.dispatcher();
        let revision = state.revision;
        use_effect_with((revision, state.phase, state.pending_images()), move |(_, _, pending)| {
            for (index, prompt) in pending.clone() {
                dispatcher.dispatch(ExportAction::ImageStarted { revision, index });
                let dispatcher = dispatcher.clone();
                spawn_local(async move {
                    let action = match request_slide_image(&prompt).await {
                        Ok(response) => ExportAction::ImageResolved {
                            revision,
                            index,
                            data_url: response.image_data_url,
                        },
                        Err(_) => ExportAction::ImageFailed { revision, index },
                    };
                    dispatcher.dispatch(action);
                });
            }
            || ()
        });
    }

    let templates: Vec<StyleTemplate> = match &*config {
        ConfigStatus::Ready(response) => response.style_templates.clone(),
        _ => Vec::new(),
    };
    let config_max = match &*config {
        ConfigStatus::Ready(response) => response.max_slides,
        _ => 0,
    };

    let on_generate = {
        let dispatcher = state.dispatcher();
        let notebook_id = props.notebook_id.clone();
        let style_choice = style_choice.clone();
        let custom_style = custom_style.clone();
        let max_slides = max_slides.clone();
        let templates = templates.clone();
        Callback::from(move |_: MouseEvent| {
            let style_prompt = if *style_choice == CUSTOM_STYLE {
                Some(custom_style.trim().to_string()).filter(|s| !s.is_empty())
            } else {
                style_choice
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| templates.get(i))
                    .and_then(template_prompt)
            };
            let max_slides = *max_slides;
            let notebook_id = notebook_id.clone();
            let dispatcher = dispatcher.clone();

            dispatcher.dispatch(ExportAction::Open);
            spawn_local(async move {
                let result = async {
                    let notebook = get_notebook(&notebook_id).await?;
                    let request = OutlineRequest {
                        source_content: notebook.export_source(),
                        style_prompt,
                        max_slides,
                    };
                    request_outline(&request).await
                }
                .await;
                let action = match result {
                    Ok(deck) => ExportAction::OutlineLoaded(deck),
                    Err(e) => ExportAction::OutlineFailed(e.to_string()),
                };
                dispatcher.dispatch(action);
            });
        })
    };

    let on_export = {
        let dispatcher = state.dispatcher();
        let deck = state.deck.clone();
        let on_notice = props.on_notice.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(deck) = deck.clone() else {
                return;
            };
            dispatcher.dispatch(ExportAction::ExportStarted);
            match export_deck(&deck) {
                Ok(()) => {
                    dispatcher.dispatch(ExportAction::ExportFinished);
                    on_notice.emit(ProcessResult::success(ErrorCode::ExportOk));
                }
                Err(e) => dispatcher.dispatch(ExportAction::ExportFailed(e.to_string())),
            }
        })
    };

    let on_close = {
        let dispatcher = state.dispatcher();
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| {
            dispatcher.dispatch(ExportAction::Close);
            on_close.emit(());
        })
    };

    let on_edit = {
        let dispatcher = state.dispatcher();
        Callback::from(move |(index, slide): (usize, Slide)| {
            dispatcher.dispatch(ExportAction::EditSlide { index, slide })
        })
    };

    let on_layout = {
        let dispatcher = state.dispatcher();
        Callback::from(move |(index, layout): (usize, SlideLayout)| {
            dispatcher.dispatch(ExportAction::ChangeLayout { index, layout })
        })
    };

    let on_style_select = {
        let style_choice = style_choice.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
            {
                style_choice.set(select.value());
            }
        })
    };

    let on_custom_style = {
        let custom_style = custom_style.clone();
        Callback::from(move |e: InputEvent| {
            let input: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
            custom_style.set(input.value());
        })
    };

    let on_max_slides = {
        let max_slides = max_slides.clone();
        Callback::from(move |e: InputEvent| {
            let input: web_sys::HtmlInputElement = e.target_unchecked_into();
            max_slides.set(input.value().trim().parse::<u32>().ok().filter(|n| *n > 0));
        })
    };

    let on_dismiss = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: ()| dispatcher.dispatch(ExportAction::DismissNotice))
    };

    let options_panel = match &*config {
        ConfigStatus::Loading => html! { <div class="export-loading">{ "設定を読み込み中..." }</div> },
        ConfigStatus::Unavailable(result) => html! {
            <NoticeBar notice={Some(result.clone())} on_dismiss={props.on_close.clone()} />
        },
        ConfigStatus::Ready(_) => {
            let busy = state.phase == ExportPhase::LoadingOutline || state.phase == ExportPhase::Exporting;
            html! {
                <div class="export-options">
                    <label class="form-label">
                        { "スタイル" }
                        <select class="form-select" onchange={on_style_select}>
                            <option value="" selected={style_choice.is_empty()}>{ "おまかせ" }</option>
                            { for templates.iter().enumerate().map(|(i, t)| html! {
                                <option value={i.to_string()} selected={*style_choice == i.to_string()}>
                                    { template_name(t) }
                                </option>
                            }) }
                            <option value={CUSTOM_STYLE} selected={*style_choice == CUSTOM_STYLE}>{ "カスタム" }</option>
                        </select>
                    </label>
                    if *style_choice == CUSTOM_STYLE {
                        <textarea
                            class="form-textarea"
                            value={(*custom_style).clone()}
                            oninput={on_custom_style}
                            placeholder="例: 落ち着いた配色、ミニマルなデザイン"
                        />
                    }
                    <label class="form-label">
                        { format!("最大スライド数 (上限 {})", config_max) }
                        <input
                            class="form-input"
                            type="number"
                            min="1"
                            max={config_max.to_string()}
                            value={max_slides.map(|n| n.to_string()).unwrap_or_default()}
                            oninput={on_max_slides}
                        />
                    </label>
                    <button class="primary-btn" onclick={on_generate} disabled={busy}>
                        { if state.deck.is_some() { "再生成" } else { "アウトラインを生成" } }
                    </button>
                </div>
            }
        }
    };

    let body = match (state.phase, &state.deck) {
        (ExportPhase::LoadingOutline, _) => html! {
            <div class="export-loading">
                <span class="spinner" />
                <span>{ "アウトラインを生成中..." }</span>
            </div>
        },
        (ExportPhase::Editing | ExportPhase::Exporting, Some(deck)) => html! {
            <div class="slide-list">
                { for deck.slides.iter().enumerate().map(|(index, slide)| html! {
                    <SlideEditor
                        key={index}
                        {index}
                        slide={slide.clone()}
                        is_generating={state.is_generating(index)}
                        image_failed={state.failed_images.contains(&index)}
                        theme_color={deck.theme_color.clone()}
                        accent_color={deck.accent_color.clone()}
                        on_edit={on_edit.clone()}
                        on_layout={on_layout.clone()}
                    />
                }) }
            </div>
        },
        (ExportPhase::Done, _) => html! {
            <div class="export-done">{ ErrorCode::ExportOk.to_message() }</div>
        },
        _ => html! {},
    };

    let generating_count = state.generating.len();

    html! {
        <div class="modal-backdrop">
            <div class="modal export-modal">
                <div class="modal-header">
                    <h3>{ format!("スライド出力: {}", props.notebook_name) }</h3>
                    <button class="close-btn" onclick={on_close.clone()}>{ "×" }</button>
                </div>
                <NoticeBar notice={state.notice.clone()} {on_dismiss} />
                { options_panel }
                { body }
                <div class="modal-actions">
                    if generating_count > 0 {
                        <span class="image-progress">{ format!("画像生成中: {}枚", generating_count) }</span>
                    }
                    <button class="secondary-btn" onclick={on_close}>{ "閉じる" }</button>
                    <button class="primary-btn" onclick={on_export} disabled={!state.can_export()}>
                        { if state.phase == ExportPhase::Exporting { "出力中..." } else { "PPTXをダウンロード" } }
                    </button>
                </div>
            </div>
        </div>
    }
}
