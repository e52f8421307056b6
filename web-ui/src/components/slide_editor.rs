// Slide preview / editor
//
// Positions come from `plan_slide`, the same plan the PPTX writer uses, so
// the preview matches the exported file.

use notebook_deck_core::{
    plan_slide, Background, ImageState, ListStyle, PointsBlock, Slide, SlideLayout, TextAlign,
    TitleSize,
};
use wasm_bindgen::JsCast;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct AutoTextareaProps {
    pub value: String,
    #[prop_or_default]
    pub class: Classes,
    pub on_change: Callback<String>,
}

/// Textarea that grows to fit its content
#[function_component(AutoTextarea)]
pub fn auto_textarea(props: &AutoTextareaProps) -> Html {
    let node = use_node_ref();

    {
        let node = node.clone();
        use_effect_with(props.value.clone(), move |_| {
            fit_height(&node);
            || ()
        });
    }

    let on_input = {
        let on_change = props.on_change.clone();
        let node = node.clone();
        Callback::from(move |e: InputEvent| {
            let input: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
            fit_height(&node);
            on_change.emit(input.value());
        })
    };

    html! {
        <textarea
            ref={node}
            rows="1"
            class={classes!("auto-textarea", props.class.clone())}
            value={props.value.clone()}
            oninput={on_input}
        />
    }
}

fn fit_height(node: &NodeRef) {
    if let Some(element) = node.cast::<web_sys::HtmlElement>() {
        let style = element.style();
        let _ = style.set_property("height", "auto");
        let _ = style.set_property("height", &format!("{}px", element.scroll_height()));
    }
}

#[derive(Properties, PartialEq)]
pub struct SlideEditorProps {
    pub index: usize,
    pub slide: Slide,
    pub is_generating: bool,
    #[prop_or_default]
    pub image_failed: bool,
    pub theme_color: String,
    pub accent_color: String,
    pub on_edit: Callback<(usize, Slide)>,
    pub on_layout: Callback<(usize, SlideLayout)>,
}

#[function_component(SlideEditor)]
pub fn slide_editor(props: &SlideEditorProps) -> Html {
    let slide = &props.slide;
    let index = props.index;
    let plan = plan_slide(slide, props.is_generating);
    let on_theme = plan.background == Background::Theme;

    let on_title = {
        let on_edit = props.on_edit.clone();
        let slide = slide.clone();
        Callback::from(move |text: String| on_edit.emit((index, slide.with_title(text))))
    };

    let point_editor = |point_index: usize, text: &str, class: &'static str| {
        let on_edit = props.on_edit.clone();
        let slide = slide.clone();
        let on_change =
            Callback::from(move |value: String| on_edit.emit((index, slide.with_point(point_index, value))));
        html! {
            <AutoTextarea value={text.to_string()} class={classes!(class)} {on_change} />
        }
    };

    let on_layout_change = {
        let on_layout = props.on_layout.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
            {
                on_layout.emit((index, SlideLayout::from_tag(&select.value())));
            }
        })
    };

    let mut card_style = String::from("position:relative;aspect-ratio:16/9;overflow:hidden;");
    if on_theme {
        card_style.push_str(&format!("background:{};", props.theme_color));
    }

    let title_classes = classes!(
        "slide-title",
        match plan.title.size {
            TitleSize::Hero => "hero",
            TitleSize::Heading => "heading",
        },
        match plan.title.align {
            TextAlign::Center => "center",
            TextAlign::Left => "left",
        },
        on_theme.then_some("on-theme"),
    );

    let points = match &plan.points {
        PointsBlock::Hidden => html! {},
        PointsBlock::List { frame, style, items } => {
            let (list_class, item_class) = match style {
                ListStyle::Bulleted => ("slide-points bulleted", "point-text"),
                ListStyle::Quoted => ("slide-points quoted", "point-text quoted"),
            };
            html! {
                <ul class={list_class} style={frame.css()}>
                    { for items.iter().map(|item| html! {
                        <li key={item.index}>{ point_editor(item.index, item.text, item_class) }</li>
                    }) }
                </ul>
            }
        }
        PointsBlock::Grid { cells } => html! {
            { for cells.iter().map(|cell| html! {
                <div key={cell.index} class="grid-cell" style={cell.frame.css()}>
                    { point_editor(cell.index, cell.text, "point-text") }
                </div>
            }) }
        },
    };

    let image = match &plan.image {
        None => html! {},
        Some(block) => {
            let mut style = block.frame.css();
            if block.framed {
                style.push_str(&format!("border-color:{};", props.accent_color));
            }
            let content = match block.state {
                ImageState::Generating => html! {
                    <div class="image-generating">
                        <span class="spinner" />
                        <span>{ "画像生成中..." }</span>
                    </div>
                },
                ImageState::Ready(url) => html! {
                    <img class="slide-image-content" src={url.to_string()} alt={slide.title.clone()} />
                },
                ImageState::Placeholder if props.image_failed => html! {
                    <div class="image-placeholder failed">{ "画像を生成できませんでした" }</div>
                },
                ImageState::Placeholder => html! {
                    <div class="image-placeholder">{ "画像なし" }</div>
                },
            };
            html! {
                <div class={classes!("slide-image", block.framed.then_some("framed"))} {style}>
                    { content }
                </div>
            }
        }
    };

    let accent_bar = plan.accent_bar.map(|frame| {
        html! { <div class="accent-bar" style={format!("{}background:{};", frame.css(), props.accent_color)} /> }
    });

    html! {
        <div class="slide-editor">
            <div class="slide-toolbar">
                <span class="slide-number">{ format!("スライド {}", index + 1) }</span>
                <select class="layout-picker" onchange={on_layout_change}>
                    { for SlideLayout::ALL.iter().map(|layout| html! {
                        <option value={layout.as_tag()} selected={*layout == slide.layout}>
                            { layout.label() }
                        </option>
                    }) }
                </select>
            </div>
            <div class={classes!("slide-card", on_theme.then_some("theme-background"))} style={card_style}>
                { for accent_bar }
                if plan.quote_marks {
                    <span class="quote-mark open" style={format!("color:{};", props.accent_color)}>{ "“" }</span>
                    <span class="quote-mark close" style={format!("color:{};", props.accent_color)}>{ "”" }</span>
                }
                { image }
                <div class={title_classes} style={plan.title.frame.css()}>
                    <AutoTextarea value={plan.title.text.to_string()} on_change={on_title} />
                </div>
                { points }
            </div>
        </div>
    }
}
