// Slide layout tags and the layout plan shared by preview and PPTX export

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::Slide;

/// Visual template for a slide.
///
/// Unknown tags map to `Typographic`, so every slide renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SlideLayout {
    SectionHeader,
    Overview,
    SplitImageLeft,
    SplitImageRight,
    TopImage,
    TypographicWithImage,
    Quote,
    #[default]
    Typographic,
}

impl SlideLayout {
    pub const ALL: [SlideLayout; 8] = [
        SlideLayout::SectionHeader,
        SlideLayout::Overview,
        SlideLayout::SplitImageLeft,
        SlideLayout::SplitImageRight,
        SlideLayout::TopImage,
        SlideLayout::TypographicWithImage,
        SlideLayout::Quote,
        SlideLayout::Typographic,
    ];

    /// Parse a layout tag. `SPLIT_LEFT` / `SPLIT_RIGHT` are legacy aliases.
    pub fn from_tag(tag: &str) -> Self {
        Self::parse_known(tag).unwrap_or_default()
    }

    /// Parse a layout tag, returning `None` for unrecognized values.
    /// Matching is exact: `quote` or ` QUOTE` are unknown.
    pub fn parse_known(tag: &str) -> Option<Self> {
        let layout = match tag {
            "SECTION_HEADER" => SlideLayout::SectionHeader,
            "OVERVIEW" => SlideLayout::Overview,
            "SPLIT_IMAGE_LEFT" | "SPLIT_LEFT" => SlideLayout::SplitImageLeft,
            "SPLIT_IMAGE_RIGHT" | "SPLIT_RIGHT" => SlideLayout::SplitImageRight,
            "TOP_IMAGE" => SlideLayout::TopImage,
            "TYPOGRAPHIC_WITH_IMAGE" => SlideLayout::TypographicWithImage,
            "QUOTE" => SlideLayout::Quote,
            "TYPOGRAPHIC" => SlideLayout::Typographic,
            _ => return None,
        };
        Some(layout)
    }

    /// Canonical tag
    pub fn as_tag(self) -> &'static str {
        match self {
            SlideLayout::SectionHeader => "SECTION_HEADER",
            SlideLayout::Overview => "OVERVIEW",
            SlideLayout::SplitImageLeft => "SPLIT_IMAGE_LEFT",
            SlideLayout::SplitImageRight => "SPLIT_IMAGE_RIGHT",
            SlideLayout::TopImage => "TOP_IMAGE",
            SlideLayout::TypographicWithImage => "TYPOGRAPHIC_WITH_IMAGE",
            SlideLayout::Quote => "QUOTE",
            SlideLayout::Typographic => "TYPOGRAPHIC",
        }
    }

    /// Display name for the layout picker
    pub fn label(self) -> &'static str {
        match self {
            SlideLayout::SectionHeader => "セクション見出し",
            SlideLayout::Overview => "概要 (2×2)",
            SlideLayout::SplitImageLeft => "画像左",
            SlideLayout::SplitImageRight => "画像右",
            SlideLayout::TopImage => "画像上",
            SlideLayout::TypographicWithImage => "テキスト + 画像",
            SlideLayout::Quote => "引用",
            SlideLayout::Typographic => "テキスト",
        }
    }
}

impl std::fmt::Display for SlideLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl Serialize for SlideLayout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_tag())
    }
}

impl<'de> Deserialize<'de> for SlideLayout {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(tag.map(|t| SlideLayout::from_tag(&t)).unwrap_or_default())
    }
}

/// Rectangle in slide fractions (0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Frame {
    pub const FULL: Frame = Frame::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Absolute-position CSS for the preview card
    pub fn css(&self) -> String {
        format!(
            "position:absolute;left:{:.2}%;top:{:.2}%;width:{:.2}%;height:{:.2}%;",
            self.x * 100.0,
            self.y * 100.0,
            self.width * 100.0,
            self.height * 100.0
        )
    }

    /// (x, y, cx, cy) in EMU for a slide of the given size
    pub fn to_emu(&self, slide_width: i64, slide_height: i64) -> (i64, i64, i64, i64) {
        let scale = |fraction: f32, total: i64| (f64::from(fraction) * total as f64).round() as i64;
        (
            scale(self.x, slide_width),
            scale(self.y, slide_height),
            scale(self.width, slide_width),
            scale(self.height, slide_height),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Plain,
    /// Filled with the deck theme color
    Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSize {
    Hero,
    Heading,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleBlock<'a> {
    pub text: &'a str,
    pub frame: Frame,
    pub align: TextAlign,
    pub size: TitleSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    /// Left aligned with bullet markers
    Bulleted,
    /// Centered, italic, no markers
    Quoted,
}

/// Bullet with its index in `Slide::points`
#[derive(Debug, Clone, PartialEq)]
pub struct PointItem<'a> {
    pub index: usize,
    pub text: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell<'a> {
    pub index: usize,
    pub text: &'a str,
    pub frame: Frame,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointsBlock<'a> {
    Hidden,
    List {
        frame: Frame,
        style: ListStyle,
        items: Vec<PointItem<'a>>,
    },
    Grid {
        cells: Vec<GridCell<'a>>,
    },
}

impl PointsBlock<'_> {
    /// Indices of the bullets that are shown
    pub fn visible_indices(&self) -> Vec<usize> {
        match self {
            PointsBlock::Hidden => Vec::new(),
            PointsBlock::List { items, .. } => items.iter().map(|i| i.index).collect(),
            PointsBlock::Grid { cells } => cells.iter().map(|c| c.index).collect(),
        }
    }
}

/// What the image region shows. Generating masks any resolved image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState<'a> {
    Generating,
    Ready(&'a str),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock<'a> {
    pub frame: Frame,
    pub state: ImageState<'a>,
    /// Drawn with a border inset (typographic layout)
    pub framed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlidePlan<'a> {
    pub layout: SlideLayout,
    pub background: Background,
    pub title: TitleBlock<'a>,
    pub points: PointsBlock<'a>,
    pub image: Option<ImageBlock<'a>>,
    pub accent_bar: Option<Frame>,
    pub quote_marks: bool,
}

/// Number of bullets shown in the overview grid
pub const OVERVIEW_CELLS: usize = 4;

const IMAGE_SHARE: f32 = 2.0 / 5.0;
const INSET_SHARE: f32 = 1.0 / 3.0;

pub fn image_state(slide: &Slide, is_generating: bool) -> ImageState<'_> {
    if is_generating {
        ImageState::Generating
    } else if let Some(url) = slide.generated_image_url.as_deref().filter(|u| !u.is_empty()) {
        ImageState::Ready(url)
    } else {
        ImageState::Placeholder
    }
}

fn heading(text: &str, frame: Frame) -> TitleBlock<'_> {
    TitleBlock {
        text,
        frame,
        align: TextAlign::Left,
        size: TitleSize::Heading,
    }
}

fn bullet_list(slide: &Slide, frame: Frame, style: ListStyle) -> PointsBlock<'_> {
    PointsBlock::List {
        frame,
        style,
        items: slide
            .points
            .iter()
            .enumerate()
            .map(|(index, text)| PointItem { index, text })
            .collect(),
    }
}

/// Lay out one slide. Pure; the preview and the PPTX writer both use it.
pub fn plan_slide(slide: &Slide, is_generating: bool) -> SlidePlan<'_> {
    let title = slide.title.as_str();
    let image = |frame: Frame, framed: bool| {
        Some(ImageBlock {
            frame,
            state: image_state(slide, is_generating),
            framed,
        })
    };

    match slide.layout {
        SlideLayout::SectionHeader => SlidePlan {
            layout: SlideLayout::SectionHeader,
            background: Background::Theme,
            title: TitleBlock {
                text: title,
                frame: Frame::new(0.08, 0.3, 0.84, 0.4),
                align: TextAlign::Center,
                size: TitleSize::Hero,
            },
            points: PointsBlock::Hidden,
            image: None,
            accent_bar: None,
            quote_marks: false,
        },
        SlideLayout::Quote => SlidePlan {
            layout: SlideLayout::Quote,
            background: Background::Plain,
            title: TitleBlock {
                text: title,
                frame: Frame::new(0.12, 0.14, 0.76, 0.14),
                align: TextAlign::Center,
                size: TitleSize::Heading,
            },
            points: bullet_list(slide, Frame::new(0.12, 0.34, 0.76, 0.48), ListStyle::Quoted),
            image: None,
            accent_bar: None,
            quote_marks: true,
        },
        SlideLayout::Overview => {
            let (left, top, width, height, gap) = (0.06_f32, 0.26_f32, 0.88_f32, 0.66_f32, 0.02_f32);
            let cell_w = (width - gap) / 2.0;
            let cell_h = (height - gap) / 2.0;
            let cells = slide
                .points
                .iter()
                .take(OVERVIEW_CELLS)
                .enumerate()
                .map(|(index, text)| {
                    let col = (index % 2) as f32;
                    let row = (index / 2) as f32;
                    GridCell {
                        index,
                        text,
                        frame: Frame::new(
                            left + col * (cell_w + gap),
                            top + row * (cell_h + gap),
                            cell_w,
                            cell_h,
                        ),
                    }
                })
                .collect();
            SlidePlan {
                layout: SlideLayout::Overview,
                background: Background::Plain,
                title: heading(title, Frame::new(0.06, 0.06, 0.88, 0.14)),
                points: PointsBlock::Grid { cells },
                image: None,
                accent_bar: None,
                quote_marks: false,
            }
        }
        SlideLayout::SplitImageLeft => SlidePlan {
            layout: SlideLayout::SplitImageLeft,
            background: Background::Plain,
            title: heading(title, Frame::new(0.45, 0.08, 0.5, 0.16)),
            points: bullet_list(slide, Frame::new(0.45, 0.28, 0.5, 0.64), ListStyle::Bulleted),
            image: image(Frame::new(0.0, 0.0, IMAGE_SHARE, 1.0), false),
            accent_bar: None,
            quote_marks: false,
        },
        SlideLayout::SplitImageRight => SlidePlan {
            layout: SlideLayout::SplitImageRight,
            background: Background::Plain,
            title: heading(title, Frame::new(0.05, 0.08, 0.5, 0.16)),
            points: bullet_list(slide, Frame::new(0.05, 0.28, 0.5, 0.64), ListStyle::Bulleted),
            image: image(Frame::new(1.0 - IMAGE_SHARE, 0.0, IMAGE_SHARE, 1.0), false),
            accent_bar: None,
            quote_marks: false,
        },
        SlideLayout::TopImage => SlidePlan {
            layout: SlideLayout::TopImage,
            background: Background::Plain,
            title: heading(title, Frame::new(0.06, 0.44, 0.88, 0.14)),
            points: bullet_list(slide, Frame::new(0.06, 0.6, 0.88, 0.34), ListStyle::Bulleted),
            image: image(Frame::new(0.0, 0.0, 1.0, IMAGE_SHARE), false),
            accent_bar: None,
            quote_marks: false,
        },
        SlideLayout::TypographicWithImage => SlidePlan {
            layout: SlideLayout::TypographicWithImage,
            background: Background::Plain,
            title: heading(title, Frame::new(0.06, 0.08, 0.56, 0.16)),
            points: bullet_list(slide, Frame::new(0.06, 0.28, 0.56, 0.64), ListStyle::Bulleted),
            image: image(Frame::new(0.64, 0.2, INSET_SHARE, 0.6), true),
            accent_bar: None,
            quote_marks: false,
        },
        SlideLayout::Typographic => SlidePlan {
            layout: SlideLayout::Typographic,
            background: Background::Plain,
            title: heading(title, Frame::new(0.08, 0.08, 0.86, 0.16)),
            points: bullet_list(slide, Frame::new(0.08, 0.28, 0.86, 0.64), ListStyle::Bulleted),
            image: None,
            accent_bar: Some(Frame::new(0.05, 0.1, 0.008, 0.8)),
            quote_marks: false,
        },
    }
}
