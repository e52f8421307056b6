// Slide part XML from a layout plan

use std::fmt::Write as FmtWrite;

use notebook_deck_core::{
    decode_data_url, plan_slide, Background, Frame, ImageState, ListStyle, PointsBlock, Slide,
    TextAlign, TitleSize,
};

use crate::parts::{escape_xml, NS_A, NS_P, NS_R, SP_TREE_HEADER, XML_DECL};
use crate::{SLIDE_HEIGHT_EMU, SLIDE_WIDTH_EMU};

/// Relationship id of the slide's picture (rId1 is the layout)
pub(crate) const IMAGE_REL_ID: &str = "rId2";

const TEXT_DARK: &str = "1F2937";
const TEXT_MUTED: &str = "374151";
const TEXT_LIGHT: &str = "FFFFFF";
const CELL_FILL: &str = "F3F4F6";

/// Deck colors as bare uppercase hex
#[derive(Debug, Clone)]
pub(crate) struct DeckColors {
    pub theme: String,
    pub accent: String,
}

/// Decoded picture for one slide
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SlideImage {
    pub extension: &'static str,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

pub(crate) struct RenderedSlide {
    pub xml: String,
    pub image: Option<SlideImage>,
}

/// Map a MIME type onto a media extension; unsupported types return None
fn media_kind(mime: &str) -> Option<(&'static str, &'static str)> {
    match mime.to_ascii_lowercase().as_str() {
        "image/png" => Some(("png", "image/png")),
        "image/jpeg" | "image/jpg" => Some(("jpeg", "image/jpeg")),
        "image/gif" => Some(("gif", "image/gif")),
        "image/webp" => Some(("webp", "image/webp")),
        _ => None,
    }
}

/// Only inline data URLs are embedded
fn load_image(url: &str, slide_number: usize) -> Option<SlideImage> {
    let Some((mime, data)) = decode_data_url(url) else {
        tracing::warn!("Slide {}: image is not a data URL, exported without it", slide_number);
        return None;
    };
    let Some((extension, content_type)) = media_kind(&mime) else {
        tracing::warn!("Slide {}: unsupported image type {}, skipped", slide_number, mime);
        return None;
    };
    Some(SlideImage {
        extension,
        content_type,
        data,
    })
}

struct TextRun<'a> {
    text: &'a str,
    size: u32,
    bold: bool,
    italic: bool,
    color: &'a str,
}

struct ShapeWriter {
    xml: String,
    next_id: u32,
}

impl ShapeWriter {
    fn new() -> Self {
        Self {
            xml: String::with_capacity(4096),
            next_id: 2,
        }
    }

    fn id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn xfrm(&mut self, frame: Frame) -> std::fmt::Result {
        let (x, y, cx, cy) = frame.to_emu(SLIDE_WIDTH_EMU, SLIDE_HEIGHT_EMU);
        write!(
            self.xml,
            r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            x, y, cx, cy
        )
    }

    fn rect(&mut self, name: &str, frame: Frame, fill: &str) -> std::fmt::Result {
        let id = self.id();
        write!(
            self.xml,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{} {}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>"#,
            id, name, id
        )?;
        self.xfrm(frame)?;
        write!(
            self.xml,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:ln><a:noFill/></a:ln></p:spPr></p:sp>"#,
            fill
        )
    }

    /// Text box with one paragraph per run
    fn text_box(
        &mut self,
        frame: Frame,
        fill: Option<&str>,
        align: TextAlign,
        anchor_center: bool,
        bullets: bool,
        runs: &[TextRun<'_>],
    ) -> std::fmt::Result {
        let id = self.id();
        write!(
            self.xml,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="TextBox {}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>"#,
            id, id
        )?;
        self.xfrm(frame)?;
        self.xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
        match fill {
            Some(color) => write!(self.xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color)?,
            None => self.xml.push_str("<a:noFill/>"),
        }
        self.xml.push_str("</p:spPr><p:txBody>");
        write!(
            self.xml,
            r#"<a:bodyPr wrap="square" lIns="91440" tIns="45720" rIns="91440" bIns="45720" anchor="{}"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#,
            if anchor_center { "ctr" } else { "t" }
        )?;

        if runs.is_empty() {
            self.xml.push_str("<a:p/>");
        }
        for run in runs {
            let algn = match align {
                TextAlign::Left => "l",
                TextAlign::Center => "ctr",
            };
            if bullets {
                write!(
                    self.xml,
                    r#"<a:p><a:pPr marL="285750" indent="-285750" algn="{}"><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/></a:pPr>"#,
                    algn
                )?;
            } else {
                write!(self.xml, r#"<a:p><a:pPr algn="{}"><a:buNone/></a:pPr>"#, algn)?;
            }
            write!(self.xml, r#"<a:r><a:rPr lang="ja-JP" sz="{}""#, run.size)?;
            if run.bold {
                self.xml.push_str(r#" b="1""#);
            }
            if run.italic {
                self.xml.push_str(r#" i="1""#);
            }
            write!(
                self.xml,
                r#" dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:rPr><a:t>{}</a:t></a:r></a:p>"#,
                run.color,
                escape_xml(&single_line(run.text))
            )?;
        }

        self.xml.push_str("</p:txBody></p:sp>");
        Ok(())
    }

    fn picture(&mut self, frame: Frame, outline: Option<&str>) -> std::fmt::Result {
        let id = self.id();
        write!(
            self.xml,
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="Picture {}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
            id, id
        )?;
        write!(
            self.xml,
            r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>"#,
            IMAGE_REL_ID
        )?;
        self.xfrm(frame)?;
        self.xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
        if let Some(color) = outline {
            write!(
                self.xml,
                r#"<a:ln w="38100"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:ln>"#,
                color
            )?;
        }
        self.xml.push_str("</p:spPr></p:pic>");
        Ok(())
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Render slide `index` (0-based) of the deck
pub(crate) fn render_slide(
    slide: &Slide,
    index: usize,
    colors: &DeckColors,
) -> Result<RenderedSlide, std::fmt::Error> {
    let plan = plan_slide(slide, false);
    let on_theme = plan.background == Background::Theme;
    let mut shapes = ShapeWriter::new();

    if let Some(bar) = plan.accent_bar {
        shapes.rect("Accent", bar, &colors.accent)?;
    }

    if plan.quote_marks {
        shapes.text_box(
            Frame::new(0.05, 0.04, 0.12, 0.18),
            None,
            TextAlign::Left,
            false,
            false,
            &[TextRun {
                text: "\u{201C}",
                size: 9600,
                bold: true,
                italic: false,
                color: &colors.accent,
            }],
        )?;
    }

    let image = match &plan.image {
        Some(block) => match block.state {
            ImageState::Ready(url) => {
                let loaded = load_image(url, index + 1);
                if loaded.is_some() {
                    let outline = block.framed.then_some(colors.accent.as_str());
                    shapes.picture(block.frame, outline)?;
                }
                loaded
            }
            // Placeholders are a preview affordance only
            ImageState::Generating | ImageState::Placeholder => None,
        },
        None => None,
    };

    let title_color = if on_theme { TEXT_LIGHT } else { TEXT_DARK };
    shapes.text_box(
        plan.title.frame,
        None,
        plan.title.align,
        plan.title.size == TitleSize::Hero,
        false,
        &[TextRun {
            text: plan.title.text,
            size: match plan.title.size {
                TitleSize::Hero => 4800,
                TitleSize::Heading => 3200,
            },
            bold: true,
            italic: false,
            color: title_color,
        }],
    )?;

    match &plan.points {
        PointsBlock::Hidden => {}
        PointsBlock::List { frame, style, items } => {
            let quoted = *style == ListStyle::Quoted;
            let runs: Vec<TextRun<'_>> = items
                .iter()
                .map(|item| TextRun {
                    text: item.text,
                    size: if quoted { 2400 } else { 2000 },
                    bold: false,
                    italic: quoted,
                    color: TEXT_MUTED,
                })
                .collect();
            shapes.text_box(
                *frame,
                None,
                if quoted { TextAlign::Center } else { TextAlign::Left },
                quoted,
                !quoted,
                &runs,
            )?;
        }
        PointsBlock::Grid { cells } => {
            for cell in cells {
                shapes.text_box(
                    cell.frame,
                    Some(CELL_FILL),
                    TextAlign::Center,
                    true,
                    false,
                    &[TextRun {
                        text: cell.text,
                        size: 1800,
                        bold: false,
                        italic: false,
                        color: TEXT_DARK,
                    }],
                )?;
            }
        }
    }

    let mut xml = String::with_capacity(shapes.xml.len() + 1024);
    xml.push_str(XML_DECL);
    write!(xml, r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld>"#, NS_A, NS_R, NS_P)?;
    if on_theme {
        write!(
            xml,
            r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
            colors.theme
        )?;
    }
    write!(xml, "<p:spTree>{}{}</p:spTree>", SP_TREE_HEADER, shapes.xml)?;
    xml.push_str("</p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");

    Ok(RenderedSlide { xml, image })
}

#[cfg(test)]
mod tests {
    use super::*;
    use notebook_deck_core::{encode_data_url, SlideLayout};

    fn colors() -> DeckColors {
        DeckColors {
            theme: "3B82F6".to_string(),
            accent: "F59E0B".to_string(),
        }
    }

    #[test]
    fn test_section_header_uses_theme_background() {
        let slide = Slide::new("Part 1", vec!["hidden".into()], SlideLayout::SectionHeader);
        let rendered = render_slide(&slide, 0, &colors()).unwrap();
        assert!(rendered.xml.contains(r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="3B82F6"/>"#));
        assert!(rendered.xml.contains("Part 1"));
        assert!(!rendered.xml.contains("hidden"));
    }

    #[test]
    fn test_typographic_has_accent_bar_and_bullets() {
        let slide = Slide::new("T", vec!["a & b".into(), "c".into()], SlideLayout::Typographic);
        let rendered = render_slide(&slide, 0, &colors()).unwrap();
        assert!(rendered.xml.contains(r#"<a:srgbClr val="F59E0B"/>"#));
        assert!(rendered.xml.contains("a &amp; b"));
        assert_eq!(rendered.xml.matches("<a:buChar").count(), 2);
        assert!(rendered.image.is_none());
    }

    #[test]
    fn test_overview_renders_four_cells() {
        let points = (0..6).map(|i| format!("cell {}", i)).collect();
        let slide = Slide::new("Agenda", points, SlideLayout::Overview);
        let rendered = render_slide(&slide, 0, &colors()).unwrap();
        assert!(rendered.xml.contains("cell 3"));
        assert!(!rendered.xml.contains("cell 4"));
    }

    #[test]
    fn test_data_url_image_is_embedded() {
        let url = encode_data_url("image/jpeg", &[0xFF, 0xD8, 0xFF]);
        let slide = Slide::new("Pic", vec![], SlideLayout::SplitImageLeft).with_image(Some(url));
        let rendered = render_slide(&slide, 0, &colors()).unwrap();
        let image = rendered.image.unwrap();
        assert_eq!(image.extension, "jpeg");
        assert_eq!(image.data, vec![0xFF, 0xD8, 0xFF]);
        assert!(rendered.xml.contains(r#"r:embed="rId2""#));
    }

    #[test]
    fn test_non_data_url_is_skipped() {
        let slide = Slide::new("Pic", vec![], SlideLayout::TopImage)
            .with_image(Some("https://example.com/a.png".to_string()));
        let rendered = render_slide(&slide, 0, &colors()).unwrap();
        assert!(rendered.image.is_none());
        assert!(!rendered.xml.contains("<p:pic>"));
    }

    #[test]
    fn test_quote_is_italic_and_centered() {
        let slide = Slide::new("Q", vec!["Stay hungry".into()], SlideLayout::Quote);
        let rendered = render_slide(&slide, 0, &colors()).unwrap();
        assert!(rendered.xml.contains(r#" i="1""#));
        assert!(rendered.xml.contains("\u{201C}"));
    }
}
