// PPTX package assembly (OPC parts written into a zip archive)

use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};

use notebook_deck_core::{normalize_color, Deck, DEFAULT_ACCENT_COLOR, DEFAULT_THEME_COLOR};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::parts::{
    core_properties_xml, escape_xml, relationships_xml, slide_layout_xml, slide_master_xml, theme_xml,
    CT_CORE_PROPERTIES, CT_PRESENTATION, CT_RELATIONSHIPS, CT_SLIDE, CT_SLIDE_LAYOUT, CT_SLIDE_MASTER,
    CT_THEME, NS_A, NS_P, NS_R, REL_CORE_PROPERTIES, REL_IMAGE, REL_OFFICE_DOCUMENT, REL_SLIDE,
    REL_SLIDE_LAYOUT, REL_SLIDE_MASTER, REL_THEME, XML_DECL,
};
use crate::slide_xml::{render_slide, DeckColors, IMAGE_REL_ID};
use crate::{ExportError, SLIDE_HEIGHT_EMU, SLIDE_WIDTH_EMU};

/// First slide id allowed by PresentationML
const FIRST_SLIDE_ID: usize = 256;

/// All parts of a presentation, keyed by part name (no leading slash)
pub struct PptxPackage {
    parts: Vec<(String, Vec<u8>)>,
    media_count: usize,
}

/// Bare uppercase hex for `srgbClr`
fn srgb(color: &str, fallback: &str) -> String {
    normalize_color(color, fallback)
        .trim_start_matches('#')
        .to_ascii_uppercase()
}

impl PptxPackage {
    pub fn from_deck(deck: &Deck) -> Result<Self, ExportError> {
        let colors = DeckColors {
            theme: srgb(&deck.theme_color, DEFAULT_THEME_COLOR),
            accent: srgb(&deck.accent_color, DEFAULT_ACCENT_COLOR),
        };

        let mut parts: Vec<(String, Vec<u8>)> = Vec::new();
        let mut overrides: Vec<(String, &str)> = Vec::new();
        let mut defaults: BTreeMap<&str, &str> = BTreeMap::new();
        defaults.insert("rels", CT_RELATIONSHIPS);
        defaults.insert("xml", "application/xml");

        let mut media_count = 0;
        for (index, slide) in deck.slides.iter().enumerate() {
            let number = index + 1;
            let rendered = render_slide(slide, index, &colors)?;

            let mut rels = vec![(
                "rId1".to_string(),
                REL_SLIDE_LAYOUT,
                "../slideLayouts/slideLayout1.xml".to_string(),
            )];
            if let Some(image) = rendered.image {
                media_count += 1;
                let media_name = format!("image{}.{}", media_count, image.extension);
                defaults.insert(image.extension, image.content_type);
                rels.push((IMAGE_REL_ID.to_string(), REL_IMAGE, format!("../media/{}", media_name)));
                parts.push((format!("ppt/media/{}", media_name), image.data));
            }

            let slide_name = format!("ppt/slides/slide{}.xml", number);
            overrides.push((format!("/{}", slide_name), CT_SLIDE));
            parts.push((slide_name, rendered.xml.into_bytes()));
            parts.push((
                format!("ppt/slides/_rels/slide{}.xml.rels", number),
                relationships_xml(&rels).into_bytes(),
            ));
        }

        overrides.push(("/ppt/presentation.xml".to_string(), CT_PRESENTATION));
        overrides.push(("/ppt/slideMasters/slideMaster1.xml".to_string(), CT_SLIDE_MASTER));
        overrides.push(("/ppt/slideLayouts/slideLayout1.xml".to_string(), CT_SLIDE_LAYOUT));
        overrides.push(("/ppt/theme/theme1.xml".to_string(), CT_THEME));
        overrides.push(("/docProps/core.xml".to_string(), CT_CORE_PROPERTIES));

        let slide_count = deck.slides.len();
        let theme_rel = format!("rId{}", slide_count + 2);

        let mut presentation_rels = vec![(
            "rId1".to_string(),
            REL_SLIDE_MASTER,
            "slideMasters/slideMaster1.xml".to_string(),
        )];
        for number in 1..=slide_count {
            presentation_rels.push((
                format!("rId{}", number + 1),
                REL_SLIDE,
                format!("slides/slide{}.xml", number),
            ));
        }
        presentation_rels.push((theme_rel, REL_THEME, "theme/theme1.xml".to_string()));

        let mut head: Vec<(String, Vec<u8>)> = vec![
            (
                "[Content_Types].xml".to_string(),
                content_types_xml(&defaults, &overrides).into_bytes(),
            ),
            (
                "_rels/.rels".to_string(),
                relationships_xml(&[
                    ("rId1".to_string(), REL_OFFICE_DOCUMENT, "ppt/presentation.xml".to_string()),
                    ("rId2".to_string(), REL_CORE_PROPERTIES, "docProps/core.xml".to_string()),
                ])
                .into_bytes(),
            ),
            ("docProps/core.xml".to_string(), core_properties_xml(&deck.title).into_bytes()),
            ("ppt/presentation.xml".to_string(), presentation_xml(slide_count)?.into_bytes()),
            (
                "ppt/_rels/presentation.xml.rels".to_string(),
                relationships_xml(&presentation_rels).into_bytes(),
            ),
            (
                "ppt/slideMasters/slideMaster1.xml".to_string(),
                slide_master_xml().into_bytes(),
            ),
            (
                "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
                relationships_xml(&[
                    ("rId1".to_string(), REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml".to_string()),
                    ("rId2".to_string(), REL_THEME, "../theme/theme1.xml".to_string()),
                ])
                .into_bytes(),
            ),
            (
                "ppt/slideLayouts/slideLayout1.xml".to_string(),
                slide_layout_xml().into_bytes(),
            ),
            (
                "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
                relationships_xml(&[(
                    "rId1".to_string(),
                    REL_SLIDE_MASTER,
                    "../slideMasters/slideMaster1.xml".to_string(),
                )])
                .into_bytes(),
            ),
            (
                "ppt/theme/theme1.xml".to_string(),
                theme_xml(&colors.theme, &colors.accent).into_bytes(),
            ),
        ];
        head.append(&mut parts);

        Ok(Self {
            parts: head,
            media_count,
        })
    }

    pub fn media_count(&self) -> usize {
        self.media_count
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }

    /// Write every part into a deflate-compressed zip
    pub fn into_bytes(self) -> Result<Vec<u8>, ExportError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, data) in &self.parts {
            writer.start_file(name.as_str(), options)?;
            writer.write_all(data)?;
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}

fn content_types_xml(defaults: &BTreeMap<&str, &str>, overrides: &[(String, &str)]) -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    for (extension, content_type) in defaults {
        xml.push_str(&format!(
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            escape_xml(extension),
            escape_xml(content_type)
        ));
    }
    for (part_name, content_type) in overrides {
        xml.push_str(&format!(
            r#"<Override PartName="{}" ContentType="{}"/>"#,
            escape_xml(part_name),
            escape_xml(content_type)
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn presentation_xml(slide_count: usize) -> Result<String, std::fmt::Error> {
    let mut xml = String::with_capacity(1024 + slide_count * 48);
    xml.push_str(XML_DECL);
    write!(
        xml,
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        NS_A, NS_R, NS_P
    )?;
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for index in 0..slide_count {
            write!(
                xml,
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                FIRST_SLIDE_ID + index,
                index + 2
            )?;
        }
        xml.push_str("</p:sldIdLst>");
    }
    write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/>"#,
        SLIDE_WIDTH_EMU, SLIDE_HEIGHT_EMU
    )?;
    xml.push_str("</p:presentation>");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presentation_lists_slides_in_order() {
        let xml = presentation_xml(3).unwrap();
        assert!(xml.contains(r#"<p:sldId id="256" r:id="rId2"/>"#));
        assert!(xml.contains(r#"<p:sldId id="258" r:id="rId4"/>"#));
        assert!(xml.contains(r#"<p:sldSz cx="12192000" cy="6858000"/>"#));
    }

    #[test]
    fn test_empty_deck_omits_slide_list() {
        assert!(!presentation_xml(0).unwrap().contains("sldIdLst"));
    }

    #[test]
    fn test_srgb_normalizes_colors() {
        assert_eq!(srgb("#3b82f6", DEFAULT_THEME_COLOR), "3B82F6");
        assert_eq!(srgb("10b981", DEFAULT_THEME_COLOR), "10B981");
        assert_eq!(srgb("blue", DEFAULT_ACCENT_COLOR), "F59E0B");
    }
}
