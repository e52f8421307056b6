use std::io::{Cursor, Read};

use notebook_deck_core::{encode_data_url, Deck, Slide, SlideLayout};
use notebook_deck_export::{build_pptx, PptxPackage};
use zip::ZipArchive;

fn sample_deck() -> Deck {
    let image = encode_data_url("image/png", &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    let mut with_prompt = Slide::new("Waiting", vec!["still generating".into()], SlideLayout::TopImage);
    with_prompt.image_prompt = Some("ocean".to_string());

    Deck {
        title: "Quantum <Review>".to_string(),
        subtitle: String::new(),
        theme_color: "#1e40af".to_string(),
        accent_color: "f97316".to_string(),
        slides: vec![
            Slide::new("Intro", vec![], SlideLayout::SectionHeader),
            Slide::new("Findings", vec!["one".into(), "two".into()], SlideLayout::SplitImageRight)
                .with_image(Some(image)),
            with_prompt,
        ],
    }
}

fn read_part(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
    let mut file = archive.by_name(name).unwrap();
    let mut text = String::new();
    file.read_to_string(&mut text).unwrap();
    text
}

#[test]
fn test_package_contains_required_parts() {
    let bytes = build_pptx(&sample_deck()).unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

    for name in [
        "[Content_Types].xml",
        "_rels/.rels",
        "ppt/presentation.xml",
        "ppt/_rels/presentation.xml.rels",
        "ppt/slideMasters/slideMaster1.xml",
        "ppt/slideLayouts/slideLayout1.xml",
        "ppt/theme/theme1.xml",
        "ppt/slides/slide1.xml",
        "ppt/slides/slide2.xml",
        "ppt/slides/slide3.xml",
        "ppt/slides/_rels/slide2.xml.rels",
        "ppt/media/image1.png",
    ] {
        assert!(archive.by_name(name).is_ok(), "missing part {}", name);
    }
}

#[test]
fn test_content_types_cover_slides_and_media() {
    let bytes = build_pptx(&sample_deck()).unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let types = read_part(&mut archive, "[Content_Types].xml");

    assert!(types.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
    assert!(types.contains(r#"PartName="/ppt/slides/slide3.xml""#));
    assert!(types.contains(r#"PartName="/ppt/presentation.xml""#));
}

#[test]
fn test_image_is_embedded_only_where_resolved() {
    let bytes = build_pptx(&sample_deck()).unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

    let rels = read_part(&mut archive, "ppt/slides/_rels/slide2.xml.rels");
    assert!(rels.contains("../media/image1.png"));

    // slide 3 is still waiting for its image: exported without one
    let slide3 = read_part(&mut archive, "ppt/slides/slide3.xml");
    assert!(!slide3.contains("<p:pic>"));
    assert!(slide3.contains("still generating"));

    let mut media = archive.by_name("ppt/media/image1.png").unwrap();
    let mut data = Vec::new();
    media.read_to_end(&mut data).unwrap();
    assert_eq!(&data[..4], &[0x89, 0x50, 0x4E, 0x47]);
}

#[test]
fn test_deck_colors_and_title() {
    let bytes = build_pptx(&sample_deck()).unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

    let slide1 = read_part(&mut archive, "ppt/slides/slide1.xml");
    assert!(slide1.contains(r#"<a:srgbClr val="1E40AF"/>"#));

    let theme = read_part(&mut archive, "ppt/theme/theme1.xml");
    assert!(theme.contains(r#"<a:accent2><a:srgbClr val="F97316"/></a:accent2>"#));

    let core = read_part(&mut archive, "docProps/core.xml");
    assert!(core.contains("Quantum &lt;Review&gt;"));
}

#[test]
fn test_slide_order_in_presentation() {
    let bytes = build_pptx(&sample_deck()).unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

    let presentation = read_part(&mut archive, "ppt/presentation.xml");
    let first = presentation.find(r#"r:id="rId2""#).unwrap();
    let last = presentation.find(r#"r:id="rId4""#).unwrap();
    assert!(first < last);

    let rels = read_part(&mut archive, "ppt/_rels/presentation.xml.rels");
    assert!(rels.contains(r#"Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml""#));
    assert!(rels.contains(r#"Id="rId5""#));
}

#[test]
fn test_empty_deck_still_builds() {
    let deck = Deck {
        title: String::new(),
        subtitle: String::new(),
        theme_color: "not-a-color".to_string(),
        accent_color: String::new(),
        slides: Vec::new(),
    };
    let package = PptxPackage::from_deck(&deck).unwrap();
    assert_eq!(package.media_count(), 0);
    assert!(package.part_names().any(|name| name == "ppt/presentation.xml"));
    assert!(build_pptx(&deck).is_ok());
}
