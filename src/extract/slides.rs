// src/extract/slides.rs

use std::collections::HashMap;
use std::io::{Cursor, Read};

use xml::{
    name::OwnedName,
    reader::{EventReader, XmlEvent},
};
use zip::ZipArchive;

use super::ExtractError;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

const PRESENTATION_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const DRAWING_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

/// Extracts the text of every text-bearing shape of a `.pptx` deck.
///
/// Slides are visited in presentation order, i.e. the `sldIdLst` of
/// `ppt/presentation.xml` resolved through its relationships part. Decks
/// without a presentation part fall back to slide-number order. Each shape
/// contributes its paragraphs joined by `\n`, followed by a trailing `\n`.
pub fn extract_pptx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractError::Archive(e.to_string()))?;

    let slides = if has_part(&archive, PRESENTATION_PART) {
        presentation_order(&mut archive)?
    } else {
        numeric_order(&archive)
    };

    let mut text = String::new();
    for name in slides {
        let xml = read_part(&mut archive, &name)?;
        text.push_str(&slide_text(&xml)?);
    }

    Ok(text)
}

fn has_part(archive: &Archive<'_>, name: &str) -> bool {
    archive.file_names().any(|n| n == name)
}

fn read_part(archive: &mut Archive<'_>, name: &str) -> Result<String, ExtractError> {
    let mut part = archive
        .by_name(name)
        .map_err(|e| ExtractError::Archive(format!("{name}: {e}")))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ExtractError::Archive(format!("{name}: {e}")))?;
    Ok(xml)
}

/// Slide part names in the order the presentation lists them.
fn presentation_order(archive: &mut Archive<'_>) -> Result<Vec<String>, ExtractError> {
    let presentation = read_part(archive, PRESENTATION_PART)?;
    let rels = read_part(archive, PRESENTATION_RELS_PART)?;

    let targets = relationship_targets(&rels)?;

    let mut slides = Vec::new();
    for event in EventReader::new(presentation.as_bytes()) {
        if let XmlEvent::StartElement {
            name, attributes, ..
        } = event.map_err(|e| ExtractError::Xml(e.to_string()))?
        {
            if !is(&name, PRESENTATION_NS, "sldId") {
                continue;
            }
            let rel_id = attributes
                .iter()
                .find(|a| is(&a.name, RELATIONSHIPS_NS, "id"))
                .map(|a| a.value.as_str())
                .ok_or_else(|| ExtractError::Xml("slide entry without r:id".to_string()))?;
            let target = targets.get(rel_id).ok_or_else(|| {
                ExtractError::Archive(format!("unknown slide relationship `{rel_id}`"))
            })?;
            slides.push(resolve_target("ppt", target));
        }
    }

    Ok(slides)
}

/// `Id -> Target` for every relationship of a `.rels` part.
fn relationship_targets(xml: &str) -> Result<HashMap<String, String>, ExtractError> {
    let mut targets = HashMap::new();
    for event in EventReader::new(xml.as_bytes()) {
        if let XmlEvent::StartElement {
            name, attributes, ..
        } = event.map_err(|e| ExtractError::Xml(e.to_string()))?
        {
            if name.local_name != "Relationship" {
                continue;
            }
            let attr = |key: &str| {
                attributes
                    .iter()
                    .find(|a| a.name.namespace.is_none() && a.name.local_name == key)
                    .map(|a| a.value.clone())
            };
            if let (Some(id), Some(target)) = (attr("Id"), attr("Target")) {
                targets.insert(id, target);
            }
        }
    }
    Ok(targets)
}

/// Resolves a relationship target against the folder of its source part.
fn resolve_target(base_dir: &str, target: &str) -> String {
    let mut segments: Vec<&str> = match target.strip_prefix('/') {
        Some(_) => Vec::new(),
        None => base_dir.split('/').filter(|s| !s.is_empty()).collect(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

fn numeric_order(archive: &Archive<'_>) -> Vec<String> {
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    slides.sort_by_key(|(n, _)| *n);
    slides.into_iter().map(|(_, name)| name).collect()
}

/// `ppt/slides/slide12.xml` -> `Some(12)`. Layouts, masters and `_rels` parts are ignored.
fn slide_number(part_name: &str) -> Option<u32> {
    part_name
        .strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

fn is(name: &OwnedName, namespace: &str, local_name: &str) -> bool {
    name.namespace.as_deref() == Some(namespace) && name.local_name == local_name
}

#[derive(Default)]
struct Shape {
    has_text_body: bool,
    paragraphs: Vec<String>,
}

fn slide_text(xml: &str) -> Result<String, ExtractError> {
    let mut out = String::new();
    let mut shape: Option<Shape> = None;
    let mut in_run_text = false;

    for event in EventReader::new(xml.as_bytes()) {
        match event.map_err(|e| ExtractError::Xml(e.to_string()))? {
            XmlEvent::StartElement { name, .. } => {
                match (name.namespace.as_deref(), name.local_name.as_str()) {
                    (Some(PRESENTATION_NS), "sp") => shape = Some(Shape::default()),
                    (Some(PRESENTATION_NS), "txBody") => {
                        if let Some(shape) = shape.as_mut() {
                            shape.has_text_body = true;
                        }
                    }
                    (Some(DRAWING_NS), "p") => {
                        if let Some(shape) = shape.as_mut() {
                            shape.paragraphs.push(String::new());
                        }
                    }
                    (Some(DRAWING_NS), "br") => push_text(&mut shape, "\n"),
                    (Some(DRAWING_NS), "t") => in_run_text = true,
                    _ => {}
                }
            }
            XmlEvent::Characters(chunk) | XmlEvent::Whitespace(chunk) if in_run_text => {
                push_text(&mut shape, &chunk);
            }
            XmlEvent::EndElement { name } => {
                match (name.namespace.as_deref(), name.local_name.as_str()) {
                    (Some(DRAWING_NS), "t") => in_run_text = false,
                    (Some(PRESENTATION_NS), "sp") => {
                        if let Some(done) = shape.take() {
                            if done.has_text_body {
                                out.push_str(&done.paragraphs.join("\n"));
                                out.push('\n');
                            }
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    Ok(out)
}

fn push_text(shape: &mut Option<Shape>, chunk: &str) {
    if let Some(paragraph) = shape.as_mut().and_then(|s| s.paragraphs.last_mut()) {
        paragraph.push_str(chunk);
    }
}
