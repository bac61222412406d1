//! Slide markup parser.
//!
//! Walks one slide part (`<p:sld>`) with a streaming reader and collects its
//! shapes in document order. Problems inside a single shape are recorded as
//! warnings and the shape is skipped or repaired; only a broken document
//! (syntax error, wrong root, no shape tree) fails the slide.

use pptx2html_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::runtext;

/// What a shape holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// `p:sp` with a text body.
    Text,
    /// `p:pic` with an embedded image.
    Picture,
    /// Anything else: connectors, graphic frames, shapes without text.
    Other,
}

/// Placeholder role from `<p:ph type="...">`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderRole {
    Title,
    Subtitle,
    Body,
    Footer,
    Date,
    SlideNumber,
    Other(String),
}

impl PlaceholderRole {
    /// Map the `type` attribute; a placeholder without one is a body.
    pub fn from_type_attr(value: Option<&str>) -> Self {
        match value {
            None | Some("body") | Some("obj") => Self::Body,
            Some("title") | Some("ctrTitle") => Self::Title,
            Some("subTitle") => Self::Subtitle,
            Some("ftr") => Self::Footer,
            Some("dt") => Self::Date,
            Some("sldNum") => Self::SlideNumber,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self, Self::Title)
    }
}

/// A fragment of paragraph text from one `a:r` or `a:fld`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextRun {
    /// Decoded run text.
    pub text: String,
}

impl TextRun {
    fn line_break() -> Self {
        Self {
            text: "\n".to_string(),
            ..Default::default()
        }
    }
}

/// One `a:p` paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeParagraph {
    /// Bullet nesting level from `a:pPr@lvl` (0 = top level).
    pub level: u32,
    /// Runs in source order.
    pub runs: Vec<TextRun>,
}

impl ShapeParagraph {
    /// All runs concatenated into one string.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A shape from the slide's shape tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub kind: ShapeKind,
    /// `p:cNvPr@name`, when present.
    pub name: Option<String>,
    /// Placeholder role, when the shape is a placeholder.
    pub role: Option<PlaceholderRole>,
    /// Whether the shape sits inside a `p:grpSp`.
    pub grouped: bool,
    pub paragraphs: Vec<ShapeParagraph>,
    /// `a:blip@r:embed` for pictures; resolved later.
    pub image_rel_id: Option<String>,
}

impl Shape {
    /// Paragraph texts joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(ShapeParagraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A recovered problem inside one shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 0-based index of the shape in document order.
    pub shape_index: usize,
    pub message: String,
}

/// Result of parsing one slide part.
#[derive(Debug, Clone, Default)]
pub struct ParsedSlide {
    pub shapes: Vec<Shape>,
    pub warnings: Vec<ParseWarning>,
}

/// Parser for slide part markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlideMarkupParser;

impl SlideMarkupParser {
    /// Create a new slide parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse slide XML into its shapes.
    pub fn parse(&self, xml: &str) -> Result<ParsedSlide> {
        let mut reader = Reader::from_str(xml);
        // Whitespace inside <a:t> is significant.
        reader.trim_text(false);

        let mut walker = ShapeTreeWalker::default();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    if walker.skip_depth.is_none() {
                        walker.open(e, false)?;
                    }
                    walker.depth += 1;
                }
                Ok(Event::Empty(ref e)) => {
                    if walker.skip_depth.is_none() {
                        walker.open(e, true)?;
                        let name = e.name();
                        walker.close(local_name(name.as_ref()));
                    }
                }
                Ok(Event::End(ref e)) => {
                    walker.depth = walker.depth.saturating_sub(1);
                    match walker.skip_depth {
                        Some(depth) if depth == walker.depth => walker.skip_depth = None,
                        Some(_) => {}
                        None => {
                            let name = e.name();
                            walker.close(local_name(name.as_ref()));
                        }
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if walker.in_text {
                        let raw = std::str::from_utf8(e).map_err(|err| {
                            Error::XmlError(format!("Invalid UTF-8 in run text: {}", err))
                        })?;
                        walker.push_text(&runtext::decode(raw));
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if walker.in_text {
                        walker.push_text(&String::from_utf8_lossy(e));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
                _ => {}
            }
        }

        walker.finish()
    }
}

/// Shape being assembled.
#[derive(Debug)]
struct ShapeBuilder {
    /// Local element name that opened the shape (`sp`, `pic`, ...).
    element: &'static [u8],
    /// Element depth of the opening tag.
    start_depth: usize,
    index: usize,
    name: Option<String>,
    role: Option<PlaceholderRole>,
    grouped: bool,
    has_text_body: bool,
    paragraphs: Vec<ShapeParagraph>,
    image_rel_id: Option<String>,
}

/// Streaming state over the shape tree.
#[derive(Debug, Default)]
struct ShapeTreeWalker {
    shapes: Vec<Shape>,
    warnings: Vec<ParseWarning>,
    depth: usize,
    root_seen: bool,
    sp_tree_seen: bool,
    shape_count: usize,
    /// Open `p:grpSp` elements.
    group_depth: usize,
    /// One entry per open `mc:AlternateContent`: whether a branch was taken.
    alternate_content: Vec<bool>,
    /// Depth of an `mc:Choice`/`mc:Fallback` branch being skipped.
    skip_depth: Option<usize>,
    current: Option<ShapeBuilder>,
    in_text_body: bool,
    paragraph: Option<ShapeParagraph>,
    run: Option<TextRun>,
    in_text: bool,
}

impl ShapeTreeWalker {
    fn open(&mut self, e: &BytesStart, empty: bool) -> Result<()> {
        let name = e.name();
        let local = local_name(name.as_ref());

        if !self.root_seen {
            if local != b"sld" {
                return Err(Error::XmlError(format!(
                    "Unexpected root element <{}>",
                    String::from_utf8_lossy(name.as_ref())
                )));
            }
            self.root_seen = true;
            return Ok(());
        }

        // Only the first branch of an alternate content block is read.
        match local {
            // Pushed for empty elements too; `close` pops on both.
            b"AlternateContent" => {
                self.alternate_content.push(false);
                return Ok(());
            }
            b"Choice" | b"Fallback" if !empty => {
                if let Some(taken) = self.alternate_content.last_mut() {
                    if *taken {
                        self.skip_depth = Some(self.depth);
                    } else {
                        *taken = true;
                    }
                }
                return Ok(());
            }
            b"grpSp" => {
                self.group_depth += 1;
                return Ok(());
            }
            _ => {}
        }

        if let Some(element) = shape_element(local) {
            if self.current.is_some() {
                // Shapes nested in another shape contribute to the outer one.
                return Ok(());
            }
            let index = self.shape_count;
            self.shape_count += 1;
            if !empty {
                self.current = Some(ShapeBuilder {
                    element,
                    start_depth: self.depth,
                    index,
                    name: None,
                    role: None,
                    grouped: self.group_depth > 0,
                    has_text_body: false,
                    paragraphs: Vec::new(),
                    image_rel_id: None,
                });
            }
            return Ok(());
        }

        if local == b"spTree" {
            self.sp_tree_seen = true;
            return Ok(());
        }

        let Some(shape) = self.current.as_mut() else {
            return Ok(());
        };

        match local {
            b"cNvPr" => {
                shape.name = attr_value(e, b"name");
            }
            b"ph" => {
                shape.role = Some(PlaceholderRole::from_type_attr(
                    attr_value(e, b"type").as_deref(),
                ));
            }
            b"txBody" => {
                shape.has_text_body = true;
                self.in_text_body = !empty;
            }
            b"p" if self.in_text_body => {
                self.paragraph = Some(ShapeParagraph::default());
            }
            b"pPr" => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    if let Some(lvl) = attr_value(e, b"lvl") {
                        match lvl.parse::<u32>() {
                            Ok(level) => paragraph.level = level,
                            Err(_) => self.warnings.push(ParseWarning {
                                shape_index: shape.index,
                                message: format!("Invalid paragraph level '{}'; using 0", lvl),
                            }),
                        }
                    }
                }
            }
            b"r" | b"fld" if self.in_text_body => {
                if self.paragraph.is_some() {
                    self.run = Some(TextRun::default());
                } else {
                    self.warnings.push(ParseWarning {
                        shape_index: shape.index,
                        message: "Text run outside a paragraph; ignored".to_string(),
                    });
                }
            }
            b"t" if self.run.is_some() => {
                self.in_text = !empty;
            }
            b"br" => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.runs.push(TextRun::line_break());
                }
            }
            b"blip" => {
                if let Some(id) = attr_value(e, b"embed") {
                    shape.image_rel_id = Some(id);
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn close(&mut self, local: &[u8]) {
        match local {
            b"t" => self.in_text = false,
            b"r" | b"fld" => {
                if let Some(run) = self.run.take() {
                    if let Some(paragraph) = self.paragraph.as_mut() {
                        paragraph.runs.push(run);
                    }
                }
            }
            b"p" => {
                if let Some(paragraph) = self.paragraph.take() {
                    if let Some(shape) = self.current.as_mut() {
                        shape.paragraphs.push(paragraph);
                    }
                }
            }
            b"txBody" => self.in_text_body = false,
            b"AlternateContent" => {
                self.alternate_content.pop();
            }
            b"grpSp" => self.group_depth = self.group_depth.saturating_sub(1),
            _ => {}
        }

        let ends_shape = self
            .current
            .as_ref()
            .is_some_and(|s| s.start_depth == self.depth && s.element == local);
        if ends_shape {
            self.finish_shape();
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }

    fn finish_shape(&mut self) {
        let Some(builder) = self.current.take() else {
            return;
        };
        self.in_text_body = false;
        self.paragraph = None;
        self.run = None;
        self.in_text = false;

        let kind = match builder.element {
            b"pic" => match builder.image_rel_id {
                Some(_) => ShapeKind::Picture,
                None => {
                    self.warnings.push(ParseWarning {
                        shape_index: builder.index,
                        message: "Picture has no image reference; skipped".to_string(),
                    });
                    return;
                }
            },
            b"sp" if builder.has_text_body => ShapeKind::Text,
            _ => ShapeKind::Other,
        };

        self.shapes.push(Shape {
            kind,
            name: builder.name,
            role: builder.role,
            grouped: builder.grouped,
            paragraphs: builder.paragraphs,
            image_rel_id: builder.image_rel_id.filter(|_| kind == ShapeKind::Picture),
        });
    }

    fn finish(self) -> Result<ParsedSlide> {
        if !self.root_seen {
            return Err(Error::XmlError("Document has no root element".to_string()));
        }
        if self.depth != 0 {
            return Err(Error::XmlError("Unexpected end of document".to_string()));
        }
        if !self.sp_tree_seen {
            return Err(Error::XmlError("Slide has no shape tree".to_string()));
        }

        Ok(ParsedSlide {
            shapes: self.shapes,
            warnings: self.warnings,
        })
    }
}

/// Shape-level elements of the shape tree.
const SHAPE_ELEMENTS: &[&[u8]] = &[b"sp", b"pic", b"graphicFrame", b"cxnSp"];

fn shape_element(local: &[u8]) -> Option<&'static [u8]> {
    SHAPE_ELEMENTS.iter().copied().find(|element| *element == local)
}

/// Read an attribute by local name, unescaping its value.
fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| local_name(attr.key.as_ref()) == key)
        .map(|attr| {
            attr.unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned())
        })
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}
