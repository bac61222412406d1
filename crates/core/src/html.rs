//! HTML slideshow output.
//!
//! Generates one complete document per deck. The structure is fixed so that
//! downstream consumers can match on it:
//!
//! ```text
//! <!DOCTYPE html>
//! <html>
//! <head>
//! <meta charset="utf-8" />
//! <title>Deck</title>
//! </head>
//! <body>
//! <div class="slide" id="slide-1">
//! <h2>Slide title</h2>
//! <ul>
//! <li>Top level
//! <ul>
//! <li>Nested</li>
//! </ul>
//! </li>
//! </ul>
//! <img src="images/image1.png" />
//! <h1>Shared footer</h1>
//! </div>
//! </body>
//! </html>
//! ```

use crate::types::{image_file_name, BulletParagraph, FooterDecision, Slide};
use std::path::Path;

/// Directory, relative to the HTML file, that holds slide images.
pub const IMAGES_DIR: &str = "images";

/// Document title used when no slide has a title.
const DEFAULT_DOCUMENT_TITLE: &str = "Slideshow";

/// Renderer for the HTML slideshow document.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    /// Explicit `<title>` text; falls back to the first slide title.
    document_title: Option<String>,
}

impl HtmlRenderer {
    /// Create a renderer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed document title instead of the first slide's title.
    pub fn with_document_title(mut self, title: impl Into<String>) -> Self {
        self.document_title = Some(title.into());
        self
    }

    /// Render the slides and shared footer into one HTML document.
    ///
    /// Pure function of its inputs: the same slides and footer always yield
    /// byte-identical output.
    pub fn render(&self, slides: &[Slide], footer: &FooterDecision) -> String {
        let mut html = String::with_capacity(256 + slides.len() * 256);

        html.push_str("<!DOCTYPE html>\n");
        html.push_str("<html>\n<head>\n<meta charset=\"utf-8\" />\n");
        html.push_str("<title>");
        html.push_str(&escape_html(&self.document_title(slides)));
        html.push_str("</title>\n</head>\n<body>\n");

        for slide in slides {
            render_slide(&mut html, slide, footer);
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    fn document_title(&self, slides: &[Slide]) -> String {
        self.document_title
            .clone()
            .or_else(|| slides.iter().find_map(|s| s.title.clone()))
            .unwrap_or_else(|| DEFAULT_DOCUMENT_TITLE.to_string())
    }
}

fn render_slide(html: &mut String, slide: &Slide, footer: &FooterDecision) {
    html.push_str(&format!(
        "<div class=\"slide\" id=\"slide-{}\">\n",
        slide.ordinal
    ));

    // The shared footer is the slide's only heading for that text.
    let shows_footer = footer.applies_to(slide.ordinal);
    let title = slide
        .title
        .as_deref()
        .filter(|t| !(shows_footer && footer.shared_footer.as_deref() == Some(*t)));
    if let Some(title) = title {
        html.push_str("<h2>");
        html.push_str(&escape_html(title));
        html.push_str("</h2>\n");
    }

    render_bullets(html, &slide.bullets);

    for path in &slide.images {
        match image_href(path) {
            Some(href) => {
                html.push_str(&format!("<img src=\"{}\" />\n", escape_html(&href)));
            }
            None => log::warn!(
                "Slide {}: image path {} has no usable file name; not rendered",
                slide.ordinal,
                path.display()
            ),
        }
    }

    if let Some(text) = footer.shared_footer.as_deref() {
        if footer.applies_to(slide.ordinal) {
            html.push_str("<h1>");
            html.push_str(&escape_html(text));
            html.push_str("</h1>\n");
        }
    }

    html.push_str("</div>\n");
}

/// Emit nested lists, one `<ul>` per level step. A deeper list opens inside
/// the preceding item; an item with no text holds it when there is none.
fn render_bullets(html: &mut String, bullets: &[BulletParagraph]) {
    if bullets.is_empty() {
        return;
    }

    html.push_str("<ul>\n");
    let mut depth = 0u32;
    let mut item_open = false;

    for bullet in bullets {
        if bullet.level > depth {
            while depth < bullet.level {
                html.push_str(if item_open { "\n<ul>\n" } else { "<li>\n<ul>\n" });
                depth += 1;
                item_open = false;
            }
        } else {
            if item_open {
                html.push_str("</li>\n");
            }
            while depth > bullet.level {
                html.push_str("</ul>\n</li>\n");
                depth -= 1;
            }
        }
        html.push_str("<li>");
        html.push_str(&escape_html(&bullet.text));
        item_open = true;
    }

    if item_open {
        html.push_str("</li>\n");
    }
    for _ in 0..depth {
        html.push_str("</ul>\n</li>\n");
    }
    html.push_str("</ul>\n");
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// File name an image is published under inside the bundle.
pub fn image_href(path: &Path) -> Option<String> {
    image_file_name(path).map(|name| format!("{}/{}", IMAGES_DIR, name))
}
