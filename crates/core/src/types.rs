//! Domain types for representing translated slide content.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A single slide, built from one slide part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based position in package discovery order.
    pub ordinal: usize,

    /// Part name the slide was built from (e.g. `slide2`).
    pub part: String,

    /// Title placeholder text, if the slide has one.
    pub title: Option<String>,

    /// Body paragraphs in document order.
    pub bullets: Vec<BulletParagraph>,

    /// Absolute paths of the images shown on this slide, in document order.
    pub images: Vec<PathBuf>,

    /// Literal text of the first footer placeholder on this slide.
    pub footer_candidate: Option<String>,
}

impl Slide {
    /// Create an empty slide with the given ordinal and part name.
    pub fn new(ordinal: usize, part: impl Into<String>) -> Self {
        Self {
            ordinal,
            part: part.into(),
            title: None,
            bullets: Vec::new(),
            images: Vec::new(),
            footer_candidate: None,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the footer candidate.
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer_candidate = Some(footer.into());
        self
    }

    /// Append a body paragraph.
    pub fn add_bullet(&mut self, text: impl Into<String>, level: u32) {
        self.bullets.push(BulletParagraph::new(text, level));
    }

    /// Append an image path.
    pub fn add_image(&mut self, path: impl Into<PathBuf>) {
        self.images.push(path.into());
    }

    /// True when the slide has no title, bullets or images.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.bullets.is_empty() && self.images.is_empty()
    }

    /// File names of this slide's images, as referenced from the HTML.
    pub fn image_file_names(&self) -> impl Iterator<Item = &str> {
        self.images.iter().filter_map(|p| image_file_name(p))
    }
}

/// Return the file name component of an image path, if it is valid UTF-8.
pub fn image_file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// One body paragraph with its bullet nesting level (0 = top level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletParagraph {
    /// Paragraph text with all runs concatenated.
    pub text: String,

    /// Nesting level.
    pub level: u32,
}

impl BulletParagraph {
    /// Create a new paragraph.
    pub fn new(text: impl Into<String>, level: u32) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}

/// Outcome of footer reconciliation across the whole deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterDecision {
    /// Footer text shared by every slide, if any.
    pub shared_footer: Option<String>,

    /// Ordinals of the slides carrying the shared footer.
    pub slides: BTreeSet<usize>,
}

impl FooterDecision {
    /// A decision with no shared footer.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether the footer should be rendered on the given slide.
    pub fn applies_to(&self, ordinal: usize) -> bool {
        self.shared_footer.is_some() && self.slides.contains(&ordinal)
    }
}

/// A slide that could not be translated and was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideFailure {
    /// 1-based discovery position of the failed slide.
    pub ordinal: usize,

    /// Part name of the failed slide.
    pub part: String,

    /// Reason for the failure.
    pub message: String,
}

/// A packaged, self-contained slideshow on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideshowBundle {
    /// Bundle root directory.
    pub directory: PathBuf,

    /// Rendered HTML file inside the bundle.
    pub html_file: PathBuf,

    /// The `images/` directory inside the bundle.
    pub images_dir: PathBuf,

    /// Every image file written into `images_dir`.
    pub images: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_is_empty() {
        let mut slide = Slide::new(1, "slide1");
        assert!(slide.is_empty());

        slide.add_bullet("Point", 0);
        assert!(!slide.is_empty());
    }

    #[test]
    fn test_image_file_names() {
        let mut slide = Slide::new(1, "slide1");
        slide.add_image("/deck/ppt/media/image1.png");
        slide.add_image("/deck/ppt/media/photo.jpeg");

        let names: Vec<&str> = slide.image_file_names().collect();
        assert_eq!(names, vec!["image1.png", "photo.jpeg"]);
    }

    #[test]
    fn test_footer_decision_applies_to() {
        let decision = FooterDecision {
            shared_footer: Some("Footer".to_string()),
            slides: [1, 2].into_iter().collect(),
        };
        assert!(decision.applies_to(1));
        assert!(!decision.applies_to(3));
        assert!(!FooterDecision::none().applies_to(1));
    }
}
