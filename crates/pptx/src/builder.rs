//! Slide model construction from parsed shapes.

use pptx2html_core::Slide;

use crate::package::Relationships;
use crate::parser::{PlaceholderRole, Shape, ShapeKind};

/// Builds [`Slide`] records, resolving picture references through the
/// slide part's relationships.
#[derive(Debug, Clone, Copy)]
pub struct SlideModelBuilder<'a> {
    relationships: &'a Relationships,
}

impl<'a> SlideModelBuilder<'a> {
    /// Create a builder for one slide part.
    pub fn new(relationships: &'a Relationships) -> Self {
        Self { relationships }
    }

    /// Map the shapes of one slide into its semantic model.
    ///
    /// The title comes from the first top-level title placeholder. Only when
    /// no shape on the slide carries placeholder metadata does the first
    /// top-level text shape with text become the title instead.
    pub fn build(&self, ordinal: usize, part: &str, shapes: &[Shape]) -> Slide {
        let mut slide = Slide::new(ordinal, part);

        let title_index = find_title_shape(shapes);
        if let Some(index) = title_index {
            let title = joined_text(&shapes[index], " ");
            if !title.trim().is_empty() {
                slide.title = Some(title.trim().to_string());
            }
        }

        for (index, shape) in shapes.iter().enumerate() {
            match shape.kind {
                ShapeKind::Text if Some(index) == title_index => {}
                ShapeKind::Text => self.add_text_shape(&mut slide, shape),
                ShapeKind::Picture => self.add_picture(&mut slide, shape),
                ShapeKind::Other => {}
            }
        }

        log::debug!(
            "Built slide {} ({}): title={:?}, {} bullets, {} images",
            ordinal,
            part,
            slide.title,
            slide.bullets.len(),
            slide.images.len()
        );

        slide
    }

    fn add_text_shape(&self, slide: &mut Slide, shape: &Shape) {
        match shape.role {
            Some(PlaceholderRole::Footer) => {
                if slide.footer_candidate.is_none() {
                    slide.footer_candidate = Some(joined_text(shape, " "));
                } else {
                    log::debug!(
                        "Slide {}: ignoring extra footer placeholder {:?}",
                        slide.ordinal,
                        shape.name
                    );
                }
            }
            Some(PlaceholderRole::Date) | Some(PlaceholderRole::SlideNumber) => {}
            _ => {
                for paragraph in &shape.paragraphs {
                    let text = paragraph.text();
                    let text = text.trim();
                    if !text.is_empty() {
                        slide.add_bullet(text, paragraph.level);
                    }
                }
            }
        }
    }

    fn add_picture(&self, slide: &mut Slide, shape: &Shape) {
        let Some(id) = shape.image_rel_id.as_deref() else {
            return;
        };
        match self.relationships.resolve(id) {
            Some(path) => slide.add_image(path),
            None => log::warn!(
                "Slide {}: image relationship {} not found; image omitted",
                slide.ordinal,
                id
            ),
        }
    }
}

fn find_title_shape(shapes: &[Shape]) -> Option<usize> {
    let has_placeholders = shapes.iter().any(|s| s.role.is_some());

    if has_placeholders {
        shapes.iter().position(|s| {
            is_top_level_text(s) && s.role.as_ref().is_some_and(PlaceholderRole::is_title)
        })
    } else {
        shapes
            .iter()
            .position(|s| is_top_level_text(s) && !s.text().trim().is_empty())
    }
}

fn is_top_level_text(shape: &Shape) -> bool {
    shape.kind == ShapeKind::Text && !shape.grouped
}

/// Non-empty paragraph texts of a shape joined with `separator`.
fn joined_text(shape: &Shape, separator: &str) -> String {
    shape
        .paragraphs
        .iter()
        .map(|p| p.text())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}
