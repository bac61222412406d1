//! End-to-end translation of an exploded package.

use pptx2html_core::{
    bundle_name_for, reconcile_footer, Error, FooterDecision, HtmlRenderer, Result, Slide,
    SlideFailure, SlideshowBundle, SlideshowPackager,
};
use std::path::Path;

use crate::builder::SlideModelBuilder;
use crate::package::{PackageReader, SlidePart};
use crate::parser::{ParseWarning, SlideMarkupParser};

/// A shape-level warning tied to the slide it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideWarning {
    pub ordinal: usize,
    pub warning: ParseWarning,
}

/// Translator for one exploded presentation.
///
/// Opening the translator reads and models every slide up front; slides with
/// unparsable markup are left out and listed in [`failures`](Self::failures).
#[derive(Debug)]
pub struct PresentationTranslator {
    reader: PackageReader,
    slides: Vec<Slide>,
    failures: Vec<SlideFailure>,
    warnings: Vec<SlideWarning>,
    footer: FooterDecision,
    renderer: HtmlRenderer,
    packager: SlideshowPackager,
}

impl PresentationTranslator {
    /// Read and model all slides of the package at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let reader = PackageReader::open(root)?;
        let parts = reader.slide_parts()?;
        let parser = SlideMarkupParser::new();

        let mut slides = Vec::with_capacity(parts.len());
        let mut failures = Vec::new();
        let mut warnings = Vec::new();

        for (index, part) in parts.iter().enumerate() {
            let ordinal = index + 1;
            match translate_part(&parser, part, ordinal, &mut warnings) {
                Ok(slide) => slides.push(slide),
                Err(e) => {
                    log::warn!("{}", e);
                    failures.push(SlideFailure {
                        ordinal,
                        part: part.name.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        // All slides must exist before the footer can be reconciled.
        let footer = reconcile_footer(&slides);

        log::debug!(
            "Translated {} of {} slides from {} (shared footer: {:?})",
            slides.len(),
            parts.len(),
            reader.root().display(),
            footer.shared_footer
        );

        Ok(Self {
            reader,
            slides,
            failures,
            warnings,
            footer,
            renderer: HtmlRenderer::new(),
            packager: SlideshowPackager::new(),
        })
    }

    /// Use a configured renderer.
    pub fn with_renderer(mut self, renderer: HtmlRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Absolute package root.
    pub fn root(&self) -> &Path {
        self.reader.root()
    }

    /// Successfully modeled slides, in ordinal order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Slides that were dropped because their markup was unparsable.
    pub fn failures(&self) -> &[SlideFailure] {
        &self.failures
    }

    /// Shape-level problems that were recovered from.
    pub fn warnings(&self) -> &[SlideWarning] {
        &self.warnings
    }

    /// Shared footer decision for the deck.
    pub fn footer(&self) -> &FooterDecision {
        &self.footer
    }

    /// Render the deck as one HTML document.
    pub fn render_slideshow(&self) -> String {
        self.renderer.render(&self.slides, &self.footer)
    }

    /// Render and write a self-contained bundle under `dest_root`, in a
    /// directory named after the package. Returns the bundle description.
    pub fn package_slideshow(&self, dest_root: impl AsRef<Path>) -> Result<SlideshowBundle> {
        let html = self.render_slideshow();
        self.packager.package(
            &self.slides,
            &html,
            dest_root.as_ref(),
            &bundle_name_for(self.reader.root()),
        )
    }
}

/// Parse and model one slide part.
fn translate_part(
    parser: &SlideMarkupParser,
    part: &SlidePart,
    ordinal: usize,
    warnings: &mut Vec<SlideWarning>,
) -> Result<Slide> {
    let markup_error = |message: String| Error::MarkupError {
        ordinal,
        part: part.name.clone(),
        message,
    };

    let xml = part
        .read_markup()
        .map_err(|e| markup_error(format!("Failed to read {}: {}", part.path.display(), e)))?;

    let parsed = parser.parse(&xml).map_err(|e| markup_error(e.to_string()))?;

    for warning in parsed.warnings {
        log::warn!(
            "Slide {} ({}), shape {}: {}",
            ordinal,
            part.name,
            warning.shape_index,
            warning.message
        );
        warnings.push(SlideWarning { ordinal, warning });
    }

    let slide =
        SlideModelBuilder::new(&part.relationships).build(ordinal, &part.name, &parsed.shapes);
    if slide.is_empty() {
        log::debug!("Slide {} ({}) has no title, text or images", ordinal, part.name);
    }
    Ok(slide)
}
