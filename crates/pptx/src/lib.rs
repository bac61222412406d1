//! Exploded PPTX package reader and slide markup parser.
//!
//! Reads an unzipped `.pptx` directory, parses each `ppt/slides/slideN.xml`
//! part into shapes, and builds the slide model rendered by
//! `pptx2html-core`.

pub mod builder;
pub mod package;
pub mod parser;
pub mod runtext;
pub mod translator;

pub use builder::SlideModelBuilder;
pub use package::{PackageReader, Relationship, Relationships, SlidePart};
pub use parser::{
    ParseWarning, ParsedSlide, PlaceholderRole, Shape, ShapeKind, SlideMarkupParser,
};
pub use translator::{PresentationTranslator, SlideWarning};
