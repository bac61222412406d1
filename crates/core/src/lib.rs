//! Core domain types, footer reconciliation, HTML rendering and bundle
//! packaging for presentation-to-HTML translation.

pub mod bundle;
pub mod error;
pub mod footer;
pub mod html;
pub mod types;

pub use bundle::{bundle_name_for, SlideshowPackager};
pub use error::{Error, Result};
pub use footer::reconcile_footer;
pub use html::HtmlRenderer;
pub use types::{BulletParagraph, FooterDecision, Slide, SlideFailure, SlideshowBundle};
