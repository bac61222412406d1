//! Shared footer detection.
//!
//! A footer is promoted to the deck-wide heading only when every slide carries
//! the exact same non-empty footer text. One missing or differing footer drops
//! it from the whole document; slides never render their own footer.

use crate::types::{FooterDecision, Slide};

/// Compute the shared footer for a complete, ordered slide list.
pub fn reconcile_footer(slides: &[Slide]) -> FooterDecision {
    let Some(first) = slides.first() else {
        return FooterDecision::none();
    };

    let shared = match first.footer_candidate.as_deref() {
        Some(text) if !text.is_empty() => text,
        Some(_) => {
            log::debug!("Footer on slide {} is empty; no shared footer", first.ordinal);
            return FooterDecision::none();
        }
        None => {
            log::debug!("Slide {} has no footer; no shared footer", first.ordinal);
            return FooterDecision::none();
        }
    };

    for slide in &slides[1..] {
        if slide.footer_candidate.as_deref() != Some(shared) {
            log::debug!(
                "Slide {} footer {:?} disagrees with {:?}; no shared footer",
                slide.ordinal,
                slide.footer_candidate,
                shared
            );
            return FooterDecision::none();
        }
    }

    FooterDecision {
        shared_footer: Some(shared.to_string()),
        slides: slides.iter().map(|s| s.ordinal).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(ordinal: usize, footer: Option<&str>) -> Slide {
        let slide = Slide::new(ordinal, format!("slide{}", ordinal));
        match footer {
            Some(text) => slide.with_footer(text),
            None => slide,
        }
    }

    #[test]
    fn test_all_slides_agree() {
        let slides = vec![
            slide(1, Some("This is a footer")),
            slide(2, Some("This is a footer")),
            slide(3, Some("This is a footer")),
        ];
        let decision = reconcile_footer(&slides);

        assert_eq!(decision.shared_footer.as_deref(), Some("This is a footer"));
        assert_eq!(decision.slides.len(), 3);
    }

    #[test]
    fn test_one_dissenting_slide_removes_footer() {
        let slides = vec![
            slide(1, Some("Footer")),
            slide(2, Some("Footer ")),
            slide(3, Some("Footer")),
        ];
        assert_eq!(reconcile_footer(&slides), FooterDecision::none());
    }

    #[test]
    fn test_missing_footer_removes_footer() {
        let slides = vec![slide(1, Some("Footer")), slide(2, None)];
        assert_eq!(reconcile_footer(&slides), FooterDecision::none());

        let slides = vec![slide(1, None), slide(2, Some("Footer"))];
        assert_eq!(reconcile_footer(&slides), FooterDecision::none());
    }

    #[test]
    fn test_empty_footer_is_not_shared() {
        let slides = vec![slide(1, Some("")), slide(2, Some(""))];
        assert_eq!(reconcile_footer(&slides), FooterDecision::none());
    }

    #[test]
    fn test_no_normalization() {
        let slides = vec![slide(1, Some("Footer")), slide(2, Some("footer"))];
        assert!(reconcile_footer(&slides).shared_footer.is_none());
    }

    #[test]
    fn test_empty_deck() {
        assert_eq!(reconcile_footer(&[]), FooterDecision::none());
    }

    #[test]
    fn test_single_slide() {
        let decision = reconcile_footer(&[slide(4, Some("Only"))]);
        assert_eq!(decision.shared_footer.as_deref(), Some("Only"));
        assert!(decision.applies_to(4));
    }
}
