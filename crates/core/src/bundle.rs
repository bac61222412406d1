//! Self-contained slideshow bundles.
//!
//! A bundle is a fresh directory holding the rendered HTML and an `images/`
//! folder with every image any slide references, copied by file name.

use crate::error::{Error, Result};
use crate::html::IMAGES_DIR;
use crate::types::{image_file_name, Slide, SlideshowBundle};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// File name of the HTML document inside a bundle.
pub const HTML_FILE_NAME: &str = "index.html";

/// Writes slideshow bundles to disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlideshowPackager;

/// An image to copy, with the first slide that referenced it.
struct BundledImage<'a> {
    source: &'a Path,
    ordinal: usize,
}

impl SlideshowPackager {
    /// Create a packager that writes `index.html`.
    pub fn new() -> Self {
        Self
    }

    /// Write `html` and every image referenced by `slides` into
    /// `dest_root/<name>`.
    ///
    /// The destination root is created if needed, but the bundle directory
    /// itself must not exist yet. A missing image is a hard failure; the
    /// partially written bundle is removed before the error is returned.
    pub fn package(
        &self,
        slides: &[Slide],
        html: &str,
        dest_root: &Path,
        name: &str,
    ) -> Result<SlideshowBundle> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::PackagingError(format!(
                "Invalid bundle name '{}'",
                name
            )));
        }

        // Resolve image names before touching the filesystem.
        let images = collect_images(slides)?;

        fs::create_dir_all(dest_root).map_err(|e| {
            Error::PackagingError(format!(
                "Failed to create destination {}: {}",
                dest_root.display(),
                e
            ))
        })?;

        let directory = dest_root.join(name);
        if directory.exists() {
            return Err(Error::PackagingError(format!(
                "Destination {} already exists",
                directory.display()
            )));
        }
        fs::create_dir(&directory).map_err(|e| {
            Error::PackagingError(format!(
                "Failed to create bundle directory {}: {}",
                directory.display(),
                e
            ))
        })?;

        match self.write_contents(&directory, html, &images) {
            Ok(bundle) => {
                log::debug!(
                    "Packaged {} slides and {} images into {}",
                    slides.len(),
                    bundle.images.len(),
                    bundle.directory.display()
                );
                Ok(bundle)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&directory) {
                    log::warn!(
                        "Failed to remove incomplete bundle {}: {}",
                        directory.display(),
                        cleanup
                    );
                }
                Err(e)
            }
        }
    }

    fn write_contents(
        &self,
        directory: &Path,
        html: &str,
        images: &BTreeMap<&str, BundledImage<'_>>,
    ) -> Result<SlideshowBundle> {
        let html_file = directory.join(HTML_FILE_NAME);
        fs::write(&html_file, html).map_err(|e| {
            Error::PackagingError(format!("Failed to write {}: {}", html_file.display(), e))
        })?;

        let images_dir = directory.join(IMAGES_DIR);
        fs::create_dir(&images_dir).map_err(|e| {
            Error::PackagingError(format!("Failed to create {}: {}", images_dir.display(), e))
        })?;

        let mut copied = Vec::with_capacity(images.len());
        for (file_name, image) in images {
            let target = images_dir.join(file_name);
            fs::copy(image.source, &target).map_err(|e| {
                Error::PackagingError(format!(
                    "Slide {}: failed to copy image {}: {}",
                    image.ordinal,
                    image.source.display(),
                    e
                ))
            })?;
            copied.push(target);
        }

        Ok(SlideshowBundle {
            directory: directory.to_path_buf(),
            html_file,
            images_dir,
            images: copied,
        })
    }
}

/// Map each image file name to its source, rejecting name collisions.
fn collect_images(slides: &[Slide]) -> Result<BTreeMap<&str, BundledImage<'_>>> {
    let mut images: BTreeMap<&str, BundledImage<'_>> = BTreeMap::new();

    for slide in slides {
        for path in &slide.images {
            let file_name = image_file_name(path).ok_or_else(|| {
                Error::PackagingError(format!(
                    "Slide {}: image path {} has no file name",
                    slide.ordinal,
                    path.display()
                ))
            })?;

            match images.get(file_name) {
                Some(existing) if existing.source != path.as_path() => {
                    return Err(Error::PackagingError(format!(
                        "Slide {}: image {} collides with {} from slide {}",
                        slide.ordinal,
                        path.display(),
                        existing.source.display(),
                        existing.ordinal
                    )));
                }
                Some(_) => {}
                None => {
                    images.insert(
                        file_name,
                        BundledImage {
                            source: path.as_path(),
                            ordinal: slide.ordinal,
                        },
                    );
                }
            }
        }
    }

    Ok(images)
}

/// Bundle directory name derived from a package root (its last component).
pub fn bundle_name_for(package_root: &Path) -> String {
    package_root
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("slideshow")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_image(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"\x89PNG fake").unwrap();
        path
    }

    #[test]
    fn test_package_copies_images() {
        let media = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let image = write_image(media.path(), "image1.png");

        let mut slide = Slide::new(1, "slide1");
        slide.add_image(&image);
        let mut again = Slide::new(2, "slide2");
        again.add_image(&image);

        let bundle = SlideshowPackager::new()
            .package(&[slide, again], "<!DOCTYPE html>\n", dest.path(), "Deck")
            .unwrap();

        assert!(bundle.directory.is_dir());
        assert!(bundle.images_dir.is_dir());
        assert!(bundle.images_dir.join("image1.png").is_file());
        assert_eq!(bundle.images.len(), 1);
        assert_eq!(
            fs::read_to_string(bundle.directory.join("index.html")).unwrap(),
            "<!DOCTYPE html>\n"
        );
    }

    #[test]
    fn test_existing_destination_is_rejected() {
        let dest = tempfile::tempdir().unwrap();
        fs::create_dir(dest.path().join("Deck")).unwrap();
        fs::write(dest.path().join("Deck").join("keep.txt"), "prior").unwrap();

        let err = SlideshowPackager::new()
            .package(&[], "", dest.path(), "Deck")
            .unwrap_err();

        assert!(matches!(err, Error::PackagingError(_)));
        assert!(dest.path().join("Deck").join("keep.txt").is_file());
    }

    #[test]
    fn test_missing_image_fails_and_cleans_up() {
        let dest = tempfile::tempdir().unwrap();
        let mut slide = Slide::new(3, "slide3");
        slide.add_image(dest.path().join("nowhere").join("image9.png"));

        let err = SlideshowPackager::new()
            .package(&[slide], "", dest.path(), "Deck")
            .unwrap_err();

        match err {
            Error::PackagingError(message) => assert!(message.contains("Slide 3")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!dest.path().join("Deck").exists());
    }

    #[test]
    fn test_file_name_collision() {
        let media = tempfile::tempdir().unwrap();
        fs::create_dir(media.path().join("a")).unwrap();
        fs::create_dir(media.path().join("b")).unwrap();
        let first = write_image(&media.path().join("a"), "image1.png");
        let second = write_image(&media.path().join("b"), "image1.png");

        let mut slide = Slide::new(1, "slide1");
        slide.add_image(first);
        slide.add_image(second);

        let dest = tempfile::tempdir().unwrap();
        let err = SlideshowPackager::new()
            .package(&[slide], "", dest.path(), "Deck")
            .unwrap_err();
        assert!(matches!(err, Error::PackagingError(_)));
    }

    #[test]
    fn test_empty_deck_bundle() {
        let dest = tempfile::tempdir().unwrap();
        let bundle = SlideshowPackager::new()
            .package(&[], "x", dest.path(), "Deck")
            .unwrap();
        assert_eq!(bundle.html_file, dest.path().join("Deck").join("index.html"));
        assert!(bundle.images_dir.is_dir());
        assert!(bundle.images.is_empty());
    }

    #[test]
    fn test_invalid_bundle_name() {
        let dest = tempfile::tempdir().unwrap();
        assert!(SlideshowPackager::new()
            .package(&[], "", dest.path(), "../escape")
            .is_err());
    }

    #[test]
    fn test_bundle_name_for() {
        assert_eq!(bundle_name_for(Path::new("/tmp/TestPresentation")), "TestPresentation");
        assert_eq!(bundle_name_for(Path::new("/")), "slideshow");
    }
}
