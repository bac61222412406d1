//! Exploded package traversal.
//!
//! Finds `ppt/slides/slideN.xml` parts in an unzipped presentation and
//! resolves each part's relationship file into absolute paths. Nothing here
//! interprets slide content.

use pptx2html_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use crate::parser::local_name;

/// Slide part file names: `slide1.xml`, `slide12.xml`, ...
static SLIDE_PART_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^slide(\d+)\.xml$").unwrap());

/// Directory holding slide parts, relative to the package root.
const SLIDES_DIR: &[&str] = &["ppt", "slides"];

/// Relationship files sit in this directory next to their parts.
const RELS_DIR: &str = "_rels";

/// One entry of a part's relationship file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Reference id used inside the markup, e.g. `rId2`.
    pub id: String,
    /// Absolute path of the target part.
    pub target: PathBuf,
}

/// Ordered relationships of one slide part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Build from already resolved entries.
    pub fn new(entries: Vec<Relationship>) -> Self {
        Self { entries }
    }

    /// Resolve a reference id to its target path.
    pub fn resolve(&self, id: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.target.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A discovered slide part.
#[derive(Debug, Clone)]
pub struct SlidePart {
    /// Part name without extension, e.g. `slide3`.
    pub name: String,
    /// Number encoded in the file name; determines order.
    pub number: usize,
    /// Absolute path of the slide markup.
    pub path: PathBuf,
    /// Resolved relationships of this part.
    pub relationships: Relationships,
}

impl SlidePart {
    /// Read the slide markup. The file is opened and closed within the call.
    pub fn read_markup(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }
}

/// Reader over an exploded presentation directory.
#[derive(Debug, Clone)]
pub struct PackageReader {
    root: PathBuf,
}

impl PackageReader {
    /// Open a package root. Fails if it is not a readable directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::PackageError(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        let root = root.canonicalize().map_err(|e| {
            Error::PackageError(format!("Failed to resolve {}: {}", root.display(), e))
        })?;

        Ok(Self { root })
    }

    /// Absolute package root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discover slide parts, ordered by the number in their file name.
    pub fn slide_parts(&self) -> Result<Vec<SlidePart>> {
        let slides_dir = SLIDES_DIR
            .iter()
            .fold(self.root.clone(), |dir, part| dir.join(part));

        if !slides_dir.is_dir() {
            return Err(Error::PackageError(format!(
                "No slide parts found: {} is missing",
                slides_dir.display()
            )));
        }

        let entries = fs::read_dir(&slides_dir).map_err(|e| {
            Error::PackageError(format!("Failed to list {}: {}", slides_dir.display(), e))
        })?;

        let mut found: Vec<(usize, String, PathBuf)> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                Error::PackageError(format!("Failed to list {}: {}", slides_dir.display(), e))
            })?;
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(number) = slide_number(file_name) else {
                continue;
            };
            if !path.is_file() {
                log::debug!("Skipping non-file slide entry {}", path.display());
                continue;
            }
            found.push((number, file_name.to_string(), path));
        }

        if found.is_empty() {
            return Err(Error::PackageError(format!(
                "No slide parts found in {}",
                slides_dir.display()
            )));
        }

        // Sort by slide number; file name breaks ties like slide01 / slide1.
        found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        let parts = found
            .into_iter()
            .map(|(number, file_name, path)| {
                let relationships = self.read_relationships(&slides_dir, &file_name);
                SlidePart {
                    name: file_name.trim_end_matches(".xml").to_string(),
                    number,
                    path,
                    relationships,
                }
            })
            .collect::<Vec<_>>();

        log::debug!("Found {} slide parts in {}", parts.len(), self.root.display());
        Ok(parts)
    }

    /// Load `_rels/<part>.rels`. A missing or broken file yields no
    /// relationships; pictures on that slide are then omitted.
    fn read_relationships(&self, slides_dir: &Path, file_name: &str) -> Relationships {
        let rels_path = slides_dir.join(RELS_DIR).join(format!("{}.rels", file_name));

        let content = match fs::read_to_string(&rels_path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No relationships for {}", file_name);
                return Relationships::default();
            }
            Err(e) => {
                log::warn!("Failed to read {}: {}", rels_path.display(), e);
                return Relationships::default();
            }
        };

        match parse_relationships(&content, slides_dir, &self.root) {
            Ok(relationships) => {
                log::debug!("{} relationships for {}", relationships.len(), file_name);
                relationships
            }
            Err(e) => {
                log::warn!("Ignoring relationships in {}: {}", rels_path.display(), e);
                Relationships::default()
            }
        }
    }
}

/// Parse a relationship part, resolving targets against `base_dir`.
/// Targets starting with `/` are resolved against the package root.
pub fn parse_relationships(xml: &str, base_dir: &Path, root: &Path) -> Result<Relationships> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut id = String::new();
                let mut target = String::new();
                let mut external = false;

                for attr in e.attributes().flatten() {
                    let value = attr
                        .unescape_value()
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                    match attr.key.as_ref() {
                        b"Id" => id = value,
                        b"Target" => target = value,
                        b"TargetMode" => external = value.eq_ignore_ascii_case("External"),
                        _ => {}
                    }
                }

                if id.is_empty() || target.is_empty() {
                    log::warn!("Skipping relationship without Id or Target");
                    continue;
                }
                if external {
                    log::debug!("Skipping external relationship {} -> {}", id, target);
                    continue;
                }

                entries.push(Relationship {
                    id,
                    target: resolve_target(base_dir, root, &target),
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(Relationships::new(entries))
}

/// Resolve a relationship target to a normalised absolute path.
fn resolve_target(base_dir: &Path, root: &Path, target: &str) -> PathBuf {
    let joined = match target.strip_prefix('/') {
        Some(from_root) => root.join(from_root),
        None => base_dir.join(target),
    };
    normalize_path(&joined)
}

/// Lexically remove `.` and `..` components.
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Extract N from a `slideN.xml` file name.
fn slide_number(file_name: &str) -> Option<usize> {
    let captures = SLIDE_PART_REGEX.captures(file_name)?;
    match captures[1].parse() {
        Ok(number) => Some(number),
        Err(e) => {
            log::warn!("Ignoring slide part {}: {}", file_name, e);
            None
        }
    }
}
