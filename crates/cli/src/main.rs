//! CLI tool for converting exploded PowerPoint packages into HTML slideshows.

use anyhow::{Context, Result};
use clap::Parser;
use pptx2html_core::{bundle_name_for, HtmlRenderer};
use pptx2html_pptx::PresentationTranslator;
use std::fs;
use std::path::{Path, PathBuf};

/// Convert an unzipped .pptx directory into an HTML slideshow.
#[derive(Parser, Debug)]
#[command(name = "pptx2html")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Exploded package directory (the unzipped .pptx)
    input: PathBuf,

    /// Output directory for <name>.html (default: next to the input directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the HTML to stdout instead of writing to file
    #[arg(short, long)]
    print: bool,

    /// Write a self-contained bundle (index.html + images/) under this directory
    #[arg(long, value_name = "DEST_ROOT")]
    package: Option<PathBuf>,

    /// Document title for the generated HTML
    #[arg(short, long)]
    title: Option<String>,

    /// Print the slide model as JSON instead of HTML
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if args.verbose {
        eprintln!("Processing: {}", args.input.display());
    }

    let mut renderer = HtmlRenderer::new();
    if let Some(title) = &args.title {
        renderer = renderer.with_document_title(title.clone());
    }

    let translator = PresentationTranslator::open(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?
        .with_renderer(renderer);

    for failure in translator.failures() {
        eprintln!(
            "Slide {} ({}) skipped: {}",
            failure.ordinal, failure.part, failure.message
        );
    }

    if args.verbose {
        eprintln!(
            "  Converted {} slides ({} skipped)",
            translator.slides().len(),
            translator.failures().len()
        );
        match &translator.footer().shared_footer {
            Some(footer) => eprintln!("  Shared footer: {}", footer),
            None => eprintln!("  No shared footer"),
        }
    }

    if args.json {
        log::debug!("Writing slide model as JSON");
        println!("{}", model_json(&translator)?);
        return Ok(());
    }

    if let Some(dest_root) = &args.package {
        let bundle = translator
            .package_slideshow(dest_root)
            .with_context(|| format!("Failed to package into {}", dest_root.display()))?;
        if args.verbose {
            eprintln!(
                "Packaged to: {} ({} images)",
                bundle.directory.display(),
                bundle.images.len()
            );
        }
        return Ok(());
    }

    let html = translator.render_slideshow();
    if args.print {
        print!("{}", html);
    } else {
        let output_path = html_output_path(translator.root(), args.output.as_deref())?;
        write_slideshow(&output_path, translator.root(), &html)?;
        if args.verbose {
            eprintln!("Written to: {}", output_path.display());
        }
    }

    Ok(())
}

/// Serialize the slide model, footer decision and failures.
fn model_json(translator: &PresentationTranslator) -> Result<String> {
    let model = serde_json::json!({
        "root": translator.root().display().to_string(),
        "slides": serde_json::to_value(translator.slides())?,
        "footer": serde_json::to_value(translator.footer())?,
        "failures": serde_json::to_value(translator.failures())?,
    });
    serde_json::to_string_pretty(&model).context("Failed to serialize slide model")
}

/// `<package name>.html`, in `output_dir` when given, else beside the package.
fn html_output_path(package_root: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
    let file_name = format!("{}.html", bundle_name_for(package_root));

    match output_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            Ok(dir.join(file_name))
        }
        None => Ok(package_root
            .parent()
            .map(|parent| parent.join(&file_name))
            .unwrap_or_else(|| PathBuf::from(&file_name))),
    }
}

/// Write the rendered slideshow for `package_root` to `path`.
fn write_slideshow(path: &Path, package_root: &Path, html: &str) -> Result<()> {
    fs::write(path, html).with_context(|| {
        format!(
            "Failed to write slideshow for {} to {}",
            package_root.display(),
            path.display()
        )
    })
}
