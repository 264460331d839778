mod logger;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdf_normalize::{
    BatchUpdate, DocumentInput, LopdfPage, NormalizeOptions, PagePrimitives, RotationRequest,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "pdfn", about = "Normalize PDF page size and rotation", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resize every page to the target size and rotate it
    Normalize {
        /// Input PDF file(s); append @DEGREES to set that file's rotation
        #[arg(short, long, required = true, num_args = 1.., value_parser = parse_input_spec)]
        input: Vec<InputSpec>,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        /// Rotation for inputs without @DEGREES (-90, 0, 90, 180, 270)
        #[arg(long, allow_negative_numbers = true, value_parser = parse_rotation)]
        rotation: Option<RotationRequest>,

        /// Fail on encrypted inputs instead of trying to bypass encryption
        #[arg(long)]
        no_ignore_encryption: bool,

        /// Leave zero-sized pages untouched instead of failing the document
        #[arg(long)]
        skip_degenerate_pages: bool,

        /// Documents processed in parallel
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Also write a base64 data URI next to each output PDF
        #[arg(long)]
        data_uri: bool,
    },

    /// Print the per-page transform without writing anything
    Plan {
        /// Input PDF file(s); append @DEGREES to set that file's rotation
        #[arg(short, long, required = true, num_args = 1.., value_parser = parse_input_spec)]
        input: Vec<InputSpec>,

        #[command(flatten)]
        target: TargetArgs,

        /// Rotation for inputs without @DEGREES (-90, 0, 90, 180, 270)
        #[arg(long, allow_negative_numbers = true, value_parser = parse_rotation)]
        rotation: Option<RotationRequest>,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Options file (JSON); command-line flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Target paper preset
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,

    /// Custom target width in points
    #[arg(long, requires = "height")]
    width: Option<f64>,

    /// Custom target height in points
    #[arg(long, requires = "width")]
    height: Option<f64>,

    /// Target orientation
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A4,
    Letter,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<PaperArg> for pdf_normalize::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A4 => Self::A4,
            PaperArg::Letter => Self::Letter,
        }
    }
}

impl From<OrientationArg> for pdf_normalize::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

/// An input path with an optional per-file rotation
#[derive(Clone, Debug)]
struct InputSpec {
    path: PathBuf,
    rotation: Option<RotationRequest>,
}

impl InputSpec {
    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

fn parse_rotation(s: &str) -> std::result::Result<RotationRequest, String> {
    s.parse().map_err(|e: pdf_normalize::NormalizeError| e.to_string())
}

/// `file.pdf` or `file.pdf@180`. A suffix that isn't a number stays part
/// of the path.
fn parse_input_spec(s: &str) -> std::result::Result<InputSpec, String> {
    if let Some((path, suffix)) = s.rsplit_once('@') {
        if suffix.parse::<i32>().is_ok() {
            return Ok(InputSpec {
                path: PathBuf::from(path),
                rotation: Some(parse_rotation(suffix)?),
            });
        }
    }
    Ok(InputSpec {
        path: PathBuf::from(s),
        rotation: None,
    })
}

async fn build_options(
    target: &TargetArgs,
    rotation: Option<RotationRequest>,
) -> Result<NormalizeOptions> {
    let mut options = match &target.config {
        Some(path) => NormalizeOptions::load(path)
            .await
            .with_context(|| format!("Loading options from {}", path.display()))?,
        None => NormalizeOptions::default(),
    };

    if let Some(paper) = target.paper {
        options.paper_size = paper.into();
    }
    if let (Some(width_pt), Some(height_pt)) = (target.width, target.height) {
        options.paper_size = pdf_normalize::PaperSize::Custom {
            width_pt,
            height_pt,
        };
    }
    if let Some(orientation) = target.orientation {
        options.orientation = orientation.into();
    }
    if let Some(rotation) = rotation {
        options.default_rotation = rotation;
    }
    Ok(options)
}

/// Outputs are named after the input file name, so two inputs with the same
/// name in different directories would overwrite each other.
fn check_output_names(inputs: &[InputSpec]) -> Result<()> {
    let mut seen: HashMap<String, &Path> = HashMap::new();
    for entry in inputs {
        if let Some(previous) = seen.insert(entry.name(), &entry.path) {
            bail!(
                "{} and {} would both be written as {}",
                previous.display(),
                entry.path.display(),
                entry.name()
            );
        }
    }
    Ok(())
}

async fn read_inputs(
    inputs: &[InputSpec],
    default_rotation: RotationRequest,
) -> Result<Vec<DocumentInput>> {
    let mut documents = Vec::with_capacity(inputs.len());
    for entry in inputs {
        let bytes = tokio::fs::read(&entry.path)
            .await
            .with_context(|| format!("Reading {}", entry.path.display()))?;
        documents.push(DocumentInput::new(
            entry.name(),
            bytes,
            entry.rotation.unwrap_or(default_rotation),
        ));
    }
    Ok(documents)
}

async fn run_normalize(
    inputs: Vec<DocumentInput>,
    options: &NormalizeOptions,
    output: &Path,
    data_uri: bool,
) -> Result<()> {
    tokio::fs::create_dir_all(output)
        .await
        .with_context(|| format!("Creating {}", output.display()))?;

    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let reporter = tokio::spawn(async move {
        let mut total = 0;
        while let Some(update) = update_rx.recv().await {
            match update {
                BatchUpdate::Started { total: count } => total = count,
                BatchUpdate::DocumentStarted { index, name } => {
                    log::info!("[{}/{}] {}", index + 1, total, name)
                }
                BatchUpdate::DocumentFinished { .. } | BatchUpdate::Finished { .. } => {}
            }
        }
    });

    let results =
        pdf_normalize::normalize_batch_with_progress(inputs, options, Some(update_tx)).await?;
    // The sender is dropped with the batch, so the reporter ends
    reporter.await?;

    let mut failed = 0;
    for result in results {
        match result {
            Ok(doc) => {
                let path = output.join(&doc.name);
                tokio::fs::write(&path, &doc.bytes)
                    .await
                    .with_context(|| format!("Writing {}", path.display()))?;
                if data_uri {
                    let uri_path = output.join(format!("{}.datauri", doc.name));
                    tokio::fs::write(&uri_path, doc.to_data_uri())
                        .await
                        .with_context(|| format!("Writing {}", uri_path.display()))?;
                }
                println!(
                    "{} → {} ({} pages: {} fit-center, {} stretch, {} skipped)",
                    doc.name,
                    path.display(),
                    doc.page_count,
                    doc.fit_center_pages,
                    doc.stretch_pages,
                    doc.skipped_pages
                );
            }
            Err(e) => {
                failed += 1;
                eprintln!("Failed: {}", e);
            }
        }
    }

    if failed > 0 {
        bail!("{} document(s) failed", failed);
    }
    Ok(())
}

async fn run_plan(inputs: &[InputSpec], options: &NormalizeOptions) -> Result<()> {
    options.validate()?;
    let target = options.target();
    println!("Target: {} x {}", target.width, target.height);

    for entry in inputs {
        let request = entry.rotation.unwrap_or(options.default_rotation);
        let mut doc = pdf_normalize::load_pdf(&entry.path, options.ignore_encryption)
            .await
            .with_context(|| format!("Loading {}", entry.path.display()))?;
        let page_ids: Vec<_> = doc.get_pages().values().copied().collect();

        println!("{} (rotation {}°)", entry.name(), request.degrees());
        for (index, page_id) in page_ids.into_iter().enumerate() {
            let page = LopdfPage::new(&mut doc, page_id);
            let page_box = page.page_box()?;
            match pdf_normalize::plan(page_box, page.rotation()?, request, target) {
                Ok(plan) => println!(
                    "  page {:>4}: {:.2} x {:.2} {:?} scale ({:.5}, {:.5}) offset ({}, {}) rotate {}",
                    index + 1,
                    page_box.width,
                    page_box.height,
                    plan.mode,
                    plan.content_scale.0,
                    plan.content_scale.1,
                    plan.translation.0,
                    plan.translation.1,
                    plan.final_rotation_degrees
                ),
                Err(e) => println!("  page {:>4}: {}", index + 1, e),
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::CliLogger::init(cli.verbose)?;

    match cli.command {
        Commands::Normalize {
            input,
            output,
            target,
            rotation,
            no_ignore_encryption,
            skip_degenerate_pages,
            jobs,
            data_uri,
        } => {
            let mut options = build_options(&target, rotation).await?;
            if no_ignore_encryption {
                options.ignore_encryption = false;
            }
            if skip_degenerate_pages {
                options.skip_degenerate_pages = true;
            }
            if let Some(jobs) = jobs {
                options.concurrency = jobs;
            }

            check_output_names(&input)?;
            let documents = read_inputs(&input, options.default_rotation).await?;
            run_normalize(documents, &options, &output, data_uri).await?;
        }

        Commands::Plan {
            input,
            target,
            rotation,
        } => {
            let options = build_options(&target, rotation).await?;
            run_plan(&input, &options).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_spec_plain() {
        let entry = parse_input_spec("scans/report.pdf").unwrap();
        assert_eq!(entry.path, PathBuf::from("scans/report.pdf"));
        assert!(entry.rotation.is_none());
        assert_eq!(entry.name(), "report.pdf");
    }

    #[test]
    fn test_parse_input_spec_with_rotation() {
        let entry = parse_input_spec("report.pdf@-90").unwrap();
        assert_eq!(entry.path, PathBuf::from("report.pdf"));
        assert_eq!(entry.rotation, Some(RotationRequest::CounterClockwise90));
    }

    #[test]
    fn test_parse_input_spec_at_in_path() {
        let entry = parse_input_spec("me@home/file.pdf").unwrap();
        assert_eq!(entry.path, PathBuf::from("me@home/file.pdf"));
        assert!(entry.rotation.is_none());
    }

    #[test]
    fn test_parse_input_spec_bad_rotation() {
        assert!(parse_input_spec("report.pdf@45").is_err());
    }

    #[test]
    fn test_cli_parses_negative_rotation() {
        let cli = Cli::try_parse_from([
            "pdfn",
            "normalize",
            "-i",
            "a.pdf",
            "-o",
            "out",
            "--rotation",
            "-90",
        ])
        .unwrap();
        match cli.command {
            Commands::Normalize { rotation, .. } => {
                assert_eq!(rotation, Some(RotationRequest::CounterClockwise90))
            }
            _ => panic!("Expected normalize"),
        }
    }

    #[test]
    fn test_duplicate_output_names_rejected() {
        let inputs = vec![
            parse_input_spec("a/report.pdf").unwrap(),
            parse_input_spec("b/report.pdf@180").unwrap(),
        ];
        let err = check_output_names(&inputs).unwrap_err().to_string();
        assert!(err.contains("a/report.pdf"));
        assert!(err.contains("b/report.pdf"));
    }

    #[test]
    fn test_distinct_output_names_accepted() {
        let inputs = vec![
            parse_input_spec("a/report.pdf").unwrap(),
            parse_input_spec("a/summary.pdf").unwrap(),
        ];
        assert!(check_output_names(&inputs).is_ok());
    }
}
