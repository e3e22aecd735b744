//! tilegrid CLI: classify a screenshot into a solver-ready tile matrix.

use std::io;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tilegrid::classify::{write_matrix, write_matrix_file, ClassifyConfig, TemplateSource};
use tilegrid::load::classify_screenshot;
use tilegrid::GridSpec;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "tilegrid")]
#[command(about = "Classify a tile-puzzle screenshot into a matrix of tile codes")]
#[command(version)]
struct Cli {
    /// Screenshot to classify (overrides `image_path` from --config).
    image: Option<PathBuf>,

    /// Directory holding tile{i}.png templates.
    #[arg(long, conflicts_with = "manifest")]
    templates: Option<PathBuf>,

    /// Number of tile{i}.png indices to probe in --templates.
    #[arg(long, default_value_t = 35, requires = "templates")]
    template_count: u32,

    /// Precomputed template manifest.
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Grid rows.
    #[arg(long)]
    rows: Option<usize>,

    /// Grid columns.
    #[arg(long)]
    cols: Option<usize>,

    /// JSON run configuration (pipeline parameters, paths).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the matrix here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Append to --output after a blank line instead of overwriting.
    #[arg(long, requires = "output")]
    append: bool,

    /// Write a JSON report with per-cell provenance.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Classify cells on the current thread only.
    #[arg(long)]
    sequential: bool,

    /// More logging; repeat for debug (-vv) and trace (-vvv).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Emit tracing events as JSON lines.
    #[cfg(feature = "tracing")]
    #[arg(long)]
    log_json: bool,
}

fn init_logging(cli: &Cli) {
    let level = tilegrid::core::verbosity_level(cli.verbose, cli.quiet);
    #[cfg(feature = "tracing")]
    {
        use tilegrid::core::TracingFormat;
        let _ = tracing_log::LogTracer::init();
        let format = if cli.log_json {
            TracingFormat::Json
        } else {
            TracingFormat::Uptime
        };
        tilegrid::core::init_tracing(level, format);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = tilegrid::core::init_with_level(level);
    }
}

/// Merge the optional JSON config with command-line overrides.
fn resolve_config(cli: &Cli) -> CliResult<ClassifyConfig> {
    let mut cfg = match &cli.config {
        Some(path) => ClassifyConfig::load_json(path)
            .map_err(|e| -> CliError { format!("config {}: {e}", path.display()).into() })?,
        None => {
            let image = cli
                .image
                .as_ref()
                .ok_or("an IMAGE argument or --config is required")?;
            ClassifyConfig::new(image.to_string_lossy(), TemplateSource::default())
        }
    };

    if let Some(image) = &cli.image {
        cfg.image_path = image.to_string_lossy().into_owned();
    }
    if let Some(dir) = &cli.templates {
        cfg.templates = TemplateSource::Directory {
            dir: dir.to_string_lossy().into_owned(),
            count: cli.template_count,
        };
    }
    if let Some(manifest) = &cli.manifest {
        cfg.templates = TemplateSource::Manifest {
            path: manifest.to_string_lossy().into_owned(),
        };
    }
    if cli.rows.is_some() || cli.cols.is_some() {
        let rows = cli.rows.unwrap_or(cfg.params.grid.rows);
        let cols = cli.cols.unwrap_or(cfg.params.grid.cols);
        cfg.params.grid = GridSpec::new(rows, cols)?;
    }
    if let Some(output) = &cli.output {
        cfg.output_path = Some(output.to_string_lossy().into_owned());
    }
    if cli.append {
        cfg.append = true;
    }
    if let Some(report) = &cli.report {
        cfg.report_path = Some(report.to_string_lossy().into_owned());
    }
    if cli.sequential {
        cfg.params.parallel = false;
    }
    Ok(cfg)
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let cfg = resolve_config(&cli)?;
    log::info!("classifying {}", cfg.image_path);

    let run = classify_screenshot(&cfg.image_path, &cfg.templates, cfg.params.clone())?;
    let matrix = &run.result.matrix;

    match cfg.output_path() {
        Some(path) => {
            write_matrix_file(&path, matrix, cfg.append)?;
            log::info!("matrix written to {}", path.display());
        }
        None => write_matrix(io::stdout().lock(), matrix)?,
    }
    if let Some(path) = cfg.report_path() {
        run.report(cfg.image_path.clone()).write_json(&path)?;
        log::info!("report written to {}", path.display());
    }
    Ok(())
}
