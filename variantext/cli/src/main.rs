use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use variantext::content::plain_text;
use variantext::{
    ComparisonTable, SelectionEvent, VariantConfig, VariantLabel, VariantProcessor,
};

#[derive(Parser, Debug)]
#[command(
    name = "vtx",
    version,
    about = "Inspect and filter variant-annotated HTML"
)]
struct Cli {
    /// YAML configuration file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// CSS selector of the content region (overrides the config file)
    #[arg(long, value_name = "SELECTOR", global = true)]
    root: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase verbosity (-v INFO, -vv DEBUG, -vvv TRACE, -vvvv TRACE with file/line)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Input shared by every subcommand
#[derive(clap::Args, Debug, Clone)]
struct InputArgs {
    /// Input HTML file (reads from stdin if not provided, use "-" for explicit stdin)
    input: Option<PathBuf>,
}

/// Input plus the selection to apply
#[derive(clap::Args, Debug, Clone)]
struct SelectArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Select a variant; repeat to replay several selections in order
    #[arg(long, value_name = "LABEL", value_parser = parse_label)]
    select: Vec<VariantLabel>,

    /// Clear the selection after any --select
    #[arg(long)]
    all: bool,
}

/// Arguments for the table command
#[derive(clap::Args, Debug, Clone)]
struct TableArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output the table as HTML
    #[arg(long)]
    html: bool,

    /// Maximum table width in columns
    #[arg(long)]
    width: Option<u16>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// List the variant labels found in the region
    Labels(InputArgs),
    /// List segments with their labels and visibility
    Segments(SelectArgs),
    /// Render the region with styles and controls for a selection
    Render(SelectArgs),
    /// Show all variants side by side
    Table(TableArgs),
}

/// Parses a `--select` value into a label.
fn parse_label(s: &str) -> Result<VariantLabel, String> {
    VariantLabel::try_from(s.to_string()).map_err(|e| e.to_string())
}

/// Initialize tracing subscriber based on verbosity level.
///
/// Verbosity levels:
/// - 0 (default): no subscriber
/// - 1 (-v): INFO (pipeline summaries)
/// - 2 (-vv): DEBUG (per-block decisions, selection changes)
/// - 3+ (-vvv): TRACE
/// - 4+ (-vvvv): TRACE with file/line numbers
fn init_tracing(verbose: u8) {
    if verbose == 0 {
        return;
    }

    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            1 => "warn,vtx=info,variantext=info".to_string(),
            2 => "warn,vtx=debug,variantext=debug".to_string(),
            _ => "debug,vtx=trace,variantext=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(verbose >= 4)
                .with_line_number(verbose >= 4)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.root.as_deref())?;

    debug!(command = ?cli.command, json = cli.json, "Dispatching command");
    match &cli.command {
        Command::Labels(args) => {
            let processor = processed(config, args)?;
            let labels: Vec<&str> = processor
                .segmentation()
                .labels()
                .iter()
                .map(|label| label.as_str())
                .collect();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&labels)?);
            } else {
                for label in labels {
                    println!("{label}");
                }
            }
        }
        Command::Segments(args) => {
            let mut processor = processed(config, &args.input)?;
            apply_selection(&mut processor, args);
            print_segments(&processor, cli.json)?;
        }
        Command::Render(args) => {
            let mut processor = processed(config, &args.input)?;
            apply_selection(&mut processor, args);
            let page = processor
                .render_page()
                .ok_or_else(|| eyre!("Nothing to render"))?;
            println!("{page}");
        }
        Command::Table(args) => {
            let processor = processed(config, &args.input)?;
            let table = ComparisonTable::new(processor.segmentation());
            if args.html {
                println!("{}", table.to_html());
            } else {
                println!("{}", table.to_terminal(args.width));
            }
        }
    }

    Ok(())
}

/// Loads the configuration file, if any, and applies command line overrides.
fn load_config(path: Option<&Path>, root: Option<&str>) -> Result<VariantConfig> {
    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading config");
            VariantConfig::load(path)
                .wrap_err_with(|| format!("Failed to load config {:?}", path))?
        }
        None => {
            debug!("Using default config");
            VariantConfig::default()
        }
    };
    if let Some(root) = root {
        debug!(root, "Root selector overridden");
        config.root = root.to_string();
    }
    Ok(config)
}

/// Reads the input and processes it, failing if the page has no region.
fn processed(config: VariantConfig, args: &InputArgs) -> Result<VariantProcessor> {
    let html = load_html(args.input.as_ref())?;
    let mut processor = VariantProcessor::new(config, ()).wrap_err("Invalid configuration")?;
    let found = processor.process(&html).wrap_err("Failed to process input")?;
    if !found {
        return Err(eyre!(
            "No element matches the root selector `{}`",
            processor.config().root
        ));
    }
    info!(
        labels = processor.segmentation().labels().len(),
        segments = processor.segmentation().len(),
        "Processed input"
    );
    Ok(processor)
}

fn apply_selection(processor: &mut VariantProcessor, args: &SelectArgs) {
    for label in &args.select {
        debug!(label = %label, "Applying selection");
        processor.apply(SelectionEvent::Variant(label.clone()));
    }
    if args.all {
        debug!("Clearing selection");
        processor.select_all();
    }
}

fn print_segments(processor: &VariantProcessor, as_json: bool) -> Result<()> {
    let segmentation = processor.segmentation();
    let visibility = processor.visibility();

    if as_json {
        let segments: Vec<_> = segmentation
            .segments()
            .iter()
            .map(|segment| {
                json!({
                    "segment": segment,
                    "visible": visibility.is_visible(segment.id),
                })
            })
            .collect();
        let output = json!({
            "labels": segmentation.labels().labels(),
            "selection": processor.state(),
            "segments": segments,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for segment in segmentation.segments() {
        let label = if segment.is_common() {
            "(common)"
        } else {
            segment.label.as_str()
        };
        let next = segment.next_label.as_ref().map_or("-", |next| {
            if next.is_common() { "(common)" } else { next.as_str() }
        });
        let marker = if segment.exclusive { "=" } else { "" };
        let state = if visibility.is_visible(segment.id) {
            "visible"
        } else {
            "hidden"
        };
        println!(
            "{:>3}  {:<10} {:<10} {:<7}  {}",
            segment.id.0,
            format!("{label}{marker}"),
            next,
            state,
            plain_text(&segment.content)
        );
    }
    Ok(())
}

/// Loads HTML from a path, `-` for stdin, or piped stdin when no path is given.
fn load_html(path: Option<&PathBuf>) -> Result<String> {
    if let Some(p) = path {
        if p.to_str() == Some("-") {
            debug!("Reading input from stdin");
            read_from_stdin()
        } else {
            debug!(path = %p.display(), "Reading input file");
            std::fs::read_to_string(p).wrap_err_with(|| format!("Failed to read file: {:?}", p))
        }
    } else if io::stdin().is_terminal() {
        Err(eyre!("No input file provided. Use `vtx --help` for usage."))
    } else {
        debug!("Reading input from stdin");
        read_from_stdin()
    }
}

fn read_from_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .wrap_err("Failed to read from stdin")?;
    Ok(buffer)
}
