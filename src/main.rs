use chrono::{DateTime, FixedOffset, Local};
use clap::{Parser, Subcommand};
use seo_press::{batch, config, output, render};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "seo-press")]
#[command(about = "Render Markdown articles as SEO-optimized HTML pages")]
#[command(long_about = "\
Render Markdown articles as SEO-optimized HTML pages

Each article becomes one self-contained page with a meta description,
keywords, Open Graph and Twitter Card tags, Schema.org JSON-LD, a table of
contents for [TOC] markers, and anchored headings.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── images/                      # Copied next to the rendered pages
  │   └── kafka-topology.svg
  ├── introducao-ao-kafka.md       # → introducao-ao-kafka.html
  ├── parte1-fundamentos.md        # → parte1-fundamentos.html
  └── README.md                    # Excluded by default

Metadata resolution (first available wins):
  Title:       [articles] override → first '# ' heading → file name
  Description: [articles] override → first prose line (160 chars)
  Keywords:    [articles] override → '## '/'### ' headings + file name words
  Author:      [articles] override → 'Author:' / 'By:' line → config author

Run 'seo-press gen-config' to generate a documented config.toml.")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Log progress (equivalent to RUST_LOG=info)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert one Markdown article to an HTML page
    Convert(ConvertArgs),
    /// Render every article of a content directory
    Build(BuildArgs),
    /// Remove generated pages from an output directory
    Clean {
        /// Output directory
        #[arg(long, default_value = "output")]
        output: PathBuf,
    },
    /// Print the metadata extracted from an article without rendering it
    Check {
        /// Markdown source file
        source: PathBuf,
        /// Print the metadata as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Markdown source file
    source: PathBuf,
    /// Output HTML file (defaults to the source path with .html)
    dest: Option<PathBuf>,
    /// Default author when the article names none
    #[arg(long)]
    author: Option<String>,
    /// Canonical base URL, e.g. https://example.dev
    #[arg(long = "url")]
    base_url: Option<String>,
    /// Language tag, e.g. pt-BR
    #[arg(long = "lang")]
    language: Option<String>,
    /// Config file (defaults to config.toml next to the source)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Content directory
    #[arg(long, default_value = "content")]
    source: PathBuf,
    /// Output directory
    #[arg(long, default_value = "output")]
    output: PathBuf,
    /// Remove previously generated pages first
    #[arg(long)]
    clean: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command ran but some articles failed.
fn run(command: Command) -> Result<bool, Box<dyn std::error::Error>> {
    match command {
        Command::Convert(args) => {
            let options = convert_options(&args)?;
            let outcome =
                render::render_article(&args.source, args.dest.as_deref(), &options, now())?;
            output::print_convert_output(&outcome);
        }
        Command::Build(args) => {
            let site_config = config::load_config(&args.source)?;
            init_thread_pool(&site_config.processing);
            if args.clean {
                let removed = batch::clean_output(&args.output)?;
                output::print_clean_output(removed, &args.output);
            }
            println!("==> Building {} → {}", args.source.display(), args.output.display());
            let report = batch::build(&args.source, &args.output, &site_config, now())?;
            output::print_build_output(&report, &args.output);
            return Ok(report.is_success());
        }
        Command::Clean { output: dir } => {
            let removed = batch::clean_output(&dir)?;
            output::print_clean_output(removed, &dir);
        }
        Command::Check { source, json } => {
            let site_config = config::load_config(source_dir(&source))?;
            let options = site_config.options_for(&file_name(&source));
            let meta = render::inspect_article(&source, &options, now())?;
            if json {
                output::print_metadata_json(&meta)?;
            } else {
                output::print_metadata(&meta);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(true)
}

/// Resolve options for `convert`: stock defaults, then the config file, then
/// command-line flags over the site values. The article's own
/// `[articles]` entry is applied last and wins over the flags.
fn convert_options(args: &ConvertArgs) -> Result<config::RenderOptions, config::ConfigError> {
    let file_layer = match &args.config {
        Some(path) => match config::load_raw_config_file(path)? {
            Some(value) => Some(value),
            None => {
                return Err(config::ConfigError::Validation(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
        },
        None => config::load_raw_config(source_dir(&args.source))?,
    };
    let flags = config::cli_overlay(
        args.author.as_deref(),
        args.base_url.as_deref(),
        args.language.as_deref(),
    );
    let site_config = config::resolve_config(config::stock_defaults_value(), [file_layer, flags])?;
    Ok(site_config.options_for(&file_name(&args.source)))
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

fn source_dir(source: &Path) -> &Path {
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn file_name(source: &Path) -> String {
    source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
