use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;

use tdmono::config::Options;
use tdmono::pass::PassId;
use tdmono::pipeline::{self, Output, PipelineError};
use tdmono::printer::render_defs;

#[derive(Debug, Clone, clap::ValueEnum)]
enum EmitStage {
    /// Flattened definitions, one per line
    Defs,
    /// Parsed input re-rendered, no expansion
    Ast,
    /// Definitions, origins, options and provenance
    Json,
    /// Provenance only
    BuildInfo,
}

#[derive(Parser, Debug)]
#[command(
    name = "tdmono",
    version,
    about = "Monomorphizes parametrized type definitions into flat, parameterless ones"
)]
struct Cli {
    /// Input type definition file
    source: PathBuf,

    /// Output file path (stdout when absent)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output stage
    #[arg(long, value_enum, default_value_t = EmitStage::Defs)]
    emit: EmitStage,

    /// Keep parametrized definitions in the output
    #[arg(long)]
    keep_poly: bool,

    /// Prefix for names given to synthesized definitions
    #[arg(long, default_value = "_")]
    prefix: String,

    /// Leave canonical `@(...)` names in place
    #[arg(long)]
    debug: bool,

    /// Print pass timing and expansion events
    #[arg(long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

    let filter = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .compact()
        .with_filter(filter);

    Registry::default().with(layer).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = Options {
        keep_poly: cli.keep_poly,
        prefix: cli.prefix.clone(),
        debug: cli.debug,
    };
    tracing::debug!("source = {}", cli.source.display());
    tracing::debug!("emit   = {:?}", cli.emit);

    // ── Read source ──
    let source = match std::fs::read_to_string(&cli.source) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("tdmono: error: {}: {}", cli.source.display(), e);
            process::exit(2);
        }
    };
    let path = cli.source.display().to_string();

    let text = match cli.emit {
        EmitStage::BuildInfo => {
            let provenance = pipeline::compute_provenance(&source);
            to_json_text(&provenance.to_json())
        }
        EmitStage::Ast => {
            let out = run_or_exit(&path, &source, &options, PassId::Check);
            render_defs(&out.input)
        }
        EmitStage::Defs => {
            let out = run_or_exit(&path, &source, &options, pipeline::terminal_pass(&options));
            out.render()
        }
        EmitStage::Json => {
            let out = run_or_exit(&path, &source, &options, pipeline::terminal_pass(&options));
            to_json_text(&out.to_json(&options))
        }
    };

    // ── Write result ──
    match &cli.output {
        Some(out_path) => write_or_exit(out_path, &text),
        None => print!("{}", text),
    }
}

/// Run the pipeline, printing diagnostics; exits 1 if the source is rejected
/// or expansion faults.
fn run_or_exit(path: &str, source: &str, options: &Options, terminal: PassId) -> Output {
    match pipeline::run_to(source, options, terminal) {
        Ok(out) => {
            for diag in &out.diagnostics {
                eprintln!("{}", diag.render(path, source));
            }
            out
        }
        Err(PipelineError::Rejected(diags)) => {
            for diag in &diags {
                eprintln!("{}", diag.render(path, source));
            }
            eprintln!("tdmono: {}", PipelineError::Rejected(diags));
            process::exit(1);
        }
        Err(e) => {
            eprintln!("tdmono: error: {}", e);
            process::exit(1);
        }
    }
}

fn to_json_text(value: &serde_json::Value) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(mut text) => {
            text.push('\n');
            text
        }
        Err(e) => {
            eprintln!("tdmono: error: cannot serialize output: {}", e);
            process::exit(2);
        }
    }
}

fn write_or_exit(path: &Path, text: &str) {
    if let Err(e) = std::fs::write(path, text) {
        eprintln!("tdmono: error: {}: {}", path.display(), e);
        process::exit(2);
    }
}
