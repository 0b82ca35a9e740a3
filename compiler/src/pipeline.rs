// pipeline.rs — Pass orchestration and provenance
//
// Parses the source, then runs the minimal set of passes for the requested
// terminal pass: check → expand → standardize. Each pass reports its wall
// clock time at DEBUG level.
//
// Preconditions: none; any UTF-8 source is accepted.
// Postconditions: on success, `Output` holds the parsed input and, when the
//   expand pass ran, the flattened definitions with their origin map.
// Failure modes: syntax or check errors (`PipelineError::Rejected`) and
//   engine faults (`PipelineError::Expand`).
// Side effects: emits `tracing` events.

use std::time::{Duration, Instant};

use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::ast::TypeDef;
use crate::check::check;
use crate::config::Options;
use crate::diag::{has_errors, Diagnostic};
use crate::expand::{expand_with, ExpandError, OriginMap};
use crate::pass::{descriptor, required_passes, PassId};
use crate::predef;
use crate::printer::render_defs;
use crate::standardize::standardize;

// ── Provenance ─────────────────────────────────────────────────────────────

/// Provenance metadata for reproducible output and cache-key use.
///
/// `source_hash`: SHA-256 of the raw source text.
/// `compiler_version`: crate version from `Cargo.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub source_hash: [u8; 32],
    pub compiler_version: &'static str,
}

impl Provenance {
    /// Hex string of the source hash (64 characters).
    pub fn source_hash_hex(&self) -> String {
        bytes_to_hex(&self.source_hash)
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "source_hash": self.source_hash_hex(),
            "compiler_version": self.compiler_version,
        })
    }
}

fn bytes_to_hex(bytes: &[u8; 32]) -> String {
    let mut s = String::with_capacity(64);
    for b in bytes {
        use std::fmt::Write;
        let _ = write!(s, "{:02x}", b);
    }
    s
}

/// Compute provenance from source text.
pub fn compute_provenance(source: &str) -> Provenance {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    let mut source_hash = [0u8; 32];
    source_hash.copy_from_slice(&hasher.finalize());

    Provenance {
        source_hash,
        compiler_version: env!("CARGO_PKG_VERSION"),
    }
}

// ── Output and errors ──────────────────────────────────────────────────────

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct Output {
    /// Definitions as parsed, in source order.
    pub input: Vec<TypeDef>,
    /// Flattened definitions. Empty if the expand pass did not run.
    pub defs: Vec<TypeDef>,
    /// Synthesized name → originating generic.
    pub origins: OriginMap,
    /// Warnings from the check pass.
    pub diagnostics: Vec<Diagnostic>,
    pub provenance: Provenance,
}

impl Output {
    /// Flattened definitions in concrete syntax, one per line.
    pub fn render(&self) -> String {
        render_defs(&self.defs)
    }

    /// Definitions, origins, options and provenance as one JSON document.
    pub fn to_json(&self, options: &Options) -> serde_json::Value {
        json!({
            "definitions": self.defs,
            "origins": self.origins,
            "options": options,
            "provenance": self.provenance.to_json(),
        })
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source failed to parse or check. Carries every diagnostic,
    /// warnings included.
    #[error("source rejected with {} error(s)", .0.iter().filter(|d| d.is_error()).count())]
    Rejected(Vec<Diagnostic>),

    #[error(transparent)]
    Expand(#[from] ExpandError),
}

// ── Pipeline runner ────────────────────────────────────────────────────────

/// The last pass a full run executes under `options`.
pub fn terminal_pass(options: &Options) -> PassId {
    if options.debug {
        PassId::Expand
    } else {
        PassId::Standardize
    }
}

/// Parse, check, expand and (unless `options.debug`) standardize `source`.
pub fn run(source: &str, options: &Options) -> Result<Output, PipelineError> {
    run_to(source, options, terminal_pass(options))
}

/// Run the minimal set of passes to produce `terminal`.
pub fn run_to(source: &str, options: &Options, terminal: PassId) -> Result<Output, PipelineError> {
    let provenance = compute_provenance(source);

    let t = Instant::now();
    let parsed = crate::parser::parse(source);
    log_pass("parse", t.elapsed());

    let syntax: Vec<Diagnostic> = parsed.errors.into_iter().map(Diagnostic::from).collect();
    let items = match parsed.items {
        Some(items) if syntax.is_empty() => items,
        _ => return Err(PipelineError::Rejected(syntax)),
    };
    debug!("parsed {} definitions", items.len());

    let builtins = predef::builtins();
    let mut out = Output {
        input: items.iter().map(|item| item.def.clone()).collect(),
        defs: Vec::new(),
        origins: OriginMap::new(),
        diagnostics: Vec::new(),
        provenance,
    };

    for pass in required_passes(terminal) {
        let t = Instant::now();
        match pass {
            PassId::Check => {
                let diags = check(&items, &builtins);
                if has_errors(&diags) {
                    return Err(PipelineError::Rejected(diags));
                }
                out.diagnostics = diags;
            }
            PassId::Expand => {
                let expansion = expand_with(&builtins, &out.input, options.keep_poly)?;
                out.defs = expansion.defs;
                out.origins = expansion.origins;
            }
            PassId::Standardize => {
                let defs = std::mem::take(&mut out.defs);
                out.defs = standardize(
                    defs,
                    &mut out.origins,
                    &options.prefix,
                    builtins
                        .iter()
                        .map(|b| b.name)
                        .chain(out.input.iter().map(|d| d.name.as_str())),
                );
            }
        }
        log_pass(descriptor(pass).name, t.elapsed());
    }

    Ok(out)
}

fn log_pass(name: &str, elapsed: Duration) {
    debug!("{} complete, {:.1}ms", name, elapsed.as_secs_f64() * 1000.0);
}

// ── Tests ──────────────────────────────────────────────────────────────────
