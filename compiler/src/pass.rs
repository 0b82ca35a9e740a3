// pass.rs — Pass descriptor module: metadata and dependency resolution
//
// Declares the semantic passes run after parsing and their dependency
// edges. Used by the pipeline runner to compute the minimal pass subset for
// each emit target (`ast` stops after checking, `--debug` stops before
// standardization).

use std::collections::HashSet;

// ── Pass identifiers ───────────────────────────────────────────────────────

/// Identifies each pass (parse excluded — handled before the runner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassId {
    Check,
    Expand,
    Standardize,
}

// ── Pass descriptor ────────────────────────────────────────────────────────

/// Static metadata about a pass.
pub struct PassDescriptor {
    /// Human-readable name for log output.
    pub name: &'static str,
    /// Passes whose outputs this pass consumes.
    pub inputs: &'static [PassId],
    /// Pre/post conditions (documentation only).
    pub invariants: &'static str,
}

/// Return the static descriptor for a given pass.
pub fn descriptor(id: PassId) -> PassDescriptor {
    match id {
        PassId::Check => PassDescriptor {
            name: "check",
            inputs: &[],
            invariants: "names unique, variables bound, applications well-arity",
        },
        PassId::Expand => PassDescriptor {
            name: "expand",
            inputs: &[PassId::Check],
            invariants: "output arity 0 unless keep_poly, origins recorded",
        },
        PassId::Standardize => PassDescriptor {
            name: "standardize",
            inputs: &[PassId::Expand],
            invariants: "no canonical @(...) names remain",
        },
    }
}

// ── Dependency resolution ──────────────────────────────────────────────────

/// All pass IDs in declaration order.
pub const ALL_PASSES: [PassId; 3] = [PassId::Check, PassId::Expand, PassId::Standardize];

/// Compute the minimal ordered set of passes needed to produce `terminal`.
/// Returns passes in topological (execution) order.
pub fn required_passes(terminal: PassId) -> Vec<PassId> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    visit(terminal, &mut visited, &mut order);
    order
}

fn visit(id: PassId, visited: &mut HashSet<PassId>, order: &mut Vec<PassId>) {
    if !visited.insert(id) {
        return;
    }
    for &dep in descriptor(id).inputs {
        visit(dep, visited, order);
    }
    order.push(id);
}

// ── Tests ──────────────────────────────────────────────────────────────────
