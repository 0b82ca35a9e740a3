// expand.rs — Monomorphization engine
//
// Specializes every generic definition for each concrete way it is
// instantiated, sharing identical instantiations through their canonical
// name. Runs in three passes over a fresh definition table:
//
//   1. seed    — built-ins, then user definitions, with their original body
//   2. drive   — substitute through each parameterless definition (or every
//                definition with `keep_poly`), synthesizing specializations
//   3. collect — drain filled entries in creation order
//
// Preconditions: input definitions are well-formed (no unbound variables,
//   no duplicate names).
// Postconditions: without `keep_poly`, every output definition has arity 0.
//   Output order is creation order, not dependency order.
// Failure modes: internal-consistency faults (`ExpandError`) abort the call.
// Side effects: none outside the call-owned table and origin map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::algebra::{substitute, substitute_containers, Env, Instantiate};
use crate::ast::{Annots, TypeDef, TypeExpr};
use crate::naming::{canonical_instance, Instance};
use crate::predef::{self, Predef};
use crate::table::DefTable;

// ── Errors ──────────────────────────────────────────────────────────────────

/// Internal-consistency violations. Any of these aborts expansion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpandError {
    #[error("generic type `{name}` has no definition to specialize")]
    MissingDefinition { name: String },

    #[error("abstract type `{name}` cannot be resolved: `{}` is not a known type", predef::ABSTRACT)]
    UnresolvedAbstract { name: String },

    #[error("type `{name}` expects {expected} argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

// ── Output ──────────────────────────────────────────────────────────────────

/// Where a synthesized definition came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    /// Name of the generic definition that was specialized.
    pub generic: String,
    /// Parameter count of that generic as declared.
    pub arity: usize,
}

/// Synthesized name → origin.
pub type OriginMap = BTreeMap<String, Origin>;

/// Flattened definitions plus the origin of every specialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub defs: Vec<TypeDef>,
    pub origins: OriginMap,
}

// ── Entry points ────────────────────────────────────────────────────────────

/// Expand `defs` against the standard built-in catalogue.
pub fn expand(defs: &[TypeDef], keep_poly: bool) -> Result<Expansion, ExpandError> {
    expand_with(&predef::builtins(), defs, keep_poly)
}

/// Expand `defs` against an explicit built-in catalogue.
pub fn expand_with(
    builtins: &[Predef],
    defs: &[TypeDef],
    keep_poly: bool,
) -> Result<Expansion, ExpandError> {
    let mut engine = Expander {
        table: DefTable::new(),
        origins: OriginMap::new(),
    };

    engine.seed(builtins, defs);
    engine.drive(defs, keep_poly)?;

    let specializations = engine.origins.len();
    let defs = engine.table.drain(keep_poly);
    debug!(
        "expand: {} definitions out, {} specializations",
        defs.len(),
        specializations
    );

    Ok(Expansion {
        defs,
        origins: engine.origins,
    })
}

// ── Engine ──────────────────────────────────────────────────────────────────

struct Expander {
    table: DefTable,
    origins: OriginMap,
}

impl Expander {
    /// Pass 1.
    fn seed(&mut self, builtins: &[Predef], defs: &[TypeDef]) {
        for b in builtins {
            self.table.seed(b.name, b.arity, b.def.clone());
        }
        for def in defs {
            let original = TypeDef {
                body: def.body.clone().normalize(),
                ..def.clone()
            };
            self.table.seed(&def.name, def.arity(), Some(original));
        }
        debug!(
            "expand: seeded {} built-ins, {} definitions",
            builtins.len(),
            defs.len()
        );
    }

    /// Pass 2.
    fn drive(&mut self, defs: &[TypeDef], keep_poly: bool) -> Result<(), ExpandError> {
        for def in defs {
            if !def.params.is_empty() && !keep_poly {
                continue;
            }
            let missing = || ExpandError::MissingDefinition {
                name: def.name.clone(),
            };
            let id = self.table.lookup(&def.name).ok_or_else(missing)?;
            let original = self.table.get(id).original.clone().ok_or_else(missing)?;

            let body = substitute(&Env::new(), &original.body, self)?;
            self.table.fill(id, TypeDef { body, ..original });
        }
        Ok(())
    }

    /// Synthesize the specialization `inst` of `generic`.
    fn specialize(
        &mut self,
        generic: &str,
        inst: &Instance,
        annots: &Annots,
    ) -> Result<(), ExpandError> {
        let (generic_arity, original) = match self.table.entry(generic) {
            Some(entry) => (entry.arity, entry.original.clone()),
            None => {
                return Err(ExpandError::MissingDefinition {
                    name: generic.to_string(),
                })
            }
        };

        let id = self.table.reserve(&inst.name, inst.arity());
        self.origins.insert(
            inst.name.clone(),
            Origin {
                generic: generic.to_string(),
                arity: generic_arity,
            },
        );
        debug!("expand: specializing {} (from {})", inst.name, generic);

        let original = original.ok_or_else(|| ExpandError::MissingDefinition {
            name: generic.to_string(),
        })?;
        if original.arity() != inst.args.len() {
            return Err(ExpandError::ArityMismatch {
                name: generic.to_string(),
                expected: original.arity(),
                found: inst.args.len(),
            });
        }

        let body = if predef::is_abstract(&original.body) {
            if !self.table.contains(predef::ABSTRACT) {
                return Err(ExpandError::UnresolvedAbstract {
                    name: generic.to_string(),
                });
            }
            debug!("expand: {} is abstract, kept as an application", generic);
            TypeExpr::named(generic, inst.args.clone())
        } else {
            let env: Env = original
                .params
                .iter()
                .cloned()
                .zip(inst.args.iter().cloned())
                .collect();
            let full = substitute(&env, &original.body, self)?;
            // Only the root is checked; deeper self-references are kept.
            if full.is_named(&inst.name) {
                debug!(
                    "expand: {} refers to itself at the root, substituting containers only",
                    inst.name
                );
                substitute_containers(&env, &original.body)
            } else {
                full
            }
        };

        self.table.fill(
            id,
            TypeDef {
                name: inst.name.clone(),
                params: inst.params(),
                annots: original.annots.clone(),
                body: body.with_annots(annots),
            },
        );
        Ok(())
    }
}

impl Instantiate for Expander {
    type Error = ExpandError;

    fn instantiate(
        &mut self,
        name: &str,
        args: Vec<TypeExpr>,
        annots: &Annots,
    ) -> Result<TypeExpr, ExpandError> {
        let inst = canonical_instance(name, &args, annots);
        match self.table.entry(&inst.name) {
            Some(entry) if !entry.is_filled() => {
                trace!("expand: {} is being specialized, breaking cycle", inst.name);
            }
            Some(_) => {}
            None => self.specialize(name, &inst, annots)?,
        }
        Ok(inst.reference(annots))
    }
}
