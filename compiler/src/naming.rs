// naming.rs — Canonical identities for generic instantiations
//
// An instantiation `(args) name <annots>` is alpha-normalized (free variables
// renamed to 'a, 'b, ... in order of first occurrence), rendered through the
// printer, and wrapped in `@( ... )`. `@` cannot appear in a user identifier,
// so canonical names never collide with declared ones. Two use sites that
// render to the same identity denote the same specialization.

use crate::algebra::rename_vars;
use crate::ast::{Annots, TypeExpr};
use crate::printer::signature;

const MARKER_OPEN: &str = "@(";
const MARKER_CLOSE: &str = ")";

/// The `n`th canonical variable name: a..z, a1..z1, a2..z2, ...
pub fn canonical_var(n: usize) -> String {
    let letter = (b'a' + (n % 26) as u8) as char;
    match n / 26 {
        0 => letter.to_string(),
        cycle => format!("{}{}", letter, cycle),
    }
}

/// True for names produced by `canonical_instance`.
pub fn is_synthetic(name: &str) -> bool {
    name.starts_with(MARKER_OPEN)
}

/// A normalized instantiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Canonical identity, `@(...)`.
    pub name: String,
    /// Arguments with free variables renamed into canonical form.
    pub args: Vec<TypeExpr>,
    /// `(use-site variable, canonical variable)` in first-occurrence order.
    pub vars: Vec<(String, String)>,
}

impl Instance {
    /// Parameters of the specialization: the canonical free variables.
    pub fn params(&self) -> Vec<String> {
        self.vars.iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn arity(&self) -> usize {
        self.vars.len()
    }

    /// The node that replaces the instantiation at its use site: the
    /// specialization applied to the use site's own free variables.
    pub fn reference(&self, annots: &Annots) -> TypeExpr {
        TypeExpr::Named {
            name: self.name.clone(),
            args: self.vars.iter().map(|(v, _)| TypeExpr::var(v.as_str())).collect(),
            annots: annots.clone(),
        }
    }
}

/// Compute the canonical identity of `(args) generic <annots>`.
pub fn canonical_instance(generic: &str, args: &[TypeExpr], annots: &Annots) -> Instance {
    let mut vars: Vec<(String, String)> = Vec::new();
    let args: Vec<TypeExpr> = args
        .iter()
        .map(|arg| {
            rename_vars(arg, &mut |v: &str| {
                if let Some((_, canonical)) = vars.iter().find(|(orig, _)| orig == v) {
                    return canonical.clone();
                }
                let canonical = canonical_var(vars.len());
                vars.push((v.to_string(), canonical.clone()));
                canonical
            })
        })
        .collect();

    let name = format!(
        "{}{}{}",
        MARKER_OPEN,
        signature(generic, &args, annots),
        MARKER_CLOSE
    );
    Instance { name, args, vars }
}
