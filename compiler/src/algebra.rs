// algebra.rs — Structural traversals over type expressions
//
// Variable renaming, environment substitution (with on-demand
// specialization delegated through `Instantiate`), the container-only
// substitution used to break direct self-reference, and type-name renaming.
//
// Preconditions: expressions are normalized (containers use one encoding).
// Postconditions: traversals are total over every node kind.
// Failure modes: substitution propagates errors from the `Instantiate` impl.
// Side effects: none here; `Instantiate` implementors may mutate their table.

use std::collections::HashMap;

use crate::ast::{Annots, FieldItem, TypeExpr, Variant};

/// Variable name → replacement expression.
pub type Env = HashMap<String, TypeExpr>;

/// Hook invoked by `substitute` for each application that has at least one
/// concrete argument. Returns the expression that replaces the application.
pub trait Instantiate {
    type Error;

    fn instantiate(
        &mut self,
        name: &str,
        args: Vec<TypeExpr>,
        annots: &Annots,
    ) -> Result<TypeExpr, Self::Error>;
}

/// True if every argument is a bare type variable (vacuously true for `[]`).
///
/// Such an application is an alpha-rename of the generic itself, not a new
/// specialization.
pub fn all_vars(args: &[TypeExpr]) -> bool {
    args.iter().all(|a| a.as_var().is_some())
}

// ── Rename ──────────────────────────────────────────────────────────────────

/// Replace every variable name via `f`. `f` is called once per occurrence,
/// left to right.
pub fn rename_vars<F: FnMut(&str) -> String>(expr: &TypeExpr, f: &mut F) -> TypeExpr {
    match expr {
        TypeExpr::Sum { variants, annots } => TypeExpr::Sum {
            variants: variants
                .iter()
                .map(|v| Variant {
                    tag: v.tag.clone(),
                    payload: v.payload.as_ref().map(|p| rename_vars(p, f)),
                })
                .collect(),
            annots: annots.clone(),
        },
        TypeExpr::Record { fields, annots } => TypeExpr::Record {
            fields: fields
                .iter()
                .map(|item| match item {
                    FieldItem::Field { label, ty } => FieldItem::Field {
                        label: label.clone(),
                        ty: rename_vars(ty, f),
                    },
                    FieldItem::Inherit { ty } => FieldItem::Inherit {
                        ty: rename_vars(ty, f),
                    },
                })
                .collect(),
            annots: annots.clone(),
        },
        TypeExpr::Tuple { items, annots } => TypeExpr::Tuple {
            items: items.iter().map(|t| rename_vars(t, f)).collect(),
            annots: annots.clone(),
        },
        TypeExpr::Container {
            container,
            elem,
            annots,
        } => TypeExpr::Container {
            container: *container,
            elem: Box::new(rename_vars(elem, f)),
            annots: annots.clone(),
        },
        TypeExpr::Var { name, annots } => TypeExpr::Var {
            name: f(name),
            annots: annots.clone(),
        },
        TypeExpr::Named { name, args, annots } => TypeExpr::Named {
            name: name.clone(),
            args: args.iter().map(|t| rename_vars(t, f)).collect(),
            annots: annots.clone(),
        },
    }
}

// ── Substitute ──────────────────────────────────────────────────────────────

/// Replace variables bound in `env` and specialize every application with a
/// concrete argument through `inst`.
///
/// Variables absent from `env` are left alone: they are free above the
/// current scope. Applications whose arguments are all bare variables are
/// rebuilt as-is and never reach `inst`.
pub fn substitute<I: Instantiate>(
    env: &Env,
    expr: &TypeExpr,
    inst: &mut I,
) -> Result<TypeExpr, I::Error> {
    let out = match expr {
        TypeExpr::Sum { variants, annots } => {
            let mut out = Vec::with_capacity(variants.len());
            for v in variants {
                let payload = match &v.payload {
                    Some(p) => Some(substitute(env, p, inst)?),
                    None => None,
                };
                out.push(Variant {
                    tag: v.tag.clone(),
                    payload,
                });
            }
            TypeExpr::Sum {
                variants: out,
                annots: annots.clone(),
            }
        }
        TypeExpr::Record { fields, annots } => {
            let mut out = Vec::with_capacity(fields.len());
            for item in fields {
                out.push(match item {
                    FieldItem::Field { label, ty } => FieldItem::Field {
                        label: label.clone(),
                        ty: substitute(env, ty, inst)?,
                    },
                    FieldItem::Inherit { ty } => FieldItem::Inherit {
                        ty: substitute(env, ty, inst)?,
                    },
                });
            }
            TypeExpr::Record {
                fields: out,
                annots: annots.clone(),
            }
        }
        TypeExpr::Tuple { items, annots } => TypeExpr::Tuple {
            items: substitute_all(env, items, inst)?,
            annots: annots.clone(),
        },
        TypeExpr::Container {
            container,
            elem,
            annots,
        } => {
            let elem = substitute(env, elem, inst)?;
            if elem.as_var().is_some() {
                TypeExpr::Container {
                    container: *container,
                    elem: Box::new(elem),
                    annots: annots.clone(),
                }
            } else {
                inst.instantiate(container.name(), vec![elem], annots)?
            }
        }
        TypeExpr::Var { name, annots } => match env.get(name) {
            Some(replacement) => replacement.clone().with_annots(annots),
            None => expr.clone(),
        },
        TypeExpr::Named { name, args, annots } => {
            let args = substitute_all(env, args, inst)?;
            if all_vars(&args) {
                TypeExpr::Named {
                    name: name.clone(),
                    args,
                    annots: annots.clone(),
                }
            } else {
                inst.instantiate(name, args, annots)?
            }
        }
    };
    Ok(out)
}

fn substitute_all<I: Instantiate>(
    env: &Env,
    items: &[TypeExpr],
    inst: &mut I,
) -> Result<Vec<TypeExpr>, I::Error> {
    items.iter().map(|t| substitute(env, t, inst)).collect()
}

/// Substitution that replaces variables everywhere but never specializes:
/// containers and applications are rebuilt around their substituted
/// elements.
pub fn substitute_containers(env: &Env, expr: &TypeExpr) -> TypeExpr {
    match expr {
        TypeExpr::Sum { variants, annots } => TypeExpr::Sum {
            variants: variants
                .iter()
                .map(|v| Variant {
                    tag: v.tag.clone(),
                    payload: v.payload.as_ref().map(|p| substitute_containers(env, p)),
                })
                .collect(),
            annots: annots.clone(),
        },
        TypeExpr::Record { fields, annots } => TypeExpr::Record {
            fields: fields
                .iter()
                .map(|item| match item {
                    FieldItem::Field { label, ty } => FieldItem::Field {
                        label: label.clone(),
                        ty: substitute_containers(env, ty),
                    },
                    FieldItem::Inherit { ty } => FieldItem::Inherit {
                        ty: substitute_containers(env, ty),
                    },
                })
                .collect(),
            annots: annots.clone(),
        },
        TypeExpr::Tuple { items, annots } => TypeExpr::Tuple {
            items: items.iter().map(|t| substitute_containers(env, t)).collect(),
            annots: annots.clone(),
        },
        TypeExpr::Container {
            container,
            elem,
            annots,
        } => TypeExpr::Container {
            container: *container,
            elem: Box::new(substitute_containers(env, elem)),
            annots: annots.clone(),
        },
        TypeExpr::Var { name, annots } => match env.get(name) {
            Some(replacement) => replacement.clone().with_annots(annots),
            None => expr.clone(),
        },
        TypeExpr::Named { name, args, annots } => TypeExpr::Named {
            name: name.clone(),
            args: args.iter().map(|t| substitute_containers(env, t)).collect(),
            annots: annots.clone(),
        },
    }
}

// ── Type-name rename ────────────────────────────────────────────────────────

/// Rewrite the head of every named application via `f`.
pub fn rename_types<F: FnMut(&str) -> String>(expr: &TypeExpr, f: &mut F) -> TypeExpr {
    match expr {
        TypeExpr::Sum { variants, annots } => TypeExpr::Sum {
            variants: variants
                .iter()
                .map(|v| Variant {
                    tag: v.tag.clone(),
                    payload: v.payload.as_ref().map(|p| rename_types(p, f)),
                })
                .collect(),
            annots: annots.clone(),
        },
        TypeExpr::Record { fields, annots } => TypeExpr::Record {
            fields: fields
                .iter()
                .map(|item| match item {
                    FieldItem::Field { label, ty } => FieldItem::Field {
                        label: label.clone(),
                        ty: rename_types(ty, f),
                    },
                    FieldItem::Inherit { ty } => FieldItem::Inherit {
                        ty: rename_types(ty, f),
                    },
                })
                .collect(),
            annots: annots.clone(),
        },
        TypeExpr::Tuple { items, annots } => TypeExpr::Tuple {
            items: items.iter().map(|t| rename_types(t, f)).collect(),
            annots: annots.clone(),
        },
        TypeExpr::Container {
            container,
            elem,
            annots,
        } => TypeExpr::Container {
            container: *container,
            elem: Box::new(rename_types(elem, f)),
            annots: annots.clone(),
        },
        TypeExpr::Var { .. } => expr.clone(),
        TypeExpr::Named { name, args, annots } => TypeExpr::Named {
            name: f(name),
            args: args.iter().map(|t| rename_types(t, f)).collect(),
            annots: annots.clone(),
        },
    }
}
