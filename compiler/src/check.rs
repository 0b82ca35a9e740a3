// check.rs — Well-formedness checks on parsed definitions
//
// Rejects inputs the expansion engine assumes away: duplicate names,
// duplicate or unbound type variables, references to unknown types and
// applications with the wrong number of arguments, and recursive generics
// whose self-applications grow their arguments (each level would need a new
// specialization, so expansion never terminates).
//
// Preconditions: `items` come from `parser::parse` with no syntax errors.
// Postconditions: if no error-level diagnostic is returned, `expand` cannot
//   fail with `MissingDefinition` or `ArityMismatch` on these definitions,
//   and it synthesizes finitely many specializations.
// Failure modes: every problem found is reported; checking continues past
//   errors.
// Side effects: none.

use std::collections::{HashMap, HashSet};

use crate::ast::{FieldItem, TypeExpr};
use crate::diag::{codes, Diagnostic, Span};
use crate::parser::DefItem;
use crate::predef::{is_abstract, Predef};

/// Check a parsed file against the given built-in catalogue.
pub fn check(items: &[DefItem], builtins: &[Predef]) -> Vec<Diagnostic> {
    let mut ctx = CheckCtx {
        arities: builtins.iter().map(|p| (p.name.to_string(), p.arity)).collect(),
        declared: HashMap::new(),
        diagnostics: Vec::new(),
    };

    // Pass 1: collect names so forward references resolve.
    for item in items {
        ctx.declare(item);
    }

    // Pass 2: walk heads and bodies.
    for item in items {
        ctx.check_item(item);
    }

    // Pass 3: recursion through generics must keep its arguments flat.
    check_regular(items, &mut ctx.diagnostics);

    ctx.diagnostics
}

/// Reject applications inside a recursive cycle of generics whose argument
/// wraps a type variable in further structure, as in
/// `type 'a t = [ A | B of ('a * 'a) t ]`.
///
/// Bare variables and closed arguments only ever recombine types already
/// present, so they are accepted.
fn check_regular(items: &[DefItem], diagnostics: &mut Vec<Diagnostic>) {
    let generics: HashSet<&str> = items
        .iter()
        .filter(|item| !item.def.params.is_empty())
        .map(|item| item.def.name.as_str())
        .collect();

    let mut calls: HashMap<&str, Vec<(&str, &[TypeExpr])>> = HashMap::new();
    for item in items.iter().filter(|item| !item.def.params.is_empty()) {
        let mut apps = Vec::new();
        applications(&item.def.body, &mut apps);
        apps.retain(|(callee, _)| generics.contains(callee));
        calls.insert(item.def.name.as_str(), apps);
    }

    for item in items {
        let caller = item.def.name.as_str();
        let Some(apps) = calls.get(caller) else {
            continue;
        };
        for &(callee, args) in apps {
            if !reaches(&calls, callee, caller) {
                continue;
            }
            let growing = args
                .iter()
                .any(|arg| arg.as_var().is_none() && contains_var(arg));
            if growing {
                diagnostics.push(
                    Diagnostic::error(
                        codes::E0105,
                        item.span,
                        format!(
                            "recursive use of `{}` in `{}` wraps a type parameter in its arguments",
                            callee, caller
                        ),
                    )
                    .with_hint("pass type parameters through unchanged in recursive uses"),
                );
            }
        }
    }
}

/// True if `to` is reachable from `from` along generic applications.
fn reaches(calls: &HashMap<&str, Vec<(&str, &[TypeExpr])>>, from: &str, to: &str) -> bool {
    let mut seen = HashSet::new();
    let mut stack = vec![from];
    while let Some(name) = stack.pop() {
        if name == to {
            return true;
        }
        if !seen.insert(name) {
            continue;
        }
        if let Some(apps) = calls.get(name) {
            stack.extend(apps.iter().map(|(callee, _)| *callee));
        }
    }
    false
}

/// Every named application with arguments, outermost first.
fn applications<'e>(expr: &'e TypeExpr, out: &mut Vec<(&'e str, &'e [TypeExpr])>) {
    match expr {
        TypeExpr::Sum { variants, .. } => {
            for payload in variants.iter().filter_map(|v| v.payload.as_ref()) {
                applications(payload, out);
            }
        }
        TypeExpr::Record { fields, .. } => {
            for field in fields {
                let (FieldItem::Field { ty, .. } | FieldItem::Inherit { ty }) = field;
                applications(ty, out);
            }
        }
        TypeExpr::Tuple { items, .. } => {
            for item in items {
                applications(item, out);
            }
        }
        TypeExpr::Container { elem, .. } => applications(elem, out),
        TypeExpr::Var { .. } => {}
        TypeExpr::Named { name, args, .. } => {
            if !args.is_empty() {
                out.push((name.as_str(), args.as_slice()));
            }
            for arg in args {
                applications(arg, out);
            }
        }
    }
}

fn contains_var(expr: &TypeExpr) -> bool {
    match expr {
        TypeExpr::Sum { variants, .. } => variants
            .iter()
            .filter_map(|v| v.payload.as_ref())
            .any(contains_var),
        TypeExpr::Record { fields, .. } => fields.iter().any(|field| {
            let (FieldItem::Field { ty, .. } | FieldItem::Inherit { ty }) = field;
            contains_var(ty)
        }),
        TypeExpr::Tuple { items, .. } => items.iter().any(contains_var),
        TypeExpr::Container { elem, .. } => contains_var(elem),
        TypeExpr::Var { .. } => true,
        TypeExpr::Named { args, .. } => args.iter().any(contains_var),
    }
}

struct CheckCtx {
    arities: HashMap<String, usize>,
    /// User definitions by name, with the span of the first declaration.
    declared: HashMap<String, Span>,
    diagnostics: Vec<Diagnostic>,
}

impl CheckCtx {
    fn declare(&mut self, item: &DefItem) {
        let name = &item.def.name;
        if let Some(first) = self.declared.get(name) {
            self.diagnostics.push(
                Diagnostic::error(codes::E0100, item.span, format!("duplicate type `{}`", name))
                    .with_related(*first, "first defined here"),
            );
            return;
        }
        if self.arities.contains_key(name) {
            self.diagnostics.push(
                Diagnostic::error(
                    codes::E0100,
                    item.span,
                    format!("type `{}` redeclares a built-in type", name),
                )
                .with_hint("choose another name"),
            );
            return;
        }
        self.declared.insert(name.clone(), item.span);
        self.arities.insert(name.clone(), item.def.arity());
    }

    fn check_item(&mut self, item: &DefItem) {
        let def = &item.def;
        let mut params = HashSet::new();
        for param in &def.params {
            if !params.insert(param.as_str()) {
                self.diagnostics.push(Diagnostic::error(
                    codes::E0101,
                    item.span,
                    format!("type parameter '{} listed twice in `{}`", param, def.name),
                ));
            }
        }

        let mut used = HashSet::new();
        self.check_expr(&def.body, &params, &mut used, item.span, &def.name);

        // Abstract generics take parameters they never mention.
        if is_abstract(&def.body) {
            return;
        }
        for param in &def.params {
            if !used.contains(param.as_str()) {
                self.diagnostics.push(Diagnostic::warning(
                    codes::W0100,
                    item.span,
                    format!("type parameter '{} is never used in `{}`", param, def.name),
                ));
            }
        }
    }

    fn check_expr<'e>(
        &mut self,
        expr: &'e TypeExpr,
        params: &HashSet<&str>,
        used: &mut HashSet<&'e str>,
        span: Span,
        owner: &str,
    ) {
        match expr {
            TypeExpr::Sum { variants, .. } => {
                for payload in variants.iter().filter_map(|v| v.payload.as_ref()) {
                    self.check_expr(payload, params, used, span, owner);
                }
            }
            TypeExpr::Record { fields, .. } => {
                for field in fields {
                    let (FieldItem::Field { ty, .. } | FieldItem::Inherit { ty }) = field;
                    self.check_expr(ty, params, used, span, owner);
                }
            }
            TypeExpr::Tuple { items, .. } => {
                for item in items {
                    self.check_expr(item, params, used, span, owner);
                }
            }
            TypeExpr::Container { elem, .. } => {
                self.check_expr(elem, params, used, span, owner);
            }
            TypeExpr::Var { name, .. } => {
                if params.contains(name.as_str()) {
                    used.insert(name.as_str());
                } else {
                    self.diagnostics.push(
                        Diagnostic::error(
                            codes::E0102,
                            span,
                            format!("unbound type variable '{} in `{}`", name, owner),
                        )
                        .with_hint(format!("add '{} to the parameters of `{}`", name, owner)),
                    );
                }
            }
            TypeExpr::Named { name, args, .. } => {
                match self.arities.get(name) {
                    None => self.diagnostics.push(Diagnostic::error(
                        codes::E0103,
                        span,
                        format!("unknown type `{}` in `{}`", name, owner),
                    )),
                    Some(&expected) if expected != args.len() => {
                        self.diagnostics.push(Diagnostic::error(
                            codes::E0104,
                            span,
                            format!(
                                "type `{}` expects {} argument(s), found {} in `{}`",
                                name,
                                expected,
                                args.len(),
                                owner
                            ),
                        ))
                    }
                    Some(_) => {}
                }
                for arg in args {
                    self.check_expr(arg, params, used, span, owner);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::DiagCode;
    use crate::predef::builtins;

    fn check_source(source: &str) -> Vec<Diagnostic> {
        let result = crate::parser::parse(source);
        assert!(result.errors.is_empty(), "parse errors: {:?}", result.errors);
        check(&result.items.unwrap(), &builtins())
    }

    fn codes_of(diags: &[Diagnostic]) -> Vec<DiagCode> {
        diags.iter().filter_map(|d| d.code).collect()
    }

    #[test]
    fn well_formed_file_is_clean() {
        let diags = check_source(
            "type ('a, 'b) t = [ Foo of 'a | Bar of 'b ]\n\
             type x = (int, int) t\n\
             type 'a tree = [ Leaf | Node of ('a tree * 'a * 'a tree) ]\n\
             type r = { f : int list option; inherit x }\n",
        );
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn forward_references_resolve() {
        assert!(check_source("type a = b list\ntype b = int").is_empty());
    }

    #[test]
    fn duplicate_definition() {
        let diags = check_source("type a = int\ntype a = string");
        assert_eq!(codes_of(&diags), vec![codes::E0100]);
        assert_eq!(diags[0].related_spans.len(), 1);
    }

    #[test]
    fn redeclared_builtin() {
        let diags = check_source("type list = int");
        assert_eq!(codes_of(&diags), vec![codes::E0100]);
    }

    #[test]
    fn duplicate_parameter() {
        let diags = check_source("type ('a, 'a) t = 'a");
        assert_eq!(codes_of(&diags), vec![codes::E0101]);
    }

    #[test]
    fn unbound_variable() {
        let diags = check_source("type t = 'a list");
        assert_eq!(codes_of(&diags), vec![codes::E0102]);
        assert!(diags[0].hint.is_some());
    }

    #[test]
    fn unknown_type() {
        let diags = check_source("type t = missing option");
        assert_eq!(codes_of(&diags), vec![codes::E0103]);
    }

    #[test]
    fn arity_mismatch_at_use_site() {
        let diags = check_source("type 'a box = 'a\ntype t = (int, int) box\ntype u = box");
        assert_eq!(codes_of(&diags), vec![codes::E0104, codes::E0104]);
    }

    #[test]
    fn container_with_two_arguments_is_rejected() {
        let diags = check_source("type t = (int, int) list");
        assert_eq!(codes_of(&diags), vec![codes::E0104]);
    }

    #[test]
    fn abstract_generic_needs_no_parameter_use() {
        assert!(check_source("type 'a handle = abstract").is_empty());
    }

    #[test]
    fn growing_self_application_is_rejected() {
        let diags = check_source("type 'a t = [ A | B of ('a * 'a) t ]\ntype x = int t");
        assert_eq!(codes_of(&diags), vec![codes::E0105]);
    }

    #[test]
    fn growing_mutual_recursion_is_rejected() {
        let diags = check_source(
            "type 'a even = [ Nil | Cons of ('a * 'a odd) ]\n\
             type 'b odd = { next : 'b list even }",
        );
        assert_eq!(codes_of(&diags), vec![codes::E0105]);
    }

    #[test]
    fn flat_recursion_is_accepted() {
        let diags = check_source(
            "type 'a rose = { label : 'a; kids : 'a rose list }\n\
             type ('a, 'b) flip = [ Stop | Go of ('b, 'a) flip ]\n\
             type 'a fixed = [ End of 'a | More of int fixed ]\n\
             type 'a outer = 'a list rose\n",
        );
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn unused_parameter_is_a_warning() {
        let diags = check_source("type 'a phantom = int");
        assert_eq!(codes_of(&diags), vec![codes::W0100]);
        assert!(!crate::diag::has_errors(&diags));
    }
}
