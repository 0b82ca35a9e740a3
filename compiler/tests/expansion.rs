// Behavioural tests over the public library API.
//
// Drives source text through `pipeline::run` and inspects the resulting
// definitions and origin map, plus direct `expand` calls for the engine
// faults that checked source can never reach.

use tdmono::ast::{ContainerKind, TypeDef, TypeExpr};
use tdmono::config::Options;
use tdmono::diag::codes;
use tdmono::expand::{expand, expand_with, ExpandError, Origin};
use tdmono::pipeline::{run, PipelineError};
use tdmono::predef::builtins;

fn debug_run(source: &str) -> tdmono::pipeline::Output {
    let opts = Options {
        debug: true,
        ..Options::default()
    };
    run(source, &opts).unwrap_or_else(|e| panic!("run failed: {e}"))
}

fn body_of<'a>(defs: &'a [TypeDef], name: &str) -> &'a TypeExpr {
    &defs
        .iter()
        .find(|d| d.name == name)
        .unwrap_or_else(|| panic!("no definition named {name}"))
        .body
}

// ── Specialization ─────────────────────────────────────────────────────────

#[test]
fn pair_instantiation_yields_one_specialization() {
    let out = debug_run("type ('a, 'b) t = [ Foo of 'a | Bar of 'b ]\ntype int_t = (int, int) t");
    assert_eq!(out.defs.len(), 2);
    assert_eq!(body_of(&out.defs, "int_t"), &TypeExpr::atom("@((int, int) t)"));
    assert_eq!(
        out.origins["@((int, int) t)"],
        Origin {
            generic: "t".into(),
            arity: 2
        }
    );
}

#[test]
fn recurring_subexpression_is_synthesized_once() {
    let out = debug_run("type x = { f : int option list }\ntype y = { g : int list; h : int option }");
    let names: Vec<&str> = out.defs.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["x", "y", "@(int option)", "@(@(int option) list)", "@(int list)"]
    );
    assert_eq!(
        body_of(&out.defs, "@(@(int option) list)"),
        &TypeExpr::container(ContainerKind::List, TypeExpr::atom("@(int option)"))
    );
}

#[test]
fn self_referential_generic_terminates() {
    let out = debug_run(
        "type 'a tree = [ Leaf | Node of ('a tree * 'a * 'a tree) ]\ntype t = string tree",
    );
    let rendered = body_of(&out.defs, "@(string tree)").to_string();
    assert_eq!(
        rendered,
        "[ Leaf | Node of (@(string tree) * string * @(string tree)) ]"
    );
}

#[test]
fn recursion_through_a_container() {
    let out = debug_run("type 'a rose = { label : 'a; kids : 'a rose list }\ntype r = int rose");
    assert_eq!(
        body_of(&out.defs, "@(int rose)").to_string(),
        "{ label : int; kids : @(@(int rose) list) }"
    );
    assert_eq!(
        body_of(&out.defs, "@(@(int rose) list)").to_string(),
        "@(int rose) list"
    );
}

#[test]
fn abstract_generic_is_not_inlined() {
    let out = debug_run("type 'a handle = abstract\ntype h = string handle");
    assert_eq!(
        body_of(&out.defs, "@(string handle)"),
        &TypeExpr::named("handle", vec![TypeExpr::atom("string")])
    );
    assert_eq!(out.origins["@(string handle)"].generic, "handle");
}

#[test]
fn keep_poly_specializes_partially_applied_generics() {
    let opts = Options {
        keep_poly: true,
        debug: true,
        ..Options::default()
    };
    let source = "type ('a, 'b) t = ('a * 'b)\ntype 'a u = ('a, int) t\n";
    let out = run(source, &opts).unwrap();
    assert_eq!(
        body_of(&out.defs, "u"),
        &TypeExpr::named("@(('a, int) t)", vec![TypeExpr::var("a")])
    );
    let spec = out.defs.iter().find(|d| d.name == "@(('a, int) t)").unwrap();
    assert_eq!(spec.params, vec!["a"]);
    assert_eq!(spec.body.to_string(), "('a * int)");
}

#[test]
fn fully_variable_application_is_not_specialized() {
    let opts = Options {
        keep_poly: true,
        debug: true,
        ..Options::default()
    };
    let out = run("type 'a box = [ B of 'a ]\ntype 'b wrapper = 'b box\n", &opts).unwrap();
    assert!(out.origins.is_empty());
    assert_eq!(out.defs.len(), 2);
}

// ── Standardization ────────────────────────────────────────────────────────

#[test]
fn standardized_names_replace_every_canonical_name() {
    let out = run(
        "type 'a tree = [ Leaf | Node of ('a tree * 'a * 'a tree) ]\ntype t = int tree list",
        &Options::default(),
    )
    .unwrap();
    for def in &out.defs {
        assert!(!def.to_string().contains("@("), "left over: {def}");
    }
    assert!(out.origins.keys().all(|k| k.starts_with('_')));
    assert_eq!(out.origins["_1"].generic, "tree");
    assert_eq!(out.origins["_2"].generic, "list");
}

// ── Rejection and faults ───────────────────────────────────────────────────

#[test]
fn unbound_variable_is_rejected_before_expansion() {
    let Err(PipelineError::Rejected(diags)) = run("type x = 'a list", &Options::default()) else {
        panic!("expected rejection")
    };
    assert_eq!(diags[0].code, Some(codes::E0102));
}

#[test]
fn missing_generic_is_an_engine_fault() {
    let defs = vec![TypeDef::new(
        "x",
        vec![],
        TypeExpr::named("nowhere", vec![TypeExpr::atom("int")]),
    )];
    assert_eq!(
        expand(&defs, false),
        Err(ExpandError::MissingDefinition {
            name: "nowhere".into()
        })
    );
}

#[test]
fn abstract_without_builtin_is_an_engine_fault() {
    let catalogue: Vec<_> = builtins()
        .into_iter()
        .filter(|p| p.name != "abstract")
        .collect();
    let defs = vec![
        TypeDef::new("handle", vec!["a".into()], TypeExpr::atom("abstract")),
        TypeDef::new(
            "h",
            vec![],
            TypeExpr::named("handle", vec![TypeExpr::atom("int")]),
        ),
    ];
    assert_eq!(
        expand_with(&catalogue, &defs, false),
        Err(ExpandError::UnresolvedAbstract {
            name: "handle".into()
        })
    );
}

#[test]
fn engine_fault_surfaces_through_the_pipeline_error() {
    let err = PipelineError::from(ExpandError::ArityMismatch {
        name: "t".into(),
        expected: 2,
        found: 1,
    });
    assert_eq!(err.to_string(), "type `t` expects 2 argument(s), found 1");
}
