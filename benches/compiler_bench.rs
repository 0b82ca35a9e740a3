use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use tdmono::*;

// Representative scenarios. All are valid input (parse and check cleanly).

const ALIASES: &str = r#"
type id = int
type name = string
type person = { id : id; name : name; nick : string option }
"#;

const CONTAINERS: &str = r#"
type row = { cells : string list; tags : string list option }
type table = { rows : row list; header : string list }
type index = (int * row) list nullable
"#;

const GENERICS: &str = r#"
type ('a, 'b) either = [ Left of 'a | Right of 'b ]
type 'a tree = [ Leaf | Node of ('a tree * 'a * 'a tree) ]
type 'a handle = abstract
type result = (int tree, string list) either
type forest = string tree list
type files = { input : int handle; output : int handle }
"#;

fn scenarios() -> [(&'static str, &'static str); 3] {
    [
        ("aliases", ALIASES),
        ("containers", CONTAINERS),
        ("generics", GENERICS),
    ]
}

/// Scaling generator: `n` generic definitions each instantiated at several
/// distinct element types, with nested applications so specializations
/// reference each other.
fn generate_scaling_source(n: usize) -> String {
    let mut src = String::new();
    for g in 0..n {
        src.push_str(&format!("type 'a g{} = {{ value : 'a; rest : 'a g{} list }}\n", g, g));
    }
    for g in 0..n {
        src.push_str(&format!("type u{} = int g{}\n", g, g));
        src.push_str(&format!("type v{} = string option g{}\n", g, g));
        if g > 0 {
            src.push_str(&format!("type w{} = int g{} g{}\n", g, g - 1, g));
        }
    }
    src
}

// Parser latency for representative scenarios.
fn bench_parse_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_latency");

    for (name, source) in scenarios() {
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, source| {
            b.iter(|| {
                let result = parser::parse(black_box(source));
                black_box(&result.items);
            });
        });
    }

    group.finish();
}

// Full pipeline latency (parse -> check -> expand -> standardize).
fn bench_full_pipeline_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline_latency");
    let opts = config::Options::default();

    for (name, source) in scenarios() {
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, source| {
            b.iter(|| {
                let out = pipeline::run(black_box(source), &opts).unwrap();
                black_box(&out.defs);
            });
        });
    }

    group.finish();
}

// Expansion alone, with parsing done in setup.
fn bench_expand_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand_latency");

    for (name, source) in scenarios() {
        group.bench_function(name, |b| {
            b.iter_batched(
                || {
                    let pr = parser::parse(source);
                    pr.items
                        .unwrap()
                        .into_iter()
                        .map(|item| item.def)
                        .collect::<Vec<_>>()
                },
                |defs| {
                    let exp = expand::expand(black_box(&defs), false).unwrap();
                    black_box(&exp.defs);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// Expansion scaling vs number of generic definitions.
fn bench_expand_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand_scaling");

    for n in [1_usize, 10, 50, 100] {
        let source = generate_scaling_source(n);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}generics", n)),
            &source,
            |b, source| {
                b.iter(|| {
                    let out = pipeline::run(black_box(source.as_str()), &config::Options::default())
                        .unwrap();
                    black_box(&out.defs);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_latency,
    bench_full_pipeline_latency,
    bench_expand_latency,
    bench_expand_scaling,
);
criterion_main!(benches);
