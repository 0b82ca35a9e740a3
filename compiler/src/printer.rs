// printer.rs — Render type expressions and definitions to source syntax
//
// The rendering doubles as the signature function used for canonical naming:
// structurally equal expressions render identically and distinct expressions
// render distinctly. Application is postfix and every compound form is
// delimited, so no parenthesization decisions depend on context.
//
// Preconditions: none.
// Postconditions: output re-parses to the same tree (for user-spellable names).
// Failure modes: none (pure string formatting).
// Side effects: none.

use std::fmt;

use crate::ast::{Annots, FieldItem, TypeDef, TypeExpr, Variant};

/// Render the application `(args) name <annots>` without building a node.
///
/// A reserved container name applied to one argument renders exactly like
/// the corresponding `Container` node.
pub fn signature(name: &str, args: &[TypeExpr], annots: &Annots) -> String {
    let mut s = String::new();
    let _ = write_application(&mut s, name, args);
    let _ = write_annots(&mut s, annots);
    s
}

fn write_application(f: &mut impl fmt::Write, name: &str, args: &[TypeExpr]) -> fmt::Result {
    match args {
        [] => write!(f, "{}", name),
        [arg] => write!(f, "{} {}", arg, name),
        _ => {
            write!(f, "(")?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ") {}", name)
        }
    }
}

fn write_annots(f: &mut impl fmt::Write, annots: &Annots) -> fmt::Result {
    let mut section: Option<&str> = None;
    for annot in annots.iter() {
        if section != Some(annot.section.as_str()) {
            if section.is_some() {
                write!(f, ">")?;
            }
            write!(f, " <{}", annot.section)?;
            section = Some(annot.section.as_str());
        }
        write!(f, " {}", annot.key)?;
        if let Some(value) = &annot.value {
            write!(f, "=\"{}\"", escape(value))?;
        }
    }
    if section.is_some() {
        write!(f, ">")?;
    }
    Ok(())
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn write_variant(f: &mut fmt::Formatter<'_>, variant: &Variant) -> fmt::Result {
    match &variant.payload {
        Some(payload) => write!(f, "{} of {}", variant.tag, payload),
        None => write!(f, "{}", variant.tag),
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Sum { variants, .. } => {
                write!(f, "[")?;
                for (i, v) in variants.iter().enumerate() {
                    write!(f, "{}", if i == 0 { " " } else { " | " })?;
                    write_variant(f, v)?;
                }
                write!(f, " ]")?;
            }
            TypeExpr::Record { fields, .. } => {
                write!(f, "{{")?;
                for (i, item) in fields.iter().enumerate() {
                    write!(f, "{}", if i == 0 { " " } else { "; " })?;
                    match item {
                        FieldItem::Field { label, ty } => write!(f, "{} : {}", label, ty)?,
                        FieldItem::Inherit { ty } => write!(f, "inherit {}", ty)?,
                    }
                }
                write!(f, " }}")?;
            }
            TypeExpr::Tuple { items, .. } => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " * ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")?;
            }
            TypeExpr::Container {
                container, elem, ..
            } => write!(f, "{} {}", elem, container.name())?,
            TypeExpr::Var { name, .. } => write!(f, "'{}", name)?,
            TypeExpr::Named { name, args, .. } => write_application(f, name, args)?,
        }
        write_annots(f, self.annots())
    }
}

impl fmt::Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type ")?;
        match self.params.as_slice() {
            [] => {}
            [p] => write!(f, "'{} ", p)?,
            ps => {
                let joined: Vec<String> = ps.iter().map(|p| format!("'{}", p)).collect();
                write!(f, "({}) ", joined.join(", "))?;
            }
        }
        write!(f, "{}", self.name)?;
        write_annots(f, &self.annots)?;
        write!(f, " = {}", self.body)
    }
}

/// Render a list of definitions, one per line.
pub fn render_defs(defs: &[TypeDef]) -> String {
    let mut out = String::new();
    for def in defs {
        out.push_str(&def.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Annot, ContainerKind};

    fn int() -> TypeExpr {
        TypeExpr::atom("int")
    }

    #[test]
    fn container_and_named_encodings_render_identically() {
        let container = TypeExpr::container(ContainerKind::List, int());
        let named = TypeExpr::named("list", vec![int()]);
        assert_eq!(container.to_string(), "int list");
        assert_eq!(named.to_string(), container.to_string());
        assert_eq!(signature("list", &[int()], &Annots::new()), "int list");
    }

    #[test]
    fn multi_argument_application() {
        let e = TypeExpr::named("t", vec![int(), TypeExpr::var("a")]);
        assert_eq!(e.to_string(), "(int, 'a) t");
    }

    #[test]
    fn compound_forms() {
        let sum = TypeExpr::sum(vec![
            Variant {
                tag: "Foo".into(),
                payload: Some(TypeExpr::tuple(vec![int(), TypeExpr::atom("string")])),
            },
            Variant {
                tag: "Bar".into(),
                payload: None,
            },
        ]);
        assert_eq!(sum.to_string(), "[ Foo of (int * string) | Bar ]");

        let rec = TypeExpr::record(vec![
            FieldItem::Field {
                label: "f".into(),
                ty: TypeExpr::container(ContainerKind::Option, int()),
            },
            FieldItem::Inherit {
                ty: TypeExpr::atom("base"),
            },
        ]);
        assert_eq!(rec.to_string(), "{ f : int option; inherit base }");
    }

    #[test]
    fn annotations_grouped_by_section() {
        let annots: Annots = [
            Annot::new("json", "name", Some("x")),
            Annot::new("json", "opt", None),
            Annot::new("ocaml", "repr", Some("a\"b")),
        ]
        .into_iter()
        .collect();
        let e = int().with_annots(&annots);
        assert_eq!(
            e.to_string(),
            r#"int <json name="x" opt> <ocaml repr="a\"b">"#
        );
    }

    #[test]
    fn annotations_distinguish_signatures() {
        let plain = signature("list", &[int()], &Annots::new());
        let annots: Annots = [Annot::new("ocaml", "repr", Some("array"))].into_iter().collect();
        let annotated = signature("list", &[int()], &annots);
        assert_ne!(plain, annotated);
        assert_eq!(annotated, r#"int list <ocaml repr="array">"#);
    }

    #[test]
    fn definition_headers() {
        let def = TypeDef::new("t", vec!["a".into(), "b".into()], TypeExpr::var("a"));
        assert_eq!(def.to_string(), "type ('a, 'b) t = 'a");
        let def = TypeDef::new("u", vec!["a".into()], TypeExpr::var("a"));
        assert_eq!(def.to_string(), "type 'a u = 'a");
        let def = TypeDef::new("v", vec![], int());
        assert_eq!(render_defs(&[def]), "type v = int\n");
    }
}
