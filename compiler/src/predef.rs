// predef.rs — Built-in type catalogue
//
// Seeded into the definition table before any user definition. Atoms have
// no body (opaque); containers carry a one-parameter body so they can be
// specialized like any other generic.

use crate::ast::{ContainerKind, TypeDef, TypeExpr};

/// Name of the built-in atom used as the body of abstract generics.
pub const ABSTRACT: &str = "abstract";

/// One built-in entry: name, arity, and optional original body.
#[derive(Debug, Clone)]
pub struct Predef {
    pub name: &'static str,
    pub arity: usize,
    pub def: Option<TypeDef>,
}

/// The built-in catalogue, in seeding order.
pub fn builtins() -> Vec<Predef> {
    let atoms = ["unit", "bool", "int", "float", "string", ABSTRACT]
        .into_iter()
        .map(|name| Predef {
            name,
            arity: 0,
            def: None,
        });

    let containers = ContainerKind::ALL.into_iter().map(|kind| Predef {
        name: kind.name(),
        arity: 1,
        def: Some(TypeDef::new(
            kind.name(),
            vec!["a".to_string()],
            TypeExpr::container(kind, TypeExpr::var("a")),
        )),
    });

    atoms.chain(containers).collect()
}

/// True if `body` is the abstract marker (`type 'a t = abstract`).
pub fn is_abstract(body: &TypeExpr) -> bool {
    matches!(body, TypeExpr::Named { name, args, .. } if name == ABSTRACT && args.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containers_are_unary_with_bodies() {
        let all = builtins();
        for kind in ContainerKind::ALL {
            let entry = all.iter().find(|p| p.name == kind.name()).unwrap();
            assert_eq!(entry.arity, 1);
            let def = entry.def.as_ref().unwrap();
            assert_eq!(def.arity(), 1);
            assert_eq!(def.body, TypeExpr::container(kind, TypeExpr::var("a")));
        }
    }

    #[test]
    fn atoms_are_opaque() {
        let all = builtins();
        let int = all.iter().find(|p| p.name == "int").unwrap();
        assert_eq!(int.arity, 0);
        assert!(int.def.is_none());
        assert!(all.iter().any(|p| p.name == ABSTRACT));
    }

    #[test]
    fn abstract_marker() {
        assert!(is_abstract(&TypeExpr::atom(ABSTRACT)));
        assert!(!is_abstract(&TypeExpr::atom("int")));
        assert!(!is_abstract(&TypeExpr::var(ABSTRACT)));
    }
}
