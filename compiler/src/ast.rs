// ast.rs — Type expressions and type definitions
//
// One closed tagged union covers every node kind of the definition language.
// Containers (list/option/nullable/shared/wrap) have exactly one internal
// encoding: `TypeExpr::Container`. The alternate spelling as a named
// application to a reserved name is folded away by `TypeExpr::normalize`.
//
// Preconditions: none (data-only module).
// Postconditions: every `TypeDef` built through `TypeDef::new` is normalized.
// Failure modes: none.
// Side effects: none.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ── Annotations ─────────────────────────────────────────────────────────────

/// One annotation entry: `<section key="value">`.
///
/// A bare key (`<section key>`) has no value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Annot {
    pub section: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Annot {
    pub fn new(section: impl Into<String>, key: impl Into<String>, value: Option<&str>) -> Self {
        Annot {
            section: section.into(),
            key: key.into(),
            value: value.map(str::to_string),
        }
    }
}

/// Annotation set attached to a node. Merge is set union.
///
/// Ordered so that rendering (and therefore canonical naming) is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annots(BTreeSet<Annot>);

impl Annots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn insert(&mut self, annot: Annot) {
        self.0.insert(annot);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annot> {
        self.0.iter()
    }

    pub fn merge(&mut self, other: &Annots) {
        self.0.extend(other.0.iter().cloned());
    }
}

impl FromIterator<Annot> for Annots {
    fn from_iter<T: IntoIterator<Item = Annot>>(iter: T) -> Self {
        Annots(iter.into_iter().collect())
    }
}

// ── Containers ──────────────────────────────────────────────────────────────

/// Single-argument generic types with dedicated shorthand handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    List,
    Option,
    Nullable,
    Shared,
    Wrap,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 5] = [
        ContainerKind::List,
        ContainerKind::Option,
        ContainerKind::Nullable,
        ContainerKind::Shared,
        ContainerKind::Wrap,
    ];

    /// Reserved type name for this container.
    pub fn name(self) -> &'static str {
        match self {
            ContainerKind::List => "list",
            ContainerKind::Option => "option",
            ContainerKind::Nullable => "nullable",
            ContainerKind::Shared => "shared",
            ContainerKind::Wrap => "wrap",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

// ── Type expressions ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeExpr {
    /// `[ A | B of t ]`
    Sum {
        variants: Vec<Variant>,
        #[serde(default, skip_serializing_if = "Annots::is_empty")]
        annots: Annots,
    },
    /// `{ label : t; inherit u }`
    Record {
        fields: Vec<FieldItem>,
        #[serde(default, skip_serializing_if = "Annots::is_empty")]
        annots: Annots,
    },
    /// `(t1 * t2)`
    Tuple {
        items: Vec<TypeExpr>,
        #[serde(default, skip_serializing_if = "Annots::is_empty")]
        annots: Annots,
    },
    /// `t list`, `t option`, ...
    Container {
        container: ContainerKind,
        elem: Box<TypeExpr>,
        #[serde(default, skip_serializing_if = "Annots::is_empty")]
        annots: Annots,
    },
    /// `'a`
    Var {
        name: String,
        #[serde(default, skip_serializing_if = "Annots::is_empty")]
        annots: Annots,
    },
    /// `(t1, t2) name`, or a bare `name` with no arguments.
    Named {
        name: String,
        args: Vec<TypeExpr>,
        #[serde(default, skip_serializing_if = "Annots::is_empty")]
        annots: Annots,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variant {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldItem {
    Field { label: String, ty: TypeExpr },
    Inherit { ty: TypeExpr },
}

impl TypeExpr {
    pub fn var(name: impl Into<String>) -> Self {
        TypeExpr::Var {
            name: name.into(),
            annots: Annots::new(),
        }
    }

    pub fn named(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            args,
            annots: Annots::new(),
        }
    }

    /// A bare reference to a parameterless type.
    pub fn atom(name: impl Into<String>) -> Self {
        Self::named(name, Vec::new())
    }

    pub fn container(container: ContainerKind, elem: TypeExpr) -> Self {
        TypeExpr::Container {
            container,
            elem: Box::new(elem),
            annots: Annots::new(),
        }
    }

    pub fn tuple(items: Vec<TypeExpr>) -> Self {
        TypeExpr::Tuple {
            items,
            annots: Annots::new(),
        }
    }

    pub fn sum(variants: Vec<Variant>) -> Self {
        TypeExpr::Sum {
            variants,
            annots: Annots::new(),
        }
    }

    pub fn record(fields: Vec<FieldItem>) -> Self {
        TypeExpr::Record {
            fields,
            annots: Annots::new(),
        }
    }

    pub fn annots(&self) -> &Annots {
        match self {
            TypeExpr::Sum { annots, .. }
            | TypeExpr::Record { annots, .. }
            | TypeExpr::Tuple { annots, .. }
            | TypeExpr::Container { annots, .. }
            | TypeExpr::Var { annots, .. }
            | TypeExpr::Named { annots, .. } => annots,
        }
    }

    pub fn annots_mut(&mut self) -> &mut Annots {
        match self {
            TypeExpr::Sum { annots, .. }
            | TypeExpr::Record { annots, .. }
            | TypeExpr::Tuple { annots, .. }
            | TypeExpr::Container { annots, .. }
            | TypeExpr::Var { annots, .. }
            | TypeExpr::Named { annots, .. } => annots,
        }
    }

    /// Union `extra` into the annotations of the root node.
    pub fn with_annots(mut self, extra: &Annots) -> Self {
        if !extra.is_empty() {
            self.annots_mut().merge(extra);
        }
        self
    }

    pub fn as_var(&self) -> Option<&str> {
        match self {
            TypeExpr::Var { name, .. } => Some(name),
            _ => None,
        }
    }

    /// True if this is a named application whose head is `name`.
    pub fn is_named(&self, name: &str) -> bool {
        matches!(self, TypeExpr::Named { name: n, .. } if n == name)
    }

    /// Fold the `Named("list", [t])` encoding (and the other reserved
    /// container names) into `Container` nodes, recursively.
    pub fn normalize(self) -> Self {
        match self {
            TypeExpr::Sum { variants, annots } => TypeExpr::Sum {
                variants: variants
                    .into_iter()
                    .map(|v| Variant {
                        tag: v.tag,
                        payload: v.payload.map(TypeExpr::normalize),
                    })
                    .collect(),
                annots,
            },
            TypeExpr::Record { fields, annots } => TypeExpr::Record {
                fields: fields
                    .into_iter()
                    .map(|f| match f {
                        FieldItem::Field { label, ty } => FieldItem::Field {
                            label,
                            ty: ty.normalize(),
                        },
                        FieldItem::Inherit { ty } => FieldItem::Inherit { ty: ty.normalize() },
                    })
                    .collect(),
                annots,
            },
            TypeExpr::Tuple { items, annots } => TypeExpr::Tuple {
                items: items.into_iter().map(TypeExpr::normalize).collect(),
                annots,
            },
            TypeExpr::Container {
                container,
                elem,
                annots,
            } => TypeExpr::Container {
                container,
                elem: Box::new(elem.normalize()),
                annots,
            },
            TypeExpr::Var { .. } => self,
            TypeExpr::Named { name, args, annots } => {
                let mut args: Vec<TypeExpr> = args.into_iter().map(TypeExpr::normalize).collect();
                match ContainerKind::from_name(&name) {
                    Some(container) if args.len() == 1 => TypeExpr::Container {
                        container,
                        elem: Box::new(args.remove(0)),
                        annots,
                    },
                    _ => TypeExpr::Named { name, args, annots },
                }
            }
        }
    }
}

// ── Definitions ─────────────────────────────────────────────────────────────

/// `type ('a, 'b) name <annots> = body`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    pub params: Vec<String>,
    #[serde(default, skip_serializing_if = "Annots::is_empty")]
    pub annots: Annots,
    pub body: TypeExpr,
}

impl TypeDef {
    /// Build a definition with no annotations. The body is normalized.
    pub fn new(name: impl Into<String>, params: Vec<String>, body: TypeExpr) -> Self {
        TypeDef {
            name: name.into(),
            params,
            annots: Annots::new(),
            body: body.normalize(),
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}
