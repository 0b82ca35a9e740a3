// table.rs — Definition table (arena)
//
// Indexed, growable store of entries addressed by name. Built-ins and user
// definitions are seeded with their original body; specializations are
// reserved with an empty expansion slot and filled once their body is known.
// An entry whose expansion slot is still empty while its name is looked up
// again is a specialization in progress: the lookup is a cycle.
//
// Preconditions: names are unique (checked upstream).
// Postconditions: `drain` yields filled entries in creation order.
// Failure modes: none; callers turn missing entries into engine errors.
// Side effects: none.

use std::collections::HashMap;

use crate::ast::TypeDef;
use crate::id::{SeqAllocator, SeqNo};

/// Index of an entry in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub seq: SeqNo,
    pub arity: usize,
    /// Body as declared. `None` for opaque atoms and for specializations.
    pub original: Option<TypeDef>,
    /// Body after substitution. `None` until filled.
    pub expansion: Option<TypeDef>,
}

impl Entry {
    pub fn is_filled(&self) -> bool {
        self.expansion.is_some()
    }
}

#[derive(Debug, Default)]
pub struct DefTable {
    entries: Vec<Entry>,
    index: HashMap<String, EntryId>,
    seq: SeqAllocator,
}

impl DefTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a built-in or user definition.
    pub fn seed(&mut self, name: &str, arity: usize, original: Option<TypeDef>) -> EntryId {
        self.insert(name, arity, original)
    }

    /// Insert a placeholder for a specialization about to be computed.
    pub fn reserve(&mut self, name: &str, arity: usize) -> EntryId {
        self.insert(name, arity, None)
    }

    fn insert(&mut self, name: &str, arity: usize, original: Option<TypeDef>) -> EntryId {
        let id = EntryId(self.entries.len());
        self.entries.push(Entry {
            name: name.to_string(),
            seq: self.seq.alloc(),
            arity,
            original,
            expansion: None,
        });
        self.index.insert(name.to_string(), id);
        id
    }

    /// Store the expanded body of an entry.
    pub fn fill(&mut self, id: EntryId, def: TypeDef) {
        self.entries[id.0].expansion = Some(def);
    }

    pub fn lookup(&self, name: &str) -> Option<EntryId> {
        self.index.get(name).copied()
    }

    pub fn get(&self, id: EntryId) -> &Entry {
        &self.entries[id.0]
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.lookup(name).map(|id| self.get(id))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the table: every filled entry, zero-arity only unless
    /// `keep_poly`, in ascending sequence order.
    pub fn drain(self, keep_poly: bool) -> Vec<TypeDef> {
        let mut filled: Vec<(SeqNo, TypeDef)> = self
            .entries
            .into_iter()
            .filter(|e| e.arity == 0 || keep_poly)
            .filter_map(|e| e.expansion.map(|def| (e.seq, def)))
            .collect();
        filled.sort_by_key(|(seq, _)| *seq);
        filled.into_iter().map(|(_, def)| def).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TypeExpr;

    fn def(name: &str, params: &[&str]) -> TypeDef {
        TypeDef::new(
            name,
            params.iter().map(|p| p.to_string()).collect(),
            TypeExpr::atom("int"),
        )
    }

    #[test]
    fn reserve_then_fill() {
        let mut table = DefTable::new();
        let id = table.reserve("@(int list)", 0);
        assert!(!table.get(id).is_filled());
        assert_eq!(table.lookup("@(int list)"), Some(id));
        table.fill(id, def("@(int list)", &[]));
        assert!(table.entry("@(int list)").unwrap().is_filled());
    }

    #[test]
    fn sequence_numbers_follow_creation_order() {
        let mut table = DefTable::new();
        let a = table.seed("a", 0, None);
        let b = table.reserve("b", 0);
        assert!(table.get(a).seq < table.get(b).seq);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn drain_skips_unfilled_and_polymorphic() {
        let mut table = DefTable::new();
        table.seed("int", 0, None);
        let t = table.seed("t", 1, Some(def("t", &["a"])));
        let x = table.seed("x", 0, Some(def("x", &[])));
        let s = table.reserve("@(int t)", 0);
        table.fill(s, def("@(int t)", &[]));
        table.fill(x, def("x", &[]));
        table.fill(t, def("t", &["a"]));

        let mono: Vec<String> = table.drain(false).into_iter().map(|d| d.name).collect();
        assert_eq!(mono, vec!["x", "@(int t)"]);
    }

    #[test]
    fn drain_keep_poly_includes_generic_entries() {
        let mut table = DefTable::new();
        let t = table.seed("t", 1, Some(def("t", &["a"])));
        table.fill(t, def("t", &["a"]));
        let names: Vec<String> = table.drain(true).into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["t"]);
    }
}
