// standardize.rs — Replace canonical names with short stable identifiers
//
// Every synthesized definition (`@(...)` name) is renamed to `<prefix><n>`
// with `n` counting up from 1 in output order, skipping identifiers already
// taken by a built-in or user-declared type. References inside bodies use the
// same mapping, and origin-map entries move to the new names.
//
// Preconditions: `defs` is the output of `expand`.
// Postconditions: no `@(...)` name remains in names or bodies.
// Failure modes: none.
// Side effects: relocates entries in the origin map.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::algebra::rename_types;
use crate::ast::TypeDef;
use crate::expand::OriginMap;
use crate::naming::is_synthetic;

struct Renamer<'a> {
    prefix: &'a str,
    reserved: HashSet<String>,
    mapping: HashMap<String, String>,
    counter: u32,
}

impl Renamer<'_> {
    fn fresh(&mut self) -> String {
        loop {
            self.counter += 1;
            let candidate = format!("{}{}", self.prefix, self.counter);
            if !self.reserved.contains(&candidate) {
                return candidate;
            }
        }
    }

    fn rename(&mut self, name: &str) -> String {
        if !is_synthetic(name) {
            return name.to_string();
        }
        if let Some(new_name) = self.mapping.get(name) {
            return new_name.clone();
        }
        let new_name = self.fresh();
        trace!("standardize: {} -> {}", name, new_name);
        self.mapping.insert(name.to_string(), new_name.clone());
        new_name
    }
}

/// Rename synthesized definitions and every reference to them.
///
/// `taken` lists the names that cannot be reused: built-ins and every
/// user-declared name, including generics dropped from `defs`. Names of the
/// non-synthetic definitions in `defs` are reserved as well.
pub fn standardize<'b>(
    defs: Vec<TypeDef>,
    origins: &mut OriginMap,
    prefix: &str,
    taken: impl IntoIterator<Item = &'b str>,
) -> Vec<TypeDef> {
    let mut reserved: HashSet<String> = taken.into_iter().map(str::to_string).collect();
    reserved.extend(
        defs.iter()
            .filter(|d| !is_synthetic(&d.name))
            .map(|d| d.name.clone()),
    );

    let mut renamer = Renamer {
        prefix,
        reserved,
        mapping: HashMap::new(),
        counter: 0,
    };

    // Names first, so numbering follows output order rather than the order
    // references happen to appear in bodies.
    for def in &defs {
        renamer.rename(&def.name);
    }

    let defs = defs
        .into_iter()
        .map(|def| TypeDef {
            name: renamer.rename(&def.name),
            body: rename_types(&def.body, &mut |n: &str| renamer.rename(n)),
            ..def
        })
        .collect();

    for (old, new) in &renamer.mapping {
        if let Some(origin) = origins.remove(old) {
            origins.insert(new.clone(), origin);
        }
    }

    defs
}
