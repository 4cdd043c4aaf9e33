//! Scope frames and the frame stack used for symbol resolution.
//!
//! A [`SymbolTable`] is one frame: a name-to-value map backed by
//! [`ChainedHashMap`]. The [`Environment`] is the stack of frames owned by an
//! evaluator. Frame 0 is the global frame, seeded with every builtin name bound
//! to itself; local frames are pushed for each procedure call. Lookup walks from
//! the innermost frame outwards, so inner bindings shadow outer ones.

use std::collections::BTreeMap;
use std::fmt;

use crate::Error;
use crate::ast::{Value, sym};
use crate::builtinops::{builtin_names, find_builtin_op};
use crate::hashtable::{ChainedHashMap, DEFAULT_BUCKETS};

/// Bucket count of the global frame
pub const GLOBAL_BUCKETS: usize = DEFAULT_BUCKETS;

/// Bucket count of frames pushed for procedure calls
pub const LOCAL_BUCKETS: usize = 61;

/// Lifecycle flavor of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Created once per evaluator, pre-populated with the builtin names
    Global,
    /// Created empty for a procedure call and discarded when it returns
    Local,
}

/// One scope frame
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scope: Scope,
    entries: ChainedHashMap<String, Value>,
}

impl SymbolTable {
    /// The global frame. Every builtin name is bound to a symbol of the same
    /// name, so that a user `define` of a builtin name is rejected.
    pub fn global() -> Self {
        let mut table = SymbolTable {
            scope: Scope::Global,
            entries: ChainedHashMap::with_buckets(GLOBAL_BUCKETS),
        };
        for name in builtin_names() {
            table.entries.insert(name.to_owned(), sym(name));
        }
        table
    }

    /// An empty local frame
    pub fn local() -> Self {
        SymbolTable {
            scope: Scope::Local,
            entries: ChainedHashMap::with_buckets(LOCAL_BUCKETS),
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Bind a new name. A name already present in this frame is never replaced.
    pub fn insert(&mut self, name: &str, value: Value) -> Result<(), Error> {
        if self.entries.insert(name.to_owned(), value) {
            Ok(())
        } else {
            Err(Error::DuplicateDefinition(name.to_owned()))
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bindings in bucket order. Every present name appears exactly once.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// One `name: value` line per binding, in iteration order
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

/// The frame stack. Always holds the global frame at index 0.
#[derive(Debug, Clone)]
pub struct Environment {
    frames: Vec<SymbolTable>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            frames: vec![SymbolTable::global()],
        }
    }

    /// Resolve a name, innermost frame first
    pub fn lookup(&self, name: &str) -> Result<&Value, Error> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.lookup(name))
            .ok_or_else(|| Error::UnboundSymbol(name.to_owned()))
    }

    /// Bind into the innermost frame only. Shadowing an outer binding is fine;
    /// rebinding a name of the same frame is a [`Error::DuplicateDefinition`].
    pub fn define_in_current(&mut self, name: &str, value: Value) -> Result<(), Error> {
        self.current_mut().insert(name, value)
    }

    pub fn push_frame(&mut self) {
        self.frames.push(SymbolTable::local());
        tracing::trace!(frames = self.frames.len(), "push frame");
    }

    /// Clear and drop the innermost local frame. The global frame is never popped.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1
            && let Some(mut frame) = self.frames.pop()
        {
            frame.clear();
            tracing::trace!(frames = self.frames.len(), "pop frame");
        }
    }

    /// Number of frames, global included
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn global(&self) -> &SymbolTable {
        &self.frames[0]
    }

    pub fn current(&self) -> &SymbolTable {
        // `frames` is never empty
        &self.frames[self.frames.len() - 1]
    }

    fn current_mut(&mut self) -> &mut SymbolTable {
        let top = self.frames.len() - 1;
        &mut self.frames[top]
    }

    /// All visible bindings sorted by name, innermost binding winning.
    /// Builtin sentinels of the global frame are left out.
    pub fn bindings(&self) -> Vec<(String, Value)> {
        let mut visible = BTreeMap::new();
        for frame in &self.frames {
            for (name, value) in frame.iter() {
                if frame.scope() == Scope::Global && find_builtin_op(name).is_some() {
                    continue;
                }
                visible.insert(name.to_owned(), value.clone());
            }
        }
        visible.into_iter().collect()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::ast::val;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_global_frame_is_seeded_with_builtins() {
        let global = SymbolTable::global();
        assert_eq!(global.scope(), Scope::Global);
        assert_eq!(global.len(), builtin_names().count());
        for name in ["+", "quote", "lambda", "let", "procedurep", "<"] {
            assert_eq!(global.lookup(name), Some(&sym(name)), "builtin {name}");
        }
        assert!(SymbolTable::local().is_empty());
    }

    #[test]
    fn test_insert_once() {
        let mut table = SymbolTable::local();
        table.insert("x", val(1)).unwrap();
        assert_eq!(
            table.insert("x", val(2)),
            Err(Error::DuplicateDefinition("x".to_owned()))
        );
        assert_eq!(table.lookup("x"), Some(&val(1)));

        table.clear();
        assert!(!table.contains("x"));
        table.insert("x", val(3)).unwrap();
        assert_eq!(table.dump(), "x: 3\n");
    }

    #[test]
    fn test_dump_lists_every_binding() {
        let mut table = SymbolTable::local();
        assert_eq!(table.dump(), "");
        table.insert("xs", val([1, 2])).unwrap();
        table.insert("y", val(2.5)).unwrap();

        let dump = table.dump();
        assert_eq!(dump, table.to_string());
        let mut lines: Vec<&str> = dump.lines().collect();
        lines.sort_unstable();
        assert_eq!(lines, vec!["xs: (1 2)", "y: 2.5"]);

        let global = SymbolTable::global().dump();
        assert_eq!(global.lines().count(), builtin_names().count());
        assert!(global.lines().any(|line| line == "car: car"));
    }

    #[test]
    fn test_builtin_names_cannot_be_redefined() {
        let mut env = Environment::new();
        for name in builtin_names() {
            assert_eq!(
                env.define_in_current(name, val(0)),
                Err(Error::DuplicateDefinition(name.to_owned()))
            );
        }
    }

    #[test]
    fn test_shadowing_and_restore() {
        let mut env = Environment::new();
        env.define_in_current("x", val(1)).unwrap();

        env.push_frame();
        assert_eq!(env.depth(), 2);
        assert_eq!(env.lookup("x").unwrap(), &val(1));
        env.define_in_current("x", val(2)).unwrap();
        assert_eq!(env.lookup("x").unwrap(), &val(2));
        env.define_in_current("y", val(3)).unwrap();
        env.pop_frame();

        assert_eq!(env.depth(), 1);
        assert_eq!(env.lookup("x").unwrap(), &val(1));
        assert_eq!(
            env.lookup("y"),
            Err(Error::UnboundSymbol("y".to_owned()))
        );
    }

    #[test]
    fn test_global_frame_is_never_popped() {
        let mut env = Environment::new();
        env.pop_frame();
        env.pop_frame();
        assert_eq!(env.depth(), 1);
        assert_eq!(env.lookup("car").unwrap(), &sym("car"));
        assert_eq!(env.current().scope(), Scope::Global);
    }

    #[test]
    fn test_bindings_prefer_innermost() {
        let mut env = Environment::new();
        assert!(env.bindings().is_empty());

        env.define_in_current("b", val(1)).unwrap();
        env.define_in_current("a", val(2)).unwrap();
        env.push_frame();
        env.define_in_current("b", val(10)).unwrap();

        assert_eq!(
            env.bindings(),
            vec![("a".to_owned(), val(2)), ("b".to_owned(), val(10))]
        );
        assert_eq!(env.global().len(), builtin_names().count() + 2);
    }
}
