//! Identifier interning.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Stores every name seen so far, one allocation per distinct spelling.
#[derive(Debug)]
pub struct Interner(HashSet<Symbol>);

impl Interner {
    pub fn new() -> Interner {
        Interner(HashSet::new())
    }

    /// Maps a spelling to its unique symbol, allocating on first sight.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(sym) = self.0.get(name) {
            sym.clone()
        } else {
            let sym = Symbol(Rc::from(name));
            self.0.insert(sym.clone());
            sym
        }
    }
}

/// An interned name.  Two symbols with the same spelling share one
/// allocation, so equality is a pointer comparison.
#[derive(Debug, Hash, Clone)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_from_string() {
        let mut interner = Interner::new();
        let sym = interner.intern("foo");
        assert_eq!(sym.name(), "foo");
    }

    #[test]
    fn symbols_with_same_spelling_are_equal() {
        let mut interner = Interner::new();
        let sym1 = interner.intern("foo");
        let sym2 = interner.intern("foo");
        assert_eq!(sym1, sym2);
    }

    #[test]
    fn symbols_with_different_spellings_are_different() {
        let mut interner = Interner::new();
        let sym1 = interner.intern("foo");
        let sym2 = interner.intern("bar");
        assert_ne!(sym1, sym2);
    }
}
