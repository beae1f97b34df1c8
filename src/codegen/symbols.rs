use std::collections::HashMap;

use crate::ast::TypeKind;

/// Flat map from names to the kind of their (element) type.
///
/// There is no scoping: a later declaration of the same name overwrites the
/// earlier one, wherever it appears. Names never declared look up as
/// [`TypeKind::Integer`].
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<Box<str>, TypeKind>,
}

impl SymbolTable {
    pub fn with_capacity(capacity: usize) -> SymbolTable {
        SymbolTable {
            symbols: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert_or_update(&mut self, name: &str, kind: TypeKind) {
        if let Some(existing) = self.symbols.get_mut(name) {
            *existing = kind;
        } else {
            self.symbols.insert(Box::from(name), kind);
        }
    }

    pub fn lookup(&self, name: &str) -> TypeKind {
        self.symbols
            .get(name)
            .copied()
            .unwrap_or(TypeKind::Integer)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_defaults_to_integer() {
        let table = SymbolTable::default();
        assert_eq!(table.lookup("missing"), TypeKind::Integer);
        assert!(table.is_empty());
    }

    #[test]
    fn test_insert_then_overwrite() {
        let mut table = SymbolTable::with_capacity(4);
        table.insert_or_update("name", TypeKind::String);
        assert_eq!(table.lookup("name"), TypeKind::String);

        table.insert_or_update("name", TypeKind::Char);
        assert_eq!(table.lookup("name"), TypeKind::Char);
        assert_eq!(table.len(), 1);
    }
}
