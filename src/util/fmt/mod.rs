/// Human-readable diagnostics.
pub mod error;

/// Parseable B-Minor output, used to inspect and round-trip trees.
pub mod source;

/// Indented debug trees, with spans.
pub mod tree;
