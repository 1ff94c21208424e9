//! Passes over the syntax tree.

pub mod analyze;

pub use analyze::{analyze, Analyzer, FunctionSignature, FunctionTable, Symbol};
