//! Postfix machine backend.

pub mod codegen;
pub mod module;

pub use codegen::{generate, PostfixGenerator};
pub use module::{FuncRef, Instruction, PostfixModule, PostfixProgram, TokenClass};
