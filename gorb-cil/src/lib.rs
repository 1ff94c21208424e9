//! CIL assembly backend.

pub mod codegen;
pub mod emit;
pub mod instr;

pub use codegen::{generate, CilGenerator};
pub use instr::{CilAssembly, CilType, Instr, Label, Method, MethodRef};
