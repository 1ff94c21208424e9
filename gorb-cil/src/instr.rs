//! Definitions for [`Instr`], [`Method`] and [`CilAssembly`].

use gorb_parser::ast::PrimitiveType;

/// A CIL value type as written in signatures and field declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CilType {
    Int32,
    Float32,
    Bool,
    String,
    Void,
}

impl CilType {
    /// Name of the `System` value type used when boxing.
    pub fn box_name(self) -> &'static str {
        match self {
            CilType::Int32 => "Int32",
            CilType::Float32 => "Single",
            CilType::Bool => "Boolean",
            CilType::String => "String",
            CilType::Void => "Object",
        }
    }
}

impl From<PrimitiveType> for CilType {
    fn from(ty: PrimitiveType) -> Self {
        match ty {
            PrimitiveType::Int => CilType::Int32,
            PrimitiveType::Float => CilType::Float32,
            PrimitiveType::Bool => CilType::Bool,
            PrimitiveType::String => CilType::String,
        }
    }
}

/// A jump target. Rendered as `L<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label(pub u32);

/// The target of a `call` instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRef {
    pub return_type: String,
    /// Declaring type, e.g. `Program` or `[mscorlib]System.Console`.
    pub owner: String,
    pub name: String,
    pub params: Vec<String>,
}

impl MethodRef {
    /// A method of the generated `Program` class.
    pub fn program(name: &str, return_type: CilType, params: &[CilType]) -> Self {
        Self {
            return_type: return_type.to_string(),
            owner: "Program".to_string(),
            name: name.to_string(),
            params: params.iter().map(|ty| ty.to_string()).collect(),
        }
    }

    /// A method of `[mscorlib]System.<class>`.
    pub fn mscorlib(return_type: &str, class: &str, name: &str, params: &[&str]) -> Self {
        Self {
            return_type: return_type.to_string(),
            owner: format!("[mscorlib]System.{}", class),
            name: name.to_string(),
            params: params.iter().map(|param| param.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    LdcI4(i32),
    LdcR4(f64),
    /// `ldc.i4.1` or `ldc.i4.0`.
    LdcBool(bool),
    Ldstr(String),
    Ldarg(String),
    Starg(String),
    Ldloc(String),
    Stloc(String),
    /// Loads a static field of `Program`.
    Ldsfld {
        ty: CilType,
        name: String,
    },
    Stsfld {
        ty: CilType,
        name: String,
    },
    Add,
    Sub,
    Mul,
    Div,
    Cgt,
    Clt,
    Ceq,
    And,
    Or,
    ConvR4,
    ConvR8,
    ConvI4,
    Box(CilType),
    Call(MethodRef),
    Br(Label),
    Brfalse(Label),
    /// Marks the position of a [`Label`]. Not an instruction by itself.
    Label(Label),
    Pop,
    Ret,
}

/// A static method of `Program`.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub return_type: CilType,
    pub params: Vec<(String, CilType)>,
    /// Local slots in declaration order. Slot names are unique within the method.
    pub locals: Vec<(String, CilType)>,
    pub body: Vec<Instr>,
    pub is_entry_point: bool,
}

impl Method {
    pub fn new(name: impl Into<String>, return_type: CilType, params: Vec<(String, CilType)>) -> Self {
        Self {
            name: name.into(),
            return_type,
            params,
            locals: Vec::new(),
            body: Vec::new(),
            is_entry_point: false,
        }
    }

    /// The `Main(string[] args)` entry point.
    pub fn entry_point() -> Self {
        Self {
            is_entry_point: true,
            ..Self::new("Main", CilType::Void, Vec::new())
        }
    }

    pub fn ends_with_ret(&self) -> bool {
        matches!(self.body.last(), Some(Instr::Ret))
    }
}

/// A whole `.il` file: one `Program` class.
#[derive(Debug, Clone, PartialEq)]
pub struct CilAssembly {
    pub module: String,
    pub fields: Vec<(String, CilType)>,
    /// Functions in declaration order.
    pub methods: Vec<Method>,
    pub main: Method,
}

impl CilAssembly {
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn field(&self, name: &str) -> Option<CilType> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, ty)| *ty)
    }
}
