//! Postfix machine modules and their textual format.

use gorb_parser::ast::PrimitiveType;
use std::fmt;

/// The token class of an instruction, as understood by the postfix machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Int,
    Float,
    Bool,
    String,
    /// A variable that is about to be assigned.
    LVal,
    /// A variable whose value is pushed.
    RVal,
    AssignOp,
    MathOp,
    RelOp,
    BoolOp,
    CatOp,
    Conv,
    OutOp,
    InpOp,
    Label,
    Colon,
    Jf,
    Jump,
    Call,
    RetOp,
    StackOp,
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenClass::Int => "int",
            TokenClass::Float => "float",
            TokenClass::Bool => "bool",
            TokenClass::String => "string",
            TokenClass::LVal => "l-val",
            TokenClass::RVal => "r-val",
            TokenClass::AssignOp => "assign_op",
            TokenClass::MathOp => "math_op",
            TokenClass::RelOp => "rel_op",
            TokenClass::BoolOp => "bool_op",
            TokenClass::CatOp => "cat_op",
            TokenClass::Conv => "conv",
            TokenClass::OutOp => "out_op",
            TokenClass::InpOp => "inp_op",
            TokenClass::Label => "label",
            TokenClass::Colon => "colon",
            TokenClass::Jf => "jf",
            TokenClass::Jump => "jump",
            TokenClass::Call => "CALL",
            TokenClass::RetOp => "ret_op",
            TokenClass::StackOp => "stack_op",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub lexeme: String,
    pub token: TokenClass,
}

impl Instruction {
    pub fn new(lexeme: impl Into<String>, token: TokenClass) -> Self {
        Self {
            lexeme: lexeme.into(),
            token,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.lexeme, self.token)
    }
}

/// An entry of the `.funcs` section.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncRef {
    pub name: String,
    pub return_type: PrimitiveType,
    pub arity: usize,
}

impl fmt::Display for FuncRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.return_type, self.arity)
    }
}

/// One `.postfix` file: the main program or a single function.
#[derive(Debug, Clone, PartialEq)]
pub struct PostfixModule {
    pub name: String,
    /// Parameters and locals in declaration order, with unique names.
    pub vars: Vec<(String, PrimitiveType)>,
    /// Variables of enclosing modules used by this one.
    pub globals: Vec<String>,
    /// Functions called from this module.
    pub funcs: Vec<FuncRef>,
    /// Label names and the offset of their marker in `code`.
    pub labels: Vec<(String, usize)>,
    pub code: Vec<Instruction>,
}

impl PostfixModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: Vec::new(),
            globals: Vec::new(),
            funcs: Vec::new(),
            labels: Vec::new(),
            code: Vec::new(),
        }
    }

    pub fn var(&self, name: &str) -> Option<PrimitiveType> {
        self.vars
            .iter()
            .find(|(var, _)| var == name)
            .map(|(_, ty)| *ty)
    }
}

impl fmt::Display for PostfixModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ".target: Postfix Machine")?;
        writeln!(f, ".version: 0.2")?;
        writeln!(f)?;

        if !self.vars.is_empty() {
            writeln!(f, ".vars(")?;
            for (name, ty) in &self.vars {
                writeln!(f, "    {} {}", name, ty)?;
            }
            writeln!(f, ")")?;
            writeln!(f)?;
        }

        if !self.globals.is_empty() {
            writeln!(f, ".globVarList(")?;
            for name in &self.globals {
                writeln!(f, "    {}", name)?;
            }
            writeln!(f, ")")?;
            writeln!(f)?;
        }

        if !self.funcs.is_empty() {
            writeln!(f, ".funcs(")?;
            for func in &self.funcs {
                writeln!(f, "    {}", func)?;
            }
            writeln!(f, ")")?;
            writeln!(f)?;
        }

        if !self.labels.is_empty() {
            writeln!(f, ".labels(")?;
            for (name, offset) in &self.labels {
                writeln!(f, "    {} {}", name, offset)?;
            }
            writeln!(f, ")")?;
            writeln!(f)?;
        }

        writeln!(f, ".code(")?;
        for instr in &self.code {
            writeln!(f, "    {}", instr)?;
        }
        writeln!(f, ")")
    }
}

/// All modules of a program. The main module comes first, functions follow depth first.
#[derive(Debug, Clone, PartialEq)]
pub struct PostfixProgram {
    pub modules: Vec<PostfixModule>,
}

impl PostfixProgram {
    pub fn main(&self) -> Option<&PostfixModule> {
        self.modules.first()
    }

    pub fn module(&self, name: &str) -> Option<&PostfixModule> {
        self.modules.iter().find(|module| module.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_module_display() {
        let mut module = PostfixModule::new("main");
        module.vars.push(("x".to_string(), PrimitiveType::Int));
        module.labels.push(("m1".to_string(), 3));
        module.code = vec![
            Instruction::new("x", TokenClass::LVal),
            Instruction::new("1", TokenClass::Int),
            Instruction::new(":=", TokenClass::AssignOp),
            Instruction::new("m1", TokenClass::Label),
            Instruction::new(":", TokenClass::Colon),
        ];
        assert_snapshot!(module.to_string(), @r###"
        .target: Postfix Machine
        .version: 0.2

        .vars(
            x int
        )

        .labels(
            m1 3
        )

        .code(
            x l-val
            1 int
            := assign_op
            m1 label
            : colon
        )
        "###);
    }

    #[test]
    fn test_empty_module_has_code_section() {
        assert_eq!(
            PostfixModule::new("main").to_string(),
            ".target: Postfix Machine\n.version: 0.2\n\n.code(\n)\n"
        );
    }

    #[test]
    fn test_func_ref_display() {
        let func = FuncRef {
            name: "area".to_string(),
            return_type: PrimitiveType::Float,
            arity: 1,
        };
        assert_eq!(func.to_string(), "area float 1");
        assert_eq!(Instruction::new("f", TokenClass::Call).to_string(), "f CALL");
    }
}
