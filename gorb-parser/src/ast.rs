use std::fmt;

/// The four value types of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Int,
    Float,
    Bool,
    String,
}

impl PrimitiveType {
    pub fn is_numeric(self) -> bool {
        matches!(self, PrimitiveType::Int | PrimitiveType::Float)
    }

    /// Whether a value of type `self` can be stored where `target` is expected.
    /// The only implicit conversion is `int` to `float`.
    pub fn coerces_to(self, target: PrimitiveType) -> bool {
        self == target || (self == PrimitiveType::Int && target == PrimitiveType::Float)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveType::Int => "int",
            PrimitiveType::Float => "float",
            PrimitiveType::Bool => "bool",
            PrimitiveType::String => "string",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
    And,
    Or,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
            BinOp::Gt => ">",
            BinOp::Lt => "<",
            BinOp::Ge => ">=",
            BinOp::Le => "<=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }

    /// `+ - * / ^`
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Pow
        )
    }

    /// `> < >= <=`
    pub fn is_relational(self) -> bool {
        matches!(self, BinOp::Gt | BinOp::Lt | BinOp::Ge | BinOp::Le)
    }

    /// `== !=`
    pub fn is_equality(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::Ne)
    }

    /// `&& ||`
    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLit {
        value: i32,
        line: usize,
    },
    FloatLit {
        value: f64,
        line: usize,
    },
    BoolLit {
        value: bool,
        line: usize,
    },
    /// The content of a string literal, without quotes.
    StringLit {
        value: String,
        line: usize,
    },
    /// A variable reference (e.g. `foo`).
    Variable {
        name: String,
        line: usize,
    },
    /// A binary expression (e.g. `1+1`). Unary minus is `0 - arg`.
    Binary {
        lhs: Box<Expr>,
        op: BinOp,
        rhs: Box<Expr>,
        line: usize,
    },
    /// Logical negation (e.g. `!done`).
    Not {
        arg: Box<Expr>,
        line: usize,
    },
    /// A function call (e.g. `area(2.0)`).
    Call {
        name: String,
        args: Vec<Expr>,
        line: usize,
    },
}

impl Expr {
    pub fn line(&self) -> usize {
        match self {
            Expr::IntLit { line, .. }
            | Expr::FloatLit { line, .. }
            | Expr::BoolLit { line, .. }
            | Expr::StringLit { line, .. }
            | Expr::Variable { line, .. }
            | Expr::Binary { line, .. }
            | Expr::Not { line, .. }
            | Expr::Call { line, .. } => *line,
        }
    }

    /// Whether this is the literal `0` or `0.0`.
    pub fn is_zero_literal(&self) -> bool {
        match self {
            Expr::IntLit { value, .. } => *value == 0,
            Expr::FloatLit { value, .. } => *value == 0.0,
            _ => false,
        }
    }
}

/// Fully parenthesized rendering, mostly useful for tests and debugging.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntLit { value, .. } => write!(f, "{}", value),
            Expr::FloatLit { value, .. } => write!(f, "{:?}", value),
            Expr::BoolLit { value, .. } => write!(f, "{}", value),
            Expr::StringLit { value, .. } => write!(f, "\"{}\"", value),
            Expr::Variable { name, .. } => f.write_str(name),
            Expr::Binary { lhs, op, rhs, .. } => write!(f, "({} {} {})", lhs, op, rhs),
            Expr::Not { arg, .. } => write!(f, "!{}", arg),
            Expr::Call { name, args, .. } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A `var`, `const` or parameter declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    /// Always present for parameters and `var`. Optional for `const`.
    pub declared_type: Option<PrimitiveType>,
    pub initializer: Option<Expr>,
    pub is_constant: bool,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunDecl {
    pub name: String,
    pub return_type: PrimitiveType,
    pub params: Vec<VarDecl>,
    pub body: Block,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl(VarDecl),
    FunDecl(FunDecl),
    Assign {
        name: String,
        value: Expr,
        line: usize,
    },
    Print {
        expr: Expr,
        line: usize,
    },
    Input {
        target: String,
        line: usize,
    },
    If {
        condition: Expr,
        then_branch: Block,
        /// Either a [`Stmt::Block`] or a nested [`Stmt::If`] for `else if`.
        else_branch: Option<Box<Stmt>>,
        line: usize,
    },
    While {
        condition: Expr,
        body: Block,
        line: usize,
    },
    Block(Block),
    Return {
        value: Expr,
        line: usize,
    },
    Expr {
        expr: Expr,
        line: usize,
    },
}

impl Stmt {
    pub fn line(&self) -> usize {
        match self {
            Stmt::VarDecl(decl) => decl.line,
            Stmt::FunDecl(decl) => decl.line,
            Stmt::Block(block) => block.line,
            Stmt::Assign { line, .. }
            | Stmt::Print { line, .. }
            | Stmt::Input { line, .. }
            | Stmt::If { line, .. }
            | Stmt::While { line, .. }
            | Stmt::Return { line, .. }
            | Stmt::Expr { line, .. } => *line,
        }
    }
}

/// A whole source file.
pub type Program = Vec<Stmt>;
