//! Scope and type checking pass.

use std::collections::HashMap;

use gorb_parser::ast::{BinOp, Block, Expr, FunDecl, PrimitiveType, Stmt, VarDecl};
use gorb_source::{CompileError, CompileResult};
use log::{debug, trace};

/// A variable or constant binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Symbol {
    pub ty: PrimitiveType,
    pub is_const: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub return_type: PrimitiveType,
    pub param_types: Vec<PrimitiveType>,
}

impl FunctionSignature {
    pub fn arity(&self) -> usize {
        self.param_types.len()
    }
}

/// Every function of a program, nested ones included, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionTable {
    functions: HashMap<String, FunctionSignature>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registers `name`. Returns `false` and leaves the table untouched if it already exists.
    pub fn declare(&mut self, name: impl Into<String>, signature: FunctionSignature) -> bool {
        let name = name.into();
        if self.functions.contains_key(&name) {
            return false;
        }
        self.functions.insert(name, signature);
        true
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FunctionSignature)> {
        self.functions.iter().map(|(name, sig)| (name.as_str(), sig))
    }
}

/// Semantic analysis pass. Stops at the first error.
pub struct Analyzer {
    /// Lexical frames, innermost last. The first one is the global frame and is never popped.
    scopes: Vec<HashMap<String, Symbol>>,
    functions: FunctionTable,
    /// The function whose body is being checked.
    current_function: Option<FunctionContext>,
}

#[derive(Debug, Clone)]
struct FunctionContext {
    name: String,
    return_type: PrimitiveType,
    /// Index of the frame holding the parameters.
    frame_base: usize,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
            functions: FunctionTable::new(),
            current_function: None,
        }
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn into_function_table(self) -> FunctionTable {
        self.functions
    }

    pub fn analyze_program(&mut self, program: &[Stmt]) -> CompileResult<()> {
        for stmt in program {
            self.analyze_stmt(stmt)?;
        }
        debug!(
            "analysis done: {} functions, {} globals",
            self.functions.len(),
            self.scopes[0].len()
        );
        Ok(())
    }

    fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
        trace!("enter scope (depth {})", self.scopes.len());
    }

    fn exit_scope(&mut self) {
        trace!("exit scope (depth {})", self.scopes.len());
        self.scopes.pop();
    }

    /// Resolves `name` from the innermost frame outwards.
    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Resolves a variable use. Inside a function only its own frames and the global frame
    /// are reachable.
    fn resolve(&self, name: &str, line: usize) -> CompileResult<Symbol> {
        let base = self
            .current_function
            .as_ref()
            .map_or(0, |function| function.frame_base);
        if let Some(symbol) = self.scopes[base..].iter().rev().find_map(|frame| frame.get(name)) {
            return Ok(*symbol);
        }
        if let Some(function) = &self.current_function {
            if self.scopes[1..base].iter().any(|frame| frame.contains_key(name)) {
                return Err(CompileError::semantic(
                    line,
                    format!(
                        "function `{}` cannot use `{}` declared outside of it: only globals are shared",
                        function.name, name
                    ),
                ));
            }
            if let Some(symbol) = self.scopes[0].get(name) {
                return Ok(*symbol);
            }
        }
        Err(CompileError::semantic(
            line,
            format!("undefined variable `{}`", name),
        ))
    }

    fn declare_variable(&mut self, name: &str, symbol: Symbol, line: usize) -> CompileResult<()> {
        if self.functions.contains(name) {
            return Err(CompileError::semantic(
                line,
                format!("`{}` is already declared as a function", name),
            ));
        }
        let frame = self
            .scopes
            .last_mut()
            .ok_or_else(|| CompileError::semantic(line, "no open scope"))?;
        if frame.contains_key(name) {
            return Err(CompileError::semantic(
                line,
                format!("variable `{}` is already declared in this scope", name),
            ));
        }
        trace!("declare `{}`: {:?}", name, symbol);
        frame.insert(name.to_string(), symbol);
        Ok(())
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::VarDecl(decl) => self.analyze_var_decl(decl),
            Stmt::FunDecl(decl) => self.analyze_fun_decl(decl),
            Stmt::Assign { name, value, line } => {
                let symbol = self.resolve(name, *line)?;
                if symbol.is_const {
                    return Err(CompileError::semantic(
                        *line,
                        format!("cannot assign to constant `{}`", name),
                    ));
                }
                let value_ty = self.infer_expr(value)?;
                if !value_ty.coerces_to(symbol.ty) {
                    return Err(CompileError::semantic(
                        *line,
                        format!(
                            "type mismatch: cannot assign {} to `{}` of type {}",
                            value_ty, name, symbol.ty
                        ),
                    ));
                }
                Ok(())
            }
            Stmt::Print { expr, .. } => self.infer_expr(expr).map(|_| ()),
            Stmt::Input { target, line } => {
                let symbol = self.resolve(target, *line)?;
                if symbol.is_const {
                    return Err(CompileError::semantic(
                        *line,
                        format!("cannot read input into constant `{}`", target),
                    ));
                }
                Ok(())
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                line,
            } => {
                self.check_condition("if", condition, *line)?;
                self.analyze_block(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.analyze_stmt(else_branch)?;
                }
                Ok(())
            }
            Stmt::While {
                condition,
                body,
                line,
            } => {
                self.check_condition("while", condition, *line)?;
                self.analyze_block(body)
            }
            Stmt::Block(block) => self.analyze_block(block),
            Stmt::Return { value, line } => {
                let FunctionContext {
                    name: function,
                    return_type,
                    ..
                } = self.current_function.clone().ok_or_else(|| {
                    CompileError::semantic(*line, "`return` outside of a function")
                })?;
                let value_ty = self.infer_expr(value)?;
                if !value_ty.coerces_to(return_type) {
                    return Err(CompileError::semantic(
                        *line,
                        format!(
                            "function `{}` must return {}, found {}",
                            function, return_type, value_ty
                        ),
                    ));
                }
                Ok(())
            }
            Stmt::Expr { expr, .. } => self.infer_expr(expr).map(|_| ()),
        }
    }

    fn analyze_block(&mut self, block: &Block) -> CompileResult<()> {
        self.enter_scope();
        for stmt in &block.statements {
            self.analyze_stmt(stmt)?;
        }
        self.exit_scope();
        Ok(())
    }

    fn analyze_var_decl(&mut self, decl: &VarDecl) -> CompileResult<()> {
        let ty = if decl.is_constant {
            // the annotation of a constant is not checked against its initializer
            let initializer = decl.initializer.as_ref().ok_or_else(|| {
                CompileError::semantic(
                    decl.line,
                    format!("constant `{}` must be initialized", decl.name),
                )
            })?;
            self.infer_expr(initializer)?
        } else {
            let declared = decl.declared_type.ok_or_else(|| {
                CompileError::semantic(
                    decl.line,
                    format!("variable `{}` needs a type", decl.name),
                )
            })?;
            if let Some(initializer) = &decl.initializer {
                let init_ty = self.infer_expr(initializer)?;
                if !init_ty.coerces_to(declared) {
                    return Err(CompileError::semantic(
                        decl.line,
                        format!(
                            "type mismatch: cannot initialize `{}` of type {} with {}",
                            decl.name, declared, init_ty
                        ),
                    ));
                }
            }
            declared
        };

        self.declare_variable(
            &decl.name,
            Symbol {
                ty,
                is_const: decl.is_constant,
            },
            decl.line,
        )
    }

    fn analyze_fun_decl(&mut self, decl: &FunDecl) -> CompileResult<()> {
        if self.functions.contains(&decl.name) {
            return Err(CompileError::semantic(
                decl.line,
                format!("function `{}` is already declared", decl.name),
            ));
        }
        if self.lookup(&decl.name).is_some() {
            return Err(CompileError::semantic(
                decl.line,
                format!("function `{}` conflicts with variable `{}`", decl.name, decl.name),
            ));
        }

        let mut param_types = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let ty = param.declared_type.ok_or_else(|| {
                CompileError::semantic(
                    param.line,
                    format!("parameter `{}` needs a type", param.name),
                )
            })?;
            param_types.push(ty);
        }

        // registered before the body so that the function can call itself
        self.functions.declare(
            decl.name.clone(),
            FunctionSignature {
                return_type: decl.return_type,
                param_types: param_types.clone(),
            },
        );
        debug!(
            "registered function `{}`({}) -> {}",
            decl.name,
            param_types.len(),
            decl.return_type
        );

        let enclosing = self.current_function.replace(FunctionContext {
            name: decl.name.clone(),
            return_type: decl.return_type,
            frame_base: self.scopes.len(),
        });

        // parameters and the top level of the body share one frame
        self.enter_scope();
        for (param, ty) in decl.params.iter().zip(param_types) {
            self.declare_variable(
                &param.name,
                Symbol {
                    ty,
                    is_const: false,
                },
                param.line,
            )?;
        }
        for stmt in &decl.body.statements {
            self.analyze_stmt(stmt)?;
        }
        self.exit_scope();

        self.current_function = enclosing;
        Ok(())
    }

    fn check_condition(&self, keyword: &str, condition: &Expr, line: usize) -> CompileResult<()> {
        let ty = self.infer_expr(condition)?;
        if ty != PrimitiveType::Bool {
            return Err(CompileError::semantic(
                line,
                format!("condition of `{}` must be bool, found {}", keyword, ty),
            ));
        }
        Ok(())
    }

    /// Computes the static type of `expr` in the current scope.
    pub fn infer_expr(&self, expr: &Expr) -> CompileResult<PrimitiveType> {
        match expr {
            Expr::IntLit { .. } => Ok(PrimitiveType::Int),
            Expr::FloatLit { .. } => Ok(PrimitiveType::Float),
            Expr::BoolLit { .. } => Ok(PrimitiveType::Bool),
            Expr::StringLit { .. } => Ok(PrimitiveType::String),
            Expr::Variable { name, line } => self.resolve(name, *line).map(|symbol| symbol.ty),
            Expr::Binary { lhs, op, rhs, line } => {
                let lhs_ty = self.infer_expr(lhs)?;
                let rhs_ty = self.infer_expr(rhs)?;
                binary_type(*op, lhs_ty, rhs_ty, rhs, *line)
            }
            Expr::Not { arg, line } => {
                let ty = self.infer_expr(arg)?;
                if ty != PrimitiveType::Bool {
                    return Err(CompileError::semantic(
                        *line,
                        format!("operator `!` expects a bool operand, found {}", ty),
                    ));
                }
                Ok(PrimitiveType::Bool)
            }
            Expr::Call { name, args, line } => {
                let signature = self.functions.get(name).ok_or_else(|| {
                    CompileError::semantic(*line, format!("undefined function `{}`", name))
                })?;
                if signature.arity() != args.len() {
                    return Err(CompileError::semantic(
                        *line,
                        format!(
                            "function `{}` expects {} arguments, found {}",
                            name,
                            signature.arity(),
                            args.len()
                        ),
                    ));
                }
                for (i, (arg, &param_ty)) in args.iter().zip(&signature.param_types).enumerate() {
                    let arg_ty = self.infer_expr(arg)?;
                    if !arg_ty.coerces_to(param_ty) {
                        return Err(CompileError::semantic(
                            *line,
                            format!(
                                "argument {} of `{}` expects {}, found {}",
                                i + 1,
                                name,
                                param_ty,
                                arg_ty
                            ),
                        ));
                    }
                }
                Ok(signature.return_type)
            }
        }
    }
}

/// Result type of a binary operator, given already inferred operand types.
fn binary_type(
    op: BinOp,
    lhs: PrimitiveType,
    rhs: PrimitiveType,
    rhs_expr: &Expr,
    line: usize,
) -> CompileResult<PrimitiveType> {
    let operands_error = |expected: &str| {
        CompileError::semantic(
            line,
            format!(
                "operator `{}` expects {} operands, found {} and {}",
                op, expected, lhs, rhs
            ),
        )
    };

    match op {
        BinOp::Div => {
            if rhs_expr.is_zero_literal() {
                return Err(CompileError::semantic(line, "division by zero"));
            }
            if !(lhs.is_numeric() && rhs.is_numeric()) {
                return Err(operands_error("numeric"));
            }
            Ok(PrimitiveType::Float)
        }
        BinOp::Add if lhs == PrimitiveType::String || rhs == PrimitiveType::String => {
            Ok(PrimitiveType::String)
        }
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Pow => {
            if !(lhs.is_numeric() && rhs.is_numeric()) {
                return Err(operands_error("numeric"));
            }
            if lhs == PrimitiveType::Float || rhs == PrimitiveType::Float {
                Ok(PrimitiveType::Float)
            } else {
                Ok(PrimitiveType::Int)
            }
        }
        BinOp::Gt | BinOp::Lt | BinOp::Ge | BinOp::Le => {
            if !(lhs.is_numeric() && rhs.is_numeric()) {
                return Err(operands_error("numeric"));
            }
            Ok(PrimitiveType::Bool)
        }
        BinOp::Eq | BinOp::Ne => Ok(PrimitiveType::Bool),
        BinOp::And | BinOp::Or => {
            if lhs != PrimitiveType::Bool || rhs != PrimitiveType::Bool {
                return Err(operands_error("bool"));
            }
            Ok(PrimitiveType::Bool)
        }
    }
}

/// Checks `program` and returns the signatures of all its functions.
pub fn analyze(program: &[Stmt]) -> CompileResult<FunctionTable> {
    let mut analyzer = Analyzer::new();
    analyzer.analyze_program(program)?;
    Ok(analyzer.into_function_table())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gorb_parser::lexer::tokenize;
    use gorb_parser::parser::parse;

    fn check(source: &str) -> CompileResult<FunctionTable> {
        analyze(&parse(tokenize(source).unwrap()).unwrap())
    }

    fn check_err(source: &str) -> CompileError {
        check(source).unwrap_err()
    }

    /// Type of the expression `expr` after declaring the globals in `prelude`.
    fn type_of(prelude: &str, expr: &str) -> CompileResult<PrimitiveType> {
        let mut analyzer = Analyzer::new();
        analyzer
            .analyze_program(&parse(tokenize(prelude).unwrap()).unwrap())
            .unwrap();
        match &parse(tokenize(expr).unwrap()).unwrap()[..] {
            [Stmt::Expr { expr, .. }] => analyzer.infer_expr(expr),
            other => panic!("not an expression: {:?}", other),
        }
    }

    const PRELUDE: &str =
        "var i: int = 1 var f: float = 1.5 var b: bool = true var s: string = \"s\"";

    #[test]
    fn test_literal_types() {
        assert_eq!(type_of("", "1"), Ok(PrimitiveType::Int));
        assert_eq!(type_of("", "1.0"), Ok(PrimitiveType::Float));
        assert_eq!(type_of("", "true"), Ok(PrimitiveType::Bool));
        assert_eq!(type_of("", "\"x\""), Ok(PrimitiveType::String));
    }

    #[test]
    fn test_arithmetic_types() {
        assert_eq!(type_of(PRELUDE, "i + i"), Ok(PrimitiveType::Int));
        assert_eq!(type_of(PRELUDE, "i * f"), Ok(PrimitiveType::Float));
        assert_eq!(type_of(PRELUDE, "i ^ i"), Ok(PrimitiveType::Int));
        assert_eq!(type_of(PRELUDE, "-i"), Ok(PrimitiveType::Int));
        assert_eq!(type_of(PRELUDE, "5 / 2"), Ok(PrimitiveType::Float));
        assert_eq!(type_of(PRELUDE, "i / i"), Ok(PrimitiveType::Float));
    }

    #[test]
    fn test_concatenation() {
        assert_eq!(type_of(PRELUDE, "s + i"), Ok(PrimitiveType::String));
        assert_eq!(type_of(PRELUDE, "b + s"), Ok(PrimitiveType::String));
        assert_eq!(type_of(PRELUDE, "s + f + b"), Ok(PrimitiveType::String));
        assert_eq!(
            type_of(PRELUDE, "s - i"),
            Err(CompileError::semantic(
                1,
                "operator `-` expects numeric operands, found string and int"
            ))
        );
    }

    #[test]
    fn test_comparison_and_logic() {
        assert_eq!(type_of(PRELUDE, "i < f"), Ok(PrimitiveType::Bool));
        assert_eq!(type_of(PRELUDE, "s == i"), Ok(PrimitiveType::Bool));
        assert_eq!(type_of(PRELUDE, "b && i > 0 || !b"), Ok(PrimitiveType::Bool));
        assert!(type_of(PRELUDE, "s < s").is_err());
        assert!(type_of(PRELUDE, "i && b").is_err());
        assert_eq!(
            type_of(PRELUDE, "!i"),
            Err(CompileError::semantic(
                1,
                "operator `!` expects a bool operand, found int"
            ))
        );
    }

    #[test]
    fn test_division_by_literal_zero() {
        assert_eq!(
            check_err("var x: float = 1 / 0"),
            CompileError::semantic(1, "division by zero")
        );
        assert!(check("var x: float = 1 / 0.0").is_err());
        assert!(check("var z: int = 0 var x: float = 1 / z").is_ok());
    }

    #[test]
    fn test_widening() {
        assert!(check("var x: float = 1\nx = 2").is_ok());
        assert_eq!(
            check_err("var x: int = 1\nx = 2.5"),
            CompileError::semantic(2, "type mismatch: cannot assign float to `x` of type int")
        );
        assert_eq!(
            check_err("var x: int = 1.5"),
            CompileError::semantic(
                1,
                "type mismatch: cannot initialize `x` of type int with float"
            )
        );
    }

    #[test]
    fn test_assignment_type_mismatch() {
        assert_eq!(
            check_err("var x: int = 10\n\nx = \"hello\""),
            CompileError::semantic(
                3,
                "type mismatch: cannot assign string to `x` of type int"
            )
        );
    }

    #[test]
    fn test_constants() {
        assert_eq!(
            check_err("const PI = 3.14\nPI = 3.0"),
            CompileError::semantic(2, "cannot assign to constant `PI`")
        );
        assert_eq!(
            check_err("const N = 3\ninput(N)"),
            CompileError::semantic(2, "cannot read input into constant `N`")
        );
        assert!(check("var n: int = 0 input(n)").is_ok());
    }

    #[test]
    fn test_const_annotation_is_not_checked() {
        // known gap: the constant takes the type of its initializer
        assert!(check("const S: int = \"text\"").is_ok());
        assert_eq!(
            type_of("const S: int = \"text\"", "S"),
            Ok(PrimitiveType::String)
        );
    }

    #[test]
    fn test_block_scoping() {
        assert_eq!(
            check_err("{ var x: int = 1 }\nprint(x)"),
            CompileError::semantic(2, "undefined variable `x`")
        );
        assert!(check("var x: int = 1 { x = 2 print(x) }").is_ok());
        // shadowing in an inner block
        assert!(check("var x: int = 1 { var x: string = \"a\" print(x + \"b\") } x = 3").is_ok());
        assert_eq!(
            check_err("var x: int = 1\nvar x: int = 2"),
            CompileError::semantic(2, "variable `x` is already declared in this scope")
        );
    }

    #[test]
    fn test_functions() {
        let table = check(
            "const PI = 3.14\nfun area(r: float) -> float {\n  return PI * r * r\n}\nprint(area(2.0))",
        )
        .unwrap();
        assert_eq!(
            table.get("area"),
            Some(&FunctionSignature {
                return_type: PrimitiveType::Float,
                param_types: vec![PrimitiveType::Float],
            })
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_recursion() {
        assert!(check(
            "fun fact(n: int) -> int { if (n <= 1) { return 1 } return n * fact(n - 1) }"
        )
        .is_ok());
    }

    #[test]
    fn test_forward_reference_is_rejected() {
        assert_eq!(
            check_err("print(later())\nfun later() -> int { return 1 }"),
            CompileError::semantic(1, "undefined function `later`")
        );
    }

    #[test]
    fn test_call_checks() {
        let prelude = "fun f(a: float, b: int) -> int { return b }\n";
        assert!(check(&format!("{}print(f(1, 2))", prelude)).is_ok());
        assert_eq!(
            check_err(&format!("{}print(f(1))", prelude)),
            CompileError::semantic(2, "function `f` expects 2 arguments, found 1")
        );
        assert_eq!(
            check_err(&format!("{}print(f(1, 2.0))", prelude)),
            CompileError::semantic(2, "argument 2 of `f` expects int, found float")
        );
    }

    #[test]
    fn test_function_name_conflicts() {
        assert_eq!(
            check_err("fun f() -> int { return 1 }\nfun f() -> int { return 2 }"),
            CompileError::semantic(2, "function `f` is already declared")
        );
        assert_eq!(
            check_err("fun f() -> int { return 1 }\nvar f: int = 1"),
            CompileError::semantic(2, "`f` is already declared as a function")
        );
        assert_eq!(
            check_err("var g: int = 1\nfun g() -> int { return 1 }"),
            CompileError::semantic(2, "function `g` conflicts with variable `g`")
        );
        // nested functions share the flat table
        assert!(check(
            "fun a() -> int { fun inner() -> int { return 1 } return inner() }\nfun b() -> int { fun inner() -> int { return 2 } return inner() }"
        )
        .is_err());
    }

    #[test]
    fn test_parameters_share_body_frame() {
        assert_eq!(
            check_err("fun f(a: int) -> int {\n  var a: int = 2\n  return a\n}"),
            CompileError::semantic(2, "variable `a` is already declared in this scope")
        );
        assert!(check("fun f(a: int) -> int { { var a: int = 2 } return a }").is_ok());
    }

    #[test]
    fn test_functions_only_reach_their_own_variables_and_globals() {
        assert_eq!(
            check_err("fun outer(a: int) -> int {\n  fun inner() -> int {\n    return a\n  }\n  return inner()\n}"),
            CompileError::semantic(
                3,
                "function `inner` cannot use `a` declared outside of it: only globals are shared"
            )
        );
        assert_eq!(
            check_err("{\n  var t: int = 1\n  fun f() -> int { t = 2 return 0 }\n}"),
            CompileError::semantic(
                3,
                "function `f` cannot use `t` declared outside of it: only globals are shared"
            )
        );
        // a local of the enclosing function hides the global of the same name
        assert!(check(
            "var g: int = 1\nfun outer() -> int { var g: int = 2 fun inner() -> int { return g } return inner() }"
        )
        .is_err());
        assert!(check(
            "var g: int = 1\nfun outer() -> int { fun inner() -> int { g = g + 1 return g } return inner() }"
        )
        .is_ok());
    }

    #[test]
    fn test_return_checks() {
        assert_eq!(
            check_err("return 1"),
            CompileError::semantic(1, "`return` outside of a function")
        );
        assert_eq!(
            check_err("fun f() -> int {\n  return \"no\"\n}"),
            CompileError::semantic(2, "function `f` must return int, found string")
        );
        assert!(check("fun f() -> float { return 1 }").is_ok());
    }

    #[test]
    fn test_conditions_must_be_bool() {
        assert_eq!(
            check_err("var i: int = 1\nif (i) { print(i) }"),
            CompileError::semantic(2, "condition of `if` must be bool, found int")
        );
        assert_eq!(
            check_err("while (1 + 1) { }"),
            CompileError::semantic(1, "condition of `while` must be bool, found int")
        );
    }
}
