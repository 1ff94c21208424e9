//! Lowers the syntax tree into postfix machine modules.

use crate::module::{FuncRef, Instruction, PostfixModule, PostfixProgram, TokenClass};
use gorb_parser::ast::{BinOp, Block, Expr, FunDecl, PrimitiveType, Stmt, VarDecl};
use gorb_passes::FunctionTable;
use gorb_source::{CompileError, CompileResult};
use log::{debug, trace};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
struct Binding {
    /// Name as written in the module, e.g. `x$1`.
    name: String,
    ty: PrimitiveType,
    /// Belongs to an enclosing module.
    is_global: bool,
}

/// Name resolution state of the module being generated.
struct ModuleScope {
    /// Index into `PostfixGenerator::modules`.
    target: usize,
    return_type: Option<PrimitiveType>,
    frames: Vec<HashMap<String, Binding>>,
    /// Bindings of enclosing modules visible where this function was declared.
    parent: HashMap<String, Binding>,
    /// Number of variables declared so far under each source name.
    slot_counts: HashMap<String, usize>,
    label_count: u32,
}

impl ModuleScope {
    fn new(target: usize, return_type: Option<PrimitiveType>, parent: HashMap<String, Binding>) -> Self {
        Self {
            target,
            return_type,
            frames: vec![HashMap::new()],
            parent,
            slot_counts: HashMap::new(),
            label_count: 0,
        }
    }

    fn lookup(&self, name: &str) -> Option<&Binding> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .or_else(|| self.parent.get(name))
    }

    /// Every binding visible from here, as seen by a nested function.
    fn visible(&self) -> HashMap<String, Binding> {
        let mut visible: HashMap<String, Binding> = self
            .parent
            .iter()
            .map(|(name, binding)| (name.clone(), binding.clone()))
            .collect();
        for frame in &self.frames {
            for (name, binding) in frame {
                visible.insert(
                    name.clone(),
                    Binding {
                        is_global: true,
                        ..binding.clone()
                    },
                );
            }
        }
        visible
    }
}

/// Generates postfix modules. Expects a program accepted by the semantic analyzer.
pub struct PostfixGenerator<'a> {
    functions: &'a FunctionTable,
    modules: Vec<PostfixModule>,
    /// One entry per module being generated, innermost last. The first one is the main module.
    scopes: Vec<ModuleScope>,
}

impl<'a> PostfixGenerator<'a> {
    pub fn new(module: impl Into<String>, functions: &'a FunctionTable) -> Self {
        Self {
            functions,
            modules: vec![PostfixModule::new(module)],
            scopes: vec![ModuleScope::new(0, None, HashMap::new())],
        }
    }

    pub fn generate(&mut self, program: &[Stmt]) -> CompileResult<()> {
        for stmt in program {
            self.gen_stmt(stmt)?;
        }
        Ok(())
    }

    /// Consumes `self` and returns the finished modules.
    #[must_use]
    pub fn finish(self) -> PostfixProgram {
        debug!("postfix: {} modules", self.modules.len());
        PostfixProgram {
            modules: self.modules,
        }
    }

    fn scope(&self) -> CompileResult<&ModuleScope> {
        self.scopes
            .last()
            .ok_or_else(|| CompileError::codegen(0, "no module is being generated"))
    }

    fn scope_mut(&mut self) -> CompileResult<&mut ModuleScope> {
        self.scopes
            .last_mut()
            .ok_or_else(|| CompileError::codegen(0, "no module is being generated"))
    }

    fn module_mut(&mut self) -> CompileResult<&mut PostfixModule> {
        let target = self.scope()?.target;
        self.modules
            .get_mut(target)
            .ok_or_else(|| CompileError::codegen(0, "unknown module"))
    }

    fn emit(&mut self, lexeme: impl Into<String>, token: TokenClass) -> CompileResult<()> {
        self.module_mut()?.code.push(Instruction::new(lexeme, token));
        Ok(())
    }

    fn new_label(&mut self) -> CompileResult<String> {
        let scope = self.scope_mut()?;
        scope.label_count += 1;
        Ok(format!("m{}", scope.label_count))
    }

    /// Records the position of `label` and emits its marker.
    fn mark_label(&mut self, label: &str) -> CompileResult<()> {
        let module = self.module_mut()?;
        let offset = module.code.len();
        module.labels.push((label.to_string(), offset));
        self.emit(label, TokenClass::Label)?;
        self.emit(":", TokenClass::Colon)
    }

    fn jump(&mut self, label: &str, conditional: bool) -> CompileResult<()> {
        self.emit(label, TokenClass::Label)?;
        if conditional {
            self.emit("JF", TokenClass::Jf)
        } else {
            self.emit("JMP", TokenClass::Jump)
        }
    }

    /// Declares a variable of the current module and returns its unique name.
    fn declare(&mut self, name: &str, ty: PrimitiveType) -> CompileResult<String> {
        let scope = self.scope_mut()?;
        let count = scope.slot_counts.entry(name.to_string()).or_insert(0);
        let slot = if *count == 0 {
            name.to_string()
        } else {
            format!("{}${}", name, count)
        };
        *count += 1;
        self.module_mut()?.vars.push((slot.clone(), ty));
        Ok(slot)
    }

    fn bind(&mut self, name: &str, binding: Binding) -> CompileResult<()> {
        trace!("postfix: bind `{}` to {:?}", name, binding);
        let frame = self
            .scope_mut()?
            .frames
            .last_mut()
            .ok_or_else(|| CompileError::codegen(0, "no open block"))?;
        frame.insert(name.to_string(), binding);
        Ok(())
    }

    /// Resolves `name` and records it in `.globVarList` if it belongs to an enclosing module.
    fn resolve(&mut self, name: &str, line: usize) -> CompileResult<Binding> {
        let binding = self
            .scope()?
            .lookup(name)
            .cloned()
            .ok_or_else(|| CompileError::codegen(line, format!("unresolved variable `{}`", name)))?;
        if binding.is_global {
            let module = self.module_mut()?;
            if !module.globals.contains(&binding.name) {
                module.globals.push(binding.name.clone());
            }
        }
        Ok(binding)
    }

    /// Static type of `expr`, computed with the same rules as the semantic analyzer.
    pub fn infer_type(&self, expr: &Expr) -> CompileResult<PrimitiveType> {
        match expr {
            Expr::IntLit { .. } => Ok(PrimitiveType::Int),
            Expr::FloatLit { .. } => Ok(PrimitiveType::Float),
            Expr::BoolLit { .. } | Expr::Not { .. } => Ok(PrimitiveType::Bool),
            Expr::StringLit { .. } => Ok(PrimitiveType::String),
            Expr::Variable { name, line } => self
                .scope()?
                .lookup(name)
                .map(|binding| binding.ty)
                .ok_or_else(|| CompileError::codegen(*line, format!("unresolved variable `{}`", name))),
            Expr::Binary { lhs, op, rhs, .. } => {
                let lhs = self.infer_type(lhs)?;
                let rhs = self.infer_type(rhs)?;
                Ok(binary_type(*op, lhs, rhs))
            }
            Expr::Call { name, line, .. } => self
                .functions
                .get(name)
                .map(|signature| signature.return_type)
                .ok_or_else(|| CompileError::codegen(*line, format!("unknown function `{}`", name))),
        }
    }

    /// Emits `i2f` when an int value is used where a float is expected.
    fn widen(&mut self, from: PrimitiveType, to: PrimitiveType) -> CompileResult<()> {
        if from == PrimitiveType::Int && to == PrimitiveType::Float {
            self.emit("i2f", TokenClass::Conv)?;
        }
        Ok(())
    }

    fn gen_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::VarDecl(decl) => self.gen_var_decl(decl),
            Stmt::FunDecl(decl) => self.gen_function(decl),
            Stmt::Assign { name, value, line } => {
                let binding = self.resolve(name, *line)?;
                let value_ty = self.infer_type(value)?;
                self.emit(binding.name, TokenClass::LVal)?;
                self.gen_expr(value)?;
                self.widen(value_ty, binding.ty)?;
                self.emit(":=", TokenClass::AssignOp)
            }
            Stmt::Print { expr, .. } => {
                self.gen_expr(expr)?;
                self.emit("OUT", TokenClass::OutOp)
            }
            Stmt::Input { target, line } => {
                let binding = self.resolve(target, *line)?;
                self.emit(binding.name, TokenClass::LVal)?;
                self.emit("INP", TokenClass::InpOp)?;
                match binding.ty {
                    PrimitiveType::Int => self.emit("s2i", TokenClass::Conv)?,
                    PrimitiveType::Float => self.emit("s2f", TokenClass::Conv)?,
                    PrimitiveType::Bool => {
                        self.emit("s2i", TokenClass::Conv)?;
                        self.emit("i2b", TokenClass::Conv)?;
                    }
                    PrimitiveType::String => {}
                }
                self.emit(":=", TokenClass::AssignOp)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let else_label = self.new_label()?;
                let end_label = self.new_label()?;
                self.gen_expr(condition)?;
                self.jump(&else_label, true)?;
                self.gen_block(then_branch)?;
                self.jump(&end_label, false)?;
                self.mark_label(&else_label)?;
                if let Some(else_branch) = else_branch {
                    self.gen_stmt(else_branch)?;
                }
                self.mark_label(&end_label)
            }
            Stmt::While {
                condition, body, ..
            } => {
                let top_label = self.new_label()?;
                let end_label = self.new_label()?;
                self.mark_label(&top_label)?;
                self.gen_expr(condition)?;
                self.jump(&end_label, true)?;
                self.gen_block(body)?;
                self.jump(&top_label, false)?;
                self.mark_label(&end_label)
            }
            Stmt::Block(block) => self.gen_block(block),
            Stmt::Return { value, line } => {
                let return_type = self.scope()?.return_type.ok_or_else(|| {
                    CompileError::codegen(*line, "`return` outside of a function")
                })?;
                let value_ty = self.infer_type(value)?;
                self.gen_expr(value)?;
                self.widen(value_ty, return_type)?;
                self.emit("RET", TokenClass::RetOp)
            }
            Stmt::Expr { expr, .. } => {
                self.gen_expr(expr)?;
                self.emit("POP", TokenClass::StackOp)
            }
        }
    }

    fn gen_block(&mut self, block: &Block) -> CompileResult<()> {
        self.scope_mut()?.frames.push(HashMap::new());
        for stmt in &block.statements {
            self.gen_stmt(stmt)?;
        }
        self.scope_mut()?.frames.pop();
        Ok(())
    }

    fn gen_var_decl(&mut self, decl: &VarDecl) -> CompileResult<()> {
        let initializer_ty = match &decl.initializer {
            Some(initializer) => Some(self.infer_type(initializer)?),
            None => None,
        };
        // constants take the type of their initializer
        let ty = match (decl.is_constant, decl.declared_type, initializer_ty) {
            (true, _, Some(ty)) | (false, Some(ty), _) | (_, None, Some(ty)) => ty,
            _ => {
                return Err(CompileError::codegen(
                    decl.line,
                    format!("cannot determine the type of `{}`", decl.name),
                ))
            }
        };

        let slot = self.declare(&decl.name, ty)?;
        if let (Some(initializer), Some(initializer_ty)) = (&decl.initializer, initializer_ty) {
            self.emit(slot.clone(), TokenClass::LVal)?;
            self.gen_expr(initializer)?;
            self.widen(initializer_ty, ty)?;
            self.emit(":=", TokenClass::AssignOp)?;
        }
        self.bind(
            &decl.name,
            Binding {
                name: slot,
                ty,
                is_global: false,
            },
        )
    }

    /// Generates `decl` as a module of its own, named after the enclosing module.
    fn gen_function(&mut self, decl: &FunDecl) -> CompileResult<()> {
        let (parent_name, visible) = {
            let scope = self.scope()?;
            let parent_name = self
                .modules
                .get(scope.target)
                .map(|module| module.name.clone())
                .ok_or_else(|| CompileError::codegen(decl.line, "unknown module"))?;
            (parent_name, scope.visible())
        };

        let target = self.modules.len();
        self.modules
            .push(PostfixModule::new(format!("{}${}", parent_name, decl.name)));
        self.scopes
            .push(ModuleScope::new(target, Some(decl.return_type), visible));

        for param in &decl.params {
            let ty = param.declared_type.ok_or_else(|| {
                CompileError::codegen(param.line, format!("parameter `{}` has no type", param.name))
            })?;
            let slot = self.declare(&param.name, ty)?;
            self.bind(
                &param.name,
                Binding {
                    name: slot,
                    ty,
                    is_global: false,
                },
            )?;
        }
        for stmt in &decl.body.statements {
            self.gen_stmt(stmt)?;
        }
        self.scopes.pop();

        debug!("postfix: generated module for `{}`", decl.name);
        Ok(())
    }

    fn gen_expr(&mut self, expr: &Expr) -> CompileResult<()> {
        match expr {
            Expr::IntLit { value, .. } => self.emit(value.to_string(), TokenClass::Int),
            Expr::FloatLit { value, .. } => self.emit(format!("{:?}", value), TokenClass::Float),
            Expr::BoolLit { value, .. } => self.emit(value.to_string(), TokenClass::Bool),
            Expr::StringLit { value, .. } => {
                self.emit(format!("\"{}\"", value), TokenClass::String)
            }
            Expr::Variable { name, line } => {
                let binding = self.resolve(name, *line)?;
                self.emit(binding.name, TokenClass::RVal)
            }
            Expr::Not { arg, .. } => {
                self.gen_expr(arg)?;
                self.emit("NOT", TokenClass::BoolOp)
            }
            Expr::Binary { lhs, op, rhs, .. } => self.gen_binary(lhs, *op, rhs),
            Expr::Call { name, args, line } => {
                let functions = self.functions;
                let signature = functions.get(name).ok_or_else(|| {
                    CompileError::codegen(*line, format!("unknown function `{}`", name))
                })?;
                for (arg, &param_ty) in args.iter().zip(&signature.param_types) {
                    let arg_ty = self.infer_type(arg)?;
                    self.gen_expr(arg)?;
                    self.widen(arg_ty, param_ty)?;
                }
                self.emit(name.clone(), TokenClass::Call)?;

                let func = FuncRef {
                    name: name.clone(),
                    return_type: signature.return_type,
                    arity: args.len(),
                };
                let module = self.module_mut()?;
                if !module.funcs.contains(&func) {
                    module.funcs.push(func);
                }
                Ok(())
            }
        }
    }

    fn gen_binary(&mut self, lhs: &Expr, op: BinOp, rhs: &Expr) -> CompileResult<()> {
        let lhs_ty = self.infer_type(lhs)?;
        let rhs_ty = self.infer_type(rhs)?;

        // concatenation
        if op == BinOp::Add && (lhs_ty == PrimitiveType::String || rhs_ty == PrimitiveType::String) {
            self.gen_expr(lhs)?;
            self.convert_to_string(lhs_ty)?;
            self.gen_expr(rhs)?;
            self.convert_to_string(rhs_ty)?;
            return self.emit("CAT", TokenClass::CatOp);
        }

        // values of unrelated types are never equal
        if op.is_equality() && !comparable(lhs_ty, rhs_ty) {
            self.gen_expr(lhs)?;
            self.gen_expr(rhs)?;
            self.emit("POP", TokenClass::StackOp)?;
            self.emit("POP", TokenClass::StackOp)?;
            return self.emit((op == BinOp::Ne).to_string(), TokenClass::Bool);
        }

        // `^` and `/` always work on floats
        let operand_ty = if matches!(op, BinOp::Pow | BinOp::Div)
            || lhs_ty == PrimitiveType::Float
            || rhs_ty == PrimitiveType::Float
        {
            PrimitiveType::Float
        } else {
            lhs_ty
        };
        self.gen_expr(lhs)?;
        self.widen(lhs_ty, operand_ty)?;
        self.gen_expr(rhs)?;
        self.widen(rhs_ty, operand_ty)?;

        let token = if op.is_arithmetic() {
            TokenClass::MathOp
        } else if op.is_logical() {
            TokenClass::BoolOp
        } else {
            TokenClass::RelOp
        };
        let lexeme = match op {
            BinOp::And => "AND",
            BinOp::Or => "OR",
            _ => op.as_str(),
        };
        self.emit(lexeme, token)?;

        if op == BinOp::Pow && binary_type(op, lhs_ty, rhs_ty) == PrimitiveType::Int {
            self.emit("f2i", TokenClass::Conv)?;
        }
        Ok(())
    }

    fn convert_to_string(&mut self, ty: PrimitiveType) -> CompileResult<()> {
        match ty {
            PrimitiveType::Int => self.emit("i2s", TokenClass::Conv),
            PrimitiveType::Float => self.emit("f2s", TokenClass::Conv),
            PrimitiveType::Bool => {
                self.emit("b2i", TokenClass::Conv)?;
                self.emit("i2s", TokenClass::Conv)
            }
            PrimitiveType::String => Ok(()),
        }
    }
}

/// Operands `==` can compare directly: equal types, or two numbers.
fn comparable(lhs: PrimitiveType, rhs: PrimitiveType) -> bool {
    lhs == rhs || (lhs.is_numeric() && rhs.is_numeric())
}

fn binary_type(op: BinOp, lhs: PrimitiveType, rhs: PrimitiveType) -> PrimitiveType {
    match op {
        BinOp::Div => PrimitiveType::Float,
        BinOp::Add if lhs == PrimitiveType::String || rhs == PrimitiveType::String => {
            PrimitiveType::String
        }
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Pow => {
            if lhs == PrimitiveType::Float || rhs == PrimitiveType::Float {
                PrimitiveType::Float
            } else {
                PrimitiveType::Int
            }
        }
        _ => PrimitiveType::Bool,
    }
}

/// Runs the generator over a whole program.
pub fn generate(
    module: &str,
    program: &[Stmt],
    functions: &FunctionTable,
) -> CompileResult<PostfixProgram> {
    let mut generator = PostfixGenerator::new(module, functions);
    generator.generate(program)?;
    Ok(generator.finish())
}
