//! Lowers the syntax tree into a [`CilAssembly`].

use crate::instr::{CilAssembly, CilType, Instr, Label, Method, MethodRef};
use gorb_parser::ast::{BinOp, Block, Expr, FunDecl, PrimitiveType, Stmt, VarDecl};
use gorb_passes::FunctionTable;
use gorb_source::{CompileError, CompileResult};
use log::{debug, trace};
use std::collections::HashMap;

/// Where a name lives at run time.
#[derive(Debug, Clone, PartialEq)]
enum Binding {
    Arg { name: String, ty: PrimitiveType },
    Local { slot: String, ty: PrimitiveType },
    /// Top level `var` / `const`, stored in a static field of `Program`.
    Static { name: String, ty: PrimitiveType },
}

impl Binding {
    fn ty(&self) -> PrimitiveType {
        match self {
            Binding::Arg { ty, .. } | Binding::Local { ty, .. } | Binding::Static { ty, .. } => *ty,
        }
    }
}

/// Name resolution state of the method being generated.
struct MethodScope {
    name: String,
    /// Index into `CilGenerator::methods`, `None` for `Main`.
    target: Option<usize>,
    return_type: Option<PrimitiveType>,
    frames: Vec<HashMap<String, Binding>>,
    /// Number of locals declared so far under each source name.
    slot_counts: HashMap<String, usize>,
}

impl MethodScope {
    fn new(name: &str, target: Option<usize>, return_type: Option<PrimitiveType>) -> Self {
        Self {
            name: name.to_string(),
            target,
            return_type,
            frames: vec![HashMap::new()],
            slot_counts: HashMap::new(),
        }
    }

    fn lookup(&self, name: &str) -> Option<&Binding> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }
}

/// Generates a CIL assembly. Expects a program accepted by the semantic analyzer.
pub struct CilGenerator<'a> {
    module: String,
    functions: &'a FunctionTable,
    fields: Vec<(String, CilType)>,
    methods: Vec<Method>,
    main: Method,
    /// One entry per method being generated, innermost last. The first one is `Main`.
    scopes: Vec<MethodScope>,
    label_count: u32,
}

impl<'a> CilGenerator<'a> {
    pub fn new(module: impl Into<String>, functions: &'a FunctionTable) -> Self {
        Self {
            module: module.into(),
            functions,
            fields: Vec::new(),
            methods: Vec::new(),
            main: Method::entry_point(),
            scopes: vec![MethodScope::new("Main", None, None)],
            label_count: 0,
        }
    }

    pub fn generate(&mut self, program: &[Stmt]) -> CompileResult<()> {
        for stmt in program {
            self.gen_stmt(stmt)?;
        }
        Ok(())
    }

    /// Consumes `self` and returns the finished assembly.
    #[must_use]
    pub fn finish(mut self) -> CilAssembly {
        self.main.body.push(Instr::Ret);
        debug!(
            "cil: {} fields, {} methods",
            self.fields.len(),
            self.methods.len() + 1
        );
        CilAssembly {
            module: self.module,
            fields: self.fields,
            methods: self.methods,
            main: self.main,
        }
    }

    fn scope(&self) -> CompileResult<&MethodScope> {
        self.scopes
            .last()
            .ok_or_else(|| CompileError::codegen(0, "no method is being generated"))
    }

    fn scope_mut(&mut self) -> CompileResult<&mut MethodScope> {
        self.scopes
            .last_mut()
            .ok_or_else(|| CompileError::codegen(0, "no method is being generated"))
    }

    fn method_mut(&mut self) -> CompileResult<&mut Method> {
        let target = self.scope()?.target;
        match target {
            None => Ok(&mut self.main),
            Some(index) => self
                .methods
                .get_mut(index)
                .ok_or_else(|| CompileError::codegen(0, "unknown method")),
        }
    }

    fn emit(&mut self, instr: Instr) -> CompileResult<()> {
        self.method_mut()?.body.push(instr);
        Ok(())
    }

    fn emit_all(&mut self, instrs: impl IntoIterator<Item = Instr>) -> CompileResult<()> {
        for instr in instrs {
            self.emit(instr)?;
        }
        Ok(())
    }

    fn new_label(&mut self) -> Label {
        self.label_count += 1;
        Label(self.label_count)
    }

    fn enter_block(&mut self) -> CompileResult<()> {
        self.scope_mut()?.frames.push(HashMap::new());
        Ok(())
    }

    fn exit_block(&mut self) -> CompileResult<()> {
        self.scope_mut()?.frames.pop();
        Ok(())
    }

    fn bind(&mut self, name: &str, binding: Binding) -> CompileResult<()> {
        trace!("cil: bind `{}` to {:?}", name, binding);
        let frame = self
            .scope_mut()?
            .frames
            .last_mut()
            .ok_or_else(|| CompileError::codegen(0, "no open block"))?;
        frame.insert(name.to_string(), binding);
        Ok(())
    }

    /// Reserves a local slot for `name`. A name declared again in the same method gets `name$N`.
    fn allocate_local(&mut self, name: &str, ty: PrimitiveType) -> CompileResult<String> {
        let scope = self.scope_mut()?;
        let count = scope.slot_counts.entry(name.to_string()).or_insert(0);
        let slot = if *count == 0 {
            name.to_string()
        } else {
            format!("{}${}", name, count)
        };
        *count += 1;
        self.method_mut()?.locals.push((slot.clone(), ty.into()));
        Ok(slot)
    }

    /// Resolves `name` in the current method, then in the enclosing ones. Only static fields
    /// can be reached from an enclosing method.
    fn resolve(&self, name: &str, line: usize) -> CompileResult<Binding> {
        let (current, enclosing) = self
            .scopes
            .split_last()
            .ok_or_else(|| CompileError::codegen(line, "no method is being generated"))?;
        if let Some(binding) = current.lookup(name) {
            return Ok(binding.clone());
        }
        for scope in enclosing.iter().rev() {
            if let Some(binding) = scope.lookup(name) {
                return match binding {
                    Binding::Static { .. } => Ok(binding.clone()),
                    _ => Err(CompileError::codegen(
                        line,
                        format!(
                            "function `{}` cannot use `{}` of the enclosing `{}`: nested functions are static methods",
                            current.name, name, scope.name
                        ),
                    )),
                };
            }
        }
        Err(CompileError::codegen(
            line,
            format!("unresolved variable `{}`", name),
        ))
    }

    /// Static type of `expr`, computed with the same rules as the semantic analyzer.
    pub fn infer_type(&self, expr: &Expr) -> CompileResult<PrimitiveType> {
        match expr {
            Expr::IntLit { .. } => Ok(PrimitiveType::Int),
            Expr::FloatLit { .. } => Ok(PrimitiveType::Float),
            Expr::BoolLit { .. } | Expr::Not { .. } => Ok(PrimitiveType::Bool),
            Expr::StringLit { .. } => Ok(PrimitiveType::String),
            Expr::Variable { name, line } => Ok(self.resolve(name, *line)?.ty()),
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

    /// Emits `conv.r4` when an int value is stored into a float location.
    fn widen(&mut self, from: PrimitiveType, to: PrimitiveType) -> CompileResult<()> {
        if from == PrimitiveType::Int && to == PrimitiveType::Float {
            self.emit(Instr::ConvR4)?;
        }
        Ok(())
    }

    fn store(&mut self, binding: Binding) -> CompileResult<()> {
        match binding {
            Binding::Arg { name, .. } => self.emit(Instr::Starg(name)),
            Binding::Local { slot, .. } => self.emit(Instr::Stloc(slot)),
            Binding::Static { name, ty } => self.emit(Instr::Stsfld {
                ty: ty.into(),
                name,
            }),
        }
    }

    fn gen_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::VarDecl(decl) => self.gen_var_decl(decl),
            Stmt::FunDecl(decl) => self.gen_function(decl),
            Stmt::Assign { name, value, line } => {
                let binding = self.resolve(name, *line)?;
                let value_ty = self.infer_type(value)?;
                self.gen_expr(value)?;
                self.widen(value_ty, binding.ty())?;
                self.store(binding)
            }
            Stmt::Print { expr, .. } => {
                let ty = self.infer_type(expr)?;
                self.gen_expr(expr)?;
                let ty = CilType::from(ty).to_string();
                self.emit(Instr::Call(MethodRef::mscorlib(
                    "void",
                    "Console",
                    "WriteLine",
                    &[ty.as_str()],
                )))
            }
            Stmt::Input { target, line } => {
                let binding = self.resolve(target, *line)?;
                self.emit(Instr::Call(MethodRef::mscorlib(
                    "string", "Console", "ReadLine", &[],
                )))?;
                let convert = match binding.ty() {
                    PrimitiveType::Int => Some(("int32", "ToInt32")),
                    PrimitiveType::Float => Some(("float32", "ToSingle")),
                    PrimitiveType::Bool => Some(("bool", "ToBoolean")),
                    PrimitiveType::String => None,
                };
                if let Some((ret, method)) = convert {
                    self.emit(Instr::Call(MethodRef::mscorlib(
                        ret,
                        "Convert",
                        method,
                        &["string"],
                    )))?;
                }
                self.store(binding)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let else_label = self.new_label();
                let end_label = self.new_label();
                self.gen_expr(condition)?;
                self.emit(Instr::Brfalse(else_label))?;
                self.gen_block(then_branch)?;
                self.emit(Instr::Br(end_label))?;
                self.emit(Instr::Label(else_label))?;
                if let Some(else_branch) = else_branch {
                    self.gen_stmt(else_branch)?;
                }
                self.emit(Instr::Label(end_label))
            }
            Stmt::While {
                condition, body, ..
            } => {
                let top_label = self.new_label();
                let end_label = self.new_label();
                self.emit(Instr::Label(top_label))?;
                self.gen_expr(condition)?;
                self.emit(Instr::Brfalse(end_label))?;
                self.gen_block(body)?;
                self.emit(Instr::Br(top_label))?;
                self.emit(Instr::Label(end_label))
            }
            Stmt::Block(block) => self.gen_block(block),
            Stmt::Return { value, line } => {
                let return_type = self.scope()?.return_type.ok_or_else(|| {
                    CompileError::codegen(*line, "`return` outside of a function")
                })?;
                let value_ty = self.infer_type(value)?;
                self.gen_expr(value)?;
                self.widen(value_ty, return_type)?;
                self.emit(Instr::Ret)
            }
            Stmt::Expr { expr, .. } => {
                self.gen_expr(expr)?;
                self.emit(Instr::Pop)
            }
        }
    }

    fn gen_block(&mut self, block: &Block) -> CompileResult<()> {
        self.enter_block()?;
        for stmt in &block.statements {
            self.gen_stmt(stmt)?;
        }
        self.exit_block()
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

        let is_global = {
            let scope = self.scope()?;
            scope.target.is_none() && self.scopes.len() == 1 && scope.frames.len() == 1
        };
        let binding = if is_global {
            self.fields.push((decl.name.clone(), ty.into()));
            Binding::Static {
                name: decl.name.clone(),
                ty,
            }
        } else {
            let slot = self.allocate_local(&decl.name, ty)?;
            Binding::Local { slot, ty }
        };

        if let (Some(initializer), Some(initializer_ty)) = (&decl.initializer, initializer_ty) {
            self.gen_expr(initializer)?;
            self.widen(initializer_ty, ty)?;
            self.store(binding.clone())?;
        }
        self.bind(&decl.name, binding)
    }

    /// Generates `decl` as a separate static method, wherever it is nested.
    fn gen_function(&mut self, decl: &FunDecl) -> CompileResult<()> {
        let params = decl
            .params
            .iter()
            .map(|param| {
                param
                    .declared_type
                    .map(|ty| (param.name.clone(), ty))
                    .ok_or_else(|| {
                        CompileError::codegen(
                            param.line,
                            format!("parameter `{}` has no type", param.name),
                        )
                    })
            })
            .collect::<CompileResult<Vec<_>>>()?;

        let index = self.methods.len();
        self.methods.push(Method::new(
            decl.name.clone(),
            decl.return_type.into(),
            params
                .iter()
                .map(|(name, ty)| (name.clone(), CilType::from(*ty)))
                .collect(),
        ));

        let mut scope = MethodScope::new(&decl.name, Some(index), Some(decl.return_type));
        for (name, ty) in params {
            scope.frames[0].insert(
                name.clone(),
                Binding::Arg {
                    name,
                    ty,
                },
            );
        }
        self.scopes.push(scope);

        for stmt in &decl.body.statements {
            self.gen_stmt(stmt)?;
        }

        if !self.method_mut()?.ends_with_ret() {
            self.emit(default_value(decl.return_type))?;
            self.emit(Instr::Ret)?;
        }
        self.scopes.pop();

        debug!("cil: generated method `{}`", decl.name);
        Ok(())
    }

    fn gen_expr(&mut self, expr: &Expr) -> CompileResult<()> {
        match expr {
            Expr::IntLit { value, .. } => self.emit(Instr::LdcI4(*value)),
            Expr::FloatLit { value, .. } => self.emit(Instr::LdcR4(*value)),
            Expr::BoolLit { value, .. } => self.emit(Instr::LdcBool(*value)),
            Expr::StringLit { value, .. } => self.emit(Instr::Ldstr(value.clone())),
            Expr::Variable { name, line } => match self.resolve(name, *line)? {
                Binding::Arg { name, .. } => self.emit(Instr::Ldarg(name)),
                Binding::Local { slot, .. } => self.emit(Instr::Ldloc(slot)),
                Binding::Static { name, ty } => self.emit(Instr::Ldsfld {
                    ty: ty.into(),
                    name,
                }),
            },
            Expr::Not { arg, .. } => {
                self.gen_expr(arg)?;
                self.emit(Instr::LdcBool(false))?;
                self.emit(Instr::Ceq)
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
                let params: Vec<CilType> = signature
                    .param_types
                    .iter()
                    .map(|&ty| CilType::from(ty))
                    .collect();
                self.emit(Instr::Call(MethodRef::program(
                    name,
                    signature.return_type.into(),
                    &params,
                )))
            }
        }
    }

    fn gen_binary(&mut self, lhs: &Expr, op: BinOp, rhs: &Expr) -> CompileResult<()> {
        let lhs_ty = self.infer_type(lhs)?;
        let rhs_ty = self.infer_type(rhs)?;
        let is_string = |ty: PrimitiveType| ty == PrimitiveType::String;

        // concatenation
        if op == BinOp::Add && (is_string(lhs_ty) || is_string(rhs_ty)) {
            self.gen_boxed(lhs, lhs_ty)?;
            self.gen_boxed(rhs, rhs_ty)?;
            return self.emit(Instr::Call(MethodRef::mscorlib(
                "string",
                "String",
                "Concat",
                &["object", "object"],
            )));
        }

        if op == BinOp::Pow {
            self.gen_expr(lhs)?;
            self.emit(Instr::ConvR8)?;
            self.gen_expr(rhs)?;
            self.emit(Instr::ConvR8)?;
            self.emit(Instr::Call(MethodRef::mscorlib(
                "float64",
                "Math",
                "Pow",
                &["float64", "float64"],
            )))?;
            return match binary_type(op, lhs_ty, rhs_ty) {
                PrimitiveType::Int => self.emit(Instr::ConvI4),
                _ => self.emit(Instr::ConvR4),
            };
        }

        if op == BinOp::Div {
            // division always yields float
            self.gen_expr(lhs)?;
            self.widen(lhs_ty, PrimitiveType::Float)?;
            self.gen_expr(rhs)?;
            self.widen(rhs_ty, PrimitiveType::Float)?;
            return self.emit(Instr::Div);
        }

        // strings, and operands of unrelated types, are compared as objects
        let comparable = lhs_ty == rhs_ty || (lhs_ty.is_numeric() && rhs_ty.is_numeric());
        if op.is_equality() && (is_string(lhs_ty) || is_string(rhs_ty) || !comparable) {
            let method = if is_string(lhs_ty) && is_string(rhs_ty) {
                let name = if op == BinOp::Eq {
                    "op_Equality"
                } else {
                    "op_Inequality"
                };
                self.gen_expr(lhs)?;
                self.gen_expr(rhs)?;
                MethodRef::mscorlib("bool", "String", name, &["string", "string"])
            } else {
                self.gen_boxed(lhs, lhs_ty)?;
                self.gen_boxed(rhs, rhs_ty)?;
                let equals = MethodRef::mscorlib("bool", "Object", "Equals", &["object", "object"]);
                if op == BinOp::Ne {
                    return self.emit_all(vec![
                        Instr::Call(equals),
                        Instr::LdcBool(false),
                        Instr::Ceq,
                    ]);
                }
                equals
            };
            return self.emit(Instr::Call(method));
        }

        // numeric operands meet at float32
        let common = if lhs_ty == PrimitiveType::Float || rhs_ty == PrimitiveType::Float {
            PrimitiveType::Float
        } else {
            lhs_ty
        };
        self.gen_expr(lhs)?;
        self.widen(lhs_ty, common)?;
        self.gen_expr(rhs)?;
        self.widen(rhs_ty, common)?;

        match op {
            BinOp::Add => self.emit(Instr::Add),
            BinOp::Sub => self.emit(Instr::Sub),
            BinOp::Mul => self.emit(Instr::Mul),
            BinOp::Gt => self.emit(Instr::Cgt),
            BinOp::Lt => self.emit(Instr::Clt),
            BinOp::Eq => self.emit(Instr::Ceq),
            BinOp::Le => self.emit_all(vec![Instr::Cgt, Instr::LdcBool(false), Instr::Ceq]),
            BinOp::Ge => self.emit_all(vec![Instr::Clt, Instr::LdcBool(false), Instr::Ceq]),
            BinOp::Ne => self.emit_all(vec![Instr::Ceq, Instr::LdcBool(false), Instr::Ceq]),
            BinOp::And => self.emit(Instr::And),
            BinOp::Or => self.emit(Instr::Or),
            BinOp::Div | BinOp::Pow => unreachable!("handled above"),
        }
    }

    /// Pushes `expr` as an `object`.
    fn gen_boxed(&mut self, expr: &Expr, ty: PrimitiveType) -> CompileResult<()> {
        self.gen_expr(expr)?;
        if ty != PrimitiveType::String {
            self.emit(Instr::Box(ty.into()))?;
        }
        Ok(())
    }
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

/// The value returned when control reaches the end of a function body.
fn default_value(ty: PrimitiveType) -> Instr {
    match ty {
        PrimitiveType::Int => Instr::LdcI4(0),
        PrimitiveType::Float => Instr::LdcR4(0.0),
        PrimitiveType::Bool => Instr::LdcBool(false),
        PrimitiveType::String => Instr::Ldstr(String::new()),
    }
}

/// Runs the generator over a whole program.
pub fn generate(
    module: &str,
    program: &[Stmt],
    functions: &FunctionTable,
) -> CompileResult<CilAssembly> {
    let mut generator = CilGenerator::new(module, functions);
    generator.generate(program)?;
    Ok(generator.finish())
}
