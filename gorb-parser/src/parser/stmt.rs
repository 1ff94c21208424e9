use super::*;

impl Parser {
    /// Parses a statement or a declaration, followed by an optional `;`.
    pub fn parse_stmt(&mut self) -> CompileResult<Stmt> {
        let stmt = match self.current().kind {
            TokenKind::Const => self.parse_const_declaration()?,
            TokenKind::Var => self.parse_var_declaration()?,
            TokenKind::Fun => self.parse_fun_declaration()?,
            TokenKind::If => self.parse_if_stmt()?,
            TokenKind::While => self.parse_while_stmt()?,
            TokenKind::Print => self.parse_print_stmt()?,
            TokenKind::Input => self.parse_input_stmt()?,
            TokenKind::Return => self.parse_return_stmt()?,
            TokenKind::OpenBrace => Stmt::Block(self.parse_block()?),
            _ => self.parse_assign_or_expr_stmt()?,
        };
        self.eat(TokenKind::Semi);
        Ok(stmt)
    }

    pub fn parse_block(&mut self) -> CompileResult<Block> {
        let line = self.expect(TokenKind::OpenBrace)?.line;

        let mut statements = Vec::new();
        while !self.eat(TokenKind::CloseBrace) {
            if self.check(TokenKind::Eof) {
                return Err(self.unexpected(TokenKind::CloseBrace));
            }
            if self.eat(TokenKind::Semi) {
                continue;
            }
            statements.push(self.parse_stmt()?);
        }

        Ok(Block { statements, line })
    }

    fn parse_type(&mut self) -> CompileResult<PrimitiveType> {
        let ty = match self.current().kind {
            TokenKind::IntType => PrimitiveType::Int,
            TokenKind::FloatType => PrimitiveType::Float,
            TokenKind::BoolType => PrimitiveType::Bool,
            TokenKind::StringType => PrimitiveType::String,
            _ => return Err(self.unexpected("a type")),
        };
        self.next();
        Ok(ty)
    }

    /// `const NAME (: type)? = expr`
    fn parse_const_declaration(&mut self) -> CompileResult<Stmt> {
        let line = self.expect(TokenKind::Const)?.line;
        let name = self.expect_ident()?.lexeme;
        let declared_type = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect(TokenKind::Assign)?;
        let initializer = self.parse_expr()?;
        Ok(Stmt::VarDecl(VarDecl {
            name,
            declared_type,
            initializer: Some(initializer),
            is_constant: true,
            line,
        }))
    }

    /// `var NAME : type = expr`
    fn parse_var_declaration(&mut self) -> CompileResult<Stmt> {
        let line = self.expect(TokenKind::Var)?.line;
        let name = self.expect_ident()?.lexeme;
        self.expect(TokenKind::Colon)?;
        let declared_type = self.parse_type()?;
        self.expect(TokenKind::Assign)?;
        let initializer = self.parse_expr()?;
        Ok(Stmt::VarDecl(VarDecl {
            name,
            declared_type: Some(declared_type),
            initializer: Some(initializer),
            is_constant: false,
            line,
        }))
    }

    /// `fun NAME ( (p: type),* ) -> type { ... }`
    fn parse_fun_declaration(&mut self) -> CompileResult<Stmt> {
        let line = self.expect(TokenKind::Fun)?.line;
        let name = self.expect_ident()?.lexeme;

        self.expect(TokenKind::OpenParen)?;
        let mut params = Vec::new();
        if !self.eat(TokenKind::CloseParen) {
            loop {
                let param = self.expect_ident()?;
                self.expect(TokenKind::Colon)?;
                let ty = self.parse_type()?;
                params.push(VarDecl {
                    name: param.lexeme,
                    declared_type: Some(ty),
                    initializer: None,
                    is_constant: false,
                    line: param.line,
                });

                if self.eat(TokenKind::CloseParen) {
                    break;
                }
                self.expect(TokenKind::Comma)?;
            }
        }

        self.expect(TokenKind::Arrow)?;
        let return_type = self.parse_type()?;
        let body = self.parse_block()?;

        Ok(Stmt::FunDecl(FunDecl {
            name,
            return_type,
            params,
            body,
            line,
        }))
    }

    /// `if ( cond ) { ... } (else (if ... | { ... }))?`
    fn parse_if_stmt(&mut self) -> CompileResult<Stmt> {
        let line = self.expect(TokenKind::If)?.line;
        self.expect(TokenKind::OpenParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::CloseParen)?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.eat(TokenKind::Else) {
            let stmt = if self.check(TokenKind::If) {
                self.parse_if_stmt()?
            } else {
                Stmt::Block(self.parse_block()?)
            };
            Some(Box::new(stmt))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            line,
        })
    }

    fn parse_while_stmt(&mut self) -> CompileResult<Stmt> {
        let line = self.expect(TokenKind::While)?.line;
        self.expect(TokenKind::OpenParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::CloseParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::While {
            condition,
            body,
            line,
        })
    }

    fn parse_print_stmt(&mut self) -> CompileResult<Stmt> {
        let line = self.expect(TokenKind::Print)?.line;
        self.expect(TokenKind::OpenParen)?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::CloseParen)?;
        Ok(Stmt::Print { expr, line })
    }

    fn parse_input_stmt(&mut self) -> CompileResult<Stmt> {
        let line = self.expect(TokenKind::Input)?.line;
        self.expect(TokenKind::OpenParen)?;
        let target = self.expect_ident()?.lexeme;
        self.expect(TokenKind::CloseParen)?;
        Ok(Stmt::Input { target, line })
    }

    fn parse_return_stmt(&mut self) -> CompileResult<Stmt> {
        let line = self.expect(TokenKind::Return)?.line;
        let value = self.parse_expr()?;
        Ok(Stmt::Return { value, line })
    }

    /// An expression statement, or an assignment when the expression is a bare variable
    /// followed by `=`.
    fn parse_assign_or_expr_stmt(&mut self) -> CompileResult<Stmt> {
        let line = self.current().line;
        let expr = self.parse_expr()?;

        if self.check(TokenKind::Assign) {
            let equals = self.next();
            return match expr {
                Expr::Variable { name, .. } => {
                    let value = self.parse_expr()?;
                    Ok(Stmt::Assign {
                        name,
                        value,
                        line: equals.line,
                    })
                }
                target => Err(CompileError::parse(
                    equals.line,
                    "a variable before `=`",
                    format!("`{}`", target),
                )),
            };
        }

        Ok(Stmt::Expr { expr, line })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{parse_err, program};
    use super::*;
    use insta::assert_debug_snapshot;

    #[test]
    fn test_var_declaration() {
        assert_debug_snapshot!(program("var x: float = 1"), @r###"
        [
            VarDecl(
                VarDecl {
                    name: "x",
                    declared_type: Some(
                        Float,
                    ),
                    initializer: Some(
                        IntLit {
                            value: 1,
                            line: 1,
                        },
                    ),
                    is_constant: false,
                    line: 1,
                },
            ),
        ]
        "###);
    }

    #[test]
    fn test_const_declaration() {
        let stmts = program("const PI = 3.14\nconst E: float = 2.71");
        match &stmts[..] {
            [Stmt::VarDecl(pi), Stmt::VarDecl(e)] => {
                assert!(pi.is_constant && e.is_constant);
                assert_eq!(pi.declared_type, None);
                assert_eq!(e.declared_type, Some(PrimitiveType::Float));
                assert_eq!(e.line, 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_fun_declaration() {
        let source = "fun area(r: float, n: int) -> float {\n  return r * r\n}";
        assert_debug_snapshot!(program(source), @r###"
        [
            FunDecl(
                FunDecl {
                    name: "area",
                    return_type: Float,
                    params: [
                        VarDecl {
                            name: "r",
                            declared_type: Some(
                                Float,
                            ),
                            initializer: None,
                            is_constant: false,
                            line: 1,
                        },
                        VarDecl {
                            name: "n",
                            declared_type: Some(
                                Int,
                            ),
                            initializer: None,
                            is_constant: false,
                            line: 1,
                        },
                    ],
                    body: Block {
                        statements: [
                            Return {
                                value: Binary {
                                    lhs: Variable {
                                        name: "r",
                                        line: 2,
                                    },
                                    op: Mul,
                                    rhs: Variable {
                                        name: "r",
                                        line: 2,
                                    },
                                    line: 2,
                                },
                                line: 2,
                            },
                        ],
                        line: 1,
                    },
                    line: 1,
                },
            ),
        ]
        "###);

        let stmts = program("fun zero() -> int { return 0 }");
        match &stmts[..] {
            [Stmt::FunDecl(decl)] => assert!(decl.params.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_if_else_chain() {
        let stmts = program("if (a) { print(1) } else if (b) { print(2) } else { print(3) }");
        match &stmts[..] {
            [Stmt::If {
                else_branch: Some(else_branch),
                ..
            }] => match else_branch.as_ref() {
                Stmt::If {
                    else_branch: Some(last),
                    ..
                } => assert!(matches!(last.as_ref(), Stmt::Block(_))),
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_while_and_io() {
        assert_debug_snapshot!(program("while (i < 3) { input(i) }"), @r###"
        [
            While {
                condition: Binary {
                    lhs: Variable {
                        name: "i",
                        line: 1,
                    },
                    op: Lt,
                    rhs: IntLit {
                        value: 3,
                        line: 1,
                    },
                    line: 1,
                },
                body: Block {
                    statements: [
                        Input {
                            target: "i",
                            line: 1,
                        },
                    ],
                    line: 1,
                },
                line: 1,
            },
        ]
        "###);
    }

    #[test]
    fn test_assignment() {
        assert_debug_snapshot!(program("x\n= 1 + 2"), @r###"
        [
            Assign {
                name: "x",
                value: Binary {
                    lhs: IntLit {
                        value: 1,
                        line: 2,
                    },
                    op: Add,
                    rhs: IntLit {
                        value: 2,
                        line: 2,
                    },
                    line: 2,
                },
                line: 2,
            },
        ]
        "###);
    }

    #[test]
    fn test_expr_stmt() {
        assert_debug_snapshot!(program("f(1)"), @r###"
        [
            Expr {
                expr: Call {
                    name: "f",
                    args: [
                        IntLit {
                            value: 1,
                            line: 1,
                        },
                    ],
                    line: 1,
                },
                line: 1,
            },
        ]
        "###);
    }

    #[test]
    fn test_nested_blocks() {
        let stmts = program("{ var x: int = 1 { print(x) } }");
        match &stmts[..] {
            [Stmt::Block(outer)] => {
                assert_eq!(outer.statements.len(), 2);
                assert!(matches!(outer.statements[1], Stmt::Block(_)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse_err("f(x) = 1"),
            CompileError::parse(1, "a variable before `=`", "`f(x)`")
        );
        assert_eq!(
            parse_err("var x = 1"),
            CompileError::parse(1, "`:`", "`=`")
        );
        assert_eq!(
            parse_err("var x: number = 1"),
            CompileError::parse(1, "a type", "`number`")
        );
        assert_eq!(
            parse_err("fun f() { return 1 }"),
            CompileError::parse(1, "`->`", "`{`")
        );
        assert_eq!(
            parse_err("if (x) {\n print(x)\n"),
            CompileError::parse(3, "`}`", "end of input")
        );
        assert_eq!(
            parse_err("return"),
            CompileError::parse(1, "an expression", "end of input")
        );
        assert_eq!(
            parse_err("if x { }"),
            CompileError::parse(1, "`(`", "`x`")
        );
    }
}
