use super::*;

/// Binding power of a binary operator token: `(operator, left bp, right bp)`.
/// A right bp lower than the left one makes the operator right associative.
fn binop_bp(kind: TokenKind) -> Option<(BinOp, u8, u8)> {
    Some(match kind {
        TokenKind::OrOr => (BinOp::Or, 2, 3),
        TokenKind::AndAnd => (BinOp::And, 4, 5),
        TokenKind::EqualsEquals => (BinOp::Eq, 6, 7),
        TokenKind::NotEquals => (BinOp::Ne, 6, 7),
        TokenKind::GreaterThan => (BinOp::Gt, 8, 9),
        TokenKind::GreaterThanEquals => (BinOp::Ge, 8, 9),
        TokenKind::LessThan => (BinOp::Lt, 8, 9),
        TokenKind::LessThanEquals => (BinOp::Le, 8, 9),
        TokenKind::Plus => (BinOp::Add, 10, 11),
        TokenKind::Minus => (BinOp::Sub, 10, 11),
        TokenKind::Star => (BinOp::Mul, 12, 13),
        TokenKind::Slash => (BinOp::Div, 12, 13),
        TokenKind::Caret => (BinOp::Pow, 15, 14),
        _ => return None,
    })
}

impl Parser {
    /* Expressions */
    /// Parses any expression.
    /// This is equivalent to calling [`Self::parse_expr_bp`] with `min_bp = 0`.
    pub fn parse_expr(&mut self) -> CompileResult<Expr> {
        self.parse_expr_bp(0) // 0 to accept any expression
    }

    /// Parses an expression with the specified `min_bp`.
    /// To parse any expression use, [`Self::parse_expr`].
    fn parse_expr_bp(&mut self, min_bp: u8) -> CompileResult<Expr> {
        let mut lhs = self.parse_unary_expr()?;

        loop {
            let (op, l_bp, r_bp) = match binop_bp(self.current().kind) {
                Some(bp) => bp,
                None => break, // not a valid binop, stop parsing
            };
            if l_bp < min_bp {
                break; // less than the min_bp, stop parsing
            }

            let line = self.next().line;
            let rhs = self.parse_expr_bp(r_bp)?;

            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
                line,
            }
        }

        Ok(lhs)
    }

    /// Parses prefix `-` and `!`. Both bind tighter than any binary operator.
    fn parse_unary_expr(&mut self) -> CompileResult<Expr> {
        match self.current().kind {
            TokenKind::Minus => {
                let line = self.next().line;
                let arg = self.parse_unary_expr()?;
                Ok(Expr::Binary {
                    lhs: Box::new(Expr::IntLit { value: 0, line }),
                    op: BinOp::Sub,
                    rhs: Box::new(arg),
                    line,
                })
            }
            TokenKind::Bang => {
                let line = self.next().line;
                let arg = self.parse_unary_expr()?;
                Ok(Expr::Not {
                    arg: Box::new(arg),
                    line,
                })
            }
            _ => self.parse_primary_expr(),
        }
    }

    /// Parses a primary (atom) expression.
    fn parse_primary_expr(&mut self) -> CompileResult<Expr> {
        let token = self.current().clone();
        let line = token.line;
        let expr = match token.kind {
            TokenKind::IntLit => {
                let value = token
                    .lexeme
                    .parse::<i32>()
                    .map_err(|_| CompileError::parse(line, "a 32-bit integer", &token))?;
                self.next();
                Expr::IntLit { value, line }
            }
            TokenKind::FloatLit => {
                let value = token
                    .lexeme
                    .parse::<f64>()
                    .map_err(|_| CompileError::parse(line, "a float literal", &token))?;
                self.next();
                Expr::FloatLit { value, line }
            }
            TokenKind::True | TokenKind::False => {
                self.next();
                Expr::BoolLit {
                    value: token.kind == TokenKind::True,
                    line,
                }
            }
            TokenKind::StringLit => {
                self.next();
                let value = token.lexeme.trim_start_matches('"').trim_end_matches('"');
                Expr::StringLit {
                    value: value.to_string(),
                    line,
                }
            }
            TokenKind::Identifier => self.parse_identifier_or_call_expr()?,
            TokenKind::OpenParen => {
                self.next();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::CloseParen)?;
                expr
            }
            _ => return Err(self.unexpected("an expression")),
        };
        Ok(expr)
    }

    /* Expressions.Identifier */
    /// Parses a variable or a call expression.
    fn parse_identifier_or_call_expr(&mut self) -> CompileResult<Expr> {
        let ident = self.expect_ident()?;

        if self.eat(TokenKind::OpenParen) {
            // parse call expression
            let mut args = Vec::new();

            if !self.eat(TokenKind::CloseParen) {
                loop {
                    args.push(self.parse_expr()?);

                    if self.eat(TokenKind::CloseParen) {
                        break;
                    }
                    self.expect(TokenKind::Comma)?;
                }
            }

            Ok(Expr::Call {
                name: ident.lexeme,
                args,
                line: ident.line,
            })
        } else {
            Ok(Expr::Variable {
                name: ident.lexeme,
                line: ident.line,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use insta::assert_debug_snapshot;

    fn ast(source: &str) -> Expr {
        let mut parser = Parser::new(tokenize(source).unwrap());
        let expr = parser.parse_expr().unwrap();
        assert!(parser.check(TokenKind::Eof), "trailing input in {:?}", source);
        expr
    }

    fn expr(source: &str) -> String {
        ast(source).to_string()
    }

    #[test]
    fn test_literal() {
        assert_eq!(expr("true"), "true");
        assert_eq!(expr("false"), "false");
        assert_eq!(expr("1"), "1");
        assert_eq!(expr("2.0"), "2.0");
        assert_eq!(expr("2.5"), "2.5");
        assert_eq!(expr("\"hello world\""), "\"hello world\"");

        assert_debug_snapshot!(ast("2.0"), @r###"
        FloatLit {
            value: 2.0,
            line: 1,
        }
        "###);
        assert_debug_snapshot!(ast("\"hello world\""), @r###"
        StringLit {
            value: "hello world",
            line: 1,
        }
        "###);
    }

    #[test]
    fn test_binary_expr() {
        assert_eq!(expr("1 + 1"), "(1 + 1)");
        assert_eq!(expr("1 == 2 - 1"), "(1 == (2 - 1))");
        assert_eq!(expr("2 * 2 * 2"), "((2 * 2) * 2)");
        assert_eq!(expr("1 + 2 * 3 - 4 / 5"), "((1 + (2 * 3)) - (4 / 5))");
        assert_eq!(expr("a < b == c >= d"), "((a < b) == (c >= d))");
        assert_eq!(expr("(1 + 2) * 3"), "((1 + 2) * 3)");
    }

    #[test]
    fn test_logical_precedence() {
        assert_eq!(expr("a || b && c"), "(a || (b && c))");
        assert_eq!(expr("a == b && c != d"), "((a == b) && (c != d))");
        assert_eq!(expr("a || b || c"), "((a || b) || c)");
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(expr("2 ^ 3 ^ 2"), "(2 ^ (3 ^ 2))");
        assert_eq!(expr("2 * 3 ^ 2"), "(2 * (3 ^ 2))");
    }

    #[test]
    fn test_unary() {
        assert_eq!(expr("-x"), "(0 - x)");
        assert_eq!(expr("--x"), "(0 - (0 - x))");
        assert_eq!(expr("-2 ^ 2"), "((0 - 2) ^ 2)");
        assert_eq!(expr("!a && b"), "(!a && b)");
        assert_eq!(expr("!(a && b)"), "!(a && b)");
        assert_eq!(expr("1 - -1"), "(1 - (0 - 1))");

        assert_debug_snapshot!(ast("-x"), @r###"
        Binary {
            lhs: IntLit {
                value: 0,
                line: 1,
            },
            op: Sub,
            rhs: Variable {
                name: "x",
                line: 1,
            },
            line: 1,
        }
        "###);
        assert_debug_snapshot!(ast("!a && b"), @r###"
        Binary {
            lhs: Not {
                arg: Variable {
                    name: "a",
                    line: 1,
                },
                line: 1,
            },
            op: And,
            rhs: Variable {
                name: "b",
                line: 1,
            },
            line: 1,
        }
        "###);
    }

    #[test]
    fn test_fn_call() {
        assert_eq!(expr("foo()"), "foo()");
        assert_eq!(expr("foo(1, bar)"), "foo(1, bar)");
        assert_eq!(expr("foo(1, bar, baz())"), "foo(1, bar, baz())");
        assert_eq!(expr("foo(1 + 2) * 3"), "(foo((1 + 2)) * 3)");

        assert_debug_snapshot!(ast("foo(1, bar)"), @r###"
        Call {
            name: "foo",
            args: [
                IntLit {
                    value: 1,
                    line: 1,
                },
                Variable {
                    name: "bar",
                    line: 1,
                },
            ],
            line: 1,
        }
        "###);
    }

    #[test]
    fn test_lines() {
        match ast("a\n+\nb") {
            Expr::Binary { lhs, rhs, line, .. } => {
                assert_eq!(line, 2);
                assert_eq!(lhs.line(), 1);
                assert_eq!(rhs.line(), 3);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_errors() {
        let mut parser = Parser::new(tokenize("1 + )").unwrap());
        assert_eq!(
            parser.parse_expr().unwrap_err(),
            CompileError::parse(1, "an expression", "`)`")
        );

        let mut parser = Parser::new(tokenize("foo(1 2)").unwrap());
        assert_eq!(
            parser.parse_expr().unwrap_err(),
            CompileError::parse(1, "`,`", "`2`")
        );

        let mut parser = Parser::new(tokenize("(1 + 2").unwrap());
        assert_eq!(
            parser.parse_expr().unwrap_err(),
            CompileError::parse(1, "`)`", "end of input")
        );
    }

    #[test]
    fn test_int_overflow() {
        let mut parser = Parser::new(tokenize("2147483647").unwrap());
        assert_eq!(parser.parse_expr().unwrap().to_string(), "2147483647");

        let mut parser = Parser::new(tokenize("2147483648").unwrap());
        assert_eq!(
            parser.parse_expr().unwrap_err(),
            CompileError::parse(1, "a 32-bit integer", "`2147483648`")
        );
    }
}
