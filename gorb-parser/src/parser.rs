use crate::ast::*;
use crate::lexer::{Token, TokenKind};
use gorb_source::{CompileError, CompileResult};
use log::debug;

mod expr;
mod stmt;

/// Recursive descent parser with one token of look-ahead.
pub struct Parser {
    tokens: Vec<Token>,
    /// Index of the current token. Never moves past the final [`TokenKind::Eof`].
    pos: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map(|token| token.line).unwrap_or(1);
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                line,
            });
        }
        Self { tokens, pos: 0 }
    }

    /// Parses statements until the end of input.
    pub fn parse_program(&mut self) -> CompileResult<Program> {
        let mut program = Vec::new();
        while !self.check(TokenKind::Eof) {
            if self.eat(TokenKind::Semi) {
                continue;
            }
            program.push(self.parse_stmt()?);
        }
        debug!("parsed {} top level statements", program.len());
        Ok(program)
    }
}

/// Parse utilities
impl Parser {
    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// Advances to the next token and returns the one just passed.
    fn next(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Predicate that tests whether the current token is of `kind` and eats it if yes as a side effect.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.next();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(kind) {
            Ok(self.next())
        } else {
            Err(self.unexpected(kind))
        }
    }

    fn expect_ident(&mut self) -> CompileResult<Token> {
        self.expect(TokenKind::Identifier)
    }

    /// Creates an unexpected token error at the current token.
    fn unexpected(&self, expected: impl ToString) -> CompileError {
        let current = self.current();
        CompileError::parse(current.line, expected, current)
    }
}

/// Parses a whole token stream.
pub fn parse(tokens: Vec<Token>) -> CompileResult<Program> {
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    pub(super) fn program(source: &str) -> Program {
        parse(tokenize(source).unwrap()).unwrap()
    }

    pub(super) fn parse_err(source: &str) -> CompileError {
        parse(tokenize(source).unwrap()).unwrap_err()
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(program(""), vec![]);
        assert_eq!(program("// nothing here\n;;"), vec![]);
        assert_eq!(parse(vec![]).unwrap(), vec![]);
    }

    #[test]
    fn test_semicolons_are_optional() {
        assert_eq!(
            program("var x: int = 1; print(x);"),
            program("var x: int = 1 print(x)")
        );
    }

    #[test]
    fn test_deterministic() {
        let source = "fun f(a: int) -> int { return a * 2 } print(f(3) + 1)";
        assert_eq!(program(source), program(source));
    }
}
