//! Table driven DFA lexer.
//!
//! The automaton reads one character at a time. States whose name ends in `End` are *star*
//! states: reaching one finishes the pending token without consuming the current character,
//! which is then offered again to [`State::Start`].

use crate::ast::PrimitiveType;
use enum_primitive_derive::Primitive;
use gorb_source::{CompileError, CompileResult};
use log::trace;
use num_traits::FromPrimitive;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // keywords
    If,
    Else,
    While,
    Fun,
    Return,
    Const,
    Var,
    Input,
    Print,
    True,
    False,
    // type keywords
    IntType,
    FloatType,
    BoolType,
    StringType,

    // literals
    IntLit,
    FloatLit,
    StringLit,

    // identifiers
    Identifier,

    // operators
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Arrow,
    Assign,
    EqualsEquals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessThanEquals,
    GreaterThanEquals,
    Colon,
    Comma,
    Bang,
    AndAnd,
    OrOr,

    // punctuation
    Semi,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::While => "`while`",
            TokenKind::Fun => "`fun`",
            TokenKind::Return => "`return`",
            TokenKind::Const => "`const`",
            TokenKind::Var => "`var`",
            TokenKind::Input => "`input`",
            TokenKind::Print => "`print`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::IntType => "`int`",
            TokenKind::FloatType => "`float`",
            TokenKind::BoolType => "`bool`",
            TokenKind::StringType => "`string`",
            TokenKind::IntLit => "integer literal",
            TokenKind::FloatLit => "float literal",
            TokenKind::StringLit => "string literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Caret => "`^`",
            TokenKind::Arrow => "`->`",
            TokenKind::Assign => "`=`",
            TokenKind::EqualsEquals => "`==`",
            TokenKind::NotEquals => "`!=`",
            TokenKind::LessThan => "`<`",
            TokenKind::GreaterThan => "`>`",
            TokenKind::LessThanEquals => "`<=`",
            TokenKind::GreaterThanEquals => "`>=`",
            TokenKind::Colon => "`:`",
            TokenKind::Comma => "`,`",
            TokenKind::Bang => "`!`",
            TokenKind::AndAnd => "`&&`",
            TokenKind::OrOr => "`||`",
            TokenKind::Semi => "`;`",
            TokenKind::OpenParen => "`(`",
            TokenKind::CloseParen => "`)`",
            TokenKind::OpenBrace => "`{`",
            TokenKind::CloseBrace => "`}`",
            TokenKind::Eof => "end of input",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text. String literals keep their quotes.
    pub lexeme: String,
    /// 1-based line on which the token starts.
    pub line: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "{}", self.kind),
            _ => write!(f, "`{}`", self.lexeme),
        }
    }
}

/// Reserved words. Built once and handed to [`Lexer::new`].
#[derive(Debug, Clone)]
pub struct Keywords {
    table: HashMap<&'static str, TokenKind>,
}

impl Keywords {
    pub fn get(&self, word: &str) -> Option<TokenKind> {
        self.table.get(word).copied()
    }
}

impl Default for Keywords {
    fn default() -> Self {
        let table = [
            ("if", TokenKind::If),
            ("else", TokenKind::Else),
            ("while", TokenKind::While),
            ("fun", TokenKind::Fun),
            ("return", TokenKind::Return),
            ("const", TokenKind::Const),
            ("var", TokenKind::Var),
            ("input", TokenKind::Input),
            ("print", TokenKind::Print),
            ("true", TokenKind::True),
            ("false", TokenKind::False),
            ("int", TokenKind::IntType),
            ("float", TokenKind::FloatType),
            ("bool", TokenKind::BoolType),
            ("string", TokenKind::StringType),
        ]
        .iter()
        .copied()
        .collect();
        Self { table }
    }
}

/// The automaton alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
#[repr(u8)]
enum CharClass {
    Letter = 0,
    Digit = 1,
    Dot = 2,
    Whitespace = 3,
    Newline = 4,
    Quote = 5,
    Minus = 6,
    Greater = 7,
    Less = 8,
    Equals = 9,
    Slash = 10,
    Bang = 11,
    Ampersand = 12,
    Pipe = 13,
    /// Single character operators: `+ * ^ ( ) { } , : ;`
    Operator = 14,
    Other = 15,
}

const CLASS_COUNT: usize = 16;

impl CharClass {
    fn of(c: char) -> Self {
        match c {
            '_' => CharClass::Letter,
            c if c.is_alphabetic() => CharClass::Letter,
            c if c.is_ascii_digit() => CharClass::Digit,
            '.' => CharClass::Dot,
            ' ' | '\t' | '\r' => CharClass::Whitespace,
            '\n' => CharClass::Newline,
            '"' => CharClass::Quote,
            '-' => CharClass::Minus,
            '>' => CharClass::Greater,
            '<' => CharClass::Less,
            '=' => CharClass::Equals,
            '/' => CharClass::Slash,
            '!' => CharClass::Bang,
            '&' => CharClass::Ampersand,
            '|' => CharClass::Pipe,
            '+' | '*' | '^' | '(' | ')' | '{' | '}' | ',' | ':' | ';' => CharClass::Operator,
            _ => CharClass::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
#[repr(u8)]
enum State {
    Start = 0,
    Ident = 1,
    IdentEnd = 2,
    Int = 3,
    IntEnd = 4,
    Dot = 5,
    Float = 6,
    FloatEnd = 7,
    Minus = 8,
    Arrow = 9,
    MinusEnd = 10,
    Equals = 11,
    EqualsEquals = 12,
    EqualsEnd = 13,
    StrStart = 14,
    StrBody = 15,
    StrEnd = 16,
    Slash = 17,
    Comment = 18,
    SlashEnd = 19,
    Greater = 20,
    GreaterEquals = 21,
    GreaterEnd = 22,
    Less = 23,
    LessEquals = 24,
    LessEnd = 25,
    Bang = 26,
    BangEquals = 27,
    BangEnd = 28,
    Ampersand = 29,
    AndAnd = 30,
    Pipe = 31,
    OrOr = 32,
    Operator = 33,
    Invalid = 34,
}

const STATE_COUNT: usize = 35;

/// Marks a missing transition. Not a valid `State` discriminant.
const NO_TRANSITION: u8 = u8::MAX;

impl State {
    /// Star states finish a token without consuming the current character.
    fn is_star(self) -> bool {
        matches!(
            self,
            State::IdentEnd
                | State::IntEnd
                | State::FloatEnd
                | State::MinusEnd
                | State::EqualsEnd
                | State::SlashEnd
                | State::GreaterEnd
                | State::LessEnd
                | State::BangEnd
        )
    }

    /// States that finish a token after consuming the current character.
    fn accepts_directly(self) -> bool {
        matches!(
            self,
            State::Arrow
                | State::EqualsEquals
                | State::GreaterEquals
                | State::LessEquals
                | State::BangEquals
                | State::AndAnd
                | State::OrOr
                | State::Operator
                | State::StrEnd
        )
    }
}

/// Dense `state x class` transition matrix.
struct TransitionTable {
    next: [[u8; CLASS_COUNT]; STATE_COUNT],
}

impl TransitionTable {
    fn new() -> Self {
        use CharClass as C;
        use State as S;

        let mut table = Self {
            next: [[NO_TRANSITION; CLASS_COUNT]; STATE_COUNT],
        };

        table.add(S::Start, C::Letter, S::Ident);
        table.add(S::Start, C::Digit, S::Int);
        table.add(S::Start, C::Quote, S::StrStart);
        table.add(S::Start, C::Minus, S::Minus);
        table.add(S::Start, C::Equals, S::Equals);
        table.add(S::Start, C::Slash, S::Slash);
        table.add(S::Start, C::Greater, S::Greater);
        table.add(S::Start, C::Less, S::Less);
        table.add(S::Start, C::Bang, S::Bang);
        table.add(S::Start, C::Ampersand, S::Ampersand);
        table.add(S::Start, C::Pipe, S::Pipe);
        table.add(S::Start, C::Operator, S::Operator);
        table.add(S::Start, C::Dot, S::Invalid);
        table.add(S::Start, C::Other, S::Invalid);

        table.add(S::Ident, C::Letter, S::Ident);
        table.add(S::Ident, C::Digit, S::Ident);
        table.add(S::Ident, C::Other, S::IdentEnd);

        table.add(S::Int, C::Digit, S::Int);
        table.add(S::Int, C::Dot, S::Dot);
        table.add(S::Int, C::Other, S::IntEnd);
        // "12.a" and "12." are malformed
        table.add(S::Dot, C::Digit, S::Float);
        table.add(S::Dot, C::Other, S::Invalid);
        table.add(S::Float, C::Digit, S::Float);
        table.add(S::Float, C::Other, S::FloatEnd);

        table.add(S::Minus, C::Greater, S::Arrow);
        table.add(S::Minus, C::Other, S::MinusEnd);
        table.add(S::Equals, C::Equals, S::EqualsEquals);
        table.add(S::Equals, C::Other, S::EqualsEnd);
        table.add(S::Slash, C::Slash, S::Comment);
        table.add(S::Slash, C::Other, S::SlashEnd);
        table.add(S::Greater, C::Equals, S::GreaterEquals);
        table.add(S::Greater, C::Other, S::GreaterEnd);
        table.add(S::Less, C::Equals, S::LessEquals);
        table.add(S::Less, C::Other, S::LessEnd);
        table.add(S::Bang, C::Equals, S::BangEquals);
        table.add(S::Bang, C::Other, S::BangEnd);
        // `&` and `|` only exist doubled, so there is no fallback
        table.add(S::Ampersand, C::Ampersand, S::AndAnd);
        table.add(S::Pipe, C::Pipe, S::OrOr);

        // string literals end on the line they start
        for class in (0..CLASS_COUNT as u8).filter_map(CharClass::from_u8) {
            if class == C::Newline {
                table.add(S::StrStart, class, S::Invalid);
                table.add(S::StrBody, class, S::Invalid);
            } else if class != C::Quote {
                table.add(S::StrStart, class, S::StrBody);
                table.add(S::StrBody, class, S::StrBody);
            }
        }
        table.add(S::StrStart, C::Quote, S::StrEnd);
        table.add(S::StrBody, C::Quote, S::StrEnd);

        table
    }

    fn add(&mut self, from: State, class: CharClass, to: State) {
        self.next[from as usize][class as usize] = to as u8;
    }

    fn explicit(&self, from: State, class: CharClass) -> Option<State> {
        State::from_u8(self.next[from as usize][class as usize])
    }

    /// Looks up a transition, falling back to the state's `Other` entry.
    fn next(&self, from: State, class: CharClass) -> Option<State> {
        self.explicit(from, class)
            .or_else(|| self.explicit(from, CharClass::Other))
    }
}

/// A row of the symbol log: every token in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolRecord {
    pub line: usize,
    pub lexeme: String,
    pub kind: TokenKind,
    /// Index into the identifier or constant table, if any.
    pub index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantEntry {
    pub lexeme: String,
    pub kind: PrimitiveType,
    pub index: usize,
}

/// Side tables collected while lexing. Only used for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct LexTables {
    identifiers: Vec<String>,
    identifier_index: HashMap<String, usize>,
    constants: Vec<ConstantEntry>,
    constant_index: HashMap<String, usize>,
    symbols: Vec<SymbolRecord>,
}

impl LexTables {
    /// Returns the 1-based index assigned to `ident` on first sight.
    pub fn identifier_index(&self, ident: &str) -> Option<usize> {
        self.identifier_index.get(ident).copied()
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn constant(&self, lexeme: &str) -> Option<&ConstantEntry> {
        self.constant_index
            .get(lexeme)
            .map(|&index| &self.constants[index - 1])
    }

    pub fn constants(&self) -> &[ConstantEntry] {
        &self.constants
    }

    pub fn symbols(&self) -> &[SymbolRecord] {
        &self.symbols
    }

    fn add_identifier(&mut self, ident: &str) -> usize {
        if let Some(&index) = self.identifier_index.get(ident) {
            return index;
        }
        self.identifiers.push(ident.to_string());
        let index = self.identifiers.len();
        self.identifier_index.insert(ident.to_string(), index);
        index
    }

    fn add_constant(&mut self, lexeme: &str, kind: PrimitiveType) -> usize {
        if let Some(&index) = self.constant_index.get(lexeme) {
            return index;
        }
        let index = self.constants.len() + 1;
        self.constants.push(ConstantEntry {
            lexeme: lexeme.to_string(),
            kind,
            index,
        });
        self.constant_index.insert(lexeme.to_string(), index);
        index
    }
}

impl fmt::Display for LexTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== symbols ==")?;
        writeln!(f, "{:<5} | {:<15} | {:<18} | {:<5}", "line", "lexeme", "token", "index")?;
        for record in &self.symbols {
            let index = record.index.map(|i| i.to_string()).unwrap_or_default();
            writeln!(
                f,
                "{:<5} | {:<15} | {:<18} | {:<5}",
                record.line,
                record.lexeme,
                record.kind.to_string(),
                index
            )?;
        }

        writeln!(f, "== identifiers ==")?;
        for (i, ident) in self.identifiers.iter().enumerate() {
            writeln!(f, "{} -> {}", ident, i + 1)?;
        }

        writeln!(f, "== constants ==")?;
        for constant in &self.constants {
            writeln!(f, "{} -> {} ({})", constant.lexeme, constant.kind, constant.index)?;
        }

        Ok(())
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    keywords: &'a Keywords,
    table: TransitionTable,
    tables: LexTables,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, keywords: &'a Keywords) -> Self {
        Self {
            source,
            keywords,
            table: TransitionTable::new(),
            tables: LexTables::default(),
            line: 1,
        }
    }

    /// Side tables filled by [`Self::tokenize`].
    pub fn tables(&self) -> &LexTables {
        &self.tables
    }

    /// Consumes `self` and returns the side tables.
    pub fn into_tables(self) -> LexTables {
        self.tables
    }

    /// Runs the automaton over the whole source. The returned tokens always end with
    /// [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> CompileResult<Vec<Token>> {
        let chars: Vec<char> = self.source.chars().collect();
        let mut tokens = Vec::new();
        let mut lexeme = String::new();
        let mut state = State::Start;
        let mut token_line = self.line;
        let mut pos = 0;

        while pos < chars.len() {
            let c = chars[pos];

            if state == State::Comment {
                if c == '\n' {
                    self.line += 1;
                    state = State::Start;
                }
                pos += 1;
                continue;
            }

            let class = CharClass::of(c);
            if state == State::Start {
                if let CharClass::Whitespace | CharClass::Newline = class {
                    if class == CharClass::Newline {
                        self.line += 1;
                    }
                    pos += 1;
                    continue;
                }
                token_line = self.line;
            }

            let next = match self.table.next(state, class) {
                Some(State::Invalid) | None => return Err(self.unexpected(state, c)),
                Some(next) => next,
            };

            if next.is_star() {
                // put back `c`: it starts the next token
                self.accept(next, &lexeme, token_line, &mut tokens);
                lexeme.clear();
                state = State::Start;
                continue;
            }

            pos += 1;
            if next == State::Comment {
                lexeme.clear();
                state = State::Comment;
            } else if next.accepts_directly() {
                lexeme.push(c);
                self.accept(next, &lexeme, token_line, &mut tokens);
                lexeme.clear();
                state = State::Start;
            } else {
                lexeme.push(c);
                state = next;
            }
        }

        // End of input behaves like an `Other` character.
        match state {
            State::Start | State::Comment => {}
            _ => match self.table.next(state, CharClass::Other) {
                Some(end) if end.is_star() => self.accept(end, &lexeme, token_line, &mut tokens),
                _ => return Err(self.unexpected_eof(state, token_line)),
            },
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            line: self.line,
        });
        Ok(tokens)
    }

    /// Emits the token recognized by the final `state`.
    fn accept(&mut self, state: State, lexeme: &str, line: usize, tokens: &mut Vec<Token>) {
        let mut index = None;
        let kind = match state {
            State::IdentEnd => match self.keywords.get(lexeme) {
                Some(keyword) => keyword,
                None => {
                    index = Some(self.tables.add_identifier(lexeme));
                    TokenKind::Identifier
                }
            },
            State::IntEnd => {
                index = Some(self.tables.add_constant(lexeme, PrimitiveType::Int));
                TokenKind::IntLit
            }
            State::FloatEnd => {
                index = Some(self.tables.add_constant(lexeme, PrimitiveType::Float));
                TokenKind::FloatLit
            }
            State::StrEnd => {
                index = Some(self.tables.add_constant(lexeme, PrimitiveType::String));
                TokenKind::StringLit
            }
            State::MinusEnd => TokenKind::Minus,
            State::Arrow => TokenKind::Arrow,
            State::EqualsEnd => TokenKind::Assign,
            State::EqualsEquals => TokenKind::EqualsEquals,
            State::SlashEnd => TokenKind::Slash,
            State::GreaterEnd => TokenKind::GreaterThan,
            State::GreaterEquals => TokenKind::GreaterThanEquals,
            State::LessEnd => TokenKind::LessThan,
            State::LessEquals => TokenKind::LessThanEquals,
            State::BangEnd => TokenKind::Bang,
            State::BangEquals => TokenKind::NotEquals,
            State::AndAnd => TokenKind::AndAnd,
            State::OrOr => TokenKind::OrOr,
            State::Operator => match lexeme {
                "+" => TokenKind::Plus,
                "*" => TokenKind::Star,
                "^" => TokenKind::Caret,
                "(" => TokenKind::OpenParen,
                ")" => TokenKind::CloseParen,
                "{" => TokenKind::OpenBrace,
                "}" => TokenKind::CloseBrace,
                "," => TokenKind::Comma,
                ":" => TokenKind::Colon,
                ";" => TokenKind::Semi,
                _ => unreachable!("not a single character operator: {:?}", lexeme),
            },
            _ => unreachable!("{:?} is not a final state", state),
        };

        trace!("line {}: {:?} {:?}", line, kind, lexeme);
        self.tables.symbols.push(SymbolRecord {
            line,
            lexeme: lexeme.to_string(),
            kind,
            index,
        });
        tokens.push(Token {
            kind,
            lexeme: lexeme.to_string(),
            line,
        });
    }

    fn unexpected(&self, state: State, c: char) -> CompileError {
        let reason = match state {
            State::Dot => "expected a digit after `.`",
            State::Ampersand => "expected `&&`",
            State::Pipe => "expected `||`",
            State::StrStart | State::StrBody => "unterminated string literal",
            _ => "unexpected character",
        };
        CompileError::lex(self.line, format!("{:?}", c), reason)
    }

    fn unexpected_eof(&self, state: State, token_line: usize) -> CompileError {
        match state {
            State::StrStart | State::StrBody => {
                CompileError::lex(token_line, "end of input", "unterminated string literal")
            }
            State::Dot => CompileError::lex(self.line, "end of input", "expected a digit after `.`"),
            State::Ampersand => CompileError::lex(self.line, "end of input", "expected `&&`"),
            State::Pipe => CompileError::lex(self.line, "end of input", "expected `||`"),
            _ => CompileError::lex(self.line, "end of input", "unexpected end of input"),
        }
    }
}

/// Tokenizes `source` with the default [`Keywords`].
pub fn tokenize(source: &str) -> CompileResult<Vec<Token>> {
    let keywords = Keywords::default();
    Lexer::new(source, &keywords).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn lexemes(source: &str) -> Vec<String> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|token| token.lexeme)
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("var x: int = 1"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::IntType,
                TokenKind::Assign,
                TokenKind::IntLit,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            kinds("const_value _tmp x1 true false"),
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            kinds("-> == >= <= != && ||"),
            vec![
                TokenKind::Arrow,
                TokenKind::EqualsEquals,
                TokenKind::GreaterThanEquals,
                TokenKind::LessThanEquals,
                TokenKind::NotEquals,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_putback() {
        // every star state hands the triggering character to the next token
        assert_eq!(lexemes("a-b"), vec!["a", "-", "b", ""]);
        assert_eq!(lexemes("x=1"), vec!["x", "=", "1", ""]);
        assert_eq!(lexemes("1.5*x"), vec!["1.5", "*", "x", ""]);
        assert_eq!(lexemes("a>(b)"), vec!["a", ">", "(", "b", ")", ""]);
        assert_eq!(lexemes("!x"), vec!["!", "x", ""]);
        assert_eq!(lexemes("f(\"s\")"), vec!["f", "(", "\"s\"", ")", ""]);
        assert_eq!(lexemes("12abc"), vec!["12", "abc", ""]);
    }

    #[test]
    fn test_comments_and_lines() {
        let tokens = tokenize("var x: int = 1 // the answer\n\nprint(x) // done").unwrap();
        let print = tokens.iter().find(|t| t.kind == TokenKind::Print).unwrap();
        assert_eq!(print.line, 3);
        assert!(tokens.iter().all(|t| !t.lexeme.contains("answer")));
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);

        assert_eq!(lexemes("a / b"), vec!["a", "/", "b", ""]);
    }

    #[test]
    fn test_string_literals() {
        let tokens = tokenize("print(\"\") print(\"a b // c\")").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::StringLit);
        assert_eq!(tokens[2].lexeme, "\"\"");
        assert_eq!(tokens[6].lexeme, "\"a b // c\"");

        assert_eq!(tokens[6].line, 1);
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        let err = tokenize("print(\"abc").unwrap_err();
        assert_eq!(
            err,
            CompileError::lex(1, "end of input", "unterminated string literal")
        );

        let err = tokenize("x = 1\nprint(\"a\nb\")").unwrap_err();
        assert_eq!(
            err,
            CompileError::lex(2, "'\\n'", "unterminated string literal")
        );
    }

    #[test]
    fn test_end_of_input_finishes_pending_token() {
        assert_eq!(lexemes("abc"), vec!["abc", ""]);
        assert_eq!(lexemes("42"), vec!["42", ""]);
        assert_eq!(lexemes("4.25"), vec!["4.25", ""]);
        assert_eq!(kinds("x -"), vec![TokenKind::Identifier, TokenKind::Minus, TokenKind::Eof]);
    }

    #[test]
    fn test_errors() {
        let err = tokenize("var x: int = 1\nx = @").unwrap_err();
        assert_eq!(err, CompileError::lex(2, "'@'", "unexpected character"));

        let err = tokenize("12.a").unwrap_err();
        assert_eq!(err, CompileError::lex(1, "'a'", "expected a digit after `.`"));

        let err = tokenize("12.").unwrap_err();
        assert_eq!(
            err,
            CompileError::lex(1, "end of input", "expected a digit after `.`")
        );

        let err = tokenize(".5").unwrap_err();
        assert_eq!(err.line(), 1);

        let err = tokenize("a & b").unwrap_err();
        assert_eq!(err, CompileError::lex(1, "' '", "expected `&&`"));
    }

    #[test]
    fn test_side_tables() {
        let keywords = Keywords::default();
        let mut lexer = Lexer::new("var b: int = 2 var a: int = b + 2 print(\"hi\")", &keywords);
        lexer.tokenize().unwrap();
        let tables = lexer.tables();

        assert_eq!(tables.identifiers(), &["b".to_string(), "a".to_string()]);
        assert_eq!(tables.identifier_index("b"), Some(1));
        assert_eq!(tables.identifier_index("a"), Some(2));
        assert_eq!(tables.identifier_index("var"), None);

        assert_eq!(tables.constants().len(), 2);
        let two = tables.constant("2").unwrap();
        assert_eq!((two.kind, two.index), (PrimitiveType::Int, 1));
        let hi = tables.constant("\"hi\"").unwrap();
        assert_eq!((hi.kind, hi.index), (PrimitiveType::String, 2));

        let b_uses: Vec<_> = tables
            .symbols()
            .iter()
            .filter(|record| record.lexeme == "b")
            .map(|record| record.index)
            .collect();
        assert_eq!(b_uses, vec![Some(1), Some(1)]);
    }

    #[test]
    fn test_lexemes_reconstruct_input() {
        let source = "fun area(r: float) -> float {\n  return PI * r ^ 2 // squared\n}\nprint(area(2.0) >= 1)";
        let joined: String = lexemes(source).concat();
        let stripped: String = source
            .replace("// squared", "")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        assert_eq!(joined, stripped);
    }
}
