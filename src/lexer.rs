//! Lexical Analyzer for the lpm language
//!
//! This module implements the tokenization phase of the lpm interpreter
//! pipeline. It converts raw source code text into a stream of tokens that
//! can be parsed into an Abstract Syntax Tree.
//!
//! ## Tokenization Process
//!
//! The lexer performs several key functions:
//! 1. **Character Processing**: iterates through source code character by character
//! 2. **Token Recognition**: identifies keywords, operators, literals, and identifiers
//! 3. **Comment Filtering**: none (the language has no comment syntax)
//! 4. **Lookahead**: one character of lookahead for `==`, `!=`, and string literals
//!
//! ## Supported Tokens
//!
//! - **Literals**: integers (`42`), strings (`"hola"`)
//! - **Identifiers**: variable and function names, including the Spanish
//!   accented letter set
//! - **Keywords**: `variable`, `procedimiento`, `si`, `si_no`, `regresa`,
//!   `verdadero`, `falso`
//! - **Operators**: `= + - * / < > == != !`
//! - **Delimiters**: `( ) { } , ;`
//!
//! ## Design Notes
//!
//! The lexer never fails: any byte it cannot classify becomes an `Illegal`
//! token carrying that single character, and parsing/evaluation decide what
//! to do with it. This mirrors the reference implementation, which has no
//! lexical error channel at all.

use std::fmt;

/// The closed set of token kinds produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,

    // Identifiers and literals
    Ident,
    Int,
    String,

    // Operators
    Assign,
    Plus,
    Substract,
    Multiplication,
    Divide,
    Different,
    Lt,
    Gt,
    Eq,
    NotEq,

    // Delimiters
    Comma,
    Semicolon,
    Lparen,
    Rparen,
    Lbrace,
    Rbrace,

    // Keywords
    Let,
    Function,
    If,
    Else,
    Return,
    True,
    False,
}

/// A single lexical token: a kind tag plus the exact source text that
/// produced it. Equality is structural over `(kind, literal)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self {
            kind,
            literal: literal.into(),
        }
    }

    pub fn eof() -> Self {
        Self::new(TokenKind::Eof, "")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Type: {:?} Literal: {}", self.kind, self.literal)
    }
}

/// Maps a scanned identifier to its keyword token kind, or `Ident` if it is
/// not a reserved word.
fn lookup_ident(literal: &str) -> TokenKind {
    match literal {
        "variable" => TokenKind::Let,
        "procedimiento" => TokenKind::Function,
        "si" => TokenKind::If,
        "si_no" => TokenKind::Else,
        "regresa" => TokenKind::Return,
        "verdadero" => TokenKind::True,
        "falso" => TokenKind::False,
        _ => TokenKind::Ident,
    }
}

/// Returns true for characters that may appear in an identifier: ASCII
/// letters, underscore, and the Spanish accented vowels/ñ (both cases).
fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
        || c == '_'
        || matches!(c, 'á' | 'é' | 'í' | 'ó' | 'ú' | 'Á' | 'É' | 'Í' | 'Ó' | 'Ú' | 'ñ' | 'Ñ')
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

const NUL: char = '\0';

/// Stateful cursor over a source string. Exposes a single `next_token`
/// operation and is otherwise stateless with respect to previously
/// produced tokens.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    read_position: usize,
    ch: char,
}

impl Lexer {
    /// Creates a new lexer over `source`, priming the current character.
    pub fn new(source: &str) -> Self {
        let mut lexer = Self {
            input: source.chars().collect(),
            position: 0,
            read_position: 0,
            ch: NUL,
        };
        lexer.read_char();
        lexer
    }

    /// Scans and returns the next token, advancing the cursor past it.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.ch {
            '=' => self.two_char_or(TokenKind::Assign, '=', TokenKind::Eq),
            '!' => self.two_char_or(TokenKind::Different, '=', TokenKind::NotEq),
            '+' => self.single_char(TokenKind::Plus),
            '-' => self.single_char(TokenKind::Substract),
            '*' => self.single_char(TokenKind::Multiplication),
            '/' => self.single_char(TokenKind::Divide),
            '<' => self.single_char(TokenKind::Lt),
            '>' => self.single_char(TokenKind::Gt),
            ',' => self.single_char(TokenKind::Comma),
            ';' => self.single_char(TokenKind::Semicolon),
            '(' => self.single_char(TokenKind::Lparen),
            ')' => self.single_char(TokenKind::Rparen),
            '{' => self.single_char(TokenKind::Lbrace),
            '}' => self.single_char(TokenKind::Rbrace),
            '"' => {
                let literal = self.read_string();
                Token::new(TokenKind::String, literal)
            }
            NUL => Token::eof(),
            c if is_letter(c) => {
                let literal = self.read_identifier();
                let kind = lookup_ident(&literal);
                Token::new(kind, literal)
            }
            c if is_digit(c) => {
                let literal = self.read_number_or_digit_led_identifier();
                if literal.chars().all(is_digit) {
                    Token::new(TokenKind::Int, literal)
                } else {
                    Token::new(lookup_ident(&literal), literal)
                }
            }
            c => {
                let literal = c.to_string();
                self.read_char();
                Token::new(TokenKind::Illegal, literal)
            }
        }
    }

    fn single_char(&mut self, kind: TokenKind) -> Token {
        let literal = self.ch.to_string();
        self.read_char();
        Token::new(kind, literal)
    }

    /// Emits `kind` for the current character alone, or `two_kind` if the
    /// next character is `second` (consuming both).
    fn two_char_or(&mut self, kind: TokenKind, second: char, two_kind: TokenKind) -> Token {
        if self.peek_char() == second {
            let literal = format!("{}{}", self.ch, second);
            self.read_char();
            self.read_char();
            Token::new(two_kind, literal)
        } else {
            self.single_char(kind)
        }
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while is_letter(self.ch) || is_digit(self.ch) {
            self.read_char();
        }
        self.input[start..self.position].iter().collect()
    }

    /// Reads a maximal digit run starting at the current (digit) character.
    /// If, once the run ends, the next character is itself an identifier
    /// character (letter, underscore, or another digit run continuing past
    /// a non-digit), the cursor keeps consuming identifier-continuation
    /// characters and the whole span is returned as one token's literal,
    /// matching the reference lexer's acceptance of `1_foo` as a single
    /// `IDENT` rather than an `INT` followed by an `IDENT`.
    fn read_number_or_digit_led_identifier(&mut self) -> String {
        let start = self.position;
        while is_digit(self.ch) {
            self.read_char();
        }
        if is_letter(self.ch) {
            while is_letter(self.ch) || is_digit(self.ch) {
                self.read_char();
            }
        }
        self.input[start..self.position].iter().collect()
    }

    /// Reads a string literal. Called with the current character positioned
    /// on the opening `"`; consumes it, every character up to (and
    /// including) the closing `"`, and returns the inner text. No escape
    /// sequences are processed; `"` is the sole terminator. An unterminated
    /// string runs to end of input.
    fn read_string(&mut self) -> String {
        self.read_char(); // consume opening '"'
        let start = self.position;
        while self.ch != '"' && self.ch != NUL {
            self.read_char();
        }
        let text: String = self.input[start..self.position].iter().collect();
        if self.ch == '"' {
            self.read_char(); // consume closing '"'
        }
        text
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, ' ' | '\t' | '\n' | '\r') {
            self.read_char();
        }
    }

    fn read_char(&mut self) {
        self.ch = if self.read_position >= self.input.len() {
            NUL
        } else {
            self.input[self.read_position]
        };
        self.position = self.read_position;
        self.read_position += 1;
    }

    fn peek_char(&self) -> char {
        if self.read_position >= self.input.len() {
            NUL
        } else {
            self.input[self.read_position]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens_of(source: &str, count: usize) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        (0..count).map(|_| lexer.next_token()).collect()
    }

    #[test]
    fn test_illegal() {
        let tokens = tokens_of("¡¿@", 3);
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Illegal, "¡"),
                Token::new(TokenKind::Illegal, "¿"),
                Token::new(TokenKind::Illegal, "@"),
            ]
        );
    }

    #[test]
    fn test_one_character_operator() {
        let tokens = tokens_of("=+-/*<>!", 8);
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Assign, "="),
                Token::new(TokenKind::Plus, "+"),
                Token::new(TokenKind::Substract, "-"),
                Token::new(TokenKind::Divide, "/"),
                Token::new(TokenKind::Multiplication, "*"),
                Token::new(TokenKind::Lt, "<"),
                Token::new(TokenKind::Gt, ">"),
                Token::new(TokenKind::Different, "!"),
            ]
        );
    }

    #[test]
    fn test_eof() {
        let tokens = tokens_of("+", 2);
        assert_eq!(tokens, vec![Token::new(TokenKind::Plus, "+"), Token::eof()]);
    }

    #[test]
    fn test_delimiters() {
        let tokens = tokens_of("(){},;", 6);
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Lparen, "("),
                Token::new(TokenKind::Rparen, ")"),
                Token::new(TokenKind::Lbrace, "{"),
                Token::new(TokenKind::Rbrace, "}"),
                Token::new(TokenKind::Comma, ","),
                Token::new(TokenKind::Semicolon, ";"),
            ]
        );
    }

    #[test]
    fn test_assignment() {
        let tokens = tokens_of("variable cinco = 5;", 5);
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Let, "variable"),
                Token::new(TokenKind::Ident, "cinco"),
                Token::new(TokenKind::Assign, "="),
                Token::new(TokenKind::Int, "5"),
                Token::new(TokenKind::Semicolon, ";"),
            ]
        );
    }

    #[test]
    fn test_function_declaration() {
        let source = "
            variable suma = procedimiento(x, y) {
                x + y;
            };
        ";
        let tokens = tokens_of(source, 16);
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Let, "variable"),
                Token::new(TokenKind::Ident, "suma"),
                Token::new(TokenKind::Assign, "="),
                Token::new(TokenKind::Function, "procedimiento"),
                Token::new(TokenKind::Lparen, "("),
                Token::new(TokenKind::Ident, "x"),
                Token::new(TokenKind::Comma, ","),
                Token::new(TokenKind::Ident, "y"),
                Token::new(TokenKind::Rparen, ")"),
                Token::new(TokenKind::Lbrace, "{"),
                Token::new(TokenKind::Ident, "x"),
                Token::new(TokenKind::Plus, "+"),
                Token::new(TokenKind::Ident, "y"),
                Token::new(TokenKind::Semicolon, ";"),
                Token::new(TokenKind::Rbrace, "}"),
                Token::new(TokenKind::Semicolon, ";"),
            ]
        );
    }

    #[test]
    fn test_control_statement() {
        let source = "
            si (5 < 10){
                regresa verdadero;
            } si_no {
                regresa falso;
            }
        ";
        let tokens = tokens_of(source, 17);
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::If, "si"),
                Token::new(TokenKind::Lparen, "("),
                Token::new(TokenKind::Int, "5"),
                Token::new(TokenKind::Lt, "<"),
                Token::new(TokenKind::Int, "10"),
                Token::new(TokenKind::Rparen, ")"),
                Token::new(TokenKind::Lbrace, "{"),
                Token::new(TokenKind::Return, "regresa"),
                Token::new(TokenKind::True, "verdadero"),
                Token::new(TokenKind::Semicolon, ";"),
                Token::new(TokenKind::Rbrace, "}"),
                Token::new(TokenKind::Else, "si_no"),
                Token::new(TokenKind::Lbrace, "{"),
                Token::new(TokenKind::Return, "regresa"),
                Token::new(TokenKind::False, "falso"),
                Token::new(TokenKind::Semicolon, ";"),
                Token::new(TokenKind::Rbrace, "}"),
            ]
        );
    }

    #[test]
    fn test_two_character_operator() {
        let source = "
            10 == 10;
            10 != 9;
        ";
        let tokens = tokens_of(source, 8);
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Int, "10"),
                Token::new(TokenKind::Eq, "=="),
                Token::new(TokenKind::Int, "10"),
                Token::new(TokenKind::Semicolon, ";"),
                Token::new(TokenKind::Int, "10"),
                Token::new(TokenKind::NotEq, "!="),
                Token::new(TokenKind::Int, "9"),
                Token::new(TokenKind::Semicolon, ";"),
            ]
        );
    }

    #[test]
    fn test_identifier_cant_start_with_number() {
        let tokens = tokens_of("1_foo;", 3);
        assert_eq!(tokens.len(), 3);
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Ident, "1_foo"),
                Token::new(TokenKind::Semicolon, ";"),
                Token::eof(),
            ]
        );
    }

    #[test]
    fn test_plain_integer_is_still_int() {
        let tokens = tokens_of("42;", 2);
        assert_eq!(tokens[0], Token::new(TokenKind::Int, "42"));
    }

    #[test]
    fn test_string() {
        let source = "
            \"foo\";
            \"Platzi es la mejor escuela de CS\";
        ";
        let tokens = tokens_of(source, 4);
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::String, "foo"),
                Token::new(TokenKind::Semicolon, ";"),
                Token::new(TokenKind::String, "Platzi es la mejor escuela de CS"),
                Token::new(TokenKind::Semicolon, ";"),
            ]
        );
    }

    #[test]
    fn test_spanish_letters_in_identifier() {
        let tokens = tokens_of("variable niño = 1;", 5);
        assert_eq!(tokens[1], Token::new(TokenKind::Ident, "niño"));
    }
}
