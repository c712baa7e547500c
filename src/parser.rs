//! Pratt parser for the lpm language.
//!
//! Converts a token stream into a `Program` AST using precedence climbing:
//! every token kind that can start an expression is registered against a
//! "prefix" parse function, and every token kind that can continue one
//! (a binary operator, or `(` for a call) is registered against an "infix"
//! parse function. `parse_expression` loops: parse a prefix production,
//! then keep folding in infix productions as long as the next token binds
//! tighter than the precedence it was called with.
//!
//! The parser never aborts on a syntax error. It records a human-readable
//! message in `errors` and returns `None` from the current production,
//! which may elide the rest of that statement. The top-level driver is
//! expected to check `errors` before evaluating anything.

use std::collections::HashMap;

use crate::ast::{Block, Expression, Identifier, Program, Statement};
use crate::lexer::{Lexer, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

fn precedence_of(kind: &TokenKind) -> Precedence {
    match kind {
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Substract => Precedence::Sum,
        TokenKind::Divide | TokenKind::Multiplication => Precedence::Product,
        TokenKind::Lparen => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

type PrefixParseFn = fn(&mut Parser) -> Option<Expression>;
type InfixParseFn = fn(&mut Parser, Expression) -> Option<Expression>;

/// Maintains a two-token lookahead (`current`, `peek`) over a `Lexer` and
/// accumulates parse errors while building a `Program`.
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    peek_token: Token,
    errors: Vec<String>,
    prefix_parse_fns: HashMap<TokenKind, PrefixParseFn>,
    infix_parse_fns: HashMap<TokenKind, InfixParseFn>,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let current_token = lexer.next_token();
        let peek_token = lexer.next_token();

        let mut prefix_parse_fns: HashMap<TokenKind, PrefixParseFn> = HashMap::new();
        prefix_parse_fns.insert(TokenKind::Ident, Parser::parse_identifier);
        prefix_parse_fns.insert(TokenKind::Int, Parser::parse_integer_literal);
        prefix_parse_fns.insert(TokenKind::Substract, Parser::parse_prefix_expression);
        prefix_parse_fns.insert(TokenKind::Different, Parser::parse_prefix_expression);
        prefix_parse_fns.insert(TokenKind::True, Parser::parse_boolean_literal);
        prefix_parse_fns.insert(TokenKind::False, Parser::parse_boolean_literal);
        prefix_parse_fns.insert(TokenKind::Lparen, Parser::parse_grouped_expression);
        prefix_parse_fns.insert(TokenKind::If, Parser::parse_if_expression);
        prefix_parse_fns.insert(TokenKind::Function, Parser::parse_function_literal);
        prefix_parse_fns.insert(TokenKind::String, Parser::parse_string_literal);

        let mut infix_parse_fns: HashMap<TokenKind, InfixParseFn> = HashMap::new();
        infix_parse_fns.insert(TokenKind::Plus, Parser::parse_infix_expression);
        infix_parse_fns.insert(TokenKind::Substract, Parser::parse_infix_expression);
        infix_parse_fns.insert(TokenKind::Divide, Parser::parse_infix_expression);
        infix_parse_fns.insert(TokenKind::Multiplication, Parser::parse_infix_expression);
        infix_parse_fns.insert(TokenKind::Eq, Parser::parse_infix_expression);
        infix_parse_fns.insert(TokenKind::NotEq, Parser::parse_infix_expression);
        infix_parse_fns.insert(TokenKind::Lt, Parser::parse_infix_expression);
        infix_parse_fns.insert(TokenKind::Gt, Parser::parse_infix_expression);
        infix_parse_fns.insert(TokenKind::Lparen, Parser::parse_call_expression);

        Self {
            lexer,
            current_token,
            peek_token,
            errors: Vec::new(),
            prefix_parse_fns,
            infix_parse_fns,
        }
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Parses the whole token stream into a `Program`.
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while self.current_token.kind != TokenKind::Eof {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.advance_tokens();
        }

        Program { statements }
    }

    fn advance_tokens(&mut self) {
        std::mem::swap(&mut self.current_token, &mut self.peek_token);
        self.peek_token = self.lexer.next_token();
    }

    /// If `peek` is `kind`, consumes it and returns true. Otherwise records
    /// an error and returns false, leaving the cursor unchanged.
    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_token.kind == kind {
            self.advance_tokens();
            true
        } else {
            self.peek_error(kind);
            false
        }
    }

    fn peek_error(&mut self, expected: TokenKind) {
        self.errors.push(format!(
            "Se esperaba que el siguiente token fuera {:?} pero se obtuvo {:?}",
            expected, self.peek_token.kind
        ));
    }

    fn current_precedence(&self) -> Precedence {
        precedence_of(&self.current_token.kind)
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(&self.peek_token.kind)
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current_token.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        let let_token = self.current_token.clone();

        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name = Identifier {
            token: self.current_token.clone(),
            value: self.current_token.literal.clone(),
        };

        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }
        self.advance_tokens();

        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token.kind == TokenKind::Semicolon {
            self.advance_tokens();
        }

        Some(Statement::Let {
            token: let_token,
            name,
            value,
        })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let return_token = self.current_token.clone();
        self.advance_tokens();

        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token.kind == TokenKind::Semicolon {
            self.advance_tokens();
        }

        Some(Statement::Return {
            token: return_token,
            value,
        })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let token = self.current_token.clone();
        let expression = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token.kind == TokenKind::Semicolon {
            self.advance_tokens();
        }

        Some(Statement::Expression { token, expression })
    }

    fn parse_block_statement(&mut self) -> Block {
        let token = self.current_token.clone();
        let mut statements = Vec::new();

        self.advance_tokens();

        while self.current_token.kind != TokenKind::Rbrace
            && self.current_token.kind != TokenKind::Eof
        {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.advance_tokens();
        }

        Block { token, statements }
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let prefix = match self.prefix_parse_fns.get(&self.current_token.kind) {
            Some(prefix) => *prefix,
            None => {
                self.errors.push(format!(
                    "No se encontró ninguna función para parsear {}",
                    self.current_token.literal
                ));
                return None;
            }
        };

        let mut left = prefix(self)?;

        while self.peek_token.kind != TokenKind::Semicolon && precedence < self.peek_precedence() {
            let infix = match self.infix_parse_fns.get(&self.peek_token.kind) {
                Some(infix) => *infix,
                None => return Some(left),
            };
            self.advance_tokens();
            left = infix(self, left)?;
        }

        Some(left)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(Identifier {
            token: self.current_token.clone(),
            value: self.current_token.literal.clone(),
        }))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let token = self.current_token.clone();
        match token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::IntegerLiteral { token, value }),
            Err(_) => {
                self.errors.push(format!(
                    "No se ha podido parsear {} como entero.",
                    token.literal
                ));
                None
            }
        }
    }

    fn parse_boolean_literal(&mut self) -> Option<Expression> {
        let token = self.current_token.clone();
        let value = token.kind == TokenKind::True;
        Some(Expression::BooleanLiteral { token, value })
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        let token = self.current_token.clone();
        let value = token.literal.clone();
        Some(Expression::StringLiteral { token, value })
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let token = self.current_token.clone();
        let operator = token.literal.clone();

        self.advance_tokens();
        let right = self.parse_expression(Precedence::Prefix)?;

        Some(Expression::Prefix {
            token,
            operator,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.current_token.clone();
        let operator = token.literal.clone();
        let precedence = self.current_precedence();

        self.advance_tokens();
        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix {
            token,
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.advance_tokens();
        let expression = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::Rparen) {
            return None;
        }

        Some(expression)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        let token = self.current_token.clone();

        if !self.expect_peek(TokenKind::Lparen) {
            return None;
        }
        self.advance_tokens();

        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::Rparen) {
            return None;
        }
        if !self.expect_peek(TokenKind::Lbrace) {
            return None;
        }

        let consequence = self.parse_block_statement();
        let mut alternative = None;

        if self.peek_token.kind == TokenKind::Else {
            self.advance_tokens();
            if !self.expect_peek(TokenKind::Lbrace) {
                return None;
            }
            alternative = Some(self.parse_block_statement());
        }

        Some(Expression::If {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        let token = self.current_token.clone();

        if !self.expect_peek(TokenKind::Lparen) {
            return None;
        }

        let parameters = self.parse_function_parameters()?;

        if !self.expect_peek(TokenKind::Lbrace) {
            return None;
        }

        let body = self.parse_block_statement();

        Some(Expression::FunctionLiteral {
            token,
            parameters,
            body,
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut params = Vec::new();

        if self.peek_token.kind == TokenKind::Rparen {
            self.advance_tokens();
            return Some(params);
        }

        self.advance_tokens();
        params.push(Identifier {
            token: self.current_token.clone(),
            value: self.current_token.literal.clone(),
        });

        while self.peek_token.kind == TokenKind::Comma {
            self.advance_tokens();
            self.advance_tokens();
            params.push(Identifier {
                token: self.current_token.clone(),
                value: self.current_token.literal.clone(),
            });
        }

        if !self.expect_peek(TokenKind::Rparen) {
            return None;
        }

        Some(params)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let token = self.current_token.clone();
        let arguments = self.parse_expression_list(TokenKind::Rparen)?;

        Some(Expression::Call {
            token,
            function: Box::new(function),
            arguments,
        })
    }

    /// Shared shape for call-argument and (structurally identical)
    /// parameter-less expression lists: an immediate closing token yields an
    /// empty list, otherwise one expression followed by `, expression` pairs,
    /// terminated by the closing token.
    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek_token.kind == end {
            self.advance_tokens();
            return Some(list);
        }

        self.advance_tokens();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token.kind == TokenKind::Comma {
            self.advance_tokens();
            self.advance_tokens();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }

        Some(list)
    }
}
