//! # Pratt Parser
//!
//! Builds an [`ast::Program`] from a token stream using precedence-climbing
//! (Pratt) parsing: each token kind maps to at most one prefix parse
//! function and at most one infix parse function, looked up from a table
//! built once in [`Parser::new`].
//!
//! Parse errors are accumulated rather than raised immediately — the parser
//! keeps going after a bad token so that a single `parse()` call can surface
//! as many problems as possible. The driver (`lib.rs::run`) treats any
//! non-empty error list as fatal and does not invoke the compiler.

use std::collections::HashMap;

use crate::ast::{Expr, Identifier, Program, Stmt};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Slash | TokenKind::Asterisk => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

type PrefixFn = fn(&mut Parser) -> Option<Expr>;
type InfixFn = fn(&mut Parser, Expr) -> Option<Expr>;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
    pub errors: Vec<String>,
    prefix_fns: HashMap<TokenKind, PrefixFn>,
    infix_fns: HashMap<TokenKind, InfixFn>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();

        let mut prefix_fns: HashMap<TokenKind, PrefixFn> = HashMap::new();
        prefix_fns.insert(TokenKind::Ident, Parser::parse_identifier);
        prefix_fns.insert(TokenKind::Int, Parser::parse_int_literal);
        prefix_fns.insert(TokenKind::Str, Parser::parse_string_literal);
        prefix_fns.insert(TokenKind::True, Parser::parse_bool_literal);
        prefix_fns.insert(TokenKind::False, Parser::parse_bool_literal);
        prefix_fns.insert(TokenKind::Bang, Parser::parse_prefix_expr);
        prefix_fns.insert(TokenKind::Minus, Parser::parse_prefix_expr);
        prefix_fns.insert(TokenKind::LParen, Parser::parse_grouped_expr);
        prefix_fns.insert(TokenKind::If, Parser::parse_if_expr);
        prefix_fns.insert(TokenKind::Function, Parser::parse_function_literal);
        prefix_fns.insert(TokenKind::LBracket, Parser::parse_array_literal);
        prefix_fns.insert(TokenKind::LBrace, Parser::parse_hash_literal);

        let mut infix_fns: HashMap<TokenKind, InfixFn> = HashMap::new();
        for kind in [
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Slash,
            TokenKind::Asterisk,
            TokenKind::Eq,
            TokenKind::NotEq,
            TokenKind::Lt,
            TokenKind::Gt,
        ] {
            infix_fns.insert(kind, Parser::parse_infix_expr);
        }
        infix_fns.insert(TokenKind::LParen, Parser::parse_call_expr);
        infix_fns.insert(TokenKind::LBracket, Parser::parse_index_expr);

        Self {
            lexer,
            current,
            peek,
            errors: Vec::new(),
            prefix_fns,
            infix_fns,
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while self.current.kind != TokenKind::Eof {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.advance();
        }
        Program { statements }
    }

    fn advance(&mut self) {
        self.current = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_is(kind) {
            self.advance();
            true
        } else {
            self.errors.push(format!(
                "expected next token to be {}, got {} instead",
                kind, self.peek.kind
            ));
            false
        }
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek.kind)
    }

    fn current_precedence(&self) -> Precedence {
        precedence_of(self.current.kind)
    }

    // ---- Statements ----------------------------------------------------

    fn parse_statement(&mut self) -> Option<Stmt> {
        match self.current.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expr_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Stmt> {
        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name = Identifier {
            name: self.current.literal.clone(),
        };
        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.advance();
        }
        Some(Stmt::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Stmt> {
        self.advance();
        let value = if self.current_is(TokenKind::Semicolon) {
            None
        } else {
            let expr = self.parse_expression(Precedence::Lowest)?;
            Some(expr)
        };
        if self.peek_is(TokenKind::Semicolon) {
            self.advance();
        }
        Some(Stmt::Return { value })
    }

    fn parse_expr_statement(&mut self) -> Option<Stmt> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.advance();
        }
        Some(Stmt::ExprStmt { expr })
    }

    fn parse_block_statement(&mut self) -> Stmt {
        let mut statements = Vec::new();
        self.advance();
        while !self.current_is(TokenKind::RBrace) && !self.current_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.advance();
        }
        Stmt::Block { statements }
    }

    // ---- Expressions -----------------------------------------------------

    fn parse_expression(&mut self, min_prec: Precedence) -> Option<Expr> {
        let prefix = self.prefix_fns.get(&self.current.kind).copied();
        let Some(prefix) = prefix else {
            self.errors.push(format!(
                "no prefix parse function for token {}",
                self.current.kind
            ));
            return None;
        };
        let mut left = prefix(self)?;

        while !self.peek_is(TokenKind::Semicolon) && min_prec < self.peek_precedence() {
            let infix = self.infix_fns.get(&self.peek.kind).copied();
            let Some(infix) = infix else {
                return Some(left);
            };
            self.advance();
            left = infix(self, left)?;
        }

        Some(left)
    }

    fn parse_identifier(&mut self) -> Option<Expr> {
        Some(Expr::Ident(self.current.literal.clone()))
    }

    fn parse_int_literal(&mut self) -> Option<Expr> {
        match self.current.literal.parse::<i64>() {
            Ok(v) => Some(Expr::IntLit(v)),
            Err(_) => {
                self.errors
                    .push(format!("could not parse {} as integer", self.current.literal));
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expr> {
        Some(Expr::StringLit(self.current.literal.clone()))
    }

    fn parse_bool_literal(&mut self) -> Option<Expr> {
        Some(Expr::BoolLit(self.current_is(TokenKind::True)))
    }

    fn parse_prefix_expr(&mut self) -> Option<Expr> {
        let operator = self.current.literal.clone();
        self.advance();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expr::Prefix {
            operator,
            right: Box::new(right),
        })
    }

    fn parse_infix_expr(&mut self, left: Expr) -> Option<Expr> {
        let operator = self.current.literal.clone();
        let precedence = self.current_precedence();
        self.advance();
        let right = self.parse_expression(precedence)?;
        Some(Expr::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_grouped_expr(&mut self) -> Option<Expr> {
        self.advance();
        let expr = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(expr)
    }

    fn parse_if_expr(&mut self) -> Option<Expr> {
        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let consequence = self.parse_block_statement();

        let alternative = if self.peek_is(TokenKind::Else) {
            self.advance();
            if !self.expect_peek(TokenKind::LBrace) {
                return None;
            }
            Some(Box::new(self.parse_block_statement()))
        } else {
            None
        };

        Some(Expr::If {
            condition: Box::new(condition),
            consequence: Box::new(consequence),
            alternative,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expr> {
        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        let params = self.parse_function_params()?;
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let body = self.parse_block_statement();
        Some(Expr::FunctionLit {
            params,
            body: Box::new(body),
        })
    }

    fn parse_function_params(&mut self) -> Option<Vec<Identifier>> {
        let mut params = Vec::new();

        if self.peek_is(TokenKind::RParen) {
            self.advance();
            return Some(params);
        }

        self.advance();
        params.push(Identifier {
            name: self.current.literal.clone(),
        });

        while self.peek_is(TokenKind::Comma) {
            self.advance();
            self.advance();
            params.push(Identifier {
                name: self.current.literal.clone(),
            });
        }

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(params)
    }

    fn parse_call_expr(&mut self, function: Expr) -> Option<Expr> {
        let args = self.parse_expr_list(TokenKind::RParen)?;
        Some(Expr::Call {
            function: Box::new(function),
            args,
        })
    }

    fn parse_index_expr(&mut self, left: Expr) -> Option<Expr> {
        self.advance();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RBracket) {
            return None;
        }
        Some(Expr::Index {
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_array_literal(&mut self) -> Option<Expr> {
        let elements = self.parse_expr_list(TokenKind::RBracket)?;
        Some(Expr::ArrayLit(elements))
    }

    fn parse_hash_literal(&mut self) -> Option<Expr> {
        let mut pairs = Vec::new();

        while !self.peek_is(TokenKind::RBrace) {
            self.advance();
            let key = self.parse_expression(Precedence::Lowest)?;

            if !self.expect_peek(TokenKind::Colon) {
                return None;
            }
            self.advance();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.peek_is(TokenKind::RBrace) && !self.expect_peek(TokenKind::Comma) {
                return None;
            }
        }

        if !self.expect_peek(TokenKind::RBrace) {
            return None;
        }
        Some(Expr::HashLit(pairs))
    }

    fn parse_expr_list(&mut self, end: TokenKind) -> Option<Vec<Expr>> {
        let mut list = Vec::new();

        if self.peek_is(end) {
            self.advance();
            return Some(list);
        }

        self.advance();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_is(TokenKind::Comma) {
            self.advance();
            self.advance();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }
        Some(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Program {
        let lexer = Lexer::new(input.as_bytes());
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();
        assert!(
            parser.errors.is_empty(),
            "parser errors: {:?}",
            parser.errors
        );
        program
    }

    #[test]
    fn let_statements() {
        let program = parse("let x = 5; let y = true; let foobar = y;");
        assert_eq!(program.statements.len(), 3);
        match &program.statements[0] {
            Stmt::Let { name, value } => {
                assert_eq!(name.name, "x");
                assert_eq!(*value, Expr::IntLit(5));
            }
            other => panic!("expected let statement, got {other:?}"),
        }
    }

    #[test]
    fn return_statements() {
        let program = parse("return 5; return; return 993322;");
        assert_eq!(program.statements.len(), 3);
        assert_eq!(
            program.statements[1],
            Stmt::Return { value: None }
        );
    }

    #[test]
    fn operator_precedence_round_trips_through_display() {
        let cases = [
            ("-a * b", "((-a) * b)"),
            ("a + b + c", "((a + b) + c)"),
            ("a + b * c", "(a + (b * c))"),
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
            ("a * [1, 2, 3, 4][b * c] * d", "((a * ([1, 2, 3, 4][(b * c)])) * d)"),
        ];

        for (input, want) in cases {
            let program = parse(input);
            assert_eq!(program.to_string(), want);
        }
    }

    #[test]
    fn if_and_function_literal_display_round_trips_through_reparse() {
        let cases = [
            "if (x < y) { x } else { y }",
            "if (true) { 1 }",
            "let fib = fn(n) { if (n < 2) { n } else { fib(n - 1) + fib(n - 2) } };",
        ];

        for input in cases {
            let first = parse(input);
            let rendered = first.to_string();
            let second = parse(&rendered);
            assert_eq!(first, second, "round trip mismatch for {input:?}: rendered {rendered:?}");
        }
    }

    #[test]
    fn if_expression() {
        let program = parse("if (x < y) { x }");
        match &program.statements[0] {
            Stmt::ExprStmt {
                expr: Expr::If { alternative, .. },
            } => assert!(alternative.is_none()),
            other => panic!("expected if expression, got {other:?}"),
        }
    }

    #[test]
    fn function_literal_params() {
        let program = parse("fn(x, y, z) {};");
        match &program.statements[0] {
            Stmt::ExprStmt {
                expr: Expr::FunctionLit { params, .. },
            } => {
                let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
                assert_eq!(names, ["x", "y", "z"]);
            }
            other => panic!("expected function literal, got {other:?}"),
        }
    }

    #[test]
    fn call_expression_args() {
        let program = parse("add(1, 2 * 3, 4 + 5);");
        match &program.statements[0] {
            Stmt::ExprStmt {
                expr: Expr::Call { args, .. },
            } => assert_eq!(args.len(), 3),
            other => panic!("expected call expression, got {other:?}"),
        }
    }

    #[test]
    fn hash_literal_string_keys() {
        let program = parse(r#"{"one": 1, "two": 2, "three": 3}"#);
        match &program.statements[0] {
            Stmt::ExprStmt {
                expr: Expr::HashLit(pairs),
            } => assert_eq!(pairs.len(), 3),
            other => panic!("expected hash literal, got {other:?}"),
        }
    }

    #[test]
    fn missing_rparen_records_error() {
        let lexer = Lexer::new(b"(1 + 2");
        let mut parser = Parser::new(lexer);
        parser.parse_program();
        assert!(!parser.errors.is_empty());
        assert!(parser.errors[0].contains("expected next token to be RParen"));
    }

    #[test]
    fn unknown_prefix_records_error() {
        let lexer = Lexer::new(b"*5;");
        let mut parser = Parser::new(lexer);
        parser.parse_program();
        assert!(parser
            .errors
            .iter()
            .any(|e| e.contains("no prefix parse function")));
    }
}
