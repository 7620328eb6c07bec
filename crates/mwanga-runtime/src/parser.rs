//! Syntax analysis (Pratt parsing)
//!
//! The parser turns the token stream into the AST consumed by the
//! evaluator. Errors are collected rather than thrown; on a parse
//! error the parser re-synchronizes at the next statement boundary and
//! keeps going, so one pass reports as much as possible.

use std::rc::Rc;

use crate::ast::*;
use crate::error::ParseError;
use crate::token::{Token, TokenKind};

/// Binding power of operators, low to high
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Assign,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Power,
    Prefix,
    Call,
}

/// Parser state
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    /// Create a parser for a token stream (must end with `Eof`)
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, "", 1));
        }
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    /// Parse a whole program, returning it together with any errors
    pub fn parse(&mut self) -> (Program, Vec<ParseError>) {
        let mut statements = Vec::new();

        while self.peek().kind != TokenKind::Eof {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(()) => self.synchronize(),
            }
        }

        (Program { statements }, std::mem::take(&mut self.errors))
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_statement(&mut self) -> Result<Stmt, ()> {
        let stmt = match self.peek().kind {
            TokenKind::Let => self.parse_let_statement()?,
            TokenKind::Return => self.parse_return_statement()?,
            TokenKind::Break => Stmt::Break(self.advance().line),
            TokenKind::Continue => Stmt::Continue(self.advance().line),
            _ => Stmt::Expr(self.parse_expression()?),
        };

        if self.peek().kind == TokenKind::Semicolon {
            self.advance();
        }

        Ok(stmt)
    }

    fn parse_let_statement(&mut self) -> Result<Stmt, ()> {
        let let_token = self.advance();
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Equal, "=")?;
        let value = self.parse_expression()?;

        Ok(Stmt::Let(LetStmt {
            name,
            value,
            line: let_token.line,
        }))
    }

    fn parse_return_statement(&mut self) -> Result<Stmt, ()> {
        let return_token = self.advance();
        let value = match self.peek().kind {
            TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof => None,
            _ => Some(self.parse_expression()?),
        };

        Ok(Stmt::Return(ReturnStmt {
            value,
            line: return_token.line,
        }))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expression(&mut self) -> Result<Expr, ()> {
        self.parse_precedence(Precedence::Lowest)
    }

    fn parse_precedence(&mut self, precedence: Precedence) -> Result<Expr, ()> {
        let mut left = self.parse_prefix()?;

        while precedence < self.current_precedence() {
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ()> {
        match self.peek().kind {
            TokenKind::Int => self.parse_int(),
            TokenKind::Float => self.parse_float(),
            TokenKind::Str => {
                let token = self.advance();
                Ok(Expr::Str(StrLiteral {
                    value: token.lexeme,
                    line: token.line,
                }))
            }
            TokenKind::True | TokenKind::False => {
                let token = self.advance();
                Ok(Expr::Bool(BoolLiteral {
                    value: token.kind == TokenKind::True,
                    line: token.line,
                }))
            }
            TokenKind::Null => Ok(Expr::Null(self.advance().line)),
            TokenKind::Identifier => {
                let token = self.advance();
                Ok(Expr::Identifier(Identifier {
                    name: token.lexeme,
                    line: token.line,
                }))
            }
            TokenKind::LeftParen => self.parse_group(),
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftBrace => self.parse_dict_literal(),
            TokenKind::Bang | TokenKind::Minus | TokenKind::Plus => self.parse_prefix_operator(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for_in(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Fn => self.parse_function(),
            TokenKind::Illegal => {
                let lexeme = self.peek().lexeme.clone();
                self.error(format!("Herufi isiyojulikana: '{}'", lexeme));
                Err(())
            }
            _ => {
                let found = self.found();
                self.error(format!("Hatukutegemea '{}' hapa", found));
                Err(())
            }
        }
    }

    fn parse_infix(&mut self, left: Expr) -> Result<Expr, ()> {
        match self.peek().kind {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::StarStar
            | TokenKind::EqualEqual
            | TokenKind::BangEqual
            | TokenKind::Less
            | TokenKind::LessEqual
            | TokenKind::Greater
            | TokenKind::GreaterEqual
            | TokenKind::AmpAmp
            | TokenKind::PipePipe
            | TokenKind::In => self.parse_binary(left),
            TokenKind::LeftParen => self.parse_call(left),
            TokenKind::LeftBracket => self.parse_index(left),
            TokenKind::PlusPlus | TokenKind::MinusMinus => self.parse_postfix(left),
            TokenKind::Equal
            | TokenKind::PlusEqual
            | TokenKind::MinusEqual
            | TokenKind::StarEqual
            | TokenKind::SlashEqual
            | TokenKind::PercentEqual => self.parse_assign(left),
            _ => Ok(left),
        }
    }

    fn current_precedence(&self) -> Precedence {
        match self.peek().kind {
            TokenKind::Equal
            | TokenKind::PlusEqual
            | TokenKind::MinusEqual
            | TokenKind::StarEqual
            | TokenKind::SlashEqual
            | TokenKind::PercentEqual => Precedence::Assign,
            TokenKind::PipePipe => Precedence::Or,
            TokenKind::AmpAmp => Precedence::And,
            TokenKind::EqualEqual | TokenKind::BangEqual => Precedence::Equality,
            TokenKind::Less
            | TokenKind::LessEqual
            | TokenKind::Greater
            | TokenKind::GreaterEqual
            | TokenKind::In => Precedence::Comparison,
            TokenKind::Plus | TokenKind::Minus => Precedence::Term,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Precedence::Factor,
            TokenKind::StarStar => Precedence::Power,
            TokenKind::LeftParen
            | TokenKind::LeftBracket
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }

    fn parse_int(&mut self) -> Result<Expr, ()> {
        let token = self.advance();
        match token.lexeme.parse::<i64>() {
            Ok(value) => Ok(Expr::Int(IntLiteral {
                value,
                line: token.line,
            })),
            Err(_) => {
                self.error_at(token.line, format!("Namba si sahihi: '{}'", token.lexeme));
                Err(())
            }
        }
    }

    fn parse_float(&mut self) -> Result<Expr, ()> {
        let token = self.advance();
        match token.lexeme.parse::<f64>() {
            Ok(value) => Ok(Expr::Float(FloatLiteral {
                value,
                line: token.line,
            })),
            Err(_) => {
                self.error_at(token.line, format!("Namba si sahihi: '{}'", token.lexeme));
                Err(())
            }
        }
    }

    fn parse_group(&mut self) -> Result<Expr, ()> {
        self.advance(); // (
        let expr = self.parse_expression()?;
        self.expect(TokenKind::RightParen, ")")?;
        Ok(expr)
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ()> {
        let bracket = self.advance();
        let mut elements = Vec::new();

        if self.peek().kind != TokenKind::RightBracket {
            loop {
                elements.push(self.parse_expression()?);
                if self.peek().kind != TokenKind::Comma {
                    break;
                }
                self.advance();
            }
        }
        self.expect(TokenKind::RightBracket, "]")?;

        Ok(Expr::Array(ArrayLiteral {
            elements,
            line: bracket.line,
        }))
    }

    fn parse_dict_literal(&mut self) -> Result<Expr, ()> {
        let brace = self.advance();
        let mut pairs = Vec::new();

        if self.peek().kind != TokenKind::RightBrace {
            loop {
                let key = self.parse_expression()?;
                self.expect(TokenKind::Colon, ":")?;
                let value = self.parse_expression()?;
                pairs.push((key, value));
                if self.peek().kind != TokenKind::Comma {
                    break;
                }
                self.advance();
            }
        }
        self.expect(TokenKind::RightBrace, "}")?;

        Ok(Expr::Dict(DictLiteral {
            pairs,
            line: brace.line,
        }))
    }

    fn parse_prefix_operator(&mut self) -> Result<Expr, ()> {
        let token = self.advance();
        let operator = match token.kind {
            TokenKind::Bang => PrefixOp::Bang,
            TokenKind::Minus => PrefixOp::Minus,
            _ => PrefixOp::Plus,
        };
        let right = self.parse_precedence(Precedence::Prefix)?;

        Ok(Expr::Prefix(PrefixExpr {
            operator,
            right: Box::new(right),
            line: token.line,
        }))
    }

    fn parse_binary(&mut self, left: Expr) -> Result<Expr, ()> {
        let precedence = self.current_precedence();
        let token = self.advance();
        let operator = match token.kind {
            TokenKind::Plus => InfixOp::Plus,
            TokenKind::Minus => InfixOp::Minus,
            TokenKind::Star => InfixOp::Star,
            TokenKind::Slash => InfixOp::Slash,
            TokenKind::Percent => InfixOp::Percent,
            TokenKind::StarStar => InfixOp::Pow,
            TokenKind::EqualEqual => InfixOp::Equal,
            TokenKind::BangEqual => InfixOp::NotEqual,
            TokenKind::Less => InfixOp::Less,
            TokenKind::LessEqual => InfixOp::LessEqual,
            TokenKind::Greater => InfixOp::Greater,
            TokenKind::GreaterEqual => InfixOp::GreaterEqual,
            TokenKind::AmpAmp => InfixOp::And,
            TokenKind::PipePipe => InfixOp::Or,
            _ => InfixOp::In,
        };

        // `**` is right-associative; everything else binds left
        let right = if operator == InfixOp::Pow {
            self.parse_precedence(Precedence::Factor)?
        } else {
            self.parse_precedence(precedence)?
        };

        Ok(Expr::Infix(InfixExpr {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            line: token.line,
        }))
    }

    fn parse_call(&mut self, callee: Expr) -> Result<Expr, ()> {
        let paren = self.advance();
        let mut arguments = Vec::new();

        if self.peek().kind != TokenKind::RightParen {
            loop {
                arguments.push(self.parse_expression()?);
                if self.peek().kind != TokenKind::Comma {
                    break;
                }
                self.advance();
            }
        }
        self.expect(TokenKind::RightParen, ")")?;

        Ok(Expr::Call(CallExpr {
            callee: Box::new(callee),
            arguments,
            line: paren.line,
        }))
    }

    fn parse_index(&mut self, left: Expr) -> Result<Expr, ()> {
        let bracket = self.advance();
        let index = self.parse_expression()?;
        self.expect(TokenKind::RightBracket, "]")?;

        Ok(Expr::Index(IndexExpr {
            left: Box::new(left),
            index: Box::new(index),
            line: bracket.line,
        }))
    }

    fn parse_postfix(&mut self, left: Expr) -> Result<Expr, ()> {
        let token = self.advance();
        let operator = if token.kind == TokenKind::PlusPlus {
            PostfixOp::Increment
        } else {
            PostfixOp::Decrement
        };

        // The target of ++/-- must syntactically be an identifier
        match left {
            Expr::Identifier(identifier) => Ok(Expr::Postfix(PostfixExpr {
                operator,
                name: identifier.name,
                line: token.line,
            })),
            _ => {
                self.error_at(
                    token.line,
                    format!("Tumia kitambulishi kabla ya '{}'", operator),
                );
                Err(())
            }
        }
    }

    fn parse_assign(&mut self, left: Expr) -> Result<Expr, ()> {
        let token = self.advance();
        let operator = match token.kind {
            TokenKind::Equal => AssignOp::Assign,
            TokenKind::PlusEqual => AssignOp::Add,
            TokenKind::MinusEqual => AssignOp::Sub,
            TokenKind::StarEqual => AssignOp::Mul,
            TokenKind::SlashEqual => AssignOp::Div,
            _ => AssignOp::Mod,
        };
        // Right-associative: `a = b = c` assigns `b = c` first
        let value = self.parse_precedence(Precedence::Lowest)?;

        Ok(Expr::Assign(AssignExpr {
            left: Box::new(left),
            operator,
            value: Box::new(value),
            line: token.line,
        }))
    }

    fn parse_if(&mut self) -> Result<Expr, ()> {
        let if_token = self.advance();
        self.expect(TokenKind::LeftParen, "(")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParen, ")")?;
        let consequence = self.parse_block()?;

        let alternative = if self.peek().kind == TokenKind::Else {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Expr::If(IfExpr {
            condition: Box::new(condition),
            consequence,
            alternative,
            line: if_token.line,
        }))
    }

    fn parse_while(&mut self) -> Result<Expr, ()> {
        let while_token = self.advance();
        self.expect(TokenKind::LeftParen, "(")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParen, ")")?;
        let body = self.parse_block()?;

        Ok(Expr::While(WhileExpr {
            condition: Box::new(condition),
            body,
            line: while_token.line,
        }))
    }

    fn parse_for_in(&mut self) -> Result<Expr, ()> {
        let for_token = self.advance();
        let key = self.expect_identifier()?;
        self.expect(TokenKind::Comma, ",")?;
        let value = self.expect_identifier()?;
        self.expect(TokenKind::In, "ktk")?;
        let iterable = self.parse_expression()?;
        let body = self.parse_block()?;

        Ok(Expr::ForIn(ForInExpr {
            key,
            value,
            iterable: Box::new(iterable),
            body,
            line: for_token.line,
        }))
    }

    fn parse_switch(&mut self) -> Result<Expr, ()> {
        let switch_token = self.advance();
        let value = self.parse_expression()?;
        self.expect(TokenKind::LeftBrace, "{")?;

        let mut clauses = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Case => {
                    let case_token = self.advance();
                    let mut conditions = vec![self.parse_expression()?];
                    while self.peek().kind == TokenKind::Comma {
                        self.advance();
                        conditions.push(self.parse_expression()?);
                    }
                    self.expect(TokenKind::Colon, ":")?;
                    let body = self.parse_clause_body(case_token.line)?;
                    clauses.push(SwitchClause {
                        default: false,
                        conditions,
                        body,
                    });
                }
                TokenKind::Default => {
                    let default_token = self.advance();
                    self.expect(TokenKind::Colon, ":")?;
                    let body = self.parse_clause_body(default_token.line)?;
                    clauses.push(SwitchClause {
                        default: true,
                        conditions: Vec::new(),
                        body,
                    });
                }
                TokenKind::RightBrace => break,
                _ => {
                    let found = self.found();
                    self.error(format!(
                        "Tulitegemea 'ikiwa' au 'kawaida', badala yake tumepata '{}'",
                        found
                    ));
                    return Err(());
                }
            }
        }
        self.expect(TokenKind::RightBrace, "}")?;

        Ok(Expr::Switch(SwitchExpr {
            value: Box::new(value),
            clauses,
            line: switch_token.line,
        }))
    }

    /// A `badili` clause body: either a braced block or the statements
    /// up to the next clause
    fn parse_clause_body(&mut self, line: u32) -> Result<Block, ()> {
        if self.peek().kind == TokenKind::LeftBrace {
            return self.parse_block();
        }

        let mut statements = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Case | TokenKind::Default | TokenKind::RightBrace | TokenKind::Eof => {
                    break
                }
                _ => statements.push(self.parse_statement()?),
            }
        }

        Ok(Block { statements, line })
    }

    fn parse_function(&mut self) -> Result<Expr, ()> {
        let fn_token = self.advance();
        self.expect(TokenKind::LeftParen, "(")?;

        let mut parameters = Vec::new();
        if self.peek().kind != TokenKind::RightParen {
            loop {
                parameters.push(self.expect_identifier()?);
                if self.peek().kind != TokenKind::Comma {
                    break;
                }
                self.advance();
            }
        }
        self.expect(TokenKind::RightParen, ")")?;
        let body = self.parse_block()?;

        Ok(Expr::Function(FunctionLiteral {
            parameters,
            body: Rc::new(body),
            line: fn_token.line,
        }))
    }

    fn parse_block(&mut self) -> Result<Block, ()> {
        let brace = self.expect(TokenKind::LeftBrace, "{")?;

        let mut statements = Vec::new();
        while self.peek().kind != TokenKind::RightBrace && self.peek().kind != TokenKind::Eof {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RightBrace, "}")?;

        Ok(Block {
            statements,
            line: brace.line,
        })
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.current < self.tokens.len() - 1 {
            self.current += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ()> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            let found = self.found();
            self.error(format!(
                "Tulitegemea '{}', badala yake tumepata '{}'",
                what, found
            ));
            Err(())
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ()> {
        if self.peek().kind == TokenKind::Identifier {
            Ok(self.advance().lexeme)
        } else {
            let found = self.found();
            self.error(format!(
                "Tulitegemea kitambulishi, badala yake tumepata '{}'",
                found
            ));
            Err(())
        }
    }

    /// Human-readable rendering of the current token for error
    /// messages
    fn found(&self) -> String {
        match self.peek().kind {
            TokenKind::Eof => "mwisho wa faili".to_string(),
            _ => self.peek().lexeme.clone(),
        }
    }

    fn error(&mut self, message: String) {
        let line = self.peek().line;
        self.error_at(line, message);
    }

    fn error_at(&mut self, line: u32, message: String) {
        self.errors.push(ParseError { message, line });
    }

    /// Skip to the next statement boundary after an error
    fn synchronize(&mut self) {
        while self.peek().kind != TokenKind::Eof {
            if self.peek().kind == TokenKind::Semicolon {
                self.advance();
                return;
            }
            self.advance();
        }
    }
}
