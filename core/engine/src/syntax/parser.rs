//! A recursive-descent parser producing the [`Node`] tree.
//!
//! Semicolons are inserted the pragmatic way: a statement may end at an
//! explicit `;`, at `}`, at the end of input, or at a line break.

use super::ast::node::{
    Const, FormalParameter, IterationDeclKind, Node, PropertyDefinition, RcStatementList,
    StatementList,
};
use super::ast::op::{AssignOp, BinOp, BitOp, CompOp, LogOp, NumOp, UnaryOp};
use super::lexer::{Keyword, LexError, Lexer, Punct, Token, TokenKind};
use std::fmt;

/// An error that occurred during parsing of the source input.
#[derive(Debug, Clone)]
pub struct ParseError {
    message: String,
    line: u32,
    column: u32,
}

impl ParseError {
    fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.message, self.line, self.column
        )
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        Self::new(error.message, error.line, error.column)
    }
}

type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    lex_error: Option<LexError>,
    source: std::marker::PhantomData<&'a str>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        // Lex errors surface from `parse_all`.
        match Lexer::new(source).lex_all() {
            Ok(tokens) => Self {
                tokens,
                position: 0,
                lex_error: None,
                source: std::marker::PhantomData,
            },
            Err(error) => Self {
                tokens: Vec::new(),
                position: 0,
                lex_error: Some(error),
                source: std::marker::PhantomData,
            },
        }
    }

    /// Parses the whole source as a script.
    pub fn parse_all(&mut self) -> ParseResult<StatementList> {
        if let Some(error) = self.lex_error.take() {
            return Err(error.into());
        }

        let strict = self.detect_use_strict();
        let mut statements = Vec::new();
        while self.peek().is_some() {
            statements.push(self.parse_statement()?);
        }
        Ok(StatementList::new(statements.into_boxed_slice(), strict))
    }

    fn detect_use_strict(&self) -> bool {
        matches!(
            self.tokens.first().map(|t| &t.kind),
            Some(TokenKind::StringLiteral(s)) if &**s == "use strict"
        )
    }

    // === Token plumbing ===

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.position + ahead)
    }

    fn next_token(&mut self) -> ParseResult<Token> {
        match self.tokens.get(self.position) {
            Some(token) => {
                self.position += 1;
                Ok(token.clone())
            }
            None => Err(self.eof_error()),
        }
    }

    fn eof_error(&self) -> ParseError {
        let (line, column) = self
            .tokens
            .last()
            .map_or((1, 1), |token| (token.line, token.column));
        ParseError::new("unexpected end of input", line, column)
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::new(message, token.line, token.column),
            None => self.eof_error(),
        }
    }

    fn is_punct(&self, punct: Punct) -> bool {
        matches!(self.peek(), Some(token) if token.kind == TokenKind::Punctuator(punct))
    }

    fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek(), Some(token) if token.kind == TokenKind::Keyword(keyword))
    }

    fn accept_punct(&mut self, punct: Punct) -> bool {
        if self.is_punct(punct) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn accept_keyword(&mut self, keyword: Keyword) -> bool {
        if self.is_keyword(keyword) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, punct: Punct, what: &str) -> ParseResult<()> {
        if self.accept_punct(punct) {
            Ok(())
        } else {
            Err(self.error_here(format!("expected {what}")))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> ParseResult<Box<str>> {
        match self.peek().map(|t| t.kind.clone()) {
            Some(TokenKind::Identifier(name)) => {
                self.position += 1;
                Ok(name)
            }
            _ => Err(self.error_here(format!("expected {what}"))),
        }
    }

    /// Automatic semicolon insertion: `;`, `}`, end of input, or a line
    /// break all end a statement.
    fn eat_semicolon(&mut self) -> ParseResult<()> {
        if self.accept_punct(Punct::Semicolon) {
            return Ok(());
        }
        match self.peek() {
            None => Ok(()),
            Some(token)
                if token.newline_before
                    || token.kind == TokenKind::Punctuator(Punct::CloseBlock) =>
            {
                Ok(())
            }
            Some(_) => Err(self.error_here("expected a semicolon")),
        }
    }

    // === Statements ===

    fn parse_statement(&mut self) -> ParseResult<Node> {
        let Some(token) = self.peek() else {
            return Err(self.eof_error());
        };

        match &token.kind {
            TokenKind::Punctuator(Punct::Semicolon) => {
                self.position += 1;
                Ok(Node::Empty)
            }
            TokenKind::Punctuator(Punct::OpenBlock) => {
                self.position += 1;
                let statements = self.parse_statements_until(Punct::CloseBlock)?;
                self.expect_punct(Punct::CloseBlock, "a closing '}'")?;
                Ok(Node::Block(statements.into()))
            }
            TokenKind::Keyword(Keyword::Var) => {
                self.position += 1;
                let node = self.parse_var_declaration()?;
                self.eat_semicolon()?;
                Ok(node)
            }
            TokenKind::Keyword(Keyword::Let) => {
                self.position += 1;
                let node = self.parse_let_declaration()?;
                self.eat_semicolon()?;
                Ok(node)
            }
            TokenKind::Keyword(Keyword::Const) => {
                self.position += 1;
                let node = self.parse_const_declaration()?;
                self.eat_semicolon()?;
                Ok(node)
            }
            TokenKind::Keyword(Keyword::Function) => {
                self.position += 1;
                let name = self.expect_identifier("a function name")?;
                let (params, body) = self.parse_function_rest()?;
                Ok(Node::FunctionDecl { name, params, body })
            }
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::While) => {
                self.position += 1;
                self.expect_punct(Punct::OpenParen, "'(' after 'while'")?;
                let condition = Box::new(self.parse_expression()?);
                self.expect_punct(Punct::CloseParen, "')' after the while condition")?;
                let body = Box::new(self.parse_statement()?);
                Ok(Node::WhileLoop { condition, body })
            }
            TokenKind::Keyword(Keyword::Do) => {
                self.position += 1;
                let body = Box::new(self.parse_statement()?);
                if !self.accept_keyword(Keyword::While) {
                    return Err(self.error_here("expected 'while' after a do body"));
                }
                self.expect_punct(Punct::OpenParen, "'(' after 'while'")?;
                let condition = Box::new(self.parse_expression()?);
                self.expect_punct(Punct::CloseParen, "')' after the while condition")?;
                self.eat_semicolon()?;
                Ok(Node::DoWhileLoop { body, condition })
            }
            TokenKind::Keyword(Keyword::For) => self.parse_for(),
            TokenKind::Keyword(Keyword::Return) => {
                self.position += 1;
                let argument = match self.peek() {
                    None => None,
                    Some(token)
                        if token.newline_before
                            || token.kind == TokenKind::Punctuator(Punct::Semicolon)
                            || token.kind == TokenKind::Punctuator(Punct::CloseBlock) =>
                    {
                        None
                    }
                    Some(_) => Some(Box::new(self.parse_expression()?)),
                };
                self.eat_semicolon()?;
                Ok(Node::Return(argument))
            }
            TokenKind::Keyword(Keyword::Break) => {
                self.position += 1;
                let label = self.optional_label();
                self.eat_semicolon()?;
                Ok(Node::Break(label))
            }
            TokenKind::Keyword(Keyword::Continue) => {
                self.position += 1;
                let label = self.optional_label();
                self.eat_semicolon()?;
                Ok(Node::Continue(label))
            }
            TokenKind::Keyword(Keyword::Throw) => {
                self.position += 1;
                let argument = Box::new(self.parse_expression()?);
                self.eat_semicolon()?;
                Ok(Node::Throw(argument))
            }
            TokenKind::Keyword(Keyword::Try) => self.parse_try(),
            TokenKind::Keyword(Keyword::Switch) => self.parse_switch(),
            TokenKind::Identifier(name)
                if matches!(
                    self.peek_at(1).map(|t| &t.kind),
                    Some(TokenKind::Punctuator(Punct::Colon))
                ) =>
            {
                let name = name.clone();
                self.position += 2;
                let body = Box::new(self.parse_statement()?);
                Ok(Node::Label { name, body })
            }
            _ => {
                let expression = self.parse_expression()?;
                self.eat_semicolon()?;
                Ok(expression)
            }
        }
    }

    fn optional_label(&mut self) -> Option<Box<str>> {
        match self.peek() {
            Some(token) if !token.newline_before => match token.kind.clone() {
                TokenKind::Identifier(name) => {
                    self.position += 1;
                    Some(name)
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn parse_statements_until(&mut self, end: Punct) -> ParseResult<Vec<Node>> {
        let mut statements = Vec::new();
        while !self.is_punct(end) {
            if self.peek().is_none() {
                return Err(self.eof_error());
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn parse_var_declaration(&mut self) -> ParseResult<Node> {
        let mut declarations = Vec::new();
        loop {
            let name = self.expect_identifier("a variable name")?;
            let init = if self.accept_punct(Punct::Assign) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarations.push((name, init));
            if !self.accept_punct(Punct::Comma) {
                break;
            }
        }
        Ok(Node::VarDecl(declarations.into_boxed_slice()))
    }

    fn parse_let_declaration(&mut self) -> ParseResult<Node> {
        let mut declarations = Vec::new();
        loop {
            let name = self.expect_identifier("a variable name")?;
            let init = if self.accept_punct(Punct::Assign) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarations.push((name, init));
            if !self.accept_punct(Punct::Comma) {
                break;
            }
        }
        Ok(Node::LetDecl(declarations.into_boxed_slice()))
    }

    fn parse_const_declaration(&mut self) -> ParseResult<Node> {
        let mut declarations = Vec::new();
        loop {
            let name = self.expect_identifier("a constant name")?;
            self.expect_punct(Punct::Assign, "an initializer for the const declaration")?;
            let init = self.parse_assignment()?;
            declarations.push((name, init));
            if !self.accept_punct(Punct::Comma) {
                break;
            }
        }
        Ok(Node::ConstDecl(declarations.into_boxed_slice()))
    }

    fn parse_if(&mut self) -> ParseResult<Node> {
        self.position += 1;
        self.expect_punct(Punct::OpenParen, "'(' after 'if'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_punct(Punct::CloseParen, "')' after the if condition")?;
        let body = Box::new(self.parse_statement()?);
        let else_node = if self.accept_keyword(Keyword::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Node::If {
            condition,
            body,
            else_node,
        })
    }

    fn parse_for(&mut self) -> ParseResult<Node> {
        self.position += 1;
        self.expect_punct(Punct::OpenParen, "'(' after 'for'")?;

        // Discover the `for (decl x in/of iterable)` heads first.
        let kind = if self.accept_keyword(Keyword::Var) {
            Some(IterationDeclKind::Var)
        } else if self.accept_keyword(Keyword::Let) {
            Some(IterationDeclKind::Let)
        } else if self.accept_keyword(Keyword::Const) {
            Some(IterationDeclKind::Const)
        } else {
            None
        };

        if let Some(kind) = kind {
            // One name parsed; `in`/`of` decides the loop form.
            let name = self.expect_identifier("a loop variable name")?;
            if self.accept_keyword(Keyword::In) {
                return self.finish_for_in_of(name, kind, true);
            }
            if self.accept_keyword(Keyword::Of) {
                return self.finish_for_in_of(name, kind, false);
            }

            // Classic loop with a declaration head.
            let init = if self.accept_punct(Punct::Assign) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            let mut declarations = vec![(name, init)];
            while self.accept_punct(Punct::Comma) {
                let name = self.expect_identifier("a variable name")?;
                let init = if self.accept_punct(Punct::Assign) {
                    Some(self.parse_assignment()?)
                } else {
                    None
                };
                declarations.push((name, init));
            }
            let init_node = match kind {
                IterationDeclKind::Var => Node::VarDecl(declarations.into_boxed_slice()),
                IterationDeclKind::Let => Node::LetDecl(declarations.into_boxed_slice()),
                IterationDeclKind::Const => {
                    let declarations: Vec<(Box<str>, Node)> = declarations
                        .into_iter()
                        .map(|(name, init)| match init {
                            Some(init) => Ok((name, init)),
                            None => Err(self.error_here("const declarations need an initializer")),
                        })
                        .collect::<ParseResult<_>>()?;
                    Node::ConstDecl(declarations.into_boxed_slice())
                }
                IterationDeclKind::None => unreachable!("kind checked above"),
            };
            self.expect_punct(Punct::Semicolon, "';' in the for head")?;
            return self.finish_classic_for(Some(Box::new(init_node)));
        }

        if self.accept_punct(Punct::Semicolon) {
            return self.finish_classic_for_after_semicolon(None);
        }

        // Expression head: either a classic loop or a bare-binding in/of.
        let head = self.parse_expression()?;
        if let Node::Identifier(ref name) = head {
            if self.accept_keyword(Keyword::In) {
                return self.finish_for_in_of(name.clone(), IterationDeclKind::None, true);
            }
            if self.accept_keyword(Keyword::Of) {
                return self.finish_for_in_of(name.clone(), IterationDeclKind::None, false);
            }
        }
        self.expect_punct(Punct::Semicolon, "';' in the for head")?;
        self.finish_classic_for(Some(Box::new(head)))
    }

    fn finish_for_in_of(
        &mut self,
        variable: Box<str>,
        kind: IterationDeclKind,
        is_in: bool,
    ) -> ParseResult<Node> {
        let target = Box::new(self.parse_expression()?);
        self.expect_punct(Punct::CloseParen, "')' after the for head")?;
        let body = Box::new(self.parse_statement()?);
        Ok(if is_in {
            Node::ForInLoop {
                variable,
                kind,
                object: target,
                body,
            }
        } else {
            Node::ForOfLoop {
                variable,
                kind,
                iterable: target,
                body,
            }
        })
    }

    fn finish_classic_for(&mut self, init: Option<Box<Node>>) -> ParseResult<Node> {
        self.finish_classic_for_after_semicolon(init)
    }

    fn finish_classic_for_after_semicolon(
        &mut self,
        init: Option<Box<Node>>,
    ) -> ParseResult<Node> {
        let condition = if self.is_punct(Punct::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_punct(Punct::Semicolon, "';' in the for head")?;
        let step = if self.is_punct(Punct::CloseParen) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_punct(Punct::CloseParen, "')' after the for head")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Node::ForLoop {
            init,
            condition,
            step,
            body,
        })
    }

    fn parse_try(&mut self) -> ParseResult<Node> {
        self.position += 1;
        self.expect_punct(Punct::OpenBlock, "'{' after 'try'")?;
        let block: StatementList = self.parse_statements_until(Punct::CloseBlock)?.into();
        self.expect_punct(Punct::CloseBlock, "a closing '}'")?;

        let catch = if self.accept_keyword(Keyword::Catch) {
            let parameter = if self.accept_punct(Punct::OpenParen) {
                let name = self.expect_identifier("a catch parameter")?;
                self.expect_punct(Punct::CloseParen, "')' after the catch parameter")?;
                Some(name)
            } else {
                None
            };
            self.expect_punct(Punct::OpenBlock, "'{' after 'catch'")?;
            let body: StatementList = self.parse_statements_until(Punct::CloseBlock)?.into();
            self.expect_punct(Punct::CloseBlock, "a closing '}'")?;
            Some((parameter, body))
        } else {
            None
        };

        let finally = if self.accept_keyword(Keyword::Finally) {
            self.expect_punct(Punct::OpenBlock, "'{' after 'finally'")?;
            let body: StatementList = self.parse_statements_until(Punct::CloseBlock)?.into();
            self.expect_punct(Punct::CloseBlock, "a closing '}'")?;
            Some(body)
        } else {
            None
        };

        if catch.is_none() && finally.is_none() {
            return Err(self.error_here("missing catch or finally after try"));
        }
        Ok(Node::Try {
            block,
            catch,
            finally,
        })
    }

    fn parse_switch(&mut self) -> ParseResult<Node> {
        self.position += 1;
        self.expect_punct(Punct::OpenParen, "'(' after 'switch'")?;
        let discriminant = Box::new(self.parse_expression()?);
        self.expect_punct(Punct::CloseParen, "')' after the switch discriminant")?;
        self.expect_punct(Punct::OpenBlock, "'{' to open the switch body")?;

        let mut cases: Vec<(Node, Box<[Node]>)> = Vec::new();
        let mut default: Option<Box<[Node]>> = None;
        loop {
            if self.accept_punct(Punct::CloseBlock) {
                break;
            }
            if self.accept_keyword(Keyword::Case) {
                let test = self.parse_expression()?;
                self.expect_punct(Punct::Colon, "':' after the case expression")?;
                let body = self.parse_case_body()?;
                cases.push((test, body.into_boxed_slice()));
            } else if self.accept_keyword(Keyword::Default) {
                self.expect_punct(Punct::Colon, "':' after 'default'")?;
                if default.is_some() {
                    return Err(self.error_here("more than one default clause in a switch"));
                }
                default = Some(self.parse_case_body()?.into_boxed_slice());
            } else {
                return Err(self.error_here("expected 'case' or 'default'"));
            }
        }

        Ok(Node::Switch {
            discriminant,
            cases: cases.into_boxed_slice(),
            default,
        })
    }

    fn parse_case_body(&mut self) -> ParseResult<Vec<Node>> {
        let mut statements = Vec::new();
        loop {
            match self.peek().map(|t| &t.kind) {
                None => return Err(self.eof_error()),
                Some(TokenKind::Keyword(Keyword::Case | Keyword::Default))
                | Some(TokenKind::Punctuator(Punct::CloseBlock)) => break,
                _ => statements.push(self.parse_statement()?),
            }
        }
        Ok(statements)
    }

    // === Functions ===

    /// Parses `(params) { body }`, the common tail of every function form.
    fn parse_function_rest(&mut self) -> ParseResult<(Box<[FormalParameter]>, RcStatementList)> {
        self.expect_punct(Punct::OpenParen, "'(' before the parameter list")?;
        let params = self.parse_parameters()?;
        self.expect_punct(Punct::OpenBlock, "'{' to open the function body")?;
        let body: StatementList = self.parse_statements_until(Punct::CloseBlock)?.into();
        self.expect_punct(Punct::CloseBlock, "a closing '}'")?;
        Ok((params, body.into()))
    }

    fn parse_parameters(&mut self) -> ParseResult<Box<[FormalParameter]>> {
        let mut params = Vec::new();
        if self.accept_punct(Punct::CloseParen) {
            return Ok(params.into_boxed_slice());
        }
        loop {
            if self.accept_punct(Punct::Spread) {
                let name = self.expect_identifier("a rest parameter name")?;
                params.push(FormalParameter::new(name, None, true));
                self.expect_punct(Punct::CloseParen, "')' after the rest parameter")?;
                return Ok(params.into_boxed_slice());
            }
            let name = self.expect_identifier("a parameter name")?;
            let init = if self.accept_punct(Punct::Assign) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            params.push(FormalParameter::new(name, init, false));
            if !self.accept_punct(Punct::Comma) {
                break;
            }
        }
        self.expect_punct(Punct::CloseParen, "')' after the parameter list")?;
        Ok(params.into_boxed_slice())
    }

    // === Expressions ===

    pub(crate) fn parse_expression(&mut self) -> ParseResult<Node> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> ParseResult<Node> {
        // Arrow functions need a decision before the ordinary grammar eats
        // the parameter list.
        if let Some(arrow) = self.try_parse_arrow_function()? {
            return Ok(arrow);
        }

        let left = self.parse_conditional()?;

        let op = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Punctuator(Punct::Assign)) => None,
            Some(TokenKind::Punctuator(Punct::AddAssign)) => Some(AssignOp::Add),
            Some(TokenKind::Punctuator(Punct::SubAssign)) => Some(AssignOp::Sub),
            Some(TokenKind::Punctuator(Punct::MulAssign)) => Some(AssignOp::Mul),
            Some(TokenKind::Punctuator(Punct::DivAssign)) => Some(AssignOp::Div),
            Some(TokenKind::Punctuator(Punct::ModAssign)) => Some(AssignOp::Mod),
            Some(TokenKind::Punctuator(Punct::ExpAssign)) => Some(AssignOp::Exp),
            Some(TokenKind::Punctuator(Punct::AndAssign)) => Some(AssignOp::And),
            Some(TokenKind::Punctuator(Punct::OrAssign)) => Some(AssignOp::Or),
            Some(TokenKind::Punctuator(Punct::XorAssign)) => Some(AssignOp::Xor),
            Some(TokenKind::Punctuator(Punct::ShlAssign)) => Some(AssignOp::Shl),
            Some(TokenKind::Punctuator(Punct::ShrAssign)) => Some(AssignOp::Shr),
            Some(TokenKind::Punctuator(Punct::UShrAssign)) => Some(AssignOp::UShr),
            _ => return Ok(left),
        };
        self.position += 1;

        if !matches!(
            left,
            Node::Identifier(_) | Node::GetConstField { .. } | Node::GetField { .. }
        ) {
            return Err(self.error_here("invalid assignment target"));
        }
        let value = Box::new(self.parse_assignment()?);
        Ok(Node::Assign {
            op,
            target: Box::new(left),
            value,
        })
    }

    /// Decides whether an arrow function starts here; consumes it if so.
    fn try_parse_arrow_function(&mut self) -> ParseResult<Option<Node>> {
        // `ident =>`.
        if let Some(TokenKind::Identifier(name)) = self.peek().map(|t| t.kind.clone()) {
            if matches!(
                self.peek_at(1).map(|t| &t.kind),
                Some(TokenKind::Punctuator(Punct::Arrow))
            ) {
                self.position += 2;
                let params = Box::new([FormalParameter::new(name, None, false)]);
                let body = self.parse_arrow_body()?;
                return Ok(Some(Node::ArrowFunctionDecl(params, body)));
            }
            return Ok(None);
        }

        // `( ... ) =>`: scan for the matching paren.
        if self.is_punct(Punct::OpenParen) {
            let mut depth = 0usize;
            let mut offset = 0usize;
            loop {
                let Some(token) = self.peek_at(offset) else {
                    return Ok(None);
                };
                match token.kind {
                    TokenKind::Punctuator(Punct::OpenParen) => depth += 1,
                    TokenKind::Punctuator(Punct::CloseParen) => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                offset += 1;
            }
            if matches!(
                self.peek_at(offset + 1).map(|t| &t.kind),
                Some(TokenKind::Punctuator(Punct::Arrow))
            ) {
                self.position += 1;
                let params = self.parse_parameters()?;
                self.expect_punct(Punct::Arrow, "'=>'")?;
                let body = self.parse_arrow_body()?;
                return Ok(Some(Node::ArrowFunctionDecl(params, body)));
            }
        }
        Ok(None)
    }

    fn parse_arrow_body(&mut self) -> ParseResult<RcStatementList> {
        if self.accept_punct(Punct::OpenBlock) {
            let body: StatementList = self.parse_statements_until(Punct::CloseBlock)?.into();
            self.expect_punct(Punct::CloseBlock, "a closing '}'")?;
            return Ok(body.into());
        }
        // A bare expression body is an implicit return.
        let expression = self.parse_assignment()?;
        let body: StatementList = vec![Node::Return(Some(Box::new(expression)))].into();
        Ok(body.into())
    }

    fn parse_conditional(&mut self) -> ParseResult<Node> {
        let condition = self.parse_binary(0)?;
        if !self.accept_punct(Punct::Question) {
            return Ok(condition);
        }
        let if_true = Box::new(self.parse_assignment()?);
        self.expect_punct(Punct::Colon, "':' in the conditional expression")?;
        let if_false = Box::new(self.parse_assignment()?);
        Ok(Node::ConditionalOp {
            condition: Box::new(condition),
            if_true,
            if_false,
        })
    }

    /// Precedence-climbing over the binary operator table.
    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<Node> {
        let mut lhs = self.parse_exponentiation()?;
        loop {
            let Some((op, precedence)) = self.peek_binary_op() else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            self.position += 1;
            let rhs = self.parse_binary(precedence + 1)?;
            lhs = Node::BinOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn peek_binary_op(&self) -> Option<(BinOp, u8)> {
        let kind = &self.peek()?.kind;
        Some(match kind {
            TokenKind::Punctuator(Punct::Coalesce) => (BinOp::Log(LogOp::Coalesce), 1),
            TokenKind::Punctuator(Punct::BoolOr) => (BinOp::Log(LogOp::Or), 1),
            TokenKind::Punctuator(Punct::BoolAnd) => (BinOp::Log(LogOp::And), 2),
            TokenKind::Punctuator(Punct::Or) => (BinOp::Bit(BitOp::Or), 3),
            TokenKind::Punctuator(Punct::Xor) => (BinOp::Bit(BitOp::Xor), 4),
            TokenKind::Punctuator(Punct::And) => (BinOp::Bit(BitOp::And), 5),
            TokenKind::Punctuator(Punct::Eq) => (BinOp::Comp(CompOp::Equal), 6),
            TokenKind::Punctuator(Punct::NotEq) => (BinOp::Comp(CompOp::NotEqual), 6),
            TokenKind::Punctuator(Punct::StrictEq) => (BinOp::Comp(CompOp::StrictEqual), 6),
            TokenKind::Punctuator(Punct::StrictNotEq) => {
                (BinOp::Comp(CompOp::StrictNotEqual), 6)
            }
            TokenKind::Punctuator(Punct::LessThan) => (BinOp::Comp(CompOp::LessThan), 7),
            TokenKind::Punctuator(Punct::LessThanOrEq) => {
                (BinOp::Comp(CompOp::LessThanOrEqual), 7)
            }
            TokenKind::Punctuator(Punct::GreaterThan) => (BinOp::Comp(CompOp::GreaterThan), 7),
            TokenKind::Punctuator(Punct::GreaterThanOrEq) => {
                (BinOp::Comp(CompOp::GreaterThanOrEqual), 7)
            }
            TokenKind::Keyword(Keyword::In) => (BinOp::Comp(CompOp::In), 7),
            TokenKind::Keyword(Keyword::InstanceOf) => (BinOp::Comp(CompOp::InstanceOf), 7),
            TokenKind::Punctuator(Punct::Shl) => (BinOp::Bit(BitOp::Shl), 8),
            TokenKind::Punctuator(Punct::Shr) => (BinOp::Bit(BitOp::Shr), 8),
            TokenKind::Punctuator(Punct::UShr) => (BinOp::Bit(BitOp::UShr), 8),
            TokenKind::Punctuator(Punct::Add) => (BinOp::Num(NumOp::Add), 9),
            TokenKind::Punctuator(Punct::Sub) => (BinOp::Num(NumOp::Sub), 9),
            TokenKind::Punctuator(Punct::Mul) => (BinOp::Num(NumOp::Mul), 10),
            TokenKind::Punctuator(Punct::Div) => (BinOp::Num(NumOp::Div), 10),
            TokenKind::Punctuator(Punct::Mod) => (BinOp::Num(NumOp::Mod), 10),
            _ => return None,
        })
    }

    /// `**` binds tighter than the binary table and associates right.
    fn parse_exponentiation(&mut self) -> ParseResult<Node> {
        let base = self.parse_unary()?;
        if self.accept_punct(Punct::Exp) {
            let exponent = self.parse_exponentiation()?;
            return Ok(Node::BinOp {
                op: BinOp::Num(NumOp::Exp),
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> ParseResult<Node> {
        let op = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Punctuator(Punct::Not)) => Some(UnaryOp::Not),
            Some(TokenKind::Punctuator(Punct::Neg)) => Some(UnaryOp::Tilde),
            Some(TokenKind::Punctuator(Punct::Add)) => Some(UnaryOp::Plus),
            Some(TokenKind::Punctuator(Punct::Sub)) => Some(UnaryOp::Minus),
            Some(TokenKind::Punctuator(Punct::Inc)) => Some(UnaryOp::IncrementPre),
            Some(TokenKind::Punctuator(Punct::Dec)) => Some(UnaryOp::DecrementPre),
            Some(TokenKind::Keyword(Keyword::TypeOf)) => Some(UnaryOp::TypeOf),
            Some(TokenKind::Keyword(Keyword::Void)) => Some(UnaryOp::Void),
            Some(TokenKind::Keyword(Keyword::Delete)) => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            self.position += 1;
            let target = Box::new(self.parse_unary()?);
            return Ok(Node::UnaryOp { op, target });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> ParseResult<Node> {
        let expression = self.parse_call_or_member(true)?;
        match self.peek() {
            Some(token) if !token.newline_before => match token.kind {
                TokenKind::Punctuator(Punct::Inc) => {
                    self.position += 1;
                    Ok(Node::UnaryOp {
                        op: UnaryOp::IncrementPost,
                        target: Box::new(expression),
                    })
                }
                TokenKind::Punctuator(Punct::Dec) => {
                    self.position += 1;
                    Ok(Node::UnaryOp {
                        op: UnaryOp::DecrementPost,
                        target: Box::new(expression),
                    })
                }
                _ => Ok(expression),
            },
            _ => Ok(expression),
        }
    }

    /// Member accesses, calls and `new` chains. `allow_call` is cleared
    /// while parsing a `new` callee so the argument list binds to the
    /// `new`.
    fn parse_call_or_member(&mut self, allow_call: bool) -> ParseResult<Node> {
        let mut expression = if self.accept_keyword(Keyword::New) {
            let callee = Box::new(self.parse_call_or_member(false)?);
            let args = if self.is_punct(Punct::OpenParen) {
                self.parse_arguments()?
            } else {
                Vec::new().into_boxed_slice()
            };
            Node::New { callee, args }
        } else {
            self.parse_primary()?
        };

        loop {
            if self.accept_punct(Punct::Dot) {
                let field = match self.next_token()?.kind {
                    TokenKind::Identifier(name) => name,
                    // Keywords are valid property names after a dot.
                    TokenKind::Keyword(keyword) => keyword.as_str().into(),
                    TokenKind::BoolLiteral(true) => "true".into(),
                    TokenKind::BoolLiteral(false) => "false".into(),
                    TokenKind::NullLiteral => "null".into(),
                    _ => return Err(self.error_here("expected a property name after '.'")),
                };
                expression = Node::GetConstField {
                    obj: Box::new(expression),
                    field,
                };
            } else if self.accept_punct(Punct::OpenBracket) {
                let field = Box::new(self.parse_expression()?);
                self.expect_punct(Punct::CloseBracket, "a closing ']'")?;
                expression = Node::GetField {
                    obj: Box::new(expression),
                    field,
                };
            } else if allow_call && self.is_punct(Punct::OpenParen) {
                let args = self.parse_arguments()?;
                expression = Node::Call {
                    callee: Box::new(expression),
                    args,
                };
            } else {
                break;
            }
        }
        Ok(expression)
    }

    fn parse_arguments(&mut self) -> ParseResult<Box<[Node]>> {
        self.expect_punct(Punct::OpenParen, "'(' to open the argument list")?;
        let mut args = Vec::new();
        if self.accept_punct(Punct::CloseParen) {
            return Ok(args.into_boxed_slice());
        }
        loop {
            if self.accept_punct(Punct::Spread) {
                args.push(Node::Spread(Box::new(self.parse_assignment()?)));
            } else {
                args.push(self.parse_assignment()?);
            }
            if !self.accept_punct(Punct::Comma) {
                break;
            }
        }
        self.expect_punct(Punct::CloseParen, "')' after the argument list")?;
        Ok(args.into_boxed_slice())
    }

    fn parse_primary(&mut self) -> ParseResult<Node> {
        let token = self.next_token()?;
        match token.kind {
            TokenKind::NumericLiteral(number) => {
                // Integral values stay on the integer fast path.
                if number.fract() == 0.0
                    && number.abs() <= f64::from(i32::MAX)
                    && number.is_sign_positive()
                {
                    Ok(Node::Const(Const::Int(number as i32)))
                } else {
                    Ok(Node::Const(Const::Num(number)))
                }
            }
            TokenKind::StringLiteral(text) => Ok(Node::Const(Const::String(text))),
            TokenKind::BoolLiteral(boolean) => Ok(Node::Const(Const::Bool(boolean))),
            TokenKind::NullLiteral => Ok(Node::Const(Const::Null)),
            TokenKind::Identifier(name) => {
                if &*name == "undefined" {
                    Ok(Node::Const(Const::Undefined))
                } else if &*name == "this" {
                    Ok(Node::This)
                } else {
                    Ok(Node::Identifier(name))
                }
            }
            TokenKind::Keyword(Keyword::Function) => {
                let name = match self.peek().map(|t| t.kind.clone()) {
                    Some(TokenKind::Identifier(name)) => {
                        self.position += 1;
                        Some(name)
                    }
                    _ => None,
                };
                let (params, body) = self.parse_function_rest()?;
                Ok(Node::FunctionExpr { name, params, body })
            }
            TokenKind::Punctuator(Punct::OpenParen) => {
                let expression = self.parse_expression()?;
                self.expect_punct(Punct::CloseParen, "a closing ')'")?;
                Ok(expression)
            }
            TokenKind::Punctuator(Punct::OpenBracket) => self.parse_array_literal(),
            TokenKind::Punctuator(Punct::OpenBlock) => self.parse_object_literal(),
            other => Err(ParseError::new(
                format!("unexpected token {other:?}"),
                token.line,
                token.column,
            )),
        }
    }

    fn parse_array_literal(&mut self) -> ParseResult<Node> {
        let mut elements = Vec::new();
        if self.accept_punct(Punct::CloseBracket) {
            return Ok(Node::ArrayDecl(elements.into_boxed_slice()));
        }
        loop {
            if self.accept_punct(Punct::Spread) {
                elements.push(Node::Spread(Box::new(self.parse_assignment()?)));
            } else {
                elements.push(self.parse_assignment()?);
            }
            if !self.accept_punct(Punct::Comma) {
                break;
            }
            // Trailing comma.
            if self.is_punct(Punct::CloseBracket) {
                break;
            }
        }
        self.expect_punct(Punct::CloseBracket, "a closing ']'")?;
        Ok(Node::ArrayDecl(elements.into_boxed_slice()))
    }

    fn parse_object_literal(&mut self) -> ParseResult<Node> {
        let mut properties = Vec::new();
        if self.accept_punct(Punct::CloseBlock) {
            return Ok(Node::ObjectDecl(properties.into_boxed_slice()));
        }
        loop {
            if self.accept_punct(Punct::Spread) {
                properties.push(PropertyDefinition::Spread(self.parse_assignment()?));
            } else if self.accept_punct(Punct::OpenBracket) {
                let key = self.parse_assignment()?;
                self.expect_punct(Punct::CloseBracket, "a closing ']'")?;
                self.expect_punct(Punct::Colon, "':' after the computed key")?;
                let value = self.parse_assignment()?;
                properties.push(PropertyDefinition::Computed(key, value));
            } else {
                let key = match self.next_token()?.kind {
                    TokenKind::Identifier(name) => name,
                    TokenKind::StringLiteral(text) => text,
                    TokenKind::NumericLiteral(number) => {
                        crate::builtins::number::to_native_string(number).into()
                    }
                    TokenKind::Keyword(keyword) => keyword.as_str().into(),
                    _ => return Err(self.error_here("expected a property name")),
                };
                if self.accept_punct(Punct::Colon) {
                    let value = self.parse_assignment()?;
                    properties.push(PropertyDefinition::Property(key, value));
                } else if self.is_punct(Punct::OpenParen) {
                    // Shorthand method: sugar for a function-valued property.
                    let (params, body) = self.parse_function_rest()?;
                    properties.push(PropertyDefinition::Property(
                        key.clone(),
                        Node::FunctionExpr {
                            name: Some(key),
                            params,
                            body,
                        },
                    ));
                } else {
                    properties.push(PropertyDefinition::Shorthand(key));
                }
            }
            if !self.accept_punct(Punct::Comma) {
                break;
            }
            if self.is_punct(Punct::CloseBlock) {
                break;
            }
        }
        self.expect_punct(Punct::CloseBlock, "a closing '}'")?;
        Ok(Node::ObjectDecl(properties.into_boxed_slice()))
    }
}
