//! Recursive-descent parser for cQASM source
//!
//! Consumes the token stream from `crate::lexer` and produces a
//! `crate::ast::Program`. Like the lexer, it never aborts on the first
//! error: a malformed statement is diagnosed and the parser skips ahead to
//! the next plausible statement boundary (`;` or `}`) rather than giving up
//! on the whole file.

use crate::ast::{
    AnnotationData, BinaryOperator, Expression, IndexEntry, Instruction, Program, SourceLocation,
    Statement, UnaryOperator,
};
use crate::diagnostics::{Diagnostic, ErrorKind};
use crate::lexer::{Token, TokenKind};

const VARIABLE_TYPE_KEYWORDS: &[&str] =
    &["qubit", "bit", "int", "bool", "real", "complex", "axis", "string", "json"];

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0, diagnostics: Vec::new() }
    }

    pub fn parse_program(mut self) -> (Option<Program>, Vec<Diagnostic>) {
        let location = self.here();
        let Some(version) = self.parse_version_decl() else {
            return (None, self.diagnostics);
        };
        let num_qubits = self.parse_optional_qubits();

        let mut statements = Vec::new();
        while !self.at_eof() {
            match self.parse_statement() {
                Some(stmt) => statements.push(stmt),
                None => self.synchronize(),
            }
        }

        (Some(Program { version, num_qubits, statements, location }), self.diagnostics)
    }

    // ---- token stream helpers ----

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn here(&self) -> SourceLocation {
        self.tokens[self.pos.min(self.tokens.len() - 1)].location.clone()
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at_ident(&self, word: &str) -> bool {
        matches!(self.peek(), TokenKind::Ident(s) if s == word)
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        if self.at_ident(word) {
            self.advance();
            true
        } else {
            self.error(format!("expected '{word}'"));
            false
        }
    }

    fn eat(&mut self, kind: TokenKind, what: &str) -> bool {
        if std::mem::discriminant(self.peek()) == std::mem::discriminant(&kind) {
            self.advance();
            true
        } else {
            self.error(format!("expected {what}"));
            false
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(ErrorKind::Parse, message, self.here()));
    }

    /// Skip tokens until the statement-ending `;` (consumed) or a `}`
    /// (left for the enclosing block to consume) so one bad statement
    /// doesn't cascade into a diagnostic storm or an infinite loop.
    fn synchronize(&mut self) {
        loop {
            match self.peek() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace | TokenKind::Eof => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ---- header ----

    fn parse_version_decl(&mut self) -> Option<String> {
        if !self.eat_ident("version") {
            return None;
        }
        let text = match self.peek().clone() {
            TokenKind::Number(text) => {
                self.advance();
                text
            }
            _ => {
                self.error("expected a version number after 'version'");
                return None;
            }
        };
        self.eat(TokenKind::Semicolon, "';' after version declaration");
        Some(text)
    }

    fn parse_optional_qubits(&mut self) -> Option<Expression> {
        if !self.at_ident("qubits") {
            return None;
        }
        self.advance();
        let expr = self.parse_expression();
        self.eat(TokenKind::Semicolon, "';' after qubits declaration");
        expr
    }

    // ---- statements ----

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.peek().clone() {
            TokenKind::Ident(word) if word == "map" => self.parse_mapping(),
            TokenKind::Ident(word) if VARIABLE_TYPE_KEYWORDS.contains(&word.as_str()) => {
                self.parse_variables()
            }
            TokenKind::Dot => self.parse_subcircuit_header(),
            TokenKind::Ident(word) if word == "if" => self.parse_if(),
            TokenKind::Ident(word) if word == "for" => self.parse_for(),
            TokenKind::Ident(word) if word == "foreach" => self.parse_foreach(),
            TokenKind::Ident(word) if word == "while" => self.parse_while(),
            TokenKind::Ident(word) if word == "repeat" => self.parse_repeat(),
            TokenKind::Ident(word) if word == "break" => {
                let loc = self.here();
                self.advance();
                self.eat(TokenKind::Semicolon, "';' after break");
                Some(Statement::Break(loc))
            }
            TokenKind::Ident(word) if word == "continue" => {
                let loc = self.here();
                self.advance();
                self.eat(TokenKind::Semicolon, "';' after continue");
                Some(Statement::Continue(loc))
            }
            _ => self.parse_bundle(),
        }
    }

    fn parse_mapping(&mut self) -> Option<Statement> {
        let location = self.here();
        self.advance(); // 'map'
        let name = self.expect_ident_text()?;
        self.eat(TokenKind::Assign, "'=' in map declaration");
        let value = self.parse_expression()?;
        self.eat(TokenKind::Semicolon, "';' after map declaration");
        Some(Statement::Mapping { name, value, location })
    }

    fn parse_variables(&mut self) -> Option<Statement> {
        let location = self.here();
        let kw = self.expect_ident_text()?;
        let type_name = if matches!(self.peek(), TokenKind::LBracket) {
            self.advance();
            let size = match self.peek().clone() {
                TokenKind::Number(text) if !text.contains('.') => {
                    self.advance();
                    text
                }
                _ => {
                    self.error("expected an integer array size");
                    return None;
                }
            };
            self.eat(TokenKind::RBracket, "']' after array size");
            format!("{kw}[{size}]")
        } else {
            kw
        };
        let mut names = vec![self.expect_ident_text()?];
        while matches!(self.peek(), TokenKind::Comma) {
            self.advance();
            names.push(self.expect_ident_text()?);
        }
        self.eat(TokenKind::Semicolon, "';' after variable declaration");
        Some(Statement::Variables { names, type_name, location })
    }

    fn parse_subcircuit_header(&mut self) -> Option<Statement> {
        let location = self.here();
        self.advance(); // '.'
        let name = self.expect_ident_text()?;
        let iterations = if matches!(self.peek(), TokenKind::LParen) {
            self.advance();
            let expr = self.parse_expression()?;
            self.eat(TokenKind::RParen, "')' after subcircuit iteration count");
            Some(expr)
        } else {
            None
        };
        if matches!(self.peek(), TokenKind::Semicolon) {
            self.advance();
        }
        Some(Statement::Subcircuit { name, iterations, location })
    }

    fn parse_block(&mut self) -> Option<Vec<Statement>> {
        self.eat(TokenKind::LBrace, "'{'");
        let mut stmts = Vec::new();
        while !matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof) {
            match self.parse_statement() {
                Some(s) => stmts.push(s),
                None => {
                    self.synchronize();
                    if matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof) {
                        break;
                    }
                }
            }
        }
        self.eat(TokenKind::RBrace, "'}'");
        Some(stmts)
    }

    fn parse_if(&mut self) -> Option<Statement> {
        let location = self.here();
        self.advance(); // 'if'
        self.eat(TokenKind::LParen, "'(' after if");
        let cond = self.parse_expression()?;
        self.eat(TokenKind::RParen, "')' after if condition");
        let body = self.parse_block()?;
        let mut branches = vec![(cond, body)];

        let mut else_branch = None;
        loop {
            if self.at_ident("else") {
                self.advance();
                if self.at_ident("if") {
                    self.advance();
                    self.eat(TokenKind::LParen, "'(' after else if");
                    let cond = self.parse_expression()?;
                    self.eat(TokenKind::RParen, "')' after else-if condition");
                    let body = self.parse_block()?;
                    branches.push((cond, body));
                    continue;
                }
                else_branch = Some(self.parse_block()?);
            }
            break;
        }

        Some(Statement::IfElse { branches, else_branch, location })
    }

    fn parse_for(&mut self) -> Option<Statement> {
        let location = self.here();
        self.advance(); // 'for'
        self.eat(TokenKind::LParen, "'(' after for");
        let init = if matches!(self.peek(), TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_single_instruction_statement()?))
        };
        self.eat(TokenKind::Semicolon, "';' in for header");
        let condition = self.parse_expression()?;
        self.eat(TokenKind::Semicolon, "';' in for header");
        let update = if matches!(self.peek(), TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_single_instruction_statement()?))
        };
        self.eat(TokenKind::RParen, "')' after for header");
        let body = self.parse_block()?;
        Some(Statement::ForLoop { init, condition, update, body, location })
    }

    fn parse_single_instruction_statement(&mut self) -> Option<Statement> {
        let location = self.here();
        let instr = self.parse_instruction()?;
        Some(Statement::Bundle(vec![instr], location))
    }

    fn parse_foreach(&mut self) -> Option<Statement> {
        let location = self.here();
        self.advance(); // 'foreach'
        self.eat(TokenKind::LParen, "'(' after foreach");
        let variable = self.expect_ident_text()?;
        self.eat(TokenKind::Assign, "'=' in foreach header");
        let from = self.parse_expression()?;
        self.eat_ident("to");
        let to = self.parse_expression()?;
        self.eat(TokenKind::RParen, "')' after foreach header");
        let body = self.parse_block()?;
        Some(Statement::ForeachLoop { variable, from, to, body, location })
    }

    fn parse_while(&mut self) -> Option<Statement> {
        let location = self.here();
        self.advance(); // 'while'
        self.eat(TokenKind::LParen, "'(' after while");
        let condition = self.parse_expression()?;
        self.eat(TokenKind::RParen, "')' after while condition");
        let body = self.parse_block()?;
        Some(Statement::WhileLoop { condition, body, location })
    }

    fn parse_repeat(&mut self) -> Option<Statement> {
        let location = self.here();
        self.advance(); // 'repeat'
        let body = self.parse_block()?;
        self.eat_ident("until");
        self.eat(TokenKind::LParen, "'(' after until");
        let condition = self.parse_expression()?;
        self.eat(TokenKind::RParen, "')' after until condition");
        self.eat(TokenKind::Semicolon, "';' after repeat/until");
        Some(Statement::RepeatUntilLoop { body, condition, location })
    }

    fn parse_bundle(&mut self) -> Option<Statement> {
        let location = self.here();
        let mut instrs = vec![self.parse_instruction()?];
        while matches!(self.peek(), TokenKind::Pipe) {
            self.advance();
            instrs.push(self.parse_instruction()?);
        }
        self.eat(TokenKind::Semicolon, "';' after bundle");
        Some(Statement::Bundle(instrs, location))
    }

    fn parse_instruction(&mut self) -> Option<Instruction> {
        let location = self.here();
        let name = self.expect_ident_text()?;
        let mut operands = Vec::new();

        if matches!(self.peek(), TokenKind::LParen) {
            self.advance();
            if !matches!(self.peek(), TokenKind::RParen) {
                operands.push(self.parse_expression()?);
                while matches!(self.peek(), TokenKind::Comma) {
                    self.advance();
                    operands.push(self.parse_expression()?);
                }
            }
            self.eat(TokenKind::RParen, "')' after instruction parameters");
        }

        while !matches!(
            self.peek(),
            TokenKind::Semicolon | TokenKind::Pipe | TokenKind::At | TokenKind::RBrace | TokenKind::Eof
        ) {
            operands.push(self.parse_expression()?);
            if matches!(self.peek(), TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        let mut annotations = Vec::new();
        while matches!(self.peek(), TokenKind::At) {
            annotations.push(self.parse_annotation()?);
        }

        Some(Instruction { name, condition: None, operands, annotations, location })
    }

    fn parse_annotation(&mut self) -> Option<AnnotationData> {
        let location = self.here();
        self.advance(); // '@'
        let name = self.expect_ident_text()?;
        let mut operands = Vec::new();
        if matches!(self.peek(), TokenKind::LParen) {
            self.advance();
            if !matches!(self.peek(), TokenKind::RParen) {
                operands.push(self.parse_expression()?);
                while matches!(self.peek(), TokenKind::Comma) {
                    self.advance();
                    operands.push(self.parse_expression()?);
                }
            }
            self.eat(TokenKind::RParen, "')' after annotation arguments");
        }
        Some(AnnotationData { name, operands, location })
    }

    fn expect_ident_text(&mut self) -> Option<String> {
        match self.peek().clone() {
            TokenKind::Ident(text) => {
                self.advance();
                Some(text)
            }
            _ => {
                self.error("expected an identifier");
                None
            }
        }
    }

    // ---- expressions, lowest to highest precedence ----

    fn parse_expression(&mut self) -> Option<Expression> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Option<Expression> {
        let condition = self.parse_logor()?;
        if matches!(self.peek(), TokenKind::Question) {
            let location = self.here();
            self.advance();
            let if_true = self.parse_ternary()?;
            self.eat(TokenKind::Colon, "':' in ternary expression");
            let if_false = self.parse_ternary()?;
            return Some(Expression::Ternary {
                condition: Box::new(condition),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
                location,
            });
        }
        Some(condition)
    }

    fn parse_logor(&mut self) -> Option<Expression> {
        self.parse_left_assoc(Self::parse_logand, &[(TokenKind::PipePipe, BinaryOperator::LogOr)])
    }

    fn parse_logand(&mut self) -> Option<Expression> {
        self.parse_left_assoc(Self::parse_bitor, &[(TokenKind::AmpAmp, BinaryOperator::LogAnd)])
    }

    fn parse_bitor(&mut self) -> Option<Expression> {
        self.parse_left_assoc(Self::parse_bitxor, &[(TokenKind::Pipe, BinaryOperator::BitOr)])
    }

    fn parse_bitxor(&mut self) -> Option<Expression> {
        self.parse_left_assoc(Self::parse_bitand, &[(TokenKind::Caret, BinaryOperator::BitXor)])
    }

    fn parse_bitand(&mut self) -> Option<Expression> {
        self.parse_left_assoc(Self::parse_equality, &[(TokenKind::Amp, BinaryOperator::BitAnd)])
    }

    fn parse_equality(&mut self) -> Option<Expression> {
        self.parse_left_assoc(
            Self::parse_relational,
            &[(TokenKind::EqEq, BinaryOperator::Eq), (TokenKind::NotEq, BinaryOperator::Ne)],
        )
    }

    fn parse_relational(&mut self) -> Option<Expression> {
        self.parse_left_assoc(
            Self::parse_shift,
            &[
                (TokenKind::Lt, BinaryOperator::Lt),
                (TokenKind::Le, BinaryOperator::Le),
                (TokenKind::Gt, BinaryOperator::Gt),
                (TokenKind::Ge, BinaryOperator::Ge),
            ],
        )
    }

    fn parse_shift(&mut self) -> Option<Expression> {
        self.parse_left_assoc(
            Self::parse_additive,
            &[(TokenKind::Shl, BinaryOperator::Shl), (TokenKind::Shr, BinaryOperator::Shr)],
        )
    }

    fn parse_additive(&mut self) -> Option<Expression> {
        self.parse_left_assoc(
            Self::parse_multiplicative,
            &[(TokenKind::Plus, BinaryOperator::Add), (TokenKind::Minus, BinaryOperator::Sub)],
        )
    }

    fn parse_multiplicative(&mut self) -> Option<Expression> {
        self.parse_left_assoc(
            Self::parse_unary,
            &[
                (TokenKind::Star, BinaryOperator::Mul),
                (TokenKind::Slash, BinaryOperator::Div),
                (TokenKind::SlashSlash, BinaryOperator::IntDiv),
                (TokenKind::Percent, BinaryOperator::Mod),
            ],
        )
    }

    /// Shared left-associative binary-operator climbing step: parse one
    /// `next` operand, then fold in `(op, next)` pairs for as long as the
    /// current token matches one of `ops`.
    fn parse_left_assoc(
        &mut self,
        next: fn(&mut Self) -> Option<Expression>,
        ops: &[(TokenKind, BinaryOperator)],
    ) -> Option<Expression> {
        let mut left = next(self)?;
        loop {
            let matched = ops.iter().find(|(kind, _)| {
                std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
            });
            let Some((_, op)) = matched else { break };
            let location = self.here();
            self.advance();
            let right = next(self)?;
            left = Expression::Binary { op: *op, lhs: Box::new(left), rhs: Box::new(right), location };
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<Expression> {
        let op = match self.peek() {
            TokenKind::Minus => Some(UnaryOperator::Negate),
            TokenKind::Tilde => Some(UnaryOperator::BitNot),
            TokenKind::Bang => Some(UnaryOperator::LogNot),
            _ => None,
        };
        if let Some(op) = op {
            let location = self.here();
            self.advance();
            let operand = self.parse_unary()?;
            return Some(Expression::Unary { op, operand: Box::new(operand), location });
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Option<Expression> {
        let left = self.parse_postfix()?;
        if matches!(self.peek(), TokenKind::StarStar) {
            let location = self.here();
            self.advance();
            let right = self.parse_unary()?;
            return Some(Expression::Binary {
                op: BinaryOperator::Pow,
                lhs: Box::new(left),
                rhs: Box::new(right),
                location,
            });
        }
        Some(left)
    }

    fn parse_postfix(&mut self) -> Option<Expression> {
        let mut expr = self.parse_primary()?;
        while matches!(self.peek(), TokenKind::LBracket) {
            let location = self.here();
            self.advance();
            let mut indices = vec![self.parse_index_entry()?];
            while matches!(self.peek(), TokenKind::Comma) {
                self.advance();
                indices.push(self.parse_index_entry()?);
            }
            self.eat(TokenKind::RBracket, "']' after index list");
            expr = Expression::Index { target: Box::new(expr), indices, location };
        }
        Some(expr)
    }

    fn parse_index_entry(&mut self) -> Option<IndexEntry> {
        let first = self.parse_expression()?;
        if matches!(self.peek(), TokenKind::Colon) {
            self.advance();
            let second = self.parse_expression()?;
            return Some(IndexEntry::Range(first, second));
        }
        Some(IndexEntry::Single(first))
    }

    fn parse_primary(&mut self) -> Option<Expression> {
        let location = self.here();
        match self.peek().clone() {
            TokenKind::Number(text) => {
                self.advance();
                let dots = text.matches('.').count();
                if dots == 0 {
                    match text.parse::<i64>() {
                        Ok(n) => Some(Expression::IntLiteral(n, location)),
                        Err(_) => {
                            self.error(format!("invalid integer literal '{text}'"));
                            None
                        }
                    }
                } else if dots == 1 {
                    match text.parse::<f64>() {
                        Ok(n) => Some(Expression::FloatLiteral(n, location)),
                        Err(_) => {
                            self.error(format!("invalid real literal '{text}'"));
                            None
                        }
                    }
                } else {
                    self.error(format!("'{text}' is not valid in an expression"));
                    None
                }
            }
            TokenKind::Str(text) => {
                self.advance();
                Some(Expression::StringLiteral(text, location))
            }
            TokenKind::Json(text) => {
                self.advance();
                Some(Expression::JsonLiteral(text, location))
            }
            TokenKind::LBracket => self.parse_matrix_literal(location),
            TokenKind::Ident(name) => {
                self.advance();
                if matches!(self.peek(), TokenKind::LParen) {
                    self.advance();
                    let mut args = Vec::new();
                    if !matches!(self.peek(), TokenKind::RParen) {
                        args.push(self.parse_expression()?);
                        while matches!(self.peek(), TokenKind::Comma) {
                            self.advance();
                            args.push(self.parse_expression()?);
                        }
                    }
                    self.eat(TokenKind::RParen, "')' after function call arguments");
                    Some(Expression::FunctionCall { name, args, location })
                } else {
                    Some(Expression::Identifier(name, location))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.eat(TokenKind::RParen, "')' after parenthesized expression");
                Some(inner)
            }
            _ => {
                self.error("expected an expression");
                None
            }
        }
    }

    fn parse_matrix_literal(&mut self, location: SourceLocation) -> Option<Expression> {
        self.advance(); // outer '['
        let mut rows = vec![self.parse_matrix_row()?];
        while matches!(self.peek(), TokenKind::Comma) {
            self.advance();
            rows.push(self.parse_matrix_row()?);
        }
        self.eat(TokenKind::RBracket, "']' after matrix literal");
        Some(Expression::MatrixLiteral(rows, location))
    }

    fn parse_matrix_row(&mut self) -> Option<Vec<Expression>> {
        self.eat(TokenKind::LBracket, "'[' for matrix row");
        let mut row = vec![self.parse_expression()?];
        while matches!(self.peek(), TokenKind::Comma) {
            self.advance();
            row.push(self.parse_expression()?);
        }
        self.eat(TokenKind::RBracket, "']' after matrix row");
        Some(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(source: &str) -> (Option<Program>, Vec<Diagnostic>) {
        let (tokens, lex_diags) = tokenize(source, "t.cq");
        assert!(lex_diags.is_empty(), "lexer diagnostics: {lex_diags:?}");
        Parser::new(tokens).parse_program()
    }

    #[test]
    fn parses_minimal_program() {
        let (program, diags) = parse("version 1.2;\nqubits 3;\n.main\nx q[0];\n");
        assert!(diags.is_empty(), "{diags:?}");
        let program = program.unwrap();
        assert_eq!(program.version, "1.2");
        assert!(program.num_qubits.is_some());
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn parses_mapping_and_variables() {
        let (program, diags) =
            parse("version 3.0;\nmap a = 1 + 2;\nqubit[5] q;\nbit b;\n");
        assert!(diags.is_empty(), "{diags:?}");
        let program = program.unwrap();
        assert!(matches!(program.statements[0], Statement::Mapping { .. }));
        match &program.statements[1] {
            Statement::Variables { type_name, names, .. } => {
                assert_eq!(type_name, "qubit[5]");
                assert_eq!(names, &vec!["q".to_string()]);
            }
            other => panic!("expected Variables, got {other:?}"),
        }
    }

    #[test]
    fn parses_if_elif_else_chain() {
        let (program, diags) = parse(
            "version 1.2;\n.main\nif (a == 1) { x q[0]; } else if (a == 2) { y q[0]; } else { z q[0]; }\n",
        );
        assert!(diags.is_empty(), "{diags:?}");
        let program = program.unwrap();
        match &program.statements[1] {
            Statement::IfElse { branches, else_branch, .. } => {
                assert_eq!(branches.len(), 2);
                assert!(else_branch.is_some());
            }
            other => panic!("expected IfElse, got {other:?}"),
        }
    }

    #[test]
    fn respects_operator_precedence() {
        let (program, diags) = parse("version 1.2;\nmap a = 1 + 2 * 3 ** 2;\n");
        assert!(diags.is_empty(), "{diags:?}");
        let program = program.unwrap();
        match &program.statements[0] {
            Statement::Mapping { value, .. } => {
                // 1 + (2 * (3 ** 2)) => top-level op is Add
                assert!(matches!(value, Expression::Binary { op: BinaryOperator::Add, .. }));
            }
            other => panic!("expected Mapping, got {other:?}"),
        }
    }

    #[test]
    fn parses_matrix_literal_and_index_range() {
        let (program, diags) = parse("version 1.2;\nmap m = [[1, 0], [0, 1]];\nmap s = q[0, 2:4];\n");
        assert!(diags.is_empty(), "{diags:?}");
        let program = program.unwrap();
        assert!(matches!(
            &program.statements[0],
            Statement::Mapping { value: Expression::MatrixLiteral(_, _), .. }
        ));
        match &program.statements[1] {
            Statement::Mapping { value: Expression::Index { indices, .. }, .. } => {
                assert_eq!(indices.len(), 2);
                assert!(matches!(indices[1], IndexEntry::Range(_, _)));
            }
            other => panic!("expected Index mapping, got {other:?}"),
        }
    }

    #[test]
    fn malformed_statement_is_diagnosed_without_infinite_loop() {
        let (_, diags) = parse("version 1.2;\nmap = ;\nmap ok = 1;\n");
        assert!(!diags.is_empty());
    }
}
