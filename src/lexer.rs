//! Tokenizer
//!
//! Turns source text into a flat token stream for `crate::parser`. Keywords
//! are not their own token kind: they come out as plain `Ident`s and the
//! parser matches on the text, leaving keyword recognition to the grammar
//! rather than the scanner.
//!
//! Never stops at the first bad character: an unrecognized byte becomes a
//! single `Diagnostic` and the scan continues, so a single typo doesn't
//! hide every other error in the file.

use crate::ast::SourceLocation;
use crate::diagnostics::{Diagnostic, ErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    /// Raw digit-and-dot text. The parser tells int/float/version literals
    /// apart by counting dots: none is an int, one is a float, more than
    /// one is a version number (`1.2`, `3.0`).
    Number(String),
    Str(String),
    Json(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Colon,
    At,
    Dot,
    Assign,
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    CaretCaret,
    Tilde,
    Bang,
    EqEq,
    NotEq,
    Lt,
    Le,
    Shl,
    Gt,
    Ge,
    Shr,
    Shr3,
    Question,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
}

/// Tokenize `source`, attributing every location to `filename`. Always
/// terminates with an `Eof` token so the parser never has to special-case
/// running off the end of the slice.
pub fn tokenize(source: &str, filename: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut lexer = Lexer::new(source, filename);
    lexer.run();
    (lexer.tokens, lexer.diagnostics)
}

struct Lexer<'a> {
    filename: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, filename: &'a str) -> Self {
        Lexer {
            filename,
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn loc(&self) -> SourceLocation {
        SourceLocation::new(self.filename, self.line, self.column)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, location: SourceLocation) {
        self.tokens.push(Token { kind, location });
    }

    fn run(&mut self) {
        loop {
            self.skip_trivia();
            let start = self.loc();
            let Some(c) = self.peek() else {
                self.push(TokenKind::Eof, start);
                return;
            };

            if c.is_ascii_digit() {
                self.lex_number(start);
                continue;
            }
            if c.is_alphabetic() || c == '_' {
                self.lex_ident_or_json(start);
                continue;
            }
            if c == '"' {
                self.lex_string(start);
                continue;
            }

            self.advance();
            let two = self.peek();
            let kind = match (c, two) {
                ('(', _) => TokenKind::LParen,
                (')', _) => TokenKind::RParen,
                ('[', _) => TokenKind::LBracket,
                (']', _) => TokenKind::RBracket,
                ('{', _) => TokenKind::LBrace,
                ('}', _) => TokenKind::RBrace,
                (',', _) => TokenKind::Comma,
                (';', _) => TokenKind::Semicolon,
                (':', _) => TokenKind::Colon,
                ('@', _) => TokenKind::At,
                ('.', _) => TokenKind::Dot,
                ('?', _) => TokenKind::Question,
                ('~', _) => TokenKind::Tilde,
                ('+', _) => TokenKind::Plus,
                ('-', _) => TokenKind::Minus,
                ('%', _) => TokenKind::Percent,
                ('*', Some('*')) => {
                    self.advance();
                    TokenKind::StarStar
                }
                ('*', _) => TokenKind::Star,
                ('/', Some('/')) => {
                    self.advance();
                    TokenKind::SlashSlash
                }
                ('/', _) => TokenKind::Slash,
                ('=', Some('=')) => {
                    self.advance();
                    TokenKind::EqEq
                }
                ('=', _) => TokenKind::Assign,
                ('!', Some('=')) => {
                    self.advance();
                    TokenKind::NotEq
                }
                ('!', _) => TokenKind::Bang,
                ('&', Some('&')) => {
                    self.advance();
                    TokenKind::AmpAmp
                }
                ('&', _) => TokenKind::Amp,
                ('|', Some('|')) => {
                    self.advance();
                    TokenKind::PipePipe
                }
                ('|', _) => TokenKind::Pipe,
                ('^', Some('^')) => {
                    self.advance();
                    TokenKind::CaretCaret
                }
                ('^', _) => TokenKind::Caret,
                ('<', Some('=')) => {
                    self.advance();
                    TokenKind::Le
                }
                ('<', Some('<')) => {
                    self.advance();
                    TokenKind::Shl
                }
                ('<', _) => TokenKind::Lt,
                ('>', Some('=')) => {
                    self.advance();
                    TokenKind::Ge
                }
                ('>', Some('>')) => {
                    self.advance();
                    if self.peek() == Some('>') {
                        self.advance();
                        TokenKind::Shr3
                    } else {
                        TokenKind::Shr
                    }
                }
                ('>', _) => TokenKind::Gt,
                (other, _) => {
                    self.diagnostics.push(Diagnostic::error(
                        ErrorKind::Parse,
                        format!("unexpected character '{other}'"),
                        start.clone(),
                    ));
                    continue;
                }
            };
            self.push(kind, start);
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let start = self.loc();
                    self.advance();
                    self.advance();
                    let mut closed = false;
                    while let Some(c) = self.peek() {
                        if c == '*' && self.peek_at(1) == Some('/') {
                            self.advance();
                            self.advance();
                            closed = true;
                            break;
                        }
                        self.advance();
                    }
                    if !closed {
                        self.diagnostics.push(Diagnostic::error(
                            ErrorKind::Parse,
                            "unterminated block comment",
                            start,
                        ));
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_number(&mut self, start: SourceLocation) {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                // Don't swallow a trailing `.` that isn't followed by a digit
                // (e.g. `3.to_string()`-style member access doesn't exist in
                // cQASM, but `3..method` style ranges aren't a risk either;
                // guard anyway so `1.` alone stays a clean int + Dot).
                if c == '.' && !matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) {
                    break;
                }
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        self.push(TokenKind::Number(text), start);
    }

    fn lex_ident_or_json(&mut self, start: SourceLocation) {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if text == "json" {
            self.skip_trivia();
            if self.peek() == Some('"') {
                let json_start = self.loc();
                if let Some(body) = self.read_string_body(json_start) {
                    self.push(TokenKind::Json(body), start);
                    return;
                }
            }
        }
        self.push(TokenKind::Ident(text), start);
    }

    fn lex_string(&mut self, start: SourceLocation) {
        if let Some(body) = self.read_string_body(start.clone()) {
            self.push(TokenKind::Str(body), start);
        }
    }

    /// Consumes a `"..."` literal (with `\"`, `\\`, `\n`, `\t` escapes),
    /// returning its decoded body. Reports and returns `None` if the file
    /// ends before the closing quote.
    fn read_string_body(&mut self, start: SourceLocation) -> Option<String> {
        self.advance(); // opening quote
        let mut out = String::new();
        loop {
            match self.peek() {
                None => {
                    self.diagnostics.push(Diagnostic::error(
                        ErrorKind::Parse,
                        "unterminated string literal",
                        start,
                    ));
                    return None;
                }
                Some('"') => {
                    self.advance();
                    return Some(out);
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        Some('n') => out.push('\n'),
                        Some('t') => out.push('\t'),
                        Some('"') => out.push('"'),
                        Some('\\') => out.push('\\'),
                        Some(other) => out.push(other),
                        None => {
                            self.diagnostics.push(Diagnostic::error(
                                ErrorKind::Parse,
                                "unterminated string literal",
                                start,
                            ));
                            return None;
                        }
                    }
                }
                Some(c) => {
                    out.push(c);
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, diags) = tokenize(source, "t.cq");
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_version_and_qubits_header() {
        let ks = kinds("version 1.2;\nqubits 5;\n");
        assert_eq!(
            ks,
            vec![
                TokenKind::Ident("version".into()),
                TokenKind::Number("1.2".into()),
                TokenKind::Semicolon,
                TokenKind::Ident("qubits".into()),
                TokenKind::Number("5".into()),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn distinguishes_shift_and_relational_operators() {
        let ks = kinds("a << b >> c >>> d <= e >= f");
        assert!(ks.contains(&TokenKind::Shl));
        assert!(ks.contains(&TokenKind::Shr));
        assert!(ks.contains(&TokenKind::Shr3));
        assert!(ks.contains(&TokenKind::Le));
        assert!(ks.contains(&TokenKind::Ge));
    }

    #[test]
    fn skips_line_and_block_comments() {
        let ks = kinds("x // trailing comment\n/* block\ncomment */ y");
        assert_eq!(
            ks,
            vec![
                TokenKind::Ident("x".into()),
                TokenKind::Ident("y".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn reads_escaped_string_literal() {
        let ks = kinds(r#""line\n\"quoted\"""#);
        assert_eq!(ks, vec![TokenKind::Str("line\n\"quoted\"".into()), TokenKind::Eof]);
    }

    #[test]
    fn json_keyword_followed_by_string_becomes_json_token() {
        let ks = kinds(r#"json "{\"a\": 1}""#);
        assert_eq!(ks, vec![TokenKind::Json("{\"a\": 1}".into()), TokenKind::Eof]);
    }

    #[test]
    fn unknown_character_is_diagnosed_and_skipped() {
        let (tokens, diags) = tokenize("x # y", "t.cq");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, ErrorKind::Parse);
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident("x".into()),
                TokenKind::Ident("y".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_diagnosed() {
        let (_, diags) = tokenize("\"no closing quote", "t.cq");
        assert_eq!(diags.len(), 1);
    }
}
