// SPDX-License-Identifier: AGPL-3.0-or-later
// PulseDB - Streaming Telemetry Log Engine
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Lexer for filter and trigger expressions
//!
//! Converts expression text into a stream of tokens. Handles numbers
//! (with optional sign, fraction, and exponent), quoted strings,
//! identifiers, and the comparison/logical operators of the grammar.

use super::token::{Token, TokenKind};
use crate::error::{PulseError, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Expression lexer
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire input, appending a trailing Eof token
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        while let Some(&c) = self.chars.peek() {
            let start = self.pos;
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '&' => {
                    self.advance();
                    self.expect_char('&', start)?;
                    self.tokens.push(Token::new(TokenKind::AndAnd, start));
                }
                '|' => {
                    self.advance();
                    self.expect_char('|', start)?;
                    self.tokens.push(Token::new(TokenKind::OrOr, start));
                }
                '=' => {
                    self.advance();
                    self.expect_char('=', start)?;
                    self.tokens.push(Token::new(TokenKind::EqEq, start));
                }
                '!' => {
                    self.advance();
                    if self.chars.peek() == Some(&'=') {
                        self.advance();
                        self.tokens.push(Token::new(TokenKind::NotEq, start));
                    } else {
                        self.tokens.push(Token::new(TokenKind::Bang, start));
                    }
                }
                '<' => {
                    self.advance();
                    if self.chars.peek() == Some(&'=') {
                        self.advance();
                        self.tokens.push(Token::new(TokenKind::LtEq, start));
                    } else {
                        self.tokens.push(Token::new(TokenKind::Lt, start));
                    }
                }
                '>' => {
                    self.advance();
                    if self.chars.peek() == Some(&'=') {
                        self.advance();
                        self.tokens.push(Token::new(TokenKind::GtEq, start));
                    } else {
                        self.tokens.push(Token::new(TokenKind::Gt, start));
                    }
                }
                '"' | '\'' => self.scan_string(c)?,
                '-' | '0'..='9' => self.scan_number()?,
                c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(),
                c => {
                    return Err(PulseError::parse(
                        start,
                        format!("Unexpected character '{}'", c),
                    ));
                }
            }
        }
        self.tokens.push(Token::new(TokenKind::Eof, self.pos));
        Ok(self.tokens)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn single(&mut self, kind: TokenKind) {
        let start = self.pos;
        self.advance();
        self.tokens.push(Token::new(kind, start));
    }

    fn expect_char(&mut self, expected: char, start: usize) -> Result<()> {
        match self.advance() {
            Some(c) if c == expected => Ok(()),
            _ => Err(PulseError::parse(
                start,
                format!("Expected '{}'", expected),
            )),
        }
    }

    fn scan_string(&mut self, quote: char) -> Result<()> {
        let start = self.pos;
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                Some(c) if c == quote => break,
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(c) => value.push(c),
                    None => {
                        return Err(PulseError::parse(start, "Unterminated string literal"));
                    }
                },
                Some(c) => value.push(c),
                None => {
                    return Err(PulseError::parse(start, "Unterminated string literal"));
                }
            }
        }
        self.tokens.push(Token::new(TokenKind::String(value), start));
        Ok(())
    }

    fn scan_number(&mut self) -> Result<()> {
        let start = self.pos;
        let mut text = String::new();
        if self.chars.peek() == Some(&'-') {
            text.push('-');
            self.advance();
        }
        let mut is_float = false;
        while let Some(&c) = self.chars.peek() {
            match c {
                '0'..='9' => {
                    text.push(c);
                    self.advance();
                }
                '.' if !is_float => {
                    is_float = true;
                    text.push(c);
                    self.advance();
                }
                'e' | 'E' => {
                    is_float = true;
                    text.push(c);
                    self.advance();
                    if let Some(&sign) = self.chars.peek() {
                        if sign == '+' || sign == '-' {
                            text.push(sign);
                            self.advance();
                        }
                    }
                }
                _ => break,
            }
        }
        if text == "-" {
            return Err(PulseError::parse(start, "Expected digits after '-'"));
        }
        let kind = if is_float {
            let v = text
                .parse::<f64>()
                .map_err(|_| PulseError::parse(start, format!("Invalid number '{}'", text)))?;
            TokenKind::Float(v)
        } else {
            let v = text
                .parse::<i64>()
                .map_err(|_| PulseError::parse(start, format!("Invalid number '{}'", text)))?;
            TokenKind::Integer(v)
        };
        self.tokens.push(Token::new(kind, start));
        Ok(())
    }

    fn scan_identifier(&mut self) {
        let start = self.pos;
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = match text.as_str() {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => TokenKind::Identifier(text),
        };
        self.tokens.push(Token::new(kind, start));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a == 1 && b != 2 || !(c < 3)"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::EqEq,
                TokenKind::Integer(1),
                TokenKind::AndAnd,
                TokenKind::Identifier("b".into()),
                TokenKind::NotEq,
                TokenKind::Integer(2),
                TokenKind::OrOr,
                TokenKind::Bang,
                TokenKind::LParen,
                TokenKind::Identifier("c".into()),
                TokenKind::Lt,
                TokenKind::Integer(3),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("-12 0.5 1e3"),
            vec![
                TokenKind::Integer(-12),
                TokenKind::Float(0.5),
                TokenKind::Float(1000.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings_and_bools() {
        assert_eq!(
            kinds("h == \"abc\" && a == true"),
            vec![
                TokenKind::Identifier("h".into()),
                TokenKind::EqEq,
                TokenKind::String("abc".into()),
                TokenKind::AndAnd,
                TokenKind::Identifier("a".into()),
                TokenKind::EqEq,
                TokenKind::True,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("h == \"abc").tokenize().unwrap_err();
        assert!(matches!(err, PulseError::Parse { .. }));
    }

    #[test]
    fn test_lone_ampersand() {
        let err = Lexer::new("a & b").tokenize().unwrap_err();
        assert!(matches!(err, PulseError::Parse { .. }));
    }
}
