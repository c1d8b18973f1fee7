//! Lexer: raw line text -> a flat token stream
//!
//! Mirrors the teacher's char-vector-based tokenizer. Line-number and
//! checksum words are recognized as distinct token kinds (used only for
//! diagnostics and validation, respectively) so the line assembler in
//! `super::line` never has to special-case them against ordinary words.

use crate::error::{Error, Result};

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `<LETTER><NUMBER>` word, letter upper-cased.
    Word { letter: char, value: f64 },
    /// `N<number>` line-number word embedded in the text.
    LineNumber(u32),
    /// `*<number>` checksum.
    Checksum(u32),
    /// Text of a `;` or `( )` comment, delimiters stripped.
    Comment(String),
}

/// Char-vector tokenizer over one line of text.
pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
    line_number: u32,
}

impl Tokenizer {
    /// Create a tokenizer over a single line's text.
    pub fn new(input: &str, line_number: u32) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line_number,
        }
    }

    /// Tokenize the entire line.
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            tokens.push(self.next_token()?);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token> {
        let ch = self.peek();
        match ch {
            ';' => {
                self.advance();
                Ok(Token::Comment(self.read_until_end()))
            }
            '(' => {
                self.advance();
                let text = self.read_until(')');
                if self.peek() == ')' {
                    self.advance();
                } else {
                    return Err(Error::parse(
                        self.line_number,
                        Some(self.position),
                        "unmatched '('",
                    ));
                }
                Ok(Token::Comment(text))
            }
            '*' => {
                self.advance();
                let value = self.read_number()?;
                Ok(Token::Checksum(value as u32))
            }
            'N' | 'n' => {
                self.advance();
                let value = self.read_number()?;
                Ok(Token::LineNumber(value as u32))
            }
            c if c.is_ascii_alphabetic() => {
                let letter = c.to_ascii_uppercase();
                self.advance();
                let value = self.read_number()?;
                Ok(Token::Word { letter, value })
            }
            _ => Err(Error::parse(
                self.line_number,
                Some(self.position),
                format!("unexpected character '{ch}'"),
            )),
        }
    }

    fn read_number(&mut self) -> Result<f64> {
        let start = self.position;
        let mut has_dot = false;
        let mut has_digits = false;

        if self.peek() == '+' || self.peek() == '-' {
            self.advance();
        }

        while !self.is_at_end() {
            let ch = self.peek();
            if ch.is_ascii_digit() {
                has_digits = true;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if !has_digits {
            return Err(Error::parse(
                self.line_number,
                Some(self.position),
                "expected a number after letter",
            ));
        }

        let text: String = self.input[start..self.position].iter().collect();
        text.parse::<f64>().map_err(|e| {
            Error::parse(
                self.line_number,
                Some(start),
                format!("invalid number '{text}': {e}"),
            )
        })
    }

    fn read_until(&mut self, delimiter: char) -> String {
        let start = self.position;
        while !self.is_at_end() && self.peek() != delimiter {
            self.advance();
        }
        self.input[start..self.position].iter().collect()
    }

    fn read_until_end(&mut self) -> String {
        let start = self.position;
        while !self.is_at_end() {
            self.advance();
        }
        self.input[start..self.position].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && (self.peek() == ' ' || self.peek() == '\t') {
            self.advance();
        }
    }

    fn peek(&self) -> char {
        self.input.get(self.position).copied().unwrap_or('\0')
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_move() {
        let mut tok = Tokenizer::new("G1 X10 Y-20.5 F600", 1);
        let tokens = tok.tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word { letter: 'G', value: 1.0 },
                Token::Word { letter: 'X', value: 10.0 },
                Token::Word { letter: 'Y', value: -20.5 },
                Token::Word { letter: 'F', value: 600.0 },
            ]
        );
    }

    #[test]
    fn test_semicolon_comment() {
        let mut tok = Tokenizer::new("G0 X0 ; rapid home", 1);
        let tokens = tok.tokenize().unwrap();
        assert_eq!(tokens[2], Token::Comment(" rapid home".to_string()));
    }

    #[test]
    fn test_paren_comment_and_checksum() {
        let mut tok = Tokenizer::new("N10 G1 X1 (cut) *42", 1);
        let tokens = tok.tokenize().unwrap();
        assert_eq!(tokens[0], Token::LineNumber(10));
        assert_eq!(tokens[3], Token::Comment("cut".to_string()));
        assert_eq!(tokens[4], Token::Checksum(42));
    }

    #[test]
    fn test_unmatched_paren_is_error() {
        let mut tok = Tokenizer::new("G1 X1 (oops", 1);
        assert!(tok.tokenize().is_err());
    }

    #[test]
    fn test_malformed_word_is_error() {
        let mut tok = Tokenizer::new("G1 X", 1);
        assert!(tok.tokenize().is_err());
    }
}
