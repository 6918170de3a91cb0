use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};
use substring::Substring;

use crate::error::{Error, ScanError};
use crate::literal::Literal;
use crate::token::{Location, Token, Type};

/// Turns a source string into a list of tokens. The scanner works in a
/// single pass with one character of lookahead, plus one more to decide
/// whether a dot starts the fractional part of a number.
pub struct Scanner<'a> {
    source: &'a str,
    chars: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    column_offset: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner.
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source,
            chars: source.chars().peekmore(),
            tokens: vec!(),
            start: 0,
            current: 0,
            line: 1,
            column_offset: 0,
        }
    }

    /// Scans the source code and returns a vector of tokens.
    pub fn scan_tokens(&mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(
            Token::new(
                Type::EOF,
                String::new(),
                None,
                Location::new(self.line, self.current - self.column_offset),
            )
        );

        self.tokens.clone()
    }

    /// Consumes the next character.
    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.current += 1;
        }

        c
    }

    /// Returns the next character without consuming it.
    fn peek(&mut self) -> Option<char> {
        self.chars.reset_cursor();
        self.chars.peek().copied()
    }

    /// Returns the character after the next one without consuming anything.
    fn peek_next(&mut self) -> Option<char> {
        self.chars.reset_cursor();
        self.chars.peek_nth(1).copied()
    }

    /// Returns if the character after the next one is the expected character.
    fn match_next(&mut self, expected: char) -> bool {
        self.peek_next() == Some(expected)
    }

    /// Returns if the scanner has reached the end of the file.
    fn is_at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    /// Adds a new token to the list of tokens. The lexeme is sliced out of
    /// the source between the token's start and the current position.
    fn add_token(&mut self, r#type: Type, literal: Option<Literal>) {
        let lexeme = self.source.substring(self.start, self.current).to_string();

        self.tokens.push(
            Token::new(
                r#type,
                lexeme,
                literal,
                Location::new(self.line, self.start - self.column_offset),
            )
        );
    }

    /// Adds a new single char token to the list of tokens.
    fn add_single_char_token(&mut self, r#type: Type) {
        self.advance();
        self.add_token(r#type, None);
    }

    /// Adds a new double char token to the list of tokens.
    fn add_double_char_token(&mut self, r#type: Type) {
        self.advance();
        self.advance();
        self.add_token(r#type, None);
    }

    /// Handles a string literal. Strings may span multiple lines.
    fn string(&mut self) {
        let start = Location::new(self.line, self.start - self.column_offset);
        self.advance(); // Move past the opening double quote.

        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }

            self.advance();
            if c == '\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            ScanError {
                location: start,
                message: String::from("Unterminated string"),
            }.throw();
            return;
        }

        self.advance(); // Move past the closing double quote.

        // The literal holds the inner text while the lexeme keeps the quotes.
        let value = self.source.substring(self.start + 1, self.current - 1).to_string();
        self.add_token(Type::String, Some(Literal::String(value)));
    }

    /// Handles a number literal.
    fn number(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }

        // A fractional part only counts if a digit follows the dot. A
        // trailing dot is left to be scanned as its own token.
        if self.peek() == Some('.') && matches!(self.peek_next(), Some(c) if c.is_ascii_digit()) {
            self.advance(); // Consume the dot.

            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        let value = self.source.substring(self.start, self.current);
        let value: f64 = value.parse().expect("a run of digits to parse as a number");

        self.add_token(Type::Number, Some(Literal::Number(value)));
    }

    /// Handles an identifier or a keyword. Identifiers are ASCII letters,
    /// digits and underscores only.
    fn identifier(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }

        let token_type = match self.source.substring(self.start, self.current) {
            "and"      => Type::And,
            "class"    => Type::Class,
            "else"     => Type::Else,
            "false"    => Type::False,
            "for"      => Type::For,
            "fun"      => Type::Fun,
            "if"       => Type::If,
            "nil"      => Type::Nil,
            "or"       => Type::Or,
            "print"    => Type::Print,
            "return"   => Type::Return,
            "super"    => Type::Super,
            "this"     => Type::This,
            "true"     => Type::True,
            "var"      => Type::Var,
            "while"    => Type::While,
            _          => Type::Identifier,
        };

        self.add_token(token_type, None);
    }

    /// Scans the next token.
    fn scan_token(&mut self) {
        let Some(c) = self.peek() else { return };
        match c {
            // One character tokens
            '(' => self.add_single_char_token(Type::LeftParen),
            ')' => self.add_single_char_token(Type::RightParen),
            '{' => self.add_single_char_token(Type::LeftBrace),
            '}' => self.add_single_char_token(Type::RightBrace),
            ',' => self.add_single_char_token(Type::Comma),
            '.' => self.add_single_char_token(Type::Dot),
            '-' => self.add_single_char_token(Type::Minus),
            '+' => self.add_single_char_token(Type::Plus),
            ';' => self.add_single_char_token(Type::Semicolon),
            '*' => self.add_single_char_token(Type::Star),

            // Two character tokens
            '!' => {
                if self.match_next('=') {
                    self.add_double_char_token(Type::BangEqual);
                } else {
                    self.add_single_char_token(Type::Bang);
                }
            },
            '=' => {
                if self.match_next('=') {
                    self.add_double_char_token(Type::EqualEqual);
                } else {
                    self.add_single_char_token(Type::Equal);
                }
            },
            '<' => {
                if self.match_next('=') {
                    self.add_double_char_token(Type::LessEqual);
                } else {
                    self.add_single_char_token(Type::Less);
                }
            },
            '>' => {
                if self.match_next('=') {
                    self.add_double_char_token(Type::GreaterEqual);
                } else {
                    self.add_single_char_token(Type::Greater);
                }
            },
            '/' => {
                if self.match_next('/') {
                    // A line comment runs to the end of the line.
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.advance();
                    }
                } else {
                    self.add_single_char_token(Type::Slash);
                }
            },

            // Ignore whitespace
            ' ' | '\r' | '\t' => {
                self.advance();
            },

            // Update line counter
            '\n' => {
                self.advance();

                self.line += 1;
                self.column_offset = self.current;
            },

            // String
            '"' => self.string(),

            // Numbers
            c if c.is_ascii_digit() => self.number(),

            // Identifiers
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),

            _ => {
                self.advance();

                ScanError {
                    location: Location::new(self.line, self.start - self.column_offset),
                    message: format!("Unexpected character: {c}"),
                }.throw();
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn scan(source: &str) -> Vec<Token> {
        Scanner::new(source).scan_tokens()
    }

    fn types(tokens: &[Token]) -> Vec<Type> {
        tokens.iter().map(|token| token.r#type).collect()
    }

    #[test]
    fn scan_arithmetic() {
        let tokens = scan("1 + 2 * 3;");

        assert_eq!(types(&tokens), vec![
            Type::Number, Type::Plus, Type::Number, Type::Star, Type::Number,
            Type::Semicolon, Type::EOF,
        ]);
        assert_eq!(tokens[0].literal, Some(Literal::Number(1.0)));
        assert_eq!(tokens[0].lexeme, "1");
    }

    #[test]
    fn scan_double_char_operators() {
        let tokens = scan("! != = == < <= > >=");

        assert_eq!(types(&tokens), vec![
            Type::Bang, Type::BangEqual, Type::Equal, Type::EqualEqual,
            Type::Less, Type::LessEqual, Type::Greater, Type::GreaterEqual,
            Type::EOF,
        ]);
        assert_eq!(tokens[1].lexeme, "!=");
    }

    #[test]
    fn scan_keywords_and_identifiers() {
        let tokens = scan("var nilly = nil;");

        assert_eq!(types(&tokens), vec![
            Type::Var, Type::Identifier, Type::Equal, Type::Nil,
            Type::Semicolon, Type::EOF,
        ]);
        assert_eq!(tokens[1].lexeme, "nilly");
    }

    #[test]
    fn scan_string_literal() {
        let tokens = scan("\"hello world\"");

        assert_eq!(tokens[0].r#type, Type::String);
        assert_eq!(tokens[0].lexeme, "\"hello world\"");
        assert_eq!(tokens[0].literal, Some(Literal::from("hello world")));
    }

    #[test]
    fn scan_multiline_string_counts_lines() {
        let tokens = scan("\"one\ntwo\"\nx");

        assert_eq!(tokens[0].literal, Some(Literal::from("one\ntwo")));
        assert_eq!(tokens[1].r#type, Type::Identifier);
        assert_eq!(tokens[1].location.line, 3);
    }

    #[test]
    fn trailing_dot_is_not_part_of_a_number() {
        let tokens = scan("123.");

        assert_eq!(types(&tokens), vec![Type::Number, Type::Dot, Type::EOF]);
        assert_eq!(tokens[0].literal, Some(Literal::Number(123.0)));
    }

    #[test]
    fn scan_fractional_number() {
        let tokens = scan("3.25");

        assert_eq!(tokens[0].literal, Some(Literal::Number(3.25)));
        assert_eq!(tokens[0].lexeme, "3.25");
    }

    #[test]
    fn comments_are_discarded() {
        let tokens = scan("// nothing to see\n1 // one\n");

        assert_eq!(types(&tokens), vec![Type::Number, Type::EOF]);
        assert_eq!(tokens[0].location.line, 2);
    }

    #[test]
    fn line_and_column_tracking() {
        let tokens = scan("var a;\nvar b;");

        assert_eq!(tokens[0].location, Location::new(1, 0));
        assert_eq!(tokens[1].location, Location::new(1, 4));
        assert_eq!(tokens[3].location, Location::new(2, 0));
        assert_eq!(tokens[4].location, Location::new(2, 4));
    }

    #[test]
    fn token_stream_ends_with_eof() {
        let tokens = scan("");

        assert_eq!(types(&tokens), vec![Type::EOF]);
        assert_eq!(tokens[0].location.line, 1);
    }
}
