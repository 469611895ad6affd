//! SQL lexer for tokenizing preprocessed DDL text.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// SQL token types.
///
/// Keywords are not distinguished from identifiers here; callers match bare
/// words case-insensitively with [`Token::is_keyword`].
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare word: keyword, identifier or type name.
    Word(String),
    /// Identifier quoted with backticks, double quotes or brackets.
    Quoted(String),
    /// Single-quoted string literal.
    Str(String),
    Num(String),

    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,
    /// Any other single character (operators in CHECK expressions, etc.).
    Symbol(char),

    // End of input
    Eof,
}

impl Token {
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    /// Identifier text with quoting removed, if this token can name something.
    ///
    /// Single-quoted strings count: some dumps quote table names that way.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Token::Word(s) | Token::Quoted(s) | Token::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(s) | Token::Num(s) => write!(f, "{}", s),
            Token::Quoted(s) => write!(f, "\"{}\"", s),
            Token::Str(s) => write!(f, "'{}'", s),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Dot => write!(f, "."),
            Token::Symbol(c) => write!(f, "{}", c),
            Token::Eof => Ok(()),
        }
    }
}

/// Render tokens back to readable SQL, for diagnostics.
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in tokens {
        let glue = matches!(
            (prev, token),
            (None, _)
                | (_, Token::RParen | Token::Comma | Token::Dot | Token::LParen)
                | (Some(Token::LParen | Token::Dot), _)
        );
        if !glue {
            out.push(' ');
        }
        out.push_str(&token.to_string());
        prev = Some(token);
    }
    out
}

/// SQL lexer.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    current_char: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.chars().peekable();
        let current_char = chars.next();
        Self { chars, current_char }
    }

    fn advance(&mut self) {
        self.current_char = self.chars.next();
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.current_char {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                word.push(c);
                self.advance();
            } else {
                break;
            }
        }
        word
    }

    /// Read up to `close`; a doubled closing character is an escaped one.
    /// An unterminated quote runs to end of input.
    fn read_quoted(&mut self, close: char) -> String {
        self.advance(); // skip opening quote
        let mut text = String::new();
        while let Some(c) = self.current_char {
            if c == close {
                if self.peek() == Some(&close) {
                    text.push(c);
                    self.advance();
                    self.advance();
                } else {
                    self.advance(); // skip closing quote
                    break;
                }
            } else {
                text.push(c);
                self.advance();
            }
        }
        text
    }

    fn read_string(&mut self) -> String {
        self.advance(); // skip opening quote
        let mut s = String::new();
        while let Some(c) = self.current_char {
            if c == '\'' {
                if self.peek() == Some(&'\'') {
                    s.push(c);
                    self.advance();
                    self.advance();
                } else {
                    self.advance();
                    break;
                }
            } else if c == '\\' {
                self.advance();
                if let Some(escaped) = self.current_char {
                    s.push(escaped);
                    self.advance();
                }
            } else {
                s.push(c);
                self.advance();
            }
        }
        s
    }

    fn read_number(&mut self) -> String {
        let mut num = String::new();
        let mut has_dot = false;

        while let Some(c) = self.current_char {
            if c.is_ascii_digit() {
                num.push(c);
                self.advance();
            } else if c == '.' && !has_dot {
                has_dot = true;
                num.push(c);
                self.advance();
            } else {
                break;
            }
        }
        num
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.current_char {
            None => Token::Eof,

            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some(';') => {
                self.advance();
                Token::Semicolon
            }
            Some('.') => {
                self.advance();
                Token::Dot
            }

            Some('"') => Token::Quoted(self.read_quoted('"')),
            Some('`') => Token::Quoted(self.read_quoted('`')),
            // SQL Server style [identifier]
            Some('[') => Token::Quoted(self.read_quoted(']')),
            Some('\'') => Token::Str(self.read_string()),

            Some(c) if c.is_ascii_digit() => Token::Num(self.read_number()),
            Some(c) if c.is_alphabetic() || c == '_' => Token::Word(self.read_word()),

            Some(c) => {
                self.advance();
                Token::Symbol(c)
            }
        }
    }

    /// Collect all tokens, without the trailing `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if token == Token::Eof {
                break;
            }
            tokens.push(token);
        }
        tokens
    }
}
