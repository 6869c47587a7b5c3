//! Tokenizer for singleton material scripts
//!
//! Produces located tokens for the `singleton Material(name) { key = "value"; };`
//! notation. Comments (`//` to end of line and `/* ... */`) are dropped here so
//! the parser never sees them.

use std::str::Chars;

use super::error::SourceLocation;

/// Lexical token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Bare word: keywords, class names, material names, keys, layer indices
    Ident(String),
    /// Content between double quotes, kept verbatim (escapes are not decoded)
    String(String),
    /// String that hit end of line or input before its closing quote
    UnterminatedString(String),

    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Equals,    // =
    Semicolon, // ;

    /// Any character the grammar has no use for
    Unexpected(char),
    Eof,
}

impl Token {
    /// Short description used in parse error messages
    pub fn describe(&self) -> String {
        match self {
            Self::Ident(word) => format!("'{word}'"),
            Self::String(value) => format!("string \"{value}\""),
            Self::UnterminatedString(_) => "unterminated string".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::LBrace => "'{'".to_string(),
            Self::RBrace => "'}'".to_string(),
            Self::LBracket => "'['".to_string(),
            Self::RBracket => "']'".to_string(),
            Self::Equals => "'='".to_string(),
            Self::Semicolon => "';'".to_string(),
            Self::Unexpected(c) => format!("unexpected character '{c}'"),
            Self::Eof => "end of input".to_string(),
        }
    }

    /// Whether this token starts a new declaration
    pub fn is_declaration_keyword(&self) -> bool {
        matches!(self, Self::Ident(word) if word == "singleton" || word == "new")
    }
}

/// Token plus the position of its first character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    /// The token
    pub token: Token,
    /// Where it starts
    pub location: SourceLocation,
}

/// Streaming lexer over script text
pub struct Lexer<'a> {
    chars: Chars<'a>,
    peek: Option<char>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a lexer positioned at the start of `src`
    pub fn new(src: &'a str) -> Self {
        let mut chars = src.chars();
        let peek = chars.next();
        Self {
            chars,
            peek,
            line: 1,
            column: 1,
        }
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    fn bump(&mut self) -> Option<char> {
        let cur = self.peek;
        self.peek = self.chars.next();
        match cur {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            Some(_) => self.column += 1,
            None => {}
        }
        cur
    }

    fn peek_second(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// Skip whitespace and comments
    fn skip_trivia(&mut self) {
        loop {
            match self.peek {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_second() == Some('/') => {
                    while !matches!(self.peek, None | Some('\n')) {
                        self.bump();
                    }
                }
                Some('/') if self.peek_second() == Some('*') => {
                    self.bump();
                    self.bump();
                    // An unclosed block comment swallows the rest of the input
                    while let Some(c) = self.bump() {
                        if c == '*' && self.peek == Some('/') {
                            self.bump();
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    /// Produce the next token
    pub fn next_token(&mut self) -> Spanned {
        self.skip_trivia();
        let location = self.location();

        let Some(c) = self.bump() else {
            return Spanned {
                token: Token::Eof,
                location,
            };
        };

        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '=' => Token::Equals,
            ';' => Token::Semicolon,
            '"' => self.lex_string(),
            c if is_word_char(c) => {
                let mut word = String::new();
                word.push(c);
                while let Some(p) = self.peek.filter(|p| is_word_char(*p)) {
                    word.push(p);
                    self.bump();
                }
                Token::Ident(word)
            }
            other => Token::Unexpected(other),
        };

        Spanned { token, location }
    }

    fn lex_string(&mut self) -> Token {
        let mut value = String::new();
        loop {
            match self.peek {
                None | Some('\n') => return Token::UnterminatedString(value),
                Some('"') => {
                    self.bump();
                    return Token::String(value);
                }
                Some('\\') => {
                    value.push('\\');
                    self.bump();
                    // Keep the escaped character verbatim, including a quote
                    if let Some(escaped) = self.peek.filter(|p| *p != '\n') {
                        value.push(escaped);
                        self.bump();
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
