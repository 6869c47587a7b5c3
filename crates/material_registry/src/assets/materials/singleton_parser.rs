//! Singleton material script parser
//!
//! Parses `materials.cs` style scripts into [`MaterialRecord`]s:
//!
//! ```text
//! singleton Material(trafficlight)
//! {
//!     mapTo = "trafficlight";
//!     diffuseMap[0] = "levels/drivebuild/art/objects/traffic_cycle.png";
//!     materialTag0 = "beamng"; materialTag1 = "vehicle";
//! };
//! ```
//!
//! A broken block only costs that block. The parser records a located
//! [`ParseError`], resynchronizes, and keeps going with the next declaration.

use std::collections::HashMap;

use super::error::{ParseError, ParseErrorKind, SourceLocation};
use super::lexer::{Lexer, Spanned, Token};
use super::material_record::{MaterialRecord, RecordOrigin};

/// Class name of the declarations that become records
pub const MATERIAL_CLASS: &str = "Material";

/// A well-formed declaration of some other class, skipped by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredDeclaration {
    /// Declared class, e.g. `CubemapData`
    pub class_name: String,
    /// Declared object name
    pub name: String,
    /// Location of the declaration keyword
    pub location: SourceLocation,
}

/// Everything parsed out of one source
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Well-formed material records in declaration order
    pub records: Vec<MaterialRecord>,
    /// One entry per skipped, malformed block
    pub errors: Vec<ParseError>,
    /// Non-material declarations that were skipped
    pub ignored: Vec<IgnoredDeclaration>,
}

enum Declaration {
    Material(MaterialRecord),
    Ignored(IgnoredDeclaration),
}

/// How to get back in step after a failed declaration
enum Recovery {
    /// Header broke: skip to the next declaration keyword
    NextDeclaration,
    /// Body broke: skip to the matching closing brace
    CloseBody,
    /// Already positioned at the next thing to parse
    None,
}

struct Failure {
    error: ParseError,
    recovery: Recovery,
}

impl Failure {
    fn header(error: ParseError) -> Self {
        Self {
            error,
            recovery: Recovery::NextDeclaration,
        }
    }

    fn body(error: ParseError) -> Self {
        Self {
            error,
            recovery: Recovery::CloseBody,
        }
    }

    fn positioned(error: ParseError) -> Self {
        Self {
            error,
            recovery: Recovery::None,
        }
    }
}

/// Singleton script parser
pub struct SingletonParser<'a> {
    source_name: &'a str,
    lexer: Lexer<'a>,
    current: Spanned,
}

impl<'a> SingletonParser<'a> {
    /// Parse script contents
    ///
    /// # Arguments
    /// * `source_name` - Label used in errors and record provenance (usually the file path)
    /// * `contents` - The script text
    pub fn parse(source_name: &'a str, contents: &'a str) -> ParseOutcome {
        let mut parser = Self::new(source_name, contents);
        parser.parse_all()
    }

    fn new(source_name: &'a str, contents: &'a str) -> Self {
        let mut lexer = Lexer::new(contents);
        let current = lexer.next_token();
        Self {
            source_name,
            lexer,
            current,
        }
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn at(&self, token: &Token) -> bool {
        &self.current.token == token
    }

    fn at_resync_keyword(&self) -> bool {
        matches!(&self.current.token, Token::Ident(word) if word == "singleton")
    }

    fn error_at(&self, location: SourceLocation, record: Option<&str>, kind: ParseErrorKind) -> ParseError {
        ParseError {
            source_name: self.source_name.to_string(),
            location,
            record: record.map(str::to_string),
            kind,
        }
    }

    fn unexpected(&self, record: Option<&str>, expected: &str) -> ParseError {
        let reason = format!("expected {expected}, found {}", self.current.token.describe());
        self.error_at(self.current.location, record, ParseErrorKind::MalformedBlock { reason })
    }

    fn expect(&mut self, token: &Token, expected: &str, record: Option<&str>) -> Result<(), ParseError> {
        if !self.at(token) {
            return Err(self.unexpected(record, expected));
        }
        self.advance();
        Ok(())
    }

    fn expect_ident(&mut self, expected: &str, record: Option<&str>) -> Result<String, ParseError> {
        if let Token::Ident(word) = &mut self.current.token {
            let word = std::mem::take(word);
            self.advance();
            return Ok(word);
        }
        Err(self.unexpected(record, expected))
    }

    fn expect_string(&mut self, expected: &str, record: Option<&str>) -> Result<String, ParseError> {
        if let Token::String(value) = &mut self.current.token {
            let value = std::mem::take(value);
            self.advance();
            return Ok(value);
        }
        Err(self.unexpected(record, expected))
    }

    fn parse_all(&mut self) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();

        loop {
            if self.at(&Token::Eof) {
                break;
            }

            if !self.current.token.is_declaration_keyword() {
                outcome.errors.push(self.unexpected(None, "'singleton' declaration"));
                self.skip_to_declaration();
                continue;
            }

            match self.parse_declaration() {
                Ok(Declaration::Material(record)) => outcome.records.push(record),
                Ok(Declaration::Ignored(ignored)) => outcome.ignored.push(ignored),
                Err(failure) => {
                    match failure.recovery {
                        Recovery::NextDeclaration => self.skip_to_declaration(),
                        Recovery::CloseBody => {
                            self.skip_body();
                        }
                        Recovery::None => {}
                    }
                    outcome.errors.push(failure.error);
                }
            }
        }

        outcome
    }

    fn parse_declaration(&mut self) -> Result<Declaration, Failure> {
        let start = self.current.location;
        self.advance();

        let class_name = self.expect_ident("class name", None).map_err(Failure::header)?;
        self.expect(&Token::LParen, "'(' after class name", None)
            .map_err(Failure::header)?;
        if self.at(&Token::RParen) {
            let reason = "missing material name".to_string();
            let error = self.error_at(self.current.location, None, ParseErrorKind::MalformedBlock { reason });
            return Err(Failure::header(error));
        }
        let name = self.expect_ident("material name", None).map_err(Failure::header)?;
        self.expect(&Token::RParen, "')' after material name", Some(&name))
            .map_err(Failure::header)?;
        self.expect(&Token::LBrace, "'{' to open the block", Some(&name))
            .map_err(Failure::header)?;

        if class_name != MATERIAL_CLASS {
            if !self.skip_body() {
                let error = self.error_at(start, Some(&name), ParseErrorKind::UnterminatedBlock);
                return Err(Failure::positioned(error));
            }
            return Ok(Declaration::Ignored(IgnoredDeclaration {
                class_name,
                name,
                location: start,
            }));
        }

        let properties = self.parse_body(&name, start)?;
        let origin = RecordOrigin {
            source_name: self.source_name.to_string(),
            location: start,
        };
        Ok(Declaration::Material(MaterialRecord::from_parts(name, properties, origin)))
    }

    /// Parse statements up to and including the closing `};`
    fn parse_body(&mut self, name: &str, start: SourceLocation) -> Result<Vec<(String, String)>, Failure> {
        let mut properties = Vec::new();
        let mut first_lines: HashMap<String, usize> = HashMap::new();
        let mut duplicate = None;

        loop {
            match &self.current.token {
                Token::RBrace => {
                    self.advance();
                    if self.at(&Token::Semicolon) {
                        self.advance();
                    }
                    break;
                }
                Token::Eof => {
                    let error = self.error_at(start, Some(name), ParseErrorKind::UnterminatedBlock);
                    return Err(Failure::positioned(error));
                }
                // `new` ends the block here too; skip_body only resyncs on `singleton`
                // so nested `new` objects inside ignored classes still brace-match
                token if token.is_declaration_keyword() => {
                    let error = self.error_at(start, Some(name), ParseErrorKind::UnterminatedBlock);
                    return Err(Failure::positioned(error));
                }
                Token::Ident(_) => {
                    let key_location = self.current.location;
                    let (key, value) = self.parse_statement(name).map_err(Failure::body)?;
                    match first_lines.get(&key).copied() {
                        Some(first_line) => {
                            // Keep parsing to the closing brace; report the first repeat only
                            if duplicate.is_none() {
                                let kind = ParseErrorKind::DuplicateKey { key, first_line };
                                duplicate = Some(self.error_at(key_location, Some(name), kind));
                            }
                        }
                        None => {
                            first_lines.insert(key.clone(), key_location.line);
                            properties.push((key, value));
                        }
                    }
                }
                _ => {
                    let error = self.unexpected(Some(name), "property key or '}'");
                    return Err(Failure::body(error));
                }
            }
        }

        match duplicate {
            Some(error) => Err(Failure::positioned(error)),
            None => Ok(properties),
        }
    }

    /// `key[index] = "value";`
    fn parse_statement(&mut self, name: &str) -> Result<(String, String), ParseError> {
        let mut key = self.expect_ident("property key", Some(name))?;

        if self.at(&Token::LBracket) {
            self.advance();
            let is_index = matches!(
                &self.current.token,
                Token::Ident(word) if word.bytes().all(|b| b.is_ascii_digit())
            );
            if !is_index {
                return Err(self.unexpected(Some(name), "layer index"));
            }
            let index = self.expect_ident("layer index", Some(name))?;
            self.expect(&Token::RBracket, "']' after layer index", Some(name))?;
            key = format!("{key}[{index}]");
        }

        self.expect(&Token::Equals, "'='", Some(name))?;
        let value = self.expect_string("quoted value", Some(name))?;
        self.expect(&Token::Semicolon, "';' after value", Some(name))?;

        Ok((key, value))
    }

    /// Skip past the closing brace of the current block
    ///
    /// Starts just inside an opened block. Returns false if input ended (or a new
    /// `singleton` started) before the block was closed.
    fn skip_body(&mut self) -> bool {
        let mut depth = 1usize;
        loop {
            match &self.current.token {
                Token::Eof => return false,
                _ if self.at_resync_keyword() => return false,
                Token::LBrace => depth += 1,
                Token::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        if self.at(&Token::Semicolon) {
                            self.advance();
                        }
                        return true;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn skip_to_declaration(&mut self) {
        while !self.at(&Token::Eof) && !self.current.token.is_declaration_keyword() {
            self.advance();
        }
    }
}
