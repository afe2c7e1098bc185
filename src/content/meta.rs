//! `export const meta = { ... }` evaluation
//!
//! Template components carry their metadata as a JavaScript object literal
//! exported under the name `meta` from the component's header script. This
//! module lexes that script, scans its top-level statements for the export
//! and converts the literal into plain data without executing anything.
//!
//! Statements that cannot be understood are skipped, so unrelated syntax the
//! scanner does not model (type declarations, JSX, decorators) never prevents
//! the `meta` export from being found.

use serde_json::{Map, Number, Value};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while evaluating the `meta` object literal
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetaError {
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("unsupported {construct} at line {line}: only literal values are allowed in 'meta'")]
    Unsupported { line: usize, construct: String },
}

/// A problem the scanner stepped over while looking for the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

// ============================================================================
// Lexer
// ============================================================================

/// Token kinds of the restricted module grammar
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Number(Number),
    Str(String),
    /// Template literal; `cooked` is only meaningful without interpolation
    Template { cooked: String, interpolated: bool },
    Regex,
    Punct(&'static str),
    /// Lexically invalid input, kept so the parser can recover around it
    Invalid(String),
    Eof,
}

/// A token with the position information the parser needs
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
    /// A line terminator precedes this token
    pub newline_before: bool,
}

/// Longest punctuators first so that prefix matching picks the right one
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "**", "+=", "-=", "*=", "/=", "%=",
    "&=", "|=", "^=", "<<", ">>", "{", "}", "(", ")", "[", "]", ";", ",", ":", ".", "=", "+",
    "-", "*", "/", "%", "<", ">", "!", "?", "&", "|", "^", "~", "@", "#",
];

/// Keywords after which a `/` starts a regular expression
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

/// Character-based lexer, Unicode safe
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    /// Tokenize the whole input; never fails, invalid input becomes `Token::Invalid`
    pub fn tokenize(&mut self) -> Vec<Spanned> {
        let mut tokens: Vec<Spanned> = Vec::new();

        loop {
            let newline_before = self.skip_trivia();
            let line = self.line;

            if self.pos >= self.chars.len() {
                tokens.push(Spanned {
                    token: Token::Eof,
                    line,
                    newline_before,
                });
                return tokens;
            }

            let regex_allowed = regex_allowed_after(tokens.last().map(|t| &t.token));
            let token = self.read_token(regex_allowed);
            tokens.push(Spanned {
                token,
                line,
                newline_before,
            });
        }
    }

    fn current_char(&self) -> char {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.chars.get(self.pos + offset).copied().unwrap_or('\0')
    }

    fn starts_with(&self, s: &str) -> bool {
        let mut i = self.pos;
        for c in s.chars() {
            if self.chars.get(i) != Some(&c) {
                return false;
            }
            i += 1;
        }
        true
    }

    fn advance(&mut self) -> char {
        let c = self.current_char();
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        c
    }

    /// Skip whitespace and comments, reporting whether a newline was crossed
    fn skip_trivia(&mut self) -> bool {
        let mut newline = false;
        while self.pos < self.chars.len() {
            let c = self.current_char();
            if c == '\n' {
                newline = true;
                self.advance();
            } else if c.is_whitespace() {
                self.advance();
            } else if self.starts_with("//") {
                while self.pos < self.chars.len() && self.current_char() != '\n' {
                    self.advance();
                }
            } else if self.starts_with("/*") {
                self.pos += 2;
                while self.pos < self.chars.len() && !self.starts_with("*/") {
                    if self.advance() == '\n' {
                        newline = true;
                    }
                }
                self.pos = (self.pos + 2).min(self.chars.len());
            } else {
                break;
            }
        }
        newline
    }

    fn read_token(&mut self, regex_allowed: bool) -> Token {
        let c = self.current_char();

        if is_ident_start(c) {
            return self.read_ident();
        }
        if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_ascii_digit()) {
            return self.read_number();
        }
        match c {
            '"' | '\'' => return self.read_string(c),
            '`' => return self.read_template(),
            '/' if regex_allowed => return self.read_regex(),
            _ => {}
        }

        for punct in PUNCTUATORS {
            if self.starts_with(punct) {
                self.pos += punct.chars().count();
                return Token::Punct(punct);
            }
        }

        self.advance();
        Token::Invalid(format!("unexpected character '{}'", c))
    }

    fn read_ident(&mut self) -> Token {
        let mut ident = String::new();
        while is_ident_part(self.current_char()) {
            ident.push(self.advance());
        }
        Token::Ident(ident)
    }

    fn read_number(&mut self) -> Token {
        let mut raw = String::new();
        while self.current_char().is_ascii_alphanumeric()
            || self.current_char() == '_'
            || self.current_char() == '.'
            || ((self.current_char() == '+' || self.current_char() == '-')
                && matches!(raw.chars().last(), Some('e') | Some('E'))
                && !raw.starts_with("0x")
                && !raw.starts_with("0X"))
        {
            raw.push(self.advance());
        }

        match parse_numeric_literal(&raw) {
            Some(number) => Token::Number(number),
            None => Token::Invalid(format!("invalid numeric literal '{}'", raw)),
        }
    }

    fn read_escape(&mut self, out: &mut String) -> Result<(), String> {
        let c = self.advance();
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !self.current_char().is_ascii_digit() => out.push('\0'),
            // line continuation
            '\n' => {}
            '\r' => {
                if self.current_char() == '\n' {
                    self.advance();
                }
            }
            'x' => {
                let hex: String = (0..2).map(|_| self.advance()).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .map_err(|_| format!("invalid hexadecimal escape '\\x{}'", hex))?;
                out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            'u' => {
                let hex: String = if self.current_char() == '{' {
                    self.advance();
                    let mut digits = String::new();
                    while self.pos < self.chars.len() && self.current_char() != '}' {
                        digits.push(self.advance());
                    }
                    self.advance();
                    digits
                } else {
                    (0..4).map(|_| self.advance()).collect()
                };
                let code = u32::from_str_radix(&hex, 16)
                    .map_err(|_| format!("invalid unicode escape '\\u{}'", hex))?;
                out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            '\0' if self.pos > self.chars.len() => {
                return Err("unterminated escape sequence".to_string());
            }
            other => out.push(other),
        }
        Ok(())
    }

    fn read_string(&mut self, quote: char) -> Token {
        self.advance();
        let mut value = String::new();

        loop {
            if self.pos >= self.chars.len() || self.current_char() == '\n' {
                return Token::Invalid("unterminated string literal".to_string());
            }
            let c = self.advance();
            if c == quote {
                return Token::Str(value);
            }
            if c == '\\' {
                if let Err(message) = self.read_escape(&mut value) {
                    return Token::Invalid(message);
                }
            } else {
                value.push(c);
            }
        }
    }

    fn read_template(&mut self) -> Token {
        self.advance();
        let mut cooked = String::new();
        let mut interpolated = false;

        loop {
            if self.pos >= self.chars.len() {
                return Token::Invalid("unterminated template literal".to_string());
            }
            let c = self.advance();
            match c {
                '`' => {
                    return Token::Template {
                        cooked,
                        interpolated,
                    }
                }
                '\\' => {
                    if let Err(message) = self.read_escape(&mut cooked) {
                        return Token::Invalid(message);
                    }
                }
                '$' if self.current_char() == '{' => {
                    interpolated = true;
                    self.advance();
                    let mut depth = 1;
                    while depth > 0 {
                        if self.pos >= self.chars.len() {
                            return Token::Invalid("unterminated template literal".to_string());
                        }
                        match self.advance() {
                            '{' => depth += 1,
                            '}' => depth -= 1,
                            _ => {}
                        }
                    }
                }
                other => cooked.push(other),
            }
        }
    }

    fn read_regex(&mut self) -> Token {
        self.advance();
        let mut in_class = false;

        loop {
            if self.pos >= self.chars.len() || self.current_char() == '\n' {
                return Token::Invalid("unterminated regular expression".to_string());
            }
            match self.advance() {
                '\\' => {
                    self.advance();
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                _ => {}
            }
        }

        while is_ident_part(self.current_char()) {
            self.advance();
        }
        Token::Regex
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_ident_part(c: char) -> bool {
    is_ident_start(c) || c.is_alphanumeric() || c == '\u{200c}' || c == '\u{200d}'
}

fn regex_allowed_after(previous: Option<&Token>) -> bool {
    match previous {
        None => true,
        Some(Token::Punct(p)) => !matches!(*p, ")" | "]" | "}"),
        Some(Token::Ident(word)) => REGEX_PREFIX_KEYWORDS.contains(&word.as_str()),
        Some(Token::Invalid(_)) => true,
        _ => false,
    }
}

/// Convert a JavaScript numeric literal to a JSON number.
///
/// Integral values become JSON integers regardless of how they were written
/// (`2.0`, `2e0` and `2` are the same value in JavaScript).
fn parse_numeric_literal(raw: &str) -> Option<Number> {
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();

    let radix = match lower.get(..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&lower[2..], radix).ok().map(Number::from);
    }

    if lower.ends_with('n') {
        // BigInt
        return None;
    }

    let value: f64 = lower.parse().ok()?;
    float_to_number(value)
}

fn float_to_number(value: f64) -> Option<Number> {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        if value >= 0.0 {
            Some(Number::from(value as u64))
        } else {
            Some(Number::from(value as i64))
        }
    } else {
        Number::from_f64(value)
    }
}

fn negate(number: &Number) -> Option<Number> {
    if let Some(int) = number.as_i64() {
        return Some(Number::from(int.checked_neg()?));
    }
    float_to_number(-number.as_f64()?)
}

// ============================================================================
// Parser
// ============================================================================

/// Outcome of scanning a module for its `meta` export
#[derive(Debug, Clone, Default)]
pub struct ScannedModule {
    /// Evaluated `meta` literal, `None` when the module has no such export
    pub meta: Option<Value>,
    /// Problems stepped over while scanning
    pub diagnostics: Vec<Diagnostic>,
}

/// Statement scanner and literal evaluator
pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

type ParseResult<T> = Result<T, MetaError>;

impl Parser {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Self {
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Scan all top-level statements. The last `meta` export wins.
    pub fn parse(mut self) -> ParseResult<ScannedModule> {
        let mut meta = None;

        while !self.at_eof() {
            if self.peek_ident("export") {
                if let Some(value) = self.parse_export()? {
                    meta = Some(value);
                }
            } else {
                self.skip_statement();
            }
        }

        Ok(ScannedModule {
            meta,
            diagnostics: self.diagnostics,
        })
    }

    fn current(&self) -> &Spanned {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn peek(&self) -> &Token {
        &self.current().token
    }

    fn line(&self) -> usize {
        self.current().line
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn bump(&mut self) -> Spanned {
        let token = self.current().clone();
        if !self.at_eof() {
            self.pos += 1;
        }
        token
    }

    fn peek_ident(&self, word: &str) -> bool {
        matches!(self.peek(), Token::Ident(w) if w == word)
    }

    fn peek_punct(&self, punct: &str) -> bool {
        matches!(self.peek(), Token::Punct(p) if *p == punct)
    }

    fn eat_punct(&mut self, punct: &str) -> bool {
        if self.peek_punct(punct) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn syntax_error<T>(&self, message: impl Into<String>) -> ParseResult<T> {
        Err(MetaError::Syntax {
            line: self.line(),
            message: message.into(),
        })
    }

    fn unsupported<T>(&self, construct: impl Into<String>) -> ParseResult<T> {
        Err(MetaError::Unsupported {
            line: self.line(),
            construct: construct.into(),
        })
    }

    /// Skip to the end of the current statement: a `;` or a line break at
    /// bracket depth zero
    fn skip_statement(&mut self) {
        let mut depth: usize = 0;
        let mut first = true;

        while !self.at_eof() {
            let current = self.current();
            if !first && depth == 0 && current.newline_before {
                return;
            }
            first = false;

            let spanned = self.bump();
            match spanned.token {
                Token::Punct("{") | Token::Punct("(") | Token::Punct("[") => depth += 1,
                Token::Punct("}") | Token::Punct(")") | Token::Punct("]") => {
                    depth = depth.saturating_sub(1);
                }
                Token::Punct(";") if depth == 0 => return,
                Token::Invalid(message) => {
                    tracing::debug!("Skipping invalid input at line {}: {}", spanned.line, message);
                    self.diagnostics.push(Diagnostic {
                        line: spanned.line,
                        message,
                    });
                }
                _ => {}
            }
        }
    }

    /// `export (const|let|var) <name> [: Type] = <init>`
    ///
    /// Only the first declarator is inspected.
    fn parse_export(&mut self) -> ParseResult<Option<Value>> {
        self.bump(); // export

        let is_declaration = ["const", "let", "var"].iter().any(|kw| self.peek_ident(kw));
        if !is_declaration {
            self.skip_statement();
            return Ok(None);
        }
        self.bump();

        let is_meta = self.peek_ident("meta");
        if !is_meta {
            self.skip_statement();
            return Ok(None);
        }
        self.bump();

        if self.eat_punct(":") {
            self.skip_type_annotation();
        }

        if !self.eat_punct("=") || !self.peek_punct("{") {
            self.skip_statement();
            return Ok(None);
        }

        let value = self.parse_object()?;
        // `as const`, `satisfies Meta`, further declarators
        if !self.at_eof() && !self.current().newline_before {
            self.skip_statement();
        } else {
            self.eat_punct(";");
        }
        Ok(Some(value))
    }

    fn skip_type_annotation(&mut self) {
        let mut depth: usize = 0;
        while !self.at_eof() {
            match self.peek() {
                Token::Punct("=") | Token::Punct(";") if depth == 0 => return,
                Token::Punct("{") | Token::Punct("(") | Token::Punct("[") | Token::Punct("<") => {
                    depth += 1
                }
                Token::Punct("}") | Token::Punct(")") | Token::Punct("]") | Token::Punct(">") => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.bump();
        }
    }

    /// Evaluate a literal expression. `Ok(None)` stands for `undefined`.
    fn parse_value(&mut self) -> ParseResult<Option<Value>> {
        let value = self.parse_primary()?;

        match self.peek() {
            Token::Punct(",") | Token::Punct("}") | Token::Punct("]") | Token::Punct(")") => {
                Ok(value)
            }
            Token::Punct("(") => self.unsupported("function call"),
            Token::Punct(".") | Token::Punct("?.") | Token::Punct("[") => {
                self.unsupported("member access")
            }
            Token::Punct(op) => self.unsupported(format!("operator '{}'", op)),
            Token::Ident(word) if word == "as" || word == "satisfies" => {
                self.unsupported(format!("type assertion '{}'", word))
            }
            Token::Eof => self.syntax_error("unexpected end of input"),
            other => self.syntax_error(format!("unexpected {}", describe(other))),
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Option<Value>> {
        let spanned = self.current().clone();
        match spanned.token {
            Token::Punct("{") => self.parse_object().map(Some),
            Token::Punct("[") => self.parse_array().map(Some),
            Token::Punct("(") => {
                self.bump();
                let value = self.parse_value()?;
                if !self.eat_punct(")") {
                    return self.syntax_error("expected ')'");
                }
                Ok(value)
            }
            Token::Punct(sign @ ("-" | "+")) => {
                self.bump();
                match self.bump().token {
                    Token::Number(n) if sign == "-" => match negate(&n) {
                        Some(negated) => Ok(Some(Value::Number(negated))),
                        None => self.syntax_error("numeric literal out of range"),
                    },
                    Token::Number(n) => Ok(Some(Value::Number(n))),
                    _ => self.unsupported(format!("unary '{}' expression", sign)),
                }
            }
            Token::Punct("...") => self.unsupported("spread element"),
            Token::Punct(op) => self.syntax_error(format!("unexpected '{}'", op)),
            Token::Str(s) => {
                self.bump();
                Ok(Some(Value::String(s)))
            }
            Token::Template {
                cooked,
                interpolated,
            } => {
                if interpolated {
                    return self.unsupported("template interpolation");
                }
                self.bump();
                Ok(Some(Value::String(cooked)))
            }
            Token::Number(n) => {
                self.bump();
                Ok(Some(Value::Number(n)))
            }
            Token::Ident(word) => {
                self.bump();
                match word.as_str() {
                    "true" => Ok(Some(Value::Bool(true))),
                    "false" => Ok(Some(Value::Bool(false))),
                    "null" => Ok(Some(Value::Null)),
                    "undefined" => Ok(None),
                    "function" | "async" | "class" | "new" => {
                        self.unsupported(format!("'{}' expression", word))
                    }
                    other => self.unsupported(format!("identifier reference '{}'", other)),
                }
            }
            Token::Regex => self.unsupported("regular expression"),
            Token::Invalid(message) => self.syntax_error(message),
            Token::Eof => self.syntax_error("unexpected end of input"),
        }
    }

    fn parse_object(&mut self) -> ParseResult<Value> {
        self.bump(); // {
        let mut map = Map::new();

        loop {
            if self.eat_punct("}") {
                return Ok(Value::Object(map));
            }

            let key = self.parse_property_key()?;

            if self.peek_punct("(") {
                return self.unsupported(format!("method '{}'", key));
            }
            if self.peek_punct(",") || self.peek_punct("}") {
                return self.unsupported(format!("shorthand property '{}'", key));
            }
            if matches!(self.peek(), Token::Ident(_)) && matches!(key.as_str(), "get" | "set" | "async") {
                return self.unsupported(format!("'{}' accessor", key));
            }
            if !self.eat_punct(":") {
                return self.syntax_error(format!("expected ':' after property '{}'", key));
            }

            match self.parse_value()? {
                Some(value) => {
                    map.insert(key, value);
                }
                None => {
                    map.remove(&key);
                }
            }

            if !self.eat_punct(",") && !self.peek_punct("}") {
                return self.syntax_error("expected ',' or '}' in object literal");
            }
        }
    }

    fn parse_property_key(&mut self) -> ParseResult<String> {
        match self.peek().clone() {
            Token::Ident(name) | Token::Str(name) => {
                self.bump();
                Ok(name)
            }
            Token::Number(n) => {
                self.bump();
                Ok(n.to_string())
            }
            Token::Punct("[") => self.unsupported("computed property key"),
            Token::Punct("...") => self.unsupported("spread element"),
            Token::Punct("*") => self.unsupported("generator method"),
            Token::Eof => self.syntax_error("unexpected end of input in object literal"),
            other => self.syntax_error(format!("unexpected {} in object literal", describe(&other))),
        }
    }

    fn parse_array(&mut self) -> ParseResult<Value> {
        self.bump(); // [
        let mut items = Vec::new();

        loop {
            if self.eat_punct("]") {
                return Ok(Value::Array(items));
            }
            if self.eat_punct(",") {
                // hole
                items.push(Value::Null);
                continue;
            }

            items.push(self.parse_value()?.unwrap_or(Value::Null));

            if !self.eat_punct(",") && !self.peek_punct("]") {
                return self.syntax_error("expected ',' or ']' in array literal");
            }
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Ident(word) => format!("identifier '{}'", word),
        Token::Number(n) => format!("number {}", n),
        Token::Str(_) => "string".to_string(),
        Token::Template { .. } => "template literal".to_string(),
        Token::Regex => "regular expression".to_string(),
        Token::Punct(p) => format!("'{}'", p),
        Token::Invalid(message) => message.clone(),
        Token::Eof => "end of input".to_string(),
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Scan a module and report its `meta` export along with skipped problems
pub fn scan_module(source: &str) -> Result<ScannedModule, MetaError> {
    let tokens = Lexer::new(source).tokenize();
    let scanned = Parser::new(tokens).parse()?;
    for diagnostic in &scanned.diagnostics {
        tracing::debug!(
            "Recovered from error at line {}: {}",
            diagnostic.line,
            diagnostic.message
        );
    }
    Ok(scanned)
}

/// Evaluate the `meta` export of a module.
///
/// Returns `Ok(None)` when the module does not export an object literal
/// named `meta`.
pub fn parse_meta_export(source: &str) -> Result<Option<Value>, MetaError> {
    scan_module(source).map(|scanned| scanned.meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_export_meta_statement() {
        let source = r#"
			export const meta = {
				a: 1,
				b: "2",
			};
			"#;

        let meta = parse_meta_export(source).unwrap().unwrap();
        assert_eq!(meta, json!({"a": 1, "b": "2"}));
        let keys: Vec<&String> = meta.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_no_meta_export() {
        assert_eq!(parse_meta_export("const meta = { a: 1 };").unwrap(), None);
        assert_eq!(parse_meta_export("export const other = { a: 1 };").unwrap(), None);
        assert_eq!(parse_meta_export("").unwrap(), None);
    }

    #[test]
    fn test_non_object_meta_is_ignored() {
        assert_eq!(parse_meta_export("export const meta = 42;").unwrap(), None);
        assert_eq!(parse_meta_export("export const meta = getMeta();").unwrap(), None);
    }

    #[test]
    fn test_nested_literals() {
        let source = r#"
import Layout from "../layouts/Layout.astro";
import { thing } from './thing';

export const meta = {
    title: 'Hello \'world\'',
    'quoted-key': `template`,
    count: -3,
    ratio: .5,
    big: 1_000,
    hex: 0xff,
    flags: [true, false, null, undefined],
    nested: { list: [1, [2, 3]], empty: {} },
    skipped: undefined,
    1: "numeric key",
};

const local = thing(meta);
"#;

        let meta = parse_meta_export(source).unwrap().unwrap();
        assert_eq!(
            meta,
            json!({
                "title": "Hello 'world'",
                "quoted-key": "template",
                "count": -3,
                "ratio": 0.5,
                "big": 1000,
                "hex": 255,
                "flags": [true, false, null, null],
                "nested": {"list": [1, [2, 3]], "empty": {}},
                "1": "numeric key"
            })
        );
    }

    #[test]
    fn test_recovers_from_unrelated_syntax_errors() {
        let source = r#"
interface Props { title: string }
const broken = ] ) ;
type Odd = @ # ;
const path = /\/blog\/[a-z]+/g;
export const meta = { title: "Still found" } as const;
"#;

        let scanned = scan_module(source).unwrap();
        assert_eq!(scanned.meta, Some(json!({"title": "Still found"})));
    }

    #[test]
    fn test_invalid_characters_are_recorded() {
        let scanned = scan_module("const x = \"unterminated\nexport const meta = {a: 1}").unwrap();
        assert_eq!(scanned.meta, Some(json!({"a": 1})));
        assert_eq!(scanned.diagnostics.len(), 1);
        assert_eq!(scanned.diagnostics[0].line, 1);
    }

    #[test]
    fn test_typed_export() {
        let source = "export const meta: Record<string, unknown> = { a: [1] };";
        assert_eq!(parse_meta_export(source).unwrap(), Some(json!({"a": [1]})));
    }

    #[test]
    fn test_last_meta_export_wins() {
        let source = "export const meta = { a: 1 };\nexport let meta = { a: 2 };";
        assert_eq!(parse_meta_export(source).unwrap(), Some(json!({"a": 2})));
    }

    #[test]
    fn test_unsupported_constructs() {
        let cases = [
            ("export const meta = { a: b };", "identifier reference 'b'"),
            ("export const meta = { a: f() };", "identifier reference 'f'"),
            ("export const meta = { a: `x${y}` };", "template interpolation"),
            ("export const meta = { a };", "shorthand property 'a'"),
            ("export const meta = { ...base };", "spread element"),
            ("export const meta = { [k]: 1 };", "computed property key"),
            ("export const meta = { a: 1 + 2 };", "operator '+'"),
            ("export const meta = { a() { return 1 } };", "method 'a'"),
            ("export const meta = { a: /x/ };", "regular expression"),
        ];

        for (source, construct) in cases {
            match parse_meta_export(source) {
                Err(MetaError::Unsupported { construct: c, .. }) => {
                    assert_eq!(c, construct, "for {}", source)
                }
                other => panic!("expected unsupported error for {}, got {:?}", source, other),
            }
        }
    }

    #[test]
    fn test_syntax_error_inside_meta() {
        let source = "export const meta = {\n  a: 1\n  b: 2\n};";
        match parse_meta_export(source) {
            Err(MetaError::Syntax { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_string_escapes() {
        let source = r#"export const meta = { s: "tab\tnew\nunié\u{1F984}" };"#;
        assert_eq!(
            parse_meta_export(source).unwrap(),
            Some(json!({"s": "tab\tnew\nuni\u{e9}\u{1F984}"}))
        );
    }
}
