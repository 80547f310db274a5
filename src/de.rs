//! JSON parsing driven by a descriptor.
//!
//! This module provides the [`Deserializer`], a recursive-descent parser that
//! walks the input and the descriptor tree in lock step and writes into a host
//! value through its [`Host`] capabilities.
//!
//! ## Overview
//!
//! - **Single cursor**: one forward pass, backtracking only inside a token
//! - **Typed dispatch**: one exhaustive `match` over the descriptor kind
//! - **Tolerant objects**: members no field declares are validated and skipped
//! - **Strict tuples**: element lists need exactly their declared arity
//! - **Bounded nesting**: composites deeper than [`ParseOptions::max_depth`] fail
//!
//! ## Usage
//!
//! Most users should use the functions in the crate root. The deserializer
//! itself is useful for parsing several values out of one buffer or for
//! checking the end position:
//!
//! ```rust
//! use json_descriptor::{Deserializer, Descriptor};
//!
//! let mut de = Deserializer::from_str("  [1, 2] tail");
//! let mut values: Vec<i32> = Vec::new();
//! let end = de.parse_value(&mut values, &Descriptor::array(Descriptor::number())).unwrap();
//!
//! assert_eq!(values, vec![1, 2]);
//! assert_eq!(end, 8);
//! assert!(de.end().is_err());
//! ```
//!
//! A failed parse leaves the target in an unspecified, partially written state.
//! [`parse`](crate::parse) wraps this with a clone so callers never see that.

use crate::descriptor::{Element, Field, Kind};
use crate::error::Location;
use crate::host::{Host, Piece};
use crate::options::ParseOptions;
use crate::{Descriptor, Error, Result};

/// Receives the decoded pieces of one string body.
type Sink<'s> = dyn FnMut(Piece) -> std::result::Result<(), &'static str> + 's;

/// The descriptor-driven JSON parser.
///
/// Created via [`Deserializer::from_str`] or [`Deserializer::with_options`].
pub struct Deserializer<'de> {
    input: &'de str,
    position: usize,
    options: ParseOptions,
    depth: usize,
}

impl<'de> Deserializer<'de> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'de str) -> Self {
        Self::with_options(input, ParseOptions::default())
    }

    #[must_use]
    pub fn with_options(input: &'de str, options: ParseOptions) -> Self {
        Deserializer {
            input,
            position: 0,
            options,
            depth: 0,
        }
    }

    /// Current byte offset into the input.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Parses one value of shape `desc` into `host`.
    ///
    /// Leading whitespace is skipped. Returns the byte offset just past the
    /// value; text after it is left for the caller (see [`Deserializer::end`]).
    ///
    /// # Errors
    ///
    /// Any syntax, lexical or semantic failure, with its advisory position.
    /// A failure can leave `host` partially written: composites already
    /// filled before the error keep their new contents. Use
    /// [`parse`](crate::parse) when the target must stay untouched on error.
    pub fn parse_value(&mut self, host: &mut dyn Host, desc: &Descriptor) -> Result<usize> {
        self.skip_whitespace();
        self.value(host, desc)?;
        Ok(self.position)
    }

    /// Checks that only whitespace remains.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TrailingCharacters`] at the first non-whitespace byte.
    pub fn end(&mut self) -> Result<()> {
        self.skip_whitespace();
        if self.at_end() {
            Ok(())
        } else {
            Err(Error::trailing(self.location()))
        }
    }

    fn value(&mut self, host: &mut dyn Host, desc: &Descriptor) -> Result<()> {
        match desc.kind() {
            Kind::Boolean => self.boolean(host),
            Kind::Number => self.number(host),
            Kind::String => self.string(host),
            Kind::Optional(inner) => self.optional(host, inner),
            Kind::Array(element) => self.nested(|de| de.array(host, element)),
            Kind::Object(value) => self.nested(|de| de.object(host, value)),
            Kind::FieldList(fields) => self.nested(|de| de.field_list(host, fields)),
            Kind::ElementList(elements) => self.nested(|de| de.element_list(host, elements)),
        }
    }

    /// Runs `parse` one nesting level deeper, enforcing the depth ceiling.
    fn nested(&mut self, parse: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(Error::depth_limit(self.location(), self.options.max_depth));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn location(&self) -> Location {
        Location::of(self.input, self.position)
    }

    fn location_at(&self, position: usize) -> Location {
        Location::of(self.input, position)
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.position).copied()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.input[self.position..].chars().next()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek_byte() {
            self.position += 1;
        }
    }

    fn eat_byte(&mut self, expected: u8) -> bool {
        if self.peek_byte() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn eat_literal(&mut self, literal: &str) -> bool {
        if self.input[self.position..].starts_with(literal) {
            self.position += literal.len();
            true
        } else {
            false
        }
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        match self.peek_byte() {
            Some(b) if b == expected => {
                self.position += 1;
                Ok(())
            }
            Some(_) => Err(Error::syntax(
                self.location(),
                &format!("expected '{}'", expected as char),
            )),
            None => Err(Error::unexpected_eof(
                self.location(),
                &format!("'{}'", expected as char),
            )),
        }
    }

    /// After a composite member: `true` at the closing bracket, `false` at a comma.
    fn separator(&mut self, close: u8) -> Result<bool> {
        self.skip_whitespace();
        match self.peek_byte() {
            Some(b',') => {
                self.position += 1;
                Ok(false)
            }
            Some(b) if b == close => {
                self.position += 1;
                Ok(true)
            }
            Some(_) => Err(Error::syntax(
                self.location(),
                &format!("expected ',' or '{}'", close as char),
            )),
            None => Err(Error::unexpected_eof(
                self.location(),
                &format!("',' or '{}'", close as char),
            )),
        }
    }

    fn bad_token(&self, expected: &str) -> Error {
        if self.at_end() {
            Error::unexpected_eof(self.location(), expected)
        } else {
            Error::lexical(self.location(), &format!("expected {}", expected))
        }
    }

    fn unsupported(&self, position: usize, desc: &str) -> Error {
        Error::semantic(
            self.location_at(position),
            &format!("target value cannot hold a {}", desc),
        )
    }

    fn boolean(&mut self, host: &mut dyn Host) -> Result<()> {
        let slot = host
            .boolean_mut()
            .ok_or_else(|| self.unsupported(self.position, "boolean"))?;
        *slot = self.scan_boolean()?;
        Ok(())
    }

    fn scan_boolean(&mut self) -> Result<bool> {
        if self.eat_literal("true") {
            Ok(true)
        } else if self.eat_literal("false") {
            Ok(false)
        } else {
            Err(self.bad_token("'true' or 'false'"))
        }
    }

    fn number(&mut self, host: &mut dyn Host) -> Result<()> {
        let start = self.position;
        let numeric = host
            .number_mut()
            .ok_or_else(|| self.unsupported(start, "number"))?;
        let token = self.scan_number()?;
        if numeric.read_decimal(token) {
            Ok(())
        } else {
            Err(Error::semantic(
                self.location_at(start),
                &format!("number {} does not fit the target type", token),
            ))
        }
    }

    /// Longest prefix matching `[+-]?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`.
    ///
    /// A fraction or exponent without digits is left unconsumed.
    fn scan_number(&mut self) -> Result<&'de str> {
        let input = self.input;
        let bytes = input.as_bytes();
        let start = self.position;
        let mut pos = start;

        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        match bytes.get(pos) {
            Some(b'0') => pos += 1,
            Some(b'1'..=b'9') => {
                while matches!(bytes.get(pos), Some(b'0'..=b'9')) {
                    pos += 1;
                }
            }
            _ => {
                self.position = pos;
                return Err(self.bad_token("a number"));
            }
        }

        if bytes.get(pos) == Some(&b'.') && matches!(bytes.get(pos + 1), Some(b'0'..=b'9')) {
            pos += 1;
            while matches!(bytes.get(pos), Some(b'0'..=b'9')) {
                pos += 1;
            }
        }

        if matches!(bytes.get(pos), Some(b'e' | b'E')) {
            let mut exp = pos + 1;
            if matches!(bytes.get(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            if matches!(bytes.get(exp), Some(b'0'..=b'9')) {
                while matches!(bytes.get(exp), Some(b'0'..=b'9')) {
                    exp += 1;
                }
                pos = exp;
            }
        }

        self.position = pos;
        Ok(&input[start..pos])
    }

    fn string(&mut self, host: &mut dyn Host) -> Result<()> {
        let start = self.position;
        let mut writer = host
            .text_writer(self.options.terminate_char_buffers)
            .ok_or_else(|| self.unsupported(start, "string"))?;
        self.scan_string(&mut |piece| writer.push(piece))?;
        writer
            .finish()
            .map_err(|msg| Error::semantic(self.location_at(start), msg))
    }

    /// Scans one quoted string, handing each decoded piece to `sink`.
    ///
    /// A sink rejection becomes a semantic error at the opening quote.
    fn scan_string(&mut self, sink: &mut Sink<'_>) -> Result<()> {
        let start = self.position;
        match self.peek_byte() {
            Some(b'"') => self.position += 1,
            Some(_) => return Err(Error::syntax(self.location(), "expected string")),
            None => return Err(Error::unexpected_eof(self.location(), "string")),
        }

        loop {
            let piece = match self.next_char() {
                Some('"') => return Ok(()),
                Some('\\') => self.escape()?,
                Some(ch) => Piece::Char(ch),
                None => return Err(Error::unexpected_eof(self.location(), "closing '\"'")),
            };
            sink(piece).map_err(|msg| Error::semantic(self.location_at(start), msg))?;
        }
    }

    /// Decodes the escape after a backslash.
    fn escape(&mut self) -> Result<Piece> {
        let at = self.position - 1;
        let ch = match self.next_char() {
            Some('"') => '"',
            Some('\\') => '\\',
            Some('/') => '/',
            Some('b') => '\u{0008}',
            Some('f') => '\u{000C}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('u') => return self.unicode_escape(at),
            Some(_) => {
                return Err(Error::lexical(
                    self.location_at(at),
                    "invalid escape sequence",
                ))
            }
            None => return Err(Error::unexpected_eof(self.location(), "escape sequence")),
        };
        Ok(Piece::Char(ch))
    }

    fn unicode_escape(&mut self, at: usize) -> Result<Piece> {
        let rest = &self.input.as_bytes()[self.position..];
        let digits = rest
            .iter()
            .take(4)
            .take_while(|b| b.is_ascii_hexdigit())
            .count();
        if digits < 4 {
            // Only running out of input is EOF; a quote or other byte is a bad escape.
            return Err(if digits == rest.len() {
                Error::unexpected_eof(self.location(), "4 hex digits")
            } else {
                Error::lexical(self.location_at(at), "\\u must be followed by 4 hex digits")
            });
        }
        let hex = &self.input[self.position..self.position + 4];
        let unit = u16::from_str_radix(hex, 16)
            .map_err(|_| Error::lexical(self.location_at(at), "invalid \\u escape"))?;
        self.position += 4;
        Ok(Piece::Unit(unit))
    }

    fn optional(&mut self, host: &mut dyn Host, inner: &Descriptor) -> Result<()> {
        let slot = host
            .optional_mut()
            .ok_or_else(|| self.unsupported(self.position, "optional value"))?;
        if self.eat_literal("null") {
            slot.set_null();
            return Ok(());
        }
        self.value(slot.get_or_insert_default(), inner)
    }

    fn array(&mut self, host: &mut dyn Host, element: &Descriptor) -> Result<()> {
        let start = self.position;
        let mut appender = host
            .appender()
            .ok_or_else(|| self.unsupported(start, "array"))?;
        self.expect_byte(b'[')?;
        self.skip_whitespace();
        if self.eat_byte(b']') {
            return Ok(());
        }
        loop {
            self.skip_whitespace();
            appender.append(&mut |item| self.value(item, element))?;
            if self.separator(b']')? {
                return Ok(());
            }
        }
    }

    fn object(&mut self, host: &mut dyn Host, value: &Descriptor) -> Result<()> {
        let start = self.position;
        let mut appender = host
            .keyed_appender()
            .ok_or_else(|| self.unsupported(start, "object"))?;
        self.expect_byte(b'{')?;
        self.skip_whitespace();
        if self.eat_byte(b'}') {
            return Ok(());
        }
        loop {
            let key = self.member_name()?;
            appender.insert(key, &mut |item| self.value(item, value))?;
            if self.separator(b'}')? {
                return Ok(());
            }
        }
    }

    /// Parses `ws "name" ws : ws`, leaving the cursor on the member value.
    fn member_name(&mut self) -> Result<String> {
        self.skip_whitespace();
        let mut name = String::new();
        self.scan_string(&mut |piece| {
            let ch = match piece {
                Piece::Char(ch) => ch,
                Piece::Unit(unit) => char::from_u32(u32::from(unit))
                    .ok_or("surrogate escape in member name")?,
            };
            name.push(ch);
            Ok(())
        })?;
        self.skip_whitespace();
        self.expect_byte(b':')?;
        self.skip_whitespace();
        Ok(name)
    }

    fn field_list(&mut self, host: &mut dyn Host, fields: &[Field]) -> Result<()> {
        self.expect_byte(b'{')?;
        self.skip_whitespace();
        if self.eat_byte(b'}') {
            return Ok(());
        }
        loop {
            let name_at = self.position;
            let name = self.member_name()?;
            match fields.iter().find(|field| field.name() == name) {
                Some(field) => {
                    let member = field.accessor().get_mut(host).ok_or_else(|| {
                        Error::semantic(
                            self.location_at(name_at),
                            &format!("accessor for {:?} does not fit the target value", name),
                        )
                    })?;
                    self.value(member, field.descriptor())?;
                }
                None => {
                    log::trace!("skipping unknown member {:?}", name);
                    self.skip_value()?;
                }
            }
            if self.separator(b'}')? {
                return Ok(());
            }
        }
    }

    fn element_list(&mut self, host: &mut dyn Host, elements: &[Element]) -> Result<()> {
        let start = self.position;
        self.expect_byte(b'[')?;
        self.skip_whitespace();
        let mut count = 0;
        if !self.eat_byte(b']') {
            loop {
                self.skip_whitespace();
                let at = self.position;
                let element = elements.get(count).ok_or_else(|| {
                    Error::semantic(
                        self.location_at(at),
                        &format!("expected {} elements, found more", elements.len()),
                    )
                })?;
                let member = element.accessor().get_mut(host).ok_or_else(|| {
                    Error::semantic(
                        self.location_at(at),
                        &format!("accessor for element {} does not fit the target value", count),
                    )
                })?;
                self.value(member, element.descriptor())?;
                count += 1;
                if self.separator(b']')? {
                    break;
                }
            }
        }
        if count == elements.len() {
            Ok(())
        } else {
            Err(Error::semantic(
                self.location_at(start),
                &format!("expected {} elements, found {}", elements.len(), count),
            ))
        }
    }

    /// Validates and discards one JSON value of any shape.
    fn skip_value(&mut self) -> Result<()> {
        match self.peek_byte() {
            Some(b'{') => self.nested(|de| de.skip_composite(b'}', true)),
            Some(b'[') => self.nested(|de| de.skip_composite(b']', false)),
            Some(b'"') => self.scan_string(&mut |_| Ok(())),
            Some(b't' | b'f') => self.scan_boolean().map(|_| ()),
            Some(b'n') => {
                if self.eat_literal("null") {
                    Ok(())
                } else {
                    Err(self.bad_token("'null'"))
                }
            }
            Some(_) => self.scan_number().map(|_| ()),
            None => Err(Error::unexpected_eof(self.location(), "a value")),
        }
    }

    fn skip_composite(&mut self, close: u8, keyed: bool) -> Result<()> {
        self.position += 1;
        self.skip_whitespace();
        if self.eat_byte(close) {
            return Ok(());
        }
        loop {
            if keyed {
                self.member_name()?;
            } else {
                self.skip_whitespace();
            }
            self.skip_value()?;
            if self.separator(close)? {
                return Ok(());
            }
        }
    }
}
