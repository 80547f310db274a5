//! JSON writing driven by a descriptor.
//!
//! This module provides the [`Serializer`], which walks a host value and its
//! descriptor together and appends JSON text to an internal buffer.
//!
//! ## Overview
//!
//! Output shape is controlled by [`FormatOptions`]:
//!
//! - **Dense**: no incidental whitespace at all (`{"x":3,"y":4}`)
//! - **Inline**: composites on one line, padded (`[ 1, 2 ]`, `{ "a": 1 }`)
//! - **Broken**: one element per line, one indent unit per nesting level
//!
//! Whether a composite is broken depends on its descriptor: field lists always
//! break under `newline_elements`, arrays and objects only when their element
//! descriptor is not trivial (or, for arrays, when `newline_trivial_arrays` is
//! set). Element lists and empty composites always stay inline.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use json_descriptor::{to_string, to_string_pretty, Descriptor};
//!
//! let desc = Descriptor::array(Descriptor::array(Descriptor::number()));
//! let grid = vec![vec![1, 2], vec![]];
//!
//! assert_eq!(to_string(&grid, &desc), "[[1,2],[]]");
//! assert_eq!(to_string_pretty(&grid, &desc), "[ [ 1, 2 ], [] ]");
//! ```
//!
//! ## Direct Serializer Usage
//!
//! Several values can be appended to one buffer:
//!
//! ```rust
//! use json_descriptor::{Descriptor, FormatOptions, Serializer};
//!
//! let mut serializer = Serializer::new(FormatOptions::dense());
//! serializer.serialize(&true, &Descriptor::boolean());
//! serializer.serialize(&"\tx".to_string(), &Descriptor::string());
//!
//! assert_eq!(serializer.into_inner(), r#"true"\tx""#);
//! ```
//!
//! Serialization cannot fail. A host value that lacks the capability its
//! descriptor needs is a programming error: debug builds panic, release builds
//! write `null` in its place.

use crate::descriptor::Kind;
use crate::host::{Host, Text};
use crate::{Descriptor, FormatOptions};

/// The descriptor-driven JSON writer.
///
/// Created via [`Serializer::new`] with the formatting options to apply.
pub struct Serializer {
    output: String,
    options: FormatOptions,
    indent_level: usize,
    indent_unit: String,
}

impl Serializer {
    #[must_use]
    pub fn new(options: FormatOptions) -> Self {
        Serializer {
            output: String::with_capacity(256),
            indent_unit: options.indent.unit(),
            options,
            indent_level: 0,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Appends `host` rendered as `desc`.
    pub fn serialize(&mut self, host: &dyn Host, desc: &Descriptor) {
        match desc.kind() {
            Kind::Boolean => match host.boolean() {
                Some(value) => self.output.push_str(if value { "true" } else { "false" }),
                None => self.mismatch(desc),
            },
            Kind::Number => match host.number() {
                Some(numeric) => numeric.write_decimal(&mut self.output),
                None => self.mismatch(desc),
            },
            Kind::String => match host.text() {
                Some(Text::Str(text)) => self.write_str(&text),
                Some(Text::Bytes(bytes)) => self.write_bytes(bytes),
                None => self.mismatch(desc),
            },
            Kind::Optional(inner) => match host.optional() {
                Some(Some(value)) => self.serialize(value, inner),
                Some(None) => self.output.push_str("null"),
                None => self.mismatch(desc),
            },
            Kind::Array(element) => match host.elements() {
                Some(items) => {
                    let break_lines = self.options.newline_elements
                        && (!element.is_trivial() || self.options.newline_trivial_arrays);
                    self.write_composite(('[', ']'), items, break_lines, |ser, item| {
                        ser.serialize(item, element);
                    });
                }
                None => self.mismatch(desc),
            },
            Kind::Object(value) => match host.entries() {
                Some(entries) => {
                    let break_lines = self.options.newline_elements && !value.is_trivial();
                    self.write_composite(('{', '}'), entries, break_lines, |ser, (key, item)| {
                        ser.write_member_name(key);
                        ser.serialize(item, value);
                    });
                }
                None => self.mismatch(desc),
            },
            Kind::FieldList(fields) => {
                let break_lines = self.options.newline_elements;
                self.write_composite(('{', '}'), fields, break_lines, |ser, field| {
                    ser.write_member_name(field.name());
                    match field.accessor().get(host) {
                        Some(member) => ser.serialize(member, field.descriptor()),
                        None => ser.mismatch(field.descriptor()),
                    }
                });
            }
            Kind::ElementList(elements) => {
                self.write_composite(('[', ']'), elements, false, |ser, element| {
                    match element.accessor().get(host) {
                        Some(member) => ser.serialize(member, element.descriptor()),
                        None => ser.mismatch(element.descriptor()),
                    }
                });
            }
        }
    }

    fn mismatch(&mut self, desc: &Descriptor) {
        if cfg!(debug_assertions) {
            panic!("host value cannot be written as a {}", desc.name());
        }
        self.output.push_str("null");
    }

    /// Writes brackets, separators and line breaks around `items`.
    fn write_composite<I, F>(
        &mut self,
        (open, close): (char, char),
        items: I,
        break_lines: bool,
        mut write_item: F,
    ) where
        I: IntoIterator,
        F: FnMut(&mut Self, I::Item),
    {
        let mut items = items.into_iter().peekable();
        self.output.push(open);
        if items.peek().is_none() {
            self.output.push(close);
            return;
        }

        if break_lines {
            self.indent_level += 1;
        }
        let mut first = true;
        for item in items {
            if !first {
                self.output.push(',');
            }
            if break_lines {
                self.write_newline();
            } else if !self.options.dense {
                self.output.push(' ');
            }
            write_item(self, item);
            first = false;
        }

        if break_lines {
            self.indent_level -= 1;
            self.write_newline();
        } else if !self.options.dense {
            self.output.push(' ');
        }
        self.output.push(close);
    }

    fn write_newline(&mut self) {
        self.output.push('\n');
        for _ in 0..self.indent_level {
            self.output.push_str(&self.indent_unit);
        }
    }

    fn write_member_name(&mut self, name: &str) {
        self.write_str(name);
        self.output.push(':');
        if !self.options.dense {
            self.output.push(' ');
        }
    }

    fn write_str(&mut self, text: &str) {
        self.output.push('"');
        for ch in text.chars() {
            match short_escape(ch) {
                Some(escaped) => self.output.push_str(escaped),
                None if ch.is_ascii_control() => self.write_unit(ch as u8),
                None => self.output.push(ch),
            }
        }
        self.output.push('"');
    }

    /// Byte strings are written byte by byte; only printable ASCII goes out raw.
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.output.push('"');
        for &byte in bytes {
            match short_escape(char::from(byte)) {
                Some(escaped) if byte.is_ascii() => self.output.push_str(escaped),
                _ if byte.is_ascii_graphic() || byte == b' ' => self.output.push(char::from(byte)),
                _ => self.write_unit(byte),
            }
        }
        self.output.push('"');
    }

    fn write_unit(&mut self, byte: u8) {
        self.output.push_str(&format!("\\u{:04x}", byte));
    }
}

fn short_escape(ch: char) -> Option<&'static str> {
    match ch {
        '"' => Some("\\\""),
        '\\' => Some("\\\\"),
        '/' => Some("\\/"),
        '\u{0008}' => Some("\\b"),
        '\u{000C}' => Some("\\f"),
        '\n' => Some("\\n"),
        '\r' => Some("\\r"),
        '\t' => Some("\\t"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Piece, TextWriter};
    use crate::{Accessor, CharBuf, Element, Field, Indent};
    use std::collections::BTreeMap;

    fn render(host: &dyn Host, desc: &Descriptor, options: FormatOptions) -> String {
        let mut serializer = Serializer::new(options);
        serializer.serialize(host, desc);
        serializer.into_inner()
    }

    fn dense(host: &dyn Host, desc: &Descriptor) -> String {
        render(host, desc, FormatOptions::dense())
    }

    fn pretty(host: &dyn Host, desc: &Descriptor) -> String {
        render(host, desc, FormatOptions::pretty())
    }

    #[derive(Default, Clone, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl Host for Point {}

    fn point() -> Descriptor {
        Descriptor::field_list(vec![
            Field::new(
                "x",
                Accessor::new(|p: &Point| &p.x, |p: &mut Point| &mut p.x),
                Descriptor::number(),
            ),
            Field::new(
                "y",
                Accessor::new(|p: &Point| &p.y, |p: &mut Point| &mut p.y),
                Descriptor::number(),
            ),
        ])
    }

    #[test]
    fn test_leaves() {
        assert_eq!(dense(&false, &Descriptor::boolean()), "false");
        assert_eq!(dense(&-4567, &Descriptor::number()), "-4567");
        assert_eq!(dense(&1.23f64, &Descriptor::number()), "1.23");
        assert_eq!(dense(&-100.5f32, &Descriptor::number()), "-100.5");
        assert_eq!(dense(&String::new(), &Descriptor::string()), "\"\"");
        assert_eq!(dense(&'q', &Descriptor::string()), "\"q\"");
    }

    #[test]
    fn test_string_escaping() {
        let text = "a\"b\\c/d\u{8}\u{c}\n\r\t\u{1}\u{7f}é".to_string();
        assert_eq!(
            dense(&text, &Descriptor::string()),
            r#""a\"b\\c\/d\b\f\n\r\t\u0001\u007fé""#
        );
    }

    #[test]
    fn test_byte_buffer_escaping() {
        let mut raw = CharBuf::<8>::from_text("ok");
        assert_eq!(dense(&raw, &Descriptor::string()), "\"ok\"");

        let mut writer = raw.text_writer(true).unwrap();
        for piece in [0x41u16, 0xe9, 0x22] {
            writer.push(Piece::Unit(piece)).unwrap();
        }
        writer.finish().unwrap();
        drop(writer);
        assert_eq!(dense(&raw, &Descriptor::string()), r#""A\u00e9\"""#);
    }

    #[test]
    fn test_empty_composites_ignore_formatting() {
        let numbers: Vec<i32> = Vec::new();
        let map: BTreeMap<String, i32> = BTreeMap::new();
        for options in [FormatOptions::dense(), FormatOptions::pretty()] {
            let options = options.with_newline_trivial_arrays(true);
            assert_eq!(render(&numbers, &Descriptor::array(Descriptor::number()), options.clone()), "[]");
            assert_eq!(render(&map, &Descriptor::object(Descriptor::number()), options), "{}");
        }
    }

    #[test]
    fn test_trivial_array_layouts() {
        let desc = Descriptor::array(Descriptor::number());
        let values = vec![4, 5, 6];
        assert_eq!(dense(&values, &desc), "[4,5,6]");
        assert_eq!(pretty(&values, &desc), "[ 4, 5, 6 ]");
        assert_eq!(
            render(&values, &desc, FormatOptions::pretty().with_newline_trivial_arrays(true)),
            "[\n\t4,\n\t5,\n\t6\n]"
        );
        assert_eq!(
            render(&values, &desc, FormatOptions::dense().with_newline_trivial_arrays(true)),
            "[4,5,6]"
        );
    }

    #[test]
    fn test_object_members() {
        let mut map = BTreeMap::new();
        map.insert("red".to_string(), 1);
        map.insert("green".to_string(), 8);
        map.insert("blue".to_string(), -914);
        let desc = Descriptor::object(Descriptor::number());
        assert_eq!(dense(&map, &desc), r#"{"blue":-914,"green":8,"red":1}"#);
        assert_eq!(pretty(&map, &desc), r#"{ "blue": -914, "green": 8, "red": 1 }"#);
    }

    #[test]
    fn test_field_list_layouts() {
        let p = Point { x: 3, y: 4 };
        assert_eq!(dense(&p, &point()), r#"{"x":3,"y":4}"#);
        assert_eq!(pretty(&p, &point()), "{\n\t\"x\": 3,\n\t\"y\": 4\n}");
        assert_eq!(
            render(&p, &point(), FormatOptions::pretty().with_newline_elements(false)),
            r#"{ "x": 3, "y": 4 }"#
        );
    }

    #[test]
    fn test_nested_indentation() {
        let desc = Descriptor::array(point());
        let points = vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }];
        let expected = "[\n  {\n    \"x\": 1,\n    \"y\": 2\n  },\n  {\n    \"x\": 3,\n    \"y\": 4\n  }\n]";
        let options = FormatOptions::pretty().with_indent(Indent::Spaces(2));
        assert_eq!(render(&points, &desc, options), expected);
    }

    #[test]
    fn test_element_list_stays_inline() {
        let desc = Descriptor::element_list(vec![
            Element::new(Accessor::new(|t: &(String, u8)| &t.0, |t: &mut (String, u8)| &mut t.0), Descriptor::string()),
            Element::new(Accessor::new(|t: &(String, u8)| &t.1, |t: &mut (String, u8)| &mut t.1), Descriptor::number()),
        ]);
        let value = ("Steve".to_string(), 25u8);
        assert_eq!(dense(&value, &desc), r#"["Steve",25]"#);
        assert_eq!(pretty(&value, &desc), r#"[ "Steve", 25 ]"#);
    }

    #[test]
    fn test_optional() {
        let desc = Descriptor::optional(Descriptor::number()).unwrap();
        assert_eq!(dense(&None::<i32>, &desc), "null");
        assert_eq!(dense(&Some(1), &desc), "1");
    }

    #[test]
    fn test_non_finite_float_writes_null() {
        assert_eq!(dense(&f64::INFINITY, &Descriptor::number()), "null");
    }

    #[test]
    #[should_panic(expected = "cannot be written as a number")]
    fn test_mismatch_panics_in_debug() {
        dense(&true, &Descriptor::number());
    }
}
