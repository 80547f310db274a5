//! # json_descriptor
//!
//! A schema-driven JSON codec: declare once how a Rust value maps to JSON, then
//! use that single [`Descriptor`] both to write the value and to read it back.
//!
//! ## How it works
//!
//! A descriptor is a small immutable tree (booleans, numbers, strings, arrays,
//! objects, optionals, plus field lists and element lists bound to struct
//! members). The parser and the serializer both walk that tree; neither looks
//! at the Rust type directly. Host types take part by implementing [`Host`],
//! which exposes only the capabilities they support (a number, a text buffer,
//! an appendable sequence, a keyed map, ...).
//!
//! ## Key Features
//!
//! - **One schema, both directions**: writing and parsing agree byte for byte
//!   on escaping, number grammar and framing
//! - **Tolerant records**: unknown object members are validated and skipped
//! - **Strict tuples**: element lists require their exact declared arity
//! - **Bounded buffers**: fixed arrays and [`CharBuf`] keep what fits and drop
//!   the rest
//! - **Atomic parsing**: [`parse`] only touches the caller's value on success
//! - **No panics on input**: every parse failure is a returned [`Error`] with
//!   line and column
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! json_descriptor = "0.1"
//! ```
//!
//! ### Records
//!
//! ```rust
//! use json_descriptor::{field, from_str, to_string, to_string_pretty, Descriptor, Host};
//!
//! #[derive(Default, Clone, Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//! impl Host for Point {}
//!
//! let desc = Descriptor::field_list(vec![
//!     field!(Point, x, Descriptor::number()),
//!     field!(Point, y, Descriptor::number()),
//! ]);
//!
//! let p = Point { x: 3, y: 4 };
//! assert_eq!(to_string(&p, &desc), r#"{"x":3,"y":4}"#);
//! assert_eq!(to_string_pretty(&p, &desc), "{\n\t\"x\": 3,\n\t\"y\": 4\n}");
//!
//! let back: Point = from_str(r#"{ "x": 3, "y": 4, "z": 99 }"#, &desc).unwrap();
//! assert_eq!(back, p);
//! ```
//!
//! ### Tuples
//!
//! ```rust
//! use json_descriptor::{element, from_str, to_string, Descriptor, Host};
//!
//! #[derive(Default, Clone, Debug, PartialEq)]
//! struct Person { name: String, age: u32, active: bool }
//! impl Host for Person {}
//!
//! let desc = Descriptor::element_list(vec![
//!     element!(Person, name, Descriptor::string()),
//!     element!(Person, age, Descriptor::number()),
//!     element!(Person, active, Descriptor::boolean()),
//! ]);
//!
//! let steve = Person { name: "Steve".into(), age: 25, active: true };
//! assert_eq!(to_string(&steve, &desc), r#"["Steve",25,true]"#);
//! assert!(from_str::<Person>(r#"["Steve",25]"#, &desc).is_err());
//! ```
//!
//! ## Performance Characteristics
//!
//! - **Serialization**: O(n) in the size of the output
//! - **Parsing**: single pass over the input, no intermediate tree
//! - **Memory**: the only allocations are the host values themselves
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Parse recursion is bounded by [`ParseOptions::max_depth`]
//! - Descriptors are `Send + Sync` and never mutated after construction
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade: skipped
//! members at `trace`, dropped elements, overwritten keys and failed parses at
//! `debug`. Install any logger to see them.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Describing a struct and round-tripping it
//! - **`bindings.rs`** - Maps, tuples, optionals, bounded buffers and a custom adapter
//! - **`custom_options.rs`** - Formatting presets and parse options
//!
//! Run any example with: `cargo run --example <name>`

pub mod de;
pub mod descriptor;
pub mod error;
pub mod host;
pub mod macros;
pub mod map;
pub mod options;
pub mod ser;
pub mod seq;

pub use de::Deserializer;
pub use descriptor::{Accessor, Descriptor, Element, Field, Kind};
pub use error::{Error, Result};
pub use host::{Appender, CharBuf, Host, KeyedAppender, Nullable, Numeric, Text, TextWriter};
pub use options::{FormatOptions, Indent, ParseOptions};
pub use ser::Serializer;

use std::io;

/// Writes `value` as dense JSON.
///
/// # Examples
///
/// ```rust
/// use json_descriptor::{to_string, Descriptor};
///
/// let text = to_string(&vec!["yes".to_string(), "no".to_string()], &Descriptor::array(Descriptor::string()));
/// assert_eq!(text, r#"["yes","no"]"#);
/// ```
#[must_use]
pub fn to_string<T: Host>(value: &T, descriptor: &Descriptor) -> String {
    to_string_with_options(value, descriptor, FormatOptions::dense())
}

/// Writes `value` with the pretty preset: spaced separators, one member per
/// line for non-trivial composites, tab indentation.
///
/// # Examples
///
/// ```rust
/// use json_descriptor::{to_string_pretty, Descriptor};
/// use std::collections::BTreeMap;
///
/// let mut map = BTreeMap::new();
/// map.insert("a".to_string(), vec![1, 2]);
/// let desc = Descriptor::object(Descriptor::array(Descriptor::number()));
/// assert_eq!(to_string_pretty(&map, &desc), r#"{ "a": [ 1, 2 ] }"#);
/// ```
#[must_use]
pub fn to_string_pretty<T: Host>(value: &T, descriptor: &Descriptor) -> String {
    to_string_with_options(value, descriptor, FormatOptions::pretty())
}

/// Writes `value` with custom formatting options.
#[must_use]
pub fn to_string_with_options<T: Host>(
    value: &T,
    descriptor: &Descriptor,
    options: FormatOptions,
) -> String {
    let mut serializer = Serializer::new(options);
    serializer.serialize(value, descriptor);
    serializer.into_inner()
}

/// Writes `value` as dense JSON to an I/O stream.
///
/// # Examples
///
/// ```rust
/// use json_descriptor::{to_writer, Descriptor};
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &Some(7), &Descriptor::optional(Descriptor::number()).unwrap()).unwrap();
/// assert_eq!(buffer, b"7");
/// ```
///
/// # Errors
///
/// Returns an error if writing to the writer fails.
pub fn to_writer<W, T>(writer: W, value: &T, descriptor: &Descriptor) -> Result<()>
where
    W: io::Write,
    T: Host,
{
    to_writer_with_options(writer, value, descriptor, FormatOptions::dense())
}

/// Writes `value` to an I/O stream with custom formatting options.
///
/// # Errors
///
/// Returns an error if writing to the writer fails.
pub fn to_writer_with_options<W, T>(
    mut writer: W,
    value: &T,
    descriptor: &Descriptor,
    options: FormatOptions,
) -> Result<()>
where
    W: io::Write,
    T: Host,
{
    let text = to_string_with_options(value, descriptor, options);
    writer.write_all(text.as_bytes())?;
    Ok(())
}

/// Parses one value from the start of `input` into `value`.
///
/// Leading whitespace is skipped. On success returns the byte offset just past
/// the parsed value; anything after it is not inspected. On failure `value` is
/// left exactly as it was.
///
/// # Examples
///
/// ```rust
/// use json_descriptor::{parse, Descriptor};
///
/// let desc = Descriptor::array(Descriptor::number());
/// let mut values = vec![1, 2];
///
/// assert_eq!(parse("[4, 5, 6] rest", &mut values, &desc).unwrap(), 9);
/// assert_eq!(values, vec![4, 5, 6]);
///
/// assert!(parse("[7, x]", &mut values, &desc).is_err());
/// assert_eq!(values, vec![4, 5, 6]);
/// ```
///
/// # Errors
///
/// Returns the first syntax, lexical or semantic error found.
pub fn parse<T: Host + Clone>(input: &str, value: &mut T, descriptor: &Descriptor) -> Result<usize> {
    parse_with_options(input, value, descriptor, ParseOptions::default())
}

/// [`parse`] with custom parse options.
///
/// # Errors
///
/// Returns the first syntax, lexical or semantic error found.
pub fn parse_with_options<T: Host + Clone>(
    input: &str,
    value: &mut T,
    descriptor: &Descriptor,
    options: ParseOptions,
) -> Result<usize> {
    let mut scratch = value.clone();
    let mut deserializer = Deserializer::with_options(input, options);
    match deserializer.parse_value(&mut scratch, descriptor) {
        Ok(end) => {
            *value = scratch;
            Ok(end)
        }
        Err(err) => {
            log::debug!("parse failed at byte {:?}: {}", err.position(), err);
            Err(err)
        }
    }
}

/// Parses a complete JSON document into a fresh `T`.
///
/// Unlike [`parse`], text after the value (other than whitespace) is an error.
///
/// # Examples
///
/// ```rust
/// use json_descriptor::{from_str, Descriptor, Error};
///
/// let text: String = from_str(r#""A""#, &Descriptor::string()).unwrap();
/// assert_eq!(text, "A");
///
/// let err = from_str::<i32>("1 2", &Descriptor::number()).unwrap_err();
/// assert!(matches!(err, Error::TrailingCharacters { position: 2, .. }));
/// ```
///
/// # Errors
///
/// Returns an error if the input is not a single value of the described shape.
/// Error messages include line and column information.
pub fn from_str<T: Host + Default>(input: &str, descriptor: &Descriptor) -> Result<T> {
    from_str_with_options(input, descriptor, ParseOptions::default())
}

/// [`from_str`] with custom parse options.
///
/// # Errors
///
/// Returns an error if the input is not a single value of the described shape.
pub fn from_str_with_options<T: Host + Default>(
    input: &str,
    descriptor: &Descriptor,
    options: ParseOptions,
) -> Result<T> {
    let mut value = T::default();
    let mut deserializer = Deserializer::with_options(input, options);
    let parsed = deserializer
        .parse_value(&mut value, descriptor)
        .and_then(|_| deserializer.end());
    match parsed {
        Ok(()) => Ok(value),
        Err(err) => {
            log::debug!("parse failed at byte {:?}: {}", err.position(), err);
            Err(err)
        }
    }
}

/// Parses a complete JSON document from an I/O stream.
///
/// # Examples
///
/// ```rust
/// use json_descriptor::{from_reader, Descriptor};
/// use std::io::Cursor;
///
/// let flags: Vec<bool> = from_reader(Cursor::new(b"[true, false]"), &Descriptor::array(Descriptor::boolean())).unwrap();
/// assert_eq!(flags, vec![true, false]);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is not UTF-8, or it does not
/// hold a single value of the described shape.
pub fn from_reader<R, T>(mut reader: R, descriptor: &Descriptor) -> Result<T>
where
    R: io::Read,
    T: Host + Default,
{
    let mut string = String::new();
    reader.read_to_string(&mut string)?;
    from_str(&string, descriptor)
}

/// Parses a complete JSON document from UTF-8 bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8 or do not hold a single
/// value of the described shape.
pub fn from_slice<T: Host + Default>(bytes: &[u8], descriptor: &Descriptor) -> Result<T> {
    let s = std::str::from_utf8(bytes).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s, descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Default, Clone, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
        manager: Option<u32>,
    }

    impl Host for User {}

    fn user_descriptor() -> Descriptor {
        Descriptor::field_list(vec![
            crate::field!(User, id, Descriptor::number()),
            crate::field!(User, name, Descriptor::string()),
            crate::field!(User, active, Descriptor::boolean()),
            crate::field!(User, tags, Descriptor::array(Descriptor::string())),
            crate::field!(
                User,
                manager,
                Descriptor::optional(Descriptor::number()).unwrap()
            ),
        ])
    }

    fn alice() -> User {
        User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "user".to_string()],
            manager: None,
        }
    }

    #[test]
    fn test_serialize_parse_user() {
        let desc = user_descriptor();
        let text = to_string(&alice(), &desc);
        assert_eq!(
            text,
            r#"{"id":123,"name":"Alice","active":true,"tags":["admin","user"],"manager":null}"#
        );
        let back: User = from_str(&text, &desc).unwrap();
        assert_eq!(back, alice());
    }

    #[test]
    fn test_pretty_printing() {
        let desc = user_descriptor();
        let text = to_string_pretty(&alice(), &desc);
        let expected = "{\n\t\"id\": 123,\n\t\"name\": \"Alice\",\n\t\"active\": true,\n\t\"tags\": [ \"admin\", \"user\" ],\n\t\"manager\": null\n}";
        assert_eq!(text, expected);
        let back: User = from_str(&text, &desc).unwrap();
        assert_eq!(back, alice());
    }

    #[test]
    fn test_parse_is_atomic() {
        let desc = user_descriptor();
        let mut user = alice();
        let err = parse(r#"{"id": 7, "name": "Bob", "active": maybe}"#, &mut user, &desc).unwrap_err();
        assert!(matches!(err, Error::Lexical { .. }));
        assert_eq!(user, alice());
    }

    #[test]
    fn test_parse_leaves_trailing_text() {
        let mut value = 0i32;
        let end = parse("  42, 43", &mut value, &Descriptor::number()).unwrap();
        assert_eq!(end, 4);
        assert_eq!(value, 42);
    }

    #[test]
    fn test_from_slice_rejects_bad_utf8() {
        let err = from_slice::<String>(b"\"\xff\"", &Descriptor::string()).unwrap_err();
        assert!(matches!(err, Error::Custom(_)));
    }

    #[test]
    fn test_to_writer() {
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), true);
        let mut buffer = Vec::new();
        to_writer_with_options(
            &mut buffer,
            &map,
            &Descriptor::object(Descriptor::boolean()),
            FormatOptions::pretty(),
        )
        .unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), r#"{ "k": true }"#);
    }

    #[test]
    fn test_parse_options_are_applied() {
        let options = ParseOptions::new().with_terminate_char_buffers(false);
        let code: CharBuf<3> = from_str_with_options("\"abc\"", &Descriptor::string(), options).unwrap();
        assert_eq!(code.as_str(), Some("abc"));

        let code: CharBuf<3> = from_str("\"abc\"", &Descriptor::string()).unwrap();
        assert_eq!(code.as_str(), Some("ab"));
    }
}
