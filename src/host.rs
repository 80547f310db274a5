//! Host capabilities: how the parser and serializer talk to native values.
//!
//! The codec never inspects a host type directly. Instead every value it
//! touches is a `dyn` [`Host`], and each descriptor kind asks that value for
//! one capability:
//!
//! | Descriptor | Serialize | Parse |
//! |------------|-----------|-------|
//! | `Boolean` | [`Host::boolean`] | [`Host::boolean_mut`] |
//! | `Number` | [`Host::number`] | [`Host::number_mut`] |
//! | `String` | [`Host::text`] | [`Host::text_writer`] |
//! | `Array` / `ElementList` | [`Host::elements`] | [`Host::appender`] |
//! | `Object` | [`Host::entries`] | [`Host::keyed_appender`] |
//! | `Optional` | [`Host::optional`] | [`Host::optional_mut`] |
//!
//! Every capability defaults to "not supported", so a host type implements
//! only what it is: `impl Host for MyStruct {}` is enough for a struct that is
//! reached through field or element accessors.
//!
//! Container capabilities ([`Appender`], [`KeyedAppender`]) live in the
//! [`seq`](crate::seq) and [`map`](crate::map) modules; this module holds the
//! traits plus the leaf adapters (booleans, numbers, text, `Option`).
//!
//! ## Adding an adapter
//!
//! ```rust
//! use json_descriptor::{from_str, to_string, Descriptor, Host, Numeric};
//!
//! /// Cents stored as an integer, written as a decimal amount.
//! #[derive(Default, Debug, PartialEq)]
//! struct Cents(i64);
//!
//! impl Numeric for Cents {
//!     fn write_decimal(&self, out: &mut String) {
//!         out.push_str(&format!("{}.{:02}", self.0 / 100, self.0 % 100));
//!     }
//!
//!     fn read_decimal(&mut self, token: &str) -> bool {
//!         match token.parse::<f64>() {
//!             Ok(v) if v.is_finite() => {
//!                 self.0 = (v * 100.0).round() as i64;
//!                 true
//!             }
//!             _ => false,
//!         }
//!     }
//! }
//!
//! impl Host for Cents {
//!     fn number(&self) -> Option<&dyn Numeric> {
//!         Some(self)
//!     }
//!
//!     fn number_mut(&mut self) -> Option<&mut dyn Numeric> {
//!         Some(self)
//!     }
//! }
//!
//! assert_eq!(to_string(&Cents(1250), &Descriptor::number()), "12.50");
//! assert_eq!(from_str::<Cents>("3.07", &Descriptor::number()).unwrap(), Cents(307));
//! ```

use crate::Result;
use chrono::{DateTime, Utc};
use std::any::Any;
use std::borrow::Cow;

/// Upcast to [`Any`], implemented for every sized `'static` type.
///
/// Lets accessors recover the concrete host type behind a `dyn Host`.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Borrowed string content handed to the serializer.
pub enum Text<'a> {
    /// Unicode text, escaped per character.
    Str(Cow<'a, str>),
    /// Raw bytes, escaped per byte; anything outside printable ASCII is
    /// written as `\u00XX`.
    Bytes(&'a [u8]),
}

/// One decoded unit of a JSON string body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
    /// A literal character or a single-character escape.
    Char(char),
    /// The code unit of a `\uXXXX` escape.
    Unit(u16),
}

/// Receives a string body while it is being parsed.
///
/// Rejections carry a short reason that ends up in a semantic parse error.
pub trait TextWriter {
    fn push(&mut self, piece: Piece) -> std::result::Result<(), &'static str>;

    /// Called at the closing quote. Nothing is stored before this succeeds.
    fn finish(&mut self) -> std::result::Result<(), &'static str>;
}

/// Number conversion delegated to the host numeric type.
pub trait Numeric {
    /// Writes the canonical decimal form.
    fn write_decimal(&self, out: &mut String);

    /// Stores a lexically valid number token; `false` when it does not fit.
    fn read_decimal(&mut self, token: &str) -> bool;
}

/// Ordered-append capability of a sequence.
pub trait Appender {
    /// Builds one element through `fill` and stores it if `fill` succeeds.
    ///
    /// Bounded targets still call `fill` past their capacity (the text has to
    /// be consumed) but drop the result.
    fn append(&mut self, fill: &mut dyn FnMut(&mut dyn Host) -> Result<()>) -> Result<()>;
}

/// Keyed-insert capability of a string-keyed map. Last write wins.
pub trait KeyedAppender {
    fn insert(
        &mut self,
        key: String,
        fill: &mut dyn FnMut(&mut dyn Host) -> Result<()>,
    ) -> Result<()>;
}

/// Parse-side view of a value that may be absent.
pub trait Nullable {
    fn set_null(&mut self);
    fn get_or_insert_default(&mut self) -> &mut dyn Host;
}

/// A native value the codec can read from and write into.
///
/// All methods default to "unsupported". Implement the ones matching the
/// descriptor kinds the type is used with.
pub trait Host: AsAny {
    fn boolean(&self) -> Option<bool> {
        None
    }

    fn boolean_mut(&mut self) -> Option<&mut bool> {
        None
    }

    fn number(&self) -> Option<&dyn Numeric> {
        None
    }

    fn number_mut(&mut self) -> Option<&mut dyn Numeric> {
        None
    }

    fn text(&self) -> Option<Text<'_>> {
        None
    }

    /// Starts receiving a string body. `terminate` asks fixed-capacity
    /// buffers to reserve room for a NUL terminator.
    fn text_writer(&mut self, _terminate: bool) -> Option<Box<dyn TextWriter + '_>> {
        None
    }

    fn elements(&self) -> Option<Box<dyn Iterator<Item = &dyn Host> + '_>> {
        None
    }

    fn appender(&mut self) -> Option<Box<dyn Appender + '_>> {
        None
    }

    fn entries(&self) -> Option<Box<dyn Iterator<Item = (&str, &dyn Host)> + '_>> {
        None
    }

    fn keyed_appender(&mut self) -> Option<Box<dyn KeyedAppender + '_>> {
        None
    }

    /// `Some(None)` for an absent value, `Some(Some(v))` for a present one.
    fn optional(&self) -> Option<Option<&dyn Host>> {
        None
    }

    fn optional_mut(&mut self) -> Option<&mut dyn Nullable> {
        None
    }
}

impl Host for bool {
    fn boolean(&self) -> Option<bool> {
        Some(*self)
    }

    fn boolean_mut(&mut self) -> Option<&mut bool> {
        Some(self)
    }
}

macro_rules! impl_numeric {
    (integer: $($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                fn write_decimal(&self, out: &mut String) {
                    out.push_str(&self.to_string());
                }

                fn read_decimal(&mut self, token: &str) -> bool {
                    match token.parse::<$ty>() {
                        Ok(value) => {
                            *self = value;
                            true
                        }
                        Err(_) => false,
                    }
                }
            }
        )*
        impl_numeric!(@host $($ty),*);
    };
    (float: $($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                fn write_decimal(&self, out: &mut String) {
                    if self.is_finite() {
                        out.push_str(&self.to_string());
                    } else {
                        out.push_str("null");
                    }
                }

                fn read_decimal(&mut self, token: &str) -> bool {
                    match token.parse::<$ty>() {
                        Ok(value) if value.is_finite() => {
                            *self = value;
                            true
                        }
                        _ => false,
                    }
                }
            }
        )*
        impl_numeric!(@host $($ty),*);
    };
    (@host $($ty:ty),*) => {
        $(
            impl Host for $ty {
                fn number(&self) -> Option<&dyn Numeric> {
                    Some(self)
                }

                fn number_mut(&mut self) -> Option<&mut dyn Numeric> {
                    Some(self)
                }
            }
        )*
    };
}

impl_numeric!(integer: i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_numeric!(float: f32, f64);

/// Decodes a `\uXXXX` unit into a scalar value; lone surrogates have none.
fn unit_to_char(unit: u16) -> std::result::Result<char, &'static str> {
    char::from_u32(u32::from(unit)).ok_or("surrogate escape cannot be stored as text")
}

struct StringWriter<'a> {
    target: &'a mut String,
    buffer: String,
}

impl TextWriter for StringWriter<'_> {
    fn push(&mut self, piece: Piece) -> std::result::Result<(), &'static str> {
        let ch = match piece {
            Piece::Char(ch) => ch,
            Piece::Unit(unit) => unit_to_char(unit)?,
        };
        self.buffer.push(ch);
        Ok(())
    }

    fn finish(&mut self) -> std::result::Result<(), &'static str> {
        *self.target = std::mem::take(&mut self.buffer);
        Ok(())
    }
}

impl Host for String {
    fn text(&self) -> Option<Text<'_>> {
        Some(Text::Str(Cow::Borrowed(self)))
    }

    fn text_writer(&mut self, _terminate: bool) -> Option<Box<dyn TextWriter + '_>> {
        Some(Box::new(StringWriter {
            target: self,
            buffer: String::new(),
        }))
    }
}

/// Single-scalar writer: the string body must be exactly one character.
struct CharWriter<'a> {
    target: &'a mut char,
    seen: Option<char>,
}

impl TextWriter for CharWriter<'_> {
    fn push(&mut self, piece: Piece) -> std::result::Result<(), &'static str> {
        if self.seen.is_some() {
            return Err("expected a single-character string");
        }
        self.seen = Some(match piece {
            Piece::Char(ch) => ch,
            Piece::Unit(unit) => unit_to_char(unit)?,
        });
        Ok(())
    }

    fn finish(&mut self) -> std::result::Result<(), &'static str> {
        let ch = self.seen.ok_or("expected a single-character string")?;
        *self.target = ch;
        Ok(())
    }
}

impl Host for char {
    fn text(&self) -> Option<Text<'_>> {
        Some(Text::Str(Cow::Owned(self.to_string())))
    }

    fn text_writer(&mut self, _terminate: bool) -> Option<Box<dyn TextWriter + '_>> {
        Some(Box::new(CharWriter {
            target: self,
            seen: None,
        }))
    }
}

/// Fixed-capacity byte buffer holding string text.
///
/// Parsing stores at most `N` bytes (`N - 1` when NUL termination is on) and
/// silently drops the rest of the body. Characters are never split: a
/// multi-byte character that does not fit is dropped whole. `\uXXXX` escapes
/// store only their low byte.
///
/// # Examples
///
/// ```rust
/// use json_descriptor::{from_str, CharBuf, Descriptor};
///
/// let code: CharBuf<4> = from_str("\"ABCDEF\"", &Descriptor::string()).unwrap();
/// assert_eq!(code.as_bytes(), b"ABC");
/// assert_eq!(code.as_str(), Some("ABC"));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CharBuf<const N: usize>([u8; N]);

impl<const N: usize> CharBuf<N> {
    #[must_use]
    pub fn new() -> Self {
        CharBuf([0; N])
    }

    /// Copies as much of `text` as fits, leaving room for a terminator.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut buf = Self::new();
        let mut len = 0;
        for ch in text.chars() {
            let width = ch.len_utf8();
            if len + width >= N {
                break;
            }
            ch.encode_utf8(&mut buf.0[len..len + width]);
            len += width;
        }
        buf
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Stored bytes up to the first NUL.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(N);
        &self.0[..end]
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    #[must_use]
    pub fn raw(&self) -> &[u8; N] {
        &self.0
    }
}

impl<const N: usize> Default for CharBuf<N> {
    fn default() -> Self {
        Self::new()
    }
}

struct CharBufWriter<'a, const N: usize> {
    target: &'a mut CharBuf<N>,
    scratch: [u8; N],
    len: usize,
    capacity: usize,
    full: bool,
}

impl<const N: usize> CharBufWriter<'_, N> {
    fn store(&mut self, bytes: &[u8]) {
        if self.full || self.len + bytes.len() > self.capacity {
            if !self.full {
                log::debug!("string body exceeds {}-byte buffer, dropping the rest", N);
            }
            self.full = true;
            return;
        }
        self.scratch[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
    }
}

impl<const N: usize> TextWriter for CharBufWriter<'_, N> {
    fn push(&mut self, piece: Piece) -> std::result::Result<(), &'static str> {
        match piece {
            Piece::Char(ch) => {
                let mut utf8 = [0; 4];
                self.store(ch.encode_utf8(&mut utf8).as_bytes());
            }
            Piece::Unit(unit) => self.store(&[unit.to_le_bytes()[0]]),
        }
        Ok(())
    }

    fn finish(&mut self) -> std::result::Result<(), &'static str> {
        // scratch starts zeroed, so the byte after the body is already the terminator
        self.target.0 = self.scratch;
        Ok(())
    }
}

impl<const N: usize> Host for CharBuf<N> {
    fn text(&self) -> Option<Text<'_>> {
        Some(Text::Bytes(self.as_bytes()))
    }

    fn text_writer(&mut self, terminate: bool) -> Option<Box<dyn TextWriter + '_>> {
        let capacity = if terminate { N.saturating_sub(1) } else { N };
        Some(Box::new(CharBufWriter {
            target: self,
            scratch: [0; N],
            len: 0,
            capacity,
            full: false,
        }))
    }
}

/// Timestamps travel as RFC 3339 strings.
struct TimestampWriter<'a> {
    target: &'a mut DateTime<Utc>,
    buffer: String,
}

impl TextWriter for TimestampWriter<'_> {
    fn push(&mut self, piece: Piece) -> std::result::Result<(), &'static str> {
        let ch = match piece {
            Piece::Char(ch) => ch,
            Piece::Unit(unit) => unit_to_char(unit)?,
        };
        self.buffer.push(ch);
        Ok(())
    }

    fn finish(&mut self) -> std::result::Result<(), &'static str> {
        let parsed = DateTime::parse_from_rfc3339(&self.buffer)
            .map_err(|_| "expected an RFC 3339 timestamp")?;
        *self.target = parsed.with_timezone(&Utc);
        Ok(())
    }
}

impl Host for DateTime<Utc> {
    fn text(&self) -> Option<Text<'_>> {
        Some(Text::Str(Cow::Owned(self.to_rfc3339())))
    }

    fn text_writer(&mut self, _terminate: bool) -> Option<Box<dyn TextWriter + '_>> {
        Some(Box::new(TimestampWriter {
            target: self,
            buffer: String::new(),
        }))
    }
}

impl<T: Host + Default> Nullable for Option<T> {
    fn set_null(&mut self) {
        *self = None;
    }

    fn get_or_insert_default(&mut self) -> &mut dyn Host {
        self.get_or_insert_with(T::default)
    }
}

impl<T: Host + Default> Host for Option<T> {
    fn optional(&self) -> Option<Option<&dyn Host>> {
        Some(self.as_ref().map(|value| value as &dyn Host))
    }

    fn optional_mut(&mut self) -> Option<&mut dyn Nullable> {
        Some(self)
    }
}

// Tuples are plain composites reached through element accessors.
macro_rules! impl_tuple_host {
    ($(($($name:ident),+)),*) => {
        $(impl<$($name: Host),+> Host for ($($name,)+) {})*
    };
}

impl_tuple_host!((A), (A, B), (A, B, C), (A, B, C, D), (A, B, C, D, E), (A, B, C, D, E, F));

#[cfg(test)]
mod tests {
    use super::*;

    fn write_all(writer: &mut dyn TextWriter, text: &str) -> std::result::Result<(), &'static str> {
        for ch in text.chars() {
            writer.push(Piece::Char(ch))?;
        }
        writer.finish()
    }

    #[test]
    fn test_integer_conversion() {
        let mut value = 0i32;
        assert!(value.read_decimal("-4567"));
        assert_eq!(value, -4567);
        assert!(!value.read_decimal("281474976710656"));
        assert!(!value.read_decimal("1.5"));
        assert_eq!(value, -4567);

        let mut wide = 0i64;
        assert!(wide.read_decimal("281474976710656"));
        assert_eq!(wide, 281_474_976_710_656);
    }

    #[test]
    fn test_float_conversion() {
        let mut value = 0f64;
        assert!(value.read_decimal("1.5e2"));
        assert_eq!(value, 150.0);
        assert!(!value.read_decimal("1e400"));

        let mut out = String::new();
        4.567f64.write_decimal(&mut out);
        assert_eq!(out, "4.567");

        let mut out = String::new();
        0.0f64.write_decimal(&mut out);
        assert_eq!(out, "0");

        let mut out = String::new();
        f64::NAN.write_decimal(&mut out);
        assert_eq!(out, "null");
    }

    #[test]
    fn test_narrow_float_overflow() {
        let mut value = 0f32;
        assert!(!value.read_decimal("1e39"));
        assert!(value.read_decimal("-100.5"));
        assert_eq!(value, -100.5);
    }

    #[test]
    fn test_string_writer_commits_on_finish() {
        let mut target = String::from("old");
        {
            let mut writer = target.text_writer(true).unwrap();
            writer.push(Piece::Char('h')).unwrap();
            writer.push(Piece::Unit(0x0041)).unwrap();
        }
        assert_eq!(target, "old");

        let mut writer = target.text_writer(true).unwrap();
        write_all(writer.as_mut(), "new").unwrap();
        drop(writer);
        assert_eq!(target, "new");
    }

    #[test]
    fn test_string_rejects_lone_surrogate() {
        let mut target = String::new();
        let mut writer = target.text_writer(true).unwrap();
        assert!(writer.push(Piece::Unit(0xD83D)).is_err());
    }

    #[test]
    fn test_char_accepts_exactly_one() {
        let mut c = 'x';
        let mut writer = c.text_writer(true).unwrap();
        write_all(writer.as_mut(), "é").unwrap();
        drop(writer);
        assert_eq!(c, 'é');

        let mut writer = c.text_writer(true).unwrap();
        assert!(write_all(writer.as_mut(), "ab").is_err());
        drop(writer);

        let mut writer = c.text_writer(true).unwrap();
        assert!(writer.finish().is_err());
        drop(writer);
        assert_eq!(c, 'é');
    }

    #[test]
    fn test_char_buf_terminated_capacity() {
        let mut buf = CharBuf::<4>::from_text("zzz");
        let mut writer = buf.text_writer(true).unwrap();
        write_all(writer.as_mut(), "hello").unwrap();
        drop(writer);
        assert_eq!(buf.raw(), b"hel\0");
    }

    #[test]
    fn test_char_buf_unterminated_uses_full_capacity() {
        let mut buf = CharBuf::<4>::new();
        let mut writer = buf.text_writer(false).unwrap();
        write_all(writer.as_mut(), "hello").unwrap();
        drop(writer);
        assert_eq!(buf.raw(), b"hell");
        assert_eq!(buf.as_str(), Some("hell"));
    }

    #[test]
    fn test_char_buf_keeps_low_byte_of_escape() {
        let mut buf = CharBuf::<8>::new();
        let mut writer = buf.text_writer(true).unwrap();
        writer.push(Piece::Unit(0x0141)).unwrap();
        writer.push(Piece::Unit(0x00e9)).unwrap();
        writer.finish().unwrap();
        drop(writer);
        assert_eq!(buf.as_bytes(), &[0x41, 0xe9]);
        assert_eq!(buf.as_str(), None);
    }

    #[test]
    fn test_char_buf_does_not_split_characters() {
        let mut buf = CharBuf::<3>::new();
        let mut writer = buf.text_writer(false).unwrap();
        write_all(writer.as_mut(), "aéb").unwrap();
        drop(writer);
        assert_eq!(buf.as_str(), Some("aé"));

        let mut buf = CharBuf::<3>::new();
        let mut writer = buf.text_writer(true).unwrap();
        write_all(writer.as_mut(), "aéb").unwrap();
        drop(writer);
        assert_eq!(buf.as_str(), Some("a"));
    }

    #[test]
    fn test_timestamp_round_trip() {
        let mut when = DateTime::<Utc>::default();
        let mut writer = when.text_writer(true).unwrap();
        write_all(writer.as_mut(), "2024-01-15T10:30:00Z").unwrap();
        drop(writer);
        assert_eq!(when.to_rfc3339(), "2024-01-15T10:30:00+00:00");

        let mut writer = when.text_writer(true).unwrap();
        assert!(write_all(writer.as_mut(), "yesterday").is_err());
    }

    #[test]
    fn test_option_views() {
        let mut value: Option<i32> = None;
        assert!(matches!(value.optional(), Some(None)));

        let slot = value.optional_mut().unwrap();
        assert!(slot.get_or_insert_default().number_mut().unwrap().read_decimal("3"));
        assert_eq!(value, Some(3));

        value.optional_mut().unwrap().set_null();
        assert_eq!(value, None);
    }

    #[test]
    fn test_unsupported_capabilities_default_to_none() {
        let mut flag = true;
        assert!(flag.number().is_none());
        assert!(flag.text_writer(true).is_none());
        assert!(flag.appender().is_none());
        assert!(flag.optional().is_none());
        assert_eq!(flag.boolean(), Some(true));
        *flag.boolean_mut().unwrap() = false;
        assert!(!flag);
    }
}
