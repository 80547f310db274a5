//! Configuration options for writing and parsing.
//!
//! - [`FormatOptions`]: whitespace and line-breaking policy of the serializer
//! - [`Indent`]: the unit written once per nesting level on broken lines
//! - [`ParseOptions`]: parser knobs (buffer termination, nesting ceiling)
//!
//! Both option structs implement `serde::Deserialize` with per-field defaults,
//! so they can be embedded in an application's own configuration file.
//!
//! ## Examples
//!
//! ```rust
//! use json_descriptor::{to_string_with_options, Descriptor, FormatOptions, Indent};
//!
//! let desc = Descriptor::array(Descriptor::number());
//!
//! let text = to_string_with_options(&vec![1, 2, 3], &desc, FormatOptions::dense());
//! assert_eq!(text, "[1,2,3]");
//!
//! let options = FormatOptions::pretty()
//!     .with_newline_trivial_arrays(true)
//!     .with_indent(Indent::Spaces(2));
//! let text = to_string_with_options(&vec![1, 2], &desc, options);
//! assert_eq!(text, "[\n  1,\n  2\n]");
//! ```

use serde::{Deserialize, Serialize};

/// Indentation unit written once per nesting level.
///
/// # Examples
///
/// ```rust
/// use json_descriptor::Indent;
///
/// assert_eq!(Indent::Tab.unit(), "\t");
/// assert_eq!(Indent::Spaces(4).unit(), "    ");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indent {
    #[default]
    Tab,
    Spaces(usize),
}

impl Indent {
    /// Returns the text of one indentation unit.
    #[must_use]
    pub fn unit(&self) -> String {
        match self {
            Indent::Tab => "\t".to_string(),
            Indent::Spaces(n) => " ".repeat(*n),
        }
    }
}

/// Formatting policy of the serializer.
///
/// # Examples
///
/// ```rust
/// use json_descriptor::FormatOptions;
///
/// let dense = FormatOptions::dense();
/// assert!(dense.dense && !dense.newline_elements);
///
/// let pretty = FormatOptions::pretty();
/// assert!(!pretty.dense && pretty.newline_elements && !pretty.newline_trivial_arrays);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Suppress every optional space (after `:` and `,`, inside brackets).
    pub dense: bool,
    /// Put each element of a non-trivial composite on its own line.
    pub newline_elements: bool,
    /// Also break arrays whose elements are trivial.
    pub newline_trivial_arrays: bool,
    pub indent: Indent,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions::dense()
    }
}

impl FormatOptions {
    /// Creates default options, identical to [`FormatOptions::dense`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// No incidental whitespace at all.
    #[must_use]
    pub fn dense() -> Self {
        FormatOptions {
            dense: true,
            newline_elements: false,
            newline_trivial_arrays: false,
            indent: Indent::Tab,
        }
    }

    /// Spaced separators and one element per line for non-trivial composites,
    /// tab-indented.
    #[must_use]
    pub fn pretty() -> Self {
        FormatOptions {
            dense: false,
            newline_elements: true,
            newline_trivial_arrays: false,
            indent: Indent::Tab,
        }
    }

    #[must_use]
    pub fn with_dense(mut self, dense: bool) -> Self {
        self.dense = dense;
        self
    }

    #[must_use]
    pub fn with_newline_elements(mut self, newline_elements: bool) -> Self {
        self.newline_elements = newline_elements;
        self
    }

    /// Sets whether trivial arrays are broken onto lines as well.
    ///
    /// Has no effect unless `newline_elements` is also set.
    #[must_use]
    pub fn with_newline_trivial_arrays(mut self, newline_trivial_arrays: bool) -> Self {
        self.newline_trivial_arrays = newline_trivial_arrays;
        self
    }

    #[must_use]
    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }
}

/// Default ceiling on composite nesting while parsing.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Parser configuration.
///
/// # Examples
///
/// ```rust
/// use json_descriptor::ParseOptions;
///
/// let options = ParseOptions::new().with_max_depth(16);
/// assert_eq!(options.max_depth, 16);
/// assert!(options.terminate_char_buffers);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Write a NUL after the text stored in a fixed-capacity char buffer.
    pub terminate_char_buffers: bool,
    /// Deepest composite nesting the parser descends into.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            terminate_char_buffers: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_terminate_char_buffers(mut self, terminate: bool) -> Self {
        self.terminate_char_buffers = terminate;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
