//! The descriptor model: an immutable schema tree describing how a host value
//! maps to JSON.
//!
//! A [`Descriptor`] is built once, before any parse or serialize call, and then
//! shared read-only. Every constructor that can reject a composition does so
//! eagerly, so a descriptor that exists is a valid one.
//!
//! ## Node kinds
//!
//! | Kind | JSON | Children |
//! |------|------|----------|
//! | `Boolean` | `true` / `false` | none |
//! | `Number` | number literal | none |
//! | `String` | quoted string | none |
//! | `Array` | `[...]` of one element kind | 1 |
//! | `Object` | `{...}` with string keys | 1 (value kind) |
//! | `Optional` | `null` or the inner kind | 1 |
//! | `FieldList` | object with declared member names | N, each with an [`Accessor`] |
//! | `ElementList` | array of fixed arity | N, each with an [`Accessor`] |
//!
//! ## Examples
//!
//! ```rust
//! use json_descriptor::{Accessor, Descriptor, Field, Host};
//!
//! #[derive(Default, Clone)]
//! struct Point { x: i32, y: i32 }
//! impl Host for Point {}
//!
//! let point = Descriptor::field_list(vec![
//!     Field::new("x", Accessor::new(|p: &Point| &p.x, |p: &mut Point| &mut p.x), Descriptor::number()),
//!     Field::new("y", Accessor::new(|p: &Point| &p.y, |p: &mut Point| &mut p.y), Descriptor::number()),
//! ]);
//!
//! assert!(!point.is_trivial());
//! assert!(Descriptor::array(Descriptor::number()).is_trivial());
//! ```

use crate::host::{AsAny, Host};
use crate::{Error, Result};
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// The closed set of descriptor node kinds.
///
/// Obtained through [`Descriptor::kind`]; a `Kind` can be inspected but a
/// [`Descriptor`] can only be built through its validating constructors.
#[derive(Debug)]
pub enum Kind {
    Boolean,
    Number,
    String,
    Array(Descriptor),
    Object(Descriptor),
    Optional(Descriptor),
    FieldList(Vec<Field>),
    ElementList(Vec<Element>),
}

/// Schema node describing how one JSON value maps to and from a host value.
///
/// Cloning is cheap: the node is reference counted and never mutated.
#[derive(Clone)]
pub struct Descriptor {
    kind: Arc<Kind>,
}

impl Descriptor {
    fn from_kind(kind: Kind) -> Self {
        Descriptor {
            kind: Arc::new(kind),
        }
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::from_kind(Kind::Boolean)
    }

    #[must_use]
    pub fn number() -> Self {
        Self::from_kind(Kind::Number)
    }

    #[must_use]
    pub fn string() -> Self {
        Self::from_kind(Kind::String)
    }

    /// A JSON array whose elements all follow `element`.
    #[must_use]
    pub fn array(element: Descriptor) -> Self {
        Self::from_kind(Kind::Array(element))
    }

    /// A JSON object with arbitrary string keys whose values follow `value`.
    #[must_use]
    pub fn object(value: Descriptor) -> Self {
        Self::from_kind(Kind::Object(value))
    }

    /// `null` or a value following `inner`.
    ///
    /// # Errors
    ///
    /// Rejects an optional directly wrapping another optional, since `null`
    /// could not tell the two levels apart.
    ///
    /// ```rust
    /// use json_descriptor::Descriptor;
    ///
    /// let maybe = Descriptor::optional(Descriptor::number()).unwrap();
    /// assert!(Descriptor::optional(maybe).is_err());
    /// ```
    pub fn optional(inner: Descriptor) -> Result<Self> {
        if matches!(inner.kind(), Kind::Optional(_)) {
            return Err(Error::invalid_descriptor(
                "optional cannot directly wrap another optional",
            ));
        }
        Ok(Self::from_kind(Kind::Optional(inner)))
    }

    /// A JSON object with a fixed, declared set of member names.
    ///
    /// Members are written in declaration order. When parsing, members that
    /// match no declared name are validated and skipped. A repeated name is
    /// allowed; parsing binds the member to the first field declaring it.
    #[must_use]
    pub fn field_list(fields: Vec<Field>) -> Self {
        Self::from_kind(Kind::FieldList(fields))
    }

    /// A JSON array of exactly `elements.len()` positional members.
    #[must_use]
    pub fn element_list(elements: Vec<Element>) -> Self {
        Self::from_kind(Kind::ElementList(elements))
    }

    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Trivial descriptors are leaves, or arrays, objects and optionals of
    /// trivial descriptors. Field and element lists never are.
    ///
    /// Triviality decides whether a composite is broken across lines when
    /// pretty-printing.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        match self.kind() {
            Kind::Boolean | Kind::Number | Kind::String => true,
            Kind::Array(inner) | Kind::Object(inner) | Kind::Optional(inner) => inner.is_trivial(),
            Kind::FieldList(_) | Kind::ElementList(_) => false,
        }
    }

    /// Short lowercase name of the node kind, used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.kind() {
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array(_) => "array",
            Kind::Object(_) => "object",
            Kind::Optional(_) => "optional",
            Kind::FieldList(_) => "field list",
            Kind::ElementList(_) => "element list",
        }
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// Type-erased borrow of one component of a host composite.
trait Access: Send + Sync {
    fn get<'a>(&self, host: &'a dyn Host) -> Option<&'a dyn Host>;
    fn get_mut<'a>(&self, host: &'a mut dyn Host) -> Option<&'a mut dyn Host>;
    fn source(&self) -> &'static str;
    fn target(&self) -> &'static str;
}

struct Lens<T, F, G, M> {
    get: G,
    get_mut: M,
    _types: PhantomData<fn(&T) -> &F>,
}

impl<T, F, G, M> Access for Lens<T, F, G, M>
where
    T: Host,
    F: Host,
    G: Fn(&T) -> &F + Send + Sync,
    M: Fn(&mut T) -> &mut F + Send + Sync,
{
    fn get<'a>(&self, host: &'a dyn Host) -> Option<&'a dyn Host> {
        let host = AsAny::as_any(host).downcast_ref::<T>()?;
        let component: &dyn Host = (self.get)(host);
        Some(component)
    }

    fn get_mut<'a>(&self, host: &'a mut dyn Host) -> Option<&'a mut dyn Host> {
        let host = AsAny::as_any_mut(host).downcast_mut::<T>()?;
        let component: &mut dyn Host = (self.get_mut)(host);
        Some(component)
    }

    fn source(&self) -> &'static str {
        type_name::<T>()
    }

    fn target(&self) -> &'static str {
        type_name::<F>()
    }
}

/// Opaque capability to read or write one component of a host composite.
///
/// Built from a pair of closures over the concrete host type `T`. The parser
/// and serializer only ever call it through a `dyn Host`; when the host value
/// is not a `T` the accessor yields nothing.
///
/// # Examples
///
/// ```rust
/// use json_descriptor::{Accessor, Host};
///
/// #[derive(Default)]
/// struct Pair(String, u8);
/// impl Host for Pair {}
///
/// let second = Accessor::new(|p: &Pair| &p.1, |p: &mut Pair| &mut p.1);
/// let pair = Pair("a".into(), 7);
/// assert!(second.get(&pair).is_some());
/// assert!(second.get(&7u8).is_none());
/// ```
#[derive(Clone)]
pub struct Accessor {
    access: Arc<dyn Access>,
}

impl Accessor {
    pub fn new<T, F, G, M>(get: G, get_mut: M) -> Self
    where
        T: Host,
        F: Host,
        G: Fn(&T) -> &F + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut F + Send + Sync + 'static,
    {
        Accessor {
            access: Arc::new(Lens {
                get,
                get_mut,
                _types: PhantomData,
            }),
        }
    }

    /// Borrows the component out of `host`, or `None` if `host` has the wrong type.
    #[must_use]
    pub fn get<'a>(&self, host: &'a dyn Host) -> Option<&'a dyn Host> {
        self.access.get(host)
    }

    pub fn get_mut<'a>(&self, host: &'a mut dyn Host) -> Option<&'a mut dyn Host> {
        self.access.get_mut(host)
    }

    /// Type name of the composite this accessor reads from.
    #[must_use]
    pub fn source_type(&self) -> &'static str {
        self.access.source()
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Accessor({} -> {})", self.access.source(), self.access.target())
    }
}

/// A named member of a [`Descriptor::field_list`].
#[derive(Clone, Debug)]
pub struct Field {
    name: String,
    accessor: Accessor,
    descriptor: Descriptor,
}

impl Field {
    pub fn new(name: impl Into<String>, accessor: Accessor, descriptor: Descriptor) -> Self {
        Field {
            name: name.into(),
            accessor,
            descriptor,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    #[must_use]
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }
}

/// A positional member of a [`Descriptor::element_list`].
#[derive(Clone, Debug)]
pub struct Element {
    accessor: Accessor,
    descriptor: Descriptor,
}

impl Element {
    pub fn new(accessor: Accessor, descriptor: Descriptor) -> Self {
        Element {
            accessor,
            descriptor,
        }
    }

    #[must_use]
    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    #[must_use]
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }
}
