//! Sequence adapters: ordered-append and bounded positional write.
//!
//! Growable collections (`Vec`, `VecDeque`, `LinkedList`, `BTreeSet`,
//! `HashSet`, `IndexSet`) are cleared when parsing starts and then receive
//! each element in textual order through [`ExtendAppender`]. Fixed-size arrays
//! use [`BoundedAppender`], which fills slots from the front and parses but
//! discards anything past the last slot.
//!
//! Both adapters build every element from `T::default()` and store it only
//! when the element parsed completely.
//!
//! ## Custom collections
//!
//! Any collection implementing [`Extend`] can reuse [`ExtendAppender`]:
//!
//! ```rust
//! use json_descriptor::seq::ExtendAppender;
//! use json_descriptor::{from_str, Appender, Descriptor, Host};
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Stack(Vec<u32>);
//!
//! impl Extend<u32> for Stack {
//!     fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
//!         for item in iter {
//!             self.0.insert(0, item);
//!         }
//!     }
//! }
//!
//! impl Host for Stack {
//!     fn appender(&mut self) -> Option<Box<dyn Appender + '_>> {
//!         self.0.clear();
//!         Some(Box::new(ExtendAppender::<u32, _>::new(self)))
//!     }
//! }
//!
//! let stack: Stack = from_str("[1, 2, 3]", &Descriptor::array(Descriptor::number())).unwrap();
//! assert_eq!(stack, Stack(vec![3, 2, 1]));
//! ```

use crate::host::{Appender, Host};
use crate::Result;
use indexmap::IndexSet;
use std::collections::{BTreeSet, HashSet, LinkedList, VecDeque};
use std::hash::Hash;
use std::marker::PhantomData;

/// Ordered-append over any [`Extend`] collection.
pub struct ExtendAppender<'a, T, C> {
    target: &'a mut C,
    _item: PhantomData<fn() -> T>,
}

impl<'a, T, C> ExtendAppender<'a, T, C> {
    pub fn new(target: &'a mut C) -> Self {
        ExtendAppender {
            target,
            _item: PhantomData,
        }
    }
}

impl<T: Host + Default, C: Extend<T>> Appender for ExtendAppender<'_, T, C> {
    fn append(&mut self, fill: &mut dyn FnMut(&mut dyn Host) -> Result<()>) -> Result<()> {
        let mut item = T::default();
        fill(&mut item)?;
        self.target.extend(std::iter::once(item));
        Ok(())
    }
}

/// Positional writer over a fixed number of slots.
///
/// Slots past the number of parsed elements keep their previous value.
pub struct BoundedAppender<'a, T> {
    slots: &'a mut [T],
    next: usize,
    dropped: usize,
}

impl<'a, T> BoundedAppender<'a, T> {
    pub fn new(slots: &'a mut [T]) -> Self {
        BoundedAppender {
            slots,
            next: 0,
            dropped: 0,
        }
    }

    /// Number of elements parsed past capacity so far.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl<T: Host + Default> Appender for BoundedAppender<'_, T> {
    fn append(&mut self, fill: &mut dyn FnMut(&mut dyn Host) -> Result<()>) -> Result<()> {
        let mut item = T::default();
        fill(&mut item)?;
        match self.slots.get_mut(self.next) {
            Some(slot) => {
                *slot = item;
                self.next += 1;
            }
            None => {
                if self.dropped == 0 {
                    log::debug!(
                        "array holds {} elements, dropping the rest",
                        self.slots.len()
                    );
                }
                self.dropped += 1;
            }
        }
        Ok(())
    }
}

macro_rules! impl_growable {
    ($($container:ident $(+ $bound:ident)*;)*) => {
        $(
            impl<T: Host + Default $(+ $bound)*> Host for $container<T> {
                fn elements(&self) -> Option<Box<dyn Iterator<Item = &dyn Host> + '_>> {
                    Some(Box::new(self.iter().map(|item| item as &dyn Host)))
                }

                fn appender(&mut self) -> Option<Box<dyn Appender + '_>> {
                    self.clear();
                    Some(Box::new(ExtendAppender::<T, _>::new(self)))
                }
            }
        )*
    };
}

impl_growable! {
    Vec;
    VecDeque;
    LinkedList;
    BTreeSet + Ord;
    HashSet + Eq + Hash;
    IndexSet + Eq + Hash;
}

impl<T: Host + Default, const N: usize> Host for [T; N] {
    fn elements(&self) -> Option<Box<dyn Iterator<Item = &dyn Host> + '_>> {
        Some(Box::new(self.iter().map(|item| item as &dyn Host)))
    }

    fn appender(&mut self) -> Option<Box<dyn Appender + '_>> {
        Some(Box::new(BoundedAppender::new(self)))
    }
}
