//! Keyed-insert adapters for string-keyed maps.
//!
//! `BTreeMap<String, V>`, `HashMap<String, V>` and [`IndexMap<String, V>`]
//! serve as hosts for [`Descriptor::object`](crate::Descriptor::object). They
//! are cleared when parsing starts; a key that appears twice keeps the value
//! written last.
//!
//! Serialization iterates the map's own order, so `BTreeMap` output is sorted
//! by key and `IndexMap` output follows insertion order, which makes it the
//! natural choice when the text must keep the order it was read in.
//!
//! ## Examples
//!
//! ```rust
//! use indexmap::IndexMap;
//! use json_descriptor::{from_str, to_string, Descriptor};
//!
//! let desc = Descriptor::object(Descriptor::number());
//! let scores: IndexMap<String, i32> = from_str(r#"{"red": 1, "blue": 2, "red": 3}"#, &desc).unwrap();
//!
//! assert_eq!(scores.get("red"), Some(&3));
//! assert_eq!(to_string(&scores, &desc), r#"{"red":3,"blue":2}"#);
//! ```

use crate::host::{Host, KeyedAppender};
use crate::Result;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;

/// Common insert surface of the supported map types.
trait StringMap<V> {
    /// Returns `true` when an existing value was replaced.
    fn put(&mut self, key: String, value: V) -> bool;
}

/// Keyed-insert over a string-keyed map, last write wins.
struct MapInserter<'a, V, M> {
    target: &'a mut M,
    _value: PhantomData<fn() -> V>,
}

impl<V, M> KeyedAppender for MapInserter<'_, V, M>
where
    V: Host + Default,
    M: StringMap<V>,
{
    fn insert(
        &mut self,
        key: String,
        fill: &mut dyn FnMut(&mut dyn Host) -> Result<()>,
    ) -> Result<()> {
        let mut value = V::default();
        fill(&mut value)?;
        if self.target.put(key.clone(), value) {
            log::debug!("duplicate key {:?}, keeping the last value", key);
        }
        Ok(())
    }
}

macro_rules! impl_string_map {
    ($($map:ident),*) => {
        $(
            impl<V> StringMap<V> for $map<String, V> {
                fn put(&mut self, key: String, value: V) -> bool {
                    self.insert(key, value).is_some()
                }
            }

            impl<V: Host + Default> Host for $map<String, V> {
                fn entries(&self) -> Option<Box<dyn Iterator<Item = (&str, &dyn Host)> + '_>> {
                    Some(Box::new(
                        self.iter().map(|(key, value)| (key.as_str(), value as &dyn Host)),
                    ))
                }

                fn keyed_appender(&mut self) -> Option<Box<dyn KeyedAppender + '_>> {
                    self.clear();
                    Some(Box::new(MapInserter::<V, _> {
                        target: self,
                        _value: PhantomData,
                    }))
                }
            }
        )*
    };
}

impl_string_map!(BTreeMap, HashMap, IndexMap);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn put_number(
        appender: &mut dyn KeyedAppender,
        key: &str,
        token: &'static str,
    ) -> Result<()> {
        appender.insert(key.to_string(), &mut |item: &mut dyn Host| {
            if item.number_mut().map_or(false, |n| n.read_decimal(token)) {
                Ok(())
            } else {
                Err(Error::custom("bad number"))
            }
        })
    }

    #[test]
    fn test_last_write_wins() {
        let mut map: BTreeMap<String, i32> = BTreeMap::new();
        let mut appender = map.keyed_appender().unwrap();
        put_number(appender.as_mut(), "a", "1").unwrap();
        put_number(appender.as_mut(), "a", "2").unwrap();
        drop(appender);
        assert_eq!(map.len(), 1);
        assert_eq!(map["a"], 2);
    }

    #[test]
    fn test_parse_clears_previous_entries() {
        let mut map: HashMap<String, i32> = HashMap::new();
        map.insert("stale".to_string(), 0);
        let mut appender = map.keyed_appender().unwrap();
        put_number(appender.as_mut(), "fresh", "5").unwrap();
        drop(appender);
        assert!(!map.contains_key("stale"));
        assert_eq!(map.get("fresh"), Some(&5));
    }

    #[test]
    fn test_failed_value_is_not_inserted() {
        let mut map: IndexMap<String, u8> = IndexMap::new();
        let mut appender = map.keyed_appender().unwrap();
        assert!(put_number(appender.as_mut(), "big", "256").is_err());
        drop(appender);
        assert!(map.is_empty());
    }

    #[test]
    fn test_index_map_entries_keep_insertion_order() {
        let mut map: IndexMap<String, i32> = IndexMap::new();
        map.insert("zeta".to_string(), 1);
        map.insert("alpha".to_string(), 2);
        let keys: Vec<&str> = map.entries().unwrap().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }
}
