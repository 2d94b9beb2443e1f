//! Extension trait for [`KeyValueStore`] with typed convenience methods.

use std::fmt::Display;
use std::str::FromStr;

use crate::{KeyValueStore, KvError};

/// Typed convenience methods for [`KeyValueStore`].
///
/// Values are stored as their `Display` rendering and read back with
/// `FromStr`, so the trait object itself stays string-only.
///
/// # Example
///
/// ```
/// use xeo_kv::{KeyValueStoreExt, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.set_display("offset", &340_u32).unwrap();
/// let offset: Option<u32> = store.get_parsed("offset").unwrap();
/// assert_eq!(offset, Some(340));
/// ```
pub trait KeyValueStoreExt: KeyValueStore {
    /// Retrieve and parse a stored value.
    ///
    /// A value that does not parse as `T` reads as `None`.
    fn get_parsed<T: FromStr>(&self, key: &str) -> Result<Option<T>, KvError> {
        Ok(self.get(key)?.and_then(|raw| raw.trim().parse().ok()))
    }

    /// Store the `Display` rendering of a value.
    fn set_display<T: Display + ?Sized>(&self, key: &str, value: &T) -> Result<(), KvError> {
        self.set(key, &value.to_string())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_get_parsed_round_trip() {
        let store = MemoryStore::new();

        store.set_display("n", &42_u32).unwrap();

        assert_eq!(store.get_parsed::<u32>("n").unwrap(), Some(42));
    }

    #[test]
    fn test_get_parsed_garbage_is_none() {
        let store = MemoryStore::new();
        store.set("n", "not a number").unwrap();

        assert_eq!(store.get_parsed::<u32>("n").unwrap(), None);
    }

    #[test]
    fn test_ext_works_on_trait_object() {
        let store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());

        store.set_display("n", &7_i64).unwrap();

        assert_eq!(store.get_parsed::<i64>("n").unwrap(), Some(7));
    }
}
