use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// The worker-owned mutable key/value store shared across lifecycle calls.
///
/// A capability's `setup` populates it (e.g. with a reusable model
/// instance) and `handle_frame` reads and writes it on every frame. Values
/// are type-erased; lookups downcast to the stored type.
#[derive(Default)]
pub struct StateBag {
    entries: HashMap<String, Box<dyn Any + Send>>,
}

impl StateBag {
    /// Create an empty state bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under a key, replacing any previous value.
    pub fn insert<T: Any + Send>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Box::new(value));
    }

    /// Look up a value by key and type.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|v| v.downcast_ref())
    }

    /// Mutably look up a value by key and type.
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key).and_then(|v| v.downcast_mut())
    }

    /// Remove and return a value by key and type.
    ///
    /// Returns `None` if the key is absent or holds a different type (the
    /// entry stays in place in the latter case).
    pub fn remove<T: Any + Send>(&mut self, key: &str) -> Option<T> {
        if !self
            .entries
            .get(key)
            .is_some_and(|v| v.as_ref().is::<T>())
        {
            return None;
        }
        self.entries
            .remove(key)
            .and_then(|v| v.downcast().ok())
            .map(|boxed| *boxed)
    }

    /// True if a value is stored under the key.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for StateBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
