/// Ordered, case-insensitive, multi-valued header collection.
///
/// Keys keep the casing of their first insertion and the position in which they were first seen.
/// Values under one key keep insertion order.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<Entry>,
}

#[derive(Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    values: Vec<String>,
}

impl HeaderSet {
    /// Create new empty [`HeaderSet`].
    #[inline]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Number of distinct keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name.eq_ignore_ascii_case(key))
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Returns the first value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        let idx = self.position(key)?;
        self.entries[idx].values.first().map(String::as_str)
    }

    /// Returns all values of `key` in insertion order.
    pub fn get_all(&self, key: &str) -> Values<'_> {
        let values = match self.position(key) {
            Some(idx) => &self.entries[idx].values[..],
            None => &[],
        };
        Values { iter: values.iter() }
    }

    /// Returns all values of `key` joined with `", "`.
    pub fn joined(&self, key: &str) -> Option<String> {
        let idx = self.position(key)?;
        Some(self.entries[idx].values.join(", "))
    }

    /// Append `value` under `key`.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        match self.position(key) {
            Some(idx) => self.entries[idx].values.push(value.into()),
            None => self.entries.push(Entry {
                name: key.to_owned(),
                values: vec![value.into()],
            }),
        }
    }

    /// Append `value` under `key` unless an equal value (ignoring ASCII case) is already there.
    pub fn insert_unique(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if self.get_all(key).any(|v| v.eq_ignore_ascii_case(&value)) {
            return;
        }
        self.insert(key, value);
    }

    /// Replace every value of `key` with `value`.
    ///
    /// An existing key keeps its position.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        match self.position(key) {
            Some(idx) => {
                let values = &mut self.entries[idx].values;
                values.clear();
                values.push(value.into());
            }
            None => self.insert(key, value),
        }
    }

    /// Remove `key` with all of its values, returns `true` if the key was present.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Remove the `nth` value of `key`, dropping the key once it has no values left.
    pub fn remove_value(&mut self, key: &str, nth: usize) -> Option<String> {
        let idx = self.position(key)?;
        let values = &mut self.entries[idx].values;
        if nth >= values.len() {
            return None;
        }
        let removed = values.remove(nth);
        if values.is_empty() {
            self.entries.remove(idx);
        }
        Some(removed)
    }

    /// Union `other` into `self`.
    ///
    /// For every key of `other`, values already present are kept, new ones are appended in
    /// order, and duplicates are dropped.
    pub fn merge(&mut self, other: &HeaderSet) {
        for entry in &other.entries {
            for value in &entry.values {
                self.insert_unique(&entry.name, value.as_str());
            }
        }
    }

    /// Iterate keys with their values.
    pub fn iter(&self) -> Iter<'_> {
        Iter { iter: self.entries.iter() }
    }

    /// Iterate every `(key, value)` pair, one per value.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|e| e.values.iter().map(move |v| (e.name.as_str(), v.as_str())))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for HeaderSet {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut set = HeaderSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

impl std::fmt::Debug for HeaderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.pairs()).finish()
    }
}

// ===== Iterators =====

/// Iterator over the values of one key.
#[derive(Debug)]
pub struct Values<'a> {
    iter: std::slice::Iter<'a, String>,
}

impl<'a> Iterator for Values<'a> {
    type Item = &'a str;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(String::as_str)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl ExactSizeIterator for Values<'_> {}

/// Iterator over keys and their values.
#[derive(Debug)]
pub struct Iter<'a> {
    iter: std::slice::Iter<'a, Entry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a [String]);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|e| (e.name.as_str(), &e.values[..]))
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry").field("name", &self.name).field("values", &self.values).finish()
    }
}
