//! Fixed-capacity leaf of a directory trie.

slotmap::new_key_type! {
    /// Arena key of a bucket inside its directory.
    pub(crate) struct BucketKey;
}

#[derive(Debug, Clone)]
pub(crate) struct Bucket {
    /// Canonical address: the lowest directory slot referencing this bucket.
    pub(crate) id: usize,
    /// Number of low hash bits shared by every key this bucket can hold.
    pub(crate) depth: u32,
    capacity: usize,
    keys: Vec<i64>,
}

impl Bucket {
    pub(crate) fn new(id: usize, depth: u32, capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            id,
            depth,
            capacity,
            keys: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub(crate) fn keys(&self) -> &[i64] {
        &self.keys
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.keys.len() >= self.capacity
    }

    #[inline]
    pub(crate) fn contains(&self, key: i64) -> bool {
        self.keys.contains(&key)
    }

    /// Append `key` if there is room; hands it back otherwise.
    pub(crate) fn try_push(&mut self, key: i64) -> Result<(), i64> {
        if self.is_full() {
            return Err(key);
        }
        self.keys.push(key);
        Ok(())
    }

    /// Overwrite the key at `index` with `key`, returning the previous occupant.
    pub(crate) fn replace(&mut self, index: usize, key: i64) -> i64 {
        core::mem::replace(&mut self.keys[index], key)
    }

    /// Drop `key` if present, keeping the order of the rest.
    pub(crate) fn remove(&mut self, key: i64) -> bool {
        match self.keys.iter().position(|&k| k == key) {
            Some(i) => {
                self.keys.remove(i);
                true
            }
            None => false,
        }
    }

    /// Empty the bucket, returning its keys in stored order.
    pub(crate) fn take_keys(&mut self) -> Vec<i64> {
        core::mem::replace(&mut self.keys, Vec::with_capacity(self.capacity))
    }
}
