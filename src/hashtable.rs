//! Chained hash map with a fixed number of buckets.
//!
//! Each key hashes to one bucket; colliding entries are chained in that bucket in
//! insertion order. Iteration visits buckets in index order and each chain front to
//! back, so it is deterministic for a given set of insertions. The bucket array is
//! only allocated on the first insertion, which keeps empty maps (such as the frame
//! of a procedure without parameters) free.
//!
//! Unlike `std::collections::HashMap`, [`ChainedHashMap::insert`] never overwrites:
//! inserting a key that is already present leaves the map unchanged and reports it.

use std::borrow::Borrow;
use std::fmt;
use std::iter::FusedIterator;

/// Bucket count used by [`ChainedHashMap::new`]
pub const DEFAULT_BUCKETS: usize = 2011;

/// Keys that can pick their own bucket.
pub trait BucketHash {
    /// Raw hash; reduced modulo the bucket count by the map
    fn bucket_hash(&self) -> u64;
}

/// Positional-weighted byte sum: `sum(byte[i] * (i + 1))`
impl BucketHash for str {
    fn bucket_hash(&self) -> u64 {
        self.bytes().enumerate().fold(0u64, |hash, (i, byte)| {
            hash.wrapping_add(u64::from(byte).wrapping_mul(i as u64 + 1))
        })
    }
}

impl BucketHash for String {
    fn bucket_hash(&self) -> u64 {
        self.as_str().bucket_hash()
    }
}

impl BucketHash for i64 {
    fn bucket_hash(&self) -> u64 {
        *self as u64
    }
}

/// Hash map with open hashing over a fixed bucket array
#[derive(Clone)]
pub struct ChainedHashMap<K, V> {
    buckets: Vec<Vec<(K, V)>>,
    bucket_count: usize,
    len: usize,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: BucketHash + Eq,
{
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// Create a map with a fixed bucket count (at least one)
    pub fn with_buckets(bucket_count: usize) -> Self {
        ChainedHashMap {
            buckets: Vec::new(),
            bucket_count: bucket_count.max(1),
            len: 0,
        }
    }

    fn bucket_index<Q>(&self, key: &Q) -> usize
    where
        Q: BucketHash + ?Sized,
    {
        (key.bucket_hash() % self.bucket_count as u64) as usize
    }

    fn chain<Q>(&self, key: &Q) -> Option<&Vec<(K, V)>>
    where
        K: Borrow<Q>,
        Q: BucketHash + Eq + ?Sized,
    {
        self.buckets.get(self.bucket_index(key))
    }

    /// Insert a new entry. Returns `false` and leaves the map untouched when the
    /// key is already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.contains_key(&key) {
            return false;
        }
        if self.buckets.is_empty() {
            self.buckets.resize_with(self.bucket_count, Vec::new);
        }
        let index = self.bucket_index(&key);
        self.buckets[index].push((key, value));
        self.len += 1;
        true
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: BucketHash + Eq + ?Sized,
    {
        self.chain(key)?
            .iter()
            .find(|(k, _)| k.borrow() == key)
            .map(|(_, v)| v)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: BucketHash + Eq + ?Sized,
    {
        let index = self.bucket_index(key);
        self.buckets
            .get_mut(index)?
            .iter_mut()
            .find(|(k, _)| k.borrow() == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: BucketHash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Remove an entry, returning its value
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: BucketHash + Eq + ?Sized,
    {
        let index = self.bucket_index(key);
        let chain = self.buckets.get_mut(index)?;
        let position = chain.iter().position(|(k, _)| k.borrow() == key)?;
        self.len -= 1;
        Some(chain.remove(position).1)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Drop every entry and release the bucket array
    pub fn clear(&mut self) {
        self.buckets = Vec::new();
        self.len = 0;
    }

    /// Entries in bucket order, then chain order. Each call starts afresh.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: [].iter(),
            remaining: self.len,
        }
    }
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: BucketHash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ChainedHashMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.buckets
                    .iter()
                    .flatten()
                    .map(|(k, v)| (k, v)),
            )
            .finish()
    }
}

/// Iterator over the entries of a [`ChainedHashMap`]
pub struct Iter<'a, K, V> {
    buckets: std::slice::Iter<'a, Vec<(K, V)>>,
    chain: std::slice::Iter<'a, (K, V)>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((k, v)) = self.chain.next() {
                self.remaining -= 1;
                return Some((k, v));
            }
            self.chain = self.buckets.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a ChainedHashMap<K, V>
where
    K: BucketHash + Eq,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
