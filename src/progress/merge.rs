use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Merge a canonical remote list over the local one.
///
/// One output item per remote item, in remote order: the local item when its
/// key is known locally (progress kept), the remote item otherwise. Items
/// that exist only locally are dropped. A key repeated in the remote list is
/// kept once (first occurrence), so keys stay unique. Running it twice with
/// the same remote list gives the same result.
pub fn merge_remote<T, K, F>(local: &[T], remote: Vec<T>, key_of: F) -> Vec<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut by_key: HashMap<K, &T> = HashMap::with_capacity(local.len());
    for item in local {
        // First occurrence wins, matching a key lookup over the stored order.
        by_key.entry(key_of(item)).or_insert(item);
    }

    let mut seen: HashSet<K> = HashSet::with_capacity(remote.len());
    let mut merged = Vec::with_capacity(remote.len());
    for item in remote {
        let key = key_of(&item);
        let resolved = match by_key.get(&key) {
            Some(existing) => (*existing).clone(),
            None => item,
        };
        if seen.insert(key) {
            merged.push(resolved);
        }
    }
    merged
}
