//! Merging canonical results with projected legacy results.
//!
//! Rules, applied per key:
//! - a canonical record always wins over a legacy record with the same key;
//! - a legacy record whose key is a canonical tombstone is dropped;
//! - each key appears at most once.
//!
//! Output order is canonical records first, then surviving legacy records;
//! callers re-sort.

use std::collections::HashSet;
use std::hash::Hash;

use uuid::Uuid;

use crate::model::{Game, Genre, Order, Publisher};

fn merge_by<T, K, F>(canonical: Vec<T>, legacy: Vec<T>, deleted: &HashSet<K>, key_of: F) -> Vec<T>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut seen: HashSet<K> = HashSet::with_capacity(canonical.len() + legacy.len());
    let mut merged = Vec::with_capacity(canonical.len() + legacy.len());

    for record in canonical {
        if seen.insert(key_of(&record)) {
            merged.push(record);
        }
    }
    for record in legacy {
        let key = key_of(&record);
        if deleted.contains(&key) {
            continue;
        }
        if seen.insert(key) {
            merged.push(record);
        }
    }
    merged
}

/// Merge games by key.
pub fn map_games_by_key(
    canonical: Vec<Game>,
    legacy: Vec<Game>,
    deleted_keys: &HashSet<String>,
) -> Vec<Game> {
    merge_by(canonical, legacy, deleted_keys, |g| g.key.clone())
}

/// Merge genres by name.
pub fn map_genres_by_name(
    canonical: Vec<Genre>,
    legacy: Vec<Genre>,
    deleted_names: &HashSet<String>,
) -> Vec<Genre> {
    merge_by(canonical, legacy, deleted_names, |g| g.name.clone())
}

/// Merge publishers by company name.
pub fn map_publishers_by_company_name(
    canonical: Vec<Publisher>,
    legacy: Vec<Publisher>,
    deleted_names: &HashSet<String>,
) -> Vec<Publisher> {
    merge_by(canonical, legacy, deleted_names, |p| p.company_name.clone())
}

/// Merge orders by id. Orders carry no tombstones.
pub fn map_orders_by_id(canonical: Vec<Order>, legacy: Vec<Order>) -> Vec<Order> {
    merge_by(canonical, legacy, &HashSet::<Uuid>::new(), |o| o.id)
}
