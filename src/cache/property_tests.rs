//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the storage against a simple sequential model.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};

use http::header::{HeaderValue, ACCEPT_LANGUAGE, VARY};
use http::StatusCode;

use crate::cache::{CacheItem, CacheStore, Key};
use crate::models::{CacheRequest, HttpResponse};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const LANGUAGES: [&str; 4] = ["en", "fr", "de", "ja"];

// == Strategies ==
/// Generates URI paths from a small alphabet so operations collide
fn path_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}".prop_map(|s| s)
}

/// Generates non-empty bodies
fn body_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..256)
}

fn lang_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(LANGUAGES.to_vec())
}

/// Generates a sequence of storage operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Insert { path: String, lang: &'static str, body: Vec<u8> },
    Get { path: String, lang: &'static str },
    InvalidateUri { path: String },
    InvalidateKey { path: String, lang: &'static str },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (path_strategy(), lang_strategy(), body_strategy())
            .prop_map(|(path, lang, body)| CacheOp::Insert { path, lang, body }),
        (path_strategy(), lang_strategy()).prop_map(|(path, lang)| CacheOp::Get { path, lang }),
        path_strategy().prop_map(|path| CacheOp::InvalidateUri { path }),
        (path_strategy(), lang_strategy())
            .prop_map(|(path, lang)| CacheOp::InvalidateKey { path, lang }),
    ]
}

// == Helpers ==
fn uri(path: &str) -> String {
    format!("http://example.com/{}", path)
}

fn request(path: &str, lang: &'static str) -> CacheRequest {
    CacheRequest::parse(&uri(path))
        .unwrap()
        .with_header(ACCEPT_LANGUAGE, HeaderValue::from_static(lang))
}

fn response(body: &[u8]) -> HttpResponse {
    HttpResponse::streaming(StatusCode::OK, Cursor::new(body.to_vec()), "application/octet-stream")
        .with_header(VARY, HeaderValue::from_static("Accept-Language"))
}

fn key(path: &str, lang: &'static str) -> Key {
    Key::create(&request(path, lang), &response(b"x"))
}

fn body(item: &CacheItem) -> Vec<u8> {
    let mut buf = Vec::new();
    item.response()
        .payload()
        .unwrap()
        .open()
        .unwrap()
        .read_to_end(&mut buf)
        .unwrap();
    buf
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // **Property 1: Model Agreement**
    // *For any* sequence of operations on a store that never fills up, every
    // lookup SHALL return exactly what a plain (path, language) map would.
    #[test]
    fn prop_matches_sequential_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let store = CacheStore::new(TEST_MAX_ENTRIES).unwrap();
        let mut model: HashMap<(String, &'static str), Vec<u8>> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Insert { path, lang, body } => {
                    store.insert(&request(&path, lang), response(&body)).unwrap();
                    model.insert((path, lang), body);
                }
                CacheOp::Get { path, lang } => {
                    let found = store.get_for_request(&request(&path, lang)).map(|item| body(&item));
                    prop_assert_eq!(found.as_ref(), model.get(&(path, lang)));
                }
                CacheOp::InvalidateUri { path } => {
                    store.invalidate_uri(&url::Url::parse(&uri(&path)).unwrap());
                    model.retain(|(p, _), _| p != &path);
                }
                CacheOp::InvalidateKey { path, lang } => {
                    store.invalidate_key(&key(&path, lang));
                    model.remove(&(path, lang));
                }
            }
        }

        let paths: HashSet<&String> = model.keys().map(|(p, _)| p).collect();
        prop_assert_eq!(store.size(), paths.len(), "One family per stored path");
        prop_assert_eq!(store.keys().count(), model.len(), "One key per stored variant");
    }

    // **Property 2: Statistics Accuracy**
    // *For any* sequence of operations, hits and misses SHALL reflect the
    // lookups that were made.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let store = CacheStore::new(TEST_MAX_ENTRIES).unwrap();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Insert { path, lang, body } => {
                    store.insert(&request(&path, lang), response(&body)).unwrap();
                }
                CacheOp::Get { path, lang } => {
                    match store.get(&key(&path, lang)) {
                        Some(_) => expected_hits += 1,
                        None => expected_misses += 1,
                    }
                }
                CacheOp::InvalidateUri { path } => {
                    store.invalidate_uri(&url::Url::parse(&uri(&path)).unwrap());
                }
                CacheOp::InvalidateKey { path, lang } => {
                    store.invalidate_key(&key(&path, lang));
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, store.size(), "Total entries mismatch");
    }

    // **Property 3: Round-trip Body Consistency**
    // *For any* non-empty body, inserting and then fetching by key SHALL
    // return the same bytes, as many times as it is read.
    #[test]
    fn prop_roundtrip_body(path in path_strategy(), lang in lang_strategy(), data in body_strategy()) {
        let store = CacheStore::new(TEST_MAX_ENTRIES).unwrap();
        let req = request(&path, lang);

        let stored = store.insert(&req, response(&data)).unwrap();
        let item = store.get(&Key::create(&req, &stored)).unwrap();

        prop_assert_eq!(body(&item), data.clone());
        prop_assert_eq!(body(&item), data);
    }

    // **Property 4: Overwrite Semantics**
    // *For any* key, inserting B1 then B2 SHALL leave exactly one item holding B2.
    #[test]
    fn prop_overwrite_semantics(
        path in path_strategy(),
        lang in lang_strategy(),
        body1 in body_strategy(),
        body2 in body_strategy()
    ) {
        let store = CacheStore::new(TEST_MAX_ENTRIES).unwrap();
        let req = request(&path, lang);

        store.insert(&req, response(&body1)).unwrap();
        store.insert(&req, response(&body2)).unwrap();

        prop_assert_eq!(body(&store.get(&key(&path, lang)).unwrap()), body2);
        prop_assert_eq!(store.keys().count(), 1, "Should have exactly one variant after overwrite");
    }

    // **Property 5: Capacity Enforcement**
    // *For any* sequence of inserts, the number of URIs SHALL never exceed
    // the configured maximum.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((path_strategy(), lang_strategy()), 1..200),
        max_entries in 1usize..8
    ) {
        let store = CacheStore::new(max_entries).unwrap();

        for (path, lang) in entries {
            store.insert(&request(&path, lang), response(b"v")).unwrap();
            prop_assert!(
                store.size() <= max_entries,
                "Store size {} exceeds max {}",
                store.size(),
                max_entries
            );
        }
    }
}

// Property tests for LRU eviction behavior
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // **Property 6: LRU Eviction Order**
    // *For any* store filled to capacity, admitting a new URI SHALL evict the
    // URI used least recently, and only that one.
    #[test]
    fn prop_lru_eviction_order(
        paths in prop::collection::hash_set("[a-z]{3,8}", 2..10),
        accessed in any::<prop::sample::Index>()
    ) {
        let paths: Vec<String> = paths.into_iter().collect();
        let capacity = paths.len();
        let store = CacheStore::new(capacity).unwrap();

        for path in &paths {
            store.insert(&request(path, "en"), response(b"v")).unwrap();
        }

        // Touch one URI; the oldest untouched one becomes the victim
        let touched = accessed.index(capacity);
        store.get(&key(&paths[touched], "en")).unwrap();
        let victim = if touched == 0 { 1 } else { 0 };

        store.insert(&request("new-entry", "en"), response(b"v")).unwrap();

        prop_assert_eq!(store.size(), capacity, "Store should remain at capacity");
        prop_assert!(store.get(&key(&paths[victim], "en")).is_none());
        for (i, path) in paths.iter().enumerate() {
            if i != victim {
                prop_assert!(store.get(&key(path, "en")).is_some(), "'{}' should survive", path);
            }
        }
        prop_assert!(store.get(&key("new-entry", "en")).is_some());
    }
}

// == Property Test for Concurrent Operation Correctness ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // **Property 7: Concurrent Structural Integrity**
    // *For any* operations spread over several threads, once they finish the
    // store SHALL respect its capacity, hold no empty family, and serve every
    // key it lists with a complete body.
    #[test]
    fn prop_concurrent_structural_integrity(
        per_thread in prop::collection::vec(prop::collection::vec(cache_op_strategy(), 10..40), 2..5),
        max_entries in 2usize..10
    ) {
        let store = CacheStore::new(max_entries).unwrap();
        let bodies: HashSet<Vec<u8>> = per_thread
            .iter()
            .flatten()
            .filter_map(|op| match op {
                CacheOp::Insert { body, .. } => Some(body.clone()),
                _ => None,
            })
            .collect();

        std::thread::scope(|scope| {
            for ops in &per_thread {
                let store = &store;
                scope.spawn(move || {
                    for op in ops {
                        match op {
                            CacheOp::Insert { path, lang, body } => {
                                store.insert(&request(path, *lang), response(body)).unwrap();
                            }
                            CacheOp::Get { path, lang } => {
                                let _ = store.get_for_request(&request(path, *lang));
                            }
                            CacheOp::InvalidateUri { path } => {
                                store.invalidate_uri(&url::Url::parse(&uri(path)).unwrap());
                            }
                            CacheOp::InvalidateKey { path, lang } => {
                                store.invalidate_key(&key(path, *lang));
                            }
                        }
                    }
                });
            }
        });

        prop_assert!(store.size() <= max_entries, "Store should not exceed max entries");
        for stored in store.keys() {
            prop_assert!(store.variant_count(stored.uri()) > 0, "No family may be empty");
            let item = store.get(&stored).unwrap();
            prop_assert!(bodies.contains(&body(&item)), "Body must be one that was inserted");
        }
    }
}
