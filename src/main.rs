//! Vary Cache soak driver
//!
//! Hammers a store from several threads with a mix of inserts, lookups and
//! invalidations, then prints the resulting statistics as JSON.

use std::env;
use std::io::Cursor;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use http::header::{HeaderValue, ACCEPT_LANGUAGE, VARY};
use http::StatusCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vary_cache::{CacheRequest, CacheStore, Config, HttpResponse};

const LANGUAGES: [&str; 3] = ["en", "fr", "de"];

/// Soak parameters, read from the environment like the store configuration.
///
/// # Environment Variables
/// - `SOAK_THREADS` - Worker threads (default: 4)
/// - `SOAK_SECONDS` - Run time in seconds (default: 5)
/// - `SOAK_URIS` - Distinct URIs to cycle through (default: 2000)
struct SoakConfig {
    threads: usize,
    duration: Duration,
    uris: usize,
}

impl SoakConfig {
    fn from_env() -> Self {
        let var = |name: &str, default: u64| {
            env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };
        Self {
            threads: var("SOAK_THREADS", 4).max(1) as usize,
            duration: Duration::from_secs(var("SOAK_SECONDS", 5)),
            uris: var("SOAK_URIS", 2000).max(1) as usize,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vary_cache=info,vary_cache_soak=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let soak = SoakConfig::from_env();
    info!(
        "Configuration loaded: max_entries={}, eviction_threads={}, policy={}",
        config.max_entries, config.eviction_threads, config.policy
    );

    let store = CacheStore::from_config(&config).context("failed to start cache store")?;
    let deadline = Instant::now() + soak.duration;

    info!(
        "Running {} thread(s) over {} URIs for {:?}",
        soak.threads, soak.uris, soak.duration
    );
    thread::scope(|scope| {
        for worker in 0..soak.threads {
            let store = &store;
            let uris = soak.uris;
            scope.spawn(move || run_worker(store, worker, uris, deadline));
        }
    });

    let stats = store.stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);
    info!("Hit rate: {:.2}%", stats.hit_rate() * 100.0);

    store.shutdown();
    Ok(())
}

/// Picks URIs pseudo-randomly until `deadline`, mixing operations 3:1:6 (insert, invalidate, lookup).
fn run_worker(store: &CacheStore, worker: usize, uris: usize, deadline: Instant) {
    let mut step = worker as u64;
    let mut iteration = 0usize;
    while Instant::now() < deadline {
        step = step.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        iteration += 1;

        let uri = format!("http://soak.local/resource/{}", (step >> 33) % uris as u64);
        let lang = LANGUAGES[((step >> 17) % LANGUAGES.len() as u64) as usize];
        let Ok(request) = CacheRequest::parse(&uri) else {
            break;
        };
        let request = request.with_header(ACCEPT_LANGUAGE, HeaderValue::from_static(lang));

        match iteration % 10 {
            0..=2 => {
                let body = format!("{} in {}", uri, lang).into_bytes();
                let response = HttpResponse::streaming(StatusCode::OK, Cursor::new(body), "text/plain")
                    .with_header(VARY, HeaderValue::from_static("Accept-Language"));
                let _ = store.insert(&request, response);
            }
            3 => store.invalidate_uri(request.normalized_uri()),
            _ => {
                let _ = store.get_for_request(&request);
            }
        }
    }
}
