//! HTTP client construction with User-Agent rotation.
//!
//! Every outbound surface (search backend, liveness probe, page reader)
//! builds its client here, getting browser-like headers, cookie support,
//! and a rotating User-Agent so repeated pipeline calls do not present a
//! single fingerprint.

use rand::seq::SliceRandom;
use std::time::Duration;

/// Realistic desktop browser User-Agent strings, rotated per request.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/136.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/136.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/136.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:138.0) Gecko/20100101 Firefox/138.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:138.0) Gecko/20100101 Firefox/138.0",
];

/// Build a [`reqwest::Client`] for one outbound call.
///
/// The client has:
/// - Cookie store enabled (consent walls on fetched pages)
/// - The given per-call timeout
/// - A random User-Agent from the rotation list (or the custom one if given)
/// - Brotli and gzip decompression
///
/// Callers map or absorb the build error according to their own failure
/// policy, which is why this returns the raw [`reqwest::Result`].
pub(crate) fn build_client(
    timeout_seconds: u64,
    user_agent: Option<&str>,
) -> reqwest::Result<reqwest::Client> {
    let ua = match user_agent {
        Some(custom) => custom.to_owned(),
        None => random_user_agent().to_owned(),
    };

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
}

/// Select a random User-Agent string from the rotation list.
pub(crate) fn random_user_agent() -> &'static str {
    // choose returns None only on an empty slice; the list is a non-empty const.
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}
