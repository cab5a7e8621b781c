//! Reference content cache — supplementary excerpt text used both to
//! ground the model's answers and to build the degraded fallback answer.
//!
//! A single background task refreshes the cache once per hour from the
//! guide blog. Request handlers only ever read the current snapshot; the
//! slot is replaced wholesale so a reader never observes a partial write.
//! On any refresh error the slot is deliberately reset to the static
//! corpus (fail safe to the static answer), overwriting older content.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{error, info, warn};

pub mod extract;

const REFRESH_INTERVAL: Duration = Duration::from_secs(3600);
const FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Total cap on cached reference content, in characters.
const MAX_CONTEXT_CHARS: usize = 6000;

const SOURCE_URLS: &[&str] = &[
    "https://abdyasam.blogspot.com/",
    "https://abdyasam.blogspot.com/search?max-results=20",
];

/// Static corpus served before the first successful fetch and written
/// into the cache whenever a refresh cycle fails.
pub const FALLBACK_GUIDE: &str = "\
[TAX] Rideshare tax forms are released at the end of January. 1099-K, 1099-NEC required.
Don't write \"exempt\" on W-4, you'll lose your refund.
[VISA] F-1 holders can travel to neighboring countries (Automatic Visa Revalidation).
J-1 visa application: Get DS-2019, pay SEVIS, schedule consulate appointment.
[PHONE] You can get a free line through the Lifeline program.
Get a US number without SSN using Google Voice.
[HEALTH] NJ Medicaid is free for low income. Free clinics available in NY.
[BANK] Chase and BofA open accounts with passport. Start credit score with a secured card.
[RIDESHARE] Uber/Lyft requires SSN + driver's license + car insurance. Expect 1099 form in January.
[HOUSING] NJ Newark/Paterson 1BR $900-1200. Try Craigslist, Zillow, Facebook Marketplace.
[WISE] International transfer limits $50k/year. Wise > Western Union.
[LICENSE] NJ has 6 Points of ID system. Even undocumented can get a license.
[FLIGHTS] International flights from NJ $400-700. Pay excess baggage 24 hours before flight for cheaper rate.";

/// Single-slot store for the current reference snapshot.
///
/// Written only by the background refresh task; read by every request
/// thread. Empty slot means "no fetch has succeeded yet".
pub struct ReferenceCache {
    content: RwLock<String>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self {
            content: RwLock::new(String::new()),
        }
    }

    /// Current reference text. Never empty: substitutes the static corpus
    /// until the first successful refresh.
    pub fn context(&self) -> String {
        let guard = self.content.read().unwrap_or_else(|e| e.into_inner());
        if guard.is_empty() {
            FALLBACK_GUIDE.to_string()
        } else {
            guard.clone()
        }
    }

    /// Replaces the snapshot wholesale.
    pub fn replace(&self, content: String) {
        let mut guard = self.content.write().unwrap_or_else(|e| e.into_inner());
        *guard = content;
    }
}

impl Default for ReferenceCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs for the lifetime of the process; spawned once at startup.
pub async fn refresh_loop(cache: Arc<ReferenceCache>) {
    let http = match browser_client() {
        Ok(client) => client,
        Err(e) => {
            // Without a client there is nothing to refresh; the static
            // corpus keeps serving via `context()`.
            error!("Could not build reference fetch client: {e}");
            return;
        }
    };

    loop {
        refresh_once(&http, &cache, SOURCE_URLS).await;
        tokio::time::sleep(REFRESH_INTERVAL).await;
    }
}

/// One refresh cycle. Per-source HTTP failures skip that source only; a
/// transport error anywhere resets the cache to the static corpus.
async fn refresh_once(http: &reqwest::Client, cache: &ReferenceCache, urls: &[&str]) {
    match fetch_sources(http, urls).await {
        Ok(combined) if !combined.is_empty() => {
            let content = truncate_chars(&combined, MAX_CONTEXT_CHARS).to_string();
            info!("Reference content refreshed ({} chars)", content.len());
            cache.replace(content);
        }
        Ok(_) => {
            // Pages fetched but no usable blocks; keep whatever we had.
            warn!("Reference refresh extracted no content; keeping previous snapshot");
        }
        Err(e) => {
            error!("Reference fetch failed; resetting to static guide: {e}");
            cache.replace(FALLBACK_GUIDE.to_string());
        }
    }
}

async fn fetch_sources(http: &reqwest::Client, urls: &[&str]) -> Result<String, reqwest::Error> {
    let mut combined = String::new();

    for url in urls {
        let response = http.get(*url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Reference fetch returned status {status} for {url}");
            continue;
        }

        let html = response.text().await?;
        for block in extract::post_blocks(&html) {
            combined.push_str(&block);
            combined.push_str("\n---\n");
        }
    }

    Ok(combined)
}

fn browser_client() -> Result<reqwest::Client, reqwest::Error> {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, REFERER};

    // Blogspot serves a consent interstitial to clients without
    // browser-like headers.
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));

    reqwest::Client::builder()
        .user_agent(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120 Safari/537.36",
        )
        .default_headers(headers)
        .timeout(FETCH_TIMEOUT)
        .build()
}

/// Truncates to at most `max` characters, respecting char boundaries.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
