use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const BROWSER_UA: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
);

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs()))
            .build()
            .context("failed to build http client")
    })
}

fn request_timeout_secs() -> u64 {
    std::env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|val| val.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
        .max(1)
}

/// GETs `url` and returns the body, failing on any non-2xx status.
pub fn fetch_json(client: &Client, url: &str, extra_headers: &[(&str, &str)]) -> Result<String> {
    let mut req = client.get(url).header(USER_AGENT, BROWSER_UA);
    for (name, value) in extra_headers {
        req = req.header(*name, *value);
    }

    let resp = req.send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, truncate(&body, 200)));
    }
    Ok(body)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
