use anyhow::{anyhow, Context, Result};

use crate::layout::engine::{LayoutOptions, OversizePolicy, DEFAULT_MAX_PAGES};

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Safety bound on pages per section (`LAYOUT_MAX_PAGES`).
    pub max_pages: u32,
    /// `force_place` or `reject` (`LAYOUT_OVERSIZE_POLICY`).
    pub oversize_policy: OversizePolicy,
    /// Default character width of rendered TOC lines (`TOC_LINE_WIDTH`).
    pub toc_line_width: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_pages: parse_env("LAYOUT_MAX_PAGES", DEFAULT_MAX_PAGES)?,
            oversize_policy: match std::env::var("LAYOUT_OVERSIZE_POLICY") {
                Ok(value) => parse_oversize_policy(&value)?,
                Err(_) => OversizePolicy::default(),
            },
            toc_line_width: parse_env("TOC_LINE_WIDTH", 72)?,
        })
    }

    /// Layout options applied when a request does not carry its own.
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            oversize_policy: self.oversize_policy,
            max_pages: self.max_pages,
            ..LayoutOptions::default()
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_oversize_policy(raw: &str) -> Result<OversizePolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "force_place" => Ok(OversizePolicy::ForcePlace),
        "reject" => Ok(OversizePolicy::Reject),
        other => Err(anyhow!(
            "LAYOUT_OVERSIZE_POLICY must be 'force_place' or 'reject', got '{other}'"
        )),
    }
}
