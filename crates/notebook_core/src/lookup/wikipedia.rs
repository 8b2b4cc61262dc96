//! Wikipedia-backed [`EncyclopediaLookup`].
//!
//! Two requests per lookup: an `opensearch` for the best title/link, then a
//! `query&prop=extracts` for the intro text.

use super::{first_paragraph, EncyclopediaLookup, LookupError, LookupHit, LookupResult};
use log::{info, warn};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::{Duration, Instant};

pub const DEFAULT_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";
const USER_AGENT: &str = concat!("notebook-rpc/", env!("CARGO_PKG_VERSION"));

/// Blocking Wikipedia API client.
#[derive(Debug, Clone)]
pub struct WikipediaLookup {
    client: Client,
    endpoint: String,
}

impl WikipediaLookup {
    /// Builds a client for `endpoint` with a per-request `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> LookupResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| LookupError::Transport(format!("client setup failed: {err}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn get_json(&self, params: &[(&str, &str)]) -> LookupResult<Value> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(params)
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(|err| LookupError::Transport(err.to_string()))?;
        response
            .json::<Value>()
            .map_err(|err| LookupError::Malformed(format!("invalid JSON body: {err}")))
    }
}

impl EncyclopediaLookup for WikipediaLookup {
    fn lookup(&self, term: &str) -> LookupResult<LookupHit> {
        let started_at = Instant::now();
        let search = self.get_json(&[
            ("action", "opensearch"),
            ("search", term),
            ("limit", "1"),
            ("namespace", "0"),
            ("format", "json"),
        ]);
        let search = match search.and_then(|value| parse_search_response(&value)) {
            Ok(Some(found)) => found,
            Ok(None) => {
                info!("event=lookup module=wikipedia status=not_found term={term:?}");
                return Err(LookupError::NotFound(term.to_string()));
            }
            Err(err) => {
                warn!("event=lookup module=wikipedia status=error stage=search error={err}");
                return Err(err);
            }
        };
        let (title, link) = search;

        let extract = self
            .get_json(&[
                ("action", "query"),
                ("format", "json"),
                ("titles", title.as_str()),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
            ])
            .and_then(|value| parse_extract_response(&value))
            .map_err(|err| {
                warn!("event=lookup module=wikipedia status=error stage=extract error={err}");
                err
            })?;

        info!(
            "event=lookup module=wikipedia status=ok title={title:?} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(LookupHit {
            title,
            link,
            summary: first_paragraph(extract.as_deref()),
        })
    }

    fn source_label(&self) -> &str {
        "Wikipedia"
    }
}

/// Reads `[term, [titles], [descriptions], [links]]`.
///
/// Returns `Ok(None)` when the title list is empty.
pub fn parse_search_response(value: &Value) -> LookupResult<Option<(String, String)>> {
    let parts = value
        .as_array()
        .filter(|parts| parts.len() >= 4)
        .ok_or_else(|| LookupError::Malformed("opensearch result is not a 4-element array".into()))?;

    let first_string = |index: usize| -> LookupResult<Option<String>> {
        let list = parts[index].as_array().ok_or_else(|| {
            LookupError::Malformed(format!("opensearch element {index} is not an array"))
        })?;
        match list.first() {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(_) => Err(LookupError::Malformed(format!(
                "opensearch element {index} holds a non-string"
            ))),
        }
    };

    let Some(title) = first_string(1)? else {
        return Ok(None);
    };
    let link = first_string(3)?
        .ok_or_else(|| LookupError::Malformed("opensearch returned a title without a link".into()))?;
    Ok(Some((title, link)))
}

/// Reads `query.pages.<id>.extract`; a missing extract is `Ok(None)`.
pub fn parse_extract_response(value: &Value) -> LookupResult<Option<String>> {
    let pages = value
        .get("query")
        .and_then(|query| query.get("pages"))
        .and_then(Value::as_object)
        .ok_or_else(|| LookupError::Malformed("extract result has no query.pages".into()))?;

    let page = pages
        .values()
        .next()
        .ok_or_else(|| LookupError::Malformed("extract result has no pages".into()))?;

    Ok(page
        .get("extract")
        .and_then(Value::as_str)
        .map(str::to_string))
}
