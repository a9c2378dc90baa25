//! Upload Showdown team text to a pokepaste-style service.
//!
//! The service answers a form POST to `/create` with a redirect to the new
//! paste; the redirect target is the only thing read from the response.

pub mod error;

use std::time::Duration;

use reqwest::{Client, StatusCode, header::LOCATION, redirect::Policy};
use tracing::{debug, info};

pub use error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://pokepast.es";
pub const DEFAULT_AUTHOR: &str = "PokemonTeamBuilder";

/// Longest response body quoted back in [`Error::Rejected`].
const MAX_ERROR_BODY: usize = 500;

// ─── Request ──────────────────────────────────────────────────────────────────

/// A team to publish along with its paste metadata.
#[derive(Debug, Clone)]
pub struct PasteRequest {
  pub text:   String,
  pub title:  String,
  pub author: String,
  pub notes:  String,
  /// Public pastes are listed; otherwise the paste is unlisted.
  pub public: bool,
}

impl PasteRequest {
  pub fn new(text: impl Into<String>) -> Self {
    Self {
      text:   text.into(),
      title:  "My Showdown Team".to_owned(),
      author: String::new(),
      notes:  String::new(),
      public: true,
    }
  }

  /// Metadata for a generated team of `tier`.
  pub fn for_tier(text: impl Into<String>, tier: &str, author: &str) -> Self {
    Self {
      title: format!("Random {tier} Team"),
      author: author.to_owned(),
      notes: format!("Randomly generated {tier} team"),
      ..Self::new(text)
    }
  }

  fn visibility(&self) -> &'static str {
    if self.public { "public" } else { "unlisted" }
  }
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async client for the paste service.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct PasteClient {
  client:   Client,
  base_url: String,
}

impl PasteClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .redirect(Policy::none())
      .build()?;
    Ok(Self { client, base_url: base_url.into() })
  }

  /// Publish `request` and return the URL of the new paste.
  pub async fn upload(&self, request: &PasteRequest) -> Result<String> {
    if request.text.trim().is_empty() {
      return Err(Error::EmptyTeam);
    }

    let endpoint = format!("{}/create", self.base_url.trim_end_matches('/'));
    let paste = normalize_line_endings(&request.text);
    let form = [
      ("paste", paste.as_str()),
      ("title", request.title.as_str()),
      ("author", request.author.as_str()),
      ("notes", request.notes.as_str()),
      ("visibility", request.visibility()),
    ];

    debug!(%endpoint, bytes = paste.len(), "uploading paste");
    let resp = self.client.post(&endpoint).form(&form).send().await?;
    let status = resp.status();

    let location = resp
      .headers()
      .get(LOCATION)
      .and_then(|v| v.to_str().ok())
      .map(str::to_owned);

    match location {
      Some(location) if is_created_redirect(status) => {
        let url = resolve_location(&self.base_url, &location);
        info!(%url, "paste created");
        Ok(url)
      }
      _ => {
        let body = resp.text().await.unwrap_or_default();
        Err(Error::Rejected {
          status: status.as_u16(),
          body:   body.chars().take(MAX_ERROR_BODY).collect(),
        })
      }
    }
  }
}

fn is_created_redirect(status: StatusCode) -> bool {
  matches!(
    status,
    StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER
  )
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Convert any line endings to CRLF and guarantee a trailing CRLF, matching
/// what a browser form submission sends.
pub fn normalize_line_endings(text: &str) -> String {
  let mut out = text
    .replace("\r\n", "\n")
    .replace('\r', "\n")
    .replace('\n', "\r\n");
  if !out.ends_with("\r\n") {
    out.push_str("\r\n");
  }
  out
}

/// Turn a `Location` header into an absolute URL.
pub fn resolve_location(base_url: &str, location: &str) -> String {
  if location.starts_with('/') {
    format!("{}{location}", base_url.trim_end_matches('/'))
  } else {
    location.to_owned()
  }
}
