//! Error type for `tierteam-paste`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("no team text provided")]
  EmptyTeam,

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The service answered without redirecting to a new paste.
  #[error("paste rejected: status {status}, response: {body}")]
  Rejected { status: u16, body: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
