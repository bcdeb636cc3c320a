use std::io;

use thiserror::Error;

/// Error type for sift operations that touch I/O or serialization.
///
/// The filtering passes themselves are total functions; this type only
/// surfaces from policy loading and DOM serialization helpers.
#[derive(Debug, Error)]
pub enum FilterError {
  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("Serde error: {0}")]
  Serde(#[from] serde_json::Error),
}
