//! Error types.
//!
//! Each stage boundary has its own type: [`EngineError`] for failures inside a
//! transaction engine, [`GenerationError`] for the orchestrator (which only
//! records *where* the engine failed), and [`Error`] for the full run,
//! including input resolution.

use std::{
   io,
   path::PathBuf,
};

use thiserror::Error;

/// Failure class of a run, for callers that branch on kind rather than text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
   /// An input file does not resolve to an existing regular file.
   NotFound,
   /// An input file exists but could not be read or decoded.
   Read,
   /// The engine could not bind to the parsed document.
   EngineInit,
   /// The engine failed while computing the token.
   Engine,
}

/// Failures raised by a transaction engine.
#[derive(Debug, Error)]
pub enum EngineError {
   /// Malformed key material or animation data.
   #[error("parse error: {0}")]
   Parse(String),
   /// Required key or attribute not found.
   #[error("missing required key: {0}")]
   MissingKey(String),
   /// Base64 decoding failed.
   #[error("base64 decode error: {0}")]
   Base64(#[from] data_encoding::DecodeError),
   /// Method or path was empty.
   #[error("invalid argument: {0} must not be empty")]
   InvalidArgument(&'static str),
   /// Downloading the on-demand script failed.
   #[cfg(feature = "fetch")]
   #[error("HTTP error: {0}")]
   Http(#[from] minreq::Error),
   /// The on-demand script URL answered with a non-200 status.
   #[cfg(feature = "fetch")]
   #[error("{1} returned HTTP {0}")]
   HttpStatus(i32, String),
}

/// Failures from the token orchestrator.
#[derive(Debug, Error)]
pub enum GenerationError {
   /// Binding the engine to the parsed document failed.
   #[error("engine initialisation failed: {0}")]
   EngineInit(#[source] EngineError),
   /// The bound engine failed to produce a token.
   #[error("engine failed: {0}")]
   Engine(#[source] EngineError),
}

impl GenerationError {
   pub const fn kind(&self) -> ErrorKind {
      match *self {
         Self::EngineInit(_) => ErrorKind::EngineInit,
         Self::Engine(_) => ErrorKind::Engine,
      }
   }
}

/// Failures of a complete run, from file resolution to token.
#[derive(Debug, Error)]
pub enum Error {
   #[error("file not found or is not a regular file: {}", path.display())]
   NotFound { path: PathBuf },
   #[error("failed to read {}: {source}", path.display())]
   Read {
      path:   PathBuf,
      #[source]
      source: io::Error,
   },
   #[error("failed to generate transaction ID: {0}")]
   Generation(#[from] GenerationError),
}

impl Error {
   pub const fn kind(&self) -> ErrorKind {
      match *self {
         Self::NotFound { .. } => ErrorKind::NotFound,
         Self::Read { .. } => ErrorKind::Read,
         Self::Generation(ref err) => err.kind(),
      }
   }
}

#[cfg(test)]
mod tests {
   use std::error::Error as _;

   use super::*;

   #[test]
   fn engine_error_display() {
      let err = EngineError::MissingKey("twitter-site-verification".into());
      assert!(err.to_string().contains("twitter-site-verification"));

      let err = EngineError::InvalidArgument("method");
      assert_eq!(err.to_string(), "invalid argument: method must not be empty");
   }

   #[cfg(feature = "fetch")]
   #[test]
   fn http_status_names_url() {
      let err = EngineError::HttpStatus(404, "https://abs.twimg.com/x.js".into());
      assert_eq!(err.to_string(), "https://abs.twimg.com/x.js returned HTTP 404");
   }

   #[test]
   fn generation_error_keeps_cause() {
      let err = GenerationError::EngineInit(EngineError::MissingKey("animation frames".into()));
      assert_eq!(err.kind(), ErrorKind::EngineInit);
      assert!(err.to_string().contains("animation frames"));
      assert!(err.source().is_some());

      let err = GenerationError::Engine(EngineError::InvalidArgument("path"));
      assert_eq!(err.kind(), ErrorKind::Engine);
   }

   #[test]
   fn run_error_kinds() {
      let err = Error::NotFound {
         path: PathBuf::from("missing.html"),
      };
      assert_eq!(err.kind(), ErrorKind::NotFound);
      assert!(err.to_string().contains("missing.html"));
      assert!(err.source().is_none());

      let err = Error::Read {
         path:   PathBuf::from("page.html"),
         source: io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
      };
      assert_eq!(err.kind(), ErrorKind::Read);
      assert!(err.source().is_some());

      let err = Error::from(GenerationError::Engine(EngineError::Parse("bad frame".into())));
      assert_eq!(err.kind(), ErrorKind::Engine);
      assert!(err.to_string().starts_with("failed to generate transaction ID"));
   }
}
