//! Transaction engines.
//!
//! An engine is bound to one parsed [`Document`] and then asked for tokens.
//! [`ClientTransaction`] is the implementation that mirrors X's web client;
//! tests substitute their own.

mod animation;
mod client;
#[cfg(feature = "fetch")]
mod fetch;
mod indices;
mod numeric;

pub use client::{
   ClientTransaction,
   ClientTransactionOptions,
   ScriptFetcher,
};
#[cfg(feature = "fetch")]
pub use fetch::fetch_ondemand;
pub use indices::{
   KeyIndices,
   ondemand_url,
};

use crate::{
   document::Document,
   error::EngineError,
};

/// Something that derives transaction IDs from a captured page.
pub trait TransactionEngine: Sized {
   /// Construction options beyond the document itself.
   type Options;

   /// Extracts whatever key material the engine needs from `document`.
   fn bind(document: &Document, options: &Self::Options) -> Result<Self, EngineError>;

   /// Produces a non-empty token for `method` and `path`.
   fn generate_transaction_id(&self, method: &str, path: &str) -> Result<String, EngineError>;
}
