//! Derive X (Twitter) client transaction IDs from a captured home page.
//!
//! ```ignore
//! use xitter_txgen::{ClientTransaction, TokenGenerator};
//!
//! let html = std::fs::read_to_string("x.com.html")?;
//! let generator = TokenGenerator::<ClientTransaction>::default();
//! let id = generator.generate("POST", "/1.1/jot/client_event.json", &html)?;
//! ```
//!
//! Any [`TransactionEngine`] can stand in for [`ClientTransaction`]:
//!
//! ```ignore
//! let generator = TokenGenerator::<MyEngine>::new(my_options);
//! let id = run(&RequestParams::default(), Path::new("page.html"), &generator, &Config::default())?;
//! ```

mod config;
mod document;
mod engine;
mod error;
mod orchestrator;
mod resolver;

pub use config::{
   Config,
   DEFAULT_METHOD,
   DEFAULT_PATH,
};
pub use document::Document;
pub use engine::{
   ClientTransaction,
   ClientTransactionOptions,
   KeyIndices,
   ScriptFetcher,
   TransactionEngine,
   ondemand_url,
};
#[cfg(feature = "fetch")]
pub use engine::fetch_ondemand;
pub use error::{
   EngineError,
   Error,
   ErrorKind,
   GenerationError,
};
pub use orchestrator::{
   Stage,
   TokenGenerator,
   run,
};
pub use resolver::{
   RequestParams,
   ResolvedInput,
   read_source,
   resolve,
};
