//! Token orchestration: parse the page, bind an engine, ask it for a token.

use std::{
   fmt,
   path::Path,
};

use tracing::{
   debug,
   warn,
};

use crate::{
   config::Config,
   document::Document,
   engine::TransactionEngine,
   error::{
      Error,
      ErrorKind,
      GenerationError,
   },
   resolver::{
      RequestParams,
      resolve,
   },
};

/// Where a single invocation currently is. Every invocation starts at
/// [`Stage::Start`]; nothing carries over between invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
   Start,
   ParametersResolved,
   DocumentParsed,
   EngineBound,
   TokenReturned,
   /// Terminal stage of an invocation that ended in an error of this kind.
   Failed(ErrorKind),
}

impl Stage {
   /// Terminal stage reached by a finished invocation.
   pub const fn of<T>(result: &Result<T, Error>) -> Self {
      match *result {
         Ok(_) => Self::TokenReturned,
         Err(ref err) => Self::Failed(err.kind()),
      }
   }
}

impl fmt::Display for Stage {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match *self {
         Self::Start => f.write_str("start"),
         Self::ParametersResolved => f.write_str("parameters resolved"),
         Self::DocumentParsed => f.write_str("document parsed"),
         Self::EngineBound => f.write_str("engine bound"),
         Self::TokenReturned => f.write_str("token returned"),
         Self::Failed(kind) => write!(f, "failed ({kind:?})"),
      }
   }
}

/// Turns HTML text into transaction IDs using engine `E`.
pub struct TokenGenerator<E: TransactionEngine> {
   options: E::Options,
}

impl<E: TransactionEngine> TokenGenerator<E> {
   pub const fn new(options: E::Options) -> Self {
      Self { options }
   }

   /// Parses `html`, binds a fresh engine to it and returns the engine's token
   /// for `method` and `path` unchanged.
   ///
   /// Parsing never fails, so every error here comes from the engine. There is
   /// no retry.
   pub fn generate(&self, method: &str, path: &str, html: &str) -> Result<String, GenerationError> {
      let document = Document::parse(html);
      debug!(stage = %Stage::DocumentParsed);

      let engine = E::bind(&document, &self.options).map_err(GenerationError::EngineInit)?;
      debug!(stage = %Stage::EngineBound);

      let token = engine
         .generate_transaction_id(method, path)
         .map_err(GenerationError::Engine)?;
      debug!(stage = %Stage::TokenReturned, token_len = token.len());

      Ok(token)
   }
}

impl<E> Default for TokenGenerator<E>
where
   E: TransactionEngine,
   E::Options: Default,
{
   fn default() -> Self {
      Self::new(E::Options::default())
   }
}

/// Resolves inputs from `params` and `source`, then generates a token.
pub fn run<E: TransactionEngine>(
   params: &RequestParams,
   source: &Path,
   generator: &TokenGenerator<E>,
   config: &Config,
) -> Result<String, Error> {
   debug!(stage = %Stage::Start, source = %source.display());

   let result = resolve(params, source, config).and_then(|input| {
      debug!(stage = %Stage::ParametersResolved);
      generator
         .generate(&input.method, &input.path, &input.html)
         .map_err(Error::from)
   });

   let stage = Stage::of(&result);
   if let Stage::Failed(kind) = stage {
      warn!(stage = %stage, ?kind, "transaction ID generation failed");
   }
   result
}

#[cfg(test)]
mod tests {
   use std::{
      cell::Cell,
      io::Write as _,
   };

   use super::*;
   use crate::error::EngineError;

   /// Echoes its inputs and the page's `title` meta; fails on demand.
   struct EchoEngine {
      title:         String,
      fail_generate: bool,
   }

   #[derive(Default)]
   struct EchoOptions {
      fail_bind:     bool,
      fail_generate: bool,
   }

   thread_local! {
      static BINDS: Cell<usize> = const { Cell::new(0) };
   }

   impl TransactionEngine for EchoEngine {
      type Options = EchoOptions;

      fn bind(document: &Document, options: &EchoOptions) -> Result<Self, EngineError> {
         BINDS.with(|binds| binds.set(binds.get() + 1));
         if options.fail_bind {
            return Err(EngineError::MissingKey("twitter-site-verification meta tag".into()));
         }
         let title = document
            .meta_content("title")
            .flatten()
            .unwrap_or("untitled")
            .to_owned();
         Ok(Self {
            title,
            fail_generate: options.fail_generate,
         })
      }

      fn generate_transaction_id(&self, method: &str, path: &str) -> Result<String, EngineError> {
         if self.fail_generate {
            return Err(EngineError::Parse("frame has 3 values, need at least 11".into()));
         }
         Ok(format!("{method} {path} {}", self.title))
      }
   }

   #[test]
   fn token_returned_verbatim() {
      let generator = TokenGenerator::<EchoEngine>::default();
      let token = generator
         .generate("GET", "/i/api/1.1/jot", r#"<meta name="title" content="home">"#)
         .unwrap();
      assert_eq!(token, "GET /i/api/1.1/jot home");
   }

   #[test]
   fn malformed_html_reaches_engine() {
      let generator = TokenGenerator::<EchoEngine>::default();
      let token = generator
         .generate("POST", "/x", "<<<div></span><meta name=title content=ok><table><td>")
         .unwrap();
      assert_eq!(token, "POST /x ok");
   }

   #[test]
   fn bind_failure_is_engine_init() {
      let generator = TokenGenerator::<EchoEngine>::new(EchoOptions {
         fail_bind:     true,
         fail_generate: false,
      });
      let err = generator.generate("POST", "/x", "<html>").unwrap_err();
      assert_eq!(err.kind(), ErrorKind::EngineInit);
      assert!(err.to_string().contains("twitter-site-verification"));
   }

   #[test]
   fn generate_failure_is_engine() {
      let generator = TokenGenerator::<EchoEngine>::new(EchoOptions {
         fail_bind:     false,
         fail_generate: true,
      });
      let err = generator.generate("POST", "/x", "<html>").unwrap_err();
      assert_eq!(err.kind(), ErrorKind::Engine);
   }

   #[test]
   fn fresh_engine_per_invocation() {
      let generator = TokenGenerator::<EchoEngine>::default();
      let before = BINDS.with(Cell::get);
      generator.generate("GET", "/a", "").unwrap();
      generator.generate("GET", "/b", "").unwrap();
      assert_eq!(BINDS.with(Cell::get) - before, 2);
   }

   #[test]
   fn run_applies_defaults() {
      let mut file = tempfile::NamedTempFile::new().unwrap();
      file.write_all(b"<meta name=title content=page>").unwrap();

      let generator = TokenGenerator::<EchoEngine>::default();
      let implicit =
         run(&RequestParams::default(), file.path(), &generator, &Config::default()).unwrap();
      let explicit = run(
         &RequestParams {
            method: Some("POST".into()),
            path:   Some("/1.1/jot/client_event.json".into()),
         },
         file.path(),
         &generator,
         &Config::default(),
      )
      .unwrap();

      assert_eq!(implicit, "POST /1.1/jot/client_event.json page");
      assert_eq!(implicit, explicit);
   }

   #[test]
   fn run_missing_file_skips_engine() {
      let dir = tempfile::tempdir().unwrap();
      let generator = TokenGenerator::<EchoEngine>::default();
      let before = BINDS.with(Cell::get);
      let err = run(
         &RequestParams::default(),
         &dir.path().join("missing.html"),
         &generator,
         &Config::default(),
      )
      .unwrap_err();
      assert_eq!(err.kind(), ErrorKind::NotFound);
      assert_eq!(BINDS.with(Cell::get), before);
   }

   #[test]
   fn run_ends_in_failed_stage() {
      let dir = tempfile::tempdir().unwrap();
      let generator = TokenGenerator::<EchoEngine>::default();
      let result = run(
         &RequestParams::default(),
         &dir.path().join("missing.html"),
         &generator,
         &Config::default(),
      );
      assert_eq!(Stage::of(&result), Stage::Failed(ErrorKind::NotFound));

      let mut file = tempfile::NamedTempFile::new().unwrap();
      file.write_all(b"<html>").unwrap();
      let failing = TokenGenerator::<EchoEngine>::new(EchoOptions {
         fail_bind:     true,
         fail_generate: false,
      });
      let result = run(&RequestParams::default(), file.path(), &failing, &Config::default());
      let stage = Stage::of(&result);
      assert_eq!(stage, Stage::Failed(ErrorKind::EngineInit));
      assert_eq!(stage.to_string(), "failed (EngineInit)");

      let result = run(&RequestParams::default(), file.path(), &generator, &Config::default());
      assert_eq!(Stage::of(&result), Stage::TokenReturned);
   }
}
