//! Input resolution: method, path and HTML text from caller parameters.

use std::{
   fs,
   io,
   path::Path,
};

use tracing::debug;

use crate::{
   config::Config,
   error::Error,
};

/// Caller-supplied request parameters. `None` means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
   pub method: Option<String>,
   pub path:   Option<String>,
}

/// Inputs ready for the orchestrator. Method and path are never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInput {
   pub method: String,
   pub path:   String,
   pub html:   String,
}

/// Applies defaults and reads the HTML source.
pub fn resolve(params: &RequestParams, source: &Path, config: &Config) -> Result<ResolvedInput, Error> {
   let method = config.method_or_default(params.method.as_deref()).to_owned();
   let path = config.path_or_default(params.path.as_deref()).to_owned();
   let html = read_source(source)?;

   debug!(%method, %path, bytes = html.len(), "resolved request parameters");

   Ok(ResolvedInput { method, path, html })
}

/// Reads a regular file as UTF-8 text.
///
/// A path that does not exist or is not a regular file yields
/// [`Error::NotFound`]; every other failure, including invalid UTF-8, yields
/// [`Error::Read`].
pub fn read_source(source: &Path) -> Result<String, Error> {
   let not_found = || Error::NotFound {
      path: source.to_path_buf(),
   };

   match fs::metadata(source) {
      Ok(metadata) if metadata.is_file() => {},
      Ok(_) => return Err(not_found()),
      Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(not_found()),
      Err(err) => {
         return Err(Error::Read {
            path:   source.to_path_buf(),
            source: err,
         });
      },
   }

   fs::read_to_string(source).map_err(|err| {
      if err.kind() == io::ErrorKind::NotFound {
         not_found()
      } else {
         Error::Read {
            path:   source.to_path_buf(),
            source: err,
         }
      }
   })
}
