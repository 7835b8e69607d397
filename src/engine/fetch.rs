//! Downloads the on-demand script a page references.

use tracing::debug;

use crate::error::EngineError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, \
                          like Gecko) Chrome/133.0.0.0 Safari/537.36";

/// GETs `url` with a desktop browser user agent and returns the body text.
///
/// Plugs into [`ClientTransactionOptions::fetch_ondemand`](super::ClientTransactionOptions).
pub fn fetch_ondemand(url: &str) -> Result<String, EngineError> {
   debug!(url, "downloading on-demand script");
   let response = minreq::get(url)
      .with_header("User-Agent", USER_AGENT)
      .send()?;

   if response.status_code != 200 {
      return Err(EngineError::HttpStatus(response.status_code, url.to_owned()));
   }

   Ok(response.as_str()?.to_owned())
}
