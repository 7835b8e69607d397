//! Transaction ID generation the way X's web client does it.

use std::{
   iter,
   sync::LazyLock,
   time::{
      SystemTime,
      UNIX_EPOCH,
   },
};

use data_encoding::{
   BASE64,
   BASE64_NOPAD,
};
use hmac_sha256::Hash;
use scraper::Selector;
use tracing::{
   debug,
   trace,
};

use super::{
   TransactionEngine,
   animation::animation_key,
   indices::{
      KeyIndices,
      ondemand_url,
   },
};
use crate::{
   document::Document,
   error::EngineError,
};

/// Secret salt from X's client-side JavaScript.
const HASH_SALT: &str = "obfiowerehiring";

/// X's custom epoch: 2023-05-01 00:00:00 UTC.
const X_EPOCH: u64 = 1_682_924_400;

const PROTOCOL_VERSION: u8 = 3;

const VERIFICATION_META: &str = "twitter-site-verification";

static LOADING_ANIMATION: LazyLock<Selector> = LazyLock::new(|| {
   Selector::parse("[id^='loading-x-anim']").expect("animation selector is valid")
});
static PATH: LazyLock<Selector> =
   LazyLock::new(|| Selector::parse("path").expect("path selector is valid"));

/// Downloads the script at a URL and returns its text.
pub type ScriptFetcher = fn(&str) -> Result<String, EngineError>;

/// Options for [`ClientTransaction::bind`](TransactionEngine::bind).
#[derive(Debug, Clone, Default)]
pub struct ClientTransactionOptions {
   /// Text of the `ondemand.s.*.js` chunk. When absent, the page's inline
   /// scripts are searched for the key byte indices instead.
   pub ondemand_js:    Option<String>,
   /// Called with the chunk URL the page references when neither
   /// `ondemand_js` nor the inline scripts carry the indices.
   pub fetch_ondemand: Option<ScriptFetcher>,
   /// Seconds since X's epoch to embed instead of the current time.
   pub time:           Option<u32>,
}

/// Key material extracted from X's home page, ready to sign requests.
#[derive(Debug)]
pub struct ClientTransaction {
   key_bytes:     Vec<u8>,
   animation_key: String,
   time:          Option<u32>,
}

impl TransactionEngine for ClientTransaction {
   type Options = ClientTransactionOptions;

   fn bind(document: &Document, options: &ClientTransactionOptions) -> Result<Self, EngineError> {
      let key = verification_key(document)?;
      let key_bytes = BASE64.decode(key.as_bytes())?;
      debug!(key_len = key_bytes.len(), "decoded verification key");

      let indices = match options.ondemand_js {
         Some(ref script) => KeyIndices::scan(script)?,
         None => page_indices(document, options.fetch_ondemand)?,
      };
      trace!(row = indices.row, key_bytes = ?indices.key_bytes, "key byte indices");

      let frames = animation_frames(document);
      debug!(frames = frames.len(), "found loading animation frames");

      let animation_key = animation_key(&key_bytes, &frames, &indices)?;
      trace!(%animation_key, "computed animation key");

      Ok(Self {
         key_bytes,
         animation_key,
         time: options.time,
      })
   }

   fn generate_transaction_id(&self, method: &str, path: &str) -> Result<String, EngineError> {
      if method.is_empty() {
         return Err(EngineError::InvalidArgument("method"));
      }
      if path.is_empty() {
         return Err(EngineError::InvalidArgument("path"));
      }

      let time = self.time.unwrap_or_else(current_time);
      let hash_input = format!("{method}!{path}!{time}{HASH_SALT}{}", self.animation_key);
      let hash = Hash::hash(hash_input.as_bytes());
      let mask = hash[16];

      let time_bytes = time.to_le_bytes();
      let payload = self
         .key_bytes
         .iter()
         .chain(&time_bytes)
         .chain(&hash[..16])
         .chain(iter::once(&PROTOCOL_VERSION))
         .map(|&byte| byte ^ mask);

      let encoded = iter::once(mask).chain(payload).collect::<Vec<u8>>();
      Ok(BASE64_NOPAD.encode(&encoded))
   }
}

#[expect(
   clippy::cast_possible_truncation,
   reason = "timestamp fits in u32 until 2159"
)]
fn current_time() -> u32 {
   SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map(|duration| duration.as_secs().saturating_sub(X_EPOCH) as u32)
      .unwrap_or(0)
}

/// Key byte indices from the page's inline scripts, or from the on-demand
/// chunk they reference.
fn page_indices(
   document: &Document,
   fetch: Option<ScriptFetcher>,
) -> Result<KeyIndices, EngineError> {
   let scripts = document.inline_scripts();
   if let Ok(indices) = KeyIndices::scan(&scripts) {
      return Ok(indices);
   }

   let Some(url) = ondemand_url(&scripts) else {
      return Err(EngineError::MissingKey(
         "key byte indices (page references no ondemand.s chunk; it may be a logged-out, \
          rate-limited or partial capture)"
            .into(),
      ));
   };

   match fetch {
      Some(fetch) => {
         debug!(%url, "key byte indices not inline, fetching on-demand script");
         KeyIndices::scan(&fetch(&url)?)
      },
      None => Err(EngineError::MissingKey(format!(
         "key byte indices (supply the script at {url})"
      ))),
   }
}

fn verification_key(document: &Document) -> Result<&str, EngineError> {
   document
      .meta_content(VERIFICATION_META)
      .ok_or_else(|| EngineError::MissingKey(format!("{VERIFICATION_META} meta tag")))?
      .ok_or_else(|| EngineError::MissingKey("content attribute".into()))
}

/// The `d` of the first cubic path in each loading-animation element, in
/// document order.
fn animation_frames(document: &Document) -> Vec<&str> {
   document
      .select(&LOADING_ANIMATION)
      .filter_map(|anim| {
         anim
            .select(&PATH)
            .filter_map(|path| path.value().attr("d"))
            .find(|d| d.contains('C'))
      })
      .collect()
}
