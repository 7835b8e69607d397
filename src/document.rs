//! Parsed HTML document.

use std::sync::LazyLock;

use scraper::{
   Html,
   Selector,
   html::Select,
};
use tracing::debug;

static META: LazyLock<Selector> =
   LazyLock::new(|| Selector::parse("meta[name]").expect("meta selector is valid"));
static SCRIPT: LazyLock<Selector> =
   LazyLock::new(|| Selector::parse("script").expect("script selector is valid"));

/// A captured page, parsed into a queryable tree.
///
/// Parsing follows the HTML5 algorithm, so it never fails: unclosed tags,
/// stray end tags and garbage text all produce a best-effort tree.
pub struct Document {
   html: Html,
}

impl Document {
   pub fn parse(html: &str) -> Self {
      let html = Html::parse_document(html);
      if !html.errors.is_empty() {
         debug!(errors = html.errors.len(), "tolerated malformed markup");
      }
      Self { html }
   }

   /// Elements matching `selector`, in document order.
   pub fn select<'a, 'b>(&'a self, selector: &'b Selector) -> Select<'a, 'b> {
      self.html.select(selector)
   }

   /// The `content` attribute of the first `<meta name="{name}">`.
   ///
   /// The outer `Option` is the tag, the inner one its `content` attribute.
   pub fn meta_content(&self, name: &str) -> Option<Option<&str>> {
      self
         .select(&META)
         .find(|meta| meta.value().attr("name") == Some(name))
         .map(|meta| meta.value().attr("content"))
   }

   /// Text of every inline `<script>`, joined by newlines.
   pub fn inline_scripts(&self) -> String {
      self
         .select(&SCRIPT)
         .filter(|script| script.value().attr("src").is_none())
         .map(|script| script.text().collect::<String>())
         .collect::<Vec<_>>()
         .join("\n")
   }
}
