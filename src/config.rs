//! Request defaults.

/// Method used when the caller does not supply one.
pub const DEFAULT_METHOD: &str = "POST";

/// Endpoint path used when the caller does not supply one.
pub const DEFAULT_PATH: &str = "/1.1/jot/client_event.json";

/// Defaults applied by the input resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
   pub method: String,
   pub path:   String,
}

impl Default for Config {
   fn default() -> Self {
      Self {
         method: DEFAULT_METHOD.to_owned(),
         path:   DEFAULT_PATH.to_owned(),
      }
   }
}

impl Config {
   /// Returns `method`, or the configured default when it is absent or empty.
   pub fn method_or_default<'a>(&'a self, method: Option<&'a str>) -> &'a str {
      method.filter(|method| !method.is_empty()).unwrap_or(&self.method)
   }

   /// Returns `path`, or the configured default when it is absent or empty.
   pub fn path_or_default<'a>(&'a self, path: Option<&'a str>) -> &'a str {
      path.filter(|path| !path.is_empty()).unwrap_or(&self.path)
   }
}
