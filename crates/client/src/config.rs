use crate::Error;

pub const URL_ENV: &str = "SUPABASE_URL";
pub const KEY_ENV: &str = "SUPABASE_KEY";

/// Endpoint and access key of the backing service.
///
/// The key grants read/write access to the service, it should come from the environment or a
/// secret store and never be compiled in.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
  pub url: String,
  pub key: String,
}

impl Config {
  pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
    return Self {
      url: url.into(),
      key: key.into(),
    };
  }

  /// Reads `SUPABASE_URL` and `SUPABASE_KEY`.
  pub fn from_env() -> Result<Self, Error> {
    return Self::from_lookup(|name| std::env::var(name).ok());
  }

  fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, Error> {
    let var = |name: &'static str| -> Result<String, Error> {
      return match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::MissingConfig(name)),
      };
    };

    return Ok(Self {
      url: var(URL_ENV)?,
      key: var(KEY_ENV)?,
    });
  }
}

impl std::fmt::Debug for Config {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return f
      .debug_struct("Config")
      .field("url", &self.url)
      .field("key", &"<redacted>")
      .finish();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(vars: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
    let vars: HashMap<&'static str, String> =
      vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
    return move |name| vars.get(name).cloned();
  }

  #[test]
  fn test_from_lookup() {
    let config = Config::from_lookup(lookup(&[
      (URL_ENV, "https://abc.supabase.co"),
      (KEY_ENV, "anon-key"),
    ]))
    .unwrap();
    assert_eq!(config, Config::new("https://abc.supabase.co", "anon-key"));

    assert!(matches!(
      Config::from_lookup(lookup(&[(KEY_ENV, "anon-key")])),
      Err(Error::MissingConfig(URL_ENV))
    ));
    assert!(matches!(
      Config::from_lookup(lookup(&[(URL_ENV, "https://abc.supabase.co"), (KEY_ENV, " ")])),
      Err(Error::MissingConfig(KEY_ENV))
    ));
  }

  #[test]
  fn test_debug_redacts_key() {
    let debug = format!("{:?}", Config::new("https://abc.supabase.co", "secret-key"));
    assert!(debug.contains("abc.supabase.co"));
    assert!(!debug.contains("secret-key"));
  }
}
