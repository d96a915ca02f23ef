use serde::{
  Deserialize,
  Serialize
};
use thiserror::Error;
use tracing::{
  debug,
  warn
};

use crate::store::CompletedAtPolicy;
use crate::view::SortOrder;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid config: {0}")]
  Parse(#[from] toml::de::Error),

  #[error(
    "invalid value '{value}' for \
     {key}"
  )]
  InvalidValue {
    key:   String,
    value: String
  },

  #[error("unknown config key {0}")]
  UnknownKey(String)
}

#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct AppConfig {
  pub backend: BackendConfig,
  pub view:    ViewConfig
}

/// Where the hosted backend lives.
#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct BackendConfig {
  pub url:      String,
  pub anon_key: String
}

impl BackendConfig {
  pub fn is_configured(&self) -> bool {
    !self.url.trim().is_empty()
      && !self.anon_key.trim().is_empty()
  }
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct ViewConfig {
  pub default_sort:        SortOrder,
  pub confirm_delete:      bool,
  pub completed_at_policy:
    CompletedAtPolicy
}

impl Default for ViewConfig {
  fn default() -> Self {
    Self {
      default_sort:        SortOrder::Default,
      confirm_delete:      true,
      completed_at_policy:
        CompletedAtPolicy::Clear
    }
  }
}

impl AppConfig {
  pub fn from_toml_str(
    text: &str
  ) -> Result<Self, ConfigError> {
    Ok(toml::from_str(text)?)
  }

  /// Applies dotted `key=value` overrides in order. Bad entries are logged
  /// and skipped so one typo does not discard the rest.
  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> Vec<ConfigError>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    let mut rejected = Vec::new();
    for (key, value) in overrides {
      match self.set(&key, &value) {
        | Ok(()) => {
          debug!(key = %key, "applied config override");
        }
        | Err(err) => {
          warn!(error = %err, "ignoring config override");
          rejected.push(err);
        }
      }
    }
    rejected
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> Result<(), ConfigError> {
    let invalid = || {
      ConfigError::InvalidValue {
        key:   key.to_string(),
        value: value.to_string()
      }
    };

    match key {
      | "backend.url" => {
        self.backend.url = value
          .trim()
          .trim_end_matches('/')
          .to_string();
      }
      | "backend.anon_key" => {
        self.backend.anon_key =
          value.trim().to_string();
      }
      | "view.default_sort" => {
        self.view.default_sort =
          SortOrder::parse(value)
            .ok_or_else(invalid)?;
      }
      | "view.confirm_delete" => {
        self.view.confirm_delete =
          parse_bool(value)
            .ok_or_else(invalid)?;
      }
      | "view.completed_at_policy" => {
        self.view.completed_at_policy =
          match value
            .trim()
            .to_ascii_lowercase()
            .as_str()
          {
            | "clear" => {
              CompletedAtPolicy::Clear
            }
            | "keep" => {
              CompletedAtPolicy::Keep
            }
            | _ => return Err(invalid())
          };
      }
      | other => {
        return Err(
          ConfigError::UnknownKey(
            other.to_string()
          )
        );
      }
    }
    Ok(())
  }
}

/// Reads `key=value` lines; blank lines and `#` comments are skipped.
pub fn parse_override_lines(
  text: &str
) -> Vec<(String, String)> {
  let mut out = Vec::new();
  for raw_line in text.lines() {
    let mut line = raw_line.trim();
    if let Some((before, _)) =
      line.split_once('#')
    {
      line = before.trim();
    }
    if line.is_empty() {
      continue;
    }

    match line.split_once('=') {
      | Some((k, v)) => {
        out.push((
          k.trim().to_string(),
          v.trim().to_string()
        ));
      }
      | None => {
        warn!(line = %raw_line, "config override line has no '='; skipping");
      }
    }
  }
  out
}

fn parse_bool(s: &str) -> Option<bool> {
  match s
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "1" | "y" | "yes" | "on"
    | "true" => Some(true),
    | "0" | "n" | "no" | "off"
    | "false" => Some(false),
    | _ => None
  }
}
