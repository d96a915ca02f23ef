use std::ops::Deref;
use std::rc::Rc;

use anyhow::Context;

use taskflow_backend::{
  AuthClient,
  BackendClient,
  RestTaskStore
};
use taskflow_core::config::{
  AppConfig,
  parse_override_lines
};
use taskflow_core::{
  Session,
  TaskSync
};

const EMBEDDED_CONFIG_TOML: &str =
  include_str!("../assets/taskflow.toml");
const CONFIG_STORAGE_KEY: &str =
  "taskflow.config";
const SESSION_STORAGE_KEY: &str =
  "taskflow.session";
const TAB_STORAGE_KEY: &str =
  "taskflow.tab";

fn local_storage()
-> Option<web_sys::Storage> {
  web_sys::window().and_then(
    |window| {
      window
        .local_storage()
        .ok()
        .flatten()
    }
  )
}

fn read_item(key: &str) -> Option<String> {
  local_storage().and_then(|storage| {
    storage.get_item(key).ok().flatten()
  })
}

fn write_item(key: &str, value: &str) {
  if let Some(storage) = local_storage()
    && let Err(error) =
      storage.set_item(key, value)
  {
    tracing::warn!(key, ?error, "failed writing local storage");
  }
}

fn remove_item(key: &str) {
  if let Some(storage) = local_storage() {
    let _ = storage.remove_item(key);
  }
}

/// Embedded defaults, then build-time env, then per-browser overrides.
pub fn load_config() -> AppConfig {
  let mut config =
    match AppConfig::from_toml_str(
      EMBEDDED_CONFIG_TOML
    ) {
      | Ok(config) => config,
      | Err(error) => {
        tracing::error!(
          %error,
          "embedded config is \
           invalid; using defaults"
        );
        AppConfig::default()
      }
    };

  let mut overrides = Vec::new();
  if let Some(url) =
    option_env!("TASKFLOW_BACKEND_URL")
  {
    overrides.push((
      "backend.url".to_string(),
      url.to_string()
    ));
  }
  if let Some(key) =
    option_env!("TASKFLOW_ANON_KEY")
  {
    overrides.push((
      "backend.anon_key".to_string(),
      key.to_string()
    ));
  }
  if let Some(raw) =
    read_item(CONFIG_STORAGE_KEY)
  {
    overrides
      .extend(parse_override_lines(&raw));
  }

  let rejected =
    config.apply_overrides(overrides);
  tracing::info!(
    backend_configured =
      config.backend.is_configured(),
    rejected = rejected.len(),
    "configuration loaded"
  );
  config
}

pub fn load_session() -> Option<Session> {
  let raw =
    read_item(SESSION_STORAGE_KEY)?;
  match serde_json::from_str::<Session>(
    &raw
  ) {
    | Ok(session) => Some(session),
    | Err(error) => {
      tracing::error!(
        %error,
        "failed parsing stored \
         session; discarding"
      );
      remove_item(SESSION_STORAGE_KEY);
      None
    }
  }
}

pub fn save_session(session: &Session) {
  match serde_json::to_string(session) {
    | Ok(json) => {
      write_item(
        SESSION_STORAGE_KEY,
        &json
      )
    }
    | Err(error) => {
      tracing::error!(%error, "failed encoding session")
    }
  }
}

pub fn clear_session() {
  remove_item(SESSION_STORAGE_KEY);
}

pub fn load_tab() -> taskflow_core::Tab {
  read_item(TAB_STORAGE_KEY)
    .map(|value| {
      taskflow_core::Tab::from_storage(
        &value
      )
    })
    .unwrap_or_default()
}

pub fn save_tab(tab: taskflow_core::Tab) {
  write_item(
    TAB_STORAGE_KEY,
    tab.storage_value()
  );
}

/// Clients for the configured backend.
pub struct Backend {
  pub auth:   AuthClient,
  pub store:  RestTaskStore,
  pub config: AppConfig
}

impl Backend {
  pub fn connect(
    config: &AppConfig
  ) -> anyhow::Result<Self> {
    let client =
      BackendClient::new(&config.backend)
        .context(
          "backend connection is not \
           configured"
        )?;
    Ok(Self {
      auth:   AuthClient::new(
        client.clone()
      ),
      store:  RestTaskStore::new(client),
      config: config.clone()
    })
  }

  pub fn sync_for(
    &self,
    session: &Session
  ) -> TaskSync<RestTaskStore> {
    TaskSync::new(
      self.store.clone(),
      Some(session.clone())
    )
    .with_completed_at_policy(
      self
        .config
        .view
        .completed_at_policy
    )
  }
}

/// Shared handle; equal when it points at the same clients.
#[derive(Clone)]
pub struct BackendHandle(Rc<Backend>);

impl BackendHandle {
  pub fn new(backend: Backend) -> Self {
    Self(Rc::new(backend))
  }
}

impl PartialEq for BackendHandle {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }
}

impl Deref for BackendHandle {
  type Target = Backend;

  fn deref(&self) -> &Backend {
    &self.0
  }
}
