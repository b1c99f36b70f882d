use serde::{Deserialize, Serialize};

/// Keybinding scope. Each page maps to exactly one mode.
///
/// Snake case because the `config` crate lowercases map keys from user files.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
  #[default]
  Login,
  Dashboard,
  Connections,
  ConnectionForm,
  Validations,
  ValidationForm,
}
