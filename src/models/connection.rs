use chrono::{DateTime, Utc};
use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use strum::{Display, EnumIter, EnumString};

pub type ConnectionId = u64;

/// Discriminator sent as the `type` field on the wire.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionKind {
  #[default]
  SqlServer,
  Databricks,
}

impl ConnectionKind {
  pub fn label(&self) -> &'static str {
    match self {
      ConnectionKind::SqlServer => "SQL Server",
      ConnectionKind::Databricks => "Databricks",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlServerConfig {
  pub server: String,
  pub port: u16,
  pub database: String,
  pub username: String,
  pub password: String,
  pub encrypt: bool,
  pub trust_server_certificate: bool,
}

impl Default for SqlServerConfig {
  fn default() -> Self {
    Self {
      server: String::new(),
      port: 1433,
      database: String::new(),
      username: String::new(),
      password: String::new(),
      encrypt: false,
      trust_server_certificate: true,
    }
  }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabricksConfig {
  pub workspace: String,
  pub http_path: String,
  pub access_token: String,
}

/// Type-specific configuration. Only the variant matching the connection
/// type exists, so there is no bag of optional fields to keep consistent.
///
/// Types this client has no form for (the backend also registers `postgresql`)
/// are kept as `Other` so they still list and re-encode unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSettings {
  SqlServer(SqlServerConfig),
  Databricks(DatabricksConfig),
  Other { kind: String, config: serde_json::Value },
}

impl Default for ConnectionSettings {
  fn default() -> Self {
    ConnectionSettings::SqlServer(SqlServerConfig::default())
  }
}

impl ConnectionSettings {
  /// `None` for types without a form of their own.
  pub fn kind(&self) -> Option<ConnectionKind> {
    match self {
      ConnectionSettings::SqlServer(_) => Some(ConnectionKind::SqlServer),
      ConnectionSettings::Databricks(_) => Some(ConnectionKind::Databricks),
      ConnectionSettings::Other { .. } => None,
    }
  }

  /// The `type` string sent on the wire.
  pub fn type_name(&self) -> &str {
    match self {
      ConnectionSettings::SqlServer(_) => "sqlserver",
      ConnectionSettings::Databricks(_) => "databricks",
      ConnectionSettings::Other { kind, .. } => kind,
    }
  }

  pub fn label(&self) -> &str {
    match self.kind() {
      Some(kind) => kind.label(),
      None => self.type_name(),
    }
  }

  /// Server for SQL Server, workspace URL for Databricks, `host` or `server` otherwise.
  pub fn endpoint(&self) -> &str {
    match self {
      ConnectionSettings::SqlServer(c) => &c.server,
      ConnectionSettings::Databricks(c) => &c.workspace,
      ConnectionSettings::Other { config, .. } => {
        ["host", "server", "workspace"].iter().find_map(|key| config.get(*key).and_then(|v| v.as_str())).unwrap_or("")
      },
    }
  }

  pub fn database(&self) -> Option<&str> {
    match self {
      ConnectionSettings::SqlServer(c) if !c.database.is_empty() => Some(&c.database),
      ConnectionSettings::Other { config, .. } => config.get("database").and_then(|v| v.as_str()).filter(|d| !d.is_empty()),
      _ => None,
    }
  }

  fn decode(kind: String, config: serde_json::Value) -> Result<Self, serde_json::Error> {
    let config = if config.is_null() { serde_json::Value::Object(Default::default()) } else { config };
    match kind.parse::<ConnectionKind>() {
      Ok(ConnectionKind::SqlServer) => serde_json::from_value(config).map(ConnectionSettings::SqlServer),
      Ok(ConnectionKind::Databricks) => serde_json::from_value(config).map(ConnectionSettings::Databricks),
      Err(_) => Ok(ConnectionSettings::Other { kind, config }),
    }
  }

  fn encode(&self) -> Result<serde_json::Value, serde_json::Error> {
    match self {
      ConnectionSettings::SqlServer(c) => serde_json::to_value(c),
      ConnectionSettings::Databricks(c) => serde_json::to_value(c),
      ConnectionSettings::Other { config, .. } => Ok(config.clone()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConnectionWire", into = "ConnectionWire")]
pub struct Connection {
  pub id: ConnectionId,
  pub name: String,
  pub settings: ConnectionSettings,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl Connection {
  pub fn kind(&self) -> Option<ConnectionKind> {
    self.settings.kind()
  }
}

/// Shape of a connection as the backend sends it: `type` plus a loose `config` map.
#[derive(Serialize, Deserialize)]
struct ConnectionWire {
  #[serde(default)]
  id: ConnectionId,
  name: String,
  #[serde(rename = "type")]
  kind: String,
  #[serde(default)]
  config: serde_json::Value,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  created_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<ConnectionWire> for Connection {
  type Error = serde_json::Error;

  fn try_from(wire: ConnectionWire) -> Result<Self, Self::Error> {
    Ok(Self {
      id: wire.id,
      name: wire.name,
      settings: ConnectionSettings::decode(wire.kind, wire.config)?,
      created_at: wire.created_at,
      updated_at: wire.updated_at,
    })
  }
}

impl From<Connection> for ConnectionWire {
  fn from(connection: Connection) -> Self {
    Self {
      id: connection.id,
      name: connection.name,
      kind: connection.settings.type_name().to_string(),
      config: connection.settings.encode().unwrap_or_default(),
      created_at: connection.created_at,
      updated_at: connection.updated_at,
    }
  }
}

/// Request body for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionDraft {
  pub name: String,
  pub settings: ConnectionSettings,
}

impl Serialize for ConnectionDraft {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("ConnectionDraft", 3)?;
    state.serialize_field("name", &self.name)?;
    state.serialize_field("type", self.settings.type_name())?;
    match &self.settings {
      ConnectionSettings::SqlServer(c) => state.serialize_field("config", c)?,
      ConnectionSettings::Databricks(c) => state.serialize_field("config", c)?,
      ConnectionSettings::Other { config, .. } => state.serialize_field("config", config)?,
    }
    state.end()
  }
}

impl From<&Connection> for ConnectionDraft {
  fn from(connection: &Connection) -> Self {
    Self { name: connection.name.clone(), settings: connection.settings.clone() }
  }
}

/// Outcome of `POST /connections/{id}/test`. A failed test is data, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
  pub success: bool,
  #[serde(default)]
  pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
  pub name: String,
  pub data_type: String,
  #[serde(default)]
  pub nullable: bool,
}
