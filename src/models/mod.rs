pub mod connection;
pub mod user;
pub mod validation;

// Re-export commonly used types
pub use connection::{
  ColumnInfo, Connection, ConnectionDraft, ConnectionId, ConnectionKind, ConnectionSettings, DatabricksConfig,
  SqlServerConfig, TestResult,
};
pub use user::{AuthResponse, Credentials, Registration, User};
pub use validation::{
  ColumnStats, ComparisonType, Difference, DifferenceKind, ResultError, ResultSummary, Validation, ValidationConfig,
  ValidationDetails, ValidationDraft, ValidationId, ValidationResults, ValidationStatus, ValidationStatusInfo,
};
