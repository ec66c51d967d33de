use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReporterError {
    #[error("InfluxDB request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("InfluxDB rejected write with status {status}: {body}")]
    WriteError { status: u16, body: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Storage,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for the CLI.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl ReporterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReporterError::ConfigError { .. }
            | ReporterError::MissingConfigError { .. }
            | ReporterError::InvalidConfigValueError { .. }
            | ReporterError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ReporterError::ApiError(_) => ErrorCategory::Network,
            ReporterError::WriteError { .. } => ErrorCategory::Storage,
            ReporterError::SerializationError(_)
            | ReporterError::ProcessingError { .. }
            | ReporterError::ValidationError { .. } => ErrorCategory::Data,
            ReporterError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Data => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ReporterError::MissingConfigError { .. } => {
                "Add a [plugins.influxdb2.influx] section to the configuration file"
            }
            ReporterError::InvalidConfigValueError { .. }
            | ReporterError::ConfigValidationError { .. }
            | ReporterError::ConfigError { .. } => {
                "Check the configuration file for typos and unset ${VAR} placeholders"
            }
            ReporterError::ApiError(_) => "Check that InfluxDB is reachable at the configured host and port",
            ReporterError::WriteError { status: 401 | 403, .. } => {
                "Check the InfluxDB username and password"
            }
            ReporterError::WriteError { status: 404, .. } => {
                "Create the target database before starting the run"
            }
            ReporterError::WriteError { .. } => "Inspect the InfluxDB server logs for the rejected write",
            ReporterError::IoError(_) => "Check file paths and permissions",
            ReporterError::SerializationError(_) => "Make sure the input is a valid JSON report",
            ReporterError::ProcessingError { .. } | ReporterError::ValidationError { .. } => {
                "Inspect the report that produced this point"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ReporterError::MissingConfigError { field } => {
                format!("No plugin config found ({} is missing)", field)
            }
            ReporterError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            ReporterError::WriteError { status, .. } => {
                format!("InfluxDB refused the metrics (HTTP {})", status)
            }
            ReporterError::ApiError(_) => "Could not reach InfluxDB".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReporterError>;
