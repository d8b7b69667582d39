use thiserror::Error;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `CoinforgeError` is the primary error type returned by coinforge library
/// operations. It provides:
/// - Detailed error information for programmatic handling
/// - User-friendly messages with context for the CLI
/// - Mapping to CLI exit codes for consistent error reporting
///
/// # Error Categories
///
/// | Category | Description |
/// |----------|-------------|
/// | `Config` | Configuration file or CLI argument errors |
/// | `Validation` | Launch plan shape/constraint violations |
/// | `Task` | A single generation task's invocation failed |
/// | `Llm` | LLM backend transport/auth/quota errors |
/// | `Store` | Project store read/write failures |
///
/// Library code returns `CoinforgeError` and does NOT call
/// `std::process::exit()`; the CLI maps errors to exit codes via
/// [`crate::exit_codes::ExitCode`].
#[derive(Error, Debug)]
pub enum CoinforgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Launch plan validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Generation task error: {0}")]
    Task(#[from] TaskError),

    #[error("LLM backend error: {0}")]
    Llm(#[from] LlmError),

    #[error("Project store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for providing user-friendly error reporting with context.
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::MissingRequired(key) => {
                format!("Required configuration '{key}' is missing")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => {
                format!("Configuration file not found: {path}")
            }
            Self::DiscoveryFailed { reason } => {
                format!("Failed to discover configuration: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        Some(
            "coinforge searches for coinforge.toml starting from the current directory upward."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax using a TOML validator".to_string(),
                "Compare with the example configuration in the README".to_string(),
            ],
            Self::MissingRequired(key) => vec![
                format!("Add '{key}' to coinforge.toml"),
                "Use CLI flags as a temporary workaround".to_string(),
            ],
            Self::InvalidValue { .. } => vec![
                "Check the README for valid values for this option".to_string(),
                "Remove the option to use the default value".to_string(),
            ],
            Self::NotFound { .. } => vec![
                "Create coinforge.toml in your project root".to_string(),
                "Use --config <path> to specify the configuration file explicitly".to_string(),
            ],
            Self::DiscoveryFailed { .. } => vec![
                "Check file permissions in the current directory and parents".to_string(),
                "Use --config <path> to specify the configuration file explicitly".to_string(),
            ],
        }
    }
}

/// Launch plan validation errors.
///
/// Detected when a launch plan is loaded, before any generation run
/// starts; the orchestrator itself never re-validates domain rules.
/// A written kit that no longer matches its manifest lands here too.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Required field '{field}' is missing or empty")]
    MissingField { field: String },

    #[error("Ticker '{ticker}' is invalid: {reason}")]
    InvalidTicker { ticker: String, reason: String },

    #[error("Field '{field}' must be positive, got {value}")]
    NonPositive { field: String, value: i64 },

    #[error(
        "Target spacing ({spacing_minutes}m) must be shorter than target timespan ({timespan_minutes}m)"
    )]
    SpacingExceedsTimespan {
        spacing_minutes: u64,
        timespan_minutes: u64,
    },

    #[error("Address prefix '{prefix}' is invalid: {reason}")]
    InvalidAddressPrefix { prefix: String, reason: String },

    #[error("Block reward ({block_reward}) exceeds total supply ({total_supply})")]
    RewardExceedsSupply {
        block_reward: u64,
        total_supply: u64,
    },

    #[error("Kit at {kit_dir} failed verification: {details}")]
    KitDamaged { kit_dir: String, details: String },
}

impl UserFriendlyError for ValidationError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        Some(
            "Launch plans must pass shape validation before a generation run starts.".to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingField { field } => vec![
                format!("Set '{field}' in your launch plan TOML"),
                "See the example plan in the README for all fields".to_string(),
            ],
            Self::InvalidTicker { .. } => vec![
                "Use 2-6 uppercase ASCII letters or digits, e.g. NVC or BTC2".to_string(),
            ],
            Self::NonPositive { field, .. } => {
                vec![format!("Set '{field}' to a positive integer")]
            }
            Self::SpacingExceedsTimespan { .. } => vec![
                "Lower target_spacing_minutes or raise target_timespan_minutes".to_string(),
            ],
            Self::InvalidAddressPrefix { .. } => {
                vec!["Use a single ASCII letter, e.g. N".to_string()]
            }
            Self::RewardExceedsSupply { .. } => vec![
                "Lower block_reward or raise total_supply".to_string(),
            ],
            Self::KitDamaged { .. } => vec![
                "Re-run 'coinforge launch' to regenerate the kit".to_string(),
            ],
        }
    }
}

/// LLM backend errors (transport, auth, quota, payload)
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Backend misconfiguration: {0}")]
    Misconfiguration(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Quota or rate limit exceeded: {0}")]
    Quota(String),

    #[error("Invocation timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Backend returned no usable payload")]
    EmptyResponse,

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl UserFriendlyError for LlmError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Misconfiguration(_) => Some(
                "Backend settings live under [llm] in coinforge.toml; API keys are read from the environment.".to_string(),
            ),
            Self::Auth(_) => {
                Some("The backend rejected the configured API key.".to_string())
            }
            Self::Quota(_) => {
                Some("The provider throttled or rejected the request for usage reasons.".to_string())
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Misconfiguration(_) => vec![
                "Set [llm] provider and model in coinforge.toml".to_string(),
                "Export the API key named by api_key_env".to_string(),
            ],
            Self::Transport(_) => vec![
                "Check your internet connection".to_string(),
                "Try again; transient provider outages are retried only briefly".to_string(),
            ],
            Self::Auth(_) => vec![
                "Verify the API key is valid and not expired".to_string(),
            ],
            Self::Quota(_) => vec![
                "Wait a few minutes and retry".to_string(),
                "Check your provider plan limits".to_string(),
            ],
            Self::Timeout { .. } => vec![
                "Increase request_timeout_secs under [llm] in coinforge.toml".to_string(),
            ],
            Self::EmptyResponse => vec![
                "Retry the run; the provider returned an empty result".to_string(),
            ],
            Self::Unsupported(_) => vec![
                "Supported providers: anthropic, openrouter".to_string(),
            ],
        }
    }
}

/// A single generation task's failure.
///
/// Recorded per task by the orchestrator and converted into a status
/// update; never allowed to crash the dispatch loop or stop unrelated
/// tasks. The orchestrator treats every variant identically when
/// deciding DAG progression.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("task {task}: backend invocation failed: {source}")]
    Backend {
        task: String,
        #[source]
        source: LlmError,
    },

    #[error("task {task}: response failed the declared output shape: {reason}")]
    SchemaMismatch { task: String, reason: String },

    #[error("task {task}: backend returned no usable payload for '{field}'")]
    EmptyPayload { task: String, field: String },
}

impl TaskError {
    /// Name of the task that failed.
    #[must_use]
    pub fn task(&self) -> &str {
        match self {
            Self::Backend { task, .. }
            | Self::SchemaMismatch { task, .. }
            | Self::EmptyPayload { task, .. } => task,
        }
    }
}

/// Project store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Project '{id}' not found for owner '{owner}'")]
    NotFound { owner: String, id: String },

    #[error("Project '{id}' already exists for owner '{owner}'")]
    AlreadyExists { owner: String, id: String },

    #[error("Invalid project identifier: {0}")]
    InvalidId(String),

    #[error("Failed to serialize project: {0}")]
    Serialize(#[from] serde_error::SerializeError),

    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Wrapper so `StoreError` does not leak the JSON crate type across the API.
pub mod serde_error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    #[error("{0}")]
    pub struct SerializeError(pub String);
}
