//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `KATCAKES_STORAGE_PATH` - File backing the durable client storage
//!   (default: `.katcakes/storage.json`)
//! - `KATCAKES_LOGIN_POLICY` - `otp` (default) or `direct`
//! - `KATCAKES_CHALLENGE_ANCHOR` - UI anchor the SMS challenge is bound to
//!   (default: `recaptcha-container`)
//! - `KATCAKES_TIMEOUT_PROFILE_FETCH_SECS` (default: 15)
//! - `KATCAKES_TIMEOUT_REGISTRATION_SECS` (default: 20)
//! - `KATCAKES_TIMEOUT_LOGIN_LOOKUP_SECS` (default: 10)
//! - `KATCAKES_TIMEOUT_CHALLENGE_SEND_SECS` (default: 25)
//! - `KATCAKES_TIMEOUT_CHALLENGE_CONFIRM_SECS` (default: 15)
//! - `KATCAKES_TIMEOUT_SIGN_OUT_SECS` (default: 10)
//! - `KATCAKES_TIMEOUT_ORDER_MIRROR_SECS` (default: 10)
//! - `KATCAKES_TIMEOUT_ORDER_HISTORY_SECS` (default: 15)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.1)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// How returning customers prove they own their phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginPolicy {
    /// A phone lookup hit is followed by an SMS challenge.
    #[default]
    OtpChallenge,
    /// A phone lookup hit authenticates immediately.
    Direct,
}

impl FromStr for LoginPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "otp" => Ok(Self::OtpChallenge),
            "direct" => Ok(Self::Direct),
            other => Err(format!("expected 'otp' or 'direct', got '{other}'")),
        }
    }
}

/// Remote operations that race against a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    ProfileFetch,
    Registration,
    LoginLookup,
    ChallengeSend,
    ChallengeConfirm,
    SignOut,
    OrderMirror,
    OrderHistory,
}

impl RemoteOperation {
    /// Short name used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProfileFetch => "profile fetch",
            Self::Registration => "registration",
            Self::LoginLookup => "login lookup",
            Self::ChallengeSend => "challenge send",
            Self::ChallengeConfirm => "challenge confirm",
            Self::SignOut => "sign-out",
            Self::OrderMirror => "order mirror",
            Self::OrderHistory => "order history",
        }
    }
}

impl std::fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-operation deadlines for remote calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub profile_fetch: Duration,
    pub registration: Duration,
    pub login_lookup: Duration,
    pub challenge_send: Duration,
    pub challenge_confirm: Duration,
    pub sign_out: Duration,
    pub order_mirror: Duration,
    pub order_history: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            profile_fetch: Duration::from_secs(15),
            registration: Duration::from_secs(20),
            login_lookup: Duration::from_secs(10),
            challenge_send: Duration::from_secs(25),
            challenge_confirm: Duration::from_secs(15),
            sign_out: Duration::from_secs(10),
            order_mirror: Duration::from_secs(10),
            order_history: Duration::from_secs(15),
        }
    }
}

impl Timeouts {
    /// Deadline for the given operation.
    #[must_use]
    pub const fn for_operation(&self, operation: RemoteOperation) -> Duration {
        match operation {
            RemoteOperation::ProfileFetch => self.profile_fetch,
            RemoteOperation::Registration => self.registration,
            RemoteOperation::LoginLookup => self.login_lookup,
            RemoteOperation::ChallengeSend => self.challenge_send,
            RemoteOperation::ChallengeConfirm => self.challenge_confirm,
            RemoteOperation::SignOut => self.sign_out,
            RemoteOperation::OrderMirror => self.order_mirror,
            RemoteOperation::OrderHistory => self.order_history,
        }
    }

    /// The same deadline for every operation.
    #[must_use]
    pub const fn uniform(deadline: Duration) -> Self {
        Self {
            profile_fetch: deadline,
            registration: deadline,
            login_lookup: deadline,
            challenge_send: deadline,
            challenge_confirm: deadline,
            sign_out: deadline,
            order_mirror: deadline,
            order_history: deadline,
        }
    }

    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            profile_fetch: get_secs_or(
                "KATCAKES_TIMEOUT_PROFILE_FETCH_SECS",
                defaults.profile_fetch,
            )?,
            registration: get_secs_or("KATCAKES_TIMEOUT_REGISTRATION_SECS", defaults.registration)?,
            login_lookup: get_secs_or("KATCAKES_TIMEOUT_LOGIN_LOOKUP_SECS", defaults.login_lookup)?,
            challenge_send: get_secs_or(
                "KATCAKES_TIMEOUT_CHALLENGE_SEND_SECS",
                defaults.challenge_send,
            )?,
            challenge_confirm: get_secs_or(
                "KATCAKES_TIMEOUT_CHALLENGE_CONFIRM_SECS",
                defaults.challenge_confirm,
            )?,
            sign_out: get_secs_or("KATCAKES_TIMEOUT_SIGN_OUT_SECS", defaults.sign_out)?,
            order_mirror: get_secs_or("KATCAKES_TIMEOUT_ORDER_MIRROR_SECS", defaults.order_mirror)?,
            order_history: get_secs_or(
                "KATCAKES_TIMEOUT_ORDER_HISTORY_SECS",
                defaults.order_history,
            )?,
        })
    }
}

/// Authentication settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub login_policy: LoginPolicy,
    /// UI anchor the SMS challenge is bound to.
    pub challenge_anchor: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_policy: LoginPolicy::default(),
            challenge_anchor: DEFAULT_CHALLENGE_ANCHOR.to_owned(),
        }
    }
}

const DEFAULT_CHALLENGE_ANCHOR: &str = "recaptcha-container";
const DEFAULT_STORAGE_PATH: &str = ".katcakes/storage.json";
const DEFAULT_TRACES_SAMPLE_RATE: f32 = 0.1;

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// File backing the durable client storage.
    pub storage_path: PathBuf,
    pub auth: AuthConfig,
    pub timeouts: Timeouts,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            auth: AuthConfig::default(),
            timeouts: Timeouts::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: DEFAULT_TRACES_SAMPLE_RATE,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let storage_path = PathBuf::from(get_env_or_default(
            "KATCAKES_STORAGE_PATH",
            DEFAULT_STORAGE_PATH,
        ));
        let login_policy = get_env_or_default("KATCAKES_LOGIN_POLICY", "otp")
            .parse::<LoginPolicy>()
            .map_err(|e| ConfigError::InvalidEnvVar("KATCAKES_LOGIN_POLICY".to_string(), e))?;
        let challenge_anchor =
            get_env_or_default("KATCAKES_CHALLENGE_ANCHOR", DEFAULT_CHALLENGE_ANCHOR);

        Ok(Self {
            storage_path,
            auth: AuthConfig {
                login_policy,
                challenge_anchor,
            },
            timeouts: Timeouts::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_optional_env("SENTRY_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            sentry_traces_sample_rate: get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TRACES_SAMPLE_RATE),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get a duration in whole seconds, falling back to a default.
fn get_secs_or(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |value| parse_secs(key, &value))
}

fn parse_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs = value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be at least 1 second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
