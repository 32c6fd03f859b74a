//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for callers that drive several
//! storefront services. Failures on our side are captured to Sentry before
//! they are shown; customer mistakes are not.

use thiserror::Error;

use crate::cart::CheckoutError;
use crate::config::ConfigError;
use crate::orders::OrderError;
use crate::services::auth::AuthError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Durable storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order submission or history failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Checkout summary refused.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the caller.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the failure is ours rather than the customer's.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Config(_) | Self::Storage(_) | Self::Internal(_) => true,
            Self::Auth(err) => matches!(err, AuthError::Storage(_) | AuthError::InvalidState(_)),
            Self::Order(err) => matches!(err, OrderError::Pricing(_)),
            Self::Checkout(_) | Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }

    /// Capture internal failures to Sentry and log them.
    ///
    /// Returns the Sentry event id when the error was captured.
    pub fn report(&self) -> Option<uuid::Uuid> {
        if !self.is_internal() {
            tracing::debug!(error = %self, "request rejected");
            return None;
        }
        let event_id = sentry::capture_error(self);
        tracing::error!(error = %self, sentry_event_id = %event_id, "storefront error");
        Some(event_id)
    }

    /// Message safe to show the customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(err) => err.user_message(),
            Self::Order(OrderError::Validation(errors)) => errors.to_string(),
            Self::Order(OrderError::Timeout(operation)) => {
                AuthError::Timeout(*operation).user_message()
            }
            Self::Checkout(err) => err.to_string(),
            Self::NotFound(_) | Self::BadRequest(_) => self.to_string(),
            _ => "Ocorreu um erro. Por favor, tente novamente.".to_string(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added catalog item", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
