//! Remote collaborators.
//!
//! The storefront talks to three external services, each behind a trait so
//! the engine can be driven by a real backend in production and by the
//! in-memory implementations in [`memory`] during development and tests:
//!
//! - [`AccountStore`] - account records keyed by opaque user id, queryable by phone
//! - [`OrderLog`] - append-only order records keyed by user id
//! - [`PhoneAuthProvider`] - SMS challenges and remote sign-out
//!
//! Every call is asynchronous. Callers race them against deadlines; a late
//! result is simply dropped with its future.

pub mod memory;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use katcakes_core::{OrderRecordId, OrderStatus, PhoneNumber, Price, UserAccount, UserId};

use crate::cart::CartEntry;

/// Error codes reported by the backend.
pub mod codes {
    pub const INVALID_VERIFICATION_CODE: &str = "auth/invalid-verification-code";
    pub const CODE_EXPIRED: &str = "auth/code-expired";
    pub const MISSING_VERIFICATION_ID: &str = "auth/missing-verification-id";
    pub const INVALID_PHONE_NUMBER: &str = "auth/invalid-phone-number";
    pub const TOO_MANY_REQUESTS: &str = "auth/too-many-requests";
    pub const QUOTA_EXCEEDED: &str = "auth/quota-exceeded";
    pub const CAPTCHA_CHECK_FAILED: &str = "auth/captcha-check-failed";
    pub const NETWORK_REQUEST_FAILED: &str = "auth/network-request-failed";
    pub const USER_DISABLED: &str = "auth/user-disabled";
    pub const PERMISSION_DENIED: &str = "permission-denied";
    pub const UNAVAILABLE: &str = "unavailable";
}

/// A failure reported by a remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct BackendError {
    /// Machine-readable code, e.g. `auth/code-expired`.
    pub code: String,
    /// Diagnostic message from the service (not shown to customers).
    pub message: String,
}

impl BackendError {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(codes::UNAVAILABLE, "service unavailable")
    }
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: OrderRecordId,
    pub user_id: UserId,
    pub entries: Vec<CartEntry>,
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Account records.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find the account registered with a phone number.
    async fn find_by_phone(&self, phone: &PhoneNumber)
    -> Result<Option<UserAccount>, BackendError>;

    /// Fetch an account by id.
    async fn get(&self, user_id: &UserId) -> Result<Option<UserAccount>, BackendError>;

    /// Store a new account under its `user_id`.
    async fn create(&self, account: &UserAccount) -> Result<(), BackendError>;
}

/// Append-only order history.
#[async_trait]
pub trait OrderLog: Send + Sync {
    /// Append a record.
    async fn append(&self, record: &OrderRecord) -> Result<(), BackendError>;

    /// All records of a user, in insertion order.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<OrderRecord>, BackendError>;
}

/// SMS possession proof and remote session control.
#[async_trait]
pub trait PhoneAuthProvider: Send + Sync {
    /// Send a verification code to `phone`, bound to the UI `anchor`.
    async fn send_code(
        &self,
        phone: &PhoneNumber,
        anchor: &str,
    ) -> Result<Box<dyn PendingChallenge>, BackendError>;

    /// End the remote session.
    async fn sign_out(&self) -> Result<(), BackendError>;
}

/// A challenge awaiting its code. Single use per anchor; release before replacing.
#[async_trait]
pub trait PendingChallenge: Send + Sync + fmt::Debug {
    /// Confirm the code the customer typed.
    async fn confirm(&self, code: &str) -> Result<(), BackendError>;

    /// Free the sender handle behind this challenge.
    fn release(&self);
}
