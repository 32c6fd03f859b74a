//! Integration tests for Kat Cakes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p katcakes-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_flow` - Cart, custom orders and checkout across a signed-in session
//! - `auth_flow` - Signup, login and session restore across restarts
//! - `cart_sync` - Several tabs sharing one storage document
//!
//! Everything runs in process against [`InMemoryBackend`] and
//! [`ScriptedPhoneAuth`]; no network or database is needed.

use std::sync::Arc;

use katcakes_storefront::backend::memory::{InMemoryBackend, ScriptedPhoneAuth};
use katcakes_storefront::cart::CartStore;
use katcakes_storefront::catalog::StaticCatalog;
use katcakes_storefront::config::{AuthConfig, LoginPolicy, Timeouts};
use katcakes_storefront::orders::OrderDesk;
use katcakes_storefront::services::auth::{AuthManager, BirthdayInput, SignupRequest};
use katcakes_storefront::storage::MemoryStorage;

/// Code accepted by the scripted SMS provider.
pub const SMS_CODE: &str = "123456";

/// One browser origin: a storage document shared by every tab, plus the
/// remote services every tab talks to.
pub struct TestContext {
    pub catalog: StaticCatalog,
    pub storage: Arc<MemoryStorage>,
    pub backend: Arc<InMemoryBackend>,
    pub sms: ScriptedPhoneAuth,
    pub timeouts: Timeouts,
    pub login_policy: LoginPolicy,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Fresh origin with the bakery catalog and OTP-gated login.
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: StaticCatalog::bakery(),
            storage: Arc::new(MemoryStorage::new()),
            backend: Arc::new(InMemoryBackend::new()),
            sms: ScriptedPhoneAuth::new(SMS_CODE),
            timeouts: Timeouts::default(),
            login_policy: LoginPolicy::OtpChallenge,
        }
    }

    /// Same origin, with the given login policy.
    #[must_use]
    pub fn with_login_policy(mut self, policy: LoginPolicy) -> Self {
        self.login_policy = policy;
        self
    }

    /// Open a tab: a cart loaded from the shared storage.
    #[must_use]
    pub fn open_cart(&self) -> CartStore {
        CartStore::load(self.storage.clone())
    }

    /// Session manager of a tab.
    #[must_use]
    pub fn auth(&self) -> AuthManager {
        AuthManager::new(
            self.backend.clone(),
            Arc::new(self.sms.clone()),
            self.storage.clone(),
            AuthConfig {
                login_policy: self.login_policy,
                ..AuthConfig::default()
            },
            self.timeouts,
        )
    }

    /// Order desk writing to the shared order log.
    #[must_use]
    pub fn order_desk(&self) -> OrderDesk {
        OrderDesk::new(self.backend.clone(), self.timeouts)
    }
}

/// A valid signup form for a Maputo mobile number.
#[must_use]
pub fn signup_request(phone_number: &str) -> SignupRequest {
    SignupRequest {
        display_name: "Ana Machava".to_owned(),
        phone_number: phone_number.to_owned(),
        email: "ana@example.com".to_owned(),
        gender: None,
        birthdays: vec![BirthdayInput {
            name: "Ana".to_owned(),
            date: "07/04/1990".to_owned(),
        }],
    }
}
