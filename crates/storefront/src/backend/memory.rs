//! In-memory collaborators for development and tests.
//!
//! [`InMemoryBackend`] stores accounts and orders in process memory and
//! [`ScriptedPhoneAuth`] accepts a single configured code instead of sending
//! SMS. Both support failure injection (unavailability, delays, expiry) so
//! error paths can be exercised deterministically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use katcakes_core::{PhoneNumber, UserAccount, UserId};

use super::{
    AccountStore, BackendError, OrderLog, OrderRecord, PendingChallenge, PhoneAuthProvider, codes,
};

fn poisoned<T>(_: PoisonError<T>) -> BackendError {
    BackendError::new(codes::UNAVAILABLE, "backend state lock poisoned")
}

async fn pause(delay: &Mutex<Option<Duration>>) {
    let delay = *delay.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

/// Account store and order log in process memory.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    accounts: Mutex<HashMap<UserId, UserAccount>>,
    orders: Mutex<Vec<OrderRecord>>,
    unavailable: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an account directly, bypassing signup.
    pub fn seed_account(&self, account: UserAccount) {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(account.user_id.clone(), account);
    }

    /// Number of stored accounts.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Snapshot of every stored order record.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRecord> {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make every call fail with `unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every call before it is answered.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap_or_else(PoisonError::into_inner) = delay;
    }

    async fn enter(&self) -> Result<(), BackendError> {
        pause(&self.delay).await;
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for InMemoryBackend {
    async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<UserAccount>, BackendError> {
        self.enter().await?;
        let accounts = self.accounts.lock().map_err(poisoned)?;
        Ok(accounts
            .values()
            .find(|account| &account.phone_number == phone)
            .cloned())
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<UserAccount>, BackendError> {
        self.enter().await?;
        Ok(self.accounts.lock().map_err(poisoned)?.get(user_id).cloned())
    }

    async fn create(&self, account: &UserAccount) -> Result<(), BackendError> {
        self.enter().await?;
        let mut accounts = self.accounts.lock().map_err(poisoned)?;
        if accounts.contains_key(&account.user_id) {
            return Err(BackendError::new(
                codes::PERMISSION_DENIED,
                "account id already in use",
            ));
        }
        accounts.insert(account.user_id.clone(), account.clone());
        Ok(())
    }
}

#[async_trait]
impl OrderLog for InMemoryBackend {
    async fn append(&self, record: &OrderRecord) -> Result<(), BackendError> {
        self.enter().await?;
        self.orders.lock().map_err(poisoned)?.push(record.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<OrderRecord>, BackendError> {
        self.enter().await?;
        Ok(self
            .orders
            .lock()
            .map_err(poisoned)?
            .iter()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
struct ScriptState {
    sends: AtomicUsize,
    releases: AtomicUsize,
    confirms: AtomicUsize,
    sign_outs: AtomicUsize,
    expired: AtomicBool,
    send_unavailable: AtomicBool,
    sign_out_fails: AtomicBool,
    confirm_delay: Mutex<Option<Duration>>,
    sign_out_delay: Mutex<Option<Duration>>,
    last_anchor: Mutex<Option<String>>,
}

/// Phone-auth provider that accepts one fixed code.
#[derive(Debug, Clone)]
pub struct ScriptedPhoneAuth {
    code: String,
    state: Arc<ScriptState>,
}

impl ScriptedPhoneAuth {
    /// Accept `code` for every challenge.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            state: Arc::default(),
        }
    }

    /// How many challenges were sent.
    #[must_use]
    pub fn sends(&self) -> usize {
        self.state.sends.load(Ordering::SeqCst)
    }

    /// How many confirmations reached the provider.
    #[must_use]
    pub fn confirms(&self) -> usize {
        self.state.confirms.load(Ordering::SeqCst)
    }

    /// How many sign-out calls reached the provider.
    #[must_use]
    pub fn sign_outs(&self) -> usize {
        self.state.sign_outs.load(Ordering::SeqCst)
    }

    /// Challenges sent and not yet released.
    #[must_use]
    pub fn live_challenges(&self) -> usize {
        self.sends()
            .saturating_sub(self.state.releases.load(Ordering::SeqCst))
    }

    /// Anchor of the most recent challenge.
    #[must_use]
    pub fn last_anchor(&self) -> Option<String> {
        self.state
            .last_anchor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Report every outstanding and future code as expired.
    pub fn set_expired(&self, expired: bool) {
        self.state.expired.store(expired, Ordering::SeqCst);
    }

    /// Make `send_code` fail with `unavailable`.
    pub fn set_send_unavailable(&self, unavailable: bool) {
        self.state.send_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make `sign_out` fail.
    pub fn set_sign_out_fails(&self, fails: bool) {
        self.state.sign_out_fails.store(fails, Ordering::SeqCst);
    }

    /// Delay confirmations.
    pub fn set_confirm_delay(&self, delay: Option<Duration>) {
        *self
            .state
            .confirm_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = delay;
    }

    /// Delay sign-out.
    pub fn set_sign_out_delay(&self, delay: Option<Duration>) {
        *self
            .state
            .sign_out_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = delay;
    }
}

#[async_trait]
impl PhoneAuthProvider for ScriptedPhoneAuth {
    async fn send_code(
        &self,
        phone: &PhoneNumber,
        anchor: &str,
    ) -> Result<Box<dyn PendingChallenge>, BackendError> {
        if self.state.send_unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::new(
                codes::TOO_MANY_REQUESTS,
                "sms quota reached",
            ));
        }
        self.state.sends.fetch_add(1, Ordering::SeqCst);
        *self.state.last_anchor.lock().map_err(poisoned)? = Some(anchor.to_owned());
        tracing::debug!(phone = %phone.masked(), anchor, "scripted challenge sent");

        Ok(Box::new(ScriptedChallenge {
            code: self.code.clone(),
            state: Arc::clone(&self.state),
            released: AtomicBool::new(false),
        }))
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.state.sign_outs.fetch_add(1, Ordering::SeqCst);
        pause(&self.state.sign_out_delay).await;
        if self.state.sign_out_fails.load(Ordering::SeqCst) {
            return Err(BackendError::new(
                codes::NETWORK_REQUEST_FAILED,
                "sign-out request failed",
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct ScriptedChallenge {
    code: String,
    state: Arc<ScriptState>,
    released: AtomicBool,
}

#[async_trait]
impl PendingChallenge for ScriptedChallenge {
    async fn confirm(&self, code: &str) -> Result<(), BackendError> {
        self.state.confirms.fetch_add(1, Ordering::SeqCst);
        pause(&self.state.confirm_delay).await;

        if self.released.load(Ordering::SeqCst) {
            return Err(BackendError::new(
                codes::MISSING_VERIFICATION_ID,
                "challenge was released",
            ));
        }
        if self.state.expired.load(Ordering::SeqCst) {
            return Err(BackendError::new(codes::CODE_EXPIRED, "code expired"));
        }
        if code == self.code {
            Ok(())
        } else {
            Err(BackendError::new(
                codes::INVALID_VERIFICATION_CODE,
                "code does not match",
            ))
        }
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.state.releases.fetch_add(1, Ordering::SeqCst);
        }
    }
}
