//! Authentication service.
//!
//! Phone-number accounts with SMS possession proof. [`AuthManager`] drives
//! one attempt at a time through an explicit state machine:
//!
//! ```text
//! Idle -> Submitting -> VerificationPending -> Verifying -> Authenticated
//!              |                ^                 |
//!              |                +-- VerificationFailed
//!              +-> Authenticated (direct login)
//!              +-> Failed
//! ```
//!
//! The session is the opaque user id kept in durable storage. It is written
//! only after every remote step of an attempt has succeeded, so a failed
//! attempt never leaves the client signed in.

mod error;
mod forms;

pub use error::{AuthError, backend_message};
pub use forms::{
    BIRTHDAY_FORMAT, BirthdayInput, CODE_LENGTH, SignupProfile, SignupRequest, VerificationCode,
    parse_birthday_date,
};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use katcakes_core::{Email, PhoneNumber, UserAccount, UserId};

use crate::backend::{AccountStore, BackendError, PendingChallenge, PhoneAuthProvider};
use crate::config::{AuthConfig, LoginPolicy, RemoteOperation, Timeouts};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::storage::{DurableStorage, keys};

/// Where the current attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Idle,
    /// Local validation and the first remote calls are running.
    Submitting,
    /// A code was sent and is awaiting input.
    VerificationPending,
    /// A code is being confirmed.
    Verifying,
    /// The last code was rejected. Resubmit, or resend if it expired.
    VerificationFailed,
    Authenticated,
    /// The attempt ended in an error. Start a new one.
    Failed,
}

/// Result of a successful login call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The account was found and the session is established.
    Authenticated,
    /// A code was sent; finish with [`AuthManager::verify_code`].
    VerificationRequired,
}

#[derive(Debug)]
enum Purpose {
    Signup(SignupProfile),
    Login(UserAccount),
}

/// An attempt waiting on a code.
#[derive(Debug)]
struct Attempt {
    phone: PhoneNumber,
    purpose: Purpose,
    /// `None` after expiry or a failed resend.
    challenge: Option<Box<dyn PendingChallenge>>,
}

impl Attempt {
    fn release_challenge(&mut self) {
        if let Some(challenge) = self.challenge.take() {
            challenge.release();
        }
    }
}

/// Race a remote call against its deadline. The late call is dropped.
async fn race<T>(
    operation: RemoteOperation,
    deadline: Duration,
    call: impl Future<Output = Result<T, BackendError>>,
) -> Result<Result<T, BackendError>, AuthError> {
    tokio::time::timeout(deadline, call).await.map_err(|_| {
        tracing::warn!(%operation, ?deadline, "remote call timed out");
        AuthError::Timeout(operation)
    })
}

/// Session manager for phone-number accounts.
pub struct AuthManager {
    accounts: Arc<dyn AccountStore>,
    phone_auth: Arc<dyn PhoneAuthProvider>,
    storage: Arc<dyn DurableStorage>,
    config: AuthConfig,
    timeouts: Timeouts,
    state: AuthState,
    attempt: Option<Attempt>,
    current: Option<UserAccount>,
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("state", &self.state)
            .field("user_id", &self.current.as_ref().map(|a| &a.user_id))
            .finish_non_exhaustive()
    }
}

impl AuthManager {
    /// Create a manager with no session. Call [`Self::restore`] at startup.
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        phone_auth: Arc<dyn PhoneAuthProvider>,
        storage: Arc<dyn DurableStorage>,
        config: AuthConfig,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            accounts,
            phone_auth,
            storage,
            config,
            timeouts,
            state: AuthState::Idle,
            attempt: None,
            current: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> AuthState {
        self.state
    }

    #[must_use]
    pub const fn current_user(&self) -> Option<&UserAccount> {
        self.current.as_ref()
    }

    /// Session identity, if signed in.
    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.current.as_ref().map(|account| &account.user_id)
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    // =========================================================================
    // Signup
    // =========================================================================

    /// Validate the form and send a code to the new phone number.
    ///
    /// The account is only created once the code is confirmed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for bad input and
    /// `AuthError::Conflict` if the number is taken, both before any SMS is
    /// sent. Remote failures surface as `Timeout` or `Backend`.
    #[instrument(skip_all)]
    pub async fn signup(&mut self, request: &SignupRequest) -> Result<(), AuthError> {
        self.begin_attempt();
        match self.start_signup(request).await {
            Ok(attempt) => {
                tracing::info!(phone = %attempt.phone.masked(), "signup code sent");
                self.attempt = Some(attempt);
                self.transition(AuthState::VerificationPending);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    async fn start_signup(&self, request: &SignupRequest) -> Result<Attempt, AuthError> {
        let profile = request.validate()?;

        let existing = race(
            RemoteOperation::LoginLookup,
            self.timeouts.login_lookup,
            self.accounts.find_by_phone(&profile.phone_number),
        )
        .await??;
        if existing.is_some() {
            return Err(AuthError::Conflict);
        }

        let challenge = self.send_challenge(&profile.phone_number).await?;
        Ok(Attempt {
            phone: profile.phone_number.clone(),
            purpose: Purpose::Signup(profile),
            challenge: Some(challenge),
        })
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Look up the account for a phone number.
    ///
    /// With [`LoginPolicy::OtpChallenge`] a code is sent; with
    /// [`LoginPolicy::Direct`] the session is established immediately.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` for an unregistered number without
    /// sending a code.
    #[instrument(skip_all)]
    pub async fn login(&mut self, phone_number: &str) -> Result<LoginOutcome, AuthError> {
        self.begin_attempt();
        let account = match self.find_account(phone_number).await {
            Ok(account) => account,
            Err(e) => return Err(self.fail(e)),
        };

        match self.config.login_policy {
            LoginPolicy::Direct => {
                self.establish(account)?;
                Ok(LoginOutcome::Authenticated)
            }
            LoginPolicy::OtpChallenge => {
                match self.send_challenge(&account.phone_number).await {
                    Ok(challenge) => {
                        tracing::info!(phone = %account.phone_number.masked(), "login code sent");
                        self.attempt = Some(Attempt {
                            phone: account.phone_number.clone(),
                            purpose: Purpose::Login(account),
                            challenge: Some(challenge),
                        });
                        self.transition(AuthState::VerificationPending);
                        Ok(LoginOutcome::VerificationRequired)
                    }
                    Err(e) => Err(self.fail(e)),
                }
            }
        }
    }

    async fn find_account(&self, phone_number: &str) -> Result<UserAccount, AuthError> {
        let phone = forms::parse_phone(phone_number)?;
        race(
            RemoteOperation::LoginLookup,
            self.timeouts.login_lookup,
            self.accounts.find_by_phone(&phone),
        )
        .await??
        .ok_or(AuthError::NotFound)
    }

    // =========================================================================
    // Verification
    // =========================================================================

    /// Confirm the code the customer typed.
    ///
    /// A wrong code leaves the challenge in place for another try. An
    /// expired code releases it; call [`Self::resend_code`] for a new one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for input that is not six digits (no
    /// remote call is made), `AuthError::InvalidCode` or
    /// `AuthError::CodeExpired` for a rejected code, and
    /// `AuthError::InvalidState` when no verification is in progress.
    #[instrument(skip_all)]
    pub async fn verify_code(&mut self, code: &str) -> Result<UserAccount, AuthError> {
        if !matches!(
            self.state,
            AuthState::VerificationPending | AuthState::VerificationFailed
        ) {
            return Err(AuthError::InvalidState("no verification in progress"));
        }
        let code = VerificationCode::parse(code)?;

        if !self.attempt.as_ref().is_some_and(|a| a.challenge.is_some()) {
            return Err(AuthError::CodeExpired);
        }

        self.transition(AuthState::Verifying);
        let confirmed = match self.attempt.as_ref().and_then(|a| a.challenge.as_deref()) {
            Some(challenge) => {
                race(
                    RemoteOperation::ChallengeConfirm,
                    self.timeouts.challenge_confirm,
                    challenge.confirm(code.expose()),
                )
                .await
            }
            None => Err(AuthError::CodeExpired),
        };

        match confirmed.and_then(|result| result.map_err(AuthError::from_confirm)) {
            Ok(()) => self.finish_attempt().await,
            Err(e) => {
                if matches!(e, AuthError::CodeExpired)
                    && let Some(attempt) = self.attempt.as_mut()
                {
                    attempt.release_challenge();
                }
                tracing::info!(error = %e, "verification failed");
                self.transition(AuthState::VerificationFailed);
                Err(e)
            }
        }
    }

    /// Replace the pending challenge with a fresh code.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidState` when no verification is in
    /// progress, or the send failure. A failed resend can be retried.
    #[instrument(skip_all)]
    pub async fn resend_code(&mut self) -> Result<(), AuthError> {
        let Some(attempt) = self.attempt.as_mut() else {
            return Err(AuthError::InvalidState("no verification in progress"));
        };
        attempt.release_challenge();
        let phone = attempt.phone.clone();

        self.transition(AuthState::Submitting);
        match self.send_challenge(&phone).await {
            Ok(challenge) => {
                if let Some(attempt) = self.attempt.as_mut() {
                    attempt.challenge = Some(challenge);
                }
                tracing::info!(phone = %phone.masked(), "verification code resent");
                self.transition(AuthState::VerificationPending);
                Ok(())
            }
            Err(e) => {
                self.transition(AuthState::VerificationFailed);
                Err(e)
            }
        }
    }

    /// Abandon the attempt in progress.
    pub fn cancel(&mut self) {
        if let Some(mut attempt) = self.attempt.take() {
            attempt.release_challenge();
            tracing::debug!("verification cancelled");
        }
        if !self.is_authenticated() {
            self.transition(AuthState::Idle);
        }
    }

    async fn send_challenge(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Box<dyn PendingChallenge>, AuthError> {
        Ok(race(
            RemoteOperation::ChallengeSend,
            self.timeouts.challenge_send,
            self.phone_auth.send_code(phone, &self.config.challenge_anchor),
        )
        .await??)
    }

    /// The code was confirmed: create the account if signing up, then
    /// establish the session.
    async fn finish_attempt(&mut self) -> Result<UserAccount, AuthError> {
        let Some(mut attempt) = self.attempt.take() else {
            return Err(self.fail(AuthError::InvalidState("attempt vanished")));
        };
        attempt.release_challenge();

        let account = match attempt.purpose {
            Purpose::Login(account) => account,
            Purpose::Signup(profile) => {
                let account = UserAccount {
                    user_id: UserId::generate(),
                    display_name: profile.display_name,
                    phone_number: profile.phone_number,
                    email: profile.email,
                    gender: profile.gender,
                    birthdays: profile.birthdays,
                };
                let created = race(
                    RemoteOperation::Registration,
                    self.timeouts.registration,
                    self.accounts.create(&account),
                )
                .await
                .and_then(|result| result.map_err(AuthError::from));
                if let Err(e) = created {
                    return Err(self.fail(e));
                }
                tracing::info!(user_id = %account.user_id, "account created");
                account
            }
        };

        self.establish(account.clone())?;
        Ok(account)
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Re-establish the stored session at startup.
    ///
    /// Fails closed: if the profile cannot be fetched, or no longer exists,
    /// the stored id is cleared and the client starts signed out.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure after the session has been cleared.
    #[instrument(skip_all)]
    pub async fn restore(&mut self) -> Result<Option<UserAccount>, AuthError> {
        let stored = match self.storage.get(keys::SESSION_USER_ID) {
            Ok(stored) => stored,
            Err(e) => {
                self.drop_session();
                return Err(e.into());
            }
        };
        let Some(user_id) = stored.map(UserId::new) else {
            return Ok(None);
        };

        let fetched = race(
            RemoteOperation::ProfileFetch,
            self.timeouts.profile_fetch,
            self.accounts.get(&user_id),
        )
        .await
        .and_then(|result| result.map_err(AuthError::from));

        match fetched {
            Ok(Some(account)) => {
                tracing::info!(user_id = %account.user_id, "session restored");
                self.current = Some(account.clone());
                set_sentry_user(&account.user_id, account.email.as_ref().map(Email::as_str));
                self.transition(AuthState::Authenticated);
                Ok(Some(account))
            }
            Ok(None) => {
                tracing::warn!(%user_id, "stored session has no account, clearing");
                self.drop_session();
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "profile fetch failed, clearing session");
                self.drop_session();
                Err(e)
            }
        }
    }

    /// Sign out.
    ///
    /// Local state is always cleared first. The remote sign-out result is
    /// reported but never undoes the local logout.
    ///
    /// # Errors
    ///
    /// Returns the remote failure, after the local session is gone.
    #[instrument(skip_all)]
    pub async fn logout(&mut self) -> Result<(), AuthError> {
        self.cancel();
        if let Some(account) = &self.current {
            tracing::info!(user_id = %account.user_id, "logging out");
        }
        self.drop_session();
        add_breadcrumb("auth", "Logged out", None);

        race(
            RemoteOperation::SignOut,
            self.timeouts.sign_out,
            self.phone_auth.sign_out(),
        )
        .await?
        .map_err(|e| {
            tracing::warn!(error = %e, "remote sign-out failed");
            AuthError::Backend(e)
        })
    }

    fn establish(&mut self, account: UserAccount) -> Result<(), AuthError> {
        if let Err(e) = self
            .storage
            .set(keys::SESSION_USER_ID, account.user_id.as_str())
        {
            tracing::error!(error = %e, "failed to persist session");
            let _ = self.storage.remove(keys::SESSION_USER_ID);
            return Err(self.fail(e.into()));
        }

        set_sentry_user(&account.user_id, account.email.as_ref().map(Email::as_str));
        add_breadcrumb("auth", "Signed in", Some(&[("user_id", account.user_id.as_str())]));
        tracing::info!(user_id = %account.user_id, "authenticated");
        self.current = Some(account);
        self.transition(AuthState::Authenticated);
        Ok(())
    }

    fn drop_session(&mut self) {
        self.current = None;
        if let Err(e) = self.storage.remove(keys::SESSION_USER_ID) {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "failed to clear stored session");
        }
        clear_sentry_user();
        self.transition(AuthState::Idle);
    }

    // =========================================================================
    // State machine
    // =========================================================================

    /// Start a new attempt, releasing any challenge left from the last one.
    fn begin_attempt(&mut self) {
        if let Some(mut attempt) = self.attempt.take() {
            tracing::debug!("releasing previous challenge");
            attempt.release_challenge();
        }
        self.transition(AuthState::Submitting);
    }

    fn fail(&mut self, error: AuthError) -> AuthError {
        if let Some(mut attempt) = self.attempt.take() {
            attempt.release_challenge();
        }
        tracing::info!(error = %error, "auth attempt failed");
        self.transition(AuthState::Failed);
        error
    }

    fn transition(&mut self, next: AuthState) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "auth state");
            self.state = next;
        }
    }
}

impl Drop for AuthManager {
    fn drop(&mut self) {
        if let Some(mut attempt) = self.attempt.take() {
            attempt.release_challenge();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use katcakes_core::{Birthday, Gender};

    use super::*;
    use crate::backend::memory::{InMemoryBackend, ScriptedPhoneAuth};
    use crate::storage::MemoryStorage;

    const CODE: &str = "123456";
    const PHONE: &str = "+258841234567";

    struct Harness {
        backend: Arc<InMemoryBackend>,
        sms: ScriptedPhoneAuth,
        storage: Arc<MemoryStorage>,
        auth: AuthManager,
    }

    fn harness(policy: LoginPolicy) -> Harness {
        let backend = Arc::new(InMemoryBackend::new());
        let sms = ScriptedPhoneAuth::new(CODE);
        let storage = Arc::new(MemoryStorage::new());
        let auth = AuthManager::new(
            backend.clone(),
            Arc::new(sms.clone()),
            storage.clone(),
            AuthConfig {
                login_policy: policy,
                ..AuthConfig::default()
            },
            Timeouts::default(),
        );
        Harness {
            backend,
            sms,
            storage,
            auth,
        }
    }

    fn account(user_id: &str) -> UserAccount {
        UserAccount {
            user_id: UserId::new(user_id),
            display_name: "Ana".to_owned(),
            phone_number: PhoneNumber::parse(PHONE).unwrap(),
            email: None,
            gender: Some(Gender::Female),
            birthdays: vec![Birthday {
                name: "Ana".to_owned(),
                date: NaiveDate::from_ymd_opt(1990, 4, 7).unwrap(),
            }],
        }
    }

    fn signup_request() -> SignupRequest {
        SignupRequest {
            display_name: "Ana".to_owned(),
            phone_number: "841234567".to_owned(),
            email: "ana@example.com".to_owned(),
            gender: None,
            birthdays: vec![BirthdayInput {
                name: "Ana".to_owned(),
                date: "07/04/1990".to_owned(),
            }],
        }
    }

    fn stored_session(h: &Harness) -> Option<String> {
        h.storage.get(keys::SESSION_USER_ID).unwrap()
    }

    #[tokio::test]
    async fn test_signup_then_verify_creates_account_and_session() {
        let mut h = harness(LoginPolicy::OtpChallenge);

        h.auth.signup(&signup_request()).await.unwrap();
        assert_eq!(h.auth.state(), AuthState::VerificationPending);
        assert_eq!(h.sms.sends(), 1);
        assert_eq!(h.sms.last_anchor().as_deref(), Some("recaptcha-container"));
        assert!(stored_session(&h).is_none());

        let account = h.auth.verify_code(CODE).await.unwrap();
        assert_eq!(h.auth.state(), AuthState::Authenticated);
        assert_eq!(account.phone_number.as_str(), PHONE);
        assert_eq!(h.backend.account_count(), 1);
        assert_eq!(stored_session(&h).as_deref(), Some(account.user_id.as_str()));
        assert_eq!(h.sms.live_challenges(), 0);
    }

    #[tokio::test]
    async fn test_signup_with_registered_phone_is_conflict_without_sms() {
        let mut h = harness(LoginPolicy::OtpChallenge);
        h.backend.seed_account(account("u-1"));

        let err = h.auth.signup(&signup_request()).await.unwrap_err();

        assert!(matches!(err, AuthError::Conflict));
        assert_eq!(h.sms.sends(), 0);
        assert_eq!(h.auth.state(), AuthState::Failed);
    }

    #[tokio::test]
    async fn test_invalid_signup_form_makes_no_remote_call() {
        let mut h = harness(LoginPolicy::OtpChallenge);
        let mut request = signup_request();
        request.birthdays.clear();

        let err = h.auth.signup(&request).await.unwrap_err();

        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(h.sms.sends(), 0);
    }

    #[tokio::test]
    async fn test_repeated_signup_releases_previous_challenge() {
        let mut h = harness(LoginPolicy::OtpChallenge);

        h.auth.signup(&signup_request()).await.unwrap();
        h.auth.signup(&signup_request()).await.unwrap();

        assert_eq!(h.sms.sends(), 2);
        assert_eq!(h.sms.live_challenges(), 1);
    }

    #[tokio::test]
    async fn test_login_unknown_phone_is_not_found_without_challenge() {
        let mut h = harness(LoginPolicy::OtpChallenge);

        let err = h.auth.login("84 123 4567").await.unwrap_err();

        assert!(matches!(err, AuthError::NotFound));
        assert_eq!(h.sms.sends(), 0);
        assert_eq!(h.sms.live_challenges(), 0);
        assert!(matches!(
            h.auth.verify_code(CODE).await,
            Err(AuthError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_login_with_otp() {
        let mut h = harness(LoginPolicy::OtpChallenge);
        h.backend.seed_account(account("u-1"));

        let outcome = h.auth.login("841234567").await.unwrap();
        assert_eq!(outcome, LoginOutcome::VerificationRequired);
        assert!(!h.auth.is_authenticated());

        let account = h.auth.verify_code(CODE).await.unwrap();
        assert_eq!(account.user_id, UserId::new("u-1"));
        assert_eq!(h.auth.user_id(), Some(&UserId::new("u-1")));
        assert_eq!(stored_session(&h).as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn test_direct_login_skips_challenge() {
        let mut h = harness(LoginPolicy::Direct);
        h.backend.seed_account(account("u-1"));

        let outcome = h.auth.login(PHONE).await.unwrap();

        assert_eq!(outcome, LoginOutcome::Authenticated);
        assert_eq!(h.sms.sends(), 0);
        assert_eq!(h.auth.state(), AuthState::Authenticated);
        assert_eq!(stored_session(&h).as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn test_wrong_code_is_retryable_on_same_challenge() {
        let mut h = harness(LoginPolicy::OtpChallenge);
        h.backend.seed_account(account("u-1"));
        h.auth.login(PHONE).await.unwrap();

        let err = h.auth.verify_code("000000").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCode));
        assert_eq!(h.auth.state(), AuthState::VerificationFailed);
        assert!(!h.auth.is_authenticated());

        h.auth.verify_code(CODE).await.unwrap();
        assert_eq!(h.sms.sends(), 1);
        assert_eq!(h.sms.confirms(), 2);
    }

    #[tokio::test]
    async fn test_malformed_code_is_rejected_locally() {
        let mut h = harness(LoginPolicy::OtpChallenge);
        h.backend.seed_account(account("u-1"));
        h.auth.login(PHONE).await.unwrap();

        let err = h.auth.verify_code("12 34").await.unwrap_err();

        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(h.sms.confirms(), 0);
        assert_eq!(h.auth.state(), AuthState::VerificationPending);
    }

    #[tokio::test]
    async fn test_expired_code_requires_resend() {
        let mut h = harness(LoginPolicy::OtpChallenge);
        h.backend.seed_account(account("u-1"));
        h.auth.login(PHONE).await.unwrap();
        h.sms.set_expired(true);

        let err = h.auth.verify_code(CODE).await.unwrap_err();
        assert!(matches!(err, AuthError::CodeExpired));
        assert_eq!(h.sms.live_challenges(), 0);

        // No live challenge: rejected without another confirm call.
        h.sms.set_expired(false);
        assert!(matches!(
            h.auth.verify_code(CODE).await,
            Err(AuthError::CodeExpired)
        ));
        assert_eq!(h.sms.confirms(), 1);

        h.auth.resend_code().await.unwrap();
        assert_eq!(h.sms.sends(), 2);
        assert_eq!(h.auth.state(), AuthState::VerificationPending);
        h.auth.verify_code(CODE).await.unwrap();
        assert!(h.auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_registration_failure_leaves_no_session() {
        let mut h = harness(LoginPolicy::OtpChallenge);
        h.auth.signup(&signup_request()).await.unwrap();
        h.backend.set_unavailable(true);

        let err = h.auth.verify_code(CODE).await.unwrap_err();

        assert!(matches!(err, AuthError::Backend(_)));
        assert_eq!(h.auth.state(), AuthState::Failed);
        assert!(!h.auth.is_authenticated());
        assert!(stored_session(&h).is_none());
        assert_eq!(h.sms.live_challenges(), 0);
    }

    #[tokio::test]
    async fn test_send_failure_is_mapped_to_backend_error() {
        let mut h = harness(LoginPolicy::OtpChallenge);
        h.sms.set_send_unavailable(true);

        let err = h.auth.signup(&signup_request()).await.unwrap_err();

        assert!(matches!(&err, AuthError::Backend(e) if e.code == "auth/too-many-requests"));
        assert!(err.user_message().starts_with("Demasiadas tentativas"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookup_times_out() {
        let mut h = harness(LoginPolicy::OtpChallenge);
        h.backend.seed_account(account("u-1"));
        h.backend.set_delay(Some(Duration::from_secs(60)));

        let err = h.auth.login(PHONE).await.unwrap_err();

        assert!(matches!(
            err,
            AuthError::Timeout(RemoteOperation::LoginLookup)
        ));
        assert_eq!(h.sms.sends(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_confirm_times_out() {
        let mut h = harness(LoginPolicy::OtpChallenge);
        h.backend.seed_account(account("u-1"));
        h.auth.login(PHONE).await.unwrap();
        h.sms.set_confirm_delay(Some(Duration::from_secs(60)));

        let err = h.auth.verify_code(CODE).await.unwrap_err();

        assert!(matches!(
            err,
            AuthError::Timeout(RemoteOperation::ChallengeConfirm)
        ));
        assert_eq!(h.auth.state(), AuthState::VerificationFailed);
        assert!(!h.auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_existing_session() {
        let mut h = harness(LoginPolicy::OtpChallenge);
        h.backend.seed_account(account("u-1"));
        h.storage.set(keys::SESSION_USER_ID, "u-1").unwrap();

        let restored = h.auth.restore().await.unwrap();

        assert_eq!(restored.map(|a| a.user_id), Some(UserId::new("u-1")));
        assert_eq!(h.auth.state(), AuthState::Authenticated);
    }

    #[tokio::test]
    async fn test_restore_without_session() {
        let mut h = harness(LoginPolicy::OtpChallenge);
        assert!(h.auth.restore().await.unwrap().is_none());
        assert!(!h.auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_restore_clears_stored_id() {
        let mut h = harness(LoginPolicy::OtpChallenge);
        h.backend.seed_account(account("u-1"));
        h.storage.set(keys::SESSION_USER_ID, "u-1").unwrap();
        h.backend.set_unavailable(true);

        assert!(h.auth.restore().await.is_err());

        assert!(!h.auth.is_authenticated());
        assert!(stored_session(&h).is_none());
    }

    #[tokio::test]
    async fn test_restore_of_deleted_account_clears_stored_id() {
        let mut h = harness(LoginPolicy::OtpChallenge);
        h.storage.set(keys::SESSION_USER_ID, "gone").unwrap();

        assert!(h.auth.restore().await.unwrap().is_none());
        assert!(stored_session(&h).is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_session_even_when_remote_fails() {
        let mut h = harness(LoginPolicy::Direct);
        h.backend.seed_account(account("u-1"));
        h.auth.login(PHONE).await.unwrap();
        h.sms.set_sign_out_fails(true);

        let result = h.auth.logout().await;

        assert!(matches!(result, Err(AuthError::Backend(_))));
        assert!(!h.auth.is_authenticated());
        assert_eq!(h.auth.state(), AuthState::Idle);
        assert!(stored_session(&h).is_none());
        assert_eq!(h.sms.sign_outs(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_clears_session_when_remote_times_out() {
        let mut h = harness(LoginPolicy::Direct);
        h.backend.seed_account(account("u-1"));
        h.auth.login(PHONE).await.unwrap();
        h.sms.set_sign_out_delay(Some(Duration::from_secs(60)));

        let result = h.auth.logout().await;

        assert!(matches!(
            result,
            Err(AuthError::Timeout(RemoteOperation::SignOut))
        ));
        assert!(!h.auth.is_authenticated());
        assert!(stored_session(&h).is_none());
    }

    #[tokio::test]
    async fn test_cancel_releases_challenge() {
        let mut h = harness(LoginPolicy::OtpChallenge);
        h.auth.signup(&signup_request()).await.unwrap();

        h.auth.cancel();

        assert_eq!(h.sms.live_challenges(), 0);
        assert_eq!(h.auth.state(), AuthState::Idle);
    }
}
