//! Authentication error types.

use thiserror::Error;

use crate::backend::{BackendError, codes};
use crate::config::RemoteOperation;
use crate::storage::StorageError;
use crate::validation::ValidationErrors;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Local input rejected before any remote call.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// No account is registered with the phone number.
    #[error("no account registered for this phone number")]
    NotFound,

    /// An account already exists for the phone number.
    #[error("phone number already registered")]
    Conflict,

    /// The code did not match. The same challenge can be retried.
    #[error("verification code is invalid")]
    InvalidCode,

    /// The challenge expired. A new code must be requested.
    #[error("verification code has expired")]
    CodeExpired,

    /// The remote call did not settle before its deadline.
    #[error("{0} timed out")]
    Timeout(RemoteOperation),

    /// The backend rejected the call.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// The operation does not apply to the current state.
    #[error("invalid auth state: {0}")]
    InvalidState(&'static str),

    /// The session could not be written to durable storage.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}

const GENERIC_MESSAGE: &str = "Ocorreu um erro. Por favor, tente novamente.";

/// Customer-facing message for a backend error code.
#[must_use]
pub fn backend_message(code: &str) -> &'static str {
    match code {
        codes::INVALID_PHONE_NUMBER => "Número de telefone inválido.",
        codes::TOO_MANY_REQUESTS => {
            "Demasiadas tentativas. Aguarde alguns minutos e tente novamente."
        }
        codes::QUOTA_EXCEEDED => "Limite de SMS excedido. Tente novamente mais tarde.",
        codes::CAPTCHA_CHECK_FAILED => {
            "Falha na verificação de segurança. Recarregue a página e tente novamente."
        }
        codes::NETWORK_REQUEST_FAILED => "Erro de rede. Verifique a sua ligação à internet.",
        codes::USER_DISABLED => "Esta conta foi desativada.",
        codes::MISSING_VERIFICATION_ID => "Sessão de verificação inválida. Solicite um novo código.",
        codes::PERMISSION_DENIED => "Sem permissão para aceder aos dados da conta.",
        codes::UNAVAILABLE => "Serviço temporariamente indisponível. Tente novamente mais tarde.",
        _ => GENERIC_MESSAGE,
    }
}

impl AuthError {
    /// Map a failed challenge confirmation.
    pub(crate) fn from_confirm(error: BackendError) -> Self {
        match error.code.as_str() {
            codes::INVALID_VERIFICATION_CODE => Self::InvalidCode,
            codes::CODE_EXPIRED => Self::CodeExpired,
            _ => Self::Backend(error),
        }
    }

    /// Whether the customer can retry without starting over.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidCode | Self::Timeout(_) | Self::Backend(_)
        )
    }

    /// Localized message to show the customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.errors().first().map_or_else(
                || "Por favor, preencha todos os campos obrigatórios.".to_owned(),
                |e| e.message.clone(),
            ),
            Self::NotFound => {
                "Número de telefone não registado. Por favor, crie uma conta.".to_owned()
            }
            Self::Conflict => {
                "Este número de telefone já está registado. Por favor, faça login.".to_owned()
            }
            Self::InvalidCode => "Código de verificação inválido. Tente novamente.".to_owned(),
            Self::CodeExpired => {
                "O código de verificação expirou. Solicite um novo código.".to_owned()
            }
            Self::Timeout(_) => "A operação demorou demasiado. Verifique a sua ligação à \
                                 internet e tente novamente."
                .to_owned(),
            Self::Backend(error) => backend_message(&error.code).to_owned(),
            Self::InvalidState(_) => {
                "Sessão de verificação inválida. Por favor, recomece.".to_owned()
            }
            Self::Storage(_) => GENERIC_MESSAGE.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_errors_map_to_challenge_failures() {
        assert!(matches!(
            AuthError::from_confirm(BackendError::new(codes::INVALID_VERIFICATION_CODE, "x")),
            AuthError::InvalidCode
        ));
        assert!(matches!(
            AuthError::from_confirm(BackendError::new(codes::CODE_EXPIRED, "x")),
            AuthError::CodeExpired
        ));
        assert!(matches!(
            AuthError::from_confirm(BackendError::unavailable()),
            AuthError::Backend(_)
        ));
    }

    #[test]
    fn test_unknown_backend_code_falls_back() {
        let err = AuthError::Backend(BackendError::new("auth/something-new", "?"));
        assert_eq!(err.user_message(), GENERIC_MESSAGE);

        let err = AuthError::Backend(BackendError::new(codes::TOO_MANY_REQUESTS, "?"));
        assert!(err.user_message().starts_with("Demasiadas tentativas"));
    }

    #[test]
    fn test_timeout_points_at_connectivity() {
        let err = AuthError::Timeout(RemoteOperation::ChallengeSend);
        assert_eq!(err.to_string(), "challenge send timed out");
        assert!(err.user_message().contains("ligação à internet"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_expiry_is_not_retryable_in_place() {
        assert!(AuthError::InvalidCode.is_retryable());
        assert!(!AuthError::CodeExpired.is_retryable());
        assert!(!AuthError::Conflict.is_retryable());
    }
}
