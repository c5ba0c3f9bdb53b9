//! services/operator_app/src/session/error.rs
//!
//! Errors a login can end with.

/// Why a login did not produce a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("A session is already active")]
    AlreadyAuthenticated,
    /// A newer login or a logout started before this login finished.
    #[error("Login superseded by a newer request")]
    Superseded,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Authentication provider failed: {0}")]
    Provider(String),
}

impl AuthError {
    /// Text for the transient notification shown to the operator.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => {
                "Credenciales inválidas. Verifica tu número de empleado y contraseña."
            }
            Self::AlreadyAuthenticated => "Ya tienes una sesión activa.",
            Self::Superseded => "La solicitud fue reemplazada por una más reciente.",
            Self::Unauthorized => "Tu sesión expiró. Inicia sesión nuevamente.",
            Self::Provider(_) => "No fue posible iniciar sesión. Intenta más tarde.",
        }
    }
}
