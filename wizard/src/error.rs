use crate::camera::CameraError;
use crate::validation::ValidationErrors;
use thiserror::Error;
use votesecure_client::ClientError;
use votesecure_session::SessionError;

/// Where a failure came from, which decides how it is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caught before anything was sent; shown per field.
    Validation,
    /// The backend refused or judged against the request; its message is shown verbatim.
    Backend,
    /// The exchange itself failed; shown as a generic communication error.
    Transport,
    /// A local resource (camera, session storage) is unavailable.
    Resource,
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("invalid form: {0}")]
    Invalid(ValidationErrors),

    #[error("{0}")]
    Rejected(String),

    #[error("unexpected response from backend: {0}")]
    UnexpectedResponse(String),

    #[error("backend communication failed: {0}")]
    Transport(ClientError),

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("wizard session expired")]
    SessionExpired,

    #[error("only {accepted}/{quota} face images accepted after {attempts} attempts")]
    CaptureExhausted {
        accepted: usize,
        quota: usize,
        attempts: u32,
    },

    #[error("face does not match the session")]
    FaceMismatch(Option<String>),

    #[error("face not recognized after {attempts} attempts")]
    RecognitionExhausted {
        attempts: u32,
        message: Option<String>,
    },

    #[error("no face detected after {ticks} frames")]
    NoFaceDetected { ticks: u32 },

    #[error("face enrollment has not succeeded yet")]
    EnrollmentPending,

    #[error("stopped")]
    Stopped,

    #[error("resend throttled for {0} more seconds")]
    ResendThrottled(u32),

    #[error("step {expected} is not the active step ({current})")]
    WrongStep { expected: u8, current: u8 },
}

impl From<ClientError> for WizardError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Rejected(message) => WizardError::Rejected(message),
            other => WizardError::Transport(other),
        }
    }
}

impl From<ValidationErrors> for WizardError {
    fn from(e: ValidationErrors) -> Self {
        WizardError::Invalid(e)
    }
}

impl WizardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WizardError::Invalid(_)
            | WizardError::Stopped
            | WizardError::EnrollmentPending
            | WizardError::ResendThrottled(_)
            | WizardError::WrongStep { .. } => ErrorCategory::Validation,
            WizardError::Rejected(_)
            | WizardError::UnexpectedResponse(_)
            | WizardError::SessionExpired
            | WizardError::CaptureExhausted { .. }
            | WizardError::FaceMismatch(_)
            | WizardError::RecognitionExhausted { .. }
            | WizardError::NoFaceDetected { .. } => ErrorCategory::Backend,
            WizardError::Transport(_) => ErrorCategory::Transport,
            WizardError::Camera(_) | WizardError::Session(_) => ErrorCategory::Resource,
        }
    }

    /// Text shown to the voter.
    pub fn user_message(&self) -> String {
        match self {
            WizardError::Invalid(_) => "Veuillez corriger les erreurs".into(),
            WizardError::Rejected(message) | WizardError::UnexpectedResponse(message) => {
                message.clone()
            }
            WizardError::Transport(_) => "Erreur de communication avec le serveur.".into(),
            WizardError::Camera(e) => e.user_message().into(),
            WizardError::Session(_) => "Stockage de session indisponible.".into(),
            WizardError::SessionExpired => "Session expirée. Veuillez recommencer.".into(),
            WizardError::CaptureExhausted { .. } => {
                "Impossible de détecter suffisamment de visages. \
                 Veuillez améliorer l'éclairage et réessayer."
                    .into()
            }
            WizardError::FaceMismatch(message) => message
                .clone()
                .unwrap_or_else(|| "Le visage reconnu ne correspond pas à la session.".into()),
            WizardError::RecognitionExhausted { message, .. } => message
                .clone()
                .unwrap_or_else(|| "La reconnaissance a échoué.".into()),
            WizardError::NoFaceDetected { .. } => {
                "Aucun visage détecté. Rapprochez-vous et regardez la caméra.".into()
            }
            WizardError::EnrollmentPending => {
                "Veuillez d'abord terminer la capture faciale.".into()
            }
            WizardError::Stopped => "Opération annulée.".into(),
            WizardError::ResendThrottled(secs) => {
                format!("Veuillez patienter {secs}s avant de renvoyer le code.")
            }
            WizardError::WrongStep { .. } => "Étape invalide.".into(),
        }
    }
}
