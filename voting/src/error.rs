use thiserror::Error;
use votesecure_client::ClientError;
use votesecure_session::SessionError;
use votesecure_types::{CandidateId, VoteRecord};
use votesecure_wizard::ErrorCategory;

#[derive(Debug, Error)]
pub enum VotingError {
    #[error("no authenticated voter in the session")]
    NotAuthenticated,

    /// The session already holds a vote record. The record is absent when the
    /// stored value only says `voted` without the details.
    #[error("this voter has already voted")]
    AlreadyVoted(Option<Box<VoteRecord>>),

    #[error("no candidate selected")]
    NoSelection,

    #[error("candidate {0} is not on the ballot")]
    UnknownCandidate(CandidateId),

    #[error("{0}")]
    Rejected(String),

    #[error("unexpected response from backend: {0}")]
    UnexpectedResponse(String),

    #[error("backend communication failed: {0}")]
    Transport(ClientError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<ClientError> for VotingError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Rejected(message) => VotingError::Rejected(message),
            other => VotingError::Transport(other),
        }
    }
}

impl VotingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            VotingError::NoSelection | VotingError::UnknownCandidate(_) => {
                ErrorCategory::Validation
            }
            VotingError::NotAuthenticated
            | VotingError::AlreadyVoted(_)
            | VotingError::Rejected(_)
            | VotingError::UnexpectedResponse(_) => ErrorCategory::Backend,
            VotingError::Transport(_) => ErrorCategory::Transport,
            VotingError::Session(_) => ErrorCategory::Resource,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            VotingError::NotAuthenticated => {
                "Vous devez vous connecter pour accéder à cette page".into()
            }
            VotingError::AlreadyVoted(_) => {
                "Vous avez déjà participé à cette élection. Merci pour votre participation !"
                    .into()
            }
            VotingError::NoSelection => "Veuillez sélectionner un candidat.".into(),
            VotingError::UnknownCandidate(_) => "Candidat inconnu.".into(),
            VotingError::Rejected(message) | VotingError::UnexpectedResponse(message) => {
                message.clone()
            }
            VotingError::Transport(_) => "Erreur de communication avec le serveur.".into(),
            VotingError::Session(_) => "Stockage de session indisponible.".into(),
        }
    }
}
