//! The backend contract as a trait.

use crate::error::ClientError;
use crate::recognition::Recognition;
use async_trait::async_trait;
use votesecure_types::wire::{
    CandidateWire, CaptureRequest, CaptureResponse, CompleteLoginResponse, DetectResponse,
    LoginRequest, LoginResponse, RecognizeRequest, RegisterRequest, RegisterResponse,
    ResultsResponse, StatsResponse, SubmitVoteRequest, SubmitVoteResponse, VerifyOtpRequest,
    VerifyOtpResponse,
};
use votesecure_types::SessionToken;

/// One method per backend endpoint.
///
/// Methods return `Err(ClientError::Rejected)` when the backend answers with an
/// `error` message; successful bodies are returned as-is and the caller decides
/// whether the `next_step` it carries is the one it expected.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /api/auth/register`
    async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse, ClientError>;

    /// `POST /api/auth/login`
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError>;

    /// `POST /api/auth/verify-otp`
    async fn verify_otp(&self, req: &VerifyOtpRequest) -> Result<VerifyOtpResponse, ClientError>;

    /// `POST /api/face/detect-single`
    async fn detect_face(&self, image: &str) -> Result<DetectResponse, ClientError>;

    /// `POST /api/face/capture`
    async fn capture_faces(&self, req: &CaptureRequest) -> Result<CaptureResponse, ClientError>;

    /// `POST /api/face/recognize`
    async fn recognize_face(&self, req: &RecognizeRequest) -> Result<Recognition, ClientError>;

    /// `POST /api/auth/complete-login`
    async fn complete_login(
        &self,
        token: &SessionToken,
    ) -> Result<CompleteLoginResponse, ClientError>;

    /// `GET /api/candidates`
    async fn candidates(
        &self,
        bearer: Option<&SessionToken>,
    ) -> Result<Vec<CandidateWire>, ClientError>;

    /// `POST /api/vote/submit`
    async fn submit_vote(
        &self,
        bearer: Option<&SessionToken>,
        req: &SubmitVoteRequest,
    ) -> Result<SubmitVoteResponse, ClientError>;

    /// `GET /api/vote/results`
    async fn results(&self, bearer: Option<&SessionToken>) -> Result<ResultsResponse, ClientError>;

    /// `GET /api/vote/stats`
    async fn stats(&self, bearer: Option<&SessionToken>) -> Result<StatsResponse, ClientError>;
}
