//! HTTP implementation of [`Backend`].

use crate::backend::Backend;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::recognition::Recognition;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use votesecure_types::wire::{
    CandidateWire, CaptureRequest, CaptureResponse, CompleteLoginRequest, CompleteLoginResponse,
    DetectRequest, DetectResponse, LoginRequest, LoginResponse, RecognizeRequest,
    RecognizeResponse, RegisterRequest, RegisterResponse, ResultsResponse, StatsResponse,
    SubmitVoteRequest, SubmitVoteResponse, VerifyOtpRequest, VerifyOtpResponse,
};
use votesecure_types::SessionToken;

/// Client for the VoteSecure backend.
///
/// Bodies are read as JSON whatever the status code: the backend reports
/// refusals as `{"error": "..."}` with a 4xx status, and those messages are
/// shown to the voter unchanged.
pub struct ApiClient {
    base_url: String,
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .unwrap_or_default();
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn post<Req, Resp>(
        &self,
        path: &str,
        bearer: Option<&SessionToken>,
        body: &Req,
    ) -> Result<Resp, ClientError>
    where
        Req: Serialize + Sync + ?Sized,
        Resp: DeserializeOwned,
    {
        tracing::debug!(path, "POST");
        let mut request = self.http_client.post(self.url(path)).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token.as_str());
        }
        let (status, value) = read_json(request.send().await?).await?;
        decode(status, value)
    }

    async fn get<Resp: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&SessionToken>,
    ) -> Result<Resp, ClientError> {
        tracing::debug!(path, "GET");
        let mut request = self.http_client.get(self.url(path));
        if let Some(token) = bearer {
            request = request.bearer_auth(token.as_str());
        }
        let (status, value) = read_json(request.send().await?).await?;
        decode(status, value)
    }
}

/// Read the body as JSON. A non-JSON body on an error status is reported as that status.
async fn read_json(response: reqwest::Response) -> Result<(StatusCode, Value), ClientError> {
    let status = response.status();
    let text = response.text().await?;
    match serde_json::from_str(&text) {
        Ok(value) => Ok((status, value)),
        Err(_) if !status.is_success() => Err(ClientError::Status(status.as_u16())),
        Err(e) => Err(ClientError::InvalidResponse(format!(
            "body is not JSON: {e}"
        ))),
    }
}

fn rejection(value: &Value) -> Option<String> {
    value
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn decode<T: DeserializeOwned>(status: StatusCode, value: Value) -> Result<T, ClientError> {
    if let Some(message) = rejection(&value) {
        return Err(ClientError::Rejected(message));
    }
    if !status.is_success() {
        return Err(ClientError::Status(status.as_u16()));
    }
    serde_json::from_value(value).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl Backend for ApiClient {
    async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse, ClientError> {
        self.post("/auth/register", None, req).await
    }

    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError> {
        self.post("/auth/login", None, req).await
    }

    async fn verify_otp(&self, req: &VerifyOtpRequest) -> Result<VerifyOtpResponse, ClientError> {
        self.post("/auth/verify-otp", None, req).await
    }

    async fn detect_face(&self, image: &str) -> Result<DetectResponse, ClientError> {
        let req = DetectRequest {
            image: image.to_string(),
        };
        self.post("/face/detect-single", None, &req).await
    }

    async fn capture_faces(&self, req: &CaptureRequest) -> Result<CaptureResponse, ClientError> {
        self.post("/face/capture", None, req).await
    }

    /// Unlike the other endpoints, a 4xx answer here is still a recognition
    /// verdict: 403 means "someone else's face", anything else "not yet".
    async fn recognize_face(&self, req: &RecognizeRequest) -> Result<Recognition, ClientError> {
        tracing::debug!(path = "/face/recognize", "POST");
        let response = self
            .http_client
            .post(self.url("/face/recognize"))
            .json(req)
            .send()
            .await?;
        let (status, value) = read_json(response).await?;
        if status.is_server_error() {
            return Err(ClientError::Status(status.as_u16()));
        }
        if let Some(message) = rejection(&value) {
            return Err(ClientError::Rejected(message));
        }
        let body: RecognizeResponse = serde_json::from_value(value)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(Recognition::from_response(
            body,
            status == StatusCode::FORBIDDEN,
        ))
    }

    async fn complete_login(
        &self,
        token: &SessionToken,
    ) -> Result<CompleteLoginResponse, ClientError> {
        let req = CompleteLoginRequest {
            session_token: token.clone(),
        };
        self.post("/auth/complete-login", None, &req).await
    }

    async fn candidates(
        &self,
        bearer: Option<&SessionToken>,
    ) -> Result<Vec<CandidateWire>, ClientError> {
        self.get("/candidates", bearer).await
    }

    async fn submit_vote(
        &self,
        bearer: Option<&SessionToken>,
        req: &SubmitVoteRequest,
    ) -> Result<SubmitVoteResponse, ClientError> {
        self.post("/vote/submit", bearer, req).await
    }

    async fn results(&self, bearer: Option<&SessionToken>) -> Result<ResultsResponse, ClientError> {
        self.get("/vote/results", bearer).await
    }

    async fn stats(&self, bearer: Option<&SessionToken>) -> Result<StatsResponse, ClientError> {
        self.get("/vote/stats", bearer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trailing_slash_is_dropped() {
        let client = ApiClient::new(&ClientConfig {
            base_url: "http://vote.local/".into(),
            ..Default::default()
        });
        assert_eq!(client.url("/auth/login"), "http://vote.local/api/auth/login");
    }

    #[test]
    fn error_key_wins_over_status() {
        let result: Result<VerifyOtpResponse, _> =
            decode(StatusCode::BAD_REQUEST, json!({"error": "Code OTP invalide"}));
        assert_eq!(
            result.unwrap_err(),
            ClientError::Rejected("Code OTP invalide".into())
        );
    }

    #[test]
    fn error_status_without_message() {
        let result: Result<VerifyOtpResponse, _> = decode(StatusCode::BAD_GATEWAY, json!({}));
        assert_eq!(result.unwrap_err(), ClientError::Status(502));
    }

    #[test]
    fn wrong_shape_is_invalid_response() {
        let result: Result<Vec<CandidateWire>, _> = decode(StatusCode::OK, json!({"id": 1}));
        assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
    }
}
