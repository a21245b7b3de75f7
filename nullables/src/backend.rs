//! Nullable backend: scripted responses, recorded calls.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use votesecure_client::{Backend, ClientError, Recognition};
use votesecure_types::wire::{
    CandidateWire, CaptureRequest, CaptureResponse, CompleteLoginResponse, DetectResponse,
    LoginRequest, LoginResponse, RecognizeRequest, RegisterRequest, RegisterResponse,
    ResultsResponse, StatsResponse, SubmitVoteRequest, SubmitVoteResponse, VerifyOtpRequest,
    VerifyOtpResponse,
};
use votesecure_types::{CandidateId, ElecteurId, NextStep, SessionToken};

/// A recorded backend call. Image payloads are not kept.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Register(RegisterRequest),
    Login(LoginRequest),
    VerifyOtp(VerifyOtpRequest),
    DetectFace,
    CaptureFaces {
        electeur_id: ElecteurId,
        images: usize,
    },
    RecognizeFace,
    CompleteLogin,
    Candidates {
        bearer: Option<String>,
    },
    SubmitVote {
        bearer: Option<String>,
        candidat_id: CandidateId,
        session_token: Option<String>,
    },
    Results,
    Stats,
}

type Scripted<T> = Mutex<VecDeque<Result<T, ClientError>>>;
type Detector = Box<dyn FnMut(u32) -> Result<DetectResponse, ClientError> + Send>;

/// A backend that answers from per-endpoint queues.
///
/// Each call pops the next scripted answer for its endpoint; an empty queue
/// answers `ClientError::Unreachable`. Face detection is a closure over the
/// 1-based detect call number and defaults to "face detected".
pub struct NullBackend {
    calls: Mutex<Vec<Call>>,
    register: Scripted<RegisterResponse>,
    login: Scripted<LoginResponse>,
    verify_otp: Scripted<VerifyOtpResponse>,
    capture: Scripted<CaptureResponse>,
    recognize: Scripted<Recognition>,
    complete_login: Scripted<CompleteLoginResponse>,
    candidates: Scripted<Vec<CandidateWire>>,
    submit_vote: Scripted<SubmitVoteResponse>,
    results: Scripted<ResultsResponse>,
    stats: Scripted<StatsResponse>,
    detector: Mutex<Detector>,
    detect_calls: Mutex<u32>,
}

fn pop<T>(queue: &Scripted<T>, endpoint: &str) -> Result<T, ClientError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(ClientError::Unreachable(format!("no scripted {endpoint} response"))))
}

impl NullBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            register: Mutex::default(),
            login: Mutex::default(),
            verify_otp: Mutex::default(),
            capture: Mutex::default(),
            recognize: Mutex::default(),
            complete_login: Mutex::default(),
            candidates: Mutex::default(),
            submit_vote: Mutex::default(),
            results: Mutex::default(),
            stats: Mutex::default(),
            detector: Mutex::new(Box::new(|_| Ok(DetectResponse::detected()))),
            detect_calls: Mutex::new(0),
        }
    }

    pub fn push_register(&self, response: Result<RegisterResponse, ClientError>) -> &Self {
        self.register.lock().unwrap().push_back(response);
        self
    }

    pub fn push_login(&self, response: Result<LoginResponse, ClientError>) -> &Self {
        self.login.lock().unwrap().push_back(response);
        self
    }

    pub fn push_verify_otp(&self, response: Result<VerifyOtpResponse, ClientError>) -> &Self {
        self.verify_otp.lock().unwrap().push_back(response);
        self
    }

    pub fn push_capture(&self, response: Result<CaptureResponse, ClientError>) -> &Self {
        self.capture.lock().unwrap().push_back(response);
        self
    }

    pub fn push_recognize(&self, response: Result<Recognition, ClientError>) -> &Self {
        self.recognize.lock().unwrap().push_back(response);
        self
    }

    pub fn push_complete_login(
        &self,
        response: Result<CompleteLoginResponse, ClientError>,
    ) -> &Self {
        self.complete_login.lock().unwrap().push_back(response);
        self
    }

    pub fn push_candidates(&self, response: Result<Vec<CandidateWire>, ClientError>) -> &Self {
        self.candidates.lock().unwrap().push_back(response);
        self
    }

    pub fn push_submit_vote(&self, response: Result<SubmitVoteResponse, ClientError>) -> &Self {
        self.submit_vote.lock().unwrap().push_back(response);
        self
    }

    pub fn push_results(&self, response: Result<ResultsResponse, ClientError>) -> &Self {
        self.results.lock().unwrap().push_back(response);
        self
    }

    pub fn push_stats(&self, response: Result<StatsResponse, ClientError>) -> &Self {
        self.stats.lock().unwrap().push_back(response);
        self
    }

    /// Replace the face detector. `f` receives the 1-based detect call number.
    pub fn detect_with(
        &self,
        f: impl FnMut(u32) -> Result<DetectResponse, ClientError> + Send + 'static,
    ) -> &Self {
        *self.detector.lock().unwrap() = Box::new(f);
        self
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls matching `f`.
    pub fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| f(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    // ── Canned answers ──────────────────────────────────────────────────

    pub fn registered(electeur_id: &str) -> RegisterResponse {
        RegisterResponse {
            next_step: Some(NextStep::VerifyOtp),
            electeur_id: Some(ElecteurId::new(electeur_id)),
        }
    }

    pub fn logged_in(token: &str, phone: &str) -> LoginResponse {
        LoginResponse {
            next_step: Some(NextStep::VerifyOtp),
            session_token: Some(SessionToken::new(token)),
            numero_telephone: Some(phone.to_string()),
        }
    }

    pub fn otp_ok(next: NextStep) -> VerifyOtpResponse {
        VerifyOtpResponse {
            next_step: Some(next),
        }
    }

    pub fn recognized() -> Recognition {
        Recognition::Complete {
            user_id: None,
            message: Some("Reconnaissance réussie".into()),
        }
    }

    pub fn not_recognized() -> Recognition {
        Recognition::NotRecognized {
            message: Some("Visage non reconnu.".into()),
        }
    }

    pub fn login_completed(voter_id: &str, first: &str, last: &str) -> CompleteLoginResponse {
        CompleteLoginResponse {
            next_step: Some(NextStep::Vote),
            voter_id: Some(voter_id.to_string()),
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
        }
    }

    pub fn candidate(id: u64, nom: &str, parti: &str) -> CandidateWire {
        CandidateWire {
            id: CandidateId(id),
            nom: Some(nom.to_string()),
            parti: Some(parti.to_string()),
            description: None,
        }
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for NullBackend {
    async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse, ClientError> {
        self.record(Call::Register(req.clone()));
        pop(&self.register, "register")
    }

    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError> {
        self.record(Call::Login(req.clone()));
        pop(&self.login, "login")
    }

    async fn verify_otp(&self, req: &VerifyOtpRequest) -> Result<VerifyOtpResponse, ClientError> {
        self.record(Call::VerifyOtp(req.clone()));
        pop(&self.verify_otp, "verify-otp")
    }

    async fn detect_face(&self, _image: &str) -> Result<DetectResponse, ClientError> {
        self.record(Call::DetectFace);
        let n = {
            let mut calls = self.detect_calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        let mut detector = self.detector.lock().unwrap();
        (*detector)(n)
    }

    async fn capture_faces(&self, req: &CaptureRequest) -> Result<CaptureResponse, ClientError> {
        self.record(Call::CaptureFaces {
            electeur_id: req.electeur_id.clone(),
            images: req.images.len(),
        });
        pop(&self.capture, "capture")
    }

    async fn recognize_face(&self, _req: &RecognizeRequest) -> Result<Recognition, ClientError> {
        self.record(Call::RecognizeFace);
        pop(&self.recognize, "recognize")
    }

    async fn complete_login(
        &self,
        _token: &SessionToken,
    ) -> Result<CompleteLoginResponse, ClientError> {
        self.record(Call::CompleteLogin);
        pop(&self.complete_login, "complete-login")
    }

    async fn candidates(
        &self,
        bearer: Option<&SessionToken>,
    ) -> Result<Vec<CandidateWire>, ClientError> {
        self.record(Call::Candidates {
            bearer: bearer.map(|t| t.as_str().to_string()),
        });
        pop(&self.candidates, "candidates")
    }

    async fn submit_vote(
        &self,
        bearer: Option<&SessionToken>,
        req: &SubmitVoteRequest,
    ) -> Result<SubmitVoteResponse, ClientError> {
        self.record(Call::SubmitVote {
            bearer: bearer.map(|t| t.as_str().to_string()),
            candidat_id: req.candidat_id,
            session_token: req.session_token.as_ref().map(|t| t.as_str().to_string()),
        });
        pop(&self.submit_vote, "vote/submit")
    }

    async fn results(&self, _bearer: Option<&SessionToken>) -> Result<ResultsResponse, ClientError> {
        self.record(Call::Results);
        pop(&self.results, "vote/results")
    }

    async fn stats(&self, _bearer: Option<&SessionToken>) -> Result<StatsResponse, ClientError> {
        self.record(Call::Stats);
        pop(&self.stats, "vote/stats")
    }
}
