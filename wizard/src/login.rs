//! Login wizard: credentials → OTP → face recognition.

use crate::camera::FrameSource;
use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::otp::OtpTimer;
use crate::recognition::recognize_face;
use crate::retry::StopFlag;
use crate::session::{WizardSession, OTP_STEP};
use crate::step::Ack;
use crate::validation::{check_otp, validate_login};
use std::sync::Arc;
use votesecure_client::Backend;
use votesecure_session::{SessionKey, SessionStore};
use votesecure_types::wire::{LoginRequest, LoginResponse, VerifyOtpRequest};
use votesecure_types::{CurrentUser, NextStep, SessionToken};

pub const CREDENTIALS_STEP: u8 = 1;
pub const RECOGNITION_STEP: u8 = 3;

const UNKNOWN_VOTER_ID: &str = "inconnu";
const DEFAULT_FIRST_NAME: &str = "Électeur";

#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    pub voter_id: String,
    pub aadhar_id: String,
}

pub struct LoginWizard<B: ?Sized, S> {
    backend: Arc<B>,
    config: WizardConfig,
    session: WizardSession<S>,
    /// Credentials accepted in step 1, re-posted to reissue the OTP.
    credentials: Option<LoginRequest>,
    user: Option<CurrentUser>,
}

impl<B, S> LoginWizard<B, S>
where
    B: Backend + ?Sized,
    S: SessionStore,
{
    pub fn new(backend: Arc<B>, store: S, config: WizardConfig) -> Self {
        let session = WizardSession::new(RECOGNITION_STEP, store, &config);
        Self {
            backend,
            config,
            session,
            credentials: None,
            user: None,
        }
    }

    pub fn current_step(&self) -> u8 {
        self.session.current_step()
    }

    pub fn session(&self) -> &WizardSession<S> {
        &self.session
    }

    pub fn otp(&self) -> &OtpTimer {
        self.session.otp()
    }

    /// The authenticated voter, once the last step succeeded.
    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    /// Handle for stopping the recognition poller from another task.
    pub fn stop_flag(&self) -> StopFlag {
        self.session.stop_flag().clone()
    }

    /// Step 1: check the credentials; the backend sends an OTP.
    pub async fn submit_credentials(&mut self, form: &LoginForm) -> Result<(), WizardError> {
        self.session.require_step(CREDENTIALS_STEP)?;
        let (identifiant_electeur, identifiant_aadhar) =
            validate_login(&form.voter_id, &form.aadhar_id)?;
        let request = LoginRequest {
            identifiant_electeur,
            identifiant_aadhar,
        };

        let response = self.backend.login(&request).await?;
        self.accept_login(response)?;
        self.credentials = Some(request);
        tracing::info!("credentials accepted, OTP sent");
        self.session.advance(Ack::confirming(CREDENTIALS_STEP));
        Ok(())
    }

    /// Store what a successful `/api/auth/login` answer carries.
    fn accept_login(&mut self, response: LoginResponse) -> Result<(), WizardError> {
        let token = match (response.next_step, response.session_token) {
            (Some(NextStep::VerifyOtp), Some(token)) if !token.is_empty() => token,
            _ => {
                return Err(WizardError::UnexpectedResponse(
                    "Erreur de connexion".into(),
                ))
            }
        };
        let phone = response.numero_telephone.ok_or_else(|| {
            WizardError::UnexpectedResponse(
                "Erreur critique : le numéro de téléphone n'a pas été fourni par le serveur."
                    .into(),
            )
        })?;

        let store = self.session.store_mut();
        store.set(SessionKey::SessionToken, token.as_str().to_string())?;
        store.set(SessionKey::LoginPhoneNumber, phone)?;
        Ok(())
    }

    /// Step 2: have the backend check the code.
    pub async fn verify_otp(&mut self, code: &str) -> Result<(), WizardError> {
        self.session.require_step(OTP_STEP)?;
        let otp_code = check_otp(code)?;
        let numero_telephone = self.session.require(SessionKey::LoginPhoneNumber)?;

        let response = self
            .backend
            .verify_otp(&VerifyOtpRequest {
                numero_telephone,
                otp_code,
            })
            .await?;
        if response.next_step != Some(NextStep::FaceRecognition) {
            return Err(WizardError::UnexpectedResponse("Code incorrect".into()));
        }

        self.session.otp_mut().verify();
        self.session.advance(Ack::confirming(OTP_STEP));
        Ok(())
    }

    /// Ask for a fresh OTP by logging in again, once the throttle allows it.
    pub async fn resend_otp(&mut self) -> Result<(), WizardError> {
        self.session.require_step(OTP_STEP)?;
        let snapshot = self.session.otp().snapshot();
        if !snapshot.resend_allowed {
            return Err(WizardError::ResendThrottled(snapshot.resend_in_secs));
        }
        let request = self
            .credentials
            .clone()
            .ok_or(WizardError::SessionExpired)?;

        let response = self.backend.login(&request).await?;
        self.accept_login(response)?;
        self.session.otp_mut().resend()?;
        tracing::info!("login OTP reissued");
        Ok(())
    }

    /// Step 3: recognize the voter's face, then complete the login.
    pub async fn recognize_face<C>(&mut self, camera: &mut C) -> Result<CurrentUser, WizardError>
    where
        C: FrameSource + ?Sized,
    {
        self.session.require_step(RECOGNITION_STEP)?;
        let token = SessionToken::new(self.session.require(SessionKey::SessionToken)?);

        let stop = self.session.stop_flag().clone();
        stop.reset();
        let recognized =
            recognize_face(&*self.backend, camera, &token, &self.config, &stop).await?;
        tracing::info!(attempts = recognized.attempts, "face matches session, completing login");

        let response = self.backend.complete_login(&token).await?;
        if stop.is_stopped() {
            return Err(WizardError::Stopped);
        }
        if response.next_step != Some(NextStep::Vote) {
            return Err(WizardError::UnexpectedResponse(
                "Impossible de finaliser la connexion.".into(),
            ));
        }

        let user = CurrentUser {
            voter_id: response
                .voter_id
                .unwrap_or_else(|| UNKNOWN_VOTER_ID.to_string()),
            first_name: response
                .first_name
                .unwrap_or_else(|| DEFAULT_FIRST_NAME.to_string()),
            last_name: response.last_name.unwrap_or_default(),
            authenticated: true,
        };

        let store = self.session.store_mut();
        store.set(SessionKey::AuthBearerToken, token.as_str().to_string())?;
        store.set_json(SessionKey::CurrentUser, &user)?;
        store.remove_all(&[SessionKey::LoginPhoneNumber, SessionKey::VoteRecord])?;

        self.session.advance(Ack::confirming(RECOGNITION_STEP));
        self.user = Some(user.clone());
        tracing::info!(voter = %user.voter_id, "login complete");
        Ok(user)
    }

    pub fn back(&mut self) -> u8 {
        self.session.back()
    }
}
