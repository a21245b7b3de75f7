//! Registration wizard: details → OTP → face capture → done.

use crate::camera::FrameSource;
use crate::capture::{collect_faces, CaptureStatus};
use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::otp::OtpTimer;
use crate::retry::StopFlag;
use crate::session::{WizardSession, OTP_STEP};
use crate::step::Ack;
use crate::validation::{check_otp, validate_registration};
use std::sync::Arc;
use tokio::sync::watch;
use votesecure_client::Backend;
use votesecure_session::{SessionKey, SessionStore};
use votesecure_types::wire::{CaptureRequest, RegisterRequest, VerifyOtpRequest};
use votesecure_types::{ElecteurId, NextStep, RegistrationData};

pub const DETAILS_STEP: u8 = 1;
pub const CAPTURE_STEP: u8 = 3;
pub const DONE_STEP: u8 = 4;

/// Raw registration form input.
#[derive(Clone, Debug, Default)]
pub struct RegistrationForm {
    pub voter_id: String,
    pub aadhar_id: String,
    pub phone: String,
    pub email: String,
    pub terms_accepted: bool,
}

pub struct RegistrationWizard<B: ?Sized, S> {
    backend: Arc<B>,
    config: WizardConfig,
    session: WizardSession<S>,
    /// Held from a successful enrollment until `complete()`.
    enrollment: Option<Ack>,
    capture_status: watch::Sender<CaptureStatus>,
}

impl<B, S> RegistrationWizard<B, S>
where
    B: Backend + ?Sized,
    S: SessionStore,
{
    pub fn new(backend: Arc<B>, store: S, config: WizardConfig) -> Self {
        let session = WizardSession::new(DONE_STEP, store, &config);
        let (capture_status, _) = watch::channel(CaptureStatus::default());
        Self {
            backend,
            config,
            session,
            enrollment: None,
            capture_status,
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

    pub fn is_enrolled(&self) -> bool {
        self.enrollment.is_some()
    }

    pub fn capture_updates(&self) -> watch::Receiver<CaptureStatus> {
        self.capture_status.subscribe()
    }

    /// Step 1: validate the form and register the voter.
    pub async fn submit_details(&mut self, form: &RegistrationForm) -> Result<(), WizardError> {
        self.session.require_step(DETAILS_STEP)?;
        let data = validate_registration(
            &form.voter_id,
            &form.aadhar_id,
            &form.phone,
            &form.email,
            form.terms_accepted,
        )?;

        let request = RegisterRequest {
            identifiant_electeur: data.voter_id.clone(),
            identifiant_aadhar: data.aadhar_id.clone(),
            numero_telephone: data.phone.clone(),
        };
        let response = self.backend.register(&request).await?;
        if response.next_step != Some(NextStep::VerifyOtp) {
            return Err(WizardError::UnexpectedResponse(
                "Erreur lors de l'inscription.".into(),
            ));
        }
        let electeur_id = response.electeur_id.ok_or_else(|| {
            WizardError::UnexpectedResponse("Identifiant électeur manquant dans la réponse.".into())
        })?;

        self.remember(&electeur_id, &data)?;
        tracing::info!(%electeur_id, "registration accepted, OTP sent");
        self.session.advance(Ack::confirming(DETAILS_STEP));
        Ok(())
    }

    fn remember(
        &mut self,
        electeur_id: &ElecteurId,
        data: &RegistrationData,
    ) -> Result<(), WizardError> {
        let store = self.session.store_mut();
        store.set(
            SessionKey::RegistrationElecteurId,
            electeur_id.as_str().to_string(),
        )?;
        store.set(SessionKey::RegistrationPhoneNumber, data.phone.clone())?;
        store.set_json(SessionKey::RegistrationData, data)?;
        Ok(())
    }

    /// Step 2: have the backend check the code sent to the registered phone.
    pub async fn verify_otp(&mut self, code: &str) -> Result<(), WizardError> {
        self.session.require_step(OTP_STEP)?;
        let otp_code = check_otp(code)?;
        let numero_telephone = self.session.require(SessionKey::RegistrationPhoneNumber)?;

        let response = self
            .backend
            .verify_otp(&VerifyOtpRequest {
                numero_telephone,
                otp_code,
            })
            .await?;
        if response.next_step != Some(NextStep::FaceCapture) {
            return Err(WizardError::UnexpectedResponse("Code incorrect".into()));
        }

        self.session.otp_mut().verify();
        self.session.advance(Ack::confirming(OTP_STEP));
        Ok(())
    }

    /// Restart the countdown. Registration OTPs are reissued by registering
    /// again, so nothing is sent here.
    pub fn resend_otp(&mut self) -> Result<(), WizardError> {
        self.session.require_step(OTP_STEP)?;
        self.session.otp_mut().resend()?;
        tracing::info!("registration OTP countdown restarted");
        Ok(())
    }

    /// Step 3: collect the face batch and submit it for enrollment.
    ///
    /// Returns the number of images the backend saved.
    pub async fn capture_face<C>(&mut self, camera: &mut C) -> Result<usize, WizardError>
    where
        C: FrameSource + ?Sized,
    {
        self.session.require_step(CAPTURE_STEP)?;
        let electeur_id = ElecteurId::new(self.session.require(SessionKey::RegistrationElecteurId)?);

        let stop = self.session.stop_flag().clone();
        stop.reset();
        let images = collect_faces(
            &*self.backend,
            camera,
            &self.config,
            &stop,
            Some(&self.capture_status),
        )
        .await?;
        let submitted = images.len();

        let response = self
            .backend
            .capture_faces(&CaptureRequest {
                electeur_id: electeur_id.clone(),
                images,
            })
            .await?;
        if stop.is_stopped() {
            return Err(WizardError::Stopped);
        }

        self.enrollment = Some(Ack::confirming(CAPTURE_STEP));
        tracing::info!(%electeur_id, images = submitted, "face enrollment accepted");
        Ok(response
            .images_saved
            .map_or(submitted, |saved| saved as usize))
    }

    /// Step 3 → 4 once enrollment succeeded; drops the registration identifiers.
    pub fn complete(&mut self) -> Result<(), WizardError> {
        self.session.require_step(CAPTURE_STEP)?;
        let ack = self.enrollment.take().ok_or(WizardError::EnrollmentPending)?;
        self.session.store_mut().remove_all(&[
            SessionKey::RegistrationElecteurId,
            SessionKey::RegistrationPhoneNumber,
        ])?;
        self.session.advance(ack);
        tracing::info!("registration complete");
        Ok(())
    }

    /// Explicit user "back". Backend state already confirmed is kept.
    pub fn back(&mut self) -> u8 {
        self.session.back()
    }

    /// Handle for stopping the capture loop from another task.
    pub fn stop_flag(&self) -> StopFlag {
        self.session.stop_flag().clone()
    }
}
