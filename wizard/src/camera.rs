//! Camera abstraction shared by the capture loop and the recognition poller.
//!
//! A frame source is exclusively borrowed (`&mut`) by whichever loop is
//! running, so two loops can never hold the camera at once.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("camera access denied")]
    PermissionDenied,

    #[error("no camera found")]
    NotFound,

    #[error("camera already in use")]
    Busy,

    #[error("camera constraints not supported: {0}")]
    Overconstrained(String),

    #[error("camera is not open")]
    NotOpen,

    #[error("camera error: {0}")]
    Other(String),
}

impl CameraError {
    /// Fixed user-facing text per error category.
    pub fn user_message(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied => "Accès à la caméra refusé",
            CameraError::NotFound => "Aucune caméra trouvée",
            CameraError::Busy => "Caméra déjà utilisée",
            CameraError::Overconstrained(_) => "Contraintes caméra non supportées",
            CameraError::NotOpen | CameraError::Other(_) => "Erreur d'accès à la caméra",
        }
    }
}

/// Something that yields camera frames.
pub trait FrameSource: Send {
    fn open(&mut self) -> Result<(), CameraError>;

    /// Grab one frame as a base64-encoded JPEG (no data-URL prefix).
    fn capture(&mut self) -> Result<String, CameraError>;

    fn close(&mut self);

    fn is_open(&self) -> bool;
}

/// Open camera for the lifetime of one loop. Closed on drop, whatever the outcome.
pub struct OpenCamera<'a, C: FrameSource + ?Sized> {
    camera: &'a mut C,
}

impl<'a, C: FrameSource + ?Sized> OpenCamera<'a, C> {
    pub fn open(camera: &'a mut C) -> Result<Self, CameraError> {
        if !camera.is_open() {
            camera.open()?;
        }
        tracing::debug!("camera opened");
        Ok(Self { camera })
    }

    pub fn capture(&mut self) -> Result<String, CameraError> {
        self.camera.capture()
    }
}

impl<C: FrameSource + ?Sized> Drop for OpenCamera<'_, C> {
    fn drop(&mut self) {
        self.camera.close();
        tracing::debug!("camera closed");
    }
}
