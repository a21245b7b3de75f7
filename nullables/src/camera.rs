//! Nullable camera: numbered fake frames.

use votesecure_wizard::{CameraError, FrameSource};

/// A test camera that yields `frame-1`, `frame-2`, ...
///
/// Opening can be made to fail, and so can a given capture.
#[derive(Default)]
pub struct NullCamera {
    open: bool,
    captured: u32,
    opens: u32,
    closes: u32,
    open_error: Option<CameraError>,
    fail_capture_at: Option<u32>,
}

impl NullCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// A camera whose `open` always fails with `error`.
    pub fn failing_open(error: CameraError) -> Self {
        Self {
            open_error: Some(error),
            ..Self::default()
        }
    }

    /// Make capture number `n` (1-based) fail.
    pub fn fail_capture_at(mut self, n: u32) -> Self {
        self.fail_capture_at = Some(n);
        self
    }

    pub fn frames_captured(&self) -> u32 {
        self.captured
    }

    pub fn opens(&self) -> u32 {
        self.opens
    }

    pub fn closes(&self) -> u32 {
        self.closes
    }
}

impl FrameSource for NullCamera {
    fn open(&mut self) -> Result<(), CameraError> {
        if let Some(error) = &self.open_error {
            return Err(error.clone());
        }
        self.open = true;
        self.opens += 1;
        Ok(())
    }

    fn capture(&mut self) -> Result<String, CameraError> {
        if !self.open {
            return Err(CameraError::NotOpen);
        }
        self.captured += 1;
        if self.fail_capture_at == Some(self.captured) {
            return Err(CameraError::Other("frame dropped".into()));
        }
        Ok(format!("frame-{}", self.captured))
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.closes += 1;
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
