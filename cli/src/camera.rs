//! A camera made of image files.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use votesecure_wizard::{CameraError, FrameSource};

/// Serves the JPEG and PNG files of a directory as camera frames, in name
/// order, starting over after the last one.
pub struct DirectoryFrames {
    dir: PathBuf,
    frames: Vec<PathBuf>,
    next: usize,
    open: bool,
}

impl DirectoryFrames {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            frames: Vec::new(),
            next: 0,
            open: false,
        }
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png"))
}

fn map_io(e: std::io::Error) -> CameraError {
    match e.kind() {
        ErrorKind::NotFound => CameraError::NotFound,
        ErrorKind::PermissionDenied => CameraError::PermissionDenied,
        _ => CameraError::Other(e.to_string()),
    }
}

impl FrameSource for DirectoryFrames {
    fn open(&mut self) -> Result<(), CameraError> {
        let entries = std::fs::read_dir(&self.dir).map_err(map_io)?;
        let mut frames = Vec::new();
        for entry in entries {
            let path = entry.map_err(map_io)?.path();
            if path.is_file() && is_image(&path) {
                frames.push(path);
            }
        }
        if frames.is_empty() {
            return Err(CameraError::NotFound);
        }
        frames.sort();
        tracing::debug!(dir = %self.dir.display(), frames = frames.len(), "frame directory opened");
        self.frames = frames;
        self.next = 0;
        self.open = true;
        Ok(())
    }

    fn capture(&mut self) -> Result<String, CameraError> {
        if !self.open {
            return Err(CameraError::NotOpen);
        }
        let path = &self.frames[self.next % self.frames.len()];
        self.next += 1;
        let bytes = std::fs::read(path).map_err(map_io)?;
        Ok(STANDARD.encode(bytes))
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_cycle_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"second").unwrap();
        std::fs::write(dir.path().join("a.PNG"), b"first").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let mut camera = DirectoryFrames::new(dir.path());
        camera.open().unwrap();

        assert_eq!(camera.capture().unwrap(), STANDARD.encode(b"first"));
        assert_eq!(camera.capture().unwrap(), STANDARD.encode(b"second"));
        assert_eq!(camera.capture().unwrap(), STANDARD.encode(b"first"));
    }

    #[test]
    fn missing_directory_is_no_camera() {
        let dir = tempfile::tempdir().unwrap();
        let mut camera = DirectoryFrames::new(dir.path().join("absent"));
        assert_eq!(camera.open(), Err(CameraError::NotFound));
    }

    #[test]
    fn directory_without_images_is_no_camera() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.md"), b"").unwrap();
        let mut camera = DirectoryFrames::new(dir.path());
        assert_eq!(camera.open(), Err(CameraError::NotFound));
    }

    #[test]
    fn capture_needs_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut camera = DirectoryFrames::new(dir.path());
        assert_eq!(camera.capture(), Err(CameraError::NotOpen));
    }
}
