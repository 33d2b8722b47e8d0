use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FullscreenError {
    #[error("fullscreen is not supported here")]
    Unsupported,
    #[error("fullscreen request rejected: {0}")]
    Rejected(String),
}

/// Platform fullscreen capability for the whole presentation surface.
pub trait Fullscreen {
    /// Feature detection; the controller only offers a toggle when true.
    fn is_available(&self) -> bool;

    fn is_active(&self) -> bool;

    fn request(&mut self) -> Result<(), FullscreenError>;

    fn exit(&mut self);
}

/// Stand-in for hosts without fullscreen support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFullscreen;

impl Fullscreen for NoFullscreen {
    fn is_available(&self) -> bool {
        false
    }

    fn is_active(&self) -> bool {
        false
    }

    fn request(&mut self) -> Result<(), FullscreenError> {
        Err(FullscreenError::Unsupported)
    }

    fn exit(&mut self) {}
}
