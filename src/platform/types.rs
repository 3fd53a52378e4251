use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForegroundApp {
    /// Package-like identifier: bundle id on macOS, `WM_CLASS` instance on X11
    pub package: String,
}

/// Samples whichever application currently owns the foreground.
pub trait ForegroundSource: Send {
    fn foreground_app(&self) -> Option<ForegroundApp>;

    /// Whether samples can ever report an app. A source that cannot see the
    /// desktop (Wayland, headless) must not be advertised as an enabled service.
    fn is_available(&self) -> bool {
        true
    }
}

/// The host operating system's settings surface.
pub trait SystemSettings: Send + Sync {
    /// Raw colon-separated list of enabled accessibility service components.
    fn enabled_accessibility_services(&self) -> Option<String>;
    fn open_accessibility_settings(&self) -> Result<(), AppError>;
}
