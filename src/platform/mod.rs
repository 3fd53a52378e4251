pub mod settings;
pub mod types;

pub use settings::NativeSettings;
pub use types::{ForegroundApp, ForegroundSource, SystemSettings};

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "macos")]
pub use macos::MacOSForeground as NativeForeground;

#[cfg(target_os = "linux")]
pub use linux::LinuxForeground as NativeForeground;

// No foreground detection on other platforms
#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub struct NativeForeground;

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
impl ForegroundSource for NativeForeground {
    fn foreground_app(&self) -> Option<ForegroundApp> {
        None
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
impl NativeForeground {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
impl Default for NativeForeground {
    fn default() -> Self {
        Self::new()
    }
}
