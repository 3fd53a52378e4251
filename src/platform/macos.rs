use super::{ForegroundApp, ForegroundSource};
use objc2::rc::autoreleasepool;
use objc2_app_kit::NSWorkspace;

pub struct MacOSForeground;

impl Default for MacOSForeground {
    fn default() -> Self {
        Self::new()
    }
}

impl MacOSForeground {
    pub fn new() -> Self {
        Self
    }
}

impl ForegroundSource for MacOSForeground {
    #[allow(unsafe_code, reason = "objc2-app-kit marks NSWorkspace accessors unsafe")]
    fn foreground_app(&self) -> Option<ForegroundApp> {
        autoreleasepool(|_| {
            // SAFETY: read-only AppKit getters, valid from any thread
            let app = unsafe { NSWorkspace::sharedWorkspace().frontmostApplication() }?;
            let package = unsafe { app.bundleIdentifier() }?.to_string();
            Some(ForegroundApp { package })
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}
