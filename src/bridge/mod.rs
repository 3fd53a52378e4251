pub mod codec;
pub mod protocol;
pub mod server;

pub use protocol::{IncomingMessage, MethodResponse, OutgoingMessage};

use crate::activation::{ActivationRequest, Launcher};
use crate::constants::{
    METHOD_GET_PENDING_LOCKED_PACKAGE, METHOD_IS_ACCESSIBILITY_ENABLED,
    METHOD_NAVIGATE_TO_LOCK_SCREEN, METHOD_OPEN_ACCESSIBILITY_SETTINGS, METHOD_SHOW_LOCK_SCREEN,
};
use crate::error::AppError;
use crate::platform::settings::{is_service_enabled, watcher_component};
use crate::platform::SystemSettings;
use crate::safe_lock;
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Operations the UI may call on the native channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    IsAccessibilityServiceEnabled,
    OpenAccessibilitySettings,
    ShowLockScreen,
    GetPendingLockedPackage,
}

impl Method {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            METHOD_IS_ACCESSIBILITY_ENABLED => Some(Self::IsAccessibilityServiceEnabled),
            METHOD_OPEN_ACCESSIBILITY_SETTINGS => Some(Self::OpenAccessibilitySettings),
            METHOD_SHOW_LOCK_SCREEN => Some(Self::ShowLockScreen),
            METHOD_GET_PENDING_LOCKED_PACKAGE => Some(Self::GetPendingLockedPackage),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::IsAccessibilityServiceEnabled => METHOD_IS_ACCESSIBILITY_ENABLED,
            Self::OpenAccessibilitySettings => METHOD_OPEN_ACCESSIBILITY_SETTINGS,
            Self::ShowLockScreen => METHOD_SHOW_LOCK_SCREEN,
            Self::GetPendingLockedPackage => METHOD_GET_PENDING_LOCKED_PACKAGE,
        }
    }
}

/// Pushes messages to the UI layer without a matching request.
pub trait UiChannel: Send + Sync {
    fn invoke(&self, method: &str, arguments: Value) -> Result<(), AppError>;
}

/// Single-slot register for the package that triggered the last lock.
///
/// Deliberately lossy: a new signal overwrites one the UI has not read yet,
/// and reading clears it.
#[derive(Debug, Default)]
pub struct PendingLock(Mutex<Option<String>>);

impl PendingLock {
    /// Store `package`, returning any unconsumed value it replaced.
    pub fn set(&self, package: String) -> Option<String> {
        safe_lock(&self.0, "Pending lock").replace(package)
    }

    pub fn take(&self) -> Option<String> {
        safe_lock(&self.0, "Pending lock").take()
    }
}

pub struct BridgeHost {
    settings: Arc<dyn SystemSettings>,
    launcher: Arc<dyn Launcher>,
    channel: Arc<dyn UiChannel>,
    pending: PendingLock,
}

impl BridgeHost {
    pub fn new(
        settings: Arc<dyn SystemSettings>,
        launcher: Arc<dyn Launcher>,
        channel: Arc<dyn UiChannel>,
    ) -> Self {
        Self {
            settings,
            launcher,
            channel,
            pending: PendingLock::default(),
        }
    }

    /// Dispatch a call by method name. Unknown names are answered with
    /// `NotImplemented`; arguments are currently unused by every method.
    pub fn handle(&self, method: &str, _arguments: &Value) -> MethodResponse {
        let Some(method) = Method::from_name(method) else {
            debug!("Bridge method not implemented: {method}");
            return MethodResponse::NotImplemented;
        };

        let result = match method {
            Method::IsAccessibilityServiceEnabled => {
                Ok(Value::Bool(self.is_accessibility_service_enabled()))
            }
            Method::OpenAccessibilitySettings => {
                self.open_accessibility_settings().map(|()| Value::Null)
            }
            Method::ShowLockScreen => self.show_lock_screen().map(|()| Value::Null),
            Method::GetPendingLockedPackage => Ok(self
                .take_pending_locked_package()
                .map_or(Value::Null, Value::String)),
        };

        match result {
            Ok(value) => MethodResponse::Success { value },
            Err(e) => {
                warn!("Bridge method {} failed: {e}", method.name());
                MethodResponse::Error {
                    code: e.code().to_string(),
                    message: e.to_string(),
                }
            }
        }
    }

    pub fn is_accessibility_service_enabled(&self) -> bool {
        let enabled = self.settings.enabled_accessibility_services();
        is_service_enabled(enabled.as_deref(), &watcher_component())
    }

    pub fn open_accessibility_settings(&self) -> Result<(), AppError> {
        self.launcher.start(ActivationRequest::accessibility_settings())
    }

    pub fn show_lock_screen(&self) -> Result<(), AppError> {
        self.launcher.start(ActivationRequest::show_host())
    }

    /// Consume-once read of the pending-lock signal.
    pub fn take_pending_locked_package(&self) -> Option<String> {
        self.pending.take()
    }

    /// Called whenever the host is (re-)activated. A request carrying a
    /// locked package becomes the pending signal and is pushed to the UI.
    pub fn on_activation(&self, request: &ActivationRequest) {
        let Some(package) = request.locked_package() else {
            return;
        };

        if let Some(previous) = self.pending.set(package.to_string()) {
            debug!("Pending lock for {previous} replaced by {package}");
        }
        info!("Lock screen requested for {package}");

        if let Err(e) = self
            .channel
            .invoke(METHOD_NAVIGATE_TO_LOCK_SCREEN, Value::String(package.to_string()))
        {
            warn!("Could not push lock screen navigation to UI: {e}");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::activation::Target;
    use crate::constants::EXTRA_LOCKED_PACKAGE;

    #[derive(Default)]
    pub(crate) struct RecordingChannel {
        pub pushes: Mutex<Vec<(String, Value)>>,
    }

    impl UiChannel for RecordingChannel {
        fn invoke(&self, method: &str, arguments: Value) -> Result<(), AppError> {
            self.pushes.lock().unwrap().push((method.to_string(), arguments));
            Ok(())
        }
    }

    struct ClosedChannel;

    impl UiChannel for ClosedChannel {
        fn invoke(&self, _method: &str, _arguments: Value) -> Result<(), AppError> {
            Err(AppError::HostUnavailable)
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingLauncher {
        pub requests: Mutex<Vec<ActivationRequest>>,
        pub fail: bool,
    }

    impl Launcher for RecordingLauncher {
        fn start(&self, request: ActivationRequest) -> Result<(), AppError> {
            if self.fail {
                return Err(AppError::Unsupported("Launching"));
            }
            self.requests.lock().unwrap().push(request);
            Ok(())
        }
    }

    pub(crate) struct FixedSettings(pub Option<String>);

    impl SystemSettings for FixedSettings {
        fn enabled_accessibility_services(&self) -> Option<String> {
            self.0.clone()
        }

        fn open_accessibility_settings(&self) -> Result<(), AppError> {
            Ok(())
        }
    }

    pub(crate) struct Fixture {
        pub host: BridgeHost,
        pub launcher: Arc<RecordingLauncher>,
        pub channel: Arc<RecordingChannel>,
    }

    pub(crate) fn fixture_with(enabled: Option<String>, launcher: RecordingLauncher) -> Fixture {
        let launcher = Arc::new(launcher);
        let channel = Arc::new(RecordingChannel::default());
        let shared_launcher: Arc<dyn Launcher> = Arc::<RecordingLauncher>::clone(&launcher);
        let shared_channel: Arc<dyn UiChannel> = Arc::<RecordingChannel>::clone(&channel);
        let host = BridgeHost::new(Arc::new(FixedSettings(enabled)), shared_launcher, shared_channel);
        Fixture { host, launcher, channel }
    }

    pub(crate) fn fixture() -> Fixture {
        fixture_with(None, RecordingLauncher::default())
    }

    #[test]
    fn test_method_names_round_trip() {
        for method in [
            Method::IsAccessibilityServiceEnabled,
            Method::OpenAccessibilitySettings,
            Method::ShowLockScreen,
            Method::GetPendingLockedPackage,
        ] {
            assert_eq!(Method::from_name(method.name()), Some(method));
        }
        assert_eq!(Method::from_name("isaccessibilityserviceenabled"), None);
    }

    #[test]
    fn test_unknown_method_is_not_implemented() {
        let f = fixture();
        for name in ["", "unlock", "navigateToLockScreen", "getPendingLockedPackage "] {
            assert_eq!(f.host.handle(name, &Value::Null), MethodResponse::NotImplemented);
        }
        assert!(f.launcher.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_accessibility_enabled_reflects_settings() {
        let f = fixture();
        assert_eq!(
            f.host.handle(METHOD_IS_ACCESSIBILITY_ENABLED, &Value::Null),
            MethodResponse::success(false)
        );

        let enabled = format!("other/other.Svc:{}", watcher_component());
        let f = fixture_with(Some(enabled), RecordingLauncher::default());
        assert_eq!(
            f.host.handle(METHOD_IS_ACCESSIBILITY_ENABLED, &Value::Null),
            MethodResponse::success(true)
        );
    }

    #[test]
    fn test_open_settings_and_show_lock_screen_acknowledge() {
        let f = fixture();

        assert_eq!(f.host.handle(METHOD_OPEN_ACCESSIBILITY_SETTINGS, &Value::Null), MethodResponse::ack());
        assert_eq!(f.host.handle(METHOD_SHOW_LOCK_SCREEN, &Value::Null), MethodResponse::ack());

        let requests = f.launcher.requests.lock().unwrap();
        let targets: Vec<Target> = requests.iter().map(|r| r.target).collect();
        assert_eq!(targets, vec![Target::AccessibilitySettings, Target::LockScreen]);
        assert_eq!(requests.get(1).and_then(ActivationRequest::locked_package), None);
    }

    #[test]
    fn test_launch_failure_becomes_error_response() {
        let f = fixture_with(None, RecordingLauncher { fail: true, ..Default::default() });
        let response = f.host.handle(METHOD_SHOW_LOCK_SCREEN, &Value::Null);
        assert!(matches!(
            response,
            MethodResponse::Error { ref code, .. } if code == "unsupported"
        ));
    }

    #[test]
    fn test_pending_package_is_consumed_once() {
        let f = fixture();
        f.host.on_activation(&ActivationRequest::lock_screen("com.a"));

        assert_eq!(
            f.host.handle(METHOD_GET_PENDING_LOCKED_PACKAGE, &Value::Null),
            MethodResponse::success("com.a")
        );
        assert_eq!(
            f.host.handle(METHOD_GET_PENDING_LOCKED_PACKAGE, &Value::Null),
            MethodResponse::success(Value::Null)
        );
    }

    #[test]
    fn test_later_signal_overwrites_unconsumed_one() {
        let f = fixture();
        f.host.on_activation(&ActivationRequest::lock_screen("com.a"));
        f.host.on_activation(&ActivationRequest::lock_screen("com.b"));

        assert_eq!(f.host.take_pending_locked_package().as_deref(), Some("com.b"));
        assert_eq!(f.host.take_pending_locked_package(), None);
    }

    #[test]
    fn test_activation_pushes_navigation() {
        let f = fixture();
        f.host.on_activation(&ActivationRequest::lock_screen("com.a"));

        let pushes = f.channel.pushes.lock().unwrap();
        assert_eq!(
            *pushes,
            vec![(METHOD_NAVIGATE_TO_LOCK_SCREEN.to_string(), Value::String("com.a".into()))]
        );
    }

    #[test]
    fn test_activation_without_payload_changes_nothing() {
        let f = fixture();
        f.host.on_activation(&ActivationRequest::show_host());
        f.host.on_activation(
            &ActivationRequest::new(Target::LockScreen, crate::activation::LaunchFlags::NONE)
                .with_extra("route", "/lock_screen"),
        );

        assert_eq!(f.host.take_pending_locked_package(), None);
        assert!(f.channel.pushes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_push_failure_keeps_pending_signal() {
        let host = BridgeHost::new(
            Arc::new(FixedSettings(None)),
            Arc::new(RecordingLauncher::default()),
            Arc::new(ClosedChannel),
        );
        host.on_activation(
            &ActivationRequest::show_host().with_extra(EXTRA_LOCKED_PACKAGE, "com.a"),
        );
        assert_eq!(host.take_pending_locked_package().as_deref(), Some("com.a"));
    }
}
