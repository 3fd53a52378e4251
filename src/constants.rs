// src/constants.rs

use std::time::Duration;

/// Reverse-domain identifier of this application
pub const APP_ID: &str = "com.activlock.app";

/// Class name of the watcher service as it appears in the enabled-services list
pub const WATCHER_SERVICE_NAME: &str = "ForegroundWatcherService";

/// Preference key holding the comma-joined locked package identifiers
pub const LOCKED_APPS_KEY: &str = "native_locked_apps";

/// Preference key holding the colon-separated enabled accessibility services
pub const ENABLED_SERVICES_KEY: &str = "enabled_accessibility_services";

/// Logical name of the native bridge channel
pub const CHANNEL_NAME: &str = "com.activlock/native";

pub const METHOD_IS_ACCESSIBILITY_ENABLED: &str = "isAccessibilityServiceEnabled";
pub const METHOD_OPEN_ACCESSIBILITY_SETTINGS: &str = "openAccessibilitySettings";
pub const METHOD_SHOW_LOCK_SCREEN: &str = "showLockScreen";
pub const METHOD_GET_PENDING_LOCKED_PACKAGE: &str = "getPendingLockedPackage";

/// Unsolicited message pushed to the UI when a locked app was intercepted
pub const METHOD_NAVIGATE_TO_LOCK_SCREEN: &str = "navigateToLockScreen";

/// Activation extra carrying the intercepted package identifier
pub const EXTRA_LOCKED_PACKAGE: &str = "locked_package";

/// Activation extra carrying the UI route to open
pub const EXTRA_ROUTE: &str = "route";

pub const LOCK_SCREEN_ROUTE: &str = "/lock_screen";

/// How often the watcher re-reads the locked-app set
pub const RELOAD_INTERVAL: Duration = Duration::from_secs(2);

/// Minimum time between two lock triggers
pub const LOCK_COOLDOWN: Duration = Duration::from_millis(1000);

/// How often the desktop foreground poller samples the active window
pub const FOREGROUND_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Largest accepted bridge frame body (1 MiB)
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Maximum package identifier length in bytes
pub const MAX_PACKAGE_NAME_LEN: usize = 255;
