// src/activation.rs

use crate::constants::{EXTRA_LOCKED_PACKAGE, EXTRA_ROUTE, LOCK_SCREEN_ROUTE};
use crate::error::AppError;
use crate::platform::SystemSettings;
use log::debug;
use std::collections::BTreeMap;
use std::ops::BitOr;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// How the target should be brought to the foreground.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchFlags(u8);

impl LaunchFlags {
    pub const NONE: Self = Self(0);
    pub const NEW_TASK: Self = Self(1);
    pub const REORDER_TO_FRONT: Self = Self(1 << 1);
    pub const CLEAR_TOP: Self = Self(1 << 2);
    /// Reuse the running instance instead of creating a new one.
    pub const SINGLE_TOP: Self = Self(1 << 3);
    /// Not a user-initiated navigation.
    pub const NO_USER_ACTION: Self = Self(1 << 4);
    /// Leave no history entry behind.
    pub const NO_HISTORY: Self = Self(1 << 5);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for LaunchFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The bridge host showing the lock screen UI
    LockScreen,
    /// The operating system's accessibility settings page
    AccessibilitySettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationRequest {
    pub target: Target,
    pub flags: LaunchFlags,
    extras: BTreeMap<String, String>,
}

impl ActivationRequest {
    pub fn new(target: Target, flags: LaunchFlags) -> Self {
        Self {
            target,
            flags,
            extras: BTreeMap::new(),
        }
    }

    /// Forces the lock screen up over `package` from the background.
    pub fn lock_screen(package: &str) -> Self {
        Self::new(
            Target::LockScreen,
            LaunchFlags::NEW_TASK
                | LaunchFlags::REORDER_TO_FRONT
                | LaunchFlags::CLEAR_TOP
                | LaunchFlags::SINGLE_TOP
                | LaunchFlags::NO_USER_ACTION
                | LaunchFlags::NO_HISTORY,
        )
        .with_extra(EXTRA_LOCKED_PACKAGE, package)
        .with_extra(EXTRA_ROUTE, LOCK_SCREEN_ROUTE)
    }

    /// Brings the host forward without a payload.
    pub fn show_host() -> Self {
        Self::new(Target::LockScreen, LaunchFlags::NEW_TASK | LaunchFlags::SINGLE_TOP)
    }

    pub fn accessibility_settings() -> Self {
        Self::new(Target::AccessibilitySettings, LaunchFlags::NEW_TASK)
    }

    #[must_use]
    pub fn with_extra(mut self, key: &str, value: &str) -> Self {
        self.extras.insert(key.to_string(), value.to_string());
        self
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }

    pub fn locked_package(&self) -> Option<&str> {
        self.extra(EXTRA_LOCKED_PACKAGE)
    }
}

/// Starts an activation. Delivery is fire-and-forget from the caller's side.
pub trait Launcher: Send + Sync {
    fn start(&self, request: ActivationRequest) -> Result<(), AppError>;
}

/// Launcher used inside the host process: lock-screen requests are queued for
/// in-order delivery to the host, settings requests go to the OS.
pub struct HostLauncher {
    activations: Sender<ActivationRequest>,
    settings: Arc<dyn SystemSettings>,
}

impl HostLauncher {
    pub fn new(settings: Arc<dyn SystemSettings>) -> (Self, Receiver<ActivationRequest>) {
        let (activations, receiver) = mpsc::channel();
        (Self { activations, settings }, receiver)
    }
}

impl Launcher for HostLauncher {
    fn start(&self, request: ActivationRequest) -> Result<(), AppError> {
        match request.target {
            Target::AccessibilitySettings => self.settings.open_accessibility_settings(),
            Target::LockScreen => self
                .activations
                .send(request)
                .map_err(|_| AppError::HostUnavailable),
        }
    }
}

/// Drain queued activations on a dedicated thread until every launcher is dropped.
pub fn spawn_delivery<F>(receiver: Receiver<ActivationRequest>, mut deliver: F) -> JoinHandle<()>
where
    F: FnMut(ActivationRequest) + Send + 'static,
{
    thread::spawn(move || {
        for request in receiver {
            debug!("Delivering activation {:?}", request.target);
            deliver(request);
        }
        debug!("Activation queue closed");
    })
}
