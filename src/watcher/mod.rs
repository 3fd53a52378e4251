// src/watcher/mod.rs

pub mod foreground;

use crate::activation::{ActivationRequest, Launcher};
use crate::constants::{LOCK_COOLDOWN, RELOAD_INTERVAL};
use crate::locked_apps::{LockedAppSource, LockedApps};
use crate::safe_lock;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    WindowStateChanged,
    WindowContentChanged,
    WindowsChanged,
    ViewFocused,
    ViewClicked,
    NotificationStateChanged,
}

impl EventKind {
    /// Only window state/content changes can indicate a new foreground app.
    pub fn is_window_change(self) -> bool {
        match self {
            EventKind::WindowStateChanged | EventKind::WindowContentChanged => true,
            EventKind::WindowsChanged
            | EventKind::ViewFocused
            | EventKind::ViewClicked
            | EventKind::NotificationStateChanged => false,
        }
    }
}

/// A notification about a change in what is on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessibilityEvent {
    pub kind: EventKind,
    pub package: Option<String>,
}

impl AccessibilityEvent {
    pub fn new(kind: EventKind, package: Option<&str>) -> Self {
        Self {
            kind,
            package: package.map(str::to_string),
        }
    }
}

pub struct WatcherConfig {
    pub reload_interval: Duration,
    pub lock_cooldown: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            reload_interval: RELOAD_INTERVAL,
            lock_cooldown: LOCK_COOLDOWN,
        }
    }
}

/// Debounce shared by every package: one trigger per cooldown window.
#[derive(Debug)]
pub struct LockGate {
    cooldown: Duration,
    last_lock: Option<Instant>,
}

impl LockGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_lock: None,
        }
    }

    pub fn is_cooling_down(&self, now: Instant) -> bool {
        self.last_lock
            .is_some_and(|last| now.saturating_duration_since(last) < self.cooldown)
    }

    pub fn record(&mut self, now: Instant) {
        self.last_lock = Some(now);
    }
}

/// What the watcher did with a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Locked,
    NotLocked,
    CoolingDown,
    MissingPackage,
    IgnoredKind,
}

pub struct ForegroundWatcher {
    locked: LockedApps,
    gate: LockGate,
    launcher: Arc<dyn Launcher>,
}

impl ForegroundWatcher {
    pub fn new(launcher: Arc<dyn Launcher>, lock_cooldown: Duration) -> Self {
        Self {
            locked: LockedApps::default(),
            gate: LockGate::new(lock_cooldown),
            launcher,
        }
    }

    pub fn locked_apps(&self) -> &LockedApps {
        &self.locked
    }

    /// Replace the snapshot. A failed read keeps the previous one.
    pub fn reload(&mut self, source: &dyn LockedAppSource) {
        match source.load() {
            Ok(apps) => {
                if apps != self.locked {
                    debug!("Locked apps changed: {} package(s)", apps.len());
                }
                self.locked = apps;
            }
            Err(e) => warn!("Keeping previous locked apps, reload failed: {e}"),
        }
    }

    pub fn handle_event(&mut self, event: &AccessibilityEvent, now: Instant) -> Decision {
        if !event.kind.is_window_change() {
            return Decision::IgnoredKind;
        }

        let Some(package) = event.package.as_deref().filter(|p| !p.is_empty()) else {
            return Decision::MissingPackage;
        };

        if self.gate.is_cooling_down(now) {
            return Decision::CoolingDown;
        }

        if !self.locked.contains(package) {
            return Decision::NotLocked;
        }

        self.gate.record(now);
        info!("Locking package: {package}");

        if let Err(e) = self.launcher.start(ActivationRequest::lock_screen(package)) {
            warn!("Lock screen activation for {package} failed: {e}");
        }
        Decision::Locked
    }
}

enum WatcherMessage {
    Event(AccessibilityEvent),
    Stop,
}

/// Cloneable sender side of the watcher queue.
#[derive(Clone)]
pub struct WatcherHandle {
    sender: Sender<WatcherMessage>,
}

impl WatcherHandle {
    /// Returns false once the watcher has shut down.
    pub fn notify(&self, event: AccessibilityEvent) -> bool {
        self.sender.send(WatcherMessage::Event(event)).is_ok()
    }
}

pub struct WatcherService {
    handle: WatcherHandle,
    running: Arc<AtomicBool>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl WatcherService {
    /// Load the locked set, then keep reloading it every `reload_interval`
    /// while serving notifications from the queue.
    pub fn start(
        source: Box<dyn LockedAppSource>,
        launcher: Arc<dyn Launcher>,
        config: WatcherConfig,
    ) -> Self {
        let (sender, receiver) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);

        let thread = thread::spawn(move || {
            let mut watcher = ForegroundWatcher::new(launcher, config.lock_cooldown);
            watcher.reload(source.as_ref());
            let mut next_reload = Instant::now() + config.reload_interval;
            info!(
                "Foreground watcher started ({} locked app(s))",
                watcher.locked_apps().len()
            );

            loop {
                let now = Instant::now();
                if now >= next_reload {
                    watcher.reload(source.as_ref());
                    next_reload = now + config.reload_interval;
                }

                match receiver.recv_timeout(next_reload.saturating_duration_since(now)) {
                    Ok(WatcherMessage::Event(event)) => {
                        watcher.handle_event(&event, Instant::now());
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(WatcherMessage::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            thread_running.store(false, Ordering::SeqCst);
            info!("Foreground watcher stopped");
        });

        Self {
            handle: WatcherHandle { sender },
            running,
            thread: Mutex::new(Some(thread)),
        }
    }

    pub fn handle(&self) -> WatcherHandle {
        self.handle.clone()
    }

    pub fn notify(&self, event: AccessibilityEvent) -> bool {
        self.handle.notify(event)
    }

    /// Stop the reload timer and wait for the watcher thread to finish.
    pub fn stop(&self) {
        // Send fails only if the thread already exited
        let _ = self.handle.sender.send(WatcherMessage::Stop);
        if let Some(thread) = safe_lock(&self.thread, "Watcher thread").take() {
            if thread.join().is_err() {
                warn!("Foreground watcher thread panicked");
            }
        }
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for WatcherService {
    fn drop(&mut self) {
        self.stop();
    }
}
