use super::{AccessibilityEvent, EventKind, WatcherHandle};
use crate::platform::ForegroundSource;
use crate::safe_lock;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Produce the notification for one sample and remember the package. A new
/// package is a state change; the same package again is a content change, so
/// a locked app left open is locked again once the cooldown has passed.
pub fn sample_event(source: &dyn ForegroundSource, last: &mut Option<String>) -> Option<AccessibilityEvent> {
    let Some(app) = source.foreground_app() else {
        *last = None;
        return None;
    };

    let kind = if last.as_deref() == Some(app.package.as_str()) {
        EventKind::WindowContentChanged
    } else {
        debug!("Foreground changed to {}", app.package);
        EventKind::WindowStateChanged
    };
    let event = AccessibilityEvent::new(kind, Some(&app.package));
    *last = Some(app.package);
    Some(event)
}

pub struct ForegroundPoller {
    running: Arc<AtomicBool>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl ForegroundPoller {
    pub fn start<S>(source: S, watcher: WatcherHandle, interval: Duration) -> Self
    where
        S: ForegroundSource + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);

        let thread = thread::spawn(move || {
            info!("Foreground poller started ({}ms interval)", interval.as_millis());
            let mut last = None;

            while thread_running.load(Ordering::SeqCst) {
                if let Some(event) = sample_event(&source, &mut last) {
                    if !watcher.notify(event) {
                        debug!("Watcher is gone, stopping foreground poller");
                        break;
                    }
                }
                thread::sleep(interval);
            }

            thread_running.store(false, Ordering::SeqCst);
            info!("Foreground poller stopped");
        });

        Self {
            running,
            thread: Mutex::new(Some(thread)),
        }
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = safe_lock(&self.thread, "Poller thread").take() {
            if thread.join().is_err() {
                warn!("Foreground poller thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for ForegroundPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
