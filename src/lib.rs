pub mod activation;
pub mod bridge;
#[cfg(feature = "shell")]
mod commands;
pub mod constants;
pub mod db;
pub mod error;
pub mod locked_apps;
mod models;
pub mod platform;
#[cfg(test)]
mod test_utils;
pub mod validation;
pub mod watcher;

use crate::activation::Launcher;
use crate::db::{migrations, with_connection, Database};
use crate::error::AppError;
use crate::locked_apps::PreferenceLockedApps;
use crate::platform::settings::{register_service, unregister_service, watcher_component};
use crate::platform::ForegroundSource;
use crate::watcher::{WatcherConfig, WatcherService};
use directories::ProjectDirs;
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Error type for ActivLock initialization failures
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Could not determine project directories")]
    NoProjectDirs,
    #[error("Could not create data directory: {0}")]
    DataDirCreation(std::io::Error),
    #[error("Failed to open database: {0}")]
    DatabaseOpen(rusqlite::Error),
    #[error("Failed to run database migrations: {0}")]
    Migration(rusqlite::Error),
    #[error("Failed to start foreground watcher: {0}")]
    Watcher(AppError),
}

/// Default database location, creating the data directory if needed.
pub fn get_db_path() -> Result<PathBuf, InitError> {
    let proj_dirs = ProjectDirs::from("com", "activlock", "ActivLock")
        .ok_or(InitError::NoProjectDirs)?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(InitError::DataDirCreation)?;
    Ok(data_dir.join("activlock.db"))
}

pub fn open_database(path: &Path) -> Result<Arc<Mutex<Database>>, InitError> {
    let db = Database::open(path).map_err(InitError::DatabaseOpen)?;
    migrations::run(db.connection()).map_err(InitError::Migration)?;
    Ok(Arc::new(Mutex::new(db)))
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`). `log` records
/// from the library are forwarded to the same subscriber.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Lock a mutex, recovering from poisoning if necessary
pub(crate) fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> std::sync::MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("{context} mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Start the watcher on the shared preferences. It is listed as an enabled
/// accessibility service only when `foreground` can actually observe apps;
/// otherwise any stale listing is withdrawn so the UI asks the user to act.
pub fn start_watcher_service(
    db: &Arc<Mutex<Database>>,
    launcher: Arc<dyn Launcher>,
    foreground: &dyn ForegroundSource,
) -> Result<WatcherService, InitError> {
    let source = Box::new(PreferenceLockedApps::new(Arc::clone(db)));
    let service = WatcherService::start(source, launcher, WatcherConfig::default());
    if foreground.is_available() {
        with_connection(db, "register watcher service", |conn| {
            register_service(conn, &watcher_component())
        })
        .map_err(InitError::Watcher)?;
    } else {
        warn!("Foreground detection is unavailable; watcher service not enabled");
        with_connection(db, "unregister watcher service", |conn| {
            unregister_service(conn, &watcher_component())
        })
        .map_err(InitError::Watcher)?;
    }
    Ok(service)
}

/// Stop the watcher and withdraw its service registration.
pub fn stop_watcher_service(db: &Arc<Mutex<Database>>, service: &WatcherService) {
    service.stop();
    if let Err(e) = with_connection(db, "unregister watcher service", |conn| {
        unregister_service(conn, &watcher_component())
    }) {
        warn!("Watcher service is still listed as enabled: {e}");
    }
}

#[cfg(feature = "shell")]
pub use shell::run;

#[cfg(feature = "shell")]
mod shell {
    use super::{get_db_path, init_logging, open_database, start_watcher_service, stop_watcher_service};
    use crate::activation::{spawn_delivery, HostLauncher, Launcher};
    use crate::bridge::{BridgeHost, UiChannel};
    use crate::commands;
    use crate::constants::FOREGROUND_POLL_INTERVAL;
    use crate::db::Database;
    use crate::platform::{NativeForeground, NativeSettings, SystemSettings};
    use crate::watcher::foreground::ForegroundPoller;
    use crate::watcher::WatcherService;
    use log::{error, warn};
    use std::sync::{Arc, Mutex};
    use tauri::{
        menu::{Menu, MenuItem, PredefinedMenuItem},
        tray::TrayIconBuilder,
        webview::WebviewWindowBuilder,
        AppHandle, Manager, RunEvent,
    };

    /// Background components owned by the app for orderly shutdown
    pub struct WatcherState {
        service: WatcherService,
        poller: ForegroundPoller,
    }

    /// Bring the lock screen window in front of whatever app is focused.
    fn show_main_window(app: &AppHandle) {
        if let Some(window) = app.get_webview_window("main") {
            if let Err(e) = window.unminimize().and_then(|()| window.show()).and_then(|()| window.set_focus()) {
                warn!("Failed to bring lock screen to front: {e}");
            }
        }
    }

    fn shutdown(app: &AppHandle) {
        if let (Some(state), Some(db)) = (
            app.try_state::<WatcherState>(),
            app.try_state::<Arc<Mutex<Database>>>(),
        ) {
            state.poller.stop();
            stop_watcher_service(&db, &state.service);
        }
        app.exit(0);
    }

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        init_logging();

        let app = tauri::Builder::default()
            .setup(|app| {
                let db_path = get_db_path().inspect_err(|e| error!("ActivLock initialization failed: {e}"))?;
                let db = open_database(&db_path).inspect_err(|e| error!("{e}"))?;

                let settings: Arc<dyn SystemSettings> = Arc::new(NativeSettings::new(Arc::clone(&db)));
                let (launcher, activations) = HostLauncher::new(Arc::clone(&settings));
                let launcher: Arc<dyn Launcher> = Arc::new(launcher);
                let channel: Arc<dyn UiChannel> = Arc::new(commands::EventChannel::new(app.handle().clone()));
                let bridge = Arc::new(BridgeHost::new(settings, Arc::clone(&launcher), channel));

                // Re-activation path: show the window, then hand the payload to the bridge
                let app_handle = app.handle().clone();
                let delivered = Arc::clone(&bridge);
                spawn_delivery(activations, move |request| {
                    show_main_window(&app_handle);
                    delivered.on_activation(&request);
                });

                let foreground = NativeForeground::new();
                let service = start_watcher_service(&db, launcher, &foreground)?;
                let poller = ForegroundPoller::start(
                    foreground,
                    service.handle(),
                    FOREGROUND_POLL_INTERVAL,
                );

                app.manage(db);
                app.manage(bridge);
                app.manage(WatcherState { service, poller });

                let _main_window = WebviewWindowBuilder::new(app, "main", tauri::WebviewUrl::default())
                    .title("ActivLock")
                    .inner_size(420.0, 640.0)
                    .resizable(true)
                    .visible(false)
                    .center()
                    .build()?;

                let open = MenuItem::with_id(app, "open", "Open ActivLock", true, None::<&str>)?;
                let separator = PredefinedMenuItem::separator(app)?;
                let quit = MenuItem::with_id(app, "quit", "Quit ActivLock", true, None::<&str>)?;
                let menu = Menu::with_items(app, &[&open, &separator, &quit])?;

                let mut tray = TrayIconBuilder::new()
                    .menu(&menu)
                    .show_menu_on_left_click(true)
                    .tooltip("ActivLock");
                if let Some(icon) = app.default_window_icon() {
                    tray = tray.icon(icon.clone()).icon_as_template(true);
                }
                tray.on_menu_event(|app, event| match event.id.0.as_str() {
                    "open" => show_main_window(app),
                    "quit" => shutdown(app),
                    _ => {}
                })
                .build(app)?;

                Ok(())
            })
            .invoke_handler(tauri::generate_handler![
                commands::is_accessibility_service_enabled,
                commands::open_accessibility_settings,
                commands::show_lock_screen,
                commands::get_pending_locked_package,
                commands::invoke_native,
                commands::get_locked_apps,
                commands::set_locked_apps,
                commands::add_locked_app,
                commands::remove_locked_app,
            ])
            .build(tauri::generate_context!());

        let app = match app {
            Ok(app) => app,
            Err(e) => {
                error!("Error while building tauri application: {e}");
                return;
            }
        };

        app.run(|_app, event| {
            // The watcher keeps running with every window closed; only the tray quits
            if let RunEvent::ExitRequested { api, code, .. } = event {
                if code.is_none() {
                    api.prevent_exit();
                }
            }
        });
    }
}
