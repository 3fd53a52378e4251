// src/platform/settings.rs
//
// Enabled services are one colon-separated list of `package/class` components.

use super::SystemSettings;
use crate::constants::{APP_ID, ENABLED_SERVICES_KEY, WATCHER_SERVICE_NAME};
use crate::db::{with_connection, Database};
use crate::error::AppError;
use crate::models::Preference;
use log::{debug, warn};
use rusqlite::Connection;
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::thread;

/// Component name of this app's foreground watcher service.
pub fn watcher_component() -> String {
    format!("{APP_ID}/{APP_ID}.{WATCHER_SERVICE_NAME}")
}

pub fn is_service_enabled(enabled_services: Option<&str>, component: &str) -> bool {
    enabled_services.is_some_and(|list| list.split(':').any(|entry| entry == component))
}

pub fn register_service(conn: &Connection, component: &str) -> Result<(), AppError> {
    let current = Preference::get(conn, ENABLED_SERVICES_KEY)?.unwrap_or_default();
    if is_service_enabled(Some(&current), component) {
        return Ok(());
    }
    let updated = if current.is_empty() {
        component.to_string()
    } else {
        format!("{current}:{component}")
    };
    Preference::set(conn, ENABLED_SERVICES_KEY, &updated)?;
    Ok(())
}

pub fn unregister_service(conn: &Connection, component: &str) -> Result<(), AppError> {
    let Some(current) = Preference::get(conn, ENABLED_SERVICES_KEY)? else {
        return Ok(());
    };
    let remaining: Vec<&str> = current
        .split(':')
        .filter(|entry| !entry.is_empty() && *entry != component)
        .collect();
    if remaining.is_empty() {
        Preference::remove(conn, ENABLED_SERVICES_KEY)?;
    } else {
        Preference::set(conn, ENABLED_SERVICES_KEY, &remaining.join(":"))?;
    }
    Ok(())
}

/// Settings backed by the shared preferences table and the platform's opener.
pub struct NativeSettings {
    db: Arc<Mutex<Database>>,
}

impl NativeSettings {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }
}

impl SystemSettings for NativeSettings {
    fn enabled_accessibility_services(&self) -> Option<String> {
        with_connection(&self.db, "read enabled services", |conn| {
            Ok(Preference::get(conn, ENABLED_SERVICES_KEY)?)
        })
        .unwrap_or_else(|e| {
            warn!("Treating accessibility services as disabled: {e}");
            None
        })
    }

    fn open_accessibility_settings(&self) -> Result<(), AppError> {
        let mut command = settings_command()?;
        let mut child = command.spawn()?;
        debug!("Opened accessibility settings (pid {})", child.id());
        // Reap the opener without blocking the caller
        thread::spawn(move || {
            if let Err(e) = child.wait() {
                warn!("Settings opener did not exit cleanly: {e}");
            }
        });
        Ok(())
    }
}

#[cfg(target_os = "macos")]
#[allow(clippy::unnecessary_wraps, reason = "signature shared with unsupported platforms")]
fn settings_command() -> Result<Command, AppError> {
    let mut command = Command::new("open");
    command.arg("x-apple.systempreferences:com.apple.preference.universalaccess");
    Ok(command)
}

#[cfg(target_os = "linux")]
#[allow(clippy::unnecessary_wraps, reason = "signature shared with unsupported platforms")]
fn settings_command() -> Result<Command, AppError> {
    let mut command = Command::new("gnome-control-center");
    command.arg("universal-access");
    Ok(command)
}

#[cfg(target_os = "windows")]
#[allow(clippy::unnecessary_wraps, reason = "signature shared with unsupported platforms")]
fn settings_command() -> Result<Command, AppError> {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "ms-settings:easeofaccess"]);
    Ok(command)
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
fn settings_command() -> Result<Command, AppError> {
    Err(AppError::Unsupported("Opening accessibility settings"))
}
