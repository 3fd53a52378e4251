// src/commands.rs
//
// Tauri IPC command handlers: the bridge operations plus locked-app configuration.

use crate::bridge::{BridgeHost, MethodResponse, UiChannel};
use crate::db::{with_connection, Database};
use crate::error::AppError;
use crate::locked_apps;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tauri::{AppHandle, Emitter, State};

/// Delivers unsolicited bridge pushes as Tauri events.
pub struct EventChannel {
    app: AppHandle,
}

impl EventChannel {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl UiChannel for EventChannel {
    fn invoke(&self, method: &str, arguments: Value) -> Result<(), AppError> {
        self.app
            .emit(method, arguments)
            .map_err(|e| AppError::Ui(e.to_string()))
    }
}

#[tauri::command]
pub fn is_accessibility_service_enabled(bridge: State<Arc<BridgeHost>>) -> bool {
    bridge.is_accessibility_service_enabled()
}

#[tauri::command]
pub fn open_accessibility_settings(bridge: State<Arc<BridgeHost>>) -> Result<(), String> {
    bridge.open_accessibility_settings()?;
    Ok(())
}

#[tauri::command]
pub fn show_lock_screen(bridge: State<Arc<BridgeHost>>) -> Result<(), String> {
    bridge.show_lock_screen()?;
    Ok(())
}

#[tauri::command]
pub fn get_pending_locked_package(bridge: State<Arc<BridgeHost>>) -> Option<String> {
    bridge.take_pending_locked_package()
}

/// Name-based dispatch, same semantics as the framed native channel.
#[tauri::command]
pub fn invoke_native(
    bridge: State<Arc<BridgeHost>>,
    method: String,
    arguments: Option<Value>,
) -> MethodResponse {
    bridge.handle(&method, &arguments.unwrap_or(Value::Null))
}

#[tauri::command]
pub fn get_locked_apps(db: State<Arc<Mutex<Database>>>) -> Result<Vec<String>, String> {
    let apps = with_connection(&db, "load locked apps", locked_apps::load)?;
    Ok(apps.into_vec())
}

#[tauri::command]
pub fn set_locked_apps(
    db: State<Arc<Mutex<Database>>>,
    packages: Vec<String>,
) -> Result<Vec<String>, String> {
    let apps = with_connection(&db, "save locked apps", |conn| locked_apps::save(conn, &packages))?;
    Ok(apps.into_vec())
}

#[tauri::command]
pub fn add_locked_app(db: State<Arc<Mutex<Database>>>, package: String) -> Result<Vec<String>, String> {
    let apps = with_connection(&db, "add locked app", |conn| locked_apps::add(conn, &package))?;
    Ok(apps.into_vec())
}

#[tauri::command]
pub fn remove_locked_app(
    db: State<Arc<Mutex<Database>>>,
    package: String,
) -> Result<Vec<String>, String> {
    let apps = with_connection(&db, "remove locked app", |conn| locked_apps::remove(conn, &package))?;
    Ok(apps.into_vec())
}
