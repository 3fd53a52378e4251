use crate::constants::LOCKED_APPS_KEY;
use crate::db::{with_connection, Database};
use crate::error::AppError;
use crate::models::Preference;
use crate::validation::{validate_package_list, validate_package_name};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockedApps(Vec<String>);

impl LockedApps {
    /// Split a persisted value on commas. Empty input yields an empty set;
    /// any other input is split verbatim, empty segments included.
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::default();
        }
        Self(raw.split(',').map(str::to_string).collect())
    }

    pub fn join(&self) -> String {
        self.0.join(",")
    }

    pub fn contains(&self, package: &str) -> bool {
        self.0.iter().any(|p| p == package)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Where the watcher reads its locked-app snapshot from.
pub trait LockedAppSource: Send {
    fn load(&self) -> Result<LockedApps, AppError>;
}

/// Reads the locked-app set from the shared preferences table.
pub struct PreferenceLockedApps {
    db: Arc<Mutex<Database>>,
}

impl PreferenceLockedApps {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }
}

impl LockedAppSource for PreferenceLockedApps {
    fn load(&self) -> Result<LockedApps, AppError> {
        with_connection(&self.db, "load locked apps", load)
    }
}

/// Absent key and empty value both mean an empty set.
pub fn load(conn: &Connection) -> Result<LockedApps, AppError> {
    let raw = Preference::get(conn, LOCKED_APPS_KEY)?.unwrap_or_default();
    Ok(LockedApps::parse(&raw))
}

/// Replace the whole set. Entries are validated and de-duplicated.
pub fn save(conn: &Connection, packages: &[String]) -> Result<LockedApps, AppError> {
    let apps = LockedApps(validate_package_list(packages)?);
    Preference::set(conn, LOCKED_APPS_KEY, &apps.join())?;
    Ok(apps)
}

pub fn add(conn: &Connection, package: &str) -> Result<LockedApps, AppError> {
    let package = validate_package_name(package)?;
    let mut packages = stored_entries(conn)?;
    if !packages.iter().any(|p| p == package) {
        packages.push(package.to_string());
    }
    save(conn, &packages)
}

pub fn remove(conn: &Connection, package: &str) -> Result<LockedApps, AppError> {
    let package = package.trim();
    let packages: Vec<String> = stored_entries(conn)?
        .into_iter()
        .filter(|p| p != package)
        .collect();
    save(conn, &packages)
}

// Empty segments can only come from hand-edited values; drop them before re-saving.
fn stored_entries(conn: &Connection) -> Result<Vec<String>, AppError> {
    Ok(load(conn)?
        .into_vec()
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect())
}
