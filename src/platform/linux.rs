use super::{ForegroundApp, ForegroundSource};
use log::warn;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt, Window};

pub struct LinuxForeground {
    conn: Option<x11rb::rust_connection::RustConnection>,
    root: Window,
}

impl Default for LinuxForeground {
    fn default() -> Self {
        Self::new()
    }
}

impl LinuxForeground {
    pub fn new() -> Self {
        match x11rb::connect(None) {
            Ok((conn, screen_num)) => {
                let Some(root) = conn.setup().roots.get(screen_num).map(|s| s.root) else {
                    warn!(
                        "Invalid screen number {screen_num} ({} screens available). Foreground detection disabled.",
                        conn.setup().roots.len()
                    );
                    return Self { conn: None, root: 0 };
                };
                Self {
                    conn: Some(conn),
                    root,
                }
            }
            Err(e) => {
                // Wayland and headless sessions land here; the watcher simply sees no events
                warn!("Failed to connect to X server: {e}. Foreground detection disabled.");
                Self { conn: None, root: 0 }
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn get_atom(&self, name: &str) -> Option<u32> {
        self.conn.as_ref()?
            .intern_atom(false, name.as_bytes())
            .ok()?
            .reply()
            .ok()
            .map(|r| r.atom)
    }

    fn get_window_property(&self, window: Window, atom: u32) -> Option<String> {
        let reply = self.conn.as_ref()?
            .get_property(false, window, atom, AtomEnum::ANY, 0, 1024)
            .ok()?
            .reply()
            .ok()?;

        if reply.value.is_empty() {
            return None;
        }

        String::from_utf8(reply.value).ok()
    }

    fn get_active_window_id(&self) -> Option<Window> {
        let conn = self.conn.as_ref()?;
        let atom = self.get_atom("_NET_ACTIVE_WINDOW")?;
        let reply = conn
            .get_property(false, self.root, atom, AtomEnum::WINDOW, 0, 1)
            .ok()?
            .reply()
            .ok()?;

        let bytes: [u8; 4] = reply.value.get(..4)?.try_into().ok()?;
        match u32::from_ne_bytes(bytes) {
            0 => None,
            id => Some(id),
        }
    }
}

impl ForegroundSource for LinuxForeground {
    fn foreground_app(&self) -> Option<ForegroundApp> {
        let window_id = self.get_active_window_id()?;

        // WM_CLASS is "instance\0class\0"; the instance name is the closest thing to a package id
        let package = self
            .get_window_property(window_id, AtomEnum::WM_CLASS.into())
            .and_then(|s| s.split('\0').next().map(str::to_string))
            .filter(|s| !s.is_empty())?;

        Some(ForegroundApp { package })
    }

    fn is_available(&self) -> bool {
        self.is_connected()
    }
}
