//! Native bridge host for ActivLock
//!
//! Serves the `com.activlock/native` channel over stdin/stdout using
//! length-prefixed JSON frames, while the foreground watcher runs in the
//! background and pushes `navigateToLockScreen` when a locked app shows up.
//! `showLockScreen` is acknowledged but raises nothing: the peer owns the
//! window and decides how to present itself.
//!
//! Usage: `activlock-bridge [DATABASE_PATH]`

use activlock_lib::{
    activation::{spawn_delivery, HostLauncher, Launcher},
    bridge::{server::{BridgeServer, FramedChannel}, BridgeHost},
    constants::{CHANNEL_NAME, FOREGROUND_POLL_INTERVAL},
    get_db_path, init_logging, open_database,
    platform::{NativeForeground, NativeSettings, SystemSettings},
    start_watcher_service, stop_watcher_service,
    watcher::foreground::ForegroundPoller,
};
use log::{debug, error, info};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

fn main() -> ExitCode {
    init_logging();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Bridge host error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = match std::env::args_os().nth(1) {
        Some(path) => PathBuf::from(path),
        None => get_db_path()?,
    };
    info!("Using database {}", db_path.display());
    let db = open_database(&db_path)?;

    let settings: Arc<dyn SystemSettings> = Arc::new(NativeSettings::new(Arc::clone(&db)));
    let (launcher, activations) = HostLauncher::new(Arc::clone(&settings));
    let launcher: Arc<dyn Launcher> = Arc::new(launcher);

    // Responses and pushes share stdout; stderr carries the logs
    let writer = Arc::new(Mutex::new(io::stdout()));
    let channel = Arc::new(FramedChannel::new(Arc::clone(&writer)));
    let bridge = Arc::new(BridgeHost::new(settings, Arc::clone(&launcher), channel));

    let delivered = Arc::clone(&bridge);
    // Runs until process exit: the bridge it feeds holds a launcher itself
    let _delivery = spawn_delivery(activations, move |request| {
        // The peer owns its window in stdio mode, so a bare show request has
        // nothing to raise here; only locked-package payloads are relayed.
        if request.locked_package().is_none() {
            debug!("Show request left to the peer");
        }
        delivered.on_activation(&request);
    });

    let foreground = NativeForeground::new();
    let service = start_watcher_service(&db, launcher, &foreground)?;
    let poller = ForegroundPoller::start(foreground, service.handle(), FOREGROUND_POLL_INTERVAL);

    info!("Serving {CHANNEL_NAME} on stdio");
    let result = BridgeServer::new(bridge, writer).run(&mut io::stdin().lock());

    poller.stop();
    stop_watcher_service(&db, &service);

    result?;
    Ok(())
}
