use super::codec::{read_frame, write_message};
use super::protocol::{IncomingMessage, OutgoingMessage};
use super::{BridgeHost, UiChannel};
use crate::error::AppError;
use crate::safe_lock;
use log::{debug, warn};
use serde_json::Value;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};

/// Sends unsolicited pushes on the same stream the server answers on.
pub struct FramedChannel<W> {
    writer: Arc<Mutex<W>>,
}

impl<W> FramedChannel<W> {
    pub fn new(writer: Arc<Mutex<W>>) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send> UiChannel for FramedChannel<W> {
    fn invoke(&self, method: &str, arguments: Value) -> Result<(), AppError> {
        let message = OutgoingMessage::Invoke {
            method: method.to_string(),
            arguments,
        };
        let mut writer = safe_lock(&self.writer, "Bridge writer");
        write_message(&mut *writer, &message)
    }
}

pub struct BridgeServer<W> {
    host: Arc<BridgeHost>,
    writer: Arc<Mutex<W>>,
}

impl<W: Write> BridgeServer<W> {
    pub fn new(host: Arc<BridgeHost>, writer: Arc<Mutex<W>>) -> Self {
        Self { host, writer }
    }

    /// Answer calls until the peer closes the stream. A frame that is not a
    /// valid call is logged and skipped; I/O and framing errors end the loop.
    pub fn run<R: Read>(&self, reader: &mut R) -> Result<(), AppError> {
        while let Some(body) = read_frame(reader)? {
            let message: IncomingMessage = match serde_json::from_slice(&body) {
                Ok(message) => message,
                Err(e) => {
                    warn!("Skipping malformed bridge message: {e}");
                    continue;
                }
            };

            let response = self.handle_message(message);
            let mut writer = safe_lock(&self.writer, "Bridge writer");
            write_message(&mut *writer, &response)?;
        }
        debug!("Bridge peer closed the channel");
        Ok(())
    }

    fn handle_message(&self, message: IncomingMessage) -> OutgoingMessage {
        match message {
            IncomingMessage::Call { id, method, arguments } => OutgoingMessage::Response {
                id,
                result: self.host.handle(&method, &arguments),
            },
        }
    }
}
