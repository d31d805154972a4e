//! mpv JSON IPC backend
//!
//! Spawns an mpv process with `--input-ipc-server` and drives it over the
//! Unix socket. The protocol is newline-delimited JSON: commands carry a
//! `request_id` that the matching response echoes back, while events
//! (`end-file`, `property-change`, `log-message`) arrive unsolicited. A
//! dedicated reader task routes responses to their waiters and fans
//! events out to subscribers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::net::unix::OwnedWriteHalf;
use tokio::process::{Child, Command};
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::error::{EngineError, EngineResult};
use crate::{AudioEngine, EngineEvent, SeekMode, SoundDevice, SoundDeviceType};

/// Conservative network-playback profile; user engine options override
/// these entries.
const BASE_OPTIONS: &[(&str, &str)] = &[
    ("demuxer-lavf-o", "http_persistent=false"),
    ("demuxer-max-back-bytes", "1048576"),
    ("demuxer-max-bytes", "2097152"),
    ("video", "no"),
    ("ytdl", "no"),
];

const CONNECT_ATTEMPTS: usize = 50;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(100);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const EVENT_CHANNEL_CAPACITY: usize = 64;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<(String, Value)>>>>;

/// A decoded IPC line
#[derive(Debug)]
enum IpcMessage {
    /// Reply to a command we sent
    Response {
        request_id: u64,
        error: String,
        data: Value,
    },
    /// Unsolicited engine event
    Event { name: String, data: Value },
}

fn encode_command(request_id: u64, args: &[Value]) -> String {
    let payload = json!({ "command": args, "request_id": request_id });
    format!("{payload}\n")
}

fn decode_line(line: &str) -> Result<IpcMessage, serde_json::Error> {
    let value: Value = serde_json::from_str(line)?;
    if let Some(name) = value.get("event").and_then(Value::as_str) {
        return Ok(IpcMessage::Event {
            name: name.to_string(),
            data: value,
        });
    }
    let request_id = value
        .get("request_id")
        .and_then(Value::as_u64)
        .unwrap_or_default();
    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let data = value.get("data").cloned().unwrap_or(Value::Null);
    Ok(IpcMessage::Response {
        request_id,
        error,
        data,
    })
}

/// Maps an engine event to the subset the player cares about
fn event_of_interest(name: &str, data: &Value) -> Option<EngineEvent> {
    match name {
        "end-file" => Some(EngineEvent::EndOfFile),
        "property-change" => match data.get("name").and_then(Value::as_str) {
            Some("metadata") | Some("media-title") => Some(EngineEvent::MetadataChanged),
            _ => None,
        },
        _ => None,
    }
}

/// Base options merged with user-provided ones; user entries win, and
/// underscores in keys are normalized to the dashes mpv expects.
fn merged_options(user: &HashMap<String, String>) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = BASE_OPTIONS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    for (key, value) in user {
        let key = key.replace('_', "-");
        match merged.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value.clone(),
            None => merged.push((key, value.clone())),
        }
    }
    merged
}

async fn read_loop(
    reader: BufReader<tokio::net::unix::OwnedReadHalf>,
    pending: PendingMap,
    events: broadcast::Sender<EngineEvent>,
) {
    let mut lines = reader.lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match decode_line(&line) {
            Ok(IpcMessage::Response {
                request_id,
                error,
                data,
            }) => {
                let waiter = pending.lock().unwrap().remove(&request_id);
                if let Some(tx) = waiter {
                    let _ = tx.send((error, data));
                }
            }
            Ok(IpcMessage::Event { name, data }) => {
                if name == "log-message" {
                    let prefix = data.get("prefix").and_then(Value::as_str).unwrap_or("");
                    let text = data
                        .get("text")
                        .and_then(Value::as_str)
                        .unwrap_or("")
                        .trim_end();
                    trace!(component = prefix, "{}", text);
                } else if let Some(event) = event_of_interest(&name, &data) {
                    let _ = events.send(event);
                }
            }
            Err(err) => warn!(error = %err, "Discarding unparseable engine message"),
        }
    }
    debug!("Engine IPC stream closed");
    pending.lock().unwrap().clear();
}

/// An mpv process driven over its JSON IPC socket
pub struct MpvEngine {
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
    pending: PendingMap,
    next_request_id: AtomicU64,
    events: broadcast::Sender<EngineEvent>,
    child: Mutex<Option<Child>>,
    reader: Mutex<Option<JoinHandle<()>>>,
    socket_path: PathBuf,
}

impl MpvEngine {
    /// Spawn mpv and connect to its IPC socket.
    ///
    /// `options` come from the user configuration and are passed as
    /// `--key=value` after the base profile.
    pub async fn spawn(
        binary: &str,
        socket_path: &Path,
        options: &HashMap<String, String>,
    ) -> EngineResult<Self> {
        let _ = tokio::fs::remove_file(socket_path).await;

        let mut command = Command::new(binary);
        command
            .arg("--idle=yes")
            .arg("--no-terminal")
            .arg(format!("--input-ipc-server={}", socket_path.display()));
        for (key, value) in merged_options(options) {
            command.arg(format!("--{key}={value}"));
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        debug!(binary, socket = %socket_path.display(), "Spawning engine process");
        let child = command.spawn()?;

        let stream = Self::connect(socket_path).await?;
        let (read_half, write_half) = stream.into_split();

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let reader = tokio::spawn(read_loop(
            BufReader::new(read_half),
            pending.clone(),
            events.clone(),
        ));

        let engine = Self {
            writer: tokio::sync::Mutex::new(write_half),
            pending,
            next_request_id: AtomicU64::new(1),
            events,
            child: Mutex::new(Some(child)),
            reader: Mutex::new(Some(reader)),
            socket_path: socket_path.to_path_buf(),
        };

        engine
            .command(&[json!("observe_property"), json!(1), json!("metadata")])
            .await?;
        engine
            .command(&[json!("observe_property"), json!(2), json!("media-title")])
            .await?;
        engine
            .command(&[json!("request_log_messages"), json!("warn")])
            .await?;

        debug!("Engine is ready");
        Ok(engine)
    }

    /// The socket takes a moment to appear after the process starts
    async fn connect(socket_path: &Path) -> EngineResult<UnixStream> {
        let mut last_error = None;
        for _ in 0..CONNECT_ATTEMPTS {
            match UnixStream::connect(socket_path).await {
                Ok(stream) => return Ok(stream),
                Err(err) => {
                    last_error = Some(err);
                    tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                }
            }
        }
        Err(last_error
            .map(EngineError::Io)
            .unwrap_or_else(|| EngineError::ipc("engine socket never appeared")))
    }

    async fn command(&self, args: &[Value]) -> EngineResult<Value> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(request_id, tx);

        let line = encode_command(request_id, args);
        {
            let mut writer = self.writer.lock().await;
            writer.write_all(line.as_bytes()).await?;
        }

        let reply = match tokio::time::timeout(REQUEST_TIMEOUT, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => return Err(EngineError::ipc("engine reader task is gone")),
            Err(_) => {
                self.pending.lock().unwrap().remove(&request_id);
                return Err(EngineError::Timeout);
            }
        };

        let (error, data) = reply;
        if error != "success" {
            let name = args
                .first()
                .and_then(Value::as_str)
                .unwrap_or("?")
                .to_string();
            return Err(EngineError::command(name, error));
        }
        Ok(data)
    }

    async fn get_property(&self, name: &str) -> EngineResult<Value> {
        self.command(&[json!("get_property"), json!(name)]).await
    }

    async fn set_property(&self, name: &str, value: Value) -> EngineResult<()> {
        self.command(&[json!("set_property"), json!(name), value])
            .await
            .map(|_| ())
    }

    async fn get_f64(&self, name: &str) -> EngineResult<f64> {
        self.get_property(name)
            .await?
            .as_f64()
            .ok_or_else(|| EngineError::PropertyUnavailable(name.to_string()))
    }

    async fn get_bool(&self, name: &str) -> EngineResult<bool> {
        self.get_property(name)
            .await?
            .as_bool()
            .ok_or_else(|| EngineError::PropertyUnavailable(name.to_string()))
    }
}

#[async_trait]
impl AudioEngine for MpvEngine {
    async fn play(&self, url: &str) -> EngineResult<()> {
        self.set_property("pause", json!(false)).await?;
        self.command(&[json!("loadfile"), json!(url)]).await?;
        Ok(())
    }

    async fn stop(&self) -> EngineResult<()> {
        self.command(&[json!("stop")]).await.map(|_| ())
    }

    async fn set_pause(&self, paused: bool) -> EngineResult<()> {
        self.set_property("pause", json!(paused)).await
    }

    async fn is_paused(&self) -> EngineResult<bool> {
        self.get_bool("pause").await
    }

    async fn is_idle(&self) -> EngineResult<bool> {
        self.get_bool("idle-active").await
    }

    async fn seek(&self, target: f64, mode: SeekMode) -> EngineResult<()> {
        let reference = match mode {
            SeekMode::Relative => "relative",
            SeekMode::Absolute => "absolute",
        };
        self.command(&[json!("seek"), json!(target), json!(reference)])
            .await
            .map(|_| ())
    }

    async fn position(&self) -> EngineResult<f64> {
        self.get_f64("time-pos").await
    }

    async fn duration(&self) -> EngineResult<f64> {
        self.get_f64("duration").await
    }

    async fn speed(&self) -> EngineResult<f64> {
        self.get_f64("speed").await
    }

    async fn set_speed(&self, speed: f64) -> EngineResult<()> {
        self.set_property("speed", json!(speed)).await
    }

    async fn volume(&self) -> EngineResult<f64> {
        self.get_f64("volume").await
    }

    async fn set_volume(&self, volume: f64) -> EngineResult<()> {
        self.set_property("volume", json!(volume)).await
    }

    async fn metadata(&self) -> EngineResult<HashMap<String, String>> {
        let value = self.get_property("metadata").await?;
        let mut metadata = HashMap::new();
        if let Value::Object(map) = value {
            for (key, value) in map {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                metadata.insert(key, value);
            }
        }
        Ok(metadata)
    }

    async fn media_title(&self) -> EngineResult<Option<String>> {
        match self.get_property("media-title").await {
            Ok(Value::String(title)) => Ok(Some(title)),
            Ok(_) => Ok(None),
            Err(EngineError::Command { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn output_devices(&self) -> EngineResult<Vec<SoundDevice>> {
        let value = self.get_property("audio-device-list").await?;
        let mut devices = Vec::new();
        if let Value::Array(entries) = value {
            for entry in entries {
                let id = entry
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let description = entry
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                devices.push(SoundDevice {
                    id,
                    description,
                    device_type: SoundDeviceType::Output,
                });
            }
        }
        Ok(devices)
    }

    async fn set_output_device(&self, device_id: &str) -> EngineResult<()> {
        self.set_property("audio-device", json!(device_id)).await
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    async fn shutdown(&self) -> EngineResult<()> {
        debug!("Shutting down engine");
        let _ = self.command(&[json!("quit")]).await;
        if let Some(handle) = self.reader.lock().unwrap().take() {
            handle.abort();
        }
        if let Some(mut child) = self.child.lock().unwrap().take() {
            let _ = child.start_kill();
        }
        let _ = std::fs::remove_file(&self.socket_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_encoded_with_request_ids() {
        let line = encode_command(7, &[json!("loadfile"), json!("http://x/y")]);
        assert_eq!(
            line,
            "{\"command\":[\"loadfile\",\"http://x/y\"],\"request_id\":7}\n"
        );
    }

    #[test]
    fn responses_are_decoded() {
        let message =
            decode_line("{\"error\":\"success\",\"data\":42.5,\"request_id\":3}").unwrap();
        match message {
            IpcMessage::Response {
                request_id,
                error,
                data,
            } => {
                assert_eq!(request_id, 3);
                assert_eq!(error, "success");
                assert_eq!(data, json!(42.5));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn events_are_decoded() {
        let message = decode_line("{\"event\":\"end-file\",\"reason\":\"eof\"}").unwrap();
        match message {
            IpcMessage::Event { name, .. } => assert_eq!(name, "end-file"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn end_of_file_and_metadata_events_are_surfaced() {
        assert!(matches!(
            event_of_interest("end-file", &json!({})),
            Some(EngineEvent::EndOfFile)
        ));
        let change = json!({"event": "property-change", "id": 1, "name": "metadata"});
        assert!(matches!(
            event_of_interest("property-change", &change),
            Some(EngineEvent::MetadataChanged)
        ));
        let title = json!({"event": "property-change", "id": 2, "name": "media-title"});
        assert!(matches!(
            event_of_interest("property-change", &title),
            Some(EngineEvent::MetadataChanged)
        ));
    }

    #[test]
    fn uninteresting_events_are_ignored() {
        assert!(event_of_interest("file-loaded", &json!({})).is_none());
        let other = json!({"event": "property-change", "name": "volume"});
        assert!(event_of_interest("property-change", &other).is_none());
    }

    #[test]
    fn user_options_override_the_base_profile() {
        let mut user = HashMap::new();
        user.insert("demuxer_max_bytes".to_string(), "4194304".to_string());
        user.insert("audio-buffer".to_string(), "0.5".to_string());

        let merged = merged_options(&user);

        let get = |key: &str| {
            merged
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("demuxer-max-bytes"), Some("4194304"));
        assert_eq!(get("audio-buffer"), Some("0.5"));
        assert_eq!(get("video"), Some("no"));
        assert_eq!(get("ytdl"), Some("no"));
    }
}
