//! JSON Lines worker protocol.
//!
//! One request per input line: `{"id": "req-1", "image_base64": "..."}`.
//! One reply per request, flushed immediately: either the prediction fields
//! next to the echoed `id`, or `{"id": ..., "error": ...}`. A single
//! `{"ready": true, ...}` line is written before any request is read.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ErrorKind;
use crate::ml::result::PredictionResult;
use crate::utils::config::Settings;

#[derive(Debug, Deserialize)]
struct Request {
    /// An explicit `null` is echoed back as `null`; only a missing key becomes "unknown".
    #[serde(default = "unknown_id")]
    id: Value,
    #[serde(default)]
    image_base64: Option<String>,
}

fn unknown_id() -> Value {
    Value::from("unknown")
}

#[derive(Debug, Serialize)]
struct Ready {
    ready: bool,
    model_loaded: bool,
    device: &'static str,
}

#[derive(Debug, Serialize)]
struct PredictionReply {
    id: Value,
    #[serde(flatten)]
    result: PredictionResult,
}

#[derive(Debug, Serialize)]
struct ErrorReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ErrorKind>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Reply {
    Prediction(PredictionReply),
    Error(ErrorReply),
}

impl Reply {
    fn error(id: Option<Value>, error: impl Into<String>) -> Self {
        Reply::Error(ErrorReply {
            id,
            error: error.into(),
            kind: None,
        })
    }
}

/// Serves requests from `input` until EOF.
pub fn run<R: BufRead, W: Write>(input: R, output: &mut W, settings: &Settings) -> Result<()> {
    send(
        output,
        &Ready {
            ready: true,
            model_loaded: false,
            device: "cpu",
        },
    )?;
    info!("Worker ready");

    // Split on raw bytes so a line that is not UTF-8 gets an error reply
    // instead of ending the loop.
    for line in input.split(b'\n') {
        let line = line.context("Failed to read request line")?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let reply = handle_line(&line, settings);
        send(output, &reply)?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}

fn handle_line(line: &[u8], settings: &Settings) -> Reply {
    let request: Request = match serde_json::from_slice(line) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected malformed request: {}", e);
            return Reply::error(None, format!("Invalid JSON: {}", e));
        }
    };

    let id = request.id;
    debug!(id = %id, "Handling request");

    let encoded = match request.image_base64.as_deref() {
        Some(encoded) if !encoded.is_empty() => encoded,
        _ => return Reply::error(Some(id), "No image_base64 provided"),
    };

    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = match base64::engine::general_purpose::STANDARD.decode(compact) {
        Ok(bytes) => bytes,
        Err(e) => return Reply::error(Some(id), format!("Invalid base64 image: {}", e)),
    };

    if bytes.len() > settings.max_image_bytes {
        return Reply::error(
            Some(id),
            format!(
                "Image of {} bytes exceeds the maximum of {} bytes",
                bytes.len(),
                settings.max_image_bytes
            ),
        );
    }

    match crate::classify(&bytes) {
        Ok(result) => Reply::Prediction(PredictionReply { id, result }),
        Err(e) => {
            warn!(id = %id, "Classification failed: {}", e);
            Reply::Error(ErrorReply {
                id: Some(id),
                error: e.message().to_string(),
                kind: Some(e.kind()),
            })
        }
    }
}

fn send<W: Write, T: Serialize>(output: &mut W, message: &T) -> Result<()> {
    serde_json::to_writer(&mut *output, message).context("Failed to encode reply")?;
    output.write_all(b"\n")?;
    output.flush().context("Failed to flush reply")?;
    Ok(())
}
