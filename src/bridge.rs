//! JSON-lines bridge to an out-of-process front end.
//!
//! Each input line is one command object, e.g. `{"op":"submit_input","typed":"he"}`.
//! Each command produces exactly one response line:
//! `{"ok":true,"payload":{...}}` or `{"ok":false,"error":"..."}`.

use crate::engine::SessionEngine;
use crate::error::Result;
use crate::history::Summary;
use crate::session::Snapshot;
use crate::text_source::TextSource;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    LoadDemoText,
    LoadTextFile { path: PathBuf },
    SetText { text: String },
    Current,
    Reset,
    RepeatCurrent,
    RestartProgress,
    NextText,
    SubmitInput { typed: String },
    Tick,
    Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Snapshot(Snapshot),
    Summary(Summary),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn success(payload: Payload) -> Self {
        Self {
            ok: true,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            payload: None,
            error: Some(message.into()),
        }
    }
}

pub fn dispatch<S: TextSource>(engine: &mut SessionEngine<S>, command: Command) -> Result<Payload> {
    let snapshot = match command {
        Command::LoadDemoText => engine.load_demo_text(),
        Command::LoadTextFile { path } => engine.load_text_file(path)?,
        Command::SetText { text } => engine.set_text(&text),
        Command::Current => engine.current(),
        Command::Reset => engine.reset(),
        Command::RepeatCurrent => engine.repeat_current(),
        Command::RestartProgress => engine.restart_progress(),
        Command::NextText => engine.next_text(),
        Command::SubmitInput { typed } => engine.submit_input(&typed),
        Command::Tick => engine.tick(),
        Command::Summary => return Ok(Payload::Summary(engine.summary())),
    };
    Ok(Payload::Snapshot(snapshot))
}

pub fn handle_line<S: TextSource>(engine: &mut SessionEngine<S>, line: &str) -> Response {
    let command = match serde_json::from_str::<Command>(line) {
        Ok(command) => command,
        Err(err) => {
            warn!(error = %err, "rejected bridge command");
            return Response::failure(format!("invalid command: {err}"));
        }
    };
    debug!(?command, "bridge command");
    match dispatch(engine, command) {
        Ok(payload) => Response::success(payload),
        Err(err) => Response::failure(err.to_string()),
    }
}

/// Answer commands until the reader hits EOF. Blank lines are skipped.
pub fn serve<S, R, W>(engine: &mut SessionEngine<S>, reader: R, mut writer: W) -> Result<()>
where
    S: TextSource,
    R: BufRead,
    W: Write,
{
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(engine, &line);
        serde_json::to_writer(&mut writer, &response)?;
        writeln!(writer)?;
        writer.flush()?;
    }
    Ok(())
}
