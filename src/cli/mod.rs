//! Line-oriented terminal front-end.
//!
//! Plain text is sent as a chat message. When a quick action has filled the
//! input buffer, the typed text is appended to it, after a space when needed,
//! before sending. Lines
//! starting with `/` are commands; `/help` lists them.

pub mod args;
pub mod render;

pub use args::Args;

use std::io::Write;
use std::path::Path;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

use crate::assistant::ResearchAssistant;
use crate::quick_actions::QuickAction;
use crate::upload::CandidateFile;

use render::{
    file_badges, format_timestamp, render_action, render_file, render_message, render_receipt,
};

/// Command reference printed by `/help`.
pub const HELP: &str = "\
Type a message and press Enter to send it.

  /upload <path>...   upload PDF files (other types are ignored)
  /files              list uploaded files
  /server-files       list the files the backend stores
  /remove <name>      remove an uploaded file
  /clear-files        remove every uploaded file
  /clear              clear the chat
  /export [dir]       export the chat as JSON
  /actions            list quick actions
  /action <name>      fill the input with a quick action
  /send               send the input as-is
  /history            show the chat
  /help               show this help
  /quit               leave";

/// One parsed input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    /// Chat text.
    Say(&'a str),
    /// Upload files from paths.
    Upload(Vec<&'a str>),
    /// List uploaded files.
    Files,
    /// List files stored by the backend.
    ServerFiles,
    /// Remove an uploaded file by name.
    Remove(&'a str),
    /// Remove every uploaded file.
    ClearFiles,
    /// Clear the chat.
    Clear,
    /// Export the chat, optionally into a given directory.
    Export(Option<&'a str>),
    /// List quick actions.
    Actions,
    /// Apply a quick action.
    Action(&'a str),
    /// Send the input buffer.
    Send,
    /// Print the transcript.
    History,
    /// Print the command reference.
    Help,
    /// Leave the REPL.
    Quit,
    /// Blank line.
    Empty,
    /// Unrecognized or malformed command.
    Invalid(&'a str),
}

/// Parse one input line.
#[must_use]
pub fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.strip_prefix('/') else {
        return if line.trim().is_empty() {
            Command::Empty
        } else {
            Command::Say(line)
        };
    };

    let (name, arg) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(name, arg)| (name, arg.trim()));

    match (name, arg) {
        ("upload" | "remove" | "action", "") => Command::Invalid(line),
        ("upload", paths) => Command::Upload(paths.split_whitespace().collect()),
        ("files", _) => Command::Files,
        ("server-files", _) => Command::ServerFiles,
        ("remove", name) => Command::Remove(name),
        ("clear-files", _) => Command::ClearFiles,
        ("clear", _) => Command::Clear,
        ("export", "") => Command::Export(None),
        ("export", dir) => Command::Export(Some(dir)),
        ("actions", _) => Command::Actions,
        ("action", name) => Command::Action(name),
        ("send", _) => Command::Send,
        ("history", _) => Command::History,
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        _ => Command::Invalid(line),
    }
}

/// Whether the REPL keeps reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Stop.
    Quit,
}

/// Run one command against the session, writing output to `out`.
pub async fn execute(
    assistant: &mut ResearchAssistant,
    command: Command<'_>,
    out: &mut (impl Write + Send),
) -> std::io::Result<Flow> {
    let before = assistant.messages().len();

    match command {
        Command::Empty => return Ok(Flow::Continue),
        Command::Quit => return Ok(Flow::Quit),
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Invalid(line) => writeln!(out, "Unknown command: {line} (try /help)")?,
        Command::Say(text) => {
            let text = join_input(assistant.input(), text);
            assistant.send_message(&text).await;
        }
        Command::Send => {
            if !assistant.send_input().await {
                writeln!(out, "Nothing to send.")?;
            }
        }
        Command::Upload(paths) => {
            let mut candidates = Vec::with_capacity(paths.len());
            for path in paths {
                match CandidateFile::from_path(Path::new(path)).await {
                    Ok(file) => candidates.push(file),
                    Err(err) => writeln!(out, "Cannot read {path}: {err}")?,
                }
            }
            if assistant.upload_files(candidates).await == 0 && assistant.messages().len() == before {
                writeln!(out, "No PDF files to upload.")?;
            }
        }
        Command::Files => {
            if assistant.files().is_empty() {
                writeln!(out, "No uploaded files.")?;
            }
            for file in assistant.files() {
                writeln!(out, "  {}", render_file(file))?;
            }
        }
        Command::ServerFiles => match assistant.server_files().await {
            Ok(files) if files.is_empty() => writeln!(out, "The backend stores no files.")?,
            Ok(files) => {
                for file in &files {
                    writeln!(out, "  {}", render_receipt(file))?;
                }
            }
            Err(err) => writeln!(out, "Could not list backend files: {err}")?,
        },
        Command::Remove(name) => {
            if assistant.remove_file(name).await {
                writeln!(out, "Removed {name}.")?;
            } else {
                writeln!(out, "No uploaded file named {name}.")?;
            }
        }
        Command::ClearFiles => assistant.clear_files().await,
        Command::Clear => {
            assistant.clear_chat();
            writeln!(out, "Chat cleared.")?;
        }
        Command::Export(dir) => match assistant.export_chat(dir.map(Path::new)) {
            Ok(path) => writeln!(out, "Exported to {}", path.display())?,
            Err(err) => writeln!(out, "Export failed: {err}")?,
        },
        Command::Actions => {
            let count = assistant.files().len();
            for action in QuickAction::ALL {
                writeln!(out, "  {}", render_action(action, count))?;
            }
        }
        Command::Action(name) => {
            if assistant.quick_action(name) {
                writeln!(out, "Input: {}", assistant.input())?;
            } else {
                writeln!(out, "Unknown quick action: {name}")?;
            }
        }
        Command::History => {
            for message in assistant.messages() {
                writeln!(out, "{}", render_message(message, &format_timestamp(message.timestamp)))?;
            }
            return Ok(Flow::Continue);
        }
    }

    if let Some(new) = assistant.messages().get(before..) {
        for message in new {
            writeln!(out, "{}", render_message(message, &format_timestamp(message.timestamp)))?;
        }
    }
    Ok(Flow::Continue)
}

/// Typed text appended to a prefilled input, separated by one space when the
/// buffer does not already end in whitespace.
fn join_input(buffer: &str, typed: &str) -> String {
    if buffer.is_empty() || buffer.ends_with(char::is_whitespace) {
        format!("{buffer}{typed}")
    } else {
        format!("{buffer} {typed}")
    }
}

fn prompt(assistant: &ResearchAssistant, out: &mut impl Write) -> std::io::Result<()> {
    let badges = file_badges(assistant.files());
    if !badges.is_empty() {
        writeln!(out, "[{}]", badges.join(", "))?;
    }
    write!(out, "> {}", assistant.input())?;
    out.flush()
}

/// Read lines from `input` until EOF or `/quit`.
pub async fn run_repl<R>(
    assistant: &mut ResearchAssistant,
    input: R,
    out: &mut (impl Write + Send),
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut lines = input.lines();
    loop {
        prompt(assistant, out)?;
        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            return Ok(());
        };
        match execute(assistant, parse_command(&line), out).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => return Ok(()),
            Err(err) => {
                warn!("Failed to write output: {err}");
                return Err(err);
            }
        }
    }
}
