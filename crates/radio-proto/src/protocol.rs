//! Command vocabulary and response parsing for the playback daemon's `sc`
//! client.  Each command is one subprocess invocation; its stdout is plain
//! text.

/// Substring `qprint` emits when it has just switched into
/// "print first song first" mode.
pub const PRINT_MODE_CHANGED: &str = "Will print the first song in queue first";

/// Commands understood by the playback daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    Play { index: usize },
    Next,
    QueueAdd { index: usize },
    QueueClear,
    QueueList,
    QueuePrint,
    CurrentlyPlaying,
    /// Register a playable reference so the next `qadd 0` picks it up.
    Link { uri: String },
}

impl PlayerCommand {
    /// Argument vector passed to the command client.
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::Play { index } => vec!["play".into(), index.to_string()],
            Self::Next => vec!["next".into()],
            Self::QueueAdd { index } => vec!["qadd".into(), index.to_string()],
            Self::QueueClear => vec!["qclear".into()],
            Self::QueueList => vec!["qlist".into()],
            Self::QueuePrint => vec!["qprint".into()],
            Self::CurrentlyPlaying => vec!["cur_playing".into()],
            Self::Link { uri } => vec!["link".into(), uri.clone()],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Play { .. } => "play",
            Self::Next => "next",
            Self::QueueAdd { .. } => "qadd",
            Self::QueueClear => "qclear",
            Self::QueueList => "qlist",
            Self::QueuePrint => "qprint",
            Self::CurrentlyPlaying => "cur_playing",
            Self::Link { .. } => "link",
        }
    }
}

/// `cur_playing` prints `artist | title | uri`.  The local id is the third
/// field, and only when there are exactly three.
pub fn parse_current_track(output: &str) -> Option<String> {
    let fields: Vec<&str> = output.split('|').collect();
    if fields.len() == 3 {
        Some(fields[2].trim().to_string())
    } else {
        None
    }
}

/// One queued entry per non-empty `qlist` line.
pub fn count_queue_entries(output: &str) -> usize {
    output.lines().filter(|l| !l.trim().is_empty()).count()
}

pub fn print_mode_just_changed(output: &str) -> bool {
    output.contains(PRINT_MODE_CHANGED)
}
