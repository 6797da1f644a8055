/// Playback daemon control through its command-line client.
///
/// Every operation is one subprocess invocation:
///
/// ```text
///   ScController::run(cmd)
///         │
///         ├── spawn  <sc> [prefix args] <cmd args>
///         ├── wait for exit, capture stdout
///         └── non-zero exit / spawn error → None ("no information")
/// ```
///
/// Nothing here returns an error.  Callers get `None` (or nothing happens)
/// and must cope with missing data on every call.
use async_trait::async_trait;
use radio_proto::config::PlayerConfig;
use radio_proto::protocol::{self, PlayerCommand};
use std::path::PathBuf;
use std::process::Stdio;
use tracing::{debug, info, warn};

/// Operations the radio needs from a playback daemon.
#[async_trait]
pub trait PlaybackController: Send + Sync {
    /// Register `local_id` as a playable reference and append it to the queue.
    async fn enqueue(&self, local_id: &str);
    async fn play_first(&self);
    /// Skip the current item.
    async fn play_next(&self);
    async fn clear_queue(&self);
    /// Local id of the track playing now.
    async fn currently_playing(&self) -> Option<String>;
    async fn queue_depth(&self) -> Option<usize>;
    /// Put the daemon in "print first song in queue first" mode.
    async fn enable_print_first_track_first(&self);
}

pub struct ScController {
    program: PathBuf,
    prefix_args: Vec<String>,
    print_mode_max_attempts: u32,
}

impl ScController {
    pub fn new(program: PathBuf, prefix_args: Vec<String>, print_mode_max_attempts: u32) -> Self {
        Self {
            program,
            prefix_args,
            print_mode_max_attempts: print_mode_max_attempts.max(1),
        }
    }

    pub fn from_config(config: &PlayerConfig) -> Self {
        let program = match radio_proto::platform::find_player_binary(&config.command) {
            Some(p) => {
                info!("player: using {}", p.display());
                p
            }
            None => {
                warn!(
                    "player: '{}' not found beside exe or on PATH, commands will fail",
                    config.command
                );
                PathBuf::from(&config.command)
            }
        };
        Self::new(program, config.args.clone(), config.print_mode_max_attempts)
    }

    async fn run(&self, cmd: PlayerCommand) -> Option<String> {
        debug!("player: {} {:?}", self.program.display(), cmd.args());
        let output = tokio::process::Command::new(&self.program)
            .args(&self.prefix_args)
            .args(cmd.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => {
                Some(String::from_utf8_lossy(&out.stdout).into_owned())
            }
            Ok(out) => {
                debug!("player: {} exited with {:?}", cmd.name(), out.status.code());
                None
            }
            Err(e) => {
                warn!("player: failed to spawn for {}: {}", cmd.name(), e);
                None
            }
        }
    }
}

#[async_trait]
impl PlaybackController for ScController {
    async fn enqueue(&self, local_id: &str) {
        self.run(PlayerCommand::Link {
            uri: local_id.to_string(),
        })
        .await;
        self.run(PlayerCommand::QueueAdd { index: 0 }).await;
    }

    async fn play_first(&self) {
        self.run(PlayerCommand::Play { index: 0 }).await;
    }

    async fn play_next(&self) {
        self.run(PlayerCommand::Next).await;
    }

    async fn clear_queue(&self) {
        self.run(PlayerCommand::QueueClear).await;
    }

    async fn currently_playing(&self) -> Option<String> {
        let out = self.run(PlayerCommand::CurrentlyPlaying).await?;
        protocol::parse_current_track(&out)
    }

    async fn queue_depth(&self) -> Option<usize> {
        let out = self.run(PlayerCommand::QueueList).await?;
        Some(protocol::count_queue_entries(&out))
    }

    // `qprint` toggles.  Re-issue while it says it has just switched on,
    // until it reports the other state or the cap is hit.
    async fn enable_print_first_track_first(&self) {
        for _ in 0..self.print_mode_max_attempts {
            match self.run(PlayerCommand::QueuePrint).await {
                Some(out) if protocol::print_mode_just_changed(&out) => continue,
                _ => return,
            }
        }
        warn!(
            "player: qprint still reporting a mode change after {} attempts",
            self.print_mode_max_attempts
        );
    }
}
