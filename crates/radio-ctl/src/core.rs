/// Radio: the refill and feedback loops around one recommendation session.
///
/// ```text
///   refill task (spawned)                      feedback loop (main task)
///   ─────────────────────                      ─────────────────────────
///   WAITING ── depth < high-water ──┐          read line
///      ▲                            ▼          cur_playing → local id
///      │                        FETCHING          │ none → ignore
///      │                            │          SessionState → service id
///      └──────── ENQUEUING ◄────────┘          skip  → submit_skip?, next, wake ─┐
///        remember id, enqueue                  N     → submit_rating?            │
///      ▲                                                                         │
///      └──────────────────── Notify (or poll interval) ◄─────────────────────────┘
/// ```
///
/// Both sides share `SessionState` and the playback controller.  The refill
/// task is never joined; it ends when the process does.
use std::sync::Arc;
use std::time::Duration;

use radio_proto::config::RadioConfig;
use radio_proto::echonest::Track;
use radio_proto::feedback::Feedback;
use radio_proto::state::SessionState;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::echonest::RecommendationService;
use crate::player::PlaybackController;
use crate::prompt::Console;

pub const FEEDBACK_PROMPT: &str = "Feedback: ";

/// What one refill cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefillOutcome {
    /// Queue already at or above the high-water mark.
    Idle,
    /// Controller gave no queue listing this cycle.
    DepthUnknown,
    Enqueued,
    /// Service returned no song, or one without a playable reference.
    NothingPlayable,
    FetchFailed,
}

#[derive(Clone)]
pub struct Radio {
    player: Arc<dyn PlaybackController>,
    recommender: Arc<dyn RecommendationService>,
    session: Arc<SessionState>,
    queue_changed: Arc<Notify>,
    high_water_mark: usize,
    poll_interval: Duration,
}

impl Radio {
    pub fn new(
        player: Arc<dyn PlaybackController>,
        recommender: Arc<dyn RecommendationService>,
        session: Arc<SessionState>,
        config: &RadioConfig,
    ) -> Self {
        Self {
            player,
            recommender,
            session,
            queue_changed: Arc::new(Notify::new()),
            high_water_mark: config.high_water_mark,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    /// Reset the daemon's queue, queue the first recommendation and start
    /// playing it.
    pub async fn bootstrap(&self) {
        self.player.clear_queue().await;
        match self.recommender.next_track(self.session.session_id()).await {
            Ok(Some(track)) => {
                self.add_track(&track).await;
            }
            Ok(None) => warn!("radio: service offered no first track"),
            Err(e) => warn!("radio: could not fetch first track: {}", e),
        }
        self.player.enable_print_first_track_first().await;
        self.player.play_first().await;
    }

    /// Map and queue a track.  Returns false when it has no playable reference.
    async fn add_track(&self, track: &Track) -> bool {
        let Some(local_id) = track.local_id() else {
            debug!("radio: {} has no playable reference, dropped", track.id);
            return false;
        };
        self.session.remember(local_id, &track.id).await;
        self.player.enqueue(local_id).await;
        info!("radio: queued {} ({})", track.display(), local_id);
        true
    }

    /// One WAITING → FETCHING → ENQUEUING pass.  Queues at most one track.
    pub async fn refill_once(&self) -> RefillOutcome {
        let Some(depth) = self.player.queue_depth().await else {
            return RefillOutcome::DepthUnknown;
        };
        if depth >= self.high_water_mark {
            return RefillOutcome::Idle;
        }

        debug!(
            "radio: queue depth {} below {}, fetching",
            depth, self.high_water_mark
        );
        let track = match self.recommender.next_track(self.session.session_id()).await {
            Ok(Some(track)) => track,
            Ok(None) => return RefillOutcome::NothingPlayable,
            Err(e) => {
                warn!("radio: next track failed: {}", e);
                return RefillOutcome::FetchFailed;
            }
        };

        if self.add_track(&track).await {
            RefillOutcome::Enqueued
        } else {
            RefillOutcome::NothingPlayable
        }
    }

    /// Background refill.  Wakes every poll interval, or early when the
    /// feedback loop has advanced playback.
    pub async fn run_refill(self) {
        tokio::time::sleep(self.poll_interval).await;
        loop {
            let outcome = self.refill_once().await;
            if outcome != RefillOutcome::Idle {
                debug!("radio: refill cycle -> {:?}", outcome);
            }
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = self.queue_changed.notified() => {}
            }
        }
    }

    /// Route one line of feedback for whatever is playing now.
    pub async fn handle_feedback(&self, line: &str) {
        let Some(local_id) = self.player.currently_playing().await else {
            debug!("radio: nothing resolvable playing, feedback {:?} ignored", line);
            return;
        };
        let service_id = self.session.service_id(&local_id).await;
        let session_id = self.session.session_id();

        match Feedback::parse(line) {
            Feedback::Skip => {
                if let Some(song_id) = &service_id {
                    match self.recommender.submit_skip(session_id, song_id).await {
                        Ok(()) => info!("radio: skip sent for {}", song_id),
                        Err(e) => warn!("radio: skip feedback for {} lost: {}", song_id, e),
                    }
                }
                self.player.play_next().await;
                self.queue_changed.notify_one();
            }
            Feedback::Rate(rating) => {
                let Some(song_id) = &service_id else {
                    debug!("radio: {} not from this session, rating ignored", local_id);
                    return;
                };
                match self
                    .recommender
                    .submit_rating(session_id, song_id, &rating)
                    .await
                {
                    Ok(()) => info!("radio: rated {} {}", song_id, rating),
                    Err(e) => warn!("radio: rating for {} lost: {}", song_id, e),
                }
            }
            Feedback::Ignored => {}
        }
    }

    /// Prompt for feedback until input ends.
    pub async fn run_feedback<R, W>(&self, console: &mut Console<R, W>) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        while let Some(line) = console.ask(FEEDBACK_PROMPT).await? {
            self.handle_feedback(&line).await;
        }
        info!("radio: input closed, stopping");
        Ok(())
    }
}
