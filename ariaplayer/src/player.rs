//! The playback state machine

use std::sync::{Arc, Mutex as StdMutex};

use rand::seq::SliceRandom;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use ariaengine::{AudioEngine, EngineEvent, SeekMode, SoundDevice};
use ariasource::{Artist, Track, TrackType};

use crate::config_ext::PlayerSettings;
use crate::error::{Error, Result};
use crate::metadata::{parse_metadata, unescape};
use crate::state::{Mode, State};

const MIN_SPEED: f64 = 0.25;
const MAX_SPEED: f64 = 4.0;

#[derive(Default)]
struct PlayerInner {
    track_list: Vec<Track>,
    track: Track,
    track_index: Option<usize>,
    state: State,
    mode: Mode,
    /// Shuffle permutation over the track list indices; present only in
    /// [`Mode::Random`]
    shuffled: Option<Vec<usize>>,
    volume: u32,
}

/// Owns the engine handle and the playback state.
///
/// Caller commands and engine events both funnel through the internal
/// lock, so a transition is never computed from a half-updated state.
/// [`Player::run`] starts the event consumer; [`Player::close`] tears
/// everything down.
pub struct Player {
    settings: PlayerSettings,
    engine: Arc<dyn AudioEngine>,
    inner: Mutex<PlayerInner>,
    event_task: StdMutex<Option<JoinHandle<()>>>,
}

impl Player {
    pub fn new(settings: PlayerSettings, engine: Arc<dyn AudioEngine>) -> Self {
        let inner = PlayerInner {
            volume: settings.default_volume,
            ..PlayerInner::default()
        };
        Self {
            settings,
            engine,
            inner: Mutex::new(inner),
            event_task: StdMutex::new(None),
        }
    }

    pub async fn initialize(&self) {
        debug!("Initializing player");
        debug!("Player has been initialized");
    }

    /// Start consuming engine events.
    ///
    /// End-of-file and metadata updates are applied through the same lock
    /// as caller commands.
    pub fn run(self: Arc<Self>) {
        debug!("Registering player event loop");
        let player = Arc::clone(&self);
        let mut events = self.engine.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(EngineEvent::EndOfFile) => {
                        if let Err(err) = player.handle_end_of_file().await {
                            warn!(error = %err, "End-of-file handling failed");
                        }
                    }
                    Ok(EngineEvent::MetadataChanged) => {
                        if let Err(err) = player.handle_metadata_update().await {
                            warn!(error = %err, "Metadata update failed");
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Player lagged behind engine events");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("Player event loop finished");
        });
        *self.event_task.lock().unwrap() = Some(handle);
    }

    pub async fn close(&self) -> Result<()> {
        debug!("Closing player");
        if self.state().await != State::Stopped {
            self.stop().await?;
        }
        if let Some(handle) = self.event_task.lock().unwrap().take() {
            handle.abort();
        }
        self.engine.shutdown().await?;
        debug!("Player closed");
        Ok(())
    }

    pub async fn state(&self) -> State {
        self.inner.lock().await.state
    }

    pub async fn mode(&self) -> Mode {
        self.inner.lock().await.mode
    }

    /// Switch the playback mode. Entering [`Mode::Random`] rebuilds the
    /// shuffle permutation; leaving it discards the permutation.
    pub async fn set_mode(&self, mode: Mode) {
        let mut inner = self.inner.lock().await;
        if mode == Mode::Random {
            Self::reshuffle(&mut inner);
        } else {
            inner.shuffled = None;
        }
        inner.mode = mode;
    }

    /// The track currently loaded, if any
    pub async fn current_track(&self) -> Option<Track> {
        let inner = self.inner.lock().await;
        inner.track.is_valid().then(|| inner.track.clone())
    }

    pub async fn track_index(&self) -> Option<usize> {
        self.inner.lock().await.track_index
    }

    pub async fn tracks(&self) -> Vec<Track> {
        self.inner.lock().await.track_list.clone()
    }

    pub async fn volume(&self) -> u32 {
        self.inner.lock().await.volume
    }

    fn reshuffle(inner: &mut PlayerInner) {
        let mut indices: Vec<usize> = (0..inner.track_list.len()).collect();
        indices.shuffle(&mut rand::rng());
        inner.shuffled = Some(indices);
    }

    /// Resolve and start the track at `index`; negative indices wrap
    /// Python-style from the end of the list
    async fn play_index_locked(&self, inner: &mut PlayerInner, index: isize) -> Result<()> {
        let len = inner.track_list.len() as isize;
        if index >= len || index < -len {
            return Err(Error::IncorrectTrackIndex);
        }
        let normalized = if index < 0 { len + index } else { index } as usize;

        // Cache the resolved URL back into the list so replays skip the
        // backend.
        let url = inner.track_list[normalized].resolve().await?.to_string();
        inner.track = inner.track_list[normalized].clone();
        inner.track_index = Some(normalized);
        self.engine.play(&url).await?;
        inner.state = State::Playing;
        Ok(())
    }

    /// Start playback.
    ///
    /// With a track list, replaces the current list and starts at
    /// `start_index` (default 0) — or at the head of a fresh shuffle
    /// permutation in [`Mode::Random`] when no index is given. Without a
    /// track list, simply unpauses.
    pub async fn play(
        &self,
        tracks: Option<Vec<Track>>,
        start_index: Option<usize>,
    ) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if let Some(tracks) = tracks {
            inner.track_list = tracks;
            if start_index.is_none() && inner.mode == Mode::Random {
                Self::reshuffle(&mut inner);
                let first = inner
                    .shuffled
                    .as_ref()
                    .and_then(|indices| indices.first().copied());
                match first {
                    Some(index) => self.play_index_locked(&mut inner, index as isize).await?,
                    None => return Err(Error::IncorrectTrackIndex),
                }
            } else {
                let index = start_index.unwrap_or(0);
                self.play_index_locked(&mut inner, index as isize).await?;
            }
        } else {
            self.engine.set_pause(false).await?;
        }
        self.engine.set_volume(inner.volume as f64).await?;
        inner.state = State::Playing;
        Ok(())
    }

    /// Play the track at `index`.
    ///
    /// Valid for `-len <= index < len`; fails with
    /// [`Error::IncorrectTrackIndex`] otherwise.
    pub async fn play_by_index(&self, index: isize) -> Result<()> {
        let mut inner = self.inner.lock().await;
        self.play_index_locked(&mut inner, index).await
    }

    /// Next index in the shuffle permutation (`direction` 1) or the
    /// previous one (−1); `None` once the permutation runs out
    fn shuffle_step(inner: &PlayerInner, direction: isize) -> Option<usize> {
        let shuffled = inner.shuffled.as_ref()?;
        let position = shuffled
            .iter()
            .position(|&index| Some(index) == inner.track_index)?;
        let next = position as isize + direction;
        if next < 0 || next >= shuffled.len() as isize {
            return None;
        }
        Some(shuffled[next as usize])
    }

    pub async fn next(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let current = inner.track_index.map(|i| i as isize).unwrap_or(-1);
        let candidate = if !inner.track_list.is_empty() {
            if inner.mode == Mode::Random {
                match Self::shuffle_step(&inner, 1) {
                    Some(index) => index as isize,
                    None => return Err(Error::NoNextTrack),
                }
            } else {
                current + 1
            }
        } else {
            0
        };

        match self.play_index_locked(&mut inner, candidate).await {
            Err(Error::IncorrectTrackIndex) => {
                if inner.track_list.is_empty() {
                    Err(Error::IncorrectTrackIndex)
                } else if inner.mode == Mode::RepeatTrackList {
                    self.play_index_locked(&mut inner, 0).await
                } else {
                    Err(Error::NoNextTrack)
                }
            }
            other => other,
        }
    }

    pub async fn previous(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let current = inner.track_index.map(|i| i as isize).unwrap_or(-1);
        let candidate = if !inner.track_list.is_empty() {
            if inner.mode == Mode::Random {
                match Self::shuffle_step(&inner, -1) {
                    Some(index) => index as isize,
                    None => return Err(Error::NoPreviousTrack),
                }
            } else if current == 0 && inner.mode != Mode::RepeatTrackList {
                return Err(Error::NoPreviousTrack);
            } else {
                // At index 0 in repeat-list mode this lands on −1, the
                // negative-wraparound alias of the last track.
                current - 1
            }
        } else {
            0
        };

        match self.play_index_locked(&mut inner, candidate).await {
            Err(Error::IncorrectTrackIndex) => {
                if inner.track_list.is_empty() {
                    Err(Error::IncorrectTrackIndex)
                } else if inner.mode == Mode::RepeatTrackList {
                    let last = inner.track_list.len() as isize - 1;
                    self.play_index_locked(&mut inner, last).await
                } else {
                    Err(Error::NoPreviousTrack)
                }
            }
            other => other,
        }
    }

    /// Playing ⇄ Paused, mirroring the engine's pause flag
    pub async fn toggle_pause(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !self.engine.is_paused().await? {
            inner.state = State::Paused;
            self.engine.set_pause(true).await?;
        } else {
            inner.state = State::Playing;
            self.engine.set_pause(false).await?;
        }
        Ok(())
    }

    /// Stop playback and clear the track list
    pub async fn stop(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.state = State::Stopped;
        self.engine.stop().await?;
        inner.track_list.clear();
        inner.track = Track::default();
        inner.track_index = None;
        Ok(())
    }

    pub async fn seek_forward(&self, step: Option<f64>) -> Result<()> {
        self.seek_relative(step, 1.0).await
    }

    pub async fn seek_back(&self, step: Option<f64>) -> Result<()> {
        self.seek_relative(step, -1.0).await
    }

    async fn seek_relative(&self, step: Option<f64>, direction: f64) -> Result<()> {
        let step = step.unwrap_or(self.settings.seek_step);
        if step <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "seek step must be positive, got {step}"
            )));
        }
        // Seeking past the end is a stop, not an error.
        if self
            .engine
            .seek(direction * step, SeekMode::Relative)
            .await
            .is_err()
        {
            self.stop().await?;
        }
        Ok(())
    }

    pub async fn set_position(&self, position: f64) -> Result<()> {
        if position < 0.0 {
            return Err(Error::IncorrectPosition);
        }
        self.engine.seek(position, SeekMode::Absolute).await?;
        Ok(())
    }

    pub async fn get_position(&self) -> Result<f64> {
        Ok(self.engine.position().await?)
    }

    pub async fn get_duration(&self) -> Result<f64> {
        Ok(self.engine.duration().await?)
    }

    pub async fn get_speed(&self) -> Result<f64> {
        Ok(self.engine.speed().await?)
    }

    pub async fn set_speed(&self, speed: f64) -> Result<()> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(Error::InvalidArgument(format!(
                "speed must be within [{MIN_SPEED}, {MAX_SPEED}], got {speed}"
            )));
        }
        self.engine.set_speed(speed).await?;
        Ok(())
    }

    /// Set the target volume, clamped to the configured maximum.
    ///
    /// With fading enabled the engine volume walks one unit per
    /// configured interval toward the target; the call blocks for the
    /// whole fade.
    pub async fn set_volume(&self, volume: u32) -> Result<()> {
        let volume = volume.min(self.settings.max_volume);
        {
            self.inner.lock().await.volume = volume;
        }
        if self.settings.volume_fading {
            let mut current = self.engine.volume().await?.round() as i64;
            let target = volume as i64;
            let step = if current < target { 1 } else { -1 };
            while current != target {
                current += step;
                self.engine.set_volume(current as f64).await?;
                tokio::time::sleep(self.settings.volume_fading_interval).await;
            }
        } else {
            self.engine.set_volume(volume as f64).await?;
        }
        Ok(())
    }

    pub async fn get_output_devices(&self) -> Result<Vec<SoundDevice>> {
        Ok(self.engine.output_devices().await?)
    }

    pub async fn set_output_device(&self, device: &SoundDevice) -> Result<()> {
        self.engine.set_output_device(&device.id).await?;
        Ok(())
    }

    async fn handle_end_of_file(&self) -> Result<()> {
        let (state, mode, track_type, index) = {
            let inner = self.inner.lock().await;
            (
                inner.state,
                inner.mode,
                inner.track.track_type,
                inner.track_index,
            )
        };
        if state != State::Playing || !self.engine.is_idle().await? {
            return Ok(());
        }

        if mode == Mode::SingleTrack || track_type == TrackType::Direct {
            self.stop().await
        } else if mode == Mode::RepeatTrack {
            match index {
                Some(index) => self.play_by_index(index as isize).await,
                None => self.stop().await,
            }
        } else {
            match self.next().await {
                Err(Error::NoNextTrack) => self.stop().await,
                other => other,
            }
        }
    }

    async fn handle_metadata_update(&self) -> Result<()> {
        {
            let inner = self.inner.lock().await;
            let displayable = matches!(
                inner.track.track_type,
                TrackType::Direct | TrackType::Local
            );
            if inner.state != State::Playing || !displayable {
                return Ok(());
            }
        }

        let metadata = self.engine.metadata().await.unwrap_or_default();
        let mut parsed = parse_metadata(&metadata);
        if parsed.title.is_none() {
            parsed.title = self.engine.media_title().await?.map(|t| unescape(&t));
        }

        let mut inner = self.inner.lock().await;
        if inner.state != State::Playing {
            return Ok(());
        }
        if let Some(title) = parsed.title {
            if !title.is_empty() && inner.track.title != title {
                inner.track.title = title;
            }
        }
        if let Some(artist) = parsed.artist {
            inner.track.artists = vec![Artist::new(artist)];
        }
        if let Some(stream_name) = parsed.stream_name {
            inner.track.stream_name = Some(stream_name);
        }
        // Keep the list entry in sync with the displayed track.
        if let Some(index) = inner.track_index {
            let track = inner.track.clone();
            inner.track_list[index] = track;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn shuffle_permutation(&self) -> Option<Vec<usize>> {
        self.inner.lock().await.shuffled.clone()
    }
}
