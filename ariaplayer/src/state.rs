use std::fmt;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Playback mode; an axis independent of [`State`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Play one track, then stop
    SingleTrack,
    /// Repeat the current track forever
    RepeatTrack,
    /// Play the list once
    #[default]
    TrackList,
    /// Wrap around at both ends of the list
    RepeatTrackList,
    /// Play the list in a shuffled order
    Random,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Stopped => "stopped",
            State::Playing => "playing",
            State::Paused => "paused",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::SingleTrack => "single track",
            Mode::RepeatTrack => "repeat track",
            Mode::TrackList => "track list",
            Mode::RepeatTrackList => "repeat track list",
            Mode::Random => "random",
        };
        f.write_str(name)
    }
}
