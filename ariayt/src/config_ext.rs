//! Extension trait adding the YouTube section accessors to
//! `ariaconfig::Config`

use ariaconfig::Config;

/// Typed accessors for the `services.yt` configuration section
pub trait YtConfigExt {
    fn yt_enabled(&self) -> bool;
    fn yt_search_limit(&self) -> u32;
    fn yt_binary(&self) -> String;
}

impl YtConfigExt for Config {
    fn yt_enabled(&self) -> bool {
        self.get_bool_or(&["services", "yt", "enabled"], true)
    }

    fn yt_search_limit(&self) -> u32 {
        self.get_u64_or(&["services", "yt", "search_limit"], 300) as u32
    }

    fn yt_binary(&self) -> String {
        self.get_str_or(&["services", "yt", "binary"], "yt-dlp")
    }
}
