//! Extension trait adding the Yandex Music section accessors to
//! `ariaconfig::Config`

use ariaconfig::Config;

/// Typed accessors for the `services.yam` configuration section
pub trait YamConfigExt {
    fn yam_enabled(&self) -> bool;
    fn yam_token(&self) -> String;
}

impl YamConfigExt for Config {
    fn yam_enabled(&self) -> bool {
        self.get_bool_or(&["services", "yam", "enabled"], true)
    }

    fn yam_token(&self) -> String {
        self.get_str_or(&["services", "yam", "token"], "")
    }
}
