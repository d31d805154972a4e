//! Extension trait adding the VK section accessors to
//! `ariaconfig::Config`

use ariaconfig::Config;

/// Typed accessors for the `services.vk` configuration section
pub trait VkConfigExt {
    fn vk_enabled(&self) -> bool;
    fn vk_token(&self) -> String;
}

impl VkConfigExt for Config {
    fn vk_enabled(&self) -> bool {
        self.get_bool_or(&["services", "vk", "enabled"], true)
    }

    fn vk_token(&self) -> String {
        self.get_str_or(&["services", "vk", "token"], "")
    }
}
