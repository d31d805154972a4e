//! Application-level configuration accessors

use std::path::PathBuf;

use ariaconfig::Config;

/// Typed accessors for the `engine` configuration section
pub trait EngineConfigExt {
    fn engine_binary(&self) -> String;

    /// IPC socket path; per-process under the config directory unless
    /// configured explicitly
    fn engine_socket_path(&self) -> PathBuf;
}

impl EngineConfigExt for Config {
    fn engine_binary(&self) -> String {
        self.get_str_or(&["engine", "mpv_binary"], "mpv")
    }

    fn engine_socket_path(&self) -> PathBuf {
        let configured = self.get_str_or(&["engine", "ipc_socket"], "");
        if !configured.is_empty() {
            return PathBuf::from(configured);
        }
        PathBuf::from(self.directory()).join(format!("engine-{}.sock", std::process::id()))
    }
}

/// Typed accessors for the service selection keys
pub trait ServicesConfigExt {
    fn default_service(&self) -> String;
    fn fallback_service(&self) -> String;
}

impl ServicesConfigExt for Config {
    fn default_service(&self) -> String {
        self.get_str_or(&["services", "default_service"], "vk")
    }

    fn fallback_service(&self) -> String {
        self.get_str_or(&["services", "fallback_service"], "yt")
    }
}
