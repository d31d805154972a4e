//! Extension trait adding the player section accessors to
//! `ariaconfig::Config`

use std::collections::HashMap;
use std::time::Duration;

use ariaconfig::Config;

/// Runtime settings of the player, read once at construction
#[derive(Debug, Clone)]
pub struct PlayerSettings {
    pub default_volume: u32,
    pub max_volume: u32,
    pub volume_fading: bool,
    pub volume_fading_interval: Duration,
    pub seek_step: f64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            default_volume: 50,
            max_volume: 100,
            volume_fading: true,
            volume_fading_interval: Duration::from_millis(25),
            seek_step: 5.0,
        }
    }
}

/// Typed accessors for the `player` configuration section
pub trait PlayerConfigExt {
    fn player_settings(&self) -> PlayerSettings;

    /// Extra options handed verbatim to the engine process
    fn engine_options(&self) -> HashMap<String, String>;
}

impl PlayerConfigExt for Config {
    fn player_settings(&self) -> PlayerSettings {
        let defaults = PlayerSettings::default();
        PlayerSettings {
            default_volume: self
                .get_u64_or(&["player", "default_volume"], defaults.default_volume as u64)
                as u32,
            max_volume: self.get_u64_or(&["player", "max_volume"], defaults.max_volume as u64)
                as u32,
            volume_fading: self.get_bool_or(&["player", "volume_fading"], defaults.volume_fading),
            volume_fading_interval: Duration::from_millis(self.get_u64_or(
                &["player", "volume_fading_interval_ms"],
                defaults.volume_fading_interval.as_millis() as u64,
            )),
            seek_step: self.get_f64_or(&["player", "seek_step"], defaults.seek_step),
        }
    }

    fn engine_options(&self) -> HashMap<String, String> {
        let mut options = HashMap::new();
        if let Ok(serde_yaml::Value::Mapping(map)) = self.get_value(&["player", "engine_options"])
        {
            for (key, value) in map {
                if let (serde_yaml::Value::String(key), Some(value)) =
                    (key, scalar_to_string(&value))
                {
                    options.insert(key, value);
                }
            }
        }
        options
    }
}

/// Scalar YAML value as the string the engine command line expects
fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(if *b { "yes" } else { "no" }.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_are_rendered_for_the_command_line() {
        assert_eq!(
            scalar_to_string(&serde_yaml::Value::String("x".into())),
            Some("x".to_string())
        );
        assert_eq!(
            scalar_to_string(&serde_yaml::Value::Number(2097152.into())),
            Some("2097152".to_string())
        );
        assert_eq!(
            scalar_to_string(&serde_yaml::Value::Bool(false)),
            Some("no".to_string())
        );
        assert_eq!(scalar_to_string(&serde_yaml::Value::Null), None);
    }
}
