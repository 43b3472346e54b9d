use std::{collections::HashMap, fs};

#[derive(Debug, Default)]
pub struct Settings {
    pub endpoint: Option<String>,
    pub client_id: Option<String>,
}

/// Optional `player.toml` in the working directory, overridden by
/// environment variables. Command-line flags override both.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("player.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("endpoint") {
                settings.endpoint = Some(v.clone());
            }
            if let Some(v) = file_cfg.get("client_id") {
                settings.client_id = Some(v.clone());
            }
        }
    }

    if let Ok(v) = std::env::var("PLAYER__ENDPOINT") {
        settings.endpoint = Some(v);
    }
    if let Ok(v) = std::env::var("PLAYER__CLIENT_ID") {
        settings.client_id = Some(v);
    }

    settings
}
