//! Load config from file and environment.

use serde::Deserialize;
use std::path::PathBuf;

/// Tool configuration. File: ~/.config/eufy-ctl/config.toml or
/// /etc/eufy-ctl/config.toml.
/// Env overrides: EUFY_EMAIL, EUFY_PASSWORD, EUFY_STATION, EUFY_STATION_ADDR.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Serial of the station to exercise (default: first one found).
    pub station: Option<String>,
    /// Known LAN address of the station, `ip` or `ip:port` (port defaults
    /// to 32100). Skips the rendezvous servers.
    pub station_addr: Option<String>,
}

/// Load config: merge default, then config file (if present), then env vars.
pub fn load() -> Config {
    let mut c = load_file().unwrap_or_else(Config::default);
    if let Ok(s) = std::env::var("EUFY_EMAIL") {
        c.email = s;
    }
    if let Ok(s) = std::env::var("EUFY_PASSWORD") {
        c.password = s;
    }
    if let Ok(s) = std::env::var("EUFY_STATION") {
        c.station = Some(s);
    }
    if let Ok(s) = std::env::var("EUFY_STATION_ADDR") {
        c.station_addr = Some(s);
    }
    c
}

fn config_paths() -> Vec<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let mut out = Vec::new();
    if let Some(h) = home {
        out.push(h.join(".config/eufy-ctl/config.toml"));
    }
    out.push(PathBuf::from("/etc/eufy-ctl/config.toml"));
    out
}

fn load_file() -> Option<Config> {
    for p in config_paths() {
        if p.exists() {
            if let Ok(s) = std::fs::read_to_string(&p) {
                if let Ok(c) = toml::from_str::<Config>(&s) {
                    return Some(c);
                }
            }
            break;
        }
    }
    None
}
