//! Application-level configuration loading: league layout, secrets and pick timer.

use std::{collections::HashSet, env, fs, io::ErrorKind, path::PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    error::DraftError,
    state::{coordinator::DraftSettings, pool::Position},
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/draft.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "DRAFT_ROOM_CONFIG_PATH";
const ADMIN_SECRET_ENV: &str = "DRAFT_ADMIN_SECRET";
const TIMER_SECONDS_ENV: &str = "DRAFT_TIMER_SECONDS";
const PLAYERS_PATH_ENV: &str = "DRAFT_PLAYERS_PATH";

const DEFAULT_ROUNDS: u32 = 25;
const DEFAULT_TIMER_SECONDS: u32 = 120;
const DEFAULT_ADMIN_SECRET: &str = "admin123";
const DEFAULT_PLAYERS_PATH: &str = "players.csv";

/// A participating team and the secret that lets a client act for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamConfig {
    /// Display name, also the key used by intents.
    pub name: String,
    /// Secret a client presents to bind to this team.
    pub secret: String,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Teams in first-round draft order.
    pub teams: Vec<TeamConfig>,
    /// Number of snake rounds.
    pub rounds: u32,
    /// Maximum players per position on one roster; missing positions are unlimited.
    pub roster_caps: IndexMap<Position, u32>,
    /// Secret granting admin rights over WebSocket and REST.
    pub admin_secret: String,
    /// Per-pick countdown in seconds.
    pub timer_seconds: u32,
    /// Headerless `position,player,team` CSV loaded at startup.
    pub players_path: PathBuf,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to the built-in league, then apply
    /// environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config = Self::from(raw);
                    info!(
                        path = %path.display(),
                        teams = app_config.teams.len(),
                        rounds = app_config.rounds,
                        "loaded draft configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.with_overrides(|key| env::var(key).ok())
    }

    /// Apply `DRAFT_*` overrides resolved through `lookup`. Unparsable values are ignored
    /// with a warning.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(secret) = lookup(ADMIN_SECRET_ENV).filter(|value| !value.is_empty()) {
            self.admin_secret = secret;
        }
        if let Some(raw) = lookup(TIMER_SECONDS_ENV) {
            match raw.trim().parse::<u32>() {
                Ok(seconds) => self.timer_seconds = seconds,
                Err(err) => {
                    warn!(value = %raw, error = %err, "ignoring invalid {TIMER_SECONDS_ENV}")
                }
            }
        }
        if let Some(path) = lookup(PLAYERS_PATH_ENV).filter(|value| !value.is_empty()) {
            self.players_path = PathBuf::from(path);
        }
        self
    }

    /// Reject layouts the draft cannot run with.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.teams.is_empty() {
            return invalid("at least one team is required");
        }
        let mut seen = HashSet::new();
        for team in &self.teams {
            if team.name.trim().is_empty() {
                return invalid("team names cannot be blank");
            }
            if !seen.insert(team.name.as_str()) {
                return invalid(format!("team `{}` is listed twice", team.name));
            }
        }
        if self.rounds == 0 {
            return invalid("rounds must be at least 1");
        }
        if self.timer_seconds == 0 {
            return invalid("timer_seconds must be positive");
        }
        if self.admin_secret.is_empty() {
            return invalid("admin_secret cannot be empty");
        }
        Ok(())
    }

    /// Parameters handed to the draft coordinator.
    pub fn draft_settings(&self) -> DraftSettings {
        DraftSettings {
            teams: self.team_names(),
            rounds: self.rounds,
            roster_caps: self
                .roster_caps
                .iter()
                .map(|(position, cap)| (*position, *cap))
                .collect(),
            timer_seconds: self.timer_seconds,
        }
    }

    /// Team names in first-round draft order.
    pub fn team_names(&self) -> Vec<String> {
        self.teams.iter().map(|team| team.name.clone()).collect()
    }

    /// Team name to secret, in draft order.
    pub fn team_secrets(&self) -> IndexMap<String, String> {
        self.teams
            .iter()
            .map(|team| (team.name.clone(), team.secret.clone()))
            .collect()
    }
}

fn invalid(message: impl Into<String>) -> Result<(), DraftError> {
    Err(DraftError::InvalidConfiguration(message.into()))
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            teams: default_teams(),
            rounds: DEFAULT_ROUNDS,
            roster_caps: default_roster_caps(),
            admin_secret: DEFAULT_ADMIN_SECRET.into(),
            timer_seconds: DEFAULT_TIMER_SECONDS,
            players_path: PathBuf::from(DEFAULT_PLAYERS_PATH),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
/// Missing keys keep their built-in value.
#[serde(default)]
struct RawConfig {
    teams: Option<Vec<TeamConfig>>,
    rounds: Option<u32>,
    roster_caps: Option<IndexMap<Position, u32>>,
    admin_secret: Option<String>,
    timer_seconds: Option<u32>,
    players_path: Option<PathBuf>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            teams: value.teams.unwrap_or(defaults.teams),
            rounds: value.rounds.unwrap_or(defaults.rounds),
            roster_caps: value.roster_caps.unwrap_or(defaults.roster_caps),
            admin_secret: value.admin_secret.unwrap_or(defaults.admin_secret),
            timer_seconds: value.timer_seconds.unwrap_or(defaults.timer_seconds),
            players_path: value.players_path.unwrap_or(defaults.players_path),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn default_roster_caps() -> IndexMap<Position, u32> {
    IndexMap::from([
        (Position::Goalkeeper, 3),
        (Position::Defender, 8),
        (Position::Midfielder, 8),
        (Position::Forward, 6),
    ])
}

/// Built-in twelve-team league shipped with the binary.
fn default_teams() -> Vec<TeamConfig> {
    [
        ("FC Wyoming", "101"),
        ("ASS Rint oCess", "837"),
        ("Real Boban", "483"),
        ("LI Mutanda", "731"),
        ("Vostri Cavani", "861"),
        ("Paris San Gennaro", "938"),
        ("Stamm Nguaiat FC", "581"),
        ("AutoDraft FC", "797"),
        ("Chunky Lozano", "378"),
        ("Cioccolato Bianco", "982"),
        ("Alessandro FC", "362"),
        ("SSC Mario Rui", "796"),
    ]
    .into_iter()
    .map(|(name, secret)| TeamConfig {
        name: name.into(),
        secret: secret.into(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.teams.len(), 12);
        assert_eq!(config.draft_settings().roster_caps[&Position::Goalkeeper], 3);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"teams":[{"name":"A","secret":"1"},{"name":"B","secret":"2"}],"rounds":3,"roster_caps":{"gk":1}}"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.team_names(), ["A", "B"]);
        assert_eq!(config.rounds, 3);
        assert_eq!(config.roster_caps.get(&Position::Goalkeeper), Some(&1));
        assert_eq!(config.roster_caps.get(&Position::Forward), None);
        assert_eq!(config.timer_seconds, DEFAULT_TIMER_SECONDS);
    }

    #[test]
    fn overrides_replace_secret_timer_and_players() {
        let config = AppConfig::default().with_overrides(|key| match key {
            ADMIN_SECRET_ENV => Some("s3cret".into()),
            TIMER_SECONDS_ENV => Some("45".into()),
            PLAYERS_PATH_ENV => Some("/data/serie_a.csv".into()),
            _ => None,
        });

        assert_eq!(config.admin_secret, "s3cret");
        assert_eq!(config.timer_seconds, 45);
        assert_eq!(config.players_path, PathBuf::from("/data/serie_a.csv"));
    }

    #[test]
    fn bad_timer_override_is_ignored() {
        let config = AppConfig::default()
            .with_overrides(|key| (key == TIMER_SECONDS_ENV).then(|| "soon".to_string()));
        assert_eq!(config.timer_seconds, DEFAULT_TIMER_SECONDS);
    }

    #[test]
    fn validate_rejects_broken_layouts() {
        let duplicate = AppConfig {
            teams: vec![
                TeamConfig { name: "A".into(), secret: "1".into() },
                TeamConfig { name: "A".into(), secret: "2".into() },
            ],
            ..AppConfig::default()
        };
        let no_rounds = AppConfig { rounds: 0, ..AppConfig::default() };
        let no_timer = AppConfig { timer_seconds: 0, ..AppConfig::default() };
        let no_teams = AppConfig { teams: vec![], ..AppConfig::default() };

        for config in [duplicate, no_rounds, no_timer, no_teams] {
            assert!(matches!(
                config.validate(),
                Err(DraftError::InvalidConfiguration(_))
            ));
        }
    }
}
