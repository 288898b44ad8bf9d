use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use uuid::Uuid;

use crate::error::DraftError;

/// Identity of a live client connection.
pub type ConnectionId = Uuid;

/// Who is asking for an operation, as far as the draft is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    /// Proved the admin secret.
    pub admin: bool,
    /// Team the requester is bound to, if any.
    pub team: Option<String>,
}

impl Principal {
    /// Rights of the REST admin.
    pub fn admin() -> Self {
        Self {
            admin: true,
            team: None,
        }
    }

    /// Rights of a connection bound to `team`.
    pub fn team(team: impl Into<String>) -> Self {
        Self {
            admin: false,
            team: Some(team.into()),
        }
    }

    /// No rights.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// True when the requester may act on behalf of `team`.
    pub fn speaks_for(&self, team: &str) -> bool {
        self.admin || self.team.as_deref() == Some(team)
    }
}

/// Session table: admin membership and team bindings keyed by connection.
#[derive(Debug, Clone)]
pub struct SessionAuthority {
    admin_secret: String,
    team_secrets: IndexMap<String, String>,
    admins: HashSet<ConnectionId>,
    bindings: HashMap<ConnectionId, String>,
    active: HashMap<String, ConnectionId>,
}

impl SessionAuthority {
    /// Create the table from the admin secret and each team's secret.
    pub fn new(admin_secret: impl Into<String>, team_secrets: IndexMap<String, String>) -> Self {
        Self {
            admin_secret: admin_secret.into(),
            team_secrets,
            admins: HashSet::new(),
            bindings: HashMap::new(),
            active: HashMap::new(),
        }
    }

    /// Grant admin rights to `connection` when `secret` matches.
    pub fn admin_login(
        &mut self,
        connection: ConnectionId,
        secret: &str,
    ) -> Result<(), DraftError> {
        if secret != self.admin_secret {
            return Err(DraftError::InvalidCredential);
        }
        self.admins.insert(connection);
        Ok(())
    }

    /// Bind `connection` to `team`. The latest successful binder wins: any other
    /// connection holding the team loses it and is returned so it can be told.
    pub fn select_team(
        &mut self,
        connection: ConnectionId,
        team: &str,
        secret: &str,
    ) -> Result<Option<ConnectionId>, DraftError> {
        match self.team_secrets.get(team) {
            Some(expected) if expected == secret => {}
            _ => return Err(DraftError::InvalidCredential),
        }

        if let Some(previous_team) = self.bindings.remove(&connection) {
            if self.active.get(&previous_team) == Some(&connection) {
                self.active.remove(&previous_team);
            }
        }

        let evicted = self
            .active
            .insert(team.to_string(), connection)
            .filter(|previous| *previous != connection);
        if let Some(previous) = evicted {
            self.bindings.remove(&previous);
        }
        self.bindings.insert(connection, team.to_string());
        Ok(evicted)
    }

    /// Forget everything about `connection`.
    pub fn disconnect(&mut self, connection: ConnectionId) {
        self.admins.remove(&connection);
        if let Some(team) = self.bindings.remove(&connection) {
            if self.active.get(&team) == Some(&connection) {
                self.active.remove(&team);
            }
        }
    }

    /// Whether the connection logged in as admin.
    pub fn is_admin(&self, connection: ConnectionId) -> bool {
        self.admins.contains(&connection)
    }

    /// Team the connection is bound to.
    pub fn bound_team(&self, connection: ConnectionId) -> Option<&str> {
        self.bindings.get(&connection).map(String::as_str)
    }

    /// Rights the connection acts with.
    pub fn principal(&self, connection: ConnectionId) -> Principal {
        Principal {
            admin: self.is_admin(connection),
            team: self.bound_team(connection).map(str::to_string),
        }
    }

    /// Every connection currently bound to a team.
    pub fn bindings(&self) -> impl Iterator<Item = (ConnectionId, &str)> {
        self.bindings
            .iter()
            .map(|(connection, team)| (*connection, team.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority() -> SessionAuthority {
        SessionAuthority::new(
            "letmein",
            IndexMap::from([
                ("Falcons".to_string(), "101".to_string()),
                ("Herons".to_string(), "202".to_string()),
            ]),
        )
    }

    #[test]
    fn admin_login_requires_the_admin_secret() {
        let mut sessions = authority();
        let conn = Uuid::new_v4();

        assert_eq!(sessions.admin_login(conn, "nope"), Err(DraftError::InvalidCredential));
        assert!(!sessions.is_admin(conn));

        sessions.admin_login(conn, "letmein").unwrap();
        assert!(sessions.principal(conn).admin);
    }

    #[test]
    fn wrong_secret_or_unknown_team_leaves_bindings_untouched() {
        let mut sessions = authority();
        let conn = Uuid::new_v4();
        sessions.select_team(conn, "Falcons", "101").unwrap();

        assert_eq!(
            sessions.select_team(conn, "Herons", "101"),
            Err(DraftError::InvalidCredential)
        );
        assert_eq!(
            sessions.select_team(conn, "Nobody", "101"),
            Err(DraftError::InvalidCredential)
        );
        assert_eq!(sessions.bound_team(conn), Some("Falcons"));
    }

    #[test]
    fn latest_binder_evicts_the_previous_one() {
        let mut sessions = authority();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        assert_eq!(sessions.select_team(first, "Falcons", "101"), Ok(None));
        assert_eq!(sessions.select_team(second, "Falcons", "101"), Ok(Some(first)));

        assert_eq!(sessions.bound_team(first), None);
        assert_eq!(sessions.bound_team(second), Some("Falcons"));
        assert_eq!(sessions.bindings().count(), 1);

        // Rebinding the same connection is not an eviction.
        assert_eq!(sessions.select_team(second, "Falcons", "101"), Ok(None));
    }

    #[test]
    fn switching_teams_releases_the_old_team() {
        let mut sessions = authority();
        let conn = Uuid::new_v4();
        let other = Uuid::new_v4();
        sessions.select_team(conn, "Falcons", "101").unwrap();
        sessions.select_team(conn, "Herons", "202").unwrap();

        assert_eq!(sessions.select_team(other, "Falcons", "101"), Ok(None));
        assert_eq!(sessions.bound_team(conn), Some("Herons"));
    }

    #[test]
    fn disconnect_releases_admin_and_team() {
        let mut sessions = authority();
        let conn = Uuid::new_v4();
        sessions.admin_login(conn, "letmein").unwrap();
        sessions.select_team(conn, "Herons", "202").unwrap();

        sessions.disconnect(conn);

        assert_eq!(sessions.principal(conn), Principal::anonymous());
        let newcomer = Uuid::new_v4();
        assert_eq!(sessions.select_team(newcomer, "Herons", "202"), Ok(None));
    }
}
