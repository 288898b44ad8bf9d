use indexmap::IndexMap;

use crate::state::{pool::PlayerPool, roster::RosterLedger};

/// Ordered auto-draft preferences for every team.
#[derive(Debug, Clone, Default)]
pub struct WatchlistStore {
    lists: IndexMap<String, Vec<String>>,
}

impl WatchlistStore {
    /// Empty lists for `teams`, kept in draft order.
    pub fn new(teams: &[String]) -> Self {
        Self {
            lists: teams.iter().map(|team| (team.clone(), Vec::new())).collect(),
        }
    }

    /// Replace a team's whole list. Entries are stored as given, including names that are
    /// not (or no longer) in the pool.
    pub fn replace(&mut self, team: &str, names: Vec<String>) {
        self.lists.insert(team.to_string(), names);
    }

    /// Watchlist of `team`, empty when unknown.
    pub fn get(&self, team: &str) -> &[String] {
        self.lists.get(team).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every team's watchlist.
    pub fn all(&self) -> &IndexMap<String, Vec<String>> {
        &self.lists
    }

    /// First watchlisted name that is still undrafted and fits under `team`'s caps.
    pub fn first_available<'a>(
        &'a self,
        team: &str,
        pool: &PlayerPool,
        ledger: &RosterLedger,
    ) -> Option<&'a str> {
        self.get(team)
            .iter()
            .find(|name| {
                pool.find_by_name(name)
                    .is_some_and(|player| ledger.can_draft(team, player.position))
            })
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::state::pool::{PlayerRecord, Position};

    #[test]
    fn skips_drafted_missing_and_capped_entries_without_pruning() {
        let teams = vec!["Owls".to_string()];
        let pool = PlayerPool::new([
            PlayerRecord::new(Position::Goalkeeper, "Yann Sommer", "Inter"),
            PlayerRecord::new(Position::Midfielder, "Teun Koopmeiners", "Juventus"),
        ]);
        let mut ledger = RosterLedger::new(&teams, HashMap::from([(Position::Goalkeeper, 1)]));
        ledger.increment("Owls", Position::Goalkeeper);

        let mut store = WatchlistStore::new(&teams);
        let wanted = vec![
            "Already Gone".to_string(),
            "Yann Sommer".to_string(),
            "Teun Koopmeiners".to_string(),
        ];
        store.replace("Owls", wanted.clone());

        assert_eq!(store.first_available("Owls", &pool, &ledger), Some("Teun Koopmeiners"));
        assert_eq!(store.get("Owls"), wanted.as_slice());
    }

    #[test]
    fn unknown_team_has_an_empty_list() {
        let store = WatchlistStore::new(&[]);
        assert!(store.get("Nobody").is_empty());
    }
}
