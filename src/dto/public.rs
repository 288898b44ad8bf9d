use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::ServiceError,
    state::pool::{PlayerRecord, PoolFilter, Position},
};

/// Query string accepted by the player search endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PlayersQuery {
    /// Case-insensitive substring of the player name.
    pub search: Option<String>,
    /// Exact position (`GK`, `DEF`, `MID`, `FWD`).
    pub position: Option<String>,
    /// Exact real-world club.
    pub team: Option<String>,
}

impl TryFrom<PlayersQuery> for PoolFilter {
    type Error = ServiceError;

    fn try_from(value: PlayersQuery) -> Result<Self, Self::Error> {
        let position = value
            .position
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| raw.parse::<Position>())
            .transpose()
            .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;
        Ok(PoolFilter {
            search: value.search.filter(|search| !search.trim().is_empty()),
            position,
            origin_team: value.team.filter(|team| !team.trim().is_empty()),
        })
    }
}

/// Response payload listing undrafted players matching a query.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayersResponse {
    /// Matching players in pool order.
    pub players: Vec<PlayerRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_fields_are_ignored() {
        let filter = PoolFilter::try_from(PlayersQuery {
            search: None,
            position: Some(" ".into()),
            team: Some("".into()),
        })
        .unwrap();
        assert_eq!(filter, PoolFilter::default());
    }

    #[test]
    fn position_is_parsed_leniently() {
        let filter = PoolFilter::try_from(PlayersQuery {
            position: Some("fwd".into()),
            ..PlayersQuery::default()
        })
        .unwrap();
        assert_eq!(filter.position, Some(Position::Forward));

        assert!(matches!(
            PoolFilter::try_from(PlayersQuery {
                position: Some("striker".into()),
                ..PlayersQuery::default()
            }),
            Err(ServiceError::InvalidInput(_))
        ));
    }
}
