//! Service helpers that expose read-only public projections of the draft.

use indexmap::IndexMap;

use crate::{
    dto::{
        draft::{DraftExport, DraftSnapshot},
        public::{PlayersQuery, PlayersResponse},
        ws::WatchlistsPayload,
    },
    error::ServiceError,
    state::{SharedState, pool::PoolFilter},
};

/// Return the full draft state.
pub async fn get_state(state: &SharedState) -> Result<DraftSnapshot, ServiceError> {
    state.draft().snapshot().await
}

/// Return undrafted players matching the query, in pool order.
pub async fn get_players(
    state: &SharedState,
    query: PlayersQuery,
) -> Result<PlayersResponse, ServiceError> {
    let filter = PoolFilter::try_from(query)?;
    let players = state.draft().players(filter).await?;
    Ok(PlayersResponse { players })
}

/// Return every team's watchlist.
pub async fn get_watchlists(state: &SharedState) -> Result<WatchlistsPayload, ServiceError> {
    let watchlists: IndexMap<String, Vec<String>> = state.draft().watchlists().await?;
    Ok(WatchlistsPayload { watchlists })
}

/// Return the results export as JSON rows.
pub async fn get_export(state: &SharedState) -> Result<DraftExport, ServiceError> {
    state.draft().export().await
}

/// Return the results export rendered as CSV.
pub async fn get_export_csv(state: &SharedState) -> Result<String, ServiceError> {
    let export = state.draft().export().await?;
    export
        .to_csv()
        .map_err(|err| ServiceError::Internal(format!("failed to render export: {err}")))
}
