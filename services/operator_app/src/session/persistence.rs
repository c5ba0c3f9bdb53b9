//! services/operator_app/src/session/persistence.rs
//!
//! Maps a `PersistedRecord` onto the three keys the app keeps in durable storage.

use spio_core::domain::{OperatorProfile, PersistedRecord};
use spio_core::ports::{KeyValueStore, PortError, PortResult};

pub const ACCESS_TOKEN_KEY: &str = "spio_access_token";
pub const REFRESH_TOKEN_KEY: &str = "spio_refresh_token";
pub const OPERATOR_KEY: &str = "spio_operator";

/// What a startup read found.
#[derive(Debug)]
pub enum LoadOutcome {
    Empty,
    Restored(PersistedRecord),
    /// Something is stored but cannot be turned back into a session.
    Corrupt(String),
}

pub async fn load_record(store: &dyn KeyValueStore) -> PortResult<LoadOutcome> {
    let access_token = store.get(ACCESS_TOKEN_KEY).await?;
    let operator_json = store.get(OPERATOR_KEY).await?;

    let (access_token, operator_json) = match (access_token, operator_json) {
        (None, None) => {
            return match store.get(REFRESH_TOKEN_KEY).await? {
                Some(_) => Ok(LoadOutcome::Corrupt("refresh token without session".to_string())),
                None => Ok(LoadOutcome::Empty),
            }
        }
        (Some(token), Some(json)) => (token, json),
        (Some(_), None) => {
            return Ok(LoadOutcome::Corrupt("access token without operator".to_string()))
        }
        (None, Some(_)) => {
            return Ok(LoadOutcome::Corrupt("operator without access token".to_string()))
        }
    };

    if access_token.trim().is_empty() {
        return Ok(LoadOutcome::Corrupt("empty access token".to_string()));
    }

    let operator = match serde_json::from_str::<OperatorProfile>(&operator_json) {
        Ok(operator) => operator,
        Err(e) => return Ok(LoadOutcome::Corrupt(format!("unreadable operator: {}", e))),
    };

    let refresh_token = store.get(REFRESH_TOKEN_KEY).await?;

    Ok(LoadOutcome::Restored(PersistedRecord {
        access_token,
        refresh_token,
        operator,
    }))
}

/// Writes the record, access token last so a partial write reads back as corrupt.
pub async fn save_record(store: &dyn KeyValueStore, record: &PersistedRecord) -> PortResult<()> {
    let operator_json = serde_json::to_string(&record.operator)
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

    store.set(OPERATOR_KEY, &operator_json).await?;
    match &record.refresh_token {
        Some(token) => store.set(REFRESH_TOKEN_KEY, token).await?,
        None => store.remove(REFRESH_TOKEN_KEY).await?,
    }
    store.set(ACCESS_TOKEN_KEY, &record.access_token).await
}

/// Removes every key, even after one removal fails. Reports the first failure.
pub async fn clear_record(store: &dyn KeyValueStore) -> PortResult<()> {
    let mut first_error = None;
    for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, OPERATOR_KEY] {
        if let Err(e) = store.remove(key).await {
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
