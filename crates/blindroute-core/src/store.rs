//! Sled-backed store for reservation records.
//!
//! Keys are `reservation_{created_at_millis:020}_{uuid}` so key order is creation order and
//! the latest record is the last key.

use crate::boarding::ReservationPayload;
use crate::error::CoreResult;
use crate::transit::ReservationKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

const KEY_PREFIX: &str = "reservation_";

/// One persisted reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRecord {
    pub id: String,
    pub owner: String,
    pub st_id: String,
    pub ars_id: String,
    pub bus_route_id: String,
    pub reservation_type: ReservationKind,
    pub created_at: DateTime<Utc>,
}

/// Reservation records on the host filesystem.
pub struct ReservationStore {
    db: sled::Db,
}

impl ReservationStore {
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Persist a new reservation and return its record once it is on disk.
    pub async fn create(&self, owner: &str, payload: &ReservationPayload) -> CoreResult<ReservationRecord> {
        let created_at = Utc::now();
        let id = uuid::Uuid::new_v4().to_string();
        let record = ReservationRecord {
            id: id.clone(),
            owner: owner.to_string(),
            st_id: payload.st_id.clone(),
            ars_id: payload.ars_id.clone(),
            bus_route_id: payload.bus_route_id.clone(),
            reservation_type: payload.reservation_type,
            created_at,
        };
        let key = format!(
            "{}{:020}_{}",
            KEY_PREFIX,
            created_at.timestamp_millis().max(0),
            id
        );
        self.db.insert(key.as_bytes(), serde_json::to_vec(&record)?)?;
        self.db.flush_async().await?;
        info!(
            "[STORE] {} reservation {} at {} for route {}",
            record.reservation_type.as_str(),
            record.id,
            record.ars_id,
            record.bus_route_id
        );
        Ok(record)
    }

    /// Most recent record, if any.
    pub fn latest(&self) -> CoreResult<Option<ReservationRecord>> {
        match self.db.scan_prefix(KEY_PREFIX.as_bytes()).next_back() {
            Some(entry) => {
                let (_, value) = entry?;
                Ok(Some(serde_json::from_slice(&value)?))
            }
            None => Ok(None),
        }
    }

    /// Look up a record by id.
    pub fn get(&self, id: &str) -> CoreResult<Option<ReservationRecord>> {
        for entry in self.db.scan_prefix(KEY_PREFIX.as_bytes()) {
            let (key, value) = entry?;
            if key.ends_with(id.as_bytes()) {
                return Ok(Some(serde_json::from_slice(&value)?));
            }
        }
        Ok(None)
    }

    pub fn len(&self) -> usize {
        self.db.scan_prefix(KEY_PREFIX.as_bytes()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(route: &str) -> ReservationPayload {
        ReservationPayload {
            st_id: "102000271".into(),
            ars_id: "02006".into(),
            bus_route_id: route.into(),
            reservation_type: ReservationKind::Boarding,
        }
    }

    #[tokio::test]
    async fn latest_is_last_created() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReservationStore::open(dir.path()).unwrap();
        assert!(store.latest().unwrap().is_none());

        store.create("rider", &payload("100100016")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = store.create("rider", &payload("100100118")).await.unwrap();

        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest, second);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&second.id).unwrap(), Some(second));
    }
}
