//! Parking history: saved car locations, newest first

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::{
    clock::Clock,
    error::{Error, Result},
    geo::{format_distance, navigation_links, Coordinates, NavigationLinks},
    store::{PersistentStore, HISTORY_KEY},
};

/// A saved parking spot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLocation {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    /// When the spot was saved, ms since epoch
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ParkingLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Input for saving a new spot
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Distance from a position to the car
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceReport {
    pub location: ParkingLocation,
    pub distance_km: f64,
    pub distance_display: String,
}

/// Map links leading to the car
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionsReport {
    pub location: ParkingLocation,
    pub links: NavigationLinks,
}

pub struct ParkingHistory {
    store: Arc<dyn PersistentStore>,
    clock: Arc<dyn Clock>,
    /// Held across every read-modify-write of the history key
    writes: Mutex<()>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ParkingHistory {
    pub fn new(store: Arc<dyn PersistentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            writes: Mutex::new(()),
        }
    }

    /// Block other history writers until the guard is dropped
    pub(crate) async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().await
    }

    /// All saved locations, newest first. Corrupt data reads as empty.
    pub async fn list(&self) -> Result<Vec<ParkingLocation>> {
        let Some(raw) = self.store.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(history) => Ok(history),
            Err(e) => {
                warn!("Parking history is corrupt, treating as empty: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Where the car currently is: the newest saved location
    pub async fn latest(&self) -> Result<Option<ParkingLocation>> {
        Ok(self.list().await?.into_iter().next())
    }

    /// Record a new parking spot at the front of the history
    pub async fn save(&self, input: NewLocation) -> Result<ParkingLocation> {
        let coords = Coordinates::new(input.latitude, input.longitude)?;

        let location = ParkingLocation {
            id: uuid::Uuid::new_v4().to_string(),
            latitude: coords.latitude,
            longitude: coords.longitude,
            address: non_blank(input.address).unwrap_or_else(|| coords.fallback_address()),
            timestamp: self.clock.now_ms(),
            floor: non_blank(input.floor),
            notes: non_blank(input.notes),
        };

        let _guard = self.writes.lock().await;
        let mut history = self.list().await?;
        history.insert(0, location.clone());
        self.write(&history).await?;

        info!("Saved parking location at {} ({})", location.address, location.id);
        Ok(location)
    }

    /// Remove one entry by id
    pub async fn delete(&self, id: &str) -> Result<ParkingLocation> {
        let _guard = self.writes.lock().await;
        let mut history = self.list().await?;
        let index = history
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| Error::LocationNotFound { id: id.to_string() })?;

        let removed = history.remove(index);
        self.write(&history).await?;

        info!("Deleted parking location {}", id);
        Ok(removed)
    }

    /// Forget the whole history
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.writes.lock().await;
        self.store.remove(HISTORY_KEY).await?;
        info!("Cleared parking history");
        Ok(())
    }

    /// Distance from `position` to the car, `None` when nothing is saved
    pub async fn distance_from(&self, position: Coordinates) -> Result<Option<DistanceReport>> {
        let Some(location) = self.latest().await? else {
            return Ok(None);
        };

        let distance_km = position.distance_km(&location.coordinates());
        Ok(Some(DistanceReport {
            location,
            distance_km,
            distance_display: format_distance(distance_km),
        }))
    }

    /// Navigation links from `origin` (when known) to the car
    pub async fn directions_from(
        &self,
        origin: Option<Coordinates>,
    ) -> Result<Option<DirectionsReport>> {
        let Some(location) = self.latest().await? else {
            return Ok(None);
        };

        let links = navigation_links(location.coordinates(), &location.address, origin);
        Ok(Some(DirectionsReport { location, links }))
    }

    async fn write(&self, history: &[ParkingLocation]) -> Result<()> {
        let json = serde_json::to_string(history)?;
        self.store.set(HISTORY_KEY, &json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{clock::ManualClock, store::MemoryStore};

    fn setup() -> (ParkingHistory, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000));
        (ParkingHistory::new(store.clone(), clock.clone()), store, clock)
    }

    fn spot(latitude: f64, longitude: f64) -> NewLocation {
        NewLocation {
            latitude,
            longitude,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_newest_first() {
        let (history, _, clock) = setup();
        let first = history.save(spot(55.0, 37.0)).await.unwrap();
        clock.advance(1_000);
        let second = history.save(spot(56.0, 38.0)).await.unwrap();

        let all = history.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
        assert_eq!(history.latest().await.unwrap().map(|l| l.id), Some(second.id));
    }

    #[tokio::test]
    async fn test_optional_fields_normalised() {
        let (history, store, _) = setup();
        let saved = history
            .save(NewLocation {
                latitude: 55.75583,
                longitude: 37.6173,
                address: Some("  ".to_string()),
                floor: Some("B2".to_string()),
                notes: Some("".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(saved.address, "55.7558, 37.6173");
        assert_eq!(saved.floor.as_deref(), Some("B2"));
        assert_eq!(saved.notes, None);
        assert_eq!(saved.timestamp, 1_000);

        let raw = store.get(HISTORY_KEY).await.unwrap().unwrap();
        assert!(raw.contains("\"floor\":\"B2\""));
        assert!(!raw.contains("notes"));
    }

    #[tokio::test]
    async fn test_reads_records_without_optional_fields() {
        let (history, store, _) = setup();
        store
            .set(
                HISTORY_KEY,
                r#"[{"id":"1","latitude":1.0,"longitude":2.0,"address":"Main St","timestamp":5}]"#,
            )
            .await
            .unwrap();

        let all = history.list().await.unwrap();
        assert_eq!(all[0].floor, None);
        assert_eq!(all[0].address, "Main St");
    }

    #[tokio::test]
    async fn test_invalid_coordinates_not_saved() {
        let (history, store, _) = setup();
        let err = history.save(spot(100.0, 0.0)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidCoordinates { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let (history, _, _) = setup();
        let a = history.save(spot(1.0, 1.0)).await.unwrap();
        let b = history.save(spot(2.0, 2.0)).await.unwrap();

        let removed = history.delete(&a.id).await.unwrap();
        assert_eq!(removed.id, a.id);
        assert_eq!(history.list().await.unwrap().len(), 1);

        let err = history.delete("missing").await.unwrap_err();
        assert!(matches!(err, Error::LocationNotFound { .. }));

        history.clear().await.unwrap();
        assert!(history.list().await.unwrap().is_empty());
        assert!(history.delete(&b.id).await.is_err());
    }

    #[tokio::test]
    async fn test_distance_from_latest() {
        let (history, _, _) = setup();
        let here = Coordinates::new(55.7558, 37.6173).unwrap();
        assert_eq!(history.distance_from(here).await.unwrap(), None);

        history.save(spot(55.7558, 37.6173)).await.unwrap();
        let report = history.distance_from(here).await.unwrap().unwrap();
        assert!(report.distance_km < 0.001);
        assert_eq!(report.distance_display, "0 m");
    }

    #[tokio::test]
    async fn test_directions_to_latest() {
        let (history, _, _) = setup();
        assert_eq!(history.directions_from(None).await.unwrap(), None);

        history
            .save(NewLocation {
                latitude: 55.75,
                longitude: 37.61,
                address: Some("Red Square".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let origin = Coordinates::new(55.7, 37.5).unwrap();
        let report = history.directions_from(Some(origin)).await.unwrap().unwrap();
        assert_eq!(report.location.address, "Red Square");
        assert_eq!(
            report.links.google_maps,
            "https://maps.google.com/maps?saddr=55.7,37.5&daddr=55.75,37.61"
        );
        assert_eq!(report.links.geo, "geo:55.75,37.61?q=55.75,37.61(Red%20Square)");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_keep_every_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(crate::store::FileStore::open(tmp.path()).await.unwrap());
        let history = Arc::new(ParkingHistory::new(store, Arc::new(ManualClock::new(0))));

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let history = Arc::clone(&history);
                tokio::spawn(async move { history.save(spot(10.0 + i as f64, 20.0)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(history.list().await.unwrap().len(), 20);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_save_and_delete() {
        let store = Arc::new(MemoryStore::new());
        let history = Arc::new(ParkingHistory::new(store, Arc::new(ManualClock::new(0))));
        let doomed = history.save(spot(1.0, 1.0)).await.unwrap();

        let deleter = {
            let history = Arc::clone(&history);
            tokio::spawn(async move { history.delete(&doomed.id).await })
        };
        let savers: Vec<_> = (0..10)
            .map(|i| {
                let history = Arc::clone(&history);
                tokio::spawn(async move { history.save(spot(i as f64, 2.0)).await })
            })
            .collect();

        deleter.await.unwrap().unwrap();
        for saver in savers {
            saver.await.unwrap().unwrap();
        }
        assert_eq!(history.list().await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_corrupt_history_reads_empty() {
        let (history, store, _) = setup();
        store.set(HISTORY_KEY, "oops").await.unwrap();
        assert!(history.list().await.unwrap().is_empty());
    }
}
