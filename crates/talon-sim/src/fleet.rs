use crate::vehicle::VehicleHandle;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use talon_core::{TalonError, TalonResult};
use tracing::{debug, info};
use uuid::Uuid;

/// Registry of simulated vehicles plus the per-vehicle ownership tokens.
///
/// Ownership is the only cross-mission shared resource: a vehicle
/// command-accepts from one mission at a time, and acquisition fails fast
/// with [`TalonError::VehicleBusy`] rather than blocking. Callers that want
/// bounded waiting retry with backoff.
pub struct Fleet {
    vehicles: Mutex<HashMap<Uuid, VehicleHandle>>,
    owners: Arc<Mutex<HashMap<Uuid, Uuid>>>,
}

impl Fleet {
    /// Creates an empty fleet.
    pub fn new() -> Self {
        Self {
            vehicles: Mutex::new(HashMap::new()),
            owners: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Registers a vehicle and makes it available for acquisition.
    pub fn register(&self, handle: VehicleHandle) {
        info!(vehicle_id = %handle.id(), "vehicle registered");
        self.vehicles.lock().insert(handle.id(), handle);
    }

    /// Registered vehicle ids, in no particular order.
    pub fn vehicle_ids(&self) -> Vec<Uuid> {
        self.vehicles.lock().keys().copied().collect()
    }

    /// Looks up a vehicle's handle.
    pub fn handle(&self, vehicle_id: Uuid) -> TalonResult<VehicleHandle> {
        self.vehicles
            .lock()
            .get(&vehicle_id)
            .cloned()
            .ok_or_else(|| TalonError::Mission(format!("unknown vehicle {vehicle_id}")))
    }

    /// The mission currently holding a vehicle, if any.
    pub fn owner(&self, vehicle_id: Uuid) -> Option<Uuid> {
        self.owners.lock().get(&vehicle_id).copied()
    }

    /// Acquires exclusive ownership of a vehicle for a mission.
    ///
    /// Fails immediately with [`TalonError::VehicleBusy`] when another
    /// mission holds the token. The returned lease releases on drop.
    pub fn acquire(&self, vehicle_id: Uuid, mission_id: Uuid) -> TalonResult<VehicleLease> {
        // Validate the vehicle exists before touching the owner map.
        self.handle(vehicle_id)?;

        let mut owners = self.owners.lock();
        if let Some(&holder) = owners.get(&vehicle_id) {
            if holder != mission_id {
                return Err(TalonError::VehicleBusy(vehicle_id));
            }
        }
        owners.insert(vehicle_id, mission_id);
        debug!(vehicle_id = %vehicle_id, mission_id = %mission_id, "vehicle lease acquired");
        Ok(VehicleLease {
            vehicle_id,
            mission_id,
            owners: Arc::clone(&self.owners),
        })
    }

    /// Acquires any free vehicle for a mission.
    ///
    /// Fails with [`TalonError::VehicleBusy`] when every registered vehicle
    /// is held, or [`TalonError::Mission`] when the fleet is empty.
    pub fn acquire_any(&self, mission_id: Uuid) -> TalonResult<(VehicleHandle, VehicleLease)> {
        let ids = self.vehicle_ids();
        if ids.is_empty() {
            return Err(TalonError::Mission("no vehicles registered".into()));
        }
        for id in &ids {
            match self.acquire(*id, mission_id) {
                Ok(lease) => return Ok((self.handle(*id)?, lease)),
                Err(TalonError::VehicleBusy(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(TalonError::VehicleBusy(ids[0]))
    }
}

impl Default for Fleet {
    fn default() -> Self {
        Self::new()
    }
}

/// An exclusive per-vehicle ownership token held by one mission.
///
/// Held for the duration of a task's dispatch/collect/process phases and
/// released on drop (Processed, Failed, or Abort).
#[derive(Debug)]
pub struct VehicleLease {
    vehicle_id: Uuid,
    mission_id: Uuid,
    owners: Arc<Mutex<HashMap<Uuid, Uuid>>>,
}

impl VehicleLease {
    /// The leased vehicle.
    pub fn vehicle_id(&self) -> Uuid {
        self.vehicle_id
    }

    /// The holding mission.
    pub fn mission_id(&self) -> Uuid {
        self.mission_id
    }
}

impl Drop for VehicleLease {
    fn drop(&mut self) {
        let mut owners = self.owners.lock();
        if owners.get(&self.vehicle_id) == Some(&self.mission_id) {
            owners.remove(&self.vehicle_id);
            debug!(
                vehicle_id = %self.vehicle_id,
                mission_id = %self.mission_id,
                "vehicle lease released"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SimPolicy;
    use crate::vehicle::VehicleSimulator;

    fn fleet_with_one_vehicle() -> (Fleet, Uuid) {
        let fleet = Fleet::new();
        let handle = VehicleSimulator::spawn(SimPolicy::fast());
        let id = handle.id();
        fleet.register(handle);
        (fleet, id)
    }

    #[tokio::test]
    async fn test_exclusive_acquisition() {
        let (fleet, vehicle_id) = fleet_with_one_vehicle();
        let mission_a = Uuid::new_v4();
        let mission_b = Uuid::new_v4();

        let lease = fleet.acquire(vehicle_id, mission_a).unwrap();
        assert_eq!(fleet.owner(vehicle_id), Some(mission_a));

        let err = fleet.acquire(vehicle_id, mission_b).unwrap_err();
        assert!(matches!(err, TalonError::VehicleBusy(_)));

        drop(lease);
        assert_eq!(fleet.owner(vehicle_id), None);
        fleet.acquire(vehicle_id, mission_b).unwrap();
    }

    #[tokio::test]
    async fn test_reacquire_by_same_mission() {
        let (fleet, vehicle_id) = fleet_with_one_vehicle();
        let mission = Uuid::new_v4();

        let lease_a = fleet.acquire(vehicle_id, mission).unwrap();
        let lease_b = fleet.acquire(vehicle_id, mission).unwrap();
        drop(lease_a);
        assert_eq!(fleet.owner(vehicle_id), None);
        // Dropping the duplicate lease after release is a no-op.
        drop(lease_b);
        assert_eq!(fleet.owner(vehicle_id), None);
    }

    #[tokio::test]
    async fn test_acquire_any_prefers_free_vehicle() {
        let fleet = Fleet::new();
        let first = VehicleSimulator::spawn(SimPolicy::fast());
        let second = VehicleSimulator::spawn(SimPolicy::fast());
        fleet.register(first);
        fleet.register(second);

        let mission_a = Uuid::new_v4();
        let mission_b = Uuid::new_v4();
        let (handle_a, _lease_a) = fleet.acquire_any(mission_a).unwrap();
        let (handle_b, _lease_b) = fleet.acquire_any(mission_b).unwrap();
        assert_ne!(handle_a.id(), handle_b.id());

        let err = fleet.acquire_any(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, TalonError::VehicleBusy(_)));
    }

    #[tokio::test]
    async fn test_unknown_vehicle() {
        let fleet = Fleet::new();
        let err = fleet.acquire(Uuid::new_v4(), Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, TalonError::Mission(_)));
    }
}
