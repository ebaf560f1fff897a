//! Ride registry consulted by support-height checks.

use std::collections::BTreeMap;

use landscape_core::RideId;

/// Families of rides with their own support limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RideType {
    /// Small coaster for younger guests.
    JuniorCoaster,
    /// Wooden roller coaster.
    WoodenCoaster,
    /// Steel looping roller coaster.
    LoopingCoaster,
    /// Miniature railway, which may cross footpaths.
    MiniatureRailway,
    /// Monorail.
    Monorail,
    /// Log flume running in water channels.
    LogFlume,
}

impl RideType {
    /// Default support ceiling of the ride type, in half height units.
    #[must_use]
    pub const fn default_max_height(self) -> u8 {
        match self {
            Self::JuniorCoaster => 12,
            Self::WoodenCoaster => 41,
            Self::LoopingCoaster => 35,
            Self::MiniatureRailway => 7,
            Self::Monorail => 8,
            Self::LogFlume => 9,
        }
    }
}

/// Ride stored inside the world.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ride {
    name: String,
    ride_type: RideType,
    max_height_override: u8,
}

impl Ride {
    /// Creates a ride using the ride type's support ceiling.
    #[must_use]
    pub fn new(name: impl Into<String>, ride_type: RideType) -> Self {
        Self {
            name: name.into(),
            ride_type,
            max_height_override: 0,
        }
    }

    /// Replaces the support ceiling; zero restores the ride type default.
    #[must_use]
    pub fn with_max_height(mut self, max_height: u8) -> Self {
        self.max_height_override = max_height;
        self
    }

    /// Display name of the ride.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Highest support the ride may stand on, in half height units.
    #[must_use]
    pub const fn max_height(&self) -> u8 {
        if self.max_height_override == 0 {
            self.ride_type.default_max_height()
        } else {
            self.max_height_override
        }
    }
}

/// Registry that stores rides and manages identifier allocation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct RideRegistry {
    entries: BTreeMap<RideId, Ride>,
    next_ride_id: u16,
}

impl RideRegistry {
    /// Stores the ride under a freshly allocated identifier.
    pub(crate) fn register(&mut self, ride: Ride) -> RideId {
        let id = RideId::new(self.next_ride_id);
        self.next_ride_id = self.next_ride_id.saturating_add(1);
        let _ = self.entries.insert(id, ride);
        id
    }

    pub(crate) fn get(&self, id: RideId) -> Option<&Ride> {
        self.entries.get(&id)
    }
}
