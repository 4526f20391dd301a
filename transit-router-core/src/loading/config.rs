use serde::{Deserialize, Serialize};

use crate::{Error, Minutes};

/// Network-wide routing parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutingSettings {
    /// Minutes spent waiting at a stop before every boarding
    pub bus_wait_time: i32,
    /// Bus speed in km/h
    pub bus_velocity: f64,
}

impl RoutingSettings {
    pub fn new(bus_wait_time: i32, bus_velocity: f64) -> Self {
        Self {
            bus_wait_time,
            bus_velocity,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the wait time is negative or the velocity is not
    /// a positive finite number
    pub fn validate(&self) -> Result<(), Error> {
        if self.bus_wait_time < 0 {
            return Err(Error::InvalidSettings(format!(
                "bus_wait_time must be non-negative, got {}",
                self.bus_wait_time
            )));
        }
        if !self.bus_velocity.is_finite() || self.bus_velocity <= 0.0 {
            return Err(Error::InvalidSettings(format!(
                "bus_velocity must be positive, got {}",
                self.bus_velocity
            )));
        }
        Ok(())
    }

    pub fn wait_time(&self) -> Minutes {
        f64::from(self.bus_wait_time)
    }

    /// Bus speed converted from km/h
    pub fn metres_per_minute(&self) -> f64 {
        self.bus_velocity * 1000.0 / 60.0
    }
}
