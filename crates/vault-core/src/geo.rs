//! Geolocation acquisition across ticks.
//!
//! The sensor call is fired once when a refresh is requested and its result
//! shows up on some later tick. [`GeolocationAcquisition::poll`] is therefore
//! called once per tick while the state is [`GeoStatus::Pending`], and "no
//! result yet" is a normal input rather than an error.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{Error, Result, recipe::GEOLOCATION_SENTINEL};

pub const DISPLAY_IDLE: &str = "Click 'Refresh Location' to detect.";
pub const DISPLAY_PENDING: &str = "Detecting...";

// ─── Sensor collaborator ─────────────────────────────────────────────────────

/// Coordinate object as reported by the sensor. Either field may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
  pub latitude:  Option<f64>,
  pub longitude: Option<f64>,
}

/// A resolved sensor response. `coords` is absent when the sensor answered
/// without any position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorReading {
  pub coords: Option<Coordinates>,
}

impl SensorReading {
  pub fn at(latitude: f64, longitude: f64) -> Self {
    Self {
      coords: Some(Coordinates {
        latitude:  Some(latitude),
        longitude: Some(longitude),
      }),
    }
  }
}

/// A location source whose answer arrives asynchronously.
pub trait LocationSensor {
  /// Fire a new request. Any earlier unresolved request is abandoned.
  fn request_once(&mut self);

  /// Take the result of the outstanding request, if it has resolved.
  fn poll(&mut self) -> Option<SensorReading>;
}

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoStatus {
  Idle,
  Pending,
  Detected,
  Failed,
}

impl fmt::Display for GeoStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Idle => "idle",
      Self::Pending => "pending",
      Self::Detected => "detected",
      Self::Failed => "failed",
    })
  }
}

/// Why a resolved sensor reading could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GeoFailure {
  #[error("coordinates missing from the sensor response")]
  CoordinatesMissing,
  #[error("the sensor did not provide any location data")]
  NoLocationData,
}

impl GeoFailure {
  fn display_text(&self) -> &'static str {
    match self {
      Self::CoordinatesMissing => "Unable to get precise coordinates.",
      Self::NoLocationData => "Geolocation data not available.",
    }
  }
}

/// Per-session geolocation state.
///
/// `value` only changes on a successful detection, so a later failure keeps
/// the last detected position (or the sentinel if there never was one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeolocationAcquisition {
  status:       GeoStatus,
  display_text: String,
  value:        String,
  error:        Option<GeoFailure>,
}

impl Default for GeolocationAcquisition {
  fn default() -> Self {
    Self {
      status:       GeoStatus::Idle,
      display_text: DISPLAY_IDLE.to_owned(),
      value:        GEOLOCATION_SENTINEL.to_owned(),
      error:        None,
    }
  }
}

impl GeolocationAcquisition {
  pub fn status(&self) -> GeoStatus { self.status }

  pub fn display_text(&self) -> &str { &self.display_text }

  /// The string persisted into a new record.
  pub fn value(&self) -> &str { &self.value }

  pub fn error(&self) -> Option<GeoFailure> { self.error }

  pub fn is_pending(&self) -> bool { self.status == GeoStatus::Pending }

  /// Start a new acquisition. Fires the sensor exactly once.
  ///
  /// Rejected while a request is already pending.
  pub fn request_refresh<S: LocationSensor + ?Sized>(
    &mut self,
    sensor: &mut S,
  ) -> Result<()> {
    if self.status == GeoStatus::Pending {
      return Err(Error::GeoInvalidTransition {
        action: "refresh",
        status: self.status,
      });
    }
    debug!(from = %self.status, "geolocation refresh requested");
    self.status = GeoStatus::Pending;
    self.display_text = DISPLAY_PENDING.to_owned();
    self.error = None;
    sensor.request_once();
    Ok(())
  }

  /// Observe the sensor. `None` means the request has not resolved yet and
  /// leaves the state untouched.
  pub fn poll(&mut self, reading: Option<SensorReading>) -> Result<GeoStatus> {
    if self.status != GeoStatus::Pending {
      return Err(Error::GeoInvalidTransition {
        action: "poll",
        status: self.status,
      });
    }
    let Some(reading) = reading else {
      return Ok(self.status);
    };

    match reading.coords {
      Some(Coordinates {
        latitude: Some(lat),
        longitude: Some(lon),
      }) => {
        let rendered = format!("{lat:.6}, {lon:.6}");
        debug!(%rendered, "geolocation detected");
        self.status = GeoStatus::Detected;
        self.display_text = rendered.clone();
        self.value = rendered;
      }
      Some(_) => self.fail(GeoFailure::CoordinatesMissing),
      None => self.fail(GeoFailure::NoLocationData),
    }
    Ok(self.status)
  }

  fn fail(&mut self, failure: GeoFailure) {
    debug!(%failure, "geolocation failed");
    self.status = GeoStatus::Failed;
    self.display_text = failure.display_text().to_owned();
    self.error = Some(failure);
  }
}
