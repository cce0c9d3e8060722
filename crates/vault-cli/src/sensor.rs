//! [`IpLocationSensor`]: approximate position from an IP geolocation service.
//!
//! `request_once` spawns the lookup on the runtime; `poll` picks the answer up
//! on a later tick without blocking.

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, warn};
use vault_core::geo::{Coordinates, LocationSensor, SensorReading};

pub struct IpLocationSensor {
  client:  Client,
  url:     String,
  pending: Option<oneshot::Receiver<SensorReading>>,
}

/// The fields we read from the lookup response. `ip-api.com` reports a
/// failed lookup as `{"status":"fail", …}` without coordinates.
#[derive(Deserialize)]
struct LookupResponse {
  lat: Option<f64>,
  lon: Option<f64>,
}

impl IpLocationSensor {
  pub fn new(client: Client, url: impl Into<String>) -> Self {
    Self {
      client,
      url: url.into(),
      pending: None,
    }
  }

  async fn lookup(client: Client, url: String) -> SensorReading {
    let resp = match client.get(&url).send().await {
      Ok(resp) => resp,
      Err(e) => {
        warn!(error = %e, "location lookup failed");
        return SensorReading::default();
      }
    };
    match resp.text().await {
      Ok(body) => reading_from_body(&body),
      Err(e) => {
        warn!(error = %e, "location lookup body unreadable");
        SensorReading::default()
      }
    }
  }
}

/// A body that is not a JSON object yields no location data at all; an object
/// without `lat`/`lon` yields a coordinate object with missing fields.
fn reading_from_body(body: &str) -> SensorReading {
  match serde_json::from_str::<LookupResponse>(body) {
    Ok(LookupResponse { lat, lon }) => SensorReading {
      coords: Some(Coordinates {
        latitude:  lat,
        longitude: lon,
      }),
    },
    Err(e) => {
      warn!(error = %e, "location lookup returned no data");
      SensorReading::default()
    }
  }
}

impl LocationSensor for IpLocationSensor {
  fn request_once(&mut self) {
    let (tx, rx) = oneshot::channel();
    let client = self.client.clone();
    let url = self.url.clone();
    tokio::spawn(async move {
      let reading = Self::lookup(client, url).await;
      // The receiver is gone if a newer request replaced it.
      let _ = tx.send(reading);
    });
    debug!(url = %self.url, "location lookup started");
    self.pending = Some(rx);
  }

  fn poll(&mut self) -> Option<SensorReading> {
    let rx = self.pending.as_mut()?;
    match rx.try_recv() {
      Ok(reading) => {
        self.pending = None;
        Some(reading)
      }
      Err(TryRecvError::Empty) => None,
      Err(TryRecvError::Closed) => {
        self.pending = None;
        Some(SensorReading::default())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;

  #[test]
  fn body_with_coordinates() {
    let reading = reading_from_body(r#"{"status":"success","lat":12.9716,"lon":77.5946}"#);
    assert_eq!(reading, SensorReading::at(12.9716, 77.5946));
  }

  #[test]
  fn failed_lookup_has_missing_coordinates() {
    let reading = reading_from_body(r#"{"status":"fail","message":"private range"}"#);
    assert_eq!(reading.coords, Some(Coordinates::default()));
  }

  #[test]
  fn garbage_body_has_no_location_data() {
    assert_eq!(reading_from_body("<html>"), SensorReading::default());
  }

  #[test]
  fn poll_without_request_is_none() {
    let mut sensor = IpLocationSensor::new(Client::new(), "http://localhost");
    assert_eq!(sensor.poll(), None);
  }

  #[tokio::test]
  async fn unreachable_service_resolves_to_no_data() {
    let mut sensor = IpLocationSensor::new(Client::new(), "not a url");
    sensor.request_once();

    let mut reading = None;
    for _ in 0..100 {
      reading = sensor.poll();
      if reading.is_some() {
        break;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(reading, Some(SensorReading::default()));
    assert_eq!(sensor.poll(), None);
  }
}
