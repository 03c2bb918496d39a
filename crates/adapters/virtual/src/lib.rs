//! # webthing-adapter-virtual
//!
//! Simulated Things for testing and demonstration.
//!
//! ## Provided Things
//!
//! | Thing | Name | Behaviour |
//! |-------|------|-----------|
//! | Virtual Lamp | `lamp` | `on`, `level`, `color`; `fade` and `toggle` actions; `overheated` event |
//! | Virtual Thermostat | `thermostat` | `target`, `current`, `mode`; timed `boost` action; `targetReached` signal |
//! | Virtual Sensor | `sensor` | read-only `temperature`, `humidity`, `serial`; `calibrate` action; periodic `reading` event |
//!
//! ## Dependency rule
//!
//! Depends on `webthing-app` (declaration API, runtime) and `webthing-domain` only.

mod things;

use std::time::Duration;

use webthing_app::context::ThingContext;
use webthing_app::runtime::Runtime;
use webthing_domain::error::WebThingError;

pub use things::{
    Mode, Reading, SensorProbe, VirtualLamp, VirtualSensor, VirtualThermostat, simulate,
};

/// Which virtual Things to register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualThings {
    pub lamp: bool,
    pub thermostat: bool,
    pub sensor: bool,
    /// Period of simulated sensor readings; `None` leaves the sensor idle.
    pub sensor_period: Option<Duration>,
}

impl Default for VirtualThings {
    fn default() -> Self {
        Self {
            lamp: true,
            thermostat: true,
            sensor: true,
            sensor_period: Some(Duration::from_secs(5)),
        }
    }
}

/// Register the selected Things on `runtime`.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns the first [`WebThingError::Registration`] encountered, e.g. when
/// a Thing with the same name is already registered.
pub fn register(
    runtime: &Runtime,
    selection: VirtualThings,
) -> Result<Vec<ThingContext>, WebThingError> {
    let mut registered = Vec::new();
    if selection.lamp {
        registered.push(runtime.register(VirtualLamp::default())?);
    }
    if selection.thermostat {
        registered.push(runtime.register(VirtualThermostat::default())?);
    }
    if selection.sensor {
        let sensor = VirtualSensor::default();
        let probe = sensor.probe();
        let context = runtime.register(sensor)?;
        if let Some(period) = selection.sensor_period {
            simulate(probe, context.emitter(), period);
        }
        registered.push(context);
    }
    tracing::info!(count = registered.len(), "virtual things registered");
    Ok(registered)
}
