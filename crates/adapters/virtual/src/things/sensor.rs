//! Virtual climate sensor: read-only readings refreshed by a background
//! simulation that also emits a `reading` event.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use webthing_app::action_table::ActionInvocation;
use webthing_app::context::EventEmitter;
use webthing_app::thing::{Members, Thing};
use webthing_domain::error::ActionFault;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature: f64,
    pub humidity: f64,
}

/// Shared handle on the sensor's latest reading.
#[derive(Debug, Clone)]
pub struct SensorProbe {
    reading: Arc<Mutex<Reading>>,
}

impl SensorProbe {
    fn lock(&self) -> MutexGuard<'_, Reading> {
        self.reading.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn reading(&self) -> Reading {
        *self.lock()
    }

    pub fn record(&self, reading: Reading) {
        *self.lock() = reading;
    }
}

/// A simulated temperature and humidity sensor.
///
/// Its properties are read-only; values change only through the simulation
/// or the `calibrate` action.
pub struct VirtualSensor {
    name: String,
    serial: String,
    probe: SensorProbe,
}

impl Default for VirtualSensor {
    fn default() -> Self {
        Self::new("sensor")
    }
}

impl VirtualSensor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            serial: "VS-0001".to_string(),
            probe: SensorProbe {
                reading: Arc::new(Mutex::new(Reading {
                    temperature: 21.5,
                    humidity: 40.0,
                })),
            },
        }
    }

    #[must_use]
    pub fn probe(&self) -> SensorProbe {
        self.probe.clone()
    }
}

impl Thing for VirtualSensor {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn title(&self) -> Option<String> {
        Some("Virtual Sensor".to_string())
    }

    fn types(&self) -> Vec<String> {
        vec!["TemperatureSensor".to_string(), "MultiLevelSensor".to_string()]
    }

    fn declare(members: &mut Members<Self>) {
        members
            .property("temperature", |s: &Self| s.probe.reading().temperature)
            .title("Temperature")
            .semantic_type("TemperatureProperty")
            .unit("degree celsius");
        members
            .property("humidity", |s: &Self| s.probe.reading().humidity)
            .title("Humidity")
            .semantic_type("LevelProperty")
            .unit("percent")
            .minimum(0.0)
            .maximum(100.0);
        members
            .property("serial", |s: &Self| s.serial.clone())
            .title("Serial number");

        members
            .action("calibrate", calibrate)
            .title("Calibrate")
            .description("Shift the temperature reading by an offset")
            .param_with::<f64>("offset", |p| {
                p.minimum(-5.0).maximum(5.0).unit("degree celsius");
            });

        members
            .event::<f64>("reading")
            .description("A new temperature sample")
            .unit("degree celsius");
    }
}

async fn calibrate(invocation: ActionInvocation<VirtualSensor>) -> Result<(), ActionFault> {
    let offset: f64 = invocation.input.get("offset")?;
    let probe = invocation.thing.read(VirtualSensor::probe);
    let mut reading = probe.reading();
    reading.temperature += offset;
    probe.record(reading);
    invocation
        .thing
        .emit("reading", reading.temperature)
        .map_err(ActionFault::failed)
}

/// Drift the probe's reading every `period` and emit a `reading` event.
///
/// Runs until aborted. Must be called from within a Tokio runtime.
pub fn simulate(
    probe: SensorProbe,
    emitter: EventEmitter,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        let base = probe.reading();
        let mut step: u32 = 0;
        loop {
            ticker.tick().await;
            let reading = drift(base, step);
            probe.record(reading);
            if let Err(err) = emitter.emit("reading", reading.temperature) {
                tracing::warn!(%err, "could not emit sensor reading");
            }
            step = step.wrapping_add(1);
        }
    })
}

/// Triangle wave of ±0.5 °C and ±5 % around `base`, with a period of 20 steps.
fn drift(base: Reading, step: u32) -> Reading {
    let phase = f64::from(step % 20);
    let rising = if phase < 10.0 { phase } else { 20.0 - phase };
    let offset = rising - 5.0;
    Reading {
        temperature: base.temperature + offset / 10.0,
        humidity: (base.humidity + offset).clamp(0.0, 100.0),
    }
}
