//! Virtual Thing implementations: lamp, thermostat, sensor.

mod lamp;
mod sensor;
mod thermostat;

pub use lamp::VirtualLamp;
pub use sensor::{Reading, SensorProbe, VirtualSensor, simulate};
pub use thermostat::{Mode, VirtualThermostat};
