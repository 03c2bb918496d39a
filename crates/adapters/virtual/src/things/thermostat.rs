//! Virtual thermostat: target temperature, heating mode and a timed boost.

use std::time::Duration;

use webthing_app::action_table::ActionInvocation;
use webthing_app::thing::{Members, Thing};
use webthing_domain::error::ActionFault;

webthing_domain::thing_enum! {
    /// Heating programme.
    pub enum Mode { Eco, Comfort, Boost }
}

/// A simulated room thermostat.
pub struct VirtualThermostat {
    name: String,
    target: f64,
    current: f64,
    mode: Mode,
    boost_minute: Duration,
}

impl Default for VirtualThermostat {
    fn default() -> Self {
        Self::new("thermostat")
    }
}

impl VirtualThermostat {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: 20.0,
            current: 19.5,
            mode: Mode::Comfort,
            boost_minute: Duration::from_secs(60),
        }
    }

    /// Shorten how long one boost minute lasts; used by demos and tests.
    #[must_use]
    pub fn with_boost_minute(mut self, minute: Duration) -> Self {
        self.boost_minute = minute;
        self
    }
}

impl Thing for VirtualThermostat {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn title(&self) -> Option<String> {
        Some("Virtual Thermostat".to_string())
    }

    fn types(&self) -> Vec<String> {
        vec!["Thermostat".to_string()]
    }

    fn declare(members: &mut Members<Self>) {
        members
            .property_rw("target", |t: &Self| t.target, |t, v| t.target = v)
            .title("Target temperature")
            .semantic_type("TargetTemperatureProperty")
            .unit("degree celsius")
            .minimum(5.0)
            .maximum(30.0)
            .multiple_of(0.5);
        members
            .property("current", |t: &Self| t.current)
            .title("Current temperature")
            .semantic_type("TemperatureProperty")
            .unit("degree celsius");
        members
            .property_rw("mode", |t: &Self| t.mode, |t, v| t.mode = v)
            .title("Mode")
            .semantic_type("HeatingCoolingProperty");
        // Internal timing, not part of the Thing.
        members
            .property("boostMinute", |t: &Self| t.boost_minute.as_millis().to_string())
            .ignore();

        members
            .action("boost", boost)
            .title("Boost")
            .description("Heat at full power for a while, then resume the previous mode")
            .param_with::<u16>("minutes", |p| {
                p.minimum(1).maximum(120).unit("minute");
            })
            .inject_cancellation();

        members
            .signal("targetReached")
            .description("The room reached the target temperature");
    }
}

async fn boost(invocation: ActionInvocation<VirtualThermostat>) -> Result<(), ActionFault> {
    let minutes: u16 = invocation.input.get("minutes")?;
    let (previous, minute) = invocation
        .thing
        .read(|thermostat| (thermostat.mode, thermostat.boost_minute));

    invocation
        .thing
        .set_property("mode", Mode::Boost)
        .map_err(ActionFault::failed)?;
    let outcome = invocation.sleep(minute * u32::from(minutes)).await;
    invocation
        .thing
        .set_property("mode", previous)
        .map_err(ActionFault::failed)?;
    outcome
}
