//! Virtual lamp: on/off, brightness and colour, with a `fade` action.

use std::time::Duration;

use webthing_app::action_table::ActionInvocation;
use webthing_app::thing::{Members, Thing};
use webthing_domain::error::ActionFault;

const FADE_STEPS: u32 = 10;

/// A simulated dimmable lamp.
pub struct VirtualLamp {
    name: String,
    on: bool,
    level: u8,
    color: String,
}

impl Default for VirtualLamp {
    fn default() -> Self {
        Self::new("lamp")
    }
}

impl VirtualLamp {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on: false,
            level: 50,
            color: "#ffffff".to_string(),
        }
    }
}

impl Thing for VirtualLamp {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn title(&self) -> Option<String> {
        Some("Virtual Lamp".to_string())
    }

    fn description(&self) -> Option<String> {
        Some("A dimmable colour lamp".to_string())
    }

    fn types(&self) -> Vec<String> {
        vec!["OnOffSwitch".to_string(), "Light".to_string()]
    }

    fn declare(members: &mut Members<Self>) {
        members
            .property_rw("on", |l: &Self| l.on, |l, v| l.on = v)
            .title("On/Off")
            .semantic_type("OnOffProperty");
        members
            .property_rw("level", |l: &Self| l.level, |l, v| l.level = v)
            .title("Brightness")
            .semantic_type("BrightnessProperty")
            .unit("percent")
            .minimum(0)
            .maximum(100);
        members
            .property_rw("color", |l: &Self| l.color.clone(), |l, v| l.color = v)
            .title("Colour")
            .semantic_type("ColorProperty")
            .pattern("^#[0-9a-fA-F]{6}$");

        members
            .action("fade", fade)
            .title("Fade")
            .description("Fade the lamp to a given level")
            .param_with::<u8>("level", |p| {
                p.minimum(0).maximum(100).unit("percent");
            })
            .param_with::<u32>("duration", |p| {
                p.minimum(1).unit("milliseconds");
            })
            .inject_cancellation();
        members
            .action("toggle", toggle)
            .title("Toggle")
            .semantic_type("ToggleAction");

        members
            .event::<f64>("overheated")
            .description("The lamp has exceeded its safe operating temperature")
            .unit("degree celsius")
            .semantic_type("OverheatedEvent");
    }
}

async fn fade(invocation: ActionInvocation<VirtualLamp>) -> Result<(), ActionFault> {
    let target: u8 = invocation.input.get("level")?;
    let duration: u32 = invocation.input.get("duration")?;
    let start = invocation.thing.read(|lamp| lamp.level);
    let pause = Duration::from_millis(u64::from(duration / FADE_STEPS));

    for step in 1..=FADE_STEPS {
        invocation.sleep(pause).await?;
        invocation
            .thing
            .set_property("level", interpolate(start, target, step))
            .map_err(ActionFault::failed)?;
    }
    Ok(())
}

async fn toggle(invocation: ActionInvocation<VirtualLamp>) -> Result<(), ActionFault> {
    let on = invocation.thing.read(|lamp| lamp.on);
    invocation
        .thing
        .set_property("on", !on)
        .map_err(ActionFault::failed)?;
    Ok(())
}

fn interpolate(from: u8, to: u8, step: u32) -> u8 {
    let from = i64::from(from);
    let to_wide = i64::from(to);
    let value = from + (to_wide - from) * i64::from(step) / i64::from(FADE_STEPS);
    u8::try_from(value).unwrap_or(to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_interpolate_linearly_towards_target() {
        assert_eq!(interpolate(0, 100, 1), 10);
        assert_eq!(interpolate(0, 100, FADE_STEPS), 100);
        assert_eq!(interpolate(80, 30, 5), 55);
    }

    #[test]
    fn should_default_to_off_at_half_brightness() {
        let lamp = VirtualLamp::default();
        assert_eq!(lamp.name(), "lamp");
        assert!(!lamp.on);
        assert_eq!(lamp.level, 50);
    }
}
