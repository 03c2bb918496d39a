//! Duration wire format: `[-][d.]hh:mm:ss[.fffffff]`.

use chrono::TimeDelta;

const SECONDS_PER_DAY: i64 = 86_400;

/// Parse the constant duration format. Returns `None` on any malformed input.
#[must_use]
pub fn parse_duration(text: &str) -> Option<TimeDelta> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let (head, _) = rest.split_once(':')?;
    let (days, clock) = match head.split_once('.') {
        Some((days, _)) => (parse_digits(days)?, &rest[days.len() + 1..]),
        None => (0, rest),
    };

    let (hms, fraction) = match clock.split_once('.') {
        Some((hms, fraction)) => (hms, Some(fraction)),
        None => (clock, None),
    };

    let mut parts = hms.split(':');
    let hours = parse_component(parts.next()?, 23)?;
    let minutes = parse_component(parts.next()?, 59)?;
    let seconds = parse_component(parts.next()?, 59)?;
    if parts.next().is_some() {
        return None;
    }

    let nanos = match fraction {
        Some(fraction) => parse_fraction(fraction)?,
        None => 0,
    };

    let total = days
        .checked_mul(SECONDS_PER_DAY)?
        .checked_add(hours * 3_600 + minutes * 60 + seconds)?;
    let delta = TimeDelta::new(total, nanos)?;
    Some(if negative { -delta } else { delta })
}

/// Render a duration in the constant format, omitting zero days and fraction.
#[must_use]
pub fn format_duration(delta: &TimeDelta) -> String {
    let sign = if *delta < TimeDelta::zero() { "-" } else { "" };
    let abs = delta.abs();
    let total = abs.num_seconds();

    let days = total / SECONDS_PER_DAY;
    let hours = (total % SECONDS_PER_DAY) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    let ticks = abs.subsec_nanos() / 100;

    let days = if days > 0 {
        format!("{days}.")
    } else {
        String::new()
    };
    let fraction = if ticks > 0 {
        format!(".{ticks:07}")
    } else {
        String::new()
    };
    format!("{sign}{days}{hours:02}:{minutes:02}:{seconds:02}{fraction}")
}

fn parse_digits(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_component(text: &str, max: i64) -> Option<i64> {
    if text.len() > 2 {
        return None;
    }
    parse_digits(text).filter(|value| *value <= max)
}

fn parse_fraction(text: &str) -> Option<u32> {
    if text.is_empty() || text.len() > 7 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    format!("{text:0<9}").parse().ok()
}
