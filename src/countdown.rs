use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::NowReader;

const SECONDS_PER_DAY: i64 = 86_400;

/// A named moment to count down to, in epoch seconds.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Countdown {
    pub label: String,
    pub target: i64,
}

impl Countdown {
    pub fn new(label: impl Into<String>, target: i64) -> Self {
        Self {
            label: label.into(),
            target,
        }
    }

    /// Seconds left at `now`, never negative.
    pub fn remaining(&self, now: i64) -> i64 {
        self.target.saturating_sub(now).max(0)
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.target
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (@{})", self.label, self.target)
    }
}

/// Format a non-negative number of seconds as `HH:MM:SS`, prefixed with a day
/// count when `show_days` is set and at least a full day remains.
pub fn format_remaining(seconds: i64, show_days: bool) -> String {
    let seconds = seconds.max(0);

    let (days, rest) = if show_days {
        (seconds / SECONDS_PER_DAY, seconds % SECONDS_PER_DAY)
    } else {
        (0, seconds)
    };
    let hours = rest / 3600;
    let minutes = (rest % 3600) / 60;
    let secs = rest % 60;

    if days > 0 {
        format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    }
}

/// Parse a `LABEL=EPOCH_SECONDS` command-line value.
pub fn parse_countdown_arg(value: &str) -> Result<Countdown> {
    let (label, target) = value
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("Expected LABEL=EPOCH_SECONDS, got '{}'", value))?;

    let label = label.trim();
    if label.is_empty() {
        return Err(anyhow!("Countdown label must not be empty"));
    }

    let target = target
        .trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid epoch seconds in '{}'", value))?;

    Ok(Countdown::new(label, target))
}

/// One on-screen countdown. It reads the shared timestamp and never owns a
/// timer of its own.
#[derive(Debug, Clone)]
pub struct CountdownDisplay {
    pub countdown: Countdown,
    now: NowReader,
}

impl CountdownDisplay {
    pub fn new(countdown: Countdown, now: NowReader) -> Self {
        Self { countdown, now }
    }

    pub fn remaining(&self) -> i64 {
        self.countdown.remaining(self.now.get())
    }

    pub fn is_expired(&self) -> bool {
        self.countdown.is_expired(self.now.get())
    }

    pub fn render_text(&self, show_days: bool, expired_text: &str) -> String {
        if self.is_expired() {
            expired_text.to_string()
        } else {
            format_remaining(self.remaining(), show_days)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::ClockStore;

    #[test]
    fn test_remaining_and_expiry() {
        let countdown = Countdown::new("Launch", 1_000);

        assert_eq!(countdown.remaining(900), 100);
        assert!(!countdown.is_expired(999));

        assert_eq!(countdown.remaining(1_000), 0);
        assert!(countdown.is_expired(1_000));

        // Past the target stays at zero
        assert_eq!(countdown.remaining(5_000), 0);
    }

    #[test]
    fn test_countdown_display() {
        let countdown = Countdown::new("Launch", 1_700_003_600);
        assert_eq!(format!("{}", countdown), "Launch (@1700003600)");
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(0, true), "00:00:00");
        assert_eq!(format_remaining(59, true), "00:00:59");
        assert_eq!(format_remaining(3_661, true), "01:01:01");
        assert_eq!(format_remaining(86_399, true), "23:59:59");
        assert_eq!(format_remaining(86_400 + 3_723, true), "1d 01:02:03");
        assert_eq!(format_remaining(86_400 + 3_723, false), "25:02:03");
        assert_eq!(format_remaining(-5, true), "00:00:00");
    }

    #[test]
    fn test_parse_countdown_arg() -> Result<()> {
        let countdown = parse_countdown_arg("Release=1700003600")?;
        assert_eq!(countdown, Countdown::new("Release", 1_700_003_600));

        // Label may itself contain '='
        let countdown = parse_countdown_arg("a=b=42")?;
        assert_eq!(countdown, Countdown::new("a=b", 42));

        assert!(parse_countdown_arg("no-separator").is_err());
        assert!(parse_countdown_arg("=123").is_err());
        assert!(parse_countdown_arg("Label=soon").is_err());
        Ok(())
    }

    #[test]
    fn test_displays_share_one_clock() {
        let clock = ManualClock::new(1_000_000);
        let mut store = ClockStore::new(clock.clone()).unwrap();

        let short = CountdownDisplay::new(Countdown::new("short", 1_002), store.reader());
        let long = CountdownDisplay::new(Countdown::new("long", 1_060), store.reader());
        assert_eq!(short.remaining(), 2);
        assert_eq!(long.remaining(), 60);

        clock.advance_millis(2_000);
        store.refresh_now().unwrap();

        assert!(short.is_expired());
        assert_eq!(short.render_text(true, "done"), "done");
        assert_eq!(long.render_text(true, "done"), "00:00:58");
    }
}
