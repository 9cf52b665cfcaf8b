//! Conversion between an hours/minutes pair and its `"Hh Mm"` text form.

use regex::Regex;
use std::sync::OnceLock;

/// A duration split into whole hours and minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoursMinutes {
    pub hours: u32,
    pub minutes: u32,
}

impl HoursMinutes {
    pub fn new(hours: u32, minutes: u32) -> Self {
        Self { hours, minutes }
    }

    pub fn total_minutes(&self) -> u64 {
        u64::from(self.hours) * 60 + u64::from(self.minutes)
    }

    /// Normalize a minute count into hours and remaining minutes.
    pub fn from_total_minutes(total: u64) -> Self {
        Self {
            hours: u32::try_from(total / 60).unwrap_or(u32::MAX),
            minutes: (total % 60) as u32,
        }
    }
}

pub fn format(hours: u32, minutes: u32) -> String {
    format!("{}h {}m", hours, minutes)
}

/// Parse `"2h 30m"`, `"2h"`, `"45m"` and the like.
///
/// Only a leading `<n>h` followed by an optional `<n>m` is recognized. Anything
/// missing or unparseable counts as zero, so this never fails.
pub fn parse(text: &str) -> HoursMinutes {
    static DURATION_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = DURATION_REGEX.get_or_init(|| {
        Regex::new(r"(?:(\d+)h)?\s*(?:(\d+)m)?").expect("Valid regex pattern")
    });

    let Some(caps) = regex.captures(text) else {
        return HoursMinutes::default();
    };
    let component = |idx: usize| {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0)
    };

    HoursMinutes {
        hours: component(1),
        minutes: component(2),
    }
}

/// Sum of the parsed durations, normalized so minutes stay below 60.
pub fn sum<'a>(texts: impl IntoIterator<Item = &'a str>) -> HoursMinutes {
    let total = texts
        .into_iter()
        .map(|text| parse(text).total_minutes())
        .sum();
    HoursMinutes::from_total_minutes(total)
}
