//! Selectable values for the client, SOW and time columns.

use std::ops::RangeInclusive;

pub const CLIENT_OPTIONS: [&str; 3] = ["Client A", "Client B", "Client C"];

pub const DEFAULT_SOWS: [&str; 3] = ["SOW-001", "SOW-002", "SOW-003"];

const CLIENT_A_SOWS: [&str; 3] = ["SOW-A-001", "SOW-A-002", "SOW-A-003"];
const CLIENT_B_SOWS: [&str; 3] = ["SOW-B-101", "SOW-B-102", "SOW-B-103"];
const CLIENT_C_SOWS: [&str; 3] = ["SOW-C-201", "SOW-C-202", "SOW-C-203"];

pub const HOUR_OPTIONS: RangeInclusive<u32> = 0..=12;

pub const MINUTE_OPTIONS: [u32; 4] = [0, 15, 30, 45];

pub fn is_known_client(client: &str) -> bool {
    CLIENT_OPTIONS.contains(&client)
}

/// SOW numbers offered for `client`. Unset or unknown clients get the default set.
pub fn sow_options(client: &str) -> &'static [&'static str] {
    match client {
        "Client A" => &CLIENT_A_SOWS,
        "Client B" => &CLIENT_B_SOWS,
        "Client C" => &CLIENT_C_SOWS,
        _ => &DEFAULT_SOWS,
    }
}
