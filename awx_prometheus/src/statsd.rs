//! StatsD line protocol
//!
//! Samples are always reported as gauges, with their dimensions as DogStatsD style tags:
//! `<prefix><name>:<value>|g|#<key>:<value>,<key>:<value>`.

use std::fmt::Write;

use crate::parser::Sample;

/// Prefix applied to every metric name unless configured otherwise
pub const DEFAULT_PREFIX: &str = "statsd.";

/// Formats a sample as a StatsD gauge line (without a trailing newline).
pub fn gauge_line(prefix: &str, sample: &Sample) -> String {
    let mut line = String::with_capacity(prefix.len() + sample.name.len() + 16);
    line.push_str(prefix);
    line.push_str(sample.name);
    // Writing into a `String` can't fail
    let _ = write!(line, ":{}|g", sample.value.truncated());
    for (i, (key, value)) in sample.dimensions.iter().enumerate() {
        line.push_str(if i == 0 { "|#" } else { "," });
        line.push_str(key);
        line.push(':');
        line.push_str(value);
    }
    line
}
