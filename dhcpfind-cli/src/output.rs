//! Report rendering
//!
//! Each server gets one block: the time its OFFER arrived, the general
//! fields, then the decoded options prefixed with `option-`. Blocks are
//! separated by a blank line.

use chrono::{DateTime, TimeZone, Utc};
use dhcpfind_protocol::ServerResponse;
use std::fmt::Display;
use std::io::{self, Write};
use std::time::SystemTime;

/// ISO 8601 with microseconds and numeric zone offset
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%z";

pub fn format_timestamp<Tz>(time: SystemTime, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let utc: DateTime<Utc> = time.into();
    utc.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string()
}

/// Write one server's block
pub fn write_response<W, Tz>(out: &mut W, response: &ServerResponse, tz: &Tz) -> io::Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    writeln!(out, "time-received={}", format_timestamp(response.timestamp, tz))?;
    for field in &response.general {
        writeln!(out, "{}={}", field.key, field.value)?;
    }
    for field in &response.options {
        writeln!(out, "option-{}={}", field.key, field.value)?;
    }
    Ok(())
}

/// Write every block, in the order the servers answered
pub fn write_report<'a, W, Tz, I>(out: &mut W, responses: I, tz: &Tz) -> io::Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
    I: IntoIterator<Item = &'a ServerResponse>,
{
    for (i, response) in responses.into_iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        write_response(out, response, tz)?;
    }
    out.flush()
}
