//! Telemetry line decoding and parsing.
//!
//! The controller prints one line per sample: `"<ox_pos> <fuel_pos>"`.
//! Anything else is line noise and is dropped without an error.

/// Servo positions parsed from one device line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoReading {
    /// Oxidizer valve servo position.
    pub ox_pos: i32,
    /// Fuel valve servo position.
    pub fuel_pos: i32,
}

/// One accepted telemetry record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    /// Milliseconds since the first accepted sample of the connection.
    pub elapsed_ms: f64,
    /// Fuel valve servo position.
    pub fuel_pos: i32,
    /// Oxidizer valve servo position.
    pub ox_pos: i32,
}

impl TelemetrySample {
    /// Stamp a reading with its elapsed time.
    pub fn new(elapsed_ms: f64, reading: ServoReading) -> Self {
        Self {
            elapsed_ms,
            fuel_pos: reading.fuel_pos,
            ox_pos: reading.ox_pos,
        }
    }
}

/// Decode raw device bytes into trimmed text.
///
/// Invalid UTF-8 sequences are dropped rather than replaced, so a corrupted
/// byte between two tokens does not glue itself onto a number.
pub fn decode_line(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let cleaned: String = text.chars().filter(|&c| c != char::REPLACEMENT_CHARACTER).collect();
    cleaned.trim().to_string()
}

/// Parse a trimmed line into a servo reading.
///
/// The line must hold exactly two whitespace-separated integers, oxidizer
/// first. Returns `None` for any other shape.
pub fn parse_line(line: &str) -> Option<ServoReading> {
    let mut tokens = line.split_whitespace();
    let ox_pos = tokens.next()?.parse().ok()?;
    let fuel_pos = tokens.next()?.parse().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    Some(ServoReading { ox_pos, fuel_pos })
}
