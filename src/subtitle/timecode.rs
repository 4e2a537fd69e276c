use crate::error::{Result, SeiyuError};

/// Convert an SRT timecode (`HH:MM:SS,mmm` or `HH:MM:SS.mmm`) to seconds.
///
/// The string must decompose into exactly three `:`-separated numeric
/// components. Sub-second precision is preserved.
pub fn parse_timecode(time_str: &str) -> Result<f64> {
    let normalized = time_str.trim().replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();

    if parts.len() != 3 {
        return Err(SeiyuError::Subtitle(format!(
            "Malformed timecode '{}': expected HH:MM:SS,mmm",
            time_str
        )));
    }

    let hours: i64 = parts[0]
        .parse()
        .map_err(|_| SeiyuError::Subtitle(format!("Malformed timecode '{}': bad hours", time_str)))?;
    let minutes: i64 = parts[1].parse().map_err(|_| {
        SeiyuError::Subtitle(format!("Malformed timecode '{}': bad minutes", time_str))
    })?;
    let seconds: f64 = parts[2].parse().map_err(|_| {
        SeiyuError::Subtitle(format!("Malformed timecode '{}': bad seconds", time_str))
    })?;

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

/// Format seconds as an SRT timecode (HH:MM:SS,mmm)
pub fn format_timecode(seconds: f64) -> String {
    let total_milliseconds = (seconds * 1000.0) as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}
