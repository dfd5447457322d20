//! CSV and JSON reading/writing for state sequences.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use nalgebra::DVector;
use plover_core::{State, StateSequence, TimestampedState, Track};
use std::path::Path;

/// A track read from disk, with the component column names it was stored
/// under.
pub struct LoadedTrack {
    pub track: Track<State>,
    pub components: Vec<String>,
}

pub fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw.trim())
        .with_context(|| format!("invalid RFC 3339 timestamp {:?}", raw))?;
    Ok(parsed.with_timezone(&Utc))
}

pub fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Reads `timestamp,<component>...` rows into a track named after the file.
pub fn read_track_csv(path: &Path) -> Result<LoadedTrack> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = rdr.headers()?.clone();
    if headers.len() < 2 {
        bail!(
            "{}: expected a timestamp column followed by at least one component",
            path.display()
        );
    }
    let components: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "track".to_string());
    let mut track = Track::new(id);

    for (row, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("bad CSV row {}", row + 1))?;
        let timestamp = parse_time(&record[0]).with_context(|| format!("row {}", row + 1))?;
        let values = record
            .iter()
            .skip(1)
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .with_context(|| format!("row {}: invalid number {:?}", row + 1, v))
            })
            .collect::<Result<Vec<f64>>>()?;
        track.push(State::new(timestamp, DVector::from_vec(values)));
    }

    Ok(LoadedTrack { track, components })
}

/// Writes one row per state: the timestamp then each vector component.
pub fn write_states_csv<Q: StateSequence>(
    path: &Path,
    sequence: &Q,
    components: &[String],
) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut header = vec!["timestamp".to_string()];
    header.extend(components.iter().cloned());
    wtr.write_record(&header)?;

    for state in sequence.states() {
        let mut row = vec![format_time(state.timestamp())];
        row.extend(state.state_vector().iter().map(|v| format!("{:.6}", v)));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn states_to_json<Q: StateSequence>(
    id: &str,
    sequence: &Q,
    discarded: &[DateTime<Utc>],
) -> serde_json::Value {
    let states: Vec<serde_json::Value> = sequence
        .states()
        .iter()
        .map(|s| {
            serde_json::json!({
                "timestamp": format_time(s.timestamp()),
                "state_vector": s.state_vector().as_slice(),
            })
        })
        .collect();

    serde_json::json!({
        "id": id,
        "discarded": discarded.iter().map(|t| format_time(*t)).collect::<Vec<_>>(),
        "states": states,
    })
}

/// Default component names for a `ndim`-dimensional vector.
pub fn component_names(ndim: usize) -> Vec<String> {
    (0..ndim).map(|i| format!("x{}", i)).collect()
}
