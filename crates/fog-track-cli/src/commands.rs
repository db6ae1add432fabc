//! Command execution
//!
//! Each command writes its result to the given writer, logs go to stderr.

use crate::settings::{Command, Corner, Settings};
use fog_track_lib::import::import_files;
use fog_track_lib::{
    BoundingBox, Config, MemoryStore, Polyline, SampleStore, SqliteStore, TrackError,
    TrackRecorder, Viewport, WebMercatorProjector, utils,
};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Track(#[from] TrackError),

    #[error("Expected exactly two --corner values, got {0}")]
    CornerCount(usize),

    #[error("Invalid speed limit: {0}")]
    InvalidSpeed(f64),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Rendered path handed to an external renderer
#[derive(Debug, Serialize)]
struct RenderOutput {
    bounds: BoundingBox,
    /// `[width, height]`, absent for geographic output
    #[serde(skip_serializing_if = "Option::is_none")]
    screen: Option<[u32; 2]>,
    /// Each polyline as `[x, y]` pairs
    polylines: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    store: &'static str,
    samples: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema_version: Option<i64>,
}

/// Open the store selected by the settings
fn open_store(settings: &Settings) -> Result<(Arc<dyn SampleStore>, Option<i64>)> {
    if settings.in_memory {
        tracing::debug!("Using in-memory store");
        return Ok((Arc::new(MemoryStore::new()), None));
    }

    let store = SqliteStore::open(&settings.db)?;
    let version = store.schema_version()?;
    tracing::debug!(
        "Opened {} (schema version {})",
        settings.db.display(),
        version
    );
    Ok((Arc::new(store), Some(version)))
}

fn viewport_from(corners: &[Corner]) -> Result<Viewport> {
    match corners {
        [a, b] => Ok(Viewport::from_lat_lon((a.lat, a.lon), (b.lat, b.lon))),
        _ => Err(CliError::CornerCount(corners.len())),
    }
}

fn to_pairs(polylines: &[Polyline]) -> Vec<Vec<[f64; 2]>> {
    polylines
        .iter()
        .map(|line| line.coords().map(|c| [c.x, c.y]).collect())
        .collect()
}

/// Run the parsed command
pub fn run(settings: &Settings, out: &mut impl Write) -> Result<()> {
    if !(settings.max_speed.is_finite() && settings.max_speed > 0.0) {
        return Err(CliError::InvalidSpeed(settings.max_speed));
    }
    let config = Config {
        max_speed_mps: settings.max_speed,
    };

    let (store, schema_version) = open_store(settings)?;
    let recorder = TrackRecorder::new(store, &config);

    match &settings.command {
        Command::Record {
            lat,
            lon,
            timestamp,
        } => {
            if !utils::is_valid_wgs84(*lat, *lon) {
                return Err(TrackError::InvalidCoordinate(format!("({lat}, {lon})")).into());
            }
            let id = match timestamp {
                Some(t) => recorder.record_at(*lat, *lon, *t)?,
                None => recorder.record(*lat, *lon)?,
            };
            tracing::info!("Recorded sample {}", id);
            writeln!(out, "{}", id.0)?;
        }

        Command::Import { files } => {
            let summary = import_files(recorder.store().as_ref(), files.as_slice())?;
            serde_json::to_writer_pretty(&mut *out, &summary)?;
            writeln!(out)?;
        }

        Command::Render {
            corners,
            width,
            height,
            geographic,
            imports,
        } => {
            let viewport = viewport_from(corners)?;
            if !imports.is_empty() {
                import_files(recorder.store().as_ref(), imports.as_slice())?;
            }

            let bounds = viewport.bounding_box();
            let (polylines, screen) = if *geographic {
                (recorder.visible_polylines(&viewport)?, None)
            } else {
                let projector =
                    WebMercatorProjector::new(&bounds, f64::from(*width), f64::from(*height));
                (
                    recorder.render(&viewport, &projector)?,
                    Some([*width, *height]),
                )
            };
            tracing::info!("Rendering {} polylines", polylines.len());

            let output = RenderOutput {
                bounds,
                screen,
                polylines: to_pairs(&polylines),
            };
            serde_json::to_writer(&mut *out, &output)?;
            writeln!(out)?;
        }

        Command::Info => {
            let output = InfoOutput {
                store: if settings.in_memory {
                    "memory"
                } else {
                    "sqlite"
                },
                samples: recorder.sample_count()?,
                schema_version,
            };
            serde_json::to_writer_pretty(&mut *out, &output)?;
            writeln!(out)?;
        }
    }

    Ok(())
}
