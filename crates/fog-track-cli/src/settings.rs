use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Fog Track - Record positions and show the plausible travelled paths inside a viewport
pub struct Settings {
    /// SQLite database holding the recorded samples
    #[clap(
        long,
        global = true,
        env = "FOG_TRACK_DB",
        default_value = "fog-track.db",
        value_name = "FILE"
    )]
    pub db: PathBuf,

    /// Fastest plausible travel speed in meters per second
    #[clap(long, global = true, default_value = "31.0")]
    pub max_speed: f64,

    /// Keep samples in memory only, leaving the database untouched
    #[clap(long, global = true)]
    pub in_memory: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Record one position
    Record {
        /// Latitude in degrees
        #[clap(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees
        #[clap(long, allow_negative_numbers = true)]
        lon: f64,

        /// Unix time in milliseconds (defaults to now)
        #[clap(long)]
        timestamp: Option<i64>,
    },

    /// Replay the timed track points of GPX files as recorded positions
    Import {
        /// GPX files, inserted in the given order
        #[clap(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },

    /// Print the visible path of a viewport as JSON polylines
    Render {
        /// Viewport corner, given twice (any two opposite corners)
        #[clap(long = "corner", required = true, value_name = "LAT,LON", allow_hyphen_values = true)]
        corners: Vec<Corner>,

        /// Screen width in pixels
        #[clap(long, default_value = "1920")]
        width: u32,

        /// Screen height in pixels
        #[clap(long, default_value = "1080")]
        height: u32,

        /// Emit longitude/latitude pairs instead of pixel coordinates
        #[clap(long)]
        geographic: bool,

        /// GPX files to import before rendering
        #[clap(long = "import", value_name = "FILE")]
        imports: Vec<PathBuf>,
    },

    /// Show store statistics
    Info,
}

impl Settings {
    /// Parse the command line, exiting with usage on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(settings) => settings,
            Err(e) => e.exit(),
        }
    }
}

/// A `LAT,LON` pair given on the command line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CornerParseError {
    #[error("expected LAT,LON, got '{0}'")]
    Format(String),

    #[error("invalid number '{0}'")]
    Number(String),
}

impl FromStr for Corner {
    type Err = CornerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| CornerParseError::Format(s.to_string()))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| CornerParseError::Number(part.trim().to_string()))
        };
        Ok(Corner {
            lat: parse(lat)?,
            lon: parse(lon)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_corner() {
        assert_eq!(
            "51.5,-0.12".parse::<Corner>(),
            Ok(Corner {
                lat: 51.5,
                lon: -0.12
            })
        );
        assert_eq!(
            " -33.9 , 151.2 ".parse::<Corner>(),
            Ok(Corner {
                lat: -33.9,
                lon: 151.2
            })
        );
    }

    #[test]
    fn test_parse_corner_errors() {
        assert_eq!(
            "51.5".parse::<Corner>(),
            Err(CornerParseError::Format("51.5".to_string()))
        );
        assert_eq!(
            "north,-0.12".parse::<Corner>(),
            Err(CornerParseError::Number("north".to_string()))
        );
    }

    #[test]
    fn test_render_command_line() {
        let settings = Settings::try_parse_from([
            "fog-track",
            "--in-memory",
            "render",
            "--corner",
            "51.52,-0.15",
            "--corner",
            "-51.50,-0.10",
            "--geographic",
        ])
        .unwrap();

        assert!(settings.in_memory);
        assert_eq!(settings.max_speed, 31.0);
        let Command::Render {
            corners,
            width,
            geographic,
            ..
        } = settings.command
        else {
            panic!("expected render");
        };
        assert_eq!(corners.len(), 2);
        assert_eq!(corners[1].lat, -51.50);
        assert_eq!(width, 1920);
        assert!(geographic);
    }

    #[test]
    fn test_record_negative_coordinates() {
        let settings = Settings::try_parse_from([
            "fog-track", "record", "--lat", "-33.86", "--lon", "151.21",
        ])
        .unwrap();
        assert!(matches!(
            settings.command,
            Command::Record {
                timestamp: None,
                ..
            }
        ));
    }

    #[test]
    fn test_import_requires_files() {
        assert!(Settings::try_parse_from(["fog-track", "import"]).is_err());
    }
}
