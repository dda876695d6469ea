use crate::config::load_config;
use crate::ir::{Area, BuildOptions, Room, RoomId};
use crate::layout::BrokenConnections;
use crate::layout_dump::write_layout_dump;
use crate::render::build_svg;
use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use serde::Deserialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "amr", version, about = "Area map renderer for grid-placed MUD rooms")]
pub struct Args {
    /// Area file (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (png/svg). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "png")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, layout constants, fonts)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Label rooms with id and position
    #[arg(long = "debugInfo")]
    pub debug_info: bool,

    /// Color connections flagged by the validation pass
    #[arg(long = "colorizeIssues")]
    pub colorize_issues: bool,

    /// Room id to highlight (overrides the area file)
    #[arg(long = "selected")]
    pub selected: Option<RoomId>,

    /// Write room rectangles and column widths as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

/// Area document consumed by the CLI: the placed rooms plus whatever the
/// validation pass reported about them.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaFile {
    #[serde(default)]
    pub name: String,
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub broken_connections: BrokenConnections,
    #[serde(default)]
    pub selected_room_id: Option<RoomId>,
}

impl AreaFile {
    pub fn parse(contents: &str) -> Result<Self> {
        match serde_json::from_str(contents) {
            Ok(file) => Ok(file),
            Err(json_err) => json5::from_str(contents)
                .map_err(|_| anyhow::anyhow!("invalid area file: {json_err}")),
        }
    }

    pub fn into_parts(self) -> (Area, BrokenConnections, Option<RoomId>) {
        let area = Area {
            name: self.name,
            rooms: self.rooms,
        };
        (area, self.broken_connections, self.selected_room_id)
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;
    let (area, broken, selected) = AreaFile::parse(&input)?.into_parts();
    if args.colorize_issues && broken.is_empty() {
        tracing::warn!(area = %area.name, "issue colors requested but no broken connections listed");
    }
    let options = BuildOptions {
        add_debug_info: args.debug_info,
        colorize_connection_issues: args.colorize_issues,
        selected_room: args.selected.or(selected),
    };

    let result = match args.output_format {
        OutputFormat::Svg => build_svg(&area, &options, &broken, &config)?,
        OutputFormat::Png => build_png_output(&area, &options, &broken, &config)?,
    };
    tracing::info!(
        rooms = result.rooms.len(),
        width = result.size.width,
        height = result.size.height,
        "rendered area map"
    );

    match (args.output_format, args.output.as_deref()) {
        (_, Some(path)) => std::fs::write(path, &result.bytes)?,
        (OutputFormat::Svg, None) => io::stdout().write_all(&result.bytes)?,
        (OutputFormat::Png, None) => {
            return Err(anyhow::anyhow!("Output path required for png output"));
        }
    }

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &result, &area)?;
    }

    Ok(())
}

#[cfg(feature = "png")]
fn build_png_output<'a>(
    area: &'a Area,
    options: &BuildOptions,
    broken: &BrokenConnections,
    config: &crate::config::Config,
) -> Result<crate::render::ImageResult<'a>> {
    Ok(crate::render::build_png(area, options, broken, config)?)
}

#[cfg(not(feature = "png"))]
fn build_png_output<'a>(
    _area: &'a Area,
    _options: &BuildOptions,
    _broken: &BrokenConnections,
    _config: &crate::config::Config,
) -> Result<crate::render::ImageResult<'a>> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Direction;

    #[test]
    fn parses_area_file_with_issues() {
        let file = AreaFile::parse(
            r#"{
                "name": "Keep",
                "rooms": [
                    {"id": 1, "name": "Gate", "position": {"x": 0, "y": 0},
                     "connections": {"east": {"roomId": 2, "direction": "east", "kind": "forward"}}},
                    {"id": 2, "name": "Court", "position": {"x": 1, "y": 0}}
                ],
                "brokenConnections": {
                    "withObstacles": [{"sourceId": 1, "targetId": 2, "direction": "east"}]
                },
                "selectedRoomId": 2
            }"#,
        )
        .unwrap();
        let (area, broken, selected) = file.into_parts();
        assert_eq!(area.name, "Keep");
        assert_eq!(area.rooms.len(), 2);
        assert_eq!(broken.with_obstacles.len(), 1);
        assert_eq!(selected, Some(2));
        assert!(area.room(1).unwrap().connections.contains_key(&Direction::East));
    }

    #[test]
    fn accepts_json5_area_files() {
        let file = AreaFile::parse("{ rooms: [ { id: 1, name: 'Gate', }, ], }").unwrap();
        assert_eq!(file.rooms.len(), 1);
        assert!(file.rooms[0].position.is_none());
    }

    #[test]
    fn rejects_garbage() {
        assert!(AreaFile::parse("rooms = []").is_err());
    }
}
