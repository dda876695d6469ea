#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod surface;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config, parse_config};
pub use error::{RenderError, Result};
pub use ir::{Area, BuildOptions, Connection, ConnectionKind, Direction, GridPos, Room, RoomId};
pub use layout::{
    BrokenConnection, BrokenConnections, ClassificationPolicy, ConnectionIssue, GridMetrics,
    RoomInfo, RoomRect,
};
#[cfg(feature = "png")]
pub use render::build_png;
pub use render::{ImageResult, MapRenderer, build_svg};
pub use theme::Theme;
