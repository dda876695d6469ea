//! Pixel layout of a room grid: column metrics, connection routes,
//! per-build edge bookkeeping and issue classification.

mod classify;
mod dedupe;
mod grid;
mod routing;
mod types;

pub use classify::{
    BrokenConnection, BrokenConnectionLookup, BrokenConnections, ClassificationPolicy,
    ClassificationRule, ConnectionIssue,
};
pub use dedupe::DrawnConnections;
pub use grid::{GridMetrics, RoomGrid, connection_point};
pub use routing::{is_straight, path_radius, route_connection};
pub use types::{ImageSize, Point, RoomInfo, RoomRect};
