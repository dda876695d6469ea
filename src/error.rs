use thiserror::Error;

use crate::ir::{Direction, GridPos, RoomId};

/// Result type for map builds.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors surfaced while building an area image.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("rooms #{first} and #{second} both occupy grid cell ({pos})")]
    OverlappingRooms {
        first: RoomId,
        second: RoomId,
        pos: GridPos,
    },
    #[error("placed rooms span {columns}x{rows} cells, more than the grid allows")]
    GridTooLarge { columns: i64, rows: i64 },
    #[error("room #{room} stores a {direction:?} exit under the {key:?} key")]
    MismatchedExit {
        room: RoomId,
        key: Direction,
        direction: Direction,
    },
    #[error("room id #{0} is used by more than one room")]
    DuplicateRoomId(RoomId),
    #[error("failed to allocate {width}x{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },
    #[error("failed to parse generated SVG: {0}")]
    Svg(String),
    #[error("failed to encode image: {0}")]
    Encode(String),
}
