use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::error::{RenderError, Result};
use crate::ir::{Area, BuildOptions, Direction, GridPos, Room, RoomId};
use crate::text_metrics::TextMeasure;

use super::{ImageSize, Point, RoomRect};

/// Widest span, in cells, a placed area may cover on either axis.
pub const MAX_GRID_SPAN: i64 = 4096;

/// Placed rooms indexed by zero-based grid cell.
///
/// Solver positions may be arbitrary integers; the grid origin is the
/// top-left corner of their bounding rectangle. Unplaced rooms are left out.
#[derive(Debug)]
pub struct RoomGrid<'a> {
    origin: GridPos,
    columns: usize,
    rows: usize,
    cells: HashMap<GridPos, &'a Room>,
    by_id: HashMap<RoomId, &'a Room>,
}

impl<'a> RoomGrid<'a> {
    pub fn new(area: &'a Area) -> Result<Self> {
        let mut by_id = HashMap::new();
        for room in &area.rooms {
            if by_id.insert(room.id, room).is_some() {
                return Err(RenderError::DuplicateRoomId(room.id));
            }
            if let Some((&key, connection)) = room
                .connections
                .iter()
                .find(|(key, connection)| **key != connection.direction)
            {
                return Err(RenderError::MismatchedExit {
                    room: room.id,
                    key,
                    direction: connection.direction,
                });
            }
        }

        let placed: Vec<(&Room, GridPos)> = area
            .rooms
            .iter()
            .filter_map(|room| room.position.map(|pos| (room, pos)))
            .collect();
        let Some(min_x) = placed.iter().map(|(_, pos)| pos.x).min() else {
            return Ok(Self {
                origin: GridPos::default(),
                columns: 0,
                rows: 0,
                cells: HashMap::new(),
                by_id,
            });
        };
        let min_y = placed.iter().map(|(_, pos)| pos.y).min().unwrap_or(0);
        let max_x = placed.iter().map(|(_, pos)| pos.x).max().unwrap_or(min_x);
        let max_y = placed.iter().map(|(_, pos)| pos.y).max().unwrap_or(min_y);
        let columns = i64::from(max_x) - i64::from(min_x) + 1;
        let rows = i64::from(max_y) - i64::from(min_y) + 1;
        if columns > MAX_GRID_SPAN || rows > MAX_GRID_SPAN {
            return Err(RenderError::GridTooLarge { columns, rows });
        }
        let origin = GridPos::new(min_x, min_y);

        let mut cells: HashMap<GridPos, &'a Room> = HashMap::with_capacity(placed.len());
        for (room, pos) in placed {
            let cell = GridPos::new(pos.x - origin.x, pos.y - origin.y);
            if let Some(existing) = cells.insert(cell, room) {
                return Err(RenderError::OverlappingRooms {
                    first: existing.id,
                    second: room.id,
                    pos: cell,
                });
            }
        }

        Ok(Self {
            origin,
            columns: columns as usize,
            rows: rows as usize,
            cells,
            by_id,
        })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn room_at(&self, x: usize, y: usize) -> Option<&'a Room> {
        self.cells.get(&GridPos::new(x as i32, y as i32)).copied()
    }

    pub fn room_by_id(&self, id: RoomId) -> Option<&'a Room> {
        self.by_id.get(&id).copied()
    }

    /// Zero-based cell of a placed room, `None` for unplaced rooms.
    pub fn cell_of(&self, room: &Room) -> Option<GridPos> {
        room.position
            .map(|pos| GridPos::new(pos.x - self.origin.x, pos.y - self.origin.y))
    }

    /// Iterates occupied cells column-major, row-minor.
    pub fn iter_cells(&self) -> impl Iterator<Item = (GridPos, &'a Room)> + '_ {
        (0..self.columns).flat_map(move |x| {
            (0..self.rows).filter_map(move |y| {
                self.room_at(x, y)
                    .map(|room| (GridPos::new(x as i32, y as i32), room))
            })
        })
    }
}

/// Per-build pixel metrics of the room grid.
#[derive(Debug, Clone)]
pub struct GridMetrics {
    column_widths: Vec<i32>,
    rows: usize,
    room_height: i32,
    spacing: Point,
}

impl GridMetrics {
    /// Measure pass: each column is as wide as its widest padded label.
    pub fn measure(
        grid: &RoomGrid<'_>,
        measurer: &dyn TextMeasure,
        config: &LayoutConfig,
        options: &BuildOptions,
    ) -> Self {
        let mut column_widths = vec![0; grid.columns()];
        for (x, width) in column_widths.iter_mut().enumerate() {
            for y in 0..grid.rows() {
                let Some(room) = grid.room_at(x, y) else {
                    continue;
                };
                let label = room.label(options.add_debug_info);
                let size =
                    (measurer.measure(&label) + (config.text_padding * 2) as f32 + 0.5) as i32;
                if size > *width {
                    *width = size;
                }
            }
        }
        Self::from_widths(column_widths, grid.rows(), config)
    }

    pub fn from_widths(column_widths: Vec<i32>, rows: usize, config: &LayoutConfig) -> Self {
        Self {
            column_widths,
            rows,
            room_height: config.room_height,
            spacing: Point::new(config.room_spacing_x, config.room_spacing_y),
        }
    }

    pub fn column_widths(&self) -> &[i32] {
        &self.column_widths
    }

    pub fn column_width(&self, x: i32) -> Option<i32> {
        usize::try_from(x)
            .ok()
            .and_then(|x| self.column_widths.get(x))
            .copied()
    }

    pub fn room_height(&self) -> i32 {
        self.room_height
    }

    pub fn spacing(&self) -> Point {
        self.spacing
    }

    pub fn image_size(&self) -> ImageSize {
        let columns = self.column_widths.len() as i32;
        let rows = self.rows as i32;
        let width = self.column_widths.iter().sum::<i32>() + (columns + 1) * self.spacing.x;
        let height = rows * self.room_height + (rows + 1) * self.spacing.y;
        ImageSize {
            width: width.max(0) as u32,
            height: height.max(0) as u32,
        }
    }

    /// Top-left pixel of a grid cell. Columns past the right edge clamp to
    /// the last column; columns left of the grid start at the first.
    pub fn to_screen(&self, pos: GridPos) -> Point {
        let last = self.column_widths.len() as i32 - 1;
        let column = pos.x.min(last).max(0) as usize;
        let mut screen_x = self.spacing.x;
        for width in &self.column_widths[..column.min(self.column_widths.len())] {
            screen_x += width + self.spacing.x;
        }
        let screen_y = pos
            .y
            .saturating_mul(self.room_height)
            .saturating_add(pos.y.saturating_add(1).saturating_mul(self.spacing.y));
        Point::new(screen_x, screen_y)
    }

    pub fn room_rect(&self, pos: GridPos) -> RoomRect {
        let screen = self.to_screen(pos);
        let last = self.column_widths.len() as i32 - 1;
        RoomRect {
            x: screen.x,
            y: screen.y,
            width: self.column_width(pos.x.min(last)).unwrap_or(0),
            height: self.room_height,
        }
    }
}

/// Docking point of an exit on the boundary of a room rectangle.
pub fn connection_point(rect: &RoomRect, direction: Direction) -> Point {
    match direction {
        Direction::North => Point::new(rect.x + rect.width / 2, rect.y),
        Direction::East => Point::new(rect.right(), rect.y + rect.height / 2),
        Direction::South => Point::new(rect.x + rect.width / 2, rect.bottom()),
        Direction::West => Point::new(rect.x, rect.y + rect.height / 2),
        Direction::Up => Point::new(rect.right(), rect.y),
        Direction::Down => Point::new(rect.x, rect.bottom()),
    }
}
