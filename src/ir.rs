use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type RoomId = i32;

/// Exit direction of a room connection.
///
/// The set is closed: every mapping over it (docking points, deltas,
/// opposites) is an exhaustive `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// Unit step on the grid when leaving a room through this exit.
    pub fn delta(self) -> GridPos {
        match self {
            Self::North => GridPos::new(0, -1),
            Self::East => GridPos::new(1, 0),
            Self::South => GridPos::new(0, 1),
            Self::West => GridPos::new(-1, 0),
            Self::Up => GridPos::new(1, -1),
            Self::Down => GridPos::new(-1, 1),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::East | Self::West)
    }

}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, by: GridPos) -> Self {
        Self::new(self.x.saturating_add(by.x), self.y.saturating_add(by.y))
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionKind {
    /// Drawn with an arrowhead at the target.
    Forward,
    /// Mirror entry of a forward link; the paired forward side draws it.
    Backward,
    TwoWay,
}

/// Target of one exit. `direction` must match the key the connection is
/// stored under in [`Room::connections`]; builds reject a mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub room_id: RoomId,
    pub direction: Direction,
    pub kind: ConnectionKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    #[serde(default)]
    pub position: Option<GridPos>,
    #[serde(default)]
    pub connections: BTreeMap<Direction, Connection>,
    #[serde(default)]
    pub mark_color: Option<String>,
    #[serde(default)]
    pub is_exit_to_other_area: bool,
    /// Display-only hint pointing at a grid cell relative to this room.
    #[serde(default)]
    pub force_mark: Option<GridPos>,
}

impl Room {
    pub fn new(id: RoomId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            position: None,
            connections: BTreeMap::new(),
            mark_color: None,
            is_exit_to_other_area: false,
            force_mark: None,
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.position = Some(GridPos::new(x, y));
        self
    }

    pub fn connect(&mut self, direction: Direction, room_id: RoomId, kind: ConnectionKind) {
        self.connections.insert(
            direction,
            Connection {
                room_id,
                direction,
                kind,
            },
        );
    }

    pub fn debug_label(&self) -> String {
        match self.position {
            Some(pos) => format!("{} (#{}) at {}", self.name, self.id, pos),
            None => format!("{} (#{}) unplaced", self.name, self.id),
        }
    }

    pub fn label(&self, debug: bool) -> String {
        if debug {
            self.debug_label()
        } else {
            self.name.clone()
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug_label())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Area {
    pub name: String,
    pub rooms: Vec<Room>,
}

impl Area {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rooms: Vec::new(),
        }
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == id)
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|room| room.id == id)
    }

    pub fn add_room(&mut self, room: Room) {
        self.rooms.push(room);
    }

    /// Adds a bidirectional link: a forward entry on `from` and its backward
    /// mirror on `to`.
    pub fn link(&mut self, from: RoomId, direction: Direction, to: RoomId) {
        if let Some(room) = self.room_mut(from) {
            room.connect(direction, to, ConnectionKind::Forward);
        }
        if let Some(room) = self.room_mut(to) {
            room.connect(direction.opposite(), from, ConnectionKind::Backward);
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    /// Label rooms with their debug descriptor instead of the plain name.
    #[serde(default)]
    pub add_debug_info: bool,
    #[serde(default)]
    pub colorize_connection_issues: bool,
    #[serde(default)]
    pub selected_room: Option<RoomId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            let delta = direction.delta();
            let back = direction.opposite().delta();
            assert_eq!((delta.x + back.x, delta.y + back.y), (0, 0));
        }
    }

    #[test]
    fn link_adds_backward_mirror() {
        let mut area = Area::new("test");
        area.add_room(Room::new(1, "Hall").at(0, 0));
        area.add_room(Room::new(2, "Yard").at(1, 0));
        area.link(1, Direction::East, 2);
        let yard = area.room(2).unwrap();
        let mirror = yard.connections.get(&Direction::West).unwrap();
        assert_eq!(mirror.room_id, 1);
        assert_eq!(mirror.kind, ConnectionKind::Backward);
    }

    #[test]
    fn deserializes_room_with_defaults() {
        let room: Room = serde_json::from_str(
            r#"{"id": 7, "name": "Gate", "position": {"x": 2, "y": 3},
                "connections": {"north": {"roomId": 8, "direction": "north", "kind": "twoWay"}}}"#,
        )
        .unwrap();
        assert_eq!(room.position, Some(GridPos::new(2, 3)));
        assert!(!room.is_exit_to_other_area);
        assert_eq!(room.connections[&Direction::North].kind, ConnectionKind::TwoWay);
        assert_eq!(room.debug_label(), "Gate (#7) at 2,3");
    }
}
