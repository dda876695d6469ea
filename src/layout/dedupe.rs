use std::collections::{HashMap, HashSet};

use crate::ir::{Direction, GridPos, RoomId};

/// Edges rendered so far in one build, keyed by the room that drew them.
///
/// A bidirectional link is stored on one side only; the check looks at both
/// ends so the mirror entry on the other room is skipped.
#[derive(Debug, Default)]
pub struct DrawnConnections {
    drawn: HashMap<RoomId, HashSet<(Direction, GridPos)>>,
}

impl DrawnConnections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawn(
        &self,
        source: RoomId,
        source_pos: GridPos,
        target: RoomId,
        target_pos: GridPos,
        direction: Direction,
    ) -> bool {
        self.has(source, direction, target_pos) || self.has(target, direction.opposite(), source_pos)
    }

    pub fn record(&mut self, source: RoomId, direction: Direction, target_pos: GridPos) {
        self.drawn
            .entry(source)
            .or_default()
            .insert((direction, target_pos));
    }

    pub fn len(&self) -> usize {
        self.drawn.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn has(&self, room: RoomId, direction: Direction, pos: GridPos) -> bool {
        self.drawn
            .get(&room)
            .is_some_and(|edges| edges.contains(&(direction, pos)))
    }
}
