use crate::ir::{Direction, GridPos};

use super::grid::{GridMetrics, connection_point};
use super::Point;

/// Whether a connection can be drawn as a single segment between docking
/// points.
///
/// Only the four planar exits are ever bent by relative position, and each
/// is bent when the target sits on the same line on the side the table
/// below names. Self-loops are always routed.
pub fn is_straight(source: GridPos, target: GridPos, direction: Direction, self_loop: bool) -> bool {
    if self_loop {
        return false;
    }
    let bent = match direction {
        Direction::North => source.x == target.x && source.y < target.y,
        Direction::East => source.x > target.x && source.y == target.y,
        Direction::South => source.x == target.x && source.y > target.y,
        Direction::West => source.x < target.x && source.y == target.y,
        Direction::Up | Direction::Down => false,
    };
    !bent
}

/// Stub and jog length: a quarter of the gap between cells on the exit axis.
pub fn path_radius(metrics: &GridMetrics, direction: Direction) -> i32 {
    let spacing = metrics.spacing();
    if direction.is_horizontal() {
        spacing.x / 4
    } else {
        spacing.y / 4
    }
}

/// Orthogonal polyline from the source exit to the target's opposite exit.
///
/// The route always has six waypoints: source dock, source stub, a jog or
/// midpoint turn, the turn onto the target stub's line, target stub, target
/// dock. Nothing here looks at other rooms.
pub fn route_connection(
    metrics: &GridMetrics,
    source: GridPos,
    target: GridPos,
    direction: Direction,
) -> Vec<Point> {
    let radius = path_radius(metrics, direction);
    let source_rect = metrics.room_rect(source);
    let mut cursor = connection_point(&source_rect, direction);
    let mut route = Vec::with_capacity(6);
    route.push(cursor);

    let delta = direction.delta();
    cursor.x += delta.x * radius;
    cursor.y += delta.y * radius;
    route.push(cursor);

    let opposite = direction.opposite();
    let target_rect = metrics.room_rect(target);
    let target_dock = connection_point(&target_rect, opposite);
    let back = opposite.delta();
    let target_stub = Point::new(
        target_dock.x + back.x * radius,
        target_dock.y + back.y * radius,
    );

    if direction.is_horizontal() {
        if source.y == target.y {
            // Same row: step off the line so a parallel link between the
            // same rooms stays visible.
            if target_stub.y < cursor.y {
                cursor.y -= radius;
            } else {
                cursor.y += radius;
            }
        } else {
            cursor.y += (target_stub.y - cursor.y) / 2;
        }
        route.push(cursor);
        cursor.x = target_stub.x;
        route.push(cursor);
    } else {
        if source.x == target.x {
            if target_stub.x < cursor.x {
                cursor.x -= radius;
            } else {
                cursor.x += radius;
            }
        } else {
            cursor.x += (target_stub.x - cursor.x) / 2;
        }
        route.push(cursor);
        cursor.y = target_stub.y;
        route.push(cursor);
    }

    route.push(target_stub);
    route.push(target_dock);
    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;

    fn metrics(widths: Vec<i32>, rows: usize) -> GridMetrics {
        GridMetrics::from_widths(widths, rows, &LayoutConfig::default())
    }

    fn assert_orthogonal(route: &[Point]) {
        for pair in route.windows(2) {
            assert!(
                pair[0].x == pair[1].x || pair[0].y == pair[1].y,
                "diagonal segment {:?} -> {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn straightness_table_is_literal() {
        let origin = GridPos::new(1, 1);
        assert!(!is_straight(origin, GridPos::new(1, 3), Direction::North, false));
        assert!(is_straight(origin, GridPos::new(1, 0), Direction::North, false));
        assert!(!is_straight(origin, GridPos::new(0, 1), Direction::East, false));
        assert!(is_straight(origin, GridPos::new(2, 1), Direction::East, false));
        assert!(!is_straight(origin, GridPos::new(1, 0), Direction::South, false));
        assert!(is_straight(origin, GridPos::new(1, 2), Direction::South, false));
        assert!(!is_straight(origin, GridPos::new(2, 1), Direction::West, false));
        assert!(is_straight(origin, GridPos::new(0, 1), Direction::West, false));
        assert!(is_straight(origin, GridPos::new(3, 3), Direction::Up, false));
        assert!(!is_straight(origin, origin, Direction::Up, true));
    }

    #[test]
    fn misaligned_south_is_straight_under_the_table() {
        // Same row, different column: the South rule needs a shared column.
        assert!(is_straight(
            GridPos::new(0, 0),
            GridPos::new(2, 0),
            Direction::South,
            false
        ));
    }

    #[test]
    fn vertical_route_between_columns_turns_at_midpoint() {
        let metrics = metrics(vec![40, 40, 40], 1);
        let route = route_connection(
            &metrics,
            GridPos::new(0, 0),
            GridPos::new(2, 0),
            Direction::South,
        );
        assert_eq!(
            route,
            vec![
                Point::new(52, 64),
                Point::new(52, 72),
                Point::new(124, 72),
                Point::new(124, 24),
                Point::new(196, 24),
                Point::new(196, 32),
            ]
        );
        assert_orthogonal(&route);
    }

    #[test]
    fn vertical_route_in_shared_column_jogs_sideways() {
        let metrics = metrics(vec![40], 3);
        let route = route_connection(
            &metrics,
            GridPos::new(0, 2),
            GridPos::new(0, 0),
            Direction::South,
        );
        // source stub (52, 200) and target stub (52, 24) share X: jog right.
        assert_eq!(route[0], Point::new(52, 192));
        assert_eq!(route[1], Point::new(52, 200));
        assert_eq!(route[2], Point::new(60, 200));
        assert_eq!(route[3], Point::new(60, 24));
        assert_eq!(route[4], Point::new(52, 24));
        assert_eq!(route[5], Point::new(52, 32));
        assert_orthogonal(&route);
    }

    #[test]
    fn horizontal_route_in_shared_row_jogs_down() {
        let metrics = metrics(vec![40, 40], 1);
        let route = route_connection(
            &metrics,
            GridPos::new(1, 0),
            GridPos::new(0, 0),
            Direction::East,
        );
        assert_eq!(route[0], Point::new(144, 48));
        assert_eq!(route[1], Point::new(152, 48));
        assert_eq!(route[2], Point::new(152, 56));
        assert_eq!(route[3], Point::new(24, 56));
        assert_eq!(route[4], Point::new(24, 48));
        assert_eq!(route[5], Point::new(32, 48));
        assert_orthogonal(&route);
    }

    #[test]
    fn horizontal_route_across_rows_turns_halfway() {
        let metrics = metrics(vec![40, 40], 3);
        let route = route_connection(
            &metrics,
            GridPos::new(0, 0),
            GridPos::new(1, 2),
            Direction::East,
        );
        // stubs at y 48 and y 176: the turn happens at y 112.
        assert_eq!(route[2], Point::new(80, 112));
        assert_eq!(route[3], Point::new(96, 112));
        assert_eq!(route.len(), 6);
        assert_orthogonal(&route);
    }

    #[test]
    fn self_loop_route_leaves_and_reenters_the_room() {
        let metrics = metrics(vec![40], 1);
        let pos = GridPos::new(0, 0);
        let route = route_connection(&metrics, pos, pos, Direction::North);
        assert_eq!(route.first(), Some(&Point::new(52, 32)));
        assert_eq!(route.last(), Some(&Point::new(52, 64)));
        assert_orthogonal(&route);
    }
}
