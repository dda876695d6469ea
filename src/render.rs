//! Two-pass area map build: measure the grid, then draw rooms, connections,
//! labels and force-mark hints onto a backend surface.

use tracing::{debug, trace};

use crate::config::{Config, LayoutConfig};
use crate::error::Result;
use crate::ir::{Area, BuildOptions, ConnectionKind, Direction, GridPos, Room};
use crate::layout::{
    BrokenConnection, BrokenConnectionLookup, ClassificationPolicy, DrawnConnections,
    GridMetrics, ImageSize, Point, RoomGrid, RoomInfo, RoomRect, connection_point, is_straight,
    route_connection,
};
use crate::surface::{Backend, Surface};
use crate::text_metrics::TextMeasure;
use crate::theme::Theme;

/// Encoded image plus the rectangle every placed room was drawn into.
#[derive(Debug)]
pub struct ImageResult<'a> {
    pub bytes: Vec<u8>,
    pub size: ImageSize,
    pub column_widths: Vec<i32>,
    /// Column-major, row-minor, matching the draw order.
    pub rooms: Vec<RoomInfo<'a>>,
}

impl<'a> ImageResult<'a> {
    pub fn room_at(&self, point: Point) -> Option<&RoomInfo<'a>> {
        self.rooms.iter().find(|info| info.rect.contains(point))
    }
}

/// A drawn but not yet encoded map.
pub struct DrawnMap<'a, S> {
    pub surface: S,
    pub metrics: GridMetrics,
    pub rooms: Vec<RoomInfo<'a>>,
}

pub struct MapRenderer<M> {
    theme: Theme,
    layout: LayoutConfig,
    policy: ClassificationPolicy,
    measurer: M,
}

impl<M: TextMeasure> MapRenderer<M> {
    pub fn new(config: &Config, measurer: M) -> Self {
        Self {
            theme: config.theme.clone(),
            layout: config.layout.clone(),
            policy: ClassificationPolicy::from_theme(&config.theme),
            measurer,
        }
    }

    pub fn with_policy(mut self, policy: ClassificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build<'a, B: Backend>(
        &self,
        area: &'a Area,
        options: &BuildOptions,
        broken: &dyn BrokenConnectionLookup,
        backend: &B,
    ) -> Result<ImageResult<'a>> {
        let drawn = self.draw(area, options, broken, backend)?;
        let size = drawn.metrics.image_size();
        let bytes = drawn.surface.encode()?;
        debug!(
            area = %area.name,
            rooms = drawn.rooms.len(),
            bytes = bytes.len(),
            "built area map"
        );
        Ok(ImageResult {
            bytes,
            size,
            column_widths: drawn.metrics.column_widths().to_vec(),
            rooms: drawn.rooms,
        })
    }

    pub fn draw<'a, B: Backend>(
        &self,
        area: &'a Area,
        options: &BuildOptions,
        broken: &dyn BrokenConnectionLookup,
        backend: &B,
    ) -> Result<DrawnMap<'a, B::Surface>> {
        let grid = RoomGrid::new(area)?;
        let metrics = GridMetrics::measure(&grid, &self.measurer, &self.layout, options);
        let size = metrics.image_size();
        debug!(
            area = %area.name,
            columns = grid.columns(),
            rows = grid.rows(),
            width = size.width,
            height = size.height,
            "measured area grid"
        );

        let surface = backend.allocate(size)?;
        let mut pass = DrawPass {
            renderer: self,
            grid: &grid,
            metrics: &metrics,
            options,
            broken,
            surface,
            drawn: DrawnConnections::new(),
            rooms: Vec::new(),
        };
        for (pos, room) in grid.iter_cells() {
            pass.draw_room(pos, room);
        }
        trace!(edges = pass.drawn.len(), "connections drawn");

        let DrawPass { surface, rooms, .. } = pass;
        Ok(DrawnMap {
            surface,
            metrics,
            rooms,
        })
    }

    fn room_color<'s>(&'s self, room: &'s Room, options: &BuildOptions) -> &'s str {
        if options.selected_room == Some(room.id) {
            &self.theme.selected_color
        } else if let Some(color) = room.mark_color.as_deref() {
            color
        } else if room.is_exit_to_other_area {
            &self.theme.exit_to_other_area_color
        } else {
            &self.theme.line_color
        }
    }

    fn connection_color(
        &self,
        key: &BrokenConnection,
        options: &BuildOptions,
        broken: &dyn BrokenConnectionLookup,
    ) -> &str {
        if !options.colorize_connection_issues {
            return &self.theme.line_color;
        }
        match self.policy.classify(broken, key) {
            Some(rule) => &rule.color,
            None => &self.theme.line_color,
        }
    }
}

struct DrawPass<'r, 'g, 'a, M, S> {
    renderer: &'r MapRenderer<M>,
    grid: &'g RoomGrid<'a>,
    metrics: &'g GridMetrics,
    options: &'g BuildOptions,
    broken: &'g dyn BrokenConnectionLookup,
    surface: S,
    drawn: DrawnConnections,
    rooms: Vec<RoomInfo<'a>>,
}

impl<'a, M: TextMeasure, S: Surface> DrawPass<'_, '_, 'a, M, S> {
    fn draw_room(&mut self, pos: GridPos, room: &'a Room) {
        let renderer = self.renderer;
        let rect = self.metrics.room_rect(pos);
        self.surface.draw_rect(
            &rect,
            renderer.room_color(room, self.options),
            renderer.layout.room_stroke_width,
        );
        self.rooms.push(RoomInfo { room, rect });

        for (&direction, connection) in &room.connections {
            if connection.kind == ConnectionKind::Backward {
                continue;
            }
            let Some(target) = self.grid.room_by_id(connection.room_id) else {
                trace!(room = room.id, target = connection.room_id, "connection target missing");
                continue;
            };
            let Some(target_pos) = self.grid.cell_of(target) else {
                trace!(room = room.id, target = target.id, "connection target unplaced");
                continue;
            };
            if self
                .drawn
                .is_drawn(room.id, pos, target.id, target_pos, direction)
            {
                continue;
            }
            self.draw_connection(room, pos, &rect, direction, target, target_pos, connection.kind);
            self.drawn.record(room.id, direction, target_pos);
        }

        let label_color = if room.is_exit_to_other_area {
            &renderer.theme.exit_to_other_area_color
        } else {
            &renderer.theme.text_color
        };
        self.surface
            .draw_text(&room.label(self.options.add_debug_info), rect.center(), label_color);

        if let Some(offset) = room.force_mark {
            self.draw_force_mark(pos, &rect, offset);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_connection(
        &mut self,
        room: &Room,
        pos: GridPos,
        rect: &RoomRect,
        direction: Direction,
        target: &Room,
        target_pos: GridPos,
        kind: ConnectionKind,
    ) {
        let renderer = self.renderer;
        let stroke_width = renderer.layout.connection_stroke_width;
        let key = BrokenConnection::new(room.id, target.id, direction);
        let color = renderer.connection_color(&key, self.options, self.broken);

        let source_point = connection_point(rect, direction);
        let target_rect = self.metrics.room_rect(target_pos);
        let target_point = connection_point(&target_rect, direction.opposite());

        if is_straight(pos, target_pos, direction, room.id == target.id) {
            self.surface
                .draw_line(source_point, target_point, color, stroke_width);
        } else {
            let route = route_connection(self.metrics, pos, target_pos, direction);
            for segment in route.windows(2) {
                self.surface
                    .draw_line(segment[0], segment[1], color, stroke_width);
            }
        }

        if kind == ConnectionKind::Forward {
            let head = arrowhead(source_point, target_point, renderer.layout.arrow_radius as f32);
            self.surface
                .draw_polygon(&head, &renderer.theme.arrow_fill, color, stroke_width);
        }
    }

    fn draw_force_mark(&mut self, pos: GridPos, rect: &RoomRect, offset: GridPos) {
        let half_height = self.metrics.room_height() / 2;
        let source = self.metrics.to_screen(pos);
        let target_cell = pos.offset(offset);
        let shift_x = self
            .metrics
            .column_width(target_cell.x)
            .map_or(0, |width| width / 2);
        let target = self.metrics.to_screen(target_cell);
        self.surface.draw_line(
            Point::new(source.x + rect.width / 2, source.y + half_height),
            Point::new(
                target.x.saturating_add(shift_x),
                target.y.saturating_add(half_height),
            ),
            &self.renderer.theme.force_mark_color,
            self.renderer.layout.hint_stroke_width,
        );
    }
}

/// Triangle with its tip on `target`, pointing along `source → target`.
pub fn arrowhead(source: Point, target: Point, radius: f32) -> [(f32, f32); 3] {
    let dx = (target.x - source.x) as f32;
    let dy = (target.y - source.y) as f32;
    let length = (dx * dx + dy * dy).sqrt();
    let (ux, uy) = if length > 0.0 {
        (dx / length, dy / length)
    } else {
        (1.0, 0.0)
    };

    // Signed angle from the direction to +X, from cross and dot products.
    let cos_a = ux;
    let sin_a = -uy;
    let rotation = -sin_a.atan2(cos_a);
    let (sin, cos) = rotation.sin_cos();

    let tip_x = target.x as f32;
    let tip_y = target.y as f32;
    [(0.0, 0.0), (-radius, radius), (-radius, -radius)]
        .map(|(x, y)| (tip_x + x * cos - y * sin, tip_y + x * sin + y * cos))
}

/// Builds a PNG with installed fonts for measurement and rasterization.
#[cfg(feature = "png")]
pub fn build_png<'a>(
    area: &'a Area,
    options: &BuildOptions,
    broken: &dyn BrokenConnectionLookup,
    config: &Config,
) -> Result<ImageResult<'a>> {
    let measurer = crate::text_metrics::FontMeasurer::from_config(config);
    let backend = crate::surface::PngBackend::new(&config.theme, &config.render);
    MapRenderer::new(config, measurer).build(area, options, broken, &backend)
}

pub fn build_svg<'a>(
    area: &'a Area,
    options: &BuildOptions,
    broken: &dyn BrokenConnectionLookup,
    config: &Config,
) -> Result<ImageResult<'a>> {
    let measurer = crate::text_metrics::FontMeasurer::from_config(config);
    let backend = crate::surface::SvgBackend::new(&config.theme);
    MapRenderer::new(config, measurer).build(area, options, broken, &backend)
}
