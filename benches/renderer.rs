use area_map_renderer::config::Config;
use area_map_renderer::ir::{Area, BuildOptions, Direction, GridPos, Room};
use area_map_renderer::layout::{BrokenConnections, GridMetrics, RoomGrid, route_connection};
use area_map_renderer::render::MapRenderer;
use area_map_renderer::surface::{DisplayListBackend, SvgBackend};
use area_map_renderer::text_metrics::FixedWidthMeasurer;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// Square area with east/south links between neighbours and a bent
/// westward link from every other row.
fn grid_area(side: i32) -> Area {
    let mut area = Area::new(format!("grid_{side}"));
    let id = |x: i32, y: i32| y * side + x + 1;
    for y in 0..side {
        for x in 0..side {
            area.add_room(Room::new(id(x, y), format!("Room {x}-{y}")).at(x, y));
        }
    }
    for y in 0..side {
        for x in 0..side {
            if x + 1 < side {
                area.link(id(x, y), Direction::East, id(x + 1, y));
            }
            if y + 1 < side {
                area.link(id(x, y), Direction::South, id(x, y + 1));
            }
        }
        if y % 2 == 1 && side > 2 {
            area.link(id(0, y), Direction::West, id(side - 1, y));
        }
    }
    area
}

fn renderer(config: &Config) -> MapRenderer<FixedWidthMeasurer> {
    MapRenderer::new(config, FixedWidthMeasurer::for_font_size(config.theme.font_size))
}

fn bench_measure(c: &mut Criterion) {
    let mut group = c.benchmark_group("measure");
    let config = Config::default();
    let measurer = FixedWidthMeasurer::for_font_size(config.theme.font_size);
    for side in [4, 16, 48] {
        let area = grid_area(side);
        group.bench_with_input(BenchmarkId::from_parameter(side), &area, |b, area| {
            b.iter(|| {
                let grid = RoomGrid::new(black_box(area)).expect("grid failed");
                let metrics =
                    GridMetrics::measure(&grid, &measurer, &config.layout, &BuildOptions::default());
                black_box(metrics.image_size());
            });
        });
    }
    group.finish();
}

fn bench_routing(c: &mut Criterion) {
    let config = Config::default();
    let metrics = GridMetrics::from_widths(vec![64; 32], 32, &config.layout);
    c.bench_function("route_connection", |b| {
        b.iter(|| {
            for y in 0..32 {
                let route = route_connection(
                    &metrics,
                    GridPos::new(0, y),
                    GridPos::new(31, y),
                    Direction::West,
                );
                black_box(route);
            }
        });
    });
}

fn bench_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw");
    let config = Config::default();
    let renderer = renderer(&config);
    let broken = BrokenConnections::default();
    for side in [4, 16, 48] {
        let area = grid_area(side);
        group.bench_with_input(BenchmarkId::new("display_list", side), &area, |b, area| {
            b.iter(|| {
                let drawn = renderer
                    .draw(black_box(area), &BuildOptions::default(), &broken, &DisplayListBackend)
                    .expect("draw failed");
                black_box(drawn.surface.ops.len());
            });
        });
        let backend = SvgBackend::new(&config.theme);
        group.bench_with_input(BenchmarkId::new("svg", side), &area, |b, area| {
            b.iter(|| {
                let result = renderer
                    .build(black_box(area), &BuildOptions::default(), &broken, &backend)
                    .expect("build failed");
                black_box(result.bytes.len());
            });
        });
    }
    group.finish();
}

#[cfg(feature = "png")]
fn bench_png(c: &mut Criterion) {
    let mut group = c.benchmark_group("png");
    group.sample_size(10);
    let config = Config::default();
    let broken = BrokenConnections::default();
    for side in [4, 16] {
        let area = grid_area(side);
        group.bench_with_input(BenchmarkId::from_parameter(side), &area, |b, area| {
            b.iter(|| {
                let result = area_map_renderer::build_png(
                    black_box(area),
                    &BuildOptions::default(),
                    &broken,
                    &config,
                )
                .expect("png failed");
                black_box(result.bytes.len());
            });
        });
    }
    group.finish();
}

#[cfg(not(feature = "png"))]
fn bench_png(_c: &mut Criterion) {}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_measure, bench_routing, bench_draw, bench_png
);
criterion_main!(benches);
