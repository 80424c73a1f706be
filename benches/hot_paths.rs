use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tui_navmap::data::demo_scene;
use tui_navmap::geo::GeoPoint;
use tui_navmap::map::Viewport;
use tui_navmap::paint::circle::paint_circle;
use tui_navmap::paint::linestring::draw_geo_path;
use tui_navmap::paint::sampler::circle_point_count;
use tui_navmap::paint::text::find_text_pos;
use tui_navmap::paint::{DisplayList, FrameOptions, LayerSettings, MapPainter, RenderContext};

fn zurich() -> Viewport {
    let mut viewport = Viewport::new(8.55, 47.46, 1.0, 400, 240);
    viewport.zoom_to_distance(200.0);
    viewport
}

fn bench_sampling(c: &mut Criterion) {
    let viewport = zurich();
    c.bench_function("circle_point_count", |b| {
        b.iter(|| circle_point_count(&viewport, black_box(25.0), false))
    });

    let from = GeoPoint::new(6.23, 46.25);
    let to = GeoPoint::new(11.29, 48.35);
    c.bench_function("find_text_pos", |b| {
        b.iter(|| find_text_pos(&viewport, black_box(&from), black_box(&to), 30.0, 8.0))
    });
}

fn bench_painting(c: &mut Criterion) {
    let viewport = zurich();
    let layers = LayerSettings::default();
    let distance = viewport.distance_km();
    let layer = layers.layer_for(distance, 0);
    let options = FrameOptions::default();
    let bounds = viewport.visible_bounds();
    let path = [
        GeoPoint::new(6.23, 46.25),
        GeoPoint::new(8.55, 47.46),
        GeoPoint::new(11.29, 48.35),
    ];
    let center = GeoPoint::new(8.549, 47.458);

    c.bench_function("draw_geo_path", |b| {
        b.iter(|| {
            let mut list = DisplayList::new();
            let mut ctx =
                RenderContext::new(&mut list, &viewport, &viewport, layer, layer, bounds, &options);
            draw_geo_path(&mut ctx, black_box(&path));
        })
    });

    c.bench_function("paint_circle", |b| {
        b.iter(|| {
            let mut list = DisplayList::new();
            let mut ctx =
                RenderContext::new(&mut list, &viewport, &viewport, layer, layer, bounds, &options);
            paint_circle(&mut ctx, black_box(&center), 50.0, false)
        })
    });

    let scene = demo_scene();
    c.bench_function("demo_scene", |b| {
        b.iter(|| {
            let mut list = DisplayList::new();
            let mut ctx =
                RenderContext::new(&mut list, &viewport, &viewport, layer, layer, bounds, &options);
            scene.render(&mut ctx);
            ctx.object_count()
        })
    });
}

criterion_group!(benches, bench_sampling, bench_painting);
criterion_main!(benches);
