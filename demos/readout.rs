//! Lay out a north / quincuncial / south triptych and read back a click.
//!
//! Usage: cargo run --example readout --features tracing -- [x y] [tile-size]

use glam::dvec2;
use triptych::{
    CompositeMap, GeoProjectionEngine, LatLong, Marker, MemoryDocument, ProjectionCatalog,
    QueryOptions, Readout, ReferenceOutline,
};

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<f64> = std::env::args()
        .skip(1)
        .filter_map(|arg| arg.parse().ok())
        .collect();
    let size = args.get(2).copied().unwrap_or(300.0);
    let click = match args[..] {
        [x, y, ..] => dvec2(x, y),
        _ => dvec2(size * 1.5, size * 0.25),
    };

    let catalog = ProjectionCatalog::builtin();
    let outline = ReferenceOutline::full_domain();
    let mut map = CompositeMap::new(MemoryDocument::row(size, 3));
    let pending = map.expect_tiles(3);
    for (tile, name) in pending.into_iter().zip(["north", "peirce", "south"]) {
        let engine = GeoProjectionEngine::for_name(catalog, name, size, &outline)?;
        println!("{}: {}", name, engine.kind().name());
        map.complete_tile(&tile, engine)?;
    }

    let readout = Readout::default();
    let at = map.screen_to_geo(click, QueryOptions::single());
    println!("click ({}, {}) -> {}", click.x, click.y, readout.format(&at));

    map.add_marker(Marker::at(LatLong::new(51.4769, 0.0)).with_id("greenwich"));
    for tile in map.tiles() {
        for marker in map.document().rendered(tile.index()) {
            println!(
                "tile {} draws {} at ({:.2}, {:.2})",
                tile.index(),
                marker.id.as_deref().unwrap_or("marker"),
                marker.point.x,
                marker.point.y
            );
        }
    }
    Ok(())
}
