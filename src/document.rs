//! The host document a composite map is drawn into.
//!
//! Tile boxes, rendered transform attributes and hit testing all come from
//! whatever actually drew the tiles; the coordinator only reads them, after
//! layout has been committed.

use std::collections::BTreeMap;

use glam::DVec2;

use crate::marker::RenderedMarker;
use crate::types::Rect;

/// Read access to laid-out tiles, plus the marker sink
pub trait Document {
    /// The tile's box in document pixels, once laid out
    fn tile_rect(&self, index: usize) -> Option<Rect>;

    /// The transform attribute the tile was drawn with, if any
    fn tile_transform(&self, index: usize) -> Option<String>;

    /// Indices of tiles whose drawn shape contains `point`
    fn tiles_at(&self, point: DVec2) -> Vec<usize>;

    /// Replace the markers drawn on one tile
    fn render_markers(&mut self, index: usize, markers: &[RenderedMarker]);
}

#[derive(Clone, Debug, PartialEq)]
struct DocumentTile {
    rect: Rect,
    transform: Option<String>,
}

/// A document kept in memory, for headless use and tests.
///
/// Hit testing uses the tile boxes as the drawn shapes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryDocument {
    tiles: BTreeMap<usize, DocumentTile>,
    rendered: BTreeMap<usize, Vec<RenderedMarker>>,
    render_passes: usize,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// `count` square tiles side by side, starting at the origin
    pub fn row(tile_size: f64, count: usize) -> Self {
        let mut doc = Self::new();
        for i in 0..count {
            doc.insert_tile(i, Rect::new(i as f64 * tile_size, 0.0, tile_size, tile_size), None);
        }
        doc
    }

    pub fn insert_tile(&mut self, index: usize, rect: Rect, transform: Option<&str>) {
        self.tiles.insert(
            index,
            DocumentTile {
                rect,
                transform: transform.map(str::to_string),
            },
        );
    }

    /// Move or resize a tile; unknown tiles are ignored
    pub fn set_rect(&mut self, index: usize, rect: Rect) {
        if let Some(tile) = self.tiles.get_mut(&index) {
            tile.rect = rect;
        }
    }

    pub fn set_transform(&mut self, index: usize, transform: Option<&str>) {
        if let Some(tile) = self.tiles.get_mut(&index) {
            tile.transform = transform.map(str::to_string);
        }
    }

    /// Markers last drawn on a tile
    pub fn rendered(&self, index: usize) -> &[RenderedMarker] {
        self.rendered.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of `render_markers` calls so far
    pub fn render_passes(&self) -> usize {
        self.render_passes
    }
}

impl Document for MemoryDocument {
    fn tile_rect(&self, index: usize) -> Option<Rect> {
        self.tiles.get(&index).map(|t| t.rect)
    }

    fn tile_transform(&self, index: usize) -> Option<String> {
        self.tiles.get(&index).and_then(|t| t.transform.clone())
    }

    fn tiles_at(&self, point: DVec2) -> Vec<usize> {
        self.tiles
            .iter()
            .filter(|(_, t)| t.rect.contains(point))
            .map(|(&i, _)| i)
            .collect()
    }

    fn render_markers(&mut self, index: usize, markers: &[RenderedMarker]) {
        self.render_passes += 1;
        self.rendered.insert(index, markers.to_vec());
    }
}
