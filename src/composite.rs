//! Composite map coordinator
//!
//! A composite map is an ordered set of tiles presented as one surface. It
//! owns the tiles, the container box covering all of them and the marker
//! list. Tiles arrive after their asynchronous layout completes; queries are
//! refused until every expected tile is in.

use glam::DVec2;

use crate::document::Document;
use crate::errors::{LayoutError, QueryError};
use crate::log::{debug, error};
use crate::marker::{Marker, MarkerPosition, RenderedMarker};
use crate::presentation::PresentationTransform;
use crate::projection::GeoProjectionEngine;
use crate::tile::{Constrain, TileGeometry, constrain_to_bounds};
use crate::types::{LatLong, Rect};

/// Lifecycle of a composite map
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MapState {
    #[default]
    Empty,
    /// Waiting on `pending` tiles to finish layout
    Loading { pending: usize },
    Ready,
}

/// Token for a tile whose layout has not completed yet.
///
/// Hand it to [`CompositeMap::complete_tile`] once the tile is in the
/// document and its transform attribute is set. The token stays valid until
/// a completion succeeds, so a failed layout read can be retried.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "the map stays loading until every pending tile is completed"]
pub struct PendingTile {
    index: usize,
}

impl PendingTile {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Options for composite coordinate queries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryOptions {
    /// Mean the answers of every tile instead of asking one
    pub average: bool,
    /// Wrap screen results into the container box
    pub constrain: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            average: true,
            constrain: true,
        }
    }
}

impl QueryOptions {
    /// Ask a single tile
    pub fn single() -> Self {
        QueryOptions {
            average: false,
            ..Self::default()
        }
    }
}

/// Several projection tiles forming one logical map
#[derive(Debug)]
pub struct CompositeMap<D> {
    document: D,
    /// Sorted by tile index, which is also left-to-right placement
    tiles: Vec<TileGeometry>,
    container: Option<Rect>,
    markers: Vec<Marker>,
    state: MapState,
    next_index: usize,
}

impl<D: Document> CompositeMap<D> {
    pub fn new(document: D) -> Self {
        CompositeMap {
            document,
            tiles: Vec::new(),
            container: None,
            markers: Vec::new(),
            state: MapState::Empty,
            next_index: 0,
        }
    }

    pub fn state(&self) -> MapState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == MapState::Ready
    }

    pub fn tiles(&self) -> &[TileGeometry] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> Option<&TileGeometry> {
        self.tiles
            .binary_search_by_key(&index, TileGeometry::index)
            .ok()
            .map(|pos| &self.tiles[pos])
    }

    /// Union of every tile's box
    pub fn container(&self) -> Option<Rect> {
        self.container
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Direct access to the host document; call [`relayout`](Self::relayout)
    /// after moving tiles in it.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    fn set_state(&mut self, state: MapState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "map state changed");
            self.state = state;
        }
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Announce `count` tiles that will complete layout later
    pub fn expect_tiles(&mut self, count: usize) -> Vec<PendingTile> {
        if count == 0 {
            return Vec::new();
        }
        let pending = match self.state {
            MapState::Loading { pending } => pending,
            _ => 0,
        };
        self.set_state(MapState::Loading {
            pending: pending + count,
        });
        let first = self.next_index;
        self.next_index += count;
        (first..first + count).map(|index| PendingTile { index }).collect()
    }

    /// Add a pending tile once its layout is committed.
    ///
    /// Reads the tile's box and rendered transform from the document. The map
    /// becomes ready, and markers are drawn, when the last pending tile
    /// completes. If layout cannot be read the tile stays pending and the
    /// same token can be completed again.
    pub fn complete_tile(
        &mut self,
        tile: &PendingTile,
        engine: GeoProjectionEngine,
    ) -> Result<(), LayoutError> {
        let pending = match self.state {
            MapState::Loading { pending } => pending,
            _ => 0,
        };
        if pending == 0 {
            error!(index = tile.index, "tile completed with no layout pending");
            return Err(LayoutError::CounterUnderflow);
        }

        let geometry = self.lay_out(tile.index, engine)?;
        self.insert(geometry)?;
        if pending == 1 {
            self.set_state(MapState::Ready);
            self.render_markers();
        } else {
            self.set_state(MapState::Loading {
                pending: pending - 1,
            });
        }
        Ok(())
    }

    /// Add a tile that is already laid out; returns its index.
    ///
    /// A loading map keeps waiting on its pending tiles.
    pub fn add_tile(&mut self, engine: GeoProjectionEngine) -> Result<usize, LayoutError> {
        let index = self.next_index;
        let geometry = self.lay_out(index, engine)?;
        self.next_index += 1;
        self.insert(geometry)?;
        if !matches!(self.state, MapState::Loading { .. }) {
            self.set_state(MapState::Ready);
            self.render_markers();
        }
        Ok(index)
    }

    /// Re-read every tile's box and transform, e.g. after a resize
    pub fn relayout(&mut self) -> Result<(), LayoutError> {
        for pos in 0..self.tiles.len() {
            let tile = &self.tiles[pos];
            let (rect, presentation) = self.read_layout(tile.index(), tile.engine())?;
            let tile = &mut self.tiles[pos];
            tile.set_rect(rect);
            tile.set_presentation(presentation);
        }
        self.update_container();
        if self.is_ready() {
            self.render_markers();
        }
        Ok(())
    }

    fn read_layout(
        &self,
        index: usize,
        engine: &GeoProjectionEngine,
    ) -> Result<(Rect, PresentationTransform), LayoutError> {
        let rect = self
            .document
            .tile_rect(index)
            .ok_or(LayoutError::TileNotLaidOut { index })?;
        let rendered = self.document.tile_transform(index);
        let presentation = PresentationTransform::resolve(
            &engine.kind().parameters(),
            engine.tile_size(),
            rendered.as_deref(),
        )?;
        debug!(index, %rect, "read tile layout");
        Ok((rect, presentation))
    }

    fn lay_out(
        &self,
        index: usize,
        engine: GeoProjectionEngine,
    ) -> Result<TileGeometry, LayoutError> {
        let (rect, presentation) = self.read_layout(index, &engine)?;
        Ok(TileGeometry::new(index, engine)
            .with_rect(rect)
            .with_presentation(presentation))
    }

    fn insert(&mut self, tile: TileGeometry) -> Result<(), LayoutError> {
        match self.tiles.binary_search_by_key(&tile.index(), TileGeometry::index) {
            Ok(_) => Err(LayoutError::DuplicateTile {
                index: tile.index(),
            }),
            Err(pos) => {
                self.tiles.insert(pos, tile);
                self.update_container();
                Ok(())
            }
        }
    }

    fn update_container(&mut self) {
        let rects: Vec<Rect> = self.tiles.iter().filter_map(TileGeometry::rect).collect();
        self.container = Rect::union_all(&rects);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    fn ensure_ready(&self) -> Result<(), QueryError> {
        match self.state {
            MapState::Empty => Err(QueryError::NoTilesLoaded),
            MapState::Loading { pending } => Err(QueryError::NotReady { pending }),
            MapState::Ready if self.tiles.is_empty() => Err(QueryError::NoTilesLoaded),
            MapState::Ready => Ok(()),
        }
    }

    /// The middle tile of the ordered list, or the first laid-out one
    fn designated(&self) -> Result<&TileGeometry, QueryError> {
        let middle = self.tiles.get(self.tiles.len() / 2);
        middle
            .filter(|t| t.is_laid_out())
            .or_else(|| self.tiles.iter().find(|t| t.is_laid_out()))
            .ok_or(match middle {
                Some(t) => QueryError::TileNotLaidOut { index: t.index() },
                None => QueryError::NoTilesLoaded,
            })
    }

    fn averaging(&self, options: QueryOptions) -> bool {
        options.average && self.tiles.len() > 1
    }

    /// The topmost tile drawn at `point`; later tiles overlay earlier ones
    pub fn hit_test(&self, point: DVec2) -> Result<Option<&TileGeometry>, QueryError> {
        self.ensure_ready()?;
        let hits = self.document.tiles_at(point);
        Ok(self
            .tiles
            .iter()
            .rev()
            .find(|t| hits.contains(&t.index())))
    }

    /// Geographic position to document pixels.
    ///
    /// Averaging means the tile-local answers of every tile, so tiles that
    /// agree give exactly their common answer; the designated tile then
    /// places the result in the document.
    pub fn geo_to_screen(&self, at: LatLong, options: QueryOptions) -> Result<DVec2, QueryError> {
        self.ensure_ready()?;
        let designated = self.designated()?;
        let local = if self.averaging(options) {
            let mut sum = DVec2::ZERO;
            for tile in &self.tiles {
                sum += tile.geo_to_screen(at, false, Constrain::Unbounded)?;
            }
            sum / self.tiles.len() as f64
        } else {
            designated.geo_to_screen(at, false, Constrain::Unbounded)?
        };

        let global = designated.local_to_global(local)?;
        match self.container {
            Some(container) if options.constrain => Ok(constrain_to_bounds(global, &container, false)),
            _ => Ok(global),
        }
    }

    /// Document pixels to a geographic position.
    ///
    /// Without averaging the tile under the point answers. A point outside
    /// every tile falls back to averaging when there are several tiles.
    pub fn screen_to_geo(&self, point: DVec2, options: QueryOptions) -> Result<LatLong, QueryError> {
        self.ensure_ready()?;
        let hit = self.hit_test(point)?;
        if self.averaging(options) {
            return self.averaged_geo(point, hit);
        }
        match hit {
            Some(tile) => tile.screen_to_geo(point, true),
            None if self.tiles.len() > 1 => self.averaged_geo(point, None),
            None => Err(QueryError::PointOutOfBounds {
                x: point.x,
                y: point.y,
            }),
        }
    }

    /// Mean of every tile's reading of `point`, taken relative to the hit
    /// tile (or the designated one)
    fn averaged_geo(&self, point: DVec2, hit: Option<&TileGeometry>) -> Result<LatLong, QueryError> {
        let anchor = match hit {
            Some(tile) => tile,
            None => self.designated()?,
        };
        let local = anchor.global_to_local(point)?;
        let (mut lat, mut long) = (0.0, 0.0);
        for tile in &self.tiles {
            let at = tile.screen_to_geo(local, false)?;
            lat += at.lat;
            long += at.long;
        }
        let n = self.tiles.len() as f64;
        Ok(LatLong::new(lat / n, long / n).normalized())
    }

    // ========================================================================
    // Markers
    // ========================================================================

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker_by_id(&self, id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id.as_deref() == Some(id))
    }

    /// Add a marker unless an identical one (position, space and id) exists.
    ///
    /// Returns whether the list changed; every tile is redrawn if it did.
    pub fn add_marker(&mut self, marker: Marker) -> bool {
        if self.markers.iter().any(|m| m.same_as(&marker)) {
            return false;
        }
        self.markers.push(marker);
        self.render_markers();
        true
    }

    /// Drop every marker matching `predicate`; returns how many went
    pub fn remove_markers(&mut self, mut predicate: impl FnMut(&Marker) -> bool) -> usize {
        let before = self.markers.len();
        self.markers.retain(|m| !predicate(m));
        let removed = before - self.markers.len();
        if removed > 0 {
            self.render_markers();
        }
        removed
    }

    /// Where `marker` is drawn on tile `index`, in that tile's local pixels
    pub fn resolve_marker(&self, marker: &Marker, index: usize) -> Result<DVec2, QueryError> {
        self.ensure_ready()?;
        let tile = self.tile(index).ok_or(QueryError::UnknownTile { index })?;
        match marker.position {
            MarkerPosition::LatLong(at) => tile.geo_to_screen(at, false, Constrain::Unbounded),
            MarkerPosition::TileLocal { tile: source, point } if source == index => Ok(point),
            MarkerPosition::TileLocal { tile: source, point } => {
                let source = self
                    .tile(source)
                    .ok_or(QueryError::UnknownTile { index: source })?;
                let at = source.screen_to_geo(point, false)?;
                tile.geo_to_screen(at, false, Constrain::Unbounded)
            }
            MarkerPosition::ScreenGlobal(point) => match self.hit_test(point)? {
                Some(hit) if hit.index() == index => tile.global_to_local(point),
                _ => {
                    let at = self.screen_to_geo(point, QueryOptions::single())?;
                    tile.geo_to_screen(at, false, Constrain::Unbounded)
                }
            },
        }
    }

    /// Redraw every marker on every tile; nothing is drawn before ready
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn render_markers(&mut self) {
        if !self.is_ready() {
            return;
        }
        let passes: Vec<(usize, Vec<RenderedMarker>)> = self
            .tiles
            .iter()
            .map(|tile| {
                let rendered = self
                    .markers
                    .iter()
                    .filter_map(|marker| match self.resolve_marker(marker, tile.index()) {
                        Ok(point) => Some(RenderedMarker {
                            id: marker.id.clone(),
                            point,
                            style: marker.style.clone(),
                        }),
                        Err(err) => {
                            debug!(tile = tile.index(), %marker.position, %err, "marker not drawn");
                            None
                        }
                    })
                    .collect();
                (tile.index(), rendered)
            })
            .collect();
        for (index, rendered) in passes {
            self.document.render_markers(index, &rendered);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProjectionCatalog;
    use crate::document::MemoryDocument;
    use crate::projection::ReferenceOutline;
    use glam::dvec2;

    fn engine(name: &str, size: f64) -> GeoProjectionEngine {
        GeoProjectionEngine::for_name(
            ProjectionCatalog::builtin(),
            name,
            size,
            &ReferenceOutline::full_domain(),
        )
        .unwrap()
    }

    fn ready_row(count: usize) -> CompositeMap<MemoryDocument> {
        let mut map = CompositeMap::new(MemoryDocument::row(200.0, count));
        for _ in 0..count {
            map.add_tile(engine("equirectangular", 200.0)).unwrap();
        }
        map
    }

    // ==================== lifecycle tests ====================

    #[test]
    fn empty_map_refuses_queries() {
        let map = CompositeMap::new(MemoryDocument::new());
        assert_eq!(map.state(), MapState::Empty);
        assert_eq!(
            map.geo_to_screen(LatLong::new(0.0, 0.0), QueryOptions::default()),
            Err(QueryError::NoTilesLoaded)
        );
        assert_eq!(map.hit_test(DVec2::ZERO).err(), Some(QueryError::NoTilesLoaded));
    }

    #[test]
    fn loading_until_last_tile_completes() {
        let mut map = CompositeMap::new(MemoryDocument::row(200.0, 3));
        let pending = map.expect_tiles(3);
        assert_eq!(map.state(), MapState::Loading { pending: 3 });
        assert_eq!(
            map.screen_to_geo(dvec2(10.0, 10.0), QueryOptions::default()),
            Err(QueryError::NotReady { pending: 3 })
        );

        let mut pending = pending.into_iter();
        for expected in [2, 1] {
            let tile = pending.next().unwrap();
            map.complete_tile(&tile, engine("equirectangular", 200.0)).unwrap();
            assert_eq!(map.state(), MapState::Loading { pending: expected });
        }
        map.complete_tile(&pending.next().unwrap(), engine("equirectangular", 200.0))
            .unwrap();
        assert_eq!(map.state(), MapState::Ready);
        assert_eq!(map.container(), Some(Rect::new(0.0, 0.0, 600.0, 200.0)));
    }

    #[test]
    fn tiles_complete_out_of_order() {
        let mut map = CompositeMap::new(MemoryDocument::row(200.0, 2));
        let mut pending = map.expect_tiles(2);
        let second = pending.pop().unwrap();
        let first = pending.pop().unwrap();
        map.complete_tile(&second, engine("equirectangular", 200.0)).unwrap();
        map.complete_tile(&first, engine("equirectangular", 200.0)).unwrap();
        let order: Vec<_> = map.tiles().iter().map(TileGeometry::index).collect();
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn completing_past_zero_is_an_error() {
        let mut other = CompositeMap::new(MemoryDocument::row(200.0, 1));
        let stray = other.expect_tiles(1).pop().unwrap();

        let mut map = ready_row(1);
        let err = map.complete_tile(&stray, engine("equirectangular", 200.0));
        assert!(matches!(err, Err(LayoutError::CounterUnderflow)));
        assert_eq!(map.state(), MapState::Ready);
    }

    #[test]
    fn tile_without_layout_stays_pending() {
        let mut map = CompositeMap::new(MemoryDocument::new());
        let tile = map.expect_tiles(1).pop().unwrap();
        let err = map.complete_tile(&tile, engine("equirectangular", 200.0));
        assert!(matches!(err, Err(LayoutError::TileNotLaidOut { index: 0 })));
        assert_eq!(map.state(), MapState::Loading { pending: 1 });
    }

    #[test]
    fn failed_completion_can_be_retried() {
        let mut map = CompositeMap::new(MemoryDocument::new());
        let tile = map.expect_tiles(1).pop().unwrap();
        let err = map.complete_tile(&tile, engine("equirectangular", 200.0));
        assert!(matches!(err, Err(LayoutError::TileNotLaidOut { index: 0 })));

        map.document_mut()
            .insert_tile(tile.index(), Rect::new(0.0, 0.0, 200.0, 200.0), None);
        map.complete_tile(&tile, engine("equirectangular", 200.0)).unwrap();
        assert_eq!(map.state(), MapState::Ready);
        assert_eq!(map.container(), Some(Rect::new(0.0, 0.0, 200.0, 200.0)));

        // Completed tokens are spent
        let again = map.complete_tile(&tile, engine("equirectangular", 200.0));
        assert!(matches!(again, Err(LayoutError::CounterUnderflow)));
    }

    #[test]
    fn retry_after_bad_transform_keeps_counter() {
        let mut doc = MemoryDocument::row(200.0, 2);
        doc.set_transform(1, Some("skewX(30)"));
        let mut map = CompositeMap::new(doc);
        let pending = map.expect_tiles(2);
        map.complete_tile(&pending[0], engine("equirectangular", 200.0)).unwrap();
        let err = map.complete_tile(&pending[1], engine("equirectangular", 200.0));
        assert!(matches!(err, Err(LayoutError::Transform(_))));
        assert_eq!(map.state(), MapState::Loading { pending: 1 });

        map.document_mut().set_transform(1, None);
        map.complete_tile(&pending[1], engine("equirectangular", 200.0)).unwrap();
        assert!(map.is_ready());
    }

    #[test]
    fn bad_rendered_transform_is_a_layout_error() {
        let mut doc = MemoryDocument::new();
        doc.insert_tile(0, Rect::new(0.0, 0.0, 200.0, 200.0), Some("scale(3)"));
        let mut map = CompositeMap::new(doc);
        let err = map.add_tile(engine("equirectangular", 200.0));
        assert!(matches!(err, Err(LayoutError::Transform(_))));
        assert_eq!(map.state(), MapState::Empty);
    }

    #[test]
    fn add_tile_while_loading_keeps_waiting() {
        let mut map = CompositeMap::new(MemoryDocument::row(200.0, 2));
        let pending = map.expect_tiles(1);
        map.add_tile(engine("equirectangular", 200.0)).unwrap();
        assert_eq!(map.state(), MapState::Loading { pending: 1 });
        for tile in pending {
            map.complete_tile(&tile, engine("equirectangular", 200.0)).unwrap();
        }
        assert!(map.is_ready());
    }

    #[test]
    fn relayout_recomputes_container() {
        let mut map = ready_row(2);
        map.document_mut()
            .set_rect(1, Rect::new(250.0, 20.0, 200.0, 200.0));
        map.relayout().unwrap();
        assert_eq!(map.container(), Some(Rect::new(0.0, 0.0, 450.0, 220.0)));
        assert_eq!(
            map.tile(1).and_then(TileGeometry::rect),
            Some(Rect::new(250.0, 20.0, 200.0, 200.0))
        );
    }

    // ==================== query tests ====================

    #[test]
    fn designated_tile_is_the_middle_one() {
        let map = ready_row(3);
        let p = map
            .geo_to_screen(LatLong::new(0.0, 0.0), QueryOptions::single())
            .unwrap();
        assert!(p.abs_diff_eq(dvec2(300.0, 100.0), 1e-9));
    }

    #[test]
    fn hit_test_prefers_later_tiles() {
        let map = ready_row(2);
        let shared = map.hit_test(dvec2(200.0, 100.0)).unwrap();
        assert_eq!(shared.map(TileGeometry::index), Some(1));
        let first = map.hit_test(dvec2(100.0, 100.0)).unwrap();
        assert_eq!(first.map(TileGeometry::index), Some(0));
        assert!(map.hit_test(dvec2(100.0, 300.0)).unwrap().is_none());
    }

    #[test]
    fn single_tile_miss_is_out_of_bounds() {
        let map = ready_row(1);
        assert_eq!(
            map.screen_to_geo(dvec2(500.0, 10.0), QueryOptions::single()),
            Err(QueryError::PointOutOfBounds { x: 500.0, y: 10.0 })
        );
    }

    #[test]
    fn miss_with_several_tiles_falls_back_to_averaging() {
        let map = ready_row(2);
        // Below both tiles; read relative to the middle tile (index 1)
        let at = map
            .screen_to_geo(dvec2(300.0, 300.0), QueryOptions::single())
            .unwrap();
        let expected = map.tile(1).unwrap().screen_to_geo(dvec2(300.0, 300.0), true).unwrap();
        assert!((at.lat - expected.lat).abs() < 1e-9);
        assert!((at.long - expected.long).abs() < 1e-9);
    }

    // ==================== marker tests ====================

    #[test]
    fn markers_deduplicate_and_render_per_tile() {
        let mut map = ready_row(2);
        let passes = map.document().render_passes();
        assert!(map.add_marker(Marker::at(LatLong::new(0.0, 0.0)).with_id("origin")));
        assert!(!map.add_marker(Marker::at(LatLong::new(0.0, 0.0)).with_id("origin")));
        assert_eq!(map.markers().len(), 1);
        assert_eq!(map.document().render_passes(), passes + 2);

        let drawn = map.document().rendered(1);
        assert_eq!(drawn.len(), 1);
        assert!(drawn[0].point.abs_diff_eq(dvec2(100.0, 100.0), 1e-9));
        assert_eq!(drawn[0].id.as_deref(), Some("origin"));
    }

    #[test]
    fn markers_wait_for_ready() {
        let mut map = CompositeMap::new(MemoryDocument::row(200.0, 1));
        let pending = map.expect_tiles(1);
        map.add_marker(Marker::at(LatLong::new(10.0, 10.0)));
        assert_eq!(map.document().render_passes(), 0);
        for tile in pending {
            map.complete_tile(&tile, engine("equirectangular", 200.0)).unwrap();
        }
        assert_eq!(map.document().rendered(0).len(), 1);
    }

    #[test]
    fn remove_markers_redraws_only_on_change() {
        let mut map = ready_row(1);
        map.add_marker(Marker::at(LatLong::new(1.0, 2.0)).with_id("a"));
        map.add_marker(Marker::at(LatLong::new(3.0, 4.0)).with_id("b"));
        let passes = map.document().render_passes();
        assert_eq!(map.remove_markers(|m| m.id.as_deref() == Some("zzz")), 0);
        assert_eq!(map.document().render_passes(), passes);
        assert_eq!(map.remove_markers(|m| m.id.as_deref() == Some("a")), 1);
        assert_eq!(map.document().render_passes(), passes + 1);
        assert!(map.marker_by_id("a").is_none());
        assert!(map.marker_by_id("b").is_some());
    }

    #[test]
    fn marker_spaces_resolve_per_tile() {
        let map = ready_row(2);
        let local = Marker::new(MarkerPosition::TileLocal {
            tile: 0,
            point: dvec2(50.0, 60.0),
        });
        assert_eq!(map.resolve_marker(&local, 0), Ok(dvec2(50.0, 60.0)));
        let on_other = map.resolve_marker(&local, 1).unwrap();
        assert!(on_other.abs_diff_eq(dvec2(50.0, 60.0), 1e-9));

        let global = Marker::new(MarkerPosition::ScreenGlobal(dvec2(250.0, 60.0)));
        assert_eq!(map.resolve_marker(&global, 1), Ok(dvec2(50.0, 60.0)));
        let via_geo = map.resolve_marker(&global, 0).unwrap();
        assert!(via_geo.abs_diff_eq(dvec2(50.0, 60.0), 1e-9));

        assert_eq!(
            map.resolve_marker(&global, 7),
            Err(QueryError::UnknownTile { index: 7 })
        );
    }
}
