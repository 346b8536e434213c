//! One rendered projection tile
//!
//! A tile pairs a fitted projection engine with the presentation transform it
//! was drawn with and its box in the host document. Tile-local coordinates
//! have (0, 0) at the tile's top-left corner; global coordinates are document
//! pixels.

use glam::{DVec2, dvec2};

use crate::errors::QueryError;
use crate::presentation::PresentationTransform;
use crate::projection::GeoProjectionEngine;
use crate::types::{LatLong, Rect};

/// Where `geo_to_screen` wraps its result
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Constrain {
    #[default]
    Unbounded,
    /// The tile's own box, applied in tile-local space
    Tile,
    /// A container box in document coordinates
    Container(Rect),
}

/// Wrap `point` into `bounds` axis by axis.
///
/// Each axis is shifted by whole multiples of the bounds' extent until it
/// lies within `[origin, origin + extent]`; in-range values come back
/// unchanged. An axis of zero extent collapses to the origin. With
/// `zero_origin` the bounds are taken as starting at (0, 0).
pub fn constrain_to_bounds(point: DVec2, bounds: &Rect, zero_origin: bool) -> DVec2 {
    let origin = if zero_origin { DVec2::ZERO } else { bounds.origin() };
    dvec2(
        wrap_axis(point.x, origin.x, bounds.width),
        wrap_axis(point.y, origin.y, bounds.height),
    )
}

fn wrap_axis(value: f64, origin: f64, extent: f64) -> f64 {
    if !(extent > 0.0 && extent.is_finite()) || !value.is_finite() {
        return origin;
    }
    let max = origin + extent;
    let wrapped = if value > max {
        value - ((value - max) / extent).ceil() * extent
    } else if value < origin {
        value + ((origin - value) / extent).ceil() * extent
    } else {
        return value;
    };
    // Rounding in the period arithmetic can land a hair outside
    wrapped.clamp(origin, max)
}

fn finite(point: DVec2) -> Result<DVec2, QueryError> {
    if point.is_finite() {
        Ok(point)
    } else {
        Err(QueryError::NonFinite)
    }
}

/// A projection tile and its place in the document
#[derive(Clone, Debug, PartialEq)]
pub struct TileGeometry {
    index: usize,
    engine: GeoProjectionEngine,
    presentation: PresentationTransform,
    rect: Option<Rect>,
}

impl TileGeometry {
    /// A tile drawn with its kind's catalog layout, not yet laid out
    pub fn new(index: usize, engine: GeoProjectionEngine) -> Self {
        let presentation =
            PresentationTransform::for_kind(&engine.kind().parameters(), engine.tile_size());
        TileGeometry {
            index,
            engine,
            presentation,
            rect: None,
        }
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    pub fn with_presentation(mut self, presentation: PresentationTransform) -> Self {
        self.presentation = presentation;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn engine(&self) -> &GeoProjectionEngine {
        &self.engine
    }

    pub fn presentation(&self) -> &PresentationTransform {
        &self.presentation
    }

    /// The tile's box in document coordinates, once laid out
    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    pub fn is_laid_out(&self) -> bool {
        self.rect.is_some()
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = Some(rect);
    }

    pub fn set_presentation(&mut self, presentation: PresentationTransform) {
        self.presentation = presentation;
    }

    fn laid_out(&self) -> Result<Rect, QueryError> {
        self.rect
            .ok_or(QueryError::TileNotLaidOut { index: self.index })
    }

    /// Tile-local bounds: the laid-out size, or the engine's square
    fn local_bounds(&self) -> Rect {
        match self.rect {
            Some(rect) => Rect::sized(rect.size()),
            None => Rect::sized(DVec2::splat(self.engine.tile_size().px())),
        }
    }

    pub fn local_to_global(&self, point: DVec2) -> Result<DVec2, QueryError> {
        Ok(point + self.laid_out()?.origin())
    }

    pub fn global_to_local(&self, point: DVec2) -> Result<DVec2, QueryError> {
        Ok(point - self.laid_out()?.origin())
    }

    /// Geographic position to screen pixels.
    ///
    /// Projects, undoes the presentation transform so the point lands where
    /// the tile actually drew it, then optionally moves to document space and
    /// wraps into `constrain`.
    pub fn geo_to_screen(
        &self,
        at: LatLong,
        global: bool,
        constrain: Constrain,
    ) -> Result<DVec2, QueryError> {
        let projected = finite(self.engine.forward(at))?;
        let mut local = self.presentation.apply(projected, true);
        if constrain == Constrain::Tile {
            local = constrain_to_bounds(local, &self.local_bounds(), true);
        }

        let point = match constrain {
            Constrain::Container(container) => {
                let wrapped = constrain_to_bounds(self.local_to_global(local)?, &container, false);
                if global {
                    wrapped
                } else {
                    self.global_to_local(wrapped)?
                }
            }
            _ if global => self.local_to_global(local)?,
            _ => local,
        };
        finite(point)
    }

    /// Screen pixels back to a normalized geographic position
    pub fn screen_to_geo(&self, point: DVec2, global: bool) -> Result<LatLong, QueryError> {
        let local = if global {
            self.global_to_local(point)?
        } else {
            point
        };
        let projected = self.presentation.apply(local, false);
        let at = self.engine.inverse(projected);
        if at.is_finite() {
            Ok(at)
        } else {
            Err(QueryError::NonFinite)
        }
    }

    /// Inclusive containment in the tile's box
    pub fn contains_point(&self, point: DVec2, global: bool) -> bool {
        if global {
            self.rect.is_some_and(|r| r.contains(point))
        } else {
            self.local_bounds().contains(point)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProjectionKind;
    use crate::projection::ReferenceOutline;
    use crate::projection::raw::Equirectangular;

    const EPSILON: f64 = 1e-9;

    fn assert_point_close(actual: DVec2, expected: DVec2) {
        assert!(
            actual.abs_diff_eq(expected, EPSILON),
            "{:?} != {:?}",
            actual,
            expected
        );
    }

    fn equirect_tile(size: f64) -> TileGeometry {
        let kind = ProjectionKind::new("equirectangular", Equirectangular);
        let engine =
            GeoProjectionEngine::create(&kind, size, &ReferenceOutline::full_domain()).unwrap();
        TileGeometry::new(0, engine)
    }

    // ==================== constrain_to_bounds tests ====================

    #[test]
    fn constrain_keeps_in_bounds_point() {
        let bounds = Rect::new(100.0, 50.0, 400.0, 200.0);
        let p = dvec2(123.456, 249.999);
        assert_eq!(constrain_to_bounds(p, &bounds, false), p);
        assert_eq!(constrain_to_bounds(dvec2(500.0, 50.0), &bounds, false), dvec2(500.0, 50.0));
    }

    #[test]
    fn constrain_wraps_by_whole_extents() {
        let bounds = Rect::new(100.0, 50.0, 400.0, 200.0);
        assert_eq!(constrain_to_bounds(dvec2(550.0, 300.0), &bounds, false), dvec2(150.0, 100.0));
        assert_eq!(constrain_to_bounds(dvec2(50.0, 0.0), &bounds, false), dvec2(450.0, 200.0));
        // Many periods away
        assert_eq!(
            constrain_to_bounds(dvec2(100.0 + 4000.0 + 25.0, 50.0 - 2000.0 + 10.0), &bounds, false),
            dvec2(125.0, 60.0)
        );
    }

    #[test]
    fn constrain_zero_extent_collapses_to_origin() {
        let bounds = Rect::new(10.0, 20.0, 0.0, 100.0);
        assert_eq!(constrain_to_bounds(dvec2(99.0, 70.0), &bounds, false), dvec2(10.0, 70.0));
    }

    #[test]
    fn constrain_zero_origin() {
        let bounds = Rect::new(200.0, 0.0, 200.0, 200.0);
        assert_eq!(constrain_to_bounds(dvec2(250.0, 10.0), &bounds, true), dvec2(50.0, 10.0));
    }

    #[test]
    fn constrain_result_always_in_bounds() {
        let bounds = Rect::new(-30.0, 12.5, 97.0, 41.0);
        for i in -50..50 {
            let p = dvec2(i as f64 * 37.3, i as f64 * -19.9);
            let c = constrain_to_bounds(p, &bounds, false);
            assert!(c.x >= bounds.left && c.x <= bounds.left + bounds.width);
            assert!(c.y >= bounds.top && c.y <= bounds.top + bounds.height);
        }
    }

    // ==================== conversion tests ====================

    #[test]
    fn local_global_round_trip() {
        let tile = equirect_tile(200.0).with_rect(Rect::new(200.0, 10.0, 200.0, 200.0));
        let g = tile.local_to_global(dvec2(5.0, 6.0)).unwrap();
        assert_eq!(g, dvec2(205.0, 16.0));
        assert_eq!(tile.global_to_local(g).unwrap(), dvec2(5.0, 6.0));
    }

    #[test]
    fn global_needs_layout() {
        let tile = equirect_tile(200.0);
        assert_eq!(
            tile.local_to_global(DVec2::ZERO),
            Err(QueryError::TileNotLaidOut { index: 0 })
        );
        assert!(tile.geo_to_screen(LatLong::new(0.0, 0.0), false, Constrain::Unbounded).is_ok());
        assert!(!tile.contains_point(dvec2(1.0, 1.0), true));
        assert!(tile.contains_point(dvec2(1.0, 1.0), false));
    }

    #[test]
    fn geo_to_screen_global() {
        let tile = equirect_tile(200.0).with_rect(Rect::new(200.0, 0.0, 200.0, 200.0));
        let p = tile
            .geo_to_screen(LatLong::new(0.0, 0.0), true, Constrain::Unbounded)
            .unwrap();
        assert_point_close(p, dvec2(300.0, 100.0));
    }

    #[test]
    fn geo_to_screen_undoes_presentation() {
        let tile = equirect_tile(200.0)
            .with_rect(Rect::new(0.0, 0.0, 200.0, 200.0))
            .with_presentation(PresentationTransform::new(0.0, dvec2(20.0, 0.0), dvec2(100.0, 100.0)));
        let p = tile
            .geo_to_screen(LatLong::new(0.0, 0.0), false, Constrain::Unbounded)
            .unwrap();
        assert_point_close(p, dvec2(120.0, 100.0));
        let back = tile.screen_to_geo(p, false).unwrap();
        assert!(back.lat.abs() < EPSILON && back.long.abs() < EPSILON);
    }

    #[test]
    fn geo_to_screen_wraps_into_tile() {
        let tile = equirect_tile(200.0)
            .with_rect(Rect::new(0.0, 0.0, 200.0, 200.0))
            .with_presentation(PresentationTransform::new(0.0, dvec2(150.0, 0.0), dvec2(100.0, 100.0)));
        let p = tile
            .geo_to_screen(LatLong::new(0.0, 0.0), false, Constrain::Tile)
            .unwrap();
        assert_point_close(p, dvec2(50.0, 100.0));
    }

    #[test]
    fn geo_to_screen_wraps_into_container() {
        let tile = equirect_tile(200.0)
            .with_rect(Rect::new(200.0, 0.0, 200.0, 200.0))
            .with_presentation(PresentationTransform::new(0.0, dvec2(250.0, 0.0), dvec2(100.0, 100.0)));
        let container = Rect::new(0.0, 0.0, 400.0, 200.0);
        let p = tile
            .geo_to_screen(LatLong::new(0.0, 0.0), true, Constrain::Container(container))
            .unwrap();
        // 200 + 100 + 250 = 550 wraps to 150
        assert_point_close(p, dvec2(150.0, 100.0));
        let local = tile
            .geo_to_screen(LatLong::new(0.0, 0.0), false, Constrain::Container(container))
            .unwrap();
        assert_point_close(local, dvec2(-50.0, 100.0));
    }

    #[test]
    fn screen_to_geo_global() {
        let tile = equirect_tile(400.0).with_rect(Rect::new(400.0, 0.0, 400.0, 400.0));
        let at = tile.screen_to_geo(dvec2(600.0, 0.0), true).unwrap();
        assert!((at.lat - 90.0).abs() < EPSILON);
    }
}
