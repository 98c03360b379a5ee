use geo::{Coord, Rect};
use shrinkwraprs::Shrinkwrap;

use crate::{
    components::transforms::GeoPixelTransform,
    errors::Result,
    intersection::Intersection,
};

/// Bounds in geo space, in raster crs.
#[derive(Shrinkwrap, Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds(Rect);

impl From<Rect> for GeoBounds {
    fn from(value: Rect) -> Self {
        Self(value)
    }
}

/// Pixel bounds of a window over a grid.
///
/// `min` is the top left pixel (col, row), origin at the top left pixel
/// of the raster; `max` is exclusive.
#[derive(Shrinkwrap, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBounds(Rect<usize>);

impl PixelBounds {
    pub fn new(offset: (usize, usize), shape: (usize, usize)) -> Self {
        let offset = Coord::from(offset);
        let max = offset + Coord::from(shape);
        Self(Rect::new(offset, max))
    }

    /// Window of every pixel touched by `bounds`, clipped to a
    /// `width` x `height` grid.
    pub fn covering(
        bounds: &GeoBounds,
        transform: &GeoPixelTransform,
        shape: (usize, usize),
    ) -> Result<Self> {
        let corners = [
            bounds.min(),
            Coord {
                x: bounds.max().x,
                y: bounds.min().y,
            },
            bounds.max(),
            Coord {
                x: bounds.min().x,
                y: bounds.max().y,
            },
        ]
        .map(|coord| transform.apply(coord));
        let pixel_rect = bounding_rect(&corners);
        let pixel_rect = Rect::new(
            Coord {
                x: pixel_rect.min().x.floor(),
                y: pixel_rect.min().y.floor(),
            },
            Coord {
                x: pixel_rect.max().x.ceil(),
                y: pixel_rect.max().y.ceil(),
            },
        );
        let grid_rect = Rect::new(
            Coord { x: 0., y: 0. },
            Coord {
                x: shape.0 as f64,
                y: shape.1 as f64,
            },
        );
        let clipped = Intersection::intersection(&pixel_rect, &grid_rect)?;
        Ok(Self(Rect::new(
            Coord {
                x: clipped.min().x as usize,
                y: clipped.min().y as usize,
            },
            Coord {
                x: clipped.max().x as usize,
                y: clipped.max().y as usize,
            },
        )))
    }

    pub fn cols(&self) -> std::ops::Range<usize> {
        self.0.min().x..self.0.max().x
    }

    pub fn rows(&self) -> std::ops::Range<usize> {
        self.0.min().y..self.0.max().y
    }
}

fn bounding_rect(coords: &[Coord]) -> Rect {
    let (min, max) = coords.iter().skip(1).fold(
        (coords[0], coords[0]),
        |(min, max), coord| {
            (
                Coord {
                    x: min.x.min(coord.x),
                    y: min.y.min(coord.y),
                },
                Coord {
                    x: max.x.max(coord.x),
                    y: max.y.max(coord.y),
                },
            )
        },
    );
    Rect::new(min, max)
}
