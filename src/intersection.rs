use geo::{BooleanOps, Coord, CoordNum, MultiPolygon, Polygon, Rect};

use crate::errors::{Result, RusterzoneError};

pub trait Intersection {
    type Output;
    fn intersection(&self, rhs: &Self) -> Result<Self::Output>;
}

impl<T: CoordNum> Intersection for Rect<T> {
    type Output = Rect<T>;
    fn intersection(&self, rhs: &Self) -> Result<Rect<T>> {
        let lhs_max = self.max();
        let rhs_min = rhs.min();
        if (lhs_max.x < rhs_min.x) | (lhs_max.y < rhs_min.y) {
            return Err(RusterzoneError::NoIntersection);
        }

        let lhs_min = self.min();
        let rhs_max = rhs.max();
        if (lhs_min.x > rhs_max.x) | (lhs_min.y > rhs_max.y) {
            return Err(RusterzoneError::NoIntersection);
        }

        let pick = |x: T, y: T, larger: bool| if (x > y) == larger { x } else { y };
        let min = Coord {
            x: pick(lhs_min.x, rhs_min.x, true),
            y: pick(lhs_min.y, rhs_min.y, true),
        };
        let max = Coord {
            x: pick(lhs_max.x, rhs_max.x, false),
            y: pick(lhs_max.y, rhs_max.y, false),
        };

        Ok(Self::new(min, max))
    }
}

impl Intersection for Polygon {
    type Output = MultiPolygon;
    fn intersection(&self, rhs: &Self) -> Result<MultiPolygon> {
        Ok(<Self as BooleanOps>::intersection(self, rhs))
    }
}
