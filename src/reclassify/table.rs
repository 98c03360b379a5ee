use serde::{Deserialize, Serialize};

use crate::errors::{Result, RusterzoneError};

/// Which range bounds a value may be equal to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RangeBoundaries {
    /// `lower < value <= upper`
    #[default]
    MinExclusiveMaxInclusive,
    /// `lower <= value < upper`
    MinInclusiveMaxExclusive,
    /// `lower <= value <= upper`
    BothInclusive,
    /// `lower < value < upper`
    BothExclusive,
}

impl RangeBoundaries {
    pub fn contains(&self, range: &ClassRange, value: f64) -> bool {
        let above = match self {
            Self::MinInclusiveMaxExclusive | Self::BothInclusive => range.lower <= value,
            Self::MinExclusiveMaxInclusive | Self::BothExclusive => range.lower < value,
        };
        let below = match self {
            Self::MinExclusiveMaxInclusive | Self::BothInclusive => value <= range.upper,
            Self::MinInclusiveMaxExclusive | Self::BothExclusive => value < range.upper,
        };
        above && below
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassRange {
    pub lower: f64,
    pub upper: f64,
    pub class: f64,
}

impl ClassRange {
    pub fn new(lower: f64, upper: f64, class: f64) -> Self {
        Self {
            lower,
            upper,
            class,
        }
    }
}

/// Ordered ranges, the first range containing a value wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ClassRange>", into = "Vec<ClassRange>")]
pub struct RangeTable(Box<[ClassRange]>);

impl TryFrom<Vec<ClassRange>> for RangeTable {
    type Error = RusterzoneError;
    fn try_from(value: Vec<ClassRange>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<RangeTable> for Vec<ClassRange> {
    fn from(value: RangeTable) -> Self {
        value.0.into_vec()
    }
}

impl Default for RangeTable {
    /// Non water (`-1, 0]` -> 0) and water (`0, 1]` -> 1) for NDWI rasters.
    fn default() -> Self {
        Self(Box::new([
            ClassRange::new(-1., 0., 0.),
            ClassRange::new(0., 1., 1.),
        ]))
    }
}

impl RangeTable {
    pub fn new(ranges: Vec<ClassRange>) -> Result<Self> {
        if ranges.is_empty() {
            return Err(RusterzoneError::configuration(
                "range table needs at least one range",
            ));
        }
        for (idx, range) in ranges.iter().enumerate() {
            if range.lower.is_nan() || range.upper.is_nan() {
                return Err(RusterzoneError::configuration(format!(
                    "range {idx} has a NaN bound"
                )));
            }
            if !range.class.is_finite() {
                return Err(RusterzoneError::configuration(format!(
                    "range {idx} has non finite class value {}",
                    range.class
                )));
            }
            if range.lower > range.upper {
                return Err(RusterzoneError::configuration(format!(
                    "range {idx} has lower bound {} above upper bound {}",
                    range.lower, range.upper
                )));
            }
        }
        Ok(Self(ranges.into_boxed_slice()))
    }

    /// Table from `[lower, upper, class, lower, upper, class, ..]`.
    pub fn from_flat(values: &[f64]) -> Result<Self> {
        if values.len() % 3 != 0 {
            return Err(RusterzoneError::configuration(format!(
                "flat range table has {} values, expected triples",
                values.len()
            )));
        }
        Self::new(
            values
                .chunks_exact(3)
                .map(|triple| ClassRange::new(triple[0], triple[1], triple[2]))
                .collect(),
        )
    }

    pub fn ranges(&self) -> &[ClassRange] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Declared class values, in declaration order.
    pub fn classes(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(|range| range.class)
    }

    /// Index of the first range containing `value`.
    pub fn position(&self, value: f64, boundaries: RangeBoundaries) -> Option<usize> {
        self.0
            .iter()
            .position(|range| boundaries.contains(range, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RangeBoundaries::MinExclusiveMaxInclusive, -1., None)]
    #[case(RangeBoundaries::MinExclusiveMaxInclusive, -0.5, Some(0))]
    #[case(RangeBoundaries::MinExclusiveMaxInclusive, 0., Some(0))]
    #[case(RangeBoundaries::MinExclusiveMaxInclusive, 1., Some(1))]
    #[case(RangeBoundaries::MinExclusiveMaxInclusive, 1.5, None)]
    #[case(RangeBoundaries::MinInclusiveMaxExclusive, -1., Some(0))]
    #[case(RangeBoundaries::MinInclusiveMaxExclusive, 0., Some(1))]
    #[case(RangeBoundaries::MinInclusiveMaxExclusive, 1., None)]
    #[case(RangeBoundaries::BothInclusive, 0., Some(0))]
    #[case(RangeBoundaries::BothInclusive, 1., Some(1))]
    #[case(RangeBoundaries::BothExclusive, 0., None)]
    #[case(RangeBoundaries::BothExclusive, 0.25, Some(1))]
    fn first_matching_range(
        #[case] boundaries: RangeBoundaries,
        #[case] value: f64,
        #[case] expected: Option<usize>,
    ) {
        assert_eq!(RangeTable::default().position(value, boundaries), expected);
    }

    #[test]
    fn earlier_overlapping_range_wins() {
        let table = RangeTable::from_flat(&[0., 10., 1., 5., 6., 2.]).unwrap();
        assert_eq!(table.position(5.5, RangeBoundaries::default()), Some(0));
    }

    #[rstest]
    #[case(&[])]
    #[case(&[0., 1.])]
    #[case(&[f64::NAN, 1., 0.])]
    #[case(&[2., 1., 0.])]
    #[case(&[0., 1., f64::INFINITY])]
    fn invalid_tables(#[case] flat: &[f64]) {
        assert!(matches!(
            RangeTable::from_flat(flat),
            Err(RusterzoneError::Configuration(_))
        ));
    }

    #[test]
    fn open_ended_bounds_are_allowed() {
        let table = RangeTable::from_flat(&[f64::NEG_INFINITY, 0., 0., 0., f64::INFINITY, 1.])
            .unwrap();
        assert_eq!(table.position(-1e300, RangeBoundaries::default()), Some(0));
        assert_eq!(table.position(1e300, RangeBoundaries::default()), Some(1));
    }

    #[test]
    fn deserializes_from_triples() {
        let table: RangeTable = serde_json::from_str(
            r#"[{"lower": -1.0, "upper": 0.0, "class": 0.0}, {"lower": 0.0, "upper": 1.0, "class": 1.0}]"#,
        )
        .unwrap();
        assert_eq!(table, RangeTable::default());
        assert!(serde_json::from_str::<RangeTable>("[]").is_err());
    }
}
