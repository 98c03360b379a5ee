use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
    hash::Hash,
};

use num::traits::AsPrimitive;

use crate::components::{DataType, RasterGrid};

/// Class of a classified cell, totally ordered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct ClassValue(f64);

impl ClassValue {
    pub fn of<T: DataType>(value: T) -> Self {
        Self::from(AsPrimitive::<f64>::as_(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for ClassValue {
    fn from(value: f64) -> Self {
        // -0.0 and 0.0 are one class
        Self(value + 0.)
    }
}

impl From<ClassValue> for f64 {
    fn from(value: ClassValue) -> Self {
        value.0
    }
}

impl PartialEq for ClassValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ClassValue {}

impl PartialOrd for ClassValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for ClassValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Display for ClassValue {
    /// Integral classes print without a fractional part.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.fract() == 0. && self.0.abs() < 1e15 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Pixel count per class for one zone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassHistogram(BTreeMap<ClassValue, u64>);

impl ClassHistogram {
    pub fn increment(&mut self, class: ClassValue) {
        *self.0.entry(class).or_default() += 1;
    }

    /// Count of `class`, 0 when absent.
    pub fn count(&self, class: ClassValue) -> u64 {
        self.0.get(&class).copied().unwrap_or_default()
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassValue, u64)> + '_ {
        self.0.iter().map(|(class, count)| (*class, *count))
    }
}

impl FromIterator<(ClassValue, u64)> for ClassHistogram {
    fn from_iter<I: IntoIterator<Item = (ClassValue, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Distinct classes of a whole classified grid, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassSet(BTreeSet<ClassValue>);

impl ClassSet {
    pub fn of_grid<T: DataType>(grid: &RasterGrid<T>) -> Self {
        let width = grid.width().max(1);
        let classes = grid
            .cells()
            .par_chunks(width)
            .fold(BTreeSet::new, |mut classes, row| {
                classes.extend(
                    row.iter()
                        .filter(|value| !grid.is_nodata(**value))
                        .map(|value| ClassValue::of(*value)),
                );
                classes
            })
            .reduce(BTreeSet::new, |mut lhs, mut rhs| {
                lhs.append(&mut rhs);
                lhs
            });
        Self(classes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, class: ClassValue) -> bool {
        self.0.contains(&class)
    }

    pub fn iter(&self) -> impl Iterator<Item = ClassValue> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<ClassValue> for ClassSet {
    fn from_iter<I: IntoIterator<Item = ClassValue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
