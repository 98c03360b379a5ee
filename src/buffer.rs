use crate::{
    components::DataType,
    errors::{Result, RusterzoneError},
};

/// Owned row-major cell storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer<T, const ND: usize> {
    data: Box<[T]>,
    shape: [usize; ND],
}

impl<T: DataType> Buffer<T, 2> {
    /// Buffer of shape `[height, width]` with every cell set to `value`.
    pub fn filled(shape: [usize; 2], value: T) -> Self {
        Self {
            data: vec![value; shape.iter().product()].into_boxed_slice(),
            shape,
        }
    }

    pub fn from_parts(data: Box<[T]>, shape: [usize; 2]) -> Result<Self> {
        if data.len() != shape.iter().product::<usize>() {
            return Err(RusterzoneError::Shape {
                width: shape[1],
                height: shape[0],
                found: data.len(),
            });
        }
        Ok(Self { data, shape })
    }

    /// Row `row` as a slice of `shape[1]` cells.
    pub fn row(&self, row: usize) -> &[T] {
        let width = self.shape[1];
        &self.data[row * width..(row + 1) * width]
    }
}

impl<T, const ND: usize> Buffer<T, ND> {
    pub fn as_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn shape(&self) -> [usize; ND] {
        self.shape
    }
}

impl<T, const ND: usize> AsRef<[T]> for Buffer<T, ND> {
    fn as_ref(&self) -> &[T] {
        &self.data
    }
}
