//! Array dimension descriptors.
//!
//! A frame's dimensions are listed fastest-varying first: dimension 0 is the
//! one whose index changes between adjacent elements of the data buffer.

use smallvec::SmallVec;

/// Maximum number of dimensions a frame may carry.
pub const MAX_DIMS: usize = 10;

/// One axis of an array frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dimension {
    /// Number of elements along this axis.
    pub size: usize,
    /// Offset of the first element relative to the detector origin.
    pub offset: i32,
    /// Binning factor applied by the producer.
    pub binning: i32,
    /// Non-zero if the producer reversed this axis.
    pub reverse: i32,
}

impl Dimension {
    /// Create an axis with no offset, unit binning and no reversal.
    pub const fn new(size: usize) -> Self {
        Self { size, offset: 0, binning: 1, reverse: 0 }
    }

    pub const fn with_offset(mut self, offset: i32) -> Self {
        self.offset = offset;
        self
    }

    pub const fn with_binning(mut self, binning: i32) -> Self {
        self.binning = binning;
        self
    }

    pub const fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse as i32;
        self
    }
}

impl From<usize> for Dimension {
    fn from(size: usize) -> Self {
        Self::new(size)
    }
}

/// Ordered list of frame dimensions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dimensions {
    dims: SmallVec<[Dimension; 4]>,
}

impl Dimensions {
    /// Create from plain sizes.
    pub fn from_sizes(sizes: &[usize]) -> Self {
        Self { dims: sizes.iter().copied().map(Dimension::new).collect() }
    }

    /// Create from full descriptors.
    pub fn from_slice(dims: &[Dimension]) -> Self {
        Self { dims: SmallVec::from_slice(dims) }
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Dimension> {
        self.dims.get(index)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Dimension> + ExactSizeIterator {
        self.dims.iter()
    }

    /// Sizes in frame order (fastest-varying first).
    pub fn sizes(&self) -> SmallVec<[usize; 4]> {
        self.dims.iter().map(|d| d.size).collect()
    }

    /// Sizes in container order (slowest-varying first).
    pub fn reversed_sizes(&self) -> SmallVec<[usize; 4]> {
        self.dims.iter().rev().map(|d| d.size).collect()
    }

    /// Total number of elements. `None` on overflow.
    pub fn num_elements(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, d| acc.checked_mul(d.size))
    }

    pub fn push(&mut self, dim: Dimension) {
        self.dims.push(dim);
    }
}

impl From<Vec<usize>> for Dimensions {
    fn from(v: Vec<usize>) -> Self {
        Self::from_sizes(&v)
    }
}

impl From<&[usize]> for Dimensions {
    fn from(v: &[usize]) -> Self {
        Self::from_sizes(v)
    }
}

impl<const N: usize> From<[usize; N]> for Dimensions {
    fn from(v: [usize; N]) -> Self {
        Self::from_sizes(&v)
    }
}

impl From<Vec<Dimension>> for Dimensions {
    fn from(v: Vec<Dimension>) -> Self {
        Self { dims: SmallVec::from_vec(v) }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, " x ")?;
            }
            write!(f, "{}", d.size)?;
        }
        write!(f, "]")
    }
}
