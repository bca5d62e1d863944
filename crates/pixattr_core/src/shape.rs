//! Image tensor shape metadata.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Shape metadata for image tensors.
///
/// Follows the convention `(B, C, H, W)`:
/// - `B`: Batch size (number of samples)
/// - `C`: Channels
/// - `H`: Height (pixels)
/// - `W`: Width (pixels)
///
/// # Example
///
/// ```rust
/// use pixattr_core::ImageShape;
///
/// let shape = ImageShape::new(32, 3, 28, 28);
/// assert_eq!(shape.batch(), 32);
/// assert_eq!(shape.channels(), 3);
/// assert_eq!(shape.height(), 28);
/// assert_eq!(shape.width(), 28);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageShape {
    batch: usize,
    channels: usize,
    height: usize,
    width: usize,
}

impl ImageShape {
    /// Create a new ImageShape with the specified dimensions.
    ///
    /// # Arguments
    ///
    /// * `batch` - Batch size (number of samples)
    /// * `channels` - Number of channels
    /// * `height` - Image height in pixels
    /// * `width` - Image width in pixels
    #[must_use]
    pub const fn new(batch: usize, channels: usize, height: usize, width: usize) -> Self {
        Self {
            batch,
            channels,
            height,
            width,
        }
    }

    /// Create an ImageShape from a slice of dimensions.
    ///
    /// # Arguments
    ///
    /// * `dims` - A slice containing exactly 4 dimensions: [batch, channels, height, width]
    ///
    /// # Errors
    ///
    /// Returns an error if the slice doesn't contain exactly 4 elements.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixattr_core::ImageShape;
    ///
    /// let shape = ImageShape::from_dims(&[32, 3, 28, 28]).unwrap();
    /// assert_eq!(shape.batch(), 32);
    /// ```
    pub fn from_dims(dims: &[usize]) -> Result<Self> {
        if dims.len() != 4 {
            return Err(CoreError::DimensionError {
                expected: 4,
                got: dims.len(),
            });
        }
        Ok(Self::new(dims[0], dims[1], dims[2], dims[3]))
    }

    /// Get the batch size.
    #[must_use]
    pub const fn batch(&self) -> usize {
        self.batch
    }

    /// Get the number of channels.
    #[must_use]
    pub const fn channels(&self) -> usize {
        self.channels
    }

    /// Get the image height.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Get the image width.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Check if this is an empty shape (any dimension is zero).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.batch == 0 || self.channels == 0 || self.height == 0 || self.width == 0
    }

    /// Get the total number of elements.
    #[must_use]
    pub const fn numel(&self) -> usize {
        self.batch * self.channels * self.height * self.width
    }

    /// Get the number of elements in a single instance (channels * height * width).
    #[must_use]
    pub const fn instance_numel(&self) -> usize {
        self.channels * self.height * self.width
    }

    /// Convert to an array.
    #[must_use]
    pub const fn as_array(&self) -> [usize; 4] {
        [self.batch, self.channels, self.height, self.width]
    }

    /// Create a new shape with a different batch size.
    #[must_use]
    pub const fn with_batch(&self, batch: usize) -> Self {
        Self {
            batch,
            channels: self.channels,
            height: self.height,
            width: self.width,
        }
    }

    /// Check if this shape is compatible with another shape for operations
    /// that require matching channel and spatial dimensions.
    #[must_use]
    pub const fn is_compatible(&self, other: &Self) -> bool {
        self.channels == other.channels
            && self.height == other.height
            && self.width == other.width
    }
}

impl std::fmt::Display for ImageShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(B={}, C={}, H={}, W={})",
            self.batch, self.channels, self.height, self.width
        )
    }
}

impl From<(usize, usize, usize, usize)> for ImageShape {
    fn from((batch, channels, height, width): (usize, usize, usize, usize)) -> Self {
        Self::new(batch, channels, height, width)
    }
}

impl From<[usize; 4]> for ImageShape {
    fn from([batch, channels, height, width]: [usize; 4]) -> Self {
        Self::new(batch, channels, height, width)
    }
}
