//! Failure types for viewport construction and raster passes.
use failure::Fail;
use num::Complex;

/// Reasons a viewport could not be built or derived.
#[derive(Debug, Fail, PartialEq)]
pub enum ViewportError {
    /// A raster needs at least one column and one row.
    #[fail(display = "device dimensions must be positive, got {}x{}", width, height)]
    InvalidDevice {
        /// Requested column count.
        width: usize,
        /// Requested row count.
        height: usize,
    },

    /// The visible rectangle must have a finite, positive area.
    #[fail(
        display = "plane extents must be finite and positive, got {} x {}",
        width, height
    )]
    InvalidExtent {
        /// Requested real-axis extent.
        width: f64,
        /// Requested imaginary-axis extent.
        height: f64,
    },

    /// The top-left corner of the viewport was NaN or infinite.
    #[fail(display = "viewport corner must be finite, got {}", _0)]
    InvalidOrigin(Complex<f64>),

    /// Zoom factors must be finite and strictly positive.
    #[fail(display = "zoom factor must be finite and positive, got {}", _0)]
    InvalidZoomFactor(f64),

    /// Zoom focus was NaN or infinite.
    #[fail(display = "zoom focus must be finite, got {}", _0)]
    InvalidFocus(Complex<f64>),
}

/// Reasons a raster pass failed to complete.
#[derive(Debug, Fail, PartialEq)]
pub enum RenderError {
    /// One of the worker threads of a parallel pass panicked.
    #[fail(display = "a render worker panicked")]
    WorkerPanicked,
}
