#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot explorer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane for
//! which the orbit of zero under `z -> z² + c` stays bounded.  This
//! crate draws it the classic way: every pixel of a raster is mapped to
//! a point of a rectangular viewport, the point is iterated until its
//! orbit leaves the circle of radius two or an iteration cap is hit,
//! and the number of steps it survived, scaled by a contrast factor,
//! picks a colour from a red to blue gradient.  Points that never
//! escape run off the end of the gradient and come out black.
//!
//! Exploring means zooming: a zoom picks a focus point and a factor and
//! shows the square of side `4 / factor` around it.  Every zoom is taken
//! from the full view, so there is nothing to undo; going back is just
//! showing the full view again.

extern crate crossbeam;
extern crate failure;
extern crate itertools;
extern crate log;
extern crate num;

pub mod color;
pub mod errors;
pub mod escape;
pub mod render;
pub mod viewport;

pub use color::{color_for, ColorMapper, Contrast, PixelColor};
pub use errors::{RenderError, ViewportError};
pub use escape::EscapeTimeIterator;
pub use render::{
    render, render_cancellable, render_parallel, render_to_raster, CancelFlag, FractalRenderer,
    Outcome, Raster, RasterSink, RenderSettings,
};
pub use viewport::{ComplexViewport, DeviceSize, Pixel};

/// Raster width of the explorer window.
pub const DEFAULT_WIDTH: usize = 600;

/// Raster height of the explorer window.
pub const DEFAULT_HEIGHT: usize = 600;

/// Iteration cap the explorer starts with.
pub const DEFAULT_ITERATIONS: u32 = 128;
