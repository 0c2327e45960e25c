//! Contains the ComplexViewport struct, which describes a relationship
//! between a rectangle of device pixels with an origin at the top left,
//! and a rectangle on the complex plane anchored at its top-left
//! corner.  Device rows grow downwards while the imaginary axis grows
//! upwards, so the two are mapped in opposite directions.
use log::warn;
use num::Complex;

use crate::errors::ViewportError;

/// Extent, in complex-plane units, of both axes of the canonical view.
/// Every zoom rescales from this, never from the current view.
pub const BASE_EXTENT: f64 = 4.0;

/// Describes the width and height of the target raster in pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DeviceSize {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl DeviceSize {
    /// Constructor.
    pub fn new(width: usize, height: usize) -> Self {
        DeviceSize { width, height }
    }
}

/// Describes the x, y of a pixel on the raster: x is the column, y is
/// the row, and 0,0 is the top-left corner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pixel(pub usize, pub usize);

/// The visible rectangle of the complex plane and its mapping onto a
/// raster.  Viewports are values: zooming produces a new one and
/// leaves the old one alone.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexViewport {
    min_real: f64,
    max_imaginary: f64,
    plane_width: f64,
    plane_height: f64,
    device: DeviceSize,
    // Complex-plane distance between adjacent columns and rows.
    steps: (f64, f64),
}

impl ComplexViewport {
    /// Constructor.  Takes the top-left corner of the visible region of
    /// the complex plane, its width and height, and the size of the
    /// raster it is mapped onto.
    pub fn new(
        min_real: f64,
        max_imaginary: f64,
        plane_width: f64,
        plane_height: f64,
        device: DeviceSize,
    ) -> Result<ComplexViewport, ViewportError> {
        if device.width == 0 || device.height == 0 {
            return Err(ViewportError::InvalidDevice {
                width: device.width,
                height: device.height,
            });
        }

        if !(plane_width.is_finite() && plane_width > 0.0)
            || !(plane_height.is_finite() && plane_height > 0.0)
        {
            return Err(ViewportError::InvalidExtent {
                width: plane_width,
                height: plane_height,
            });
        }

        if !min_real.is_finite() || !max_imaginary.is_finite() {
            return Err(ViewportError::InvalidOrigin(Complex::new(
                min_real,
                max_imaginary,
            )));
        }

        let steps = (
            plane_width / (device.width as f64),
            plane_height / (device.height as f64),
        );

        Ok(ComplexViewport {
            min_real,
            max_imaginary,
            plane_width,
            plane_height,
            device,
            steps,
        })
    }

    /// The view that shows the whole set: real and imaginary parts
    /// both spanning [-2, 2].
    pub fn canonical(device: DeviceSize) -> Result<ComplexViewport, ViewportError> {
        ComplexViewport::new(-2.0, 2.0, BASE_EXTENT, BASE_EXTENT, device)
    }

    /// Derives the view of extent `4 / zoom_factor` on both axes
    /// centred on `focus`, keeping the raster size.  The current
    /// extents play no part: a factor of 1 always gives back the
    /// canonical scale.
    pub fn zoom_into(
        &self,
        focus: Complex<f64>,
        zoom_factor: f64,
    ) -> Result<ComplexViewport, ViewportError> {
        if !(zoom_factor.is_finite() && zoom_factor > 0.0) {
            return Err(ViewportError::InvalidZoomFactor(zoom_factor));
        }
        if !focus.re.is_finite() || !focus.im.is_finite() {
            return Err(ViewportError::InvalidFocus(focus));
        }

        let plane_width = BASE_EXTENT / zoom_factor;
        let plane_height = BASE_EXTENT / zoom_factor;
        let zoomed = ComplexViewport::new(
            focus.re - plane_width / 2.0,
            focus.im + plane_height / 2.0,
            plane_width,
            plane_height,
            self.device,
        )?;

        if !zoomed.resolves_pixels() {
            warn!(
                "zoom factor {} at {} exceeds f64 resolution; adjacent pixels share coordinates",
                zoom_factor, focus
            );
        }
        Ok(zoomed)
    }

    /// Real-axis coordinate of the left edge.
    pub fn min_real(&self) -> f64 {
        self.min_real
    }

    /// Imaginary-axis coordinate of the top edge.
    pub fn max_imaginary(&self) -> f64 {
        self.max_imaginary
    }

    /// Real-axis extent.
    pub fn plane_width(&self) -> f64 {
        self.plane_width
    }

    /// Imaginary-axis extent.
    pub fn plane_height(&self) -> f64 {
        self.plane_height
    }

    /// Size of the raster.
    pub fn device(&self) -> DeviceSize {
        self.device
    }

    /// The total number of pixels in the raster.
    pub fn len(&self) -> usize {
        self.device.width * self.device.height
    }

    /// Describes whether the raster has no pixels.  A constructed
    /// viewport never does.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The complex number at the middle of the visible rectangle.
    pub fn center(&self) -> Complex<f64> {
        Complex::new(
            self.min_real + self.plane_width / 2.0,
            self.max_imaginary - self.plane_height / 2.0,
        )
    }

    /// Given a pixel on the raster, return the complex number it
    /// samples.  Columns move right along the real axis, rows move
    /// down the imaginary axis.
    pub fn pixel_to_point(&self, pixel: Pixel) -> Complex<f64> {
        Complex::new(
            self.min_real + (pixel.0 as f64) * self.steps.0,
            self.max_imaginary - (pixel.1 as f64) * self.steps.1,
        )
    }

    /// False once a single pixel step is lost in the rounding of the
    /// viewport's corner, i.e. neighbouring pixels would sample the
    /// same complex number.
    pub fn resolves_pixels(&self) -> bool {
        self.min_real + self.steps.0 != self.min_real
            && self.max_imaginary - self.steps.1 != self.max_imaginary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: usize) -> DeviceSize {
        DeviceSize::new(side, side)
    }

    #[test]
    fn viewport_fails_on_empty_device() {
        let vp = ComplexViewport::new(-2.0, 2.0, 4.0, 4.0, DeviceSize::new(0, 4));
        assert_eq!(
            vp,
            Err(ViewportError::InvalidDevice {
                width: 0,
                height: 4
            })
        );
        assert!(ComplexViewport::canonical(DeviceSize::new(4, 0)).is_err());
    }

    #[test]
    fn viewport_fails_on_bad_extent() {
        assert!(ComplexViewport::new(-2.0, 2.0, 0.0, 4.0, square(4)).is_err());
        assert!(ComplexViewport::new(-2.0, 2.0, 4.0, -1.0, square(4)).is_err());
        assert!(ComplexViewport::new(-2.0, 2.0, std::f64::NAN, 4.0, square(4)).is_err());
        assert!(ComplexViewport::new(-2.0, 2.0, std::f64::INFINITY, 4.0, square(4)).is_err());
    }

    #[test]
    fn viewport_fails_on_bad_origin() {
        let vp = ComplexViewport::new(std::f64::NAN, 2.0, 4.0, 4.0, square(4));
        match vp {
            Err(ViewportError::InvalidOrigin(_)) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn canonical_viewport_covers_the_set() {
        let vp = ComplexViewport::canonical(square(600)).unwrap();
        assert_eq!(vp.min_real(), -2.0);
        assert_eq!(vp.max_imaginary(), 2.0);
        assert_eq!(vp.plane_width(), 4.0);
        assert_eq!(vp.plane_height(), 4.0);
        assert_eq!(vp.center(), Complex::new(0.0, 0.0));
        assert_eq!(vp.len(), 360_000);
    }

    #[test]
    fn pixel_to_point_runs_down_the_imaginary_axis() {
        let vp = ComplexViewport::canonical(square(4)).unwrap();
        assert_eq!(vp.pixel_to_point(Pixel(0, 0)), Complex::new(-2.0, 2.0));
        assert_eq!(vp.pixel_to_point(Pixel(2, 2)), Complex::new(0.0, 0.0));
        assert_eq!(vp.pixel_to_point(Pixel(3, 1)), Complex::new(1.0, 1.0));
        assert_eq!(vp.pixel_to_point(Pixel(1, 3)), Complex::new(-1.0, -1.0));
    }

    #[test]
    fn pixel_to_point_on_rectangular_devices() {
        let vp = ComplexViewport::canonical(DeviceSize::new(8, 2)).unwrap();
        assert_eq!(vp.pixel_to_point(Pixel(4, 1)), Complex::new(0.0, 0.0));
        assert_eq!(vp.pixel_to_point(Pixel(7, 0)), Complex::new(1.5, 2.0));
    }

    #[test]
    fn zoom_by_one_reproduces_canonical_extent_at_focus() {
        let vp = ComplexViewport::canonical(square(600)).unwrap();
        let zoomed = vp.zoom_into(Complex::new(0.5, -0.25), 1.0).unwrap();
        assert_eq!(zoomed.plane_width(), 4.0);
        assert_eq!(zoomed.plane_height(), 4.0);
        assert_eq!(zoomed.min_real(), -1.5);
        assert_eq!(zoomed.max_imaginary(), 1.75);
        assert_eq!(zoomed.center(), Complex::new(0.5, -0.25));
        assert_eq!(zoomed.device(), square(600));
    }

    #[test]
    fn zoom_rescales_from_base_not_current_view() {
        let vp = ComplexViewport::canonical(square(100)).unwrap();
        let once = vp.zoom_into(Complex::new(-0.75, 0.25), 4.0).unwrap();
        let twice = once.zoom_into(Complex::new(-0.75, 0.25), 4.0).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.plane_width(), 1.0);
        assert_eq!(twice.min_real(), -1.25);
        assert_eq!(twice.max_imaginary(), 0.75);
    }

    #[test]
    fn zoom_leaves_its_input_alone() {
        let vp = ComplexViewport::canonical(square(10)).unwrap();
        let before = vp;
        let _ = vp.zoom_into(Complex::new(1.0, 1.0), 100.0).unwrap();
        assert_eq!(vp, before);
    }

    #[test]
    fn zoom_rejects_bad_factors() {
        let vp = ComplexViewport::canonical(square(10)).unwrap();
        let origin = Complex::new(0.0, 0.0);
        assert_eq!(
            vp.zoom_into(origin, 0.0),
            Err(ViewportError::InvalidZoomFactor(0.0))
        );
        assert_eq!(
            vp.zoom_into(origin, -2.0),
            Err(ViewportError::InvalidZoomFactor(-2.0))
        );
        assert!(vp.zoom_into(origin, std::f64::NAN).is_err());
        assert!(vp.zoom_into(origin, std::f64::INFINITY).is_err());
        // 4 / 1e-320 overflows the extent.
        assert!(vp.zoom_into(origin, 1e-320).is_err());
    }

    #[test]
    fn zoom_rejects_bad_focus() {
        let vp = ComplexViewport::canonical(square(10)).unwrap();
        let focus = Complex::new(std::f64::NAN, 0.0);
        match vp.zoom_into(focus, 2.0) {
            Err(ViewportError::InvalidFocus(_)) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn extreme_zoom_loses_pixel_resolution() {
        let vp = ComplexViewport::canonical(square(600)).unwrap();
        assert!(vp.resolves_pixels());
        let deep = vp.zoom_into(Complex::new(-0.75, 0.1), 1e17).unwrap();
        assert!(!deep.resolves_pixels());
    }
}
