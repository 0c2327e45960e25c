// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Raster passes.  A pass takes an immutable snapshot of the viewport,
//! the iteration cap and the contrast, computes one colour per pixel
//! and hands each to a sink in row-major order, top row first, left to
//! right within a row.  Sinks that paint as they go rely on that order,
//! so the threaded pass buffers whole rows and flushes them in order.

use crossbeam::thread::ScopedJoinHandle;
use itertools::iproduct;
use log::{debug, info, trace};
use num::Complex;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::color::{ColorMapper, PixelColor};
use crate::errors::{RenderError, ViewportError};
use crate::escape::EscapeTimeIterator;
use crate::viewport::{ComplexViewport, DeviceSize, Pixel};

type RowQueue = Arc<Mutex<Range<usize>>>;

/// Receives the colour of every pixel of a pass, exactly once each.
pub trait RasterSink {
    /// Records the colour of one pixel.
    fn put(&mut self, pixel: Pixel, color: PixelColor);
}

impl<F> RasterSink for F
where
    F: FnMut(Pixel, PixelColor),
{
    fn put(&mut self, pixel: Pixel, color: PixelColor) {
        self(pixel, color)
    }
}

/// A row-major buffer of colours, one per pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    device: DeviceSize,
    pixels: Vec<PixelColor>,
}

impl Raster {
    /// A black raster of the given size.
    pub fn new(device: DeviceSize) -> Self {
        Raster {
            device,
            pixels: vec![PixelColor::black(); device.width * device.height],
        }
    }

    /// The size of the raster.
    pub fn device(&self) -> DeviceSize {
        self.device
    }

    /// The colour at a pixel, if the pixel is on the raster.
    pub fn get(&self, pixel: Pixel) -> Option<PixelColor> {
        self.offset(pixel).map(|offset| self.pixels[offset])
    }

    /// All colours, row-major.
    pub fn pixels(&self) -> &[PixelColor] {
        &self.pixels
    }

    /// Packs the raster as interleaved 8-bit RGB, row-major, which is
    /// the layout image encoders expect.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for c in &self.pixels {
            bytes.extend_from_slice(&[c.red, c.green, c.blue]);
        }
        bytes
    }

    fn offset(&self, pixel: Pixel) -> Option<usize> {
        if pixel.0 >= self.device.width || pixel.1 >= self.device.height {
            return None;
        }
        Some(pixel.1 * self.device.width + pixel.0)
    }
}

impl RasterSink for Raster {
    fn put(&mut self, pixel: Pixel, color: PixelColor) {
        if let Some(offset) = self.offset(pixel) {
            self.pixels[offset] = color;
        }
    }
}

/// Everything a pass reads, frozen for its duration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// The region to render.
    pub viewport: ComplexViewport,
    /// The escape-time iteration and its cap.
    pub iterator: EscapeTimeIterator,
    /// The contrast used for colouring.
    pub colors: ColorMapper,
}

impl RenderSettings {
    /// The colour of a single pixel.
    pub fn color_at(&self, pixel: Pixel) -> PixelColor {
        let c = self.viewport.pixel_to_point(pixel);
        self.colors.color_for(self.iterator.escape_time(c))
    }

    fn render_row(&self, row: usize) -> Vec<PixelColor> {
        (0..self.viewport.device().width)
            .map(|column| self.color_at(Pixel(column, row)))
            .collect()
    }
}

/// A shared flag asking a running pass to stop at the next row.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A flag that has not been raised.
    pub fn new() -> Self {
        CancelFlag::default()
    }

    /// Asks every pass holding a clone of this flag to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether `cancel` has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How a pass ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Every pixel was sent to the sink.
    Finished,
    /// The pass stopped early; the first `rows_completed` rows were
    /// sent to the sink in full and nothing else was.
    Cancelled {
        /// Number of complete rows delivered.
        rows_completed: usize,
    },
}

/// Renders every pixel of the viewport into the sink, row by row.
pub fn render<S: RasterSink + ?Sized>(settings: &RenderSettings, sink: &mut S) {
    render_cancellable(settings, sink, &CancelFlag::new());
}

/// As `render`, but checks `cancel` before each row.
pub fn render_cancellable<S: RasterSink + ?Sized>(
    settings: &RenderSettings,
    sink: &mut S,
    cancel: &CancelFlag,
) -> Outcome {
    let device = settings.viewport.device();
    debug!(
        "rendering {}x{} at {} (extent {}), {} iterations, contrast {}",
        device.width,
        device.height,
        settings.viewport.center(),
        settings.viewport.plane_width(),
        settings.iterator.max_iterations(),
        settings.colors.contrast()
    );

    for (row, column) in iproduct!(0..device.height, 0..device.width) {
        if column == 0 {
            if cancel.is_cancelled() {
                debug!("render cancelled after {} rows", row);
                return Outcome::Cancelled {
                    rows_completed: row,
                };
            }
            trace!("row {}", row);
        }
        let pixel = Pixel(column, row);
        sink.put(pixel, settings.color_at(pixel));
    }
    Outcome::Finished
}

/// Computes the viewport into a fresh raster.
pub fn render_to_raster(settings: &RenderSettings) -> Raster {
    let mut raster = Raster::new(settings.viewport.device());
    render(settings, &mut raster);
    raster
}

/// A multi-threaded pass.  Workers take rows from a shared queue and
/// buffer them; once they are joined the rows go to the sink in order,
/// so the sink sees exactly what `render` would have produced.  After
/// a cancel, only the unbroken run of finished rows from the top is
/// delivered.
pub fn render_parallel<S: RasterSink + ?Sized>(
    settings: &RenderSettings,
    sink: &mut S,
    threads: usize,
    cancel: &CancelFlag,
) -> Result<Outcome, RenderError> {
    let device = settings.viewport.device();
    let threads = threads.max(1);
    debug!(
        "rendering {}x{} at {} on {} threads, {} iterations, contrast {}",
        device.width,
        device.height,
        settings.viewport.center(),
        threads,
        settings.iterator.max_iterations(),
        settings.colors.contrast()
    );

    let rows = compute_rows(settings, threads, cancel, &|_: usize| ())?;
    let delivered = flush_in_order(rows, sink);

    if delivered == device.height {
        Ok(Outcome::Finished)
    } else {
        debug!("render cancelled after {} rows", delivered);
        Ok(Outcome::Cancelled {
            rows_completed: delivered,
        })
    }
}

// Workers pull row numbers from a shared queue until it runs dry or
// the pass is cancelled.  `on_row` sees each row number once the row
// is computed.  Rows come back in no particular order.
fn compute_rows(
    settings: &RenderSettings,
    threads: usize,
    cancel: &CancelFlag,
    on_row: &(dyn Fn(usize) + Sync),
) -> Result<Vec<(usize, Vec<PixelColor>)>, RenderError> {
    let queue: RowQueue = Arc::new(Mutex::new(0..settings.viewport.device().height));
    let rows = crossbeam::scope(|spawner| {
        let handles: Vec<ScopedJoinHandle<Vec<(usize, Vec<PixelColor>)>>> = (0..threads)
            .map(|_| {
                let queue = queue.clone();
                spawner.spawn(move |_| {
                    let mut done = vec![];
                    while !cancel.is_cancelled() {
                        let row = match queue.lock() {
                            Ok(mut queue) => queue.next(),
                            Err(_) => None,
                        };
                        match row {
                            Some(row) => {
                                done.push((row, settings.render_row(row)));
                                trace!("row {} done", row);
                                on_row(row);
                            }
                            None => break,
                        }
                    }
                    done
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Result<Vec<_>, _>>()
    })
    .map_err(|_| RenderError::WorkerPanicked)?
    .map_err(|_| RenderError::WorkerPanicked)?
    .into_iter()
    .flatten()
    .collect();
    Ok(rows)
}

// Sends rows to the sink from the top down, stopping at the first
// missing row.  Returns the number of rows delivered.
fn flush_in_order<S: RasterSink + ?Sized>(
    mut rows: Vec<(usize, Vec<PixelColor>)>,
    sink: &mut S,
) -> usize {
    rows.sort_by_key(|&(row, _)| row);
    let mut delivered = 0;
    for (row, colors) in rows {
        if row != delivered {
            break;
        }
        for (column, color) in colors.into_iter().enumerate() {
            sink.put(Pixel(column, row), color);
        }
        delivered += 1;
    }
    delivered
}

/// The explorer's state: the current viewport, iteration cap and
/// contrast, plus the cancel flag of the most recent pass.  Control
/// inputs change the state and cancel that pass; passes themselves
/// only ever see snapshots.
#[derive(Debug)]
pub struct FractalRenderer {
    viewport: ComplexViewport,
    iterator: EscapeTimeIterator,
    colors: ColorMapper,
    in_flight: CancelFlag,
}

impl FractalRenderer {
    /// Starts on the canonical view of a raster of the given size.
    pub fn new(
        device: DeviceSize,
        max_iterations: u32,
        contrast: i32,
    ) -> Result<Self, ViewportError> {
        Ok(FractalRenderer {
            viewport: ComplexViewport::canonical(device)?,
            iterator: EscapeTimeIterator::new(max_iterations),
            colors: ColorMapper::new(contrast),
            in_flight: CancelFlag::new(),
        })
    }

    /// The viewport the next pass will render.
    pub fn viewport(&self) -> ComplexViewport {
        self.viewport
    }

    /// Changes the iteration cap for the next pass.
    pub fn set_max_iterations(&mut self, max_iterations: u32) {
        self.in_flight.cancel();
        self.iterator.set_max_iterations(max_iterations);
    }

    /// Changes the contrast for the next pass.
    pub fn set_contrast(&mut self, contrast: i32) {
        self.in_flight.cancel();
        self.colors.set_contrast(contrast);
    }

    /// Replaces the viewport with one of extent `4 / zoom_factor`
    /// centred on `focus`.  On error the viewport is unchanged.
    pub fn zoom_into(
        &mut self,
        focus: Complex<f64>,
        zoom_factor: f64,
    ) -> Result<(), ViewportError> {
        let zoomed = self.viewport.zoom_into(focus, zoom_factor)?;
        self.in_flight.cancel();
        info!("zoom x{} into {}", zoom_factor, focus);
        self.viewport = zoomed;
        Ok(())
    }

    /// Goes back to the canonical view.  There is no zoom history.
    pub fn restart(&mut self) {
        self.in_flight.cancel();
        info!("restart at canonical view");
        // The device size was valid when the renderer was built.
        self.viewport = ComplexViewport::canonical(self.viewport.device())
            .unwrap_or(self.viewport);
    }

    /// A copy of the current state for one pass.
    pub fn snapshot(&self) -> RenderSettings {
        RenderSettings {
            viewport: self.viewport,
            iterator: self.iterator,
            colors: self.colors,
        }
    }

    /// Cancels whatever pass is running and hands out the snapshot and
    /// cancel flag for the next one.
    pub fn start_pass(&mut self) -> (RenderSettings, CancelFlag) {
        self.in_flight.cancel();
        self.in_flight = CancelFlag::new();
        (self.snapshot(), self.in_flight.clone())
    }

    /// Renders the current viewport into the sink.
    pub fn draw<S: RasterSink + ?Sized>(&mut self, sink: &mut S) -> Outcome {
        let (settings, cancel) = self.start_pass();
        render_cancellable(&settings, sink, &cancel)
    }

    /// Restarts, then renders the canonical view into the sink.
    pub fn draw_fractal<S: RasterSink + ?Sized>(&mut self, sink: &mut S) -> Outcome {
        self.restart();
        self.draw(sink)
    }
}
