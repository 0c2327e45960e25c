// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time iteration.  A point `c` of the complex plane is fed
//! through `z -> z² + c` until the orbit leaves the circle of radius
//! two around the origin or an iteration cap is reached.  Reaching the
//! cap means the point is presumed to be inside the Mandelbrot set.
use num::Complex;

/// Squared escape radius.  Comparing squared magnitudes avoids a
/// square root per step.
const ESCAPE_RADIUS_SQR: f64 = 4.0;

/// Counts how long an orbit survives, up to `max_iterations`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EscapeTimeIterator {
    max_iterations: u32,
}

impl EscapeTimeIterator {
    /// Constructor.  A cap of zero is accepted and makes every point
    /// escape immediately.
    pub fn new(max_iterations: u32) -> Self {
        EscapeTimeIterator { max_iterations }
    }

    /// The iteration cap.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Replaces the iteration cap for subsequent calls.
    pub fn set_max_iterations(&mut self, max_iterations: u32) {
        self.max_iterations = max_iterations;
    }

    /// Iterates `z -> z² + c` starting from `z = seed` and returns the
    /// number of steps taken before `|z|` reached 2, or
    /// `max_iterations` if it never did.  The Mandelbrot set always
    /// seeds with zero; other seeds give Julia-style variants.
    ///
    /// Orbits that overflow to NaN fail the magnitude test and stop
    /// there; that only happens past the precision of `f64`.
    pub fn iterate(&self, c: Complex<f64>, seed: Complex<f64>) -> u32 {
        let (mut re, mut im) = (seed.re, seed.im);
        let mut count = 0;
        while re * re + im * im < ESCAPE_RADIUS_SQR && count < self.max_iterations {
            let next_re = re * re - im * im + c.re;
            let next_im = 2.0 * re * im + c.im;
            re = next_re;
            im = next_im;
            count += 1;
        }
        count
    }

    /// The Mandelbrot escape time of `c`: `iterate` seeded at the origin.
    pub fn escape_time(&self, c: Complex<f64>) -> u32 {
        self.iterate(c, Complex::new(0.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    fn origin() -> Complex<f64> {
        Complex::new(0.0, 0.0)
    }

    #[test]
    fn origin_never_escapes() {
        for &cap in &[0, 1, 2, 128, 10_000] {
            let it = EscapeTimeIterator::new(cap);
            assert_eq!(it.iterate(origin(), origin()), cap);
        }
    }

    #[test]
    fn far_point_escapes_after_one_step() {
        let it = EscapeTimeIterator::new(128);
        assert_eq!(it.escape_time(Complex::new(3.0, 0.0)), 1);
        assert_eq!(it.escape_time(Complex::new(0.0, -2.5)), 1);
    }

    #[test]
    fn seed_outside_radius_escapes_at_zero() {
        let it = EscapeTimeIterator::new(128);
        assert_eq!(it.iterate(origin(), Complex::new(2.0, 0.0)), 0);
        assert_eq!(it.iterate(origin(), Complex::new(1.5, 1.5)), 0);
    }

    #[test]
    fn zero_cap_escapes_immediately() {
        let it = EscapeTimeIterator::new(0);
        assert_eq!(it.escape_time(Complex::new(-1.0, 0.0)), 0);
        assert_eq!(it.escape_time(Complex::new(3.0, 3.0)), 0);
    }

    #[test]
    fn known_escape_times() {
        let it = EscapeTimeIterator::new(100);
        // 0, 1, 2: |2|² is not below 4.
        assert_eq!(it.escape_time(Complex::new(1.0, 0.0)), 2);
        // -1 cycles between 0 and -1.
        assert_eq!(it.escape_time(Complex::new(-1.0, 0.0)), 100);
        // -2 lands on the escape radius after one step.
        assert_eq!(it.escape_time(Complex::new(-2.0, 0.0)), 1);
    }

    #[test]
    fn periodic_orbit_of_i_is_bounded() {
        // 0 -> i -> -1+i -> -i -> -1+i ...
        let it = EscapeTimeIterator::new(500);
        assert_eq!(it.escape_time(Complex::new(0.0, 1.0)), 500);
    }

    #[test]
    fn imaginary_part_uses_previous_real_part() {
        // (1+i)² = 2i escapes.  Squaring with the already-updated real
        // part would land on 0 and never leave.
        let it = EscapeTimeIterator::new(10);
        assert_eq!(it.iterate(origin(), Complex::new(1.0, 1.0)), 1);
    }

    #[test]
    fn nan_orbits_stop_at_zero() {
        let it = EscapeTimeIterator::new(64);
        assert_eq!(it.iterate(origin(), Complex::new(std::f64::NAN, 0.0)), 0);
    }

    #[test]
    fn cap_can_change_between_calls() {
        let mut it = EscapeTimeIterator::new(10);
        let inside = Complex::new(-0.1, 0.1);
        assert_eq!(it.escape_time(inside), 10);
        it.set_max_iterations(250);
        assert_eq!(it.max_iterations(), 250);
        assert_eq!(it.escape_time(inside), 250);
    }

    #[test]
    fn never_exceeds_cap() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let it = EscapeTimeIterator::new(64);
        for _ in 0..1_000 {
            let c = Complex::new(rng.gen_range(-2.5, 1.5), rng.gen_range(-2.0, 2.0));
            let count = it.escape_time(c);
            assert!(count <= 64);
            assert_eq!(count, it.escape_time(c));
        }
    }
}
