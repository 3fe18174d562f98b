//! Fixed-width lanes of f64 values.
//! Each row of the dynamic programming is processed `LANES` template columns at a time,
//! and the remaining columns are processed one by one with the scalar implementation.
//! Both implementations run the very same per-cell formulas, as these formulas are written
//! generically over the `Lane` trait. Thus, the vectorized path and the scalar path give identical values.
use std::ops::{Add, Mul, Sub};

/// Number of lanes of the vector type.
pub const LANES: usize = 4;

pub trait Lane: Copy + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> {
    /// Number of values packed into this type.
    const WIDTH: usize;
    /// Create a vector with the same value in all lanes.
    fn splat(value: f64) -> Self;
    /// Read `WIDTH` values from the head of `xs`.
    fn load(xs: &[f64]) -> Self;
    /// Write `WIDTH` values into the head of `xs`.
    fn store(self, xs: &mut [f64]);
    /// Lane-wise maximum.
    fn max(self, other: Self) -> Self;
    /// Sum of all the lanes.
    fn sum(self) -> f64;
}

impl Lane for f64 {
    const WIDTH: usize = 1;
    #[inline]
    fn splat(value: f64) -> Self {
        value
    }
    #[inline]
    fn load(xs: &[f64]) -> Self {
        xs[0]
    }
    #[inline]
    fn store(self, xs: &mut [f64]) {
        xs[0] = self;
    }
    #[inline]
    fn max(self, other: Self) -> Self {
        f64::max(self, other)
    }
    #[inline]
    fn sum(self) -> f64 {
        self
    }
}

/// Four f64 lanes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C, align(32))]
pub struct F64x4(pub [f64; LANES]);

impl Add for F64x4 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        let (x, y) = (self.0, rhs.0);
        F64x4([x[0] + y[0], x[1] + y[1], x[2] + y[2], x[3] + y[3]])
    }
}

impl Sub for F64x4 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let (x, y) = (self.0, rhs.0);
        F64x4([x[0] - y[0], x[1] - y[1], x[2] - y[2], x[3] - y[3]])
    }
}

impl Mul for F64x4 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let (x, y) = (self.0, rhs.0);
        F64x4([x[0] * y[0], x[1] * y[1], x[2] * y[2], x[3] * y[3]])
    }
}

impl Lane for F64x4 {
    const WIDTH: usize = LANES;
    #[inline]
    fn splat(value: f64) -> Self {
        F64x4([value; LANES])
    }
    #[inline]
    fn load(xs: &[f64]) -> Self {
        F64x4([xs[0], xs[1], xs[2], xs[3]])
    }
    #[inline]
    fn store(self, xs: &mut [f64]) {
        xs[..LANES].copy_from_slice(&self.0);
    }
    #[inline]
    fn max(self, other: Self) -> Self {
        let (x, y) = (self.0, other.0);
        F64x4([x[0].max(y[0]), x[1].max(y[1]), x[2].max(y[2]), x[3].max(y[3])])
    }
    #[inline]
    fn sum(self) -> f64 {
        let x = self.0;
        (x[0] + x[1]) + (x[2] + x[3])
    }
}

/// A per-cell computation which can run on any lane type.
/// `apply` should process the columns `j..j + V::WIDTH`.
pub trait LaneKernel {
    fn apply<V: Lane>(&mut self, j: usize);
}

/// Run `kernel` on the columns `start..=end`, by `LANES` columns while possible,
/// then column by column.
pub fn sweep<K: LaneKernel>(kernel: &mut K, start: usize, end: usize) {
    if end < start {
        return;
    }
    let mut j = start;
    while j + F64x4::WIDTH <= end + 1 {
        kernel.apply::<F64x4>(j);
        j += F64x4::WIDTH;
    }
    while j <= end {
        kernel.apply::<f64>(j);
        j += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    struct Axpy<'a> {
        xs: &'a [f64],
        ys: &'a [f64],
        out: &'a mut [f64],
        visited: Vec<(usize, usize)>,
    }
    impl<'a> LaneKernel for Axpy<'a> {
        fn apply<V: Lane>(&mut self, j: usize) {
            let x = V::load(&self.xs[j..]);
            let y = V::load(&self.ys[j..]);
            (V::splat(2f64) * x + y - V::splat(1f64)).store(&mut self.out[j..]);
            self.visited.push((j, V::WIDTH));
        }
    }
    #[test]
    fn sweep_covers_every_column() {
        let xs: Vec<_> = (0..16).map(|x| x as f64).collect();
        let ys: Vec<_> = (0..16).map(|x| (x * x) as f64).collect();
        let mut out = vec![0f64; 16];
        let mut kernel = Axpy {
            xs: &xs,
            ys: &ys,
            out: &mut out,
            visited: vec![],
        };
        sweep(&mut kernel, 1, 10);
        assert_eq!(kernel.visited, vec![(1, 4), (5, 4), (9, 1), (10, 1)]);
        for j in 1..=10 {
            assert_eq!(out[j], 2f64 * xs[j] + ys[j] - 1f64);
        }
        assert_eq!(out[0], 0f64);
        assert_eq!(out[11], 0f64);
    }
    #[test]
    fn vector_matches_scalar() {
        let xs = [0.5, -1.5, 3.25, f64::NEG_INFINITY];
        let ys = [1.0, 2.0, -4.0, 0.0];
        let v = F64x4::load(&xs).max(F64x4::load(&ys)) * F64x4::splat(3f64);
        for k in 0..LANES {
            assert_eq!(v.0[k], xs[k].max(ys[k]) * 3f64);
        }
        assert_eq!(F64x4::load(&ys).sum(), ys.iter().sum::<f64>());
    }
}
