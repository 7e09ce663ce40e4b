//! # Interpolating B-splines on rectilinear grids
//!
//! Building blocks of the tensor-product spline used by
//! [`ElevationField`](crate::interpolation::ElevationField):
//!
//! * [`SplineAxis`] – knot vector of an interpolating spline of degree `k` over strictly increasing
//!   nodes, with span search and Cox–de Boor basis evaluation.
//! * [`BandedLu`] – LU factorization (no pivoting) of the banded collocation matrix of an axis.
//! * [`TensorSpline`] – coefficients of `f(x, y) = Σ c_ij · B_i(x) · B_j(y)` interpolating a grid.
//!
//! ## Knot placement
//!
//! For `m` nodes `x_0 < … < x_{m-1}` and degree `k`, the knot vector has `m + k + 1` entries:
//! `k + 1` copies of `x_0`, `m - k - 1` interior knots, and `k + 1` copies of `x_{m-1}`.
//! Interior knots sit on the nodes for odd `k` and halfway between nodes for even `k`:
//!
//! ```text
//! odd  k : t[k+1+j] = x[j + (k+1)/2]
//! even k : t[k+1+j] = (x[j + k/2] + x[j + k/2 + 1]) / 2          j = 0 .. m-k-2
//! ```
//!
//! This is the classic "not-a-knot" style placement; it satisfies the Schoenberg–Whitney
//! conditions, so the collocation matrix is totally positive and Gaussian elimination without
//! pivoting is stable.

use crate::constants::MAX_SPLINE_DEGREE;
use crate::horizon_errors::HorizonError;

/// Knot vector of one axis of an interpolating spline.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineAxis {
    degree: usize,
    knots: Vec<f64>,
    n_coef: usize,
}

impl SplineAxis {
    /// Knots of the degree-`degree` spline interpolating at `nodes`.
    ///
    /// Return
    /// ----------
    /// * [`HorizonError::InvalidConfiguration`] if the degree is outside `1..=5`, there are fewer than
    ///   `degree + 1` nodes, or the nodes are not strictly increasing.
    pub fn new(nodes: &[f64], degree: usize) -> Result<Self, HorizonError> {
        if !(1..=MAX_SPLINE_DEGREE).contains(&degree) {
            return Err(HorizonError::InvalidConfiguration(format!(
                "spline degree must lie in 1..={MAX_SPLINE_DEGREE}, got {degree}"
            )));
        }
        let m = nodes.len();
        if m < degree + 1 {
            return Err(HorizonError::InvalidConfiguration(format!(
                "{m} nodes cannot carry a spline of degree {degree}"
            )));
        }
        if nodes.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(HorizonError::InvalidConfiguration(
                "spline nodes must be strictly increasing".into(),
            ));
        }

        let k = degree;
        let mut knots = Vec::with_capacity(m + k + 1);
        knots.extend(std::iter::repeat(nodes[0]).take(k + 1));
        for j in 0..m - k - 1 {
            let t = if k % 2 == 1 {
                nodes[j + (k + 1) / 2]
            } else {
                0.5 * (nodes[j + k / 2] + nodes[j + k / 2 + 1])
            };
            knots.push(t);
        }
        knots.extend(std::iter::repeat(nodes[m - 1]).take(k + 1));

        Ok(SplineAxis {
            degree,
            knots,
            n_coef: m,
        })
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    #[inline]
    pub fn n_coef(&self) -> usize {
        self.n_coef
    }

    #[inline]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Knot span `s` with `t[s] <= x < t[s+1]`, in `degree..n_coef`.
    ///
    /// `x` at or beyond the last knot maps onto the last non-empty span.
    pub fn find_span(&self, x: f64) -> usize {
        let k = self.degree;
        let n = self.n_coef;
        if x >= self.knots[n] {
            return n - 1;
        }
        k + self.knots[k + 1..n].partition_point(|&t| t <= x)
    }

    /// Values of the `degree + 1` basis functions that do not vanish on `span`, at `x`.
    ///
    /// Cox–de Boor triangular recurrence. Entry `r` is `B_{span - degree + r}(x)`.
    pub fn basis(&self, span: usize, x: f64) -> [f64; MAX_SPLINE_DEGREE + 1] {
        let k = self.degree;
        let t = &self.knots;
        let mut n = [0.0; MAX_SPLINE_DEGREE + 1];
        let mut left = [0.0; MAX_SPLINE_DEGREE + 1];
        let mut right = [0.0; MAX_SPLINE_DEGREE + 1];

        n[0] = 1.0;
        for j in 1..=k {
            left[j] = x - t[span + 1 - j];
            right[j] = t[span + j] - x;
            let mut saved = 0.0;
            for r in 0..j {
                let temp = n[r] / (right[r + 1] + left[j - r]);
                n[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            n[j] = saved;
        }
        n
    }

    /// Factorized collocation matrix `A[i][j] = B_j(x_i)`.
    pub fn collocation(&self, nodes: &[f64]) -> Result<BandedLu, HorizonError> {
        let k = self.degree;
        let mut lu = BandedLu::zeros(self.n_coef, k, k);
        for (i, &x) in nodes.iter().enumerate() {
            let span = self.find_span(x);
            let b = self.basis(span, x);
            for (r, &v) in b.iter().take(k + 1).enumerate() {
                lu.set(i, span - k + r, v);
            }
        }
        lu.factorize()?;
        Ok(lu)
    }
}

/// Square band matrix with `kl` sub- and `ku` super-diagonals, factorized in place.
#[derive(Debug, Clone, PartialEq)]
pub struct BandedLu {
    n: usize,
    kl: usize,
    ku: usize,
    /// Row-major band storage, `kl + ku + 1` entries per row.
    band: Vec<f64>,
}

impl BandedLu {
    fn zeros(n: usize, kl: usize, ku: usize) -> Self {
        BandedLu {
            n,
            kl,
            ku,
            band: vec![0.0; n * (kl + ku + 1)],
        }
    }

    #[inline]
    fn idx(&self, i: usize, j: usize) -> usize {
        i * (self.kl + self.ku + 1) + (j + self.kl - i)
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> f64 {
        self.band[self.idx(i, j)]
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, v: f64) {
        let idx = self.idx(i, j);
        self.band[idx] = v;
    }

    fn factorize(&mut self) -> Result<(), HorizonError> {
        for p in 0..self.n {
            let pivot = self.get(p, p);
            if pivot.abs() < f64::MIN_POSITIVE || !pivot.is_finite() {
                return Err(HorizonError::NumericDegeneracy(format!(
                    "singular collocation matrix (pivot {p} = {pivot})"
                )));
            }
            let last_row = (p + self.kl).min(self.n - 1);
            let last_col = (p + self.ku).min(self.n - 1);
            for i in p + 1..=last_row {
                let l = self.get(i, p) / pivot;
                self.set(i, p, l);
                for j in p + 1..=last_col {
                    let v = self.get(i, j) - l * self.get(p, j);
                    self.set(i, j, v);
                }
            }
        }
        Ok(())
    }

    /// Solve `A·x = rhs` in place.
    pub fn solve_in_place(&self, rhs: &mut [f64]) {
        let n = self.n;
        for i in 0..n {
            let mut s = rhs[i];
            for j in i.saturating_sub(self.kl)..i {
                s -= self.get(i, j) * rhs[j];
            }
            rhs[i] = s;
        }
        for i in (0..n).rev() {
            let mut s = rhs[i];
            for j in i + 1..=(i + self.ku).min(n - 1) {
                s -= self.get(i, j) * rhs[j];
            }
            rhs[i] = s / self.get(i, i);
        }
    }
}

/// Tensor-product spline interpolating a rectilinear grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorSpline {
    x_axis: SplineAxis,
    y_axis: SplineAxis,
    /// `coef[a * ny + b]` multiplies `B_a(x) · B_b(y)`.
    coef: Vec<f64>,
}

impl TensorSpline {
    /// Fit the spline through `values` (`values[a * y.len() + b]` at `(x[a], y[b])`).
    ///
    /// Arguments
    /// -----------------
    /// * `x`, `y`: strictly increasing nodes of each axis.
    /// * `values`: samples, `x`-major.
    /// * `degree`: spline degree, shared by both axes.
    pub fn fit(x: &[f64], y: &[f64], values: Vec<f64>, degree: usize) -> Result<Self, HorizonError> {
        let (nx, ny) = (x.len(), y.len());
        if values.len() != nx * ny {
            return Err(HorizonError::InvalidConfiguration(format!(
                "{} samples do not match a {nx}x{ny} grid",
                values.len()
            )));
        }
        let x_axis = SplineAxis::new(x, degree)?;
        let y_axis = SplineAxis::new(y, degree)?;
        let lu_x = x_axis.collocation(x)?;
        let lu_y = y_axis.collocation(y)?;

        let mut coef = values;

        // along y: each x-row is contiguous
        for row in coef.chunks_exact_mut(ny) {
            lu_y.solve_in_place(row);
        }

        // along x: gather each column
        let mut column = vec![0.0; nx];
        for b in 0..ny {
            for (a, c) in column.iter_mut().enumerate() {
                *c = coef[a * ny + b];
            }
            lu_x.solve_in_place(&mut column);
            for (a, c) in column.iter().enumerate() {
                coef[a * ny + b] = *c;
            }
        }

        Ok(TensorSpline {
            x_axis,
            y_axis,
            coef,
        })
    }

    /// Value of the spline at `(x, y)`.
    ///
    /// Points outside the knot range are evaluated with the polynomial piece of the nearest span.
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        let kx = self.x_axis.degree;
        let ky = self.y_axis.degree;
        let ny = self.y_axis.n_coef;

        let sx = self.x_axis.find_span(x);
        let sy = self.y_axis.find_span(y);
        let bx = self.x_axis.basis(sx, x);
        let by = self.y_axis.basis(sy, y);

        let mut acc = 0.0;
        for (r, wx) in bx.iter().take(kx + 1).enumerate() {
            let base = (sx - kx + r) * ny + (sy - ky);
            let row = &self.coef[base..base + ky + 1];
            let inner: f64 = row.iter().zip(by.iter()).map(|(c, wy)| c * wy).sum();
            acc += wx * inner;
        }
        acc
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.x_axis.degree
    }
}
