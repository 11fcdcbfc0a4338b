//! Regression curves for the scatter plot overlay.
//!
//! The method depends only on the attribute: a few indicators get a fixed
//! polynomial, the rest a LOESS smoother whose bandwidth was tuned per year
//! and stored in the bandwidth table.
//!
//! Both fitters work on mean-centred data and add the means back on output.

use lifespan_types::{
    AttributeKey, BandwidthTable, CountryYearRecord, CurvePoint, RegressionCurve, RegressionMethod,
};
use tracing::{debug, warn};

/// Robustness iterations of the LOESS smoother.
pub const LOESS_ROBUSTNESS_ITERS: usize = 2;

/// Floor for LOESS robustness weights and the median-residual cutoff.
pub const LOESS_ACCURACY: f64 = 1e-12;

/// Errors raised while preparing a regression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegressionError {
    /// The bandwidth table has no entry for the year and attribute.
    #[error("no LOESS bandwidth for {attribute} in {year}")]
    MissingBandwidth {
        /// Selected year.
        year: i32,
        /// Selected attribute.
        attribute: AttributeKey,
    },

    /// The stored bandwidth is not in (0, 1].
    #[error("LOESS bandwidth {value} for {attribute} in {year} is out of range")]
    InvalidBandwidth {
        /// Selected year.
        year: i32,
        /// Selected attribute.
        attribute: AttributeKey,
        /// The rejected value.
        value: f64,
    },
}

/// Pick the fitting method for an attribute and year.
///
/// # Errors
///
/// Fails when a LOESS attribute has no usable bandwidth for `year`.
pub fn select_method(
    attribute: AttributeKey,
    year: i32,
    bandwidths: &BandwidthTable,
) -> Result<RegressionMethod, RegressionError> {
    match attribute {
        AttributeKey::BasicWater => Ok(RegressionMethod::Polynomial { order: 6 }),
        AttributeKey::Doctors | AttributeKey::UneGni => {
            Ok(RegressionMethod::Polynomial { order: 4 })
        }
        _ => {
            let bandwidth = bandwidths
                .get(year, attribute)
                .ok_or(RegressionError::MissingBandwidth { year, attribute })?;
            if !bandwidth.is_finite() || bandwidth <= 0.0 || bandwidth > 1.0 {
                return Err(RegressionError::InvalidBandwidth {
                    year,
                    attribute,
                    value: bandwidth,
                });
            }
            Ok(RegressionMethod::Loess { bandwidth })
        }
    }
}

/// `(life expectancy, attribute)` pairs of `year` where both are present.
pub fn observations(
    records: &[CountryYearRecord],
    year: i32,
    attribute: AttributeKey,
) -> Vec<CurvePoint> {
    records
        .iter()
        .filter(|r| r.year == year)
        .filter_map(|r| {
            let x = r.life_expect?;
            let y = r.indicator(attribute)?;
            (x.is_finite() && y.is_finite()).then_some(CurvePoint { x, y })
        })
        .collect()
}

/// Fit the overlay curve for the selected year and attribute.
///
/// # Errors
///
/// Fails only when the method needs a bandwidth the table lacks. An empty
/// observation set produces an empty curve.
pub fn regression_curve(
    records: &[CountryYearRecord],
    bandwidths: &BandwidthTable,
    year: i32,
    attribute: AttributeKey,
    samples: usize,
) -> Result<RegressionCurve, RegressionError> {
    let method = select_method(attribute, year, bandwidths)?;
    let points = observations(records, year, attribute);
    let curve = fit(&points, method, samples);
    debug!(
        %attribute,
        year,
        observations = points.len(),
        curve_points = curve.points.len(),
        "regression fitted"
    );
    Ok(curve)
}

/// Fit `points` with an already chosen method.
pub fn fit(points: &[CurvePoint], method: RegressionMethod, samples: usize) -> RegressionCurve {
    match method {
        RegressionMethod::Polynomial { order } => fit_polynomial(points, order, samples),
        RegressionMethod::Loess { bandwidth } => fit_loess(points, bandwidth),
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    values.sum::<f64>() / n as f64
}

/// Points sorted by x, with both coordinates shifted by their means.
fn centred(points: &[CurvePoint]) -> (Vec<f64>, Vec<f64>, f64, f64) {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));
    let ux = mean(sorted.iter().map(|p| p.x));
    let uy = mean(sorted.iter().map(|p| p.y));
    let xs = sorted.iter().map(|p| p.x - ux).collect();
    let ys = sorted.iter().map(|p| p.y - uy).collect();
    (xs, ys, ux, uy)
}

fn distinct_x(points: &[CurvePoint]) -> usize {
    let mut xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup_by(|a, b| a.total_cmp(b).is_eq());
    xs.len()
}

// ---------------------------------------------------------------------------
// Polynomial
// ---------------------------------------------------------------------------

/// Least-squares polynomial of `order`, sampled at `samples` evenly spaced
/// x values across the observed range.
pub fn fit_polynomial(points: &[CurvePoint], order: u8, samples: usize) -> RegressionCurve {
    let method = RegressionMethod::Polynomial { order };
    if points.is_empty() {
        return RegressionCurve::empty(method);
    }

    let terms = usize::from(order).saturating_add(1);
    let distinct = distinct_x(points);
    if distinct < terms {
        debug!(order, distinct, "too few distinct x values for polynomial");
        return RegressionCurve::empty(method);
    }

    let (xs, ys, ux, uy) = centred(points);
    let Some(coefficients) = solve(normal_equations(&xs, &ys, terms)) else {
        warn!(order, observations = points.len(), "singular polynomial system");
        return RegressionCurve::empty(method);
    };

    let predict = |x: f64| evaluate(&coefficients, x - ux) + uy;

    let ss_total: f64 = ys.iter().map(|y| y * y).sum();
    let ss_error: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| {
            let r = y - evaluate(&coefficients, *x);
            r * r
        })
        .sum();
    let r_squared = if ss_total > 0.0 {
        1.0 - ss_error / ss_total
    } else {
        1.0
    };

    let x_min = xs.first().copied().unwrap_or_default() + ux;
    let x_max = xs.last().copied().unwrap_or_default() + ux;
    let samples = samples.max(2);
    #[allow(clippy::cast_precision_loss)]
    let step = (x_max - x_min) / samples.saturating_sub(1) as f64;
    let curve_points = (0..samples)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let x = (i as f64).mul_add(step, x_min);
            CurvePoint { x, y: predict(x) }
        })
        .collect();

    RegressionCurve {
        method,
        points: curve_points,
        coefficients,
        r_squared: Some(r_squared),
    }
}

/// Horner evaluation, coefficients lowest power first.
fn evaluate(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc.mul_add(x, *c))
}

/// Augmented matrix `[XᵀX | Xᵀy]` for a polynomial basis of `terms` powers.
#[allow(clippy::indexing_slicing)]
fn normal_equations(xs: &[f64], ys: &[f64], terms: usize) -> Vec<Vec<f64>> {
    let powers = terms.saturating_mul(2);
    // sums[k] = Σ x^k, rhs[j] = Σ y·x^j
    let mut sums = vec![0.0; powers];
    let mut rhs = vec![0.0; terms];
    for (x, y) in xs.iter().zip(ys) {
        let mut p = 1.0;
        for k in 0..powers {
            sums[k] += p;
            if k < terms {
                rhs[k] += y * p;
            }
            p *= x;
        }
    }

    (0..terms)
        .map(|j| {
            let mut row: Vec<f64> = sums[j..j + terms].to_vec();
            row.push(rhs[j]);
            row
        })
        .collect()
}

/// Gaussian elimination with partial pivoting on an augmented matrix.
///
/// Returns `None` when a pivot vanishes relative to the largest entry.
#[allow(clippy::indexing_slicing)]
fn solve(mut m: Vec<Vec<f64>>) -> Option<Vec<f64>> {
    let n = m.len();
    let scale = m
        .iter()
        .flat_map(|row| row.iter().take(n))
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale <= 0.0 {
        return None;
    }
    let tolerance = scale * 1e-14;

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))?;
        if m[pivot_row][col].abs() <= tolerance {
            return None;
        }
        m.swap(col, pivot_row);

        let pivot = m[col].clone();
        for row in &mut m[col + 1..] {
            let factor = row[col] / pivot[col];
            for (cell, p) in row.iter_mut().zip(&pivot).skip(col) {
                *cell -= factor * p;
            }
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| m[row][k] * solution[k]).sum();
        solution[row] = (m[row][n] - tail) / m[row][row];
    }
    solution.iter().all(|c| c.is_finite()).then_some(solution)
}

// ---------------------------------------------------------------------------
// LOESS
// ---------------------------------------------------------------------------

/// Locally weighted linear regression with robustness reweighting.
///
/// Produces one point per distinct x; fitted values of duplicate x are
/// averaged.
pub fn fit_loess(points: &[CurvePoint], bandwidth: f64) -> RegressionCurve {
    let method = RegressionMethod::Loess { bandwidth };
    if points.is_empty() {
        return RegressionCurve::empty(method);
    }

    let (xs, ys, ux, uy) = centred(points);
    let fitted = loess_fit(&xs, &ys, bandwidth);

    let mut out: Vec<CurvePoint> = Vec::new();
    let mut run = 0.0_f64;
    for (x, y) in xs.iter().zip(&fitted) {
        let x = x + ux;
        match out.last_mut() {
            Some(last) if last.x.total_cmp(&x).is_eq() => {
                run += 1.0;
                last.y += (y - last.y) / run;
            }
            _ => {
                run = 1.0;
                out.push(CurvePoint { x, y: *y });
            }
        }
    }
    for p in &mut out {
        p.y += uy;
    }

    RegressionCurve {
        method,
        points: out,
        coefficients: Vec::new(),
        r_squared: None,
    }
}

fn tricube(x: f64) -> f64 {
    let t = 1.0 - x * x * x;
    t * t * t
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let mid = n / 2;
    match (sorted.get(mid.wrapping_sub(1)), sorted.get(mid)) {
        (Some(a), Some(b)) if n % 2 == 0 => f64::midpoint(*a, *b),
        (_, Some(b)) => *b,
        _ => 0.0,
    }
}

/// Slide the `[left, right]` window forward for point `i` while the point
/// past the right edge is at least as close as the left edge.
#[allow(clippy::indexing_slicing)]
fn update_interval(xs: &[f64], i: usize, interval: &mut (usize, usize)) {
    let Some(&value) = xs.get(i) else {
        return;
    };
    let (mut left, mut right) = (interval.0, interval.1 + 1);
    while right < xs.len() && i > left && xs[right] - value <= value - xs[left] {
        left += 1;
        *interval = (left, right);
        right += 1;
    }
}

/// Fitted value at each x of centred, sorted data.
#[allow(
    clippy::indexing_slicing,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn loess_fit(xs: &[f64], ys: &[f64], bandwidth: f64) -> Vec<f64> {
    let n = xs.len();
    let window = ((bandwidth * n as f64).floor() as usize).clamp(2, n.max(2));
    let mut fitted = vec![0.0; n];
    let mut residuals = vec![0.0; n];
    let mut robust = vec![1.0; n];

    for iteration in 0..=LOESS_ROBUSTNESS_ITERS {
        let mut interval = (0_usize, window.min(n) - 1);

        for i in 0..n {
            let dx = xs[i];
            let (lo, hi) = interval;
            let edge = if dx - xs[lo] > xs[hi] - dx { lo } else { hi };
            let span = (xs[edge] - dx).abs();
            let denom = if span > 0.0 { 1.0 / span } else { 1.0 };

            let (mut sw, mut sx, mut sy, mut sxy, mut sx2) = (0.0, 0.0, 0.0, 0.0, 0.0);
            for k in lo..=hi {
                let w = tricube((dx - xs[k]).abs() * denom) * robust[k];
                let xw = xs[k] * w;
                sw += w;
                sx += xw;
                sy += ys[k] * w;
                sxy += ys[k] * xw;
                sx2 += xs[k] * xw;
            }

            let (intercept, slope) = if sw > 0.0 {
                ols(sx / sw, sy / sw, sxy / sw, sx2 / sw)
            } else {
                (ys[i], 0.0)
            };
            fitted[i] = slope.mul_add(dx, intercept);
            residuals[i] = (ys[i] - fitted[i]).abs();
            update_interval(xs, i + 1, &mut interval);
        }

        if iteration == LOESS_ROBUSTNESS_ITERS {
            break;
        }
        let median_residual = median(&residuals);
        if median_residual.abs() < LOESS_ACCURACY {
            break;
        }
        for (weight, residual) in robust.iter_mut().zip(&residuals) {
            let arg = residual / (6.0 * median_residual);
            *weight = if arg >= 1.0 {
                LOESS_ACCURACY
            } else {
                let w = 1.0 - arg * arg;
                if w > LOESS_ACCURACY { w * w } else { LOESS_ACCURACY }
            };
        }
    }
    fitted
}

/// Weighted means to `(intercept, slope)`.
fn ols(x: f64, y: f64, xy: f64, x2: f64) -> (f64, f64) {
    let delta = x.mul_add(-x, x2);
    let slope = if delta.abs() < 1e-24 {
        0.0
    } else {
        x.mul_add(-y, xy) / delta
    };
    (slope.mul_add(-x, y), slope)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn bandwidths() -> BandwidthTable {
        let row: BTreeMap<AttributeKey, f64> = AttributeKey::ALL.iter().map(|a| (*a, 0.5)).collect();
        BandwidthTable {
            rows: vec![row; 17],
        }
    }

    fn line(n: usize, slope: f64, intercept: f64) -> Vec<CurvePoint> {
        (0..n)
            .map(|i| {
                let x = 50.0 + i as f64;
                CurvePoint {
                    x,
                    y: slope.mul_add(x, intercept),
                }
            })
            .collect()
    }

    #[test]
    fn method_follows_attribute() {
        let table = bandwidths();
        assert_eq!(
            select_method(AttributeKey::BasicWater, 2005, &table).unwrap(),
            RegressionMethod::Polynomial { order: 6 }
        );
        for attr in [AttributeKey::Doctors, AttributeKey::UneGni] {
            assert_eq!(
                select_method(attr, 2005, &table).unwrap(),
                RegressionMethod::Polynomial { order: 4 }
            );
        }
        for attr in AttributeKey::ALL {
            if matches!(
                attr,
                AttributeKey::BasicWater | AttributeKey::Doctors | AttributeKey::UneGni
            ) {
                continue;
            }
            assert_eq!(
                select_method(attr, 2005, &table).unwrap(),
                RegressionMethod::Loess { bandwidth: 0.5 }
            );
        }
    }

    #[test]
    fn missing_bandwidth_is_an_error() {
        let table = bandwidths();
        let err = select_method(AttributeKey::Bmi, 2030, &table).unwrap_err();
        assert_eq!(
            err,
            RegressionError::MissingBandwidth {
                year: 2030,
                attribute: AttributeKey::Bmi
            }
        );
        // Polynomial attributes never consult the table.
        assert!(select_method(AttributeKey::Doctors, 2030, &table).is_ok());
    }

    #[test]
    fn empty_input_gives_empty_curve() {
        assert!(fit_polynomial(&[], 4, 100).is_empty());
        assert!(fit_loess(&[], 0.3).is_empty());
    }

    #[test]
    fn polynomial_recovers_quadratic() {
        let points: Vec<CurvePoint> = (0..20)
            .map(|i| {
                let x = 40.0 + f64::from(i) * 2.0;
                CurvePoint {
                    x,
                    y: 0.5 * x * x - 3.0 * x + 7.0,
                }
            })
            .collect();
        let curve = fit_polynomial(&points, 2, 11);
        assert_eq!(curve.points.len(), 11);
        assert!((curve.r_squared.unwrap() - 1.0).abs() < 1e-9);
        for p in &curve.points {
            let expected = 0.5 * p.x * p.x - 3.0 * p.x + 7.0;
            assert!((p.y - expected).abs() < 1e-6 * expected.abs().max(1.0));
        }
        assert!((curve.points[0].x - 40.0).abs() < 1e-9);
        assert!((curve.points[10].x - 78.0).abs() < 1e-9);
    }

    #[test]
    fn polynomial_needs_enough_distinct_points() {
        let points = line(4, 1.0, 0.0);
        assert!(fit_polynomial(&points, 4, 50).is_empty());
        assert!(!fit_polynomial(&points, 3, 50).is_empty());
    }

    #[test]
    fn loess_follows_a_line() {
        let points = line(30, 0.8, -10.0);
        let curve = fit_loess(&points, 0.3);
        assert_eq!(curve.points.len(), 30);
        for p in &curve.points {
            assert!((p.y - 0.8f64.mul_add(p.x, -10.0)).abs() < 1e-6);
        }
    }

    #[test]
    fn loess_averages_duplicate_x() {
        let mut points = line(10, 1.0, 0.0);
        points.push(CurvePoint { x: 55.0, y: 55.0 });
        let curve = fit_loess(&points, 0.5);
        assert_eq!(curve.points.len(), 10);
        let xs: Vec<f64> = curve.points.iter().map(|p| p.x).collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn loess_resists_an_outlier() {
        let mut points = line(40, 0.5, 0.0);
        for (i, p) in points.iter_mut().enumerate() {
            p.y += if i % 2 == 0 { 0.5 } else { -0.5 };
        }
        points[20].y += 100.0;
        let curve = fit_loess(&points, 0.4);
        let at = curve.points.iter().find(|p| (p.x - 70.0).abs() < 1e-9).unwrap();
        assert!((at.y - 35.0).abs() < 5.0);
    }

    #[test]
    fn observations_skip_missing_values() {
        let mut indicators = BTreeMap::new();
        indicators.insert(AttributeKey::Bmi, 24.0);
        let full = CountryYearRecord {
            country: "A".to_owned(),
            country_code: "AAA".to_owned(),
            region: "R".to_owned(),
            year: 2005,
            life_expect: Some(70.0),
            life_expectancy_male: None,
            life_expectancy_female: None,
            indicators,
            mortality: Vec::new(),
        };
        let mut no_x = full.clone();
        no_x.life_expect = None;
        let mut other_year = full.clone();
        other_year.year = 2006;
        let mut no_y = full.clone();
        no_y.indicators.clear();

        let obs = observations(&[full, no_x, other_year, no_y], 2005, AttributeKey::Bmi);
        assert_eq!(obs, vec![CurvePoint { x: 70.0, y: 24.0 }]);
    }
}
