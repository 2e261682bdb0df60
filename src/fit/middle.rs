//! Middle-segment line fitter.
//!
//! Given a step-like signal, select the samples strictly inside the
//! threshold band, regress `y` on `t` over them, and report where that line
//! crosses the signal's observed minimum and maximum. Those crossings are
//! the estimated start and stop of the transition; slope and intercept are
//! only kept in the detailed result.
//!
//! Everything here is pure: no I/O, no logging, no shared state.

use crate::domain::{FitEndpoints, MAX_EPS, Point};
use crate::error::FitError;
use crate::fit::band::ThresholdBand;
use crate::math::{LineFit, fit_line};

/// A line needs at least two samples.
pub const MIN_MIDDLE_SAMPLES: usize = 2;

/// Slopes whose total rise over the selected time span is below this
/// fraction of the value range are treated as zero.
const SLOPE_REL_TOL: f64 = 1e-12;

/// Full output of a middle-segment fit.
#[derive(Debug, Clone, PartialEq)]
pub struct MiddleFit {
    pub endpoints: FitEndpoints,
    pub line: LineFit,
    pub band: ThresholdBand,
    /// `true` for samples that took part in the regression.
    pub mask: Vec<bool>,
}

impl MiddleFit {
    pub fn n_selected(&self) -> usize {
        self.line.n
    }
}

/// Fit a line to the sloped middle of `(t, y)`.
///
/// Returns `(x_at_ymin, y_min)` and `(x_at_ymax, y_max)` as `start` / `end`.
pub fn fit_middle_segment(t: &[f64], y: &[f64], eps: f64) -> Result<FitEndpoints, FitError> {
    fit_middle_segment_detailed(t, y, eps).map(|fit| fit.endpoints)
}

/// Same as [`fit_middle_segment`], keeping the band, mask and line statistics.
pub fn fit_middle_segment_detailed(t: &[f64], y: &[f64], eps: f64) -> Result<MiddleFit, FitError> {
    validate_inputs(t, y, eps)?;

    let band = ThresholdBand::from_values(y, eps)
        .ok_or_else(|| FitError::InvalidArgument("signal is empty".to_string()))?;
    let mask = band.middle_mask(y);

    let (t_mid, y_mid): (Vec<f64>, Vec<f64>) = t
        .iter()
        .zip(y)
        .zip(&mask)
        .filter(|(_, keep)| **keep)
        .map(|((&ti, &yi), _)| (ti, yi))
        .unzip();

    if t_mid.len() < MIN_MIDDLE_SAMPLES {
        return Err(FitError::InsufficientData {
            selected: t_mid.len(),
            required: MIN_MIDDLE_SAMPLES,
        });
    }

    let line = fit_line(&t_mid, &y_mid)?;

    let t_lo = t_mid.iter().copied().fold(f64::INFINITY, f64::min);
    let t_hi = t_mid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let rise = line.slope.abs() * (t_hi - t_lo);
    if !line.slope.is_finite() || rise <= SLOPE_REL_TOL * band.range() {
        return Err(FitError::DegenerateFit(format!(
            "fitted slope {} is indistinguishable from zero",
            line.slope
        )));
    }

    let x_start = line.solve_for_x(band.y_min);
    let x_end = line.solve_for_x(band.y_max);
    if !(x_start.is_finite() && x_end.is_finite()) {
        return Err(FitError::DegenerateFit(
            "back-solved time coordinates are not finite".to_string(),
        ));
    }

    Ok(MiddleFit {
        endpoints: FitEndpoints {
            start: Point::new(x_start, band.y_min),
            end: Point::new(x_end, band.y_max),
        },
        line,
        band,
        mask,
    })
}

fn validate_inputs(t: &[f64], y: &[f64], eps: f64) -> Result<(), FitError> {
    if t.len() != y.len() {
        return Err(FitError::InvalidArgument(format!(
            "t has {} samples, y has {}",
            t.len(),
            y.len()
        )));
    }
    if y.is_empty() {
        return Err(FitError::InvalidArgument("signal is empty".to_string()));
    }
    if !(eps.is_finite() && (0.0..=MAX_EPS).contains(&eps)) {
        return Err(FitError::InvalidArgument(format!(
            "eps {eps} is outside [0, {MAX_EPS}]"
        )));
    }
    if let Some(i) = t.iter().position(|v| !v.is_finite()) {
        return Err(FitError::InvalidArgument(format!("t[{i}] is not finite")));
    }
    if let Some(i) = y.iter().position(|v| !v.is_finite()) {
        return Err(FitError::InvalidArgument(format!("y[{i}] is not finite")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel_err(actual: f64, expected: f64) -> f64 {
        ((actual - expected) / expected).abs()
    }

    #[test]
    fn eleven_sample_ramp() {
        let t: Vec<f64> = (0..=10).map(f64::from).collect();
        let y = [0.0, 0.0, 0.0, 20.0, 40.0, 60.0, 80.0, 100.0, 100.0, 100.0, 100.0];

        let fit = fit_middle_segment_detailed(&t, &y, 0.01).unwrap();

        let selected: Vec<f64> = t
            .iter()
            .zip(&fit.mask)
            .filter(|(_, keep)| **keep)
            .map(|(&ti, _)| ti)
            .collect();
        assert_eq!(selected, vec![3.0, 4.0, 5.0, 6.0]);
        assert_eq!(fit.n_selected(), 4);

        assert!((fit.line.slope - 20.0).abs() < 1e-9, "slope {}", fit.line.slope);
        assert!((fit.line.intercept + 40.0).abs() < 1e-9, "intercept {}", fit.line.intercept);

        let ((x0, y0), (x1, y1)) = fit.endpoints.as_tuples();
        assert!((x0 - 2.0).abs() < 1e-9);
        assert_eq!(y0, 0.0);
        assert!((x1 - 7.0).abs() < 1e-9);
        assert_eq!(y1, 100.0);
    }

    #[test]
    fn recovers_clean_ramp_between_plateaus() {
        // Flat at 0 until t=2, linear to 100 at t=5, flat after.
        let t: Vec<f64> = (0..=80).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = t
            .iter()
            .map(|&ti| ((ti - 2.0) / 3.0 * 100.0).clamp(0.0, 100.0))
            .collect();

        let fit = fit_middle_segment_detailed(&t, &y, 0.01).unwrap();

        assert!(rel_err(fit.line.slope, 100.0 / 3.0) < 1e-6);
        assert!(rel_err(fit.endpoints.start.x, 2.0) < 1e-6, "start {}", fit.endpoints.start.x);
        assert!(rel_err(fit.endpoints.end.x, 5.0) < 1e-6, "end {}", fit.endpoints.end.x);

        // Both endpoints lie on the fitted line.
        for p in [fit.endpoints.start, fit.endpoints.end] {
            assert!((fit.line.predict(p.x) - p.y).abs() < 1e-9);
        }
    }

    #[test]
    fn falling_signal_swaps_endpoint_order() {
        let t: Vec<f64> = (0..=10).map(f64::from).collect();
        let y = [100.0, 100.0, 100.0, 80.0, 60.0, 40.0, 20.0, 0.0, 0.0, 0.0, 0.0];

        let e = fit_middle_segment(&t, &y, 0.01).unwrap();
        assert!((e.start.x - 7.0).abs() < 1e-9);
        assert!((e.end.x - 2.0).abs() < 1e-9);
        assert!(e.duration() < 0.0);
    }

    #[test]
    fn boundary_sample_does_not_participate() {
        // delta = 1.0, so the sample at exactly y = 1.0 is dropped. Adding it
        // would pull the fit off the 20/unit line through the other points.
        let t = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [0.0, 1.0, 20.0, 40.0, 60.0, 100.0, 100.0];

        let fit = fit_middle_segment_detailed(&t, &y, 0.01).unwrap();
        assert_eq!(fit.mask, vec![false, false, true, true, true, false, false]);
        assert!((fit.line.slope - 20.0).abs() < 1e-9);
        assert!((fit.line.intercept + 20.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let t: Vec<f64> = (0..40).map(|i| i as f64 / 30.0).collect();
        let y: Vec<f64> = t
            .iter()
            .enumerate()
            .map(|(i, &ti)| (ti * 900.0 - 200.0).clamp(0.0, 500.0) + (i % 3) as f64 * 0.7)
            .collect();

        let a = fit_middle_segment(&t, &y, 0.01).unwrap();
        let b = fit_middle_segment(&t, &y, 0.01).unwrap();
        assert_eq!(a.start.x.to_bits(), b.start.x.to_bits());
        assert_eq!(a.end.x.to_bits(), b.end.x.to_bits());
        assert_eq!(a.start.y.to_bits(), b.start.y.to_bits());
        assert_eq!(a.end.y.to_bits(), b.end.y.to_bits());
    }

    #[test]
    fn half_eps_leaves_nothing_to_fit() {
        let t = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.0, 0.0, 50.0, 100.0, 100.0];
        let err = fit_middle_segment(&t, &y, 0.5).unwrap_err();
        assert_eq!(err, FitError::InsufficientData { selected: 0, required: 2 });
    }

    #[test]
    fn single_middle_sample_is_insufficient() {
        let t = [0.0, 1.0, 2.0];
        let y = [0.0, 50.0, 100.0];
        let err = fit_middle_segment(&t, &y, 0.01).unwrap_err();
        assert_eq!(err, FitError::InsufficientData { selected: 1, required: 2 });
    }

    #[test]
    fn constant_signal_is_insufficient() {
        let t = [0.0, 1.0, 2.0, 3.0];
        let y = [5.0; 4];
        let err = fit_middle_segment(&t, &y, 0.01).unwrap_err();
        assert_eq!(err, FitError::InsufficientData { selected: 0, required: 2 });
    }

    #[test]
    fn flat_middle_is_degenerate() {
        let t = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 50.0, 50.0, 100.0];
        let err = fit_middle_segment(&t, &y, 0.01).unwrap_err();
        assert!(matches!(err, FitError::DegenerateFit(_)), "{err:?}");
    }

    #[test]
    fn repeated_time_coordinate_is_degenerate() {
        let t = [0.0, 1.0, 1.0, 2.0];
        let y = [0.0, 40.0, 60.0, 100.0];
        let err = fit_middle_segment(&t, &y, 0.01).unwrap_err();
        assert!(matches!(err, FitError::DegenerateFit(_)), "{err:?}");
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = fit_middle_segment(&[0.0, 1.0, 2.0], &[0.0, 1.0], 0.01).unwrap_err();
        assert!(matches!(err, FitError::InvalidArgument(_)));
    }

    #[test]
    fn invalid_arguments_are_rejected_before_fitting() {
        let t = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 30.0, 60.0, 100.0];

        for eps in [-0.01, 0.51, f64::NAN, f64::INFINITY] {
            let err = fit_middle_segment(&t, &y, eps).unwrap_err();
            assert!(matches!(err, FitError::InvalidArgument(_)), "eps={eps}: {err:?}");
        }

        assert!(matches!(
            fit_middle_segment(&[], &[], 0.01).unwrap_err(),
            FitError::InvalidArgument(_)
        ));
        assert!(matches!(
            fit_middle_segment(&t, &[0.0, f64::NAN, 60.0, 100.0], 0.01).unwrap_err(),
            FitError::InvalidArgument(_)
        ));
    }
}
