//! Zero-phase Butterworth low-pass filter
//!
//! Even-order Butterworth realized as cascaded biquad sections, run forward
//! then backward over an odd-extended signal. Short or degenerate inputs fall
//! back to the unfiltered signal with a warning.

use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type};
use contracts::FilterParams;
use tracing::warn;

use crate::gradient::mean_dt;

/// Result of a filter call
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub values: Vec<f64>,
    /// False when the unfiltered signal was returned
    pub filtered: bool,
}

impl FilterOutcome {
    fn passthrough(values: Vec<f64>) -> Self {
        Self {
            values,
            filtered: false,
        }
    }
}

/// Q factors of the second-order sections of an even-order Butterworth filter
pub fn butterworth_q_factors(order: usize) -> Vec<f64> {
    let order = order.max(2) & !1;
    (1..=order / 2)
        .map(|k| {
            let theta = (2 * k - 1) as f64 * std::f64::consts::PI / (2 * order) as f64;
            1.0 / (2.0 * theta.cos())
        })
        .collect()
}

/// Low-pass `values` sampled at `time`
///
/// The sampling rate is `1 / mean(diff(time))`. NaN samples are replaced by 0
/// before filtering.
pub fn lowpass(values: &[f64], time: &[f64], params: &FilterParams) -> FilterOutcome {
    let cleaned: Vec<f64> = values
        .iter()
        .map(|v| if v.is_nan() { 0.0 } else { *v })
        .collect();

    let Some(dt) = mean_dt(time) else {
        warn!(samples = time.len(), "cannot derive sampling rate, filter skipped");
        return FilterOutcome::passthrough(cleaned);
    };
    lowpass_with_rate(cleaned, 1.0 / dt, params)
}

/// Low-pass with a known sampling rate (Hz)
pub fn lowpass_with_rate(values: Vec<f64>, fs: f64, params: &FilterParams) -> FilterOutcome {
    let order = params.order.max(2) & !1;
    let n = values.len();

    if n < 3 * order {
        warn!(
            samples = n,
            order, "signal too short for stable filtering, using unfiltered signal"
        );
        return FilterOutcome::passthrough(values);
    }
    if !(fs.is_finite() && fs > 0.0) {
        warn!(fs, "invalid sampling rate, filter skipped");
        return FilterOutcome::passthrough(values);
    }

    let nyquist = fs / 2.0;
    let mut cutoff = params.cutoff_hz;
    if cutoff >= nyquist {
        cutoff = 0.99 * nyquist;
        warn!(
            requested_hz = params.cutoff_hz,
            used_hz = cutoff,
            "cutoff at or above Nyquist, clamped"
        );
    }

    let mut sections = Vec::with_capacity(order / 2);
    for q in butterworth_q_factors(order) {
        match Coefficients::<f64>::from_params(Type::LowPass, fs.hz(), cutoff.hz(), q) {
            Ok(coeffs) => sections.push(DirectForm2Transposed::<f64>::new(coeffs)),
            Err(e) => {
                warn!(error = ?e, cutoff, fs, "unstable filter coefficients, using unfiltered signal");
                return FilterOutcome::passthrough(values);
            }
        }
    }

    let pad = (3 * (order + 1)).min(n - 1);
    let mut ext = odd_extend(&values, pad);
    forward_backward(&mut ext, &mut sections);

    FilterOutcome {
        values: ext[pad..pad + n].to_vec(),
        filtered: true,
    }
}

/// Reflect the signal about its end points (`2*x[0] - x[k]`)
fn odd_extend(values: &[f64], pad: usize) -> Vec<f64> {
    let n = values.len();
    let first = values[0];
    let last = values[n - 1];

    let mut ext = Vec::with_capacity(n + 2 * pad);
    ext.extend((1..=pad).rev().map(|k| 2.0 * first - values[k]));
    ext.extend_from_slice(values);
    ext.extend((1..=pad).map(|k| 2.0 * last - values[n - 1 - k]));
    ext
}

fn forward_backward<F: Biquad<f64>>(signal: &mut [f64], sections: &mut [F]) {
    run_cascade(signal.iter_mut(), sections);
    run_cascade(signal.iter_mut().rev(), sections);
}

/// Run every section over the samples, starting from steady state on the first sample
fn run_cascade<'a, F, I>(samples: I, sections: &mut [F])
where
    F: Biquad<f64>,
    I: Iterator<Item = &'a mut f64>,
{
    let mut samples = samples.peekable();
    let Some(initial) = samples.peek().map(|v| **v) else {
        return;
    };

    for section in sections.iter_mut() {
        section.reset_state();
    }
    // Settle the state on the initial value to suppress the start-up transient
    for _ in 0..SETTLE_SAMPLES {
        let mut x = initial;
        for section in sections.iter_mut() {
            x = section.run(x);
        }
    }

    for sample in samples {
        let mut x = *sample;
        for section in sections.iter_mut() {
            x = section.run(x);
        }
        *sample = x;
    }
}

const SETTLE_SAMPLES: usize = 512;
