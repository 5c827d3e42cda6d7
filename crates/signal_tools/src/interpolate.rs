//! Threshold interpolator
//!
//! Clamped piecewise-linear lookup. Queries outside the breakpoint range
//! return the boundary value; there is no extrapolation.

use contracts::{CalibrationTable, ContractError};

/// Interpolate `table` at `x_query`
///
/// Breakpoints may be unsorted; they are ordered before lookup.
///
/// # Errors
/// Returns `MalformedCalibration` if the table fails shape validation or the
/// query is not finite.
pub fn interpolate(table: &CalibrationTable, x_query: f64) -> Result<f64, ContractError> {
    table.validate("table")?;
    if !x_query.is_finite() {
        return Err(ContractError::malformed_calibration(
            "query",
            format!("query value must be finite, got {x_query}"),
        ));
    }

    let mut points: Vec<(f64, f64)> = table
        .x
        .iter()
        .copied()
        .zip(table.y.iter().copied())
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (x_lo, y_lo) = points[0];
    let (x_hi, y_hi) = points[points.len() - 1];
    if x_query <= x_lo {
        return Ok(y_lo);
    }
    if x_query >= x_hi {
        return Ok(y_hi);
    }

    // First breakpoint strictly greater than the query
    let upper = points.partition_point(|p| p.0 <= x_query);
    let (x1, y1) = points[upper - 1];
    let (x2, y2) = points[upper];
    if x1 == x_query {
        return Ok(y1);
    }
    Ok(y1 + (y2 - y1) * (x_query - x1) / (x2 - x1))
}
