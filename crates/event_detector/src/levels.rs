//! Integer level decoding for request signals stored as floats.

/// Request level of one sample, `None` for NaN/inf
pub(crate) fn level(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.round() as i64)
}

pub(crate) fn is_in(value: f64, levels: &[i64]) -> bool {
    level(value).is_some_and(|l| levels.contains(&l))
}

pub(crate) fn is_zero(value: f64) -> bool {
    level(value) == Some(0)
}
