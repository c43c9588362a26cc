use crate::error::{MixError, MixResult};

pub const MIN_NATIVE_TEMPO: f64 = 0.5;
pub const MAX_NATIVE_TEMPO: f64 = 2.0;

pub const IDENTITY_EPSILON: f64 = 1e-9;

pub const FACTOR_PRECISION: usize = 6;

#[must_use]
pub fn is_identity(speed: f64) -> bool {
    (speed - 1.0).abs() <= IDENTITY_EPSILON
}

pub fn validate_speed(speed: f64) -> MixResult<()> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(MixError::InvalidConfig(format!(
            "speed must be a finite number > 0 (got {speed})"
        )));
    }
    Ok(())
}

pub fn tempo_chain(speed: f64) -> MixResult<Vec<f64>> {
    validate_speed(speed)?;
    Ok(decompose(speed))
}

fn decompose(speed: f64) -> Vec<f64> {
    let mut factors = Vec::new();
    let mut remaining = speed;
    while remaining > MAX_NATIVE_TEMPO {
        factors.push(MAX_NATIVE_TEMPO);
        remaining /= MAX_NATIVE_TEMPO;
    }
    while remaining < MIN_NATIVE_TEMPO {
        factors.push(MIN_NATIVE_TEMPO);
        remaining /= MIN_NATIVE_TEMPO;
    }
    debug_assert!((MIN_NATIVE_TEMPO..=MAX_NATIVE_TEMPO).contains(&remaining));
    factors.push(remaining);
    factors
}

#[must_use]
pub fn atempo_filter(chain: &[f64]) -> String {
    let last = chain.len().saturating_sub(1);
    chain
        .iter()
        .enumerate()
        .map(|(index, factor)| {
            if index == last {
                format!("atempo={factor:.FACTOR_PRECISION$}")
            } else {
                format!("atempo={factor:.1}")
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
