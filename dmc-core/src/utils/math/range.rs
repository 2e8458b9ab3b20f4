//! Integer range helpers for turning speed percentages into duty cycles.
//!
//! # Example
//! ```rust
//! use dmc_core::utils::math::range::map_range;
//! assert_eq!(map_range(50, 0, 100, 0, 1023), 511);
//! ```

/// Largest speed magnitude accepted by a run command (percent).
pub const FULL_SPEED: u32 = 100;

/// Linearly re-map `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// The result is truncated toward zero. Inputs are not clamped, so callers must
/// bound `value` first. A degenerate input range maps everything to `out_min`.
pub fn map_range(
    value: i32,
    in_min: i32,
    in_max: i32,
    out_min: i32,
    out_max: i32,
) -> i32 {
    let span = i64::from(in_max) - i64::from(in_min);
    if span == 0 {
        return out_min;
    }
    let scaled = (i64::from(value) - i64::from(in_min))
        * (i64::from(out_max) - i64::from(out_min))
        / span;
    (scaled + i64::from(out_min)) as i32
}

/// Magnitude of a signed speed percentage, saturated at [`FULL_SPEED`].
pub fn speed_magnitude(speed: i32) -> u32 {
    speed.unsigned_abs().min(FULL_SPEED)
}

/// Convert a speed magnitude (0..=100) into a duty value on `0..=max_duty`.
pub fn duty_for(
    magnitude: u32,
    max_duty: u16,
) -> u16 {
    let duty = map_range(
        magnitude.min(FULL_SPEED) as i32,
        0,
        FULL_SPEED as i32,
        0,
        i32::from(max_duty),
    );
    duty.clamp(0, i32::from(max_duty)) as u16
}
