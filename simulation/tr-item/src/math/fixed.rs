//! Fixed-point trigonometry and angle helpers
//!
//! Angles are 16-bit binary angles: a full turn is 65536 units and all angle
//! arithmetic wraps. Sine and cosine return values scaled by
//! [`FIXED_ONE`] (14 fractional bits). The sine table is built at compile
//! time from an integer Taylor series so every platform produces the same
//! bits.

/// Fractional bits of trigonometric values and rotation matrices
pub const FIXED_SHIFT: u32 = 14;
/// 1.0 in trigonometric fixed point
pub const FIXED_ONE: i32 = 1 << FIXED_SHIFT;

pub const ANGLE_0: u16 = 0;
pub const ANGLE_45: u16 = 0x2000;
pub const ANGLE_90: u16 = 0x4000;
pub const ANGLE_180: u16 = 0x8000;

/// Entries in the quarter-wave table, excluding the closing 90 degree entry
const QUARTER_STEPS: usize = 1024;
/// Angle units covered by one table step
const STEP_SHIFT: u32 = 4;

static SIN_QUARTER: [i16; QUARTER_STEPS + 1] = build_sin_table();

const fn build_sin_table() -> [i16; QUARTER_STEPS + 1] {
    // pi in Q30
    const PI_Q30: i128 = 3_373_259_426;
    const Q: u32 = 30;

    let mut table = [0i16; QUARTER_STEPS + 1];
    let mut i = 0;
    while i <= QUARTER_STEPS {
        // x = i * (pi / 2) / 1024
        let x = (i as i128) * PI_Q30 / (2 * QUARTER_STEPS as i128);
        let x2 = (x * x) >> Q;

        let mut term = x;
        let mut sum = x;
        let mut k: i128 = 1;
        while k < 12 {
            term = -((term * x2) >> Q) / ((2 * k) * (2 * k + 1));
            sum += term;
            k += 1;
        }

        let mut value = (sum * FIXED_ONE as i128 + (1 << (Q - 1))) >> Q;
        if value > FIXED_ONE as i128 {
            value = FIXED_ONE as i128;
        }
        if value < 0 {
            value = 0;
        }
        table[i] = value as i16;
        i += 1;
    }
    table
}

/// Converts whole degrees to a binary angle
pub const fn angle(degrees: i32) -> u16 {
    (degrees * 0x10000 / 360) as u16
}

/// Sine of a binary angle in [`FIXED_ONE`] units
#[inline]
pub fn sin(angle: u16) -> i32 {
    let index = (angle >> STEP_SHIFT) as usize;
    let offset = index & (QUARTER_STEPS - 1);

    match index / QUARTER_STEPS {
        0 => SIN_QUARTER[offset] as i32,
        1 => SIN_QUARTER[QUARTER_STEPS - offset] as i32,
        2 => -(SIN_QUARTER[offset] as i32),
        _ => -(SIN_QUARTER[QUARTER_STEPS - offset] as i32),
    }
}

/// Cosine of a binary angle in [`FIXED_ONE`] units
#[inline]
pub fn cos(angle: u16) -> i32 {
    sin(angle.wrapping_add(ANGLE_90))
}

/// Heading of the direction `(x, z)`.
///
/// The result `a` satisfies `sin(a) ~ x` and `cos(a) ~ z`, matching the
/// movement convention where yaw 0 faces +z.
pub fn atan2(x: i32, z: i32) -> u16 {
    if x == 0 && z == 0 {
        return ANGLE_0;
    }

    let ax = (x as i64).abs();
    let az = (z as i64).abs();
    let (num, den) = if ax <= az { (ax, az) } else { (az, ax) };

    // Largest table step whose tangent does not exceed num / den (<= 45 degrees)
    let mut lo = 0usize;
    let mut hi = QUARTER_STEPS / 2;
    while lo < hi {
        let mid = (lo + hi).div_ceil(2);
        let s = SIN_QUARTER[mid] as i64;
        let c = SIN_QUARTER[QUARTER_STEPS - mid] as i64;
        if s * den <= c * num {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    let theta = (lo as u16) << STEP_SHIFT;
    let a = if ax <= az { theta } else { ANGLE_90 - theta };

    match (x >= 0, z >= 0) {
        (true, true) => a,
        (true, false) => ANGLE_180 - a,
        (false, false) => ANGLE_180.wrapping_add(a),
        (false, true) => a.wrapping_neg(),
    }
}

/// Integer square root, zero for non-positive input
#[inline]
pub fn sqrt(value: i64) -> i32 {
    if value <= 0 {
        0
    } else {
        (value as u64).isqrt() as i32
    }
}

/// 16.16 reciprocal of a small positive integer
#[inline]
pub fn fixed_inv_u(value: i32) -> i32 {
    (1 << 16) / value.max(1)
}

/// Moves angle `a` towards `b` by at most `step`, taking the short way round
pub fn angle_lerp(a: u16, b: u16, step: u16) -> u16 {
    let d = b.wrapping_sub(a) as i16;
    let step = step as i16;

    if d > step {
        a.wrapping_add(step as u16)
    } else if d < -step {
        a.wrapping_sub(step as u16)
    } else {
        b
    }
}

/// X component of `(x, z)` rotated by the sine/cosine pair
#[inline]
pub fn rotate_x(x: i32, z: i32, s: i32, c: i32) -> i32 {
    ((x as i64 * c as i64 - z as i64 * s as i64) >> FIXED_SHIFT) as i32
}

/// Z component of `(x, z)` rotated by the sine/cosine pair
#[inline]
pub fn rotate_z(x: i32, z: i32, s: i32, c: i32) -> i32 {
    ((z as i64 * c as i64 + x as i64 * s as i64) >> FIXED_SHIFT) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ANGLE_0, 0, FIXED_ONE ; "zero")]
    #[test_case(ANGLE_90, FIXED_ONE, 0 ; "quarter")]
    #[test_case(ANGLE_180, 0, -FIXED_ONE ; "half")]
    #[test_case(0xC000, -FIXED_ONE, 0 ; "three quarters")]
    fn test_cardinal_angles(a: u16, expected_sin: i32, expected_cos: i32) {
        assert_eq!(sin(a), expected_sin);
        assert_eq!(cos(a), expected_cos);
    }

    #[test]
    fn test_sin_45_degrees() {
        // 16384 / sqrt(2) = 11585.2
        assert!((sin(ANGLE_45) - 11585).abs() <= 1);
        assert_eq!(sin(ANGLE_45), cos(ANGLE_45));
    }

    #[test]
    fn test_sin_is_odd() {
        for a in (0..=u16::MAX).step_by(16 * 7) {
            assert_eq!(sin(a.wrapping_neg()), -sin(a), "angle {a}");
        }
    }

    #[test_case(0, 100, ANGLE_0 ; "forward")]
    #[test_case(100, 0, ANGLE_90 ; "right")]
    #[test_case(0, -100, ANGLE_180 ; "back")]
    #[test_case(-100, 0, 0xC000 ; "left")]
    #[test_case(100, 100, ANGLE_45 ; "diagonal")]
    fn test_atan2_cardinal(x: i32, z: i32, expected: u16) {
        assert_eq!(atan2(x, z), expected);
    }

    #[test]
    fn test_atan2_inverts_sin_cos() {
        for a in (0..=u16::MAX).step_by(1031) {
            let back = atan2(sin(a), cos(a));
            let err = back.wrapping_sub(a) as i16;
            assert!(err.abs() <= 48, "angle {a} came back as {back}");
        }
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(sqrt(0), 0);
        assert_eq!(sqrt(-5), 0);
        assert_eq!(sqrt(1_000_000), 1000);
        assert_eq!(sqrt(99), 9);
    }

    #[test]
    fn test_angle_lerp_short_way() {
        assert_eq!(angle_lerp(0, 100, 10), 10);
        assert_eq!(angle_lerp(0, 5, 10), 5);
        assert_eq!(angle_lerp(10, 0xFFF0, 8), 2);
    }

    #[test]
    fn test_rotation_round_trip_at_zero() {
        let (s, c) = (sin(0), cos(0));
        assert_eq!(rotate_x(123, 456, s, c), 123);
        assert_eq!(rotate_z(123, 456, s, c), 456);
    }
}
