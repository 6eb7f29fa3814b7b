//! Formatting utilities

use tr_item::math::IVec3;

/// Format a position as `x, y, z`
pub fn format_pos(pos: IVec3) -> String {
    format!("{}, {}, {}", pos.x, pos.y, pos.z)
}

/// Format a binary angle in degrees, one decimal
pub fn format_angle(angle: u16) -> String {
    format!("{:.1}°", f64::from(angle) * 360.0 / 65536.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_angle() {
        assert_eq!(format_angle(0), "0.0°");
        assert_eq!(format_angle(0x4000), "90.0°");
        assert_eq!(format_angle(0xC000), "270.0°");
    }

    #[test]
    fn test_format_pos() {
        assert_eq!(format_pos(IVec3::new(1, -2, 3)), "1, -2, 3");
    }
}
