use crate::core::GeoPos;

/// Positions closer than this in both axes (degrees) count as the same spot
pub const CLOSE_NODE_THRESHOLD: f64 = 0.000_000_1;

/// Rotation of the aircraft icon artwork relative to north, in degrees
pub const ICON_ROTATION_OFFSET: f64 = 45.0;

/// Initial great-circle bearing from `from` to `to`, in degrees within [0, 360)
pub fn bearing_degrees(from: GeoPos, to: GeoPos) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Whether two positions are too close to derive a heading from
pub fn is_close(a: GeoPos, b: GeoPos) -> bool {
    (a.lat - b.lat).abs() < CLOSE_NODE_THRESHOLD && (a.lng - b.lng).abs() < CLOSE_NODE_THRESHOLD
}

/// Rotation to apply to the aircraft icon for a heading
pub fn icon_rotation(heading: f64) -> f64 {
    (heading - ICON_ROTATION_OFFSET).rem_euclid(360.0)
}
