use nalgebra::{Point3, Rotation3, Unit, Vector3};

/// Builds a rotation of `angle_degrees` about `axis`. The axis does not need to be normalised.
pub fn rotation_from_axis_angle(axis: &Vector3<f64>, angle_degrees: f64) -> Rotation3<f64> {
    rotation_from_axis_radians(axis, angle_degrees.to_radians())
}

pub fn rotation_from_axis_radians(axis: &Vector3<f64>, angle_radians: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_radians)
}

/// Rotates `point` about `pivot` (the origin when `None`).
pub fn rotate_about(
    point: &Point3<f64>,
    rotation: &Rotation3<f64>,
    pivot: Option<&Point3<f64>>,
) -> Point3<f64> {
    match pivot {
        Some(centre) => centre + rotation * (point - centre),
        None => rotation * point,
    }
}
