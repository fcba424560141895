use glam::Vec3;

/// An infinitely distant light. `direction` points from the terrain toward
/// the light.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    direction: Vec3,
    radiance: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::Y,
            radiance: Vec3::splat(0.5),
        }
    }
}

impl DirectionalLight {
    pub fn new(direction: Vec3, radiance: Vec3) -> Self {
        let mut direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            direction = Vec3::Y;
        }
        Self {
            direction,
            radiance: radiance.max(Vec3::ZERO),
        }
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn radiance(&self) -> Vec3 {
        self.radiance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_high_noon() {
        let light = DirectionalLight::default();
        assert_eq!(light.direction(), Vec3::Y);
        assert_eq!(light.radiance(), Vec3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn new_normalizes_and_clamps() {
        let light = DirectionalLight::new(Vec3::new(3.0, 4.0, 0.0), Vec3::new(1.0, -2.0, 0.25));
        assert!((light.direction() - Vec3::new(0.6, 0.8, 0.0)).length() < 1e-6);
        assert_eq!(light.radiance(), Vec3::new(1.0, 0.0, 0.25));

        let light = DirectionalLight::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(light.direction(), Vec3::Y);
    }
}
