use serde::{Deserialize, Serialize};

use crate::errors::{DispatchError, Result};

/// 地球平均半径（公里）
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0;

/// 地理坐标（度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// 创建经过校验的坐标
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let location = Self {
            latitude,
            longitude,
        };
        location.validate()?;
        Ok(location)
    }

    /// 坐标是否在合法范围内: -90≤lat≤90, -180≤lon≤180
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(DispatchError::InvalidLocation {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// 两点之间的大圆距离（haversine，公里，不考虑海拔）
    pub fn haversine_km(&self, other: &Location) -> f64 {
        let phi1 = self.latitude.to_radians();
        let phi2 = other.latitude.to_radians();
        let d_phi = (other.latitude - self.latitude).to_radians();
        let d_lambda = (other.longitude - self.longitude).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        // 浮点误差可能让 a 略大于 1
        2.0 * EARTH_MEAN_RADIUS_KM * a.sqrt().min(1.0).asin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_range_validation() {
        assert!(Location::new(0.0, 0.0).is_ok());
        assert!(Location::new(90.0, 180.0).is_ok());
        assert!(Location::new(-90.0, -180.0).is_ok());
        assert!(Location::new(90.1, 0.0).is_err());
        assert!(Location::new(0.0, -180.5).is_err());
        assert!(Location::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_haversine_one_degree_on_equator() {
        let origin = Location::new(0.0, 0.0).unwrap();
        let east = Location::new(0.0, 1.0).unwrap();
        let expected = EARTH_MEAN_RADIUS_KM * 1.0_f64.to_radians();
        assert!((origin.haversine_km(&east) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_symmetric_and_zero_for_same_point() {
        let a = Location::new(48.8566, 2.3522).unwrap();
        let b = Location::new(51.5074, -0.1278).unwrap();
        assert_eq!(a.haversine_km(&a), 0.0);
        assert!((a.haversine_km(&b) - b.haversine_km(&a)).abs() < 1e-9);
        // 巴黎到伦敦约 344 公里
        assert!((a.haversine_km(&b) - 343.5).abs() < 2.0);
    }

    #[test]
    fn test_haversine_antipodal_points() {
        let a = Location::new(0.0, 0.0).unwrap();
        let b = Location::new(0.0, 180.0).unwrap();
        let half_circumference = std::f64::consts::PI * EARTH_MEAN_RADIUS_KM;
        assert!((a.haversine_km(&b) - half_circumference).abs() < 1e-6);
    }
}
