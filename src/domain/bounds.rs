// Linear mapping from a sensor range into a rendering-space range
use super::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataBounds {
    data_min: f64,
    data_max: f64,
    output_min: f64,
    output_max: f64,
}

impl DataBounds {
    pub fn new(
        data_min: f64,
        data_max: f64,
        output_min: f64,
        output_max: f64,
    ) -> Result<Self, ConfigurationError> {
        // Also rejects NaN bounds.
        if !(data_max > data_min) {
            return Err(ConfigurationError::InvalidBounds {
                min: data_min,
                max: data_max,
            });
        }

        Ok(Self {
            data_min,
            data_max,
            output_min,
            output_max,
        })
    }

    /// Map `value` into the output range. Values outside `[data_min, data_max]`
    /// yield `None` rather than being clamped.
    pub fn normalize(&self, value: f64) -> Option<f64> {
        if value < self.data_min || value > self.data_max || value.is_nan() {
            return None;
        }

        let ratio = (value - self.data_min) / (self.data_max - self.data_min);
        Some(ratio * (self.output_max - self.output_min) + self.output_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let bounds = DataBounds::new(0.0, 10.0, 0.0, 1.0).unwrap();
        assert_eq!(bounds.normalize(5.0), Some(0.5));
        assert_eq!(bounds.normalize(0.0), Some(0.0));
        assert_eq!(bounds.normalize(10.0), Some(1.0));
        assert_eq!(bounds.normalize(-1.0), None);
        assert_eq!(bounds.normalize(10.5), None);
    }

    #[test]
    fn test_normalize_into_offset_range() {
        let bounds = DataBounds::new(20.0, 40.0, 1.0, 3.0).unwrap();
        assert_eq!(bounds.normalize(30.0), Some(2.0));
    }

    #[test]
    fn test_degenerate_bounds_rejected() {
        assert_eq!(
            DataBounds::new(5.0, 5.0, 0.0, 1.0),
            Err(ConfigurationError::InvalidBounds { min: 5.0, max: 5.0 })
        );
        assert!(DataBounds::new(5.0, 1.0, 0.0, 1.0).is_err());
    }
}
