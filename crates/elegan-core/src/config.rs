use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed for food placement.
    pub seed: u64,
    /// Number of cells along the x axis.
    pub grid_width: usize,
    /// Number of cells along the y axis.
    pub grid_height: usize,
    /// Side length of a cell in pixels.
    pub unit_size: usize,
    /// Pixels left unpainted between neighbouring cells. Must be below `unit_size`.
    pub unit_gap: usize,
    /// Number of agents spawned per episode.
    pub n_elegans: usize,
    /// Number of food items kept on the grid.
    pub n_foods: usize,
    /// Scent intensity painted at a food cell.
    pub food_intensity: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            grid_width: 15,
            grid_height: 15,
            unit_size: 10,
            unit_gap: 1,
            n_elegans: 1,
            n_foods: 1,
            food_intensity: crate::constants::FOOD_COLOR,
        }
    }
}

macro_rules! define_sim_config_error {
    (
        $(
            $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
        );* $(;)?
    ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum SimConfigError {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
        }

        impl std::fmt::Display for SimConfigError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                }
            }
        }
    };
}

define_sim_config_error! {
    TooManyElegansForWidth { n_elegans: usize, grid_width: usize } => "n_elegans ({}) must be less than grid_width / 3 ({})", n_elegans, grid_width / 3;
    TooManyElegans { max: usize, actual: usize } => "n_elegans ({}) must be less than {}", actual, max;
    GridTooShort { grid_height: usize } => "grid_height / 2 must be greater than 4 (grid_height = {})", grid_height;
    InvalidUnitGap { unit_gap: usize, unit_size: usize } => "unit_gap ({}) must be less than unit_size ({})", unit_gap, unit_size;
    GridTooLarge { max: usize, width: usize, height: usize } => "grid {}x{} exceeds supported maximum dimension ({})", width, height, max;
    TooManyPixels { max: usize } => "pixel buffer exceeds supported maximum ({} pixels)", max;
    InvalidFoodIntensity => "food_intensity must be finite and positive";
}

impl std::error::Error for SimConfigError {}

impl SimConfig {
    pub const MAX_GRID_DIMENSION: usize = crate::constants::MAX_GRID_DIMENSION;

    pub const MAX_PIXELS: usize = crate::constants::MAX_PIXELS;

    pub const MAX_ELEGANS: usize = crate::constants::MAX_ELEGANS;

    pub fn validate(&self) -> Result<(), SimConfigError> {
        self.validate_elegans()?;
        self.validate_grid()?;
        self.validate_food()?;
        Ok(())
    }

    fn validate_elegans(&self) -> Result<(), SimConfigError> {
        if self.n_elegans >= self.grid_width / 3 {
            return Err(SimConfigError::TooManyElegansForWidth {
                n_elegans: self.n_elegans,
                grid_width: self.grid_width,
            });
        }
        if self.n_elegans >= Self::MAX_ELEGANS {
            return Err(SimConfigError::TooManyElegans {
                max: Self::MAX_ELEGANS,
                actual: self.n_elegans,
            });
        }
        Ok(())
    }

    fn validate_grid(&self) -> Result<(), SimConfigError> {
        if self.grid_height / 2 <= 4 {
            return Err(SimConfigError::GridTooShort {
                grid_height: self.grid_height,
            });
        }
        if self.unit_gap >= self.unit_size {
            return Err(SimConfigError::InvalidUnitGap {
                unit_gap: self.unit_gap,
                unit_size: self.unit_size,
            });
        }
        if self.grid_width > Self::MAX_GRID_DIMENSION || self.grid_height > Self::MAX_GRID_DIMENSION
        {
            return Err(SimConfigError::GridTooLarge {
                max: Self::MAX_GRID_DIMENSION,
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        let pixels = self
            .grid_width
            .checked_mul(self.unit_size)
            .and_then(|w| {
                self.grid_height
                    .checked_mul(self.unit_size)
                    .and_then(|h| w.checked_mul(h))
            })
            .ok_or(SimConfigError::TooManyPixels {
                max: Self::MAX_PIXELS,
            })?;
        if pixels > Self::MAX_PIXELS {
            return Err(SimConfigError::TooManyPixels {
                max: Self::MAX_PIXELS,
            });
        }
        Ok(())
    }

    fn validate_food(&self) -> Result<(), SimConfigError> {
        if !(self.food_intensity.is_finite() && self.food_intensity > 0.0) {
            return Err(SimConfigError::InvalidFoodIntensity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_agent_count_at_width_third() {
        let config = SimConfig {
            grid_width: 15,
            n_elegans: 5,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SimConfigError::TooManyElegansForWidth {
                n_elegans: 5,
                grid_width: 15
            })
        );
        let config = SimConfig {
            n_elegans: 4,
            ..config
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_agent_count_at_hard_cap() {
        let config = SimConfig {
            grid_width: 200,
            n_elegans: 25,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SimConfigError::TooManyElegans {
                max: 25,
                actual: 25
            })
        );
    }

    #[test]
    fn rejects_short_grid() {
        let config = SimConfig {
            grid_height: 9,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SimConfigError::GridTooShort { grid_height: 9 })
        );
        let config = SimConfig {
            grid_height: 10,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_gap_not_below_unit_size() {
        let config = SimConfig {
            unit_size: 4,
            unit_gap: 4,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SimConfigError::InvalidUnitGap {
                unit_gap: 4,
                unit_size: 4
            })
        );
    }

    #[test]
    fn zero_gap_is_accepted() {
        let config = SimConfig {
            unit_gap: 0,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_oversized_grid_and_pixel_buffer() {
        let config = SimConfig {
            grid_width: SimConfig::MAX_GRID_DIMENSION + 1,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimConfigError::GridTooLarge { .. })
        ));
        let config = SimConfig {
            grid_width: 512,
            grid_height: 512,
            unit_size: 64,
            unit_gap: 1,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimConfigError::TooManyPixels { .. })
        ));
    }

    #[test]
    fn rejects_non_positive_food_intensity() {
        for food_intensity in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = SimConfig {
                food_intensity,
                ..SimConfig::default()
            };
            assert_eq!(config.validate(), Err(SimConfigError::InvalidFoodIntensity));
        }
    }

    #[test]
    fn error_messages_name_the_offending_parameter() {
        let err = SimConfigError::TooManyElegansForWidth {
            n_elegans: 6,
            grid_width: 15,
        };
        assert_eq!(
            err.to_string(),
            "n_elegans (6) must be less than grid_width / 3 (5)"
        );
    }

    #[test]
    fn partial_config_json_deserializes_with_defaults() {
        let partial_json = r#"{
            "grid_width": 30,
            "grid_height": 30,
            "n_elegans": 3
        }"#;
        let cfg: SimConfig =
            serde_json::from_str(partial_json).expect("partial config should parse");
        assert_eq!(cfg.grid_width, 30);
        assert_eq!(cfg.n_elegans, 3);
        assert_eq!(cfg.unit_size, 10);
        assert_eq!(cfg.unit_gap, 1);
        assert_eq!(cfg.n_foods, 1);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn config_survives_json_round_trip() {
        let config = SimConfig {
            seed: 7,
            n_foods: 3,
            ..SimConfig::default()
        };
        let json = serde_json::to_string(&config).expect("config should serialize");
        let back: SimConfig = serde_json::from_str(&json).expect("config should parse");
        assert_eq!(back, config);
    }
}
