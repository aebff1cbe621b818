// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconstruction configuration.
//!
//! Tolerances are stored in meters and converted to plan units through the
//! plan scale: a plan rendered at `dpi` dots per inch, drawn at `plan_scale`
//! and resized by `global_scale` before detection.

use bimify_topology::{AnchorConfig, JunctionConfig, OpeningConfig, SideConfig};
use serde::{Deserialize, Serialize};

use crate::error::{ReconstructionError, Result};

const CM_PER_INCH: f64 = 2.54;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Rendering resolution of the plan image
    pub dpi: f64,
    /// Drawing scale (0.01 for 1:100)
    pub plan_scale: f64,
    /// Resize factor applied before detection
    pub global_scale: f64,

    /// Maximum growth of a wall towards a junction
    pub join_max_length_m: f64,
    /// Junction points closer than this share a node
    pub node_merge_tolerance_m: f64,
    /// Walls closer than this in direction are parallel
    pub angle_tolerance_deg: f64,

    /// Walls farther than this from an opening's center cannot host it
    pub opening_host_radius_m: f64,
    /// Added to half the host wall thickness to probe for rooms
    pub opening_probe_clearance_m: f64,
    /// Thickness of the nominal opening footprint
    pub opening_thickness_m: f64,

    /// Outward buffer on object footprints during linearization
    pub object_buffer_m: f64,
    /// Added to the wall thickness for opening footprints during linearization
    pub opening_side_margin_m: f64,
    /// Half the side stretch an outlet reserves, in plan units
    pub outlet_half_width: f64,
    /// How far outside a room edge a wall centerline may lie and still bound it
    pub surrounding_wall_margin_m: f64,

    /// How far past an object's footprint anchoring probes reach
    pub anchor_ray_margin_m: f64,
    /// Wall search radius for objects outside every room
    pub anchor_wall_search_m: f64,
    /// Beds narrower than this are single beds
    pub single_bed_width_m: f64,

    /// Room detections smaller than this are discarded
    pub min_room_area_m2: f64,
    /// Empty rooms smaller than this are shafts
    pub max_shaft_area_m2: f64,
    /// Openings and objects scored below this are discarded
    pub min_score: f32,

    /// Cut walls into subwalls between their junctions
    pub split_walls_at_junctions: bool,
    /// Group rooms into housings over door adjacency
    pub group_housings: bool,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            dpi: 144.0,
            plan_scale: 0.01,
            global_scale: 2.0,
            join_max_length_m: 0.4,
            node_merge_tolerance_m: 0.02,
            angle_tolerance_deg: 3.0,
            opening_host_radius_m: 0.5,
            opening_probe_clearance_m: 0.3,
            opening_thickness_m: 0.04,
            object_buffer_m: 0.07,
            opening_side_margin_m: 0.2,
            outlet_half_width: 5.0,
            surrounding_wall_margin_m: 0.1,
            anchor_ray_margin_m: 0.5,
            anchor_wall_search_m: 1.0,
            single_bed_width_m: 1.2,
            min_room_area_m2: 0.03,
            max_shaft_area_m2: 1.0,
            min_score: 0.2,
            split_walls_at_junctions: false,
            group_housings: true,
        }
    }
}

impl ReconstructionConfig {
    /// Plan units per meter (about 113.4 with the defaults).
    pub fn units_per_meter(&self) -> f64 {
        self.dpi / CM_PER_INCH * 100.0 * self.plan_scale * self.global_scale
    }

    pub fn to_units(&self, meters: f64) -> f64 {
        meters * self.units_per_meter()
    }

    /// Square plan units for an area in square meters.
    pub fn area_to_units(&self, square_meters: f64) -> f64 {
        square_meters * self.units_per_meter().powi(2)
    }

    /// Defaults with the plan scale overridden from `BIMIFY_DPI`,
    /// `BIMIFY_PLAN_SCALE` and `BIMIFY_GLOBAL_SCALE`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            dpi: std::env::var("BIMIFY_DPI")
                .unwrap_or_else(|_| defaults.dpi.to_string())
                .parse()
                .unwrap_or(defaults.dpi),
            plan_scale: std::env::var("BIMIFY_PLAN_SCALE")
                .unwrap_or_else(|_| defaults.plan_scale.to_string())
                .parse()
                .unwrap_or(defaults.plan_scale),
            global_scale: std::env::var("BIMIFY_GLOBAL_SCALE")
                .unwrap_or_else(|_| defaults.global_scale.to_string())
                .parse()
                .unwrap_or(defaults.global_scale),
            ..defaults
        }
    }

    /// Loads a configuration; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let upm = self.units_per_meter();
        if upm.is_nan() || upm <= 0.0 {
            return Err(ReconstructionError::Config(format!(
                "plan scale must be positive (dpi {}, plan scale {}, global scale {})",
                self.dpi, self.plan_scale, self.global_scale
            )));
        }
        if self.outlet_half_width < 0.0 {
            return Err(ReconstructionError::Config(
                "outlet half width must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn junction_config(&self) -> JunctionConfig {
        JunctionConfig {
            join_max_length: self.to_units(self.join_max_length_m),
            angle_tolerance: self.angle_tolerance_deg.to_radians(),
            node_merge_tolerance: self.to_units(self.node_merge_tolerance_m),
        }
    }

    pub fn side_config(&self) -> SideConfig {
        SideConfig {
            object_buffer: self.to_units(self.object_buffer_m),
            opening_margin: self.to_units(self.opening_side_margin_m),
            outlet_half_width: self.outlet_half_width,
        }
    }

    pub fn opening_config(&self) -> OpeningConfig {
        OpeningConfig {
            probe_clearance: self.to_units(self.opening_probe_clearance_m),
            default_thickness: self.to_units(self.opening_thickness_m),
        }
    }

    pub fn anchor_config(&self) -> AnchorConfig {
        AnchorConfig {
            ray_margin: self.to_units(self.anchor_ray_margin_m),
            wall_search_radius: self.to_units(self.anchor_wall_search_m),
            single_bed_width: self.to_units(self.single_bed_width_m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_scale() {
        let config = ReconstructionConfig::default();
        assert_relative_eq!(config.units_per_meter(), 113.385_826_771_653_5, epsilon = 1e-9);
        assert_relative_eq!(config.to_units(0.4), 45.354, epsilon = 1e-3);
        assert_relative_eq!(config.area_to_units(1.0), 12856.34, epsilon = 1e-2);
    }

    #[test]
    fn component_configs_are_in_plan_units() {
        let config = ReconstructionConfig::default();
        assert_relative_eq!(config.opening_config().probe_clearance, 34.0, epsilon = 0.1);
        assert_relative_eq!(config.opening_config().default_thickness, 4.5, epsilon = 0.1);
        assert_relative_eq!(config.side_config().opening_margin, 22.7, epsilon = 0.1);
        assert_relative_eq!(config.anchor_config().ray_margin, 56.7, epsilon = 0.1);
        assert_relative_eq!(config.junction_config().angle_tolerance, 3f64.to_radians());
    }

    #[test]
    fn json_keeps_defaults_for_missing_fields() {
        let config = ReconstructionConfig::from_json(r#"{"dpi": 72.0, "group_housings": false}"#).unwrap();
        assert_eq!(config.dpi, 72.0);
        assert!(!config.group_housings);
        assert_eq!(config.plan_scale, 0.01);
        assert_relative_eq!(config.units_per_meter(), 113.385_826_771_653_5 / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_scale_is_rejected() {
        let err = ReconstructionConfig::from_json(r#"{"plan_scale": 0.0}"#).unwrap_err();
        assert!(matches!(err, ReconstructionError::Config(_)));
    }
}
