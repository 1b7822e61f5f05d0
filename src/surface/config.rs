use crate::db::models::Project;

/// Tunable parameters for the depth surface pipeline.
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    /// Readings with a worse (larger) reported accuracy are excluded from
    /// the point set. Boundary inclusive.
    pub max_accuracy_m: f64,

    /// Angular size of one interpolation grid cell, degrees. 0.00005° is
    /// roughly 5 m at mid-latitudes.
    pub cell_size_deg: f64,

    /// Inverse-distance weighting exponent.
    pub idw_power: f64,

    /// Radius of the disk buffered around each vegetation point, meters.
    pub vegetation_radius_m: f64,

    /// Meters added uniformly to depths before interpolation, compensating
    /// for seasonal lake-level changes.
    pub water_level_offset_m: f64,
}

impl SurfaceConfig {
    /// Defaults with the project's water level compensation applied.
    pub fn for_project(project: &Project) -> Self {
        Self {
            water_level_offset_m: project.water_level_offset,
            ..Default::default()
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            max_accuracy_m: 50.0,
            cell_size_deg: 0.00005,
            idw_power: 2.0,
            vegetation_radius_m: 12.0,
            water_level_offset_m: 0.0,
        }
    }
}

/// Triangulation and grid interpolation are undefined below this.
pub const MIN_SURFACE_POINTS: usize = 3;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn project_offset_carries_into_config() {
        let project = Project {
            id: 1,
            name: "Lake".into(),
            water_level_offset: -0.7,
            created_at: Utc::now(),
        };
        let config = SurfaceConfig::for_project(&project);
        assert_eq!(config.water_level_offset_m, -0.7);
        assert_eq!(config.max_accuracy_m, 50.0);
    }
}
