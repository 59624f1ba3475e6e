//! Default value functions for serde deserialization.

pub fn store_path() -> String {
    "instance/rtabmap.db".to_string()
}

pub fn resolution() -> f64 {
    0.05
}

pub fn padding_m() -> f64 {
    1.0
}

pub fn stride() -> usize {
    1
}

pub fn max_points_per_scan() -> usize {
    20_000
}

pub fn max_cells() -> u64 {
    150_000_000
}

pub fn output_dir() -> String {
    "instance".to_string()
}

pub fn image_name() -> String {
    "map_occupancy.png".to_string()
}
