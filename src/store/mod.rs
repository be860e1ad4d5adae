pub mod access_points;
pub mod devices;
