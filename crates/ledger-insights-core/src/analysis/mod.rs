pub mod alerts;
pub mod quality;
pub mod ratios;
