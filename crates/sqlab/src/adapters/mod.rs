pub mod bridge;
pub mod browse;
