// Domain layer - Pure data types and calculations
pub mod chart;
pub mod repository;
