// Application layer - Use cases and the traits they depend on
pub mod analysis_job;
pub mod remote_sources;
