// Presentation layer - Command line entry points
pub mod cli;
