//! Error types for the planning core.

use thiserror::Error;

/// Input validation failures. Empty results and exhausted budgets are not errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    #[error("invalid grid parameters: {0}")]
    InvalidGrid(String),
    #[error("invalid base region: i {min_i}..={max_i}, j {min_j}..={max_j}")]
    InvalidBaseRegion {
        min_i: i32,
        max_i: i32,
        min_j: i32,
        max_j: i32,
    },
    #[error("no Übersquadrat found in visited set")]
    NoUbersquadrat,
}

/// Road geometry that cannot be used for waypoint placement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("line needs at least 2 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
    #[error("line has zero length")]
    ZeroLength,
}
