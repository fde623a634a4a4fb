//! Row-level tenant isolation for a multi-tenant recruiting, payroll and HR suite.

pub mod config;
pub mod error;
pub mod isolation;
pub mod suite;
pub mod telemetry;
