//! Shared helpers for unit tests
//!
//! Builders for the handful of method and type shapes the locator tests are written against.
