//! Step definitions for task lifecycle scenarios.

mod given;
mod then;
mod when;
