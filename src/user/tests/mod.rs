//! Unit tests for the user module.
