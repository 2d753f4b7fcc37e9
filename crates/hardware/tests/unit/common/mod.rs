//! Unit tests for shared types.
