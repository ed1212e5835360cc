//! Property-based tests for hashing determinism and ordering
