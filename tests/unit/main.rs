//! Unit test modules.

mod engine_test;
