//! Unit test suite for the engine core, one module per concern.

mod helpers;

mod book_tests;
mod property_tests;
