//! Small helpers shared by unit and integration tests.

pub mod test_helpers;
