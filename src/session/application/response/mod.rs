pub mod connection_test_result;
pub mod refresh_outcome;
