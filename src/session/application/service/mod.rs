pub mod endpoint_tester;
pub mod session_state;
pub mod settings_repository;
