pub mod gemini_client;
pub mod key_value_store;
