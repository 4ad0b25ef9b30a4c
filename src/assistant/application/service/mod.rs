pub mod chat_session;
pub mod prompt_builder;
pub mod report_service;
pub mod text_generator;
