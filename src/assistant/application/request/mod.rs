pub mod generation_request;
