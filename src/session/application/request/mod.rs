pub mod endpoint_request;
