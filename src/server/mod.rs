pub mod request_token;
pub mod server;
