pub mod credential;
pub mod token;
pub mod token_cache;
