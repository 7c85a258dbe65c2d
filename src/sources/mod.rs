/// Authorization server client
///
/// Performs the password and refresh grants and normalizes every reply.
pub mod authority;
pub mod response;
