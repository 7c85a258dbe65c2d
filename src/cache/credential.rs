use std::fmt;

/// Cache key: the (username, password) pair exactly as the caller sent it.
///
/// Equality is byte-wise on both fields, no case folding or trimming.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// keeps passwords out of logs and panic messages
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_exact() {
        let base = Credential::new("u1", "p1");
        assert_eq!(base, Credential::new("u1", "p1"));
        assert_ne!(base, Credential::new("U1", "p1"));
        assert_ne!(base, Credential::new("u1", "p1 "));
        assert_ne!(base, Credential::new("u1", "p2"));
    }

    #[test]
    fn debug_masks_password() {
        let rendered = format!("{:?}", Credential::new("alice", "hunter2"));
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }
}
