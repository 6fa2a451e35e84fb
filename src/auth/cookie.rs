use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

/// Derives the private-cookie key from the application secret.
///
/// The same secret always yields the same key, so cookies survive restarts.
pub fn cookie_key(secret_key: &str) -> Key {
    let digest = Sha512::digest(secret_key.as_bytes());
    Key::from(&digest[..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let a = cookie_key("your-secret-key-here");
        let b = cookie_key("your-secret-key-here");
        let c = cookie_key("another-secret");

        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
        assert_eq!(a.master().len(), 64);
    }
}
