//! Token generation utilities.

use uuid::Uuid;

/// Generator for opaque random identifiers (session tokens, upload suffixes).
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a random session token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // UUID v4 carries no time component
        Uuid::new_v4().simple().to_string()
    }

    /// Generate a short random suffix for de-duplicating file names.
    #[must_use]
    pub fn generate_suffix(&self) -> String {
        let mut token = self.generate_token();
        token.truncate(7);
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token() {
        let id_gen = IdGenerator::new();
        let token = id_gen.generate_token();

        assert_eq!(token.len(), 32); // Simple UUID without hyphens
        assert_ne!(token, id_gen.generate_token());
    }

    #[test]
    fn test_generate_suffix() {
        let suffix = IdGenerator::new().generate_suffix();
        assert_eq!(suffix.len(), 7);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
