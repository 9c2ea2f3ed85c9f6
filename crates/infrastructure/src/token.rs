use application::TokenGenerator;
use domain::{AuthToken, DomainError};
use rand::{distr::Alphanumeric, Rng};

pub const DEFAULT_TOKEN_LENGTH: usize = 32;

/// 随机字母数字令牌。
#[derive(Debug, Clone)]
pub struct RandomTokenGenerator {
    length: usize,
}

impl RandomTokenGenerator {
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(1),
        }
    }
}

impl Default for RandomTokenGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_LENGTH)
    }
}

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> Result<AuthToken, DomainError> {
        let token: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect();
        AuthToken::new(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_alphanumeric_with_configured_length() {
        let generator = RandomTokenGenerator::new(40);
        let token = generator.generate().unwrap();
        assert_eq!(token.as_str().len(), 40);
        assert!(token.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn consecutive_tokens_differ() {
        let generator = RandomTokenGenerator::default();
        assert_ne!(generator.generate().unwrap(), generator.generate().unwrap());
    }
}
