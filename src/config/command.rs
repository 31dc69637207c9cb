//! Command ingestion configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Largest command buffer accepted.
pub const MAX_CAPACITY: usize = 65_536;

/// Command configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CommandConfig {
    /// Command label the join flow listens for
    #[serde(default = "default_label")]
    pub label: String,

    /// Buffer size of the broadcast command stream
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl CommandConfig {
    /// Validate command configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.label.is_empty() || self.label.contains(char::is_whitespace) {
            return Err(ValidationError::InvalidCommandLabel);
        }
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(ValidationError::InvalidCapacity);
        }
        Ok(())
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            capacity: default_capacity(),
        }
    }
}

fn default_label() -> String {
    "interactive-login".to_string()
}

fn default_capacity() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CommandConfig::default();
        assert_eq!(config.label, "interactive-login");
        assert_eq!(config.capacity, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn label_with_space_is_rejected() {
        let config = CommandConfig {
            label: "interactive login".to_string(),
            ..CommandConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidCommandLabel)
        ));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = CommandConfig {
            capacity: 0,
            ..CommandConfig::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidCapacity)));
    }

    #[test]
    fn capacity_above_limit_is_rejected() {
        let config = CommandConfig {
            capacity: usize::MAX,
            ..CommandConfig::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidCapacity)));

        let config = CommandConfig {
            capacity: MAX_CAPACITY,
            ..CommandConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
