//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// First error as a [`ConfigError`], if any.
    pub fn into_error(self) -> Option<ConfigError> {
        self.errors.into_iter().next().map(|e| ConfigError::InvalidValue {
            field: e.path,
            message: e.message,
        })
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
///
/// Selector syntax is already enforced while deserializing; this checks
/// everything that parses but cannot work.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_settings(config, &mut result);
        Self::validate_gemini(config, &mut result);
        Self::validate_page(config, &mut result);
        Self::validate_timing(config, &mut result);

        result
    }

    fn validate_settings(config: &Config, result: &mut ValidationResult) {
        if !config.settings.has_api_key() {
            result.add_warning(ValidationWarning::new(
                "settings.api_key",
                "API key is not set, comment generation will fail until one is saved",
            ));
        }
    }

    fn validate_gemini(config: &Config, result: &mut ValidationResult) {
        match url::Url::parse(&config.gemini.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(_) => result.add_error(ValidationError::new(
                "gemini.base_url",
                "base_url must start with http:// or https://",
            )),
            Err(e) => result.add_error(ValidationError::new(
                "gemini.base_url",
                format!("base_url is not a valid URL: {}", e),
            )),
        }

        if config.gemini.model.trim().is_empty() {
            result.add_error(ValidationError::new(
                "gemini.model",
                "Model cannot be empty",
            ));
        }
    }

    fn validate_page(config: &Config, result: &mut ValidationResult) {
        if config.page.target_selectors.is_empty() {
            result.add_error(ValidationError::new(
                "page.target_selectors",
                "At least one target selector is required",
            ));
        }

        if config.page.content_selectors.is_empty() {
            result.add_warning(ValidationWarning::new(
                "page.content_selectors",
                "No content selectors, every prompt will use the fallback context",
            ));
        }

        if config.page.fallback_context.trim().is_empty() {
            result.add_error(ValidationError::new(
                "page.fallback_context",
                "Fallback context cannot be empty",
            ));
        }

        for host in &config.page.allowed_hosts {
            if host.trim().is_empty() || host.contains('/') {
                result.add_error(ValidationError::new(
                    "page.allowed_hosts",
                    format!("'{}' is not a host name", host),
                ));
            }
        }
    }

    fn validate_timing(config: &Config, result: &mut ValidationResult) {
        if config.watcher.debounce_ms == 0 {
            result.add_error(ValidationError::new(
                "watcher.debounce_ms",
                "debounce_ms must be greater than 0",
            ));
        }

        if config.watcher.debounce_ms > 5000 {
            result.add_warning(ValidationWarning::new(
                "watcher.debounce_ms",
                "debounce_ms is very high (>5000), new comment boxes will be slow to get a button",
            ));
        }

        if config.auto_action.interval_ms == 0 {
            result.add_error(ValidationError::new(
                "auto_action.interval_ms",
                "interval_ms must be greater than 0",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
