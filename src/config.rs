//! Build-time configuration for the hosted backend.

use crate::error::AppError;

const DEFAULT_GENERATE_FUNCTION: &str = "generate-entity";

/// Where the stores and the profile generator live.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppConfig {
	pub backend_url: String,
	pub backend_key: String,
	pub generate_function: String,
}

impl AppConfig {
	/// Read the configuration baked in at compile time.
	pub fn from_env() -> Self {
		Self::from_parts(
			option_env!("ENTITY_CANVAS_BACKEND_URL"),
			option_env!("ENTITY_CANVAS_BACKEND_KEY"),
			option_env!("ENTITY_CANVAS_GENERATE_FUNCTION"),
		)
	}

	fn from_parts(url: Option<&str>, key: Option<&str>, function: Option<&str>) -> Self {
		Self {
			backend_url: url.unwrap_or_default().trim().trim_end_matches('/').to_string(),
			backend_key: key.unwrap_or_default().trim().to_string(),
			generate_function: function
				.map(str::trim)
				.filter(|f| !f.is_empty())
				.unwrap_or(DEFAULT_GENERATE_FUNCTION)
				.to_string(),
		}
	}

	pub fn validate(&self) -> Result<(), AppError> {
		if self.backend_url.is_empty() {
			return Err(AppError::Config("ENTITY_CANVAS_BACKEND_URL is not set".into()));
		}
		if self.backend_key.is_empty() {
			return Err(AppError::Config("ENTITY_CANVAS_BACKEND_KEY is not set".into()));
		}
		Ok(())
	}

	pub fn rest_url(&self, table: &str) -> String {
		format!("{}/rest/v1/{}", self.backend_url, table)
	}

	pub fn function_url(&self) -> String {
		format!("{}/functions/v1/{}", self.backend_url, self.generate_function)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_values_fall_back() {
		let cfg = AppConfig::from_parts(None, None, None);
		assert_eq!(cfg.generate_function, "generate-entity");
		assert!(matches!(cfg.validate(), Err(AppError::Config(_))));
	}

	#[test]
	fn urls_are_built_without_double_slashes() {
		let cfg = AppConfig::from_parts(Some("https://db.example.com/"), Some("anon"), Some(" "));
		assert_eq!(cfg.validate(), Ok(()));
		assert_eq!(cfg.rest_url("companies"), "https://db.example.com/rest/v1/companies");
		assert_eq!(
			cfg.function_url(),
			"https://db.example.com/functions/v1/generate-entity"
		);
	}

	#[test]
	fn key_is_required() {
		let cfg = AppConfig::from_parts(Some("https://db.example.com"), Some(""), None);
		assert!(matches!(cfg.validate(), Err(AppError::Config(msg)) if msg.contains("KEY")));
	}
}
