//! Client for the hosted profile generator.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::http;
use crate::config::AppConfig;
use crate::error::AppError;

/// Structured profile returned by the generator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityProfile {
	pub name: String,
	#[serde(default)]
	pub who_they_are: Option<String>,
	#[serde(default)]
	pub goals: Option<String>,
	#[serde(default)]
	pub risk_appetite: Option<String>,
	#[serde(default)]
	pub market_position: Option<String>,
	#[serde(default)]
	pub leadership_style: Option<String>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
	#[serde(rename = "companyData")]
	company_data: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
	#[serde(default)]
	profile: Option<EntityProfile>,
	#[serde(default)]
	error: Option<String>,
}

/// Map a generator reply onto a profile or one of the three failure kinds.
fn interpret(status: u16, body: &str) -> Result<EntityProfile, AppError> {
	match status {
		429 => return Err(AppError::RateLimited),
		402 => return Err(AppError::QuotaExhausted),
		_ => {}
	}
	let parsed: Option<GenerateResponse> = serde_json::from_str(body).ok();
	if !(200..300).contains(&status) {
		let message = parsed
			.and_then(|r| r.error)
			.unwrap_or_else(|| format!("generator returned status {}", status));
		return Err(AppError::Generation(message));
	}
	let parsed = parsed.ok_or_else(|| AppError::Generation("malformed generator response".into()))?;
	if let Some(err) = parsed.error {
		return Err(AppError::Generation(err));
	}
	match parsed.profile {
		Some(profile) if !profile.name.trim().is_empty() => Ok(profile),
		Some(_) => Err(AppError::Generation("generated profile has no name".into())),
		None => Err(AppError::Generation("generator returned no profile".into())),
	}
}

/// Ask the generator to turn free-form company content into a profile.
pub async fn generate_profile(
	config: &AppConfig,
	content: &str,
) -> Result<EntityProfile, AppError> {
	if content.trim().is_empty() {
		return Err(AppError::Validation(
			"Please upload a file, enter text, or provide a URL.".into(),
		));
	}
	config.validate()?;
	let body = serde_json::to_string(&GenerateRequest {
		company_data: content,
	})?;
	let headers = [
		("apikey", config.backend_key.clone()),
		("Authorization", format!("Bearer {}", config.backend_key)),
		("Content-Type", "application/json".to_string()),
	];
	let resp = http::send("POST", &config.function_url(), &headers, Some(body)).await?;
	let result = interpret(resp.status, &resp.body);
	match &result {
		Ok(profile) => info!("generated profile for {}", profile.name),
		Err(err) => warn!("profile generation failed: {}", err),
	}
	result
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn throttling_and_quota_are_distinguished() {
		assert_eq!(interpret(429, "{}"), Err(AppError::RateLimited));
		assert_eq!(interpret(402, ""), Err(AppError::QuotaExhausted));
	}

	#[test]
	fn server_error_message_is_kept() {
		assert_eq!(
			interpret(500, r#"{"error":"AI gateway error: 503"}"#),
			Err(AppError::Generation("AI gateway error: 503".into()))
		);
		assert_eq!(
			interpret(502, "<html>bad gateway</html>"),
			Err(AppError::Generation("generator returned status 502".into()))
		);
	}

	#[test]
	fn profile_is_extracted() {
		let body = r#"{"profile":{"name":"Acme","who_they_are":"Makes anvils","goals":"Grow",
			"risk_appetite":"moderate","market_position":"leader","leadership_style":"flat"}}"#;
		let profile = interpret(200, body).unwrap();
		assert_eq!(
			profile,
			EntityProfile {
				name: "Acme".into(),
				who_they_are: Some("Makes anvils".into()),
				goals: Some("Grow".into()),
				risk_appetite: Some("moderate".into()),
				market_position: Some("leader".into()),
				leadership_style: Some("flat".into()),
			}
		);
	}

	#[test]
	fn nameless_or_missing_profiles_fail() {
		let blank = r#"{"profile":{"name":"  "}}"#;
		assert!(matches!(interpret(200, blank), Err(AppError::Generation(_))));
		assert!(matches!(interpret(200, r#"{}"#), Err(AppError::Generation(_))));
		assert!(matches!(interpret(200, "not json"), Err(AppError::Generation(_))));
	}

	#[test]
	fn request_uses_camel_case_field() {
		let body = serde_json::to_string(&GenerateRequest {
			company_data: "URL: https://acme.test",
		})
		.unwrap();
		assert_eq!(body, r#"{"companyData":"URL: https://acme.test"}"#);
	}
}
