//! Error type shared by the services and the UI.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can go wrong between a user action and its effect.
///
/// None of these are fatal: the UI reports them and leaves the workspace
/// exactly as it was before the attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
	/// Input rejected locally, before any request was made.
	#[error("{0}")]
	Validation(String),
	/// The build was configured without a usable backend.
	#[error("configuration error: {0}")]
	Config(String),
	/// The request never produced a response.
	#[error("network error: {0}")]
	Network(String),
	/// The backend answered with a non-success status.
	#[error("backend returned {status}: {message}")]
	Backend { status: u16, message: String },
	/// The profile generator is throttling us.
	#[error("Rate limit exceeded. Please try again later.")]
	RateLimited,
	/// The profile generator has no credits left.
	#[error("AI credits exhausted. Please add funds to your workspace.")]
	QuotaExhausted,
	/// The profile generator failed for any other reason.
	#[error("profile generation failed: {0}")]
	Generation(String),
	/// A response body did not have the expected shape.
	#[error("unexpected response: {0}")]
	Decode(String),
}

impl AppError {
	/// Short text suitable for a toast description.
	pub fn user_message(&self) -> String {
		match self {
			Self::Validation(msg) => msg.clone(),
			Self::Generation(msg) => msg.clone(),
			Self::RateLimited | Self::QuotaExhausted => self.to_string(),
			Self::Config(_) => "The application is not connected to a backend.".into(),
			Self::Network(_) | Self::Backend { .. } | Self::Decode(_) => {
				"The request could not be completed. Please try again.".into()
			}
		}
	}
}

impl From<JsValue> for AppError {
	fn from(value: JsValue) -> Self {
		let msg = value
			.as_string()
			.or_else(|| {
				js_sys::Reflect::get(&value, &JsValue::from_str("message"))
					.ok()
					.and_then(|m| m.as_string())
			})
			.unwrap_or_else(|| format!("{:?}", value));
		Self::Network(msg)
	}
}

impl From<serde_json::Error> for AppError {
	fn from(err: serde_json::Error) -> Self {
		Self::Decode(err.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn generator_errors_keep_their_own_wording() {
		assert_eq!(
			AppError::RateLimited.user_message(),
			"Rate limit exceeded. Please try again later."
		);
		assert_eq!(
			AppError::QuotaExhausted.user_message(),
			"AI credits exhausted. Please add funds to your workspace."
		);
		assert_eq!(
			AppError::Generation("model offline".into()).user_message(),
			"model offline"
		);
	}

	#[test]
	fn transport_details_stay_out_of_toasts() {
		let err = AppError::Backend {
			status: 500,
			message: "relation \"companies\" does not exist".into(),
		};
		assert!(!err.user_message().contains("companies"));
		assert!(err.to_string().contains("500"));
	}

	#[test]
	fn serde_failures_become_decode_errors() {
		let err: AppError = serde_json::from_str::<u32>("nope").unwrap_err().into();
		assert!(matches!(err, AppError::Decode(_)));
	}
}
