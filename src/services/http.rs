//! Minimal JSON-over-fetch client.

use log::debug;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use crate::error::AppError;

pub struct HttpResponse {
	pub status: u16,
	pub body: String,
}

impl HttpResponse {
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Decode a 2xx body, turning anything else into `AppError::Backend`.
	pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
		if !self.is_success() {
			return Err(AppError::Backend {
				status: self.status,
				message: self.body.clone(),
			});
		}
		Ok(serde_json::from_str(&self.body)?)
	}

	pub fn empty(&self) -> Result<(), AppError> {
		if self.is_success() {
			Ok(())
		} else {
			Err(AppError::Backend {
				status: self.status,
				message: self.body.clone(),
			})
		}
	}
}

pub async fn send(
	method: &str,
	url: &str,
	headers: &[(&str, String)],
	body: Option<String>,
) -> Result<HttpResponse, AppError> {
	let init = RequestInit::new();
	init.set_method(method);
	let hdrs = Headers::new()?;
	for (name, value) in headers {
		hdrs.set(name, value)?;
	}
	init.set_headers(&hdrs);
	if let Some(body) = &body {
		init.set_body(&JsValue::from_str(body));
	}
	let request = Request::new_with_str_and_init(url, &init)?;

	let window = web_sys::window().ok_or_else(|| AppError::Network("no window".into()))?;
	debug!("{} {}", method, url);
	let response: Response = JsFuture::from(window.fetch_with_request(&request))
		.await?
		.dyn_into()?;
	let text = JsFuture::from(response.text()?).await?;
	Ok(HttpResponse {
		status: response.status(),
		body: text.as_string().unwrap_or_default(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn non_success_bodies_become_backend_errors() {
		let resp = HttpResponse {
			status: 409,
			body: "duplicate key".into(),
		};
		assert_eq!(
			resp.json::<Vec<u8>>(),
			Err(AppError::Backend {
				status: 409,
				message: "duplicate key".into(),
			})
		);
		assert!(resp.empty().is_err());
	}

	#[test]
	fn success_bodies_decode() {
		let resp = HttpResponse {
			status: 201,
			body: "[1,2,3]".into(),
		};
		assert_eq!(resp.json::<Vec<u8>>(), Ok(vec![1, 2, 3]));
	}
}
