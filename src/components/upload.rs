//! Form that turns a file, pasted text or a URL into an entity profile.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, HtmlInputElement};

use super::toast::use_toaster;
use crate::error::AppError;
use crate::services::backend::Backend;
use crate::services::generator::{EntityProfile, generate_profile};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SourceTab {
	File,
	Text,
	Url,
}

/// Pick the content to send. A chosen file wins over pasted text, which
/// wins over a URL.
fn compose_content(file_text: Option<String>, text: &str, url: &str) -> Result<String, AppError> {
	if let Some(content) = file_text.filter(|c| !c.trim().is_empty()) {
		return Ok(content);
	}
	if !text.trim().is_empty() {
		return Ok(text.to_string());
	}
	let url = url.trim();
	if !url.is_empty() {
		return Ok(format!("URL: {}", url));
	}
	Err(AppError::Validation(
		"Please upload a file, enter text, or provide a URL.".into(),
	))
}

async fn read_file(file: &File) -> Result<String, AppError> {
	let value = JsFuture::from(file.text()).await?;
	value
		.as_string()
		.ok_or_else(|| AppError::Decode(format!("{} is not a text file", file.name())))
}

#[component]
pub fn UploadPanel(
	backend: StoredValue<Backend>,
	/// Receives the generated profile and the content it was generated from.
	#[prop(into)]
	on_generated: Callback<(EntityProfile, String)>,
) -> impl IntoView {
	let toaster = use_toaster();
	let tab = RwSignal::new(SourceTab::File);
	let file = RwSignal::new_local(None::<File>);
	let file_input = NodeRef::<leptos::html::Input>::new();
	let text = RwSignal::new(String::new());
	let url = RwSignal::new(String::new());
	let generating = RwSignal::new(false);

	let reset = move || {
		file.set(None);
		if let Some(input) = file_input.get_untracked() {
			input.set_value("");
		}
		text.set(String::new());
		url.set(String::new());
	};

	let on_file = move |ev: web_sys::Event| {
		let chosen = ev
			.target()
			.and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
			.and_then(|input| input.files())
			.and_then(|files| files.item(0));
		file.set(chosen);
	};

	let generate = move |_| {
		if generating.get_untracked() {
			return;
		}
		let chosen = file.get_untracked();
		let pasted = text.get_untracked();
		let link = url.get_untracked();
		let config = backend.with_value(|b| b.config().clone());
		generating.set(true);
		spawn_local(async move {
			let file_text = match chosen {
				Some(f) => match read_file(&f).await {
					Ok(content) => Some(content),
					Err(err) => {
						warn!("reading upload failed: {}", err);
						toaster.error("Error", err.user_message());
						generating.set(false);
						return;
					}
				},
				None => None,
			};
			let result = match compose_content(file_text, &pasted, &link) {
				Ok(content) => generate_profile(&config, &content)
					.await
					.map(|profile| (profile, content)),
				Err(err) => Err(err),
			};
			generating.set(false);
			match result {
				Ok((profile, content)) => {
					debug!("generated profile for {}", profile.name);
					reset();
					on_generated.run((profile, content));
				}
				Err(err) => {
					warn!("profile generation failed: {}", err);
					let title = match err {
						AppError::Validation(_) => "Missing input",
						_ => "Error",
					};
					toaster.error(title, err.user_message());
				}
			}
		});
	};

	let tab_button = move |which: SourceTab, label: &'static str| {
		view! {
			<button
				class=move || if tab.get() == which { "tab active" } else { "tab" }
				on:click=move |_| tab.set(which)
			>
				{label}
			</button>
		}
	};

	view! {
		<section class="card upload-panel">
			<h2>"Upload Company Data"</h2>
			<p class="muted">
				"Generate an entity profile from a document, pasted text or a website."
			</p>
			<div class="tabs">
				{tab_button(SourceTab::File, "File")}
				{tab_button(SourceTab::Text, "Text")}
				{tab_button(SourceTab::Url, "URL")}
			</div>

			<div class="tab-body" hidden=move || tab.get() != SourceTab::File>
				<input
					node_ref=file_input
					type="file"
					accept=".txt,.md,.csv,.json"
					on:change=on_file
				/>
				<p class="muted">
					{move || file.with(|f| f.as_ref().map(|f| format!("Selected: {}", f.name())))}
				</p>
			</div>
			<div class="tab-body" hidden=move || tab.get() != SourceTab::Text>
				<textarea
					rows="6"
					placeholder="Paste company information, press releases, annual reports..."
					prop:value=move || text.get()
					on:input=move |ev| text.set(event_target_value(&ev))
				></textarea>
			</div>
			<div class="tab-body" hidden=move || tab.get() != SourceTab::Url>
				<input
					type="url"
					placeholder="https://example.com/about"
					prop:value=move || url.get()
					on:input=move |ev| url.set(event_target_value(&ev))
				/>
			</div>

			<button class="button primary wide" on:click=generate disabled=move || generating.get()>
				{move || if generating.get() { "Generating..." } else { "Generate Entity Profile" }}
			</button>
		</section>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn file_wins_over_text_and_url() {
		let content = compose_content(Some("from file".into()), "pasted", "https://a.io");
		assert_eq!(content, Ok("from file".to_string()));
	}

	#[test]
	fn text_wins_over_url() {
		assert_eq!(compose_content(None, "pasted", "https://a.io"), Ok("pasted".to_string()));
	}

	#[test]
	fn url_is_prefixed() {
		assert_eq!(
			compose_content(Some("  ".into()), " ", " https://a.io "),
			Ok("URL: https://a.io".to_string())
		);
	}

	#[test]
	fn nothing_to_send_is_a_validation_error() {
		assert!(matches!(compose_content(None, "", "  "), Err(AppError::Validation(_))));
	}
}
