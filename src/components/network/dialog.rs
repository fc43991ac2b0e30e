//! Modal that collects a label and a strength for a new relationship.
//!
//! The dialog knows nothing about which nodes are being connected; the
//! surface supplies the pair from its pending connection once the dialog
//! reports back.

use leptos::prelude::*;
use log::debug;

use crate::error::AppError;

pub const DEFAULT_STRENGTH: f64 = 0.5;
/// Slider positions per unit of strength, i.e. a step of 0.01.
const STRENGTH_STEPS: f64 = 100.0;

#[derive(Clone, Debug, PartialEq)]
pub struct RelationshipDraft {
	pub label: String,
	strength: f64,
}

impl Default for RelationshipDraft {
	fn default() -> Self {
		Self {
			label: String::new(),
			strength: DEFAULT_STRENGTH,
		}
	}
}

impl RelationshipDraft {
	pub fn strength(&self) -> f64 {
		self.strength
	}

	/// Clamp into `[0, 1]` and snap to the slider step.
	pub fn set_strength(&mut self, value: f64) {
		if !value.is_finite() {
			return;
		}
		self.strength = (value.clamp(0.0, 1.0) * STRENGTH_STEPS).round() / STRENGTH_STEPS;
	}

	/// Only the label gates submission.
	pub fn can_submit(&self) -> bool {
		!self.label.trim().is_empty()
	}

	pub fn submit(&self) -> Result<(String, f64), AppError> {
		if !self.can_submit() {
			return Err(AppError::Validation("A relationship label is required.".into()));
		}
		Ok((self.label.trim().to_string(), self.strength))
	}
}

#[component]
pub fn RelationshipDialog(
	/// Receives the trimmed label and strength, at most once.
	#[prop(into)]
	on_submit: Callback<(String, f64)>,
	#[prop(into)] on_cancel: Callback<()>,
) -> impl IntoView {
	let draft = RwSignal::new(RelationshipDraft::default());
	let done = StoredValue::new(false);

	let submit = move |_| {
		if done.get_value() {
			return;
		}
		match draft.with_untracked(RelationshipDraft::submit) {
			Ok(payload) => {
				done.set_value(true);
				on_submit.run(payload);
			}
			Err(err) => debug!("relationship dialog: {}", err),
		}
	};
	let cancel = move |_| {
		if done.get_value() {
			return;
		}
		done.set_value(true);
		on_cancel.run(());
	};

	view! {
		<div class="dialog-backdrop">
			<div class="dialog-card" role="dialog" aria-modal="true">
				<h2>"Create Relationship"</h2>
				<p class="muted">"Define the connection between the selected companies"</p>

				<label for="relationship-label">"Relationship Label"</label>
				<input
					id="relationship-label"
					type="text"
					placeholder="e.g. partner, competitor, supplier..."
					prop:value=move || draft.with(|d| d.label.clone())
					on:input=move |ev| {
						let value = event_target_value(&ev);
						draft.update(|d| d.label = value);
					}
				/>

				<label>{move || format!("Strength: {:.2}", draft.with(|d| d.strength()))}</label>
				<input
					type="range"
					min="0"
					max="1"
					step="0.01"
					prop:value=move || draft.with(|d| d.strength().to_string())
					on:input=move |ev| {
						if let Ok(value) = event_target_value(&ev).parse::<f64>() {
							draft.update(|d| d.set_strength(value));
						}
					}
				/>
				<div class="range-legend">
					<span>"Weak"</span>
					<span>"Strong"</span>
				</div>

				<div class="dialog-actions">
					<button class="button outline" on:click=cancel>"Cancel"</button>
					<button
						class="button primary"
						on:click=submit
						disabled=move || !draft.with(RelationshipDraft::can_submit)
					>
						"Create"
					</button>
				</div>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_to_midpoint() {
		let draft = RelationshipDraft::default();
		assert_eq!(draft.strength(), 0.5);
		assert!(!draft.can_submit());
	}

	#[test]
	fn whitespace_label_is_rejected() {
		let draft = RelationshipDraft {
			label: "  \t ".into(),
			..Default::default()
		};
		assert!(matches!(draft.submit(), Err(AppError::Validation(_))));
	}

	#[test]
	fn extremes_of_strength_are_submittable() {
		let mut draft = RelationshipDraft {
			label: "ally".into(),
			..Default::default()
		};
		draft.set_strength(0.0);
		assert_eq!(draft.submit(), Ok(("ally".to_string(), 0.0)));
		draft.set_strength(1.0);
		assert_eq!(draft.submit(), Ok(("ally".to_string(), 1.0)));
	}

	#[test]
	fn strength_is_clamped_and_stepped() {
		let mut draft = RelationshipDraft::default();
		draft.set_strength(3.0);
		assert_eq!(draft.strength(), 1.0);
		draft.set_strength(-1.0);
		assert_eq!(draft.strength(), 0.0);
		draft.set_strength(0.7);
		assert_eq!(draft.strength(), 0.7);
		draft.set_strength(0.123);
		assert_eq!(draft.strength(), 0.12);
		draft.set_strength(f64::NAN);
		assert_eq!(draft.strength(), 0.12);
	}

	#[test]
	fn label_is_trimmed_on_submit() {
		let draft = RelationshipDraft {
			label: "  ally ".into(),
			..Default::default()
		};
		assert_eq!(draft.submit(), Ok(("ally".to_string(), 0.5)));
	}
}
