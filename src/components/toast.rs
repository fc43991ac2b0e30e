//! Transient notifications shown in the corner of the page.

use std::time::Duration;

use leptos::prelude::*;

const TOAST_LIFETIME: Duration = Duration::from_secs(5);
const MAX_TOASTS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastVariant {
	Default,
	Destructive,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
	id: u64,
	pub title: String,
	pub description: String,
	pub variant: ToastVariant,
}

/// Handle for raising toasts; cheap to copy into closures.
#[derive(Clone, Copy)]
pub struct Toaster {
	toasts: RwSignal<Vec<Toast>>,
	next_id: StoredValue<u64>,
}

impl Toaster {
	fn new() -> Self {
		Self {
			toasts: RwSignal::new(Vec::new()),
			next_id: StoredValue::new(0),
		}
	}

	pub fn success(&self, title: impl Into<String>, description: impl Into<String>) {
		self.push(title.into(), description.into(), ToastVariant::Default);
	}

	pub fn error(&self, title: impl Into<String>, description: impl Into<String>) {
		self.push(title.into(), description.into(), ToastVariant::Destructive);
	}

	fn push(&self, title: String, description: String, variant: ToastVariant) {
		let id = self.next_id.get_value();
		self.next_id.set_value(id + 1);
		self.toasts.update(|list| {
			list.push(Toast {
				id,
				title,
				description,
				variant,
			});
			if list.len() > MAX_TOASTS {
				list.remove(0);
			}
		});
		let this = *self;
		set_timeout(move || this.dismiss(id), TOAST_LIFETIME);
	}

	pub fn dismiss(&self, id: u64) {
		self.toasts.try_update(|list| list.retain(|t| t.id != id));
	}
}

/// Create the page's toaster and make it available to descendants.
pub fn provide_toaster() -> Toaster {
	let toaster = Toaster::new();
	provide_context(toaster);
	toaster
}

pub fn use_toaster() -> Toaster {
	expect_context::<Toaster>()
}

#[component]
pub fn ToastViewport() -> impl IntoView {
	let toaster = use_toaster();
	view! {
		<div class="toast-viewport" aria-live="polite">
			<For
				each=move || toaster.toasts.get()
				key=|toast| toast.id
				children=move |toast| {
					let id = toast.id;
					let class = match toast.variant {
						ToastVariant::Default => "toast",
						ToastVariant::Destructive => "toast destructive",
					};
					view! {
						<div class=class on:click=move |_| toaster.dismiss(id)>
							<strong>{toast.title}</strong>
							<p>{toast.description}</p>
						</div>
					}
				}
			/>
		</div>
	}
}
