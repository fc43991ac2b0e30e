use leptos::prelude::*;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<main class="page not-found">
			<h1>"Page not found"</h1>
			<a href="/">"Back to the simulation"</a>
		</main>
	}
}
