//! Leptos client-side app wiring and routes.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

mod components;
mod config;
mod error;
mod pages;
mod services;

use crate::pages::not_found::NotFound;
use crate::pages::simulation::Simulation;

/// Route `log` output to the browser console and install the panic hook.
/// Gesture tracing at `debug` is kept out of release builds.
pub fn init_logging() {
	let level = if cfg!(debug_assertions) {
		Level::Debug
	} else {
		Level::Info
	};
	let _ = console_log::init_with_level(level);
	console_error_panic_hook::set_once();
	info!("entity canvas logging at {}", level);
}

/// Root component: document metadata plus the simulation route.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />
		<Title text="Parallel Simulation" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Simulation />
			</Routes>
		</Router>
	}
}
