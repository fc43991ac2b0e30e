//! Save the current workspace as a named project, or load a saved one.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};

use super::network::{Entity, Relationship};
use super::toast::use_toaster;
use crate::error::AppError;
use crate::services::backend::Backend;
use crate::services::project::{self, ProjectRecord};

async fn load_project(
	backend: &Backend,
	record: &ProjectRecord,
) -> Result<(Vec<Entity>, Vec<Relationship>), AppError> {
	let entities = backend.fetch_entities(&record.company_ids).await?;
	let relationships = backend.fetch_relationships(&record.relationship_ids).await?;
	Ok(project::restore(record, entities, relationships))
}

#[component]
pub fn ProjectManager(
	backend: StoredValue<Backend>,
	#[prop(into)] entities: Signal<Vec<Entity>>,
	#[prop(into)] relationships: Signal<Vec<Relationship>>,
	/// Receives the restored workspace; replaces the current one.
	#[prop(into)]
	on_load: Callback<(Vec<Entity>, Vec<Relationship>)>,
) -> impl IntoView {
	let toaster = use_toaster();
	let name = RwSignal::new(String::new());
	let saving = RwSignal::new(false);
	let show_list = RwSignal::new(false);
	let loading = RwSignal::new(false);
	let projects = RwSignal::new(Vec::<ProjectRecord>::new());

	let save = move |_| {
		if saving.get_untracked() {
			return;
		}
		let snapshot = match project::snapshot(
			&name.get_untracked(),
			&entities.get_untracked(),
			&relationships.get_untracked(),
		) {
			Ok(snapshot) => snapshot,
			Err(err) => {
				toaster.error("Missing name", err.user_message());
				return;
			}
		};
		let backend = backend.get_value();
		saving.set(true);
		spawn_local(async move {
			match backend.save_project(&snapshot).await {
				Ok(record) => {
					info!("saved project {} ({})", record.name, record.id);
					name.set(String::new());
					let saved = format!("\"{}\" has been saved.", record.name);
					toaster.success("Project saved", saved);
				}
				Err(err) => {
					warn!("saving project failed: {}", err);
					toaster.error("Error", "Failed to save project.");
				}
			}
			saving.set(false);
		});
	};

	let open_list = move |_| {
		show_list.set(true);
		loading.set(true);
		let backend = backend.get_value();
		spawn_local(async move {
			match backend.list_projects().await {
				Ok(list) => projects.set(list),
				Err(err) => {
					warn!("listing projects failed: {}", err);
					toaster.error("Error", "Failed to load projects.");
				}
			}
			loading.set(false);
		});
	};

	let load = move |record: ProjectRecord| {
		let backend = backend.get_value();
		spawn_local(async move {
			match load_project(&backend, &record).await {
				Ok(workspace) => {
					info!(
						"loaded project {}: {} entities, {} relationships",
						record.name,
						workspace.0.len(),
						workspace.1.len()
					);
					on_load.run(workspace);
					show_list.set(false);
					let loaded = format!("\"{}\" has been loaded.", record.name);
					toaster.success("Project loaded", loaded);
				}
				Err(err) => {
					warn!("loading project {} failed: {}", record.id, err);
					toaster.error("Error", "Failed to load project.");
				}
			}
		});
	};

	view! {
		<div class="project-manager">
			<input
				type="text"
				placeholder="Project name"
				prop:value=move || name.get()
				on:input=move |ev| name.set(event_target_value(&ev))
			/>
			<button class="button primary" on:click=save disabled=move || saving.get()>
				{move || if saving.get() { "Saving..." } else { "Save Project" }}
			</button>
			<button class="button outline" on:click=open_list>"Load Project"</button>

			<Show when=move || show_list.get()>
				<div class="dialog-backdrop">
					<div class="dialog-card" role="dialog" aria-modal="true">
						<h2>"Load Project"</h2>
						<Show
							when=move || !loading.get()
							fallback=|| view! { <p class="muted">"Loading projects..."</p> }
						>
							<Show
								when=move || projects.with(|p| !p.is_empty())
								fallback=|| view! { <p class="muted">"No saved projects found"</p> }
							>
								<ul class="project-list">
									<For
										each=move || projects.get()
										key=|p| p.id.clone()
										children=move |record| {
											let label = record.name.clone();
											let date = record.created_on().to_string();
											view! {
												<li>
													<button
														class="project-item"
														on:click=move |_| load(record.clone())
													>
														<span>{label}</span>
														<span class="muted">{date}</span>
													</button>
												</li>
											}
										}
									/>
								</ul>
							</Show>
						</Show>
						<div class="dialog-actions">
							<button class="button outline" on:click=move |_| show_list.set(false)>
								"Close"
							</button>
						</div>
					</div>
				</div>
			</Show>
		</div>
	}
}
