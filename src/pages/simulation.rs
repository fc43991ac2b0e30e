//! The workspace: upload panel, project controls and the network canvas.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, warn};

use crate::components::network::{Entity, NetworkCanvas, NewRelationship, Relationship};
use crate::components::project_manager::ProjectManager;
use crate::components::toast::{ToastViewport, provide_toaster};
use crate::components::upload::UploadPanel;
use crate::config::AppConfig;
use crate::services::backend::Backend;
use crate::services::generator::EntityProfile;

/// Mirror a move into the entity list. Unknown ids are ignored.
fn move_entity(list: &mut [Entity], id: &str, x: f64, y: f64) {
	if let Some(entity) = list.iter_mut().find(|e| e.id == id) {
		entity.x = Some(x);
		entity.y = Some(y);
	}
}

#[component]
pub fn Simulation() -> impl IntoView {
	let toaster = provide_toaster();
	let config = AppConfig::from_env();
	if let Err(err) = config.validate() {
		warn!("{}", err);
	}
	let backend = StoredValue::new(Backend::new(config));
	let entities = RwSignal::new(Vec::<Entity>::new());
	let relationships = RwSignal::new(Vec::<Relationship>::new());

	let on_generated = Callback::new(move |(profile, raw): (EntityProfile, String)| {
		let backend = backend.get_value();
		spawn_local(async move {
			match backend.insert_entity(&profile, &raw).await {
				Ok(entity) => {
					let name = entity.name.clone();
					entities.update(|list| list.push(entity));
					toaster.success(
						"Entity profile created",
						format!("{} has been added to the simulation.", name),
					);
				}
				Err(err) => {
					error!("storing entity failed: {}", err);
					toaster.error("Error", "Failed to save the entity profile.");
				}
			}
		});
	});

	let on_position_change = Callback::new(move |(id, x, y): (String, f64, f64)| {
		entities.update(|list| move_entity(list, &id, x, y));
	});

	let on_move_end = Callback::new(move |(id, x, y): (String, f64, f64)| {
		let backend = backend.get_value();
		spawn_local(async move {
			if let Err(err) = backend.update_position(&id, x, y).await {
				toaster.error("Position not saved", err.user_message());
			}
		});
	});

	let on_relationship_create = Callback::new(move |draft: NewRelationship| {
		let backend = backend.get_value();
		spawn_local(async move {
			match backend.insert_relationship(&draft).await {
				Ok(rel) => {
					relationships.update(|list| list.push(rel));
					let added = format!("\"{}\" has been added.", draft.label);
					toaster.success("Relationship created", added);
				}
				Err(err) => {
					error!("storing relationship failed: {}", err);
					toaster.error("Error", "Failed to create relationship.");
				}
			}
		});
	});

	let on_load = Callback::new(move |(loaded, rels): (Vec<Entity>, Vec<Relationship>)| {
		entities.set(loaded);
		relationships.set(rels);
	});

	view! {
		<main class="page simulation">
			<header class="page-header">
				<div>
					<h1>"Parallel Simulation"</h1>
					<p class="muted">"Model companies as entities and map how they relate."</p>
				</div>
				<ProjectManager
					backend=backend
					entities=entities
					relationships=relationships
					on_load=on_load
				/>
			</header>
			<div class="workspace">
				<UploadPanel backend=backend on_generated=on_generated />
				<section class="card network-card">
					<h2>"Network Visualization"</h2>
					<p class="muted">
						"Drag to arrange. Hold Shift and drag between entities to connect them."
					</p>
					<NetworkCanvas
						entities=entities
						relationships=relationships
						on_position_change=on_position_change
						on_move_end=on_move_end
						on_relationship_create=on_relationship_create
					/>
				</section>
			</div>
			<ToastViewport />
		</main>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn entity(id: &str) -> Entity {
		Entity {
			id: id.into(),
			name: id.into(),
			..Default::default()
		}
	}

	#[test]
	fn move_updates_only_the_named_entity() {
		let mut list = vec![entity("a"), entity("b")];
		move_entity(&mut list, "b", 12.0, -4.0);
		assert_eq!((list[0].x, list[0].y), (None, None));
		assert_eq!((list[1].x, list[1].y), (Some(12.0), Some(-4.0)));
	}

	#[test]
	fn unknown_id_is_ignored() {
		let mut list = vec![entity("a")];
		move_entity(&mut list, "zzz", 1.0, 1.0);
		assert_eq!(list, vec![entity("a")]);
	}
}
