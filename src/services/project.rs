//! Saved layouts: building snapshots and restoring them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::network::{Entity, Relationship};
use crate::error::AppError;

/// Stored coordinates for one entity. Either axis may be absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
}

pub type Layout = BTreeMap<String, LayoutEntry>;

/// Body of a project insert.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectSnapshot {
	pub name: String,
	pub company_ids: Vec<String>,
	pub relationship_ids: Vec<String>,
	pub layout_data: Layout,
}

/// A project row as listed by the project store.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ProjectRecord {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub company_ids: Vec<String>,
	#[serde(default)]
	pub relationship_ids: Vec<String>,
	#[serde(default)]
	pub layout_data: Option<Layout>,
	#[serde(default)]
	pub created_at: Option<String>,
}

impl ProjectRecord {
	/// Calendar date of `created_at`, for the project list.
	pub fn created_on(&self) -> &str {
		self.created_at
			.as_deref()
			.map(|ts| ts.split('T').next().unwrap_or(ts))
			.unwrap_or("")
	}
}

pub fn snapshot(
	name: &str,
	entities: &[Entity],
	relationships: &[Relationship],
) -> Result<ProjectSnapshot, AppError> {
	let name = name.trim();
	if name.is_empty() {
		return Err(AppError::Validation("Please enter a project name.".into()));
	}
	let layout_data = entities
		.iter()
		.map(|e| (e.id.clone(), LayoutEntry { x: e.x, y: e.y }))
		.collect();
	Ok(ProjectSnapshot {
		name: name.to_string(),
		company_ids: entities.iter().map(|e| e.id.clone()).collect(),
		relationship_ids: relationships.iter().map(|r| r.id.clone()).collect(),
		layout_data,
	})
}

/// Overwrite stored positions with the layout; ids the layout does not
/// mention, and axes it leaves out, end up unset so default placement
/// applies.
pub fn apply_layout(entities: Vec<Entity>, layout: &Layout) -> Vec<Entity> {
	entities
		.into_iter()
		.map(|mut e| {
			let entry = layout.get(&e.id).copied().unwrap_or_default();
			e.x = entry.x;
			e.y = entry.y;
			e
		})
		.collect()
}

/// Put fetched rows back into the snapshot's order. Rows the snapshot
/// does not list are dropped; listed ids that were not found are skipped.
fn in_snapshot_order<T>(mut rows: Vec<T>, order: &[String], id: impl Fn(&T) -> &str) -> Vec<T> {
	let mut out = Vec::with_capacity(rows.len());
	for wanted in order {
		if let Some(i) = rows.iter().position(|r| id(r) == wanted.as_str()) {
			out.push(rows.swap_remove(i));
		}
	}
	out
}

/// Rebuild the workspace from a project and the rows fetched for it.
pub fn restore(
	project: &ProjectRecord,
	entities: Vec<Entity>,
	relationships: Vec<Relationship>,
) -> (Vec<Entity>, Vec<Relationship>) {
	let entities = in_snapshot_order(entities, &project.company_ids, |e| e.id.as_str());
	let layout = project.layout_data.clone().unwrap_or_default();
	let ordered = in_snapshot_order(relationships, &project.relationship_ids, |r| r.id.as_str());
	let relationships = ordered.into_iter().map(Relationship::clamped).collect();
	(apply_layout(entities, &layout), relationships)
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

	fn project(layout: &str) -> ProjectRecord {
		serde_json::from_str(&format!(
			r#"{{"id":"p1","name":"Q3 map","company_ids":["A","B"],"relationship_ids":["r1"],
			"layout_data":{},"created_at":"2024-07-01T09:30:00+00:00"}}"#,
			layout
		))
		.unwrap()
	}

	#[test]
	fn layout_wins_and_silence_clears_position() {
		let record = project(r#"{"A":{"x":10,"y":20}}"#);
		let mut b = entity("B");
		(b.x, b.y) = (Some(999.0), Some(999.0));
		let (entities, _) = restore(&record, vec![b, entity("A")], vec![]);

		assert_eq!(entities[0].id, "A");
		assert_eq!((entities[0].x, entities[0].y), (Some(10.0), Some(20.0)));
		assert_eq!((entities[1].x, entities[1].y), (None, None));
	}

	#[test]
	fn partial_layout_entries_keep_missing_axis_unset() {
		let record = project(r#"{"A":{"x":10},"B":{"x":null,"y":5}}"#);
		let (entities, _) = restore(&record, vec![entity("A"), entity("B")], vec![]);
		assert_eq!((entities[0].x, entities[0].y), (Some(10.0), None));
		assert_eq!((entities[1].x, entities[1].y), (None, Some(5.0)));
	}

	#[test]
	fn null_layout_is_tolerated() {
		let record = project("null");
		let (entities, _) = restore(&record, vec![entity("A")], vec![]);
		assert_eq!(entities.len(), 1);
		assert_eq!(record.created_on(), "2024-07-01");
	}

	#[test]
	fn restored_strengths_are_clamped() {
		let record = project("{}");
		let rel = Relationship {
			id: "r1".into(),
			source_company_id: "A".into(),
			target_company_id: "B".into(),
			label: "ally".into(),
			strength: 4.2,
		};
		let (_, rels) = restore(&record, vec![], vec![rel]);
		assert_eq!(rels[0].strength, 1.0);
	}

	#[test]
	fn snapshot_requires_a_name() {
		assert!(matches!(snapshot("  ", &[], &[]), Err(AppError::Validation(_))));
	}

	#[test]
	fn snapshot_records_ids_and_positions() {
		let mut a = entity("A");
		a.x = Some(3.0);
		let snap = snapshot(" Q3 map ", &[a, entity("B")], &[]).unwrap();
		assert_eq!(snap.name, "Q3 map");
		assert_eq!(snap.company_ids, vec!["A".to_string(), "B".to_string()]);
		let json = serde_json::to_value(&snap).unwrap();
		assert_eq!(json["layout_data"]["A"], serde_json::json!({"x": 3.0}));
		assert_eq!(json["layout_data"]["B"], serde_json::json!({}));
	}
}
