//! Entity, relationship and project stores on the hosted REST backend.

use log::{info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::generator::EntityProfile;
use super::http;
use super::project::{ProjectRecord, ProjectSnapshot};
use crate::components::network::{Entity, NewRelationship, Relationship};
use crate::config::AppConfig;
use crate::error::AppError;

/// How much of the uploaded source text is kept alongside a profile.
const RAW_EXCERPT_CHARS: usize = 500;

#[derive(Serialize)]
struct EntityInsert<'a> {
	#[serde(flatten)]
	profile: &'a EntityProfile,
	raw_data_ref: String,
}

#[derive(Serialize)]
struct RelationshipInsert<'a> {
	source_company_id: &'a str,
	target_company_id: &'a str,
	label: &'a str,
	strength: f64,
}

#[derive(Serialize)]
struct PositionUpdate {
	x: f64,
	y: f64,
}

/// First `max` characters of `text`, cut on a char boundary.
fn excerpt(text: &str, max: usize) -> String {
	text.chars().take(max).collect()
}

/// PostgREST `in` filter over quoted ids.
fn in_filter(ids: &[String]) -> String {
	let quoted: Vec<String> = ids
		.iter()
		.map(|id| format!("\"{}\"", id.replace('"', "\\\"")))
		.collect();
	format!("in.({})", quoted.join(","))
}

fn encode(value: &str) -> String {
	String::from(js_sys::encode_uri_component(value))
}

#[derive(Clone, Debug)]
pub struct Backend {
	config: AppConfig,
}

impl Backend {
	pub fn new(config: AppConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &AppConfig {
		&self.config
	}

	fn headers(&self) -> Vec<(&'static str, String)> {
		vec![
			("apikey", self.config.backend_key.clone()),
			("Authorization", format!("Bearer {}", self.config.backend_key)),
			("Content-Type", "application/json".to_string()),
			("Prefer", "return=representation".to_string()),
		]
	}

	async fn insert<B, T>(&self, table: &str, body: &B) -> Result<T, AppError>
	where
		B: Serialize,
		T: DeserializeOwned,
	{
		self.config.validate()?;
		let body = serde_json::to_string(body)?;
		let url = self.config.rest_url(table);
		let resp = http::send("POST", &url, &self.headers(), Some(body)).await?;
		let mut rows: Vec<T> = resp.json()?;
		if rows.is_empty() {
			return Err(AppError::Decode(format!("insert into {} returned no row", table)));
		}
		Ok(rows.swap_remove(0))
	}

	async fn select<T>(&self, table: &str, query: &str) -> Result<Vec<T>, AppError>
	where
		T: DeserializeOwned,
	{
		self.config.validate()?;
		let url = format!("{}?{}", self.config.rest_url(table), query);
		http::send("GET", &url, &self.headers(), None).await?.json()
	}

	async fn select_ids<T>(&self, table: &str, ids: &[String]) -> Result<Vec<T>, AppError>
	where
		T: DeserializeOwned,
	{
		if ids.is_empty() {
			return Ok(Vec::new());
		}
		self.select(table, &format!("select=*&id={}", encode(&in_filter(ids)))).await
	}

	pub async fn insert_entity(
		&self,
		profile: &EntityProfile,
		raw: &str,
	) -> Result<Entity, AppError> {
		let entity: Entity = self
			.insert(
				"companies",
				&EntityInsert {
					profile,
					raw_data_ref: excerpt(raw, RAW_EXCERPT_CHARS),
				},
			)
			.await?;
		info!("stored entity {} ({})", entity.name, entity.id);
		Ok(entity)
	}

	pub async fn update_position(&self, id: &str, x: f64, y: f64) -> Result<(), AppError> {
		self.config.validate()?;
		let url = format!("{}?id=eq.{}", self.config.rest_url("companies"), encode(id));
		let body = serde_json::to_string(&PositionUpdate { x, y })?;
		let result = http::send("PATCH", &url, &self.headers(), Some(body)).await?.empty();
		if let Err(err) = &result {
			warn!("position update for {} failed: {}", id, err);
		}
		result
	}

	pub async fn fetch_entities(&self, ids: &[String]) -> Result<Vec<Entity>, AppError> {
		self.select_ids("companies", ids).await
	}

	pub async fn insert_relationship(
		&self,
		rel: &NewRelationship,
	) -> Result<Relationship, AppError> {
		let stored: Relationship = self
			.insert(
				"relationships",
				&RelationshipInsert {
					source_company_id: &rel.source_id,
					target_company_id: &rel.target_id,
					label: &rel.label,
					strength: rel.strength,
				},
			)
			.await?;
		info!(
			"stored relationship {} -> {} ({})",
			stored.source_company_id, stored.target_company_id, stored.label
		);
		Ok(stored.clamped())
	}

	pub async fn fetch_relationships(&self, ids: &[String]) -> Result<Vec<Relationship>, AppError> {
		self.select_ids("relationships", ids).await
	}

	pub async fn save_project(
		&self,
		snapshot: &ProjectSnapshot,
	) -> Result<ProjectRecord, AppError> {
		let record: ProjectRecord = self.insert("projects", snapshot).await?;
		info!("saved project {:?}", record.name);
		Ok(record)
	}

	/// Saved projects, newest first.
	pub async fn list_projects(&self) -> Result<Vec<ProjectRecord>, AppError> {
		self.select("projects", "select=*&order=created_at.desc").await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn excerpt_is_char_safe() {
		let text = "é".repeat(600);
		let cut = excerpt(&text, RAW_EXCERPT_CHARS);
		assert_eq!(cut.chars().count(), 500);
		assert_eq!(excerpt("short", RAW_EXCERPT_CHARS), "short");
	}

	#[test]
	fn in_filter_quotes_ids() {
		let ids = vec!["a1".to_string(), "b,2".to_string()];
		assert_eq!(in_filter(&ids), r#"in.("a1","b,2")"#);
	}

	#[test]
	fn entity_insert_flattens_profile() {
		let profile = EntityProfile {
			name: "Acme".into(),
			goals: Some("Grow".into()),
			..Default::default()
		};
		let body = serde_json::to_value(EntityInsert {
			profile: &profile,
			raw_data_ref: "raw".into(),
		})
		.unwrap();
		assert_eq!(body["name"], "Acme");
		assert_eq!(body["goals"], "Grow");
		assert_eq!(body["raw_data_ref"], "raw");
	}

	#[test]
	fn relationship_insert_uses_store_column_names() {
		let body = serde_json::to_value(RelationshipInsert {
			source_company_id: "n1",
			target_company_id: "n2",
			label: "ally",
			strength: 0.7,
		})
		.unwrap();
		assert_eq!(
			body,
			serde_json::json!({
				"source_company_id": "n1",
				"target_company_id": "n2",
				"label": "ally",
				"strength": 0.7,
			})
		);
	}
}
