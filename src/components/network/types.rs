use serde::{Deserialize, Serialize};

/// A company profile as stored by the entity store.
///
/// `x`/`y` are diagram-local and either may be missing; a missing axis is
/// filled from the default placement when the node is laid out.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub who_they_are: Option<String>,
	#[serde(default)]
	pub goals: Option<String>,
	#[serde(default)]
	pub risk_appetite: Option<String>,
	#[serde(default)]
	pub market_position: Option<String>,
	#[serde(default)]
	pub leadership_style: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
}

/// A directed, labeled, weighted edge between two entities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
	pub id: String,
	pub source_company_id: String,
	pub target_company_id: String,
	pub label: String,
	pub strength: f64,
}

impl Relationship {
	/// Force `strength` into `[0, 1]`. Non-finite values become the midpoint.
	pub fn clamped(mut self) -> Self {
		self.strength = clamp_strength(self.strength);
		self
	}
}

pub fn clamp_strength(strength: f64) -> f64 {
	if strength.is_finite() {
		strength.clamp(0.0, 1.0)
	} else {
		0.5
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strength_is_clamped_on_load() {
		let rel = |strength| Relationship {
			id: "r".into(),
			source_company_id: "a".into(),
			target_company_id: "b".into(),
			label: "ally".into(),
			strength,
		};
		assert_eq!(rel(1.7).clamped().strength, 1.0);
		assert_eq!(rel(-0.2).clamped().strength, 0.0);
		assert_eq!(rel(0.35).clamped().strength, 0.35);
		assert_eq!(rel(f64::NAN).clamped().strength, 0.5);
	}

	#[test]
	fn entity_rows_tolerate_missing_fields() {
		let row = r#"{"id":"c1","name":"Acme","goals":null,"created_at":"2024-01-01"}"#;
		let entity: Entity = serde_json::from_str(row).unwrap();
		assert_eq!(entity.name, "Acme");
		assert_eq!(entity.goals, None);
		assert_eq!((entity.x, entity.y), (None, None));
	}
}
