use log::{debug, info};

use super::geometry::{self, Point, Rect};
use super::node::{Modifiers, NodeEvent, NodeWidget, PRIMARY_BUTTON};
use super::types::{Entity, Relationship, clamp_strength};

pub const NODE_WIDTH: f64 = 192.0;
pub const NODE_HEIGHT: f64 = 96.0;
/// Control point offset as a fraction of the endpoint distance.
pub const CURVE_BEND: f64 = 0.2;
pub const HOVER_OPACITY: f64 = 0.9;
/// Screen-space distance within which the pointer counts as on an edge.
pub const EDGE_HIT_TOLERANCE: f64 = 8.0;
pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 4.0;

const PLACEMENT_ORIGIN: f64 = 100.0;
const PLACEMENT_STEP_X: f64 = 150.0;
const PLACEMENT_STEP_Y: f64 = 100.0;

/// Diagonal cascade used for nodes without a stored position.
pub fn default_position(index: usize) -> Point {
	let i = index as f64;
	Point::new(
		i * PLACEMENT_STEP_X + PLACEMENT_ORIGIN,
		i * PLACEMENT_STEP_Y + PLACEMENT_ORIGIN,
	)
}

/// Stored axes win; each missing axis falls back independently.
pub fn resolve_position(entity: &Entity, index: usize) -> Point {
	let fallback = default_position(index);
	Point::new(entity.x.unwrap_or(fallback.x), entity.y.unwrap_or(fallback.y))
}

/// Stroke width and opacity for an edge of the given strength.
pub fn edge_style(strength: f64, hovered: bool) -> (f64, f64) {
	let width = (4.0 * strength).max(2.0);
	let opacity = if hovered {
		HOVER_OPACITY
	} else {
		0.4 + 0.3 * strength
	};
	(width, opacity)
}

/// Pan offset (`x`, `y`, in surface pixels) and zoom factor `k`.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug)]
struct PanState {
	start: Point,
	transform_start: (f64, f64),
}

#[derive(Clone, Debug)]
pub struct NodeView {
	pub entity: Entity,
	pub position: Point,
	pub widget: NodeWidget,
}

impl NodeView {
	pub fn id(&self) -> &str {
		&self.entity.id
	}

	pub fn bounds(&self) -> Rect {
		Rect::centered(self.position, NODE_WIDTH, NODE_HEIGHT)
	}
}

/// A connect gesture in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
	pub source_id: String,
	pub current: Point,
}

/// A resolved source/target pair waiting on the creation dialog.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingConnection {
	pub source_id: String,
	pub target_id: String,
}

/// A confirmed relationship, ready for the relationship store.
#[derive(Clone, Debug, PartialEq)]
pub struct NewRelationship {
	pub source_id: String,
	pub target_id: String,
	pub label: String,
	pub strength: f64,
}

/// Everything the renderer needs to paint one edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeGeometry {
	pub id: String,
	pub label: String,
	pub source: Point,
	pub control: Point,
	pub target: Point,
	pub target_bounds: Rect,
	pub width: f64,
	pub opacity: f64,
	pub hovered: bool,
}

impl EdgeGeometry {
	pub fn is_degenerate(&self) -> bool {
		geometry::distance(self.source, self.target) < geometry::EPSILON
	}
}

/// Notifications for the surface's owner.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceEvent {
	PositionChanged { id: String, position: Point },
	MoveFinished { id: String, position: Point },
	ConnectionRequested(PendingConnection),
}

pub struct DiagramState {
	nodes: Vec<NodeView>,
	relationships: Vec<Relationship>,
	pub transform: ViewTransform,
	pan: Option<PanState>,
	active: Option<String>,
	connection: Option<Connection>,
	pending: Option<PendingConnection>,
	hovered_edge: Option<String>,
	pub width: f64,
	pub height: f64,
}

impl DiagramState {
	pub fn new(
		entities: &[Entity],
		relationships: &[Relationship],
		width: f64,
		height: f64,
	) -> Self {
		let mut state = Self {
			nodes: Vec::new(),
			relationships: Vec::new(),
			transform: ViewTransform::default(),
			pan: None,
			active: None,
			connection: None,
			pending: None,
			hovered_edge: None,
			width,
			height,
		};
		state.sync(entities, relationships);
		state
	}

	/// Replace the node and edge lists with the owner's current copy.
	///
	/// A node being moved keeps its local position so a lagging owner
	/// update cannot pull it back mid-drag.
	pub fn sync(&mut self, entities: &[Entity], relationships: &[Relationship]) {
		let mut previous = std::mem::take(&mut self.nodes);
		self.nodes = entities
			.iter()
			.enumerate()
			.map(|(index, entity)| {
				let existing = previous
					.iter()
					.position(|n| n.entity.id == entity.id)
					.map(|i| previous.swap_remove(i));
				match existing {
					Some(view) if view.widget.is_moving() => NodeView {
						entity: entity.clone(),
						position: view.position,
						widget: view.widget,
					},
					Some(view) => NodeView {
						entity: entity.clone(),
						position: resolve_position(entity, index),
						widget: view.widget,
					},
					None => NodeView {
						entity: entity.clone(),
						position: resolve_position(entity, index),
						widget: NodeWidget::default(),
					},
				}
			})
			.collect();
		self.relationships = relationships.to_vec();

		let active_gone = self.active.as_deref().is_some_and(|id| self.node(id).is_none());
		if active_gone {
			debug!("active node disappeared, dropping gesture");
			self.cancel_gesture();
		}
		let pending_gone = self.pending.as_ref().is_some_and(|p| {
			self.node(&p.source_id).is_none() || self.node(&p.target_id).is_none()
		});
		if pending_gone {
			self.pending = None;
		}
		let hover_gone = self
			.hovered_edge
			.as_deref()
			.is_some_and(|id| !self.relationships.iter().any(|r| r.id == id));
		if hover_gone {
			self.hovered_edge = None;
		}
	}

	pub fn nodes(&self) -> &[NodeView] {
		&self.nodes
	}

	pub fn node(&self, id: &str) -> Option<&NodeView> {
		self.nodes.iter().find(|n| n.id() == id)
	}

	fn node_mut(&mut self, id: &str) -> Option<&mut NodeView> {
		self.nodes.iter_mut().find(|n| n.id() == id)
	}

	#[cfg(test)]
	pub fn connection(&self) -> Option<&Connection> {
		self.connection.as_ref()
	}

	pub fn pending(&self) -> Option<&PendingConnection> {
		self.pending.as_ref()
	}

	pub fn hovered_edge(&self) -> Option<&str> {
		self.hovered_edge.as_deref()
	}

	pub fn is_gesture_active(&self) -> bool {
		self.active.is_some() || self.pan.is_some()
	}

	pub fn screen_to_local(&self, screen: Point) -> Point {
		Point::new(
			(screen.x - self.transform.x) / self.transform.k,
			(screen.y - self.transform.y) / self.transform.k,
		)
	}

	/// Frontmost node whose card contains `local`, skipping `exclude`.
	pub fn node_at(&self, local: Point, exclude: Option<&str>) -> Option<String> {
		self.nodes
			.iter()
			.rev()
			.filter(|n| Some(n.id()) != exclude)
			.find(|n| n.bounds().contains(local))
			.map(|n| n.entity.id.clone())
	}

	/// Frontmost edge passing within the hover tolerance of `local`.
	pub fn edge_at(&self, local: Point) -> Option<String> {
		let tolerance = EDGE_HIT_TOLERANCE / self.transform.k;
		self.edges()
			.into_iter()
			.rev()
			.find(|e| geometry::distance_to_quad(local, e.source, e.control, e.target) <= tolerance)
			.map(|e| e.id)
	}

	/// Layout for every drawable edge, in paint order. Edges naming a
	/// missing node or looping onto their source are skipped.
	pub fn edges(&self) -> Vec<EdgeGeometry> {
		self.relationships
			.iter()
			.filter(|rel| rel.source_company_id != rel.target_company_id)
			.filter_map(|rel| {
				let source = self.node(&rel.source_company_id)?;
				let target = self.node(&rel.target_company_id)?;
				let hovered = self.hovered_edge.as_deref() == Some(rel.id.as_str());
				let (width, opacity) = edge_style(clamp_strength(rel.strength), hovered);
				Some(EdgeGeometry {
					id: rel.id.clone(),
					label: rel.label.clone(),
					source: source.position,
					control: geometry::control_point(source.position, target.position, CURVE_BEND),
					target: target.position,
					target_bounds: target.bounds(),
					width,
					opacity,
					hovered,
				})
			})
			.collect()
	}

	/// Dashed line from the source node to the free endpoint.
	pub fn rubber_band(&self) -> Option<(Point, Point)> {
		let conn = self.connection.as_ref()?;
		let source = self.node(&conn.source_id)?;
		Some((source.position, conn.current))
	}

	pub fn set_hover(&mut self, edge: Option<String>) {
		if self.hovered_edge != edge {
			self.hovered_edge = edge;
		}
	}

	/// Returns whether a gesture started, so the caller knows to start
	/// listening for moves and the release.
	pub fn pointer_down(&mut self, screen: Point, button: i16, modifiers: Modifiers) -> bool {
		if self.is_gesture_active() || self.pending.is_some() || button != PRIMARY_BUTTON {
			return false;
		}
		let local = self.screen_to_local(screen);
		let Some(id) = self.node_at(local, None) else {
			self.pan = Some(PanState {
				start: screen,
				transform_start: (self.transform.x, self.transform.y),
			});
			return true;
		};
		let Some(view) = self.node_mut(&id) else {
			return false;
		};
		let origin = view.position;
		let event = view.widget.pointer_down(local, origin, button, modifiers);
		if view.widget.is_idle() {
			return false;
		}
		if let Some(NodeEvent::ConnectStarted(center)) = event {
			self.connection = Some(Connection {
				source_id: id.clone(),
				current: center,
			});
		}
		self.hovered_edge = None;
		self.active = Some(id);
		true
	}

	pub fn pointer_move(&mut self, screen: Point) -> Vec<SurfaceEvent> {
		if let Some(pan) = &self.pan {
			self.transform.x = pan.transform_start.0 + (screen.x - pan.start.x);
			self.transform.y = pan.transform_start.1 + (screen.y - pan.start.y);
			return Vec::new();
		}
		let local = self.screen_to_local(screen);
		let Some(id) = self.active.clone() else {
			let hovered = self.edge_at(local);
			self.set_hover(hovered);
			return Vec::new();
		};

		if let Some(conn) = self.connection.as_mut() {
			conn.current = local;
			return Vec::new();
		}
		let Some(view) = self.node_mut(&id) else {
			return Vec::new();
		};
		match view.widget.pointer_move(local) {
			Some(NodeEvent::PositionChanged(position)) => {
				view.position = position;
				vec![SurfaceEvent::PositionChanged { id, position }]
			}
			_ => Vec::new(),
		}
	}

	/// Finish the running gesture. Only a primary-button release ends it;
	/// other buttons leave it running.
	pub fn pointer_up(&mut self, screen: Point, button: i16) -> Vec<SurfaceEvent> {
		if button != PRIMARY_BUTTON {
			return Vec::new();
		}
		if self.pan.take().is_some() {
			return Vec::new();
		}
		let Some(id) = self.active.take() else {
			return Vec::new();
		};
		let local = self.screen_to_local(screen);
		let hit = self.node_at(local, Some(&id));
		let connection = self.connection.take();
		let Some(view) = self.node_mut(&id) else {
			return Vec::new();
		};

		match view.widget.release(local, &id, |_, _| hit) {
			Some(NodeEvent::MoveEnded(position)) => {
				vec![SurfaceEvent::MoveFinished { id, position }]
			}
			Some(NodeEvent::ConnectEnded(Some(target_id))) if target_id != id => {
				debug_assert!(connection.is_some());
				let pending = PendingConnection {
					source_id: id,
					target_id,
				};
				info!("connection requested {} -> {}", pending.source_id, pending.target_id);
				self.pending = Some(pending.clone());
				vec![SurfaceEvent::ConnectionRequested(pending)]
			}
			_ => {
				debug!("gesture on {} ended without effect", id);
				Vec::new()
			}
		}
	}

	/// Abandon whatever gesture is running.
	pub fn cancel_gesture(&mut self) {
		for node in &mut self.nodes {
			node.widget.reset();
		}
		self.active = None;
		self.connection = None;
		self.pan = None;
	}

	/// Consume the pending connection into a relationship request.
	/// A blank label leaves the pending connection in place.
	pub fn submit_relationship(&mut self, label: &str, strength: f64) -> Option<NewRelationship> {
		let label = label.trim();
		if label.is_empty() {
			return None;
		}
		let pending = self.pending.take()?;
		Some(NewRelationship {
			source_id: pending.source_id,
			target_id: pending.target_id,
			label: label.to_string(),
			strength: clamp_strength(strength),
		})
	}

	pub fn cancel_relationship(&mut self) {
		self.pending = None;
	}

	/// Zoom about `screen`, keeping the point under the pointer fixed.
	pub fn zoom_at(&mut self, screen: Point, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = screen.x - (screen.x - self.transform.x) * ratio;
		self.transform.y = screen.y - (screen.y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
