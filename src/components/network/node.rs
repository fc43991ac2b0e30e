//! Per-node gesture handling.
//!
//! A node is either idle, being moved, or acting as the source of a new
//! connection. The two gestures never overlap: each one starts from and
//! returns to [`NodeGesture::Idle`].

use log::debug;

use super::geometry::Point;

/// Only the primary (usually left) button starts a gesture.
pub const PRIMARY_BUTTON: i16 = 0;

/// Modifier keys held when the pointer went down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
	pub shift: bool,
	pub alt: bool,
}

impl Modifiers {
	#[cfg(test)]
	pub const NONE: Self = Self {
		shift: false,
		alt: false,
	};
	#[cfg(test)]
	pub const SHIFT: Self = Self {
		shift: true,
		alt: false,
	};

	fn selects_connect(self) -> bool {
		self.shift || self.alt
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum NodeGesture {
	#[default]
	Idle,
	/// `offset` is pointer minus node origin at pointer-down.
	Moving { offset: (f64, f64) },
	/// `anchor` is the node centre the rubber band starts from.
	Connecting { anchor: Point },
}

/// What a node reports to the surface.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeEvent {
	PositionChanged(Point),
	MoveEnded(Point),
	ConnectStarted(Point),
	/// `None` when the gesture was released over empty space.
	ConnectEnded(Option<String>),
}

#[derive(Clone, Debug, Default)]
pub struct NodeWidget {
	gesture: NodeGesture,
	last_position: Option<Point>,
}

impl NodeWidget {
	pub fn is_idle(&self) -> bool {
		self.gesture == NodeGesture::Idle
	}

	pub fn is_moving(&self) -> bool {
		matches!(self.gesture, NodeGesture::Moving { .. })
	}

	pub fn is_connecting(&self) -> bool {
		matches!(self.gesture, NodeGesture::Connecting { .. })
	}

	/// Classify a pointer-down on this node. `pointer` and `origin` are
	/// diagram-local. Returns `None` for non-primary buttons or when a
	/// gesture is already running.
	pub fn pointer_down(
		&mut self,
		pointer: Point,
		origin: Point,
		button: i16,
		modifiers: Modifiers,
	) -> Option<NodeEvent> {
		if button != PRIMARY_BUTTON || !self.is_idle() {
			return None;
		}
		if modifiers.selects_connect() {
			Some(self.begin_connect(origin))
		} else {
			self.begin_move(pointer, origin);
			None
		}
	}

	pub fn begin_move(&mut self, pointer: Point, origin: Point) {
		self.gesture = NodeGesture::Moving {
			offset: pointer.minus(origin),
		};
		self.last_position = Some(origin);
		debug!("node gesture: move");
	}

	pub fn begin_connect(&mut self, center: Point) -> NodeEvent {
		self.gesture = NodeGesture::Connecting { anchor: center };
		debug!("node gesture: connect from ({:.1}, {:.1})", center.x, center.y);
		NodeEvent::ConnectStarted(center)
	}

	/// While moving, every call reports a new position. Connecting nodes
	/// stay put; the surface draws the rubber band.
	pub fn pointer_move(&mut self, pointer: Point) -> Option<NodeEvent> {
		match self.gesture {
			NodeGesture::Moving { offset } => {
				let next = pointer.offset(-offset.0, -offset.1);
				self.last_position = Some(next);
				Some(NodeEvent::PositionChanged(next))
			}
			_ => None,
		}
	}

	/// End the current gesture. `hit` resolves the frontmost node under
	/// `pointer`, excluding `self_id`.
	pub fn release<F>(&mut self, pointer: Point, self_id: &str, hit: F) -> Option<NodeEvent>
	where
		F: FnOnce(Point, &str) -> Option<String>,
	{
		let gesture = std::mem::take(&mut self.gesture);
		let last = self.last_position.take();
		match gesture {
			NodeGesture::Idle => None,
			NodeGesture::Moving { .. } => last.map(NodeEvent::MoveEnded),
			NodeGesture::Connecting { .. } => {
				let target = hit(pointer, self_id).filter(|t| t != self_id);
				debug!("node gesture: connect released over {:?}", target);
				Some(NodeEvent::ConnectEnded(target))
			}
		}
	}

	/// Drop any gesture without reporting it.
	pub fn reset(&mut self) {
		self.gesture = NodeGesture::Idle;
		self.last_position = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn plain_drag_moves_by_captured_offset() {
		let mut node = NodeWidget::default();
		let origin = Point::new(100.0, 100.0);
		assert_eq!(node.pointer_down(Point::new(110.0, 95.0), origin, 0, Modifiers::NONE), None);
		assert!(node.is_moving());

		let ev = node.pointer_move(Point::new(210.0, 195.0));
		assert_eq!(ev, Some(NodeEvent::PositionChanged(Point::new(200.0, 200.0))));
	}

	#[test]
	fn modifier_selects_connect_from_center() {
		let mut node = NodeWidget::default();
		let origin = Point::new(40.0, 60.0);
		let ev = node.pointer_down(Point::new(50.0, 70.0), origin, 0, Modifiers::SHIFT);
		assert_eq!(ev, Some(NodeEvent::ConnectStarted(origin)));
		assert!(node.is_connecting());
		assert_eq!(node.pointer_move(Point::new(500.0, 500.0)), None);

		let alt = Modifiers {
			shift: false,
			alt: true,
		};
		let mut other = NodeWidget::default();
		assert!(matches!(
			other.pointer_down(origin, origin, 0, alt),
			Some(NodeEvent::ConnectStarted(_))
		));
	}

	#[test]
	fn secondary_buttons_are_ignored() {
		let mut node = NodeWidget::default();
		let p = Point::new(0.0, 0.0);
		assert_eq!(node.pointer_down(p, p, 2, Modifiers::SHIFT), None);
		assert!(node.is_idle());
	}

	#[test]
	fn running_gesture_cannot_switch_kind() {
		let mut node = NodeWidget::default();
		let p = Point::new(0.0, 0.0);
		node.pointer_down(p, p, 0, Modifiers::NONE);
		assert_eq!(node.pointer_down(p, p, 0, Modifiers::SHIFT), None);
		assert!(node.is_moving());
	}

	#[test]
	fn connect_release_excludes_self() {
		let mut node = NodeWidget::default();
		let p = Point::new(0.0, 0.0);
		node.begin_connect(p);
		let ev = node.release(p, "a", |_, _| Some("a".to_string()));
		assert_eq!(ev, Some(NodeEvent::ConnectEnded(None)));
		assert!(node.is_idle());
	}

	#[test]
	fn connect_release_reports_target() {
		let mut node = NodeWidget::default();
		let p = Point::new(0.0, 0.0);
		node.begin_connect(p);
		let ev = node.release(p, "a", |_, _| Some("b".to_string()));
		assert_eq!(ev, Some(NodeEvent::ConnectEnded(Some("b".to_string()))));
	}

	#[test]
	fn move_release_reports_last_position() {
		let mut node = NodeWidget::default();
		node.begin_move(Point::new(5.0, 5.0), Point::new(0.0, 0.0));
		for i in 1..=50 {
			node.pointer_move(Point::new(5.0 + i as f64, 5.0));
		}
		let ev = node.release(Point::new(55.0, 5.0), "a", |_, _| None);
		assert_eq!(ev, Some(NodeEvent::MoveEnded(Point::new(50.0, 0.0))));
		assert!(node.is_idle());
	}
}
