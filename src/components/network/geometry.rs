//! Stateless geometry used by edge layout and hit-testing.

/// Distances below this are treated as coincident points.
pub const EPSILON: f64 = 1e-3;

const CURVE_SAMPLES: usize = 24;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn offset(self, dx: f64, dy: f64) -> Self {
		Self::new(self.x + dx, self.y + dy)
	}

	/// Vector from `other` to `self`.
	pub fn minus(self, other: Point) -> (f64, f64) {
		(self.x - other.x, self.y - other.y)
	}

	#[cfg(test)]
	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

/// Axis-aligned rectangle, origin at the top-left.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub w: f64,
	pub h: f64,
}

impl Rect {
	pub fn centered(center: Point, w: f64, h: f64) -> Self {
		Self {
			x: center.x - w / 2.0,
			y: center.y - h / 2.0,
			w,
			h,
		}
	}

	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
	}
}

pub fn distance(a: Point, b: Point) -> f64 {
	let (dx, dy) = b.minus(a);
	(dx * dx + dy * dy).sqrt()
}

pub fn midpoint(a: Point, b: Point) -> Point {
	Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Unit normal to `a -> b`, rotated a quarter turn clockwise in y-down
/// screen space, i.e. to the right of travel. `None` when the points
/// coincide.
pub fn perpendicular(a: Point, b: Point) -> Option<(f64, f64)> {
	let dist = distance(a, b);
	if dist < EPSILON {
		return None;
	}
	let (dx, dy) = b.minus(a);
	Some((-dy / dist, dx / dist))
}

/// Control point of the quadratic curve from `a` to `b`, pushed off the
/// midpoint along the perpendicular by `distance * bend`.
///
/// Coincident endpoints get the midpoint itself, which degenerates the
/// curve to a point instead of producing `NaN`.
pub fn control_point(a: Point, b: Point, bend: f64) -> Point {
	let mid = midpoint(a, b);
	match perpendicular(a, b) {
		Some((px, py)) => {
			let off = distance(a, b) * bend;
			mid.offset(px * off, py * off)
		}
		None => mid,
	}
}

pub fn quad_point(p0: Point, c: Point, p1: Point, t: f64) -> Point {
	let u = 1.0 - t;
	Point::new(
		u * u * p0.x + 2.0 * u * t * c.x + t * t * p1.x,
		u * u * p0.y + 2.0 * u * t * c.y + t * t * p1.y,
	)
}

/// Derivative of the quadratic curve at `t`.
pub fn quad_tangent(p0: Point, c: Point, p1: Point, t: f64) -> (f64, f64) {
	let u = 1.0 - t;
	(
		2.0 * u * (c.x - p0.x) + 2.0 * t * (p1.x - c.x),
		2.0 * u * (c.y - p0.y) + 2.0 * t * (p1.y - c.y),
	)
}

pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
	let (abx, aby) = b.minus(a);
	let len_sq = abx * abx + aby * aby;
	if len_sq < EPSILON * EPSILON {
		return distance(p, a);
	}
	let (apx, apy) = p.minus(a);
	let t = ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0);
	distance(p, Point::new(a.x + abx * t, a.y + aby * t))
}

/// Approximate distance from `p` to the curve by walking a polyline.
pub fn distance_to_quad(p: Point, p0: Point, c: Point, p1: Point) -> f64 {
	let mut best = f64::INFINITY;
	let mut prev = p0;
	for i in 1..=CURVE_SAMPLES {
		let next = quad_point(p0, c, p1, i as f64 / CURVE_SAMPLES as f64);
		best = best.min(distance_to_segment(p, prev, next));
		prev = next;
	}
	best
}

/// Parameter at which the curve first enters `rect` when walked from
/// `p0`, found by bisection. Returns `1.0` when the curve never leaves it
/// or `p0` already lies inside.
pub fn quad_entry_t(p0: Point, c: Point, p1: Point, rect: &Rect) -> f64 {
	if rect.contains(p0) {
		return 1.0;
	}
	let (mut lo, mut hi) = (0.0, 1.0);
	for _ in 0..20 {
		let mid = (lo + hi) / 2.0;
		if rect.contains(quad_point(p0, c, p1, mid)) {
			hi = mid;
		} else {
			lo = mid;
		}
	}
	hi
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn control_point_bends_right_of_travel() {
		let a = Point::new(0.0, 0.0);
		let b = Point::new(100.0, 0.0);
		let c = control_point(a, b, 0.2);
		assert!(close(c.x, 50.0));
		assert!(close(c.y, 20.0));
	}

	#[test]
	fn reversed_edge_bends_the_other_way() {
		let a = Point::new(0.0, 0.0);
		let b = Point::new(100.0, 0.0);
		let forward = control_point(a, b, 0.2);
		let back = control_point(b, a, 0.2);
		assert!(close(forward.y, -back.y));
	}

	#[test]
	fn coincident_points_do_not_produce_nan() {
		let p = Point::new(42.0, 17.0);
		assert_eq!(perpendicular(p, p), None);
		let c = control_point(p, p, 0.2);
		assert!(c.is_finite());
		assert_eq!(c, p);
		assert!(quad_point(p, c, p, 0.5).is_finite());
		assert!(distance_to_quad(Point::new(0.0, 0.0), p, c, p).is_finite());
	}

	#[test]
	fn curve_passes_through_endpoints() {
		let a = Point::new(10.0, 10.0);
		let b = Point::new(200.0, 80.0);
		let c = control_point(a, b, 0.2);
		assert_eq!(quad_point(a, c, b, 0.0), a);
		assert_eq!(quad_point(a, c, b, 1.0), b);
		assert!(distance_to_quad(b, a, c, b) < 1e-9);
	}

	#[test]
	fn entry_parameter_lands_on_rect_border() {
		let a = Point::new(0.0, 0.0);
		let b = Point::new(300.0, 0.0);
		let c = midpoint(a, b);
		let rect = Rect::centered(b, 100.0, 50.0);
		let t = quad_entry_t(a, c, b, &rect);
		let hit = quad_point(a, c, b, t);
		assert!((hit.x - 250.0).abs() < 0.01);
	}

	#[test]
	fn segment_distance_clamps_to_endpoints() {
		let a = Point::new(0.0, 0.0);
		let b = Point::new(10.0, 0.0);
		assert!(close(distance_to_segment(Point::new(5.0, 3.0), a, b), 3.0));
		assert!(close(distance_to_segment(Point::new(13.0, 4.0), a, b), 5.0));
	}
}
