use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::geometry::{self, Point};
use super::state::{DiagramState, EdgeGeometry, NODE_HEIGHT, NODE_WIDTH, NodeView};

const BACKGROUND: &str = "#f4f5f7";
const CARD_FILL: &str = "#ffffff";
const CARD_BORDER: &str = "#d9dde3";
const TEXT: &str = "#1f2430";
const MUTED: &str = "#6b7280";
const PRIMARY: &str = "#4f46e5";
const CARD_RADIUS: f64 = 10.0;
const CARD_PADDING: f64 = 12.0;
const CONNECT_SCALE: f64 = 1.05;
const ARROW_SIZE: f64 = 10.0;
const EMPTY_HINT: &str = "Upload company data to generate entities and start building your network";

pub fn render(state: &DiagramState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	if state.nodes().is_empty() {
		ctx.set_fill_style_str(MUTED);
		ctx.set_font("14px sans-serif");
		ctx.set_text_align("center");
		let _ = ctx.fill_text(EMPTY_HINT, state.width / 2.0, state.height / 2.0);
		return;
	}

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	for edge in state.edges() {
		draw_edge(&edge, ctx);
	}
	draw_rubber_band(state, ctx);
	for node in state.nodes() {
		draw_node(node, ctx);
	}
	ctx.restore();
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: &[f64]) {
	let pattern = js_sys::Array::new();
	for d in dash {
		pattern.push(&JsValue::from_f64(*d));
	}
	let _ = ctx.set_line_dash(&pattern);
}

fn draw_edge(edge: &EdgeGeometry, ctx: &CanvasRenderingContext2d) {
	let color = format!("rgba(100, 116, 139, {})", edge.opacity);
	ctx.set_stroke_style_str(&color);
	ctx.set_line_width(edge.width);
	set_dash(ctx, &[]);

	ctx.begin_path();
	ctx.move_to(edge.source.x, edge.source.y);
	if edge.is_degenerate() {
		ctx.line_to(edge.target.x, edge.target.y);
		ctx.stroke();
		return;
	}
	ctx.quadratic_curve_to(edge.control.x, edge.control.y, edge.target.x, edge.target.y);
	ctx.stroke();

	// Arrowhead where the curve meets the target card.
	let t = geometry::quad_entry_t(edge.source, edge.control, edge.target, &edge.target_bounds);
	let tip = geometry::quad_point(edge.source, edge.control, edge.target, t);
	let (tx, ty) = geometry::quad_tangent(edge.source, edge.control, edge.target, t);
	let len = (tx * tx + ty * ty).sqrt();
	if len > geometry::EPSILON {
		let size = ARROW_SIZE + edge.width;
		let (ux, uy) = (tx / len, ty / len);
		let back = tip.offset(-ux * size, -uy * size);
		let (px, py) = (-uy * size * 0.5, ux * size * 0.5);
		ctx.set_fill_style_str(&color);
		ctx.begin_path();
		ctx.move_to(tip.x, tip.y);
		ctx.line_to(back.x + px, back.y + py);
		ctx.line_to(back.x - px, back.y - py);
		ctx.close_path();
		ctx.fill();
	}

	let apex = geometry::quad_point(edge.source, edge.control, edge.target, 0.5);
	ctx.set_font(if edge.hovered {
		"bold 12px sans-serif"
	} else {
		"12px sans-serif"
	});
	ctx.set_text_align("center");
	ctx.set_fill_style_str(if edge.hovered { TEXT } else { MUTED });
	let _ = ctx.fill_text(&edge.label, apex.x, apex.y - 6.0);
}

fn draw_rubber_band(state: &DiagramState, ctx: &CanvasRenderingContext2d) {
	let Some((from, to)) = state.rubber_band() else {
		return;
	};
	ctx.set_stroke_style_str(PRIMARY);
	ctx.set_line_width(2.0);
	set_dash(ctx, &[6.0, 4.0]);
	ctx.begin_path();
	ctx.move_to(from.x, from.y);
	ctx.line_to(to.x, to.y);
	ctx.stroke();
	set_dash(ctx, &[]);
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn draw_node(node: &NodeView, ctx: &CanvasRenderingContext2d) {
	let connecting = node.widget.is_connecting();
	let Point { x: cx, y: cy } = node.position;

	ctx.save();
	if connecting {
		let _ = ctx.translate(cx, cy);
		let _ = ctx.scale(CONNECT_SCALE, CONNECT_SCALE);
		let _ = ctx.translate(-cx, -cy);
	}

	let (x, y) = (cx - NODE_WIDTH / 2.0, cy - NODE_HEIGHT / 2.0);
	rounded_rect(ctx, x, y, NODE_WIDTH, NODE_HEIGHT, CARD_RADIUS);
	ctx.set_fill_style_str(CARD_FILL);
	ctx.fill();
	if connecting {
		ctx.set_stroke_style_str(PRIMARY);
		ctx.set_line_width(3.0);
	} else {
		ctx.set_stroke_style_str(CARD_BORDER);
		ctx.set_line_width(1.0);
	}
	ctx.stroke();

	let left = x + CARD_PADDING;
	let mut line_y = y + CARD_PADDING + 12.0;
	ctx.set_text_align("left");

	ctx.set_fill_style_str(TEXT);
	ctx.set_font("600 14px sans-serif");
	let _ = ctx.fill_text(&truncate(&node.entity.name, 22), left, line_y);

	ctx.set_fill_style_str(MUTED);
	ctx.set_font("12px sans-serif");
	let blurb = node
		.entity
		.who_they_are
		.as_deref()
		.filter(|s| !s.trim().is_empty())
		.unwrap_or("Entity profile...");
	for line in wrap_lines(blurb, 28, 2) {
		line_y += 15.0;
		let _ = ctx.fill_text(&line, left, line_y);
	}

	if let Some(position) = node.entity.market_position.as_deref() {
		line_y += 15.0;
		let _ = ctx.fill_text(&truncate(&format!("Position: {}", position), 28), left, line_y);
	}

	ctx.set_fill_style_str(PRIMARY);
	ctx.set_font("italic 11px sans-serif");
	let _ = ctx.fill_text(
		"Hold Shift + drag to connect",
		left,
		y + NODE_HEIGHT - CARD_PADDING / 2.0,
	);
	ctx.restore();
}

/// Cut `text` to `max` characters, ending with an ellipsis when cut.
fn truncate(text: &str, max: usize) -> String {
	if text.chars().count() <= max {
		return text.to_string();
	}
	let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
	out.push('…');
	out
}

/// Greedy word wrap into at most `max_lines` lines; the last line is
/// truncated if text remains.
fn wrap_lines(text: &str, width: usize, max_lines: usize) -> Vec<String> {
	let mut lines: Vec<String> = Vec::new();
	let mut current = String::new();
	let mut words = text.split_whitespace().peekable();
	while let Some(word) = words.next() {
		let needed = if current.is_empty() {
			word.chars().count()
		} else {
			current.chars().count() + 1 + word.chars().count()
		};
		if needed > width && !current.is_empty() {
			lines.push(std::mem::take(&mut current));
			if lines.len() == max_lines {
				let last = lines.pop().unwrap_or_default();
				let rest: Vec<&str> = std::iter::once(word).chain(words).collect();
				lines.push(truncate(&format!("{} {}", last, rest.join(" ")), width));
				return lines;
			}
		}
		if !current.is_empty() {
			current.push(' ');
		}
		current.push_str(word);
	}
	if !current.is_empty() && lines.len() < max_lines {
		lines.push(truncate(&current, width));
	}
	lines
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn truncate_marks_cut_text() {
		assert_eq!(truncate("Acme", 10), "Acme");
		assert_eq!(truncate("Acme Corporation", 6), "Acme …");
	}

	#[test]
	fn wrap_respects_line_budget() {
		let lines = wrap_lines("a global maker of widgets and gadgets for everyone", 16, 2);
		assert_eq!(lines.len(), 2);
		assert_eq!(lines[0], "a global maker");
		assert!(lines[1].ends_with('…'));
		assert!(lines[1].chars().count() <= 16);
	}

	#[test]
	fn short_text_is_one_line() {
		assert_eq!(wrap_lines("tiny", 16, 2), vec!["tiny".to_string()]);
		assert!(wrap_lines("   ", 16, 2).is_empty());
	}
}
