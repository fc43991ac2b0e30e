use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::dialog::RelationshipDialog;
use super::geometry::Point;
use super::node::{Modifiers, PRIMARY_BUTTON};
use super::render;
use super::state::{DiagramState, NewRelationship, PendingConnection, SurfaceEvent};
use super::types::{Entity, Relationship};

type SharedState = Rc<RefCell<Option<DiagramState>>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Window-level move/release listeners. They are attached only while a
/// gesture is running so that pointer activity elsewhere on the page
/// never reaches the diagram.
struct GestureListeners {
	on_move: Closure<dyn FnMut(MouseEvent)>,
	on_up: Closure<dyn FnMut(MouseEvent)>,
	attached: Cell<bool>,
}

impl GestureListeners {
	fn new(
		on_move: impl FnMut(MouseEvent) + 'static,
		on_up: impl FnMut(MouseEvent) + 'static,
	) -> Self {
		Self {
			on_move: Closure::new(on_move),
			on_up: Closure::new(on_up),
			attached: Cell::new(false),
		}
	}

	fn attach(&self) {
		if self.attached.get() {
			return;
		}
		let Some(window) = web_sys::window() else {
			return;
		};
		let _ = window
			.add_event_listener_with_callback("mousemove", self.on_move.as_ref().unchecked_ref());
		let _ =
			window.add_event_listener_with_callback("mouseup", self.on_up.as_ref().unchecked_ref());
		self.attached.set(true);
	}

	fn detach(&self) {
		if !self.attached.get() {
			return;
		}
		if let Some(window) = web_sys::window() {
			let _ = window.remove_event_listener_with_callback(
				"mousemove",
				self.on_move.as_ref().unchecked_ref(),
			);
			let _ = window.remove_event_listener_with_callback(
				"mouseup",
				self.on_up.as_ref().unchecked_ref(),
			);
		}
		self.attached.set(false);
	}
}

/// Where surface events go once the state borrow has been released.
#[derive(Clone, Copy)]
struct Outlets {
	on_position_change: Callback<(String, f64, f64)>,
	on_move_end: Option<Callback<(String, f64, f64)>>,
	pending: RwSignal<Option<PendingConnection>>,
}

impl Outlets {
	fn dispatch(self, events: Vec<SurfaceEvent>) {
		for event in events {
			match event {
				SurfaceEvent::PositionChanged { id, position } => {
					self.on_position_change.run((id, position.x, position.y));
				}
				SurfaceEvent::MoveFinished { id, position } => {
					if let Some(cb) = self.on_move_end {
						cb.run((id, position.x, position.y));
					}
				}
				SurfaceEvent::ConnectionRequested(pending) => self.pending.set(Some(pending)),
			}
		}
	}
}

/// Pointer position relative to the canvas' top-left corner.
fn surface_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn measure(canvas: &HtmlCanvasElement, height: f64) -> (f64, f64) {
	let width = canvas
		.parent_element()
		.map(|p| p.client_width() as f64)
		.filter(|w| *w > 0.0)
		.unwrap_or(800.0);
	(width, height)
}

/// Interactive diagram of entities and their relationships.
///
/// Plain drag on a node moves it; Shift (or Alt) drag draws a connection
/// and, when released over another node, opens the relationship dialog.
/// Dragging the background pans and the wheel zooms.
#[component]
pub fn NetworkCanvas(
	#[prop(into)] entities: Signal<Vec<Entity>>,
	#[prop(into)] relationships: Signal<Vec<Relationship>>,
	/// Called on every move update, not debounced.
	#[prop(into)]
	on_position_change: Callback<(String, f64, f64)>,
	/// Called once when a move gesture is released.
	#[prop(optional, into)]
	on_move_end: Option<Callback<(String, f64, f64)>>,
	/// Called once per confirmed relationship dialog.
	#[prop(into)]
	on_relationship_create: Callback<NewRelationship>,
	#[prop(default = 640.0)] height: f64,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: FrameCallback = Rc::new(RefCell::new(None));
	let running = Rc::new(Cell::new(true));
	let listeners: Rc<RefCell<Option<GestureListeners>>> = Rc::new(RefCell::new(None));
	let pending = RwSignal::new(None::<PendingConnection>);
	let cursor = RwSignal::new("default");
	let outlets = Outlets {
		on_position_change,
		on_move_end,
		pending,
	};

	let (state_move, state_up, listeners_up) = (state.clone(), state.clone(), listeners.clone());
	*listeners.borrow_mut() = Some(GestureListeners::new(
		move |ev: MouseEvent| {
			let Some(p) = surface_point(canvas_ref, &ev) else {
				return;
			};
			let events = match state_move.borrow_mut().as_mut() {
				Some(s) => s.pointer_move(p),
				None => return,
			};
			outlets.dispatch(events);
		},
		move |ev: MouseEvent| {
			if ev.button() != PRIMARY_BUTTON {
				return;
			}
			let events = match (surface_point(canvas_ref, &ev), state_up.borrow_mut().as_mut()) {
				(Some(p), Some(s)) => s.pointer_up(p, ev.button()),
				(None, Some(s)) => {
					s.cancel_gesture();
					Vec::new()
				}
				_ => Vec::new(),
			};
			if let Some(l) = listeners_up.borrow().as_ref() {
				l.detach();
			}
			cursor.set("default");
			outlets.dispatch(events);
		},
	));

	let (state_init, animate_init, resize_init, running_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), running.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = measure(&canvas, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("canvas 2d context unavailable");
			return;
		};
		*state_init.borrow_mut() = Some(DiagramState::new(
			&entities.get_untracked(),
			&relationships.get_untracked(),
			w,
			h,
		));

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = measure(&canvas_resize, height);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(s) = state_resize.borrow_mut().as_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(cb) = resize_init.borrow().as_ref() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner, running_anim) =
			(state_init.clone(), animate_init.clone(), running_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !running_anim.get() {
				return;
			}
			if let Some(s) = state_anim.borrow().as_ref() {
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(cb) = animate_init.borrow().as_ref() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_sync = state.clone();
	Effect::new(move |_| {
		let (ents, rels) = (entities.get(), relationships.get());
		if let Some(s) = state_sync.borrow_mut().as_mut() {
			s.sync(&ents, &rels);
			if s.pending().is_none() && pending.get_untracked().is_some() {
				pending.set(None);
			}
		}
	});

	// The frame callback stays allocated; clearing `running` stops it
	// rescheduling itself.
	let teardown = StoredValue::new_local((listeners.clone(), resize_cb.clone(), running.clone()));
	on_cleanup(move || {
		teardown.try_with_value(|(listeners, resize_cb, running)| {
			running.set(false);
			if let Some(l) = listeners.borrow_mut().take() {
				l.detach();
			}
			if let (Some(cb), Some(win)) = (resize_cb.borrow_mut().take(), web_sys::window()) {
				let _ =
					win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
			debug!("network canvas torn down");
		});
	});

	let (state_md, listeners_md) = (state.clone(), listeners.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some(p) = surface_point(canvas_ref, &ev) else {
			return;
		};
		let modifiers = Modifiers {
			shift: ev.shift_key(),
			alt: ev.alt_key(),
		};
		let started = state_md
			.borrow_mut()
			.as_mut()
			.is_some_and(|s| s.pointer_down(p, ev.button(), modifiers));
		if started {
			ev.prevent_default();
			cursor.set("grabbing");
			if let Some(l) = listeners_md.borrow().as_ref() {
				l.attach();
			}
		}
	};

	// Hover only; active gestures are fed by the window listeners.
	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(p) = surface_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(s) = state_mm.borrow_mut().as_mut() {
			if s.is_gesture_active() {
				return;
			}
			s.pointer_move(p);
			let local = s.screen_to_local(p);
			cursor.set(if s.node_at(local, None).is_some() {
				"grab"
			} else if s.hovered_edge().is_some() {
				"pointer"
			} else {
				"default"
			});
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(s) = state_ml.borrow_mut().as_mut() {
			if !s.is_gesture_active() {
				s.set_hover(None);
			}
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(p) = surface_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(s) = state_wh.borrow_mut().as_mut() {
			s.zoom_at(p, ev.delta_y());
		}
	};

	let shared = StoredValue::new_local(state.clone());
	let on_submit = Callback::new(move |(label, strength): (String, f64)| {
		let created = shared
			.try_with_value(|st| {
				st.borrow_mut()
					.as_mut()
					.and_then(|s| s.submit_relationship(&label, strength))
			})
			.flatten();
		pending.set(None);
		if let Some(rel) = created {
			on_relationship_create.run(rel);
		}
	});
	let on_cancel = Callback::new(move |_: ()| {
		shared.try_with_value(|st| {
			if let Some(s) = st.borrow_mut().as_mut() {
				s.cancel_relationship();
			}
		});
		pending.set(None);
	});

	view! {
		<div class="network-surface" style=format!("height: {}px;", height)>
			<canvas
				node_ref=canvas_ref
				class="network-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:contextmenu=move |ev: MouseEvent| ev.prevent_default()
				style=move || format!("display: block; cursor: {};", cursor.get())
			/>
			<Show when=move || pending.with(Option::is_some)>
				<RelationshipDialog on_submit=on_submit on_cancel=on_cancel />
			</Show>
		</div>
	}
}
