//! Gemfall entry point
//!
//! The wasm build wires the simulation into a host page: canvas 2D
//! rendering, pointer translation into field coordinates, HUD updates, and
//! engine events relayed to the embedding page. The native build runs a
//! short headless smoke simulation.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_shell {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, MouseEvent, TouchEvent,
    };

    use gemfall::audio::AudioManager;
    use gemfall::consts::*;
    use gemfall::render::{Color, SpriteId, Surface, render};
    use gemfall::sim::{GameEvent, GameState, PointerInput, tick};
    use gemfall::Settings;

    struct SpriteSlot {
        img: HtmlImageElement,
        loaded: Rc<Cell<bool>>,
    }

    /// Canvas-2D implementation of the render surface. All engine
    /// coordinates are logical; `scale` maps them to device pixels.
    struct CanvasSurface {
        ctx: CanvasRenderingContext2d,
        sprites: HashMap<SpriteId, SpriteSlot>,
        scale: f64,
    }

    impl CanvasSurface {
        fn new(ctx: CanvasRenderingContext2d, scale: f64) -> Self {
            let mut sprites = HashMap::new();
            for id in SpriteId::ALL {
                if let Some(slot) = load_sprite(id) {
                    sprites.insert(id, slot);
                }
            }
            Self {
                ctx,
                sprites,
                scale,
            }
        }

        fn clear(&self) {
            self.ctx.set_fill_style_str("#0b0e1a");
            self.ctx.fill_rect(
                0.0,
                0.0,
                FIELD_W as f64 * self.scale,
                FIELD_H as f64 * self.scale,
            );
        }
    }

    fn load_sprite(id: SpriteId) -> Option<SpriteSlot> {
        let img = HtmlImageElement::new().ok()?;
        let loaded = Rc::new(Cell::new(false));
        let flag = loaded.clone();
        let onload = Closure::<dyn FnMut()>::new(move || flag.set(true));
        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();
        img.set_src(id.asset_path());
        Some(SpriteSlot { img, loaded })
    }

    impl Surface for CanvasSurface {
        fn sprite_ready(&self, id: SpriteId) -> bool {
            self.sprites
                .get(&id)
                .map(|s| s.loaded.get())
                .unwrap_or(false)
        }

        fn draw_sprite(&mut self, id: SpriteId, center: Vec2, size: Vec2) {
            let Some(slot) = self.sprites.get(&id) else {
                return;
            };
            let s = self.scale;
            let _ = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
                &slot.img,
                (center.x - size.x / 2.0) as f64 * s,
                (center.y - size.y / 2.0) as f64 * s,
                size.x as f64 * s,
                size.y as f64 * s,
            );
        }

        fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color) {
            let s = self.scale;
            self.ctx.set_fill_style_str(&color.css());
            self.ctx.begin_path();
            if self
                .ctx
                .ellipse(
                    center.x as f64 * s,
                    center.y as f64 * s,
                    radii.x as f64 * s,
                    radii.y as f64 * s,
                    0.0,
                    0.0,
                    std::f64::consts::TAU,
                )
                .is_ok()
            {
                self.ctx.fill();
            }
        }

        fn fill_rect(&mut self, center: Vec2, size: Vec2, color: Color) {
            let s = self.scale;
            self.ctx.set_fill_style_str(&color.css());
            self.ctx.fill_rect(
                (center.x - size.x / 2.0) as f64 * s,
                (center.y - size.y / 2.0) as f64 * s,
                size.x as f64 * s,
                size.y as f64 * s,
            );
        }
    }

    /// Shell instance holding engine and presentation state
    struct App {
        state: GameState,
        surface: CanvasSurface,
        audio: AudioManager,
        input: PointerInput,
        settings: Settings,
        canvas: HtmlCanvasElement,
    }

    impl App {
        fn new(
            canvas: HtmlCanvasElement,
            surface: CanvasSurface,
            settings: Settings,
            seed: u64,
        ) -> Self {
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);
            Self {
                state: GameState::new(seed).with_particles(settings.particle_config()),
                surface,
                audio,
                input: PointerInput::default(),
                settings,
                canvas,
            }
        }

        /// Translate client coordinates into the logical field
        fn to_logical(&self, client_x: f64, client_y: f64) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            let x = (client_x - rect.left()) / rect.width().max(1.0) * FIELD_W as f64;
            let y = (client_y - rect.top()) / rect.height().max(1.0) * FIELD_H as f64;
            Vec2::new(x as f32, y as f32)
        }

        /// First touch starts the run; a touch after game-over restarts
        fn pointer_down(&mut self, pos: Vec2) {
            self.audio.resume();
            self.input.held = true;
            self.input.pos = Some(pos);

            if self.state.run.game_over {
                let seed = js_sys::Date::now() as u64;
                self.state =
                    GameState::new(seed).with_particles(self.settings.particle_config());
                log::info!("restarting with seed {seed}");
            }
            self.state.start();
        }

        fn frame(&mut self, time: f64) {
            tick(&mut self.state, &self.input, time);

            self.surface.clear();
            render(&self.state, &mut self.surface);
            self.update_hud();

            for event in self.state.drain_events() {
                post_event(&event);
            }
            for cue in self.state.drain_sounds() {
                self.audio.play(cue);
            }
        }

        /// Update HUD elements in the DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.run.score.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-level .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.run.level.to_string()));
            }
            if let Some(el) = document.get_element_by_id("energy-fill") {
                let pct = self.state.run.energy / INITIAL_ENERGY * 100.0;
                let _ = el.set_attribute("style", &format!("width:{pct:.1}%"));
            }

            if let Some(el) = document.get_element_by_id("tap-to-start") {
                let class = if self.state.run.game_started { "hidden" } else { "" };
                let _ = el.set_attribute("class", class);
            }
            if let Some(el) = document.get_element_by_id("game-over") {
                if self.state.run.game_over {
                    let _ = el.set_attribute("class", "");
                    if let Some(score_el) = document.get_element_by_id("final-score") {
                        score_el.set_text_content(Some(&self.state.run.score.to_string()));
                    }
                    if let Some(level_el) = document.get_element_by_id("final-level") {
                        level_el.set_text_content(Some(&self.state.run.level.to_string()));
                    }
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }
    }

    /// Relay an engine event to the embedding page as JSON
    fn post_event(event: &GameEvent) {
        let Ok(json) = serde_json::to_string(event) else {
            return;
        };
        let Some(window) = web_sys::window() else {
            return;
        };
        let target = window.parent().ok().flatten().unwrap_or(window);
        if let Err(e) = target.post_message(&JsValue::from_str(&json), "*") {
            log::warn!("postMessage failed: {e:?}");
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Gemfall starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Back the canvas at device resolution, preserving the field aspect
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width() as f64;
        let width = (client_w * dpr).max(FIELD_W as f64 / 2.0);
        let scale = width / FIELD_W as f64;
        canvas.set_width(width as u32);
        canvas.set_height((FIELD_H as f64 * scale) as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let surface = CanvasSurface::new(ctx, scale);
        let app = Rc::new(RefCell::new(App::new(
            canvas.clone(),
            surface,
            settings,
            seed,
        )));
        log::info!("engine initialized with seed {seed}");

        setup_pointer_handlers(&canvas, app.clone());
        setup_focus_handlers(app.clone());
        request_animation_frame(app);

        log::info!("Gemfall running");
    }

    fn setup_pointer_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Mouse down
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let pos = a.to_logical(event.client_x() as f64, event.client_y() as f64);
                a.pointer_down(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let pos = a.to_logical(event.client_x() as f64, event.client_y() as f64);
                a.input.pos = Some(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().input.held = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut a = app.borrow_mut();
                    let pos = a.to_logical(touch.client_x() as f64, touch.client_y() as f64);
                    a.pointer_down(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut a = app.borrow_mut();
                    let pos = a.to_logical(touch.client_x() as f64, touch.client_y() as f64);
                    a.input.pos = Some(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                app.borrow_mut().input.held = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Release the drag (and optionally mute) when the page loses focus
    fn setup_focus_handlers(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let hidden =
                    document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                let mut a = app.borrow_mut();
                if hidden {
                    a.input.held = false;
                }
                if a.settings.mute_on_blur {
                    a.audio.set_muted(hidden);
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                app.borrow_mut().input.held = false;
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            app.borrow_mut().frame(time);
            request_animation_frame(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_shell::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;

    use gemfall::sim::{GameState, PointerInput, tick};

    env_logger::init();
    log::info!("Gemfall (native) starting...");

    // Headless smoke run: sweep the ship while holding fire for up to 20
    // simulated seconds at a steady 60 Hz cadence
    let mut state = GameState::new(0xC0FFEE);
    state.start();

    let mut t = 0.0;
    for i in 0..1200u32 {
        let x = 360.0 + (i as f32 * 0.02).sin() * 250.0;
        let input = PointerInput {
            pos: Some(Vec2::new(x, 870.0)),
            held: true,
        };
        tick(&mut state, &input, t);
        t += 1000.0 / 60.0;

        for event in state.drain_events() {
            log::info!("event: {event:?}");
        }
        state.drain_sounds();

        if state.run.game_over {
            break;
        }
    }

    println!(
        "smoke run finished: score {} level {} after {} ticks",
        state.run.score, state.run.level, state.ticks
    );
}
