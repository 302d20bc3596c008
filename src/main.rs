//! Pipe Jump entry point
//!
//! On the web this wires the page (sprites, audio elements, HUD, buttons) to
//! the game. Natively it plays a scripted headless run with logging.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlAudioElement, HtmlElement, KeyboardEvent};

    use pipe_jump::audio::web::ElementSound;
    use pipe_jump::persistence::web::LocalStorage;
    use pipe_jump::sim::{GameEvent, PositionProvider, PositionSample};
    use pipe_jump::ui::{Command, InputEvent, format_high_score, format_score};
    use pipe_jump::{AudioController, Game, GameConfig};

    const END_SOUND_URL: &str = "src/audios/sound-effect_1.mp3";
    const GAME_OVER_SPRITE: &str = "src/images/game-over.png";

    /// Reads sprite positions straight off the page
    struct DomPositions {
        window: web_sys::Window,
        character: HtmlElement,
        obstacle: HtmlElement,
    }

    impl PositionProvider for DomPositions {
        fn sample(&mut self) -> PositionSample {
            let obstacle_left = self.obstacle.offset_left() as f64;
            // Non-numeric reads become NaN, which never collides
            let character_bottom = self
                .window
                .get_computed_style(&self.character)
                .ok()
                .flatten()
                .and_then(|style| style.get_property_value("bottom").ok())
                .and_then(|bottom| bottom.trim_end_matches("px").trim().parse::<f64>().ok())
                .unwrap_or(f64::NAN);
            PositionSample::new(obstacle_left, character_bottom)
        }
    }

    type WebGame = Game<DomPositions, LocalStorage, ElementSound>;

    /// Page elements the HUD writes to
    struct Page {
        character: HtmlElement,
        obstacle: HtmlElement,
        score: Element,
        high_score: Element,
        restart: Element,
    }

    impl Page {
        /// Reflect game events in the DOM
        fn apply(&self, events: &[GameEvent]) {
            for event in events {
                match *event {
                    GameEvent::ScoreChanged(score) => {
                        self.score.set_text_content(Some(&format_score(score)));
                    }
                    GameEvent::HighScoreChanged(best) => {
                        self.high_score
                            .set_text_content(Some(&format_high_score(best)));
                    }
                    GameEvent::RestartVisible(visible) => {
                        let classes = self.restart.class_list();
                        let _ = if visible {
                            classes.remove_1("hidden")
                        } else {
                            classes.add_1("hidden")
                        };
                    }
                    GameEvent::JumpStarted => {
                        let _ = self.character.class_list().add_1("jump");
                    }
                    GameEvent::JumpEnded => {
                        let _ = self.character.class_list().remove_1("jump");
                    }
                    GameEvent::Frozen(sample) => self.freeze(sample),
                    GameEvent::GameOver { score, new_record } => {
                        if new_record {
                            log::info!("New record: {}", score);
                        }
                    }
                }
            }
        }

        /// Stop both animations where the hit happened and show the game-over sprite
        fn freeze(&self, sample: PositionSample) {
            let pipe = self.obstacle.style();
            let _ = pipe.set_property("animation", "none");
            let _ = pipe.set_property("left", &format!("{}px", sample.obstacle_left_px));

            let character = self.character.style();
            let _ = character.set_property("animation", "none");
            let _ = character.set_property("bottom", &format!("{}px", sample.character_bottom_px));
            let _ = character.set_property("width", "75px");
            let _ = character.set_property("margin-left", "50px");
            let _ = self.character.set_attribute("src", GAME_OVER_SPRITE);
        }
    }

    fn html_element(document: &Document, selector: &str) -> HtmlElement {
        document
            .query_selector(selector)
            .ok()
            .flatten()
            .unwrap_or_else(|| panic!("missing element {}", selector))
            .dyn_into()
            .unwrap_or_else(|_| panic!("{} is not an HTML element", selector))
    }

    fn element(document: &Document, id: &str) -> Element {
        document
            .get_element_by_id(id)
            .unwrap_or_else(|| panic!("missing element #{}", id))
    }

    fn reload() {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().reload() {
                log::error!("Reload failed: {:?}", e);
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Pipe Jump starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let page = Rc::new(Page {
            character: html_element(&document, ".mario"),
            obstacle: html_element(&document, ".pipe"),
            score: element(&document, "score-display"),
            high_score: element(&document, "score-record"),
            restart: element(&document, "reset-button"),
        });

        let theme: HtmlAudioElement = element(&document, "theme-sound")
            .dyn_into()
            .expect("#theme-sound is not an audio element");
        let end = ElementSound::from_url(END_SOUND_URL).expect("Failed to create end sound");
        let audio = AudioController::new(ElementSound::new(theme), end);

        let store = LocalStorage::new();
        let config = GameConfig::load(&store);
        let positions = DomPositions {
            window: window.clone(),
            character: page.character.clone(),
            obstacle: page.obstacle.clone(),
        };

        let game: Rc<RefCell<WebGame>> =
            Rc::new(RefCell::new(Game::new(config, positions, store, audio)));

        setup_timer_loop(&window, game.clone(), page.clone());
        setup_input_handlers(&document, game.clone(), page.clone());
        setup_unload(&window, game.clone());

        let ready_state = js_sys::Reflect::get(&document, &JsValue::from_str("readyState"))
            .ok()
            .and_then(|v| v.as_string());
        if ready_state.as_deref() == Some("complete") {
            start(&game, &page);
        } else {
            let game = game.clone();
            let page = page.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                start(&game, &page);
            });
            let _ = window.add_event_listener_with_callback("load", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn start(game: &Rc<RefCell<WebGame>>, page: &Page) {
        let mut g = game.borrow_mut();
        g.start();
        page.apply(&g.drain_events());
        log::info!("Pipe Jump running!");
    }

    /// Drive the game's timers from wall-clock time
    fn setup_timer_loop(window: &web_sys::Window, game: Rc<RefCell<WebGame>>, page: Rc<Page>) {
        let period = i32::try_from(game.borrow().config().collision_period_ms).unwrap_or(i32::MAX);
        let mut last_time = js_sys::Date::now();
        let closure = Closure::<dyn FnMut()>::new(move || {
            let now = js_sys::Date::now();
            let elapsed = (now - last_time).max(0.0) as u64;
            if elapsed == 0 {
                return;
            }
            // Only consume whole milliseconds so fractions carry over
            last_time += elapsed as f64;

            let mut g = game.borrow_mut();
            g.advance(elapsed);
            page.apply(&g.drain_events());
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            period.max(1),
        );
        closure.forget();
    }

    fn setup_input_handlers(document: &Document, game: Rc<RefCell<WebGame>>, page: Rc<Page>) {
        // Keyboard: jump, or restart after game over
        {
            let game = game.clone();
            let page = page.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let input = InputEvent::KeyDown { code: event.code() };
                let command = {
                    let mut g = game.borrow_mut();
                    let command = g.handle_input(&input);
                    page.apply(&g.drain_events());
                    command
                };
                if command == Some(Command::Restart) {
                    event.prevent_default();
                    reload();
                }
            });
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Restart button
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let command = game.borrow_mut().handle_input(&InputEvent::RestartActivated);
                if command == Some(Command::Restart) {
                    reload();
                }
            });
            let _ = page
                .restart
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Volumes are written back when the page goes away
    fn setup_unload(window: &web_sys::Window, game: Rc<RefCell<WebGame>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().end_session();
        });
        let _ = window
            .add_event_listener_with_callback("beforeunload", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Pipe Jump (native) starting...");
    log::info!("Native mode plays a scripted headless run - serve the wasm build for the real game");

    native_demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run against a simulated course
#[cfg(not(target_arch = "wasm32"))]
mod native_demo {
    use std::cell::Cell;
    use std::rc::Rc;

    use pipe_jump::audio::MemorySound;
    use pipe_jump::sim::{GameEvent, GamePhase, PositionProvider, PositionSample};
    use pipe_jump::ui::{Hud, InputEvent};
    use pipe_jump::{AudioController, Game, GameConfig, MemoryStore};

    /// Board width the pipe crosses (px)
    const BOARD_WIDTH: f64 = 800.0;
    const PIPE_WIDTH: f64 = 80.0;
    /// One pass of the pipe animation
    const PIPE_CYCLE_MS: u64 = 1500;
    /// Peak of the jump animation
    const JUMP_HEIGHT: f64 = 180.0;
    /// The bot jumps when the pipe gets this close
    const JUMP_TRIGGER_PX: f64 = 180.0;
    /// Passes the bot clears before it stops jumping
    const CLEARED_PASSES: u64 = 4;
    const STEP_MS: u64 = 10;

    /// Stand-in for the CSS animations: where things are at a point in time
    #[derive(Clone, Default)]
    struct Course {
        now_ms: Rc<Cell<u64>>,
        jump_started_ms: Rc<Cell<Option<u64>>>,
        jump_duration_ms: u64,
    }

    impl Course {
        fn obstacle_left(&self) -> f64 {
            let phase = (self.now_ms.get() % PIPE_CYCLE_MS) as f64 / PIPE_CYCLE_MS as f64;
            BOARD_WIDTH - phase * (BOARD_WIDTH + PIPE_WIDTH)
        }

        fn character_bottom(&self) -> f64 {
            let Some(start) = self.jump_started_ms.get() else {
                return 0.0;
            };
            let t = (self.now_ms.get() - start) as f64 / self.jump_duration_ms as f64;
            if t >= 1.0 {
                0.0
            } else {
                JUMP_HEIGHT * (t * std::f64::consts::PI).sin()
            }
        }
    }

    impl PositionProvider for Course {
        fn sample(&mut self) -> PositionSample {
            PositionSample::new(self.obstacle_left(), self.character_bottom())
        }
    }

    type DemoGame = Game<Course, MemoryStore, MemorySound>;

    /// Step the game until it ends, jumping for the first few passes
    fn play(game: &mut DemoGame, hud: &mut Hud) {
        let course = game.positions_mut().clone();
        course.now_ms.set(game.now_ms());
        course.jump_started_ms.set(None);

        while game.phase() == GamePhase::Running {
            let passes = course.now_ms.get() / PIPE_CYCLE_MS;
            let left = course.obstacle_left();
            if passes < CLEARED_PASSES
                && left > 0.0
                && left <= JUMP_TRIGGER_PX
                && game.handle_input(&InputEvent::key("ArrowUp")).is_some()
            {
                course.jump_started_ms.set(Some(game.now_ms()));
            }

            course.now_ms.set(game.now_ms() + STEP_MS);
            game.advance(STEP_MS);

            for event in game.drain_events() {
                match event {
                    GameEvent::JumpEnded => course.jump_started_ms.set(None),
                    GameEvent::GameOver { score, new_record } => {
                        log::info!("Run over: score {} (new record: {})", score, new_record);
                    }
                    _ => {}
                }
                hud.apply(&event);
            }
        }
    }

    pub fn run() {
        let config = GameConfig::default();
        let course = Course {
            jump_duration_ms: config.jump_duration_ms,
            ..Default::default()
        };
        let audio = AudioController::new(MemorySound::default(), MemorySound::default());

        let mut hud = Hud::default();
        let mut game = Game::new(config, course, MemoryStore::new(), audio);
        game.start();
        hud.apply_all(&game.drain_events());

        play(&mut game, &mut hud);
        println!("Run 1: score {} / {}", hud.score_text, hud.high_score_text);

        let mut game = game.restart();
        hud.apply_all(&game.drain_events());
        play(&mut game, &mut hud);
        println!("Run 2: score {} / {}", hud.score_text, hud.high_score_text);
    }
}
