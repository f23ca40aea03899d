//! Roadwise entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, KeyboardEvent, Window};

    use roadwise::audio::Horn;
    use roadwise::quiz::{self, Question};
    use roadwise::renderer::CanvasSurface;
    use roadwise::sim::{Command, GameEvent, Key};
    use roadwise::{GameDriver, Settings};

    /// Game instance holding all browser-side state
    struct Game {
        driver: GameDriver,
        surface: CanvasSurface,
        horn: Horn,
        settings: Settings,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(driver: GameDriver, surface: CanvasSurface, settings: Settings) -> Self {
            Self {
                driver,
                surface,
                horn: Horn::new(settings.effective_horn_volume()),
                settings,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Step, paint and react to whatever happened
        fn update(&mut self, time: f64) {
            let events = self.driver.frame(time, &mut self.surface);
            for event in &events {
                self.handle_event(event);
            }

            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 && time > oldest_time {
                self.fps = (60000.0 / (time - oldest_time)).round() as u32;
            }
        }

        fn handle_event(&mut self, event: &GameEvent) {
            let Some(document) = document() else { return };
            match event {
                GameEvent::HornChanged(on) => self.horn.set_on(*on),
                GameEvent::QuestionDue { .. } => {
                    if let Some(question) = self.driver.session().active_question() {
                        show_question(&document, question);
                    }
                }
                GameEvent::AnswerResolved(result) => {
                    set_visible(&document, "question-panel", false);
                    if let Some(el) = document.get_element_by_id("answer-flash") {
                        let class = if result.correct { "correct" } else { "wrong" };
                        let _ = el.set_attribute("class", class);
                    }
                }
                GameEvent::GameOver { score } => {
                    self.horn.stop();
                    set_text(&document, "final-score", &score.to_string());
                    set_visible(&document, "game-over", true);
                }
                GameEvent::Restarted => {
                    set_visible(&document, "game-over", false);
                    set_visible(&document, "question-panel", false);
                    set_visible(&document, "pause-menu", false);
                }
                GameEvent::PauseChanged(paused) => {
                    if *paused {
                        self.horn.stop();
                    }
                    set_visible(&document, "pause-menu", *paused);
                }
                GameEvent::SignArmed { .. }
                | GameEvent::QuestionsExhausted
                | GameEvent::HeadlightsChanged(_) => {}
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = document() else { return };
            let session = self.driver.session();

            set_text(&document, "hud-score", &session.stats.score.to_string());
            set_text(&document, "hud-lives", &session.stats.lives.to_string());
            set_text(
                &document,
                "hud-speed",
                &format!("{:.0}", session.road.speed * 10.0),
            );
            if let Some(secs) = session.remaining_secs() {
                set_text(&document, "question-timer", &secs.to_string());
            }
            if self.settings.show_fps {
                set_text(&document, "hud-fps", &self.fps.to_string());
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    /// Fill the question panel with the prompt and one button per option
    fn show_question(document: &Document, question: &Question) {
        set_text(document, "question-prompt", &question.prompt);
        if let Some(list) = document.get_element_by_id("question-options") {
            list.set_inner_html("");
            for option in &question.options {
                let Ok(button) = document.create_element("button") else {
                    continue;
                };
                button.set_text_content(Some(&option.label));
                let _ = button.set_attribute("data-seq", &option.sequence.to_string());
                let _ = button.set_attribute("title", &option.tooltip);
                let _ = list.append_child(&button);
            }
        }
        set_visible(document, "question-panel", true);
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Roadwise starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let settings = Settings::load();
        let questions = match quiz::fetch_questions(&settings.question_url).await {
            Ok(questions) => questions,
            Err(e) => {
                log::error!("Could not load questions: {}", e);
                set_text(&document, "loading", "Could not load questions");
                return Err(JsValue::from_str(&e.to_string()));
            }
        };
        log::info!("Loaded {} questions", questions.len());

        set_visible(&document, "loading", false);
        if settings.muted {
            set_text(&document, "mute-btn", "Unmute");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        fit_canvas(&window, &canvas);
        setup_resize(&window, canvas.clone())?;

        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let driver = GameDriver::new(questions, &settings, seed)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let surface = CanvasSurface::new(canvas)?;
        let game = Rc::new(RefCell::new(Game::new(driver, surface, settings)));

        log::info!("Game initialized with seed: {}", seed);

        setup_keyboard(game.clone())?;
        setup_touch_controls(&document, game.clone());
        setup_answer_buttons(&document, game.clone());
        setup_menu_buttons(&document, game.clone());
        setup_auto_pause(game.clone())?;

        set_visible(&document, "hud", true);

        request_animation_frame(game);

        log::info!("Roadwise running!");
        Ok(())
    }

    fn send(game: &Rc<RefCell<Game>>, command: Command) {
        game.borrow_mut().driver.send(command);
    }

    fn arrow_key(key: &str) -> Option<Key> {
        match key {
            "ArrowUp" => Some(Key::Up),
            "ArrowDown" => Some(Key::Down),
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            _ => None,
        }
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                if let Some(arrow) = arrow_key(&key) {
                    event.prevent_default();
                    send(&game, Command::Press(arrow));
                    return;
                }
                if event.repeat() {
                    return;
                }
                match key.as_str() {
                    "h" | "H" => send(&game, Command::HornOn),
                    "l" | "L" => send(&game, Command::ToggleHeadlight),
                    "m" | "M" => toggle_mute(&game),
                    "Escape" | "p" | "P" => send(&game, Command::TogglePause),
                    digit => {
                        if let Ok(sequence) = digit.parse::<u32>() {
                            send(&game, Command::SelectOption(sequence));
                        }
                    }
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                if let Some(arrow) = arrow_key(&key) {
                    send(&game, Command::Release(arrow));
                } else if key == "h" || key == "H" {
                    send(&game, Command::HornOff);
                }
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    /// On-screen buttons: held while pressed
    fn setup_touch_controls(document: &Document, game: Rc<RefCell<Game>>) {
        let controls: [(&str, Command, Command); 5] = [
            ("btn-up", Command::Press(Key::Up), Command::Release(Key::Up)),
            ("btn-down", Command::Press(Key::Down), Command::Release(Key::Down)),
            ("btn-left", Command::Press(Key::Left), Command::Release(Key::Left)),
            ("btn-right", Command::Press(Key::Right), Command::Release(Key::Right)),
            ("btn-horn", Command::HornOn, Command::HornOff),
        ];

        for (id, press, release) in controls {
            let Some(btn) = document.get_element_by_id(id) else {
                log::warn!("Control button #{} missing", id);
                continue;
            };
            for name in ["mousedown", "touchstart"] {
                listen(&btn, name, game.clone(), press);
            }
            for name in ["mouseup", "mouseleave", "touchend", "touchcancel"] {
                listen(&btn, name, game.clone(), release);
            }
        }

        if let Some(btn) = document.get_element_by_id("btn-light") {
            listen(&btn, "click", game, Command::ToggleHeadlight);
        }
    }

    fn listen(target: &Element, name: &str, game: Rc<RefCell<Game>>, command: Command) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            event.prevent_default();
            send(&game, command);
        });
        let _ = target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// One delegated listener for every answer button
    fn setup_answer_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(list) = document.get_element_by_id("question-options") else {
            log::warn!("Question panel missing; answers only via number keys");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
            let sequence = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.get_attribute("data-seq"))
                .and_then(|seq| seq.parse::<u32>().ok());
            if let Some(sequence) = sequence {
                send(&game, Command::SelectOption(sequence));
            }
        });
        let _ = list.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_menu_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            listen(&btn, "click", game.clone(), Command::Restart);
        }
        if let Some(btn) = document.get_element_by_id("resume-btn") {
            listen(&btn, "click", game.clone(), Command::TogglePause);
        }
        if let Some(btn) = document.get_element_by_id("mute-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                toggle_mute(&game);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Flip mute, apply it to the horn and remember it
    fn toggle_mute(game: &Rc<RefCell<Game>>) {
        let mut g = game.borrow_mut();
        let g = &mut *g;
        let muted = g.settings.toggle_mute();
        g.horn.set_volume(g.settings.effective_horn_volume());
        g.settings.save();
        if let Some(document) = document() {
            set_text(&document, "mute-btn", if muted { "Unmute" } else { "Mute" });
        }
        log::info!("Horn {}", if muted { "muted" } else { "unmuted" });
    }

    /// Size the backing store to the displayed size at device resolution.
    /// The surface rescales the view from the canvas size every frame.
    fn fit_canvas(window: &Window, canvas: &HtmlCanvasElement) {
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        if canvas.width() != width || canvas.height() != height {
            canvas.set_width(width);
            canvas.set_height(height);
            log::debug!("Canvas resized to {}x{}", width, height);
        }
    }

    fn setup_resize(window: &Window, canvas: HtmlCanvasElement) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Some(window) = web_sys::window() {
                fit_canvas(&window, &canvas);
            }
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// Key-ups are lost while unfocused, so held input is dropped here too
    fn auto_pause(game: &Rc<RefCell<Game>>, reason: &str) {
        let mut g = game.borrow_mut();
        // Animation frames stop while hidden; silence the horn right away
        g.horn.set_on(false);
        if g.driver.auto_pause() {
            log::info!("Auto-paused ({})", reason);
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    auto_pause(&game, "tab hidden");
                } else {
                    // Do not replay the time spent hidden
                    game.borrow_mut().driver.resume_clock();
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                auto_pause(&game, "window blur");
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Roadwise failed to start: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), roadwise::quiz::QuizError> {
    env_logger::init();
    log::info!("Roadwise (native) starting...");
    log::info!("The browser build is the real game - run with `trunk serve`");

    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted drive through the bundled questions without a browser
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use roadwise::consts::SIM_DT_MS;
    use roadwise::quiz::{QuizError, parse_questions};
    use roadwise::renderer::DrawList;
    use roadwise::sim::{Command, GameEvent, Key};
    use roadwise::{GameDriver, Settings, assets};

    const SAMPLE_QUESTIONS: &str = include_str!("../data/sample_questions.json");
    /// Give up after ten simulated minutes
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    pub fn run() -> Result<(), QuizError> {
        let questions = parse_questions(SAMPLE_QUESTIONS)?;
        let settings = Settings::load();
        let seed = settings.seed.unwrap_or(2024);
        let mut driver = GameDriver::new(questions, &settings, seed)?;
        let mut surface = DrawList::with_images(assets::all());

        driver.send(Command::Press(Key::Up));

        let mut answered = 0u32;
        for frame in 0..MAX_FRAMES {
            let events = driver.frame(frame as f64 * SIM_DT_MS, &mut surface);
            for event in events {
                log::info!("t={:>6} {:?}", driver.session().time_ticks, event);
                match event {
                    GameEvent::QuestionDue { .. } => {
                        // Alternate between answering right and letting it time out
                        let correct = driver
                            .session()
                            .active_question()
                            .map(|q| q.correct_sequence);
                        if let (Some(sequence), true) = (correct, answered % 2 == 0) {
                            driver.send(Command::SelectOption(sequence));
                        }
                        answered += 1;
                    }
                    GameEvent::GameOver { score } => {
                        println!(
                            "Game over after {} questions: score {}, {} draw calls in last frame",
                            answered,
                            score,
                            surface.commands.len()
                        );
                        return Ok(());
                    }
                    _ => {}
                }
            }
        }

        let stats = driver.session().stats;
        println!(
            "Stopped after {} frames: score {}, lives {}",
            MAX_FRAMES, stats.score, stats.lives
        );
        Ok(())
    }
}
