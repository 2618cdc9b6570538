//! The game screen: owns the engine, relays its events to the coordinator,
//! runs the pre-game countdown and exposes what the host overlays.

use std::cell::RefCell;
use std::mem;
use std::rc::{Rc, Weak};

use mari_engine::{
    EngineConfig, EngineEvent, EngineStatus, EntityStore, GameEngine, HostFrames, InputEvent,
    System, Timer, Visual,
};
use serde::Serialize;

use crate::config::ArenaConfig;
use crate::error::ScreenError;
use crate::level;
use crate::physics::PhysicsSystem;
use crate::protocol::{Inbound, Outbound};
use crate::rng::Rng;

pub const DEFAULT_TOAST: &str = "Something went wrong";

/// Who we play against.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// No coordinator; the host's start button begins the countdown.
    Solo,
    Multiplayer { user_id: String, game_type_id: String },
}

/// The coordinator's game this client was placed in.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub game_id: String,
    pub is_started: bool,
    pub users: Vec<String>,
}

/// Final result, with the balance delta the host settles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum Outcome {
    Won { amount: f64 },
    Lost { amount: f64 },
}

/// Everything the host draws around the playfield.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub running: bool,
    pub game_over: bool,
    /// Whole seconds left before the game starts.
    pub countdown: Option<u32>,
    /// Multiplayer lobby not full yet.
    pub waiting_for_players: bool,
    pub score: u32,
    pub players: usize,
    pub outcome: Option<Outcome>,
    /// The coordinator asked for a reload.
    pub reload: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Countdown {
    /// Timestamp of the first frame after the start request.
    started_at: Option<f64>,
}

#[derive(Debug, Default)]
struct ScreenState {
    session: Option<GameSession>,
    countdown: Option<Countdown>,
    last_frame: Option<f64>,
    game_over: bool,
    outcome: Option<Outcome>,
    outbound: Vec<Outbound>,
    toasts: Vec<String>,
    reload: bool,
}

impl ScreenState {
    /// Queue a report for the coordinator about the current session.
    fn report(
        &mut self,
        mode: &Mode,
        message: impl FnOnce(String, String) -> Outbound,
    ) -> Result<(), ScreenError> {
        let Mode::Multiplayer { user_id, .. } = mode else {
            return Err(ScreenError::SoloMode);
        };
        let session = self.session.as_ref().ok_or(ScreenError::NoSession)?;
        self.outbound
            .push(message(session.game_id.clone(), user_id.clone()));
        Ok(())
    }
}

/// Engine events reaching the screen.
fn on_event(event: &EngineEvent, mode: &Mode, state: &RefCell<ScreenState>, engine: &Weak<GameEngine>) {
    let reported = match event {
        EngineEvent::GameOver => {
            if let Some(engine) = engine.upgrade() {
                engine.stop();
            }
            let mut s = state.borrow_mut();
            s.game_over = true;
            s.report(mode, |game_id, user_id| Outbound::GameOver { game_id, user_id })
        }
        EngineEvent::Score { .. } => state
            .borrow_mut()
            .report(mode, |game_id, user_id| Outbound::UpdateBoard { game_id, user_id }),
        other => {
            log::debug!("screen: engine {}", other.kind());
            Ok(())
        }
    };
    if let Err(e) = reported {
        log::debug!("screen: not reporting {}: {}", event.kind(), e);
    }
}

pub struct ArenaScreen {
    config: ArenaConfig,
    mode: Mode,
    engine: Rc<GameEngine>,
    timer: Timer,
    frames: HostFrames,
    rng: Rng,
    /// The store swapped in when the countdown ends.
    live: EntityStore,
    state: Rc<RefCell<ScreenState>>,
}

impl ArenaScreen {
    /// Build the level and show the waiting room. In multiplayer mode this
    /// also queues the request to be placed in a game.
    pub fn new(config: ArenaConfig, engine_config: EngineConfig, mode: Mode) -> Self {
        let engine_config = EngineConfig {
            viewport: config.viewport,
            running: false,
            ..engine_config
        };
        let (timer, frames) = Timer::host_driven();
        let systems: Vec<Box<dyn System>> = vec![Box::new(PhysicsSystem::new(config.clone()))];
        let engine = Rc::new(GameEngine::new(engine_config, systems, timer.clone()));

        let state = Rc::new(RefCell::new(ScreenState::default()));
        {
            let mode = mode.clone();
            let state = state.clone();
            let weak = Rc::downgrade(&engine);
            engine.set_listener(move |event| on_event(event, &mode, &state, &weak));
        }

        let mut rng = Rng::new(config.seed);
        let live = engine.physics(|world| level::build(&config, world, &mut rng));
        engine.load(level::waiting_room(&live));

        if let Mode::Multiplayer {
            user_id,
            game_type_id,
        } = &mode
        {
            state.borrow_mut().outbound.push(Outbound::JoinRandomGame {
                user_id: user_id.clone(),
                game_type_id: game_type_id.clone(),
            });
        }
        log::info!("screen: ready ({:?})", mode);

        Self {
            config,
            mode,
            engine,
            timer,
            frames,
            rng,
            live,
            state,
        }
    }

    /// Decode and apply one coordinator message.
    pub fn handle_message(&mut self, json: &str) -> Result<(), ScreenError> {
        if self.mode == Mode::Solo {
            return Err(ScreenError::SoloMode);
        }
        let message = Inbound::parse(json).inspect_err(|e| log::warn!("screen: {}", e))?;
        self.handle(message);
        Ok(())
    }

    pub fn handle(&mut self, message: Inbound) {
        log::debug!("screen: coordinator {:?}", message);
        match message {
            Inbound::JoinGame { game_id, users } => {
                self.state.borrow_mut().session = Some(GameSession {
                    game_id,
                    is_started: false,
                    users,
                });
            }
            Inbound::NewUser { game_id, user_id } => {
                let mut s = self.state.borrow_mut();
                let mut users = s.session.take().map(|g| g.users).unwrap_or_default();
                users.push(user_id);
                s.session = Some(GameSession {
                    game_id,
                    is_started: false,
                    users,
                });
            }
            Inbound::StartGame => self.begin(),
            Inbound::Winner { amount } => {
                self.state.borrow_mut().outcome = Some(Outcome::Won { amount });
            }
            Inbound::Loser { amount } => {
                self.state.borrow_mut().outcome = Some(Outcome::Lost { amount });
            }
            Inbound::Error { message } => {
                let message = message.unwrap_or_else(|| DEFAULT_TOAST.to_string());
                self.state.borrow_mut().toasts.push(message);
            }
            Inbound::Refresh => self.state.borrow_mut().reload = true,
        }
    }

    /// Start the countdown. After a finished game this lays out a fresh
    /// level first. Ignored while a countdown or a game is running.
    pub fn begin(&mut self) {
        if self.engine.is_running() || self.state.borrow().countdown.is_some() {
            log::debug!("screen: begin ignored");
            return;
        }
        if self.state.borrow().game_over {
            self.reset_level();
        }
        self.state.borrow_mut().countdown = Some(Countdown { started_at: None });
        log::info!("screen: countdown started");
    }

    fn reset_level(&mut self) {
        let config = &self.config;
        let rng = &mut self.rng;
        self.live = self.engine.physics(|world| {
            world.clear();
            level::build(config, world, rng)
        });
        self.engine.swap(level::waiting_room(&self.live));
        let mut s = self.state.borrow_mut();
        s.game_over = false;
        s.outcome = None;
    }

    fn go_live(&mut self) {
        {
            let mut s = self.state.borrow_mut();
            s.countdown = None;
            if let Some(session) = s.session.as_mut() {
                session.is_started = true;
            }
        }
        self.engine.swap(mem::take(&mut self.live));
        self.engine.start();
        log::info!("screen: game started");
    }

    /// Queue a DOM interaction for the next tick.
    pub fn input(&self, event: InputEvent) {
        self.engine.queue_input(event);
    }

    /// One animation frame at host time `now` (ms). Returns whether the
    /// host should keep its frame loop going.
    pub fn frame(&mut self, now: f64) -> bool {
        let elapsed = {
            let mut s = self.state.borrow_mut();
            s.last_frame = Some(now);
            match s.countdown.as_mut() {
                Some(countdown) => {
                    let started_at = *countdown.started_at.get_or_insert(now);
                    Some(now - started_at)
                }
                None => None,
            }
        };
        if elapsed.is_some_and(|ms| ms >= self.config.countdown_secs * 1000.0) {
            self.go_live();
        }

        self.timer.frame(now);
        self.engine.flush_events();
        self.wants_frame()
    }

    pub fn wants_frame(&self) -> bool {
        self.frames.wants_frame() || self.state.borrow().countdown.is_some()
    }

    pub fn render(&self) -> Vec<Visual> {
        self.engine.render(&self.config.viewport)
    }

    pub fn overlay(&self) -> Overlay {
        let s = self.state.borrow();
        let running = self.engine.status() == EngineStatus::Running;
        let countdown = s.countdown.map(|c| {
            let elapsed = match (c.started_at, s.last_frame) {
                (Some(start), Some(now)) => (now - start) / 1000.0,
                _ => 0.0,
            };
            (self.config.countdown_secs - elapsed).ceil().max(0.0) as u32
        });
        let score = self
            .engine
            .entities(|e| e.get(level::SCORE).and_then(|c| c.counter()))
            .unwrap_or(0);
        Overlay {
            running,
            game_over: s.game_over,
            countdown,
            waiting_for_players: matches!(self.mode, Mode::Multiplayer { .. })
                && !running
                && !s.game_over
                && s.countdown.is_none(),
            score,
            players: s.session.as_ref().map_or(0, |g| g.users.len()),
            outcome: s.outcome,
            reload: s.reload,
        }
    }

    /// Messages for the coordinator, oldest first.
    pub fn take_outbound(&self) -> Vec<Outbound> {
        mem::take(&mut self.state.borrow_mut().outbound)
    }

    pub fn take_toasts(&self) -> Vec<String> {
        mem::take(&mut self.state.borrow_mut().toasts)
    }

    pub fn take_focus_request(&self) -> bool {
        self.engine.take_focus_request()
    }

    pub fn session(&self) -> Option<GameSession> {
        self.state.borrow().session.clone()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }
}
