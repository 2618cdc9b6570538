//! The game engine orchestrator.
//!
//! Owns the timer subscription, the entity store, the physics world and the
//! system pipeline, and exposes the imperative handle the embedding screen
//! drives: `start`, `stop`, `swap`, `dispatch`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::context::{System, TickContext};
use crate::api::events::EngineEvent;
use crate::api::types::Viewport;
use crate::core::physics::PhysicsWorld;
use crate::core::store::EntityStore;
use crate::core::time::FrameTime;
use crate::core::timer::{FrameCallback, Timer};
use crate::error::EngineError;
use crate::input::queue::{InputEvent, InputQueue};
use crate::renderer::visual::Visual;
use crate::systems::render::render;

/// Engine configuration, provided by the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scroll speed after every reset (default: 2.0).
    pub base_speed: f32,
    /// Added by each `increase_speed()` (default: 0.1).
    pub speed_increment: f32,
    /// Gravity for the physics world. Y-down, so positive Y falls.
    pub gravity: Vec2,
    pub viewport: Viewport,
    /// Start as soon as entities are loaded (default: true).
    pub running: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_speed: 2.0,
            speed_increment: 0.1,
            gravity: Vec2::new(0.0, 1000.0),
            viewport: Viewport::default(),
            running: true,
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Lifecycle of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// No entities yet.
    Uninitialized,
    /// Waiting on an asynchronous initial store.
    Loading,
    Stopped,
    Running,
    /// Waiting on an asynchronous replacement store. The engine keeps its
    /// previous running state meanwhile.
    Swapping,
}

type Listener = Rc<dyn Fn(&EngineEvent)>;

struct EngineState {
    config: EngineConfig,
    timer: Timer,
    systems: Vec<Box<dyn System>>,
    entities: EntityStore,
    physics: PhysicsWorld,
    status: EngineStatus,
    /// Status to restore once an async swap settles.
    resume_status: EngineStatus,
    input: InputQueue,
    /// Delivered events not yet seen by a tick.
    events: Vec<EngineEvent>,
    /// Dispatched events not yet delivered.
    outbox: VecDeque<EngineEvent>,
    speed: f32,
    previous_time: Option<f64>,
    previous_delta: Option<f64>,
    focus_requested: bool,
    listener: Option<Listener>,
}

impl EngineState {
    /// Reset per-session transients.
    fn clear(&mut self) {
        self.speed = self.config.base_speed;
        self.input.clear();
        self.events.clear();
        self.previous_time = None;
        self.previous_delta = None;
    }

    fn start(&mut self) {
        self.clear();
        self.timer.start();
        self.settle(EngineStatus::Running);
        self.outbox.push_back(EngineEvent::Started);
        self.focus_requested = true;
        log::info!("engine: started");
    }

    /// Returns `false` when already stopped. A pending swap with the timer
    /// halted counts as stopped.
    fn stop(&mut self) -> bool {
        if self.status != EngineStatus::Running && !self.timer.is_running() {
            return false;
        }
        self.timer.stop();
        self.settle(EngineStatus::Stopped);
        self.outbox.push_back(EngineEvent::Stopped);
        log::info!("engine: stopped");
        true
    }

    /// While a swap is pending, the status it settles to is recorded instead.
    fn settle(&mut self, status: EngineStatus) {
        if self.status == EngineStatus::Swapping {
            self.resume_status = status;
        } else {
            self.status = status;
        }
    }

    fn swap(&mut self, entities: EntityStore) {
        self.entities = entities;
        self.clear();
        self.outbox.push_back(EngineEvent::Swapped);
        log::debug!("engine: swapped in {} entities", self.entities.len());
    }

    fn loaded(&mut self, entities: EntityStore) {
        self.entities = entities;
        self.status = EngineStatus::Stopped;
        log::debug!("engine: loaded {} entities", self.entities.len());
        if self.config.running {
            self.start();
        }
    }

    /// One tick: fold the pipeline over the store, then reset the buffers.
    fn update(&mut self, now: f64) {
        let input = self.input.drain();
        let events = std::mem::take(&mut self.events);
        let time = FrameTime::new(now, self.previous_time, self.previous_delta);
        let mut entities = std::mem::take(&mut self.entities);

        let stop_requested = {
            let mut ctx = TickContext::new(
                &input,
                &events,
                time,
                self.config.viewport,
                &mut self.physics,
                &mut self.speed,
                self.config.speed_increment,
                &mut self.outbox,
            );
            for system in self.systems.iter_mut() {
                entities = system.run(entities, &mut ctx);
            }
            ctx.stop_requested()
        };

        entities.sync_from(&self.physics);
        entities.bump_revision();
        self.entities = entities;
        self.previous_time = Some(now);
        self.previous_delta = Some(time.delta);
        log::trace!(
            "engine: tick at {:.1} (delta {:.1}, {} inputs, {} events)",
            now,
            time.delta,
            input.len(),
            events.len()
        );

        if stop_requested {
            self.stop();
        }
    }
}

/// Deliver queued events one at a time with no borrow held, so a listener
/// may call back into the engine. Order is FIFO even across nested flushes.
fn deliver(state: &Rc<RefCell<EngineState>>) {
    loop {
        let (event, listener) = {
            let mut s = state.borrow_mut();
            let Some(event) = s.outbox.pop_front() else {
                break;
            };
            s.events.push(event.clone());
            (event, s.listener.clone())
        };
        log::debug!("engine: event {}", event.kind());
        if let Some(listener) = listener {
            listener(&event);
        }
    }
}

/// The orchestrator handle.
///
/// Dropping it stops the timer and unsubscribes from it.
pub struct GameEngine {
    state: Rc<RefCell<EngineState>>,
    handler: FrameCallback,
}

impl GameEngine {
    /// Build an engine over an ordered system pipeline. The engine subscribes
    /// itself to `timer` and stays `Uninitialized` until a store is loaded.
    pub fn new(config: EngineConfig, systems: Vec<Box<dyn System>>, timer: Timer) -> Self {
        let physics = PhysicsWorld::new(config.gravity);
        let state = Rc::new(RefCell::new(EngineState {
            speed: config.base_speed,
            config,
            timer: timer.clone(),
            systems,
            entities: EntityStore::new(),
            physics,
            status: EngineStatus::Uninitialized,
            resume_status: EngineStatus::Uninitialized,
            input: InputQueue::new(),
            events: Vec::new(),
            outbox: VecDeque::new(),
            previous_time: None,
            previous_delta: None,
            focus_requested: false,
            listener: None,
        }));

        let weak = Rc::downgrade(&state);
        let handler: FrameCallback = Rc::new(move |now| {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().update(now);
                deliver(&state);
            }
        });
        timer.subscribe(handler.clone());

        Self { state, handler }
    }

    /// Set the `on_event` listener.
    pub fn with_listener(self, listener: impl Fn(&EngineEvent) + 'static) -> Self {
        self.set_listener(listener);
        self
    }

    pub fn set_listener(&self, listener: impl Fn(&EngineEvent) + 'static) {
        self.state.borrow_mut().listener = Some(Rc::new(listener));
    }

    /// Install the initial store. Starts right away when `config.running`.
    pub fn load(&self, entities: EntityStore) {
        self.state.borrow_mut().loaded(entities);
    }

    /// Install an initial store that resolves later. A failed future leaves
    /// the engine uninitialized and hands the error back.
    pub async fn load_with<F, E>(&self, entities: F) -> Result<(), E>
    where
        F: Future<Output = Result<EntityStore, E>>,
        E: From<EngineError>,
    {
        {
            let mut s = self.state.borrow_mut();
            if s.status == EngineStatus::Loading {
                return Err(EngineError::LoadInProgress.into());
            }
            s.status = EngineStatus::Loading;
        }
        match entities.await {
            Ok(entities) => {
                self.load(entities);
                Ok(())
            }
            Err(e) => {
                self.state.borrow_mut().status = EngineStatus::Uninitialized;
                Err(e)
            }
        }
    }

    /// Reset transients, start the timer, dispatch `started`.
    /// Starting twice never schedules two frame chains.
    pub fn start(&self) {
        self.state.borrow_mut().start();
    }

    /// Halt the timer and dispatch `stopped`. Entities are kept so the last
    /// frame stays visible. No-op when already stopped.
    pub fn stop(&self) {
        self.state.borrow_mut().stop();
    }

    /// Replace the store wholesale, reset transients, dispatch `swapped`.
    pub fn swap(&self, entities: EntityStore) {
        let mut s = self.state.borrow_mut();
        if matches!(s.status, EngineStatus::Uninitialized | EngineStatus::Loading) {
            s.status = EngineStatus::Stopped;
        }
        s.swap(entities);
    }

    /// Swap in a store that resolves later. Errors propagate to the caller
    /// and leave the current store in place.
    pub async fn swap_with<F, E>(&self, entities: F) -> Result<(), E>
    where
        F: Future<Output = Result<EntityStore, E>>,
        E: From<EngineError>,
    {
        {
            let mut s = self.state.borrow_mut();
            if s.status == EngineStatus::Swapping {
                return Err(EngineError::SwapInProgress.into());
            }
            s.resume_status = match s.status {
                EngineStatus::Uninitialized | EngineStatus::Loading => EngineStatus::Stopped,
                other => other,
            };
            s.status = EngineStatus::Swapping;
        }
        let result = entities.await;

        let mut s = self.state.borrow_mut();
        s.status = s.resume_status;
        match result {
            Ok(entities) => {
                s.swap(entities);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Queue an event. Delivered after the next tick's fold, or on `flush_events`.
    pub fn dispatch(&self, event: EngineEvent) {
        self.state.borrow_mut().outbox.push_back(event);
    }

    /// Deliver queued events now. Hosts call this once control returns to
    /// their event loop, so lifecycle events reach the listener even while
    /// no frames are ticking.
    pub fn flush_events(&self) {
        deliver(&self.state);
    }

    /// Queue a captured interaction for the next tick.
    pub fn queue_input(&self, event: InputEvent) {
        self.state.borrow_mut().input.push(event);
    }

    /// Build the visual tree of the current store.
    pub fn render(&self, viewport: &Viewport) -> Vec<Visual> {
        render(&self.state.borrow().entities, viewport)
    }

    /// Read the current store. Must not call back into the engine.
    pub fn entities<R>(&self, f: impl FnOnce(&EntityStore) -> R) -> R {
        f(&self.state.borrow().entities)
    }

    /// Mutate the physics world, e.g. to create bodies before a swap.
    /// Must not call back into the engine.
    pub fn physics<R>(&self, f: impl FnOnce(&mut PhysicsWorld) -> R) -> R {
        f(&mut self.state.borrow_mut().physics)
    }

    pub fn timer(&self) -> Timer {
        self.state.borrow().timer.clone()
    }

    pub fn status(&self) -> EngineStatus {
        self.state.borrow().status
    }

    pub fn is_running(&self) -> bool {
        self.status() == EngineStatus::Running
    }

    pub fn speed(&self) -> f32 {
        self.state.borrow().speed
    }

    pub fn config(&self) -> EngineConfig {
        self.state.borrow().config.clone()
    }

    /// Inputs waiting for the next tick.
    pub fn pending_input(&self) -> usize {
        self.state.borrow().input.len()
    }

    /// Delivered events the next tick will see.
    pub fn buffered_events(&self) -> Vec<EngineEvent> {
        self.state.borrow().events.clone()
    }

    /// Dispatched events not yet delivered.
    /// `true` once after each `start()`: the host should focus the container.
    pub fn take_focus_request(&self) -> bool {
        std::mem::take(&mut self.state.borrow_mut().focus_requested)
    }
}

impl Drop for GameEngine {
    fn drop(&mut self) {
        if let Ok(s) = self.state.try_borrow() {
            s.timer.stop();
            s.timer.unsubscribe(&self.handler);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::context::system;
    use crate::api::types::EntityId;
    use crate::components::entity::{Entity, EntityKind};
    use crate::core::timer::HostFrames;
    use crate::input::queue::InputKind;
    use std::cell::Cell;
    use std::pin::pin;
    use std::task::{Context, Poll, Waker};

    fn counter_store() -> EntityStore {
        EntityStore::new().with(
            "counter",
            Entity::new(EntityId(1)).with_kind(EntityKind::Counter { value: 0 }),
        )
    }

    fn increment_counter() -> Box<dyn System> {
        system(|mut entities, _ctx| {
            if let Some(counter) = entities.get_mut("counter") {
                counter.increment();
            }
            entities
        })
    }

    fn counter_value(engine: &GameEngine) -> u32 {
        engine.entities(|e| e.get("counter").and_then(|c| c.counter()).unwrap_or(0))
    }

    fn stopped_config() -> EngineConfig {
        EngineConfig {
            running: false,
            ..EngineConfig::default()
        }
    }

    fn recording_engine(
        config: EngineConfig,
        systems: Vec<Box<dyn System>>,
    ) -> (GameEngine, Timer, HostFrames, Rc<RefCell<Vec<EngineEvent>>>) {
        let (timer, frames) = Timer::host_driven();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let engine = GameEngine::new(config, systems, timer.clone())
            .with_listener(move |e| sink.borrow_mut().push(e.clone()));
        (engine, timer, frames, seen)
    }

    fn poll_ready<F: Future>(fut: F) -> F::Output {
        let mut fut = pin!(fut);
        let mut cx = Context::from_waker(Waker::noop());
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(out) => out,
            Poll::Pending => panic!("future should be ready"),
        }
    }

    #[test]
    fn counter_runs_only_while_started() {
        let (engine, timer, _frames, _seen) =
            recording_engine(stopped_config(), vec![increment_counter()]);
        engine.load(counter_store());
        engine.start();

        for i in 1..=5 {
            timer.frame(i as f64 * 16.0);
        }
        assert_eq!(counter_value(&engine), 5);

        engine.stop();
        for i in 6..=10 {
            timer.frame(i as f64 * 16.0);
        }
        assert_eq!(counter_value(&engine), 5);
    }

    #[test]
    fn load_starts_when_running_flag_set() {
        let (engine, timer, _frames, _seen) =
            recording_engine(EngineConfig::default(), vec![increment_counter()]);
        assert_eq!(engine.status(), EngineStatus::Uninitialized);
        engine.load(counter_store());
        assert_eq!(engine.status(), EngineStatus::Running);
        timer.frame(16.0);
        assert_eq!(counter_value(&engine), 1);
    }

    #[test]
    fn stop_twice_dispatches_once() {
        let (engine, timer, _frames, seen) = recording_engine(stopped_config(), vec![]);
        engine.load(EntityStore::new());
        engine.start();
        engine.stop();
        engine.stop();
        engine.flush_events();

        let stopped = seen
            .borrow()
            .iter()
            .filter(|e| **e == EngineEvent::Stopped)
            .count();
        assert_eq!(stopped, 1);
        assert!(!timer.is_running());
    }

    #[test]
    fn double_start_keeps_one_schedule() {
        let (engine, timer, frames, _seen) =
            recording_engine(stopped_config(), vec![increment_counter()]);
        engine.load(counter_store());
        engine.start();
        engine.start();
        assert_eq!(frames.outstanding(), 1);

        timer.frame(16.0);
        assert_eq!(counter_value(&engine), 1);
        assert_eq!(frames.outstanding(), 1);
    }

    #[test]
    fn input_is_seen_by_every_system_once() {
        let seen_a = Rc::new(RefCell::new(Vec::new()));
        let seen_b = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = (seen_a.clone(), seen_b.clone());
        let systems = vec![
            system(move |entities, ctx| {
                a.borrow_mut().push(ctx.input.len());
                entities
            }),
            system(move |entities, ctx| {
                b.borrow_mut().push(ctx.input.len());
                entities
            }),
        ];
        let (engine, timer, _frames, _seen) = recording_engine(stopped_config(), systems);
        engine.load(EntityStore::new());
        engine.start();

        engine.queue_input(InputEvent::pointer(InputKind::Click, 1.0, 2.0));
        assert_eq!(engine.pending_input(), 1);
        timer.frame(16.0);
        timer.frame(32.0);

        assert_eq!(*seen_a.borrow(), vec![1, 0]);
        assert_eq!(*seen_b.borrow(), vec![1, 0]);
        assert_eq!(engine.pending_input(), 0);
    }

    #[test]
    fn system_events_visible_for_exactly_one_tick() {
        let ticks = Rc::new(Cell::new(0u32));
        let seen_events = Rc::new(RefCell::new(Vec::new()));
        let (t, s) = (ticks.clone(), seen_events.clone());
        let systems = vec![system(move |entities, ctx| {
            t.set(t.get() + 1);
            s.borrow_mut().push(ctx.events.to_vec());
            if t.get() == 1 {
                ctx.dispatch(EngineEvent::custom("ping"));
            }
            entities
        })];
        let (engine, timer, _frames, seen) = recording_engine(stopped_config(), systems);
        engine.load(EntityStore::new());
        engine.start();
        engine.flush_events();
        assert!(seen.borrow().contains(&EngineEvent::Started));

        timer.frame(16.0);
        // Delivered right after the fold of tick 1.
        assert!(seen.borrow().contains(&EngineEvent::custom("ping")));
        timer.frame(32.0);
        timer.frame(48.0);

        let seen_events = seen_events.borrow();
        assert_eq!(seen_events[0], vec![EngineEvent::Started]);
        assert_eq!(seen_events[1], vec![EngineEvent::custom("ping")]);
        assert!(seen_events[2].is_empty());
    }

    #[test]
    fn swap_resets_transients() {
        let systems = vec![system(|entities, ctx| {
            ctx.increase_speed();
            ctx.dispatch(EngineEvent::custom("tick"));
            entities
        })];
        let (engine, timer, _frames, _seen) = recording_engine(stopped_config(), systems);
        engine.load(EntityStore::new());
        engine.start();
        timer.frame(16.0);
        timer.frame(32.0);
        engine.queue_input(InputEvent::key(InputKind::KeyPress, "KeyW"));
        assert!(engine.speed() > 2.0);
        assert!(!engine.buffered_events().is_empty());

        engine.swap(counter_store());
        assert_eq!(engine.speed(), 2.0);
        assert_eq!(engine.pending_input(), 0);
        assert!(engine.buffered_events().is_empty());
        assert_eq!(counter_value(&engine), 0);
        assert!(engine.entities(|e| e.contains("counter")));
    }

    #[test]
    fn time_delta_is_zero_on_first_tick_after_start() {
        let deltas = Rc::new(RefCell::new(Vec::new()));
        let d = deltas.clone();
        let systems = vec![system(move |entities, ctx| {
            d.borrow_mut().push((ctx.time.delta, ctx.time.previous));
            entities
        })];
        let (engine, timer, _frames, _seen) = recording_engine(stopped_config(), systems);
        engine.load(EntityStore::new());
        engine.start();
        timer.frame(100.0);
        timer.frame(116.0);
        engine.start();
        timer.frame(500.0);

        assert_eq!(
            *deltas.borrow(),
            vec![(0.0, None), (16.0, Some(100.0)), (0.0, None)]
        );
    }

    #[test]
    fn system_stop_request_halts_after_fold() {
        let systems = vec![
            increment_counter(),
            system(|entities, ctx| {
                ctx.stop();
                entities
            }),
        ];
        let (engine, timer, frames, seen) = recording_engine(stopped_config(), systems);
        engine.load(counter_store());
        engine.start();
        timer.frame(16.0);
        timer.frame(32.0);

        assert_eq!(counter_value(&engine), 1);
        assert_eq!(engine.status(), EngineStatus::Stopped);
        assert_eq!(frames.outstanding(), 0);
        assert!(seen.borrow().contains(&EngineEvent::Stopped));
    }

    #[test]
    fn listener_may_call_back_into_engine() {
        let (timer, _frames) = Timer::host_driven();
        let engine = Rc::new(GameEngine::new(stopped_config(), vec![], timer));
        let weak = Rc::downgrade(&engine);
        engine.set_listener(move |e| {
            if *e == EngineEvent::GameOver {
                if let Some(engine) = weak.upgrade() {
                    engine.stop();
                }
            }
        });
        engine.load(EntityStore::new());
        engine.start();
        engine.dispatch(EngineEvent::GameOver);
        engine.flush_events();
        assert_eq!(engine.status(), EngineStatus::Stopped);
    }

    #[test]
    fn revision_bumps_once_per_tick() {
        let (engine, timer, _frames, _seen) = recording_engine(stopped_config(), vec![]);
        engine.load(EntityStore::new());
        engine.start();
        let before = engine.entities(|e| e.revision());
        timer.frame(16.0);
        timer.frame(32.0);
        assert_eq!(engine.entities(|e| e.revision()), before + 2);
    }

    #[test]
    fn start_requests_focus_once() {
        let (engine, _timer, _frames, _seen) = recording_engine(stopped_config(), vec![]);
        engine.load(EntityStore::new());
        assert!(!engine.take_focus_request());
        engine.start();
        assert!(engine.take_focus_request());
        assert!(!engine.take_focus_request());
    }

    #[test]
    fn async_load_and_swap() {
        let (engine, timer, _frames, seen) =
            recording_engine(stopped_config(), vec![increment_counter()]);

        let loaded: Result<(), EngineError> =
            poll_ready(engine.load_with(async { Ok(EntityStore::new()) }));
        assert!(loaded.is_ok());
        assert_eq!(engine.status(), EngineStatus::Stopped);

        engine.start();
        let swapped: Result<(), EngineError> =
            poll_ready(engine.swap_with(async { Ok(counter_store()) }));
        assert!(swapped.is_ok());
        assert_eq!(engine.status(), EngineStatus::Running);
        timer.frame(16.0);
        assert_eq!(counter_value(&engine), 1);
        assert!(seen.borrow().contains(&EngineEvent::Swapped));
    }

    /// Resolves to `store` on the second poll.
    fn ready_after_one_poll(
        store: EntityStore,
    ) -> impl Future<Output = Result<EntityStore, EngineError>> {
        let mut store = Some(store);
        let mut polled = false;
        std::future::poll_fn(move |_| {
            if !polled {
                polled = true;
                return Poll::Pending;
            }
            Poll::Ready(store.take().ok_or(EngineError::SwapInProgress))
        })
    }

    #[test]
    fn start_during_pending_swap_settles_running() {
        let (engine, timer, _frames, _seen) =
            recording_engine(stopped_config(), vec![increment_counter()]);
        engine.load(EntityStore::new());
        assert_eq!(engine.status(), EngineStatus::Stopped);

        let mut swap = pin!(engine.swap_with(ready_after_one_poll(counter_store())));
        let mut cx = Context::from_waker(Waker::noop());
        assert!(swap.as_mut().poll(&mut cx).is_pending());
        assert_eq!(engine.status(), EngineStatus::Swapping);

        engine.start();
        assert_eq!(engine.status(), EngineStatus::Swapping);
        assert!(matches!(swap.as_mut().poll(&mut cx), Poll::Ready(Ok(()))));
        assert_eq!(engine.status(), EngineStatus::Running);
        assert!(timer.is_running());
        timer.frame(16.0);
        assert_eq!(counter_value(&engine), 1);
    }

    #[test]
    fn stop_during_pending_swap_settles_stopped() {
        let (engine, timer, _frames, seen) = recording_engine(stopped_config(), vec![]);
        engine.load(EntityStore::new());
        engine.start();

        let mut swap = pin!(engine.swap_with(ready_after_one_poll(counter_store())));
        let mut cx = Context::from_waker(Waker::noop());
        assert!(swap.as_mut().poll(&mut cx).is_pending());

        engine.stop();
        // Already halted: the second stop is a no-op.
        engine.stop();
        assert!(matches!(swap.as_mut().poll(&mut cx), Poll::Ready(Ok(()))));
        assert_eq!(engine.status(), EngineStatus::Stopped);
        assert!(!timer.is_running());
        engine.flush_events();
        let stops = seen.borrow().iter().filter(|e| **e == EngineEvent::Stopped).count();
        assert_eq!(stops, 1);
    }

    #[test]
    fn failed_async_swap_keeps_store() {
        let (engine, _timer, _frames, _seen) = recording_engine(stopped_config(), vec![]);
        engine.load(counter_store());

        let result: Result<(), EngineError> =
            poll_ready(engine.swap_with(async { Err(EngineError::SwapInProgress) }));
        assert!(result.is_err());
        assert!(engine.entities(|e| e.contains("counter")));
        assert_eq!(engine.status(), EngineStatus::Stopped);
    }

    #[test]
    fn failed_async_load_stays_uninitialized() {
        let (engine, _timer, _frames, _seen) = recording_engine(EngineConfig::default(), vec![]);
        let result: Result<(), EngineError> =
            poll_ready(engine.load_with(async { Err(EngineError::LoadInProgress) }));
        assert!(matches!(result, Err(EngineError::LoadInProgress)));
        assert_eq!(engine.status(), EngineStatus::Uninitialized);
    }

    #[test]
    fn drop_unsubscribes_from_timer() {
        let (timer, _frames) = Timer::host_driven();
        let engine = GameEngine::new(EngineConfig::default(), vec![], timer.clone());
        assert_eq!(timer.subscriber_count(), 1);
        engine.load(EntityStore::new());
        assert!(timer.is_running());
        drop(engine);
        assert_eq!(timer.subscriber_count(), 0);
        assert!(!timer.is_running());
    }

    #[test]
    fn config_from_json_fills_defaults() {
        let config = EngineConfig::from_json(r#"{"base_speed": 3.5, "running": false}"#).unwrap();
        assert_eq!(config.base_speed, 3.5);
        assert!(!config.running);
        assert_eq!(config.speed_increment, 0.1);

        assert!(EngineConfig::from_json("{").is_err());
    }
}
