use std::collections::VecDeque;

use crate::api::events::EngineEvent;
use crate::api::types::Viewport;
use crate::core::physics::PhysicsWorld;
use crate::core::store::EntityStore;
use crate::core::time::FrameTime;
use crate::input::queue::InputEvent;

/// Everything a system sees during one tick.
///
/// Snapshots (`input`, `events`, `time`, `speed`) are identical for every
/// system in the pipeline. The simulation is borrowed for the tick and is the
/// only way systems reach it.
pub struct TickContext<'a> {
    /// Input queued since the previous tick.
    pub input: &'a [InputEvent],
    /// Events delivered since the previous tick.
    pub events: &'a [EngineEvent],
    pub time: FrameTime,
    /// Scroll speed at the start of this tick.
    pub speed: f32,
    pub viewport: Viewport,
    pub physics: &'a mut PhysicsWorld,
    live_speed: &'a mut f32,
    speed_increment: f32,
    outbox: &'a mut VecDeque<EngineEvent>,
    stop_requested: bool,
}

impl<'a> TickContext<'a> {
    /// The engine builds one per tick. Also handy for running a single
    /// system by hand.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        input: &'a [InputEvent],
        events: &'a [EngineEvent],
        time: FrameTime,
        viewport: Viewport,
        physics: &'a mut PhysicsWorld,
        live_speed: &'a mut f32,
        speed_increment: f32,
        outbox: &'a mut VecDeque<EngineEvent>,
    ) -> Self {
        Self {
            input,
            events,
            time,
            speed: *live_speed,
            viewport,
            physics,
            live_speed,
            speed_increment,
            outbox,
            stop_requested: false,
        }
    }

    /// Queue an event for the screen. Delivered after the tick's fold.
    pub fn dispatch(&mut self, event: EngineEvent) {
        self.outbox.push_back(event);
    }

    /// Raise the engine speed by one increment. The `speed` snapshot of the
    /// current tick is unchanged; the next tick sees the new value.
    pub fn increase_speed(&mut self) {
        *self.live_speed += self.speed_increment;
    }

    /// Ask the engine to stop once the fold completes.
    pub fn stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }
}

/// One stage of the tick pipeline: `(entities, ctx) -> entities`.
pub trait System {
    fn run(&mut self, entities: EntityStore, ctx: &mut TickContext<'_>) -> EntityStore;

    /// Name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> System for F
where
    F: FnMut(EntityStore, &mut TickContext<'_>) -> EntityStore,
{
    fn run(&mut self, entities: EntityStore, ctx: &mut TickContext<'_>) -> EntityStore {
        self(entities, ctx)
    }
}

/// Box a closure as a system, pinning down its signature for inference.
pub fn system<F>(f: F) -> Box<dyn System>
where
    F: FnMut(EntityStore, &mut TickContext<'_>) -> EntityStore + 'static,
{
    Box::new(f)
}
