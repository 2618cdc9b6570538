//! The arena's physics system: flaps, pipe scrolling and recycling, scoring,
//! the boundary rule, and stepping the simulation.

use glam::Vec2;
use mari_engine::{
    CollisionPair, EngineEvent, Entity, EntityStore, FixedTimestep, InputEvent, InputKind,
    PhysicsWorld, System, TickContext,
};

use crate::config::ArenaConfig;
use crate::level::SCORE;

pub struct PhysicsSystem {
    config: ArenaConfig,
    stepper: FixedTimestep,
    collisions: Vec<CollisionPair>,
}

impl PhysicsSystem {
    pub fn new(config: ArenaConfig) -> Self {
        let stepper = FixedTimestep::new(config.fixed_dt);
        Self {
            config,
            stepper,
            collisions: Vec::new(),
        }
    }

    /// `onClick`, or `onKeyPress` with one of the flap keys.
    pub fn is_flap(&self, event: &InputEvent) -> bool {
        match event.kind {
            InputKind::Click => true,
            InputKind::KeyPress => event
                .key_code()
                .is_some_and(|code| self.config.is_flap_key(code)),
            _ => false,
        }
    }

    fn flap(&self, player: &mut Entity, physics: &mut PhysicsWorld) {
        player.set_airborne(true);
        let Some(body) = player.body else {
            return;
        };
        let mass = physics.mass(&body);
        if mass > 0.0 {
            physics.apply_impulse(&body, Vec2::new(0.0, -self.config.flap_impulse * mass));
        } else {
            let vel = physics.velocity(&body);
            physics.set_velocity(&body, Vec2::new(vel.x, vel.y - self.config.flap_impulse));
        }
    }

    /// Scroll every slot left by the speed snapshot, recycling pairs that
    /// left the screen behind the slot before them.
    fn scroll(&self, entities: &mut EntityStore, ctx: &mut TickContext<'_>) {
        let speed = ctx.speed;
        let slots = entities.obstacles_mut();
        let count = slots.len();
        for i in 0..count {
            for entity in slots[i].iter_mut() {
                shift(entity, -speed, ctx.physics);
            }
            if slots[i].top.pos.x < -self.config.pipe_width {
                ctx.increase_speed();
                let previous = if i == 0 { count - 1 } else { i - 1 };
                let x = slots[previous].top.pos.x + self.config.pipe_spacing;
                let pair = &mut slots[i];
                for entity in pair.iter_mut() {
                    place(entity, x, ctx.physics);
                }
                pair.passed = false;
                log::debug!("physics: recycled slot {} to x={:.1}", i + 1, x);
            }
        }
    }

    /// Mark pairs whose trailing edge is behind the player and bump the score.
    fn score(&self, entities: &mut EntityStore, player_left: f32, ctx: &mut TickContext<'_>) {
        let mut newly_passed = 0;
        for pair in entities.obstacles_mut() {
            if !pair.passed && pair.top.right() < player_left {
                pair.passed = true;
                newly_passed += 1;
            }
        }
        for _ in 0..newly_passed {
            let points = entities
                .get_mut(SCORE)
                .and_then(|counter| counter.increment());
            if let Some(points) = points {
                ctx.dispatch(EngineEvent::Score { points });
            }
        }
    }

    fn out_of_bounds(&self, player: &Entity) -> bool {
        let bottom = player.pos.y + player.size.y / 2.0;
        player.pos.y < self.config.ceiling_y
            || bottom > self.config.floor_top()
            || player.pos.x < 0.0
            || player.pos.x > self.config.viewport.width
    }

    fn step(&mut self, ctx: &mut TickContext<'_>) {
        ctx.physics.set_dt(self.stepper.dt());
        let steps = self.stepper.accumulate(ctx.time.delta_secs());
        for _ in 0..steps {
            ctx.physics.step_into(&mut self.collisions);
        }
    }
}

impl System for PhysicsSystem {
    fn run(&mut self, mut entities: EntityStore, ctx: &mut TickContext<'_>) -> EntityStore {
        // First tick after a start or swap.
        if ctx.time.previous.is_none() {
            self.stepper.reset();
        }

        let Some(player) = entities.player_mut() else {
            log::warn!("physics: no player in the store, skipping tick");
            return entities;
        };
        if !player.is_alive() {
            return entities;
        }

        player.set_airborne(false);
        let flaps = ctx.input.iter().filter(|e| self.is_flap(e)).count();
        for _ in 0..flaps {
            self.flap(player, ctx.physics);
        }
        if let Some(body) = player.body {
            player.pos = ctx.physics.body_position(&body).0;
        }
        let player_id = player.id;
        let player_left = player.left();

        self.scroll(&mut entities, ctx);
        self.score(&mut entities, player_left, ctx);

        let out = entities.player().is_some_and(|p| self.out_of_bounds(p));
        if out {
            log::info!("physics: player left the playfield");
            game_over(&mut entities, ctx);
            return entities;
        }

        self.step(ctx);
        let crashed = self
            .collisions
            .drain(..)
            .any(|c| c.started && c.involves(player_id));
        if crashed {
            log::info!("physics: player collided");
            game_over(&mut entities, ctx);
        }
        entities
    }

    fn name(&self) -> &str {
        "physics"
    }
}

fn game_over(entities: &mut EntityStore, ctx: &mut TickContext<'_>) {
    if let Some(player) = entities.player_mut() {
        player.kill();
    }
    ctx.dispatch(EngineEvent::GameOver);
}

fn shift(entity: &mut Entity, dx: f32, physics: &mut PhysicsWorld) {
    match entity.body {
        Some(body) => {
            physics.translate(&body, Vec2::new(dx, 0.0));
            entity.pos = physics.body_position(&body).0;
        }
        None => entity.pos.x += dx,
    }
}

fn place(entity: &mut Entity, x: f32, physics: &mut PhysicsWorld) {
    let pos = Vec2::new(x, entity.pos.y);
    if let Some(body) = entity.body {
        physics.set_position(&body, pos);
    }
    entity.pos = pos;
}
