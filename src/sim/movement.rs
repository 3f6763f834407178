//! Per-entity movement and collision resolution
//!
//! One call to `advance` runs a single entity through its tick:
//! 1. recompute the movable mask
//! 2. translate along the active direction
//! 3. scan for the first overlapping entity ahead
//! 4. react according to the mover's kind and the kind of what it hit
//!
//! Reaction table:
//!
//! | mover  | hit                 | reaction                                   |
//! |--------|---------------------|--------------------------------------------|
//! | player | block               | snap flush                                 |
//! | player | collectable         | pickup event (once per collectable)        |
//! | player | portal              | level-complete event                       |
//! | player | anything else       | nothing                                    |
//! | enemy  | player              | player loses 1 health (never below 0)      |
//! | enemy  | anything else       | snap flush, then bounce to a free direction|
//!
//! An enemy with nowhere to go halts, and sets off again on the first tick a
//! direction is free.
//!
//! Every path is total. A kind tag that disagrees with its payload is logged and
//! the entity is skipped for this tick.

use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

use super::arena::EntityArena;
use super::collision::{find_hit, movable_mask, snap_flush};
use super::entity::{Body, Entity, EntityId, EntityKind, Motion};
use super::events::{EventQueue, GameEvent};
use super::rect::Rect;

/// Everything an entity may read or touch while it is being advanced.
/// The entity itself is not in `others`.
pub struct StepContext<'a> {
    pub others: &'a mut EntityArena,
    pub events: &'a mut EventQueue,
    pub rng: &'a mut Pcg32,
    /// Multiplier on `speed` for this tick (1.0 = one fixed step)
    pub step_scale: f64,
}

/// What happened to an entity during `advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Not a mobile kind, nothing to do
    Passive,
    /// Moved (or stood still) without touching anything ahead
    Clear,
    /// Ran into an obstacle and was snapped flush against it
    Snapped(EntityId),
    /// Enemy snapped against an obstacle and picked a new direction
    Bounced(EntityId),
    /// Enemy touched the player
    Damaged(EntityId),
    /// Player touched a collectable or portal and raised an event
    Notified(EntityId),
    /// Player touched something with no reaction
    Ignored(EntityId),
    /// Kind/payload mismatch, the entity was not updated
    Skipped,
}

/// Advance one entity by one tick
pub fn advance(entity: &mut Entity, ctx: &mut StepContext<'_>) -> StepOutcome {
    match entity.kind {
        EntityKind::Player => advance_player(entity, ctx),
        EntityKind::Enemy => advance_enemy(entity, ctx),
        EntityKind::Block | EntityKind::Collectable | EntityKind::Portal | EntityKind::Undefined => {
            StepOutcome::Passive
        }
    }
}

/// Steps 1-3: mask, translate, directional hit scan
fn step(bounds: &mut Rect, motion: &mut Motion, others: &EntityArena, step_scale: f64) -> Option<EntityId> {
    motion.movable = movable_mask(bounds, others.iter());
    if motion.moving {
        let delta = motion.direction.unit() * motion.speed * step_scale;
        bounds.set_position(bounds.position() + delta);
    }
    find_hit(bounds, motion.direction, others.iter())
}

fn advance_player(entity: &mut Entity, ctx: &mut StepContext<'_>) -> StepOutcome {
    let Body::Player { motion, .. } = &mut entity.body else {
        log::error!("entity {:?} tagged Player without a player body", entity.id);
        return StepOutcome::Skipped;
    };
    let Some(hit_id) = step(&mut entity.bounds, motion, ctx.others, ctx.step_scale) else {
        return StepOutcome::Clear;
    };
    let dir = motion.direction;

    let Some(hit) = ctx.others.get_mut(hit_id) else {
        return StepOutcome::Clear;
    };
    match hit.kind {
        EntityKind::Block => {
            snap_flush(&mut entity.bounds, &hit.bounds, dir);
            StepOutcome::Snapped(hit_id)
        }
        EntityKind::Collectable => {
            if let Some(event) = pick_up(hit) {
                ctx.events.send(event);
            }
            StepOutcome::Notified(hit_id)
        }
        EntityKind::Portal => {
            log::debug!("player reached portal {:?}", hit_id);
            ctx.events.send(GameEvent::LevelComplete { id: hit_id });
            StepOutcome::Notified(hit_id)
        }
        EntityKind::Enemy | EntityKind::Player | EntityKind::Undefined => {
            log::trace!("player touched {:?} {:?}, no reaction", hit.kind, hit_id);
            StepOutcome::Ignored(hit_id)
        }
    }
}

/// Mark a collectable as picked up. Returns the event only on the first pickup.
fn pick_up(target: &mut Entity) -> Option<GameEvent> {
    let Body::Collectable(collectable) = &mut target.body else {
        log::error!("entity {:?} tagged Collectable without a collectable body", target.id);
        return None;
    };
    if collectable.picked_up {
        return None;
    }
    collectable.picked_up = true;
    log::info!("collectable {:?} picked up (+{})", target.id, collectable.value);
    Some(GameEvent::PickedUp {
        id: target.id,
        value: collectable.value,
    })
}

fn advance_enemy(entity: &mut Entity, ctx: &mut StepContext<'_>) -> StepOutcome {
    let Body::Enemy { motion } = &mut entity.body else {
        log::error!("entity {:?} tagged Enemy without an enemy body", entity.id);
        return StepOutcome::Skipped;
    };
    let Some(hit_id) = step(&mut entity.bounds, motion, ctx.others, ctx.step_scale) else {
        // A halted enemy sets off again once something frees up
        if !motion.moving && motion.movable.any_free() {
            randomize_direction(motion, ctx.rng);
            log::debug!("enemy {:?} resumes heading {:?}", entity.id, motion.direction);
        }
        return StepOutcome::Clear;
    };
    let dir = motion.direction;

    let Some(hit) = ctx.others.get_mut(hit_id) else {
        return StepOutcome::Clear;
    };
    if hit.kind == EntityKind::Player {
        let Body::Player { health, .. } = &mut hit.body else {
            log::error!("entity {:?} tagged Player without a player body", hit_id);
            return StepOutcome::Skipped;
        };
        if *health > 0 {
            *health -= 1;
            log::info!("enemy {:?} hit the player, health now {}", entity.id, health);
        }
        return StepOutcome::Damaged(hit_id);
    }

    snap_flush(&mut entity.bounds, &hit.bounds, dir);
    motion.movable = movable_mask(&entity.bounds, ctx.others.iter());
    randomize_direction(motion, ctx.rng);
    log::trace!("enemy {:?} bounced off {:?}, now heading {:?}", entity.id, hit_id, motion.direction);
    StepOutcome::Bounced(hit_id)
}

/// Pick a new direction uniformly among the free ones and start moving.
///
/// A fully boxed-in entity comes to rest instead (direction `None`, not
/// moving). Returns whether a direction was found.
pub fn randomize_direction(motion: &mut Motion, rng: &mut Pcg32) -> bool {
    let free = motion.movable.free_directions();
    match free.choose(rng) {
        Some(&dir) => {
            motion.direction = dir;
            motion.moving = true;
            true
        }
        None => {
            log::warn!("no free direction, coming to rest");
            motion.halt();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{CollectKind, Direction, MovableMask};
    use proptest::prelude::*;
    use rand::SeedableRng;

    struct Fixture {
        arena: EntityArena,
        events: EventQueue,
        rng: Pcg32,
    }

    impl Fixture {
        fn new(arena: EntityArena) -> Self {
            let mut events = EventQueue::new();
            events.resubscribe(&arena);
            Self {
                arena,
                events,
                rng: Pcg32::seed_from_u64(7),
            }
        }

        /// Advance the entity in slot `id` the way the tick does
        fn advance(&mut self, id: EntityId) -> StepOutcome {
            let mut entity = self.arena.take(id).expect("entity is live");
            let mut ctx = StepContext {
                others: &mut self.arena,
                events: &mut self.events,
                rng: &mut self.rng,
                step_scale: 1.0,
            };
            let outcome = advance(&mut entity, &mut ctx);
            self.arena.restore(entity);
            outcome
        }

        fn entity(&self, id: EntityId) -> &Entity {
            self.arena.get(id).expect("entity is live")
        }
    }

    fn steer(entity: &mut Entity, dir: Direction) {
        if let Some(motion) = entity.motion_mut() {
            motion.direction = dir;
            motion.moving = true;
        }
    }

    #[test]
    fn test_player_moves_by_speed() {
        let mut arena = EntityArena::new();
        let p = arena.insert_with(|id| {
            let mut e = Entity::player(id, Rect::tile(64.0, 64.0), 5.0, 3);
            steer(&mut e, Direction::Right);
            e
        });
        let mut fx = Fixture::new(arena);
        assert_eq!(fx.advance(p), StepOutcome::Clear);
        assert_eq!(fx.entity(p).bounds.x(), 69.0);
        assert_eq!(fx.entity(p).bounds.y(), 64.0);
    }

    #[test]
    fn test_stopped_player_does_not_move() {
        let mut arena = EntityArena::new();
        let p = arena.insert_with(|id| Entity::player(id, Rect::tile(64.0, 64.0), 5.0, 3));
        let mut fx = Fixture::new(arena);
        fx.advance(p);
        assert_eq!(fx.entity(p).bounds.position(), glam::DVec2::new(64.0, 64.0));
    }

    #[test]
    fn test_player_snaps_flush_under_block() {
        let mut arena = EntityArena::new();
        let wall = arena.insert_with(|id| Entity::block(id, Rect::tile(64.0, 32.0)));
        let p = arena.insert_with(|id| {
            let mut e = Entity::player(id, Rect::tile(64.0, 66.0), 5.0, 3);
            steer(&mut e, Direction::Up);
            e
        });
        let mut fx = Fixture::new(arena);
        assert_eq!(fx.advance(p), StepOutcome::Snapped(wall));
        let player = fx.entity(p);
        assert_eq!(player.bounds.y(), 64.0);
        assert!(!player.bounds.intersects(&fx.entity(wall).bounds));
        assert_eq!(player.motion().map(|m| m.direction), Some(Direction::Up));

        // Next tick the mask reports the wall and the snap holds position
        fx.advance(p);
        let player = fx.entity(p);
        assert_eq!(player.bounds.y(), 64.0);
        assert_eq!(player.motion().map(|m| m.movable.get(Direction::Up)), Some(false));
    }

    #[test]
    fn test_player_collects_once() {
        let mut arena = EntityArena::new();
        let coin = arena.insert_with(|id| {
            Entity::collectable(id, Rect::tile(96.0, 64.0), CollectKind::Score, 100)
        });
        let p = arena.insert_with(|id| {
            let mut e = Entity::player(id, Rect::tile(60.0, 64.0), 5.0, 3);
            steer(&mut e, Direction::Right);
            e
        });
        let mut fx = Fixture::new(arena);

        assert_eq!(fx.advance(p), StepOutcome::Notified(coin));
        assert_eq!(fx.advance(p), StepOutcome::Notified(coin));
        let events = fx.events.drain();
        assert_eq!(events, vec![GameEvent::PickedUp { id: coin, value: 100 }]);
    }

    #[test]
    fn test_player_reaching_portal_raises_level_complete() {
        let mut arena = EntityArena::new();
        let portal = arena.insert_with(|id| Entity::portal(id, Rect::tile(64.0, 96.0)));
        let p = arena.insert_with(|id| {
            let mut e = Entity::player(id, Rect::tile(64.0, 62.0), 5.0, 3);
            steer(&mut e, Direction::Down);
            e
        });
        let mut fx = Fixture::new(arena);
        assert_eq!(fx.advance(p), StepOutcome::Notified(portal));
        assert_eq!(fx.events.drain(), vec![GameEvent::LevelComplete { id: portal }]);
    }

    #[test]
    fn test_enemy_damages_player_but_not_below_zero() {
        let mut arena = EntityArena::new();
        let p = arena.insert_with(|id| Entity::player(id, Rect::tile(96.0, 64.0), 5.0, 1));
        let e = arena.insert_with(|id| {
            let mut e = Entity::enemy(id, Rect::tile(66.0, 64.0), 2.0);
            steer(&mut e, Direction::Right);
            e
        });
        let mut fx = Fixture::new(arena);

        assert_eq!(fx.advance(e), StepOutcome::Damaged(p));
        assert_eq!(fx.entity(p).health(), Some(0));
        assert_eq!(fx.advance(e), StepOutcome::Damaged(p));
        assert_eq!(fx.entity(p).health(), Some(0));
    }

    #[test]
    fn test_player_walking_into_enemy_takes_no_damage() {
        let mut arena = EntityArena::new();
        let e = arena.insert_with(|id| Entity::enemy(id, Rect::tile(96.0, 64.0), 0.0));
        let p = arena.insert_with(|id| {
            let mut e = Entity::player(id, Rect::tile(62.0, 64.0), 5.0, 3);
            steer(&mut e, Direction::Right);
            e
        });
        let mut fx = Fixture::new(arena);
        assert_eq!(fx.advance(p), StepOutcome::Ignored(e));
        assert_eq!(fx.entity(p).health(), Some(3));
    }

    #[test]
    fn test_enemy_bounces_into_free_direction() {
        // Corridor: walls above, below and to the right; only left is open
        let mut arena = EntityArena::new();
        arena.insert_with(|id| Entity::block(id, Rect::tile(64.0, 32.0)));
        arena.insert_with(|id| Entity::block(id, Rect::tile(64.0, 96.0)));
        let right = arena.insert_with(|id| Entity::block(id, Rect::tile(96.0, 64.0)));
        let e = arena.insert_with(|id| {
            let mut e = Entity::enemy(id, Rect::tile(62.0, 64.0), 3.0);
            steer(&mut e, Direction::Right);
            e
        });
        let mut fx = Fixture::new(arena);

        assert_eq!(fx.advance(e), StepOutcome::Bounced(right));
        let enemy = fx.entity(e);
        assert_eq!(enemy.bounds.x(), 64.0);
        let motion = enemy.motion().expect("enemy has motion");
        assert_eq!(motion.direction, Direction::Left);
        assert!(motion.moving);
    }

    #[test]
    fn test_boxed_in_enemy_comes_to_rest() {
        let mut motion = Motion::new(2.0);
        motion.movable = MovableMask([false; 4]);
        motion.direction = Direction::Up;
        motion.moving = true;
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(!randomize_direction(&mut motion, &mut rng));
        assert_eq!(motion.direction, Direction::None);
        assert!(!motion.moving);
    }

    #[test]
    fn test_halted_enemy_resumes_when_freed() {
        let mut arena = EntityArena::new();
        arena.insert_with(|id| Entity::block(id, Rect::tile(64.0, 32.0)));
        arena.insert_with(|id| Entity::block(id, Rect::tile(64.0, 96.0)));
        arena.insert_with(|id| Entity::block(id, Rect::tile(32.0, 64.0)));
        let right = arena.insert_with(|id| Entity::block(id, Rect::tile(96.0, 64.0)));
        let e = arena.insert_with(|id| Entity::enemy(id, Rect::tile(64.0, 64.0), 2.0));
        let mut fx = Fixture::new(arena);

        assert_eq!(fx.advance(e), StepOutcome::Clear);
        let motion = fx.entity(e).motion().cloned().expect("enemy has motion");
        assert!(!motion.moving);
        assert_eq!(motion.direction, Direction::None);

        fx.arena.remove(right);
        assert_eq!(fx.advance(e), StepOutcome::Clear);
        let enemy = fx.entity(e);
        let motion = enemy.motion().expect("enemy has motion");
        assert!(motion.moving);
        assert_eq!(motion.direction, Direction::Right);
        assert_eq!(enemy.bounds.position(), glam::DVec2::new(64.0, 64.0));

        fx.advance(e);
        assert_eq!(fx.entity(e).bounds.x(), 66.0);
    }

    #[test]
    fn test_stationary_enemy_bounces_in_place() {
        // Pinned against the top edge with an obstacle overlapping below: the
        // flush snap clamps back to y = 0, so only the direction changes
        let mut arena = EntityArena::new();
        let coin = arena.insert_with(|id| {
            Entity::collectable(id, Rect::tile(64.0, 16.0), CollectKind::Score, 100)
        });
        let e = arena.insert_with(|id| {
            let mut e = Entity::enemy(id, Rect::tile(64.0, 0.0), 0.0);
            steer(&mut e, Direction::Down);
            e
        });
        let mut fx = Fixture::new(arena);

        assert_eq!(fx.advance(e), StepOutcome::Bounced(coin));
        let direction = fx.entity(e).motion().map(|m| m.direction);
        assert!(direction.is_some_and(|d| d != Direction::Down && d != Direction::None));

        for _ in 0..1000 {
            fx.advance(e);
            assert_eq!(fx.entity(e).bounds.position(), glam::DVec2::new(64.0, 0.0));
        }
    }

    #[test]
    fn test_mismatched_payload_is_skipped() {
        let mut arena = EntityArena::new();
        let bad = arena.insert_with(|id| {
            let mut e = Entity::block(id, Rect::tile(64.0, 64.0));
            e.kind = EntityKind::Enemy;
            e
        });
        let mut fx = Fixture::new(arena);
        assert_eq!(fx.advance(bad), StepOutcome::Skipped);
        assert_eq!(fx.entity(bad).bounds.x(), 64.0);
    }

    #[test]
    fn test_passive_kinds_do_nothing() {
        let mut arena = EntityArena::new();
        let coin = arena.insert_with(|id| {
            Entity::collectable(id, Rect::tile(0.0, 0.0), CollectKind::Score, 10)
        });
        let mut fx = Fixture::new(arena);
        assert_eq!(fx.advance(coin), StepOutcome::Passive);
    }

    proptest! {
        #[test]
        fn prop_direction_choice_respects_mask(bits in 1u8..16, seed in any::<u64>()) {
            let mask = MovableMask([bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0]);
            let mut motion = Motion::new(1.0);
            motion.movable = mask;
            let mut rng = Pcg32::seed_from_u64(seed);
            prop_assert!(randomize_direction(&mut motion, &mut rng));
            prop_assert!(motion.moving);
            prop_assert!(mask.get(motion.direction));
        }
    }
}
