//! Collision detection and response for grid-aligned boxes
//!
//! Three primitives drive all movement:
//! - a 1-unit point probe past each edge, which builds the movable mask
//! - a directional hit scan over the post-move box
//! - a flush snap that pushes a box back against the edge it ran into
//!
//! The probe is not a swept test. A mover faster than an obstacle is thick can
//! step over it between ticks.

use glam::DVec2;

use super::entity::{Direction, Entity, EntityId, MovableMask};
use super::rect::Rect;

/// Point one unit past `bounds` at the midpoint of the edge facing `dir`
pub fn probe_point(bounds: &Rect, dir: Direction) -> Option<DVec2> {
    let mid_x = bounds.x() + bounds.width() / 2.0;
    let mid_y = bounds.y() + bounds.height() / 2.0;
    match dir {
        Direction::Up => Some(DVec2::new(mid_x, bounds.y() - 1.0)),
        Direction::Down => Some(DVec2::new(mid_x, bounds.bottom() + 1.0)),
        Direction::Left => Some(DVec2::new(bounds.x() - 1.0, mid_y)),
        Direction::Right => Some(DVec2::new(bounds.right() + 1.0, mid_y)),
        Direction::None => None,
    }
}

/// Build the movable mask for a box against every other collidable entity.
/// `others` must not contain the entity that owns `bounds`.
pub fn movable_mask<'a>(bounds: &Rect, others: impl IntoIterator<Item = &'a Entity>) -> MovableMask {
    let probes = Direction::ALL.map(|d| probe_point(bounds, d));
    let mut mask = MovableMask::default();
    for other in others {
        if !other.collidable {
            continue;
        }
        for (dir, probe) in Direction::ALL.iter().zip(probes.iter()) {
            if probe.is_some_and(|p| other.bounds.contains(p)) {
                mask.set(*dir, false);
            }
        }
    }
    mask
}

/// Whether `other` lies on the far side of `me` along `dir`
fn lies_ahead(me: &Rect, other: &Rect, dir: Direction) -> bool {
    match dir {
        Direction::Up => other.y() < me.y(),
        Direction::Down => other.y() > me.y(),
        Direction::Left => other.x() < me.x(),
        Direction::Right => other.x() > me.x(),
        Direction::None => false,
    }
}

/// First collidable entity (in iteration order) that overlaps `bounds` and lies
/// ahead along `dir`. This is not necessarily the nearest overlap.
pub fn find_hit<'a>(
    bounds: &Rect,
    dir: Direction,
    others: impl IntoIterator<Item = &'a Entity>,
) -> Option<EntityId> {
    others
        .into_iter()
        .find(|o| o.collidable && bounds.intersects(&o.bounds) && lies_ahead(bounds, &o.bounds, dir))
        .map(|o| o.id)
}

/// Move `bounds` back so its leading edge along `dir` touches `obstacle`
pub fn snap_flush(bounds: &mut Rect, obstacle: &Rect, dir: Direction) {
    match dir {
        Direction::Up => bounds.set_y(obstacle.bottom()),
        Direction::Down => bounds.set_y(obstacle.y() - bounds.height()),
        Direction::Left => bounds.set_x(obstacle.right()),
        Direction::Right => bounds.set_x(obstacle.x() - bounds.width()),
        Direction::None => {}
    }
}
