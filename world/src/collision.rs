//! Axis-separated movement against static walls.

use glam::Vec2;
use shooter_core::{CellCoord, HitBox, TileGrid};

/// Upper bound on corrective pushes along one axis within a single resolution.
const MAX_PUSHES: usize = 4;

/// Read-only lookup of wall hit-boxes near a moving body.
#[derive(Clone, Copy, Debug)]
pub(crate) struct WallMap<'a> {
    grid: &'a TileGrid,
    tile_length: f32,
}

impl<'a> WallMap<'a> {
    pub(crate) fn new(grid: &'a TileGrid, tile_length: f32) -> Self {
        Self { grid, tile_length }
    }

    /// Wall hit-boxes whose interior overlaps `hit_box`, in row-major order.
    ///
    /// Walls are spawned row by row, so this is also ascending wall id order.
    pub(crate) fn overlapping(&self, hit_box: &HitBox) -> Vec<HitBox> {
        let mut walls = Vec::new();
        if self.tile_length <= 0.0 {
            return walls;
        }

        let Some((columns, rows)) = self.cell_span(hit_box) else {
            return walls;
        };

        for row in rows.0..=rows.1 {
            for column in columns.0..=columns.1 {
                let cell = CellCoord::new(column, row);
                if !self.grid.is_wall(cell) {
                    continue;
                }
                let wall = HitBox::new(cell.center(self.tile_length), Vec2::splat(self.tile_length));
                if wall.overlaps(hit_box) {
                    walls.push(wall);
                }
            }
        }
        walls
    }

    /// Reports whether any wall overlaps `hit_box`.
    pub(crate) fn blocks(&self, hit_box: &HitBox) -> bool {
        !self.overlapping(hit_box).is_empty()
    }

    fn cell_span(&self, hit_box: &HitBox) -> Option<((u32, u32), (u32, u32))> {
        let columns = clamp_span(
            hit_box.min().x,
            hit_box.max().x,
            self.tile_length,
            self.grid.columns(),
        )?;
        let rows = clamp_span(
            hit_box.min().y,
            hit_box.max().y,
            self.tile_length,
            self.grid.rows(),
        )?;
        Some((columns, rows))
    }
}

fn clamp_span(min: f32, max: f32, tile_length: f32, count: u32) -> Option<(u32, u32)> {
    if count == 0 || !min.is_finite() || !max.is_finite() {
        return None;
    }
    let first = (min / tile_length).floor() as i64;
    let last = (max / tile_length).floor() as i64;
    let upper = i64::from(count) - 1;
    if last < 0 || first > upper {
        return None;
    }
    let first = u32::try_from(first.max(0)).ok()?;
    let last = u32::try_from(last.min(upper)).ok()?;
    Some((first, last))
}

/// Axis along which a displacement is integrated and resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn component(self, vector: Vec2) -> f32 {
        match self {
            Self::Horizontal => vector.x,
            Self::Vertical => vector.y,
        }
    }

    fn component_mut(self, vector: &mut Vec2) -> &mut f32 {
        match self {
            Self::Horizontal => &mut vector.x,
            Self::Vertical => &mut vector.y,
        }
    }
}

/// Integrates `velocity` over `seconds` and resolves wall contacts.
///
/// The horizontal displacement is applied and resolved first, then the
/// vertical one. Both passes are then repeated without displacement until the
/// body stops moving, so resolving again leaves it where it is. Returns whether
/// any wall moved the body or cancelled part of its velocity.
pub(crate) fn move_with_walls(
    position: &mut Vec2,
    velocity: &mut Vec2,
    size: Vec2,
    seconds: f32,
    walls: &WallMap<'_>,
) -> bool {
    position.x += velocity.x * seconds;
    let mut bumped = resolve_axis(position, velocity, size, Axis::Horizontal, walls);
    position.y += velocity.y * seconds;
    bumped |= resolve_axis(position, velocity, size, Axis::Vertical, walls);

    for _ in 0..MAX_PUSHES {
        let before = *position;
        bumped |= resolve_axis(position, velocity, size, Axis::Horizontal, walls);
        bumped |= resolve_axis(position, velocity, size, Axis::Vertical, walls);
        if *position == before {
            break;
        }
    }
    bumped
}

/// Pushes the body out of the walls it overlaps along one axis.
///
/// Only walls whose overlap is shallower on this axis than on the other one
/// are resolved here; vertical resolution also takes the ties. The body lands
/// flush against the nearest face on the side it overlaps. When walls on both
/// sides leave a gap narrower than the body, it is centered in the gap and
/// stays there. Velocity along the axis is cancelled when the push opposes it.
pub(crate) fn resolve_axis(
    position: &mut Vec2,
    velocity: &mut Vec2,
    size: Vec2,
    axis: Axis,
    walls: &WallMap<'_>,
) -> bool {
    let start = axis.component(*position);
    let reach = axis.component(size.abs()) * 0.5;
    let mut contact = Contact::default();
    let mut stopped = false;

    for _ in 0..MAX_PUSHES {
        let hit_box = HitBox::new(*position, size);
        let found = axis_contact(&hit_box, axis, walls);
        if found.is_empty() {
            break;
        }
        contact = contact.merge(found);

        let coordinate = axis.component(*position);
        let (target, squeezed) = contact.settle(coordinate, reach);
        let speed = axis.component_mut(velocity);
        if squeezed || (target - coordinate) * *speed < 0.0 {
            stopped |= *speed != 0.0;
            *speed = 0.0;
        }
        *axis.component_mut(position) = target;
        if squeezed || target == coordinate {
            break;
        }
    }

    stopped || axis.component(*position) != start
}

/// Nearest wall faces met along one axis, split by the side of the body.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Contact {
    /// Far face of the nearest wall behind the body's center.
    behind: Option<f32>,
    /// Near face of the nearest wall ahead of the body's center.
    ahead: Option<f32>,
}

impl Contact {
    fn is_empty(self) -> bool {
        self.behind.is_none() && self.ahead.is_none()
    }

    fn merge(self, other: Self) -> Self {
        Self {
            behind: nearest(self.behind, other.behind, f32::max),
            ahead: nearest(self.ahead, other.ahead, f32::min),
        }
    }

    /// Coordinate clearing both faces, flagged when the gap is too narrow.
    fn settle(self, coordinate: f32, reach: f32) -> (f32, bool) {
        match (self.behind, self.ahead) {
            (Some(behind), Some(ahead)) if ahead - behind < 2.0 * reach => {
                ((behind + ahead) * 0.5, true)
            }
            (behind, ahead) => {
                let mut target = coordinate;
                if let Some(behind) = behind {
                    target = target.max(behind + reach);
                }
                if let Some(ahead) = ahead {
                    target = target.min(ahead - reach);
                }
                (target, false)
            }
        }
    }
}

fn nearest(left: Option<f32>, right: Option<f32>, pick: fn(f32, f32) -> f32) -> Option<f32> {
    match (left, right) {
        (Some(left), Some(right)) => Some(pick(left, right)),
        (face, None) | (None, face) => face,
    }
}

fn axis_contact(hit_box: &HitBox, axis: Axis, walls: &WallMap<'_>) -> Contact {
    let center = axis.component(hit_box.center());
    let mut contact = Contact::default();
    for wall in walls.overlapping(hit_box) {
        let along_x = hit_box.penetration_x(&wall);
        let along_y = hit_box.penetration_y(&wall);
        let resolves_here = match axis {
            Axis::Horizontal => along_x < along_y,
            Axis::Vertical => along_y <= along_x,
        };
        if !resolves_here {
            continue;
        }

        let wall_center = axis.component(wall.center());
        let found = if wall_center < center {
            Contact {
                behind: Some(axis.component(wall.max())),
                ahead: None,
            }
        } else if wall_center > center {
            Contact {
                behind: None,
                ahead: Some(axis.component(wall.min())),
            }
        } else {
            continue;
        };
        contact = contact.merge(found);
    }
    contact
}

#[cfg(test)]
mod tests {
    use super::*;
    use shooter_core::TileKind;

    const E: TileKind = TileKind::Empty;
    const W: TileKind = TileKind::Wall;
    const P: TileKind = TileKind::PlayerSpawn;

    fn arena() -> TileGrid {
        TileGrid::from_rows(vec![
            vec![W, W, W, W, W],
            vec![W, P, E, E, W],
            vec![W, E, E, E, W],
            vec![W, W, W, W, W],
        ])
        .expect("valid arena")
    }

    fn corridor() -> TileGrid {
        TileGrid::from_rows(vec![
            vec![W, W, W, W, W],
            vec![W, P, E, E, W],
            vec![W, W, W, W, W],
        ])
        .expect("valid corridor")
    }

    #[test]
    fn moving_into_a_wall_stops_flush_against_it() {
        let grid = arena();
        let walls = WallMap::new(&grid, 32.0);
        let mut position = Vec2::new(112.0, 48.0);
        let mut velocity = Vec2::new(100.0, 0.0);

        let bumped = move_with_walls(&mut position, &mut velocity, Vec2::splat(32.0), 0.1, &walls);

        assert!(bumped);
        assert_eq!(position, Vec2::new(112.0, 48.0));
        assert_eq!(velocity, Vec2::ZERO);
    }

    #[test]
    fn diagonal_motion_slides_along_walls() {
        let grid = arena();
        let walls = WallMap::new(&grid, 32.0);
        let mut position = Vec2::new(64.0, 52.0);
        let mut velocity = Vec2::new(40.0, -100.0);

        let bumped = move_with_walls(&mut position, &mut velocity, Vec2::splat(32.0), 0.1, &walls);

        assert!(bumped);
        assert_eq!(position, Vec2::new(68.0, 48.0));
        assert_eq!(velocity, Vec2::new(40.0, 0.0));
    }

    #[test]
    fn resolution_is_idempotent_once_settled() {
        let grid = arena();
        let walls = WallMap::new(&grid, 32.0);
        let size = Vec2::splat(40.0);
        let mut position = Vec2::new(40.0, 44.0);
        let mut velocity = Vec2::ZERO;

        let _ = move_with_walls(&mut position, &mut velocity, size, 0.0, &walls);
        let settled = position;
        assert!(!walls.blocks(&HitBox::new(settled, size)));

        let bumped = move_with_walls(&mut position, &mut velocity, size, 0.0, &walls);
        assert!(!bumped);
        assert_eq!(position, settled);
    }

    #[test]
    fn bodies_wider_than_a_corridor_settle_in_its_middle() {
        let grid = corridor();
        let walls = WallMap::new(&grid, 32.0);
        let size = Vec2::splat(40.0);

        for start in [
            Vec2::new(80.0, 48.0),
            Vec2::new(80.0, 44.0),
            Vec2::new(80.0, 52.0),
        ] {
            let mut position = start;
            let mut velocity = Vec2::ZERO;

            let _ = move_with_walls(&mut position, &mut velocity, size, 0.0, &walls);
            assert_eq!(position, Vec2::new(80.0, 48.0), "settling from {start}");

            let bumped = move_with_walls(&mut position, &mut velocity, size, 0.0, &walls);
            assert!(!bumped, "resettled from {start}");
            assert_eq!(position, Vec2::new(80.0, 48.0));
        }
    }

    #[test]
    fn wide_bodies_still_travel_along_a_corridor() {
        let grid = corridor();
        let walls = WallMap::new(&grid, 32.0);
        let mut position = Vec2::new(80.0, 48.0);
        let mut velocity = Vec2::new(100.0, 0.0);

        let bumped = move_with_walls(&mut position, &mut velocity, Vec2::splat(40.0), 0.1, &walls);

        assert!(!bumped);
        assert_eq!(position, Vec2::new(90.0, 48.0));
        assert_eq!(velocity, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn each_axis_resolves_only_its_shallow_overlaps() {
        let grid = arena();
        let walls = WallMap::new(&grid, 32.0);
        let hit_box = HitBox::new(Vec2::new(48.0, 40.0), Vec2::splat(32.0));

        assert!(axis_contact(&hit_box, Axis::Horizontal, &walls).is_empty());
        let vertical = axis_contact(&hit_box, Axis::Vertical, &walls);
        assert_eq!(vertical.behind, Some(32.0));
        assert_eq!(vertical.ahead, None);
    }

    #[test]
    fn spans_outside_the_grid_find_no_walls() {
        let grid = arena();
        let walls = WallMap::new(&grid, 32.0);
        let outside = HitBox::new(Vec2::new(-100.0, -100.0), Vec2::splat(10.0));
        assert!(walls.overlapping(&outside).is_empty());
    }
}
