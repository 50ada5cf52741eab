//! Axis-separated tile sweep shared by every moving box.
//!
//! Horizontal motion is integrated and resolved first, then vertical. Each
//! axis only scans the tile line the box's leading edge now occupies, so
//! there is no diagonal correction; very fast boxes can tunnel corners.

use glam::Vec2;

use crate::components::items::MovingPlatform;
use crate::level::grid::{is_one_way, TileGrid, TILE_SIZE};
use crate::physics::body::Body;

const EDGE_EPSILON: f32 = 0.01;

/// How far below a one-way platform's top the feet may have been last tick
/// and still be caught.
pub const ONE_WAY_TOLERANCE: f32 = 6.0;
pub const PLATFORM_TOLERANCE: f32 = 6.0;

/// What a horizontal block does to velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallResponse {
    Stop,
    /// Patrolling entities turn around.
    Reverse,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Blocked by a solid tile.
    pub hit_wall: bool,
    /// Blocked by the left/right level bound.
    pub hit_edge: bool,
    /// Moving down and stopped by a solid tile.
    pub landed: bool,
    /// Moving up and stopped; the struck cell nearest the box centre.
    pub ceiling: Option<(i32, i32)>,
}

impl SweepReport {
    pub fn blocked(&self) -> bool {
        self.hit_wall || self.hit_edge
    }
}

/// Inclusive cell range covered by the pixel span [lo, hi).
fn cell_span(lo: f32, hi: f32) -> (i32, i32) {
    (
        (lo / TILE_SIZE).floor() as i32,
        ((hi - EDGE_EPSILON) / TILE_SIZE).floor() as i32,
    )
}

/// Integrate and resolve the horizontal axis only.
pub fn sweep_horizontal(body: &mut Body, grid: &TileGrid, response: WallResponse) -> SweepReport {
    let mut report = SweepReport::default();

    if body.vel.x != 0.0 {
        body.pos.x += body.vel.x;
        let (row_a, row_b) = cell_span(body.top(), body.bottom());
        if body.vel.x > 0.0 {
            let col = ((body.right() - EDGE_EPSILON) / TILE_SIZE).floor() as i32;
            if (row_a..=row_b).any(|row| grid.is_solid_at(col, row)) {
                body.pos.x = col as f32 * TILE_SIZE - body.size.x;
                report.hit_wall = true;
            }
        } else {
            let col = (body.left() / TILE_SIZE).floor() as i32;
            if (row_a..=row_b).any(|row| grid.is_solid_at(col, row)) {
                body.pos.x = (col + 1) as f32 * TILE_SIZE;
                report.hit_wall = true;
            }
        }
    }

    let max_x = (grid.width_px() - body.size.x).max(0.0);
    if body.pos.x < 0.0 {
        body.pos.x = 0.0;
        report.hit_edge = true;
    } else if body.pos.x > max_x {
        body.pos.x = max_x;
        report.hit_edge = true;
    }

    if report.blocked() {
        match response {
            WallResponse::Stop => body.vel.x = 0.0,
            WallResponse::Reverse => body.vel.x = -body.vel.x,
        }
    }
    report
}

/// Integrate and resolve the vertical axis only. Clears and re-derives
/// `on_ground`.
pub fn sweep_vertical(body: &mut Body, grid: &TileGrid) -> SweepReport {
    let mut report = SweepReport::default();
    body.on_ground = false;
    body.pos.y += body.vel.y;

    let (col_a, col_b) = cell_span(body.left(), body.right());
    if body.vel.y > 0.0 {
        let row = ((body.bottom() - EDGE_EPSILON) / TILE_SIZE).floor() as i32;
        if (col_a..=col_b).any(|col| grid.is_solid_at(col, row)) {
            body.pos.y = row as f32 * TILE_SIZE - body.size.y;
            body.vel.y = 0.0;
            body.on_ground = true;
            report.landed = true;
        }
    } else if body.vel.y < 0.0 {
        let row = (body.top() / TILE_SIZE).floor() as i32;
        let center_x = body.center().x;
        let struck = (col_a..=col_b)
            .filter(|col| grid.is_solid_at(*col, row))
            .min_by(|a, b| {
                let da = ((*a as f32 + 0.5) * TILE_SIZE - center_x).abs();
                let db = ((*b as f32 + 0.5) * TILE_SIZE - center_x).abs();
                da.total_cmp(&db)
            });
        if let Some(col) = struck {
            body.pos.y = (row + 1) as f32 * TILE_SIZE;
            body.vel.y = 0.0;
            report.ceiling = Some((col, row));
        }
    }
    report
}

/// Full two-axis sweep against solid tiles.
pub fn sweep(body: &mut Body, grid: &TileGrid, response: WallResponse) -> SweepReport {
    let horizontal = sweep_horizontal(body, grid, response);
    let vertical = sweep_vertical(body, grid);
    SweepReport {
        hit_wall: horizontal.hit_wall,
        hit_edge: horizontal.hit_edge,
        landed: vertical.landed,
        ceiling: vertical.ceiling,
    }
}

/// Catch a falling box on a one-way platform tile. Only arrests downward
/// motion, and only when last tick's feet were at or just below the top.
pub fn land_on_one_way(body: &mut Body, grid: &TileGrid) -> bool {
    if body.on_ground || body.vel.y < 0.0 {
        return false;
    }
    let (col_a, col_b) = cell_span(body.left(), body.right());
    let row = ((body.bottom() - EDGE_EPSILON) / TILE_SIZE).floor() as i32;
    let top = row as f32 * TILE_SIZE;
    let prev_bottom = body.bottom() - body.vel.y;
    if prev_bottom > top + ONE_WAY_TOLERANCE {
        return false;
    }
    if (col_a..=col_b).any(|col| is_one_way(grid.get(col, row))) {
        body.pos.y = top - body.size.y;
        body.vel.y = 0.0;
        body.on_ground = true;
        return true;
    }
    false
}

/// Catch a falling box on a moving platform and carry it by the platform's
/// delta for this tick. The carry is swept like any horizontal move, so a
/// platform never pushes its rider into a wall.
pub fn ride_platforms(body: &mut Body, grid: &TileGrid, platforms: &[MovingPlatform]) -> bool {
    if body.on_ground || body.vel.y < 0.0 {
        return false;
    }
    for platform in platforms {
        let top = platform.pos.y;
        if !body.horizontal_overlap(platform.pos.x, platform.pos.x + platform.size.x) {
            continue;
        }
        let prev_bottom = body.bottom() - body.vel.y;
        if body.bottom() >= top && prev_bottom <= top + PLATFORM_TOLERANCE {
            body.pos.y = top - body.size.y;
            body.vel.y = 0.0;
            body.on_ground = true;
            let own = body.vel.x;
            body.vel.x = platform.delta;
            sweep_horizontal(body, grid, WallResponse::Stop);
            body.vel.x = own;
            return true;
        }
    }
    false
}

/// Furthest a grown box is shifted looking for room.
const NUDGE_REACH: i32 = 2 * TILE_SIZE as i32;

/// Shift a box that overlaps solid tiles (after growing) to the nearest
/// free spot, trying down first and then sideways, one pixel at a time.
/// Returns false, leaving the box where it was, if nothing within reach fits.
pub fn nudge_out_of_solid(body: &mut Body, grid: &TileGrid) -> bool {
    if !intersects_solid(body, grid) {
        return true;
    }
    let origin = body.pos;
    for step in 1..=NUDGE_REACH {
        let d = step as f32;
        for offset in [Vec2::new(0.0, d), Vec2::new(-d, 0.0), Vec2::new(d, 0.0)] {
            body.pos = origin + offset;
            if body.left() < 0.0 || body.right() > grid.width_px() {
                continue;
            }
            if !intersects_solid(body, grid) {
                return true;
            }
        }
    }
    body.pos = origin;
    false
}

/// True if any interior point of the box lies inside a solid tile.
pub fn intersects_solid(body: &Body, grid: &TileGrid) -> bool {
    let (col_a, col_b) = cell_span(body.left() + EDGE_EPSILON, body.right());
    let (row_a, row_b) = cell_span(body.top() + EDGE_EPSILON, body.bottom());
    (row_a..=row_b).any(|row| (col_a..=col_b).any(|col| grid.is_solid_at(col, row)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_grid() -> TileGrid {
        TileGrid::from_rows(&[
            "..........",
            "..........",
            "......#...",
            "..........",
            "##########",
        ])
    }

    #[test]
    fn falling_box_lands_on_ground() {
        let grid = flat_grid();
        let mut body = Body::new(Vec2::new(40.0, 92.0), Vec2::new(24.0, 30.0)).with_velocity(Vec2::new(0.0, 8.0));
        let report = sweep(&mut body, &grid, WallResponse::Stop);
        assert!(report.landed);
        assert!(body.on_ground);
        assert_eq!(body.bottom(), 128.0);
        assert_eq!(body.vel.y, 0.0);
    }

    #[test]
    fn wall_stops_or_reverses() {
        let grid = TileGrid::from_rows(&["....#", "....#", "#####"]);
        let mut stop = Body::new(Vec2::new(100.0, 34.0), Vec2::new(24.0, 30.0)).with_velocity(Vec2::new(6.0, 0.0));
        let report = sweep_horizontal(&mut stop, &grid, WallResponse::Stop);
        assert!(report.hit_wall);
        assert_eq!(stop.right(), 128.0);
        assert_eq!(stop.vel.x, 0.0);

        let mut patrol = Body::new(Vec2::new(100.0, 34.0), Vec2::new(24.0, 30.0)).with_velocity(Vec2::new(6.0, 0.0));
        sweep_horizontal(&mut patrol, &grid, WallResponse::Reverse);
        assert_eq!(patrol.vel.x, -6.0);
    }

    #[test]
    fn level_edge_blocks_like_a_wall() {
        let grid = flat_grid();
        let mut body = Body::new(Vec2::new(2.0, 40.0), Vec2::new(24.0, 30.0)).with_velocity(Vec2::new(-5.0, 0.0));
        let report = sweep_horizontal(&mut body, &grid, WallResponse::Reverse);
        assert!(report.hit_edge);
        assert_eq!(body.pos.x, 0.0);
        assert_eq!(body.vel.x, 5.0);
    }

    #[test]
    fn rising_box_reports_struck_ceiling_cell() {
        let grid = flat_grid();
        let mut body = Body::new(Vec2::new(196.0, 98.0), Vec2::new(24.0, 30.0)).with_velocity(Vec2::new(0.0, -6.0));
        let report = sweep(&mut body, &grid, WallResponse::Stop);
        assert_eq!(report.ceiling, Some((6, 2)));
        assert_eq!(body.top(), 96.0);
        assert_eq!(body.vel.y, 0.0);
    }

    #[test]
    fn one_way_catches_from_above_only() {
        let grid = TileGrid::from_rows(&["....", "....", "====", "....", "####"]);

        let mut from_above = Body::new(Vec2::new(32.0, 33.0), Vec2::new(24.0, 30.0)).with_velocity(Vec2::new(0.0, 4.0));
        sweep(&mut from_above, &grid, WallResponse::Stop);
        assert!(land_on_one_way(&mut from_above, &grid));
        assert_eq!(from_above.bottom(), 64.0);

        let mut from_below = Body::new(Vec2::new(32.0, 70.0), Vec2::new(24.0, 30.0)).with_velocity(Vec2::new(0.0, -6.0));
        sweep(&mut from_below, &grid, WallResponse::Stop);
        assert!(!land_on_one_way(&mut from_below, &grid));
        assert!(from_below.top() < 70.0);
    }

    #[test]
    fn deep_inside_one_way_is_not_caught() {
        let grid = TileGrid::from_rows(&["....", "====", "...."]);
        // feet 20px into the platform tile, falling slowly
        let mut body = Body::new(Vec2::new(0.0, 22.0), Vec2::new(24.0, 30.0)).with_velocity(Vec2::new(0.0, 1.0));
        body.pos.y += 1.0;
        assert!(!land_on_one_way(&mut body, &grid));
    }

    #[test]
    fn platform_carries_rider() {
        let mut platform = MovingPlatform::new(Vec2::new(64.0, 100.0));
        platform.delta = 1.5;
        let mut body = Body::new(Vec2::new(70.0, 70.5), Vec2::new(24.0, 30.0)).with_velocity(Vec2::new(0.0, 0.5));
        let grid = TileGrid::from_rows(&["......", "......", "......", "......"]);
        assert!(ride_platforms(&mut body, &grid, &[platform]));
        assert_eq!(body.bottom(), 100.0);
        assert_eq!(body.pos.x, 71.5);
        assert_eq!(body.vel.x, 0.0);
        assert!(body.on_ground);
    }

    #[test]
    fn platform_cannot_push_rider_into_a_wall() {
        let grid = TileGrid::from_rows(&["...#..", "...#..", "...#..", "......"]);
        let mut platform = MovingPlatform::new(Vec2::new(32.0, 96.0));
        platform.delta = 3.0;
        // rider's right edge 1px short of the wall column
        let mut body = Body::new(Vec2::new(71.0, 66.5), Vec2::new(24.0, 30.0)).with_velocity(Vec2::new(1.0, 0.5));
        assert!(ride_platforms(&mut body, &grid, &[platform]));
        assert_eq!(body.right(), 96.0);
        assert_eq!(body.vel.x, 1.0);
        assert!(!intersects_solid(&body, &grid));
    }

    #[test]
    fn grown_box_is_nudged_out_of_a_low_ceiling() {
        let grid = TileGrid::from_rows(&[
            "......",
            "###...",
            "......",
            "######",
        ]);
        // two tiles tall, feet on the floor, head poking into the ledge
        let mut body = Body::standing_at(Vec2::new(48.0, 96.0), Vec2::new(24.0, 56.0));
        assert!(intersects_solid(&body, &grid));
        assert!(nudge_out_of_solid(&mut body, &grid));
        assert!(!intersects_solid(&body, &grid));
        assert_eq!(body.bottom(), 96.0);
        assert!(body.left() >= 96.0);

        let mut boxed_in = Body::new(Vec2::new(4.0, 36.0), Vec2::new(24.0, 90.0));
        let before = boxed_in.pos;
        let sealed = TileGrid::from_rows(&["######", "......", "......", "######"]);
        assert!(!nudge_out_of_solid(&mut boxed_in, &sealed));
        assert_eq!(boxed_in.pos, before);
    }

    #[test]
    fn boxes_never_end_inside_solid_tiles() {
        let grid = TileGrid::from_rows(&[
            "#..........#",
            "#....##....#",
            "#..........#",
            "#..#....#..#",
            "############",
        ]);
        let mut body = Body::new(Vec2::new(40.0, 10.0), Vec2::new(24.0, 28.0)).with_velocity(Vec2::new(4.0, -3.0));
        for tick in 0..600 {
            body.vel.y = (body.vel.y + 0.5).min(10.0);
            if body.on_ground && tick % 37 == 0 {
                body.vel.y = -9.0;
            }
            let report = sweep(&mut body, &grid, WallResponse::Reverse);
            if report.blocked() && body.vel.x == 0.0 {
                body.vel.x = 4.0;
            }
            assert!(!intersects_solid(&body, &grid), "tick {}: {:?}", tick, body);
        }
    }
}
