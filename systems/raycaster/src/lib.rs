#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid raycaster based on the digital differential analyzer.
//!
//! Rays march from cell boundary to cell boundary along whichever axis is
//! closer, which visits every cell the ray crosses exactly once and never
//! misses a corner. Distances are expressed in world units.

use crawler_core::{CellCoord, EngineConfig, GridMap, PlayerPose};
use glam::Vec2;

/// Solid cell struck by a ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallHit {
    /// Cell that stopped the ray.
    pub cell: CellCoord,
    /// Texture selected by the cell payload.
    pub texture_id: u16,
}

/// Result of casting a single ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Absolute direction of the ray in radians.
    pub angle: f32,
    /// Euclidean distance from the origin to the hit point.
    pub raw_distance: f32,
    /// Distance projected onto the view direction, free of fisheye distortion.
    pub corrected_distance: f32,
    /// World position where the ray stopped.
    pub hit: Vec2,
    /// Whether the ray struck a face perpendicular to the X axis.
    pub hit_vertical_face: bool,
    /// Wall that stopped the ray; `None` when the ray ran out of range.
    pub hit_wall: Option<WallHit>,
}

/// Casts rays through a grid up to a maximum distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Raycaster {
    tile_size: f32,
    max_distance: f32,
}

impl Raycaster {
    /// Creates a raycaster for tiles of the provided size.
    #[must_use]
    pub const fn new(tile_size: f32, max_distance: f32) -> Self {
        Self {
            tile_size,
            max_distance,
        }
    }

    /// Creates a raycaster using the tile size and range from the configuration.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.tile_size, config.max_distance())
    }

    /// Side length of a tile in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Distance after which rays give up.
    #[must_use]
    pub const fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Casts one ray from `origin` along `angle`, correcting fisheye against `heading`.
    #[must_use]
    pub fn cast_ray(&self, origin: Vec2, angle: f32, heading: f32, grid: &GridMap) -> Ray {
        let direction = Vec2::new(angle.cos(), angle.sin());
        let start = origin / self.tile_size;
        let mut map_x = start.x.floor() as i64;
        let mut map_y = start.y.floor() as i64;

        let (step_x, delta_x, mut side_x) = self.axis(direction.x, start.x, map_x);
        let (step_y, delta_y, mut side_y) = self.axis(direction.y, start.y, map_y);

        let mut hit_vertical_face = false;
        let mut wall = None;
        loop {
            let distance = if side_x < side_y {
                map_x += step_x;
                hit_vertical_face = true;
                let distance = side_x;
                side_x += delta_x;
                distance
            } else {
                map_y += step_y;
                hit_vertical_face = false;
                let distance = side_y;
                side_y += delta_y;
                distance
            };

            if !(distance <= self.max_distance) {
                break;
            }

            if let Some(cell) = grid.cell_at(map_x, map_y).filter(|cell| cell.is_solid()) {
                wall = Some(WallHit {
                    cell: CellCoord::new(map_x as u32, map_y as u32),
                    texture_id: cell.payload(),
                });
                break;
            }
        }

        let raw_distance = match wall {
            Some(_) if hit_vertical_face => {
                (map_x as f32 - start.x + (1 - step_x) as f32 / 2.0) / direction.x
                    * self.tile_size
            }
            Some(_) => {
                (map_y as f32 - start.y + (1 - step_y) as f32 / 2.0) / direction.y
                    * self.tile_size
            }
            None => self.max_distance,
        };

        Ray {
            angle,
            raw_distance,
            corrected_distance: raw_distance * (angle - heading).cos(),
            hit: origin + direction * raw_distance,
            hit_vertical_face,
            hit_wall: wall,
        }
    }

    /// Fans `ray_count` rays across the field of view, replacing the contents of `out`.
    pub fn cast_all_rays(
        &self,
        pose: &PlayerPose,
        grid: &GridMap,
        ray_count: u32,
        fov_degrees: f32,
        out: &mut Vec<Ray>,
    ) {
        out.clear();
        out.reserve(ray_count as usize);
        let heading = pose.heading_radians();
        for index in 0..ray_count {
            let angle = ray_angle(pose.angle_degrees, index, ray_count, fov_degrees);
            out.push(self.cast_ray(pose.position, angle, heading, grid));
        }

        tracing::trace!(
            rays = out.len(),
            walls = out.iter().filter(|ray| ray.hit_wall.is_some()).count(),
            "cast frame rays"
        );
    }

    /// Step sign, per-cell distance and distance to the first boundary along one axis.
    ///
    /// A zero direction component never crosses a boundary on that axis, so both
    /// distances are infinite instead of the `0 * inf` NaN a naive division yields.
    fn axis(&self, direction: f32, start: f32, cell: i64) -> (i64, f32, f32) {
        if direction == 0.0 {
            return (0, f32::INFINITY, f32::INFINITY);
        }

        let delta = self.tile_size / direction.abs();
        if direction < 0.0 {
            (-1, delta, (start - cell as f32) * delta)
        } else {
            (1, delta, (cell as f32 + 1.0 - start) * delta)
        }
    }
}

/// Absolute angle in radians of ray `index` out of `ray_count` spread over `fov_degrees`.
#[must_use]
pub fn ray_angle(heading_degrees: f32, index: u32, ray_count: u32, fov_degrees: f32) -> f32 {
    let step = fov_degrees / ray_count.max(1) as f32;
    (heading_degrees + index as f32 * step - fov_degrees / 2.0).to_radians()
}

/// Casts a single ray; see [`Raycaster::cast_ray`].
#[must_use]
pub fn cast_ray(
    raycaster: &Raycaster,
    origin: Vec2,
    angle: f32,
    heading: f32,
    grid: &GridMap,
) -> Ray {
    raycaster.cast_ray(origin, angle, heading, grid)
}

/// Casts a full frame of rays; see [`Raycaster::cast_all_rays`].
pub fn cast_all_rays(
    raycaster: &Raycaster,
    pose: &PlayerPose,
    grid: &GridMap,
    ray_count: u32,
    fov_degrees: f32,
    out: &mut Vec<Ray>,
) {
    raycaster.cast_all_rays(pose, grid, ray_count, fov_degrees, out);
}
