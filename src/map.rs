//! Procedural map generation: base placement, clustered obstacles and
//! grid-with-jitter stone fields. The generator is handed to the step
//! driver as an explicit collaborator; the engine never reaches for it
//! through globals.

use crate::config::WorldConfig;
use crate::geometry;
use crate::world::{Base, Rect, Stone, World};
use rand::Rng;

/// Map generation collaborator. Owns the radii it stamps onto generated
/// features; everything else is drawn from the rng it is given.
#[derive(Clone, Debug)]
pub struct MapGenerator {
    pub base_radius: f32,
    pub stone_radius: f32,
}

impl MapGenerator {
    /// Minimum spacing kept between live stones on respawn.
    const MIN_STONE_SPACING: f32 = 40.0;
    /// Placement attempts before a respawn gives up.
    const MAX_RESPAWN_ATTEMPTS: usize = 50;

    pub fn new(cfg: &WorldConfig) -> Self {
        Self {
            base_radius: cfg.base_radius,
            stone_radius: cfg.stone_radius,
        }
    }

    /// Exclusion radius around the base inside which stones never spawn.
    #[inline]
    fn base_exclusion(&self) -> f32 {
        (self.base_radius * 16.0).max(240.0)
    }

    /// Build a complete world: base, obstacles, then a stone field holding
    /// at least `min_stone_quantity` total units.
    pub fn generate_world<R: Rng>(
        &self,
        width: f32,
        height: f32,
        min_stone_quantity: u32,
        rng: &mut R,
    ) -> World {
        let base = self.generate_base(width, height, rng);
        let mut world = World::new(width, height, base);
        world.obstacles = self.generate_obstacles(width, height, &base, rng);
        world.stones = self.generate_stones(width, height, &base, &world.obstacles, min_stone_quantity, rng);
        world
    }

    /// Place the base uniformly inside the central 76% of each axis so it
    /// never hugs a wall.
    pub fn generate_base<R: Rng>(&self, width: f32, height: f32, rng: &mut R) -> Base {
        Base {
            x: width * 0.12 + width * 0.76 * rng.gen::<f32>(),
            y: height * 0.12 + height * 0.76 * rng.gen::<f32>(),
            r: self.base_radius,
        }
    }

    /// Clustered obstacles in three size classes plus a few isolated
    /// extras, all kept clear of the base exclusion zone.
    pub fn generate_obstacles<R: Rng>(
        &self,
        width: f32,
        height: f32,
        base: &Base,
        rng: &mut R,
    ) -> Vec<Rect> {
        let mut obstacles = Vec::new();
        let count = 8 + rng.gen_range(0..6);
        let exclusion = self.base_radius * 4.0;

        let cluster_count = 3 + rng.gen_range(0..3);
        let mut clusters = Vec::with_capacity(cluster_count);
        for _ in 0..cluster_count {
            let mut cx = 100.0 + rng.gen::<f32>() * (width - 200.0).max(1.0);
            let mut cy = 100.0 + rng.gen::<f32>() * (height - 200.0).max(1.0);
            let mut attempts = 0;
            while geometry::distance(cx, cy, base.x, base.y) < exclusion * 2.0 && attempts < 20 {
                cx = 100.0 + rng.gen::<f32>() * (width - 200.0).max(1.0);
                cy = 100.0 + rng.gen::<f32>() * (height - 200.0).max(1.0);
                attempts += 1;
            }
            clusters.push((cx, cy));
        }

        let per_cluster = count / cluster_count;
        let remainder = count % cluster_count;

        for (c, &(cx, cy)) in clusters.iter().enumerate() {
            let cluster_quota = per_cluster + usize::from(c < remainder);

            for _ in 0..cluster_quota {
                let size_class = rng.gen::<f32>();
                let (mut ow, mut oh) = if size_class < 0.3 {
                    (30.0 + rng.gen::<f32>() * 40.0, 30.0 + rng.gen::<f32>() * 40.0)
                } else if size_class < 0.7 {
                    (50.0 + rng.gen::<f32>() * 60.0, 50.0 + rng.gen::<f32>() * 60.0)
                } else {
                    (80.0 + rng.gen::<f32>() * 80.0, 80.0 + rng.gen::<f32>() * 80.0)
                };

                // Stretch some into bars for variety.
                if rng.gen::<f32>() < 0.4 {
                    if rng.gen::<f32>() < 0.5 {
                        ow *= 1.5;
                    } else {
                        oh *= 1.5;
                    }
                }

                let spread_angle = rng.gen_range(0.0..std::f32::consts::TAU);
                let spread = rng.gen::<f32>() * 120.0;
                let ox = geometry::clamp(cx + spread_angle.cos() * spread, 20.0, (width - ow - 20.0).max(20.0));
                let oy = geometry::clamp(cy + spread_angle.sin() * spread, 20.0, (height - oh - 20.0).max(20.0));

                let candidate = Rect { x: ox, y: oy, w: ow, h: oh };
                let (mx, my) = candidate.center();
                let too_close = geometry::distance(mx, my, base.x, base.y) < exclusion;
                let overlaps = obstacles
                    .iter()
                    .any(|o| geometry::rects_overlap_with_margin(&candidate, o, 10.0));

                if !too_close && !overlaps {
                    obstacles.push(candidate);
                }
            }
        }

        // A few isolated pieces away from the clusters.
        let isolated = 2 + rng.gen_range(0..3);
        for _ in 0..isolated {
            let ow = 40.0 + rng.gen::<f32>() * 60.0;
            let oh = 40.0 + rng.gen::<f32>() * 60.0;

            for _ in 0..30 {
                let ox = 50.0 + rng.gen::<f32>() * (width - ow - 100.0).max(1.0);
                let oy = 50.0 + rng.gen::<f32>() * (height - oh - 100.0).max(1.0);
                let candidate = Rect { x: ox, y: oy, w: ow, h: oh };
                let (mx, my) = candidate.center();

                if geometry::distance(mx, my, base.x, base.y) >= exclusion
                    && !obstacles
                        .iter()
                        .any(|o| geometry::rects_overlap_with_margin(&candidate, o, 15.0))
                {
                    obstacles.push(candidate);
                    break;
                }
            }
        }

        obstacles
    }

    /// Stones on a jittered grid, rejected near the base or on obstacles,
    /// then topped up until the field holds `min_total_quantity` units.
    pub fn generate_stones<R: Rng>(
        &self,
        width: f32,
        height: f32,
        base: &Base,
        obstacles: &[Rect],
        min_total_quantity: u32,
        rng: &mut R,
    ) -> Vec<Stone> {
        let mut stones = Vec::new();
        let count = 25 + rng.gen_range(0..11);
        let cols = (count as f32).sqrt().ceil() as usize;
        let rows = (count + cols - 1) / cols;
        let cell_w = width / cols as f32;
        let cell_h = height / rows as f32;
        let min_dist = self.base_exclusion();

        for i in 0..count {
            let col = i % cols;
            let row = i / cols;

            let x = col as f32 * cell_w
                + cell_w / 2.0
                + rng.gen_range(-cell_w * 0.3..=cell_w * 0.3);
            let y = row as f32 * cell_h
                + cell_h / 2.0
                + rng.gen_range(-cell_h * 0.3..=cell_h * 0.3);

            if geometry::distance(x, y, base.x, base.y) < min_dist {
                continue;
            }
            if obstacles.iter().any(|o| geometry::rect_circle_overlap(o, x, y, self.stone_radius)) {
                continue;
            }

            let quantity = 12 + rng.gen_range(0..80);
            let cx = geometry::clamp(x, 40.0, width - 40.0);
            let cy = geometry::clamp(y, 40.0, height - 40.0);
            if geometry::distance(cx, cy, base.x, base.y) < min_dist {
                continue;
            }

            stones.push(Stone {
                x: cx,
                y: cy,
                r: self.stone_radius,
                quantity,
                initial_quantity: quantity,
            });
        }

        // Top up quantities round-robin so the field meets the floor.
        if !stones.is_empty() {
            let mut total: u32 = stones.iter().map(|s| s.quantity).sum();
            let mut idx = 0usize;
            while total < min_total_quantity {
                let slot = idx % stones.len();
                stones[slot].quantity += 1;
                stones[slot].initial_quantity += 1;
                total += 1;
                idx += 1;
            }
        }

        stones
    }

    /// Find a replacement spot for an exhausted stone. Bounded rejection
    /// sampling; `None` means the stone simply stays exhausted this time.
    pub fn respawn_stone<R: Rng>(
        &self,
        width: f32,
        height: f32,
        base: &Base,
        obstacles: &[Rect],
        existing: &[Stone],
        initial_quantity: u32,
        rng: &mut R,
    ) -> Option<Stone> {
        let min_dist = self.base_exclusion();

        for _ in 0..Self::MAX_RESPAWN_ATTEMPTS {
            let x = 40.0 + rng.gen::<f32>() * (width - 80.0).max(1.0);
            let y = 40.0 + rng.gen::<f32>() * (height - 80.0).max(1.0);

            if geometry::distance(x, y, base.x, base.y) < min_dist {
                continue;
            }
            if obstacles.iter().any(|o| geometry::rect_circle_overlap(o, x, y, self.stone_radius)) {
                continue;
            }
            let too_close = existing.iter().any(|s| {
                s.is_live() && geometry::distance(x, y, s.x, s.y) < Self::MIN_STONE_SPACING
            });
            if too_close {
                continue;
            }

            return Some(Stone {
                x,
                y,
                r: self.stone_radius,
                quantity: initial_quantity,
                initial_quantity,
            });
        }

        None
    }
}
