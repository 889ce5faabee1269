//! Ray-cast sensing: turns world geometry into the normalized input
//! vector the genome consumes, and maintains the agent's last-seen memory.

use crate::agent::{Agent, AgentState};
use crate::geometry;
use crate::world::World;

/// One processed ray.
#[derive(Clone, Copy, Debug)]
pub struct SensorReading {
    /// Absolute ray angle (heading + evolved offset)
    pub angle: f32,
    /// Distance at which the ray terminated (obstacle, target or range)
    pub end_distance: f32,
    /// `1 - end/range`: high when something blocks the ray early
    pub proximity: f32,
    /// `1 - t/range` for the nearest live stone hit, else 0
    pub stone_signal: f32,
    /// `1 - t/range` for the base hit, else 0
    pub base_signal: f32,
}

/// Cast all rays for one agent, updating its last-seen memory as a side
/// effect. Stones and the base only register when hit strictly before any
/// obstacle or world boundary along the ray.
pub fn sense(agent: &mut Agent, world: &World, boundary_margin: f32) -> Vec<SensorReading> {
    let range = agent.genome.sensor_range;
    let mut readings = Vec::with_capacity(agent.genome.sensor_angles.len());

    for i in 0..agent.genome.sensor_angles.len() {
        let angle = agent.heading + agent.genome.sensor_angles[i];
        let dx = angle.cos();
        let dy = angle.sin();

        let t_obstacle = obstacle_distance(world, agent.x, agent.y, dx, dy, range, boundary_margin);
        let (t_stone, stone_idx) = nearest_stone_hit(world, agent.x, agent.y, dx, dy, range, t_obstacle);
        let t_base = base_hit(world, agent.x, agent.y, dx, dy, range, t_obstacle);

        update_memory(agent, world, stone_idx, t_base);

        let end = t_obstacle.min(t_stone).min(t_base).min(range);
        readings.push(SensorReading {
            angle,
            end_distance: end,
            proximity: 1.0 - geometry::clamp(end / range, 0.0, 1.0),
            stone_signal: if t_stone.is_finite() { 1.0 - t_stone / range } else { 0.0 },
            base_signal: if t_base.is_finite() { 1.0 - t_base / range } else { 0.0 },
        });
    }

    readings
}

/// Pack sensor readings plus internal state into the network input layout:
/// 3 values per ray, last-seen angle/distance, carry flag, state one-hot.
pub fn collect_inputs(agent: &Agent, readings: &[SensorReading]) -> Vec<f32> {
    let mut inputs = Vec::with_capacity(3 * readings.len() + 6);

    for r in readings {
        inputs.push(r.proximity);
        inputs.push(r.stone_signal);
        inputs.push(r.base_signal);
    }

    inputs.push(match agent.last_seen.angle {
        Some(a) => geometry::clamp(a / std::f32::consts::PI, -1.0, 1.0),
        None => 0.0,
    });
    inputs.push(match agent.last_seen.dist {
        Some(d) => geometry::clamp(1.0 - d, 0.0, 1.0),
        None => 0.0,
    });
    inputs.push(if agent.is_carrying() { 1.0 } else { 0.0 });
    inputs.push(if agent.state == AgentState::Seek { 1.0 } else { 0.0 });
    inputs.push(if agent.state == AgentState::Mining { 1.0 } else { 0.0 });
    inputs.push(if agent.state == AgentState::Carrying { 1.0 } else { 0.0 });

    inputs
}

/// March along the ray until it leaves the playable area or enters an
/// obstacle. Coarse fixed-step sampling; obstacles are large relative to
/// the step.
fn obstacle_distance(world: &World, x: f32, y: f32, dx: f32, dy: f32, range: f32, margin: f32) -> f32 {
    let mut t = 4.0f32;
    while t <= range {
        let sx = x + dx * t;
        let sy = y + dy * t;
        if sx < margin || sy < margin || sx > world.width - margin || sy > world.height - margin {
            return t;
        }
        if world.obstacles.iter().any(|ob| geometry::point_in_rect(sx, sy, ob)) {
            return t;
        }
        t += 5.0;
    }
    f32::INFINITY
}

/// Nearest live stone intersected strictly before the obstacle hit.
/// Smallest positive parametric distance wins the tie-break.
fn nearest_stone_hit(
    world: &World,
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
    range: f32,
    t_obstacle: f32,
) -> (f32, Option<usize>) {
    let mut best = f32::INFINITY;
    let mut best_idx = None;

    for (i, s) in world.stones.iter().enumerate() {
        if !s.is_live() {
            continue;
        }
        if let Some(t) = geometry::ray_circle_intersect(x, y, dx, dy, s.x, s.y, s.r) {
            if t >= 0.0 && t <= range && t < t_obstacle && t < best {
                best = t;
                best_idx = Some(i);
            }
        }
    }

    (best, best_idx)
}

fn base_hit(world: &World, x: f32, y: f32, dx: f32, dy: f32, range: f32, t_obstacle: f32) -> f32 {
    match geometry::ray_circle_intersect(x, y, dx, dy, world.base.x, world.base.y, world.base.r) {
        Some(t) if t >= 0.0 && t <= range && t < t_obstacle => t,
        _ => f32::INFINITY,
    }
}

/// Remember the freshest target: a stone hit on this ray wins over the
/// base; the base only registers when no stone was seen.
fn update_memory(agent: &mut Agent, world: &World, stone_idx: Option<usize>, t_base: f32) {
    let diagonal = world.diagonal();

    if let Some(i) = stone_idx {
        let s = &world.stones[i];
        agent.last_seen.angle = Some((s.y - agent.y).atan2(s.x - agent.x) - agent.heading);
        agent.last_seen.dist = Some(geometry::clamp(
            geometry::distance(agent.x, agent.y, s.x, s.y) / diagonal,
            0.0,
            1.0,
        ));
    } else if t_base.is_finite() {
        agent.last_seen.angle =
            Some((world.base.y - agent.y).atan2(world.base.x - agent.x) - agent.heading);
        agent.last_seen.dist = Some(geometry::clamp(
            world.distance_to_base(agent.x, agent.y) / diagonal,
            0.0,
            1.0,
        ));
    }
}
