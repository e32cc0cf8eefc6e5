//! The four forces applied each tick. Each adds to body velocities in place,
//! scaled by the current alpha.

use std::collections::HashMap;

use super::quadtree::QuadTree;
use super::Body;
use crate::shared::Point;
use rand::Rng;

/// A link between two body indices with its precomputed strength and bias.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub source: usize,
    pub target: usize,
    /// `1 / min(degree(source), degree(target))`.
    pub strength: f64,
    /// Share of the correction applied to the target:
    /// `degree(source) / (degree(source) + degree(target))`.
    pub bias: f64,
}

impl Spring {
    /// Build springs from index pairs, weighting by node degree.
    ///
    /// Self-links are dropped: they exert no force.
    pub fn from_pairs(pairs: &[(usize, usize)], node_count: usize) -> Vec<Spring> {
        let mut degree = vec![0u32; node_count];
        for &(s, t) in pairs {
            degree[s] += 1;
            degree[t] += 1;
        }

        pairs
            .iter()
            .filter(|(s, t)| s != t)
            .map(|&(source, target)| {
                let ds = degree[source] as f64;
                let dt = degree[target] as f64;
                Spring {
                    source,
                    target,
                    strength: 1.0 / ds.min(dt),
                    bias: ds / (ds + dt),
                }
            })
            .collect()
    }
}

/// Tiny random offset breaking exact coincidence between bodies.
pub fn jiggle<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    (rng.gen::<f64>() - 0.5) * 1e-6
}

fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert!(i != j);
    if i < j {
        let (head, tail) = bodies.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = bodies.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

/// Pull each linked pair toward `distance`, using next-tick positions.
pub fn apply_links<R: Rng + ?Sized>(
    bodies: &mut [Body],
    springs: &[Spring],
    distance: f64,
    alpha: f64,
    rng: &mut R,
) {
    for spring in springs {
        let (source, target) = pair_mut(bodies, spring.source, spring.target);

        let mut x = target.x + target.vx - source.x - source.vx;
        let mut y = target.y + target.vy - source.y - source.vy;
        if x == 0.0 {
            x = jiggle(rng);
        }
        if y == 0.0 {
            y = jiggle(rng);
        }

        let len = (x * x + y * y).sqrt();
        let k = (len - distance) / len * alpha * spring.strength;
        x *= k;
        y *= k;

        target.vx -= x * spring.bias;
        target.vy -= y * spring.bias;
        source.vx += x * (1.0 - spring.bias);
        source.vy += y * (1.0 - spring.bias);
    }
}

/// Repulsion (negative `charge`) with `1/d` falloff, approximated with a
/// Barnes–Hut quadtree.
///
/// A cell whose side is small relative to its distance (`size / d < theta`)
/// acts as one body at its centroid. `theta = 0` computes every pair exactly.
pub fn apply_many_body<R: Rng + ?Sized>(
    bodies: &mut [Body],
    charge: f64,
    distance_min: f64,
    theta: f64,
    alpha: f64,
    rng: &mut R,
) {
    let points: Vec<Point> = bodies.iter().map(Body::position).collect();
    let tree = QuadTree::build(&points);
    if tree.is_empty() {
        return;
    }

    let min2 = distance_min * distance_min;
    let theta2 = theta * theta;
    let mut stack = Vec::new();

    for (i, body) in bodies.iter_mut().enumerate() {
        let p = points[i];
        stack.push(0);

        while let Some(id) = stack.pop() {
            let quad = tree.get(id);

            if let Some(members) = quad.members() {
                for &j in members.iter().filter(|&&j| j != i) {
                    let (dvx, dvy) = repel(p, points[j], charge, min2, alpha, rng);
                    body.vx += dvx;
                    body.vy += dvy;
                }
                continue;
            }

            let dx = quad.centroid.x - p.x;
            let dy = quad.centroid.y - p.y;
            let far = quad.size * quad.size < theta2 * (dx * dx + dy * dy);
            if far && !quad.contains(p) {
                let weight = charge * quad.count as f64;
                let (dvx, dvy) = repel(p, quad.centroid, weight, min2, alpha, rng);
                body.vx += dvx;
                body.vy += dvy;
            } else {
                stack.extend_from_slice(quad.children());
            }
        }
    }
}

/// Velocity change on a body at `from` due to `charge` at `to`.
fn repel<R: Rng + ?Sized>(
    from: Point,
    to: Point,
    charge: f64,
    min2: f64,
    alpha: f64,
    rng: &mut R,
) -> (f64, f64) {
    let mut x = to.x - from.x;
    let mut y = to.y - from.y;
    if x == 0.0 {
        x = jiggle(rng);
    }
    if y == 0.0 {
        y = jiggle(rng);
    }

    let mut l = x * x + y * y;
    if l < min2 {
        l = (min2 * l).sqrt();
    }
    let w = charge * alpha / l;
    (x * w, y * w)
}

/// Weak pull of every body toward `center`.
pub fn apply_center(bodies: &mut [Body], center: Point, strength: f64, alpha: f64) {
    for body in bodies.iter_mut() {
        body.vx += (center.x - body.x) * strength * alpha;
        body.vy += (center.y - body.y) * strength * alpha;
    }
}

/// Push overlapping bodies apart; `padding` is added to each radius.
///
/// Relaxed `iterations` times rather than solved exactly. Smaller bodies
/// take the larger share of each push. Candidates come from a uniform grid
/// whose cells are as wide as the largest possible overlap, so only the
/// surrounding 3×3 cells are searched.
pub fn apply_collide<R: Rng + ?Sized>(
    bodies: &mut [Body],
    padding: f64,
    strength: f64,
    iterations: usize,
    rng: &mut R,
) {
    let max_radius = bodies.iter().map(|b| b.radius).fold(0.0, f64::max);
    let cell = 2.0 * (max_radius + padding);
    if !(cell.is_finite() && cell > 0.0) {
        return;
    }

    let mut candidates = Vec::new();
    for _ in 0..iterations {
        let grid = CollideGrid::build(bodies, cell);

        for i in 0..bodies.len() {
            let (xi, yi, ri) = {
                let b = &bodies[i];
                (b.x + b.vx, b.y + b.vy, b.radius + padding)
            };
            let ri2 = ri * ri;

            grid.neighbours(xi, yi, i, &mut candidates);
            for &j in &candidates {
                let (a, b) = pair_mut(bodies, i, j);
                let rj = b.radius + padding;
                let r = ri + rj;

                let mut x = xi - (b.x + b.vx);
                let mut y = yi - (b.y + b.vy);
                let l2 = x * x + y * y;
                if l2 >= r * r {
                    continue;
                }

                if x == 0.0 {
                    x = jiggle(rng);
                }
                if y == 0.0 {
                    y = jiggle(rng);
                }
                let l = (x * x + y * y).sqrt();
                let k = (r - l) / l * strength;
                x *= k;
                y *= k;

                let rj2 = rj * rj;
                let share = rj2 / (ri2 + rj2);
                a.vx += x * share;
                a.vy += y * share;
                b.vx -= x * (1.0 - share);
                b.vy -= y * (1.0 - share);
            }
        }
    }
}

/// Body indices bucketed by the cell of their next-tick position.
struct CollideGrid {
    cell: f64,
    buckets: HashMap<(i64, i64), Vec<usize>>,
}

impl CollideGrid {
    fn build(bodies: &[Body], cell: f64) -> Self {
        let mut buckets: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (i, b) in bodies.iter().enumerate() {
            buckets
                .entry(Self::key(b.x + b.vx, b.y + b.vy, cell))
                .or_default()
                .push(i);
        }
        Self { cell, buckets }
    }

    fn key(x: f64, y: f64, cell: f64) -> (i64, i64) {
        ((x / cell).floor() as i64, (y / cell).floor() as i64)
    }

    /// Indices greater than `i` in the 3×3 cells around `(x, y)`, ascending.
    fn neighbours(&self, x: f64, y: f64, i: usize, out: &mut Vec<usize>) {
        out.clear();
        let (cx, cy) = Self::key(x, y, self.cell);
        for gx in cx.saturating_sub(1)..=cx.saturating_add(1) {
            for gy in cy.saturating_sub(1)..=cy.saturating_add(1) {
                if let Some(bucket) = self.buckets.get(&(gx, gy)) {
                    out.extend(bucket.iter().copied().filter(|&j| j > i));
                }
            }
        }
        out.sort_unstable();
    }
}
