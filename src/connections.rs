//! Proximity connections between particles.
//!
//! Two particles are connected when the distance between their centers is
//! strictly below the threshold. Connections are reported once per unordered
//! pair as `(a, b)` with `a < b`, in ascending `(a, b)` order, which is also
//! the order they are drawn in.
//!
//! The pairwise search is O(n²) and is the reference. The grid search buckets
//! particles into square cells whose side equals the threshold, so only the
//! 3x3 block of cells around a particle can hold partners. It produces the
//! exact same list.

use std::collections::HashMap;

use glam::Vec2;

use crate::config::ConnectionIndex;

/// A connected pair of particles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub distance: f32,
}

impl Connection {
    /// Linear falloff: 1 at distance zero, 0 at the threshold.
    #[inline]
    pub fn strength(&self, threshold: f32) -> f32 {
        1.0 - self.distance / threshold
    }
}

#[inline]
fn distance(p: Vec2, q: Vec2) -> f32 {
    let dx = p.x - q.x;
    let dy = p.y - q.y;
    (dx * dx + dy * dy).sqrt()
}

/// Finds connected pairs, reusing its buffers across frames.
#[derive(Debug, Default)]
pub struct ConnectionFinder {
    index: ConnectionIndex,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl ConnectionFinder {
    pub fn new(index: ConnectionIndex) -> Self {
        Self {
            index,
            cells: HashMap::new(),
        }
    }

    pub fn index(&self) -> ConnectionIndex {
        self.index
    }

    /// Replace `out` with every pair closer than `threshold`.
    pub fn find(&mut self, positions: &[Vec2], threshold: f32, out: &mut Vec<Connection>) {
        out.clear();
        if positions.len() < 2 || !(threshold > 0.0) {
            return;
        }
        match self.index {
            ConnectionIndex::Pairwise => find_pairwise(positions, threshold, out),
            ConnectionIndex::Grid => self.find_grid(positions, threshold, out),
        }
    }

    fn find_grid(&mut self, positions: &[Vec2], threshold: f32, out: &mut Vec<Connection>) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }

        let cell_of = |p: Vec2| {
            (
                (p.x / threshold).floor() as i32,
                (p.y / threshold).floor() as i32,
            )
        };

        for (i, &p) in positions.iter().enumerate() {
            self.cells.entry(cell_of(p)).or_default().push(i);
        }

        for (a, &p) in positions.iter().enumerate() {
            let (cx, cy) = cell_of(p);
            for nx in cx.saturating_sub(1)..=cx.saturating_add(1) {
                for ny in cy.saturating_sub(1)..=cy.saturating_add(1) {
                    let Some(bucket) = self.cells.get(&(nx, ny)) else {
                        continue;
                    };
                    for &b in bucket {
                        if b <= a {
                            continue;
                        }
                        let d = distance(p, positions[b]);
                        if d < threshold {
                            out.push(Connection { a, b, distance: d });
                        }
                    }
                }
            }
        }

        out.sort_unstable_by_key(|c| (c.a, c.b));

        // Drop buckets that stayed empty this frame so the map tracks the
        // currently occupied region only.
        self.cells.retain(|_, bucket| !bucket.is_empty());
    }
}

/// Check every unordered pair.
pub fn find_pairwise(positions: &[Vec2], threshold: f32, out: &mut Vec<Connection>) {
    for (a, &p) in positions.iter().enumerate() {
        for (b, &q) in positions.iter().enumerate().skip(a + 1) {
            let d = distance(p, q);
            if d < threshold {
                out.push(Connection { a, b, distance: d });
            }
        }
    }
}
