//! Point quadtree with per-cell centroids, used for Barnes–Hut repulsion.

use crate::shared::Point;

/// Coincident points stop splitting at this depth and share a leaf.
const MAX_DEPTH: u32 = 32;

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Leaf(Vec<usize>),
    Branch(Vec<usize>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    pub x0: f64,
    pub y0: f64,
    /// Side length of this square cell.
    pub size: f64,
    /// Number of points under this cell.
    pub count: usize,
    /// Mean position of the points under this cell.
    pub centroid: Point,
    cell: Cell,
}

impl Quad {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x <= self.x0 + self.size && p.y >= self.y0 && p.y <= self.y0 + self.size
    }

    /// Point indices held directly by a leaf; `None` for a branch.
    pub fn members(&self) -> Option<&[usize]> {
        match &self.cell {
            Cell::Leaf(members) => Some(members),
            Cell::Branch(_) => None,
        }
    }

    /// Child cell ids of a branch; empty for a leaf.
    pub fn children(&self) -> &[usize] {
        match &self.cell {
            Cell::Leaf(_) => &[],
            Cell::Branch(children) => children,
        }
    }
}

/// Arena of cells; cell `0` is the root when the tree is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuadTree {
    quads: Vec<Quad>,
}

impl QuadTree {
    pub fn build(points: &[Point]) -> Self {
        let mut tree = Self::default();
        if points.is_empty() {
            return tree;
        }

        let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
        let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points.iter().filter(|p| p.x.is_finite() && p.y.is_finite()) {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        if !x0.is_finite() {
            (x0, y0, x1, y1) = (0.0, 0.0, 0.0, 0.0);
        }

        let size = (x1 - x0).max(y1 - y0);
        let indices = (0..points.len()).collect();
        tree.insert(points, indices, x0, y0, size, 0);
        tree
    }

    pub fn root(&self) -> Option<&Quad> {
        self.quads.first()
    }

    pub fn get(&self, id: usize) -> &Quad {
        &self.quads[id]
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    fn insert(
        &mut self,
        points: &[Point],
        indices: Vec<usize>,
        x0: f64,
        y0: f64,
        size: f64,
        depth: u32,
    ) -> usize {
        let count = indices.len();
        let (sx, sy) = indices
            .iter()
            .fold((0.0, 0.0), |(sx, sy), &i| (sx + points[i].x, sy + points[i].y));
        let centroid = Point::new(sx / count as f64, sy / count as f64);

        let id = self.quads.len();
        self.quads.push(Quad {
            x0,
            y0,
            size,
            count,
            centroid,
            cell: Cell::Leaf(Vec::new()),
        });

        if count <= 1 || depth >= MAX_DEPTH || !size.is_finite() || size <= 0.0 {
            self.quads[id].cell = Cell::Leaf(indices);
            return id;
        }

        let half = size / 2.0;
        let (mx, my) = (x0 + half, y0 + half);
        let mut buckets: [Vec<usize>; 4] = Default::default();
        for i in indices {
            let p = points[i];
            let q = usize::from(p.x >= mx) | (usize::from(p.y >= my) << 1);
            buckets[q].push(i);
        }

        let mut children = Vec::with_capacity(4);
        for (q, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            let cx = if q & 1 == 1 { mx } else { x0 };
            let cy = if q & 2 == 2 { my } else { y0 };
            children.push(self.insert(points, bucket, cx, cy, half, depth + 1));
        }
        self.quads[id].cell = Cell::Branch(children);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_centroid_and_count() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
        ];
        let tree = QuadTree::build(&pts);
        let root = tree.root().unwrap();
        assert_eq!(root.count, 4);
        assert_eq!(root.centroid, Point::new(5.0, 5.0));
        assert_eq!(root.size, 10.0);
        assert_eq!(root.children().len(), 4);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_every_point_in_exactly_one_leaf() {
        let pts: Vec<Point> = (0..50)
            .map(|i| Point::new((i * 37 % 101) as f64, (i * 53 % 97) as f64))
            .collect();
        let tree = QuadTree::build(&pts);

        let mut seen = vec![0; pts.len()];
        for id in 0..tree.len() {
            if let Some(members) = tree.get(id).members() {
                for &i in members {
                    seen[i] += 1;
                    assert!(tree.get(id).contains(pts[i]));
                }
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn test_coincident_points_share_a_leaf() {
        let pts = [Point::new(3.0, 3.0); 3];
        let tree = QuadTree::build(&pts);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root().unwrap().members(), Some(&[0, 1, 2][..]));
    }

    #[test]
    fn test_empty() {
        assert!(QuadTree::build(&[]).is_empty());
    }
}
