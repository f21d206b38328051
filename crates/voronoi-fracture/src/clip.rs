//! Half-space clipping of whole meshes: cut along a plane, then close the border.

use std::collections::{HashMap, HashSet};

use nalgebra::Point3;
use tracing::{trace, warn};

use crate::{Cuttable, Mesh, Plane, Polygon};

/// Summary of a cut-and-cap edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClipSummary {
    /// Polygons wholly removed from the positive side.
    pub removed: usize,
    /// Polygons split by the plane (their back part was kept).
    pub split: usize,
    /// Cap polygons added to close the cut.
    pub caps: usize,
}

/// Border vertices closer than this, relative to their magnitude, are welded
/// even when the plane epsilon is smaller.
const RELATIVE_WELD: f64 = 64.0 * f64::EPSILON;

/// Assigns one index to all border vertices within a tolerance of each other.
///
/// The same geometric point can be computed from two different polygons and
/// land a few ulps apart; welding lets those copies close the same loop.
struct Welder {
    tolerance: f64,
    points: Vec<Point3<f64>>,
}

impl Welder {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            points: Vec::new(),
        }
    }

    fn id(&mut self, p: &Point3<f64>) -> usize {
        let tolerance = self.tolerance.max(RELATIVE_WELD * p.coords.amax());
        if let Some(i) = self.points.iter().position(|q| (q - p).norm() <= tolerance) {
            return i;
        }
        self.points.push(*p);
        self.points.len() - 1
    }
}

impl Mesh {
    /// Deletes everything on the positive side of `plane`.
    ///
    /// Polygons spanning the plane keep their back part. The result is open
    /// along the plane; see [`Mesh::close_border`].
    pub fn cut_along_plane(&mut self, plane: &Plane, epsilon: f64) -> ClipSummary {
        let mut summary = ClipSummary::default();
        let mut kept = Vec::with_capacity(self.polygon_count() + 1);

        for polygon in self.polygons() {
            let cut = polygon.cut(plane, epsilon);
            match (cut.front.is_some(), cut.back) {
                (false, Some(back)) => kept.push(back),
                (true, Some(back)) => {
                    summary.split += 1;
                    kept.push(back);
                }
                (_, None) => summary.removed += 1,
            }
        }

        self.replace_polygons(kept);
        summary
    }

    /// Closes open borders lying on `plane` with new faces.
    ///
    /// A border is a directed edge `(a, b)` with no matching `(b, a)`. Only
    /// borders whose endpoints are within `epsilon` of the plane are closed,
    /// and endpoints within `epsilon` of each other count as one vertex.
    /// Each closed loop becomes one polygon wound against the border, which
    /// orients the cap along the plane normal for an outward-wound mesh.
    /// Loops that enclose no more than `epsilon` of area are dropped.
    /// Returns the number of caps added.
    pub fn close_border(&mut self, plane: &Plane, epsilon: f64) -> usize {
        let mut welder = Welder::new(epsilon);
        let mut on_plane_edges = Vec::new();
        for polygon in self.polygons() {
            for (a, b) in polygon.edges() {
                let on_plane = plane.signed_distance(a).abs() <= epsilon
                    && plane.signed_distance(b).abs() <= epsilon;
                if !on_plane {
                    continue;
                }
                let (ia, ib) = (welder.id(a), welder.id(b));
                if ia != ib {
                    on_plane_edges.push((ia, ib));
                }
            }
        }

        // Cap edges run opposite to the border edges they close
        let directed: HashSet<(usize, usize)> = on_plane_edges.iter().copied().collect();
        let mut outgoing: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut cap_edge_count = 0;
        for &(ia, ib) in &on_plane_edges {
            if directed.contains(&(ib, ia)) {
                continue;
            }
            outgoing.entry(ib).or_default().push(ia);
            cap_edge_count += 1;
        }

        if cap_edge_count == 0 {
            return 0;
        }

        let mut caps = 0;
        for chain in knit_loops(&mut outgoing) {
            let vertices = chain.iter().map(|&i| welder.points[i]).collect();
            match Polygon::try_new(vertices, epsilon) {
                Some(cap) => {
                    self.push(cap);
                    caps += 1;
                }
                None => trace!(vertices = chain.len(), "Skipping degenerate border loop"),
            }
        }

        if caps == 0 {
            warn!(
                border_edges = cap_edge_count,
                "Open border on cut plane could not be closed"
            );
        }
        caps
    }

    /// Cuts along the plane and closes the resulting border in one step.
    ///
    /// The border is only closed when more than two polygons survive the cut;
    /// fewer cannot bound a solid.
    pub fn clip_and_cap(&mut self, plane: &Plane, epsilon: f64) -> ClipSummary {
        let mut summary = self.cut_along_plane(plane, epsilon);
        if self.polygon_count() > 2 {
            summary.caps = self.close_border(plane, epsilon);
        }
        summary
    }
}

/// Walks directed cap edges into closed loops.
///
/// Open chains (which only appear for non-manifold input) are dropped.
fn knit_loops(outgoing: &mut HashMap<usize, Vec<usize>>) -> Vec<Vec<usize>> {
    let mut loops = Vec::new();
    let mut starts: Vec<usize> = outgoing.keys().copied().collect();
    starts.sort_unstable();

    for start in starts {
        while let Some(first) = outgoing.get_mut(&start).and_then(Vec::pop) {
            let mut chain = vec![start];
            let mut current = first;
            let mut closed = false;

            // Each step consumes one edge, so the walk terminates
            while let Some(next) = outgoing.get_mut(&current).and_then(Vec::pop) {
                chain.push(current);
                if next == start {
                    closed = true;
                    break;
                }
                current = next;
            }

            if closed {
                loops.push(chain);
            }
        }
    }

    loops
}
