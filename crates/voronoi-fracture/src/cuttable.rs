//! Polygon cutting by a plane.

use nalgebra::Point3;

use crate::{Classification, Plane, PlaneSide, Polygon};

/// Result of cutting a piece of geometry with a plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Cut {
    /// Part in front of the plane (the side a clip discards)
    pub front: Option<Polygon>,
    /// Part behind the plane (the side a clip keeps)
    pub back: Option<Polygon>,
}

/// Trait for geometry that can be cut by a plane.
pub trait Cuttable {
    /// Cuts the geometry by a plane.
    ///
    /// # Return values by classification
    ///
    /// - **Front**: only `front` is set - entire geometry is in front
    /// - **Back**: only `back` is set - entire geometry is behind
    /// - **Coplanar**: assigned to `back` when it faces along the plane
    ///   normal (it bounds the solid behind the plane), to `front` otherwise
    /// - **Spanning**: both are set - split into two pieces
    fn cut(&self, plane: &Plane, epsilon: f64) -> Cut;
}

impl Cuttable for Polygon {
    fn cut(&self, plane: &Plane, epsilon: f64) -> Cut {
        match self.classify(plane, epsilon) {
            Classification::Front => Cut {
                front: Some(self.clone()),
                back: None,
            },
            Classification::Back => Cut {
                front: None,
                back: Some(self.clone()),
            },
            Classification::Coplanar => {
                if crate::polygon::faces_same_direction(self, plane) {
                    Cut {
                        front: None,
                        back: Some(self.clone()),
                    }
                } else {
                    Cut {
                        front: Some(self.clone()),
                        back: None,
                    }
                }
            }
            Classification::Spanning => split_polygon(self, plane, epsilon),
        }
    }
}

/// Splits a spanning polygon into front and back parts.
///
/// Uses a variant of the Sutherland-Hodgman algorithm:
/// walks the polygon edges and builds two vertex lists,
/// adding intersection points when edges cross the plane.
fn split_polygon(polygon: &Polygon, plane: &Plane, epsilon: f64) -> Cut {
    let vertices = polygon.vertices();
    let n = vertices.len();

    let mut front_verts = Vec::with_capacity(n + 1);
    let mut back_verts = Vec::with_capacity(n + 1);

    let sides: Vec<PlaneSide> = vertices
        .iter()
        .map(|v| plane.classify_point_with_epsilon(v, epsilon))
        .collect();

    for i in 0..n {
        let current = vertices[i];
        let current_side = sides[i];
        let next_idx = (i + 1) % n;
        let next_side = sides[next_idx];

        match current_side {
            PlaneSide::Front => front_verts.push(current),
            PlaneSide::Back => back_verts.push(current),
            PlaneSide::OnPlane => {
                // On-plane vertices go to both sides
                front_verts.push(current);
                back_verts.push(current);
            }
        }

        let crosses = matches!(
            (current_side, next_side),
            (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
        );

        if crosses {
            let intersection = edge_intersection(plane, &current, &vertices[next_idx]);
            front_verts.push(intersection);
            back_verts.push(intersection);
        }
    }

    let front = (front_verts.len() >= 3).then(|| Polygon::new(front_verts));
    let back = (back_verts.len() >= 3).then(|| Polygon::new(back_verts));

    Cut { front, back }
}

/// Intersects the edge `a`-`b` with the plane, independent of edge direction.
///
/// Both faces sharing an edge walk it in opposite directions; evaluating from
/// the lexicographically smaller endpoint makes them produce bit-identical
/// points, which keeps the cut mesh watertight under exact edge matching.
fn edge_intersection(plane: &Plane, a: &Point3<f64>, b: &Point3<f64>) -> Point3<f64> {
    let (lo, hi) = if lexicographic_lt(a, b) { (a, b) } else { (b, a) };
    let d_lo = plane.signed_distance(lo);
    let d_hi = plane.signed_distance(hi);
    let t = d_lo / (d_lo - d_hi);
    lo + (hi - lo) * t
}

fn lexicographic_lt(a: &Point3<f64>, b: &Point3<f64>) -> bool {
    (a.x, a.y, a.z) < (b.x, b.y, b.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PLANE_EPSILON;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn make_square(z: f64) -> Polygon {
        Polygon::new(vec![
            Point3::new(-1.0, -1.0, z),
            Point3::new(1.0, -1.0, z),
            Point3::new(1.0, 1.0, z),
            Point3::new(-1.0, 1.0, z),
        ])
    }

    #[test]
    fn cut_front_and_back_pass_through() {
        let square = make_square(0.0);
        let behind = Plane::new(Point3::new(0.0, 0.0, 5.0), Vector3::z()).unwrap();
        let cut = square.cut(&behind, PLANE_EPSILON);
        assert!(cut.front.is_none());
        assert_eq!(cut.back.as_ref(), Some(&square));

        let ahead = Plane::new(Point3::new(0.0, 0.0, -5.0), Vector3::z()).unwrap();
        let cut = square.cut(&ahead, PLANE_EPSILON);
        assert_eq!(cut.front.as_ref(), Some(&square));
        assert!(cut.back.is_none());
    }

    #[test]
    fn coplanar_assignment_depends_on_facing() {
        let square = make_square(0.0);
        let along = Plane::new(Point3::origin(), Vector3::z()).unwrap();
        // Facing along the normal: the face bounds the kept solid
        assert!(square.cut(&along, PLANE_EPSILON).back.is_some());
        assert!(square.cut(&along.flipped(), PLANE_EPSILON).front.is_some());
    }

    #[test]
    fn spanning_square_splits_in_half() {
        let square = make_square(0.0);
        let plane = Plane::new(Point3::new(0.0, 0.0, 0.0), Vector3::x()).unwrap();
        let cut = square.cut(&plane, PLANE_EPSILON);

        let front = cut.front.unwrap();
        let back = cut.back.unwrap();
        assert_eq!(front.len(), 4);
        assert_eq!(back.len(), 4);
        assert_relative_eq!(front.area(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(back.area(), 2.0, epsilon = 1e-12);
        assert!(back.vertices().iter().all(|v| v.x <= 1e-12));

        // Winding is preserved on both halves
        assert!(front.unit_normal().unwrap().z > 0.0);
        assert!(back.unit_normal().unwrap().z > 0.0);
    }

    #[test]
    fn split_through_vertex_shares_it() {
        let tri = Polygon::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, -1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ]);
        // Plane y = 0 passes through the first vertex
        let plane = Plane::new(Point3::origin(), Vector3::y()).unwrap();
        let cut = tri.cut(&plane, PLANE_EPSILON);

        let front = cut.front.unwrap();
        let back = cut.back.unwrap();
        assert_eq!(front.len(), 3);
        assert_eq!(back.len(), 3);
        assert_relative_eq!(front.area() + back.area(), tri.area(), epsilon = 1e-12);
    }

    #[test]
    fn opposite_edges_produce_identical_points() {
        let plane = Plane::new(Point3::new(0.3, 0.0, 0.0), Vector3::new(1.0, 0.2, 0.1)).unwrap();
        let a = Point3::new(-0.7, 0.13, 0.4);
        let b = Point3::new(0.9, -0.2, 0.31);
        assert_eq!(edge_intersection(&plane, &a, &b), edge_intersection(&plane, &b, &a));
        assert!(plane.signed_distance(&edge_intersection(&plane, &a, &b)).abs() < 1e-12);
    }
}
