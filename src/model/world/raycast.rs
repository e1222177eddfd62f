use glam::{IVec3, Vec3};

use super::block::Direction;
use crate::utils::WorldCoord;

/// One crossing of a block boundary plane
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayIntersection {
    pub point: Vec3,
    pub distance: f32,
    /// block entered by the crossing
    pub coord: WorldCoord,
    /// face of `coord` the ray enters through (facing the ray origin)
    pub direction: Direction,
    pub normal: IVec3,
}

/// Next block boundary (half-integer) strictly ahead of `p` when moving with `sign`
fn next_boundary(p: f32, sign: f32) -> f32 {
    if sign > 0.0 {
        (p + 0.5).floor() + 0.5
    } else {
        (p - 0.5).ceil() - 0.5
    }
}

/// Every boundary crossing within `depth` steps per axis, ordered by distance
/// from `origin`. Each axis is walked on its own: the first boundary ahead of
/// the origin, then whole-unit steps along that axis.
pub fn world_raycast(origin: Vec3, direction: Vec3, depth: usize) -> Vec<RayIntersection> {
    let mut intersects = Vec::with_capacity(depth * 3);

    for axis in 0..3 {
        let component = direction[axis];
        if component == 0.0 || !component.is_finite() {
            continue;
        }

        let step = direction / component.abs();
        let side_dist = (next_boundary(origin[axis], component.signum()) - origin[axis]).abs();

        let mut point = origin + step * side_dist;
        for _ in 0..depth {
            intersects.push(intersect_info(point, origin, direction, axis));
            point += step;
        }
    }

    intersects.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    intersects
}

fn intersect_info(point: Vec3, origin: Vec3, ray: Vec3, axis: usize) -> RayIntersection {
    let positive = ray[axis] > 0.0;

    let mut coord = point.round();
    // the boundary lies exactly between two blocks; take the one ahead
    coord[axis] = if positive { point[axis].ceil() } else { point[axis].floor() };

    let direction = match (axis, positive) {
        (0, true) => Direction::Left,
        (0, false) => Direction::Right,
        (1, true) => Direction::Down,
        (1, false) => Direction::Up,
        (_, true) => Direction::Back,
        (_, false) => Direction::Front,
    };

    RayIntersection {
        point,
        distance: origin.distance(point),
        coord: WorldCoord(coord.x as i32, coord.y as i32, coord.z as i32),
        direction,
        normal: direction.vector(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_boundary() {
        assert_eq!(next_boundary(0.0, 1.0), 0.5);
        assert_eq!(next_boundary(0.5, 1.0), 1.5);
        assert_eq!(next_boundary(0.0, -1.0), -0.5);
        assert_eq!(next_boundary(-0.5, -1.0), -1.5);
        assert_eq!(next_boundary(2.2, 1.0), 2.5);
        assert_eq!(next_boundary(2.2, -1.0), 1.5);
    }

    #[test]
    fn test_axis_aligned_ray() {
        let hits = world_raycast(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, 6);
        assert_eq!(hits.len(), 6, "only the z axis produces crossings");
        let coords: Vec<i32> = hits.iter().map(|h| h.coord.2).collect();
        assert_eq!(coords, vec![4, 3, 2, 1, 0, -1]);
        assert!(hits.iter().all(|h| h.direction == Direction::Front));
        assert!((hits[0].distance - 0.5).abs() < 1e-6);
        assert_eq!(hits[4].normal, IVec3::Z, "normal faces back towards the origin");
    }

    #[test]
    fn test_sorted_by_distance() {
        let dir = Vec3::new(0.3, -0.5, 0.8).normalize();
        let hits = world_raycast(Vec3::new(0.2, 10.1, -3.4), dir, 20);
        assert_eq!(hits.len(), 60);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_entered_block_is_adjacent_to_crossing() {
        let dir = Vec3::new(-0.6, 0.2, 0.4).normalize();
        for hit in world_raycast(Vec3::new(1.3, 2.7, -0.2), dir, 10) {
            let centre = hit.coord.as_vec3();
            let on_face = centre - hit.normal.as_vec3() * 0.5;
            let axis = (0..3).find(|i| hit.normal[*i] != 0).unwrap();
            assert!(
                (hit.point[axis] - on_face[axis]).abs() < 1e-3,
                "crossing {hit:?} is not on the entered face"
            );
        }
    }

    #[test]
    fn test_zero_direction_has_no_hits() {
        assert!(world_raycast(Vec3::ZERO, Vec3::ZERO, 10).is_empty());
    }
}
