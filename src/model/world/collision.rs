use glam::{Vec2, Vec3};

use crate::utils::WorldCoord;

const CONTACT_EPSILON: f32 = 1e-4;

/// Contact between the player body and one block, resolved by moving the
/// player `distance` along `normal`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collision {
    pub coord: WorldCoord,
    /// closest point of the block to the body centre
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    pub liquid: bool,
}

impl Collision {
    pub fn is_floor(&self) -> bool {
        self.normal.y > 0.5
    }

    pub fn is_ceiling(&self) -> bool {
        self.normal.y < -0.5
    }

    pub fn displacement(&self) -> Vec3 {
        self.normal * self.distance
    }
}

/// Player body: a vertical cylinder `size.x` wide and `size.y` tall. The eye
/// sits a quarter of the height below the top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub radius: f32,
    pub height: f32,
}

impl Body {
    pub fn from_size(size: [f32; 3]) -> Self {
        Self { radius: size[0] / 2.0, height: size[1] }
    }

    /// Body centre for an eye position
    pub fn centre(&self, eye: Vec3) -> Vec3 {
        eye - Vec3::Y * (self.height / 4.0)
    }

    /// Every block cell the body may overlap with the eye at `eye`
    pub fn cells(&self, eye: Vec3) -> Vec<WorldCoord> {
        let min_x = (eye.x - self.radius).round() as i32;
        let max_x = (eye.x + self.radius).round() as i32;
        let min_y = (eye.y - self.height * 0.75).round() as i32;
        let max_y = (eye.y + self.height * 0.25).round() as i32;
        let min_z = (eye.z - self.radius).round() as i32;
        let max_z = (eye.z + self.radius).round() as i32;

        let mut cells = Vec::new();
        for x in min_x..=max_x {
            for y in min_y..=max_y {
                for z in min_z..=max_z {
                    cells.push(WorldCoord(x, y, z));
                }
            }
        }
        cells
    }

    /// Overlap between the body and the unit cube at `coord`, separated along
    /// whichever of the vertical or horizontal overlaps is smaller
    pub fn block_collision(&self, eye: Vec3, coord: WorldCoord) -> Option<Collision> {
        let centre = self.centre(eye);
        let cube = coord.as_vec3();
        let point = centre.clamp(cube - Vec3::splat(0.5), cube + Vec3::splat(0.5));
        let delta = point - centre;

        let r = Vec2::new(delta.x, delta.z).length();
        if r > self.radius {
            return None;
        }

        let overlap_y = self.height / 2.0 - delta.y.abs();
        if overlap_y < -CONTACT_EPSILON {
            return None;
        }
        let overlap_xz = self.radius - r;

        let (normal, distance) = if r <= f32::EPSILON {
            // body centre inside the cube's column; push out of the cube entirely
            self.separate_from_inside(centre, cube, delta.y, overlap_y)
        } else if overlap_y < overlap_xz {
            (Vec3::new(0.0, -delta.y.signum(), 0.0), overlap_y)
        } else {
            (Vec3::new(-delta.x, 0.0, -delta.z).normalize(), overlap_xz)
        };

        Some(Collision { coord, point, normal, distance, liquid: false })
    }

    fn separate_from_inside(&self, centre: Vec3, cube: Vec3, dy: f32, overlap_y: f32) -> (Vec3, f32) {
        let offset = centre - cube;

        let horizontal = if offset.x.abs() >= offset.z.abs() {
            let sign = if offset.x < 0.0 { -1.0 } else { 1.0 };
            (Vec3::new(sign, 0.0, 0.0), 0.5 - offset.x.abs() + self.radius)
        } else {
            let sign = if offset.z < 0.0 { -1.0 } else { 1.0 };
            (Vec3::new(0.0, 0.0, sign), 0.5 - offset.z.abs() + self.radius)
        };

        let vertical = if dy != 0.0 {
            (Vec3::new(0.0, -dy.signum(), 0.0), overlap_y)
        } else {
            let sign = if offset.y < 0.0 { -1.0 } else { 1.0 };
            (Vec3::new(0.0, sign, 0.0), self.height / 2.0 + 0.5 - offset.y.abs())
        };

        if vertical.1 < horizontal.1 { vertical } else { horizontal }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> Body {
        Body::from_size([0.6, 1.8, 0.6])
    }

    #[test]
    fn test_cells_cover_body() {
        let cells = body().cells(Vec3::new(0.0, 1.85, 0.0));
        // x, z: round(-0.3)..=round(0.3) = 0; y: round(0.5)..=round(2.3) = 1..=2 (ties away from zero)
        assert!(cells.contains(&WorldCoord(0, 1, 0)));
        assert!(cells.contains(&WorldCoord(0, 2, 0)));
        assert!(cells.iter().all(|c| c.0 == 0 && c.2 == 0));
    }

    #[test]
    fn test_standing_on_block_is_floor_contact() {
        // feet exactly on top of the block at y = 0
        let eye = Vec3::new(0.0, 0.5 + 1.35, 0.0);
        let collision = body().block_collision(eye, WorldCoord(0, 0, 0)).unwrap();
        assert!(collision.is_floor());
        assert!(collision.distance.abs() < 1e-5);
    }

    #[test]
    fn test_sinking_pushes_up() {
        let eye = Vec3::new(0.1, 0.4 + 1.35, -0.1);
        let collision = body().block_collision(eye, WorldCoord(0, 0, 0)).unwrap();
        assert!(collision.is_floor());
        assert!((collision.distance - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_side_contact_pushes_horizontally() {
        // body centred at x = 0.7, block spans x in [-0.5, 0.5]: 0.1 overlap
        let eye = Vec3::new(0.7, 0.45, 0.0);
        let collision = body().block_collision(eye, WorldCoord(0, 0, 0)).unwrap();
        assert!(collision.normal.abs_diff_eq(Vec3::X, 1e-6), "normal {}", collision.normal);
        assert!((collision.distance - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_far_block_does_not_collide() {
        assert!(body().block_collision(Vec3::new(2.0, 0.45, 0.0), WorldCoord(0, 0, 0)).is_none());
        // hovering a tenth above the block
        assert!(body().block_collision(Vec3::new(0.0, 0.6 + 1.35, 0.0), WorldCoord(0, 0, 0)).is_none());
    }

    #[test]
    fn test_inside_block_pushes_to_nearest_face() {
        let eye = Vec3::new(0.1, 0.45, 0.0);
        let collision = body().block_collision(eye, WorldCoord(0, 0, 0)).unwrap();
        assert!(collision.normal.is_finite());
        assert_eq!(collision.normal, Vec3::X);
        assert!((collision.distance - 0.7).abs() < 1e-5);

        let resolved = eye + collision.displacement();
        let after = body().block_collision(resolved, WorldCoord(0, 0, 0));
        assert!(after.map_or(true, |c| c.distance.abs() < 1e-4), "penetration must not grow");
    }
}
