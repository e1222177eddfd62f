use glam::{Quat, Vec3};
use tracing::trace;

use super::input::MovementIntent;
use crate::config::PlayerConfig;
use crate::model::world::World;
use crate::model::Player;

/// Handles player physics (gravity, damping, jumping, swimming, collision)
pub struct PhysicsSystem {
    config: PlayerConfig,
}

impl PhysicsSystem {
    pub fn new(config: PlayerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Advances the player by one fixed step of `dt` seconds
    pub fn step(&self, player: &mut Player, world: &World, intent: &MovementIntent, dt: f32) {
        let c = &self.config;
        let run = if intent.run { c.run_multiplier } else { 1.0 };

        // Input impulse, relative to where the camera faces
        if intent.direction != Vec3::ZERO {
            let direction = Quat::from_rotation_y(player.camera.yaw) * intent.direction;
            player.velocity += direction.normalize_or_zero() * (dt * c.move_speed * run);
        }

        if intent.jump && player.jump_delay <= 0.0 {
            if player.swimming {
                player.velocity.y += c.swim_jump_force;
                player.jumpable = false;
                player.jump_delay = c.jump_delay;
            } else if player.jumpable {
                player.velocity.y += c.jump_force;
                player.jumpable = false;
                player.jump_delay = c.jump_delay;
            }
        }

        let mut max_speed = if intent.run { c.max_run_speed } else { c.max_speed };
        if player.flying {
            max_speed *= c.fly_speed_modifier;
        }

        // Vertical speed is governed by gravity alone unless flying
        let mut vy = 0.0;
        if !player.flying {
            vy = player.velocity.y;
            player.velocity.y = 0.0;
            vy = if player.swimming {
                (vy - c.gravity * 0.5 * dt).max(-c.max_swim_fall_speed)
            } else {
                (vy - c.gravity * dt).max(-c.max_fall_speed)
            };
        }

        let damping = if player.swimming { c.swim_damping } else { c.damping };
        player.velocity *= damping.powf(dt);
        player.velocity = player.velocity.clamp_length_max(max_speed);
        if player.velocity.length() < c.rest_threshold {
            player.velocity = Vec3::ZERO;
        }

        if !player.flying {
            player.velocity.y = vy;
        }
        if player.velocity.y > 0.0 {
            player.jumpable = false;
        }

        let mut step = player.velocity * dt;
        if player.swimming {
            step *= c.swim_speed;
        }

        let mut in_liquid = false;
        if !player.flying {
            let eye = player.position();
            let contacts = world.check_collision(eye + step, &player.body);
            for contact in contacts {
                if contact.liquid {
                    in_liquid = true;
                    continue;
                }
                // earlier contacts may already have pushed the body clear
                let Some(collision) = player.body.block_collision(eye + step, contact.coord) else {
                    continue;
                };
                if collision.normal.y > 0.0 && player.velocity.y < 0.0 {
                    player.velocity.y = 0.0;
                    player.jumpable = true;
                } else if collision.normal.y < 0.0 && player.velocity.y > 0.0 {
                    player.velocity.y = 0.0;
                }
                step += collision.displacement();
            }
        }

        player.set_position(player.position() + step);
        if player.swimming != in_liquid {
            trace!("swimming: {}", in_liquid);
        }
        player.swimming = in_liquid;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::model::world::{ids, MaterialTable};
    use crate::utils::WorldCoord;

    const DT: f32 = 1.0 / 120.0;

    /// Stone at y = 0..3, so the ground surface is y = 2.5
    fn flat_world() -> World {
        let config = WorldConfig { world_size: 9, map_height: 16, chunk_size: 4, ..Default::default() };
        let mut world = World::new(&config, MaterialTable::default()).unwrap();
        for x in -4..=4 {
            for z in -4..=4 {
                for y in 0..3 {
                    world.set_block(WorldCoord(x, y, z), ids::STONE);
                }
            }
        }
        world
    }

    fn walker(position: Vec3) -> Player {
        let config = PlayerConfig { start_flying: false, ..Default::default() };
        let mut player = Player::new(&config, 800, 600);
        player.set_position(position);
        player
    }

    fn run(physics: &PhysicsSystem, player: &mut Player, world: &World, intent: MovementIntent, steps: usize) {
        for _ in 0..steps {
            physics.step(player, world, &intent, DT);
        }
    }

    #[test]
    fn test_falls_and_lands() {
        let world = flat_world();
        let physics = PhysicsSystem::new(PlayerConfig::default());
        let mut player = walker(Vec3::new(0.2, 6.0, -0.1));

        run(&physics, &mut player, &world, MovementIntent::default(), 240);

        let standing_eye = 2.5 + 1.8 * 0.75;
        assert!(
            (player.position().y - standing_eye).abs() < 0.05,
            "eye should rest on the ground, got {}",
            player.position().y
        );
        assert!(player.jumpable, "landing makes the player jumpable");
        assert!(!player.swimming);
        assert!(player.velocity.y <= 0.0);
    }

    #[test]
    fn test_fall_speed_is_capped() {
        let config = WorldConfig { world_size: 3, map_height: 200, chunk_size: 4, ..Default::default() };
        let world = World::new(&config, MaterialTable::default()).unwrap();
        let physics = PhysicsSystem::new(PlayerConfig::default());
        let mut player = walker(Vec3::new(0.0, 190.0, 0.0));

        run(&physics, &mut player, &world, MovementIntent::default(), 600);
        assert!((player.velocity.y + physics.config().max_fall_speed).abs() < 1e-3);
    }

    #[test]
    fn test_jump_needs_ground_and_delay() {
        let world = flat_world();
        let physics = PhysicsSystem::new(PlayerConfig::default());
        let mut player = walker(Vec3::new(0.2, 3.85, -0.1));
        run(&physics, &mut player, &world, MovementIntent::default(), 10);
        assert!(player.jumpable);

        let jump = MovementIntent { jump: true, ..Default::default() };
        physics.step(&mut player, &world, &jump, DT);
        assert!(player.velocity.y > 7.0, "jump impulse applied, vy = {}", player.velocity.y);
        assert!(!player.jumpable);
        assert_eq!(player.jump_delay, physics.config().jump_delay);

        // holding jump in the air does nothing more
        let vy = player.velocity.y;
        player.jump_delay = 0.0;
        physics.step(&mut player, &world, &jump, DT);
        assert!(player.velocity.y < vy);
        assert_eq!(player.jump_delay, 0.0, "no jump, no new delay");
    }

    #[test]
    fn test_held_jump_fires_on_landing() {
        let world = flat_world();
        let physics = PhysicsSystem::new(PlayerConfig::default());
        let mut player = walker(Vec3::new(0.2, 6.0, -0.1));
        let jump = MovementIntent { jump: true, ..Default::default() };

        // falling with jump held never arms the delay
        for _ in 0..240 {
            physics.step(&mut player, &world, &jump, DT);
            if player.jumpable {
                break;
            }
            assert_eq!(player.jump_delay, 0.0, "delay armed while airborne");
        }
        assert!(player.jumpable, "player landed");

        physics.step(&mut player, &world, &jump, DT);
        assert!(player.velocity.y > 0.0, "jump on the first grounded step, vy = {}", player.velocity.y);
        assert!(!player.jumpable);
    }

    #[test]
    fn test_walking_moves_along_view() {
        let world = flat_world();
        let physics = PhysicsSystem::new(PlayerConfig::default());
        let mut player = walker(Vec3::new(0.0, 3.85, 0.0));
        let forward = MovementIntent { direction: Vec3::NEG_Z, ..Default::default() };

        run(&physics, &mut player, &world, forward, 60);
        assert!(player.position().z < -0.5, "moved forward, z = {}", player.position().z);
        assert!(player.position().x.abs() < 1e-4);
        let horizontal = Vec3::new(player.velocity.x, 0.0, player.velocity.z).length();
        assert!(horizontal <= physics.config().max_speed + 1e-4);
    }

    #[test]
    fn test_flying_ignores_gravity_and_stops() {
        let world = flat_world();
        let physics = PhysicsSystem::new(PlayerConfig::default());
        let mut player = walker(Vec3::new(0.0, 10.0, 0.0));
        player.flying = true;

        run(&physics, &mut player, &world, MovementIntent::default(), 120);
        assert_eq!(player.position().y, 10.0);

        let up = MovementIntent { direction: Vec3::Y, run: true, ..Default::default() };
        run(&physics, &mut player, &world, up, 120);
        assert!(player.position().y > 10.0);
        let cap = physics.config().max_run_speed * physics.config().fly_speed_modifier;
        assert!(player.velocity.length() <= cap + 1e-4);

        run(&physics, &mut player, &world, MovementIntent::default(), 600);
        assert_eq!(player.velocity, Vec3::ZERO, "damping brings the player to rest");
    }

    #[test]
    fn test_water_makes_swimming() {
        let mut world = flat_world();
        for y in 3..6 {
            world.set_block(WorldCoord(0, y, 0), ids::WATER);
        }
        let physics = PhysicsSystem::new(PlayerConfig::default());
        let mut player = walker(Vec3::new(0.0, 5.0, 0.0));

        physics.step(&mut player, &world, &MovementIntent::default(), DT);
        assert!(player.swimming);

        let jump = MovementIntent { jump: true, ..Default::default() };
        let before = player.velocity.y;
        physics.step(&mut player, &world, &jump, DT);
        assert!(player.velocity.y > before, "swim stroke works without ground contact");
    }
}
