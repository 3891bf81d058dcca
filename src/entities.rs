use crate::constants::*;
use crate::rendering::GameGrid;
use crate::types::Rect;
use rand::Rng;

// --- Player car ---
pub struct PlayerCar {
    pub x: i32,
}

impl PlayerCar {
    pub fn new() -> Self {
        PlayerCar { x: PLAYER_START_X }
    }

    // One discrete steering step; dx is +-PLAYER_STEP
    pub fn steer(&mut self, dx: i32) {
        self.x = (self.x + dx).clamp(PLAYER_MIN_X, PLAYER_MAX_X);
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, PLAYER_Y, CAR_WIDTH, CAR_HEIGHT)
    }

    pub fn draw(&self, game_grid: &mut GameGrid) {
        game_grid.fill_world_rect(self.rect(), '#');
    }
}

// --- Enemy car ---
pub struct EnemyCar {
    pub x: i32,
    pub y: i32,
    pub speed: i32,
}

impl EnemyCar {
    pub fn spawn(base_speed: i32, rng: &mut impl Rng) -> Self {
        let mut enemy = EnemyCar { x: 0, y: 0, speed: 0 };
        enemy.respawn(base_speed, rng);
        enemy
    }

    // Reposition above the visible area with a fresh lane, offset and speed
    pub fn respawn(&mut self, base_speed: i32, rng: &mut impl Rng) {
        self.x = FIRST_LANE_X + rng.gen_range(0..LANE_COUNT) * LANE_WIDTH;
        self.y = WORLD_HEIGHT + rng.gen_range(0..ENEMY_SPAWN_OFFSET);
        self.speed = base_speed + rng.gen_range(0..ENEMY_SPEED_JITTER);
    }

    // Descend one tick's worth; returns true once the car has scrolled past the player
    pub fn advance(&mut self) -> bool {
        self.y -= self.speed;
        self.y < -CAR_HEIGHT
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, CAR_WIDTH, CAR_HEIGHT)
    }

    pub fn draw(&self, game_grid: &mut GameGrid) {
        game_grid.fill_world_rect(self.rect(), '%');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_steer_stays_within_road_bounds() {
        let mut player = PlayerCar::new();
        for _ in 0..100 {
            player.steer(-PLAYER_STEP);
            assert!(player.x >= PLAYER_MIN_X);
        }
        assert_eq!(player.x, PLAYER_MIN_X);
        for _ in 0..100 {
            player.steer(PLAYER_STEP);
            assert!(player.x <= PLAYER_MAX_X);
        }
        assert_eq!(player.x, PLAYER_MAX_X);
    }

    #[test]
    fn test_respawn_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut enemy = EnemyCar::spawn(ENEMY_BASE_SPEED, &mut rng);
        for _ in 0..1000 {
            enemy.respawn(ENEMY_BASE_SPEED, &mut rng);
            assert!(enemy.y >= WORLD_HEIGHT && enemy.y < WORLD_HEIGHT + ENEMY_SPAWN_OFFSET);
            assert!(enemy.speed >= ENEMY_BASE_SPEED);
            assert!(enemy.speed < ENEMY_BASE_SPEED + ENEMY_SPEED_JITTER);
            let lane = (enemy.x - FIRST_LANE_X) / LANE_WIDTH;
            assert!((0..LANE_COUNT).contains(&lane));
            assert_eq!(enemy.x, FIRST_LANE_X + lane * LANE_WIDTH);
        }
    }

    #[test]
    fn test_advance_descends_by_speed() {
        let mut enemy = EnemyCar { x: 250, y: 400, speed: 7 };
        assert!(!enemy.advance());
        assert_eq!(enemy.y, 393);
    }

    #[test]
    fn test_advance_reports_offscreen() {
        let mut enemy = EnemyCar { x: 250, y: -CAR_HEIGHT + 2, speed: 5 };
        assert!(enemy.advance());
    }
}
