// --- Game Constants ---
pub const WORLD_WIDTH: i32 = 600;
pub const WORLD_HEIGHT: i32 = 800;

pub const CAR_WIDTH: i32 = 50;
pub const CAR_HEIGHT: i32 = 100;

pub const LANE_WIDTH: i32 = 100;
pub const LANE_COUNT: i32 = 4;
pub const FIRST_LANE_X: i32 = 150; // Lane slots are FIRST_LANE_X + i * LANE_WIDTH

pub const ROAD_LEFT: i32 = 100;
pub const ROAD_RIGHT: i32 = 500;
pub const PLAYER_MIN_X: i32 = 150;
pub const PLAYER_MAX_X: i32 = 450;

pub const PLAYER_START_X: i32 = 250;
pub const PLAYER_Y: i32 = 50; // Player car never moves vertically
pub const PLAYER_STEP: i32 = 20;

pub const MAX_ENEMIES: usize = 3;
pub const ENEMY_BASE_SPEED: i32 = 5;
pub const ENEMY_SPEED_JITTER: i32 = 3; // Extra speed in [0, ENEMY_SPEED_JITTER)
pub const ENEMY_SPAWN_OFFSET: i32 = 300; // Spawn y in [WORLD_HEIGHT, WORLD_HEIGHT + ENEMY_SPAWN_OFFSET)

pub const SCORE_PER_SPEEDUP: u32 = 10; // Base speed +1 at every multiple of this

pub const LANE_DASH_PERIOD: i32 = 80; // Lane divider dash spacing in world units
pub const LANE_DASH_LENGTH: i32 = 40;

pub const FRAME_INTERVAL_MS: u64 = 16; // ~60 FPS tick
