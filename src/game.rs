use std::io::{self, Read, Write};
use std::time::{Duration, Instant};
use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode},
};
use rand::Rng;
use log::{error, info};

use crate::constants::*;
use crate::entities::{EnemyCar, PlayerCar};
use crate::rendering::{GameGrid, OutputTarget};
use crate::terminal_io::SimulatedInput;

// --- Phase: top-level mode of the game ---
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Paused,
    GameOver,
}

// --- GameState: everything the renderer reads and the tick mutates ---
pub struct GameState {
    pub phase: Phase,
    pub score: u32,
    pub enemy_base_speed: i32,
    pub player: PlayerCar,
    pub enemies: [EnemyCar; MAX_ENEMIES],
}

impl GameState {
    pub fn new(rng: &mut impl Rng) -> Self {
        GameState {
            phase: Phase::Playing,
            score: 0,
            enemy_base_speed: ENEMY_BASE_SPEED,
            player: PlayerCar::new(),
            enemies: std::array::from_fn(|_| EnemyCar::spawn(ENEMY_BASE_SPEED, &mut *rng)),
        }
    }

    pub fn reset(&mut self, rng: &mut impl Rng) {
        *self = GameState::new(rng);
        info!("Game reset.");
    }

    // One fixed-interval update. Enemies are advanced in slot order; a car
    // that scrolls past the bottom is recycled in place and scores a point.
    pub fn tick(&mut self, rng: &mut impl Rng) {
        if self.phase != Phase::Playing {
            return;
        }

        let player_rect = self.player.rect();
        for enemy in &mut self.enemies {
            if enemy.advance() {
                enemy.respawn(self.enemy_base_speed, rng);
                self.score += 1;
                if self.score % SCORE_PER_SPEEDUP == 0 {
                    self.enemy_base_speed += 1;
                    info!(
                        "Difficulty increased. Score: {}, enemy base speed: {}",
                        self.score, self.enemy_base_speed
                    );
                }
            }

            // Checked at the enemy's current, possibly just-respawned position.
            // The remaining slots still get processed this tick; GameOver is
            // never cleared until a restart.
            if player_rect.overlaps(&enemy.rect()) {
                if self.phase != Phase::GameOver {
                    info!("Player hit enemy at x: {}, y: {}. Final score: {}", enemy.x, enemy.y, self.score);
                }
                self.phase = Phase::GameOver;
            }
        }
    }

    // Maps one discrete key event onto the state. Returns false when the key
    // asks to quit the program.
    pub fn handle_key(&mut self, code: KeyCode, rng: &mut impl Rng) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                info!("Quit key pressed.");
                return false;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.reset(rng),
            KeyCode::Char('p') | KeyCode::Char('P') => {
                // Game over only leaves via restart
                self.phase = match self.phase {
                    Phase::Playing => Phase::Paused,
                    Phase::Paused => Phase::Playing,
                    Phase::GameOver => Phase::GameOver,
                };
                info!("Pause toggled. Phase: {:?}", self.phase);
            }
            KeyCode::Left if self.phase == Phase::Playing => self.player.steer(-PLAYER_STEP),
            KeyCode::Right if self.phase == Phase::Playing => self.player.steer(PLAYER_STEP),
            _ => {}
        }
        true
    }
}

// --- Game: terminal driver running the fixed-cadence loop ---
pub struct Game {
    pub terminal_width: u16,
    pub terminal_height: u16,
    pub stdout_target: OutputTarget,
    simulated_input: Option<SimulatedInput>,
    debug_mode_active: bool,
    max_frames: Option<u64>,
}

impl Game {
    pub fn new(
        terminal_width: u16,
        terminal_height: u16,
        stdout_target: OutputTarget,
        simulated_input: Option<SimulatedInput>,
        debug_mode_active: bool,
        max_frames: Option<u64>,
    ) -> Self {
        Game {
            terminal_width,
            terminal_height,
            stdout_target,
            simulated_input,
            debug_mode_active,
            max_frames,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        if !self.debug_mode_active {
            self.show_title_screen()?;
        }

        let mut rng = rand::thread_rng();
        let mut state = GameState::new(&mut rng);
        let mut game_grid = GameGrid::new(self.terminal_width, self.terminal_height);

        let frame_interval = Duration::from_millis(FRAME_INTERVAL_MS);
        let mut running = true;
        let mut frame_count: u64 = 0;

        while running && (self.max_frames.is_none() || frame_count < self.max_frames.unwrap()) {
            let frame_start = Instant::now();

            self.handle_input(&mut running, &mut state, &mut rng, frame_count)?;
            state.tick(&mut rng);

            game_grid.clear();
            self.draw(&state, &mut game_grid);
            self.render(&game_grid)?;

            frame_count += 1;

            if !self.debug_mode_active {
                let elapsed = frame_start.elapsed();
                if elapsed < frame_interval {
                    std::thread::sleep(frame_interval - elapsed);
                }
            }
        }

        info!("Game loop ended after {} frames. Final score: {}", frame_count, state.score);
        Ok(())
    }

    fn handle_input(
        &mut self,
        running: &mut bool,
        state: &mut GameState,
        rng: &mut impl Rng,
        frame_count: u64,
    ) -> io::Result<()> {
        let mut current_event: Option<Event> = None;
        if self.debug_mode_active {
            if let Some(sim_input) = &mut self.simulated_input {
                if sim_input.poll(frame_count)? {
                    current_event = Some(sim_input.read()?);
                }
            }
        } else if event::poll(Duration::from_millis(0)).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
            current_event = Some(event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?);
        }

        if let Some(Event::Key(key_event)) = current_event {
            if !state.handle_key(key_event.code, rng) {
                *running = false;
            }
        }
        Ok(())
    }

    fn draw(&self, state: &GameState, game_grid: &mut GameGrid) {
        game_grid.draw_road();

        if state.phase == Phase::GameOver {
            let mid = self.terminal_height / 2;
            game_grid.draw_text_centered(mid.saturating_sub(2), "GAME OVER");
            game_grid.draw_text_centered(mid, &format!("Final Score: {}", state.score));
            game_grid.draw_text_centered(mid + 2, "Press 'r' to Restart");
            return;
        }

        state.player.draw(game_grid);
        for enemy in &state.enemies {
            enemy.draw(game_grid);
        }

        game_grid.draw_text(0, 0, &format!("Score: {}", state.score));
        if state.phase == Phase::Paused {
            game_grid.draw_text_centered(self.terminal_height / 2, "PAUSED");
        }

        let controls_text = [
            "Controls:",
            r"  Left Arrow : Steer Left",
            r"  Right Arrow: Steer Right",
            r"  p          : Pause",
            r"  r          : Restart",
            r"  q          : Quit",
        ];
        let controls_start_y = self.terminal_height.saturating_sub(controls_text.len() as u16);
        for (i, line) in controls_text.iter().enumerate() {
            game_grid.draw_text(0, controls_start_y.saturating_add(i as u16), line);
        }
    }

    fn render(&mut self, game_grid: &GameGrid) -> io::Result<()> {
        if !self.debug_mode_active {
            game_grid.render(&mut self.stdout_target).map_err(|e| { error!("Failed to render game grid: {}", e); e })?;
            self.stdout_target.flush()?;
        } else if let OutputTarget::ScreenBuffer(ref mut sb) = self.stdout_target {
            for y in 0..self.terminal_height.min(sb.height) {
                for x in 0..self.terminal_width.min(sb.width) {
                    sb.buffer[y as usize][x as usize] = game_grid.grid[y as usize][x as usize];
                }
            }
            sb.print_to_log();
        }
        Ok(())
    }

    fn show_title_screen(&mut self) -> io::Result<()> {
        let title_art = [
            r"VIBE-RACER",
            r"__     _____ ____  _____     ____      _    ____ _____ ____",
            r"\ \   / /_ _| __ )| ____|   |  _ \    / \  / ___| ____|  _ \",
            r" \ \ / / | ||  _ \|  _|  ___| |_) |  / _ \| |   |  _| | |_) |",
            r"  \ V /  | || |_) | |___|___|  _ <  / ___ \ |___| |___|  _ <",
            r"   \_/  |___|____/|_____|   |_| \_\/_/   \_\____|_____|_| \_\",
        ];

        let title_start_y = self.terminal_height / 2 - title_art.len() as u16 / 2;
        for (i, line) in title_art.iter().enumerate() {
            let x = (self.terminal_width / 2).saturating_sub(line.len() as u16 / 2);
            self.stdout_target.execute_move_to(MoveTo(x, title_start_y + i as u16))?;
            write!(self.stdout_target, "{}", line)?;
        }

        let press_any_key_msg = "Press any key to start...";
        let msg_x = (self.terminal_width / 2).saturating_sub(press_any_key_msg.len() as u16 / 2);
        self.stdout_target.execute_move_to(MoveTo(msg_x, self.terminal_height.saturating_sub(5)))?;
        write!(self.stdout_target, "{}", press_any_key_msg)?;
        self.stdout_target.flush()?;
        info!("Title screen displayed. Waiting for key press.");

        let _ = io::stdin().bytes().next();

        let game_grid = GameGrid::new(self.terminal_width, self.terminal_height);
        game_grid.clear_screen_manual(&mut self.stdout_target)?;
        self.stdout_target.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn test_state(rng: &mut impl Rng) -> GameState {
        let mut state = GameState::new(rng);
        // Park enemies far above the player so nothing recycles or collides
        // unless a test arranges it
        for (i, enemy) in state.enemies.iter_mut().enumerate() {
            enemy.x = FIRST_LANE_X + (i as i32 % LANE_COUNT) * LANE_WIDTH;
            enemy.y = WORLD_HEIGHT + 100;
            enemy.speed = ENEMY_BASE_SPEED;
        }
        state
    }

    #[test]
    fn test_new_game_invariants() {
        let mut rng = StdRng::seed_from_u64(1);
        let state = GameState::new(&mut rng);
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.enemy_base_speed, ENEMY_BASE_SPEED);
        assert_eq!(state.player.x, PLAYER_START_X);
        assert_eq!(state.enemies.len(), MAX_ENEMIES);
        for enemy in &state.enemies {
            assert!(enemy.y >= WORLD_HEIGHT && enemy.y < WORLD_HEIGHT + ENEMY_SPAWN_OFFSET);
        }
    }

    #[test]
    fn test_tick_advances_enemies_while_playing() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut state = test_state(&mut rng);
        let before: Vec<i32> = state.enemies.iter().map(|e| e.y).collect();
        state.tick(&mut rng);
        for (enemy, y0) in state.enemies.iter().zip(before) {
            assert_eq!(enemy.y, y0 - enemy.speed);
        }
    }

    #[test]
    fn test_recycle_scores_one_point() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = test_state(&mut rng);
        state.enemies[0].y = -CAR_HEIGHT + 1;
        state.enemies[0].speed = 5;
        state.tick(&mut rng);
        assert_eq!(state.score, 1);
        assert!(state.enemies[0].y >= WORLD_HEIGHT);
        assert_eq!(state.phase, Phase::Playing);
    }

    #[test]
    fn test_simultaneous_recycles_each_score() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut state = test_state(&mut rng);
        for enemy in &mut state.enemies {
            enemy.y = -CAR_HEIGHT - 10;
            enemy.speed = 5;
        }
        state.tick(&mut rng);
        assert_eq!(state.score, 3);
    }

    #[test]
    fn test_base_speed_bumps_once_per_threshold() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut state = test_state(&mut rng);
        state.score = 9;
        state.enemies[0].y = -CAR_HEIGHT - 10;
        state.tick(&mut rng);
        assert_eq!(state.score, 10);
        assert_eq!(state.enemy_base_speed, ENEMY_BASE_SPEED + 1);

        // The next recycle crosses no threshold and must not bump again
        state.enemies[1].y = -CAR_HEIGHT - 10;
        state.tick(&mut rng);
        assert_eq!(state.score, 11);
        assert_eq!(state.enemy_base_speed, ENEMY_BASE_SPEED + 1);
    }

    #[test]
    fn test_collision_transitions_to_game_over() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut state = test_state(&mut rng);
        state.player.x = 250;
        state.enemies[1].x = 250;
        state.enemies[1].y = PLAYER_Y + 5;
        state.enemies[1].speed = 5;
        state.tick(&mut rng);
        assert_eq!(state.phase, Phase::GameOver);
    }

    #[test]
    fn test_game_over_freezes_state() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = test_state(&mut rng);
        state.phase = Phase::GameOver;
        state.score = 42;
        let before: Vec<i32> = state.enemies.iter().map(|e| e.y).collect();
        for _ in 0..10 {
            state.tick(&mut rng);
        }
        let after: Vec<i32> = state.enemies.iter().map(|e| e.y).collect();
        assert_eq!(before, after);
        assert_eq!(state.score, 42);
        assert_eq!(state.phase, Phase::GameOver);
    }

    #[test]
    fn test_pause_freezes_then_resume_moves() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut state = test_state(&mut rng);
        assert!(state.handle_key(KeyCode::Char('p'), &mut rng));
        assert_eq!(state.phase, Phase::Paused);

        let before: Vec<i32> = state.enemies.iter().map(|e| e.y).collect();
        state.tick(&mut rng);
        let frozen: Vec<i32> = state.enemies.iter().map(|e| e.y).collect();
        assert_eq!(before, frozen);

        assert!(state.handle_key(KeyCode::Char('p'), &mut rng));
        assert_eq!(state.phase, Phase::Playing);
        state.tick(&mut rng);
        assert!(state.enemies.iter().zip(frozen).any(|(e, y0)| e.y != y0));
    }

    #[test]
    fn test_pause_is_ignored_during_game_over() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut state = test_state(&mut rng);
        state.phase = Phase::GameOver;
        assert!(state.handle_key(KeyCode::Char('p'), &mut rng));
        assert_eq!(state.phase, Phase::GameOver);
    }

    #[test]
    fn test_steering_blocked_unless_playing() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut state = test_state(&mut rng);
        state.phase = Phase::Paused;
        assert!(state.handle_key(KeyCode::Left, &mut rng));
        assert_eq!(state.player.x, PLAYER_START_X);

        state.phase = Phase::GameOver;
        assert!(state.handle_key(KeyCode::Right, &mut rng));
        assert_eq!(state.player.x, PLAYER_START_X);

        state.phase = Phase::Playing;
        assert!(state.handle_key(KeyCode::Left, &mut rng));
        assert_eq!(state.player.x, PLAYER_START_X - PLAYER_STEP);
    }

    #[test]
    fn test_restart_resets_from_any_phase() {
        let mut rng = StdRng::seed_from_u64(11);
        for phase in [Phase::Playing, Phase::Paused, Phase::GameOver] {
            let mut state = test_state(&mut rng);
            state.phase = phase;
            state.score = 37;
            state.enemy_base_speed = 9;
            state.player.x = PLAYER_MAX_X;
            assert!(state.handle_key(KeyCode::Char('r'), &mut rng));
            assert_eq!(state.phase, Phase::Playing);
            assert_eq!(state.score, 0);
            assert_eq!(state.enemy_base_speed, ENEMY_BASE_SPEED);
            assert_eq!(state.player.x, PLAYER_START_X);
            for enemy in &state.enemies {
                assert!(enemy.y >= WORLD_HEIGHT && enemy.y < WORLD_HEIGHT + ENEMY_SPAWN_OFFSET);
            }
        }
    }

    #[test]
    fn test_quit_keys_stop_the_loop() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut state = test_state(&mut rng);
        assert!(!state.handle_key(KeyCode::Char('q'), &mut rng));
        assert!(!state.handle_key(KeyCode::Esc, &mut rng));
    }
}
