use std::collections::BTreeMap;
use std::env;
use std::io::{self, Write};
use crossterm::{
    cursor::{Hide, Show},
    event::{Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use log::{error, info};

mod constants;
mod entities;
mod game;
mod rendering;
mod terminal_io;
mod types;

use game::Game;
use rendering::{GameGrid, OutputTarget, ScreenBuffer};
use terminal_io::SimulatedInput;

fn main() -> io::Result<()> {
    simple_logging::log_to_file("vibe-racer.log", log::LevelFilter::Info).unwrap();
    info!("Starting Vibe-racer application.");

    let args: Vec<String> = env::args().collect();
    let debug_mode_active = args.len() > 1 && args[1] == "--debug";

    let terminal_width: u16;
    let terminal_height: u16;
    let mut stdout_target;
    let mut simulated_input: Option<SimulatedInput> = None;

    if debug_mode_active {
        info!("Debug mode enabled.");
        let mut debug_width = 80;
        let mut debug_height = 24;
        if args.len() >= 4 {
            debug_width = args[2].parse::<u16>().unwrap_or(80);
            debug_height = args[3].parse::<u16>().unwrap_or(24);
        }
        terminal_width = debug_width;
        terminal_height = debug_height;
        info!("Debug resolution set to {}x{}", terminal_width, terminal_height);
        stdout_target = OutputTarget::ScreenBuffer(ScreenBuffer::new(terminal_width, terminal_height));

        // Scripted run: steer, pause/resume, restart, then quit
        let mut sim_events = BTreeMap::new();
        sim_events.insert(1, Event::Key(KeyCode::Left.into()));
        sim_events.insert(2, Event::Key(KeyCode::Left.into()));
        sim_events.insert(3, Event::Key(KeyCode::Right.into()));
        sim_events.insert(5, Event::Key(KeyCode::Char('p').into()));
        sim_events.insert(8, Event::Key(KeyCode::Char('p').into()));
        sim_events.insert(12, Event::Key(KeyCode::Char('r').into()));
        sim_events.insert(20, Event::Key(KeyCode::Char('q').into()));
        simulated_input = Some(SimulatedInput::new(sim_events));
    } else {
        info!("Attempting to enable raw mode.");
        enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
        let (width, height) = size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })?;
        terminal_width = width;
        terminal_height = height;
        stdout_target = OutputTarget::Stdout(io::stdout());
        info!("Terminal size: {}x{}", terminal_width, terminal_height);
    }

    let max_frames: Option<u64> = if !debug_mode_active && args.len() > 1 {
        args[1].parse::<u64>().ok()
    } else if debug_mode_active && args.len() > 4 {
        args[4].parse::<u64>().ok()
    } else {
        None
    };

    if !debug_mode_active {
        let game_grid = GameGrid::new(terminal_width, terminal_height);
        game_grid.clear_screen_manual(&mut stdout_target).map_err(|e| { error!("Failed to clear screen: {}", e); e })?;
        stdout_target.execute_other_command(Hide).map_err(|e| { error!("Failed to hide cursor: {}", e); e })?;
        stdout_target.flush()?;
    }

    let mut game = Game::new(
        terminal_width,
        terminal_height,
        stdout_target,
        simulated_input,
        debug_mode_active,
        max_frames,
    );
    let result = game.run();
    if let Err(e) = &result {
        error!("Game loop failed: {}", e);
    }

    if !debug_mode_active {
        let game_grid = GameGrid::new(terminal_width, terminal_height);
        let _ = game_grid.clear_screen_manual(&mut game.stdout_target);
        game.stdout_target.execute_other_command(Show).map_err(|e| { error!("Failed to show cursor on exit: {}", e); e })?;
        disable_raw_mode().map_err(|e| { error!("Failed to disable raw mode on exit: {}", e); e })?;
    }

    info!("Exiting application.");
    result
}
