use std::io::{self, Write};
use log::info;
use crossterm::{
    cursor::MoveTo,
    execute,
};

use crate::constants::*;
use crate::types::Rect;

// --- GameGrid: character cells with a world-space projection ---
//
// Game state lives in the fixed WORLD_WIDTH x WORLD_HEIGHT coordinate space
// (y increasing upward); the grid projects that space onto terminal cells
// (row 0 at the top) so entities never deal with cell coordinates.
pub struct GameGrid {
    pub grid: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
}

impl GameGrid {
    pub fn new(width: u16, height: u16) -> Self {
        GameGrid {
            grid: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
        }
    }

    pub fn set_cell(&mut self, x: u16, y: u16, c: char) {
        if y < self.height && x < self.width {
            self.grid[y as usize][x as usize] = c;
        }
    }

    pub fn clear(&mut self) {
        self.grid = vec![vec![' '; self.width as usize]; self.height as usize];
    }

    fn col_of(&self, world_x: i32) -> i32 {
        world_x * self.width as i32 / WORLD_WIDTH
    }

    fn row_of(&self, world_y: i32) -> i32 {
        self.height as i32 - 1 - world_y * self.height as i32 / WORLD_HEIGHT
    }

    // World y represented by a cell row (row 0 at the top)
    fn world_y_of_row(&self, row: u16) -> i32 {
        (self.height as i32 - 1 - row as i32) * WORLD_HEIGHT / self.height as i32
    }

    pub fn fill_world_rect(&mut self, rect: Rect, c: char) {
        let col_start = self.col_of(rect.x);
        let col_end = self.col_of(rect.x + rect.w);
        let row_start = self.row_of(rect.y + rect.h);
        let row_end = self.row_of(rect.y);
        for row in row_start..=row_end {
            for col in col_start..=col_end {
                if row >= 0 && col >= 0 {
                    self.set_cell(col as u16, row as u16, c);
                }
            }
        }
    }

    // Road edges plus dashed lane dividers, drawn per cell row so the dash
    // pattern follows world coordinates
    pub fn draw_road(&mut self) {
        let left_col = self.col_of(ROAD_LEFT);
        let right_col = self.col_of(ROAD_RIGHT);
        for row in 0..self.height {
            if left_col >= 0 {
                self.set_cell(left_col as u16, row, '|');
            }
            if right_col >= 0 {
                self.set_cell(right_col as u16, row, '|');
            }
            let world_y = self.world_y_of_row(row);
            if world_y.rem_euclid(LANE_DASH_PERIOD) < LANE_DASH_LENGTH {
                for lane in 1..LANE_COUNT {
                    let divider_col = self.col_of(ROAD_LEFT + lane * LANE_WIDTH);
                    if divider_col >= 0 {
                        self.set_cell(divider_col as u16, row, ':');
                    }
                }
            }
        }
    }

    pub fn draw_text(&mut self, x: u16, y: u16, text: &str) {
        for (i, c) in text.chars().enumerate() {
            self.set_cell(x + i as u16, y, c);
        }
    }

    pub fn draw_text_centered(&mut self, y: u16, text: &str) {
        let x = (self.width / 2).saturating_sub(text.len() as u16 / 2);
        self.draw_text(x, y, text);
    }

    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", self.grid[y as usize].iter().collect::<String>())?;
        }
        Ok(())
    }

    pub fn clear_screen_manual(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", " ".repeat(self.width as usize))?;
        }
        stdout.execute_move_to(MoveTo(0, 0))?;
        Ok(())
    }
}

// --- ScreenBuffer: in-memory render target for --debug runs ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    cursor_x: u16,
    cursor_y: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            if self.cursor_y < self.height && self.cursor_x < self.width {
                self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
            }
            self.cursor_x += 1;
        }
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for row in &self.buffer {
            info!("{}", row.iter().collect::<String>());
        }
        info!("---------------------");
    }
}

impl Write for ScreenBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        self.write_str(&s);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: crossterm::cursor::MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            }
        }
    }

    pub fn execute_other_command(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(_) => Ok(()), // Ignore in debug mode
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => {
                let s = String::from_utf8_lossy(buf);
                sb.write_str(&s);
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(sb) => sb.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_world_rect_projects_into_grid() {
        let mut grid = GameGrid::new(60, 40);
        grid.fill_world_rect(Rect::new(250, 50, CAR_WIDTH, CAR_HEIGHT), '#');
        let filled: usize = grid
            .grid
            .iter()
            .map(|row| row.iter().filter(|&&c| c == '#').count())
            .sum();
        assert!(filled > 0);
        // World y=50 sits near the bottom of the grid; nothing in the top half
        for row in 0..20 {
            assert!(grid.grid[row].iter().all(|&c| c != '#'));
        }
    }

    #[test]
    fn test_offscreen_rect_draws_nothing() {
        let mut grid = GameGrid::new(60, 40);
        grid.fill_world_rect(Rect::new(250, WORLD_HEIGHT + 100, CAR_WIDTH, CAR_HEIGHT), '%');
        let filled: usize = grid
            .grid
            .iter()
            .map(|row| row.iter().filter(|&&c| c == '%').count())
            .sum();
        assert_eq!(filled, 0);
    }
}
