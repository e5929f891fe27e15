//! Terminal presenter
//!
//! Renders the markup fragments as plain lines with crossterm colours.
//! Colours are only emitted when stdout is a terminal; key waits use raw
//! mode when stdin is interactive and fall back to reading a line.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use log::debug;

use crate::database::{Direction, DIRECTION_COUNT};
use crate::markup::{ink_index, tokenize, MarkupToken};
use crate::presenter::{ColourTarget, DisplayError, Presenter};

/// Milliseconds per PAUSE tick
const TICK_MILLIS: u64 = 20;

/// The eight machine colours in palette order
pub fn palette_colour(index: usize) -> Option<Color> {
    match index {
        0 => Some(Color::Black),
        1 => Some(Color::DarkBlue),
        2 => Some(Color::DarkRed),
        3 => Some(Color::DarkMagenta),
        4 => Some(Color::DarkGreen),
        5 => Some(Color::DarkCyan),
        6 => Some(Color::Yellow),
        7 => Some(Color::White),
        _ => None,
    }
}

pub struct TerminalPresenter {
    colour: bool,
    interactive: bool,
    ink: Option<Color>,
    paper: Option<Color>,
    direction_names: Vec<String>,
}

impl TerminalPresenter {
    pub fn new(colour: bool, interactive: bool) -> Result<Self, DisplayError> {
        debug!(
            "Terminal presenter: colour={}, interactive={}",
            colour, interactive
        );
        Ok(TerminalPresenter {
            colour,
            interactive,
            ink: None,
            paper: None,
            direction_names: Direction::ALL
                .iter()
                .map(|d| d.short_name().to_string())
                .collect(),
        })
    }

    /// Names shown in the exit line, in `Direction::ALL` order
    pub fn set_direction_names(&mut self, names: &[String]) {
        if names.len() == DIRECTION_COUNT {
            self.direction_names = names.to_vec();
        }
    }

    fn restore_colours(&self, out: &mut impl Write) -> Result<(), DisplayError> {
        if !self.colour {
            return Ok(());
        }
        queue!(out, ResetColor)?;
        if let Some(ink) = self.ink {
            queue!(out, SetForegroundColor(ink))?;
        }
        if let Some(paper) = self.paper {
            queue!(out, SetBackgroundColor(paper))?;
        }
        Ok(())
    }

    fn render(&self, html: &str) -> Result<(), DisplayError> {
        let mut out = io::stdout();
        for token in tokenize(html) {
            match token {
                MarkupToken::Text(text) => queue!(out, Print(text))?,
                MarkupToken::Paragraph => queue!(out, Print("\n\n"))?,
                MarkupToken::LineBreak | MarkupToken::ListEnd => queue!(out, Print("\n"))?,
                MarkupToken::ListItem => queue!(out, Print("\n - "))?,
                MarkupToken::Colour(colour) => {
                    if self.colour {
                        if let Some(c) = ink_index(&colour).and_then(palette_colour) {
                            queue!(out, SetForegroundColor(c))?;
                        }
                    }
                }
                MarkupToken::EndColour => self.restore_colours(&mut out)?,
                MarkupToken::ListStart | MarkupToken::ListItemEnd | MarkupToken::Unknown(_) => {}
            }
        }
        self.restore_colours(&mut out)?;
        queue!(out, Print("\n"))?;
        out.flush()?;
        Ok(())
    }
}

impl Presenter for TerminalPresenter {
    fn print(&mut self, html: &str) -> Result<(), DisplayError> {
        self.render(html)
    }

    fn location_changed(
        &mut self,
        description: &str,
        exits: &[bool; DIRECTION_COUNT],
    ) -> Result<(), DisplayError> {
        self.render(description)?;
        let open: Vec<&str> = exits
            .iter()
            .zip(self.direction_names.iter())
            .filter(|(open, _)| **open)
            .map(|(_, name)| name.as_str())
            .collect();
        if !open.is_empty() {
            self.render(&format!("[{}]", open.join(" ")))?;
        }
        Ok(())
    }

    fn wait_for_key(&mut self, prompt: &str) -> Result<(), DisplayError> {
        self.render(prompt)?;
        if !self.interactive {
            // Piped input: one line stands for the key press
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            return Ok(());
        }
        terminal::enable_raw_mode()?;
        let result = loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break Ok(()),
                Ok(_) => {}
                Err(e) => break Err(DisplayError::from(e)),
            }
        };
        terminal::disable_raw_mode()?;
        result
    }

    fn pause(&mut self, ticks: u8) -> Result<(), DisplayError> {
        io::stdout().flush()?;
        thread::sleep(Duration::from_millis(ticks as u64 * TICK_MILLIS));
        Ok(())
    }

    fn clear_screen(&mut self) -> Result<(), DisplayError> {
        if self.interactive {
            execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }

    fn set_colour(&mut self, target: ColourTarget, value: u8) -> Result<(), DisplayError> {
        let colour = palette_colour(value as usize);
        match target {
            ColourTarget::Ink => self.ink = colour,
            ColourTarget::Paper => self.paper = colour,
            ColourTarget::Border => debug!("Border colour {} ignored", value),
        }
        let mut out = io::stdout();
        self.restore_colours(&mut out)?;
        out.flush()?;
        Ok(())
    }

    fn beep(&mut self, _duration: u8, _pitch: u8) -> Result<(), DisplayError> {
        if self.interactive {
            execute!(io::stdout(), Print('\x07'))?;
        }
        Ok(())
    }
}

impl Drop for TerminalPresenter {
    fn drop(&mut self) {
        if self.colour {
            let _ = execute!(io::stdout(), ResetColor);
        }
    }
}
