//! Terminal output and input through crossterm.

use std::io::{self, Stdout, Write};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use crossterm::style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, event, execute, queue, terminal};

use crate::color::Color;
use crate::compose::{CellFrame, CELL_HEIGHT_PX, CELL_PIXEL_RATIO, CELL_WIDTH_PX};
use crate::scroll::Viewport;

/// User intent decoded from a terminal event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Scroll by a number of scroll steps, negative is up
    ScrollSteps(f64),
    /// Scroll by a number of viewport heights
    ScrollPages(f64),
    ScrollHome,
    ScrollEnd,
    ToggleDebug,
    ToggleWireframe,
    Resize { cols: u16, rows: u16 },
    Quit,
}

impl Command {
    pub fn from_event(event: &Event) -> Option<Command> {
        match event {
            Event::Key(key) => Self::from_key(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => Some(Command::ScrollSteps(1.0)),
                MouseEventKind::ScrollUp => Some(Command::ScrollSteps(-1.0)),
                _ => None,
            },
            Event::Resize(cols, rows) => Some(Command::Resize {
                cols: *cols,
                rows: *rows,
            }),
            _ => None,
        }
    }

    fn from_key(key: &KeyEvent) -> Option<Command> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        let command = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
            KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
            KeyCode::Char('d') => Command::ToggleDebug,
            KeyCode::Char('w') => Command::ToggleWireframe,
            KeyCode::Down | KeyCode::Char('j') => Command::ScrollSteps(1.0),
            KeyCode::Up | KeyCode::Char('k') => Command::ScrollSteps(-1.0),
            KeyCode::PageDown | KeyCode::Char(' ') => Command::ScrollPages(1.0),
            KeyCode::PageUp => Command::ScrollPages(-1.0),
            KeyCode::Home => Command::ScrollHome,
            KeyCode::End => Command::ScrollEnd,
            _ => return None,
        };
        Some(command)
    }
}

/// Current terminal size in cells
pub fn terminal_size() -> io::Result<(u16, u16)> {
    match termsize::get() {
        Some(size) if size.cols > 0 && size.rows > 0 => Ok((size.cols, size.rows)),
        _ => terminal::size(),
    }
}

/// Viewport covering a terminal of `cols × rows` cells
pub fn viewport_for(cols: u16, rows: u16) -> Viewport {
    Viewport::new(
        cols as f64 * CELL_WIDTH_PX,
        rows as f64 * CELL_HEIGHT_PX,
        CELL_PIXEL_RATIO,
    )
}

/// Blocks for up to `timeout` and returns the next event, if any
pub fn poll_event(timeout: std::time::Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        return event::read().map(Some);
    }
    Ok(None)
}

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Owns the terminal while the showcase runs; restores it on drop
pub struct TerminalPresenter {
    out: Stdout,
    previous: Option<CellFrame>,
}

impl TerminalPresenter {
    /// Switches to raw mode on the alternate screen with mouse capture
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )?;
        log::debug!("terminal entered raw mode");
        Ok(TerminalPresenter { out, previous: None })
    }

    /// Draws the cells that changed since the last frame
    pub fn present(&mut self, frame: &CellFrame) -> io::Result<()> {
        let previous = self
            .previous
            .take()
            .filter(|p| p.cols() == frame.cols() && p.rows() == frame.rows());
        if previous.is_none() {
            queue!(self.out, terminal::Clear(terminal::ClearType::All))?;
        }

        let mut fg = None;
        let mut bg = None;
        for row in 0..frame.rows() {
            let mut cursor_col = None;
            for col in 0..frame.cols() {
                let cell = frame.cell(col, row);
                if previous.as_ref().is_some_and(|p| p.cell(col, row) == cell) {
                    continue;
                }
                if cursor_col != Some(col) {
                    queue!(self.out, cursor::MoveTo(col as u16, row as u16))?;
                }
                if fg != Some(cell.fg) {
                    queue!(self.out, SetForegroundColor(term_color(cell.fg)))?;
                    fg = Some(cell.fg);
                }
                if bg != Some(cell.bg) {
                    queue!(self.out, SetBackgroundColor(term_color(cell.bg)))?;
                    bg = Some(cell.bg);
                }
                queue!(self.out, Print(&cell.symbol))?;
                cursor_col = Some(col + 1);
            }
        }
        self.out.flush()?;
        self.previous = Some(frame.clone());
        Ok(())
    }

    /// Forces a full redraw on the next frame
    pub fn invalidate(&mut self) {
        self.previous = None;
    }
}

impl Drop for TerminalPresenter {
    fn drop(&mut self) {
        let restored = execute!(
            self.out,
            ResetColor,
            cursor::Show,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen
        )
        .and_then(|_| terminal::disable_raw_mode());
        if let Err(err) = restored {
            log::error!("failed to restore terminal: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{MouseEvent, MouseEventKind};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(Command::from_event(&key(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(Command::from_event(&key(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(Command::from_event(&key(KeyCode::Char('d'))), Some(Command::ToggleDebug));
        assert_eq!(
            Command::from_event(&key(KeyCode::Char('w'))),
            Some(Command::ToggleWireframe)
        );
        assert_eq!(Command::from_event(&key(KeyCode::Down)), Some(Command::ScrollSteps(1.0)));
        assert_eq!(Command::from_event(&key(KeyCode::PageUp)), Some(Command::ScrollPages(-1.0)));
        assert_eq!(Command::from_event(&key(KeyCode::Char('x'))), None);

        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(Command::from_event(&ctrl_c), Some(Command::Quit));
    }

    #[test]
    fn key_releases_are_ignored() {
        let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(Command::from_event(&Event::Key(release)), None);
    }

    #[test]
    fn wheel_and_resize() {
        let wheel = Event::Mouse(MouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(Command::from_event(&wheel), Some(Command::ScrollSteps(-1.0)));
        assert_eq!(
            Command::from_event(&Event::Resize(80, 24)),
            Some(Command::Resize { cols: 80, rows: 24 })
        );
    }

    #[test]
    fn viewport_maps_cells_to_pixels() {
        let viewport = viewport_for(80, 24);
        assert_eq!((viewport.width, viewport.height), (640.0, 384.0));
        assert_eq!(
            ((viewport.width * viewport.pixel_ratio), (viewport.height * viewport.pixel_ratio)),
            (80.0, 48.0)
        );
    }
}
