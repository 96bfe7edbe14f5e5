use std::io::{stdout, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEvent},
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::widgets::*;
use tui::{
    backend::{self, CrosstermBackend},
    layout::Rect,
    Terminal,
};

use crate::surface::Window;

enum Event<I> {
    Input(I),
}

/// RAII wrapper around setting raw mode
struct RawMode;

impl RawMode {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        Ok(RawMode {})
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            log::error!("disabling raw mode: {}", e);
        }
    }
}

/// RAII wrapper around the alternate screen; also brings the cursor back
struct AlternateScreen<W: Write> {
    out: W,
}

impl<W: Write> AlternateScreen<W> {
    fn enter(mut out: W) -> Result<Self> {
        execute!(out, EnterAlternateScreen)?;
        Ok(AlternateScreen { out })
    }
}

impl<W: Write> Drop for AlternateScreen<W> {
    fn drop(&mut self) {
        if let Err(e) = execute!(self.out, cursor::Show, LeaveAlternateScreen) {
            log::error!("leaving alternate screen: {}", e);
        }
    }
}

/// A shown window's contents, copied out for display.
#[derive(Debug)]
struct Page {
    title: String,
    body: String,
    /// Line holding the window's selection
    top: usize,
}

/// Pager over the shown windows, one at a time.
#[derive(Debug)]
struct Viewer {
    windows: Vec<Page>,
    current: usize,
    scroll: usize,
    page: usize,
    should_quit: bool,
}

impl Viewer {
    fn new(windows: Vec<Window>) -> Self {
        let windows = windows
            .into_iter()
            .filter(|w| w.is_visible() && !w.is_deleted())
            .map(|w| {
                let top = w.line_of(w.dot().0);
                log::debug!(
                    "viewing window {} ({} chars) from line {}",
                    w.id(),
                    w.len(),
                    top
                );
                let marker = if w.is_dirty() { " *" } else { "" };
                Page {
                    title: format!("{}{}", w.name(), marker),
                    body: w.text(),
                    top,
                }
            })
            .collect::<Vec<_>>();

        let scroll = windows.first().map_or(0, |page| page.top);
        Self {
            windows,
            current: 0,
            scroll,
            page: 1,
            should_quit: false,
        }
    }

    fn line_count(&self) -> usize {
        self.windows
            .get(self.current)
            .map_or(0, |page| page.body.lines().count())
    }

    fn scroll_by(&mut self, delta: isize) {
        let max = self.line_count().saturating_sub(self.page);
        let target = if delta < 0 {
            self.scroll.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll.saturating_add(delta as usize)
        };
        self.scroll = target.min(max);
    }

    fn switch(&mut self, forward: bool) {
        let n = self.windows.len();
        if n == 0 {
            return;
        }
        self.current = if forward {
            (self.current + 1) % n
        } else {
            (self.current + n - 1) % n
        };
        self.scroll = self.windows[self.current].top;
        self.scroll_by(0);
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let page = self.page as isize;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-1),
            KeyCode::Char(' ') | KeyCode::PageDown => self.scroll_by(page),
            KeyCode::PageUp => self.scroll_by(-page),
            KeyCode::Char('g') | KeyCode::Home => self.scroll = 0,
            KeyCode::Char('G') | KeyCode::End => self.scroll_by(isize::MAX),
            KeyCode::Tab => self.switch(true),
            KeyCode::BackTab => self.switch(false),
            _ => {}
        }
    }

    fn render<B: backend::Backend>(&mut self, f: &mut tui::terminal::Frame<'_, B>, chunk: Rect) {
        self.page = usize::from(chunk.height.saturating_sub(2)).max(1);

        let (title, body) = match self.windows.get(self.current) {
            Some(page) => (
                format!("{} [{}/{}]", page.title, self.current + 1, self.windows.len()),
                page.body.as_str(),
            ),
            None => ("hexa".to_string(), ""),
        };
        let text = [Text::raw(body)];

        Paragraph::new(text.iter())
            .block(Block::default().title(&title).borders(Borders::ALL))
            .scroll(self.scroll.min(u16::MAX as usize) as u16)
            .render(f, chunk);
    }
}

/// Writes every shown window body to `out`, headed by its name when there are several.
pub fn print<W: Write>(windows: &[Window], mut out: W) -> Result<()> {
    let shown: Vec<_> = windows
        .iter()
        .filter(|w| w.is_visible() && !w.is_deleted())
        .collect();
    for window in &shown {
        if shown.len() > 1 {
            writeln!(out, "{}:", window.name())?;
        }
        write!(out, "{}", window.text())?;
    }
    out.flush()?;
    Ok(())
}

/// Takes over the terminal until the user quits.
pub fn run(windows: Vec<Window>) -> Result<()> {
    let mut app = Viewer::new(windows);

    // Dropped last, so the screen is restored on every exit path
    let _screen = AlternateScreen::enter(stdout())?;

    let stdout = stdout();
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let _raw = RawMode::new()?;
    terminal.hide_cursor()?;

    let (tx, rx) = mpsc::channel();

    thread::spawn(move || loop {
        match event::poll(Duration::from_millis(250)) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                log::error!("polling terminal events: {}", e);
                break;
            }
        }
        match event::read() {
            Ok(CEvent::Key(key)) => {
                if tx.send(Event::Input(key)).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                log::error!("reading terminal event: {}", e);
                break;
            }
        }
    });

    terminal.clear()?;

    loop {
        terminal.draw(|mut f| {
            let size = f.size();
            app.render(&mut f, size);
        })?;

        match rx.recv()? {
            Event::Input(key) => app.handle_key(key),
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Surface, SurfaceProvider, WindowService};
    use crossterm::event::KeyModifiers;

    fn shown(service: &mut WindowService, name: &str, body: &str) -> Window {
        let mut w = service.open().unwrap();
        w.set_name(name).unwrap();
        w.insert_at_selection(body).unwrap();
        w.show().unwrap();
        w
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
        }
    }

    #[test]
    fn test_print_single_window() {
        let mut service = WindowService::new();
        let windows = vec![shown(&mut service, "a/hexa", "line\n")];
        let mut out = Vec::new();

        print(&windows, &mut out).unwrap();
        assert_eq!(out, b"line\n");
    }

    #[test]
    fn test_print_skips_hidden_and_heads_several() {
        let mut service = WindowService::new();
        let hidden = service.open().unwrap();
        let windows = vec![
            shown(&mut service, "a/hexa", "1\n"),
            hidden,
            shown(&mut service, "b/hexa", "2\n"),
        ];
        let mut out = Vec::new();

        print(&windows, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a/hexa:\n1\nb/hexa:\n2\n");
    }

    #[test]
    fn test_scrolling_is_clamped() {
        let mut service = WindowService::new();
        let body: String = (0..10).map(|i| format!("{}\n", i)).collect();
        let mut viewer = Viewer::new(vec![shown(&mut service, "a/hexa", &body)]);
        viewer.page = 4;

        viewer.handle_key(key(KeyCode::Up));
        assert_eq!(viewer.scroll, 0);
        viewer.handle_key(key(KeyCode::PageDown));
        assert_eq!(viewer.scroll, 4);
        viewer.handle_key(key(KeyCode::End));
        assert_eq!(viewer.scroll, 6);
        viewer.handle_key(key(KeyCode::Char('j')));
        assert_eq!(viewer.scroll, 6);
        viewer.handle_key(key(KeyCode::Home));
        assert_eq!(viewer.scroll, 0);
    }

    #[test]
    fn test_tab_cycles_windows() {
        let mut service = WindowService::new();
        let mut viewer = Viewer::new(vec![
            shown(&mut service, "a/hexa", "a\n"),
            shown(&mut service, "b/hexa", "b\n"),
        ]);

        viewer.handle_key(key(KeyCode::Tab));
        assert_eq!(viewer.current, 1);
        viewer.handle_key(key(KeyCode::Tab));
        assert_eq!(viewer.current, 0);
        viewer.handle_key(key(KeyCode::BackTab));
        assert_eq!(viewer.current, 1);
        viewer.handle_key(key(KeyCode::Char('q')));
        assert!(viewer.should_quit);
    }

    #[test]
    fn test_deleted_windows_are_not_shown() {
        let mut service = WindowService::new();
        let mut gone = shown(&mut service, "gone/hexa", "x\n");
        gone.close(true).unwrap();
        let windows = vec![gone, shown(&mut service, "kept/hexa", "y\n")];

        let mut out = Vec::new();
        print(&windows, &mut out).unwrap();
        assert_eq!(out, b"y\n");
    }

    #[test]
    fn test_dirty_window_is_marked() {
        let mut service = WindowService::new();
        let dirty = shown(&mut service, "a/hexa", "1\n");
        let mut clean = shown(&mut service, "b/hexa", "2\n");
        clean.mark_clean().unwrap();

        let viewer = Viewer::new(vec![dirty, clean]);
        assert_eq!(viewer.windows[0].title, "a/hexa *");
        assert_eq!(viewer.windows[1].title, "b/hexa");
    }

    #[test]
    fn test_screen_is_restored_on_early_return() {
        fn fails_inside(out: &mut Vec<u8>) -> Result<()> {
            let _screen = AlternateScreen::enter(out)?;
            Err(anyhow::anyhow!("draw failed"))
        }

        let mut out = Vec::new();
        assert!(fails_inside(&mut out).is_err());

        let written = String::from_utf8(out).unwrap();
        let entered = written.find("\x1b[?1049h").unwrap();
        let left = written.find("\x1b[?1049l").unwrap();
        assert!(entered < left);
        assert!(written.contains("\x1b[?25h"));
    }
}
