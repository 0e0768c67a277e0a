//! Main loop: draws frames, reads keys and runs the shutdown sequence.
//!
//! Shutdown: the token is cancelled (quit key or signal), the draw loop
//! exits, the terminal is restored, then the poller is joined.

use crate::error::Result;
use crate::input::{Action, InputHandler};
use crate::poller::{CancellationToken, Poller, PollerConfig};
use crate::source::SourceLocator;
use crate::store::SnapshotStore;
use crate::theme::Theme;
use crate::ui::{FrameSummary, Renderer};
use crate::{debug, info};
use chrono::Local;
use crossterm::event::{self, Event};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Everything needed to start the dashboard, after CLI and config merging.
#[derive(Debug, Clone)]
pub struct Settings {
    /// What to poll.
    pub source: SourceLocator,
    /// Transport proxy host.
    pub proxy_host: String,
    /// Transport proxy port.
    pub proxy_port: u16,
    /// Poll timing.
    pub poller: PollerConfig,
    /// Key wait per frame.
    pub frame_interval: Duration,
    /// Imminence threshold in seconds.
    pub imminent_threshold_secs: f64,
    /// Colors.
    pub theme: Theme,
}

/// Render-side state of the dashboard.
pub struct App {
    store: Arc<SnapshotStore>,
    renderer: Renderer,
    input: InputHandler,
    token: CancellationToken,
    frame_interval: Duration,
    frame_counter: u64,
}

impl App {
    /// Creates the render loop over `store`.
    #[must_use]
    pub fn new(
        store: Arc<SnapshotStore>,
        renderer: Renderer,
        token: CancellationToken,
        frame_interval: Duration,
    ) -> Self {
        Self {
            store,
            renderer,
            input: InputHandler::new(),
            token,
            frame_interval,
            frame_counter: 0,
        }
    }

    /// Frames drawn so far.
    #[must_use]
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    /// Draws one frame from a fresh store read.
    ///
    /// The store lock is released before drawing starts.
    pub fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<FrameSummary> {
        let view = self.store.read();
        let now = Local::now();
        let mut summary = FrameSummary::default();
        terminal.draw(|f| summary = self.renderer.draw(f, &view, now, self.frame_counter))?;
        self.frame_counter = self.frame_counter.wrapping_add(1);
        Ok(summary)
    }

    /// Applies an input action. Returns true if the app should quit.
    pub fn apply(&mut self, action: Action) -> bool {
        if action == Action::Quit {
            info!("app", "quit requested");
            self.token.cancel();
        }
        self.token.is_cancelled()
    }

    /// Waits up to one frame interval for a key and handles it.
    fn poll_input(&mut self) -> io::Result<()> {
        if !event::poll(self.frame_interval)? {
            return Ok(());
        }
        if let Event::Key(key) = event::read()? {
            let action = match self.input.handle_key(key) {
                Action::ConfirmEscape => self.input.confirm_escape(event::poll(Duration::ZERO)?),
                other => other,
            };
            self.apply(action);
        }
        Ok(())
    }

    /// Draws and reads keys until the token is cancelled.
    pub fn run_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        while !self.token.is_cancelled() {
            self.draw(terminal)?;
            self.poll_input()?;
        }
        debug!("app", "draw loop finished after {} frames", self.frame_counter);
        Ok(())
    }
}

/// Raw mode, alternate screen and hidden cursor for as long as it lives.
struct TerminalSession;

impl TerminalSession {
    fn enter() -> io::Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        let session = Self;
        let mut stdout = io::stdout();
        crossterm::execute!(
            stdout,
            crossterm::terminal::EnterAlternateScreen,
            crossterm::cursor::Hide
        )?;
        Ok(session)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = crossterm::execute!(
            stdout,
            crossterm::cursor::Show,
            crossterm::terminal::LeaveAlternateScreen
        );
        let _ = crossterm::terminal::disable_raw_mode();
    }
}

/// Turns SIGINT and SIGTERM into a token cancellation while it lives.
#[cfg(unix)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new(token: CancellationToken) -> io::Result<Self> {
        use signal_hook::consts::signal::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::Builder::new()
            .name("stopboard-signals".to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    info!("app", "signal {signal} received");
                    token.cancel();
                }
            })?;
        Ok(Self { handle, thread: Some(thread) })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Runs the dashboard until quit or signal.
///
/// # Errors
///
/// Fails if the terminal cannot be set up or written to, or a thread
/// cannot be spawned. Transit data problems are never errors here.
pub fn run(settings: Settings) -> Result<()> {
    let token = CancellationToken::new();
    let store = Arc::new(SnapshotStore::new());

    let source = settings.source.clone().into_source(&settings.proxy_host, settings.proxy_port);
    let source_label = source.describe();
    info!("app", "starting, source={source_label}");

    let poller = Poller::new(source, Arc::clone(&store), settings.poller, token.clone()).spawn()?;

    let outcome = run_dashboard(&settings, store, token.clone(), source_label);

    info!("app", "shutting down");
    token.cancel();
    poller.join();
    info!("app", "poller joined");
    outcome
}

fn run_dashboard(
    settings: &Settings,
    store: Arc<SnapshotStore>,
    token: CancellationToken,
    source_label: String,
) -> Result<()> {
    #[cfg(unix)]
    let _signals = SignalGuard::new(token.clone())?;

    let _session = TerminalSession::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    let renderer = Renderer::new(settings.theme.clone(), source_label, settings.imminent_threshold_secs);
    let mut app = App::new(store, renderer, token, settings.frame_interval);
    app.run_loop(&mut terminal)?;
    Ok(())
}
