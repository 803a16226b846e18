//! Application core — event loop wiring the ViewModel to the Explorer.
//!
//! One foreground loop drives the terminal; one background task runs the
//! periodic refresh. The two meet only through the ViewModel's mutex and
//! its coalescing update channel, so the UI never reads a torn snapshot
//! and a slow redraw never blocks a fetch.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use rabbitscope_core::ViewModel;

use crate::event::{Event, EventReader};
use crate::explorer::{Explorer, InputOutcome};
use crate::tui::Tui;

const RENDER_RATE: Duration = Duration::from_millis(33); // ~30 FPS

/// Top-level application state and event loop.
pub struct App {
    vm: Arc<ViewModel>,
    explorer: Explorer,
    refresh_interval: Duration,
    cancel: CancellationToken,
}

impl App {
    /// Create the app. The caller is expected to have performed (and
    /// error-checked) the initial fetch already -- a broker that is down
    /// at startup aborts the session before any terminal state changes.
    pub fn new(vm: Arc<ViewModel>, refresh_interval: Duration, cancel: CancellationToken) -> Self {
        let explorer = Explorer::new(Arc::clone(&vm));
        Self {
            vm,
            explorer,
            refresh_interval,
            cancel,
        }
    }

    /// Run the event loop until quit or cancellation.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        // First render from the snapshot loaded at startup.
        if let Some(tree) = self.vm.rebuild_if_changed() {
            self.explorer.apply_tree(tree);
        }

        // Background auto-refresh; exits on cancellation only.
        let refresh_vm = Arc::clone(&self.vm);
        let refresh_cancel = self.cancel.clone();
        let interval = self.refresh_interval;
        let refresh_task = tokio::spawn(async move {
            refresh_vm.run_auto_refresh(interval, refresh_cancel).await;
        });

        let mut events = EventReader::new(RENDER_RATE);
        let mut updates = self.vm.updates();
        let cancel = self.cancel.clone();
        let mut dirty = true;

        info!("explorer event loop started");

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => break,

                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    // Re-derive the latest tree; the notification itself
                    // carries nothing. Redraw only when the gate passes.
                    if let Some(tree) = self.vm.rebuild_if_changed() {
                        debug!("topology changed, rebuilding tree");
                        self.explorer.apply_tree(tree);
                        dirty = true;
                    }
                }

                maybe_event = events.next() => {
                    let Some(event) = maybe_event else { break };
                    match event {
                        Event::Key(key) => {
                            if key.modifiers == KeyModifiers::CONTROL
                                && key.code == KeyCode::Char('c')
                            {
                                self.cancel.cancel();
                                continue;
                            }
                            match self.explorer.handle_key(key) {
                                InputOutcome::Quit => self.cancel.cancel(),
                                InputOutcome::Handled => dirty = true,
                                InputOutcome::Ignored => {}
                            }
                        }
                        Event::Resize(_, _) => dirty = true,
                        Event::Render => {
                            if dirty {
                                tui.draw(|frame| self.explorer.render(frame))?;
                                dirty = false;
                            }
                        }
                    }
                }
            }
        }

        // Cooperative teardown: stop the reader, join the refresh task,
        // restore the terminal.
        self.cancel.cancel();
        events.stop();
        let _ = refresh_task.await;
        tui.exit()?;
        info!("explorer event loop ended");
        Ok(())
    }
}
