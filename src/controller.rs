//! Application controller: owns the filter and visual-settings state and
//! drives fetch → aggregate → layout for one graph view.
//!
//! Every fetch is stamped with a generation number. Starting a new fetch
//! aborts the previous fetch task and stops the running simulation; any
//! message that still arrives from an older generation is discarded.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::graph::{aggregate, GraphStats, TradeGraph};
use crate::domain::trade::{
    FetchProgress, PartialFilters, TradeFilters, TradeHistoryFetcher, TradeHistorySource,
};
use crate::error::{GraphError, LayoutError};
use crate::layout::driver::DEFAULT_TICK_INTERVAL;
use crate::layout::{LayoutCommand, LayoutFrame, Simulation, SimulationHandle};
use crate::render::{Interaction, Scene};
use crate::settings::{PartialVisualSettings, VisualSettings};
use crate::shared::{Point, Viewport, WalletId};

/// State changes for the view, each tagged with the fetch generation it
/// belongs to.
#[derive(Debug, Clone)]
pub enum ViewEvent {
    Loading {
        generation: u64,
    },
    Progress {
        generation: u64,
        progress: FetchProgress,
    },
    /// Graph built and simulation seeded.
    Ready {
        generation: u64,
        stats: GraphStats,
    },
    /// The query succeeded with zero trades.
    Empty {
        generation: u64,
    },
    /// Terminal failure for this generation. Retrying is up to the user.
    Failed {
        generation: u64,
        error: Arc<GraphError>,
    },
}

impl ViewEvent {
    pub fn generation(&self) -> u64 {
        match self {
            ViewEvent::Loading { generation }
            | ViewEvent::Progress { generation, .. }
            | ViewEvent::Ready { generation, .. }
            | ViewEvent::Empty { generation }
            | ViewEvent::Failed { generation, .. } => *generation,
        }
    }
}

// ─── Messages from fetch tasks ───────────────────────────────────────────────

enum TaskMessage {
    Progress {
        generation: u64,
        progress: FetchProgress,
    },
    Done {
        generation: u64,
        result: Result<TradeGraph, GraphError>,
    },
}

// ─── GraphController ─────────────────────────────────────────────────────────

/// Top-level owner of one counterparty-graph view.
pub struct GraphController<S> {
    fetcher: Arc<TradeHistoryFetcher<S>>,
    filters: TradeFilters,
    settings: VisualSettings,
    viewport: Viewport,
    tick_interval: Duration,
    generation: Arc<AtomicU64>,
    fetch_task: Option<JoinHandle<()>>,
    msg_tx: mpsc::Sender<TaskMessage>,
    msg_rx: mpsc::Receiver<TaskMessage>,
    pending: VecDeque<ViewEvent>,
    graph: Option<Arc<TradeGraph>>,
    simulation: Option<SimulationHandle>,
    interaction: Interaction,
}

impl<S: TradeHistorySource + 'static> GraphController<S> {
    /// Create an idle controller. Nothing is fetched until [`refresh`] or
    /// [`on_filter_change`] is called.
    ///
    /// [`refresh`]: Self::refresh
    /// [`on_filter_change`]: Self::on_filter_change
    pub fn new(
        fetcher: Arc<TradeHistoryFetcher<S>>,
        filters: TradeFilters,
        settings: VisualSettings,
        viewport: Viewport,
    ) -> Result<Self, GraphError> {
        settings.validate()?;
        let (msg_tx, msg_rx) = mpsc::channel(256);

        Ok(Self {
            fetcher,
            filters,
            settings,
            viewport,
            tick_interval: DEFAULT_TICK_INTERVAL,
            generation: Arc::new(AtomicU64::new(0)),
            fetch_task: None,
            msg_tx,
            msg_rx,
            pending: VecDeque::new(),
            graph: None,
            simulation: None,
            interaction: Interaction::new(),
        })
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn filters(&self) -> &TradeFilters {
        &self.filters
    }

    pub fn settings(&self) -> &VisualSettings {
        &self.settings
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Generation of the most recently started fetch; `0` before the first.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_loading(&self) -> bool {
        self.fetch_task.is_some()
    }

    pub fn graph(&self) -> Option<&Arc<TradeGraph>> {
        self.graph.as_ref()
    }

    pub fn simulation(&self) -> Option<&SimulationHandle> {
        self.simulation.as_ref()
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn interaction_mut(&mut self) -> &mut Interaction {
        &mut self.interaction
    }

    /// Latest layout frame, while a simulation is running.
    pub fn frame(&self) -> Option<LayoutFrame> {
        self.simulation.as_ref().map(SimulationHandle::latest)
    }

    /// Sprites for the current graph at the latest frame.
    pub fn scene(&self) -> Option<Scene> {
        let graph = self.graph.as_ref()?;
        let frame = self.frame()?;
        Some(Scene::build(graph, &frame, &self.settings, self.viewport))
    }

    // ── Inbound callbacks ────────────────────────────────────────────────

    /// Merge `patch` into the filters and start a new fetch.
    ///
    /// Invalid filters are rejected before anything changes. Returns the new
    /// generation.
    pub fn on_filter_change(&mut self, patch: PartialFilters) -> Result<u64, GraphError> {
        let next = self.filters.merged(&patch);
        next.validate(self.fetcher.max_window())?;
        self.filters = next;
        Ok(self.start_fetch())
    }

    /// Re-run the current query.
    pub fn refresh(&mut self) -> Result<u64, GraphError> {
        self.on_filter_change(PartialFilters::default())
    }

    /// Merge `patch` into the visual settings.
    ///
    /// Changes to size or force strength rebuild the running simulation's
    /// forces and reheat it; positions are kept.
    pub fn on_visual_settings_change(
        &mut self,
        patch: PartialVisualSettings,
    ) -> Result<(), GraphError> {
        let next = self.settings.merged(&patch)?;
        if self.settings.affects_layout(&next) {
            if let Some(sim) = &self.simulation {
                sim.update_settings(next, self.viewport)?;
            }
        }
        self.settings = next;
        Ok(())
    }

    /// The render surface changed size.
    pub fn on_resize(&mut self, viewport: Viewport) -> Result<(), GraphError> {
        if let Some(sim) = &self.simulation {
            sim.update_settings(self.settings, viewport)?;
        }
        self.viewport = viewport;
        Ok(())
    }

    // ── Drag ─────────────────────────────────────────────────────────────

    /// Pin `id` under the pointer. If the simulation cannot take the pin,
    /// no drag is started.
    pub fn drag_start(&mut self, id: &WalletId, world: Point) -> Result<(), GraphError> {
        let cmd = self.interaction.drag_start(id, world);
        if let Err(e) = self.send_layout(cmd) {
            self.interaction.drag_end();
            return Err(e.into());
        }
        Ok(())
    }

    pub fn drag_move(&mut self, world: Point) -> Result<(), GraphError> {
        match self.interaction.drag_move(world) {
            Some(cmd) => Ok(self.send_layout(cmd)?),
            None => Ok(()),
        }
    }

    pub fn drag_end(&mut self) -> Result<(), GraphError> {
        match self.interaction.drag_end() {
            Some(cmd) => Ok(self.send_layout(cmd)?),
            None => Ok(()),
        }
    }

    fn send_layout(&self, cmd: LayoutCommand) -> Result<(), LayoutError> {
        self.simulation
            .as_ref()
            .ok_or(LayoutError::NotRunning)?
            .send(cmd)
    }

    // ── Events ───────────────────────────────────────────────────────────

    /// Next view event for the current generation.
    ///
    /// Waits indefinitely while no fetch is in flight.
    pub async fn next_event(&mut self) -> Option<ViewEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                if event.generation() == self.generation() {
                    return Some(event);
                }
                continue;
            }
            let msg = self.msg_rx.recv().await?;
            if let Some(event) = self.accept(msg) {
                return Some(event);
            }
        }
    }

    /// Stop fetching and laying out. Later messages from in-flight work are
    /// discarded.
    pub async fn shutdown(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
        if let Some(mut sim) = self.simulation.take() {
            sim.stop().await;
        }
        self.pending.clear();
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn start_fetch(&mut self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(task) = self.fetch_task.take() {
            tracing::debug!(generation, "Superseding in-flight fetch");
            task.abort();
        }
        // a rebuild always starts from fresh seed positions
        self.simulation = None;
        self.graph = None;
        self.interaction = Interaction::new();

        self.pending.clear();
        tracing::info!(
            generation,
            currency = %self.filters.currency,
            instrument_type = %self.filters.instrument_type,
            "Fetching trade graph"
        );
        self.pending.push_back(ViewEvent::Loading { generation });

        let fetcher = Arc::clone(&self.fetcher);
        let filters = self.filters.clone();
        let viewport = self.viewport;
        let current = Arc::clone(&self.generation);
        let tx = self.msg_tx.clone();

        self.fetch_task = Some(tokio::spawn(async move {
            let progress_tx = tx.clone();
            let on_progress = |progress: FetchProgress| {
                if current.load(Ordering::SeqCst) == generation {
                    let _ = progress_tx.try_send(TaskMessage::Progress {
                        generation,
                        progress,
                    });
                }
            };

            let result = fetcher
                .fetch_all(&filters, on_progress)
                .await
                .map(|history| aggregate(&history.trades, viewport));

            let _ = tx.send(TaskMessage::Done { generation, result }).await;
        }));

        generation
    }

    /// Turn a task message into a view event, discarding stale generations.
    fn accept(&mut self, msg: TaskMessage) -> Option<ViewEvent> {
        let current = self.generation();

        match msg {
            TaskMessage::Progress {
                generation,
                progress,
            } if generation == current => Some(ViewEvent::Progress {
                generation,
                progress,
            }),
            TaskMessage::Progress { .. } => None,
            TaskMessage::Done { generation, .. } if generation != current => {
                tracing::debug!(generation, current, "Discarding stale fetch result");
                None
            }
            TaskMessage::Done { generation, result } => {
                self.fetch_task = None;
                Some(match result {
                    Ok(graph) if graph.is_empty() => {
                        tracing::info!(generation, "Trade graph empty");
                        self.graph = Some(Arc::new(graph));
                        ViewEvent::Empty { generation }
                    }
                    Ok(graph) => {
                        let stats = graph.stats.clone();
                        tracing::info!(
                            generation,
                            wallets = stats.wallet_count,
                            links = stats.link_count,
                            "Trade graph ready"
                        );
                        self.seed_layout(graph);
                        ViewEvent::Ready { generation, stats }
                    }
                    Err(error) => {
                        tracing::warn!(generation, "Trade graph failed: {}", error);
                        ViewEvent::Failed {
                            generation,
                            error: Arc::new(error),
                        }
                    }
                })
            }
        }
    }

    fn seed_layout(&mut self, graph: TradeGraph) {
        // never two simulations over the same view
        self.simulation = None;
        let sim = Simulation::new(&graph, &self.settings, self.viewport);
        self.simulation = Some(SimulationHandle::spawn(sim, self.tick_interval));
        self.graph = Some(Arc::new(graph));
    }
}

impl<S> Drop for GraphController<S> {
    fn drop(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
    }
}
