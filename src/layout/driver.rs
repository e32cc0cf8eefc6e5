//! Native simulation driver: ticks a [`Simulation`] on a background tokio task.
//!
//! - Fixed-interval ticks while the layout is moving, each run on the
//!   blocking pool
//! - Idles on the command channel once settled
//! - Frames published through a `watch` channel (latest wins)
//! - Commands (pin/release/settings/stop) through an mpsc channel

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{LayoutCommand, LayoutFrame, LayoutPhase, Simulation};
use crate::error::LayoutError;
use crate::settings::VisualSettings;
use crate::shared::{Point, Viewport, WalletId};

/// Roughly one display frame.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Handle to a simulation running on a background task.
///
/// Dropping the handle aborts the task.
pub struct SimulationHandle {
    cmd_tx: mpsc::Sender<LayoutCommand>,
    frames: watch::Receiver<LayoutFrame>,
    task_handle: Option<JoinHandle<()>>,
}

impl SimulationHandle {
    /// Spawn `simulation` on the current tokio runtime.
    pub fn spawn(simulation: Simulation, tick_interval: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (frame_tx, frames) = watch::channel(simulation.frame());

        let handle = tokio::spawn(run_task(simulation, tick_interval, cmd_rx, frame_tx));

        Self {
            cmd_tx,
            frames,
            task_handle: Some(handle),
        }
    }

    /// Queue a command for the next tick.
    pub fn send(&self, command: LayoutCommand) -> Result<(), LayoutError> {
        if self.task_handle.is_none() {
            return Err(LayoutError::NotRunning);
        }
        self.cmd_tx.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => LayoutError::ChannelFull,
            mpsc::error::TrySendError::Closed(_) => LayoutError::NotRunning,
        })
    }

    pub fn pin(&self, id: WalletId, at: Point) -> Result<(), LayoutError> {
        self.send(LayoutCommand::Pin {
            id,
            x: at.x,
            y: at.y,
        })
    }

    pub fn release(&self, id: WalletId) -> Result<(), LayoutError> {
        self.send(LayoutCommand::Release { id })
    }

    pub fn update_settings(
        &self,
        settings: VisualSettings,
        viewport: Viewport,
    ) -> Result<(), LayoutError> {
        self.send(LayoutCommand::UpdateSettings { settings, viewport })
    }

    /// A receiver for published frames.
    pub fn frames(&self) -> watch::Receiver<LayoutFrame> {
        self.frames.clone()
    }

    /// Most recently published frame.
    pub fn latest(&self) -> LayoutFrame {
        self.frames.borrow().clone()
    }

    /// Wait for the layout to settle.
    pub async fn settled(&self) -> Result<LayoutFrame, LayoutError> {
        let mut rx = self.frames.clone();
        let frame = rx
            .wait_for(|f| f.phase == LayoutPhase::Settled)
            .await
            .map_err(|_| LayoutError::NotRunning)?;
        Ok(frame.clone())
    }

    pub fn is_running(&self) -> bool {
        self.task_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the tick task and wait for it to exit.
    pub async fn stop(&mut self) {
        let _ = self.cmd_tx.send(LayoutCommand::Stop).await;

        if let Some(handle) = self.task_handle.take() {
            if tokio::time::timeout(Duration::from_secs(1), handle)
                .await
                .is_err()
            {
                tracing::warn!("Simulation task did not stop in time");
            }
        }
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

async fn run_task(
    mut sim: Simulation,
    tick_interval: Duration,
    mut cmd_rx: mpsc::Receiver<LayoutCommand>,
    frame_tx: watch::Sender<LayoutFrame>,
) {
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if sim.is_settled() {
            match cmd_rx.recv().await {
                Some(cmd) => {
                    if !apply(&mut sim, cmd) {
                        break;
                    }
                    interval.reset();
                }
                None => break,
            }
            continue;
        }

        tokio::select! {
            _ = interval.tick() => {
                sim = match tick_off_runtime(sim).await {
                    Some(sim) => sim,
                    None => return,
                };
                let _ = frame_tx.send(sim.frame());
                if sim.is_settled() {
                    tracing::debug!(ticks = sim.ticks(), "Simulation settled");
                }
            }
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => {
                    if !apply(&mut sim, cmd) {
                        break;
                    }
                }
                None => break,
            }
        }
    }

    tracing::debug!(ticks = sim.ticks(), "Simulation task stopped");
}

/// Run one tick on the blocking pool so large graphs never stall the
/// runtime's async workers. `None` if the tick panicked.
async fn tick_off_runtime(mut sim: Simulation) -> Option<Simulation> {
    match tokio::task::spawn_blocking(move || {
        sim.tick();
        sim
    })
    .await
    {
        Ok(sim) => Some(sim),
        Err(e) => {
            tracing::warn!("Simulation tick failed: {}", e);
            None
        }
    }
}

/// Returns `false` when the task should exit.
fn apply(sim: &mut Simulation, cmd: LayoutCommand) -> bool {
    match sim.apply(cmd) {
        Ok(keep_running) => keep_running,
        Err(e) => {
            tracing::warn!("Ignoring layout command: {}", e);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::{aggregate, TradeGraph};
    use crate::domain::trade::Trade;
    use crate::shared::Direction;

    const FAST: Duration = Duration::from_millis(1);

    fn graph() -> TradeGraph {
        let leg = |id: &str, wallet: &str, direction| Trade {
            trade_id: id.into(),
            wallet: wallet.into(),
            subaccount_id: 1,
            direction,
            trade_amount: 1.0,
            trade_price: 2000.0,
            index_price: 2000.0,
            timestamp: 0,
        };
        aggregate(
            &[
                leg("t1", "A", Direction::Sell),
                leg("t1", "B", Direction::Buy),
                leg("t2", "B", Direction::Sell),
                leg("t2", "C", Direction::Buy),
            ],
            Viewport::default(),
        )
    }

    fn spawn(g: &TradeGraph) -> SimulationHandle {
        let sim = Simulation::with_seed(g, &VisualSettings::default(), Viewport::default(), 9);
        SimulationHandle::spawn(sim, FAST)
    }

    #[tokio::test]
    async fn test_runs_until_settled() {
        let handle = spawn(&graph());
        let frame = handle.settled().await.unwrap();
        assert_eq!(frame.phase, LayoutPhase::Settled);
        assert!(frame.tick > 0);
        assert_eq!(frame.positions.len(), 3);
        assert!(handle.is_running());
    }

    #[tokio::test]
    async fn test_pin_holds_node_until_release() {
        let handle = spawn(&graph());
        handle.settled().await.unwrap();

        let at = Point::new(20.0, 30.0);
        handle.pin("B".into(), at).unwrap();

        let mut frames = handle.frames();
        let frame = frames
            .wait_for(|f| f.phase == LayoutPhase::Perturbed)
            .await
            .unwrap()
            .clone();
        assert_eq!(frame.position(1), Some(at));

        handle.release("B".into()).unwrap();
        let frame = handle.settled().await.unwrap();
        assert!(frame.alpha < crate::layout::ALPHA_MIN);
    }

    #[tokio::test]
    async fn test_stop_ends_task() {
        let mut handle = spawn(&graph());
        handle.stop().await;
        assert!(!handle.is_running());
        assert_eq!(
            handle.release("A".into()),
            Err(LayoutError::NotRunning)
        );
    }

    #[tokio::test]
    async fn test_unknown_node_does_not_kill_task() {
        let handle = spawn(&graph());
        handle.pin("nobody".into(), Point::new(0.0, 0.0)).unwrap();
        handle.settled().await.unwrap();
        assert!(handle.is_running());
    }

    #[tokio::test]
    async fn test_large_graph_ticks_without_blocking_the_runtime() {
        let wallets: Vec<String> = (0..2000).map(|i| format!("0x{i:04x}")).collect();
        let trades: Vec<Trade> = (0..wallets.len())
            .flat_map(|i| {
                let id = format!("t{i}");
                let leg = |wallet: &str, direction| Trade {
                    trade_id: id.as_str().into(),
                    wallet: wallet.into(),
                    subaccount_id: 1,
                    direction,
                    trade_amount: 1.0,
                    trade_price: 2000.0,
                    index_price: 2000.0,
                    timestamp: 0,
                };
                [
                    leg(&wallets[i], Direction::Sell),
                    leg(&wallets[(i + 1) % wallets.len()], Direction::Buy),
                ]
            })
            .collect();
        let g = aggregate(&trades, Viewport::default());
        assert_eq!(g.nodes.len(), 2000);

        let mut handle = spawn(&g);
        let mut frames = handle.frames();

        // a timer on the same current-thread runtime keeps firing while ticks run
        let mut timer_fires = 0;
        let ticked = loop {
            tokio::time::sleep(Duration::from_millis(1)).await;
            timer_fires += 1;
            if frames.borrow_and_update().tick >= 3 {
                break true;
            }
            if timer_fires > 10_000 {
                break false;
            }
        };
        assert!(ticked);
        assert!(timer_fires > 1);
        handle.stop().await;
    }
}
