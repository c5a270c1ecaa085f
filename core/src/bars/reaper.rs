//! Background teardown of superseded renderers
//!
//! Every replaced handle is closed by its own task, so a renderer that never
//! exits only holds its own task. Submitting never waits on a renderer.
//! Failures are logged; nothing is reported back to the caller.

use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::sleep;

use super::process::BarProcess;

#[derive(Default)]
pub struct Reaper {
    tasks: JoinSet<()>,
}

impl Reaper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of teardowns not yet finished.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Hand superseded handles off for teardown, each after `settle` when
    /// given. Handles that are not running are dropped right away. Must be
    /// called inside a tokio runtime.
    pub fn submit(&mut self, bars: Vec<BarProcess>, settle: Option<Duration>) {
        // Drop finished tasks so the set only holds pending teardowns
        while let Some(done) = self.tasks.try_join_next() {
            log_join_error(done);
        }

        for bar in bars.into_iter().filter(BarProcess::is_running) {
            self.tasks.spawn(close_superseded(bar, settle));
        }
    }

    /// Wait for every pending teardown. A renderer that ignores end of input
    /// keeps this waiting until it exits.
    pub async fn shutdown(&mut self) {
        if !self.tasks.is_empty() {
            tracing::debug!(pending = self.tasks.len(), "Waiting for bar teardowns");
        }
        while let Some(done) = self.tasks.join_next().await {
            log_join_error(done);
        }
    }
}

async fn close_superseded(mut bar: BarProcess, settle: Option<Duration>) {
    if let Some(delay) = settle {
        sleep(delay).await;
    }
    if let Err(e) = bar.close().await {
        tracing::warn!(bar = ?bar, error = %e, "Failed to close superseded bar");
    }
}

fn log_join_error(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        tracing::warn!(error = %e, "Bar teardown task failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barkeep_types::RendererConfig;

    fn sh(script: &str) -> RendererConfig {
        RendererConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string(), "renderer".to_string()],
        }
    }

    fn pid_alive(pid: u32) -> bool {
        std::path::Path::new(&format!("/proc/{pid}")).exists()
    }

    #[tokio::test]
    async fn shutdown_waits_for_pending_closes() {
        let mut reaper = Reaper::new();
        let bars: Vec<BarProcess> = (0..3)
            .map(|i| BarProcess::spawn(format!("main bar, monitor {i}"), &sh("cat > /dev/null"), vec![]).unwrap())
            .collect();
        let pids: Vec<u32> = bars.iter().filter_map(|b| b.id()).collect();
        assert_eq!(pids.len(), 3);

        reaper.submit(bars, Some(Duration::from_millis(50)));
        assert_eq!(reaper.pending(), 3);
        reaper.shutdown().await;
        assert_eq!(reaper.pending(), 0);

        // Reaped children no longer show up in /proc
        for pid in pids {
            assert!(!pid_alive(pid));
        }
    }

    #[tokio::test]
    async fn stuck_renderer_does_not_hold_others() {
        let mut reaper = Reaper::new();
        let stuck = BarProcess::spawn("left bar, monitor 0", &sh("exec sleep 2"), vec![]).unwrap();
        let healthy = BarProcess::spawn("left bar, monitor 1", &sh("cat > /dev/null"), vec![]).unwrap();
        let stuck_pid = stuck.id().unwrap();
        let healthy_pid = healthy.id().unwrap();

        reaper.submit(vec![stuck, healthy, BarProcess::empty("main bar, monitor 0")], None);
        assert_eq!(reaper.pending(), 2);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!pid_alive(healthy_pid));
        assert!(pid_alive(stuck_pid));

        reaper.shutdown().await;
        assert!(!pid_alive(stuck_pid));
    }
}
