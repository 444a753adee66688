/*!
Core bridge control loop

The only non-trivial logic in the crate: a loop that interleaves a
latency-sensitive gateway pump with periodic topology reporting and a drain
of messages addressed to the bridge itself. Per iteration, in order:

1. one gateway pump cycle, unconditionally;
2. if the reporting interval elapsed, snapshot membership, encode it, and
   hand the body to the reporter;
3. drain and log at most one pending inbound message.

The report send runs on a spawned task guarded by a single-permit semaphore
with a non-blocking try-acquire: at most one report is ever in flight, and
an in-flight report never starves the pump. If the slot is busy when the
timer fires, that tick's report is dropped.
*/

use crate::config::BridgeConfig;
use crate::error::Result;
use crate::mesh::MeshStack;
use crate::report::{encode_report, snapshot, Reporter};
use crate::types::InboundMessage;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

/// Wraparound-safe reporting timer over a u32 millisecond counter.
///
/// The counter is free-running and wraps; elapsed time is computed with
/// wrapping subtraction so the check stays correct across overflow. Single
/// writer: the control loop.
#[derive(Debug)]
pub struct ReportingTimer {
    last_fired_at: u32,
    interval: u32,
}

impl ReportingTimer {
    pub fn new(interval_ms: u32, now_ms: u32) -> Self {
        Self {
            last_fired_at: now_ms,
            interval: interval_ms,
        }
    }

    /// True once more than the interval has elapsed since the last fire,
    /// re-arming for the next interval. Never fires twice for one elapse.
    pub fn should_fire(&mut self, now_ms: u32) -> bool {
        if now_ms.wrapping_sub(self.last_fired_at) > self.interval {
            self.last_fired_at = now_ms;
            true
        } else {
            false
        }
    }
}

/// Drain at most one message addressed to this node.
///
/// Peeks the header to learn the payload size, then performs the consuming
/// read of exactly that many bytes. Logs type and id; returns `None`
/// without blocking or logging when nothing is queued.
pub fn drain_one<M: MeshStack + ?Sized>(mesh: &M) -> Option<InboundMessage> {
    let header = mesh.peek()?;
    let message = mesh.read(header.payload_len)?;
    info!(
        kind = message.kind,
        id = message.id,
        "received mesh message"
    );
    Some(message)
}

/// The bridge control loop
#[derive(Debug)]
pub struct ControlLoop<M: MeshStack> {
    mesh: Arc<M>,
    reporter: Arc<Reporter>,
    timer: ReportingTimer,
    started_at: Instant,
    report_slot: Arc<Semaphore>,
    metrics: Arc<LoopMetrics>,
}

impl<M: MeshStack + 'static> ControlLoop<M> {
    /// Build the loop from a validated configuration. Validation runs here
    /// as well, so a hand-built config with an interval outside the u32
    /// millisecond timer range is rejected rather than silently truncated.
    pub fn new(config: &BridgeConfig, mesh: Arc<M>, reporter: Reporter) -> Result<Self> {
        config.validate()?;
        let interval_ms = config.report_interval.as_millis() as u32;
        Ok(Self {
            mesh,
            reporter: Arc::new(reporter),
            timer: ReportingTimer::new(interval_ms, 0),
            started_at: Instant::now(),
            report_slot: Arc::new(Semaphore::new(1)),
            metrics: Arc::new(LoopMetrics::new()),
        })
    }

    /// Loop metrics, shared with the report tasks
    pub fn metrics(&self) -> Arc<LoopMetrics> {
        self.metrics.clone()
    }

    /// Free-running millisecond counter; wraps every ~49.7 days
    fn now_millis(&self) -> u32 {
        self.started_at.elapsed().as_millis() as u32
    }

    /// One loop iteration: pump, maybe report, drain
    pub async fn tick(&mut self) {
        self.mesh.pump().await;

        if self.timer.should_fire(self.now_millis()) {
            let nodes = snapshot(self.mesh.as_ref());
            let body = encode_report(self.mesh.local_identity(), &nodes);
            self.dispatch_report(body);
        }

        drain_one(self.mesh.as_ref());
    }

    /// Run until the process receives a shutdown signal
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        info!("bridge control loop running");

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = self.tick() => {
                    // Cooperative yield; the iteration itself never sleeps
                    tokio::task::yield_now().await;
                }
            }
        }

        info!("bridge control loop stopped");
    }

    /// Hand an encoded report to the send task, drop-if-busy. The snapshot
    /// was taken by the caller immediately before encoding, so a dropped
    /// body is never reused on a later tick.
    fn dispatch_report(&self, body: String) {
        match self.report_slot.clone().try_acquire_owned() {
            Ok(permit) => {
                let reporter = self.reporter.clone();
                let metrics = self.metrics.clone();
                tokio::spawn(async move {
                    match reporter.send(body).await {
                        Ok(()) => metrics.record_report_sent(),
                        Err(e) => {
                            warn!(category = e.category(), "topology report failed: {}", e);
                            metrics.record_report_failed();
                        }
                    }
                    drop(permit);
                });
            }
            Err(_) => {
                warn!("previous report still in flight, dropping this tick's report");
                self.metrics.record_report_dropped();
            }
        }
    }
}

/// Control loop counters
#[derive(Debug)]
pub struct LoopMetrics {
    reports_sent: parking_lot::Mutex<u64>,
    reports_failed: parking_lot::Mutex<u64>,
    reports_dropped: parking_lot::Mutex<u64>,
}

impl LoopMetrics {
    pub fn new() -> Self {
        Self {
            reports_sent: parking_lot::Mutex::new(0),
            reports_failed: parking_lot::Mutex::new(0),
            reports_dropped: parking_lot::Mutex::new(0),
        }
    }

    pub fn record_report_sent(&self) {
        *self.reports_sent.lock() += 1;
    }

    pub fn record_report_failed(&self) {
        *self.reports_failed.lock() += 1;
    }

    pub fn record_report_dropped(&self) {
        *self.reports_dropped.lock() += 1;
    }

    pub fn get_stats(&self) -> LoopStats {
        LoopStats {
            reports_sent: *self.reports_sent.lock(),
            reports_failed: *self.reports_failed.lock(),
            reports_dropped: *self.reports_dropped.lock(),
        }
    }
}

impl Default for LoopMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Control loop statistics
#[derive(Debug, Clone)]
pub struct LoopStats {
    pub reports_sent: u64,
    pub reports_failed: u64,
    pub reports_dropped: u64,
}
