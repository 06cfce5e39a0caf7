use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tisc::engine::progress::{Progress, ProgressCallback};
use tisc::engine::state::{PointStatus, StatusCounts};
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

struct BarState {
    pb: ProgressBar,
    settled: StatusCounts,
}

impl BarState {
    fn record(&mut self, status: PointStatus) {
        match status {
            PointStatus::Converged => self.settled.converged += 1,
            PointStatus::Exhausted => self.settled.exhausted += 1,
            PointStatus::Failed => self.settled.failed += 1,
        }
        let StatusCounts {
            converged,
            exhausted,
            failed,
        } = self.settled;
        self.pb
            .set_message(format!("{converged} ok / {exhausted} capped / {failed} failed"));
    }
}

#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<BarState>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(target);
        pb.disable_steady_tick();
        pb.finish_and_clear();

        Self {
            state: Arc::new(Mutex::new(BarState {
                pb,
                settled: StatusCounts::default(),
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = self.state.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut guard) = state.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    guard.pb.reset();
                    guard.pb.set_length(0);
                    guard.pb.set_style(Self::spinner_style());
                    guard
                        .pb
                        .enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    guard.pb.set_message(name.to_string());
                }
                Progress::PhaseFinish => {
                    guard.pb.disable_steady_tick();
                    guard.pb.finish_with_message("✓ Done");
                }
                Progress::TaskStart { total_steps } => {
                    guard.settled = StatusCounts::default();
                    guard.pb.disable_steady_tick();
                    guard.pb.reset();
                    guard.pb.set_length(total_steps);
                    guard.pb.set_position(0);
                    guard.pb.set_style(Self::bar_style());
                }
                Progress::TaskIncrement => {
                    guard.pb.inc(1);
                }
                Progress::PointSettled { status, .. } => guard.record(status),
                Progress::TaskFinish => {
                    let length = guard.pb.length().unwrap_or(0);
                    if guard.pb.position() < length {
                        guard.pb.set_position(length);
                    }
                    guard.pb.finish();
                }
                Progress::Message(msg) => {
                    if !guard.pb.is_finished() {
                        guard.pb.println(format!("  {}", msg));
                    } else {
                        guard.pb.set_message(msg);
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} k-points ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
