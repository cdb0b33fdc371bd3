//! The conversion trigger: one conversion at a time.
//!
//! While a conversion runs the control is disabled and shows progress.
//! Once the attempt settles it shows the outcome for a fixed delay, then
//! goes back to idle and accepts a new conversion.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

/// How long a settled outcome stays visible.
pub const RESET_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Idle,
    Extracting,
    Converting,
    Succeeded,
    Failed,
    ExtractionFailed,
}

impl ControlState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "📊 Convert to Google Slides",
            Self::Extracting => "⏳ Extracting...",
            Self::Converting => "🔄 Converting...",
            Self::Succeeded => "✅ Success!",
            Self::Failed => "❌ Failed",
            Self::ExtractionFailed => "❌ Extraction Failed",
        }
    }

    /// Only an idle control accepts a new conversion.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Busy(pub ControlState);

impl fmt::Display for Busy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A conversion is already running ({})", self.0.label())
    }
}

impl std::error::Error for Busy {}

#[derive(Debug, Clone)]
pub struct TriggerControl {
    state: Arc<Mutex<ControlState>>,
}

impl TriggerControl {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ControlState::Idle)),
        }
    }

    pub fn state(&self) -> ControlState {
        *self.lock()
    }

    pub fn label(&self) -> &'static str {
        self.state().label()
    }

    /// Start a conversion. Refused while another one is in flight or its
    /// outcome is still showing.
    pub fn begin(&self) -> Result<ConversionGuard, Busy> {
        let mut state = self.lock();
        if !state.is_enabled() {
            log::debug!("Conversion already in progress ({:?})", *state);
            return Err(Busy(*state));
        }
        *state = ControlState::Extracting;

        Ok(ConversionGuard {
            control: self.clone(),
            settled: false,
        })
    }

    fn set(&self, next: ControlState) {
        *self.lock() = next;
    }

    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for TriggerControl {
    fn default() -> Self {
        Self::new()
    }
}

/// A conversion in flight. Dropping it unsettled returns the control to idle.
#[derive(Debug)]
pub struct ConversionGuard {
    control: TriggerControl,
    settled: bool,
}

impl ConversionGuard {
    /// Move to the upload phase.
    pub fn converting(&self) {
        self.control.set(ControlState::Converting);
    }

    /// The user declined; go straight back to idle.
    pub fn cancel(self) {
        drop(self);
    }

    /// Show `outcome`, then return to idle after `delay`.
    pub fn settle(mut self, outcome: ControlState, delay: Duration) -> JoinHandle<()> {
        self.settled = true;
        self.control.set(outcome);

        let control = self.control.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            control.set(ControlState::Idle);
        })
    }
}

impl Drop for ConversionGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.control.set(ControlState::Idle);
        }
    }
}
