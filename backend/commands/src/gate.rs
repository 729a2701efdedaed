//! Command admission gate: duplicate suppression, per-user cooldown, and a
//! cap on concurrently running commands.
//!
//! All three checks and the bookkeeping happen under one lock so two
//! deliveries of the same message can never both pass.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::types::CommandKind;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { base: Instant::now(), offset: Mutex::new(Duration::ZERO) }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap_or_else(PoisonError::into_inner) += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatePolicy {
    /// How long a message id is remembered for duplicate suppression.
    pub dedup_ttl: Duration,
    /// Minimum gap between two accepted commands of one user.
    pub cooldown: Duration,
    pub max_active: usize,
    /// Active entries older than this are considered abandoned.
    pub active_timeout: Duration,
    pub sweep_interval: Duration,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            dedup_ttl: Duration::from_secs(30),
            cooldown: Duration::from_millis(3000),
            max_active: 3,
            active_timeout: Duration::from_secs(120),
            sweep_interval: Duration::from_secs(10),
        }
    }
}

/// Why a command was not admitted. Drops are silent towards the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Duplicate,
    Cooldown,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateStats {
    pub processed_messages: usize,
    pub active_commands: usize,
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

struct ActiveEntry {
    user_id: String,
    command: CommandKind,
    started: Instant,
}

#[derive(Default)]
struct GateState {
    seen: HashMap<String, Instant>,
    cooldowns: HashMap<String, Instant>,
    active: HashMap<String, ActiveEntry>,
}

pub struct CommandGate {
    policy: GatePolicy,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<GateState>>,
}

impl CommandGate {
    pub fn new(policy: GatePolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: GatePolicy, clock: Arc<dyn Clock>) -> Self {
        Self { policy, clock, state: Arc::new(Mutex::new(GateState::default())) }
    }

    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit a command or say why not. The returned guard keeps the command
    /// counted as active until it is dropped.
    pub fn admit(&self, message_id: &str, user_id: &str, command: CommandKind) -> Result<ActiveCommand, DropReason> {
        let now = self.clock.now();
        let mut state = self.lock();

        if state.seen.contains_key(message_id) {
            debug!(message_id, "Message already processed, skipping");
            return Err(DropReason::Duplicate);
        }
        if let Some(last) = state.cooldowns.get(user_id) {
            if now.saturating_duration_since(*last) < self.policy.cooldown {
                debug!(user_id, "User in cooldown, skipping");
                return Err(DropReason::Cooldown);
            }
        }
        if state.active.len() >= self.policy.max_active {
            debug!(active = state.active.len(), "Too many active commands, skipping");
            return Err(DropReason::Busy);
        }

        state.seen.insert(message_id.to_string(), now);
        state.cooldowns.insert(user_id.to_string(), now);
        state.active.insert(
            message_id.to_string(),
            ActiveEntry { user_id: user_id.to_string(), command, started: now },
        );
        debug!(message_id, user_id, %command, "Command admitted");

        Ok(ActiveCommand { message_id: message_id.to_string(), state: Arc::clone(&self.state) })
    }

    /// Forget expired message ids, cooldowns and abandoned active entries.
    pub fn sweep(&self) {
        let now = self.clock.now();
        let policy = &self.policy;
        let mut state = self.lock();
        state.seen.retain(|_, at| now.saturating_duration_since(*at) <= policy.dedup_ttl);
        state.cooldowns.retain(|_, at| now.saturating_duration_since(*at) < policy.cooldown);
        state.active.retain(|id, entry| {
            let keep = now.saturating_duration_since(entry.started) <= policy.active_timeout;
            if !keep {
                debug!(message_id = %id, user_id = %entry.user_id, command = %entry.command, "Dropping stale active command");
            }
            keep
        });
    }

    /// Run [`sweep`](Self::sweep) every `sweep_interval` until the task is aborted.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let gate = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(gate.policy.sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                gate.sweep();
            }
        })
    }

    pub fn stats(&self) -> GateStats {
        let state = self.lock();
        GateStats { processed_messages: state.seen.len(), active_commands: state.active.len() }
    }
}

/// Held while a command runs.
pub struct ActiveCommand {
    message_id: String,
    state: Arc<Mutex<GateState>>,
}

impl Drop for ActiveCommand {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.active.remove(&self.message_id);
    }
}
