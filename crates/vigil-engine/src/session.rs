//! Headless session runner.
//!
//! Drives the simulation once per frame, issues scripted commands when their
//! time comes up, and writes a final snapshot.

use std::collections::VecDeque;

use tracing::{debug, info, trace, warn};
use vigil_common::{VigilError, VigilResult};
use vigil_gameplay::{Command, CommandOutcome, SimEvent, Simulation, SnapshotStore};

use crate::config::{EngineConfig, ScriptedCommand, SessionConfig};
use crate::timing::FrameClock;

/// What happened during a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    /// Frames run
    pub frames: u64,
    /// Simulated seconds
    pub sim_seconds: f64,
    /// Final hero level
    pub level: u32,
    /// Final gold
    pub gold: u64,
    /// Final stage
    pub stage: u32,
    /// Enemies killed during the run
    pub kills: u64,
    /// Times the hero was revived
    pub revives: u64,
    /// Scripted commands accepted
    pub commands_applied: u32,
    /// Scripted commands rejected
    pub commands_rejected: u32,
    /// Average frame delta in milliseconds
    pub average_frame_ms: f32,
}

/// A simulation plus its pacing and script.
pub struct Session<S: SnapshotStore> {
    sim: Simulation<S>,
    clock: FrameClock,
    settings: SessionConfig,
    save_on_exit: bool,
    script: VecDeque<ScriptedCommand>,
    summary: SessionSummary,
    next_report: f64,
}

impl<S: SnapshotStore> Session<S> {
    /// Builds a session, resuming from `store` when configured to.
    pub fn new(config: &EngineConfig, store: S) -> Self {
        let sim = if config.save.load_on_start {
            Simulation::load(config.simulation.clone(), store)
        } else {
            Simulation::new(config.simulation.clone(), store)
        };

        Self {
            sim,
            clock: FrameClock::new(config.session.frame_rate).with_real_time(config.session.real_time),
            settings: config.session.clone(),
            save_on_exit: config.save.save_on_exit,
            script: config.script.iter().cloned().collect(),
            summary: SessionSummary::default(),
            next_report: config.session.report_interval_secs,
        }
    }

    /// Returns the simulation.
    #[must_use]
    pub fn simulation(&self) -> &Simulation<S> {
        &self.sim
    }

    /// Applies one command, mapping a rejection to the top-level error.
    pub fn issue(&mut self, command: Command) -> VigilResult<CommandOutcome> {
        self.sim
            .apply(command)
            .map_err(|e| VigilError::Command(e.to_string()))
    }

    /// Runs one frame. Returns the delta used.
    pub fn step(&mut self) -> f32 {
        let dt = self.clock.delta_time();
        self.issue_due_commands();
        self.sim.tick(dt);
        self.consume_events();
        self.maybe_report();
        dt
    }

    fn issue_due_commands(&mut self) {
        while self.script.front().is_some_and(|s| s.at <= self.sim.time()) {
            let Some(scripted) = self.script.pop_front() else { break };
            match self.issue(scripted.command) {
                Ok(outcome) => {
                    debug!(at = scripted.at, ?outcome, "Scripted command applied");
                    self.summary.commands_applied += 1;
                },
                Err(e) => {
                    warn!(at = scripted.at, "Scripted command failed: {}", e);
                    self.summary.commands_rejected += 1;
                },
            }
        }
    }

    fn consume_events(&mut self) {
        for event in self.sim.drain_events() {
            match event {
                SimEvent::EnemyKilled { .. } => self.summary.kills += 1,
                SimEvent::HeroRevived => self.summary.revives += 1,
                other => trace!(?other, "Event"),
            }
        }
    }

    fn maybe_report(&mut self) {
        if self.settings.report_interval_secs <= 0.0 || self.sim.time() < self.next_report {
            return;
        }
        self.next_report += self.settings.report_interval_secs;

        let view = self.sim.view();
        info!(
            time = view.time,
            level = view.hero.level,
            stage = view.stage,
            kills = view.stage_kills,
            required = view.stage_required,
            gold = view.hero.gold,
            enemies = view.enemies.len(),
            "Progress"
        );
    }

    /// Runs until the configured duration has been simulated.
    pub fn run(mut self) -> VigilResult<SessionSummary> {
        self.clock.reset();
        while self.sim.time() < self.settings.duration_secs {
            self.step();
            self.clock.sleep_remainder();
        }
        self.finish()
    }

    /// Writes the final snapshot if configured and returns the summary.
    pub fn finish(mut self) -> VigilResult<SessionSummary> {
        if self.save_on_exit {
            self.sim
                .save()
                .map_err(|e| VigilError::Snapshot(e.to_string()))?;
        }

        let hero = self.sim.hero();
        self.summary.frames = self.clock.frames();
        self.summary.sim_seconds = self.sim.time();
        self.summary.level = hero.level();
        self.summary.gold = hero.gold();
        self.summary.stage = self.sim.stage().level();
        self.summary.average_frame_ms = self.clock.average_frame_time_ms();

        if !self.script.is_empty() {
            warn!("{} scripted commands never ran", self.script.len());
        }

        info!(
            frames = self.summary.frames,
            level = self.summary.level,
            stage = self.summary.stage,
            gold = self.summary.gold,
            kills = self.summary.kills,
            revives = self.summary.revives,
            "Session complete"
        );
        Ok(self.summary)
    }
}
