//! The adopted desire and the plan pursuing it

use crate::bdi::beliefs::BeliefBase;
use crate::bdi::desire::DesireKind;
use crate::bdi::plan::{ClaimedCells, Plan, PlanContext, PlanStatus};

/// Why an intention ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Its desire stopped being relevant
    Invalidated,
    TimedOut,
}

#[derive(Debug)]
pub struct Intention {
    desire: DesireKind,
    plan: Box<dyn Plan>,
    timeout: f32,
    elapsed: f32,
    last_status: Option<PlanStatus>,
}

impl Intention {
    pub fn new(desire: DesireKind, plan: Box<dyn Plan>, timeout: f32) -> Self {
        Self {
            desire,
            plan,
            timeout,
            elapsed: 0.0,
            last_status: None,
        }
    }

    pub fn desire(&self) -> DesireKind {
        self.desire
    }

    pub fn plan_name(&self) -> &'static str {
        self.plan.name()
    }

    /// Execution time accumulated since adoption
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn last_status(&self) -> Option<PlanStatus> {
        self.last_status
    }

    pub fn is_valid(&self, beliefs: &BeliefBase) -> bool {
        self.desire.is_relevant(beliefs)
    }

    /// Account for `delta` seconds of execution; true once the timeout is reached
    pub fn advance(&mut self, delta: f32) -> bool {
        self.elapsed += delta;
        self.elapsed >= self.timeout
    }

    /// Run one plan step
    ///
    /// The status is only recorded. Success or failure of a step does not end
    /// the intention.
    pub fn execute(
        &mut self,
        ctx: &mut PlanContext<'_>,
        delta: f32,
        claimed: &mut ClaimedCells,
    ) -> PlanStatus {
        let status = self.plan.execute(ctx, delta, claimed);
        if self.last_status != Some(status) {
            tracing::debug!(
                desire = self.desire.name(),
                plan = self.plan.name(),
                ?status,
                "Plan status changed"
            );
        }
        self.last_status = Some(status);
        status
    }

    /// Release the plan's holdings; the intention is consumed
    pub fn terminate(mut self, reason: Termination) {
        self.plan.cleanup();
        tracing::info!(
            desire = self.desire.name(),
            elapsed = self.elapsed,
            ?reason,
            "Intention dropped"
        );
    }
}
