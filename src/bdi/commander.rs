//! BDI Commander - belief/desire/intention team AI
//!
//! Every tick the commander ages and feeds its blackboard, then rebuilds its
//! beliefs. On the deliberation cadence it drops an intention whose desire
//! went stale and, if it has none, adopts the best desire. The active plan
//! runs every tick until the intention is dropped or times out.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::bdi::beliefs::BeliefBase;
use crate::bdi::desire::{select_desire, DesireKind};
use crate::bdi::intention::{Intention, Termination};
use crate::bdi::plan::{ClaimedCells, PlanContext};
use crate::blackboard::{Blackboard, NewCamp, SightingBatch};
use crate::core::config::CommanderConfig;
use crate::team::orders::Order;
use crate::team::view::WorldView;
use crate::team::TeamAi;

/// Running counters, mostly for the runner's summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommanderStats {
    pub ticks: u64,
    pub deliberations: u64,
    pub orders_issued: u64,
    pub timed_out: u64,
    pub invalidated: u64,
    /// Adoptions per desire
    pub adoptions: BTreeMap<DesireKind, u64>,
}

impl CommanderStats {
    pub fn total_adoptions(&self) -> u64 {
        self.adoptions.values().sum()
    }
}

pub struct BdiCommander {
    config: CommanderConfig,
    blackboard: Blackboard,
    beliefs: BeliefBase,
    intention: Option<Intention>,
    claimed: ClaimedCells,
    deliberation_timer: f32,
    rng: StdRng,
    stats: CommanderStats,
}

impl BdiCommander {
    /// Create a commander seeded from its configuration
    pub fn new(config: CommanderConfig) -> Self {
        let seed = config.seed;
        Self::with_seed(config, seed)
    }

    /// Create with specific RNG seed for deterministic behavior
    pub fn with_seed(config: CommanderConfig, seed: u64) -> Self {
        Self {
            blackboard: Blackboard::new(&config),
            beliefs: BeliefBase::new(),
            intention: None,
            claimed: ClaimedCells::new(),
            // first tick deliberates
            deliberation_timer: config.timing.deliberation_interval,
            rng: StdRng::seed_from_u64(seed),
            stats: CommanderStats::default(),
            config,
        }
    }

    pub fn config(&self) -> &CommanderConfig {
        &self.config
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn beliefs(&self) -> &BeliefBase {
        &self.beliefs
    }

    pub fn stats(&self) -> &CommanderStats {
        &self.stats
    }

    pub fn current_desire(&self) -> Option<DesireKind> {
        self.intention.as_ref().map(|i| i.desire())
    }

    pub fn intention(&self) -> Option<&Intention> {
        self.intention.as_ref()
    }

    pub fn claimed_cells(&self) -> &ClaimedCells {
        &self.claimed
    }

    /// Camps recorded for the first time since the last call
    pub fn take_new_camps(&mut self) -> Vec<NewCamp> {
        self.blackboard.take_new_camps()
    }

    fn drop_intention(&mut self, reason: Termination) {
        if let Some(intention) = self.intention.take() {
            match reason {
                Termination::Invalidated => self.stats.invalidated += 1,
                Termination::TimedOut => self.stats.timed_out += 1,
            }
            intention.terminate(reason);
        }
    }

    /// Validity check, then reselection when idle
    fn deliberate(&mut self) {
        self.stats.deliberations += 1;

        let stale = self
            .intention
            .as_ref()
            .map_or(false, |i| !i.is_valid(&self.beliefs));
        if stale {
            self.drop_intention(Termination::Invalidated);
        }

        tracing::debug!(
            commander = %self.config.name,
            holding = ?self.intention.as_ref().map(|i| i.desire()),
            stale,
            "Deliberating"
        );
        if self.intention.is_some() {
            return;
        }

        let Some((desire, utility)) = select_desire(&self.beliefs) else {
            return;
        };
        let plan = desire.generate_plan(&self.config);
        tracing::info!(
            desire = desire.name(),
            plan = plan.name(),
            utility,
            "Intention adopted"
        );
        self.intention = Some(Intention::new(
            desire,
            plan,
            self.config.timing.intention_timeout,
        ));
        self.claimed.clear();
        *self.stats.adoptions.entry(desire).or_default() += 1;
    }
}

impl TeamAi for BdiCommander {
    fn process_tick(
        &mut self,
        world: &dyn WorldView,
        sightings: SightingBatch,
        delta: f32,
    ) -> Vec<Order> {
        self.stats.ticks += 1;

        self.blackboard.age(delta);
        self.blackboard.ingest(sightings, world);
        self.beliefs
            .refresh(world, &self.blackboard, &self.config.beliefs);

        self.deliberation_timer += delta;
        if self.deliberation_timer >= self.config.timing.deliberation_interval {
            self.deliberation_timer = 0.0;
            self.deliberate();
        }

        let timed_out = self
            .intention
            .as_mut()
            .map_or(false, |i| i.advance(delta));
        if timed_out {
            self.drop_intention(Termination::TimedOut);
        }

        let mut orders = Vec::new();
        if let Some(intention) = self.intention.as_mut() {
            let mut ctx = PlanContext {
                beliefs: &self.beliefs,
                blackboard: &self.blackboard,
                world,
                config: &self.config,
                rng: &mut self.rng,
                orders: &mut orders,
            };
            intention.execute(&mut ctx, delta, &mut self.claimed);
        }

        self.stats.orders_issued += orders.len() as u64;
        orders
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}
