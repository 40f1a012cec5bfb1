use anyhow::Result;
use tracing::info;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

/// Folds the tick's settlements into the ledgers and keeps derived state
/// (staff levels, hub tiers, campaigns) current.
pub struct BookkeepingSystem;

impl BookkeepingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BookkeepingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for BookkeepingSystem {
    fn name(&self) -> &str {
        "bookkeeping"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let default_satisfaction = world.config.economy.default_satisfaction;
        for settlement in std::mem::take(&mut world.pending) {
            world.ledger.book(ctx.day_of_cycle, settlement.profit);
            if let Some(delta) = settlement.satisfaction_delta {
                world
                    .route_stats
                    .record(&settlement.route_key, delta, 1, default_satisfaction);
            }
            if let Some(unserved) = settlement.unserved {
                world.ledger.unserved.push(unserved);
            }
        }

        for id in std::mem::take(&mut world.staff_credits) {
            if let Some(level) = world.staff.credit_flight(&id, &world.config.staff, rng) {
                info!(staff = %id, level, "staff promoted");
            }
        }

        let now = ctx.now;
        world.campaigns.retain(|c| c.expires_at > now);
        world.refresh_hub_tiers();
        Ok(())
    }
}
