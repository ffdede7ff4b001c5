use crate::types::Domain;

/// Rearm counters of one actor, one per collision domain.
///
/// Each step counts down by one, never below zero, and the domain is rearmed
/// once the counter reads 0. A reload of `k` fires again `k` steps later.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Cooldown {
    actor: u32,
    tile: u32,
}

impl Cooldown {
    fn slot(&mut self, domain: Domain) -> &mut u32 {
        match domain {
            Domain::Actor => &mut self.actor,
            Domain::Tile => &mut self.tile,
        }
    }

    /// Advances one step; returns whether the domain may be tested this step.
    pub fn advance(&mut self, domain: Domain) -> bool {
        let count = self.slot(domain);
        *count = count.saturating_sub(1);
        *count == 0
    }

    /// Sets the counter to the value returned by a listener.
    pub fn reload(&mut self, domain: Domain, count: u32) {
        *self.slot(domain) = count;
    }

    pub fn count(&self, domain: Domain) -> u32 {
        match domain {
            Domain::Actor => self.actor,
            Domain::Tile => self.tile,
        }
    }
}
