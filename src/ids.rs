use serde::{Deserialize, Serialize};

/// Sequence generator for every identifier the simulation hands out.
///
/// Lives inside the `World` rather than in process-wide statics so that two
/// worlds built from the same scenario allocate the same ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    player: u64,
    ai: u64,
    pilots: u64,
    cabin_crews: u64,
    dispatchers: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn next_player_aircraft(&mut self) -> String {
        self.player += 1;
        format!("PL-{}", self.player)
    }

    pub fn next_ai_aircraft(&mut self) -> String {
        self.ai += 1;
        format!("AI-{}", self.ai)
    }

    pub fn next_pilot(&mut self) -> String {
        self.pilots += 1;
        format!("PIL-{}", self.pilots)
    }

    pub fn next_cabin_crew(&mut self) -> String {
        self.cabin_crews += 1;
        format!("CRW-{}", self.cabin_crews)
    }

    pub fn next_dispatcher(&mut self) -> String {
        self.dispatchers += 1;
        format!("DSP-{}", self.dispatchers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequences_are_independent_and_resettable() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next_player_aircraft(), "PL-1");
        assert_eq!(ids.next_player_aircraft(), "PL-2");
        assert_eq!(ids.next_ai_aircraft(), "AI-1");
        assert_eq!(ids.next_pilot(), "PIL-1");
        ids.reset();
        assert_eq!(ids.next_player_aircraft(), "PL-1");
    }
}
