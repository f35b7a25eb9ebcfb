//! Collaborators outside the battle engine.
//!
//! The engine reaches the rest of the game only through these traits:
//! a ticket store gating entry, a reward sink credited on victory, and the
//! idle loop that pauses for the battle's lifetime. [`PlayerWallet`] is the
//! in-memory implementation used by the simulator and tests.

use crate::battle::rewards::BattleRewards;
use crate::data::InscriptionInstance;
use serde::{Deserialize, Serialize};

pub trait TicketStore {
    /// Takes one ticket. Returns false if none are left.
    fn consume_ticket(&mut self) -> bool;
    fn refund_ticket(&mut self);
}

pub trait RewardSink {
    fn grant_rewards(&mut self, rewards: &BattleRewards);
}

pub trait IdleLoopControl {
    fn pause_idle_loop(&mut self);
    fn resume_idle_loop(&mut self);
}

/// Everything a battle session needs from its host.
pub trait BattleHost: TicketStore + RewardSink + IdleLoopControl {}

impl<T: TicketStore + RewardSink + IdleLoopControl> BattleHost for T {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerWallet {
    pub tickets: u32,
    pub gold: u64,
    pub seal_stones: u64,
    pub inventory: Vec<InscriptionInstance>,
    pub idle_loop_paused: bool,
    pub rewards_granted: u32,
    pub tickets_refunded: u32,
}

impl PlayerWallet {
    pub fn with_tickets(tickets: u32) -> Self {
        Self {
            tickets,
            ..Default::default()
        }
    }
}

impl TicketStore for PlayerWallet {
    fn consume_ticket(&mut self) -> bool {
        if self.tickets == 0 {
            return false;
        }
        self.tickets -= 1;
        true
    }

    fn refund_ticket(&mut self) {
        self.tickets += 1;
        self.tickets_refunded += 1;
    }
}

impl RewardSink for PlayerWallet {
    fn grant_rewards(&mut self, rewards: &BattleRewards) {
        self.gold += rewards.gold;
        self.seal_stones += rewards.seal_stones;
        if let Some(item) = &rewards.bonus_item {
            self.inventory.push(item.clone());
        }
        self.rewards_granted += 1;
    }
}

impl IdleLoopControl for PlayerWallet {
    fn pause_idle_loop(&mut self) {
        self.idle_loop_paused = true;
    }

    fn resume_idle_loop(&mut self) {
        self.idle_loop_paused = false;
    }
}
