//! Battle session controller.
//!
//! A session is the single owner of [`BattleState`]. Timers on the virtual
//! clock post [`BattleCommand`]s to a queue; the session drains that queue
//! synchronously, so every command reads the state as it is at the moment
//! it runs. The first terminal condition observed ends the battle, cancels
//! every timer and settles with the host exactly once.

use super::abilities::{AbilityModifiers, ResolvedAbilities};
use super::attacker::{build_attacker_stats, PlayerProfile};
use super::damage::{calculate_damage, BossCombatStats, DamageResult};
use super::events::{BattleEvent, BattleLog, BattleOutcome, DefeatReason};
use super::pattern::{
    has_running_countdowns, on_activation, on_countdown_tick_holding, on_regen_tick,
    seed_initial_state, ArmedCountdowns, PatternContext,
};
use super::rewards::roll_rewards;
use super::scheduler::{Scheduler, TimerFire, TimerKind};
use super::state::BattleState;
use crate::core::config::BattleConfig;
use crate::core::error::BattleError;
use crate::data::{
    BossCatalog, DerivedInscription, DifficultyLevel, InscriptionCatalog, InscriptionInstance,
    ScaledBoss,
};
use crate::host::BattleHost;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// What the player asks for when entering the sealed zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleRequest {
    pub boss_id: String,
    pub difficulty: u32,
    /// Equipped inscriptions, one attack timer each
    pub loadout: Vec<InscriptionInstance>,
    pub profile: PlayerProfile,
}

/// Work items processed by the controller, in the order they were posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleCommand {
    Attack { slot: usize },
    BossAttack,
    PatternTick,
    RegenTick,
    CountdownTick { elapsed_ms: u64 },
    HealTick { slot: usize },
}

impl From<TimerFire> for BattleCommand {
    fn from(fire: TimerFire) -> Self {
        match fire.kind {
            TimerKind::Attack { slot } => BattleCommand::Attack { slot },
            TimerKind::BossAttack => BattleCommand::BossAttack,
            TimerKind::PatternActivation => BattleCommand::PatternTick,
            TimerKind::Regeneration => BattleCommand::RegenTick,
            TimerKind::Countdown => BattleCommand::CountdownTick {
                elapsed_ms: fire.interval_ms,
            },
            TimerKind::HealOverTime { slot } => BattleCommand::HealTick { slot },
        }
    }
}

/// Result of applying one landed hit to shield and HP.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageApplication {
    pub shield_absorbed: f64,
    pub hp_damage: f64,
    pub shield_broken: bool,
}

/// Routes a pipeline result into boss HP and shield HP.
///
/// Full bypass (or no shield) sends everything to HP. Otherwise shield
/// damage drains the shield first, overflow spills to HP, and the bypass
/// portion always lands on HP in the same step.
pub fn apply_damage_result(state: &mut BattleState, result: &DamageResult) -> DamageApplication {
    if !result.landed() {
        return DamageApplication::default();
    }
    if result.bypass_shield || !state.shield.active {
        return DamageApplication {
            hp_damage: state.damage_boss(result.damage),
            ..Default::default()
        };
    }

    let mut application = DamageApplication::default();
    let mut overflow = 0.0;
    if result.shield_damage < state.shield.hp {
        state.shield.hp -= result.shield_damage;
        application.shield_absorbed = result.shield_damage;
    } else {
        overflow = result.shield_damage - state.shield.hp;
        application.shield_absorbed = state.shield.hp;
        application.shield_broken = true;
        state.shield.clear();
    }
    application.hp_damage = state.damage_boss(overflow + result.shield_bypass_damage);
    application
}

#[derive(Debug, Clone)]
struct AbilitySlot {
    instance: InscriptionInstance,
    /// Grade-scaled stats fixed at battle start
    derived: DerivedInscription,
    abilities: ResolvedAbilities,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Active,
    Finished(BattleOutcome),
}

/// Snapshot kept after a session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSummary {
    pub session_id: Uuid,
    pub boss_id: String,
    pub difficulty: u32,
    pub started_at: i64,
    pub elapsed_ms: u64,
    pub outcome: Option<BattleOutcome>,
    pub total_attacks: u64,
    pub total_misses: u64,
    pub hearts_remaining: u32,
    pub boss_hp_remaining: f64,
}

#[derive(Debug)]
pub struct BattleSession {
    id: Uuid,
    started_at: i64,
    boss: ScaledBoss,
    boss_stats: BossCombatStats,
    profile: PlayerProfile,
    slots: Vec<AbilitySlot>,
    loadout: ResolvedAbilities,
    config: BattleConfig,
    state: BattleState,
    scheduler: Scheduler,
    queue: VecDeque<BattleCommand>,
    status: SessionStatus,
    log: BattleLog,
    /// Countdowns armed by the last activation, and the instant it ran
    armed: Option<(u64, ArmedCountdowns)>,
}

impl BattleSession {
    /// Validates the request, takes a ticket, pauses the idle loop and
    /// starts every timer. On error nothing has been touched.
    pub fn start<H: BattleHost>(
        request: &BattleRequest,
        bosses: &BossCatalog,
        inscriptions: &InscriptionCatalog,
        config: BattleConfig,
        host: &mut H,
    ) -> Result<Self, BattleError> {
        if request.loadout.is_empty() {
            return Err(BattleError::NoAbilityEquipped);
        }
        let definition = bosses
            .get(&request.boss_id)
            .ok_or_else(|| BattleError::UnknownBoss(request.boss_id.clone()))?;
        let difficulty = DifficultyLevel::new(request.difficulty)?;

        let mut slots = Vec::with_capacity(request.loadout.len());
        for instance in &request.loadout {
            let derived = inscriptions
                .derive(instance)
                .ok_or_else(|| BattleError::UnknownInscription(instance.inscription_id.clone()))?;
            slots.push(AbilitySlot {
                instance: instance.clone(),
                abilities: ResolvedAbilities::resolve(derived.ability_ids()),
                derived,
            });
        }

        if !host.consume_ticket() {
            return Err(BattleError::NoTicket);
        }
        host.pause_idle_loop();

        let boss = definition.scaled(difficulty);
        let loadout = ResolvedAbilities::merged(slots.iter().map(|s| &s.abilities));
        let mut state = BattleState::new(boss.max_hp, config.max_hearts, slots.len());
        let mut log = BattleLog::new();
        for event in seed_initial_state(&boss, &mut state) {
            log.record(0, &BattleEvent::Pattern(event));
        }

        let mut session = Self {
            id: Uuid::new_v4(),
            started_at: chrono::Utc::now().timestamp(),
            boss_stats: BossCombatStats::from(&boss),
            boss,
            profile: request.profile.clone(),
            slots,
            loadout,
            config,
            state,
            scheduler: Scheduler::new(),
            queue: VecDeque::new(),
            status: SessionStatus::Active,
            log,
            armed: None,
        };
        session.start_timers();

        tracing::info!(
            session = %session.id,
            boss = %session.boss.id,
            difficulty = difficulty.level(),
            slots = session.slots.len(),
            "sealed zone battle started"
        );
        Ok(session)
    }

    fn start_timers(&mut self) {
        for (index, slot) in self.slots.iter().enumerate() {
            self.scheduler
                .start(TimerKind::Attack { slot: index }, self.config.attack_interval_ms);
            if let Some(interval_ms) = slot.abilities.modifiers().heal_over_time_ms {
                self.scheduler
                    .start(TimerKind::HealOverTime { slot: index }, interval_ms);
            }
        }
        self.scheduler
            .start(TimerKind::BossAttack, self.config.boss_attack_interval_ms);
        if self.boss.pattern.is_active() {
            self.scheduler
                .start(TimerKind::PatternActivation, self.boss.pattern.interval_ms);
        }
        self.sync_conditional_timers();
    }

    /// Starts or stops the regeneration and countdown timers to match state.
    fn sync_conditional_timers(&mut self) {
        if self.state.pattern.is_regenerating {
            self.scheduler
                .ensure(TimerKind::Regeneration, self.config.regen_tick_ms);
        } else if self.scheduler.stop(TimerKind::Regeneration) {
            tracing::debug!(session = %self.id, "regeneration timer stopped");
        }

        if has_running_countdowns(&self.state) {
            self.scheduler
                .ensure(TimerKind::Countdown, self.config.countdown_tick_ms);
        } else if self.scheduler.stop(TimerKind::Countdown) {
            tracing::debug!(session = %self.id, "countdown timer stopped");
        }
    }

    /// Advances the virtual clock, running every timer that comes due.
    pub fn advance<H: BattleHost>(
        &mut self,
        elapsed_ms: u64,
        inscriptions: &InscriptionCatalog,
        host: &mut H,
        rng: &mut impl Rng,
    ) -> Vec<BattleEvent> {
        let mut events = Vec::new();
        if !self.is_active() {
            return events;
        }
        let target_ms = self.scheduler.now_ms() + elapsed_ms;
        while self.is_active() {
            let Some(fire) = self.scheduler.next_due(target_ms) else {
                break;
            };
            self.queue.push_back(BattleCommand::from(fire));
            events.extend(self.drain_queue(inscriptions, host, rng));
        }
        if self.is_active() {
            self.scheduler.settle(target_ms);
        }
        events
    }

    /// Posts a command outside the timer schedule and processes it now.
    pub fn dispatch<H: BattleHost>(
        &mut self,
        command: BattleCommand,
        inscriptions: &InscriptionCatalog,
        host: &mut H,
        rng: &mut impl Rng,
    ) -> Vec<BattleEvent> {
        if !self.is_active() {
            return Vec::new();
        }
        self.queue.push_back(command);
        self.drain_queue(inscriptions, host, rng)
    }

    /// Ends the battle as a defeat without rewards; the ticket is refunded.
    pub fn forfeit<H: BattleHost>(&mut self, host: &mut H) -> Vec<BattleEvent> {
        let events = self.finish(
            BattleOutcome::Defeat {
                reason: DefeatReason::Forfeit,
            },
            host,
        );
        for event in &events {
            self.log.record(self.scheduler.now_ms(), event);
        }
        events
    }

    fn drain_queue<H: BattleHost>(
        &mut self,
        inscriptions: &InscriptionCatalog,
        host: &mut H,
        rng: &mut impl Rng,
    ) -> Vec<BattleEvent> {
        let mut events = Vec::new();
        while let Some(command) = self.queue.pop_front() {
            if !self.is_active() {
                self.queue.clear();
                break;
            }
            events.extend(self.execute(command, inscriptions, rng));
            self.sync_conditional_timers();
            events.extend(self.check_terminal(host, rng));
        }
        let now = self.scheduler.now_ms();
        for event in &events {
            self.log.record(now, event);
        }
        events
    }

    fn execute(
        &mut self,
        command: BattleCommand,
        inscriptions: &InscriptionCatalog,
        rng: &mut impl Rng,
    ) -> Vec<BattleEvent> {
        match command {
            BattleCommand::Attack { slot } => self.run_attack(slot, inscriptions, rng),
            BattleCommand::BossAttack => {
                let remaining = self.state.lose_heart();
                vec![BattleEvent::HeartLost { remaining }]
            }
            BattleCommand::PatternTick => {
                let ctx = PatternContext {
                    boss: &self.boss,
                    loadout: self.loadout.modifiers(),
                    config: &self.config,
                };
                let events = on_activation(&ctx, &mut self.state, rng);
                self.armed = Some((
                    self.scheduler.now_ms(),
                    ArmedCountdowns::from_events(&events),
                ));
                events.into_iter().map(BattleEvent::Pattern).collect()
            }
            BattleCommand::RegenTick => on_regen_tick(&mut self.state, self.loadout.modifiers())
                .into_iter()
                .map(BattleEvent::Pattern)
                .collect(),
            BattleCommand::CountdownTick { elapsed_ms } => {
                // Countdowns armed at this same instant start ticking next fire.
                let now = self.scheduler.now_ms();
                let held = match &self.armed {
                    Some((at_ms, armed)) if *at_ms == now => armed.clone(),
                    _ => ArmedCountdowns::default(),
                };
                on_countdown_tick_holding(&mut self.state, elapsed_ms, &held)
                    .into_iter()
                    .map(BattleEvent::Pattern)
                    .collect()
            }
            BattleCommand::HealTick { .. } => {
                if self.state.restore_heart() {
                    vec![BattleEvent::HeartRestored {
                        remaining: self.state.hearts_remaining,
                    }]
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn run_attack(
        &mut self,
        index: usize,
        inscriptions: &InscriptionCatalog,
        rng: &mut impl Rng,
    ) -> Vec<BattleEvent> {
        let Some(slot) = self.slots.get(index) else {
            return Vec::new();
        };
        if !inscriptions.contains(&slot.instance.inscription_id) {
            tracing::warn!(
                session = %self.id,
                slot = index,
                inscription = %slot.instance.inscription_id,
                "inscription missing from catalog, skipping attack"
            );
            return vec![BattleEvent::AttackSkipped {
                slot: index,
                inscription_id: slot.instance.inscription_id.clone(),
            }];
        }
        let modifiers = slot.abilities.modifiers().clone();

        let mut events = Vec::new();
        for _ in 0..modifiers.hits_per_tick {
            if self.state.is_boss_defeated() {
                break;
            }
            let derived = &self.slots[index].derived;
            let attacker = build_attacker_stats(&self.profile, derived, &self.state);
            let result = calculate_damage(
                &attacker,
                &modifiers,
                &self.boss_stats,
                &self.state.pattern,
                &self.state.shield,
                &self.state.combat_counters[index],
                rng,
            );
            events.extend(self.apply_attack(index, &modifiers, &result));
        }
        events
    }

    fn apply_attack(
        &mut self,
        index: usize,
        modifiers: &AbilityModifiers,
        result: &DamageResult,
    ) -> Vec<BattleEvent> {
        let mut events = Vec::new();
        let counters = &mut self.state.combat_counters[index];
        counters.total_attacks += 1;

        if result.cleared_invincibility && self.state.pattern.is_invincible {
            self.state.pattern.is_invincible = false;
            self.state.pattern.invincible_remaining_ms = 0;
            events.push(BattleEvent::InvincibilityDestroyed { slot: index });
        }

        if result.is_invincible {
            events.push(BattleEvent::AttackBlocked { slot: index });
            return events;
        }

        let counters = &mut self.state.combat_counters[index];
        if result.is_miss {
            counters.total_misses += 1;
            counters.last_missed = true;
            if modifiers.crit_after_miss {
                counters.guaranteed_crit_next = true;
            }
            events.push(BattleEvent::AttackMissed { slot: index });
            return events;
        }
        counters.last_missed = false;
        counters.guaranteed_crit_next = false;

        let application = apply_damage_result(&mut self.state, result);
        events.push(BattleEvent::AttackLanded {
            slot: index,
            damage: result.damage,
            is_crit: result.is_crit,
            shield_absorbed: application.shield_absorbed,
            hp_damage: application.hp_damage,
        });
        if application.shield_broken {
            events.push(BattleEvent::ShieldBroken);
        }
        events
    }

    fn check_terminal<H: BattleHost>(
        &mut self,
        host: &mut H,
        rng: &mut impl Rng,
    ) -> Vec<BattleEvent> {
        if self.state.is_boss_defeated() {
            let rewards = roll_rewards(&self.boss, &self.config, rng);
            return self.finish(BattleOutcome::Victory { rewards }, host);
        }
        if self.state.is_player_defeated() {
            return self.finish(
                BattleOutcome::Defeat {
                    reason: DefeatReason::HeartsDepleted,
                },
                host,
            );
        }
        Vec::new()
    }

    /// Settles the battle once. Later calls are no-ops.
    fn finish<H: BattleHost>(&mut self, outcome: BattleOutcome, host: &mut H) -> Vec<BattleEvent> {
        if !self.is_active() {
            return Vec::new();
        }
        self.scheduler.cancel_all();
        self.queue.clear();

        match &outcome {
            BattleOutcome::Victory { rewards } => host.grant_rewards(rewards),
            BattleOutcome::Defeat { .. } => host.refund_ticket(),
        }
        host.resume_idle_loop();
        self.status = SessionStatus::Finished(outcome.clone());

        tracing::info!(
            session = %self.id,
            boss = %self.boss.id,
            victory = outcome.is_victory(),
            elapsed_ms = self.scheduler.now_ms(),
            "sealed zone battle finished"
        );
        vec![BattleEvent::BattleEnded { outcome }]
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn boss(&self) -> &ScaledBoss {
        &self.boss
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn outcome(&self) -> Option<&BattleOutcome> {
        match &self.status {
            SessionStatus::Finished(outcome) => Some(outcome),
            SessionStatus::Active => None,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn active_timer_count(&self) -> usize {
        self.scheduler.active_count()
    }

    pub fn is_timer_running(&self, kind: TimerKind) -> bool {
        self.scheduler.is_running(kind)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Loadout-wide ability modifiers.
    pub fn loadout(&self) -> &AbilityModifiers {
        self.loadout.modifiers()
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn summary(&self) -> BattleSummary {
        let totals = self.state.totals();
        BattleSummary {
            session_id: self.id,
            boss_id: self.boss.id.clone(),
            difficulty: self.boss.difficulty.level(),
            started_at: self.started_at,
            elapsed_ms: self.scheduler.now_ms(),
            outcome: self.outcome().cloned(),
            total_attacks: totals.total_attacks,
            total_misses: totals.total_misses,
            hearts_remaining: self.state.hearts_remaining,
            boss_hp_remaining: self.state.boss_hp,
        }
    }
}
