//! Sealed zone entry point.
//!
//! Owns the definition tables and at most one running battle. Finished
//! battles are moved into a summary history that keeps the most recent
//! `BATTLE_HISTORY_CAPACITY` entries.

use crate::battle::{BattleEvent, BattleRequest, BattleSession, BattleSummary};
use crate::core::{BattleConfig, BattleError, BATTLE_HISTORY_CAPACITY};
use crate::data::{BossCatalog, InscriptionCatalog};
use crate::host::BattleHost;
use rand::Rng;

#[derive(Debug, Default)]
pub struct SealedZone {
    bosses: BossCatalog,
    inscriptions: InscriptionCatalog,
    config: BattleConfig,
    active: Option<BattleSession>,
    history: Vec<BattleSummary>,
}

impl SealedZone {
    pub fn new(
        bosses: BossCatalog,
        inscriptions: InscriptionCatalog,
        config: BattleConfig,
    ) -> Self {
        Self {
            bosses,
            inscriptions,
            config,
            active: None,
            history: Vec::new(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            BossCatalog::builtin(),
            InscriptionCatalog::builtin(),
            BattleConfig::default(),
        )
    }

    pub fn bosses(&self) -> &BossCatalog {
        &self.bosses
    }

    pub fn inscriptions(&self) -> &InscriptionCatalog {
        &self.inscriptions
    }

    /// Replaces the inscription table. A running battle keeps the stats it
    /// started with; only slots whose id disappeared are skipped.
    pub fn reload_inscriptions(&mut self, inscriptions: InscriptionCatalog) {
        tracing::info!(count = inscriptions.iter().count(), "inscription table reloaded");
        self.inscriptions = inscriptions;
    }

    pub fn inscriptions_mut(&mut self) -> &mut InscriptionCatalog {
        &mut self.inscriptions
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn start_battle<H: BattleHost>(
        &mut self,
        request: &BattleRequest,
        host: &mut H,
    ) -> Result<&BattleSession, BattleError> {
        if self.active.is_some() {
            return Err(BattleError::BattleAlreadyActive);
        }
        let session = BattleSession::start(
            request,
            &self.bosses,
            &self.inscriptions,
            self.config.clone(),
            host,
        )?;
        Ok(self.active.insert(session))
    }

    /// Advances the running battle. Returns no events when idle.
    pub fn advance<H: BattleHost>(
        &mut self,
        elapsed_ms: u64,
        host: &mut H,
        rng: &mut impl Rng,
    ) -> Vec<BattleEvent> {
        let Some(session) = self.active.as_mut() else {
            return Vec::new();
        };
        let events = session.advance(elapsed_ms, &self.inscriptions, host, rng);
        self.retire_finished();
        events
    }

    pub fn forfeit<H: BattleHost>(
        &mut self,
        host: &mut H,
    ) -> Result<Vec<BattleEvent>, BattleError> {
        let session = self.active.as_mut().ok_or(BattleError::NoActiveBattle)?;
        let events = session.forfeit(host);
        self.retire_finished();
        Ok(events)
    }

    fn retire_finished(&mut self) {
        if self.active.as_ref().is_some_and(|s| !s.is_active()) {
            if let Some(session) = self.active.take() {
                if self.history.len() >= BATTLE_HISTORY_CAPACITY {
                    self.history.remove(0);
                }
                self.history.push(session.summary());
            }
        }
    }

    pub fn active(&self) -> Option<&BattleSession> {
        self.active.as_ref()
    }

    pub fn is_battle_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn history(&self) -> &[BattleSummary] {
        &self.history
    }
}
