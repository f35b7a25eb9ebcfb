//! Sealed Zone headless battle simulator
//!
//! Runs complete raid-boss battles on the virtual clock with no UI and
//! prints a win/loss report, for balancing bosses against loadouts.
//!
//! Usage:
//!   cargo run -- [OPTIONS]
//!
//! Options:
//!   --boss ID         Boss to fight (default: stone_warden)
//!   --difficulty N    Difficulty level 1-20 (default: 1)
//!   --seed N          RNG seed (default: 42)
//!   --runs N          Number of battles with incrementing seeds (default: 1)
//!   --grade G         Loadout inscription grade (default: rare)
//!   --loadout A,B     Inscription ids to equip (default: picked per boss)
//!   --verbose         Per-event battle logging
//!   --version         Print build information

use rand::rngs::StdRng;
use rand::SeedableRng;
use sealed_zone::battle::{
    BattleEvent, BattleOutcome, BattleRequest, EquipmentSlot, EquipmentStats, PlayerProfile,
};
use sealed_zone::build_info;
use sealed_zone::core::MAX_DIFFICULTY;
use sealed_zone::data::{InscriptionGrade, InscriptionInstance, PatternKind};
use sealed_zone::host::PlayerWallet;
use sealed_zone::zone::SealedZone;
use std::collections::BTreeMap;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Virtual time step per advance
const STEP_MS: u64 = 1_000;
/// Battles still running after this are forfeited
const MAX_BATTLE_MS: u64 = 600_000;

// ── CLI Configuration ────────────────────────────────────────────────

struct SimConfig {
    boss: String,
    difficulty: u32,
    seed: u64,
    runs: u32,
    grade: InscriptionGrade,
    loadout: Option<Vec<String>>,
    verbose: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            boss: "stone_warden".to_string(),
            difficulty: 1,
            seed: 42,
            runs: 1,
            grade: InscriptionGrade::Rare,
            loadout: None,
            verbose: false,
        }
    }
}

enum Command {
    Run(SimConfig),
    Help,
    Version,
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, String> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| format!("{flag} requires a number"))
}

fn parse_grade(value: Option<&String>) -> Result<InscriptionGrade, String> {
    let value = value.ok_or("--grade requires a grade name")?;
    InscriptionGrade::ALL
        .into_iter()
        .find(|g| g.name().eq_ignore_ascii_case(value))
        .ok_or_else(|| format!("unknown grade: {value}"))
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut config = SimConfig::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--boss" => {
                i += 1;
                config.boss = args.get(i).ok_or("--boss requires an id")?.clone();
            }
            "--difficulty" => {
                i += 1;
                config.difficulty = parse_number("--difficulty", args.get(i))?;
            }
            "--seed" => {
                i += 1;
                config.seed = parse_number("--seed", args.get(i))?;
            }
            "--runs" => {
                i += 1;
                config.runs = parse_number("--runs", args.get(i))?;
            }
            "--grade" => {
                i += 1;
                config.grade = parse_grade(args.get(i))?;
            }
            "--loadout" => {
                i += 1;
                let list = args.get(i).ok_or("--loadout requires inscription ids")?;
                config.loadout = Some(list.split(',').map(|s| s.trim().to_string()).collect());
            }
            "--verbose" => config.verbose = true,
            "--version" | "-V" => return Ok(Command::Version),
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(format!("Unknown argument: {other}")),
        }
        i += 1;
    }
    Ok(Command::Run(config))
}

fn print_usage() {
    eprintln!(
        "Sealed Zone Battle Simulator\n\
         \n\
         Usage: sealed-zone [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --boss ID         Boss to fight (default: stone_warden)\n\
         \x20 --difficulty N    Difficulty level 1-{MAX_DIFFICULTY} (default: 1)\n\
         \x20 --seed N          RNG seed (default: 42)\n\
         \x20 --runs N          Number of battles with incrementing seeds (default: 1)\n\
         \x20 --grade G         Loadout grade: common..mythic (default: rare)\n\
         \x20 --loadout A,B     Inscription ids to equip (default: picked per boss)\n\
         \x20 --verbose         Per-event battle logging\n\
         \x20 --version, -V     Print build information\n\
         \x20 --help, -h        Show this help"
    );
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

// ── Loadout ──────────────────────────────────────────────────────────

/// A damage inscription plus the counter to the boss's pattern.
fn default_loadout(pattern: PatternKind) -> Vec<String> {
    let counter = match pattern {
        PatternKind::Shield => "ward_splitter",
        PatternKind::Regeneration => "searing_brand",
        PatternKind::EquipmentDestroy => "steadfast_rune",
        PatternKind::Invincible => "veil_piercer",
        PatternKind::None => "twin_fang",
    };
    vec!["ember_sigil".to_string(), counter.to_string()]
}

fn sim_profile() -> PlayerProfile {
    let equipment: BTreeMap<EquipmentSlot, EquipmentStats> = EquipmentSlot::ALL
        .into_iter()
        .map(|slot| {
            let stats = match slot {
                EquipmentSlot::Weapon => EquipmentStats {
                    attack: 600.0,
                    penetration: 6.0,
                },
                _ => EquipmentStats {
                    attack: 80.0,
                    penetration: 1.0,
                },
            };
            (slot, stats)
        })
        .collect();
    PlayerProfile {
        attack: 1_500.0,
        accuracy: 600.0,
        crit_chance: 15.0,
        crit_damage: 50.0,
        class_tier_penetration: 5.0,
        skill_penetration: 3.0,
        relic_penetration: 2.0,
        equipment,
    }
}

// ── Simulation ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct SimStats {
    victories: u32,
    defeats: u32,
    timeouts: u32,
    total_ms: u64,
    hearts_left: u64,
    gold: u64,
    seal_stones: u64,
    bonus_drops: u32,
}

fn print_event(at_ms: u64, event: &BattleEvent) {
    let label = match event {
        BattleEvent::AttackLanded {
            slot,
            damage,
            is_crit,
            shield_absorbed,
            ..
        } => {
            let crit = if *is_crit { "CRIT " } else { "" };
            format!("slot {slot} {crit}{damage:.0} dmg (shield {shield_absorbed:.0})")
        }
        BattleEvent::AttackMissed { slot } => format!("slot {slot} miss"),
        BattleEvent::AttackBlocked { slot } => format!("slot {slot} blocked"),
        BattleEvent::AttackSkipped { slot, .. } => format!("slot {slot} skipped"),
        BattleEvent::ShieldBroken => "shield broken".to_string(),
        BattleEvent::InvincibilityDestroyed { slot } => format!("slot {slot} broke invincibility"),
        BattleEvent::HeartLost { remaining } => format!("heart lost ({remaining} left)"),
        BattleEvent::HeartRestored { remaining } => format!("heart restored ({remaining})"),
        BattleEvent::Pattern(pattern) => format!("{pattern:?}"),
        BattleEvent::BattleEnded { outcome } => format!("ended: {outcome:?}"),
    };
    println!("[t={:>7.1}s] {label}", at_ms as f64 / 1000.0);
}

fn run_battle(
    zone: &mut SealedZone,
    request: &BattleRequest,
    seed: u64,
    verbose: bool,
    stats: &mut SimStats,
) -> Result<(), String> {
    let mut wallet = PlayerWallet::with_tickets(1);
    let mut rng = StdRng::seed_from_u64(seed);
    zone.start_battle(request, &mut wallet)
        .map_err(|e| e.to_string())?;

    let mut elapsed = 0;
    while zone.is_battle_active() && elapsed < MAX_BATTLE_MS {
        let events = zone.advance(STEP_MS, &mut wallet, &mut rng);
        elapsed += STEP_MS;
        if verbose {
            for event in &events {
                print_event(elapsed, event);
            }
        }
    }
    if zone.is_battle_active() {
        zone.forfeit(&mut wallet).map_err(|e| e.to_string())?;
        stats.timeouts += 1;
    }

    let Some(summary) = zone.history().last() else {
        return Err("battle did not finish".to_string());
    };
    stats.total_ms += summary.elapsed_ms;
    stats.hearts_left += u64::from(summary.hearts_remaining);
    match &summary.outcome {
        Some(BattleOutcome::Victory { rewards }) => {
            stats.victories += 1;
            stats.gold += rewards.gold;
            stats.seal_stones += rewards.seal_stones;
            if rewards.bonus_item.is_some() {
                stats.bonus_drops += 1;
            }
        }
        _ => stats.defeats += 1,
    }
    Ok(())
}

// ── Report Output ────────────────────────────────────────────────────

fn print_summary(config: &SimConfig, loadout: &[String], stats: &SimStats) {
    let runs = f64::from(config.runs.max(1));
    println!("============================================================");
    println!(
        "  Sealed Zone Report  (boss={}, difficulty={}, seed={})",
        config.boss, config.difficulty, config.seed
    );
    println!("============================================================");
    println!("Loadout: {} [{}]", loadout.join(", "), config.grade.name());
    println!(
        "Victories: {}  |  Defeats: {}  (timeouts: {})",
        stats.victories, stats.defeats, stats.timeouts
    );
    println!("Win rate: {:.1}%", f64::from(stats.victories) / runs * 100.0);
    println!(
        "Avg duration: {:.1}s  |  Avg hearts left: {:.2}",
        stats.total_ms as f64 / runs / 1000.0,
        stats.hearts_left as f64 / runs
    );
    println!(
        "Gold: {}  |  Seal stones: {}  |  Bonus drops: {}",
        stats.gold, stats.seal_stones, stats.bonus_drops
    );
}

fn run(config: SimConfig) -> Result<(), String> {
    init_tracing(config.verbose);

    let mut zone = SealedZone::builtin();
    let boss = zone
        .bosses()
        .get(&config.boss)
        .ok_or_else(|| format!("unknown boss: {}", config.boss))?;
    let loadout = config
        .loadout
        .clone()
        .unwrap_or_else(|| default_loadout(boss.pattern.kind));

    let request = BattleRequest {
        boss_id: config.boss.clone(),
        difficulty: config.difficulty,
        loadout: loadout
            .iter()
            .map(|id| InscriptionInstance::new(id.clone(), config.grade))
            .collect(),
        profile: sim_profile(),
    };

    let mut stats = SimStats::default();
    for run in 0..config.runs {
        let seed = config.seed.wrapping_add(u64::from(run));
        run_battle(&mut zone, &request, seed, config.verbose, &mut stats)?;
    }
    print_summary(&config, &loadout, &stats);
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let result = match parse_args(&args) {
        Ok(Command::Run(config)) => run(config),
        Ok(Command::Help) => {
            print_usage();
            Ok(())
        }
        Ok(Command::Version) => {
            println!("{}", build_info::version_line());
            Ok(())
        }
        Err(message) => {
            eprintln!("{message}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
