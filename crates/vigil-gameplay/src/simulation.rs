//! The simulation context: one tick function and the command interface.
//!
//! Tick order is fixed:
//! 1. Ability regeneration and buff countdowns
//! 2. Hero steering and auto-attack
//! 3. Enemy movement, attacks and overlap separation
//! 4. Periodic spawning
//! 5. Removal of the dead, rewards and stage advance
//! 6. Hero revive
//! 7. Opportunistic snapshot

use tracing::{debug, info, trace, warn};
use vigil_common::{EntityId, IdAllocator};

use crate::ability::{AbilityKind, AbilitySet};
use crate::collision::{separate, Body};
use crate::combat::{enemy_attack, select_attack_target, strike};
use crate::command::{positive_u32, Command, CommandError, CommandOutcome, CommandResult};
use crate::config::SimConfig;
use crate::enemy::{Enemy, EnemyKind};
use crate::entity::EnemyArena;
use crate::events::{EventBus, SimEvent};
use crate::hero::Hero;
use crate::progression::{
    periodic_spawn_interval, spawn_point, stage_advance_spawn_interval, Experience, KillReward, SpawnWeights,
    Stage, BASE_SPAWN_INTERVAL,
};
use crate::snapshot::{GearRecord, HeroRecord, SaveResult, Snapshot, SnapshotStore, StageRecord, SNAPSHOT_KEY};
use crate::stats::GearSlot;
use crate::steering::{advance, blended_heading, enemy_intent, enemy_step, nearest_enemy, repulsion, steer};
use crate::view::SimView;
use glam::Vec2;

/// A running session.
pub struct Simulation<S: SnapshotStore> {
    config: SimConfig,
    store: S,
    rng: fastrand::Rng,
    ids: IdAllocator,
    hero: Hero,
    enemies: EnemyArena,
    abilities: AbilitySet,
    stage: Stage,
    spawn_timer: f32,
    spawn_interval: f32,
    time: f64,
    ticks: u64,
    events: EventBus,
}

impl<S: SnapshotStore> Simulation<S> {
    /// Starts a fresh session without reading the store.
    #[must_use]
    pub fn new(config: SimConfig, store: S) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            hero: Hero::new(&config),
            abilities: AbilitySet::new(&config.abilities),
            config,
            store,
            rng,
            ids: IdAllocator::new(),
            enemies: EnemyArena::new(),
            stage: Stage::default(),
            spawn_timer: 0.0,
            spawn_interval: BASE_SPAWN_INTERVAL,
            time: 0.0,
            ticks: 0,
            events: EventBus::default(),
        }
    }

    /// Starts a session from the stored snapshot, if any.
    ///
    /// Store failures and malformed documents fall back to a fresh session.
    #[must_use]
    pub fn load(config: SimConfig, store: S) -> Self {
        let mut sim = Self::new(config, store);
        match sim.store.load(SNAPSHOT_KEY) {
            Ok(Some(document)) => {
                let snapshot = Snapshot::from_json(&document);
                sim.restore(&snapshot);
                info!(
                    level = sim.hero.level(),
                    stage = sim.stage.level(),
                    gold = sim.hero.gold(),
                    "Loaded snapshot"
                );
            },
            Ok(None) => debug!("No snapshot stored, starting fresh"),
            Err(e) => warn!("Failed to read snapshot, starting fresh: {}", e),
        }
        sim
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        let h = &snapshot.hero;
        self.hero = Hero::restore(
            &self.config,
            Vec2::new(h.x, h.y),
            Experience::new(h.level, h.xp),
            h.gold,
            snapshot.gear.to_loadout(),
        );
        self.stage = snapshot.stage.to_stage();
    }

    /// Captures the persisted subset of state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let hero = &self.hero;
        let stats = hero.stats();
        Snapshot {
            hero: HeroRecord {
                x: hero.position().x,
                y: hero.position().y,
                level: hero.level(),
                xp: hero.experience().xp(),
                gold: hero.gold(),
                max_hp: stats.max_hp,
                hp: hero.hp(),
                armor: stats.armor,
                ad: stats.attack_damage,
                attack_speed: stats.attack_speed,
                ms: stats.move_speed,
            },
            gear: GearRecord::from_loadout(hero.loadout()),
            stage: StageRecord::from_stage(&self.stage),
        }
    }

    /// Writes the snapshot to the store.
    pub fn save(&mut self) -> SaveResult<()> {
        let document = self.snapshot().to_json()?;
        self.store.save(SNAPSHOT_KEY, &document)?;
        self.events.publish(SimEvent::SnapshotSaved);
        Ok(())
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            warn!("Failed to save snapshot: {}", e);
        }
    }

    /// Advances the simulation by `dt` seconds, clamped to the configured maximum.
    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() {
            dt.min(self.config.tick_delta_cap()).max(0.0)
        } else {
            0.0
        };
        self.time += f64::from(dt);
        self.ticks += 1;

        self.abilities.tick(dt);
        let charge = self.hero.tick_timers(dt);
        if charge.trail {
            self.events.publish(SimEvent::Trail {
                position: self.hero.position(),
                size: self.hero.stats().size,
            });
        }

        self.update_hero(dt);
        self.update_enemies(dt);

        self.spawn_timer += dt;
        if self.spawn_timer >= self.spawn_interval {
            self.spawn_enemy();
            self.spawn_timer = 0.0;
            self.spawn_interval = periodic_spawn_interval(self.hero.level(), self.stage.level());
        }

        self.resolve_deaths();

        if self.hero.is_dead() {
            self.hero.revive();
            info!("Hero revived");
            self.events.publish(SimEvent::HeroRevived);
        }

        if self.config.autosave_chance > 0.0 && self.rng.f64() < self.config.autosave_chance {
            self.persist();
        }

        trace!(tick = self.ticks, enemies = self.enemies.len(), "Tick complete");
    }

    fn update_hero(&mut self, dt: f32) {
        let origin = self.hero.position();
        let Some(nearest) = nearest_enemy(origin, self.enemies.iter()).map(Enemy::position) else {
            self.hero.set_target(None);
            return;
        };

        let avoid_radius = self.hero.avoidance_radius();
        let push = repulsion(origin, avoid_radius, self.enemies.alive().map(Enemy::position));
        let desired = blended_heading(origin, nearest, avoid_radius, push);
        let stats = *self.hero.stats();
        let heading = steer(self.hero.heading(), desired, stats.turn_rate, dt);
        self.hero.set_heading(heading);
        self.hero.set_position(advance(origin, heading, stats.move_speed, dt));

        let position = self.hero.position();
        let target = select_attack_target(position, stats.melee_range, self.enemies.iter()).map(Enemy::id);
        self.hero.set_target(target);

        let Some(id) = target else { return };
        if !self.hero.ready_to_attack() {
            return;
        }
        if let Ok(enemy) = self.enemies.get_mut(id) {
            let hit = strike(enemy, stats.attack_damage);
            self.events.publish(SimEvent::AttackLine {
                from: position,
                to: hit.position,
                ranged: false,
            });
            self.events.publish(SimEvent::EnemyDamaged {
                id: hit.target,
                amount: hit.amount,
                position: hit.position,
            });
        }
        self.hero.reset_attack_cooldown();
    }

    fn update_enemies(&mut self, dt: f32) {
        let hero_position = self.hero.position();
        let mut moved: Vec<(EntityId, Body)> = Vec::with_capacity(self.enemies.len());

        for enemy in self.enemies.iter_mut().filter(|e| e.is_alive()) {
            enemy.tick_cooldown(dt);
            let dist = enemy.position().distance(hero_position);
            let intent = enemy_intent(enemy, dist);
            let next = enemy_step(enemy, hero_position, intent, dt);

            if let Some(raw) = enemy_attack(enemy, dist) {
                let amount = self.hero.take_damage(raw);
                self.events.publish(SimEvent::AttackLine {
                    from: enemy.position(),
                    to: hero_position,
                    ranged: enemy.is_ranged(),
                });
                self.events.publish(SimEvent::HeroDamaged {
                    source: enemy.id(),
                    amount,
                    position: hero_position,
                });
            }
            moved.push((enemy.id(), Body::new(next, enemy.collision_radius())));
        }

        let hero_body = Body::new(hero_position, self.hero.collision_radius());
        let mut bodies: Vec<Body> = moved.iter().map(|(_, body)| *body).collect();
        separate(hero_body, &mut bodies);

        for ((id, _), body) in moved.iter().zip(bodies) {
            if let Ok(enemy) = self.enemies.get_mut(*id) {
                enemy.set_position(body.position);
            }
        }
    }

    fn resolve_deaths(&mut self) {
        for enemy in self.enemies.prune_dead() {
            let reward = KillReward::for_kill(enemy.kind(), self.hero.level(), self.stage.level());
            self.hero.earn_gold(reward.gold);
            let levels = self.hero.add_xp(reward.xp);

            self.events.publish(SimEvent::EnemyKilled {
                id: enemy.id(),
                kind: enemy.kind(),
                gold: reward.gold,
                xp: reward.xp,
                position: enemy.position(),
            });
            self.events.publish(SimEvent::GoldDropped {
                amount: reward.gold,
                position: enemy.position(),
            });
            if levels > 0 {
                info!(level = self.hero.level(), "Level up");
                self.events.publish(SimEvent::LevelUp {
                    level: self.hero.level(),
                });
            }

            if self.stage.record_kill() {
                self.advance_stage();
            }
        }
    }

    fn advance_stage(&mut self) {
        self.stage.advance();
        self.enemies.clear();
        self.spawn_enemy();
        self.spawn_interval = stage_advance_spawn_interval(self.stage.level());
        info!(
            stage = self.stage.level(),
            required = self.stage.required(),
            "Stage advanced"
        );
        self.events.publish(SimEvent::StageAdvanced {
            stage: self.stage.level(),
        });
        self.persist();
    }

    /// Spawns a stage-weighted enemy on the annulus around the hero.
    pub fn spawn_enemy(&mut self) -> EntityId {
        let spawning = &self.config.spawning;
        let position = spawn_point(
            self.hero.position(),
            &mut self.rng,
            spawning.min_radius,
            spawning.max_radius,
        );
        let kind = SpawnWeights::for_stage(self.stage.level()).pick(self.rng.f64());
        self.spawn_enemy_at(kind, position)
    }

    /// Spawns a specific enemy at a specific point.
    pub fn spawn_enemy_at(&mut self, kind: EnemyKind, position: Vec2) -> EntityId {
        let id = self.ids.allocate();
        let enemy = Enemy::spawn(id, kind, position, self.stage.level(), self.time);
        // Fresh ids are never already stored.
        let _ = self.enemies.insert(enemy);
        trace!(%id, kind = kind.name(), "Enemy spawned");
        self.events.publish(SimEvent::EnemySpawned { id, kind, position });
        id
    }

    /// Applies a command.
    pub fn apply(&mut self, command: Command) -> CommandResult<CommandOutcome> {
        debug!(?command, "Applying command");
        match command {
            Command::Cast { ability } => self.cast_ability(ability),
            Command::Upgrade { slot } => self.upgrade_gear(slot),
            Command::SetStage { stage } => self.set_stage(stage),
            Command::GrantGold { amount } => self.grant_gold(amount),
            Command::GrantLevels { count } => self.grant_levels(count),
            Command::Reset => {
                self.reset_all();
                Ok(CommandOutcome::Reset)
            },
        }
    }

    /// Casts an ability; with no charge ready, hastens its regeneration.
    pub fn cast_ability(&mut self, kind: AbilityKind) -> CommandResult<CommandOutcome> {
        let ability = self.abilities.get_mut(kind);
        if ability.try_cast() {
            let hits = kind.apply(&mut self.hero, &mut self.enemies, &self.config.abilities);
            self.events.publish(SimEvent::AbilityCast { ability: kind });
            if kind == AbilityKind::Whirlwind {
                self.events.publish(SimEvent::Whirlwind {
                    center: self.hero.position(),
                    radius: self.config.abilities.whirlwind_radius,
                });
            }
            for hit in &hits {
                self.events.publish(SimEvent::EnemyDamaged {
                    id: hit.target,
                    amount: hit.amount,
                    position: hit.position,
                });
            }
            return Ok(CommandOutcome::Cast { hits: hits.len() });
        }

        if !ability.is_regenerating() {
            return Err(CommandError::NoCharges(kind));
        }
        ability.hasten(self.config.abilities.hasten_seconds);
        let charges = ability.charges();
        self.events.publish(SimEvent::ChargeHastened { ability: kind, charges });
        Ok(CommandOutcome::Hastened { charges })
    }

    /// Buys one gear level.
    pub fn upgrade_gear(&mut self, slot: GearSlot) -> CommandResult<CommandOutcome> {
        let cost = self.hero.upgrade_gear(slot)?;
        let level = self.hero.loadout().get(slot).level();
        debug!(slot = slot.name(), level, cost, "Gear upgraded");
        self.persist();
        Ok(CommandOutcome::Upgraded { cost, level })
    }

    /// Jumps to a stage, clearing enemies and spawning one replacement.
    pub fn set_stage(&mut self, stage: i64) -> CommandResult<CommandOutcome> {
        let level = positive_u32("stage", stage)?;
        self.stage = Stage::new(level);
        self.enemies.clear();
        self.spawn_enemy();
        info!(stage = level, "Stage set");
        self.events.publish(SimEvent::StageAdvanced { stage: level });
        self.persist();
        Ok(CommandOutcome::StageSet { stage: level })
    }

    /// Adds gold.
    pub fn grant_gold(&mut self, amount: i64) -> CommandResult<CommandOutcome> {
        let amount = u64::try_from(amount)
            .ok()
            .filter(|a| *a > 0)
            .ok_or(CommandError::InvalidArgument { name: "amount", value: amount })?;
        self.hero.earn_gold(amount);
        self.persist();
        Ok(CommandOutcome::GoldGranted {
            balance: self.hero.gold(),
        })
    }

    /// Forces `count` level-ups.
    pub fn grant_levels(&mut self, count: i64) -> CommandResult<CommandOutcome> {
        let count = positive_u32("count", count)?;
        self.hero.force_levels(count);
        info!(level = self.hero.level(), "Levels granted");
        self.events.publish(SimEvent::LevelUp {
            level: self.hero.level(),
        });
        self.persist();
        Ok(CommandOutcome::LevelsGranted {
            level: self.hero.level(),
        })
    }

    /// Restores defaults, deletes the stored snapshot and spawns one enemy.
    pub fn reset_all(&mut self) {
        self.hero = Hero::new(&self.config);
        self.stage = Stage::default();
        self.enemies.clear();
        self.spawn_interval = BASE_SPAWN_INTERVAL;
        self.spawn_timer = 0.0;
        // Drop queued visuals for the old session.
        let _ = self.events.drain();
        if let Err(e) = self.store.clear(SNAPSHOT_KEY) {
            warn!("Failed to clear snapshot: {}", e);
        }
        self.spawn_enemy();
        info!("Session reset");
    }

    /// Returns the read model.
    #[must_use]
    pub fn view(&self) -> SimView {
        SimView::capture(
            self.time,
            &self.hero,
            self.enemies.iter(),
            self.abilities.iter(),
            &self.stage,
        )
    }

    /// Drains pending events.
    pub fn drain_events(&self) -> Vec<SimEvent> {
        self.events.drain()
    }

    /// Returns the event bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Returns the hero.
    #[must_use]
    pub const fn hero(&self) -> &Hero {
        &self.hero
    }

    /// Returns the enemy arena.
    #[must_use]
    pub const fn enemies(&self) -> &EnemyArena {
        &self.enemies
    }

    /// Returns the enemy arena mutably.
    pub fn enemies_mut(&mut self) -> &mut EnemyArena {
        &mut self.enemies
    }

    /// Returns the abilities.
    #[must_use]
    pub const fn abilities(&self) -> &AbilitySet {
        &self.abilities
    }

    /// Returns stage progress.
    #[must_use]
    pub const fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Returns the current spawn interval.
    #[must_use]
    pub const fn spawn_interval(&self) -> f32 {
        self.spawn_interval
    }

    /// Returns simulation seconds elapsed.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Returns ticks run.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Returns the snapshot store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MemoryStore;

    fn sim() -> Simulation<MemoryStore> {
        Simulation::new(SimConfig::default().with_seed(42).without_autosave(), MemoryStore::new())
    }

    #[test]
    fn test_fresh_session_has_no_enemies() {
        let sim = sim();
        assert!(sim.enemies().is_empty());
        assert_eq!(sim.stage().level(), 1);
    }

    #[test]
    fn test_first_spawn_after_interval() {
        let mut sim = sim();
        for _ in 0..19 {
            sim.tick(0.1);
        }
        assert!(sim.enemies().is_empty());
        sim.tick(0.1);
        sim.tick(0.1);
        assert_eq!(sim.enemies().len(), 1);
        assert!((sim.spawn_interval() - 1.9).abs() < 1e-5);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut sim = sim();
        sim.tick(5.0);
        assert!((sim.time() - 0.1).abs() < 1e-6);
        sim.tick(f32::NAN);
        sim.tick(-1.0);
        assert!((sim.time() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_bad_delta_cap_falls_back_to_default() {
        for cap in [-0.1, 0.0, f32::NAN, f32::INFINITY] {
            let mut config = SimConfig::default().with_seed(1).without_autosave();
            config.max_tick_delta = cap;
            let mut sim = Simulation::new(config, MemoryStore::new());
            sim.tick(0.016);
            assert!((sim.time() - 0.016).abs() < 1e-6, "cap {cap}");
            sim.tick(5.0);
            assert!((sim.time() - 0.116).abs() < 1e-6, "cap {cap}");
        }
    }

    #[test]
    fn test_large_level_grant_is_cheap() {
        let mut sim = sim();
        sim.grant_levels(2_000_000).expect("grant");
        assert_eq!(sim.hero().level(), 2_000_001);
        assert!(sim.hero().stats().max_hp.is_finite());
        let started = std::time::Instant::now();
        sim.grant_levels(i64::from(u32::MAX)).expect("grant");
        sim.tick(0.016);
        assert_eq!(sim.hero().level(), u32::MAX);
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_hero_halts_without_enemies() {
        let mut sim = sim();
        sim.tick(0.1);
        assert_eq!(sim.hero().position(), Vec2::ZERO);
        assert!(sim.hero().target().is_none());
    }

    #[test]
    fn test_hero_moves_toward_enemy() {
        let mut sim = sim();
        sim.spawn_enemy_at(EnemyKind::Weak, Vec2::new(400.0, 0.0));
        sim.tick(0.1);
        assert!(sim.hero().position().x > 10.0);
    }

    #[test]
    fn test_invalid_commands_are_noops() {
        let mut sim = sim();
        let before = sim.snapshot();
        assert!(sim.set_stage(0).is_err());
        assert!(sim.grant_gold(0).is_err());
        assert!(sim.grant_gold(-10).is_err());
        assert!(sim.grant_levels(-1).is_err());
        assert!(matches!(
            sim.upgrade_gear(GearSlot::Boots),
            Err(CommandError::Economy(_))
        ));
        assert_eq!(sim.snapshot(), before);
        assert!(sim.store().get(SNAPSHOT_KEY).is_none());
    }

    #[test]
    fn test_state_changing_commands_persist() {
        let mut sim = sim();
        sim.grant_gold(200).expect("grant");
        assert!(sim.store().get(SNAPSHOT_KEY).is_some());
        sim.upgrade_gear(GearSlot::Weapon).expect("affordable");
        let stored = Snapshot::from_json(sim.store().get(SNAPSHOT_KEY).unwrap_or_default());
        assert_eq!(stored.gear.weapon.level, 2);
        assert_eq!(stored.hero.gold, 150);
    }

    #[test]
    fn test_cast_then_hasten() {
        let mut sim = sim();
        assert_eq!(sim.cast_ability(AbilityKind::Charge), Ok(CommandOutcome::Cast { hits: 0 }));
        assert_eq!(sim.cast_ability(AbilityKind::Charge), Ok(CommandOutcome::Cast { hits: 0 }));
        assert_eq!(sim.hero().charge().stacks(), 2);

        assert_eq!(
            sim.cast_ability(AbilityKind::Charge),
            Ok(CommandOutcome::Hastened { charges: 0 })
        );
        assert!((sim.abilities().get(AbilityKind::Charge).timer() - 7.0).abs() < 1e-5);
        assert_eq!(sim.hero().charge().stacks(), 2);
    }

    #[test]
    fn test_reset_clears_store_and_spawns_one() {
        let mut sim = sim();
        sim.grant_levels(3).expect("grant");
        assert!(sim.store().get(SNAPSHOT_KEY).is_some());

        sim.reset_all();
        assert_eq!(sim.hero().level(), 1);
        assert_eq!(sim.hero().gold(), 0);
        assert_eq!(sim.enemies().len(), 1);
        assert!(sim.store().get(SNAPSHOT_KEY).is_none());
    }

    #[test]
    fn test_load_restores_progress_at_full_health() {
        let mut first = sim();
        first.grant_levels(2).expect("grant");
        first.grant_gold(75).expect("grant");
        first.set_stage(7).expect("stage");
        let store = first.store().clone();

        let loaded = Simulation::load(SimConfig::default().with_seed(1).without_autosave(), store);
        assert_eq!(loaded.hero().level(), 3);
        assert_eq!(loaded.hero().gold(), 75);
        assert_eq!(loaded.stage().level(), 7);
        assert!((loaded.hero().hp() - loaded.hero().max_hp()).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_with_corrupt_store_starts_fresh() {
        let mut store = MemoryStore::new();
        store.save(SNAPSHOT_KEY, "{{{").expect("save");
        let sim = Simulation::load(SimConfig::default().without_autosave(), store);
        assert_eq!(sim.hero().level(), 1);
        assert_eq!(sim.stage().level(), 1);
    }
}
