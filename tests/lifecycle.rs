use pestsim::{
    event::{OutbreakSeverity, SimulationEvent},
    profile::{LifecycleProfile, ProfileCatalog},
    zone::{EnvironmentalConditions, EnvironmentalTreatment, TreatmentType},
    LifecycleStage, Simulation, SimulationConfig, SpeciesId, ZoneId,
};

fn quiet_config() -> SimulationConfig {
    SimulationConfig {
        mortality_base_rate: 0.0,
        density_mortality_rate: 0.0,
        ..SimulationConfig::default()
    }
}

/// A species that neither breeds nor migrates, with a ceiling of 1000 per zone.
fn inert_profile(id: &str) -> LifecycleProfile {
    let mut profile = LifecycleProfile::fallback(SpeciesId::from(id));
    profile.reproduction_rate = 0.0;
    profile.migration_rate = 0.0;
    profile.base_capacity = 1_000.0;
    profile
}

fn simulation_with(config: SimulationConfig, extra: Vec<LifecycleProfile>) -> Simulation {
    let mut catalog = ProfileCatalog::builtin().expect("builtin catalog");
    for profile in extra {
        catalog.register(profile).expect("valid profile");
    }
    let mut sim = Simulation::with_catalog(catalog, config);
    sim.register_zone("veg", EnvironmentalConditions::default(), 1.0);
    sim
}

fn wipe_out(sim: &mut Simulation, zone: &ZoneId) {
    let treatment = EnvironmentalTreatment {
        treatment_type: TreatmentType::EnvironmentalAdjustment,
        temperature_change: 0.0,
        humidity_change: 0.0,
        duration: 0.0,
        effectiveness: 1.0,
    };
    sim.apply_environmental_treatment(zone, &treatment).unwrap();
}

#[test]
fn quiet_tick_leaves_totals_unchanged() {
    let mut sim = simulation_with(quiet_config(), Vec::new());
    let species = SpeciesId::from("aphids");
    let zone = ZoneId::from("veg");
    sim.introduce_species(&species, &zone, 250, LifecycleStage::Egg)
        .unwrap();
    sim.tick(1.0);
    let pop = sim.population(&species, &zone).unwrap();
    assert_eq!(pop.total(), 250);
    assert_eq!(pop.stage_count(LifecycleStage::Egg), 250);
}

#[test]
fn crossing_the_duration_promotes_with_survival_loss() {
    let mut sim = simulation_with(quiet_config(), Vec::new());
    let species = SpeciesId::from("thrips");
    let zone = ZoneId::from("veg");
    sim.introduce_species(&species, &zone, 100, LifecycleStage::Egg)
        .unwrap();

    // Thrips eggs need 4.0 units; stop just short, then cross.
    sim.tick(3.9);
    let pop = sim.population(&species, &zone).unwrap();
    assert_eq!(pop.stage_count(LifecycleStage::Egg), 100);
    let progress = pop.stage(LifecycleStage::Egg).unwrap().development_progress;
    assert!((progress - 3.9).abs() < 1e-9);

    let summary = sim.tick(0.2);
    let pop = sim.population(&species, &zone).unwrap();
    assert_eq!(pop.stage_count(LifecycleStage::Egg), 0);
    assert_eq!(pop.stage_count(LifecycleStage::Larva), 80);
    assert!(summary.events.iter().any(|event| matches!(
        event,
        SimulationEvent::StageAdvanced {
            from: LifecycleStage::Egg,
            to: LifecycleStage::Larva,
            promoted: 80,
            ..
        }
    )));
}

#[test]
fn adults_never_promote() {
    let mut sim = simulation_with(
        quiet_config(),
        vec![inert_profile("grain_weevils")],
    );
    let species = SpeciesId::from("grain_weevils");
    let zone = ZoneId::from("veg");
    sim.introduce_adults(&species, &zone, 30).unwrap();
    for _ in 0..40 {
        sim.tick(1.0);
    }
    let pop = sim.population(&species, &zone).unwrap();
    assert_eq!(pop.stage_count(LifecycleStage::Adult), 30);
}

#[test]
fn stage_totals_always_add_up() {
    let mut sim = simulation_with(SimulationConfig::default(), Vec::new());
    let zone = ZoneId::from("veg");
    for species in ["aphids", "thrips", "spider_mites"] {
        sim.introduce_adults(&SpeciesId::from(species), &zone, 150)
            .unwrap();
    }
    for _ in 0..25 {
        sim.tick(1.0);
        for pop in sim.active_populations() {
            let by_stage: u64 = pop.stages().map(|s| s.population_count).sum();
            assert_eq!(by_stage, pop.total());
        }
        let report = sim.simulation_report();
        let distributed: u64 = report.stage_distribution.values().sum();
        assert_eq!(distributed, report.total_population);
        assert_eq!(
            report.species_totals.values().sum::<u64>(),
            report.total_population
        );
    }
}

#[test]
fn emptied_population_goes_extinct_on_next_tick() {
    let mut sim = simulation_with(SimulationConfig::default(), Vec::new());
    let species = SpeciesId::from("aphids");
    let zone = ZoneId::from("veg");
    sim.introduce_adults(&species, &zone, 5).unwrap();
    wipe_out(&mut sim, &zone);

    // Still listed until the event pass runs.
    assert_eq!(sim.active_populations().len(), 1);
    let summary = sim.tick(1.0);

    assert!(sim.population(&species, &zone).is_none());
    assert!(sim.active_populations().is_empty());
    assert!(summary
        .events
        .iter()
        .any(|e| matches!(e, SimulationEvent::Extinction { .. })));
    assert_eq!(sim.simulation_report().total_extinctions, 1);

    // Re-introduction establishes a fresh population.
    sim.introduce_adults(&species, &zone, 3).unwrap();
    let pop = sim.population(&species, &zone).unwrap();
    assert!(pop.is_active());
    assert_eq!(pop.establishment_date, 1.0);
}

#[test]
fn outbreak_tiers_follow_the_ceiling_ratio() {
    let mut sim = simulation_with(
        quiet_config(),
        vec![inert_profile("grain_weevils")],
    );
    sim.register_zone("silo", EnvironmentalConditions::default(), 1.0);
    let species = SpeciesId::from("grain_weevils");
    let veg = ZoneId::from("veg");
    let silo = ZoneId::from("silo");
    sim.introduce_adults(&species, &veg, 960).unwrap();
    sim.introduce_adults(&species, &silo, 750).unwrap();

    let summary = sim.tick(1.0);
    let severity_of = |zone: &ZoneId| {
        summary.events.iter().find_map(|event| match event {
            SimulationEvent::Outbreak {
                zone_id, severity, ..
            } if zone_id == zone => Some(*severity),
            _ => None,
        })
    };
    assert_eq!(severity_of(&veg), Some(OutbreakSeverity::Critical));
    assert_eq!(severity_of(&silo), Some(OutbreakSeverity::Minor));

    let report = sim.simulation_report();
    assert_eq!(report.outbreak_warnings.len(), 2);
    let tier = sim.population(&species, &veg).unwrap().current_outbreak();
    assert_eq!(tier, Some(OutbreakSeverity::Critical));

    // Same tier on the next tick stays silent.
    let summary = sim.tick(1.0);
    assert!(!summary
        .events
        .iter()
        .any(|e| matches!(e, SimulationEvent::Outbreak { .. })));
}

#[test]
fn small_populations_are_flagged_as_at_risk() {
    let mut sim = simulation_with(quiet_config(), vec![inert_profile("grain_weevils")]);
    let species = SpeciesId::from("grain_weevils");
    sim.introduce_adults(&species, &ZoneId::from("veg"), 4)
        .unwrap();
    let report = sim.simulation_report();
    assert_eq!(report.extinction_risks.len(), 1);
    assert_eq!(report.extinction_risks[0].total, 4);
}

#[test]
fn reports_are_idempotent_between_ticks() {
    let mut sim = simulation_with(SimulationConfig::default(), Vec::new());
    sim.introduce_adults(&SpeciesId::from("spider_mites"), &ZoneId::from("veg"), 300)
        .unwrap();
    sim.tick(1.0);
    sim.tick(1.0);
    assert_eq!(sim.simulation_report(), sim.simulation_report());
}

#[test]
fn undeclared_stage_degrades_without_stopping_the_run() {
    let mut sim = simulation_with(SimulationConfig::default(), Vec::new());
    let zone = ZoneId::from("veg");
    let aphids = SpeciesId::from("aphids");
    let thrips = SpeciesId::from("thrips");
    // Aphid profiles have no pupa stage.
    sim.introduce_species(&aphids, &zone, 50, LifecycleStage::Pupa)
        .unwrap();
    sim.introduce_species(&thrips, &zone, 50, LifecycleStage::Egg)
        .unwrap();
    for _ in 0..5 {
        sim.tick(1.0);
    }
    let report = sim.simulation_report();
    assert_eq!(report.degraded_stages.len(), 1);
    assert_eq!(report.degraded_stages[0].stage, LifecycleStage::Pupa);
    let thrips_pop = sim.population(&thrips, &zone).unwrap();
    assert_eq!(thrips_pop.stage_count(LifecycleStage::Egg), 0);
    assert!(thrips_pop.stage_count(LifecycleStage::Larva) > 0);
}

#[test]
fn near_limit_counts_tick_without_overflow() {
    let mut sim = simulation_with(SimulationConfig::default(), Vec::new());
    let species = SpeciesId::from("aphids");
    let zone = ZoneId::from("veg");
    let half = u64::MAX / 2 + 10;
    sim.introduce_adults(&species, &zone, half).unwrap();
    sim.introduce_species(&species, &zone, half, LifecycleStage::Egg)
        .unwrap();
    assert_eq!(sim.population(&species, &zone).unwrap().total(), u64::MAX);

    let summary = sim.tick(1.0);
    let pop = sim.population(&species, &zone).unwrap();
    assert!(pop.total() >= pop.stage_count(LifecycleStage::Egg));
    let report = sim.simulation_report();
    assert_eq!(report.total_population, pop.total());
    assert!(report.total_emigrants > 0);
    assert!(summary.events.iter().any(|event| matches!(
        event,
        SimulationEvent::Outbreak {
            severity: OutbreakSeverity::Critical,
            ..
        }
    )));
}
