//! Unit tests for sbp-sim.

use std::collections::BTreeMap;

use sbp_agent::{Environment, EnvironmentTable, MunicipalityRecord, MunicipalityStoreBuilder};
use sbp_behavior::{AdoptionModels, Classifier, PaymentSchedule, Regressor};
use sbp_core::{FeatureMap, RngStrategy, SimConfig, Year};

use crate::{Sim, SimBuilder, SimResult};

// ── Helpers ───────────────────────────────────────────────────────────────────

const CLASSIFIER_FEATURES: &[&str] = &["tot_cumul_adoption_pr_y_port", "lu_cattle"];
const REGRESSOR_FEATURES: &[&str] = &["sbp_payment", "clay_mean_munic"];

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// A municipality with `area` hectares of pastures in every year from 1995
/// to 2012 and the given historic adoption.
fn record(name: &str, area: f64, history: &[(u16, f64)]) -> MunicipalityRecord {
    MunicipalityRecord {
        name:          name.to_owned(),
        district:      "Beja".to_owned(),
        pastures_area: (1995..=2012).map(|y| (Year(y), area)).collect(),
        census:        (1995..=2012)
            .map(|y| (Year(y), FeatureMap::from([("lu_cattle".to_owned(), 0.4)])))
            .collect(),
        adoption:      history.iter().map(|&(y, f)| (Year(y), f)).collect(),
    }
}

fn environments(records: &[MunicipalityRecord]) -> EnvironmentTable {
    records
        .iter()
        .map(|r| {
            (
                r.name.clone(),
                Environment::new(
                    FeatureMap::new(),
                    FeatureMap::from([("clay_mean_munic".to_owned(), 0.3)]),
                ),
            )
        })
        .collect()
}

fn payments() -> PaymentSchedule {
    PaymentSchedule::new((1996..=2012).map(|y| (Year(y), 200.0)))
}

fn config(total_years: u16, strategy: RngStrategy) -> SimConfig {
    SimConfig {
        total_years,
        rng_strategy: strategy,
        ..SimConfig::default()
    }
}

fn build<C: Classifier, R: Regressor>(
    config:  SimConfig,
    records: Vec<MunicipalityRecord>,
    c:       C,
    r:       R,
) -> SimResult<Sim<C, R>> {
    let env = environments(&records);
    let (store, rngs) = MunicipalityStoreBuilder::new(config.start_year, config.seed)
        .reference_year(config.reference_year)
        .municipalities(records)
        .build()?;
    let models =
        AdoptionModels::new(c, names(CLASSIFIER_FEATURES), r, names(REGRESSOR_FEATURES))?;
    SimBuilder::new(config, store, rngs, models)
        .environments(env)
        .payments(payments())
        .build()
}

fn three_municipalities() -> Vec<MunicipalityRecord> {
    vec![
        record("Mértola", 1_000.0, &[(1995, 0.01)]),
        record("Alcoutim", 400.0, &[]),
        record("Serpa", 2_500.0, &[(1995, 0.02)]),
    ]
}

// ── NationalAggregate ─────────────────────────────────────────────────────────

#[cfg(test)]
mod national_tests {
    use sbp_behavior::{FixedFraction, FixedProbability};

    use super::*;
    use crate::SimError;

    #[test]
    fn seeded_from_history() {
        let cfg = SimConfig { start_year: Year(1998), ..config(3, RngStrategy::Shared) };
        let records = vec![
            record("Mértola", 1_000.0, &[(1995, 0.01), (1997, 0.02)]),
            record("Serpa", 1_000.0, &[(1996, 0.03)]),
        ];
        let sim = build(cfg, records, FixedProbability(0.0), FixedFraction(0.0)).unwrap();
        let n = &sim.national;

        assert_eq!(
            n.yearly_hectares.keys().copied().collect::<Vec<_>>(),
            [Year(1995), Year(1996), Year(1997)]
        );
        assert!((n.yearly_in(Year(1996)) - 30.0).abs() < 1e-9);
        assert!((n.cumulative_hectares - 60.0).abs() < 1e-9);
        assert_eq!(n.total_reference_area, 2_000.0);
        assert!((n.cumulative_fraction - 0.03).abs() < 1e-12);
        assert_eq!(n.staged_delta(), 0.0);
        let municipal = sim.municipalities.total_cumulative_hectares();
        assert!((n.cumulative_hectares - municipal).abs() < 1e-9);
    }

    #[test]
    fn history_before_1995_rejected() {
        let records = vec![record("Mértola", 1_000.0, &[(1994, 0.05), (1995, 0.01)])];
        let err = build(
            config(3, RngStrategy::Shared),
            records,
            FixedProbability(0.0),
            FixedFraction(0.0),
        )
        .err()
        .unwrap();
        assert!(
            matches!(err, SimError::Agent(sbp_agent::AgentError::DataIntegrity { .. })),
            "{err:?}"
        );
    }

    #[test]
    fn commit_resets_stage() {
        let mut n = crate::NationalAggregate::default();
        n.total_reference_area = 100.0;
        n.stage(5.0);
        n.stage(2.5);
        assert_eq!(n.staged_delta(), 7.5);
        assert_eq!(n.commit(Year(2000)), 7.5);
        assert_eq!(n.staged_delta(), 0.0);
        assert_eq!(n.cumulative_fraction, 0.075);
        assert_eq!(n.commit(Year(2001)), 0.0);
        assert_eq!(n.yearly_in(Year(2001)), 0.0);
    }
}

// ── Step ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod step_tests {
    use sbp_behavior::{BehaviorError, FixedFraction, FixedProbability};
    use sbp_core::CoreError;

    use super::*;
    use crate::{NoopObserver, SimError};

    #[test]
    fn step_commits_every_municipality() {
        let mut sim = build(
            config(5, RngStrategy::Shared),
            three_municipalities(),
            FixedProbability(1.0),
            FixedFraction(0.1),
        )
        .unwrap();
        let before = sim.national.cumulative_hectares;

        let summary = sim.step().unwrap();
        assert_eq!(summary.year, Year(1996));
        assert_eq!(summary.adopted, 3);
        assert_eq!(summary.not_adopted + summary.blocked, 0);
        assert_eq!(sim.clock.current_year, Year(1997));

        // 10 % of 1000 + 400 + 2500
        assert!((summary.yearly_hectares - 390.0).abs() < 1e-9);
        assert!((sim.national.cumulative_hectares - (before + 390.0)).abs() < 1e-9);
        let m = sim.municipalities.find("Alcoutim").unwrap();
        assert_eq!(m.yearly_fraction[&Year(1996)], 0.1);
        assert!(m.staged().is_none());
    }

    #[test]
    fn not_adopted_when_probability_zero() {
        let mut sim = build(
            config(5, RngStrategy::Shared),
            three_municipalities(),
            FixedProbability(0.0),
            FixedFraction(0.1),
        )
        .unwrap();
        let summary = sim.step().unwrap();
        assert_eq!(summary.not_adopted, 3);
        assert_eq!(summary.yearly_hectares, 0.0);
        for m in sim.municipalities.iter() {
            assert_eq!(m.yearly_hectares[&Year(1996)], 0.0);
        }
    }

    #[test]
    fn capacity_reached_then_blocked() {
        let mut sim = build(
            config(5, RngStrategy::Shared),
            vec![record("Mértola", 100.0, &[])],
            FixedProbability(1.0),
            FixedFraction(0.4),
        )
        .unwrap();
        sim.run_years(4, &mut NoopObserver).unwrap();

        let m = sim.municipalities.find("Mértola").unwrap();
        let yearly: Vec<f64> = (1996..=1999).map(|y| m.yearly_hectares[&Year(y)]).collect();
        assert!((yearly[0] - 40.0).abs() < 1e-9);
        assert!((yearly[1] - 40.0).abs() < 1e-9);
        assert!((yearly[2] - 20.0).abs() < 1e-9, "clamped to room left");
        assert_eq!(yearly[3], 0.0, "saturated");
        assert_eq!(m.cumulative_hectares, 100.0);
    }

    #[test]
    fn municipality_without_pastures_is_blocked() {
        let mut empty = record("Alcoutim", 400.0, &[]);
        empty.pastures_area.insert(Year(1996), 0.0);
        let mut sim = build(
            config(5, RngStrategy::Shared),
            vec![record("Mértola", 100.0, &[]), empty],
            FixedProbability(1.0),
            FixedFraction(0.1),
        )
        .unwrap();
        let summary = sim.step().unwrap();
        assert_eq!(summary.blocked, 1);
        assert_eq!(summary.adopted, 1);
    }

    #[test]
    fn failed_step_leaves_state_untouched() {
        let cfg = SimConfig { start_year: Year(2012), ..config(1, RngStrategy::Shared) };
        let mut sim =
            build(cfg, three_municipalities(), FixedProbability(1.0), FixedFraction(0.1)).unwrap();
        sim.step().unwrap();
        let national = sim.national.clone();

        // Pastures run to 2012 and payments to 2012: 2013 cannot be simulated.
        let err = sim.step().unwrap_err();
        assert!(matches!(err, SimError::Behavior(BehaviorError::PasturesUnavailable { .. })));
        assert_eq!(sim.clock.current_year, Year(2013));
        assert_eq!(sim.national, national);
        assert!(sim.municipalities.iter().all(|m| m.staged().is_none()));
    }

    #[test]
    fn payment_gap_is_fatal() {
        let cfg = SimConfig { start_year: Year(2000), ..config(1, RngStrategy::Shared) };
        let mut sim =
            build(cfg, three_municipalities(), FixedProbability(1.0), FixedFraction(0.1)).unwrap();
        sim.payments = PaymentSchedule::new([(Year(2005), 100.0)]);
        let err = sim.step().unwrap_err();
        assert!(matches!(
            err,
            SimError::Behavior(BehaviorError::PaymentNotAvailable { year: Year(2000), .. })
        ));
        assert_eq!(sim.clock.current_year, Year(2000));
    }

    #[test]
    fn start_year_before_1996_rejected() {
        let cfg = SimConfig { start_year: Year(1995), ..SimConfig::default() };
        let err = build(cfg, three_municipalities(), FixedProbability(1.0), FixedFraction(0.1))
            .err()
            .unwrap();
        assert!(matches!(err, SimError::Core(CoreError::InvalidConfiguration(_))));
    }

    #[test]
    fn missing_environment_reported() {
        let records = three_municipalities();
        let (store, rngs) = MunicipalityStoreBuilder::new(Year(1996), 42)
            .municipalities(records)
            .build()
            .unwrap();
        let models = AdoptionModels::new(
            FixedProbability(1.0),
            names(CLASSIFIER_FEATURES),
            FixedFraction(0.1),
            names(REGRESSOR_FEATURES),
        )
        .unwrap();
        let err = SimBuilder::new(SimConfig::default(), store, rngs, models)
            .payments(payments())
            .build()
            .err()
            .unwrap();
        match err {
            SimError::Agent(sbp_agent::AgentError::DataIntegrity { municipalities, .. }) => {
                assert_eq!(municipalities.len(), 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn pastures_gap_reported_at_build() {
        let mut short = record("Alcoutim", 400.0, &[]);
        short.pastures_area.remove(&Year(2005));
        let err = build(
            config(17, RngStrategy::Shared),
            vec![record("Mértola", 100.0, &[]), short],
            FixedProbability(1.0),
            FixedFraction(0.1),
        )
        .err()
        .unwrap();
        match err {
            SimError::Agent(sbp_agent::AgentError::DataIntegrity { municipalities, detail }) => {
                assert_eq!(municipalities, ["Alcoutim"]);
                assert!(detail.contains("2005"), "{detail}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn store_reference_year_must_match_config() {
        let records = three_municipalities();
        let env = environments(&records);
        let (store, rngs) = MunicipalityStoreBuilder::new(Year(1996), 42)
            .reference_year(Year(2005))
            .municipalities(records)
            .build()
            .unwrap();
        let models = AdoptionModels::new(
            FixedProbability(1.0),
            names(CLASSIFIER_FEATURES),
            FixedFraction(0.1),
            names(REGRESSOR_FEATURES),
        )
        .unwrap();
        let err = SimBuilder::new(SimConfig::default(), store, rngs, models)
            .environments(env)
            .payments(payments())
            .build()
            .err()
            .unwrap();
        match err {
            SimError::Config(message) => {
                assert!(message.contains("2005") && message.contains("2009"), "{message}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn overflowing_run_length_rejected() {
        let err = build(
            config(u16::MAX, RngStrategy::Shared),
            three_municipalities(),
            FixedProbability(1.0),
            FixedFraction(0.1),
        )
        .err()
        .unwrap();
        assert!(matches!(err, SimError::Core(CoreError::InvalidConfiguration(_))));
    }
}

// ── Determinism ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod determinism_tests {
    use sbp_behavior::{FixedFraction, FixedProbability};

    use super::*;
    use crate::NoopObserver;

    fn ledger<C: Classifier, R: Regressor>(sim: &Sim<C, R>) -> Vec<BTreeMap<Year, f64>> {
        sim.municipalities.iter().map(|m| m.yearly_hectares.clone()).collect()
    }

    fn many() -> Vec<MunicipalityRecord> {
        (0..40).map(|i| record(&format!("M{i:02}"), 100.0 + i as f64, &[])).collect()
    }

    #[test]
    fn same_seed_same_results() {
        for strategy in [RngStrategy::Shared, RngStrategy::PerMunicipality] {
            let run = || {
                let mut sim =
                    build(config(10, strategy), many(), FixedProbability(0.5), FixedFraction(0.05))
                        .unwrap();
                sim.run(&mut NoopObserver).unwrap();
                ledger(&sim)
            };
            assert_eq!(run(), run(), "{strategy:?}");
        }
    }

    #[test]
    fn different_seed_different_results() {
        let run = |seed| {
            let cfg = SimConfig { seed, ..config(10, RngStrategy::PerMunicipality) };
            let mut sim = build(cfg, many(), FixedProbability(0.5), FixedFraction(0.05)).unwrap();
            sim.run(&mut NoopObserver).unwrap();
            ledger(&sim)
        };
        assert_ne!(run(1), run(2));
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use sbp_behavior::{FixedFraction, FixedProbability};

    use super::*;
    use crate::{SimObserver, YearSnapshot, YearSummary};

    #[derive(Default)]
    struct Recorder {
        baseline:  Option<YearSnapshot>,
        started:   Vec<Year>,
        summaries: Vec<YearSummary>,
        snapshots: Vec<Year>,
        ended:     Option<Year>,
    }

    impl SimObserver for Recorder {
        fn on_sim_start(&mut self, baseline: &YearSnapshot) {
            self.baseline = Some(baseline.clone());
        }
        fn on_year_start(&mut self, year: Year) {
            self.started.push(year);
        }
        fn on_year_end(&mut self, summary: &YearSummary) {
            self.summaries.push(*summary);
        }
        fn on_snapshot(&mut self, snapshot: &YearSnapshot) {
            self.snapshots.push(snapshot.year);
        }
        fn on_sim_end(&mut self, final_year: Year) {
            self.ended = Some(final_year);
        }
    }

    #[test]
    fn run_reports_every_hook() {
        let cfg = SimConfig { output_interval_years: 2, ..config(5, RngStrategy::Shared) };
        let mut sim =
            build(cfg, three_municipalities(), FixedProbability(1.0), FixedFraction(0.01)).unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        let baseline = rec.baseline.unwrap();
        assert_eq!(baseline.year, Year(1995));
        assert!((baseline.national_yearly_hectares - 60.0).abs() < 1e-9);
        assert_eq!(baseline.municipalities.len(), 3);
        assert_eq!(baseline.municipalities[0].name, "Mértola");
        assert!((baseline.municipalities[0].yearly_fraction - 0.01).abs() < 1e-12);

        assert_eq!(rec.started, (1996..=2000).map(Year).collect::<Vec<_>>());
        assert_eq!(rec.summaries.len(), 5);
        assert_eq!(rec.snapshots, [Year(1996), Year(1998), Year(2000)]);
        assert_eq!(rec.ended, Some(Year(2000)));
    }

    #[test]
    fn snapshot_matches_ledger() {
        let mut sim = build(
            config(3, RngStrategy::Shared),
            three_municipalities(),
            FixedProbability(1.0),
            FixedFraction(0.02),
        )
        .unwrap();
        sim.step().unwrap();
        let snap = sim.snapshot();
        assert_eq!(snap.year, Year(1996));
        let total: f64 = snap.municipalities.iter().map(|m| m.yearly_hectares).sum();
        assert!((total - snap.national_yearly_hectares).abs() < 1e-9);
        assert_eq!(snap.municipalities[1].pastures_area, 400.0);
    }
}

// ── Invariants ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod invariant_tests {
    use proptest::prelude::*;
    use sbp_behavior::{FixedFraction, FixedProbability};

    use super::*;

    proptest! {
        #[test]
        fn ledger_invariants_hold(
            seed in any::<u64>(),
            p in 0.0_f64..=1.0,
            f in -0.2_f64..0.8,
            areas in prop::collection::vec(50.0_f64..500.0, 1..6),
            shrink in 0.5_f64..1.0,
        ) {
            // Pastures shrink linearly over the run so capacity can bind.
            let records: Vec<MunicipalityRecord> = areas
                .iter()
                .enumerate()
                .map(|(i, &a)| {
                    let mut r = record(&format!("M{i}"), a, &[]);
                    for y in 2000..=2012 {
                        r.pastures_area.insert(Year(y), a * shrink);
                    }
                    r
                })
                .collect();
            let cfg = SimConfig { seed, ..config(17, RngStrategy::PerMunicipality) };
            let mut sim = build(cfg, records, FixedProbability(p), FixedFraction(f)).unwrap();

            for _ in 0..17 {
                let year = sim.clock.current_year;
                let before: Vec<f64> =
                    sim.municipalities.iter().map(|m| m.cumulative_hectares).collect();
                sim.step().unwrap();

                let mut total = 0.0;
                for (m, cum_before) in sim.municipalities.iter().zip(before) {
                    let available = m.pastures_in(year).unwrap();
                    if cum_before <= available {
                        prop_assert!(m.cumulative_hectares <= available + 1e-9);
                    }
                    prop_assert!(m.cumulative_hectares >= cum_before);
                    prop_assert!(
                        (m.cumulative_hectares - m.reference_area * m.cumulative_fraction).abs()
                            <= 1e-9 * m.reference_area.max(1.0)
                    );
                    total += m.yearly_hectares[&year];
                }
                prop_assert!((sim.national.yearly_in(year) - total).abs() < 1e-9);
                prop_assert!(
                    (sim.national.cumulative_hectares
                        - sim.municipalities.total_cumulative_hectares())
                    .abs()
                        < 1e-6
                );
            }
        }
    }
}
