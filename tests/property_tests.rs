//! Properties every individual and every run must satisfy.

use captcha_genetics::{
    EvaluationFailure, Evaluator, GaConfig, Gene, GeneticSearch, Individual, MutationRate,
    Selection, create_individual, crossover, mutate,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg64;

fn in_domain(ind: &Individual) -> bool {
    ind.genes().all(|(gene, value)| gene.domain().contains(&value))
}

prop_compose! {
    fn any_individual()(
        threshold in 50u8..=150,
        blur in 1u8..=5,
        dilate_size in 1u8..=5,
        dilate_shape in 1u8..=5,
        erode_size in 1u8..=5,
        erode_shape in 1u8..=5,
    ) -> Individual {
        Individual::new(threshold, blur, dilate_size, dilate_shape, erode_size, erode_shape)
            .unwrap()
    }
}

/// Rewards low thresholds and wide kernels, with a failing corner.
struct LandscapeEval;
impl Evaluator<Individual> for LandscapeEval {
    fn evaluate(&self, ind: &Individual) -> Result<f64, EvaluationFailure> {
        if ind.blur() == 5 && ind.erode_shape() == 5 {
            return Err(EvaluationFailure::Stage("corner".into()));
        }
        let spread = f64::from(ind.dilate_shape() + ind.erode_size()) / 10.0;
        Ok(spread - f64::from(ind.threshold()) / 300.0)
    }
}

proptest! {
    #[test]
    fn created_individuals_are_in_domain(seed in any::<u64>()) {
        let mut rng = Pcg64::seed_from_u64(seed);
        for _ in 0..20 {
            prop_assert!(in_domain(&create_individual(&mut rng)));
        }
    }

    #[test]
    fn crossover_only_copies_parent_genes(
        a in any_individual(),
        b in any_individual(),
        seed in any::<u64>(),
    ) {
        let mut rng = Pcg64::seed_from_u64(seed);
        let child = crossover(&a, &b, &mut rng);
        prop_assert!(in_domain(&child));
        for gene in Gene::ALL {
            let v = child.get(gene);
            prop_assert!(v == a.get(gene) || v == b.get(gene), "{gene} = {v}");
        }
    }

    #[test]
    fn mutation_stays_in_domain(
        ind in any_individual(),
        rate in 0.0f64..=1.0,
        seed in any::<u64>(),
    ) {
        let mut rng = Pcg64::seed_from_u64(seed);
        let mutated = mutate(&ind, MutationRate::new(rate).unwrap(), &mut rng);
        prop_assert!(in_domain(&mutated));
    }

    #[test]
    fn zero_rate_mutation_is_identity(ind in any_individual(), seed in any::<u64>()) {
        let mut rng = Pcg64::seed_from_u64(seed);
        prop_assert_eq!(mutate(&ind, MutationRate::NONE, &mut rng), ind);
    }

    #[test]
    fn running_best_never_decreases(seed in any::<u64>(), tournament in any::<bool>()) {
        let selection = if tournament { Selection::tournament() } else { Selection::Roulette };
        let config = GaConfig::default()
            .with_population_size(8)
            .with_generations(12)
            .with_selection(selection)
            .with_seed(seed);
        let mut search = GeneticSearch::new(config).unwrap();
        search.run(&LandscapeEval);

        let running: Vec<f64> = search.history().iter().map(|r| r.running_best_score).collect();
        prop_assert!(running.windows(2).all(|w| w[0] <= w[1]), "{:?}", running);
        // Elitism also keeps the per-generation best from regressing
        let per_gen: Vec<f64> = search.history().iter().map(|r| r.best_score).collect();
        prop_assert!(per_gen.windows(2).all(|w| w[0] <= w[1]), "{:?}", per_gen);
    }

    #[test]
    fn identical_seeds_reproduce_identical_runs(seed in any::<u64>()) {
        let config = GaConfig::default()
            .with_population_size(6)
            .with_generations(5)
            .with_seed(seed);
        let first = GeneticSearch::new(config.clone()).unwrap().run(&LandscapeEval);
        let second = GeneticSearch::new(config).unwrap().run(&LandscapeEval);
        prop_assert_eq!(first, second);
    }
}

#[test]
fn full_rate_mutation_redraws_every_gene() {
    let start = Individual::new(100, 3, 3, 3, 3, 3).unwrap();
    let mut rng = Pcg64::seed_from_u64(17);
    let mut changed = [false; 6];
    for _ in 0..200 {
        let mutated = mutate(&start, MutationRate::ALWAYS, &mut rng);
        for gene in Gene::ALL {
            changed[gene.index()] |= mutated.get(gene) != start.get(gene);
        }
    }
    assert!(changed.iter().all(|&c| c), "{changed:?}");
}

#[test]
fn created_genes_cover_their_domains() {
    let mut rng = Pcg64::seed_from_u64(0);
    let mut seen_low = [false; 6];
    let mut seen_high = [false; 6];
    for _ in 0..5000 {
        let ind = create_individual(&mut rng);
        for gene in Gene::ALL {
            let v = ind.get(gene);
            seen_low[gene.index()] |= v == *gene.domain().start();
            seen_high[gene.index()] |= v == *gene.domain().end();
        }
    }
    assert!(seen_low.iter().chain(&seen_high).all(|&s| s));
}
