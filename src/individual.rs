//! Candidate parameter sets and the random factory that produces them.
//!
//! An [`Individual`] is a fixed-shape record of six integer genes. Its fields
//! are private: every constructor validates against the gene domains, and the
//! in-crate operators only ever write values drawn from a domain or copied
//! from another valid individual, so an out-of-domain value cannot exist.

use crate::Genotype;
use crate::error::{ConfigError, GeneOutOfRange};
use crate::reproduction::MutationRate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// The six named genes of an [`Individual`], in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gene {
    /// Binarization cutoff.
    Threshold,
    /// Blur kernel size.
    Blur,
    /// Dilation kernel height.
    DilateSize,
    /// Dilation kernel width.
    DilateShape,
    /// Erosion kernel height.
    ErodeSize,
    /// Erosion kernel width.
    ErodeShape,
}

impl Gene {
    pub const ALL: [Gene; 6] = [
        Gene::Threshold,
        Gene::Blur,
        Gene::DilateSize,
        Gene::DilateShape,
        Gene::ErodeSize,
        Gene::ErodeShape,
    ];

    /// The legal values of this gene, inclusive on both ends.
    pub fn domain(self) -> RangeInclusive<u8> {
        match self {
            Gene::Threshold => 50..=150,
            _ => 1..=5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Gene::Threshold => "threshold",
            Gene::Blur => "blur",
            Gene::DilateSize => "dilate_size",
            Gene::DilateShape => "dilate_shape",
            Gene::ErodeSize => "erode_size",
            Gene::ErodeShape => "erode_shape",
        }
    }

    /// Position of this gene in [`Gene::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Draws a value uniformly from this gene's domain.
    pub fn sample<R: Rng>(self, rng: &mut R) -> u8 {
        rng.random_range(self.domain())
    }

    fn check(self, value: u8) -> Result<u8, GeneOutOfRange> {
        if self.domain().contains(&value) {
            Ok(value)
        } else {
            Err(GeneOutOfRange { gene: self, value })
        }
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One candidate set of preprocessing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GeneRecord", into = "GeneRecord")]
pub struct Individual {
    threshold: u8,
    blur: u8,
    dilate_size: u8,
    dilate_shape: u8,
    erode_size: u8,
    erode_shape: u8,
}

impl Individual {
    /// Builds an individual, rejecting any gene outside its domain.
    pub fn new(
        threshold: u8,
        blur: u8,
        dilate_size: u8,
        dilate_shape: u8,
        erode_size: u8,
        erode_shape: u8,
    ) -> Result<Self, GeneOutOfRange> {
        Ok(Self {
            threshold: Gene::Threshold.check(threshold)?,
            blur: Gene::Blur.check(blur)?,
            dilate_size: Gene::DilateSize.check(dilate_size)?,
            dilate_shape: Gene::DilateShape.check(dilate_shape)?,
            erode_size: Gene::ErodeSize.check(erode_size)?,
            erode_shape: Gene::ErodeShape.check(erode_shape)?,
        })
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn blur(&self) -> u8 {
        self.blur
    }

    pub fn dilate_size(&self) -> u8 {
        self.dilate_size
    }

    pub fn dilate_shape(&self) -> u8 {
        self.dilate_shape
    }

    pub fn erode_size(&self) -> u8 {
        self.erode_size
    }

    pub fn erode_shape(&self) -> u8 {
        self.erode_shape
    }

    pub fn get(&self, gene: Gene) -> u8 {
        match gene {
            Gene::Threshold => self.threshold,
            Gene::Blur => self.blur,
            Gene::DilateSize => self.dilate_size,
            Gene::DilateShape => self.dilate_shape,
            Gene::ErodeSize => self.erode_size,
            Gene::ErodeShape => self.erode_shape,
        }
    }

    /// Callers must pass a value from `gene.domain()`.
    pub(crate) fn set(&mut self, gene: Gene, value: u8) {
        debug_assert!(gene.domain().contains(&value));
        let slot = match gene {
            Gene::Threshold => &mut self.threshold,
            Gene::Blur => &mut self.blur,
            Gene::DilateSize => &mut self.dilate_size,
            Gene::DilateShape => &mut self.dilate_shape,
            Gene::ErodeSize => &mut self.erode_size,
            Gene::ErodeShape => &mut self.erode_shape,
        };
        *slot = value;
    }

    /// Iterates `(gene, value)` pairs in canonical order.
    pub fn genes(&self) -> impl Iterator<Item = (Gene, u8)> + '_ {
        Gene::ALL.into_iter().map(move |g| (g, self.get(g)))
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (gene, value) in self.genes() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{gene}={value}")?;
            first = false;
        }
        Ok(())
    }
}

impl Genotype for Individual {
    fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            threshold: Gene::Threshold.sample(rng),
            blur: Gene::Blur.sample(rng),
            dilate_size: Gene::DilateSize.sample(rng),
            dilate_shape: Gene::DilateShape.sample(rng),
            erode_size: Gene::ErodeSize.sample(rng),
            erode_shape: Gene::ErodeShape.sample(rng),
        }
    }

    fn mutate<R: Rng>(&mut self, rng: &mut R, rate: MutationRate) {
        for gene in Gene::ALL {
            if rng.random::<f64>() < rate.get() {
                self.set(gene, gene.sample(rng));
            }
        }
    }

    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Self {
        let mut child = *self;
        for gene in Gene::ALL {
            if rng.random::<f64>() >= 0.5 {
                child.set(gene, other.get(gene));
            }
        }
        child
    }
}

/// Wire form of an [`Individual`]; validated on the way in.
#[derive(Serialize, Deserialize)]
struct GeneRecord {
    threshold: u8,
    blur: u8,
    dilate_size: u8,
    dilate_shape: u8,
    erode_size: u8,
    erode_shape: u8,
}

impl TryFrom<GeneRecord> for Individual {
    type Error = GeneOutOfRange;

    fn try_from(r: GeneRecord) -> Result<Self, Self::Error> {
        Individual::new(
            r.threshold,
            r.blur,
            r.dilate_size,
            r.dilate_shape,
            r.erode_size,
            r.erode_shape,
        )
    }
}

impl From<Individual> for GeneRecord {
    fn from(i: Individual) -> Self {
        Self {
            threshold: i.threshold,
            blur: i.blur,
            dilate_size: i.dilate_size,
            dilate_shape: i.dilate_shape,
            erode_size: i.erode_size,
            erode_shape: i.erode_shape,
        }
    }
}

/// Draws every gene independently and uniformly from its domain.
pub fn create_individual<R: Rng>(rng: &mut R) -> Individual {
    Individual::random(rng)
}

/// Creates `size` independent random individuals.
pub fn create_population<R: Rng>(size: usize, rng: &mut R) -> Result<Vec<Individual>, ConfigError> {
    if size < 1 {
        return Err(ConfigError::PopulationTooSmall);
    }
    Ok((0..size).map(|_| create_individual(rng)).collect())
}

/// Per-gene mean of several parameter sets, rounded to nearest (ties to even).
///
/// Returns `None` for an empty slice. The mean of in-domain values is itself
/// in-domain, so the result is always a valid individual.
pub fn mean_parameters(individuals: &[Individual]) -> Option<Individual> {
    let mut mean = *individuals.first()?;
    let n = individuals.len() as f64;
    for gene in Gene::ALL {
        let sum: u32 = individuals.iter().map(|i| u32::from(i.get(gene))).sum();
        mean.set(gene, (f64::from(sum) / n).round_ties_even() as u8);
    }
    Some(mean)
}
