use ndarray::{Array1, Array2};

use crate::comparator::FitnessComparator;
use crate::individual::Individual;

/// Fixed-size, slot-addressed collection of individuals.
///
/// Slots are replaced in place; the population never grows or shrinks after
/// creation. Individuals are referred to by slot index everywhere.
#[derive(Debug, Clone)]
pub struct Population {
    members: Vec<Individual>,
}

impl Population {
    pub fn new(members: Vec<Individual>) -> Self {
        Self { members }
    }

    /// Build a population from the rows of an `npop x dim` matrix
    pub fn from_rows(rows: &Array2<f64>) -> Self {
        Self { members: rows.rows().into_iter().map(|r| Individual::new(r.to_owned())).collect() }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Genome length of the members (0 for an empty population)
    pub fn dim(&self) -> usize {
        self.members.first().map_or(0, Individual::dim)
    }

    pub fn get(&self, i: usize) -> &Individual {
        &self.members[i]
    }

    /// Gene `g` of the individual in slot `i`
    pub fn gene(&self, i: usize, g: usize) -> f64 {
        self.members[i].genome()[g]
    }

    /// Replace slot `i`. Panics if `i` is out of range.
    pub fn set(&mut self, i: usize, ind: Individual) {
        self.members[i] = ind;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Individual> {
        self.members.iter()
    }

    /// Sort fittest first
    pub fn sort<C: FitnessComparator + ?Sized>(&mut self, cmp: &C) {
        self.members.sort_by(|a, b| cmp.compare(a, b));
    }

    /// Slot of the fittest member (first one on ties)
    pub fn best_index<C: FitnessComparator + ?Sized>(&self, cmp: &C) -> usize {
        let mut best = 0usize;
        for i in 1..self.members.len() {
            if cmp.is_better(&self.members[i], &self.members[best]) {
                best = i;
            }
        }
        best
    }

    /// Fitness of every member, in slot order
    pub fn fitness_values<C: FitnessComparator + ?Sized>(&self, cmp: &C) -> Vec<f64> {
        self.members.iter().map(|ind| cmp.fitness(ind)).collect()
    }

    /// Genomes as an `npop x dim` matrix
    pub fn to_array(&self) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros((self.len(), self.dim()));
        for (mut row, ind) in out.rows_mut().into_iter().zip(self.members.iter()) {
            row.assign(ind.genome());
        }
        out
    }

    pub fn into_members(self) -> Vec<Individual> {
        self.members
    }
}

impl From<Vec<Vec<f64>>> for Population {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Self { members: rows.into_iter().map(|r| Individual::new(Array1::from(r))).collect() }
    }
}
