use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::seq::index;

use crate::corpus::ClassExample;

/// Infinite, seeded sequence of class-label draws.
///
/// Each step picks `per_batch` distinct labels uniformly without replacement and emits each one
/// `per_class` times in a row. Replaying a sequence means building a new one with the same seed.
#[derive(Debug, Clone)]
pub struct LabelDraws {
    rng: StdRng,
    num_class: usize,
    per_batch: usize,
    per_class: usize,
    pending: VecDeque<u32>,
}

impl LabelDraws {
    /// `per_batch` must not exceed `num_class`; the sampler checks this before building one.
    pub fn new(seed: u64, num_class: usize, per_batch: usize, per_class: usize) -> Self {
        debug_assert!(per_batch <= num_class);
        Self {
            rng: StdRng::seed_from_u64(seed),
            num_class,
            per_batch,
            per_class,
            pending: VecDeque::with_capacity(per_batch * per_class),
        }
    }

    /// Distinct labels of the next step, in draw order.
    pub fn next_step(&mut self) -> Vec<u32> {
        index::sample(&mut self.rng, self.num_class, self.per_batch)
            .into_iter()
            .map(|i| i as u32)
            .collect()
    }
}

impl Iterator for LabelDraws {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.pending.is_empty() {
            for label in self.next_step() {
                for _ in 0..self.per_class {
                    self.pending.push_back(label);
                }
            }
        }
        self.pending.pop_front()
    }
}

/// A class's examples, replayed in order forever.
#[derive(Debug, Clone)]
pub struct ClassCycle {
    examples: Vec<ClassExample>,
    cursor: usize,
}

impl ClassCycle {
    /// `examples` must be non-empty.
    pub fn new(examples: Vec<ClassExample>) -> Self {
        Self {
            examples,
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn next_example(&mut self) -> &ClassExample {
        let idx = self.cursor;
        self.cursor = (self.cursor + 1) % self.examples.len();
        &self.examples[idx]
    }
}

/// Pre-grouped units replayed forever, reshuffled at the start of every pass.
#[derive(Debug, Clone)]
pub struct ShuffledCycle<T> {
    items: Vec<T>,
    order: Vec<usize>,
    cursor: usize,
    rng: StdRng,
}

impl<T> ShuffledCycle<T> {
    /// `items` must be non-empty.
    pub fn new(items: Vec<T>, seed: u64) -> Self {
        let order = (0..items.len()).collect();
        let mut cycle = Self {
            items,
            order,
            cursor: 0,
            rng: StdRng::seed_from_u64(seed),
        };
        cycle.order.shuffle(&mut cycle.rng);
        cycle
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn next_item(&mut self) -> &T {
        if self.cursor == self.order.len() {
            self.order.shuffle(&mut self.rng);
            self.cursor = 0;
        }
        let idx = self.order[self.cursor];
        self.cursor += 1;
        &self.items[idx]
    }
}
