//! Bounded queue of past elites used as extra crossover partners.

use std::collections::VecDeque;

use rand::Rng;

use super::car::Car;

/// FIFO of cloned high-fitness cars from earlier generations.
///
/// When full, pushing evicts the oldest entry. A capacity of zero disables
/// the queue.
#[derive(Debug)]
pub struct MemoryQueue {
    cars: VecDeque<Car>,
    capacity: usize,
}

impl MemoryQueue {
    /// Creates an empty queue with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            cars: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Stores a genotype copy of `car`.
    pub fn remember(&mut self, car: &Car) {
        if self.capacity == 0 {
            return;
        }
        self.cars.push_back(car.clone_genotype());
        while self.cars.len() > self.capacity {
            self.cars.pop_front();
        }
    }

    /// Picks a stored car uniformly at random.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Car> {
        if self.cars.is_empty() {
            return None;
        }
        self.cars.get(rng.random_range(0..self.cars.len()))
    }

    /// Number of stored cars.
    pub fn len(&self) -> usize {
        self.cars.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    /// Maximum number of stored cars.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored cars, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Car> {
        self.cars.iter()
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.cars.clear();
    }
}
