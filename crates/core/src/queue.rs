//! Piece queue - weighted generation and a fixed-size lookahead buffer
//!
//! The generator draws a kind by walking a weight table and pairs it with a
//! uniformly random facing. The queue keeps exactly `max_size` upcoming items:
//! every dequeue appends one freshly generated piece at the back.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::QueueError;
use crate::rng::SimpleRng;
use crate::types::{Direction, PipeKind, PipeWeight};

/// A pipe that has not been placed yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueItem {
    pub kind: PipeKind,
    pub facing: Direction,
}

/// Queue notifications, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QueueEvent {
    /// The head was taken
    Dequeued(QueueItem),
    /// Contents changed
    Updated,
}

/// Weighted random piece source
#[derive(Debug, Clone)]
pub struct PipeGenerator {
    entries: Vec<PipeWeight>,
    total: f32,
    rng: SimpleRng,
}

impl PipeGenerator {
    /// Build a generator from `(kind, weight)` entries, drawn in the given order
    pub fn new(weights: &[PipeWeight], seed: u32) -> Result<Self, QueueError> {
        if weights.iter().any(|w| !w.kind.is_placeable()) {
            return Err(QueueError::StartKindWeighted);
        }
        let total: f32 = weights.iter().map(|w| w.weight).sum();
        // Negated form also rejects NaN
        if !(total > 0.0) {
            return Err(QueueError::NonPositiveTotalWeight(total));
        }

        Ok(Self {
            entries: weights.to_vec(),
            total,
            rng: SimpleRng::new(seed),
        })
    }

    pub fn total_weight(&self) -> f32 {
        self.total
    }

    /// Draw the next piece
    pub fn generate(&mut self) -> QueueItem {
        let kind = self.draw_kind();
        let facing = Direction::ALL[self.rng.next_range(4) as usize];
        QueueItem { kind, facing }
    }

    fn draw_kind(&mut self) -> PipeKind {
        let mut remaining = self.rng.next_f32() * self.total;
        for entry in self.entries.iter().filter(|e| e.weight > 0.0) {
            remaining -= entry.weight;
            if remaining <= 0.0 {
                return entry.kind;
            }
        }
        // Rounding can leave a sliver of the draw unconsumed
        self.entries
            .iter()
            .find(|e| e.weight > 0.0)
            .map(|entry| entry.kind)
            .unwrap_or(PipeKind::Straight)
    }
}

/// Fixed-capacity lookahead of upcoming pieces
#[derive(Debug, Clone)]
pub struct PipeQueue {
    items: VecDeque<QueueItem>,
    max_size: usize,
    generator: PipeGenerator,
    events: Vec<QueueEvent>,
}

impl PipeQueue {
    /// Create a queue already filled to `max_size`
    pub fn new(generator: PipeGenerator, max_size: usize) -> Self {
        let mut queue = Self {
            items: VecDeque::with_capacity(max_size),
            max_size,
            generator,
            events: Vec::new(),
        };
        queue.refill();
        queue
    }

    fn refill(&mut self) {
        while self.items.len() < self.max_size {
            let item = self.generator.generate();
            self.items.push_back(item);
        }
    }

    /// Take the head and append a freshly generated piece
    pub fn dequeue(&mut self) -> QueueItem {
        if self.items.is_empty() {
            tracing::warn!(max_size = self.max_size, "dequeue on empty piece queue, refilling");
            self.refill();
        }

        let item = match self.items.pop_front() {
            Some(item) => item,
            // Zero-capacity queue: hand out a piece straight from the generator
            None => self.generator.generate(),
        };
        self.refill();

        tracing::debug!(kind = item.kind.as_str(), facing = item.facing.as_str(), "dequeued piece");
        self.events.push(QueueEvent::Dequeued(item));
        self.events.push(QueueEvent::Updated);
        item
    }

    /// Peek at the next piece without removing it
    pub fn peek(&self) -> Option<QueueItem> {
        self.items.front().copied()
    }

    /// Upcoming pieces, head first
    pub fn contents(&self) -> impl ExactSizeIterator<Item = &QueueItem> + '_ {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, QueueEvent> {
        self.events.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights() -> Vec<PipeWeight> {
        vec![
            PipeWeight::new(PipeKind::Straight, 1.0),
            PipeWeight::new(PipeKind::Corner, 1.0),
            PipeWeight::new(PipeKind::Cross, 1.0),
        ]
    }

    #[test]
    fn generator_rejects_non_positive_total() {
        let err = PipeGenerator::new(&[PipeWeight::new(PipeKind::Straight, 0.0)], 1).unwrap_err();
        assert_eq!(err, QueueError::NonPositiveTotalWeight(0.0));
        assert!(PipeGenerator::new(&[], 1).is_err());
    }

    #[test]
    fn generator_rejects_start_kind() {
        let err = PipeGenerator::new(&[PipeWeight::new(PipeKind::Start, 1.0)], 1).unwrap_err();
        assert_eq!(err.code(), "start_kind_weighted");
    }

    #[test]
    fn zero_weight_kinds_are_never_drawn() {
        let mut generator = PipeGenerator::new(
            &[
                PipeWeight::new(PipeKind::Cross, 0.0),
                PipeWeight::new(PipeKind::Corner, 3.0),
            ],
            42,
        )
        .unwrap();
        for _ in 0..500 {
            assert_eq!(generator.generate().kind, PipeKind::Corner);
        }
    }

    #[test]
    fn generator_covers_every_weighted_kind() {
        let mut generator = PipeGenerator::new(&weights(), 9).unwrap();
        let mut seen = Vec::new();
        for _ in 0..500 {
            let kind = generator.generate().kind;
            if !seen.contains(&kind) {
                seen.push(kind);
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn queue_starts_full_and_stays_full() {
        let generator = PipeGenerator::new(&weights(), 1).unwrap();
        let mut queue = PipeQueue::new(generator, 4);
        assert_eq!(queue.len(), 4);
        assert!(queue.drain_events().next().is_none());

        for _ in 0..10 {
            queue.dequeue();
            assert_eq!(queue.len(), 4);
        }
    }

    #[test]
    fn dequeue_returns_peeked_head_and_notifies() {
        let generator = PipeGenerator::new(&weights(), 1).unwrap();
        let mut queue = PipeQueue::new(generator, 3);
        let before: Vec<QueueItem> = queue.contents().copied().collect();

        let head = queue.peek().unwrap();
        let taken = queue.dequeue();
        assert_eq!(head, taken);

        let after: Vec<QueueItem> = queue.contents().copied().collect();
        assert_eq!(&after[..2], &before[1..]);

        let events: Vec<QueueEvent> = queue.drain_events().collect();
        assert_eq!(events, vec![QueueEvent::Dequeued(taken), QueueEvent::Updated]);
    }

    #[test]
    fn zero_capacity_queue_still_hands_out_pieces() {
        let generator = PipeGenerator::new(&weights(), 1).unwrap();
        let mut queue = PipeQueue::new(generator, 0);
        assert_eq!(queue.peek(), None);
        assert!(queue.is_empty());

        let item = queue.dequeue();
        assert!(item.kind.is_placeable());
        assert!(queue.is_empty());
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = PipeQueue::new(PipeGenerator::new(&weights(), 77).unwrap(), 5);
        let mut b = PipeQueue::new(PipeGenerator::new(&weights(), 77).unwrap(), 5);
        for _ in 0..20 {
            assert_eq!(a.dequeue(), b.dequeue());
        }
    }
}
