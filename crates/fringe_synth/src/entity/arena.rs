//! Fixed-capacity slot storage for entities.
use glam::UVec2;
use rand::RngCore;

use crate::entity::{Blob, Circle, EntitySampler};

/// Slots `0..capacity`, each empty or holding a live entity. Never resized.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotArena<T> {
    slots: Vec<Option<T>>,
}

impl<T> SlotArena<T> {
    /// Creates `capacity` empty slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Overwrites `slot`, returning the previous occupant. Out-of-range slots are ignored.
    pub fn replace(&mut self, slot: usize, value: T) -> Option<T> {
        self.slots.get_mut(slot).and_then(|s| s.replace(value))
    }

    /// Fills every slot in index order.
    pub fn fill_with(&mut self, mut f: impl FnMut(usize) -> T) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            *slot = Some(f(i));
        }
    }

    /// Occupied slots with their index, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|v| (i, v)))
    }

    /// Raw slot view, including empty markers.
    pub fn slots(&self) -> &[Option<T>] {
        &self.slots
    }
}

/// Circle and blob slots for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    pub circles: SlotArena<Circle>,
    pub blobs: SlotArena<Blob>,
}

impl Registry {
    pub fn new(circle_count: usize, blob_count: usize) -> Self {
        Self {
            circles: SlotArena::new(circle_count),
            blobs: SlotArena::new(blob_count),
        }
    }

    /// Samples every circle slot, then every blob slot.
    pub fn populate(&mut self, sampler: &EntitySampler, canvas: UVec2, rng: &mut dyn RngCore) {
        self.circles
            .fill_with(|_| sampler.sample_circle(canvas, &mut *rng));
        self.blobs.fill_with(|_| sampler.sample_blob(canvas, &mut *rng));
    }

    /// Fringe count of every circle slot in slot order; empty slots read as 0.
    pub fn fringe_counts(&self) -> Vec<u32> {
        self.circles
            .slots()
            .iter()
            .map(|s| s.as_ref().map_or(0, |c| c.fringe_count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::config::SynthConfig;

    #[test]
    fn arena_starts_empty_and_keeps_capacity_on_replace() {
        let mut arena: SlotArena<u32> = SlotArena::new(3);
        assert_eq!(arena.capacity(), 3);
        assert_eq!(arena.live(), 0);
        assert_eq!(arena.replace(1, 7), None);
        assert_eq!(arena.replace(1, 8), Some(7));
        assert_eq!(arena.replace(5, 1), None);
        assert_eq!(arena.capacity(), 3);
        assert_eq!(arena.iter().collect::<Vec<_>>(), vec![(1, &8)]);
    }

    #[test]
    fn populate_fills_all_slots() {
        let cfg = SynthConfig::default()
            .with_resolution(400, 300)
            .with_radius_range(10, 20);
        let sampler = EntitySampler::from_config(&cfg);
        let mut rng = StdRng::seed_from_u64(1);
        let mut reg = Registry::new(4, 2);
        reg.populate(&sampler, cfg.resolution, &mut rng);
        assert_eq!(reg.circles.live(), 4);
        assert_eq!(reg.blobs.live(), 2);
        assert_eq!(reg.fringe_counts().len(), 4);
    }

    #[test]
    fn fringe_counts_report_empty_slots_as_zero() {
        let mut reg = Registry::new(2, 0);
        reg.circles.replace(
            1,
            Circle {
                position: IVec2::new(5, 5),
                radius: 3,
                fringe_count: 4,
                intensity: 1.0,
                fill_level: 180,
            },
        );
        assert_eq!(reg.fringe_counts(), vec![0, 4]);
    }
}
