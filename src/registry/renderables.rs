/// Renderables registry - insertion-ordered buckets by recording cadence
///
/// Renderables of the same cadence share a bucket and therefore a
/// command list per frame, except on-change drawables: each of those
/// gets a bucket of its own so one flag never forces unrelated content
/// to re-record. A bucket's `epoch` counts its change flags; command
/// buffers compare it against the epoch they last recorded.

use slotmap::SlotMap;

use crate::clock::FrameClock;
use crate::drawable::{RecordingCadence, Renderable};
use crate::engine_debug;
use crate::error::Result;

const LOG_SOURCE: &str = "prism::Renderables";

slotmap::new_key_type! {
    /// Stable handle of a registered drawable
    pub struct DrawableKey;
}

/// One group of renderables recorded into the same command list
pub struct Bucket {
    cadence: RecordingCadence,
    /// Members in insertion order; draw order within the bucket
    members: Vec<DrawableKey>,
    /// On-change buckets never accept a second member
    exclusive: bool,
    /// Bumped on every change flag; starts at 1 so freshly allocated
    /// command buffers (epoch 0) always record once
    epoch: u64,
}

impl Bucket {
    pub fn cadence(&self) -> RecordingCadence {
        self.cadence
    }

    pub fn members(&self) -> &[DrawableKey] {
        &self.members
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[derive(Default)]
pub struct Renderables {
    items: SlotMap<DrawableKey, Renderable>,
    buckets: Vec<Bucket>,
}

impl Renderables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a renderable into its cadence bucket
    ///
    /// Changes the bucket topology; command buffers must be reallocated
    /// before the next frame is recorded.
    pub fn add(&mut self, renderable: Renderable) -> DrawableKey {
        let cadence = renderable.cadence();
        let name = renderable.name().to_string();
        let key = self.items.insert(renderable);

        let exclusive = cadence == RecordingCadence::OnChangeFlagged;
        let bucket_index = if exclusive {
            None
        } else {
            self.buckets
                .iter()
                .position(|b| !b.exclusive && b.cadence == cadence)
        };
        match bucket_index {
            Some(index) => self.buckets[index].members.push(key),
            None => self.buckets.push(Bucket {
                cadence,
                members: vec![key],
                exclusive,
                epoch: 1,
            }),
        }

        engine_debug!(
            LOG_SOURCE,
            "Registered '{}' ({:?}), {} buckets",
            name,
            cadence,
            self.buckets.len()
        );
        key
    }

    /// Remove one renderable; returns it so the caller controls when the
    /// GPU resources drop
    pub fn remove(&mut self, key: DrawableKey) -> Option<Renderable> {
        let renderable = self.items.remove(key)?;
        for bucket in &mut self.buckets {
            if let Some(position) = bucket.members.iter().position(|&k| k == key) {
                bucket.members.remove(position);
                break;
            }
        }
        self.buckets.retain(|b| !b.members.is_empty());
        Some(renderable)
    }

    /// Remove everything except self-managed renderables
    pub fn remove_all(&mut self) -> Vec<Renderable> {
        let doomed: Vec<DrawableKey> = self
            .items
            .iter()
            .filter(|(_, r)| !r.is_self_managed())
            .map(|(key, _)| key)
            .collect();
        doomed.into_iter().filter_map(|key| self.remove(key)).collect()
    }

    pub fn get(&self, key: DrawableKey) -> Option<&Renderable> {
        self.items.get(key)
    }

    pub fn get_mut(&mut self, key: DrawableKey) -> Option<&mut Renderable> {
        self.items.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DrawableKey, &Renderable)> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (DrawableKey, &mut Renderable)> {
        self.items.iter_mut()
    }

    // ===== PER-FRAME WORK =====

    /// Run every update callback
    ///
    /// A member reporting a change bumps its bucket's epoch, so the
    /// bucket re-records on its next frame. Returns true when any
    /// callback reported a change.
    pub fn update(&mut self, clock: &FrameClock) -> bool {
        let mut any_changed = false;
        for bucket in &mut self.buckets {
            let mut bucket_changed = false;
            for &key in &bucket.members {
                if let Some(renderable) = self.items.get_mut(key) {
                    bucket_changed |= renderable.update(clock);
                }
            }
            if bucket_changed {
                bucket.epoch += 1;
                any_changed = true;
            }
        }
        any_changed
    }

    /// Upload every renderable's current uniform values for one frame
    pub fn update_uniform_buffers(&self, frame_index: usize) -> Result<()> {
        for renderable in self.items.values() {
            renderable.update_uniform_buffers(frame_index)?;
        }
        Ok(())
    }

    /// Flag one drawable's bucket for re-recording
    pub fn flag_changed(&mut self, key: DrawableKey) {
        for bucket in &mut self.buckets {
            if bucket.members.contains(&key) {
                bucket.epoch += 1;
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "renderables_tests.rs"]
mod tests;
