/// CommandControl - allocates and records the main-pass command lists
///
/// One command list per bucket per frame in flight. Each list walks the
/// Unallocated -> Allocated -> Recorded states; whether a Recorded list
/// is re-recorded depends on its bucket's cadence.

use crate::context::RenderContext;
use crate::drawable::RecordingCadence;
use crate::engine_bail;
use crate::engine_info;
use crate::error::Result;
use crate::graphics_device::{CommandList, GraphicsDevice};
use crate::registry::{Bucket, Renderables};

const LOG_SOURCE: &str = "prism::CommandControl";

/// Lifecycle of one command list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// No GPU object exists
    Unallocated,
    /// Allocated but holding no commands
    Allocated,
    /// Holding a recorded command sequence
    Recorded,
}

struct TrackedList {
    list: Box<dyn CommandList>,
    state: RecordState,
    /// Bucket epoch this list last recorded; 0 means never
    recorded_epoch: u64,
}

/// Command lists of one frame in flight, one per bucket
struct FrameSlot {
    lists: Vec<TrackedList>,
}

#[derive(Default)]
pub struct CommandControl {
    slots: Vec<FrameSlot>,
}

impl CommandControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_allocated(&self) -> bool {
        !self.slots.is_empty()
    }

    /// State of one list, `Unallocated` when nothing is allocated
    pub fn state(&self, frame_index: usize, bucket_index: usize) -> RecordState {
        self.slots
            .get(frame_index)
            .and_then(|slot| slot.lists.get(bucket_index))
            .map(|tracked| tracked.state)
            .unwrap_or(RecordState::Unallocated)
    }

    /// Allocate one list per bucket for every frame, then record the
    /// init-once buckets
    ///
    /// Called once all drawables are registered, and again after every
    /// bucket topology change or recreation. Fixed content is recorded
    /// here already, so a frame submitted before any per-frame record
    /// call draws it.
    pub fn post_init_prep_buffers(
        &mut self,
        context: &RenderContext,
        registry: &Renderables,
    ) -> Result<()> {
        let device = context.device();
        let frame_count = context.frame_count();
        let buckets = registry.buckets();

        self.slots.clear();
        for _ in 0..frame_count {
            let mut lists = Vec::with_capacity(buckets.len());
            for _ in 0..buckets.len() {
                lists.push(TrackedList {
                    list: device.create_command_list()?,
                    state: RecordState::Allocated,
                    recorded_epoch: 0,
                });
            }
            self.slots.push(FrameSlot { lists });
        }

        for (frame_index, slot) in self.slots.iter_mut().enumerate() {
            for (bucket, tracked) in buckets.iter().zip(&mut slot.lists) {
                if bucket.cadence() == RecordingCadence::AtInitOnly {
                    record_bucket(tracked, bucket, frame_index, context, registry)?;
                }
            }
        }

        engine_info!(
            LOG_SOURCE,
            "Allocated {} command lists ({} frames x {} buckets)",
            frame_count * buckets.len(),
            frame_count,
            buckets.len()
        );
        Ok(())
    }

    /// Record the buckets that need it for one frame
    ///
    /// Init-once buckets were recorded at prep and only replay here;
    /// per-frame buckets always re-record; on-change buckets re-record
    /// when their epoch moved since this frame's list last recorded.
    pub fn record_for_frame(
        &mut self,
        frame_index: usize,
        context: &RenderContext,
        registry: &Renderables,
    ) -> Result<()> {
        let buckets = registry.buckets();
        let Some(slot) = self.slots.get_mut(frame_index) else {
            engine_bail!(LOG_SOURCE, "recording frame {} before allocation", frame_index);
        };
        if slot.lists.len() != buckets.len() {
            engine_bail!(
                LOG_SOURCE,
                "{} lists allocated but registry has {} buckets, reallocation missed",
                slot.lists.len(),
                buckets.len()
            );
        }

        for (bucket, tracked) in buckets.iter().zip(&mut slot.lists) {
            let needs_record = match bucket.cadence() {
                RecordingCadence::UponEachFrame => true,
                RecordingCadence::AtInitOnly | RecordingCadence::OnChangeFlagged => {
                    tracked.state != RecordState::Recorded || tracked.recorded_epoch < bucket.epoch()
                }
            };
            if needs_record {
                record_bucket(tracked, bucket, frame_index, context, registry)?;
            }
        }
        Ok(())
    }

    /// Recorded lists of one frame, in bucket order
    pub fn buffers_for_frame(&self, frame_index: usize) -> Vec<&dyn CommandList> {
        self.slots
            .get(frame_index)
            .map(|slot| {
                slot.lists
                    .iter()
                    .filter(|tracked| tracked.state == RecordState::Recorded)
                    .map(|tracked| &*tracked.list)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drop every command list; the next use requires reallocation
    pub fn free_buffers(&mut self) {
        self.slots.clear();
    }
}

/// Record one bucket's draws into its list for one frame
fn record_bucket(
    tracked: &mut TrackedList,
    bucket: &Bucket,
    frame_index: usize,
    context: &RenderContext,
    registry: &Renderables,
) -> Result<()> {
    let cmd = &mut *tracked.list;
    cmd.begin()?;
    cmd.begin_render_pass(
        context.render_pass(),
        context.framebuffer(frame_index),
        &context.clear_values(),
    )?;
    for &key in bucket.members() {
        if let Some(renderable) = registry.get(key) {
            renderable.issue_bind_and_draw_commands(cmd, frame_index)?;
        }
    }
    cmd.end_render_pass()?;
    cmd.end()?;

    tracked.state = RecordState::Recorded;
    tracked.recorded_epoch = bucket.epoch();
    Ok(())
}

#[cfg(test)]
#[path = "command_control_tests.rs"]
mod tests;
