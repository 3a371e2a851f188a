//! Submitters issue the GPU work of draws and dispatches. The instance
//! swaps between the plain submitter and one that also gathers per job
//! statistics, without touching the draw call sites.

use std::collections::BTreeMap;

use gl::types::*;

use crate::backend::Device;
use crate::ngl::state::PrimitiveType;
use crate::ngl::JobHandle;

/// The GPU work that follows a successful predraw or predispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Draw {
        primitive: PrimitiveType,
        mode: GLenum,
        count: u32,
        ty: GLenum,
    },
    DrawInstanced {
        primitive: PrimitiveType,
        mode: GLenum,
        count: u32,
        ty: GLenum,
        instances: u32,
    },
    /// Draw with arguments sourced from `buffer` at `offset`.
    DrawIndirect {
        mode: GLenum,
        ty: GLenum,
        buffer: GLuint,
        offset: usize,
    },
    Dispatch([u32; 3]),
    DispatchIndirect { buffer: GLuint, offset: usize },
}

/// The counters of one job.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatistic {
    pub draw_calls: u32,
    pub instanced_draws: u32,
    pub indirect_draws: u32,
    pub dispatches: u32,
    /// Number of primitives assembled by direct draws.
    pub primitives: u64,
    pub renderer_creations: u32,
}

/// The statistics of every job that has submitted work while gathering.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Statistic {
    pub jobs: BTreeMap<JobHandle, JobStatistic>,
}

impl Statistic {
    /// Returns the sum of the counters of every job.
    pub fn total(&self) -> JobStatistic {
        self.jobs.values().fold(JobStatistic::default(), |mut acc, v| {
            acc.draw_calls += v.draw_calls;
            acc.instanced_draws += v.instanced_draws;
            acc.indirect_draws += v.indirect_draws;
            acc.dispatches += v.dispatches;
            acc.primitives += v.primitives;
            acc.renderer_creations += v.renderer_creations;
            acc
        })
    }
}

pub trait Submitter {
    fn submit(&mut self, device: &mut dyn Device, job: JobHandle, command: &Command);

    /// Called when `job` created a new renderer during its predraw.
    fn renderer_created(&mut self, _: JobHandle) {}

    /// Returns the gathered statistics, if this submitter gathers any.
    fn statistic(&self) -> Option<&Statistic> {
        None
    }
}

/// Issues the GL calls of commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainSubmitter;

impl Submitter for PlainSubmitter {
    fn submit(&mut self, device: &mut dyn Device, _: JobHandle, command: &Command) {
        match *command {
            Command::Draw {
                mode, count, ty, ..
            } => {
                device.draw_elements(mode, count as GLsizei, ty);
            }
            Command::DrawInstanced {
                mode,
                count,
                ty,
                instances,
                ..
            } => {
                device.draw_elements_instanced(mode, count as GLsizei, ty, instances as GLsizei);
            }
            Command::DrawIndirect {
                mode,
                ty,
                buffer,
                offset,
            } => {
                device.bind_buffer(gl::DRAW_INDIRECT_BUFFER, buffer);
                device.draw_elements_indirect(mode, ty, offset);
                device.bind_buffer(gl::DRAW_INDIRECT_BUFFER, 0);
            }
            Command::Dispatch([x, y, z]) => {
                device.dispatch_compute(x, y, z);
            }
            Command::DispatchIndirect { buffer, offset } => {
                device.bind_buffer(gl::DISPATCH_INDIRECT_BUFFER, buffer);
                device.dispatch_compute_indirect(offset);
                device.bind_buffer(gl::DISPATCH_INDIRECT_BUFFER, 0);
            }
        }
    }
}

/// Counts commands per job, then hands them over to the plain submitter.
#[derive(Debug, Default, Clone)]
pub struct StatisticsSubmitter {
    statistic: Statistic,
    plain: PlainSubmitter,
}

impl StatisticsSubmitter {
    pub fn new() -> Self {
        StatisticsSubmitter::default()
    }

    #[inline]
    fn job(&mut self, job: JobHandle) -> &mut JobStatistic {
        self.statistic.jobs.entry(job).or_insert_with(JobStatistic::default)
    }
}

impl Submitter for StatisticsSubmitter {
    fn submit(&mut self, device: &mut dyn Device, job: JobHandle, command: &Command) {
        {
            let v = self.job(job);
            match *command {
                Command::Draw {
                    primitive, count, ..
                } => {
                    v.draw_calls += 1;
                    v.primitives += u64::from(primitive.assemble(count));
                }
                Command::DrawInstanced {
                    primitive,
                    count,
                    instances,
                    ..
                } => {
                    v.draw_calls += 1;
                    v.instanced_draws += 1;
                    v.primitives += u64::from(primitive.assemble(count)) * u64::from(instances);
                }
                Command::DrawIndirect { .. } => {
                    v.draw_calls += 1;
                    v.indirect_draws += 1;
                }
                Command::Dispatch(_) | Command::DispatchIndirect { .. } => {
                    v.dispatches += 1;
                }
            }
        }

        self.plain.submit(device, job, command);
    }

    fn renderer_created(&mut self, job: JobHandle) {
        self.job(job).renderer_creations += 1;
    }

    fn statistic(&self) -> Option<&Statistic> {
        Some(&self.statistic)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::backend::headless::{Call, HeadlessDevice};
    use crate::utils::handle::HandleLike;

    #[test]
    fn plain() {
        let mut device = HeadlessDevice::new();
        let log = device.calls();
        let mut submitter = PlainSubmitter;

        submitter.submit(
            &mut device,
            JobHandle::nil(),
            &Command::DrawIndirect {
                mode: gl::TRIANGLES,
                ty: gl::UNSIGNED_SHORT,
                buffer: 7,
                offset: 16,
            },
        );

        assert_eq!(
            *log.borrow(),
            vec![
                Call::BindBuffer(gl::DRAW_INDIRECT_BUFFER, 7),
                Call::DrawElementsIndirect {
                    mode: gl::TRIANGLES,
                    ty: gl::UNSIGNED_SHORT,
                    offset: 16,
                },
                Call::BindBuffer(gl::DRAW_INDIRECT_BUFFER, 0),
            ]
        );

        assert!(submitter.statistic().is_none());
    }

    #[test]
    fn statistics() {
        let mut device = HeadlessDevice::new();
        let log = device.calls();
        let mut submitter = StatisticsSubmitter::new();

        let a = JobHandle::new(1, 1);
        let b = JobHandle::new(2, 1);

        let draw = Command::Draw {
            primitive: PrimitiveType::Triangles,
            mode: gl::TRIANGLES,
            count: 36,
            ty: gl::UNSIGNED_SHORT,
        };

        let instanced = Command::DrawInstanced {
            primitive: PrimitiveType::Lines,
            mode: gl::LINES,
            count: 8,
            ty: gl::UNSIGNED_INT,
            instances: 10,
        };

        submitter.renderer_created(a);
        submitter.submit(&mut device, a, &draw);
        submitter.submit(&mut device, a, &instanced);
        submitter.submit(&mut device, b, &Command::Dispatch([4, 4, 1]));

        assert_eq!(log.borrow().iter().filter(|v| v.is_draw()).count(), 3);

        let statistic = submitter.statistic().unwrap();
        let v = statistic.jobs[&a];
        assert_eq!(v.draw_calls, 2);
        assert_eq!(v.instanced_draws, 1);
        assert_eq!(v.primitives, 12 + 40);
        assert_eq!(v.renderer_creations, 1);
        assert_eq!(statistic.jobs[&b].dispatches, 1);
        assert_eq!(statistic.total().draw_calls, 2);
        assert_eq!(statistic.total().dispatches, 1);
    }
}
