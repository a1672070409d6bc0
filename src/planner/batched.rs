//! Planner wrappers that partition the dependency graph and reuse the core
//! planner per partition.
//!
//! The depth-based wrappers split the graph into topological generations;
//! the batched wrappers into fixed-size groups. Sequential variants thread
//! the accumulated end time through the sub-plans; parallel variants plan
//! every partition from time zero on a worker pool and offset the results
//! while merging.

use log::debug;
use rayon::prelude::*;

use crate::scheduling::{DependencyGraph, MultiAgentToolpathSchedule};
use crate::toolpath::Toolpath;
use crate::AgentId;

use super::agent::AgentModel;
use super::errors::PlanningError;
use super::options::PlanningOptions;
use super::scheduler::MultiAgentToolpathPlanner;

fn plan_sequential(
    planner: &MultiAgentToolpathPlanner,
    toolpath: &Toolpath,
    partitions: Vec<DependencyGraph<usize>>,
    options: &PlanningOptions,
) -> Result<MultiAgentToolpathSchedule, PlanningError> {
    let mut merged = MultiAgentToolpathSchedule::new();
    let mut t0 = 0.0;
    for mut partition in partitions {
        let part = planner.plan_from(toolpath, &mut partition, options, t0)?;
        t0 = part.end_time().max(t0);
        merged.extend_with(part);
    }
    Ok(merged)
}

fn plan_parallel(
    planner: &MultiAgentToolpathPlanner,
    toolpath: &Toolpath,
    partitions: Vec<DependencyGraph<usize>>,
    options: &PlanningOptions,
) -> Result<MultiAgentToolpathSchedule, PlanningError> {
    debug!("planning {} partitions in parallel", partitions.len());
    let parts: Result<Vec<MultiAgentToolpathSchedule>, PlanningError> = partitions
        .into_par_iter()
        .map(|mut partition| planner.plan(toolpath, &mut partition, options))
        .collect();
    Ok(MultiAgentToolpathSchedule::merge(parts?))
}

/// Plans one topological generation at a time, each continuing from the end
/// of the accumulated schedule.
pub struct DepthBasedSequentialPlanner {
    planner: MultiAgentToolpathPlanner,
}

impl DepthBasedSequentialPlanner {
    pub fn new(agents: Vec<(AgentId, AgentModel)>) -> Self {
        Self {
            planner: MultiAgentToolpathPlanner::new(agents),
        }
    }

    pub fn plan(
        &self,
        toolpath: &Toolpath,
        dg: &DependencyGraph<usize>,
        options: &PlanningOptions,
    ) -> Result<MultiAgentToolpathSchedule, PlanningError> {
        plan_sequential(&self.planner, toolpath, dg.stratify(1), options)
    }
}

/// Plans every topological generation concurrently from time zero, then
/// concatenates the results in generation order with time offsets.
///
/// Correct because agents end every sub-plan parked at home, at the price
/// of lost overlap across generation boundaries.
pub struct DepthBasedParallelPlanner {
    planner: MultiAgentToolpathPlanner,
}

impl DepthBasedParallelPlanner {
    pub fn new(agents: Vec<(AgentId, AgentModel)>) -> Self {
        Self {
            planner: MultiAgentToolpathPlanner::new(agents),
        }
    }

    pub fn plan(
        &self,
        toolpath: &Toolpath,
        dg: &DependencyGraph<usize>,
        options: &PlanningOptions,
    ) -> Result<MultiAgentToolpathSchedule, PlanningError> {
        plan_parallel(&self.planner, toolpath, dg.stratify(1), options)
    }
}

/// Plans fixed-size node batches one after another.
pub struct BatchedSequentialPlanner {
    planner: MultiAgentToolpathPlanner,
    batch_size: usize,
}

impl BatchedSequentialPlanner {
    pub fn new(agents: Vec<(AgentId, AgentModel)>, batch_size: usize) -> Self {
        Self {
            planner: MultiAgentToolpathPlanner::new(agents),
            batch_size,
        }
    }

    pub fn plan(
        &self,
        toolpath: &Toolpath,
        dg: &DependencyGraph<usize>,
        options: &PlanningOptions,
    ) -> Result<MultiAgentToolpathSchedule, PlanningError> {
        plan_sequential(&self.planner, toolpath, dg.batch(self.batch_size), options)
    }
}

/// Plans fixed-size node batches concurrently and merges in batch order.
pub struct BatchedParallelPlanner {
    planner: MultiAgentToolpathPlanner,
    batch_size: usize,
}

impl BatchedParallelPlanner {
    pub fn new(agents: Vec<(AgentId, AgentModel)>, batch_size: usize) -> Self {
        Self {
            planner: MultiAgentToolpathPlanner::new(agents),
            batch_size,
        }
    }

    pub fn plan(
        &self,
        toolpath: &Toolpath,
        dg: &DependencyGraph<usize>,
        options: &PlanningOptions,
    ) -> Result<MultiAgentToolpathSchedule, PlanningError> {
        plan_parallel(&self.planner, toolpath, dg.batch(self.batch_size), options)
    }
}
