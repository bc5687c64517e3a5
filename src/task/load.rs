//! CPU load generator tasks

use crate::instrument::ExecutionBudget;
use crate::types::TaskId;

use super::PeriodicTask;

/// Burns a fixed budget every release and does nothing else
pub struct LoadSimulation<'a, B: ExecutionBudget> {
    id: TaskId,
    units: u32,
    budget: &'a B,
}

impl<'a, B: ExecutionBudget> LoadSimulation<'a, B> {
    pub fn new(id: TaskId, units: u32, budget: &'a B) -> Self {
        LoadSimulation { id, units, budget }
    }
}

impl<'a, B: ExecutionBudget> PeriodicTask for LoadSimulation<'a, B> {
    fn id(&self) -> TaskId {
        self.id
    }

    fn budget(&self) -> u32 {
        self.units
    }

    fn release(&mut self) {
        self.budget.consume(self.units);
    }
}
