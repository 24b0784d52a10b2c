//! Test data builders for creating test entities

use techdispatch_core::models::{Candidate, Location, Task};

/// 不做范围校验的坐标构造，便于构造非法数据
pub fn location(latitude: f64, longitude: f64) -> Location {
    Location {
        latitude,
        longitude,
    }
}

/// Builder for creating test Candidate entities
pub struct CandidateBuilder {
    candidate: Candidate,
}

impl CandidateBuilder {
    pub fn new() -> Self {
        Self {
            candidate: Candidate {
                id: 1,
                location: location(0.0, 0.0),
                active: true,
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.candidate.id = id;
        self
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.candidate.location = location(latitude, longitude);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.candidate.active = false;
        self
    }

    pub fn build(self) -> Candidate {
        self.candidate
    }
}

impl Default for CandidateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test Task entities
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self {
            task: Task {
                id: 1,
                location: location(0.0, 0.0),
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.task.id = id;
        self
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.task.location = location(latitude, longitude);
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}
