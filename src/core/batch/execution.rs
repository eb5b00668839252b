//! Job and step execution records
//!
//! These are the values the job repository persists. Every status change
//! goes through a guarded transition so a terminal execution can never move
//! again.

use super::context::ExecutionContext;
use super::parameters::JobParameters;
use super::status::BatchStatus;
use crate::domain::{FerryError, JobExecutionId, JobInstanceKey, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Context key holding the number of records a step has committed
pub const READ_COUNT_KEY: &str = "read.count";

/// Progress and outcome of one step run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepExecution {
    /// Name of the step
    pub step_name: String,

    /// Current status
    pub status: BatchStatus,

    /// Records read and committed
    pub read_count: u64,

    /// Records written and committed
    pub write_count: u64,

    /// Chunks committed
    pub commit_count: u64,

    /// Chunks rolled back
    pub rollback_count: u64,

    /// When the step started running
    pub start_time: Option<DateTime<Utc>>,

    /// When the step reached a terminal status
    pub end_time: Option<DateTime<Utc>>,

    /// Failure or stop reason
    pub exit_message: Option<String>,

    /// Restart bookkeeping
    pub execution_context: ExecutionContext,
}

impl StepExecution {
    /// New step execution in `STARTING`
    pub fn new(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            status: BatchStatus::Starting,
            read_count: 0,
            write_count: 0,
            commit_count: 0,
            rollback_count: 0,
            start_time: None,
            end_time: None,
            exit_message: None,
            execution_context: ExecutionContext::new(),
        }
    }

    /// Move to `next`, stamping start and end times
    ///
    /// # Errors
    ///
    /// Returns `FerryError::State` if the transition is not allowed.
    pub fn transition(&mut self, next: BatchStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(FerryError::State(format!(
                "step '{}' cannot move from {} to {}",
                self.step_name, self.status, next
            )));
        }

        if next == BatchStatus::Started {
            self.start_time = Some(Utc::now());
        }
        if next.is_terminal() {
            self.end_time = Some(Utc::now());
        }
        self.status = next;
        Ok(())
    }

    /// Record a committed chunk of `count` records
    pub fn record_commit(&mut self, count: u64) {
        self.read_count += count;
        self.write_count += count;
        self.commit_count += 1;
    }

    /// Records committed across this run and any earlier run it resumed
    pub fn committed_total(&self) -> u64 {
        self.execution_context
            .get_u64(READ_COUNT_KEY)
            .unwrap_or(self.read_count)
    }

    /// Mark the step failed with a reason
    pub fn mark_failed(&mut self, message: impl Into<String>) -> Result<()> {
        self.exit_message = Some(message.into());
        self.transition(BatchStatus::Failed)
    }

    /// Mark the step stopped with a reason
    pub fn mark_stopped(&mut self, message: impl Into<String>) -> Result<()> {
        self.exit_message = Some(message.into());
        self.transition(BatchStatus::Stopped)
    }
}

/// One attempt at running a job instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobExecution {
    /// Unique id of this attempt
    pub id: JobExecutionId,

    /// Job name
    pub job_name: String,

    /// Identity of the job instance this attempt belongs to
    pub instance_key: JobInstanceKey,

    /// Launch parameters
    pub parameters: JobParameters,

    /// Current status
    pub status: BatchStatus,

    /// Step runs in execution order
    pub step_executions: Vec<StepExecution>,

    /// Job scoped context shared with step factories
    pub execution_context: ExecutionContext,

    /// When the execution record was created
    pub create_time: DateTime<Utc>,

    /// When the job started running
    pub start_time: Option<DateTime<Utc>>,

    /// When the job reached a terminal status
    pub end_time: Option<DateTime<Utc>>,

    /// Error messages collected during the run
    pub failures: Vec<String>,
}

impl JobExecution {
    /// New execution in `STARTING`
    pub fn new(job_name: impl Into<String>, parameters: JobParameters) -> Self {
        let job_name = job_name.into();
        let instance_key = parameters.instance_key(&job_name);
        Self {
            id: JobExecutionId::generate(),
            job_name,
            instance_key,
            parameters,
            status: BatchStatus::Starting,
            step_executions: Vec::new(),
            execution_context: ExecutionContext::new(),
            create_time: Utc::now(),
            start_time: None,
            end_time: None,
            failures: Vec::new(),
        }
    }

    /// Move to `next`, stamping start and end times
    ///
    /// # Errors
    ///
    /// Returns `FerryError::State` if the transition is not allowed, which
    /// includes any attempt to leave a terminal status.
    pub fn transition(&mut self, next: BatchStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(FerryError::State(format!(
                "job '{}' execution {} cannot move from {} to {}",
                self.job_name, self.id, self.status, next
            )));
        }

        if next == BatchStatus::Started {
            self.start_time = Some(Utc::now());
        }
        if next.is_terminal() {
            self.end_time = Some(Utc::now());
        }
        self.status = next;
        Ok(())
    }

    /// Record a failure message
    pub fn add_failure(&mut self, message: impl Into<String>) {
        self.failures.push(message.into());
    }

    /// Step execution by name
    pub fn step_execution(&self, step_name: &str) -> Option<&StepExecution> {
        self.step_executions
            .iter()
            .find(|step| step.step_name == step_name)
    }

    /// Total records written across all steps
    pub fn write_count(&self) -> u64 {
        self.step_executions.iter().map(|s| s.write_count).sum()
    }

    /// Total records read across all steps
    pub fn read_count(&self) -> u64 {
        self.step_executions.iter().map(|s| s.read_count).sum()
    }

    /// Wall-clock duration, once the execution has ended
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_lifecycle_stamps_times() {
        let mut step = StepExecution::new("step");
        assert!(step.start_time.is_none());

        step.transition(BatchStatus::Started).unwrap();
        assert!(step.start_time.is_some());
        assert!(step.end_time.is_none());

        step.transition(BatchStatus::Completed).unwrap();
        assert!(step.end_time.is_some());
    }

    #[test]
    fn test_step_record_commit() {
        let mut step = StepExecution::new("step");
        step.record_commit(100);
        step.record_commit(7);

        assert_eq!(step.read_count, 107);
        assert_eq!(step.write_count, 107);
        assert_eq!(step.commit_count, 2);
        assert_eq!(step.committed_total(), 107);

        step.execution_context.put_u64(READ_COUNT_KEY, 307);
        assert_eq!(step.committed_total(), 307);
    }

    #[test]
    fn test_job_terminal_state_is_final() {
        let mut job = JobExecution::new("job", JobParameters::empty());
        job.transition(BatchStatus::Started).unwrap();
        job.transition(BatchStatus::Completed).unwrap();

        let err = job.transition(BatchStatus::Started).unwrap_err();
        assert!(matches!(err, FerryError::State(_)));
        assert_eq!(job.status, BatchStatus::Completed);
    }

    #[test]
    fn test_job_can_fail_during_setup() {
        let mut job = JobExecution::new("job", JobParameters::empty());
        job.transition(BatchStatus::Failed).unwrap();
        assert!(job.end_time.is_some());
        assert!(job.start_time.is_none());
    }

    #[test]
    fn test_job_instance_key_matches_parameters() {
        let params = JobParameters::builder().add_long("time", 5).build();
        let job = JobExecution::new("export", params.clone());
        assert_eq!(job.instance_key, params.instance_key("export"));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut job = JobExecution::new(
            "job",
            JobParameters::builder().add_string("a", "b").build(),
        );
        job.step_executions.push(StepExecution::new("step"));
        job.add_failure("boom");

        let json = serde_json::to_value(&job).unwrap();
        let restored: JobExecution = serde_json::from_value(json).unwrap();
        assert_eq!(restored, job);
    }
}
