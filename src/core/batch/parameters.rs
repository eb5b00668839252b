//! Job parameters and job instance identity
//!
//! Parameters are supplied at launch and never change afterwards. The
//! identifying ones, together with the job name, determine the job instance
//! a run belongs to.

use crate::domain::{FerryError, JobInstanceKey, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// A typed parameter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum JobParameter {
    /// Text value
    String(String),
    /// Integer value
    Long(i64),
    /// Timestamp value
    Date(DateTime<Utc>),
}

impl JobParameter {
    fn type_name(&self) -> &'static str {
        match self {
            JobParameter::String(_) => "string",
            JobParameter::Long(_) => "long",
            JobParameter::Date(_) => "date",
        }
    }
}

impl fmt::Display for JobParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobParameter::String(s) => write!(f, "{s}"),
            JobParameter::Long(v) => write!(f, "{v}"),
            JobParameter::Date(d) => write!(f, "{}", d.to_rfc3339()),
        }
    }
}

/// A parameter value plus whether it takes part in instance identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParameterEntry {
    pub value: JobParameter,
    pub identifying: bool,
}

/// Immutable set of parameters for one job launch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParameters {
    entries: BTreeMap<String, JobParameterEntry>,
}

impl JobParameters {
    /// Parameters with no entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a parameter set
    pub fn builder() -> JobParametersBuilder {
        JobParametersBuilder::default()
    }

    /// Raw access to a parameter
    pub fn get(&self, key: &str) -> Option<&JobParameter> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// String parameter, if present with that type
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(JobParameter::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Long parameter, if present with that type
    pub fn get_long(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(JobParameter::Long(v)) => Some(*v),
            _ => None,
        }
    }

    /// Date parameter, if present with that type
    pub fn get_date(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.get(key) {
            Some(JobParameter::Date(d)) => Some(*d),
            _ => None,
        }
    }

    /// Whether a parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no parameters
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over parameters in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &JobParameterEntry)> {
        self.entries.iter()
    }

    /// Derive the instance key for `job_name` from the identifying parameters
    ///
    /// Keys are visited in sorted order so the digest does not depend on the
    /// order parameters were added in.
    pub fn instance_key(&self, job_name: &str) -> JobInstanceKey {
        let mut hasher = Sha256::new();
        hasher.update(job_name.as_bytes());
        hasher.update(b"\n");

        for (key, entry) in self.entries.iter().filter(|(_, e)| e.identifying) {
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(entry.value.type_name().as_bytes());
            hasher.update(b":");
            hasher.update(entry.value.to_string().as_bytes());
            hasher.update(b";");
        }

        let digest = hasher.finalize();
        JobInstanceKey::from_digest(format!("{digest:x}"))
    }
}

impl fmt::Display for JobParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .entries
            .iter()
            .map(|(key, entry)| format!("{key}={}", entry.value))
            .collect();
        write!(f, "{{{}}}", rendered.join(", "))
    }
}

/// Builder for [`JobParameters`]
#[derive(Debug, Default)]
pub struct JobParametersBuilder {
    entries: BTreeMap<String, JobParameterEntry>,
}

impl JobParametersBuilder {
    /// Add an identifying string parameter
    pub fn add_string(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(key, JobParameter::String(value.into()), true)
    }

    /// Add an identifying long parameter
    pub fn add_long(self, key: impl Into<String>, value: i64) -> Self {
        self.add(key, JobParameter::Long(value), true)
    }

    /// Add an identifying date parameter
    pub fn add_date(self, key: impl Into<String>, value: DateTime<Utc>) -> Self {
        self.add(key, JobParameter::Date(value), true)
    }

    /// Add any parameter with explicit identity
    pub fn add(mut self, key: impl Into<String>, value: JobParameter, identifying: bool) -> Self {
        self.entries.insert(
            key.into(),
            JobParameterEntry {
                value,
                identifying,
            },
        );
        self
    }

    /// Finish building
    pub fn build(self) -> JobParameters {
        JobParameters {
            entries: self.entries,
        }
    }
}

/// Checks that the keys a job needs are present before it is launched
#[derive(Debug, Clone, Default)]
pub struct JobParametersValidator {
    required_keys: Vec<String>,
}

impl JobParametersValidator {
    /// Validator requiring the given keys
    pub fn new<I, S>(required_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_keys: required_keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Keys this validator requires
    pub fn required_keys(&self) -> &[String] {
        &self.required_keys
    }

    /// Fails with a configuration error naming every missing key
    pub fn validate(&self, parameters: &JobParameters) -> Result<()> {
        let missing: Vec<&str> = self
            .required_keys
            .iter()
            .filter(|key| !parameters.contains(key))
            .map(String::as_str)
            .collect();

        if !missing.is_empty() {
            return Err(FerryError::Configuration(format!(
                "Missing required job parameters: {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_typed_getters() {
        let date = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let params = JobParameters::builder()
            .add_string("input.file.name", "/tmp/products.csv")
            .add_long("time", 1700000000000)
            .add_date("run.date", date)
            .build();

        assert_eq!(params.get_string("input.file.name"), Some("/tmp/products.csv"));
        assert_eq!(params.get_long("time"), Some(1700000000000));
        assert_eq!(params.get_date("run.date"), Some(date));
        assert_eq!(params.get_string("time"), None);
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_instance_key_is_order_independent() {
        let a = JobParameters::builder()
            .add_string("a", "1")
            .add_long("b", 2)
            .build();
        let b = JobParameters::builder()
            .add_long("b", 2)
            .add_string("a", "1")
            .build();

        assert_eq!(a.instance_key("job"), b.instance_key("job"));
    }

    #[test]
    fn test_instance_key_depends_on_job_and_values() {
        let params = JobParameters::builder().add_long("time", 1).build();
        let other = JobParameters::builder().add_long("time", 2).build();

        assert_ne!(params.instance_key("import"), params.instance_key("export"));
        assert_ne!(params.instance_key("export"), other.instance_key("export"));
        assert_eq!(params.instance_key("export").as_str().len(), 64);
    }

    #[test]
    fn test_instance_key_ignores_non_identifying() {
        let plain = JobParameters::builder().add_string("file", "x").build();
        let with_extra = JobParameters::builder()
            .add_string("file", "x")
            .add("run.id", JobParameter::Long(99), false)
            .build();

        assert_eq!(plain.instance_key("job"), with_extra.instance_key("job"));
    }

    #[test]
    fn test_instance_key_distinguishes_types() {
        let as_string = JobParameters::builder().add_string("n", "5").build();
        let as_long = JobParameters::builder().add_long("n", 5).build();

        assert_ne!(as_string.instance_key("job"), as_long.instance_key("job"));
    }

    #[test]
    fn test_validator_reports_missing_keys() {
        let validator = JobParametersValidator::new(["input.file.name"]);

        let err = validator.validate(&JobParameters::empty()).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("input.file.name"));

        let ok = JobParameters::builder()
            .add_string("input.file.name", "/tmp/in.csv")
            .build();
        assert!(validator.validate(&ok).is_ok());
    }

    #[test]
    fn test_display() {
        let params = JobParameters::builder()
            .add_string("b", "x")
            .add_long("a", 1)
            .build();
        assert_eq!(params.to_string(), "{a=1, b=x}");
    }
}
