// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{calculate_duration, dependencies::from_pod_spec, Normalize, Normalizer};
use crate::types::{
    ConditionInfo, CronJobInfo, CronJobStatus, Dependencies, JobInfo, JobStatus, ResourceDetails,
    ResourceKind,
};
use k8s_openapi::api::batch::v1::{CronJob, Job, JobStatus as ApiJobStatus};

impl Normalize for Job {
    const KIND: ResourceKind = ResourceKind::Job;

    fn details(&self, normalizer: &Normalizer) -> ResourceDetails {
        let status = self.status.as_ref();
        let start_time = status.and_then(|s| s.start_time.as_ref()).map(|t| t.0);
        let completion_time = status.and_then(|s| s.completion_time.as_ref()).map(|t| t.0);

        let conditions = status
            .and_then(|s| s.conditions.as_deref())
            .unwrap_or_default()
            .iter()
            .map(|c| ConditionInfo {
                condition_type: c.type_.clone(),
                status: c.status.clone(),
                reason: c.reason.clone(),
                message: c.message.clone(),
            })
            .collect();

        ResourceDetails::Job(JobInfo {
            status: job_status(status),
            completions: self.spec.as_ref().and_then(|s| s.completions).unwrap_or(1),
            succeeded: status.and_then(|s| s.succeeded).unwrap_or(0),
            failed: status.and_then(|s| s.failed).unwrap_or(0),
            active: status.and_then(|s| s.active).unwrap_or(0),
            start_time,
            completion_time,
            duration: calculate_duration(start_time, completion_time, normalizer.now()),
            conditions,
        })
    }

    fn dependencies(&self) -> Option<Dependencies> {
        let template = self.spec.as_ref().and_then(|s| s.template.spec.as_ref());
        Some(from_pod_spec(template, &[]))
    }
}

/// Conditions win over counters; a job with no activity at all is still pending.
fn job_status(status: Option<&ApiJobStatus>) -> JobStatus {
    let Some(status) = status else {
        return JobStatus::Pending;
    };

    let has_condition = |kind: &str| {
        status
            .conditions
            .iter()
            .flatten()
            .any(|c| c.type_ == kind && c.status == "True")
    };
    let succeeded = status.succeeded.unwrap_or(0);
    let failed = status.failed.unwrap_or(0);
    let active = status.active.unwrap_or(0);

    if has_condition("Complete") {
        JobStatus::Complete
    } else if has_condition("Failed") {
        JobStatus::Failed
    } else if active > 0 {
        JobStatus::Running
    } else if succeeded == 0 && failed == 0 {
        JobStatus::Pending
    } else {
        JobStatus::Unknown
    }
}

impl Normalize for CronJob {
    const KIND: ResourceKind = ResourceKind::CronJob;

    fn details(&self, _: &Normalizer) -> ResourceDetails {
        let spec = self.spec.as_ref();
        let status = self.status.as_ref();
        let suspend = spec.and_then(|s| s.suspend).unwrap_or(false);

        ResourceDetails::CronJob(CronJobInfo {
            status: if suspend {
                CronJobStatus::Suspended
            } else {
                CronJobStatus::Active
            },
            schedule: spec.map(|s| s.schedule.clone()).unwrap_or_default(),
            suspend,
            active: status.and_then(|s| s.active.as_ref()).map_or(0, Vec::len),
            last_schedule: status.and_then(|s| s.last_schedule_time.as_ref()).map(|t| t.0),
            last_successful_time: status
                .and_then(|s| s.last_successful_time.as_ref())
                .map(|t| t.0),
        })
    }

    fn dependencies(&self) -> Option<Dependencies> {
        let template = self
            .spec
            .as_ref()
            .and_then(|s| s.job_template.spec.as_ref())
            .and_then(|s| s.template.spec.as_ref());
        Some(from_pod_spec(template, &[]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({"conditions": [{"type": "Complete", "status": "True"}], "succeeded": 1}), JobStatus::Complete)]
    #[case(json!({"conditions": [{"type": "Failed", "status": "True"}], "failed": 6}), JobStatus::Failed)]
    #[case(json!({"conditions": [{"type": "Complete", "status": "False"}], "active": 1}), JobStatus::Running)]
    #[case(json!({}), JobStatus::Pending)]
    #[case(json!({"failed": 2}), JobStatus::Unknown)]
    fn test_job_status(#[case] status: serde_json::Value, #[case] expected: JobStatus) {
        let status: ApiJobStatus = serde_json::from_value(status).unwrap();
        assert_eq!(job_status(Some(&status)), expected);
    }

    #[test]
    fn test_job_details() {
        let job: Job = serde_json::from_value(json!({
            "metadata": {"name": "migrate"},
            "spec": {"template": {"spec": {"containers": [{
                "name": "migrate",
                "envFrom": [{"secretRef": {"name": "db-creds"}}]
            }]}}},
            "status": {
                "startTime": "2026-03-01T10:00:00Z",
                "completionTime": "2026-03-01T10:02:30Z",
                "succeeded": 1,
                "conditions": [{"type": "Complete", "status": "True"}]
            }
        }))
        .unwrap();
        let now = DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let resource = Normalizer::at(now).resource(&job, "batch");
        assert_eq!(resource.secret_refs(), ["db-creds"]);

        let ResourceDetails::Job(info) = resource.details else {
            panic!("expected job details");
        };
        assert_eq!(info.status, JobStatus::Complete);
        assert_eq!(info.completions, 1);
        assert_eq!(info.duration.as_deref(), Some("2m 30s"));
        assert_eq!(info.conditions.len(), 1);
    }

    #[test]
    fn test_suspended_cron_job() {
        let cron: CronJob = serde_json::from_value(json!({
            "metadata": {"name": "nightly"},
            "spec": {
                "schedule": "0 3 * * *",
                "suspend": true,
                "jobTemplate": {"spec": {"template": {"spec": {
                    "containers": [{"name": "backup"}],
                    "volumes": [{"name": "cfg", "configMap": {"name": "backup-config"}}]
                }}}}
            },
            "status": {"active": [{"name": "nightly-1"}]}
        }))
        .unwrap();

        let resource = Normalizer::new().resource(&cron, "default");
        assert_eq!(resource.config_map_refs(), ["backup-config"]);
        assert_eq!(resource.status(), Some("Suspended"));

        let ResourceDetails::CronJob(info) = resource.details else {
            panic!("expected cronjob details");
        };
        assert_eq!(info.schedule, "0 3 * * *");
        assert_eq!(info.active, 1);
    }
}
