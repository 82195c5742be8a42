use chrono::SecondsFormat;
use k8s_openapi::api::core::v1::{ContainerState, Event, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

/// Flattened view of a pod, as reported by `get_pods`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodSummary {
    pub name: String,
    pub namespace: Option<String>,
    pub phase: Option<String>,
    /// State of the first container, if any status was reported yet
    pub container_state: Option<String>,
    pub pod_ip: Option<String>,
    pub node_name: Option<String>,
    pub created: Option<String>,
}

impl From<&Pod> for PodSummary {
    fn from(pod: &Pod) -> Self {
        let status = pod.status.as_ref();
        let container_state = status
            .and_then(|s| s.container_statuses.as_ref())
            .and_then(|statuses| statuses.first())
            .and_then(|cs| cs.state.as_ref())
            .map(describe_state);

        Self {
            name: pod.metadata.name.clone().unwrap_or_default(),
            namespace: pod.metadata.namespace.clone(),
            phase: status.and_then(|s| s.phase.clone()),
            container_state,
            pod_ip: status.and_then(|s| s.pod_ip.clone()),
            node_name: pod.spec.as_ref().and_then(|s| s.node_name.clone()),
            created: pod.metadata.creation_timestamp.as_ref().map(format_time),
        }
    }
}

/// Flattened view of a core/v1 event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSummary {
    /// Name of the object the event is about
    pub involved_name: Option<String>,
    pub message: Option<String>,
    pub reason: Option<String>,
    pub event_type: Option<String>,
    pub source_component: Option<String>,
    pub first_seen: Option<String>,
    pub last_seen: Option<String>,
}

impl EventSummary {
    pub fn concerns(&self, name: &str) -> bool {
        self.involved_name.as_deref() == Some(name)
    }
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        Self {
            involved_name: event.involved_object.name.clone(),
            message: event.message.clone(),
            reason: event.reason.clone(),
            event_type: event.type_.clone(),
            source_component: event.source.as_ref().and_then(|s| s.component.clone()),
            first_seen: event.first_timestamp.as_ref().map(format_time),
            last_seen: event.last_timestamp.as_ref().map(format_time),
        }
    }
}

fn format_time(time: &Time) -> String {
    time.0.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn describe_state(state: &ContainerState) -> String {
    if let Some(running) = &state.running {
        match &running.started_at {
            Some(started) => format!("running (started at {})", format_time(started)),
            None => "running".to_string(),
        }
    } else if let Some(waiting) = &state.waiting {
        match &waiting.reason {
            Some(reason) => format!("waiting ({})", reason),
            None => "waiting".to_string(),
        }
    } else if let Some(terminated) = &state.terminated {
        format!(
            "terminated ({}, exit code {})",
            terminated.reason.as_deref().unwrap_or("Unknown"),
            terminated.exit_code
        )
    } else {
        "unknown".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pod_from(value: serde_json::Value) -> Pod {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_running_pod_summary() {
        let pod = pod_from(json!({
            "metadata": {
                "name": "web-0",
                "namespace": "shop",
                "creationTimestamp": "2024-05-01T10:00:00Z"
            },
            "spec": {
                "nodeName": "kind-control-plane",
                "containers": [{"name": "web", "image": "nginx"}]
            },
            "status": {
                "phase": "Running",
                "podIP": "10.244.0.7",
                "containerStatuses": [{
                    "name": "web",
                    "image": "nginx",
                    "imageID": "",
                    "ready": true,
                    "restartCount": 0,
                    "state": {"running": {"startedAt": "2024-05-01T10:00:05Z"}}
                }]
            }
        }));

        let summary = PodSummary::from(&pod);
        assert_eq!(summary.name, "web-0");
        assert_eq!(summary.namespace.as_deref(), Some("shop"));
        assert_eq!(summary.phase.as_deref(), Some("Running"));
        assert_eq!(summary.pod_ip.as_deref(), Some("10.244.0.7"));
        assert_eq!(summary.node_name.as_deref(), Some("kind-control-plane"));
        assert_eq!(
            summary.container_state.as_deref(),
            Some("running (started at 2024-05-01T10:00:05Z)")
        );
        assert_eq!(summary.created.as_deref(), Some("2024-05-01T10:00:00Z"));
    }

    #[test]
    fn test_pending_pod_without_statuses() {
        let pod = pod_from(json!({
            "metadata": {"name": "pending", "namespace": "default"},
            "status": {"phase": "Pending"}
        }));

        let summary = PodSummary::from(&pod);
        assert_eq!(summary.phase.as_deref(), Some("Pending"));
        assert!(summary.container_state.is_none());
        assert!(summary.pod_ip.is_none());
        assert!(summary.node_name.is_none());
    }

    #[test]
    fn test_waiting_and_terminated_states() {
        let waiting = ContainerState {
            waiting: Some(k8s_openapi::api::core::v1::ContainerStateWaiting {
                reason: Some("ImagePullBackOff".to_string()),
                message: None,
            }),
            ..Default::default()
        };
        assert_eq!(describe_state(&waiting), "waiting (ImagePullBackOff)");

        let terminated = ContainerState {
            terminated: Some(k8s_openapi::api::core::v1::ContainerStateTerminated {
                exit_code: 137,
                reason: Some("OOMKilled".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(describe_state(&terminated), "terminated (OOMKilled, exit code 137)");
    }

    #[test]
    fn test_event_summary() {
        let event: Event = serde_json::from_value(json!({
            "metadata": {"name": "web-0.17c", "namespace": "shop"},
            "involvedObject": {"kind": "Pod", "name": "web-0"},
            "message": "Pulling image \"nginx\"",
            "reason": "Pulling",
            "type": "Normal",
            "source": {"component": "kubelet"},
            "firstTimestamp": "2024-05-01T10:00:01Z",
            "lastTimestamp": "2024-05-01T10:00:02Z"
        }))
        .unwrap();

        let summary = EventSummary::from(&event);
        assert!(summary.concerns("web-0"));
        assert!(!summary.concerns("web-1"));
        assert_eq!(summary.reason.as_deref(), Some("Pulling"));
        assert_eq!(summary.event_type.as_deref(), Some("Normal"));
        assert_eq!(summary.source_component.as_deref(), Some("kubelet"));
        assert_eq!(summary.last_seen.as_deref(), Some("2024-05-01T10:00:02Z"));
    }
}
