use super::{EventSummary, PodSummary};

const BLOCK_SEPARATOR: &str = "\n---\n";

fn or_none(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}

/// Render pods as `Label: value` blocks separated by `---`
pub fn render_pods(pods: &[PodSummary]) -> String {
    pods.iter()
        .map(|pod| {
            format!(
                "\nPod: {}\nNamespace: {}\nStatus: {}\nContainer Status: {}\nIP: {}\nNode: {}\nCreated: {}\n",
                pod.name,
                or_none(&pod.namespace),
                or_none(&pod.phase),
                or_none(&pod.container_state),
                or_none(&pod.pod_ip),
                or_none(&pod.node_name),
                or_none(&pod.created),
            )
        })
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

pub fn render_events(events: &[EventSummary]) -> String {
    events
        .iter()
        .map(|event| {
            format!(
                "\nEvent: {}\nReason: {}\nType: {}\nSource: {}\nFirst Seen: {}\nLast Seen: {}\n",
                or_none(&event.message),
                or_none(&event.reason),
                or_none(&event.event_type),
                or_none(&event.source_component),
                or_none(&event.first_seen),
                or_none(&event.last_seen),
            )
        })
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_pod() {
        let pod = PodSummary {
            name: "web-0".to_string(),
            namespace: Some("shop".to_string()),
            phase: Some("Running".to_string()),
            container_state: None,
            pod_ip: Some("10.0.0.1".to_string()),
            node_name: None,
            created: None,
        };

        assert_eq!(
            render_pods(&[pod]),
            "\nPod: web-0\nNamespace: shop\nStatus: Running\nContainer Status: None\nIP: 10.0.0.1\nNode: None\nCreated: None\n"
        );
    }

    #[test]
    fn test_blocks_are_separated() {
        let pods = vec![
            PodSummary {
                name: "a".to_string(),
                ..Default::default()
            },
            PodSummary {
                name: "b".to_string(),
                ..Default::default()
            },
        ];
        let text = render_pods(&pods);
        assert_eq!(text.matches("\n---\n").count(), 1);
        assert!(text.find("Pod: a").unwrap() < text.find("Pod: b").unwrap());
    }

    #[test]
    fn test_render_events() {
        let event = EventSummary {
            involved_name: Some("web-0".to_string()),
            message: Some("Started container web".to_string()),
            reason: Some("Started".to_string()),
            event_type: Some("Normal".to_string()),
            source_component: Some("kubelet".to_string()),
            first_seen: None,
            last_seen: None,
        };
        let text = render_events(&[event]);
        assert!(text.contains("Event: Started container web\n"));
        assert!(text.contains("Source: kubelet\n"));
        assert!(text.contains("First Seen: None\n"));
    }

    #[test]
    fn test_empty_input_renders_empty() {
        assert_eq!(render_pods(&[]), "");
        assert_eq!(render_events(&[]), "");
    }
}
