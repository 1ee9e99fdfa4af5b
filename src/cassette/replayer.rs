//! Replays recorded interactions from a cassette.

use std::collections::HashMap;

use super::format::{Cassette, Interaction};

/// Key for indexing interactions by port and method.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct PortMethodKey {
    port: String,
    method: String,
}

/// Replays interactions from a loaded cassette, serving them sequentially
/// per port/method pair.
pub struct CassetteReplayer {
    queues: HashMap<PortMethodKey, Vec<Interaction>>,
    cursors: HashMap<PortMethodKey, usize>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<PortMethodKey, Vec<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            let key = PortMethodKey {
                port: interaction.port.clone(),
                method: interaction.method.clone(),
            };
            queues.entry(key).or_default().push(interaction.clone());
        }
        let cursors = queues.keys().map(|k| (k.clone(), 0)).collect();
        Self { queues, cursors }
    }

    /// Return the next interaction for the given port and method.
    ///
    /// # Panics
    ///
    /// Panics if the cassette has no (more) interactions for the given
    /// port/method combination.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> &Interaction {
        let key = PortMethodKey { port: port.to_string(), method: method.to_string() };

        let queue = self.queues.get(&key).unwrap_or_else(|| {
            let available: Vec<String> =
                self.queues.keys().map(|k| format!("{}::{}", k.port, k.method)).collect();
            panic!(
                "Cassette exhausted: no interactions recorded for port={port:?} method={method:?}. \
                 Available port::method pairs: [{}]",
                available.join(", ")
            );
        });

        let cursor = self.cursors.get_mut(&key).expect("cursor must exist");
        assert!(
            *cursor < queue.len(),
            "Cassette exhausted: all {count} interactions for port={port:?} method={method:?} \
             have been consumed. Last interaction was seq={last_seq}.",
            count = queue.len(),
            last_seq = queue.last().map_or(0, |i| i.seq),
        );

        let interaction = &queue[*cursor];
        *cursor += 1;
        interaction
    }

    /// Return the next interaction for `port::method` whose input equals
    /// `input`, falling back to plain sequential order when none matches.
    ///
    /// Used for calls issued concurrently, whose recorded order follows
    /// completion rather than issue order.
    ///
    /// # Panics
    ///
    /// Same as [`CassetteReplayer::next_interaction`].
    pub fn next_matching(
        &mut self,
        port: &str,
        method: &str,
        input: &serde_json::Value,
    ) -> &Interaction {
        let key = PortMethodKey { port: port.to_string(), method: method.to_string() };
        if let (Some(queue), Some(cursor)) = (self.queues.get_mut(&key), self.cursors.get(&key)) {
            let start = *cursor;
            if let Some(offset) = queue.iter().skip(start).position(|i| &i.input == input) {
                queue.swap(start, start + offset);
            }
        }
        self.next_interaction(port, method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn interaction(seq: u64, port: &str, method: &str, output: serde_json::Value) -> Interaction {
        Interaction {
            seq,
            port: port.into(),
            method: method.into(),
            input: json!({}),
            output,
        }
    }

    fn make_cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            tool_version: "0.1.0".into(),
            interactions,
        }
    }

    #[test]
    fn interleaved_ports_keep_independent_order() {
        let cassette = make_cassette(vec![
            interaction(0, "host", "list_tree", json!({"ok": {"tree": []}})),
            interaction(1, "host", "raw_file", json!({"ok": "a"})),
            interaction(2, "host", "raw_file", json!({"ok": "b"})),
            interaction(3, "llm", "send", json!({"ok": {"status": 200, "body": "{}"}})),
        ]);

        let mut replayer = CassetteReplayer::new(&cassette);

        assert_eq!(replayer.next_interaction("llm", "send").seq, 3);
        assert_eq!(replayer.next_interaction("host", "raw_file").output, json!({"ok": "a"}));
        assert_eq!(replayer.next_interaction("host", "list_tree").seq, 0);
        assert_eq!(replayer.next_interaction("host", "raw_file").output, json!({"ok": "b"}));
    }

    #[test]
    #[should_panic(expected = "Cassette exhausted")]
    fn exhausted_replayer_panics_with_descriptive_message() {
        let cassette = make_cassette(vec![interaction(0, "llm", "send", json!({}))]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let _ = replayer.next_interaction("llm", "send");
        let _ = replayer.next_interaction("llm", "send");
    }

    #[test]
    #[should_panic(expected = "no interactions recorded")]
    fn unknown_port_panics() {
        let cassette = make_cassette(vec![]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let _ = replayer.next_interaction("clock", "now");
    }

    #[test]
    fn next_matching_prefers_equal_input() {
        let mut first = interaction(0, "host", "raw_file", json!({"ok": "a"}));
        first.input = json!({"url": "a"});
        let mut second = interaction(1, "host", "raw_file", json!({"ok": "b"}));
        second.input = json!({"url": "b"});
        let mut replayer = CassetteReplayer::new(&make_cassette(vec![first, second]));

        let url_b = json!({"url": "b"});
        assert_eq!(replayer.next_matching("host", "raw_file", &url_b).output, json!({"ok": "b"}));
        let unknown = json!({"url": "x"});
        assert_eq!(replayer.next_matching("host", "raw_file", &unknown).output, json!({"ok": "a"}));
    }
}
