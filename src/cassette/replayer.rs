//! Serves recorded interactions back in call order.

use std::collections::{HashMap, VecDeque};

use super::format::{Cassette, Interaction};

/// Per `(port, method)` queues over one or more cassettes.
///
/// Calls to different methods do not consume each other's interactions, so
/// a replayer tolerates reordering across methods but not within one.
#[derive(Debug, Default)]
pub struct CassetteReplayer {
    queues: HashMap<(String, String), VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Builds a replayer over a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<(String, String), VecDeque<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction.clone());
        }
        Self { queues }
    }

    /// Takes the next interaction recorded for `port`/`method`.
    ///
    /// # Panics
    ///
    /// Panics when nothing (more) was recorded for the pair. The message names
    /// the request and the pairs that still have interactions left, which is
    /// what a stale cassette needs to be re-recorded.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Interaction {
        let key = (port.to_string(), method.to_string());
        if let Some(interaction) = self.queues.get_mut(&key).and_then(VecDeque::pop_front) {
            return interaction;
        }

        let mut left: Vec<String> = self
            .queues
            .iter()
            .filter(|(_, q)| !q.is_empty())
            .map(|((p, m), q)| format!("{p}::{m} ({})", q.len()))
            .collect();
        left.sort();
        panic!(
            "Cassette exhausted: no interaction left for port={port:?} method={method:?}. \
             Remaining: [{}]",
            left.join(", ")
        );
    }

    /// Total interactions not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn interaction(seq: u64, port: &str, method: &str, output: serde_json::Value) -> Interaction {
        Interaction { seq, port: port.into(), method: method.into(), input: json!({}), output }
    }

    fn cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette { name: "t".into(), recorded_at: Utc::now(), commit: "c".into(), interactions }
    }

    #[test]
    fn serves_each_method_in_its_own_order() {
        let mut replayer = CassetteReplayer::new(&cassette(vec![
            interaction(0, "tracker", "create_issue", json!({"ok": 1})),
            interaction(1, "tracker", "add_label", json!({"ok": null})),
            interaction(2, "tracker", "create_issue", json!({"ok": 2})),
        ]));
        assert_eq!(replayer.remaining(), 3);

        assert_eq!(replayer.next_interaction("tracker", "create_issue").output, json!({"ok": 1}));
        assert_eq!(replayer.next_interaction("tracker", "create_issue").output, json!({"ok": 2}));
        assert_eq!(replayer.next_interaction("tracker", "add_label").seq, 1);
        assert_eq!(replayer.remaining(), 0);
    }

    #[test]
    #[should_panic(expected = "Cassette exhausted")]
    fn exhausted_method_panics() {
        let mut replayer = CassetteReplayer::new(&cassette(vec![interaction(
            0,
            "llm",
            "complete",
            json!({}),
        )]));
        let _ = replayer.next_interaction("llm", "complete");
        let _ = replayer.next_interaction("llm", "complete");
    }

    #[test]
    #[should_panic(expected = "tracker::view_issue (1)")]
    fn panic_lists_remaining_pairs() {
        let mut replayer = CassetteReplayer::new(&cassette(vec![interaction(
            0,
            "tracker",
            "view_issue",
            json!({}),
        )]));
        let _ = replayer.next_interaction("tracker", "search_prs");
    }
}
