//! Replays recorded interactions from a cassette.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;

use super::format::{Cassette, Interaction};

/// Key for indexing interactions by port and method.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct PortMethodKey {
    port: String,
    method: String,
}

/// Serves interactions from a loaded cassette.
///
/// Each interaction is served once. Calls are matched on port, method and
/// input, so concurrently recorded calls replay correctly in any order.
pub struct CassetteReplayer {
    queues: HashMap<PortMethodKey, VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<PortMethodKey, VecDeque<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            let key = PortMethodKey {
                port: interaction.port.clone(),
                method: interaction.method.clone(),
            };
            queues.entry(key).or_default().push_back(interaction.clone());
        }
        Self { queues }
    }

    /// Take the earliest unserved interaction for `port`/`method` recorded
    /// with `input`.
    ///
    /// # Errors
    ///
    /// Returns a message naming what was requested and what remains when no
    /// such interaction is left.
    pub fn take(&mut self, port: &str, method: &str, input: &Value) -> Result<Interaction, String> {
        let key = PortMethodKey { port: port.to_string(), method: method.to_string() };
        let Some(queue) = self.queues.get_mut(&key) else {
            let mut available: Vec<String> =
                self.queues.keys().map(|k| format!("{}::{}", k.port, k.method)).collect();
            available.sort();
            return Err(format!(
                "Cassette exhausted: no interactions recorded for {port}::{method}. \
                 Available port::method pairs: [{}]",
                available.join(", ")
            ));
        };

        let position = queue.iter().position(|i| &i.input == input).ok_or_else(|| {
            format!(
                "Cassette exhausted: {remaining} interaction(s) left for {port}::{method}, \
                 none recorded with input {input}",
                remaining = queue.len(),
            )
        })?;
        queue.remove(position).ok_or_else(|| format!("Cassette corrupted at {port}::{method}"))
    }

    /// Number of interactions not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }
}
