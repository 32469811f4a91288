use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Switch {
    pub name: String,
    pub value: Option<String>,
}

impl Switch {
    pub fn render(&self) -> String {
        match &self.value {
            Some(value) => format!("--{}={}", self.name, value),
            None => format!("--{}", self.name),
        }
    }
}

/// An ordered switch collection, the target of switch generation. Duplicate
/// appends keep both entries in order; queries observe the last one, which
/// matches how a process's argument parser resolves repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    switches: Vec<Switch>,
}

impl CommandLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_switch(&mut self, name: &str) {
        self.switches.push(Switch {
            name: name.to_string(),
            value: None,
        });
    }

    pub fn append_switch_with_value(&mut self, name: &str, value: &str) {
        self.switches.push(Switch {
            name: name.to_string(),
            value: Some(value.to_string()),
        });
    }

    pub fn has_switch(&self, name: &str) -> bool {
        self.switches.iter().any(|switch| switch.name == name)
    }

    /// Value of the last occurrence of `name`, if any. A valueless switch
    /// yields `None` even when present; pair with `has_switch` to tell the
    /// two apart.
    pub fn switch_value(&self, name: &str) -> Option<&str> {
        self.switches
            .iter()
            .rev()
            .find(|switch| switch.name == name)
            .and_then(|switch| switch.value.as_deref())
    }

    pub fn switches(&self) -> &[Switch] {
        &self.switches
    }

    pub fn argv(&self) -> Vec<String> {
        self.switches.iter().map(Switch::render).collect()
    }

    /// Indices of the first `begin` marker and the first `end` marker after
    /// it. `None` when either marker is missing or they are out of order.
    pub fn marked_region(&self, begin: &str, end: &str) -> Option<(usize, usize)> {
        let begin_at = self.switches.iter().position(|switch| switch.name == begin)?;
        let end_offset = self
            .switches
            .iter()
            .skip(begin_at + 1)
            .position(|switch| switch.name == end)?;
        Some((begin_at, begin_at + 1 + end_offset))
    }

    /// Switches strictly between the markers.
    pub fn region_switches(&self, begin: &str, end: &str) -> Option<&[Switch]> {
        self.marked_region(begin, end)
            .map(|(begin_at, end_at)| &self.switches[begin_at + 1..end_at])
    }

    /// Removes the marked region, markers included. Returns whether
    /// anything was removed.
    pub fn remove_marked_region(&mut self, begin: &str, end: &str) -> bool {
        match self.marked_region(begin, end) {
            Some((begin_at, end_at)) => {
                self.switches.drain(begin_at..=end_at);
                true
            }
            None => false,
        }
    }
}
