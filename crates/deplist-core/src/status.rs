// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Backend reachability as shown by the connection indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Nothing heard yet.
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }
}

/// Diagnostic message with timestamp
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub timestamp: DateTime<Utc>,
    pub level: DiagnosticLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

/// Connection state and recent diagnostics for the status strip.
#[derive(Debug)]
pub struct DisplayStatus {
    pub connection: ConnectionStatus,
    pub last_departures_at: Option<DateTime<Utc>>,
    // Diagnostic messages (keep last 50)
    diagnostics: VecDeque<DiagnosticMessage>,
    max_diagnostics: usize,
}

impl Default for DisplayStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayStatus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            connection: ConnectionStatus::Connecting,
            last_departures_at: None,
            diagnostics: VecDeque::with_capacity(50),
            max_diagnostics: 50,
        }
    }

    /// Update connection status; transitions are recorded as diagnostics.
    pub fn set_connection_status(&mut self, status: ConnectionStatus) {
        if self.connection == status {
            return;
        }
        self.connection = status;
        match status {
            ConnectionStatus::Connected => {
                self.add_diagnostic(DiagnosticLevel::Info, "Backend connected".to_string());
            }
            ConnectionStatus::Disconnected => {
                self.add_diagnostic(DiagnosticLevel::Error, "Backend unreachable".to_string());
            }
            ConnectionStatus::Connecting => {}
        }
    }

    pub fn add_diagnostic(&mut self, level: DiagnosticLevel, message: String) {
        self.diagnostics.push_back(DiagnosticMessage {
            timestamp: Utc::now(),
            level,
            message,
        });
        while self.diagnostics.len() > self.max_diagnostics {
            self.diagnostics.pop_front();
        }
    }

    /// Oldest first.
    pub fn diagnostics(&self) -> impl DoubleEndedIterator<Item = &DiagnosticMessage> {
        self.diagnostics.iter()
    }

    #[must_use]
    pub fn latest_diagnostic(&self) -> Option<&DiagnosticMessage> {
        self.diagnostics.back()
    }

    pub fn clear_diagnostics(&mut self) {
        self.diagnostics.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_are_capped() {
        let mut status = DisplayStatus::new();
        for i in 0..60 {
            status.add_diagnostic(DiagnosticLevel::Warning, format!("warning {i}"));
        }
        assert_eq!(status.diagnostics().count(), 50);
        assert_eq!(status.diagnostics().next().unwrap().message, "warning 10");
        assert_eq!(status.latest_diagnostic().unwrap().message, "warning 59");
    }

    #[test]
    fn test_only_transitions_are_logged() {
        let mut status = DisplayStatus::new();
        status.set_connection_status(ConnectionStatus::Connected);
        status.set_connection_status(ConnectionStatus::Connected);
        status.set_connection_status(ConnectionStatus::Disconnected);
        assert_eq!(status.connection, ConnectionStatus::Disconnected);
        assert_eq!(status.diagnostics().count(), 2);
    }
}
