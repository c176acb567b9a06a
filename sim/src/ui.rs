//! UI sink interface.
//!
//! The simulation owns no UI state. After every fixed update `SimWorld`
//! compares the scoreboard and lifecycle status with what it last reported
//! and emits a `UiEvent` for each change. Hosts either install a `UiSink`
//! or drain the events with `SimWorld::take_ui_events`.

use serde::{Deserialize, Serialize};

/// A change the host UI should reflect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiEvent {
    /// Score, lives or level changed.
    Hud { score: u32, lives: u32, level: u32 },
    /// The game ended.
    GameOver { final_score: u32 },
    /// The formation was cleared.
    LevelComplete { score: u32 },
    /// Button enablement: start is enabled while not running, pause while
    /// running and not game over.
    Controls { start_enabled: bool, pause_enabled: bool },
}

/// Receiver for UI events.
pub trait UiSink {
    fn handle(&mut self, event: UiEvent);
}

/// Collecting sink, handy for tests and headless hosts.
impl UiSink for Vec<UiEvent> {
    fn handle(&mut self, event: UiEvent) {
        self.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_collects_in_order() {
        let mut sink: Vec<UiEvent> = Vec::new();
        sink.handle(UiEvent::Hud { score: 10, lives: 3, level: 1 });
        sink.handle(UiEvent::GameOver { final_score: 10 });
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1], UiEvent::GameOver { final_score: 10 });
    }
}
