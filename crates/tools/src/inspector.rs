use labyrinth_common::CellCoord;
use labyrinth_kernel::{GameStatus, SimEvent, SimulationState};

/// Read-only queries against the simulation for debugging and overlays.
pub struct SimulationInspector;

impl SimulationInspector {
    /// Produce a summary of the simulation state.
    pub fn summary(state: &SimulationState) -> SimulationSummary {
        let c = state.character();
        let cam = state.camera();
        SimulationSummary {
            tick: state.tick(),
            status: state.status(),
            character: [c.x, c.y, c.z],
            cell: state.character_cell(),
            win_cell: state.config().maze.win_cell,
            camera: [cam.position.x, cam.position.y, cam.position.z],
            yaw_deg: cam.yaw().to_degrees(),
            pitch_deg: cam.pitch().to_degrees(),
            zoom: cam.zoom(),
            pending_events: state.events().len(),
        }
    }

    /// Count events by kind: (blocked moves, camera clamps).
    pub fn collision_counts(events: &[SimEvent]) -> (usize, usize) {
        events.iter().fold((0, 0), |(moves, clamps), e| match e {
            SimEvent::MoveBlocked { .. } => (moves + 1, clamps),
            SimEvent::CameraClamped { .. } => (moves, clamps + 1),
            _ => (moves, clamps),
        })
    }
}

/// Snapshot of the simulation for the inspector.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub tick: u64,
    pub status: GameStatus,
    pub character: [f32; 3],
    /// Cell the win check sees, under the configured mapping.
    pub cell: CellCoord,
    pub win_cell: CellCoord,
    pub camera: [f32; 3],
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub zoom: f32,
    pub pending_events: usize,
}

impl std::fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Simulation: tick={} status={:?} pos=({:.2}, {:.2}, {:.2}) cell={} goal={} camera=({:.2}, {:.2}, {:.2}) yaw={:.1} pitch={:.1} zoom={:.1}",
            self.tick,
            self.status,
            self.character[0],
            self.character[1],
            self.character[2],
            self.cell,
            self.win_cell,
            self.camera[0],
            self.camera[1],
            self.camera[2],
            self.yaw_deg,
            self.pitch_deg,
            self.zoom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labyrinth_common::GameConfig;
    use labyrinth_input::{Action, Direction, MoveInput};

    fn sim() -> SimulationState {
        SimulationState::new(GameConfig::default()).unwrap()
    }

    #[test]
    fn summary_fresh_simulation() {
        let state = sim();
        let summary = SimulationInspector::summary(&state);
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.status, GameStatus::Playing);
        assert_eq!(summary.cell, CellCoord::new(8, 16));
        assert_eq!(summary.win_cell, CellCoord::new(8, 0));
        assert!((summary.yaw_deg + 90.0).abs() < 1e-3);
        assert_eq!(summary.pending_events, 0);
    }

    #[test]
    fn summary_after_steps() {
        let mut state = sim();
        let left = MoveInput::default().with(Direction::Left);
        for _ in 0..6 {
            state.step(&left, 0.1);
        }
        let summary = SimulationInspector::summary(&state);
        assert_eq!(summary.tick, 6);
        assert!(summary.pending_events > 0);

        let (blocked, clamped) = SimulationInspector::collision_counts(state.events());
        assert_eq!(blocked, 3);
        assert_eq!(clamped, 1);
    }

    #[test]
    fn summary_cell_follows_win_mapping() {
        let mut cfg = GameConfig::default();
        cfg.maze.win_mapping = labyrinth_common::WinMapping::ExtentCentered;
        let mut state = SimulationState::new(cfg).unwrap();
        // Row 0 by the occupancy mapping, row 1 by the extent-centered one.
        let mut p = state.character();
        p.z = -17.0;
        state.place_character(p);
        let summary = SimulationInspector::summary(&state);
        assert_eq!(summary.cell, CellCoord::new(8, 1));
        assert_eq!(summary.cell, state.character_cell());
        assert!(!state.is_won());
    }

    #[test]
    fn collision_counts_ignores_other_events() {
        let mut state = sim();
        state.apply(Action::Quit);
        assert_eq!(
            SimulationInspector::collision_counts(state.events()),
            (0, 0)
        );
    }

    #[test]
    fn summary_display() {
        let state = sim();
        let s = format!("{}", SimulationInspector::summary(&state));
        assert!(s.contains("tick=0"));
        assert!(s.contains("status=Playing"));
        assert!(s.contains("goal=(8, 0)"));
    }
}
