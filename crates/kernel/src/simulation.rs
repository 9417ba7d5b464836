use glam::{Quat, Vec3};
use labyrinth_common::{CellCoord, ConfigError, GameConfig, Transform, WinMapping};
use labyrinth_grid::{GridError, Maze};
use labyrinth_input::{Action, MoveInput};

use crate::camera::Camera;
use crate::follow;
use crate::movement::{self, MoveOutcome};

/// Uniform scale applied to the character model.
const CHARACTER_SCALE: f32 = 1.25;
/// Undrained events kept; the oldest half is dropped when full.
pub const EVENT_LOG_CAPACITY: usize = 4096;

/// Errors from building a simulation.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid maze: {0}")]
    Grid(#[from] GridError),
    #[error("spawn point {spawn} has a collision probe inside a wall")]
    SpawnBlocked { spawn: Vec3 },
}

/// Where the game is in its lifecycle.
///
/// `Playing -> Won` when the character reaches the win cell, `Won -> Playing`
/// on restart, and any state `-> Terminated` on quit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStatus {
    #[default]
    Playing,
    Won,
    Terminated,
}

/// A notable simulation event, appended to the event log as it happens.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// A move was rejected because a collision probe hit a wall.
    MoveBlocked { tick: u64, attempted: Vec3 },
    /// The camera started being pulled in front of a wall. Not repeated while
    /// it stays clamped.
    CameraClamped { tick: u64, clear: f32, desired: f32 },
    Won { tick: u64, cell: CellCoord },
    Restarted,
    Terminated,
}

/// All mutable game state, owned by the frame loop.
///
/// Mutation happens only through [`step`](Self::step), [`apply`](Self::apply)
/// and [`restart`](Self::restart). The maze itself never changes.
#[derive(Debug, Clone)]
pub struct SimulationState {
    config: GameConfig,
    maze: Maze,
    character: Vec3,
    camera: Camera,
    status: GameStatus,
    tick: u64,
    camera_clamped: bool,
    event_log: Vec<SimEvent>,
}

impl SimulationState {
    /// Validate `config`, build the maze and place character and camera at spawn.
    pub fn new(config: GameConfig) -> Result<Self, KernelError> {
        config.validate()?;
        let maze = Maze::from_config(&config.maze)?;
        let spawn = Vec3::from(config.spawn);
        if movement::collides(&maze, spawn, config.movement.probe_radius) {
            return Err(KernelError::SpawnBlocked { spawn });
        }
        let camera = Camera::new(
            spawn + Vec3::from(config.camera.respawn_offset),
            &config.camera,
        );
        tracing::debug!(
            rows = maze.grid().rows(),
            cols = maze.grid().cols(),
            walls = maze.grid().wall_count(),
            "simulation created"
        );
        Ok(Self {
            config,
            maze,
            character: spawn,
            camera,
            status: GameStatus::Playing,
            tick: 0,
            camera_clamped: false,
            event_log: Vec::new(),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn character(&self) -> Vec3 {
        self.character
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera access for presentation concerns (aspect ratio).
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_won(&self) -> bool {
        self.status == GameStatus::Won
    }

    pub fn is_terminated(&self) -> bool {
        self.status == GameStatus::Terminated
    }

    /// Number of frames simulated while playing.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Cell the win check compares against the win cell, using the configured mapping.
    pub fn character_cell(&self) -> CellCoord {
        match self.config.maze.win_mapping {
            WinMapping::GridOffset => self.maze.cell_of(self.character),
            WinMapping::ExtentCentered => self.maze.mapping().extent_centered_cell(
                self.character,
                self.maze.grid().rows(),
                self.maze.grid().cols(),
            ),
        }
    }

    /// Model transform for the character: at its position, facing camera yaw.
    pub fn character_transform(&self) -> Transform {
        Transform {
            position: self.character,
            rotation: Quat::from_rotation_y(-self.camera.yaw()),
            scale: Vec3::splat(CHARACTER_SCALE),
        }
    }

    /// Move the character without collision checks. Does not touch the status.
    pub fn place_character(&mut self, position: Vec3) {
        self.character = position;
        self.update_camera();
    }

    /// Advance one frame: resolve movement, follow with the camera, check for a win.
    ///
    /// Does nothing unless the game is [`GameStatus::Playing`].
    pub fn step(&mut self, input: &MoveInput, dt: f32) {
        if self.status != GameStatus::Playing {
            return;
        }
        let _span = tracing::debug_span!("sim_step", tick = self.tick).entered();
        self.tick += 1;

        let tuning = &self.config.movement;
        let direction = movement::movement_direction(input, &self.camera, tuning.planar);
        let distance = tuning.base_speed * dt.max(0.0);
        match movement::resolve_move(
            &self.maze,
            self.character,
            direction,
            distance,
            tuning.probe_radius,
        ) {
            MoveOutcome::Moved { to, .. } => self.character = to,
            MoveOutcome::Blocked { attempted } => {
                tracing::trace!(?attempted, "move blocked");
                self.record(SimEvent::MoveBlocked {
                    tick: self.tick,
                    attempted,
                });
            }
            MoveOutcome::Idle => {}
        }

        self.update_camera();
        self.check_win();
    }

    /// Apply a discrete input action.
    pub fn apply(&mut self, action: Action) {
        if self.status == GameStatus::Terminated {
            return;
        }
        match action {
            Action::Look { dx, dy } => self.camera.rotate(dx, dy),
            Action::Zoom(amount) => self.camera.zoom_by(amount),
            Action::Restart => {
                if self.status == GameStatus::Won {
                    self.restart();
                } else {
                    tracing::debug!("restart ignored while playing");
                }
            }
            Action::Quit => {
                tracing::info!(status = ?self.status, "quit requested");
                self.status = GameStatus::Terminated;
                self.record(SimEvent::Terminated);
            }
        }
    }

    /// Return to spawn and resume play. Camera orientation is kept.
    pub fn restart(&mut self) {
        let spawn = Vec3::from(self.config.spawn);
        self.character = spawn;
        self.camera.position = spawn + Vec3::from(self.config.camera.respawn_offset);
        self.status = GameStatus::Playing;
        self.record(SimEvent::Restarted);
        tracing::info!("game restarted");
    }

    fn update_camera(&mut self) {
        let result = follow::follow(
            &self.maze,
            self.character,
            self.camera.front(),
            &self.config.camera,
        );
        let clamped = result.clamped();
        if clamped {
            tracing::trace!(
                clear = result.clear_distance,
                desired = result.desired_distance,
                "camera clamped"
            );
            if !self.camera_clamped {
                self.record(SimEvent::CameraClamped {
                    tick: self.tick,
                    clear: result.clear_distance,
                    desired: result.desired_distance,
                });
            }
        }
        self.camera_clamped = clamped;
        self.camera.position = result.position;
    }

    fn record(&mut self, event: SimEvent) {
        if self.event_log.len() >= EVENT_LOG_CAPACITY {
            self.event_log.drain(..EVENT_LOG_CAPACITY / 2);
        }
        self.event_log.push(event);
    }

    fn check_win(&mut self) {
        let cell = self.character_cell();
        if cell == self.config.maze.win_cell {
            self.status = GameStatus::Won;
            self.record(SimEvent::Won {
                tick: self.tick,
                cell,
            });
            tracing::info!(%cell, tick = self.tick, "YOU WIN! Press [R] to Replay, [ESC] to Quit");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labyrinth_input::Direction;

    const DT: f32 = 0.1;

    fn sim() -> SimulationState {
        SimulationState::new(GameConfig::default()).unwrap()
    }

    fn forward() -> MoveInput {
        MoveInput::default().with(Direction::Forward)
    }

    fn center_of(state: &SimulationState, col: i32, row: i32) -> Vec3 {
        state
            .maze()
            .mapping()
            .cell_center(CellCoord::new(col, row), 1.5)
    }

    fn probes_clear(state: &SimulationState) -> bool {
        !movement::collides(
            state.maze(),
            state.character(),
            state.config().movement.probe_radius,
        )
    }

    #[test]
    fn starts_playing_at_spawn() {
        let s = sim();
        assert_eq!(s.status(), GameStatus::Playing);
        assert_eq!(s.character(), Vec3::new(0.0, 1.5, 19.5));
        assert_eq!(s.camera().position, Vec3::new(0.0, 2.0, 21.75));
        assert_eq!(s.tick(), 0);
        assert!(probes_clear(&s));
    }

    #[test]
    fn rejects_invalid_maze() {
        let mut cfg = GameConfig::default();
        cfg.maze.rows[3].push(0);
        assert!(matches!(
            SimulationState::new(cfg),
            Err(KernelError::Grid(GridError::RaggedRow { row: 3, .. }))
        ));
    }

    #[test]
    fn rejects_invalid_config() {
        let mut cfg = GameConfig::default();
        cfg.maze.cell_size = -2.3;
        assert!(matches!(
            SimulationState::new(cfg),
            Err(KernelError::Config(_))
        ));
    }

    #[test]
    fn idle_step_keeps_position() {
        let mut s = sim();
        s.step(&MoveInput::default(), DT);
        assert_eq!(s.character(), Vec3::new(0.0, 1.5, 19.5));
        assert_eq!(s.tick(), 1);
    }

    #[test]
    fn forward_moves_speed_times_dt() {
        let mut s = sim();
        s.step(&forward(), DT);
        let moved = s.character() - Vec3::new(0.0, 1.5, 19.5);
        assert!((moved - Vec3::new(0.0, 0.0, -0.25)).length() < 1e-5);
    }

    #[test]
    fn diagonal_displacement_is_not_boosted() {
        let mut s = sim();
        let before = s.character();
        s.step(&forward().with(Direction::Right), DT);
        let moved = (s.character() - before).length();
        assert!((moved - 2.5 * DT).abs() < 1e-5, "moved {moved}");
    }

    #[test]
    fn wall_stops_sideways_walk() {
        let mut s = sim();
        let left = MoveInput::default().with(Direction::Left);
        for _ in 0..10 {
            s.step(&left, DT);
            assert!(probes_clear(&s));
        }
        // Column 7 is a wall on the entrance row; three 0.25 steps fit, the fourth probe hits.
        assert!((s.character().x + 0.75).abs() < 1e-4, "x = {}", s.character().x);
        assert!(
            s.events()
                .iter()
                .any(|e| matches!(e, SimEvent::MoveBlocked { .. }))
        );
    }

    #[test]
    fn random_walk_never_enters_walls() {
        let mut s = sim();
        let mut seed: u32 = 0x2545_f491;
        for _ in 0..2_000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let input = MoveInput {
                forward: seed & 1 != 0,
                back: seed & 2 != 0,
                left: seed & 4 != 0,
                right: seed & 8 != 0,
            };
            if seed & 16 != 0 {
                s.apply(Action::Look {
                    dx: ((seed >> 8) % 200) as f32 - 100.0,
                    dy: 0.0,
                });
            }
            s.step(&input, 0.05);
            assert!(probes_clear(&s), "entered a wall at {:?}", s.character());
            if s.is_won() {
                s.apply(Action::Restart);
            }
        }
    }

    #[test]
    fn camera_clamped_at_entrance() {
        let mut s = sim();
        s.step(&MoveInput::default(), DT);
        // Behind the spawn is outside the maze; the ray leaves the grid at z = 20.15.
        let cam = s.camera().position;
        assert!(cam.z > 19.5 && cam.z < 20.15, "camera z = {}", cam.z);
        assert!((cam.y - 1.95).abs() < 1e-5);
        assert!(!s.maze().is_wall(cam));
        assert!(
            s.events()
                .iter()
                .any(|e| matches!(e, SimEvent::CameraClamped { .. }))
        );
    }

    #[test]
    fn camera_unclamped_in_open_corridor() {
        let mut s = sim();
        // Face +X along row 9, which is open from column 1 to 15.
        s.apply(Action::Look { dx: 900.0, dy: 0.0 });
        let start = center_of(&s, 8, 9);
        s.place_character(start);
        s.drain_events();
        s.step(&MoveInput::default(), DT);

        let expected = start + Vec3::new(-2.25, 0.45, 0.0);
        assert!((s.camera().position - expected).length() < 1e-4);
        assert!(s.events().is_empty());
    }

    #[test]
    fn reaching_exit_wins_and_freezes() {
        let mut s = sim();
        s.place_character(center_of(&s, 8, 1));

        let mut steps = 0;
        while !s.is_won() && steps < 20 {
            s.step(&forward(), DT);
            steps += 1;
        }
        assert!(s.is_won());
        assert_eq!(s.character_cell(), CellCoord::new(8, 0));
        assert!(
            s.events()
                .iter()
                .any(|e| matches!(e, SimEvent::Won { cell, .. } if *cell == CellCoord::new(8, 0)))
        );

        let frozen = s.character();
        let frozen_camera = s.camera().position;
        let tick = s.tick();
        for _ in 0..5 {
            s.step(&forward(), DT);
        }
        assert_eq!(s.character(), frozen);
        assert_eq!(s.camera().position, frozen_camera);
        assert_eq!(s.tick(), tick);
        assert!(s.is_won());
    }

    #[test]
    fn win_flag_set_exactly_on_entering_win_cell() {
        let mut s = sim();
        s.place_character(center_of(&s, 8, 1));
        loop {
            let before = s.character_cell();
            s.step(&forward(), DT);
            if s.is_won() {
                assert_ne!(before, CellCoord::new(8, 0));
                assert_eq!(s.character_cell(), CellCoord::new(8, 0));
                break;
            }
            assert_ne!(s.character_cell(), CellCoord::new(8, 0));
        }
    }

    #[test]
    fn extent_centered_mapping_wins_later() {
        let mut cfg = GameConfig::default();
        cfg.maze.win_mapping = WinMapping::ExtentCentered;
        let mut s = SimulationState::new(cfg).unwrap();

        // z = -17.0 is row 0 for occupancy but row 1 for the extent-centered check.
        s.place_character(Vec3::new(0.0, 1.5, -17.0));
        s.step(&MoveInput::default(), DT);
        assert!(!s.is_won());

        let mut steps = 0;
        while !s.is_won() && steps < 20 {
            s.step(&forward(), DT);
            steps += 1;
        }
        assert!(s.is_won());
        assert!(steps >= 1);
        assert!(s.character().z < -17.0);
    }

    #[test]
    fn restart_only_after_win() {
        let mut s = sim();
        s.step(&forward(), DT);
        let pos = s.character();
        s.apply(Action::Restart);
        assert_eq!(s.character(), pos);
        assert_eq!(s.status(), GameStatus::Playing);
    }

    #[test]
    fn restart_resets_character_and_camera() {
        let mut s = sim();
        s.apply(Action::Look { dx: 50.0, dy: 20.0 });
        let yaw = s.camera().yaw();
        s.place_character(center_of(&s, 8, 1));
        while !s.is_won() {
            s.step(&forward(), DT);
        }

        s.apply(Action::Restart);
        assert_eq!(s.status(), GameStatus::Playing);
        assert_eq!(s.character(), Vec3::new(0.0, 1.5, 19.5));
        assert_eq!(s.camera().position, Vec3::new(0.0, 2.0, 21.75));
        assert_eq!(s.camera().yaw(), yaw);
        assert!(matches!(s.events().last(), Some(SimEvent::Restarted)));

        s.step(&MoveInput::default(), DT);
        assert!(!s.is_won());
    }

    #[test]
    fn quit_terminates_from_any_state() {
        let mut s = sim();
        s.apply(Action::Quit);
        assert!(s.is_terminated());
        s.step(&forward(), DT);
        assert_eq!(s.character(), Vec3::new(0.0, 1.5, 19.5));
        s.apply(Action::Restart);
        assert!(s.is_terminated());

        let mut s = sim();
        s.place_character(center_of(&s, 8, 1));
        while !s.is_won() {
            s.step(&forward(), DT);
        }
        s.apply(Action::Quit);
        assert_eq!(s.status(), GameStatus::Terminated);
    }

    #[test]
    fn look_and_zoom_update_camera() {
        let mut s = sim();
        s.apply(Action::Zoom(5.0));
        assert_eq!(s.camera().zoom(), 40.0);
        let front = s.camera().front();
        s.apply(Action::Look { dx: 100.0, dy: 0.0 });
        assert_ne!(s.camera().front(), front);
    }

    #[test]
    fn character_faces_camera_yaw() {
        let s = sim();
        let t = s.character_transform();
        assert_eq!(t.position, s.character());
        assert_eq!(t.scale, Vec3::splat(1.25));
        // Yaw -90 degrees becomes a +90 degree model rotation about Y.
        let turned = t.rotation * Vec3::Z;
        assert!((turned - Vec3::X).length() < 1e-5);
    }

    /// Shortest chain of open cells from the character's cell to the win cell.
    fn route_to_exit(s: &SimulationState) -> Vec<CellCoord> {
        use labyrinth_grid::Occupancy;
        use std::collections::{HashMap, VecDeque};

        let grid = s.maze().grid();
        let start = s.maze().cell_of(s.character());
        let goal = s.config().maze.win_cell;
        let mut came_from = HashMap::from([(start, start)]);
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            if cell == goal {
                break;
            }
            for (dc, dr) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let next = CellCoord::new(cell.col + dc, cell.row + dr);
                if grid.occupancy(next) == Occupancy::Open && !came_from.contains_key(&next) {
                    came_from.insert(next, cell);
                    queue.push_back(next);
                }
            }
        }

        let mut route = vec![goal];
        let mut cell = goal;
        while cell != start {
            cell = came_from[&cell];
            route.push(cell);
        }
        route.reverse();
        route
    }

    /// Turn the camera through mouse look until it faces `axis` (a unit XZ direction).
    fn face(s: &mut SimulationState, axis: Vec3) {
        let current = s.camera().yaw().to_degrees();
        let target = axis.z.atan2(axis.x).to_degrees();
        let delta = (target - current + 180.0).rem_euclid(360.0) - 180.0;
        let dx = delta / s.config().camera.sensitivity;
        s.apply(Action::Look { dx, dy: 0.0 });
    }

    #[test]
    fn walk_from_spawn_to_exit() {
        let mut s = sim();
        assert_eq!(s.character(), Vec3::new(0.0, 1.5, 19.5));
        let route = route_to_exit(&s);
        assert_eq!(route.first(), Some(&CellCoord::new(8, 16)));
        assert_eq!(route.last(), Some(&CellCoord::new(8, 0)));
        assert!(route.len() > 17, "route has {} cells", route.len());

        let speed = s.config().movement.base_speed;
        let mut frames = 0;
        'route: for pair in route.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let axis = Vec3::new((to.col - from.col) as f32, 0.0, (to.row - from.row) as f32);
            face(&mut s, axis);
            let target = s.maze().mapping().cell_center(to, s.character().y);
            for _ in 0..100 {
                let remaining = (target - s.character()).dot(axis);
                if remaining < 1e-4 {
                    break;
                }
                s.step(&forward(), (remaining / speed).min(DT));
                frames += 1;
                assert!(probes_clear(&s), "entered a wall at {:?}", s.character());
                if s.is_won() {
                    break 'route;
                }
            }
        }

        assert!(s.is_won(), "stopped at {} after {frames} frames", s.character_cell());
        assert_eq!(s.character_cell(), CellCoord::new(8, 0));
        assert_eq!(s.tick(), frames);
        assert!(
            !s.events()
                .iter()
                .any(|e| matches!(e, SimEvent::MoveBlocked { .. }))
        );

        let frozen = s.character();
        for _ in 0..10 {
            s.step(&forward(), DT);
        }
        assert_eq!(s.character(), frozen);
        assert_eq!(s.tick(), frames);
    }

    #[test]
    fn spawn_inside_wall_is_rejected() {
        let mut cfg = GameConfig::default();
        // Column 7 of the entrance row is a wall.
        cfg.spawn = [-2.3, 1.5, 19.0];
        assert!(matches!(
            SimulationState::new(cfg),
            Err(KernelError::SpawnBlocked { .. })
        ));

        let mut cfg = GameConfig::default();
        // Open cell, but the -X probe reaches into the wall column.
        cfg.spawn = [-1.0, 1.5, 19.0];
        assert!(SimulationState::new(cfg).is_err());
    }

    #[test]
    fn clamp_recorded_once_while_it_lasts() {
        let mut s = sim();
        for _ in 0..5 {
            s.step(&MoveInput::default(), DT);
        }
        let clamps = s
            .events()
            .iter()
            .filter(|e| matches!(e, SimEvent::CameraClamped { .. }))
            .count();
        assert_eq!(clamps, 1);

        // Leaving the clamped spot and coming back records a new clamp.
        s.apply(Action::Look { dx: 900.0, dy: 0.0 });
        s.place_character(center_of(&s, 8, 9));
        s.place_character(Vec3::new(0.0, 1.5, 19.5));
        s.step(&MoveInput::default(), DT);
        let clamps = s
            .events()
            .iter()
            .filter(|e| matches!(e, SimEvent::CameraClamped { .. }))
            .count();
        assert_eq!(clamps, 2);
    }

    #[test]
    fn event_log_is_bounded() {
        let mut s = sim();
        let left = MoveInput::default().with(Direction::Left);
        for _ in 0..(EVENT_LOG_CAPACITY * 2) {
            s.step(&left, DT);
        }
        assert!(s.events().len() <= EVENT_LOG_CAPACITY);
        assert!(matches!(
            s.events().last(),
            Some(SimEvent::MoveBlocked { .. })
        ));
    }

    #[test]
    fn character_clamp_origin_clamps_every_frame() {
        let mut cfg = GameConfig::default();
        cfg.camera.clamp_origin = labyrinth_common::ClampOrigin::Character;
        let mut s = SimulationState::new(cfg).unwrap();
        s.apply(Action::Look { dx: 900.0, dy: 0.0 });
        let start = center_of(&s, 8, 9);
        s.place_character(start);
        s.step(&MoveInput::default(), DT);

        // Row 9 is open behind the character; the camera still sits 2.25 from the
        // character along the line toward the desired point, not at the desired point.
        let desired = start + Vec3::new(-2.25, 0.45, 0.0);
        let cam = s.camera().position;
        assert!((cam - desired).length() > 1e-3);
        assert!(((cam - start).length() - 2.25).abs() < 1e-4);
        let dir = (desired - start).normalize();
        assert!(((cam - start).normalize() - dir).length() < 1e-5);
    }

    #[test]
    fn drain_events_empties_log() {
        let mut s = sim();
        s.apply(Action::Quit);
        assert_eq!(s.drain_events(), vec![SimEvent::Terminated]);
        assert!(s.events().is_empty());
    }
}
