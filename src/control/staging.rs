use crate::constants::PROPELLANT_TOLERANCE;
use crate::control::launch_stages::Stage;
use crate::control::rocket::VehicleState;
use crate::control::structure::Structure;

/// Staging transitions; ordinary control flow, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingEvent {
    /// Spent stage dropped and the next one loaded.
    Separation { spent_stage: usize, next_stage: usize },
    /// The last stage's engine went out; the vehicle coasts from here.
    FinalBurnout { stage: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDecision {
    pub engine_on: bool,
    pub event: Option<StagingEvent>,
}

/// Tracks which stage boundaries have already fired.
///
/// A boundary fires on the first step its stage's engine is found off; the
/// guard keeps it from firing again however long the engine stays off.
#[derive(Debug, Clone)]
pub struct StagingPolicy {
    separated: Vec<bool>,
    expended: bool,
}

impl StagingPolicy {
    pub fn new(structure: &Structure) -> Self {
        StagingPolicy {
            separated: vec![false; structure.stage_count().saturating_sub(1)],
            expended: false,
        }
    }

    /// Engine is on iff propellant remains and the rated burn is not over.
    pub fn engine_available(state: &VehicleState, stage: &Stage) -> bool {
        state.remaining_propellant > 0.0 && state.stage_elapsed_time < stage.burn_time
    }

    /// Decides this step's engine state, separating the active stage the
    /// first time its engine is found off.
    pub fn evaluate(&mut self, state: &mut VehicleState, structure: &Structure) -> StageDecision {
        let index = state.active_stage_index;
        let stage = match structure.stage(index) {
            Some(stage) => stage,
            None => return self.coast(state),
        };

        if Self::engine_available(state, stage) {
            state.engine_on = true;
            return StageDecision {
                engine_on: true,
                event: None,
            };
        }

        if structure.is_last_stage(index) {
            let event = if self.expended {
                None
            } else {
                self.expended = true;
                Some(StagingEvent::FinalBurnout { stage: index })
            };
            state.engine_on = false;
            return StageDecision {
                engine_on: false,
                event,
            };
        }

        if self.separated[index] {
            return self.coast(state);
        }

        self.separated[index] = true;
        let next_stage = index + 1;
        state.separate_to(next_stage, structure);

        StageDecision {
            engine_on: false,
            event: Some(StagingEvent::Separation {
                spent_stage: index,
                next_stage,
            }),
        }
    }

    /// Burns `fuel_rate · Δt` (capped at what is left) from the active stage and
    /// returns the mass consumed.
    pub fn consume(state: &mut VehicleState, structure: &Structure, time_step: f64) -> f64 {
        let index = state.active_stage_index;
        let stage = match structure.stage(index) {
            Some(stage) => stage,
            None => return 0.0,
        };

        let fuel_used = (stage.fuel_rate() * time_step).min(state.remaining_propellant);
        state.remaining_propellant -= fuel_used;
        state.total_mass -= fuel_used;

        // Rounding residue would keep the engine lit for an extra step.
        if state.remaining_propellant < stage.propellant_mass * PROPELLANT_TOLERANCE {
            state.total_mass -= state.remaining_propellant;
            state.remaining_propellant = 0.0;
        }
        state.total_mass = state.total_mass.max(structure.retained_dry_mass(index));

        fuel_used
    }

    pub fn is_expended(&self) -> bool {
        self.expended
    }

    fn coast(&self, state: &mut VehicleState) -> StageDecision {
        state.engine_on = false;
        StageDecision {
            engine_on: false,
            event: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::payload::Payload;
    use approx::assert_abs_diff_eq;

    fn two_stage_structure() -> Structure {
        Structure::new(
            vec![
                Stage::new("Lower", 500.0, 1_000.0, 10.0, 50_000.0, 280.0),
                Stage::new("Upper", 200.0, 300.0, 20.0, 10_000.0, 340.0),
            ],
            Payload::new("Sat", 100.0),
        )
    }

    #[test]
    fn test_engine_on_at_liftoff() {
        let structure = two_stage_structure();
        let mut policy = StagingPolicy::new(&structure);
        let mut state = VehicleState::at_liftoff(&structure);

        let decision = policy.evaluate(&mut state, &structure);
        assert!(decision.engine_on);
        assert!(state.engine_on);
        assert_eq!(decision.event, None);
    }

    #[test]
    fn test_consume_caps_at_remaining() {
        let structure = two_stage_structure();
        let mut state = VehicleState::at_liftoff(&structure);
        state.remaining_propellant = 30.0;
        state.total_mass = structure.retained_dry_mass(0) + 300.0 + 30.0;

        // 100 kg/s over one second wants 100 kg, only 30 kg left.
        let used = StagingPolicy::consume(&mut state, &structure, 1.0);
        assert_abs_diff_eq!(used, 30.0, epsilon = 1e-12);
        assert_eq!(state.remaining_propellant, 0.0);
    }

    #[test]
    fn test_consume_clamps_rounding_residue() {
        let structure = two_stage_structure();
        let mut state = VehicleState::at_liftoff(&structure);
        state.remaining_propellant = 10.0 + 1e-10;

        StagingPolicy::consume(&mut state, &structure, 0.1);
        assert_eq!(state.remaining_propellant, 0.0);
    }

    #[test]
    fn test_separation_on_burn_time() {
        let structure = two_stage_structure();
        let mut policy = StagingPolicy::new(&structure);
        let mut state = VehicleState::at_liftoff(&structure);
        state.stage_elapsed_time = 10.0;
        state.remaining_propellant = 12.0; // leftover propellant is discarded with the stage

        let decision = policy.evaluate(&mut state, &structure);
        assert!(!decision.engine_on);
        assert_eq!(
            decision.event,
            Some(StagingEvent::Separation {
                spent_stage: 0,
                next_stage: 1
            })
        );
        assert_eq!(state.active_stage_index, 1);
        assert_eq!(state.stage_elapsed_time, 0.0);
        assert_eq!(state.remaining_propellant, 300.0);
        assert_eq!(state.total_mass, 600.0); // 200 + 300 + 100
    }

    #[test]
    fn test_separation_on_empty_tank() {
        let structure = two_stage_structure();
        let mut policy = StagingPolicy::new(&structure);
        let mut state = VehicleState::at_liftoff(&structure);
        state.remaining_propellant = 0.0;

        let decision = policy.evaluate(&mut state, &structure);
        assert!(matches!(
            decision.event,
            Some(StagingEvent::Separation { .. })
        ));
    }

    #[test]
    fn test_final_burnout_fires_once() {
        let structure = two_stage_structure();
        let mut policy = StagingPolicy::new(&structure);
        let mut state = VehicleState::at_liftoff(&structure);
        state.separate_to(1, &structure);
        state.remaining_propellant = 0.0;

        let first = policy.evaluate(&mut state, &structure);
        assert_eq!(first.event, Some(StagingEvent::FinalBurnout { stage: 1 }));
        assert!(policy.is_expended());

        for _ in 0..100 {
            let decision = policy.evaluate(&mut state, &structure);
            assert!(!decision.engine_on);
            assert_eq!(decision.event, None);
            assert_eq!(state.active_stage_index, 1);
        }
    }
}
