//! Step controller - forward-only state machine over a flow's steps
//!
//! States are `Step(1)..=Step(N)` followed by the terminal `Result`. A valid
//! submit moves one step forward and merges the step's data; `Result` only
//! allows a restart, which returns to step 1 with nothing collected.

use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::form::FormBinder;
use crate::schema::field::FieldSchema;
use crate::schema::flow::{FlowDefinition, FlowError};
use crate::schema::validator::FormData;

/// Position in a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Collecting input for a 1-based step
    Step(usize),
    /// All steps done; only the summary and restart remain
    Result,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Step(n) => write!(f, "step {}", n),
            Stage::Result => write!(f, "result"),
        }
    }
}

/// User actions that move the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Submit,
    Restart,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Submit => write!(f, "submit"),
            Transition::Restart => write!(f, "restart"),
        }
    }
}

/// Errors that can occur when driving the step controller
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepError {
    #[error("Invalid transition: cannot {action} from {from}")]
    InvalidTransition { from: Stage, action: Transition },

    #[error("Field '{field}' is not declared in step {step}")]
    UndeclaredField { step: usize, field: String },
}

/// Current step and the data collected so far
#[derive(Debug, Clone, PartialEq)]
pub struct StepState {
    current_step: usize,
    accumulated: FormData,
}

impl Default for StepState {
    fn default() -> Self {
        Self::new()
    }
}

impl StepState {
    /// Fresh session at step 1
    pub fn new() -> Self {
        Self {
            current_step: 1,
            accumulated: FormData::new(),
        }
    }

    /// 1-based step index; `total + 1` means the result state
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn accumulated(&self) -> &FormData {
        &self.accumulated
    }

    pub fn into_accumulated(self) -> FormData {
        self.accumulated
    }

    /// Stage for a flow of `total` steps
    pub fn stage(&self, total: usize) -> Stage {
        if self.current_step > total {
            Stage::Result
        } else {
            Stage::Step(self.current_step)
        }
    }

    /// Merge a validated step's data and move to the next stage
    pub fn advance(self, total: usize, data: FormData) -> Result<Self, StepError> {
        let from = self.stage(total);
        if !is_valid_transition(from, Transition::Submit) {
            return Err(StepError::InvalidTransition {
                from,
                action: Transition::Submit,
            });
        }

        let mut accumulated = self.accumulated;
        for (name, value) in data {
            accumulated.insert(name, value);
        }

        Ok(Self {
            current_step: self.current_step + 1,
            accumulated,
        })
    }

    /// Back to step 1 with nothing collected; only allowed from the result
    pub fn restart(self, total: usize) -> Result<Self, StepError> {
        let from = self.stage(total);
        if !is_valid_transition(from, Transition::Restart) {
            return Err(StepError::InvalidTransition {
                from,
                action: Transition::Restart,
            });
        }
        Ok(Self::new())
    }
}

/// Check if a transition is valid from the given stage
pub fn is_valid_transition(from: Stage, action: Transition) -> bool {
    matches!(
        (from, action),
        (Stage::Step(_), Transition::Submit) | (Stage::Result, Transition::Restart)
    )
}

/// Transitions available from a stage
pub fn allowed_transitions(from: Stage) -> Vec<Transition> {
    match from {
        Stage::Step(_) => vec![Transition::Submit],
        Stage::Result => vec![Transition::Restart],
    }
}

/// Drives one form session through a flow
#[derive(Debug, Clone)]
pub struct StepController {
    flow: FlowDefinition,
    state: StepState,
}

impl StepController {
    pub fn new(flow: FlowDefinition) -> Self {
        Self {
            flow,
            state: StepState::new(),
        }
    }

    pub fn flow(&self) -> &FlowDefinition {
        &self.flow
    }

    pub fn state(&self) -> &StepState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage(self.flow.step_count())
    }

    pub fn is_complete(&self) -> bool {
        self.stage() == Stage::Result
    }

    pub fn allowed_transitions(&self) -> Vec<Transition> {
        allowed_transitions(self.stage())
    }

    /// Schema of the current step, `None` in the result state
    pub fn current_schema(&self) -> Option<&FieldSchema> {
        self.flow.schema_for(self.state.current_step())
    }

    /// Fresh form binder for the current step, `None` in the result state
    pub fn binder(&self) -> Result<Option<FormBinder>, FlowError> {
        match self.current_schema() {
            Some(schema) => FormBinder::new(schema.clone(), self.state.current_step()).map(Some),
            None => Ok(None),
        }
    }

    /// Submit a form; advances only when every field validates
    ///
    /// Returns the new stage on success, `None` when validation failed and
    /// the errors were left on the binder.
    pub fn submit(&mut self, form: &mut FormBinder) -> Result<Option<Stage>, StepError> {
        form.handle_submit(|data| self.complete_step(data))
            .transpose()
    }

    /// Accept validated data for the current step
    pub fn complete_step(&mut self, data: FormData) -> Result<Stage, StepError> {
        let step = match self.stage() {
            Stage::Step(n) => n,
            Stage::Result => {
                return Err(StepError::InvalidTransition {
                    from: Stage::Result,
                    action: Transition::Submit,
                })
            }
        };

        if let Some(schema) = self.current_schema() {
            if let Some(field) = data.keys().find(|k| !schema.contains(k)) {
                return Err(StepError::UndeclaredField {
                    step,
                    field: field.clone(),
                });
            }
        }

        let submitted = Value::Object(data.clone());
        debug!(
            flow = %self.flow.name,
            step,
            data = %submitted,
            "step submitted"
        );

        let total = self.flow.step_count();
        let state = std::mem::take(&mut self.state);
        self.state = state.advance(total, data)?;

        let stage = self.stage();
        if stage == Stage::Result {
            info!(
                flow = %self.flow.name,
                fields = self.state.accumulated().len(),
                "flow complete"
            );
        }
        Ok(stage)
    }

    /// Restart from the result state
    pub fn restart(&mut self) -> Result<(), StepError> {
        let total = self.flow.step_count();
        let state = std::mem::take(&mut self.state);
        match state.clone().restart(total) {
            Ok(fresh) => {
                debug!(flow = %self.flow.name, "restart");
                self.state = fresh;
                Ok(())
            }
            Err(e) => {
                self.state = state;
                Err(e)
            }
        }
    }

    /// Data collected so far
    pub fn accumulated(&self) -> &FormData {
        self.state.accumulated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::FieldSpec;
    use crate::schema::registry::FlowRegistry;
    use serde_json::json;

    fn data(value: Value) -> FormData {
        value.as_object().cloned().unwrap()
    }

    fn multistep() -> StepController {
        StepController::new(FlowRegistry::builtin().get("multistep").unwrap().clone())
    }

    fn submit(controller: &mut StepController, values: Value) -> Option<Stage> {
        let mut form = controller.binder().unwrap().expect("not in result state");
        for (name, value) in values.as_object().unwrap() {
            form.register(name).unwrap().set(value.as_str().unwrap());
        }
        controller.submit(&mut form).unwrap()
    }

    #[test]
    fn test_valid_transitions() {
        assert!(is_valid_transition(Stage::Step(1), Transition::Submit));
        assert!(is_valid_transition(Stage::Result, Transition::Restart));
        assert!(!is_valid_transition(Stage::Step(2), Transition::Restart));
        assert!(!is_valid_transition(Stage::Result, Transition::Submit));
    }

    #[test]
    fn test_allowed_transitions() {
        assert_eq!(allowed_transitions(Stage::Step(3)), vec![Transition::Submit]);
        assert_eq!(allowed_transitions(Stage::Result), vec![Transition::Restart]);
    }

    #[test]
    fn test_state_advance_merges_data() {
        let state = StepState::new()
            .advance(2, data(json!({"name": "Alice"})))
            .unwrap();
        assert_eq!(state.current_step(), 2);
        assert_eq!(state.stage(2), Stage::Step(2));

        let state = state.advance(2, data(json!({"text": "hi"}))).unwrap();
        assert_eq!(state.stage(2), Stage::Result);
        assert_eq!(
            Value::Object(state.accumulated().clone()),
            json!({"name": "Alice", "text": "hi"})
        );
    }

    #[test]
    fn test_state_advance_is_idempotent_per_input() {
        let start = StepState::new()
            .advance(3, data(json!({"name": "Alice"})))
            .unwrap();
        let step = data(json!({"country": "SE", "postalCode": "12345"}));

        let first = start.clone().advance(3, step.clone()).unwrap();
        let second = start.advance(3, step).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.current_step(), 3);
        assert_eq!(first.accumulated().len(), 3);
    }

    #[test]
    fn test_state_advance_from_result_fails() {
        let state = StepState::new().advance(1, FormData::new()).unwrap();
        assert_eq!(
            state.advance(1, FormData::new()),
            Err(StepError::InvalidTransition {
                from: Stage::Result,
                action: Transition::Submit
            })
        );
    }

    #[test]
    fn test_state_restart_only_from_result() {
        let state = StepState::new();
        assert!(state.clone().restart(2).is_err());

        let done = state
            .advance(1, data(json!({"name": "Alice"})))
            .unwrap();
        let fresh = done.restart(1).unwrap();
        assert_eq!(fresh, StepState::new());
        assert!(fresh.accumulated().is_empty());
    }

    #[test]
    fn test_invalid_submit_stays_on_step() {
        let mut controller = multistep();
        let outcome = submit(&mut controller, json!({"name": "Al", "email": "a@b.com"}));
        assert_eq!(outcome, None);
        assert_eq!(controller.stage(), Stage::Step(1));
        assert!(controller.accumulated().is_empty());
    }

    #[test]
    fn test_errors_only_on_violated_fields() {
        let mut controller = multistep();
        let mut form = controller.binder().unwrap().unwrap();
        form.register("name").unwrap().set("Al");
        form.register("email").unwrap().set("a@b.com");

        assert_eq!(controller.submit(&mut form).unwrap(), None);
        assert!(form
            .errors()
            .get("name")
            .unwrap()
            .to_lowercase()
            .contains("too short"));
        assert!(form.errors().get("email").is_none());
    }

    #[test]
    fn test_full_flow_and_restart() {
        let mut controller = multistep();

        assert_eq!(
            submit(&mut controller, json!({"name": "Alice", "email": "a@b.com"})),
            Some(Stage::Step(2))
        );
        assert_eq!(controller.accumulated().len(), 2);

        assert_eq!(
            submit(&mut controller, json!({"country": "UK", "postalCode": "SW1A"})),
            Some(Stage::Step(3))
        );
        assert_eq!(
            submit(&mut controller, json!({"text": ""})),
            Some(Stage::Result)
        );

        assert!(controller.is_complete());
        assert!(controller.binder().unwrap().is_none());
        assert_eq!(
            Value::Object(controller.accumulated().clone()),
            json!({
                "name": "Alice",
                "email": "a@b.com",
                "country": "UK",
                "postalCode": "SW1A",
                "text": ""
            })
        );

        controller.restart().unwrap();
        assert_eq!(controller.stage(), Stage::Step(1));
        assert_eq!(controller.state(), &StepState::new());
    }

    #[test]
    fn test_restart_mid_flow_is_rejected_and_keeps_state() {
        let mut controller = multistep();
        submit(&mut controller, json!({"name": "Alice", "email": "a@b.com"}));

        let err = controller.restart().unwrap_err();
        assert_eq!(
            err,
            StepError::InvalidTransition {
                from: Stage::Step(2),
                action: Transition::Restart
            }
        );
        assert_eq!(controller.stage(), Stage::Step(2));
        assert_eq!(controller.accumulated().len(), 2);
    }

    #[test]
    fn test_complete_step_rejects_undeclared_fields() {
        let flow = FlowDefinition::new(
            "one",
            "One",
            vec![FieldSchema::new(vec![FieldSpec::string("name")])],
        );
        let mut controller = StepController::new(flow);
        let err = controller
            .complete_step(data(json!({"name": "x", "sneaky": "y"})))
            .unwrap_err();
        assert!(matches!(err, StepError::UndeclaredField { step: 1, .. }));
        assert_eq!(controller.stage(), Stage::Step(1));
    }

    #[test]
    fn test_resubmitting_same_step_data_matches() {
        let first = {
            let mut c = multistep();
            submit(&mut c, json!({"name": "Alice", "email": "a@b.com"}));
            c.state().clone()
        };
        let second = {
            let mut c = multistep();
            submit(&mut c, json!({"name": "Alice", "email": "a@b.com"}));
            c.state().clone()
        };
        assert_eq!(first, second);
    }

    #[test]
    fn test_step_events_render_with_debug_logging() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut c = multistep();
            submit(&mut c, json!({"name": "Alice", "email": "a@b.com"}));
            submit(&mut c, json!({"country": "UK", "postalCode": "SW1A"}));
            submit(&mut c, json!({"text": ""}));
            assert!(c.is_complete());
            assert_eq!(c.accumulated()["postalCode"], "SW1A");
        });
    }
}
