// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Mutex;

use crate::engine::{CircuitEngine, EnterCircuitResult, ExecutionMode, ExecutionResult, ExitCircuitResult};
use crate::{BreakerSnapshot, CircuitState};

/// Fake engine to be used in tests. Records every reported exit.
#[derive(Debug)]
pub(crate) struct EngineFake {
    enter_result: EnterCircuitResult,
    exit_result: ExitCircuitResult,
    exits: Mutex<Vec<(ExecutionResult, ExecutionMode)>>,
}

impl EngineFake {
    pub fn new(enter_result: EnterCircuitResult, exit_result: ExitCircuitResult) -> Self {
        Self {
            enter_result,
            exit_result,
            exits: Mutex::new(Vec::new()),
        }
    }

    pub fn exits(&self) -> Vec<(ExecutionResult, ExecutionMode)> {
        self.exits.lock().unwrap().clone()
    }
}

impl CircuitEngine for EngineFake {
    fn enter(&self) -> EnterCircuitResult {
        self.enter_result
    }

    fn exit(&self, result: ExecutionResult, mode: ExecutionMode) -> ExitCircuitResult {
        self.exits.lock().unwrap().push((result, mode));
        self.exit_result.clone()
    }

    fn snapshot(&self) -> BreakerSnapshot {
        BreakerSnapshot {
            state: CircuitState::Closed,
            failure_count: 0,
            opened_at: None,
        }
    }
}
