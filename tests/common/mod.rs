// Shared test doubles for the session controller and widget tests.
// Not every test binary exercises every helper.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use loqa_dictate::{BridgeError, CommandBridge};
use tokio::sync::Semaphore;

/// Scripted command-bridge double.
///
/// Pops one queued result per call (success when nothing is queued) and
/// records call counts plus the maximum number of commands ever in flight
/// at once. Calls can be held open with [`ScriptedBridge::hold`] so tests
/// can interleave intents with an in-flight command.
#[derive(Clone)]
pub struct ScriptedBridge {
    script: Arc<Mutex<Script>>,
    gate: Arc<Semaphore>,
}

#[derive(Default)]
struct Script {
    start_results: VecDeque<Result<(), BridgeError>>,
    stop_results: VecDeque<Result<Vec<u8>, BridgeError>>,
    start_calls: usize,
    stop_calls: usize,
    in_flight: usize,
    max_in_flight: usize,
    gated: bool,
}

impl ScriptedBridge {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            gate: Arc::new(Semaphore::new(0)),
        }
    }

    /// Queue the next `start_recording` result.
    pub fn push_start(&self, result: Result<(), BridgeError>) {
        self.script.lock().unwrap().start_results.push_back(result);
    }

    /// Queue the next `stop_recording` result.
    pub fn push_stop(&self, result: Result<Vec<u8>, BridgeError>) {
        self.script.lock().unwrap().stop_results.push_back(result);
    }

    /// Make every command block until a matching [`ScriptedBridge::release`].
    pub fn hold(&self) {
        self.script.lock().unwrap().gated = true;
    }

    /// Let one held command proceed.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn start_calls(&self) -> usize {
        self.script.lock().unwrap().start_calls
    }

    pub fn stop_calls(&self) -> usize {
        self.script.lock().unwrap().stop_calls
    }

    pub fn max_in_flight(&self) -> usize {
        self.script.lock().unwrap().max_in_flight
    }

    fn enter(&self) -> bool {
        let mut script = self.script.lock().unwrap();
        script.in_flight += 1;
        script.max_in_flight = script.max_in_flight.max(script.in_flight);
        script.gated
    }

    fn leave(&self) {
        self.script.lock().unwrap().in_flight -= 1;
    }

    async fn suspend(&self, gated: bool) {
        if gated {
            self.gate.acquire().await.expect("gate closed").forget();
        } else {
            tokio::task::yield_now().await;
        }
    }
}

impl Default for ScriptedBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CommandBridge for ScriptedBridge {
    async fn start_recording(&self) -> Result<(), BridgeError> {
        let gated = self.enter();
        self.script.lock().unwrap().start_calls += 1;
        self.suspend(gated).await;
        self.leave();
        self.script
            .lock()
            .unwrap()
            .start_results
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn stop_recording(&self) -> Result<Vec<u8>, BridgeError> {
        let gated = self.enter();
        self.script.lock().unwrap().stop_calls += 1;
        self.suspend(gated).await;
        self.leave();
        self.script
            .lock()
            .unwrap()
            .stop_results
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn is_recording(&self) -> Result<bool, BridgeError> {
        Ok(false)
    }
}
