//! LockTransport that remembers what it was asked to send

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use stockpile_shared::{GateState, LockTransport, TransportError};

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<GateState>>,
    attempts: Mutex<u32>,
    fail: AtomicBool,
    panic: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<GateState> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> u32 {
        *self.attempts.lock().unwrap()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn panic(&self, panic: bool) {
        self.panic.store(panic, Ordering::SeqCst);
    }
}

impl LockTransport for RecordingTransport {
    fn send_gate_state(&self, state: GateState) -> Result<(), TransportError> {
        *self.attempts.lock().unwrap() += 1;
        if self.panic.load(Ordering::SeqCst) {
            panic!("RecordingTransport told to panic");
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed {
                reason: "link down".to_string(),
            });
        }
        self.sent.lock().unwrap().push(state);
        Ok(())
    }
}
