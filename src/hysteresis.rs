#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    /// The next rise above the level fires.
    Armed,
    /// Already fired; waits for the signal to fall back to the level.
    Triggered,
}

/// Edge detector for one-shot actions: fires once per rise above `level`
/// and re-arms only once the signal is back at or below it.
#[derive(Debug)]
pub struct HysteresisGate {
    level: i32,
    state: GateState,
}

impl HysteresisGate {
    pub fn new(level: i32) -> Self {
        Self {
            level,
            state: GateState::Armed,
        }
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = GateState::Armed;
    }

    /// Feed one signal value. Returns true on the armed → triggered edge only.
    pub fn update(&mut self, signal: i32) -> bool {
        let above = signal > self.level;
        match (self.state, above) {
            (GateState::Armed, true) => {
                self.state = GateState::Triggered;
                true
            }
            (GateState::Triggered, false) => {
                self.state = GateState::Armed;
                false
            }
            _ => false,
        }
    }
}
