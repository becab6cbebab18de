use parking_lot::{Condvar, Mutex};

/// One-shot readiness signal.
///
/// Starts closed, opens once, never closes again. Waiting on a closed gate
/// blocks; waiting on an open gate returns immediately.
#[derive(Default)]
pub struct ReadinessGate {
    open: Mutex<bool>,
    cv: Condvar,
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the gate and wakes all waiters.
    ///
    /// Returns `false` if the gate was already open.
    pub fn open(&self) -> bool {
        let mut open = self.open.lock();
        if *open {
            return false;
        }
        *open = true;
        self.cv.notify_all();
        true
    }

    pub fn is_open(&self) -> bool {
        *self.open.lock()
    }

    /// Blocks until the gate is open.
    pub fn wait(&self) {
        let mut open = self.open.lock();
        while !*open {
            self.cv.wait(&mut open);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn opens_exactly_once() {
        let gate = ReadinessGate::new();
        assert!(!gate.is_open());
        assert!(gate.open());
        assert!(!gate.open());
        assert!(gate.is_open());
    }

    #[test]
    fn wait_after_open_returns_immediately() {
        let gate = ReadinessGate::new();
        gate.open();
        gate.wait();
    }

    #[test]
    fn waiters_block_until_open() {
        let gate = Arc::new(ReadinessGate::new());
        let (tx, rx) = crossbeam_channel::unbounded();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let (gate, tx) = (gate.clone(), tx.clone());
                thread::spawn(move || {
                    gate.wait();
                    tx.send(()).unwrap();
                })
            })
            .collect();

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        gate.open();
        for _ in 0..4 {
            rx.recv_timeout(Duration::from_secs(5)).unwrap();
        }
        for h in handles {
            h.join().unwrap();
        }
    }
}
