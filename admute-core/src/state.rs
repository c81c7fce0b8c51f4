/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

use std::fmt;

/// Debounced ad signal for the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdSignal {
    #[default]
    Content,
    Ad,
}

impl fmt::Display for AdSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdSignal::Content => write!(f, "CONTENT"),
            AdSignal::Ad => write!(f, "AD"),
        }
    }
}

/// An edge of the ad signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// CONTENT -> AD
    AdStarted,
    /// AD -> CONTENT
    AdEnded,
}

/// Turns one detector result per tick into edges. Repeating the current
/// state yields nothing, so side effects fire once per flip.
#[derive(Debug, Clone, Default)]
pub struct AdStateMachine {
    state: AdSignal,
}

impl AdStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AdSignal {
        self.state
    }

    pub fn observe(&mut self, detected: bool) -> Option<Transition> {
        match (self.state, detected) {
            (AdSignal::Content, true) => {
                self.state = AdSignal::Ad;
                Some(Transition::AdStarted)
            }
            (AdSignal::Ad, false) => {
                self.state = AdSignal::Content;
                Some(Transition::AdEnded)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_content() {
        assert_eq!(AdStateMachine::new().state(), AdSignal::Content);
    }

    #[test]
    fn edge_triggered_over_a_sequence() {
        let mut machine = AdStateMachine::new();
        let transitions: Vec<_> = [false, false, true, true, false]
            .into_iter()
            .map(|detected| machine.observe(detected))
            .collect();
        assert_eq!(
            transitions,
            vec![
                None,
                None,
                Some(Transition::AdStarted),
                None,
                Some(Transition::AdEnded)
            ]
        );
        assert_eq!(machine.state(), AdSignal::Content);
    }

    #[test]
    fn repeated_detection_stays_quiet() {
        let mut machine = AdStateMachine::new();
        assert_eq!(machine.observe(true), Some(Transition::AdStarted));
        for _ in 0..10 {
            assert_eq!(machine.observe(true), None);
        }
        assert_eq!(machine.state(), AdSignal::Ad);
    }
}
