/// Lifecycle of a single trial.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum TrialPhase {
    /// Constructed, nothing mounted yet.
    #[default]
    Idle,
    /// Stimulus mounted, waiting for a terminal event.
    Presenting,
    /// Result handed to the sink. Terminal.
    Finished,
}

impl TrialPhase {
    /// Whether media, timer and keyboard events may still change the trial.
    pub fn allows_input(&self) -> bool {
        matches!(self, Self::Presenting)
    }

    pub fn next(&self) -> Option<Self> {
        use TrialPhase::*;
        Some(match self {
            Idle => Presenting,
            Presenting => Finished,
            Finished => return None,
        })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::TrialPhase;

    #[test]
    fn phases_advance_until_finished() {
        let mut phase = TrialPhase::default();
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            phase = next;
            seen.push(phase);
        }
        assert_eq!(
            seen,
            [TrialPhase::Idle, TrialPhase::Presenting, TrialPhase::Finished]
        );
        assert!(phase.is_finished());
    }

    #[test]
    fn only_presenting_accepts_input() {
        assert!(!TrialPhase::Idle.allows_input());
        assert!(TrialPhase::Presenting.allows_input());
        assert!(!TrialPhase::Finished.allows_input());
    }
}
