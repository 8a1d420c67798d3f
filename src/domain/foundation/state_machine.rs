//! Validated transitions for lifecycle enums.
//!
//! The completion relay moves through its phases only via `transition_to`,
//! so an out-of-order phase change shows up as an error instead of a
//! silently inconsistent relay.

use super::ValidationError;

/// A lifecycle enum with a fixed successor table.
///
/// ```ignore
/// let next = RelayPhase::Opening.transition_to(RelayPhase::Streaming)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug + 'static {
    /// Phases reachable in one step from `self`.
    fn successors(&self) -> &'static [Self];

    fn can_transition_to(&self, target: &Self) -> bool {
        self.successors().contains(target)
    }

    /// Moves to `target`, or reports the rejected pair.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            return Ok(target);
        }
        Err(ValidationError::invalid_format(
            "phase",
            format!("{:?} cannot follow {:?}", target, self),
        ))
    }

    /// No successors.
    fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Upload {
        Queued,
        Sending,
        Done,
    }

    impl StateMachine for Upload {
        fn successors(&self) -> &'static [Self] {
            match self {
                Upload::Queued => &[Upload::Sending],
                Upload::Sending => &[Upload::Done, Upload::Queued],
                Upload::Done => &[],
            }
        }
    }

    #[test]
    fn follows_the_successor_table() {
        assert_eq!(Upload::Queued.transition_to(Upload::Sending), Ok(Upload::Sending));
        assert!(Upload::Sending.can_transition_to(&Upload::Queued));
    }

    #[test]
    fn rejects_skipped_phases() {
        let err = Upload::Queued.transition_to(Upload::Done).unwrap_err();
        assert_eq!(err.field(), "phase");
        assert!(err.to_string().contains("Done cannot follow Queued"));
    }

    #[test]
    fn terminal_when_nothing_follows() {
        assert!(Upload::Done.is_terminal());
        assert!(!Upload::Queued.is_terminal());
    }
}
