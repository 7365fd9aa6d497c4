//! The Pod reconcile decision table, per spec.md §4.4: what the agent does
//! to a Pod assigned to this node, given its last-known phase and whether
//! a container named after it is currently running.

use nanokube_types::PodPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Pending, no container running: create and start one.
    Start,
    /// Pending, but a container is already running (a previous status
    /// write failed after a successful start): re-sync status, don't
    /// restart.
    SyncRunning,
    /// Running, but the container is absent or exited: mark Failed.
    MarkFailed,
    /// Running and the container is running, or the Pod is in a terminal
    /// phase: nothing to do.
    NoOp,
}

pub fn next_action(phase: PodPhase, container_running: bool) -> Action {
    match (phase, container_running) {
        (PodPhase::Pending, false) => Action::Start,
        (PodPhase::Pending, true) => Action::SyncRunning,
        (PodPhase::Running, true) => Action::NoOp,
        (PodPhase::Running, false) => Action::MarkFailed,
        (PodPhase::Failed, _) | (PodPhase::Succeeded, _) => Action::NoOp,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pending_and_not_running_starts() {
        assert_eq!(next_action(PodPhase::Pending, false), Action::Start);
    }

    #[test]
    fn pending_and_running_syncs_without_restart() {
        assert_eq!(next_action(PodPhase::Pending, true), Action::SyncRunning);
    }

    #[test]
    fn running_and_running_is_noop() {
        assert_eq!(next_action(PodPhase::Running, true), Action::NoOp);
    }

    #[test]
    fn running_and_absent_marks_failed() {
        assert_eq!(next_action(PodPhase::Running, false), Action::MarkFailed);
    }

    #[test]
    fn terminal_phases_are_always_noop() {
        assert_eq!(next_action(PodPhase::Failed, true), Action::NoOp);
        assert_eq!(next_action(PodPhase::Failed, false), Action::NoOp);
        assert_eq!(next_action(PodPhase::Succeeded, true), Action::NoOp);
        assert_eq!(next_action(PodPhase::Succeeded, false), Action::NoOp);
    }
}
