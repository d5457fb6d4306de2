// libs/appointment-cell/src/services/reschedule.rs

/// Successful reschedules allowed per appointment. The attempt after the
/// allowance is used up cancels the appointment instead.
pub const MAX_RESCHEDULES: u32 = 2;

/// System reason recorded when the policy converts a reschedule into a
/// rejection.
pub const AUTO_CANCEL_REASON: &str = "Auto-cancelled after 2 reschedules";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RescheduleDecision {
    pub auto_cancel: bool,
}

/// Pure policy: a reschedule request against an appointment that has already
/// been rescheduled `current_count` times either goes through (and the engine
/// increments the count) or is converted into an automatic rejection. The
/// count is never incremented on the cancellation path.
pub fn decide(current_count: u32) -> RescheduleDecision {
    RescheduleDecision {
        auto_cancel: current_count >= MAX_RESCHEDULES,
    }
}
