// Single-flight bookkeeping for the periodic balance refresh. The session
// layer owns one of these; every refresh trigger (interval, manual) asks it
// for a ticket first.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshTicket(u64);

#[derive(Debug, Default)]
pub struct RefreshScheduler {
    generation: u64,
    in_flight: Option<u64>,
    pub completed: u32,
}

impl RefreshScheduler {
    /// `None` while a refresh is already running.
    pub fn try_begin(&mut self) -> Option<RefreshTicket> {
        if self.in_flight.is_some() {
            log::debug!("[POLL] refresh already in flight, skipped");
            return None;
        }
        self.in_flight = Some(self.generation);
        Some(RefreshTicket(self.generation))
    }

    /// Returns whether the result of `ticket` should be applied.
    pub fn finish(&mut self, ticket: RefreshTicket) -> bool {
        if self.in_flight != Some(ticket.0) || ticket.0 != self.generation {
            return false;
        }
        self.in_flight = None;
        self.completed += 1;
        true
    }

    /// Invalidates outstanding tickets (session torn down or identity changed).
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.in_flight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_refresh_at_a_time() {
        let mut s = RefreshScheduler::default();
        let t = s.try_begin().unwrap();
        assert!(s.try_begin().is_none());
        assert!(s.finish(t));
        assert!(s.try_begin().is_some());
    }

    #[test]
    fn cancelled_ticket_result_is_discarded() {
        let mut s = RefreshScheduler::default();
        let t = s.try_begin().unwrap();
        s.cancel();
        assert!(!s.finish(t));
        let t2 = s.try_begin().unwrap();
        assert!(s.finish(t2));
        assert_eq!(s.completed, 1);
    }
}
