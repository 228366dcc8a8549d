//! Step enums of the guided flows and their transition tables.
//!
//! `next` / `previous` return `None` where the flow leaves its step list: past the last
//! step (completion) or before the first (exit home).

/// Steps of the bus reservation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReserveBusStep {
    SearchStation,
    SelectStation,
    SelectBus,
    WaitingBus,
    ReservationDesConfirm,
}

impl ReserveBusStep {
    pub fn next(&self) -> Option<Self> {
        match self {
            ReserveBusStep::SearchStation => Some(ReserveBusStep::SelectStation),
            ReserveBusStep::SelectStation => Some(ReserveBusStep::SelectBus),
            ReserveBusStep::SelectBus => Some(ReserveBusStep::WaitingBus),
            ReserveBusStep::WaitingBus => Some(ReserveBusStep::ReservationDesConfirm),
            ReserveBusStep::ReservationDesConfirm => None,
        }
    }

    pub fn previous(&self) -> Option<Self> {
        match self {
            ReserveBusStep::SearchStation => None,
            ReserveBusStep::SelectStation => Some(ReserveBusStep::SearchStation),
            ReserveBusStep::SelectBus => Some(ReserveBusStep::SelectStation),
            ReserveBusStep::WaitingBus => Some(ReserveBusStep::SelectBus),
            ReserveBusStep::ReservationDesConfirm => Some(ReserveBusStep::WaitingBus),
        }
    }

    /// Steps that require a confirmed boarding.
    pub fn holds_boarding(&self) -> bool {
        matches!(
            self,
            ReserveBusStep::WaitingBus | ReserveBusStep::ReservationDesConfirm
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReserveBusStep::SearchStation => "searchStation",
            ReserveBusStep::SelectStation => "selectStation",
            ReserveBusStep::SelectBus => "selectBus",
            ReserveBusStep::WaitingBus => "waitingBus",
            ReserveBusStep::ReservationDesConfirm => "reservationDesConfirm",
        }
    }
}

/// Steps of the route-finder boarding flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathFinderStep {
    RoutingConfirm,
    ReservationBusConfirm,
    WaitingBus,
    ReservationDesConfirm,
}

impl PathFinderStep {
    pub fn next(&self) -> Option<Self> {
        match self {
            PathFinderStep::RoutingConfirm => Some(PathFinderStep::ReservationBusConfirm),
            PathFinderStep::ReservationBusConfirm => Some(PathFinderStep::WaitingBus),
            PathFinderStep::WaitingBus => Some(PathFinderStep::ReservationDesConfirm),
            PathFinderStep::ReservationDesConfirm => None,
        }
    }

    pub fn previous(&self) -> Option<Self> {
        match self {
            PathFinderStep::RoutingConfirm => None,
            PathFinderStep::ReservationBusConfirm => Some(PathFinderStep::RoutingConfirm),
            PathFinderStep::WaitingBus => Some(PathFinderStep::ReservationBusConfirm),
            PathFinderStep::ReservationDesConfirm => Some(PathFinderStep::WaitingBus),
        }
    }

    pub fn holds_boarding(&self) -> bool {
        matches!(
            self,
            PathFinderStep::WaitingBus | PathFinderStep::ReservationDesConfirm
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PathFinderStep::RoutingConfirm => "routingConfirm",
            PathFinderStep::ReservationBusConfirm => "reservationBusConfirm",
            PathFinderStep::WaitingBus => "waitingBus",
            PathFinderStep::ReservationDesConfirm => "reservationDesConfirm",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_steps_walk_forward_and_back() {
        let mut step = ReserveBusStep::SearchStation;
        let mut seen = vec![step];
        while let Some(next) = step.next() {
            seen.push(next);
            step = next;
        }
        assert_eq!(seen.len(), 5);
        assert_eq!(step, ReserveBusStep::ReservationDesConfirm);
        assert_eq!(ReserveBusStep::SearchStation.previous(), None);
        assert_eq!(
            ReserveBusStep::WaitingBus.previous(),
            Some(ReserveBusStep::SelectBus)
        );
    }

    #[test]
    fn boarding_held_from_waiting_on() {
        assert!(!ReserveBusStep::SelectBus.holds_boarding());
        assert!(ReserveBusStep::WaitingBus.holds_boarding());
        assert!(!PathFinderStep::ReservationBusConfirm.holds_boarding());
        assert!(PathFinderStep::ReservationDesConfirm.holds_boarding());
        assert_eq!(PathFinderStep::RoutingConfirm.previous(), None);
    }
}
