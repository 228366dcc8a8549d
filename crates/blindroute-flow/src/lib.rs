//! Blindroute flows: the step machines behind the guided screens.
//!
//! Each flow runs as one tokio task draining one event queue, so every transition is
//! serialized. Child work (gateway calls, timers, the arrival poller, recognition) is
//! owned by the current step's scope and posts results back tagged with the step
//! generation; results from a step that has since been left are dropped.
//!
//! - [`ReservationFlow`]: search station, pick station and bus, reserve, wait, alight.
//! - [`RouteFinderFlow`]: confirm a resolved route leg, reserve, wait, alight.
//! - [`AssistantFlow`]: conversation that can hand off with a [`NavigationRequest`].
//!
//! [`NavigationRequest`]: blindroute_core::NavigationRequest

pub mod assistant;
pub mod context;
pub mod event;
pub mod poller;
pub mod reserve_bus;
mod ride;
pub mod route_finder;
mod scope;
mod script;
pub mod step;

pub use assistant::{AssistantFlow, AssistantView, CHAT_MESSAGE_MAX_SPOKEN};
pub use context::{FlowContext, FlowExit, FlowHandle};
pub use event::{ContentRegion, UserInput};
pub use poller::{spawn_arrival_poller, ArrivalSignal, ArrivalTracker};
pub use reserve_bus::{ReservationFlow, ReservationView, STATION_NAME_MAX_SPOKEN, STATION_NAME_MAX_TYPED};
pub use route_finder::{RouteFinderFlow, RouteFinderView};
pub use step::{PathFinderStep, ReserveBusStep};
