//! Domain events module.
//!
//! Provides the catalog change event, the sink trait the repository emits
//! through after every successful mutation, and [`ChangeBus`], the
//! publish/subscribe sink that keeps independent display widgets in sync.

mod bus;
mod domain_event;
mod sink;

pub use bus::*;
pub use domain_event::*;
pub use sink::*;
