//! Connectivity management — wireless link and broker session.
//!
//! Both managers are tick-driven state machines over port traits: the
//! node services call `step()` once per loop pass, and all retry budgets
//! and inter-attempt delays are counted in ticks rather than blocking
//! sleeps, so a slow association can never starve card scanning or
//! command servicing.

pub mod link;
pub mod session;
