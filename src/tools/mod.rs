//! Tool layer
//!
//! JSON Schema definitions for every tool the concierge exposes to the
//! model, and the dispatcher that routes model-invoked calls to the hold
//! gate, session control, and the booking service.

mod definitions;
mod dispatcher;

pub use definitions::{
    ADD_SPECIAL_REQUEST, BOOK_ROOM, CANCEL_BOOKING, CHECK_AVAILABILITY, END_CALL, GET_AMENITIES,
    GET_PRICING, LOOKUP_BOOKING, PUT_ON_HOLD, UPDATE_BOOKING, concierge_tools,
};
pub use dispatcher::{ToolDispatcher, ToolOutcome};
