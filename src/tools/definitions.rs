//! Tool definitions advertised to the model

use serde_json::json;

use crate::prompt::{END_CALL_TOOL_DESCRIPTION, HOLD_TOOL_DESCRIPTION};
use crate::providers::ToolDefinition;

pub const PUT_ON_HOLD: &str = "put_on_hold";
pub const END_CALL: &str = "end_call";
pub const GET_PRICING: &str = "get_pricing";
pub const GET_AMENITIES: &str = "get_amenities";
pub const LOOKUP_BOOKING: &str = "lookup_booking";
pub const CHECK_AVAILABILITY: &str = "check_availability";
pub const BOOK_ROOM: &str = "book_room";
pub const UPDATE_BOOKING: &str = "update_booking";
pub const CANCEL_BOOKING: &str = "cancel_booking";
pub const ADD_SPECIAL_REQUEST: &str = "add_special_request";

/// JSON Schema fragment for the room type enum
fn room_type_property(description: &str) -> serde_json::Value {
    json!({
        "type": "string",
        "enum": ["standard", "deluxe", "suite"],
        "description": description,
    })
}

/// The full tool set for a concierge session
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn concierge_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::function(
            PUT_ON_HOLD,
            HOLD_TOOL_DESCRIPTION,
            json!({"type": "object", "properties": {}, "required": []}),
        ),
        ToolDefinition::function(
            END_CALL,
            END_CALL_TOOL_DESCRIPTION,
            json!({"type": "object", "properties": {}, "required": []}),
        ),
        ToolDefinition::function(
            GET_PRICING,
            "Get room pricing. Call without room_type to get all prices, or specify a \
             type for specific pricing. Use when the caller asks about rates or costs.",
            json!({
                "type": "object",
                "properties": {
                    "room_type": room_type_property(
                        "The room type to get pricing for. Optional - omit to get all room prices."
                    ),
                },
                "required": [],
            }),
        ),
        ToolDefinition::function(
            GET_AMENITIES,
            "Get the list of amenities for a specific room type. Use when the caller asks \
             what's included in a room or what features it has.",
            json!({
                "type": "object",
                "properties": {
                    "room_type": room_type_property("The room type to get amenities for."),
                },
                "required": ["room_type"],
            }),
        ),
        ToolDefinition::function(
            LOOKUP_BOOKING,
            "Look up an existing reservation. Use when a guest wants to confirm their \
             booking details, check their reservation status, or verify room type or \
             dates. Ask for their confirmation number, name, email, or phone number.",
            json!({
                "type": "object",
                "properties": {
                    "confirmation_number": {
                        "type": "string",
                        "description": "The booking confirmation number (e.g., GV-2025-001001)",
                    },
                    "guest_name": {
                        "type": "string",
                        "description": "The guest's full or partial name",
                    },
                    "guest_email": {
                        "type": "string",
                        "description": "The guest's email address",
                    },
                    "guest_phone": {
                        "type": "string",
                        "description": "The guest's phone number",
                    },
                },
                "required": [],
            }),
        ),
        ToolDefinition::function(
            CHECK_AVAILABILITY,
            "Check room availability for specific dates, before making a booking. Always \
             call this when you say you will check - never pretend to check without \
             calling. Returns available room types with pricing.",
            json!({
                "type": "object",
                "properties": {
                    "check_in_date": {
                        "type": "string",
                        "description": "Check-in date in YYYY-MM-DD format",
                    },
                    "check_out_date": {
                        "type": "string",
                        "description": "Check-out date in YYYY-MM-DD format",
                    },
                    "room_type": room_type_property("Optional - filter by specific room type"),
                    "num_guests": {
                        "type": "integer",
                        "description": "Optional - number of guests to accommodate",
                    },
                },
                "required": ["check_in_date", "check_out_date"],
            }),
        ),
        ToolDefinition::function(
            BOOK_ROOM,
            "Create a new room reservation. Use this ONLY after confirming all details \
             with the guest: name, phone, email, room type, dates, and number of guests.",
            json!({
                "type": "object",
                "properties": {
                    "guest_name": {"type": "string", "description": "Full name of the guest"},
                    "guest_phone": {"type": "string", "description": "Guest's phone number"},
                    "guest_email": {"type": "string", "description": "Guest's email address"},
                    "room_type": room_type_property("Type of room to book"),
                    "check_in_date": {
                        "type": "string",
                        "description": "Check-in date in YYYY-MM-DD format",
                    },
                    "check_out_date": {
                        "type": "string",
                        "description": "Check-out date in YYYY-MM-DD format",
                    },
                    "num_guests": {"type": "integer", "description": "Number of guests staying"},
                    "special_requests": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Optional list of special requests",
                    },
                },
                "required": [
                    "guest_name", "guest_phone", "guest_email", "room_type",
                    "check_in_date", "check_out_date", "num_guests"
                ],
            }),
        ),
        ToolDefinition::function(
            UPDATE_BOOKING,
            "Modify an existing reservation. Can update check-in date, check-out date, \
             room type, or number of guests. First look up the booking, then ask what \
             they want to change.",
            json!({
                "type": "object",
                "properties": {
                    "confirmation_number": {
                        "type": "string",
                        "description": "The booking confirmation number",
                    },
                    "guest_name": {
                        "type": "string",
                        "description": "Guest's name (alternative to confirmation number)",
                    },
                    "guest_email": {
                        "type": "string",
                        "description": "Guest's email (alternative to confirmation number)",
                    },
                    "new_check_in_date": {
                        "type": "string",
                        "description": "New check-in date in YYYY-MM-DD format",
                    },
                    "new_check_out_date": {
                        "type": "string",
                        "description": "New check-out date in YYYY-MM-DD format",
                    },
                    "new_room_type": room_type_property("New room type"),
                    "new_num_guests": {
                        "type": "integer",
                        "description": "New number of guests",
                    },
                },
                "required": [],
            }),
        ),
        ToolDefinition::function(
            CANCEL_BOOKING,
            "Cancel an existing reservation. Confirm with the guest before cancelling. \
             Requires confirmation number, name, or email to find the booking.",
            json!({
                "type": "object",
                "properties": {
                    "confirmation_number": {
                        "type": "string",
                        "description": "The booking confirmation number",
                    },
                    "guest_name": {
                        "type": "string",
                        "description": "Guest's name (alternative to confirmation number)",
                    },
                    "guest_email": {
                        "type": "string",
                        "description": "Guest's email (alternative to confirmation number)",
                    },
                },
                "required": [],
            }),
        ),
        ToolDefinition::function(
            ADD_SPECIAL_REQUEST,
            "Add a special request to an existing booking, like late check-in, extra \
             pillows, a baby crib, or an anniversary setup. First look up the booking, \
             then add the request.",
            json!({
                "type": "object",
                "properties": {
                    "confirmation_number": {
                        "type": "string",
                        "description": "The booking confirmation number",
                    },
                    "guest_name": {
                        "type": "string",
                        "description": "The guest's name (alternative to confirmation number)",
                    },
                    "guest_email": {
                        "type": "string",
                        "description": "The guest's email (alternative to confirmation number)",
                    },
                    "request": {
                        "type": "string",
                        "description": "The special request to add (e.g., 'late check-in')",
                    },
                },
                "required": ["request"],
            }),
        ),
    ]
}
