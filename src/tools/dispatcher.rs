//! Tool dispatcher
//!
//! Routes model-invoked tool calls to their handlers and always returns a
//! structured payload; a failing booking operation becomes an error result
//! for the model to relay, never a session-fatal error.

use serde_json::{Value, json};

use super::definitions;
use crate::booking::{BookRoomRequest, BookingStore, LookupQuery, UpdateBookingRequest};
use crate::gate::HoldState;
use crate::prompt::{FAREWELL, HOLD_ACKNOWLEDGEMENT};

/// The result of one dispatched tool call
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    /// Structured result handed back to the model
    pub result: Value,
    /// Fixed line to speak immediately, bypassing the model
    pub speak: Option<String>,
    /// Whether the result should trigger another model turn
    pub run_llm: bool,
    /// Whether the session should end after queued speech finishes
    pub end_session: bool,
}

impl ToolOutcome {
    /// A plain result that feeds back into the model
    fn result(result: Value) -> Self {
        Self {
            result,
            speak: None,
            run_llm: true,
            end_session: false,
        }
    }
}

/// Maps named model-invoked actions onto the gate, session control, and the
/// booking service
pub struct ToolDispatcher {
    booking: BookingStore,
    hold: HoldState,
}

impl ToolDispatcher {
    /// Create a dispatcher for one session
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(booking: BookingStore, hold: HoldState) -> Self {
        Self { booking, hold }
    }

    /// Dispatch one tool call.
    ///
    /// Hold takes effect synchronously, before this returns, so the next
    /// inbound transcript already sees the engaged gate.
    pub async fn dispatch(&self, name: &str, arguments: &Value) -> ToolOutcome {
        tracing::debug!(tool = name, "dispatching tool call");

        match name {
            definitions::PUT_ON_HOLD => {
                self.hold.set(true);
                ToolOutcome {
                    result: json!({"status": "on_hold"}),
                    speak: Some(HOLD_ACKNOWLEDGEMENT.to_string()),
                    run_llm: false,
                    end_session: false,
                }
            }
            definitions::END_CALL => ToolOutcome {
                result: json!({"status": "call_ended"}),
                speak: Some(FAREWELL.to_string()),
                run_llm: false,
                end_session: true,
            },
            definitions::GET_PRICING => self.booking_call(|b| {
                b.get_pricing(arg_str(arguments, "room_type").as_deref())
            }),
            definitions::GET_AMENITIES => match arg_str(arguments, "room_type") {
                Some(room_type) => self.booking_call(|b| b.get_amenities(&room_type)),
                None => ToolOutcome::result(json!({
                    "error": "Please specify a room type: standard, deluxe, or suite"
                })),
            },
            definitions::LOOKUP_BOOKING => {
                let query = lookup_query(arguments);
                self.booking_call(|b| b.lookup_booking(&query))
            }
            definitions::CHECK_AVAILABILITY => {
                let check_in = arg_str(arguments, "check_in_date");
                let check_out = arg_str(arguments, "check_out_date");
                let (Some(check_in), Some(check_out)) = (check_in, check_out) else {
                    return ToolOutcome::result(json!({
                        "success": false,
                        "error": "Please provide both a check-in and a check-out date.",
                    }));
                };
                self.booking_call(|b| {
                    b.check_availability(
                        &check_in,
                        &check_out,
                        arg_str(arguments, "room_type").as_deref(),
                        arg_i64(arguments, "num_guests"),
                    )
                })
            }
            definitions::BOOK_ROOM => match book_room_request(arguments) {
                Ok(request) => self.booking_call(|b| b.book_room(&request)),
                Err(missing) => ToolOutcome::result(json!({
                    "success": false,
                    "error": format!(
                        "Missing required booking information: {missing}. Please collect \
                         it from the guest first."
                    ),
                })),
            },
            definitions::UPDATE_BOOKING => {
                let request = UpdateBookingRequest {
                    query: lookup_query(arguments),
                    new_check_in_date: arg_str(arguments, "new_check_in_date"),
                    new_check_out_date: arg_str(arguments, "new_check_out_date"),
                    new_room_type: arg_str(arguments, "new_room_type"),
                    new_num_guests: arg_i64(arguments, "new_num_guests"),
                };
                self.booking_call(|b| b.update_booking(&request))
            }
            definitions::CANCEL_BOOKING => {
                let query = lookup_query(arguments);
                self.booking_call(|b| b.cancel_booking(&query))
            }
            definitions::ADD_SPECIAL_REQUEST => {
                let query = lookup_query(arguments);
                let request = arg_str(arguments, "request").unwrap_or_default();
                self.booking_call(|b| b.add_special_request(&query, &request))
            }
            other => {
                tracing::warn!(tool = other, "unknown tool invoked");
                ToolOutcome::result(json!({
                    "success": false,
                    "error": format!("unknown tool: {other}"),
                }))
            }
        }
    }

    /// Run one booking operation, converting infrastructure failures into a
    /// structured error payload
    fn booking_call<F>(&self, call: F) -> ToolOutcome
    where
        F: FnOnce(&BookingStore) -> crate::Result<Value>,
    {
        match call(&self.booking) {
            Ok(result) => ToolOutcome::result(result),
            Err(e) => {
                tracing::error!(error = %e, "booking service call failed");
                ToolOutcome::result(json!({
                    "success": false,
                    "error": "The booking system is temporarily unavailable. Please try again.",
                }))
            }
        }
    }
}

fn arg_str(arguments: &Value, key: &str) -> Option<String> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn arg_i64(arguments: &Value, key: &str) -> Option<i64> {
    arguments.get(key).and_then(Value::as_i64)
}

fn lookup_query(arguments: &Value) -> LookupQuery {
    LookupQuery {
        confirmation_number: arg_str(arguments, "confirmation_number"),
        guest_name: arg_str(arguments, "guest_name"),
        guest_email: arg_str(arguments, "guest_email"),
        guest_phone: arg_str(arguments, "guest_phone"),
    }
}

/// Assemble a booking request, naming the first missing required field
fn book_room_request(arguments: &Value) -> std::result::Result<BookRoomRequest, &'static str> {
    let guest_name = arg_str(arguments, "guest_name").ok_or("guest_name")?;
    let guest_phone = arg_str(arguments, "guest_phone").ok_or("guest_phone")?;
    let guest_email = arg_str(arguments, "guest_email").ok_or("guest_email")?;
    let room_type = arg_str(arguments, "room_type").ok_or("room_type")?;
    let check_in_date = arg_str(arguments, "check_in_date").ok_or("check_in_date")?;
    let check_out_date = arg_str(arguments, "check_out_date").ok_or("check_out_date")?;

    let special_requests = arguments
        .get("special_requests")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(BookRoomRequest {
        guest_name,
        guest_phone,
        guest_email,
        room_type,
        check_in_date,
        check_out_date,
        num_guests: arg_i64(arguments, "num_guests").unwrap_or(1),
        special_requests,
    })
}
