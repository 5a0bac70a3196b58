//! Reservation store and the eight booking operations
//!
//! Domain failures (bad dates, full house, unknown guest) are not errors:
//! they come back as structured payloads with a success flag or error
//! string, which the model relays conversationally. `Err` is reserved for
//! infrastructure failures.

use chrono::{Local, NaiveDate};
use rand::seq::SliceRandom;
use rusqlite::{OptionalExtension, params};
use serde_json::{Value, json};
use uuid::Uuid;

use super::{DbConn, DbPool};
use crate::{Error, Result};

/// Recognized room types, cheapest first
const ROOM_TYPES: [&str; 3] = ["standard", "deluxe", "suite"];

/// Confirmation number prefix; suffixes count up from 001001
const CONFIRMATION_PREFIX: &str = "GV-2025-";

/// A stored reservation
#[derive(Debug, Clone)]
pub struct Booking {
    pub id: String,
    pub confirmation_number: String,
    pub guest_name: String,
    pub guest_phone: String,
    pub guest_email: String,
    pub room_number: i64,
    pub room_type: String,
    pub floor: i64,
    pub check_in_date: String,
    pub check_out_date: String,
    pub num_guests: i64,
    pub price_per_night: i64,
    pub total_price: i64,
    pub status: String,
    pub special_requests: Vec<String>,
}

/// Identifying fields for finding an existing reservation
#[derive(Debug, Clone, Default)]
pub struct LookupQuery {
    pub confirmation_number: Option<String>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
}

impl LookupQuery {
    /// Whether no identifying field was provided
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.confirmation_number.is_none()
            && self.guest_name.is_none()
            && self.guest_email.is_none()
            && self.guest_phone.is_none()
    }
}

/// Fields for creating a reservation
#[derive(Debug, Clone)]
pub struct BookRoomRequest {
    pub guest_name: String,
    pub guest_phone: String,
    pub guest_email: String,
    pub room_type: String,
    pub check_in_date: String,
    pub check_out_date: String,
    pub num_guests: i64,
    pub special_requests: Vec<String>,
}

/// Fields for modifying a reservation
#[derive(Debug, Clone, Default)]
pub struct UpdateBookingRequest {
    pub query: LookupQuery,
    pub new_check_in_date: Option<String>,
    pub new_check_out_date: Option<String>,
    pub new_room_type: Option<String>,
    pub new_num_guests: Option<i64>,
}

/// An inventory room
#[derive(Debug, Clone)]
struct Room {
    room_number: i64,
    room_type: String,
    floor: i64,
    price_per_night: i64,
    capacity: i64,
}

/// Booking service over the reservation database
#[derive(Clone)]
pub struct BookingStore {
    pool: DbPool,
}

impl BookingStore {
    /// Create a store over an initialized pool
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Seed the default room inventory if the rooms table is empty.
    ///
    /// Returns the number of rooms inserted.
    ///
    /// # Errors
    ///
    /// Returns error if a database operation fails.
    pub fn seed_rooms(&self) -> Result<usize> {
        let conn = self.conn()?;
        let existing: i64 = conn.query_row("SELECT COUNT(*) FROM rooms", [], |row| row.get(0))?;
        if existing > 0 {
            return Ok(0);
        }

        let standard_amenities =
            json!(["Wi-Fi", "Flat-screen TV", "Air Conditioning", "Coffee Maker"]).to_string();
        let deluxe_amenities = json!([
            "Wi-Fi",
            "Flat-screen TV",
            "Air Conditioning",
            "Coffee Maker",
            "Mini Bar",
            "City View",
            "Work Desk"
        ])
        .to_string();
        let suite_amenities = json!([
            "Wi-Fi",
            "Flat-screen TV",
            "Air Conditioning",
            "Coffee Maker",
            "Mini Bar",
            "Panoramic View",
            "Jacuzzi",
            "Living Room",
            "Kitchenette"
        ])
        .to_string();

        let rooms: [(i64, &str, i64, i64, i64, &str); 9] = [
            (101, "standard", 1, 100, 2, &standard_amenities),
            (102, "standard", 1, 100, 2, &standard_amenities),
            (103, "standard", 1, 100, 2, &standard_amenities),
            (104, "standard", 1, 100, 2, &standard_amenities),
            (201, "deluxe", 2, 150, 3, &deluxe_amenities),
            (202, "deluxe", 2, 150, 3, &deluxe_amenities),
            (203, "deluxe", 2, 150, 3, &deluxe_amenities),
            (301, "suite", 3, 250, 4, &suite_amenities),
            (302, "suite", 3, 250, 4, &suite_amenities),
        ];

        for (number, room_type, floor, price, capacity, amenities) in rooms {
            conn.execute(
                "INSERT INTO rooms (room_number, room_type, floor, price_per_night, capacity, amenities)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![number, room_type, floor, price, capacity, amenities],
            )?;
        }

        tracing::info!(rooms = rooms.len(), "room inventory seeded");
        Ok(rooms.len())
    }

    /// Room pricing, for one type or all types
    ///
    /// # Errors
    ///
    /// Returns error if a database operation fails.
    pub fn get_pricing(&self, room_type: Option<&str>) -> Result<Value> {
        let conn = self.conn()?;

        if let Some(room_type) = room_type {
            let room_type = room_type.to_lowercase();
            let row: Option<(i64, i64)> = conn
                .query_row(
                    "SELECT price_per_night, capacity FROM rooms WHERE room_type = ?1 LIMIT 1",
                    [&room_type],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            return Ok(row.map_or_else(
                || json!({"error": format!("Room type '{room_type}' not found")}),
                |(price, capacity)| {
                    json!({
                        "room_type": room_type,
                        "price_per_night": price,
                        "capacity": capacity,
                    })
                },
            ));
        }

        let mut stmt = conn.prepare(
            "SELECT room_type, price_per_night, capacity FROM rooms
             GROUP BY room_type ORDER BY price_per_night",
        )?;
        let pricing: Vec<Value> = stmt
            .query_map([], |row| {
                Ok(json!({
                    "room_type": row.get::<_, String>(0)?,
                    "price_per_night": row.get::<_, i64>(1)?,
                    "capacity": row.get::<_, i64>(2)?,
                }))
            })?
            .collect::<rusqlite::Result<_>>()?;

        Ok(json!({"pricing": pricing}))
    }

    /// Amenity list for a room type
    ///
    /// # Errors
    ///
    /// Returns error if a database operation fails.
    pub fn get_amenities(&self, room_type: &str) -> Result<Value> {
        let room_type = room_type.to_lowercase();
        let conn = self.conn()?;

        let amenities: Option<String> = conn
            .query_row(
                "SELECT amenities FROM rooms WHERE room_type = ?1 LIMIT 1",
                [&room_type],
                |row| row.get(0),
            )
            .optional()?;

        Ok(amenities.map_or_else(
            || json!({"error": format!("Room type '{room_type}' not found")}),
            |raw| {
                let list: Vec<String> = serde_json::from_str(&raw).unwrap_or_default();
                json!({"room_type": room_type, "amenities": list})
            },
        ))
    }

    /// Find reservations by confirmation number, name, email, or phone
    ///
    /// # Errors
    ///
    /// Returns error if a database operation fails.
    pub fn lookup_booking(&self, query: &LookupQuery) -> Result<Value> {
        if query.is_empty() {
            return Ok(json!({
                "error": "Please provide at least one of: confirmation number, guest name, email, or phone number"
            }));
        }

        let bookings = self.find_bookings(query, 10)?;

        if bookings.is_empty() {
            return Ok(json!({
                "found": false,
                "message": "No booking found with the provided information. Please double-check and try again."
            }));
        }

        if bookings.len() == 1 {
            return Ok(json!({"found": true, "booking": booking_json(&bookings[0])}));
        }

        let results: Vec<Value> = bookings.iter().map(booking_json).collect();
        Ok(json!({
            "found": true,
            "message": format!("Found {} bookings matching your search", results.len()),
            "bookings": results,
        }))
    }

    /// Available rooms for a date range, optionally filtered by type/guests
    ///
    /// # Errors
    ///
    /// Returns error if a database operation fails.
    #[allow(clippy::too_many_lines)]
    pub fn check_availability(
        &self,
        check_in_date: &str,
        check_out_date: &str,
        room_type: Option<&str>,
        num_guests: Option<i64>,
    ) -> Result<Value> {
        let (check_in, check_out) = match validate_date_range(check_in_date, check_out_date) {
            Ok(dates) => dates,
            Err(message) => return Ok(error_payload(&message)),
        };

        let room_type = room_type.map(str::to_lowercase);

        // Capacity filtering mirrors the stay rules: standard 2, deluxe 3, suite 4
        let mut allowed_types: Vec<&str> = ROOM_TYPES.to_vec();
        if let Some(guests) = num_guests {
            allowed_types = ROOM_TYPES
                .into_iter()
                .filter(|t| capacity_for(t) >= guests)
                .collect();

            if allowed_types.is_empty() {
                return Ok(error_payload(&format!(
                    "No room type can accommodate {guests} guests. Maximum capacity is 4 guests (suite)."
                )));
            }

            if let Some(ref wanted) = room_type {
                if !allowed_types.contains(&wanted.as_str()) {
                    return Ok(error_payload(&format!(
                        "A {wanted} room can only accommodate {} guests. You need {guests}.",
                        capacity_for(wanted)
                    )));
                }
            }
        }

        let conn = self.conn()?;
        let rooms = load_rooms(&conn, room_type.as_deref())?;
        let rooms: Vec<Room> = rooms
            .into_iter()
            .filter(|r| allowed_types.contains(&r.room_type.as_str()))
            .collect();

        if rooms.is_empty() {
            return Ok(error_payload("No rooms found matching your criteria."));
        }

        let booked = booked_room_numbers(&conn, check_in_date, check_out_date, None, None)?;
        let available: Vec<&Room> = rooms
            .iter()
            .filter(|r| !booked.contains(&r.room_number))
            .collect();

        let nights = (check_out - check_in).num_days();

        if available.is_empty() {
            return Ok(json!({
                "success": true,
                "available": false,
                "message": format!(
                    "Sorry, no rooms are available from {check_in_date} to {check_out_date}."
                ),
                "check_in_date": check_in_date,
                "check_out_date": check_out_date,
                "nights": nights,
            }));
        }

        // Per-type summary, cheapest first
        let mut summary: Vec<Value> = Vec::new();
        for room_type in ROOM_TYPES {
            let of_type: Vec<&&Room> = available
                .iter()
                .filter(|r| r.room_type == room_type)
                .collect();
            if let Some(first) = of_type.first() {
                summary.push(json!({
                    "room_type": room_type,
                    "available_count": of_type.len(),
                    "price_per_night": first.price_per_night,
                    "total_price": first.price_per_night * nights,
                    "max_guests": first.capacity,
                }));
            }
        }

        Ok(json!({
            "success": true,
            "available": true,
            "check_in_date": check_in_date,
            "check_out_date": check_out_date,
            "nights": nights,
            "room_options": summary,
            "total_available_rooms": available.len(),
        }))
    }

    /// Create a reservation
    ///
    /// # Errors
    ///
    /// Returns error if a database operation fails.
    pub fn book_room(&self, request: &BookRoomRequest) -> Result<Value> {
        let room_type = request.room_type.to_lowercase();
        if !ROOM_TYPES.contains(&room_type.as_str()) {
            return Ok(error_payload(&format!(
                "Invalid room type '{room_type}'. Choose from: standard, deluxe, or suite."
            )));
        }

        let (check_in, check_out) =
            match validate_date_range(&request.check_in_date, &request.check_out_date) {
                Ok(dates) => dates,
                Err(message) => return Ok(error_payload(&message)),
            };

        let max_guests = capacity_for(&room_type);
        if request.num_guests > max_guests {
            return Ok(error_payload(&format!(
                "A {room_type} room can only accommodate {max_guests} guests. You requested {}.",
                request.num_guests
            )));
        }

        let conn = self.conn()?;
        let rooms = load_rooms(&conn, Some(room_type.as_str()))?;
        if rooms.is_empty() {
            return Ok(error_payload(&format!(
                "No {room_type} rooms exist in our system."
            )));
        }

        let booked = booked_room_numbers(
            &conn,
            &request.check_in_date,
            &request.check_out_date,
            Some(room_type.as_str()),
            None,
        )?;
        let available: Vec<&Room> = rooms
            .iter()
            .filter(|r| !booked.contains(&r.room_number))
            .collect();

        let Some(room) = available.choose(&mut rand::thread_rng()) else {
            return Ok(error_payload(&format!(
                "Sorry, no {room_type} rooms are available for those dates. Please try \
                 different dates or a different room type."
            )));
        };

        let nights = (check_out - check_in).num_days();
        let total_price = room.price_per_night * nights;
        let confirmation_number = next_confirmation_number(&conn)?;
        let requests_json = serde_json::to_string(&request.special_requests)?;

        conn.execute(
            "INSERT INTO bookings (id, confirmation_number, guest_name, guest_phone, guest_email,
                 room_number, room_type, floor, check_in_date, check_out_date, num_guests,
                 price_per_night, total_price, status, special_requests)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 'confirmed', ?14)",
            params![
                Uuid::new_v4().to_string(),
                confirmation_number,
                request.guest_name,
                request.guest_phone,
                request.guest_email.to_lowercase(),
                room.room_number,
                room_type,
                room.floor,
                request.check_in_date,
                request.check_out_date,
                request.num_guests,
                room.price_per_night,
                total_price,
                requests_json,
            ],
        )?;

        tracing::info!(
            confirmation = %confirmation_number,
            room = room.room_number,
            "booking created"
        );

        Ok(json!({
            "success": true,
            "message": "Booking confirmed successfully!",
            "booking": {
                "confirmation_number": confirmation_number,
                "guest_name": request.guest_name,
                "room_type": room_type,
                "room_number": room.room_number,
                "floor": room.floor,
                "check_in_date": request.check_in_date,
                "check_out_date": request.check_out_date,
                "nights": nights,
                "num_guests": request.num_guests,
                "price_per_night": room.price_per_night,
                "total_price": total_price,
                "special_requests": request.special_requests,
            }
        }))
    }

    /// Modify an existing reservation
    ///
    /// # Errors
    ///
    /// Returns error if a database operation fails.
    #[allow(clippy::too_many_lines)]
    pub fn update_booking(&self, request: &UpdateBookingRequest) -> Result<Value> {
        if request.query.is_empty() {
            return Ok(error_payload(
                "Please provide a confirmation number, name, or email to find the booking.",
            ));
        }

        let conn = self.conn()?;
        let Some(booking) = find_one_exact(&conn, &request.query)? else {
            return Ok(error_payload("No booking found with the provided information."));
        };

        if is_past_date(&booking.check_in_date) {
            return Ok(error_payload(
                "Cannot modify a booking that has already started or is in the past.",
            ));
        }

        let mut changes: Vec<&str> = Vec::new();

        let target_room_type = match &request.new_room_type {
            Some(new_type) => {
                let new_type = new_type.to_lowercase();
                if !ROOM_TYPES.contains(&new_type.as_str()) {
                    return Ok(error_payload(&format!(
                        "Invalid room type '{new_type}'. Choose from: standard, deluxe, or suite."
                    )));
                }
                changes.push("room_type");
                new_type
            }
            None => booking.room_type.clone(),
        };

        let num_guests = match request.new_num_guests {
            Some(guests) => {
                let max_guests = capacity_for(&target_room_type);
                if guests > max_guests {
                    return Ok(error_payload(&format!(
                        "A {target_room_type} room can only accommodate {max_guests} guests. \
                         You requested {guests}."
                    )));
                }
                changes.push("num_guests");
                guests
            }
            None => booking.num_guests,
        };

        let check_in_date = request
            .new_check_in_date
            .clone()
            .unwrap_or_else(|| booking.check_in_date.clone());
        let check_out_date = request
            .new_check_out_date
            .clone()
            .unwrap_or_else(|| booking.check_out_date.clone());

        let dates_changed =
            request.new_check_in_date.is_some() || request.new_check_out_date.is_some();
        if dates_changed {
            if let Err(message) = validate_date_range(&check_in_date, &check_out_date) {
                return Ok(error_payload(&message));
            }
            if request.new_check_in_date.is_some() {
                changes.push("check_in_date");
            }
            if request.new_check_out_date.is_some() {
                changes.push("check_out_date");
            }
        }

        if changes.is_empty() {
            return Ok(error_payload(
                "No changes provided. Please specify what you'd like to update.",
            ));
        }

        let type_changed = target_room_type != booking.room_type;
        let mut room_number = booking.room_number;
        let mut floor = booking.floor;
        let mut price_per_night = booking.price_per_night;

        if dates_changed || type_changed {
            let booked = booked_room_numbers(
                &conn,
                &check_in_date,
                &check_out_date,
                Some(target_room_type.as_str()),
                Some(booking.confirmation_number.as_str()),
            )?;
            let rooms = load_rooms(&conn, Some(target_room_type.as_str()))?;
            let available: Vec<&Room> = rooms
                .iter()
                .filter(|r| !booked.contains(&r.room_number))
                .collect();

            if available.is_empty() {
                return Ok(error_payload(&format!(
                    "Sorry, no {target_room_type} rooms are available for the new dates. \
                     Please try different dates."
                )));
            }

            if type_changed {
                let Some(room) = available.choose(&mut rand::thread_rng()) else {
                    return Ok(error_payload(&format!(
                        "Sorry, no {target_room_type} rooms are available for the new dates. \
                         Please try different dates."
                    )));
                };
                room_number = room.room_number;
                floor = room.floor;
                price_per_night = room.price_per_night;
                changes.push("room_number");
                changes.push("floor");
                changes.push("price_per_night");
            }
        }

        // Recompute the total for the final dates and room
        let (check_in, check_out) = match validate_date_range(&check_in_date, &check_out_date) {
            Ok(dates) => dates,
            Err(message) => return Ok(error_payload(&message)),
        };
        let nights = (check_out - check_in).num_days();
        let total_price = price_per_night * nights;
        changes.push("total_price");

        let updated = conn.execute(
            "UPDATE bookings SET room_type = ?1, num_guests = ?2, check_in_date = ?3,
                 check_out_date = ?4, room_number = ?5, floor = ?6, price_per_night = ?7,
                 total_price = ?8, updated_at = datetime('now')
             WHERE id = ?9",
            params![
                target_room_type,
                num_guests,
                check_in_date,
                check_out_date,
                room_number,
                floor,
                price_per_night,
                total_price,
                booking.id,
            ],
        )?;

        if updated != 1 {
            return Ok(error_payload("Failed to update booking. Please try again."));
        }

        tracing::info!(
            confirmation = %booking.confirmation_number,
            changes = ?changes,
            "booking updated"
        );

        Ok(json!({
            "success": true,
            "message": "Booking has been successfully updated.",
            "updated_booking": {
                "confirmation_number": booking.confirmation_number,
                "guest_name": booking.guest_name,
                "room_type": target_room_type,
                "room_number": room_number,
                "check_in_date": check_in_date,
                "check_out_date": check_out_date,
                "nights": nights,
                "num_guests": num_guests,
                "price_per_night": price_per_night,
                "total_price": total_price,
            },
            "changes_made": changes,
        }))
    }

    /// Cancel a reservation
    ///
    /// # Errors
    ///
    /// Returns error if a database operation fails.
    pub fn cancel_booking(&self, query: &LookupQuery) -> Result<Value> {
        if query.is_empty() {
            return Ok(error_payload(
                "Please provide a confirmation number, name, or email to find the booking.",
            ));
        }

        let conn = self.conn()?;
        let Some(booking) = find_one_exact(&conn, query)? else {
            return Ok(error_payload("No booking found with the provided information."));
        };

        if is_past_date(&booking.check_in_date) {
            return Ok(json!({
                "success": false,
                "error": "Cannot cancel a booking for a past date.",
                "booking": {
                    "confirmation_number": booking.confirmation_number,
                    "check_in_date": booking.check_in_date,
                    "status": booking.status,
                }
            }));
        }

        let deleted = conn.execute("DELETE FROM bookings WHERE id = ?1", [&booking.id])?;
        if deleted != 1 {
            return Ok(error_payload("Failed to cancel booking. Please try again."));
        }

        tracing::info!(confirmation = %booking.confirmation_number, "booking cancelled");

        Ok(json!({
            "success": true,
            "message": "Booking has been successfully cancelled and removed.",
            "cancelled_booking": {
                "confirmation_number": booking.confirmation_number,
                "guest_name": booking.guest_name,
                "room_number": booking.room_number,
                "room_type": booking.room_type,
                "check_in_date": booking.check_in_date,
                "check_out_date": booking.check_out_date,
            }
        }))
    }

    /// Add a special request to a reservation
    ///
    /// # Errors
    ///
    /// Returns error if a database operation fails.
    pub fn add_special_request(&self, query: &LookupQuery, request: &str) -> Result<Value> {
        if request.trim().is_empty() {
            return Ok(error_payload(
                "Please specify what special request you'd like to add.",
            ));
        }

        let lookup_method = if let Some(ref number) = query.confirmation_number {
            format!("confirmation number {number}")
        } else if let Some(ref email) = query.guest_email {
            format!("email {email}")
        } else if let Some(ref name) = query.guest_name {
            format!("name {name}")
        } else {
            return Ok(error_payload(
                "Please provide a confirmation number, guest name, or email to find the booking.",
            ));
        };

        let bookings = self.find_bookings(query, 1)?;
        let Some(booking) = bookings.first() else {
            return Ok(error_payload(&format!(
                "No booking found with {lookup_method}. Please verify the information."
            )));
        };

        let already_noted = booking
            .special_requests
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(request));
        if already_noted {
            return Ok(json!({
                "success": true,
                "message": format!("'{request}' is already noted on your reservation."),
                "confirmation_number": booking.confirmation_number,
                "guest_name": booking.guest_name,
                "all_requests": booking.special_requests,
            }));
        }

        let mut all_requests = booking.special_requests.clone();
        all_requests.push(request.to_string());
        let requests_json = serde_json::to_string(&all_requests)?;

        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE bookings SET special_requests = ?1, updated_at = datetime('now')
             WHERE id = ?2",
            params![requests_json, booking.id],
        )?;

        if updated == 0 {
            return Ok(error_payload(
                "Something went wrong while updating the booking. Please try again.",
            ));
        }

        Ok(json!({
            "success": true,
            "message": format!("I've added '{request}' to your reservation."),
            "confirmation_number": booking.confirmation_number,
            "guest_name": booking.guest_name,
            "all_requests": all_requests,
        }))
    }

    /// Fuzzy search, in priority order: confirmation, email, phone, name
    fn find_bookings(&self, query: &LookupQuery, limit: usize) -> Result<Vec<Booking>> {
        let conn = self.conn()?;

        let (clause, value): (&str, String) = if let Some(ref number) = query.confirmation_number {
            (
                "confirmation_number LIKE '%' || ?1 || '%' COLLATE NOCASE",
                number.clone(),
            )
        } else if let Some(ref email) = query.guest_email {
            ("guest_email = ?1 COLLATE NOCASE", email.clone())
        } else if let Some(ref phone) = query.guest_phone {
            (
                "REPLACE(REPLACE(REPLACE(REPLACE(REPLACE(guest_phone, '-', ''), ' ', ''), \
                 '(', ''), ')', ''), '+', '') LIKE '%' || ?1 || '%'",
                clean_phone(phone),
            )
        } else if let Some(ref name) = query.guest_name {
            ("guest_name LIKE '%' || ?1 || '%' COLLATE NOCASE", name.clone())
        } else {
            return Ok(Vec::new());
        };

        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE {clause}
             ORDER BY created_at LIMIT {limit}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let bookings = stmt
            .query_map([&value], booking_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(bookings)
    }

    fn conn(&self) -> Result<DbConn> {
        self.pool.get().map_err(|e| Error::Database(e.to_string()))
    }
}

/// Column list matching `booking_from_row`
const BOOKING_COLUMNS: &str = "id, confirmation_number, guest_name, guest_phone, guest_email, \
     room_number, room_type, floor, check_in_date, check_out_date, num_guests, \
     price_per_night, total_price, status, special_requests";

fn booking_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Booking> {
    let raw_requests: String = row.get(14)?;
    Ok(Booking {
        id: row.get(0)?,
        confirmation_number: row.get(1)?,
        guest_name: row.get(2)?,
        guest_phone: row.get(3)?,
        guest_email: row.get(4)?,
        room_number: row.get(5)?,
        room_type: row.get(6)?,
        floor: row.get(7)?,
        check_in_date: row.get(8)?,
        check_out_date: row.get(9)?,
        num_guests: row.get(10)?,
        price_per_night: row.get(11)?,
        total_price: row.get(12)?,
        status: row.get(13)?,
        special_requests: serde_json::from_str(&raw_requests).unwrap_or_default(),
    })
}

/// Exact search used for mutations: confirmation (uppercased), then email
/// (lowercased), then name substring
fn find_one_exact(conn: &DbConn, query: &LookupQuery) -> Result<Option<Booking>> {
    let (clause, value): (&str, String) = if let Some(ref number) = query.confirmation_number {
        ("confirmation_number = ?1", number.to_uppercase())
    } else if let Some(ref email) = query.guest_email {
        ("guest_email = ?1", email.to_lowercase())
    } else if let Some(ref name) = query.guest_name {
        ("guest_name LIKE '%' || ?1 || '%' COLLATE NOCASE", name.clone())
    } else {
        return Ok(None);
    };

    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE {clause} LIMIT 1");
    let booking = conn
        .query_row(&sql, [&value], booking_from_row)
        .optional()?;
    Ok(booking)
}

/// Rooms, optionally restricted to one type
fn load_rooms(conn: &DbConn, room_type: Option<&str>) -> Result<Vec<Room>> {
    let map_room = |row: &rusqlite::Row<'_>| -> rusqlite::Result<Room> {
        Ok(Room {
            room_number: row.get(0)?,
            room_type: row.get(1)?,
            floor: row.get(2)?,
            price_per_night: row.get(3)?,
            capacity: row.get(4)?,
        })
    };

    let rooms = if let Some(room_type) = room_type {
        let mut stmt = conn.prepare(
            "SELECT room_number, room_type, floor, price_per_night, capacity
             FROM rooms WHERE room_type = ?1",
        )?;
        stmt.query_map([room_type], map_room)?
            .collect::<rusqlite::Result<Vec<_>>>()?
    } else {
        let mut stmt = conn.prepare(
            "SELECT room_number, room_type, floor, price_per_night, capacity FROM rooms",
        )?;
        stmt.query_map([], map_room)?
            .collect::<rusqlite::Result<Vec<_>>>()?
    };

    Ok(rooms)
}

/// Room numbers with a reservation overlapping the date range.
///
/// Overlap rule: an existing stay conflicts when it starts before the
/// requested check-out and ends after the requested check-in.
fn booked_room_numbers(
    conn: &DbConn,
    check_in_date: &str,
    check_out_date: &str,
    room_type: Option<&str>,
    exclude_confirmation: Option<&str>,
) -> Result<std::collections::HashSet<i64>> {
    let mut sql = String::from(
        "SELECT room_number FROM bookings WHERE check_in_date < ?1 AND check_out_date > ?2",
    );
    let mut params: Vec<String> = vec![check_out_date.to_string(), check_in_date.to_string()];

    if let Some(room_type) = room_type {
        sql.push_str(" AND room_type = ?3");
        params.push(room_type.to_string());
        if let Some(confirmation) = exclude_confirmation {
            sql.push_str(" AND confirmation_number != ?4");
            params.push(confirmation.to_string());
        }
    } else if let Some(confirmation) = exclude_confirmation {
        sql.push_str(" AND confirmation_number != ?3");
        params.push(confirmation.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let numbers = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), |row| row.get(0))?
        .collect::<rusqlite::Result<std::collections::HashSet<i64>>>()?;
    Ok(numbers)
}

/// Next confirmation number in the `GV-2025-NNNNNN` sequence
fn next_confirmation_number(conn: &DbConn) -> Result<String> {
    let highest: Option<i64> = conn
        .query_row(
            "SELECT MAX(CAST(substr(confirmation_number, 9) AS INTEGER))
             FROM bookings WHERE confirmation_number LIKE 'GV-2025-%'",
            [],
            |row| row.get(0),
        )
        .optional()?
        .flatten();

    let next = highest.map_or(1001, |n| n + 1);
    Ok(format!("{CONFIRMATION_PREFIX}{next:06}"))
}

/// Guest capacity per room type
fn capacity_for(room_type: &str) -> i64 {
    match room_type {
        "deluxe" => 3,
        "suite" => 4,
        _ => 2,
    }
}

/// Strip common phone formatting characters before matching
fn clean_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !matches!(c, '-' | ' ' | '(' | ')' | '+'))
        .collect()
}

fn error_payload(message: &str) -> Value {
    json!({"success": false, "error": message})
}

fn is_past_date(date: &str) -> bool {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d < Local::now().date_naive())
        .unwrap_or(false)
}

/// Parse and validate a stay's date range.
///
/// Returns the parsed dates, or the guest-facing error message.
fn validate_date_range(
    check_in_date: &str,
    check_out_date: &str,
) -> std::result::Result<(NaiveDate, NaiveDate), String> {
    let check_in = NaiveDate::parse_from_str(check_in_date, "%Y-%m-%d");
    let check_out = NaiveDate::parse_from_str(check_out_date, "%Y-%m-%d");
    let (Ok(check_in), Ok(check_out)) = (check_in, check_out) else {
        return Err("Invalid date format. Please use YYYY-MM-DD format.".to_string());
    };

    if check_in >= check_out {
        return Err("Check-out date must be after check-in date.".to_string());
    }

    if check_in < Local::now().date_naive() {
        return Err("Check-in date cannot be in the past.".to_string());
    }

    Ok((check_in, check_out))
}

fn booking_json(booking: &Booking) -> Value {
    json!({
        "confirmation_number": booking.confirmation_number,
        "guest_name": booking.guest_name,
        "guest_email": booking.guest_email,
        "guest_phone": booking.guest_phone,
        "room_number": booking.room_number,
        "room_type": booking.room_type,
        "floor": booking.floor,
        "check_in_date": booking.check_in_date,
        "check_out_date": booking.check_out_date,
        "num_guests": booking.num_guests,
        "price_per_night": booking.price_per_night,
        "total_price": booking.total_price,
        "status": booking.status,
        "special_requests": booking.special_requests,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_map_matches_room_tiers() {
        assert_eq!(capacity_for("standard"), 2);
        assert_eq!(capacity_for("deluxe"), 3);
        assert_eq!(capacity_for("suite"), 4);
    }

    #[test]
    fn phone_cleaning_strips_formatting() {
        assert_eq!(clean_phone("+1 (555) 123-4567"), "15551234567");
    }

    #[test]
    fn date_validation_rejects_bad_input() {
        assert!(validate_date_range("not-a-date", "2099-01-02").is_err());
        assert!(validate_date_range("2099-01-02", "2099-01-01").is_err());
        assert!(validate_date_range("2000-01-01", "2099-01-01").is_err());
        assert!(validate_date_range("2099-01-01", "2099-01-05").is_ok());
    }
}
