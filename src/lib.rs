//! Habit Inception: a habit tracker built around the Persian (Jalali) calendar.
//!
//! [`jalali`] converts between the Gregorian and Jalali calendars and
//! [`calendar`] lays Jalali months out on Saturday-first weeks. The remaining
//! modules make up the terminal app around them.

pub mod app;
pub mod calendar;
pub mod coach;
pub mod config;
pub mod db;
pub mod error;
pub mod habits;
pub mod jalali;
pub mod locale;
pub mod theme;
pub mod ui;
