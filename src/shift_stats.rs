//! Shift closure: per-guest snapshots and adult-unit counts for one shift.

use chrono::{DateTime, TimeZone, Timelike};
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::models::{Guest, GuestCheckinSnapshot, ShiftData, ShiftSummary};

/// Membership tiers treated as VIP ("high members").
pub const HIGH_MEMBER_CODES: [&str; 3] = ["P6", "X4", "X5"];

pub const INTERVAL_MINUTES: u32 = 15;

pub const STATUS_INCLUDED: &str = "included";
pub const STATUS_EXCLUDED: &str = "excluded";

pub fn is_high_member(membership: Option<&str>) -> bool {
    membership
        .map(str::trim)
        .is_some_and(|code| HIGH_MEMBER_CODES.iter().any(|c| c.eq_ignore_ascii_case(code)))
}

/// `HH:MM` label of the quarter hour `at` falls in.
pub fn interval_label<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    let minute = at.minute() / INTERVAL_MINUTES * INTERVAL_MINUTES;
    format!("{:02}:{:02}", at.hour(), minute)
}

/// Aggregates the guests of a shift as closed at `now`.
///
/// The shift date and the check-in buckets both use `now`'s time zone, so a
/// shift closed just after local midnight is dated on the new local day.
/// A VIP guest always counts as included, whatever status was stored.
pub fn generate_shift_data<Tz>(guests: &[Guest], now: &DateTime<Tz>) -> ShiftData
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut summary = ShiftSummary::default();
    let mut snapshots = BTreeMap::new();

    for guest in guests {
        let adult_units = guest.adult_units();
        let adults = u64::from(adult_units);
        let vip = is_high_member(guest.membership.as_deref());
        let status = guest.status.as_deref();
        let included = vip || status == Some(STATUS_INCLUDED);
        let excluded = !vip && status == Some(STATUS_EXCLUDED);

        summary.total_count += adults;
        if guest.checked {
            summary.checked_in_count += adults;
        }
        if vip {
            summary.high_member_count += adults;
        }
        if included {
            summary.included_count += adults;
            if guest.checked {
                summary.included_checked_in_count += adults;
            }
        }
        if excluded {
            summary.excluded_count += adults;
            if guest.checked {
                summary.excluded_checked_in_count += adults;
            }
        }
        if status == Some(STATUS_INCLUDED) && !vip {
            summary.non_vip_included_count += adults;
        }

        snapshots.insert(
            guest.id,
            GuestCheckinSnapshot {
                room: guest.room.clone(),
                status: guest.status.clone(),
                membership: guest.membership.clone(),
                adults: adult_units,
                checked: guest.checked,
                checkin_time: guest.timestamp,
                stay_duration: guest.stay_duration,
            },
        );

        if let (true, Some(ts)) = (guest.checked, guest.timestamp) {
            let label = interval_label(&ts.with_timezone(&now.timezone()));
            *summary.checkins_per_interval.entry(label).or_insert(0) += adults;
        }
    }

    summary.closed = true;
    summary.closed_at = now.to_rfc3339();

    tracing::debug!(
        guests = guests.len(),
        total = summary.total_count,
        checked_in = summary.checked_in_count,
        "shift data generated"
    );

    ShiftData {
        date: now.format("%Y-%m-%d").to_string(),
        guest_checkin_snapshots: snapshots,
        summary,
    }
}
