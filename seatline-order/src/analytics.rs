use chrono::{Days, NaiveDate};
use seatline_shared::{Booking, Bus, BusId, Platform};
use serde::Serialize;

const DAILY_WINDOW: u64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStat {
    pub platform: Platform,
    pub name: &'static str,
    pub revenue: u64,
    pub bookings: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusStat {
    pub bus_id: BusId,
    pub name: String,
    pub booked: u32,
    pub available: u32,
    pub revenue: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    pub date: NaiveDate,
    pub bookings: usize,
    pub revenue: u64,
}

/// Read-only fold over the ledger and roster for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub total_bookings: usize,
    pub total_revenue: u64,
    pub total_seats_booked: usize,
    pub average_booking_value: u64,
    pub platforms: Vec<PlatformStat>,
    pub buses: Vec<BusStat>,
    /// Oldest day first, ending at `today`.
    pub daily: Vec<DailyStat>,
}

impl AdminSummary {
    pub fn compute(bookings: &[Booking], buses: &[Bus], today: NaiveDate) -> Self {
        let total_revenue: u64 = bookings.iter().map(|b| u64::from(b.total_price())).sum();
        let total_seats_booked = bookings.iter().map(|b| b.seats().len()).sum();
        let average_booking_value = if bookings.is_empty() {
            0
        } else {
            (total_revenue as f64 / bookings.len() as f64).round() as u64
        };

        // First-seen order, so the table reads the way bookings came in
        let mut platforms: Vec<PlatformStat> = Vec::new();
        for booking in bookings {
            let platform = booking.platform();
            let revenue = u64::from(booking.total_price());
            match platforms.iter_mut().find(|p| p.platform == platform) {
                Some(stat) => {
                    stat.revenue += revenue;
                    stat.bookings += 1;
                }
                None => platforms.push(PlatformStat {
                    platform,
                    name: platform.display_name(),
                    revenue,
                    bookings: 1,
                }),
            }
        }

        let buses = buses
            .iter()
            .map(|bus| BusStat {
                bus_id: bus.id,
                name: bus.name.clone(),
                booked: bus.booked_seats().len() as u32,
                available: bus.available_seats(),
                revenue: bookings
                    .iter()
                    .filter(|b| b.bus_id() == bus.id)
                    .map(|b| u64::from(b.total_price()))
                    .sum(),
            })
            .collect();

        let daily = (0..DAILY_WINDOW)
            .rev()
            .filter_map(|back| today.checked_sub_days(Days::new(back)))
            .map(|date| {
                let on_day = bookings
                    .iter()
                    .filter(|b| b.timestamp().date_naive() == date);
                let (count, revenue) = on_day.fold((0, 0u64), |(n, sum), b| {
                    (n + 1, sum + u64::from(b.total_price()))
                });
                DailyStat {
                    date,
                    bookings: count,
                    revenue,
                }
            })
            .collect();

        Self {
            total_bookings: bookings.len(),
            total_revenue,
            total_seats_booked,
            average_booking_value,
            platforms,
            buses,
            daily,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    fn booking(id: &str, bus_id: BusId, seats: &[u32], platform: Platform, price: u32, day: u32) -> Booking {
        Booking::new(
            id.to_string(),
            bus_id,
            "Delhi → Agra".into(),
            seats.iter().copied().collect::<BTreeSet<_>>(),
            platform,
            price,
            Utc.with_ymd_and_hms(2026, 3, day, 10, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn test_empty_ledger() {
        let buses = vec![Bus::new(1, "Express Deluxe A", 36)];
        let summary = AdminSummary::compute(&[], &buses, today());

        assert_eq!(summary.total_bookings, 0);
        assert_eq!(summary.average_booking_value, 0);
        assert!(summary.platforms.is_empty());
        assert_eq!(summary.buses[0].available, 36);
        assert_eq!(summary.daily.len(), 7);
        assert!(summary.daily.iter().all(|d| d.bookings == 0));
    }

    #[test]
    fn test_totals_and_breakdowns() {
        let bookings = vec![
            booking("a", 1, &[3, 4], Platform::Own, 380, 10),
            booking("b", 2, &[1], Platform::RedBus, 400, 9),
            booking("c", 1, &[5], Platform::Own, 380, 1),
        ];
        let mut bus_a = Bus::new(1, "Express Deluxe A", 36);
        bus_a.book(&[3, 4, 5]).unwrap();
        let mut bus_b = Bus::new(2, "Express Deluxe B", 36);
        bus_b.book(&[1]).unwrap();

        let summary = AdminSummary::compute(&bookings, &[bus_a, bus_b], today());

        assert_eq!(summary.total_bookings, 3);
        assert_eq!(summary.total_revenue, 760 + 400 + 380);
        assert_eq!(summary.total_seats_booked, 4);
        assert_eq!(summary.average_booking_value, 513);

        let names: Vec<&str> = summary.platforms.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Our Website", "RedBus"]);
        assert_eq!(summary.platforms[0].revenue, 1140);
        assert_eq!(summary.platforms[0].bookings, 2);

        assert_eq!(summary.buses[0].booked, 3);
        assert_eq!(summary.buses[0].available, 33);
        assert_eq!(summary.buses[0].revenue, 1140);

        // Mar 1 falls outside the window
        assert_eq!(summary.daily.first().unwrap().date, NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
        let last_two: Vec<(usize, u64)> = summary.daily[5..].iter().map(|d| (d.bookings, d.revenue)).collect();
        assert_eq!(last_two, vec![(1, 400), (1, 760)]);
        assert_eq!(summary.daily.iter().map(|d| d.bookings).sum::<usize>(), 2);
    }
}
