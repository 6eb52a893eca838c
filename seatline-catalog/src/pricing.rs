use seatline_shared::{Destination, Platform};
use serde::{Deserialize, Serialize};

/// Price per seat on every platform. A struct rather than a map, so an entry
/// cannot be missing a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformPrices {
    pub makemytrip: u32,
    pub redbus: u32,
    pub ixigo: u32,
    pub own: u32,
}

impl PlatformPrices {
    pub fn get(&self, platform: Platform) -> u32 {
        match platform {
            Platform::MakeMyTrip => self.makemytrip,
            Platform::RedBus => self.redbus,
            Platform::Ixigo => self.ixigo,
            Platform::Own => self.own,
        }
    }

    /// Cheapest platform; ties go to the earlier one in display order.
    pub fn cheapest(&self) -> (Platform, u32) {
        Platform::ALL
            .into_iter()
            .map(|p| (p, self.get(p)))
            .fold((Platform::MakeMyTrip, self.makemytrip), |best, current| {
                if current.1 < best.1 {
                    current
                } else {
                    best
                }
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingEntry {
    pub destination: Destination,
    pub prices: PlatformPrices,
}

/// One card of the price comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub platform: Platform,
    pub name: &'static str,
    pub price_per_seat: u32,
    pub total_price: u64,
    pub is_popular: bool,
}

impl PricingEntry {
    /// Quotes for `seat_count` seats, in platform display order.
    pub fn quotes(&self, seat_count: u32) -> Vec<PriceQuote> {
        Platform::ALL
            .into_iter()
            .map(|platform| {
                let price_per_seat = self.prices.get(platform);
                PriceQuote {
                    platform,
                    name: platform.display_name(),
                    price_per_seat,
                    total_price: u64::from(price_per_seat) * u64::from(seat_count),
                    is_popular: platform.is_popular(),
                }
            })
            .collect()
    }
}
