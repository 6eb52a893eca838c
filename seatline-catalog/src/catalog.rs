use seatline_core::CoreError;
use seatline_shared::{Bus, BusId, Destination, Platform};
use std::collections::HashSet;

use crate::pricing::{PlatformPrices, PricingEntry};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("No pricing for destination: {0}")]
    NotFound(String),

    #[error("Duplicate destination: {0}")]
    DuplicateDestination(String),

    #[error("Price for {destination} on {platform} must be positive")]
    NonPositivePrice {
        destination: String,
        platform: Platform,
    },

    #[error("Duplicate bus id: {0}")]
    DuplicateBus(BusId),

    #[error("Bus {0} has no seats")]
    ZeroCapacity(BusId),

    #[error("Roster bus {0} must start with no booked seats")]
    PrebookedBus(BusId),
}

impl From<CatalogError> for CoreError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(destination) => CoreError::NotFound(destination),
            other => CoreError::InternalError(other.to_string()),
        }
    }
}

/// Static route, fare and fleet data. Nothing here is mutated after
/// construction; live seat state belongs to the ledger.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<PricingEntry>,
    roster: Vec<Bus>,
}

const REFERENCE_PRICING: [(&str, PlatformPrices); 4] = [
    ("Delhi → Jaipur", PlatformPrices { makemytrip: 550, redbus: 500, ixigo: 520, own: 480 }),
    ("Delhi → Chandigarh", PlatformPrices { makemytrip: 650, redbus: 600, ixigo: 620, own: 580 }),
    ("Delhi → Lucknow", PlatformPrices { makemytrip: 750, redbus: 700, ixigo: 720, own: 680 }),
    ("Delhi → Agra", PlatformPrices { makemytrip: 450, redbus: 400, ixigo: 420, own: 380 }),
];

const REFERENCE_ROSTER: [(BusId, &str, u32); 2] = [
    (1, "Express Deluxe A", 36),
    (2, "Express Deluxe B", 36),
];

impl Catalog {
    /// Build a catalog, rejecting duplicate routes, free fares and malformed
    /// roster entries.
    pub fn new(entries: Vec<PricingEntry>, roster: Vec<Bus>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.destination.clone()) {
                return Err(CatalogError::DuplicateDestination(entry.destination.to_string()));
            }
            if let Some(platform) = Platform::ALL.into_iter().find(|p| entry.prices.get(*p) == 0) {
                return Err(CatalogError::NonPositivePrice {
                    destination: entry.destination.to_string(),
                    platform,
                });
            }
        }

        let mut ids = HashSet::new();
        for bus in &roster {
            if !ids.insert(bus.id) {
                return Err(CatalogError::DuplicateBus(bus.id));
            }
            if bus.total_seats == 0 {
                return Err(CatalogError::ZeroCapacity(bus.id));
            }
            if !bus.booked_seats().is_empty() {
                return Err(CatalogError::PrebookedBus(bus.id));
            }
        }

        Ok(Self { entries, roster })
    }

    /// The four Delhi routes and two 36-seat buses.
    pub fn reference() -> Self {
        let entries = REFERENCE_PRICING
            .iter()
            .map(|(destination, prices)| PricingEntry {
                destination: Destination::from(*destination),
                prices: *prices,
            })
            .collect();
        let roster = REFERENCE_ROSTER
            .iter()
            .map(|(id, name, seats)| Bus::new(*id, *name, *seats))
            .collect();

        Self { entries, roster }
    }

    pub fn list_destinations(&self) -> Vec<Destination> {
        self.entries.iter().map(|e| e.destination.clone()).collect()
    }

    pub fn get_pricing(&self, destination: &Destination) -> Result<&PricingEntry, CatalogError> {
        self.entries
            .iter()
            .find(|e| &e.destination == destination)
            .ok_or_else(|| CatalogError::NotFound(destination.to_string()))
    }

    pub fn price_for(&self, destination: &Destination, platform: Platform) -> Result<u32, CatalogError> {
        Ok(self.get_pricing(destination)?.prices.get(platform))
    }

    /// The initial roster, as seeded on first run.
    pub fn list_buses(&self) -> &[Bus] {
        &self.roster
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_catalog_is_valid() {
        let reference = Catalog::reference();
        let rebuilt = Catalog::new(reference.entries.clone(), reference.roster.clone());
        assert!(rebuilt.is_ok());
        assert_eq!(reference.list_buses().len(), 2);
        assert!(reference.list_buses().iter().all(|b| b.total_seats == 36));
    }

    #[test]
    fn test_destinations_are_stable() {
        let catalog = Catalog::reference();
        let first = catalog.list_destinations();

        assert_eq!(first, catalog.list_destinations());
        assert_eq!(first.len(), 4);
        assert_eq!(first[0].as_str(), "Delhi → Jaipur");
        assert_eq!(first[3].as_str(), "Delhi → Agra");
    }

    #[test]
    fn test_pricing_lookup() {
        let catalog = Catalog::reference();
        let agra = Destination::from("Delhi → Agra");

        assert_eq!(catalog.price_for(&agra, Platform::Own), Ok(380));
        assert_eq!(catalog.price_for(&agra, Platform::MakeMyTrip), Ok(450));
        assert_eq!(
            catalog.get_pricing(&Destination::from("Delhi → Goa")).unwrap_err(),
            CatalogError::NotFound("Delhi → Goa".to_string())
        );
    }

    #[test]
    fn test_rejects_malformed_catalogs() {
        let entry = PricingEntry {
            destination: Destination::from("A → B"),
            prices: PlatformPrices { makemytrip: 1, redbus: 1, ixigo: 1, own: 1 },
        };

        let duplicated = Catalog::new(vec![entry.clone(), entry.clone()], vec![]);
        assert!(matches!(duplicated, Err(CatalogError::DuplicateDestination(_))));

        let mut free = entry.clone();
        free.prices.ixigo = 0;
        assert_eq!(
            Catalog::new(vec![free], vec![]).unwrap_err(),
            CatalogError::NonPositivePrice { destination: "A → B".to_string(), platform: Platform::Ixigo }
        );

        let buses = vec![Bus::new(1, "A", 36), Bus::new(1, "B", 36)];
        assert_eq!(Catalog::new(vec![entry], buses).unwrap_err(), CatalogError::DuplicateBus(1));
    }
}
