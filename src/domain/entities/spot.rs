use serde::{Deserialize, Serialize};

/// A named, geolocated surf break tracked by the service.
///
/// Spots are reference data: created once by the seeding step, never mutated
/// afterwards. The region string drives the topology wind adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spot {
    pub id: String,
    pub name: String,
    pub region: String,
    pub lat: f64,
    pub lng: f64,
}

impl Spot {
    pub fn new(id: &str, name: &str, region: &str, lat: f64, lng: f64) -> Self {
        Spot {
            id: id.to_string(),
            name: name.to_string(),
            region: region.to_string(),
            lat,
            lng,
        }
    }
}

/// Built-in catalog seeded into storage at startup.
pub fn default_catalog() -> Vec<Spot> {
    vec![
        Spot::new(
            "hossegor",
            "La Gravière",
            "Landes",
            43.6645,
            -1.4427,
        ),
        Spot::new(
            "seignosse",
            "Les Estagnots",
            "Landes",
            43.6912,
            -1.4445,
        ),
        Spot::new(
            "biarritz",
            "Côte des Basques",
            "Pays Basque",
            43.4789,
            -1.5686,
        ),
        Spot::new(
            "la-torche",
            "Pointe de la Torche",
            "Bretagne",
            47.8386,
            -4.3522,
        ),
        Spot::new(
            "la-baule",
            "Plage Benoît",
            "Pays de la Loire",
            47.2792,
            -2.3898,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_has_unique_ids() {
        let catalog = default_catalog();
        let mut ids: Vec<&str> = catalog.iter().map(|s| s.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_default_catalog_coordinates_are_on_the_french_coast() {
        for spot in default_catalog() {
            assert!(spot.lat > 42.0 && spot.lat < 49.0, "{}", spot.id);
            assert!(spot.lng > -5.0 && spot.lng < 0.0, "{}", spot.id);
        }
    }
}
