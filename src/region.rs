//! Static region roster.
//!
//! Regions are defined at startup and never persisted; only derived data
//! (discovered slides, viewed flags) goes to the store. The bonus region is
//! hidden until every base region has been viewed.

use once_cell::sync::Lazy;

/// One entry in the tour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Stable unique identifier.
    pub id: String,
    /// Human-readable name shown on the card.
    pub display_name: String,
    /// Short code shown on the license-plate element.
    pub display_code: String,
    /// Key used to locate the card's ornament image.
    pub ornament_key: String,
    /// Remote path segment probed for this region's slides.
    pub folder_name: String,
}

impl Region {
    pub fn new(id: &str, display_name: &str, display_code: &str, ornament_key: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            display_code: display_code.to_string(),
            ornament_key: ornament_key.to_string(),
            // Folder names match ids on the reference host.
            folder_name: id.to_string(),
        }
    }
}

/// Base regions, shown from the first visit.
pub static BASE_REGIONS: Lazy<Vec<Region>> = Lazy::new(|| {
    vec![
        Region::new("Samara", "Самара", "#63", "samara"),
        Region::new("SPB", "Санкт-Петербург", "#78", "spb"),
        Region::new("Vladivostok", "Владивосток", "#25", "vladivostok"),
        Region::new("Jamal", "ЯНАО", "#89", "yanao"),
        Region::new("Krasnodar", "Краснодар", "#23", "krasnodar"),
        Region::new("NN", "Нижний Новгород", "#52", "nn"),
        Region::new("Novosib", "Новосибирск", "#54", "novosib"),
        Region::new("Arhangelsk", "Архангельск", "#29", "arhangelsk"),
    ]
});

/// Hidden bonus region, unlocked by the split transition.
pub static BONUS_REGION: Lazy<Region> =
    Lazy::new(|| Region::new("Kirovskaja", "Кировская область", "#43", "kirovskaja"));

/// Number of regions that must be viewed before the split transition.
pub fn base_region_count() -> usize {
    BASE_REGIONS.len()
}
