//! The fixed delivery route, ordered to follow midnight westward

use serde::{Deserialize, Serialize};

use crate::core::types::Position;

/// One city on the route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    pub id: String,
    pub city: String,
    pub country: String,
    pub country_code: String,
    pub location: Position,
    pub population: u64,
    pub estimated_gifts: u64,
    pub time_zone: String,
}

// city, country, code, lat, lng, population, time zone
type CityRow = (&'static str, &'static str, &'static str, f64, f64, u64, &'static str);

const WORLD_CITIES: &[CityRow] = &[
    // Pacific
    ("Auckland", "New Zealand", "NZ", -36.8485, 174.7633, 1_657_200, "Pacific/Auckland"),
    ("Sydney", "Australia", "AU", -33.8688, 151.2093, 5_312_000, "Australia/Sydney"),
    // Asia
    ("Tokyo", "Japan", "JP", 35.6762, 139.6503, 37_400_000, "Asia/Tokyo"),
    ("Seoul", "South Korea", "KR", 37.5665, 126.9780, 25_600_000, "Asia/Seoul"),
    ("Beijing", "China", "CN", 39.9042, 116.4074, 21_540_000, "Asia/Shanghai"),
    ("Shanghai", "China", "CN", 31.2304, 121.4737, 27_058_000, "Asia/Shanghai"),
    ("Hong Kong", "Hong Kong", "HK", 22.3193, 114.1694, 7_482_000, "Asia/Hong_Kong"),
    ("Singapore", "Singapore", "SG", 1.3521, 103.8198, 5_686_000, "Asia/Singapore"),
    ("Bangkok", "Thailand", "TH", 13.7563, 100.5018, 10_539_000, "Asia/Bangkok"),
    // India
    ("Mumbai", "India", "IN", 19.0760, 72.8777, 20_411_000, "Asia/Kolkata"),
    ("Delhi", "India", "IN", 28.7041, 77.1025, 30_291_000, "Asia/Kolkata"),
    ("Bangalore", "India", "IN", 12.9716, 77.5946, 12_442_000, "Asia/Kolkata"),
    // Middle East
    ("Dubai", "UAE", "AE", 25.2048, 55.2708, 3_331_000, "Asia/Dubai"),
    ("Riyadh", "Saudi Arabia", "SA", 24.7136, 46.6753, 7_231_000, "Asia/Riyadh"),
    ("Istanbul", "Turkey", "TR", 41.0082, 28.9784, 15_462_000, "Europe/Istanbul"),
    // Africa
    ("Cairo", "Egypt", "EG", 30.0444, 31.2357, 20_901_000, "Africa/Cairo"),
    ("Lagos", "Nigeria", "NG", 6.5244, 3.3792, 14_368_000, "Africa/Lagos"),
    ("Johannesburg", "South Africa", "ZA", -26.2041, 28.0473, 5_926_000, "Africa/Johannesburg"),
    ("Nairobi", "Kenya", "KE", -1.2864, 36.8172, 4_922_000, "Africa/Nairobi"),
    // Europe
    ("London", "United Kingdom", "GB", 51.5074, -0.1278, 9_304_000, "Europe/London"),
    ("Paris", "France", "FR", 48.8566, 2.3522, 11_020_000, "Europe/Paris"),
    ("Berlin", "Germany", "DE", 52.5200, 13.4050, 3_769_000, "Europe/Berlin"),
    ("Madrid", "Spain", "ES", 40.4168, -3.7038, 6_642_000, "Europe/Madrid"),
    ("Rome", "Italy", "IT", 41.9028, 12.4964, 4_342_000, "Europe/Rome"),
    ("Amsterdam", "Netherlands", "NL", 52.3676, 4.9041, 2_431_000, "Europe/Amsterdam"),
    ("Brussels", "Belgium", "BE", 50.8503, 4.3517, 2_081_000, "Europe/Brussels"),
    ("Stockholm", "Sweden", "SE", 59.3293, 18.0686, 1_632_000, "Europe/Stockholm"),
    ("Copenhagen", "Denmark", "DK", 55.6761, 12.5683, 1_346_000, "Europe/Copenhagen"),
    ("Moscow", "Russia", "RU", 55.7558, 37.6173, 12_538_000, "Europe/Moscow"),
    // South America
    ("São Paulo", "Brazil", "BR", -23.5505, -46.6333, 22_043_000, "America/Sao_Paulo"),
    ("Rio de Janeiro", "Brazil", "BR", -22.9068, -43.1729, 13_458_000, "America/Sao_Paulo"),
    ("Buenos Aires", "Argentina", "AR", -34.6037, -58.3816, 15_154_000, "America/Argentina/Buenos_Aires"),
    ("Lima", "Peru", "PE", -12.0464, -77.0428, 10_719_000, "America/Lima"),
    ("Bogotá", "Colombia", "CO", 4.7110, -74.0721, 10_978_000, "America/Bogota"),
    // North America
    ("New York", "United States", "US", 40.7128, -74.0060, 19_426_000, "America/New_York"),
    ("Los Angeles", "United States", "US", 34.0522, -118.2437, 13_310_000, "America/Los_Angeles"),
    ("Chicago", "United States", "US", 41.8781, -87.6298, 9_458_000, "America/Chicago"),
    ("Toronto", "Canada", "CA", 43.6532, -79.3832, 6_313_000, "America/Toronto"),
    ("Mexico City", "Mexico", "MX", 19.4326, -99.1332, 21_804_000, "America/Mexico_City"),
    ("Vancouver", "Canada", "CA", 49.2827, -123.1207, 2_632_000, "America/Vancouver"),
    ("San Francisco", "United States", "US", 37.7749, -122.4194, 4_749_000, "America/Los_Angeles"),
    ("Seattle", "United States", "US", 47.6062, -122.3321, 4_018_000, "America/Los_Angeles"),
];

/// Build the full route; every stop expects two gifts per resident
pub fn world_route() -> Vec<RouteStop> {
    WORLD_CITIES
        .iter()
        .enumerate()
        .map(
            |(index, &(city, country, country_code, lat, lng, population, time_zone))| RouteStop {
                id: format!("stop-{}", index + 1),
                city: city.to_string(),
                country: country.to_string(),
                country_code: country_code.to_string(),
                location: Position::new(lat, lng, 0.0),
                population,
                estimated_gifts: population * 2,
                time_zone: time_zone.to_string(),
            },
        )
        .collect()
}
