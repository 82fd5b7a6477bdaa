//! Closed sets of crops and countries the prediction model was trained on.

pub const CROP_ITEMS: &[&str] = &[
    "Cassava",
    "Maize",
    "Plantains and others",
    "Potatoes",
    "Rice, paddy",
    "Sorghum",
    "Soybeans",
    "Sweet potatoes",
    "Wheat",
    "Yams",
];

pub const COUNTRIES: &[&str] = &[
    "Albania",
    "Algeria",
    "Angola",
    "Argentina",
    "Armenia",
    "Australia",
    "Austria",
    "Azerbaijan",
    "Bahamas",
    "Bahrain",
    "Bangladesh",
    "Belarus",
    "Belgium",
    "Botswana",
    "Brazil",
    "Bulgaria",
    "Burkina Faso",
    "Burundi",
    "Cameroon",
    "Canada",
    "Central African Republic",
    "Chile",
    "Colombia",
    "Croatia",
    "Denmark",
    "Dominican Republic",
    "Ecuador",
    "Egypt",
    "El Salvador",
    "Eritrea",
    "Estonia",
    "Finland",
    "France",
    "Germany",
    "Ghana",
    "Greece",
    "Guatemala",
    "Guinea",
    "Guyana",
    "Haiti",
    "Honduras",
    "Hungary",
    "India",
    "Indonesia",
    "Iraq",
    "Ireland",
    "Italy",
    "Jamaica",
    "Japan",
    "Kazakhstan",
    "Kenya",
    "Latvia",
    "Lebanon",
    "Lesotho",
    "Libya",
    "Lithuania",
    "Madagascar",
    "Malawi",
    "Malaysia",
    "Mali",
    "Mauritania",
    "Mauritius",
    "Mexico",
    "Montenegro",
    "Morocco",
    "Mozambique",
    "Namibia",
    "Nepal",
    "Netherlands",
    "New Zealand",
    "Nicaragua",
    "Niger",
    "Norway",
    "Pakistan",
    "Papua New Guinea",
    "Peru",
    "Poland",
    "Portugal",
    "Qatar",
    "Romania",
    "Rwanda",
    "Saudi Arabia",
    "Senegal",
    "Slovenia",
    "South Africa",
    "Spain",
    "Sri Lanka",
    "Sudan",
    "Suriname",
    "Sweden",
    "Switzerland",
    "Tajikistan",
    "Thailand",
    "Tunisia",
    "Turkey",
    "Uganda",
    "Ukraine",
    "United Kingdom",
    "Uruguay",
    "Zambia",
    "Zimbabwe",
];

/// Resolve a crop name to its catalogue spelling, ignoring case.
pub fn canonical_crop(name: &str) -> Option<&'static str> {
    find_ignore_case(CROP_ITEMS, name)
}

/// Resolve a country name to its catalogue spelling, ignoring case.
pub fn canonical_country(name: &str) -> Option<&'static str> {
    find_ignore_case(COUNTRIES, name)
}

pub fn crop_index(name: &str) -> Option<usize> {
    CROP_ITEMS
        .iter()
        .position(|c| c.eq_ignore_ascii_case(name.trim()))
}

pub fn country_index(name: &str) -> Option<usize> {
    COUNTRIES
        .iter()
        .position(|c| c.eq_ignore_ascii_case(name.trim()))
}

fn find_ignore_case(set: &'static [&'static str], name: &str) -> Option<&'static str> {
    let name = name.trim();
    set.iter().copied().find(|c| c.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_sizes() {
        assert_eq!(CROP_ITEMS.len(), 10);
        assert_eq!(COUNTRIES.len(), 101);
    }

    #[test]
    fn canonical_crop_ignores_case_and_whitespace() {
        assert_eq!(canonical_crop("wheat"), Some("Wheat"));
        assert_eq!(canonical_crop("  RICE, PADDY "), Some("Rice, paddy"));
        assert_eq!(canonical_crop("barley"), None);
        assert_eq!(canonical_crop(""), None);
    }

    #[test]
    fn canonical_country_ignores_case() {
        assert_eq!(canonical_country("india"), Some("India"));
        assert_eq!(canonical_country("united kingdom"), Some("United Kingdom"));
        assert_eq!(canonical_country("Atlantis"), None);
    }

    #[test]
    fn indexes_match_catalogue_order() {
        assert_eq!(crop_index("Cassava"), Some(0));
        assert_eq!(crop_index("yams"), Some(CROP_ITEMS.len() - 1));
        assert_eq!(country_index("Zimbabwe"), Some(COUNTRIES.len() - 1));
        assert_eq!(country_index("nowhere"), None);
    }
}
