/// Countries shown in Fahrenheit. Deliberately short; not a locale table.
const FAHRENHEIT_COUNTRIES: &[&str] = &["US", "UK", "LR", "MM"];

pub const CELSIUS: &str = "°C";
pub const FAHRENHEIT: &str = "°F";

/// Temperature suffix for a country code. Exact, case-sensitive match.
pub fn select_unit_suffix(country_code: &str) -> &'static str {
    if FAHRENHEIT_COUNTRIES.contains(&country_code) { FAHRENHEIT } else { CELSIUS }
}
