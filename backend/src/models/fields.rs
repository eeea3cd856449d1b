//! Canonical field catalogue of the automobile dataset.
//!
//! Source files are mapped onto these names by header, never by column
//! position. Both the canonical spelling and the UCI `imports-85` spelling
//! (`make`, `drive-wheels`, `num-of-doors`...) are accepted.

pub const SYMBOLING: &str = "symboling";
pub const NORMALIZED_LOSSES: &str = "Normalized_Losses";
pub const BRAND: &str = "Brand";
pub const FUEL_TYPE: &str = "Fuel_Type";
pub const ASPIRATION: &str = "Aspiration";
pub const NUM_OF_DOORS: &str = "Num_of_Doors";
pub const BODY_STYLE: &str = "Body_Style";
pub const DRIVE_TYPE: &str = "Drive_Type";
pub const ENGINE_LOCATION: &str = "Engine_Location";
pub const WHEEL_BASE: &str = "Wheel_Base";
pub const LENGTH: &str = "Length";
pub const WIDTH: &str = "Width";
pub const HEIGHT: &str = "Height";
pub const CURB_WEIGHT: &str = "Curb_Weight";
pub const ENGINE_TYPE: &str = "Engine_Type";
pub const NUM_OF_CYLINDERS: &str = "Num_of_Cylinders";
pub const ENGINE_SIZE: &str = "Engine_Size";
pub const FUEL_SYSTEM: &str = "Fuel_System";
pub const BORE: &str = "Bore";
pub const STROKE: &str = "Stroke";
pub const COMPRESSION_RATIO: &str = "Compression_Ratio";
pub const HORSEPOWER: &str = "Horsepower";
pub const PEAK_RPM: &str = "Peak_RPM";
pub const CITY_MPG: &str = "City_MPG";
pub const HIGHWAY_MPG: &str = "Highway_MPG";
pub const PRICE: &str = "Price";

/// All canonical columns, in the order of the published dataset.
pub const ALL: [&str; 26] = [
    SYMBOLING,
    NORMALIZED_LOSSES,
    BRAND,
    FUEL_TYPE,
    ASPIRATION,
    NUM_OF_DOORS,
    BODY_STYLE,
    DRIVE_TYPE,
    ENGINE_LOCATION,
    WHEEL_BASE,
    LENGTH,
    WIDTH,
    HEIGHT,
    CURB_WEIGHT,
    ENGINE_TYPE,
    NUM_OF_CYLINDERS,
    ENGINE_SIZE,
    FUEL_SYSTEM,
    BORE,
    STROKE,
    COMPRESSION_RATIO,
    HORSEPOWER,
    PEAK_RPM,
    CITY_MPG,
    HIGHWAY_MPG,
    PRICE,
];

/// Columns coerced to numbers while cleaning. Anything that fails to parse
/// becomes missing.
pub const NUMERIC: [&str; 16] = [
    SYMBOLING,
    NORMALIZED_LOSSES,
    WHEEL_BASE,
    LENGTH,
    WIDTH,
    HEIGHT,
    CURB_WEIGHT,
    ENGINE_SIZE,
    BORE,
    STROKE,
    COMPRESSION_RATIO,
    HORSEPOWER,
    PEAK_RPM,
    CITY_MPG,
    HIGHWAY_MPG,
    PRICE,
];

/// Columns the analysis cannot run without.
pub const REQUIRED: [&str; 6] = [BRAND, BODY_STYLE, DRIVE_TYPE, FUEL_TYPE, HORSEPOWER, PRICE];

/// Header spellings that differ from the canonical name after normalization.
const ALIASES: [(&str, &str); 2] = [("make", BRAND), ("drive_wheels", DRIVE_TYPE)];

/// Normalize a raw header: trim, lowercase, `-` and spaces to `_`.
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('"')
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

/// Resolve a raw header to its canonical column name.
pub fn resolve(raw: &str) -> Option<&'static str> {
    let normalized = normalize_header(raw);

    if let Some((_, canonical)) = ALIASES.iter().find(|(alias, _)| *alias == normalized) {
        return Some(*canonical);
    }

    ALL.iter()
        .copied()
        .find(|name| name.to_lowercase() == normalized)
}

pub fn is_numeric(field: &str) -> bool {
    NUMERIC.contains(&field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_canonical_names() {
        assert_eq!(resolve("Price"), Some(PRICE));
        assert_eq!(resolve("Body_Style"), Some(BODY_STYLE));
        assert_eq!(resolve(" peak_rpm "), Some(PEAK_RPM));
    }

    #[test]
    fn test_resolve_uci_spelling() {
        assert_eq!(resolve("make"), Some(BRAND));
        assert_eq!(resolve("drive-wheels"), Some(DRIVE_TYPE));
        assert_eq!(resolve("num-of-doors"), Some(NUM_OF_DOORS));
        assert_eq!(resolve("normalized-losses"), Some(NORMALIZED_LOSSES));
        assert_eq!(resolve("\"body-style\""), Some(BODY_STYLE));
    }

    #[test]
    fn test_unknown_header() {
        assert_eq!(resolve("colour"), None);
    }

    #[test]
    fn test_numeric_catalogue() {
        assert!(is_numeric(PRICE));
        assert!(is_numeric(HORSEPOWER));
        assert!(!is_numeric(BRAND));
        assert!(NUMERIC.iter().all(|f| ALL.contains(f)));
    }
}
