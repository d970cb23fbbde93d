/// Display asset for the main weather image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetId {
    Sunny,
    Cloudy,
    CloudyPartly,
    Rainy,
}

impl AssetId {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetId::Sunny => "sunny",
            AssetId::Cloudy => "cloudy",
            AssetId::CloudyPartly => "cloudy_partly",
            AssetId::Rainy => "rainy",
        }
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a provider icon code (day or night variant) to an asset.
///
/// Returns `None` for codes outside the table; the caller keeps whatever
/// icon it was already showing.
pub fn map_icon_code(code: &str) -> Option<AssetId> {
    match code {
        "01d" | "01n" => Some(AssetId::Sunny),
        "02d" | "02n" | "04d" | "04n" => Some(AssetId::Cloudy),
        "03d" | "03n" => Some(AssetId::CloudyPartly),
        "09d" | "09n" | "10d" | "10n" => Some(AssetId::Rainy),
        _ => None,
    }
}
