/// Category buckets used to narrow the work queues by brand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BrandKey {
    #[default]
    All,
    LouisVuitton,
    Hermes,
    Chanel,
    Gucci,
}

pub const BRANDS: [BrandKey; 4] = [
    BrandKey::LouisVuitton,
    BrandKey::Hermes,
    BrandKey::Chanel,
    BrandKey::Gucci,
];

impl BrandKey {
    pub fn label(self) -> &'static str {
        match self {
            BrandKey::All => "ALL",
            BrandKey::LouisVuitton => "ルイヴィトン",
            BrandKey::Hermes => "エルメス",
            BrandKey::Chanel => "CHANEL",
            BrandKey::Gucci => "グッチ",
        }
    }

    /// Lower-case fragments searched for in the brand column.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            BrandKey::All => &[],
            BrandKey::LouisVuitton => &["louis vuitton", "ルイヴィトン"],
            BrandKey::Hermes => &["hermes", "エルメス"],
            BrandKey::Chanel => &["chanel", "シャネル"],
            BrandKey::Gucci => &["gucci", "グッチ"],
        }
    }

    /// Case-insensitive substring match; `All` matches everything.
    pub fn matches(self, brand_name: &str) -> bool {
        if self == BrandKey::All {
            return true;
        }
        let lower = brand_name.to_lowercase();
        self.keywords().iter().any(|kw| lower.contains(kw))
    }

    /// Accepts the label or a short ASCII alias (`lv`, `hermes`, ...).
    pub fn parse(input: &str) -> Option<Self> {
        let lower = input.trim().to_lowercase();
        match lower.as_str() {
            "all" => Some(BrandKey::All),
            "lv" | "louis" | "louisvuitton" | "ルイヴィトン" => Some(BrandKey::LouisVuitton),
            "hermes" | "エルメス" => Some(BrandKey::Hermes),
            "chanel" | "シャネル" => Some(BrandKey::Chanel),
            "gucci" | "グッチ" => Some(BrandKey::Gucci),
            _ => None,
        }
    }
}
