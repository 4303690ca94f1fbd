use std::fmt;

/// Known marketplace categories that get category-specific analysis
/// instructions. Anything unrecognised falls back to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceCategory {
    Hair,
    Nails,
    Makeup,
    Skincare,
    Lashes,
    Barber,
    Massage,
    Tattoo,
    Other,
}

const KEYWORDS: &[(&str, ServiceCategory)] = &[
    ("hair", ServiceCategory::Hair),
    ("haircare", ServiceCategory::Hair),
    ("hairstyling", ServiceCategory::Hair),
    ("hairdressing", ServiceCategory::Hair),
    ("braids", ServiceCategory::Hair),
    ("nail", ServiceCategory::Nails),
    ("nails", ServiceCategory::Nails),
    ("manicure", ServiceCategory::Nails),
    ("pedicure", ServiceCategory::Nails),
    ("makeup", ServiceCategory::Makeup),
    ("mua", ServiceCategory::Makeup),
    ("skin", ServiceCategory::Skincare),
    ("skincare", ServiceCategory::Skincare),
    ("facial", ServiceCategory::Skincare),
    ("facials", ServiceCategory::Skincare),
    ("esthetics", ServiceCategory::Skincare),
    ("lash", ServiceCategory::Lashes),
    ("lashes", ServiceCategory::Lashes),
    ("brows", ServiceCategory::Lashes),
    ("barber", ServiceCategory::Barber),
    ("barbering", ServiceCategory::Barber),
    ("massage", ServiceCategory::Massage),
    ("spa", ServiceCategory::Massage),
    ("tattoo", ServiceCategory::Tattoo),
    ("tattoos", ServiceCategory::Tattoo),
    ("piercing", ServiceCategory::Tattoo),
];

impl ServiceCategory {
    /// Maps a free-text category name onto a known category.
    ///
    /// The text is split on non-alphanumeric characters and the leftmost
    /// token that exactly matches a keyword decides, so
    /// `"haircare-and-nails"` is `Hair` and `"nails & hair"` is `Nails`.
    pub fn from_label(label: &str) -> Self {
        label
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .map(str::to_lowercase)
            .find_map(|token| {
                KEYWORDS
                    .iter()
                    .find(|(keyword, _)| *keyword == token)
                    .map(|(_, category)| *category)
            })
            .unwrap_or(ServiceCategory::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Hair => "hair",
            ServiceCategory::Nails => "nails",
            ServiceCategory::Makeup => "makeup",
            ServiceCategory::Skincare => "skincare",
            ServiceCategory::Lashes => "lashes",
            ServiceCategory::Barber => "barber",
            ServiceCategory::Massage => "massage",
            ServiceCategory::Tattoo => "tattoo",
            ServiceCategory::Other => "other",
        }
    }

    /// Category-specific instructions sent with the tagging request.
    pub fn analysis_hint(&self) -> &'static str {
        match self {
            ServiceCategory::Hair => {
                "Focus on hairstyle, cut, length, texture, colour technique and finish."
            }
            ServiceCategory::Nails => {
                "Focus on nail shape, length, finish, colour palette and nail art technique."
            }
            ServiceCategory::Makeup => {
                "Focus on makeup style, eye look, lip colour, coverage and occasion."
            }
            ServiceCategory::Skincare => {
                "Focus on treatment type, skin concern addressed and visible results."
            }
            ServiceCategory::Lashes => {
                "Focus on lash or brow style, volume, curl and length."
            }
            ServiceCategory::Barber => {
                "Focus on haircut style, fade type, beard grooming and line work."
            }
            ServiceCategory::Massage => {
                "Focus on treatment setting, technique and ambience."
            }
            ServiceCategory::Tattoo => {
                "Focus on tattoo style, placement, colour work and subject matter."
            }
            ServiceCategory::Other => {
                "Describe the service shown, its style and the visible result."
            }
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
