//! Element Registry
//!
//! Static element/polarity assignment for the 10 stems and 12 branches, plus the
//! hidden-stem sets concealed in each branch. Everything here is a closed
//! enumeration so lookups are exhaustive `match` expressions.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Read a symbol serialised by its Vietnamese name. Unknown names are errors.
pub(crate) fn deserialize_named<'de, D, T>(
    deserializer: D,
    kind: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let token: String = raw.trim().nfc().collect();
    parse(&token).ok_or_else(|| de::Error::custom(format!("unknown {}: {:?}", kind, raw)))
}

/// The five elemental categories, in generative-cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    /// The element this one generates (Wood → Fire → Earth → Metal → Water → Wood).
    pub fn generates(self) -> Element {
        match self {
            Element::Wood => Element::Fire,
            Element::Fire => Element::Earth,
            Element::Earth => Element::Metal,
            Element::Metal => Element::Water,
            Element::Water => Element::Wood,
        }
    }

    /// The element this one restrains (Wood ⊣ Earth ⊣ Water ⊣ Fire ⊣ Metal ⊣ Wood).
    pub fn restrains(self) -> Element {
        match self {
            Element::Wood => Element::Earth,
            Element::Earth => Element::Water,
            Element::Water => Element::Fire,
            Element::Fire => Element::Metal,
            Element::Metal => Element::Wood,
        }
    }

    pub fn vi_name(self) -> &'static str {
        match self {
            Element::Wood => "Mộc",
            Element::Fire => "Hỏa",
            Element::Earth => "Thổ",
            Element::Metal => "Kim",
            Element::Water => "Thủy",
        }
    }

    pub fn en_name(self) -> &'static str {
        match self {
            Element::Wood => "Wood",
            Element::Fire => "Fire",
            Element::Earth => "Earth",
            Element::Metal => "Metal",
            Element::Water => "Water",
        }
    }

    /// Parse a Vietnamese element name (expects NFC input).
    pub fn parse(token: &str) -> Option<Element> {
        Element::ALL.into_iter().find(|e| e.vi_name() == token)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.vi_name())
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.vi_name())
    }
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_named(deserializer, "element", Element::parse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Yang,
    Yin,
}

impl Polarity {
    fn from_index(index: usize) -> Self {
        if index % 2 == 0 {
            Polarity::Yang
        } else {
            Polarity::Yin
        }
    }
}

/// Heavenly Stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stem {
    Giap,
    At,
    Binh,
    Dinh,
    Mau,
    Ky,
    Canh,
    Tan,
    Nham,
    Quy,
}

impl Stem {
    pub const ALL: [Stem; 10] = [
        Stem::Giap,
        Stem::At,
        Stem::Binh,
        Stem::Dinh,
        Stem::Mau,
        Stem::Ky,
        Stem::Canh,
        Stem::Tan,
        Stem::Nham,
        Stem::Quy,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Stem {
        Stem::ALL[index % Stem::ALL.len()]
    }

    pub fn element(self) -> Element {
        match self {
            Stem::Giap | Stem::At => Element::Wood,
            Stem::Binh | Stem::Dinh => Element::Fire,
            Stem::Mau | Stem::Ky => Element::Earth,
            Stem::Canh | Stem::Tan => Element::Metal,
            Stem::Nham | Stem::Quy => Element::Water,
        }
    }

    pub fn polarity(self) -> Polarity {
        Polarity::from_index(self.index())
    }

    pub fn name(self) -> &'static str {
        match self {
            Stem::Giap => "Giáp",
            Stem::At => "Ất",
            Stem::Binh => "Bính",
            Stem::Dinh => "Đinh",
            Stem::Mau => "Mậu",
            Stem::Ky => "Kỷ",
            Stem::Canh => "Canh",
            Stem::Tan => "Tân",
            Stem::Nham => "Nhâm",
            Stem::Quy => "Quý",
        }
    }

    /// Parse a stem literal (expects NFC input).
    pub fn parse(token: &str) -> Option<Stem> {
        Stem::ALL.into_iter().find(|s| s.name() == token)
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Stem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Stem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_named(deserializer, "stem", Stem::parse)
    }
}

/// Earthly Branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Branch {
    Ty,
    Suu,
    Dan,
    Mao,
    Thin,
    Ti,
    Ngo,
    Mui,
    Than,
    Dau,
    Tuat,
    Hoi,
}

impl Branch {
    pub const ALL: [Branch; 12] = [
        Branch::Ty,
        Branch::Suu,
        Branch::Dan,
        Branch::Mao,
        Branch::Thin,
        Branch::Ti,
        Branch::Ngo,
        Branch::Mui,
        Branch::Than,
        Branch::Dau,
        Branch::Tuat,
        Branch::Hoi,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Branch {
        Branch::ALL[index % Branch::ALL.len()]
    }

    pub fn element(self) -> Element {
        match self {
            Branch::Ty | Branch::Hoi => Element::Water,
            Branch::Dan | Branch::Mao => Element::Wood,
            Branch::Ti | Branch::Ngo => Element::Fire,
            Branch::Than | Branch::Dau => Element::Metal,
            Branch::Suu | Branch::Thin | Branch::Mui | Branch::Tuat => Element::Earth,
        }
    }

    pub fn polarity(self) -> Polarity {
        Polarity::from_index(self.index())
    }

    /// Concealed stems, main influence first. Each weighs 0.3 in the tally.
    pub fn hidden_stems(self) -> &'static [Stem] {
        match self {
            Branch::Ty => &[Stem::Quy],
            Branch::Suu => &[Stem::Ky, Stem::Quy, Stem::Tan],
            Branch::Dan => &[Stem::Giap, Stem::Binh, Stem::Mau],
            Branch::Mao => &[Stem::At],
            Branch::Thin => &[Stem::Mau, Stem::At, Stem::Quy],
            Branch::Ti => &[Stem::Binh, Stem::Canh, Stem::Mau],
            Branch::Ngo => &[Stem::Dinh, Stem::Ky],
            Branch::Mui => &[Stem::Ky, Stem::Dinh, Stem::At],
            Branch::Than => &[Stem::Canh, Stem::Nham, Stem::Mau],
            Branch::Dau => &[Stem::Tan],
            Branch::Tuat => &[Stem::Mau, Stem::Tan, Stem::Dinh],
            Branch::Hoi => &[Stem::Nham, Stem::Giap],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Branch::Ty => "Tý",
            Branch::Suu => "Sửu",
            Branch::Dan => "Dần",
            Branch::Mao => "Mão",
            Branch::Thin => "Thìn",
            Branch::Ti => "Tỵ",
            Branch::Ngo => "Ngọ",
            Branch::Mui => "Mùi",
            Branch::Than => "Thân",
            Branch::Dau => "Dậu",
            Branch::Tuat => "Tuất",
            Branch::Hoi => "Hợi",
        }
    }

    /// Zodiac animal, used by the English templates.
    pub fn animal(self) -> &'static str {
        match self {
            Branch::Ty => "Rat",
            Branch::Suu => "Ox",
            Branch::Dan => "Tiger",
            Branch::Mao => "Rabbit",
            Branch::Thin => "Dragon",
            Branch::Ti => "Snake",
            Branch::Ngo => "Horse",
            Branch::Mui => "Goat",
            Branch::Than => "Monkey",
            Branch::Dau => "Rooster",
            Branch::Tuat => "Dog",
            Branch::Hoi => "Pig",
        }
    }

    /// Parse a branch literal (expects NFC input).
    pub fn parse(token: &str) -> Option<Branch> {
        Branch::ALL.into_iter().find(|b| b.name() == token)
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Branch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Branch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_named(deserializer, "branch", Branch::parse)
    }
}
