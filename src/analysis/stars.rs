//! Star Annotator
//!
//! Eleven auxiliary markers, each a pure lookup against the chart's branches.
//! Stem-keyed stars map the Day Master to a small set of target branches;
//! branch-keyed stars map one pillar's branch to a single partner branch.

use serde::{Deserialize, Serialize};

use crate::chart::{Branch, Chart, PillarRole, Stem};
use crate::error::BilingualText;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Star {
    HeavenlyNoble,
    Academic,
    Prosperity,
    YangBlade,
    GoldenCarriage,
    SupremeNoble,
    RedGlamour,
    TravelingHorse,
    RedPhoenix,
    Canopy,
    PeachBlossom,
}

/// Which chart value a star's table is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarKey {
    /// Reference stem used for relations.
    DayMaster,
    /// The day pillar's stem, named explicitly by the star's rule.
    DayStem,
    Branch(PillarRole),
    /// Triad of the day branch, falling back to the year branch.
    Triad,
}

impl Star {
    pub const ALL: [Star; 11] = [
        Star::HeavenlyNoble,
        Star::Academic,
        Star::Prosperity,
        Star::YangBlade,
        Star::GoldenCarriage,
        Star::SupremeNoble,
        Star::RedGlamour,
        Star::TravelingHorse,
        Star::RedPhoenix,
        Star::Canopy,
        Star::PeachBlossom,
    ];

    pub fn key(self) -> StarKey {
        match self {
            Star::HeavenlyNoble
            | Star::Academic
            | Star::Prosperity
            | Star::YangBlade
            | Star::GoldenCarriage => StarKey::DayMaster,
            Star::SupremeNoble | Star::RedGlamour => StarKey::DayStem,
            Star::TravelingHorse | Star::RedPhoenix => StarKey::Branch(PillarRole::Year),
            Star::Canopy => StarKey::Branch(PillarRole::Day),
            Star::PeachBlossom => StarKey::Triad,
        }
    }

    pub fn name(self) -> BilingualText {
        let (vi, en) = match self {
            Star::HeavenlyNoble => ("Thiên Ất Quý Nhân", "Heavenly Noble"),
            Star::Academic => ("Văn Xương", "Academic Star"),
            Star::Prosperity => ("Lộc Thần", "Prosperity Star"),
            Star::YangBlade => ("Dương Nhận", "Yang Blade"),
            Star::GoldenCarriage => ("Kim Dư", "Golden Carriage"),
            Star::SupremeNoble => ("Thái Cực Quý Nhân", "Supreme Noble"),
            Star::RedGlamour => ("Hồng Diễm", "Red Glamour"),
            Star::TravelingHorse => ("Dịch Mã", "Traveling Horse"),
            Star::RedPhoenix => ("Hồng Loan", "Red Phoenix"),
            Star::Canopy => ("Hoa Cái", "Canopy"),
            Star::PeachBlossom => ("Đào Hoa", "Peach Blossom"),
        };
        BilingualText::new(vi, en)
    }

    pub fn description(self) -> BilingualText {
        let (vi, en) = match self {
            Star::HeavenlyNoble => (
                "Quý nhân phù trợ, gặp khó có người giúp đỡ.",
                "Helpful people appear in times of difficulty.",
            ),
            Star::Academic => (
                "Thông minh, hiếu học, thuận lợi thi cử và văn chương.",
                "Intelligence and love of learning; favours exams and writing.",
            ),
            Star::Prosperity => (
                "Lộc ăn ổn định, nguồn thu bền vững.",
                "Steady livelihood and a stable source of income.",
            ),
            Star::YangBlade => (
                "Cương quyết, mạnh mẽ nhưng dễ nóng vội, cần tiết chế.",
                "Determined and forceful but prone to haste; needs restraint.",
            ),
            Star::GoldenCarriage => (
                "Được hưởng phúc, hôn nhân và gia đạo êm ấm.",
                "Blessed comfort and a harmonious marriage and household.",
            ),
            Star::SupremeNoble => (
                "Thiên hướng tâm linh, trực giác tốt, được che chở.",
                "Spiritual inclination, good intuition and protection.",
            ),
            Star::RedGlamour => (
                "Duyên dáng, đa tình, sức hút mạnh với người khác giới.",
                "Charm and romance; strong attraction to others.",
            ),
            Star::TravelingHorse => (
                "Hay di chuyển, thay đổi nơi ở hoặc công việc, lợi xuất ngoại.",
                "Frequent travel or relocation; favours work away from home.",
            ),
            Star::RedPhoenix => (
                "Hỷ sự, tình duyên và cưới hỏi.",
                "Joyful events, romance and marriage.",
            ),
            Star::Canopy => (
                "Cô độc, thích nghiên cứu, nghệ thuật và triết học.",
                "Solitude; affinity for research, art and philosophy.",
            ),
            Star::PeachBlossom => (
                "Đào hoa, duyên tình và khả năng giao tiếp.",
                "Romantic appeal and social charm.",
            ),
        };
        BilingualText::new(vi, en)
    }

    /// Target branches of a stem-keyed star. Empty for branch-keyed stars.
    fn stem_targets(self, stem: Stem) -> &'static [Branch] {
        use Branch::*;
        match self {
            Star::HeavenlyNoble => match stem {
                Stem::Giap | Stem::Mau | Stem::Canh => &[Suu, Mui],
                Stem::At | Stem::Ky => &[Ty, Than],
                Stem::Binh | Stem::Dinh => &[Hoi, Dau],
                Stem::Nham | Stem::Quy => &[Ti, Mao],
                Stem::Tan => &[Dan, Ngo],
            },
            Star::Academic => match stem {
                Stem::Giap => &[Ti],
                Stem::At => &[Ngo],
                Stem::Binh | Stem::Mau => &[Than],
                Stem::Dinh | Stem::Ky => &[Dau],
                Stem::Canh => &[Hoi],
                Stem::Tan => &[Ty],
                Stem::Nham => &[Dan],
                Stem::Quy => &[Mao],
            },
            Star::Prosperity => match stem {
                Stem::Giap => &[Dan],
                Stem::At => &[Mao],
                Stem::Binh | Stem::Mau => &[Ti],
                Stem::Dinh | Stem::Ky => &[Ngo],
                Stem::Canh => &[Than],
                Stem::Tan => &[Dau],
                Stem::Nham => &[Hoi],
                Stem::Quy => &[Ty],
            },
            Star::YangBlade => match stem {
                Stem::Giap => &[Mao],
                Stem::At => &[Thin],
                Stem::Binh | Stem::Mau => &[Ngo],
                Stem::Dinh | Stem::Ky => &[Mui],
                Stem::Canh => &[Dau],
                Stem::Tan => &[Tuat],
                Stem::Nham => &[Ty],
                Stem::Quy => &[Suu],
            },
            Star::GoldenCarriage => match stem {
                Stem::Giap => &[Thin],
                Stem::At => &[Ti],
                Stem::Binh | Stem::Mau => &[Mui],
                Stem::Dinh | Stem::Ky => &[Than],
                Stem::Canh => &[Tuat],
                Stem::Tan => &[Hoi],
                Stem::Nham => &[Suu],
                Stem::Quy => &[Dan],
            },
            Star::SupremeNoble => match stem {
                Stem::Giap | Stem::At => &[Ty, Ngo],
                Stem::Binh | Stem::Dinh => &[Mao, Dau],
                Stem::Mau | Stem::Ky => &[Thin, Tuat, Suu, Mui],
                Stem::Canh | Stem::Tan => &[Dan, Hoi],
                Stem::Nham | Stem::Quy => &[Ti, Than],
            },
            Star::RedGlamour => match stem {
                Stem::Giap | Stem::At => &[Ngo],
                Stem::Binh => &[Dan],
                Stem::Dinh => &[Mui],
                Stem::Mau | Stem::Ky => &[Thin],
                Stem::Canh => &[Tuat],
                Stem::Tan => &[Dau],
                Stem::Nham => &[Ty],
                Stem::Quy => &[Than],
            },
            Star::TravelingHorse | Star::RedPhoenix | Star::Canopy | Star::PeachBlossom => &[],
        }
    }

    /// Partner branch of a branch-keyed star.
    fn branch_partner(self, branch: Branch) -> Option<Branch> {
        use Branch::*;
        match self {
            Star::TravelingHorse => Some(match triad_of(branch)? {
                Triad::Water => Dan,
                Triad::Fire => Than,
                Triad::Metal => Hoi,
                Triad::Wood => Ti,
            }),
            Star::Canopy => Some(match triad_of(branch)? {
                Triad::Water => Thin,
                Triad::Fire => Tuat,
                Triad::Metal => Suu,
                Triad::Wood => Mui,
            }),
            Star::RedPhoenix => Some(match branch {
                Ty => Mao,
                Suu => Dan,
                Dan => Suu,
                Mao => Ty,
                Thin => Hoi,
                Ti => Tuat,
                Ngo => Dau,
                Mui => Than,
                Than => Mui,
                Dau => Ngo,
                Tuat => Ti,
                Hoi => Thin,
            }),
            _ => None,
        }
    }
}

/// The four three-branch groupings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Triad {
    /// Thân, Tý, Thìn
    Water,
    /// Dần, Ngọ, Tuất
    Fire,
    /// Tỵ, Dậu, Sửu
    Metal,
    /// Hợi, Mão, Mùi
    Wood,
}

impl Triad {
    /// Peach Blossom branch of the triad.
    pub fn blossom(self) -> Branch {
        match self {
            Triad::Water => Branch::Dau,
            Triad::Fire => Branch::Mao,
            Triad::Metal => Branch::Ngo,
            Triad::Wood => Branch::Ty,
        }
    }
}

/// Triad membership. Every branch belongs to one, but callers still handle `None`.
pub fn triad_of(branch: Branch) -> Option<Triad> {
    use Branch::*;
    match branch {
        Than | Ty | Thin => Some(Triad::Water),
        Dan | Ngo | Tuat => Some(Triad::Fire),
        Ti | Dau | Suu => Some(Triad::Metal),
        Hoi | Mao | Mui => Some(Triad::Wood),
    }
}

/// Outcome for one star. An empty `matched` list means the star is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarFinding {
    pub star: Star,
    pub name: BilingualText,
    pub present: bool,
    pub matched: Vec<Branch>,
    pub description: BilingualText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarResult {
    pub stars: Vec<StarFinding>,
}

impl StarResult {
    pub fn get(&self, star: Star) -> Option<&StarFinding> {
        self.stars.iter().find(|f| f.star == star)
    }

    pub fn is_present(&self, star: Star) -> bool {
        self.get(star).is_some_and(|f| f.present)
    }

    pub fn present(&self) -> impl Iterator<Item = &StarFinding> {
        self.stars.iter().filter(|f| f.present)
    }
}

/// Chart branches (hour, day, month, year order) that appear in `targets`, deduplicated.
fn matching_branches(chart: &Chart, targets: &[Branch]) -> Vec<Branch> {
    let mut matched = Vec::new();
    for branch in chart.branches() {
        if targets.contains(&branch) && !matched.contains(&branch) {
            matched.push(branch);
        }
    }
    matched
}

fn evaluate(star: Star, chart: &Chart) -> Vec<Branch> {
    match star.key() {
        StarKey::DayMaster => matching_branches(chart, star.stem_targets(chart.day_master())),
        StarKey::DayStem => matching_branches(chart, star.stem_targets(chart.day.stem)),
        StarKey::Branch(role) => match star.branch_partner(chart.pillar(role).branch) {
            Some(partner) => matching_branches(chart, &[partner]),
            None => Vec::new(),
        },
        StarKey::Triad => {
            let triad = triad_of(chart.day.branch).or_else(|| triad_of(chart.year.branch));
            match triad {
                Some(triad) => matching_branches(chart, &[triad.blossom()]),
                None => Vec::new(),
            }
        }
    }
}

/// Annotate the chart with all eleven stars. Total and deterministic.
pub fn annotate(chart: &Chart) -> StarResult {
    let stars = Star::ALL
        .into_iter()
        .map(|star| {
            let matched = evaluate(star, chart);
            StarFinding {
                star,
                name: star.name(),
                present: !matched.is_empty(),
                matched,
                description: star.description(),
            }
        })
        .collect();
    StarResult { stars }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{combination_at, validate};

    #[test]
    fn test_sample_chart_stars() {
        // Day Master Bính, branches Tý Dần Thìn Ngọ.
        let chart = validate("Giáp Tý", "Bính Dần", "Mậu Thìn", "Canh Ngọ").unwrap();
        let stars = annotate(&chart);
        assert_eq!(stars.stars.len(), 11);

        assert!(!stars.is_present(Star::HeavenlyNoble));
        assert!(!stars.is_present(Star::Prosperity));
        assert_eq!(stars.get(Star::YangBlade).unwrap().matched, vec![Branch::Ngo]);
        assert_eq!(stars.get(Star::RedGlamour).unwrap().matched, vec![Branch::Dan]);
        // Dần belongs to the fire triad: blossom Mão, canopy Tuất.
        assert!(!stars.is_present(Star::PeachBlossom));
        assert!(!stars.is_present(Star::Canopy));
        // Year branch Ngọ: horse Thân, phoenix Dậu.
        assert!(!stars.is_present(Star::TravelingHorse));
        assert!(!stars.is_present(Star::RedPhoenix));
    }

    #[test]
    fn test_peach_blossom_and_horse_present() {
        // Day branch Thân (water triad) → blossom Dậu; year branch Dần → horse Thân.
        let chart = validate("Quý Dậu", "Canh Thân", "Bính Tý", "Canh Dần").unwrap();
        let stars = annotate(&chart);
        assert_eq!(stars.get(Star::PeachBlossom).unwrap().matched, vec![Branch::Dau]);
        assert_eq!(stars.get(Star::TravelingHorse).unwrap().matched, vec![Branch::Than]);
        // Canh → noble Sửu/Mùi absent; prosperity Thân present.
        assert!(!stars.is_present(Star::HeavenlyNoble));
        assert_eq!(stars.get(Star::Prosperity).unwrap().matched, vec![Branch::Than]);
    }

    #[test]
    fn test_matches_are_deduplicated_in_pillar_order() {
        let chart = validate("Ất Mùi", "Giáp Thìn", "Tân Sửu", "Kỷ Mùi").unwrap();
        let stars = annotate(&chart);
        assert_eq!(stars.get(Star::HeavenlyNoble).unwrap().matched, vec![Branch::Mui, Branch::Suu]);
    }

    #[test]
    fn test_every_branch_has_a_triad() {
        for branch in Branch::ALL {
            assert!(triad_of(branch).is_some());
        }
        let blossoms: Vec<Branch> = [Triad::Water, Triad::Fire, Triad::Metal, Triad::Wood]
            .iter()
            .map(|t| t.blossom())
            .collect();
        assert_eq!(blossoms, vec![Branch::Dau, Branch::Mao, Branch::Ngo, Branch::Ty]);
    }

    #[test]
    fn test_stem_keyed_tables_are_exhaustive() {
        for star in Star::ALL {
            let stem_keyed = matches!(star.key(), StarKey::DayMaster | StarKey::DayStem);
            for stem in Stem::ALL {
                assert_eq!(!star.stem_targets(stem).is_empty(), stem_keyed);
            }
        }
    }

    #[test]
    fn test_annotation_is_total_and_deterministic() {
        for i in 0..60 {
            let chart = Chart::from_pairs(
                combination_at(i),
                combination_at(i + 13),
                combination_at(i + 29),
                combination_at(i + 41),
            )
            .unwrap();
            let first = annotate(&chart);
            let second = annotate(&chart);
            assert_eq!(first, second);
            assert_eq!(first.stars.len(), Star::ALL.len());
            for finding in &first.stars {
                assert_eq!(finding.present, !finding.matched.is_empty());
                assert!(finding.matched.iter().all(|b| chart.contains_branch(*b)));
            }
        }
    }

    #[test]
    fn test_result_deserializes() {
        let chart = validate("Giáp Tý", "Bính Dần", "Mậu Thìn", "Canh Ngọ").unwrap();
        let stars = annotate(&chart);
        let json = serde_json::to_string(&stars).unwrap();
        assert_eq!(serde_json::from_str::<StarResult>(&json).unwrap(), stars);

        let unknown_star = json.replacen("\"yang_blade\"", "\"lucky_cat\"", 1);
        assert!(serde_json::from_str::<StarResult>(&unknown_star).is_err());
        assert!(serde_json::from_str::<StarResult>("null").is_err());
    }
}
