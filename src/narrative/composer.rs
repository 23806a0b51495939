//! Narrative Composer
//!
//! Renders the computed tally, relations and stars into bilingual prose. Both
//! languages are produced from the same [`Facts`] snapshot.

use serde::Serialize;

use super::intent::{classify, IntentCategory};
use super::Language;
use crate::analysis::{
    ElementTally, RelationKind, RelationResult, Star, StarFinding, StarResult, TenRelation,
};
use crate::chart::{Chart, Element};
use crate::error::BilingualText;

/// Composed answer for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub category: IntentCategory,
    pub language: Language,
    pub messages: BilingualText,
}

impl Reply {
    /// Message in the requested language.
    pub fn message(&self) -> &str {
        match self.language {
            Language::Vi => &self.messages.vi,
            Language::En => &self.messages.en,
        }
    }
}

/// Precomputed values shared by both languages.
struct Facts<'a> {
    chart: &'a Chart,
    relations: &'a RelationResult,
    stars: &'a StarResult,
    percentages: Vec<(Element, f64)>,
    dominant: Element,
    weakest: Element,
}

impl<'a> Facts<'a> {
    fn new(chart: &'a Chart, tally: &ElementTally, relations: &'a RelationResult, stars: &'a StarResult) -> Self {
        Self {
            chart,
            relations,
            stars,
            percentages: tally.percentages().into_iter().collect(),
            dominant: tally.dominant(),
            weakest: tally.weakest(),
        }
    }

    fn share(&self, element: Element) -> f64 {
        self.percentages
            .iter()
            .find(|(e, _)| *e == element)
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }

    fn has(&self, star: Star) -> bool {
        self.stars.is_present(star)
    }

    fn count(&self, kind: RelationKind) -> usize {
        self.relations.count_kind(kind)
    }
}

fn yes_no(present: bool) -> (&'static str, &'static str) {
    if present {
        ("có", "present")
    } else {
        ("không có", "absent")
    }
}

fn organ(element: Element) -> (&'static str, &'static str) {
    match element {
        Element::Wood => ("gan, mật", "liver and gallbladder"),
        Element::Fire => ("tim, mạch máu", "heart and circulation"),
        Element::Earth => ("dạ dày, lá lách", "stomach and spleen"),
        Element::Metal => ("phổi, đường hô hấp", "lungs and airways"),
        Element::Water => ("thận, bàng quang", "kidneys and bladder"),
    }
}

fn overview(f: &Facts) -> BilingualText {
    let dm = f.chart.day_master();
    let shares_vi: Vec<String> = f
        .percentages
        .iter()
        .map(|(element, pct)| format!("{} {:.1}%", element.vi_name(), pct))
        .collect();
    let shares_en: Vec<String> = f
        .percentages
        .iter()
        .map(|(element, pct)| format!("{} {:.1}%", element.en_name(), pct))
        .collect();
    BilingualText::new(
        format!("Nhật chủ {} ({}). Ngũ hành: {}.", dm, dm.element().vi_name(), shares_vi.join(", ")),
        format!("Day Master {} ({}). Elements: {}.", dm, dm.element().en_name(), shares_en.join(", ")),
    )
}

fn money(f: &Facts) -> BilingualText {
    let wealth = f.count(RelationKind::Wealth);
    let (lv, le) = yes_no(f.has(Star::Prosperity));
    BilingualText::new(
        format!(
            "Tài chính: lá số có {} sao Tài (Chính Tài/Thiên Tài), Lộc Thần {}. {}",
            wealth,
            lv,
            if wealth > 0 {
                "Tiền bạc có nguồn, nên tích lũy đều đặn."
            } else {
                "Tài tinh ẩn, nên thận trọng khi đầu tư."
            }
        ),
        format!(
            "Finances: the chart holds {} wealth relation(s), Prosperity Star {}. {}",
            wealth,
            le,
            if wealth > 0 {
                "Money has a source; save steadily."
            } else {
                "Wealth is hidden; be careful with investments."
            }
        ),
    )
}

fn career(f: &Facts) -> BilingualText {
    let power = f.count(RelationKind::Power);
    let (av, ae) = yes_no(f.has(Star::Academic));
    let (hv, he) = yes_no(f.has(Star::TravelingHorse));
    BilingualText::new(
        format!(
            "Sự nghiệp: {} sao Quan Sát, Văn Xương {}, Dịch Mã {}. {}",
            power,
            av,
            hv,
            if power > 0 {
                "Có chí tiến thủ, hợp môi trường có tổ chức."
            } else {
                "Hợp tự do, sáng tạo hơn là khuôn khổ."
            }
        ),
        format!(
            "Career: {} authority relation(s), Academic Star {}, Traveling Horse {}. {}",
            power,
            ae,
            he,
            if power > 0 {
                "Ambitious and suited to structured organisations."
            } else {
                "Better suited to independent, creative work than rigid structures."
            }
        ),
    )
}

fn health(f: &Facts) -> BilingualText {
    let (wv, we) = organ(f.weakest);
    let (dv, de) = organ(f.dominant);
    BilingualText::new(
        format!(
            "Sức khỏe: hành {} yếu nhất ({:.1}%), chú ý {}. Hành {} vượng ({:.1}%), tránh quá tải {}.",
            f.weakest.vi_name(),
            f.share(f.weakest),
            wv,
            f.dominant.vi_name(),
            f.share(f.dominant),
            dv
        ),
        format!(
            "Health: {} is weakest ({:.1}%), watch the {}. {} is strongest ({:.1}%), avoid straining the {}.",
            f.weakest.en_name(),
            f.share(f.weakest),
            we,
            f.dominant.en_name(),
            f.share(f.dominant),
            de
        ),
    )
}

fn love(f: &Facts) -> BilingualText {
    let (pv, pe) = yes_no(f.has(Star::PeachBlossom));
    let (rv, re) = yes_no(f.has(Star::RedPhoenix));
    let (gv, ge) = yes_no(f.has(Star::RedGlamour));
    let spouse = f.relations.contains(TenRelation::DirectWealth)
        || f.relations.contains(TenRelation::DirectOfficer);
    BilingualText::new(
        format!(
            "Tình duyên: Đào Hoa {}, Hồng Loan {}, Hồng Diễm {}. {}",
            pv,
            rv,
            gv,
            if spouse {
                "Phối ngẫu tinh hiện rõ, hôn nhân có nền tảng."
            } else {
                "Phối ngẫu tinh ẩn, duyên đến muộn nhưng bền."
            }
        ),
        format!(
            "Love: Peach Blossom {}, Red Phoenix {}, Red Glamour {}. {}",
            pe,
            re,
            ge,
            if spouse {
                "The spouse star is visible; marriage has a solid base."
            } else {
                "The spouse star is hidden; partnership comes later but lasts."
            }
        ),
    )
}

fn children(f: &Facts) -> BilingualText {
    let output = f.count(RelationKind::Output);
    BilingualText::new(
        format!(
            "Con cái: {} sao Thực Thương. {}",
            output,
            if output > 0 {
                "Đường con cái thuận, con cái hiếu thảo."
            } else {
                "Đường con cái muộn, cần kiên nhẫn."
            }
        ),
        format!(
            "Children: {} output relation(s). {}",
            output,
            if output > 0 {
                "Children come smoothly and are devoted."
            } else {
                "Children may come later; patience is needed."
            }
        ),
    )
}

fn future(f: &Facts) -> BilingualText {
    let (nv, ne) = yes_no(f.has(Star::HeavenlyNoble));
    let resource = f.count(RelationKind::Resource);
    BilingualText::new(
        format!(
            "Tương lai: hành {} chủ đạo, Thiên Ất Quý Nhân {}, {} sao Ấn hỗ trợ. Nên phát huy thế mạnh của hành {} và bổ sung hành {}.",
            f.dominant.vi_name(),
            nv,
            resource,
            f.dominant.vi_name(),
            f.weakest.vi_name()
        ),
        format!(
            "Future: {} dominates, Heavenly Noble {}, {} resource relation(s) in support. Build on {} and strengthen {}.",
            f.dominant.en_name(),
            ne,
            resource,
            f.dominant.en_name(),
            f.weakest.en_name()
        ),
    )
}

fn general(f: &Facts) -> BilingualText {
    let present: Vec<&StarFinding> = f.stars.present().collect();
    if present.is_empty() {
        return BilingualText::new(
            "Không có thần sát nổi bật trong lá số.",
            "No notable stars appear in the chart.",
        );
    }
    let vi: Vec<&str> = present.iter().map(|s| s.name.vi.as_str()).collect();
    let en: Vec<&str> = present.iter().map(|s| s.name.en.as_str()).collect();
    BilingualText::new(
        format!("Thần sát nổi bật: {}.", vi.join(", ")),
        format!("Notable stars: {}.", en.join(", ")),
    )
}

fn dump_relations(relations: &RelationResult) -> BilingualText {
    let mut vi = vec![format!("Thập thần (Nhật chủ {}):", relations.day_master)];
    let mut en = vec![format!("Ten relations (Day Master {}):", relations.day_master)];
    for entry in &relations.stems {
        vi.push(format!("- Can {}: {}", entry.token, entry.relation.vi_name()));
        en.push(format!("- Stem {}: {}", entry.token, entry.relation.en_name()));
    }
    for entry in &relations.branches {
        vi.push(format!("- Chi {}: {}", entry.token, entry.relation.vi_name()));
        en.push(format!("- Branch {} ({}): {}", entry.token, entry.token.animal(), entry.relation.en_name()));
    }
    BilingualText::new(vi.join("\n"), en.join("\n"))
}

fn dump_stars(stars: &StarResult) -> BilingualText {
    let mut vi = vec![String::from("Thần sát:")];
    let mut en = vec![String::from("Stars:")];
    for finding in &stars.stars {
        let matched: Vec<&str> = finding.matched.iter().map(|b| b.name()).collect();
        let (pv, pe) = yes_no(finding.present);
        let at = if matched.is_empty() {
            String::new()
        } else {
            format!(" ({})", matched.join(", "))
        };
        vi.push(format!("- {}: {}{}. {}", finding.name.vi, pv, at, finding.description.vi));
        en.push(format!("- {}: {}{}. {}", finding.name.en, pe, at, finding.description.en));
    }
    BilingualText::new(vi.join("\n"), en.join("\n"))
}

fn join(head: BilingualText, body: BilingualText) -> BilingualText {
    BilingualText::new(
        format!("{}\n{}", head.vi, body.vi),
        format!("{}\n{}", head.en, body.en),
    )
}

/// Classify `user_text` and compose the bilingual answer.
pub fn respond(
    chart: &Chart,
    tally: &ElementTally,
    relations: &RelationResult,
    stars: &StarResult,
    user_text: &str,
    language: Language,
) -> Reply {
    let category = classify(user_text);
    let facts = Facts::new(chart, tally, relations, stars);

    let messages = match category {
        IntentCategory::TenRelations => dump_relations(relations),
        IntentCategory::Stars => dump_stars(stars),
        IntentCategory::Money => join(overview(&facts), money(&facts)),
        IntentCategory::Career => join(overview(&facts), career(&facts)),
        IntentCategory::Health => join(overview(&facts), health(&facts)),
        IntentCategory::Love => join(overview(&facts), love(&facts)),
        IntentCategory::Children => join(overview(&facts), children(&facts)),
        IntentCategory::Future => join(overview(&facts), future(&facts)),
        IntentCategory::General => join(overview(&facts), general(&facts)),
    };

    Reply {
        category,
        language,
        messages,
    }
}
