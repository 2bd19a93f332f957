//! Built-in course content and lab/track lookups.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use thiserror::Error;

use crate::model::{
    Difficulty, DocumentKind, DocumentRef, ImagePair, LabDefinition, LabError, LabId, LabType,
    Track, TrackId,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    InvalidLab(#[from] LabError),

    #[error("duplicate lab id {0}")]
    DuplicateLab(LabId),

    #[error("duplicate track {0}")]
    DuplicateTrack(TrackId),

    #[error("track {track} references unknown lab {lab}")]
    UnknownLab { track: TrackId, lab: LabId },

    #[error("lab {lab} is listed in track {listed} but belongs to {declared}")]
    TrackMismatch {
        lab: LabId,
        listed: TrackId,
        declared: TrackId,
    },
}

/// Immutable store of lab definitions grouped into ordered tracks.
#[derive(Debug, Clone)]
pub struct LabCatalog {
    labs: BTreeMap<LabId, LabDefinition>,
    tracks: BTreeMap<TrackId, Track>,
}

impl LabCatalog {
    /// Build a catalog, checking every lab and every track reference.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for invalid labs, duplicate ids, or tracks that list
    /// labs which are missing or declared under another track.
    pub fn new(labs: Vec<LabDefinition>, tracks: Vec<Track>) -> Result<Self, CatalogError> {
        let mut by_id = BTreeMap::new();
        for lab in labs {
            lab.validate()?;
            let id = lab.id();
            if by_id.insert(id, lab).is_some() {
                return Err(CatalogError::DuplicateLab(id));
            }
        }

        let mut by_track = BTreeMap::new();
        for track in tracks {
            for lab_id in track.labs() {
                let lab = by_id.get(lab_id).ok_or(CatalogError::UnknownLab {
                    track: track.id(),
                    lab: *lab_id,
                })?;
                if lab.track() != track.id() {
                    return Err(CatalogError::TrackMismatch {
                        lab: *lab_id,
                        listed: track.id(),
                        declared: lab.track(),
                    });
                }
            }
            let id = track.id();
            if by_track.insert(id, track).is_some() {
                return Err(CatalogError::DuplicateTrack(id));
            }
        }

        Ok(Self {
            labs: by_id,
            tracks: by_track,
        })
    }

    /// The course shipped with the application.
    #[must_use]
    pub fn builtin() -> &'static LabCatalog {
        static BUILTIN: OnceLock<LabCatalog> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let labs = builtin_labs()
                .into_iter()
                .map(|lab| (lab.id(), lab))
                .collect();
            let tracks = builtin_tracks()
                .into_iter()
                .map(|track| (track.id(), track))
                .collect();
            LabCatalog { labs, tracks }
        })
    }

    #[must_use]
    pub fn get_lab(&self, id: LabId) -> Option<&LabDefinition> {
        self.labs.get(&id)
    }

    #[must_use]
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    /// Tracks in course order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> + '_ {
        self.tracks.values()
    }

    /// Labs of a track in the order they are taken; empty for unknown tracks.
    #[must_use]
    pub fn get_track_labs(&self, track: TrackId) -> Vec<&LabDefinition> {
        self.track(track)
            .map(|t| t.labs().iter().filter_map(|id| self.labs.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn all_labs(&self) -> impl Iterator<Item = &LabDefinition> + '_ {
        self.labs.values()
    }

    #[must_use]
    pub fn lab_count(&self) -> usize {
        self.labs.len()
    }

    /// The lab that follows `current`.
    ///
    /// Within a track this is the next lab; after a track's last lab it is the first
    /// lab of the next track in course order. Returns `None` at the end of the course
    /// or for unknown ids.
    #[must_use]
    pub fn get_next_lab_id(&self, current: LabId) -> Option<LabId> {
        let lab = self.labs.get(&current)?;
        let track = self.tracks.get(&lab.track())?;

        if let Some(pos) = track.position_of(current) {
            if let Some(next) = track.labs().get(pos + 1) {
                return Some(*next);
            }
        }

        let next_track = self.tracks.get(&lab.track().next()?)?;
        next_track.labs().first().copied()
    }

    /// Mirror of [`LabCatalog::get_next_lab_id`] walking backwards.
    #[must_use]
    pub fn get_previous_lab_id(&self, current: LabId) -> Option<LabId> {
        let lab = self.labs.get(&current)?;
        let track = self.tracks.get(&lab.track())?;

        if let Some(pos) = track.position_of(current) {
            if pos > 0 {
                return track.labs().get(pos - 1).copied();
            }
        }

        let prev_track = self.tracks.get(&lab.track().previous()?)?;
        prev_track.labs().last().copied()
    }

    /// Total time of a track in whole minutes, rounded up.
    #[must_use]
    pub fn track_total_minutes(&self, track: TrackId) -> u32 {
        let secs: u32 = self
            .get_track_labs(track)
            .iter()
            .map(|lab| lab.time_limit_secs())
            .sum();
        secs.div_ceil(60)
    }

    /// The lab learners start the course with.
    #[must_use]
    pub fn first_lab_id(&self) -> Option<LabId> {
        TrackId::ORDER
            .iter()
            .filter_map(|id| self.tracks.get(id))
            .find_map(|track| track.labs().first().copied())
    }
}

//
// ─── BUILT-IN CONTENT ──────────────────────────────────────────────────────────
//

fn builtin_tracks() -> Vec<Track> {
    vec![
        Track::new(
            TrackId::Text,
            "Text & Content",
            "Master prompts for summarizing documents and crafting professional communications",
            Difficulty::Easy,
            vec![LabId::new(3), LabId::new(4)],
        ),
        Track::new(
            TrackId::Finance,
            "Finance & Data",
            "Use AI to generate business documents and analyze spreadsheet data",
            Difficulty::Medium,
            vec![LabId::new(5), LabId::new(6)],
        ),
        Track::new(
            TrackId::Marketing,
            "Marketing & Media",
            "Learn to craft prompts that transform and create professional visuals using AI",
            Difficulty::Hard,
            vec![LabId::new(1), LabId::new(2)],
        ),
    ]
}

#[allow(clippy::too_many_lines)]
fn builtin_labs() -> Vec<LabDefinition> {
    vec![
        LabDefinition {
            id: LabId::new(1),
            title: "Product Photo Enhancement",
            track: TrackId::Marketing,
            difficulty: Difficulty::Medium,
            lab_type: LabType::Image,
            time_limit_secs: 90,
            scenario: "Your HVAC company needs professional van photos for the website and business cards. Hiring a professional photography crew costs hundreds of dollars and takes time to schedule. But with AI image generation, you can transform a simple iPhone photo into a professional product shot in seconds.",
            mission: "Write a prompt that will transform the 'before' image into something that looks like the 'after' image - a clean, professional product shot with a white background.",
            why_it_matters: Some("Instead of hiring a professional crew to photograph your vehicles, you can use AI to transform basic phone photos into polished, website-ready images. This saves time and money while still getting professional results."),
            images: Some(ImagePair {
                before: "images/before-van.webp",
                after: "images/after-van.webp",
            }),
            requires_image_input: true,
            document: None,
            sample_input: None,
            expert_prompt: "Transform this HVAC service van photo into a professional product shot. Place the van on a clean white background with soft studio lighting. Remove all background elements including the parking lot, other vehicles, and buildings. Make it look like a commercial vehicle photography session for a company website or business card.",
            keywords: &[
                "white background",
                "professional",
                "studio",
                "lighting",
                "remove background",
                "clean",
                "product shot",
                "commercial",
            ],
            hint: "Think about what makes the 'after' image look professional: the clean white background, the removal of all distractions, and the studio-style lighting.",
            takeaways: &[
                "Specify the exact background you want (white, gradient, etc.)",
                "Explicitly ask to remove unwanted elements (parking lot, other cars, buildings)",
                "Reference the end use case (website, business card) for context",
            ],
        },
        LabDefinition {
            id: LabId::new(2),
            title: "Social Media Infographic",
            track: TrackId::Marketing,
            difficulty: Difficulty::Hard,
            lab_type: LabType::Image,
            time_limit_secs: 120,
            scenario: "Now that you have a professional van photo, you need to turn it into an eye-catching social media promotional graphic. Summer is coming and you want to advertise your AC repair special. You need to create a vibrant, attention-grabbing infographic that features your van and promotes your summer discount.",
            mission: "Write a prompt that transforms your professional van image into a summer promotional infographic like the target example - complete with beach theme, promotional text, and eye-catching design.",
            why_it_matters: Some("Social media marketing requires scroll-stopping visuals. Instead of hiring a graphic designer for every promotion, you can use AI to transform your existing product photos into seasonal promotional graphics. This lets you quickly create timely, professional marketing materials."),
            images: Some(ImagePair {
                before: "images/after-van.webp",
                after: "images/Infographic.webp",
            }),
            requires_image_input: true,
            document: None,
            sample_input: None,
            expert_prompt: "Transform this HVAC service van into a vibrant summer promotional infographic. Create a beach-themed background with palm trees, sun, ocean, and beach elements like beach balls and flip flops. Add a friendly cartoon technician character next to the van waving at the viewer. Include bold promotional text at the top: 'SUMMER AC REPAIR SPECIAL!' with a banner showing '15% DISCOUNT ON ANY AC REPAIR ALL SUMMER LONG!' Add contact information at the bottom with a tagline. Style should be colorful, fun, and eye-catching for social media. Keep the van as the central focus but integrate it into the summer beach scene.",
            keywords: &[
                "summer",
                "promotional",
                "beach",
                "discount",
                "infographic",
                "social media",
                "colorful",
                "banner",
                "text",
                "theme",
                "vibrant",
                "eye-catching",
            ],
            hint: "Think about what makes the target image effective: the seasonal theme, bright colors, clear promotional message, and how the van is integrated into a fun scene rather than just shown alone.",
            takeaways: &[
                "Describe the theme and mood you want (summer, beach, fun)",
                "Specify text content and promotional messaging clearly",
                "Include elements that create visual interest (characters, decorative elements)",
                "Reference the central subject and how it should be integrated into the design",
            ],
        },
        LabDefinition {
            id: LabId::new(3),
            title: "Document Summarization",
            track: TrackId::Text,
            difficulty: Difficulty::Easy,
            lab_type: LabType::Text,
            time_limit_secs: 90,
            scenario: "Your company just received a new HVAC service agreement contract from a vendor. Before signing, you need to quickly understand the key terms, pricing, and any potential concerns. Reading the full 2-page document would take 10+ minutes, but AI can summarize it in seconds.",
            mission: "Write a prompt that will summarize this service agreement, highlighting the most important terms a business owner needs to know before signing.",
            why_it_matters: None,
            images: None,
            requires_image_input: false,
            document: Some(DocumentRef {
                path: "docs/hvac-service-agreement.docx",
                kind: DocumentKind::Contract,
            }),
            sample_input: None,
            expert_prompt: r"Summarize this HVAC service agreement for a business owner who needs to decide whether to sign. Include:

1. **Cost Overview**: Annual fee and what's included for that price
2. **Key Benefits**: The most valuable services and discounts provided
3. **Important Limitations**: What's NOT covered that might surprise me
4. **Red Flags**: Any terms that seem unfavorable or unusual (auto-renewal, liability limits, fees)
5. **Cancellation Terms**: How and when can I get out of this contract?

Keep the summary under 250 words. Use bullet points for easy scanning. Highlight any dollar amounts, percentages, or deadlines.",
            keywords: &[
                "summarize",
                "summary",
                "key terms",
                "cost",
                "price",
                "included",
                "limitations",
                "exclusions",
                "covered",
                "not covered",
                "renewal",
                "auto-renew",
                "cancel",
                "warranty",
                "bullet",
                "highlight",
                "red flag",
                "concerns",
            ],
            hint: "Good summarization prompts specify: (1) what sections to focus on, (2) what format to use, and (3) what the reader cares most about (as a business owner, you care about cost, risk, and flexibility).",
            takeaways: &[
                "Always specify the OUTPUT FORMAT you want (bullets, sections, word limit)",
                "Tell AI what ROLE the reader has - it changes what's considered 'important'",
                "Ask for potential concerns or red flags - AI can spot unfavorable terms",
                "You can summarize ANY document: contracts, reports, emails, manuals, articles",
            ],
        },
        LabDefinition {
            id: LabId::new(4),
            title: "Contextual Email Response",
            track: TrackId::Text,
            difficulty: Difficulty::Medium,
            lab_type: LabType::Text,
            time_limit_secs: 120,
            scenario: "A frustrated client has sent an escalating series of emails about a project delay. The delay wasn't entirely your fault (a vendor double-booked equipment), but it has significantly impacted their business. They're angry, calculating their losses, and the relationship is at risk. You need to craft a response that de-escalates, takes appropriate responsibility, and provides a path forward.",
            mission: "Write a prompt that generates a professional response to this difficult client situation. Your prompt should provide the AI with context and guide it to produce an appropriate, relationship-saving response.",
            why_it_matters: None,
            images: None,
            requires_image_input: false,
            document: Some(DocumentRef {
                path: "docs/email-thread.txt",
                kind: DocumentKind::Email,
            }),
            sample_input: None,
            expert_prompt: r#"I need to respond to an upset client about a project delay. Here is the email thread:

[EMAIL THREAD - see above]

Write a professional response to Mike's latest email that:

1. **Opens with empathy**: Acknowledge the real business impact ($4,000+ in costs, 47 idle employees) without being defensive
2. **Takes ownership**: Accept responsibility for the communication failure - don't blame the crane company to the client
3. **Provides concrete solutions**:
   - Offer 2-3 specific dates with GUARANTEED availability (I've confirmed equipment)
   - Include a backup plan if the primary date doesn't work
4. **Offers meaningful compensation**: Suggest a specific gesture (X% discount, extended warranty, priority scheduling for future work)
5. **Preserves the relationship**: End with a commitment to making this right and earning back trust

Tone: Professional, accountable, solution-focused. Confident but not dismissive of their concerns.
Length: 150-200 words maximum
Avoid: Clichés like "I understand your frustration" - show understanding through actions, not words. Don't over-apologize or grovel."#,
            keywords: &[
                "context",
                "email",
                "thread",
                "acknowledge",
                "empathy",
                "impact",
                "solution",
                "concrete",
                "specific",
                "compensation",
                "discount",
                "relationship",
                "tone",
                "professional",
                "ownership",
                "responsibility",
                "guarantee",
                "avoid",
            ],
            hint: "The best prompts for difficult communications: (1) provide the FULL context (the whole email thread), (2) specify the tone precisely, (3) tell AI what to AVOID, not just what to include, (4) give specific constraints like word count.",
            takeaways: &[
                "Always include the FULL CONTEXT - AI responses improve dramatically with background",
                "Specify TONE precisely: 'professional but warm' vs 'formal' vs 'apologetic'",
                "Tell AI what to AVOID - clichés, defensiveness, over-apologizing",
                "For sensitive communications, specify LENGTH to control the level of detail",
            ],
        },
        LabDefinition {
            id: LabId::new(5),
            title: "Generate a Business Quote",
            track: TrackId::Finance,
            difficulty: Difficulty::Easy,
            lab_type: LabType::Text,
            time_limit_secs: 90,
            scenario: "A potential client has requested a quote for a major HVAC replacement project at their medical facility. You have all the details scribbled in notes - equipment costs, labor estimates, special requirements. Now you need to transform these rough details into a professional, well-organized quote document that instills confidence.",
            mission: "Write a prompt that transforms project details into a professional business quote with clear line items, calculations, and terms.",
            why_it_matters: None,
            images: None,
            requires_image_input: false,
            document: None,
            sample_input: Some(
                r"PROJECT QUOTE REQUEST DETAILS
=============================

CUSTOMER: Riverside Medical Center
CONTACT: Dr. Patricia Vance, COO
ADDRESS: 8900 Healthcare Parkway, Building C, Irving, TX 75063
PROJECT: Replace HVAC in Outpatient Surgery Wing (12,000 sq ft)

EQUIPMENT:
- 3x Carrier WeatherExpert 50XC rooftop units, 15-ton @ $18,500 each
- Healthcare-grade HEPA filtration upgrade @ $2,200 per unit
- 1x Carrier i-Vu building automation interface @ $4,500
- 6x Programmable zone thermostats @ $350 each

MATERIALS:
- Ductwork modifications: $8,500
- UV-C sanitization units (3x) @ $1,800 each

LABOR:
- Equipment removal: 16 hrs @ $95/hr
- Installation: 48 hrs @ $95/hr
- Ductwork: 24 hrs @ $85/hr
- Controls & commissioning: 8 hrs @ $110/hr
- Project management: 12 hrs @ $75/hr

OTHER COSTS:
- Crane rental (2 weekends): $3,200
- Permits: $1,850
- Disposal: $950

NOTES:
- Weekend-only work required (no patient disruption)
- Apply 15% weekend premium to labor
- 10-year parts warranty, 2-year labor included
- Payment: 40% deposit, 40% on delivery, 20% on completion",
            ),
            expert_prompt: r"Create a professional business quote document from these project details:

[PROJECT DETAILS - see above]

Format the quote with these sections:

**HEADER:**
- Generate a quote number (format: Q-2024-XXXX)
- Today's date and validity period (30 days)
- Customer name and contact information
- Project description (one line)

**EQUIPMENT & MATERIALS:** (table format)
| Item | Description | Qty | Unit Price | Total |
List all equipment and materials with subtotal

**LABOR:** (table format)
| Service Type | Hours | Rate | Total |
Calculate the 15% weekend premium and show it as a line item
Include subtotal

**ADDITIONAL COSTS:**
List permits, crane rental, disposal

**PROJECT SUMMARY:**
- Equipment & Materials Subtotal
- Labor Subtotal (with weekend premium)
- Additional Costs Subtotal
- GRAND TOTAL

**TERMS:**
- Payment schedule (40/40/20 structure from notes)
- Warranty coverage
- Timeline estimate
- Quote validity

**CLOSING:**
2-3 sentences emphasizing value: healthcare expertise, minimal disruption approach, quality equipment

Calculate all totals correctly. Format currency with $ and commas.",
            keywords: &[
                "quote",
                "professional",
                "format",
                "table",
                "itemized",
                "calculate",
                "total",
                "subtotal",
                "line item",
                "terms",
                "payment",
                "warranty",
                "header",
                "sections",
                "currency",
            ],
            hint: "Professional quotes need: clear itemization in tables, accurate calculations (let AI do the math!), payment terms, and a brief value statement. Tell AI the exact structure you want.",
            takeaways: &[
                "AI can do MATH - ask it to calculate totals, apply percentages, sum line items",
                "Specify exact STRUCTURE with section headers for organized output",
                "Use TABLE FORMAT for line items - just describe the columns you want",
                "Include a value proposition - AI can help you sell, not just calculate",
            ],
        },
        LabDefinition {
            id: LabId::new(6),
            title: "Data Analysis & Visualization",
            track: TrackId::Finance,
            difficulty: Difficulty::Medium,
            lab_type: LabType::Data,
            time_limit_secs: 150,
            scenario: "Your company has a full year of regional sales data. The CEO wants insights for tomorrow's board meeting: Which regions are performing best? Are there seasonal patterns? Where should we focus next year? You need to analyze this spreadsheet and provide actionable insights.",
            mission: "Write a prompt that analyzes this sales data and provides executive-level insights with specific recommendations.",
            why_it_matters: None,
            images: None,
            requires_image_input: false,
            document: Some(DocumentRef {
                path: "docs/regional-sales-data.xlsx",
                kind: DocumentKind::Spreadsheet,
            }),
            sample_input: None,
            expert_prompt: r"Analyze this regional sales data and provide insights for an executive board presentation.

[DATA WILL BE PROVIDED FROM SPREADSHEET]

Structure your analysis as follows:

**1. PERFORMANCE RANKING**
- Rank all regions by total annual revenue (highest to lowest)
- Show each region's percentage of total company revenue
- Identify the gap between top and bottom performers

**2. SEASONAL ANALYSIS**
- Identify peak months and slow months
- Calculate the seasonality ratio (peak month revenue ÷ lowest month revenue)
- Note any regions that buck the seasonal trend

**3. KEY INSIGHTS** (3-5 bullets)
What's the most important story in this data?
- Biggest opportunity
- Biggest concern
- Most surprising finding

**4. VISUALIZATION RECOMMENDATIONS**
For the board presentation, recommend:
- Best chart type for showing regional comparison (and why)
- Best chart type for showing seasonal trends (and why)

**5. STRATEGIC RECOMMENDATIONS** (2-3 specific actions)
Based on this data, what should leadership prioritize?
- Short-term (next quarter)
- Long-term (next year)

Format all currency as USD with commas. Calculate percentages to one decimal place. Be specific with numbers - executives want data, not vague statements.",
            keywords: &[
                "analyze",
                "analysis",
                "insight",
                "trend",
                "pattern",
                "seasonal",
                "growth",
                "percentage",
                "compare",
                "comparison",
                "rank",
                "visualize",
                "chart",
                "recommend",
                "recommendation",
                "strategic",
                "actionable",
                "executive",
            ],
            hint: "Great data analysis prompts: (1) ask for specific calculations, (2) request insights AND the data behind them, (3) ask for visualization recommendations, (4) request actionable next steps. Executives want numbers AND meaning.",
            takeaways: &[
                "AI can ANALYZE data - ask for trends, patterns, rankings, and anomalies",
                "Always ask for INSIGHTS, not just calculations - 'what does this mean?'",
                "Request VISUALIZATION recommendations - AI knows which charts work best",
                "Ask for ACTIONABLE recommendations - turn data into decisions",
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_content_passes_validation() {
        let catalog = LabCatalog::new(builtin_labs(), builtin_tracks()).unwrap();
        assert_eq!(catalog.lab_count(), 6);
        assert_eq!(LabCatalog::builtin().lab_count(), 6);
    }

    #[test]
    fn next_lab_stays_within_track_then_moves_on() {
        let catalog = LabCatalog::builtin();
        assert_eq!(catalog.get_next_lab_id(LabId::new(3)), Some(LabId::new(4)));
        // last of "text" → first of "finance"
        assert_eq!(catalog.get_next_lab_id(LabId::new(4)), Some(LabId::new(5)));
        assert_eq!(catalog.get_next_lab_id(LabId::new(6)), Some(LabId::new(1)));
        // last lab of the last track
        assert_eq!(catalog.get_next_lab_id(LabId::new(2)), None);
        assert_eq!(catalog.get_next_lab_id(LabId::new(42)), None);
    }

    #[test]
    fn previous_lab_walks_backwards() {
        let catalog = LabCatalog::builtin();
        assert_eq!(catalog.get_previous_lab_id(LabId::new(4)), Some(LabId::new(3)));
        assert_eq!(catalog.get_previous_lab_id(LabId::new(5)), Some(LabId::new(4)));
        assert_eq!(catalog.get_previous_lab_id(LabId::new(3)), None);
    }

    #[test]
    fn track_labs_keep_track_order() {
        let catalog = LabCatalog::builtin();
        let ids: Vec<_> = catalog
            .get_track_labs(TrackId::Marketing)
            .iter()
            .map(|lab| lab.id())
            .collect();
        assert_eq!(ids, vec![LabId::new(1), LabId::new(2)]);
        assert_eq!(catalog.first_lab_id(), Some(LabId::new(3)));
    }

    #[test]
    fn track_minutes_round_up() {
        let catalog = LabCatalog::builtin();
        // 90 + 120 seconds
        assert_eq!(catalog.track_total_minutes(TrackId::Text), 4);
        // 90 + 150 seconds
        assert_eq!(catalog.track_total_minutes(TrackId::Finance), 4);
    }

    #[test]
    fn new_rejects_track_referencing_foreign_lab() {
        let lab = LabDefinition::builder(LabId::new(1), "Only", TrackId::Text, LabType::Text)
            .build()
            .unwrap();
        let track = Track::new(
            TrackId::Finance,
            "Finance",
            "",
            Difficulty::Easy,
            vec![LabId::new(1)],
        );
        let err = LabCatalog::new(vec![lab], vec![track]).unwrap_err();
        assert!(matches!(err, CatalogError::TrackMismatch { .. }));
    }

    #[test]
    fn new_rejects_unknown_lab() {
        let track = Track::new(
            TrackId::Text,
            "Text",
            "",
            Difficulty::Easy,
            vec![LabId::new(7)],
        );
        let err = LabCatalog::new(Vec::new(), vec![track]).unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnknownLab {
                track: TrackId::Text,
                lab: LabId::new(7)
            }
        );
    }
}
