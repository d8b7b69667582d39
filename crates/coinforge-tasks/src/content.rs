//! Narrative and marketing tasks
//!
//! These are root tasks: they depend on nothing and draw only on the
//! launch plan. Their payloads are markdown (or HTML for the landing
//! page) stored verbatim after cleanup.

use coinforge_params::ProjectParameters;
use coinforge_task_api::{GenerationTask, TaskId, UpstreamOutputs};
use coinforge_utils::error::TaskError;

use crate::prompts::{OUTPUT_RULES, plan_context, require_nonempty, strip_code_fence};

pub struct Whitepaper;

impl GenerationTask for Whitepaper {
    fn id(&self) -> TaskId {
        TaskId::Whitepaper
    }

    fn output_field(&self) -> &'static str {
        "whitepaper"
    }

    fn prompt(&self, params: &ProjectParameters, _upstream: &UpstreamOutputs) -> String {
        format!(
            "Write a technical whitepaper for the cryptocurrency described below.

{context}

Structure the paper with these sections: Abstract, Introduction, Consensus
Mechanism, Monetary Policy, Network Architecture, Security Considerations,
and Roadmap. Ground every claim in the project facts above; where the plan
gives a number (supply, reward, block time), use that number exactly.
Write in measured, technical prose for an audience of developers and
early adopters. Format as markdown with a top-level title.

{OUTPUT_RULES}",
            context = plan_context(params),
        )
    }

    fn parse(&self, raw: &str) -> Result<String, TaskError> {
        require_nonempty(self.id().as_str(), self.output_field(), raw)
    }
}

pub struct Tokenomics;

impl GenerationTask for Tokenomics {
    fn id(&self) -> TaskId {
        TaskId::Tokenomics
    }

    fn output_field(&self) -> &'static str {
        "tokenomics"
    }

    fn prompt(&self, params: &ProjectParameters, _upstream: &UpstreamOutputs) -> String {
        format!(
            "Produce a tokenomics analysis for the cryptocurrency described below.

{context}

Cover: emission schedule derived from the block reward and halving
interval, projected circulating supply at each halving epoch until the
cap is effectively reached, miner incentive outlook as the subsidy
decays, and how the confirmation and maturity settings shape usable
liquidity. Present the emission schedule as a markdown table. All
arithmetic must follow from the numbers above.

{OUTPUT_RULES}",
            context = plan_context(params),
        )
    }

    fn parse(&self, raw: &str) -> Result<String, TaskError> {
        require_nonempty(self.id().as_str(), self.output_field(), raw)
    }
}

pub struct CommunityStrategy;

impl GenerationTask for CommunityStrategy {
    fn id(&self) -> TaskId {
        TaskId::CommunityStrategy
    }

    fn output_field(&self) -> &'static str {
        "community_strategy"
    }

    fn prompt(&self, params: &ProjectParameters, _upstream: &UpstreamOutputs) -> String {
        let operators = if params.consensus.is_proof_of_work() {
            "node operators and miners"
        } else {
            "node operators and stakers"
        };
        format!(
            "Write a community growth strategy for the cryptocurrency described below.

{context}

Cover the first ninety days after launch: which channels to stand up
first and why, a cadence for developer updates, how to recruit and keep
the first wave of {operators}, and moderation ground rules
that keep discussion on fundamentals. Give concrete weekly actions, not
aspirations. Format as markdown.

{OUTPUT_RULES}",
            context = plan_context(params),
        )
    }

    fn parse(&self, raw: &str) -> Result<String, TaskError> {
        require_nonempty(self.id().as_str(), self.output_field(), raw)
    }
}

pub struct PitchDeck;

impl GenerationTask for PitchDeck {
    fn id(&self) -> TaskId {
        TaskId::PitchDeck
    }

    fn output_field(&self) -> &'static str {
        "pitch_deck"
    }

    fn prompt(&self, params: &ProjectParameters, _upstream: &UpstreamOutputs) -> String {
        format!(
            "Write the content for a ten-slide investor pitch deck for the
cryptocurrency described below.

{context}

One markdown section per slide, titled `## Slide N: <heading>`, each with
the slide's headline and three to five terse bullet points. Slides:
problem, solution, how it works, token economics, market, traction plan,
competition, team placeholder, roadmap, and the ask. Keep every figure
consistent with the project facts.

{OUTPUT_RULES}",
            context = plan_context(params),
        )
    }

    fn parse(&self, raw: &str) -> Result<String, TaskError> {
        require_nonempty(self.id().as_str(), self.output_field(), raw)
    }
}

pub struct SocialCampaign;

impl GenerationTask for SocialCampaign {
    fn id(&self) -> TaskId {
        TaskId::SocialCampaign
    }

    fn output_field(&self) -> &'static str {
        "social_campaign"
    }

    fn prompt(&self, params: &ProjectParameters, _upstream: &UpstreamOutputs) -> String {
        format!(
            "Create a two-week social media launch campaign for the cryptocurrency
described below.

{context}

For each of the fourteen days give: the day number, the platform, the
post text (under 280 characters where the platform demands it), and the
goal of the post. Build toward a launch-day announcement on day ten and
sustain momentum after it. Match the brand voice if one is given above;
otherwise default to plainspoken and technical. Format as markdown.

{OUTPUT_RULES}",
            context = plan_context(params),
        )
    }

    fn parse(&self, raw: &str) -> Result<String, TaskError> {
        require_nonempty(self.id().as_str(), self.output_field(), raw)
    }
}

pub struct LandingPage;

impl GenerationTask for LandingPage {
    fn id(&self) -> TaskId {
        TaskId::LandingPage
    }

    fn output_field(&self) -> &'static str {
        "landing_page"
    }

    fn prompt(&self, params: &ProjectParameters, _upstream: &UpstreamOutputs) -> String {
        format!(
            "Write a complete single-file landing page for the cryptocurrency
described below.

{context}

Produce one self-contained HTML document with inline CSS and no external
resources. Sections: hero with the project name and one-line pitch, key
network parameters presented as stat cards, a short how-it-works
explainer, and a footer with placeholder links for the whitepaper and
source repository. Semantic HTML, responsive without a framework.

{OUTPUT_RULES}",
            context = plan_context(params),
        )
    }

    fn parse(&self, raw: &str) -> Result<String, TaskError> {
        let body = strip_code_fence(raw);
        let payload = require_nonempty(self.id().as_str(), self.output_field(), body)?;
        let head: String = payload
            .chars()
            .take(256)
            .collect::<String>()
            .to_ascii_lowercase();
        if !head.contains("<html") && !head.contains("<!doctype") {
            return Err(TaskError::SchemaMismatch {
                task: self.id().as_str().to_string(),
                reason: "response is not an HTML document".to_string(),
            });
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_carry_project_identity() {
        let params = ProjectParameters::minimal_for_testing("NovaCoin", "NVC");
        let upstream = UpstreamOutputs::new();
        for task in [
            &Whitepaper as &dyn GenerationTask,
            &Tokenomics,
            &CommunityStrategy,
            &PitchDeck,
            &SocialCampaign,
            &LandingPage,
        ] {
            let prompt = task.prompt(&params, &upstream);
            assert!(prompt.contains("NovaCoin"), "{} prompt", task.id());
            assert!(prompt.contains("NVC"), "{} prompt", task.id());
        }
    }

    #[test]
    fn landing_page_requires_html() {
        let err = LandingPage.parse("# Just markdown").unwrap_err();
        assert!(matches!(err, TaskError::SchemaMismatch { .. }));

        let page = LandingPage
            .parse("```html\n<!doctype html><html><body>hi</body></html>\n```")
            .unwrap();
        assert!(page.starts_with("<!doctype html>"));
    }

    #[test]
    fn narrative_tasks_accept_plain_markdown() {
        let payload = Whitepaper.parse("# NovaCoin\n\nA chain.").unwrap();
        assert_eq!(payload, "# NovaCoin\n\nA chain.");
    }
}
