//! Shared prompt scaffolding for the generation tasks

use coinforge_params::ProjectParameters;
use coinforge_utils::error::TaskError;

/// Appended to every prompt so responses arrive as bare artifacts.
pub(crate) const OUTPUT_RULES: &str = "\
Output rules:
- Respond with the artifact only. No preamble, no closing remarks, no offers of further help.
- Do not describe what you are about to produce or summarize what you produced.
- Do not wrap the whole response in markdown code fences unless the artifact itself is code.";

/// Project facts block shared by every task prompt.
pub(crate) fn plan_context(params: &ProjectParameters) -> String {
    let mut context = format!(
        "Project: {name} ({ticker})
Consensus: {consensus}
Total supply: {supply} {unit}
Block reward: {reward} {ticker}, halving every {halving} blocks
Block time target: {spacing} minutes, difficulty retarget over {timespan} minutes
Coinbase maturity: {maturity} blocks; recommended confirmations: {confirmations}
Address prefix: {prefix}",
        name = params.name,
        ticker = params.ticker,
        consensus = params.consensus,
        supply = params.total_supply,
        unit = params.unit_name,
        reward = params.block_reward,
        halving = params.halving_interval,
        spacing = params.target_spacing_minutes,
        timespan = params.target_timespan_minutes,
        maturity = params.coinbase_maturity,
        confirmations = params.confirmation_count,
        prefix = params.address_prefix,
    );

    for (label, value) in [
        ("Mission", &params.mission_statement),
        ("Audience", &params.target_audience),
        ("Brand voice", &params.brand_voice),
        ("Token utility", &params.token_utility),
        ("Distribution plan", &params.distribution_plan),
    ] {
        if !value.trim().is_empty() {
            context.push('\n');
            context.push_str(label);
            context.push_str(": ");
            context.push_str(value.trim());
        }
    }

    context
}

/// Trim the response and reject empty payloads.
pub(crate) fn require_nonempty(task: &str, field: &str, raw: &str) -> Result<String, TaskError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskError::EmptyPayload {
            task: task.to_string(),
            field: field.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Strip a single outer markdown code fence, if present.
///
/// Models often fence structured output even when told not to; the fence
/// language tag (```json, ```toml) is discarded with the fence.
pub(crate) fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.split_once('\n').map(|(_, body)| body) else {
        return trimmed;
    };
    body.strip_suffix("```").map_or(trimmed, str::trim)
}
