//! Logo task
//!
//! The logo payload is a data URI so the launch kit stays self-contained.
//! Backends that can produce images return one directly; text-only models
//! are asked for an SVG, which the parser wraps as a data URI itself.

use coinforge_params::ProjectParameters;
use coinforge_task_api::{GenerationTask, TaskId, UpstreamOutputs};
use coinforge_utils::error::TaskError;

use crate::prompts::{OUTPUT_RULES, plan_context, strip_code_fence};

const DATA_URI_PREFIX: &str = "data:image/";

pub struct Logo;

impl GenerationTask for Logo {
    fn id(&self) -> TaskId {
        TaskId::Logo
    }

    fn output_field(&self) -> &'static str {
        "logo_data_uri"
    }

    fn prompt(&self, params: &ProjectParameters, _upstream: &UpstreamOutputs) -> String {
        let description = if params.logo_description.trim().is_empty() {
            "a clean geometric coin mark built around the ticker".to_string()
        } else {
            params.logo_description.trim().to_string()
        };
        format!(
            "Design a logo for the cryptocurrency described below.

{context}

Design brief: {description}

Produce a single square SVG, 512 by 512 viewBox, flat colors, no
external fonts or images, legible at 32 pixels. Incorporate the ticker
\"{ticker}\" or a mark derived from it. Respond with either the raw SVG
document or a complete data:image/svg+xml data URI, and nothing else.

{OUTPUT_RULES}",
            context = plan_context(params),
            ticker = params.ticker,
        )
    }

    fn parse(&self, raw: &str) -> Result<String, TaskError> {
        let body = strip_code_fence(raw);
        if body.is_empty() {
            return Err(TaskError::EmptyPayload {
                task: self.id().as_str().to_string(),
                field: self.output_field().to_string(),
            });
        }
        if body.starts_with(DATA_URI_PREFIX) {
            return Ok(body.to_string());
        }
        if body.starts_with("<svg") || body.starts_with("<?xml") {
            return Ok(format!(
                "data:image/svg+xml;utf8,{}",
                urlencode_svg(body)
            ));
        }
        Err(TaskError::SchemaMismatch {
            task: self.id().as_str().to_string(),
            reason: "expected an image data URI or SVG document".to_string(),
        })
    }
}

/// Minimal percent-encoding for embedding SVG text in a data URI.
///
/// Only the characters that break URI or HTML attribute contexts are
/// escaped; everything else in an SVG document is URI-safe enough for
/// browsers.
fn urlencode_svg(svg: &str) -> String {
    let mut out = String::with_capacity(svg.len());
    for c in svg.chars() {
        match c {
            '#' => out.push_str("%23"),
            '"' => out.push_str("%22"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            '\n' => out.push_str("%0A"),
            _ => out.push(c),
        }
    }
    out
}
