//! Chain configuration tasks
//!
//! Three root tasks produce the technical groundwork (genesis block
//! parameters, network configuration, compilation guide). The node setup
//! guide depends on all three: its prompt embeds their payloads so the
//! operator instructions match the chain that was actually specified.

use coinforge_params::ProjectParameters;
use coinforge_task_api::{GenerationTask, TaskId, UpstreamOutputs};
use coinforge_utils::error::TaskError;

use crate::prompts::{OUTPUT_RULES, plan_context, require_nonempty, strip_code_fence};

pub struct GenesisBlock;

impl GenerationTask for GenesisBlock {
    fn id(&self) -> TaskId {
        TaskId::GenesisBlock
    }

    fn output_field(&self) -> &'static str {
        "genesis_block"
    }

    fn prompt(&self, params: &ProjectParameters, _upstream: &UpstreamOutputs) -> String {
        let genesis_message = if params.genesis_message.trim().is_empty() {
            format!("{} genesis", params.name)
        } else {
            params.genesis_message.trim().to_string()
        };
        format!(
            "Specify the genesis block parameters for the cryptocurrency
described below.

{context}

Embed this coinbase message verbatim: {genesis_message:?}

Produce a JSON object with fields: version, timestamp (unix seconds,
a plausible near-future value), bits (compact difficulty appropriate for
a new {consensus} chain), nonce (placeholder 0), coinbase_message,
coinbase_reward (the block reward above in base units), and
merkle_root_note explaining that the root is computed from the single
coinbase transaction at mining time. JSON only.

{OUTPUT_RULES}",
            context = plan_context(params),
            consensus = params.consensus,
        )
    }

    fn parse(&self, raw: &str) -> Result<String, TaskError> {
        let body = strip_code_fence(raw);
        let payload = require_nonempty(self.id().as_str(), self.output_field(), body)?;
        if !payload.starts_with('{') {
            return Err(TaskError::SchemaMismatch {
                task: self.id().as_str().to_string(),
                reason: "expected a JSON object".to_string(),
            });
        }
        Ok(payload)
    }
}

pub struct NetworkConfig;

impl GenerationTask for NetworkConfig {
    fn id(&self) -> TaskId {
        TaskId::NetworkConfig
    }

    fn output_field(&self) -> &'static str {
        "network_config"
    }

    fn prompt(&self, params: &ProjectParameters, _upstream: &UpstreamOutputs) -> String {
        format!(
            "Specify the network configuration for the cryptocurrency described
below.

{context}

Produce a TOML document with: a [network] table (magic bytes as four hex
values, default p2p port, default rpc port, address_prefix, protocol
version), a [consensus] table (target_spacing_minutes,
target_timespan_minutes, coinbase_maturity, halving_interval,
block_reward, total_supply), and a [dns_seeds] list with placeholder
hostnames derived from the project name. Choose ports that avoid the
well-known assignments of major existing chains. TOML only.

{OUTPUT_RULES}",
            context = plan_context(params),
        )
    }

    fn parse(&self, raw: &str) -> Result<String, TaskError> {
        let body = strip_code_fence(raw);
        let payload = require_nonempty(self.id().as_str(), self.output_field(), body)?;
        if !payload.contains('[') || !payload.contains('=') {
            return Err(TaskError::SchemaMismatch {
                task: self.id().as_str().to_string(),
                reason: "expected a TOML document with tables".to_string(),
            });
        }
        Ok(payload)
    }
}

pub struct CompilationGuide;

impl GenerationTask for CompilationGuide {
    fn id(&self) -> TaskId {
        TaskId::CompilationGuide
    }

    fn output_field(&self) -> &'static str {
        "compilation_guide"
    }

    fn prompt(&self, params: &ProjectParameters, _upstream: &UpstreamOutputs) -> String {
        format!(
            "Write a compilation guide for the node software of the cryptocurrency
described below.

{context}

Assume a Bitcoin-derived C++ codebase renamed for this project. Cover
Linux (Debian/Ubuntu) and macOS: build dependencies with exact package
names, the configure and make steps, where the built binaries land, and
a troubleshooting section for the three most common build failures.
Format as markdown with fenced shell blocks for every command.

{OUTPUT_RULES}",
            context = plan_context(params),
        )
    }

    fn parse(&self, raw: &str) -> Result<String, TaskError> {
        require_nonempty(self.id().as_str(), self.output_field(), raw)
    }
}

pub struct NodeSetup;

/// Upstream tasks whose payloads the node setup prompt embeds.
const NODE_SETUP_DEPS: &[TaskId] = &[
    TaskId::GenesisBlock,
    TaskId::NetworkConfig,
    TaskId::CompilationGuide,
];

impl GenerationTask for NodeSetup {
    fn id(&self) -> TaskId {
        TaskId::NodeSetup
    }

    fn deps(&self) -> &'static [TaskId] {
        NODE_SETUP_DEPS
    }

    fn output_field(&self) -> &'static str {
        "node_setup"
    }

    fn prompt(&self, params: &ProjectParameters, upstream: &UpstreamOutputs) -> String {
        let genesis = upstream.get(TaskId::GenesisBlock).unwrap_or_default();
        let network = upstream.get(TaskId::NetworkConfig).unwrap_or_default();
        let compilation = upstream.get(TaskId::CompilationGuide).unwrap_or_default();
        format!(
            "Write a first-node setup guide for the cryptocurrency described
below. The chain's technical artifacts have already been generated; the
guide must agree with them exactly, using the same ports, magic bytes,
and genesis parameters.

{context}

Genesis block parameters:
{genesis}

Network configuration:
{network}

Compilation guide the operator has already followed:
{compilation}

Cover: writing the node's configuration file from the network settings
above, {bootstrap} the genesis block, opening the p2p port,
starting the daemon, and verifying with RPC calls that the node is
serving the expected chain. Format as markdown with fenced shell blocks.

{OUTPUT_RULES}",
            context = plan_context(params),
            bootstrap = if params.consensus.is_proof_of_work() {
                "mining"
            } else {
                "validating"
            },
        )
    }

    fn parse(&self, raw: &str) -> Result<String, TaskError> {
        require_nonempty(self.id().as_str(), self.output_field(), raw)
    }
}
