use clap::{Args, Parser, Subcommand};
use ledgr_core::{IntDecoding, parse_int_decoding};
use std::path::PathBuf;
use std::time::Duration;

fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    let invalid = || format!("invalid duration '{s}' (expected e.g. 10s, 250ms, 1m)");

    let number_end = s
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map_or(s.len(), |(idx, _)| idx);
    if number_end == 0 {
        return Err(invalid());
    }

    let (number_str, unit_str) = s.split_at(number_end);
    let value: u64 = number_str.parse().map_err(|_| invalid())?;

    match unit_str.trim() {
        "" | "s" | "sec" | "secs" => Ok(Duration::from_secs(value)),
        "ms" => Ok(Duration::from_millis(value)),
        "m" | "min" | "mins" => value
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration '{s}' is too large")),
        _ => Err(invalid()),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "ledgr",
    author,
    version,
    about = "Precision-safe JSON decoding for ledger node responses",
    long_about = "ledgr decodes ledger node JSON under an explicit integer decoding policy.\n\nPolicies:\n  default  every integer becomes a float; values above 2^53-1 lose precision\n  safe     like default, but values above 2^53-1 are an error\n  mixed    safe-range integers become floats, larger ones stay exact\n  bigint   every integer stays exact",
    after_help = "Examples:\n  ledgr decode response.json --int-decoding mixed\n  curl -s $NODE/v2/ledger/supply | ledgr decode --int-decoding safe\n  ledgr supply --node http://127.0.0.1:4001 --token $TOKEN --int-decoding bigint\n  ledgr compile approval.teal --node http://127.0.0.1:4001"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode JSON from a file or stdin and print the result
    Decode(DecodeArgs),

    /// Fetch the ledger supply from a node
    Supply(SupplyArgs),

    /// Compile a program on a node
    Compile(CompileArgs),
}

#[derive(Debug, Args)]
pub struct DecodingArgs {
    /// Integer decoding policy (default, safe, mixed, bigint)
    #[arg(
        long,
        env = "LEDGR_INT_DECODING",
        value_name = "POLICY",
        value_parser = parse_int_decoding,
        default_value = "default"
    )]
    pub int_decoding: IntDecoding,

    /// Pretty-print the decoded value
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct NodeArgs {
    /// Node base URL
    #[arg(long = "node", env = "LEDGR_NODE_URL", value_name = "URL")]
    pub node_url: String,

    /// API token sent with every request
    #[arg(long, env = "LEDGR_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Header carrying the API token
    #[arg(long, value_name = "NAME", default_value = ledgr_core::DEFAULT_TOKEN_HEADER)]
    pub token_header: String,

    /// Whole-request timeout (e.g. 10s, 250ms, 1m)
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// JSON file to decode; reads stdin when omitted or `-`
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub decoding: DecodingArgs,
}

#[derive(Debug, Args)]
pub struct SupplyArgs {
    #[command(flatten)]
    pub node: NodeArgs,

    #[command(flatten)]
    pub decoding: DecodingArgs,
}

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Program source files, sent as one payload in the given order
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// Ask the node for a source map
    #[arg(long)]
    pub sourcemap: bool,

    #[command(flatten)]
    pub node: NodeArgs,

    #[command(flatten)]
    pub decoding: DecodingArgs,
}
