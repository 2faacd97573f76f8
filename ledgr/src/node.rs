use anyhow::Context as _;
use ledgr_core::request::{Compile, Supply};
use ledgr_core::{ClientConfig, LedgerClient};

use crate::cli::{CompileArgs, NodeArgs, SupplyArgs};
use crate::decode::print_value;
use crate::run_error::RunError;

fn client(args: &NodeArgs) -> Result<LedgerClient, RunError> {
    let mut config = ClientConfig::new(&args.node_url)
        .with_token_header(&args.token_header)
        .with_request_timeout(args.timeout)
        .with_default_header("User-Agent", concat!("ledgr/", env!("CARGO_PKG_VERSION")));
    if let Some(token) = &args.token {
        config = config.with_token(token);
    }
    LedgerClient::new(config).map_err(|err| RunError::from_client(err, "invalid node configuration"))
}

pub async fn supply(args: SupplyArgs) -> Result<(), RunError> {
    let client = client(&args.node)?;
    let req = Supply::new().with_int_decoding(args.decoding.int_decoding);

    let body = client
        .send(&req, Vec::new())
        .await
        .map_err(|err| RunError::from_client(err, "supply request failed"))?;

    print_value(&body, args.decoding.pretty);
    Ok(())
}

pub async fn compile(args: CompileArgs) -> Result<(), RunError> {
    let client = client(&args.node)?;

    let mut parts = Vec::with_capacity(args.sources.len());
    for path in &args.sources {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))
            .map_err(RunError::InvalidInput)?;
        parts.push(bytes);
    }

    let mut req = Compile::from_parts(parts).with_int_decoding(args.decoding.int_decoding);
    if args.sourcemap {
        req = req.sourcemap(true);
    }

    let body = client
        .send(&req, Vec::new())
        .await
        .map_err(|err| RunError::from_client(err, "compile request failed"))?;

    print_value(&body, args.decoding.pretty);
    Ok(())
}
