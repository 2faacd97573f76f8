use std::path::Path;

use anyhow::Context as _;
use ledgr_core::Value;
use tokio::io::AsyncReadExt as _;

use crate::cli::DecodeArgs;
use crate::run_error::RunError;

pub async fn decode(args: DecodeArgs) -> Result<(), RunError> {
    let input = read_input(args.file.as_deref()).await?;
    let policy = args.decoding.int_decoding;

    let value = ledgr_core::decode_slice(&input, policy)
        .map_err(|err| RunError::from_client(err.into(), "failed to decode input"))?;
    tracing::debug!(%policy, kind = value.kind(), bytes = input.len(), "decoded input");

    print_value(&value, args.decoding.pretty);
    Ok(())
}

async fn read_input(path: Option<&Path>) -> Result<Vec<u8>, RunError> {
    match path {
        Some(path) if path != Path::new("-") => tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))
            .map_err(RunError::InvalidInput),
        _ => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .context("failed to read stdin")
                .map_err(RunError::RuntimeError)?;
            Ok(buf)
        }
    }
}

pub fn print_value(value: &Value, pretty: bool) {
    if pretty {
        println!("{value:#}");
    } else {
        println!("{value}");
    }
}
