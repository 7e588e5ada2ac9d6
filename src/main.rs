use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use calldata_lens::config::{self, Config};
use calldata_lens::domain::abi::{
    format_dyn_sol_value, AbiRegistry, AbiSource, FunctionSignature, SignatureResolver,
};
use calldata_lens::domain::calldata;
use calldata_lens::infrastructure::abi::{
    http_client, read_abi_file, AbiScanner, AlloyAbiDecoder, CachedResolver, FallbackResolver, FourByteResolver,
    LocalResolver, NoAbiSource, NoSignatures, OpenChainResolver, SourcifyAbiSource,
};
use calldata_lens::engine::Target;
use calldata_lens::{Argument, DecodeContext, DecodedCall, DecodedValue, Decoder};

#[derive(Debug, Parser)]
#[command(
    name = "calldata-lens",
    version,
    about = "Explain raw EVM calldata, even without an ABI"
)]
struct Args {
    /// Hex-encoded calldata (0x prefix optional)
    calldata: String,

    /// Target contract; its published ABI is tried first
    #[arg(long, requires = "chain_id")]
    address: Option<Address>,

    /// Chain of the target contract
    #[arg(long, requires = "address")]
    chain_id: Option<String>,

    /// JSON ABI file (or build artifact with an "abi" field) to decode against
    #[arg(long, conflicts_with_all = ["address", "signature"])]
    abi: Option<PathBuf>,

    /// Human-readable signature, e.g. "transfer(address,uint256)"
    #[arg(long, conflicts_with = "address")]
    signature: Option<String>,

    /// Skip every remote lookup
    #[arg(long)]
    offline: bool,

    /// Print the decoded tree as JSON
    #[arg(long)]
    json: bool,

    /// Override the nested bytes depth ceiling
    #[arg(long)]
    max_depth: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("could not interpret this data");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(args: Args) -> Result<bool> {
    let mut config = config::load();
    if args.offline {
        config.offline = true;
    }
    if let Some(max_depth) = args.max_depth {
        config.max_depth = max_depth;
    }

    let data = calldata::parse_hex(&args.calldata).context("Invalid calldata")?;
    let ctx = build_context(&args)?;
    let registry = local_registry(&config, &ctx).await?;
    let decoder = build_decoder(&config, registry)?;

    let Some(decoded) = decoder.decode(&data, &ctx).await else {
        return Ok(false);
    };
    info!(source = %decoded.source, signature = %decoded.signature, "decoded");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
    } else {
        let mut out = String::new();
        render_call(&decoded, 0, &mut out);
        print!("{out}");
    }
    Ok(true)
}

fn build_context(args: &Args) -> Result<DecodeContext> {
    if let Some(path) = &args.abi {
        return Ok(DecodeContext::with_abi(&load_abi_file(path)?));
    }
    if let Some(signature) = &args.signature {
        let mut registry = AbiRegistry::new();
        registry.insert(FunctionSignature::parse(signature)?);
        return Ok(DecodeContext::with_decoder(AlloyAbiDecoder::new(registry)));
    }
    match (args.address, &args.chain_id) {
        (Some(address), Some(chain_id)) => {
            let chain_id = calldata::parse_u64_strict(chain_id).context("Invalid chain id")?;
            Ok(DecodeContext::with_contract(address, chain_id))
        }
        (None, None) => Ok(DecodeContext::new()),
        _ => bail!("--address and --chain-id must be given together"),
    }
}

fn load_abi_file(path: &Path) -> Result<JsonAbi> {
    read_abi_file(path)?.with_context(|| format!("No ABI found in {}", path.display()))
}

/// Selectors from local build artifacts. An explicit ABI never reaches the
/// selector registry, so nothing is scanned for it.
async fn local_registry(config: &Config, ctx: &DecodeContext) -> Result<AbiRegistry> {
    if matches!(ctx.target(), Target::Abi(_)) {
        return Ok(AbiRegistry::new());
    }

    let roots = config.abi_scan_roots();
    if roots.is_empty() {
        debug!("no local artifact roots, skipping scan");
        return Ok(AbiRegistry::new());
    }
    let registry = tokio::task::spawn_blocking(move || AbiScanner::scan_roots(&roots))
        .await
        .context("Local ABI scan failed")?;
    debug!(
        functions = registry.len(),
        files = registry.scanned_files,
        errors = registry.errors.len(),
        "local ABI scan finished"
    );
    Ok(registry)
}

fn build_decoder(config: &Config, registry: AbiRegistry) -> Result<Decoder> {
    let local: Arc<dyn SignatureResolver> = Arc::new(LocalResolver::new(registry));

    let (remote, abis): (Arc<dyn SignatureResolver>, Arc<dyn AbiSource>) = if config.offline {
        (Arc::new(NoSignatures), Arc::new(NoAbiSource))
    } else {
        let http = http_client(config.http_timeout())?;
        let remote = FallbackResolver::new(
            Arc::new(OpenChainResolver::new(http.clone(), &config.openchain_url)),
            Arc::new(FourByteResolver::new(http.clone(), &config.fourbyte_url)),
        );
        (
            Arc::new(remote),
            Arc::new(SourcifyAbiSource::new(http, &config.sourcify_url)),
        )
    };

    let signatures = CachedResolver::new(FallbackResolver::new(local, remote));
    Ok(Decoder::new(Arc::new(signatures), abis).with_config(config.decoder_config()))
}

fn render_call(call: &DecodedCall, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    let title = if call.function_name.is_empty() {
        format!("{}{}", call.label(), call.signature)
    } else {
        call.signature.clone()
    };
    out.push_str(&format!("{pad}{title}  <{}>\n", call.source));
    for argument in &call.arguments {
        render_argument(argument, indent + 1, out);
    }
}

fn render_argument(argument: &Argument, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    let head = format!("{pad}{} ({})", argument.name, argument.declared_type);
    match &argument.value {
        DecodedValue::Scalar(scalar) => out.push_str(&format!("{head}: {scalar}\n")),
        DecodedValue::Raw(raw) => out.push_str(&format!("{head}: {}\n", format_dyn_sol_value(raw))),
        DecodedValue::Bytes(None) | DecodedValue::Tuple(None) => out.push_str(&format!(
            "{head}: {}\n",
            format_dyn_sol_value(&argument.raw_value)
        )),
        DecodedValue::Bytes(Some(inner)) => {
            out.push_str(&format!("{head}:\n"));
            render_call(inner, indent + 1, out);
        }
        DecodedValue::Tuple(Some(children)) | DecodedValue::Array(children) => {
            out.push_str(&format!("{head}:\n"));
            for child in children {
                render_argument(child, indent + 1, out);
            }
        }
    }
}
