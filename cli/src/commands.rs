use crate::{
    args::{Args, LedgerCommand},
    error::{CliError, CliResult},
};
use log::debug;
use satledger_codec::{CodecError, decode, decode_canonical, try_encode};
use satledger_ledger::{
    Amount, SelectionPolicy, UtxoRegistry,
    config::Config,
    header::{BlockHeaderCandidate, generate_header_candidates_with},
    tx::{TransactionData, TransactionOutput},
};
use std::fmt::Write;

/// Executes the parsed command and returns what should be printed
pub fn run(args: &Args) -> CliResult<String> {
    let config = args.to_config();
    match &args.command {
        Some(LedgerCommand::Encode { value }) => encode_command(value),
        Some(LedgerCommand::Decode { hex }) => decode_command(hex, &config),
        Some(LedgerCommand::Select { target, policy, utxos }) => {
            let registry: UtxoRegistry = args.utxos.iter().chain(utxos.iter()).cloned().collect();
            select_command(&registry, Amount::from_sat(*target), policy.unwrap_or(config.selection_policy))
        }
        Some(LedgerCommand::Summarize { min_value, values }) => Ok(summarize_command(&config, *min_value, values)),
        Some(LedgerCommand::Headers { prev_block_hash, merkle_root, timestamp, bits, start_nonce }) => {
            let template = BlockHeaderCandidate::new(prev_block_hash.as_str(), merkle_root.as_str(), *timestamp, *bits);
            Ok(headers_command(&config, template, *start_nonce))
        }
        None => Err(CliError::MissingCommand),
    }
}

fn encode_command(value: &str) -> CliResult<String> {
    // Anything that is not an integer at all is as unrepresentable as one that is out of range
    let parsed: i128 = value.trim().parse().map_err(|_| CodecError::InvalidValue(value.to_string()))?;
    let encoded = try_encode(parsed)?;
    Ok(faster_hex::hex_string(&encoded))
}

fn decode_command(hex: &str, config: &Config) -> CliResult<String> {
    let hex = hex.trim().trim_start_matches("0x");
    let mut bytes = vec![0u8; hex.len() / 2];
    faster_hex::hex_decode(hex.as_bytes(), &mut bytes)?;

    let (value, consumed) = if config.strict_canonical_decoding { decode_canonical(&bytes)? } else { decode(&bytes)? };
    if consumed < bytes.len() {
        debug!("Ignoring {} trailing bytes", bytes.len() - consumed);
    }
    Ok(format!("{value} {consumed}"))
}

fn select_command(registry: &UtxoRegistry, target: Amount, policy: SelectionPolicy) -> CliResult<String> {
    debug!("Selecting for target {target} from {} UTXOs using {policy}", registry.count());
    let selected: UtxoRegistry = registry.select_for_target_with(target, policy).into_iter().collect();
    if selected.is_empty() && target > Amount::ZERO {
        return Err(CliError::InsufficientFunds { balance: registry.balance(), target });
    }

    let mut output = String::new();
    for utxo in selected.iter_selection_order() {
        let _ = writeln!(output, "{utxo}");
    }
    let _ = write!(
        output,
        "selected {} of {} UTXOs, total {} for target {target}",
        selected.count(),
        registry.count(),
        selected.balance()
    );
    Ok(output)
}

fn summarize_command(config: &Config, min_value: u64, values: &[u64]) -> String {
    let mut tx = TransactionData::default();
    for (i, &value) in values.iter().enumerate() {
        tx.add_output(TransactionOutput::new(Amount::from_sat(value), format!("output{i}")));
    }
    let summary = tx.summarize_outputs_with(config, Amount::from_sat(min_value));
    format!("counted {} of {} outputs, total {} (cap {})", summary.count, values.len(), summary.total, config.summary_cap)
}

fn headers_command(config: &Config, template: BlockHeaderCandidate, start_nonce: u64) -> String {
    let lines: Vec<_> = generate_header_candidates_with(template, start_nonce, config)
        .map(|candidate| format!("{} {}", candidate.nonce, candidate.hash_hex()))
        .collect();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn run_args(argv: &[&str]) -> CliResult<String> {
        run(&Args::parse(argv).unwrap())
    }

    #[test]
    fn test_encode() {
        assert_eq!(run_args(&["satledger", "encode", "252"]).unwrap(), "fc");
        assert_eq!(run_args(&["satledger", "encode", "253"]).unwrap(), "fdfd00");
        assert_eq!(run_args(&["satledger", "encode", "65536"]).unwrap(), "fe00000100");
        assert_eq!(run_args(&["satledger", "encode", "18446744073709551615"]).unwrap(), "ffffffffffffffffff");

        for bad in ["-1", "18446744073709551616", "1.5", "abc"] {
            assert!(matches!(run_args(&["satledger", "encode", bad]), Err(CliError::Codec(CodecError::InvalidValue(_)))), "{bad}");
        }
    }

    #[test]
    fn test_decode() {
        assert_eq!(run_args(&["satledger", "decode", "fdfd00"]).unwrap(), "253 3");
        assert_eq!(run_args(&["satledger", "decode", "0x05ffff"]).unwrap(), "5 1");
        assert_eq!(run_args(&["satledger", "decode", "fd0500"]).unwrap(), "5 3");

        assert!(matches!(
            run_args(&["satledger", "--strict", "decode", "fd0500"]),
            Err(CliError::Codec(CodecError::NonCanonical { .. }))
        ));
        assert!(matches!(run_args(&["satledger", "decode", "fd01"]), Err(CliError::Codec(CodecError::TooShort { .. }))));
        assert!(matches!(run_args(&["satledger", "decode", "zz"]), Err(CliError::ParseHex(_))));
    }

    #[test]
    fn test_params_from_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[params]\nsummary-cap = 10\nmax-header-attempts = 2").unwrap();
        let path = file.path().to_str().unwrap();

        let output = run_args(&["satledger", "-C", path, "summarize", "100", "100", "100"]).unwrap();
        assert_eq!(output, "counted 1 of 3 outputs, total 100 (cap 10)");
        let output = run_args(&["satledger", "summarize", "--min", "50", "100", "10", "100"]).unwrap();
        assert_eq!(output, "counted 2 of 3 outputs, total 200 (cap 1000000000)");

        let output = run_args(&["satledger", "-C", path, "headers", "--prev", "00", "--merkle", "ab", "--nonce", "5"]).unwrap();
        let nonces: Vec<_> = output.lines().map(|line| line.split(' ').next().unwrap()).collect();
        assert_eq!(nonces, vec!["5", "6"]);
        assert!(output.lines().all(|line| line.len() == 2 + 64));
    }

    #[test]
    fn test_select() {
        let output = run_args(&["satledger", "select", "--target", "1000", "a:0:500", "b:1:1500", "c:0:100"]).unwrap();
        assert_eq!(output, "b:1 (1500)\na:0 (500)\nc:0 (100)\nselected 3 of 3 UTXOs, total 2100 for target 1000");

        let output = run_args(&["satledger", "select", "--target", "1000", "--policy", "early-stop", "a:0:500", "b:1:1500"]).unwrap();
        assert_eq!(output, "b:1 (1500)\nselected 1 of 2 UTXOs, total 1500 for target 1000");

        assert!(matches!(
            run_args(&["satledger", "select", "--target", "5000", "a:0:500"]),
            Err(CliError::InsufficientFunds { balance: 500, .. })
        ));
    }
}
