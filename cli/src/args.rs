use clap::{Arg, ArgAction, Command, arg};
use satledger_ledger::{
    config::{Config, ConfigBuilder, params::Params},
    utxo::{SelectionPolicy, Utxo},
};
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use std::{ffi::OsString, fs};
use toml::from_str;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCommand {
    /// Encode an integer given in decimal. Kept as text so that out-of-range input is reported by the codec.
    Encode { value: String },
    Decode { hex: String },
    Select { target: u64, policy: Option<SelectionPolicy>, utxos: Vec<Utxo> },
    Summarize { min_value: u64, values: Vec<u64> },
    Headers { prev_block_hash: String, merkle_root: String, timestamp: u64, bits: u32, start_nonce: u64 },
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Args {
    // NOTE: property names match config file fields
    pub logdir: Option<String>,
    #[serde(rename = "loglevel")]
    pub log_level: String,
    pub strict: bool,
    pub params: Params,
    /// UTXOs available to `select`, in `<transaction_id>:<index>:<amount>` form
    #[serde_as(as = "Vec<DisplayFromStr>")]
    pub utxos: Vec<Utxo>,

    #[serde(skip)]
    pub command: Option<LedgerCommand>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            logdir: None,
            log_level: "info".into(),
            strict: false,
            params: Params::default(),
            utxos: vec![],
            command: None,
        }
    }
}

impl Args {
    pub fn to_config(&self) -> Config {
        ConfigBuilder::new(self.params.clone()).apply_args(|config| config.strict_canonical_decoding = self.strict).build()
    }
}

pub fn cli() -> Command {
    let defaults: Args = Default::default();

    Command::new("satledger")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg(arg!(-C --configfile <CONFIG_FILE> "Path of config file.").global(true))
        .arg(arg!(--logdir <LOG_DIR> "Directory to log output.").global(true))
        .arg(
            Arg::new("log_level")
                .short('d')
                .long("loglevel")
                .value_name("LEVEL")
                .global(true)
                .help(format!("Logging level, optionally per target: info,satledger_ledger=trace (default: {}).", defaults.log_level)),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Reject CompactSize values that are not minimally encoded."),
        )
        .subcommand(
            Command::new("encode")
                .about("Encodes an integer as a CompactSize and prints it as hex")
                .arg(
                    Arg::new("value")
                        .required(true)
                        .allow_hyphen_values(true)
                        .allow_negative_numbers(true)
                        .help("Integer in 0..=18446744073709551615"),
                ),
        )
        .subcommand(
            Command::new("decode")
                .about("Decodes a hex encoded CompactSize, printing the value and the number of bytes consumed")
                .arg(Arg::new("hex").required(true)),
        )
        .subcommand(
            Command::new("select")
                .about("Selects UTXOs covering a target amount")
                .arg(arg!(--target <AMOUNT> "Amount to cover, in satoshis.").required(true).value_parser(clap::value_parser!(u64)))
                .arg(
                    Arg::new("policy")
                        .long("policy")
                        .value_parser(clap::value_parser!(SelectionPolicy))
                        .help(format!("exhaustive or early-stop (default: {}).", defaults.params.selection_policy)),
                )
                .arg(
                    Arg::new("utxos")
                        .num_args(0..)
                        .value_name("UTXO")
                        .value_parser(clap::value_parser!(Utxo))
                        .help("<transaction_id>:<index>:<amount>, added to the UTXOs of the config file"),
                ),
        )
        .subcommand(
            Command::new("summarize")
                .about("Totals output values of at least --min, stopping once the total exceeds params.summary-cap")
                .arg(arg!(--min <AMOUNT> "Smallest output value counted.").default_value("0").value_parser(clap::value_parser!(u64)))
                .arg(Arg::new("values").num_args(0..).value_name("VALUE").value_parser(clap::value_parser!(u64))),
        )
        .subcommand(
            Command::new("headers")
                .about("Prints params.max-header-attempts header candidates with their SHA-256 hashes")
                .arg(arg!(--prev <HASH> "Previous block hash.").required(true))
                .arg(arg!(--merkle <ROOT> "Merkle root.").required(true))
                .arg(arg!(--timestamp <SECONDS> "Header timestamp.").default_value("0").value_parser(clap::value_parser!(u64)))
                .arg(arg!(--bits <BITS> "Compact difficulty target.").default_value("0").value_parser(clap::value_parser!(u32)))
                .arg(arg!(--nonce <START> "First nonce to try.").default_value("0").value_parser(clap::value_parser!(u64))),
        )
}

pub fn parse_args() -> Args {
    match Args::parse(std::env::args_os()) {
        Ok(args) => args,
        Err(err) => err.exit(),
    }
}

impl Args {
    pub fn parse<I, T>(itr: I) -> Result<Args, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let m: clap::ArgMatches = cli().try_get_matches_from(itr)?;
        let mut defaults: Args = Default::default();

        if let Some(config_file) = m.get_one::<String>("configfile") {
            let config_str = fs::read_to_string(config_file)?;
            defaults = from_str(&config_str).map_err(|toml_error| {
                clap::Error::raw(
                    clap::error::ErrorKind::ValueValidation,
                    format!("failed parsing config file, reason: {}", toml_error.message()),
                )
            })?;
        }

        let command = match m.subcommand() {
            Some(("encode", sub)) => sub.get_one::<String>("value").cloned().map(|value| LedgerCommand::Encode { value }),
            Some(("decode", sub)) => sub.get_one::<String>("hex").cloned().map(|hex| LedgerCommand::Decode { hex }),
            Some(("select", sub)) => sub.get_one::<u64>("target").map(|&target| LedgerCommand::Select {
                target,
                policy: sub.get_one::<SelectionPolicy>("policy").copied(),
                utxos: sub.get_many::<Utxo>("utxos").map(|utxos| utxos.cloned().collect()).unwrap_or_default(),
            }),
            Some(("summarize", sub)) => Some(LedgerCommand::Summarize {
                min_value: sub.get_one::<u64>("min").copied().unwrap_or_default(),
                values: sub.get_many::<u64>("values").map(|values| values.copied().collect()).unwrap_or_default(),
            }),
            Some(("headers", sub)) => Some(LedgerCommand::Headers {
                prev_block_hash: sub.get_one::<String>("prev").cloned().unwrap_or_default(),
                merkle_root: sub.get_one::<String>("merkle").cloned().unwrap_or_default(),
                timestamp: sub.get_one::<u64>("timestamp").copied().unwrap_or_default(),
                bits: sub.get_one::<u32>("bits").copied().unwrap_or_default(),
                start_nonce: sub.get_one::<u64>("nonce").copied().unwrap_or_default(),
            }),
            _ => None,
        };

        Ok(Args {
            logdir: m.get_one::<String>("logdir").cloned().or(defaults.logdir),
            log_level: m.get_one::<String>("log_level").cloned().unwrap_or(defaults.log_level),
            strict: m.get_flag("strict") || defaults.strict,
            params: defaults.params,
            utxos: defaults.utxos,
            command,
        })
    }
}
