use core::time::Duration;
use std::net::IpAddr;

use anyhow::{Context, bail};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use flakeid::{
    BitLayout, Config, DEFAULT_EPOCH, EntityRegistry, Field, Topology, machine_id_from_ip,
    machine_id_from_name,
};

const DEFAULT_EPOCH_MS: u64 = DEFAULT_EPOCH.as_millis() as u64;

/// Command-line arguments for the `flakeid` binary.
///
/// Every global option falls back to a `FLAKEID_*` environment variable, and a
/// `.env` file in the working directory is loaded before parsing.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakeid",
    version,
    about = "Generate, decode and inspect coordination-free 64-bit IDs"
)]
#[command(group(
    ArgGroup::new("machine_source").args(["machine", "machine_from_ip", "machine_from_name"])
))]
pub struct CliArgs {
    /// Region (datacenter) ID.
    ///
    /// Environment variable: `FLAKEID_REGION`
    #[arg(long, global = true, env = "FLAKEID_REGION", default_value_t = 0)]
    pub region: u64,

    /// Application ID. Overridden per ID by `generate --kind`.
    ///
    /// Environment variable: `FLAKEID_APP`
    #[arg(long, global = true, env = "FLAKEID_APP", default_value_t = 0)]
    pub app: u64,

    /// Machine ID. Defaults to 0 unless derived from an address or host name.
    ///
    /// Environment variable: `FLAKEID_MACHINE`
    #[arg(long, global = true, env = "FLAKEID_MACHINE")]
    pub machine: Option<u64>,

    /// Derive the machine ID from the low bits of this IP address.
    ///
    /// Environment variable: `FLAKEID_MACHINE_FROM_IP`
    #[arg(long, global = true, env = "FLAKEID_MACHINE_FROM_IP")]
    pub machine_from_ip: Option<IpAddr>,

    /// Derive the machine ID by hashing this host name.
    ///
    /// Environment variable: `FLAKEID_MACHINE_FROM_NAME`
    #[arg(long, global = true, env = "FLAKEID_MACHINE_FROM_NAME")]
    pub machine_from_name: Option<String>,

    /// Custom epoch, in milliseconds since the UNIX epoch.
    ///
    /// Environment variable: `FLAKEID_EPOCH_MS`
    #[arg(long, global = true, env = "FLAKEID_EPOCH_MS", default_value_t = DEFAULT_EPOCH_MS)]
    pub epoch_ms: u64,

    /// Field widths as `timestamp,region,app,machine,sequence`. Must sum to 64.
    ///
    /// Environment variable: `FLAKEID_LAYOUT`
    #[arg(
        long,
        global = true,
        env = "FLAKEID_LAYOUT",
        default_value = "42,4,3,5,10",
        value_parser = parse_layout
    )]
    pub layout: BitLayout,

    /// Textual form of identifiers on output (and expected on input).
    ///
    /// Environment variable: `FLAKEID_ENCODING`
    #[arg(
        long,
        global = true,
        env = "FLAKEID_ENCODING",
        value_enum,
        default_value_t = Encoding::Raw
    )]
    pub encoding: Encoding,

    /// Entity kind as `name:code:prefix`. Repeatable. The code is written to
    /// the app field of that kind's IDs.
    ///
    /// Environment variable: `FLAKEID_ENTITIES` (comma separated)
    #[arg(
        long = "entity",
        global = true,
        env = "FLAKEID_ENTITIES",
        value_delimiter = ',',
        value_parser = parse_entity
    )]
    pub entities: Vec<EntityArg>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate one or more identifiers, one per line.
    Generate {
        /// Number of identifiers to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Generator implementation.
        #[arg(long, value_enum, default_value_t = Strategy::Atomic)]
        strategy: Strategy,

        /// Emit `{prefix}_{id}` public IDs for this registered entity kind.
        #[arg(long)]
        kind: Option<String>,
    },
    /// Split an identifier (or a public ID) into its fields.
    Decode {
        /// Identifier in the configured encoding, or a prefixed public ID.
        id: String,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Print the bit layout: widths, shifts, masks and maxima.
    Layout {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Lock-free compare-and-swap
    Atomic,
    /// Mutex around the state word
    Lock,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Decimal integer
    Raw,
    /// 16 lowercase hex digits
    Hex,
    /// 13-character Crockford Base32
    Base32,
    /// Shortest Base62
    Base62,
}

/// One `--entity name:code:prefix` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityArg {
    pub name: String,
    pub code: u64,
    pub prefix: String,
}

fn parse_layout(s: &str) -> Result<BitLayout, String> {
    let widths = s
        .split(',')
        .map(|w| {
            w.trim()
                .parse::<u8>()
                .map_err(|e| format!("invalid width {w:?}: {e}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let [timestamp, region, app, machine, sequence] = widths[..] else {
        return Err(format!(
            "expected 5 comma-separated widths, got {}",
            widths.len()
        ));
    };
    BitLayout::new(timestamp, region, app, machine, sequence).map_err(|e| e.to_string())
}

fn parse_entity(s: &str) -> Result<EntityArg, String> {
    let mut parts = s.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(code), Some(prefix)) if !name.is_empty() => Ok(EntityArg {
            name: name.to_owned(),
            code: code
                .parse()
                .map_err(|e| format!("invalid code {code:?}: {e}"))?,
            prefix: prefix.to_owned(),
        }),
        _ => Err(format!("expected name:code:prefix, got {s:?}")),
    }
}

/// Validated settings for one invocation.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub config: Config,
    pub registry: EntityRegistry,
    pub encoding: Encoding,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let layout = args.layout;
        let machine_bits = layout.bits(Field::Machine);
        let machine = match (args.machine, args.machine_from_ip, &args.machine_from_name) {
            (Some(machine), ..) => machine,
            (None, Some(ip), _) => machine_id_from_ip(ip, machine_bits),
            (None, None, Some(name)) => machine_id_from_name(name, machine_bits),
            (None, None, None) => 0,
        };

        let config = Config::new(Topology::new(args.region, args.app, machine))
            .with_epoch(Duration::from_millis(args.epoch_ms))
            .with_layout(layout);
        config
            .validate()
            .context("invalid generator configuration")?;

        let mut registry = EntityRegistry::for_layout(&layout);
        for entity in &args.entities {
            registry
                .register(entity.name.as_str(), entity.code, entity.prefix.as_str())
                .with_context(|| format!("invalid entity {:?}", entity.name))?;
        }

        if let Command::Generate { count, kind, .. } = &args.command {
            if *count == 0 {
                bail!("--count must be greater than 0");
            }
            if let Some(kind) = kind {
                if registry.get(kind).is_none() {
                    bail!("unknown entity kind {kind:?}; register it with --entity {kind}:CODE:PREFIX");
                }
            }
        }

        Ok(Self {
            config,
            registry,
            encoding: args.encoding,
            command: args.command,
        })
    }
}
