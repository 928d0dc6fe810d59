use std::io::Write;

use anyhow::Context;
use flakeid::{
    AtomicGenerator, Config, EntityKind, Field, IdGenerator, LockGenerator, MonotonicClock,
    PREFIX_SEPARATOR, PublicIds,
};
use serde_json::json;

use super::config::{CliConfig, Command, Strategy};

/// Executes the parsed command, writing results to `out`.
pub fn run(cli: CliConfig, out: &mut impl Write) -> anyhow::Result<()> {
    let CliConfig {
        config,
        registry,
        encoding,
        command,
    } = cli;
    let public = PublicIds::new(registry, encoding.encoder());

    match command {
        Command::Generate {
            count,
            strategy,
            kind,
        } => generate(out, config, &public, count, strategy, kind.as_deref()),
        Command::Decode { id, json } => decode(out, &config, &public, &id, json),
        Command::Layout { json } => layout(out, &config, json),
    }
}

fn generate<E: flakeid::Encoder>(
    out: &mut impl Write,
    config: Config,
    public: &PublicIds<E>,
    count: usize,
    strategy: Strategy,
    kind: Option<&str>,
) -> anyhow::Result<()> {
    tracing::debug!(?config, count, ?strategy, kind, "generating");

    let clock = MonotonicClock::new();
    let generator: Box<dyn IdGenerator> = match strategy {
        Strategy::Atomic => Box::new(AtomicGenerator::new(config, clock)?),
        Strategy::Lock => Box::new(LockGenerator::new(config, clock)?),
    };

    match kind {
        Some(name) => {
            let kind = public
                .registry()
                .get(name)
                .with_context(|| format!("unknown entity kind {name:?}"))?;
            for _ in 0..count {
                let id = generator.generate_for(kind)?;
                writeln!(out, "{}", public.encode(id, kind))?;
            }
        }
        None => {
            for id in generator.generate_batch(count)? {
                writeln!(out, "{}", public.encoder().encode(id))?;
            }
        }
    }
    Ok(())
}

fn decode<E: flakeid::Encoder>(
    out: &mut impl Write,
    config: &Config,
    public: &PublicIds<E>,
    input: &str,
    json: bool,
) -> anyhow::Result<()> {
    let (raw, kind) = if !public.registry().is_empty() && input.contains(PREFIX_SEPARATOR) {
        let (raw, kind) = public
            .decode(input)
            .with_context(|| format!("cannot decode public id {input:?}"))?;
        (raw, Some(kind))
    } else {
        let raw = public
            .encoder()
            .decode(input)
            .with_context(|| format!("cannot decode {input:?} as {}", public.encoder().name()))?;
        (raw, None)
    };

    let parsed = config.decode(raw);
    if let Some(kind) = kind {
        if parsed.app != kind.code() {
            tracing::warn!(
                app = parsed.app,
                code = kind.code(),
                prefix = kind.prefix(),
                "app field does not match the prefix's entity code"
            );
        }
    }

    if json {
        let value = json!({
            "id": raw,
            "kind": kind.map(EntityKind::name),
            "components": parsed,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    } else {
        writeln!(out, "id         {raw}")?;
        if let Some(kind) = kind {
            writeln!(out, "kind       {}", kind.name())?;
        }
        writeln!(out, "timestamp  {} ms", parsed.timestamp_millis)?;
        writeln!(out, "elapsed    {} ms", parsed.elapsed_millis)?;
        writeln!(out, "region     {}", parsed.region)?;
        writeln!(out, "app        {}", parsed.app)?;
        writeln!(out, "machine    {}", parsed.machine)?;
        writeln!(out, "sequence   {}", parsed.sequence)?;
    }
    Ok(())
}

fn layout(out: &mut impl Write, config: &Config, json: bool) -> anyhow::Result<()> {
    let layout = config.layout();

    if json {
        let fields: Vec<_> = Field::ALL
            .iter()
            .map(|&field| {
                json!({
                    "field": field.name(),
                    "bits": layout.bits(field),
                    "shift": layout.shift(field),
                    "max": layout.max(field),
                })
            })
            .collect();
        let value = json!({
            "epoch_ms": config.epoch_millis(),
            "widths": layout.widths(),
            "fields": fields,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    } else {
        writeln!(out, "epoch {} ms", config.epoch_millis())?;
        writeln!(
            out,
            "{:<10} {:>4} {:>5} {:>20}",
            "field", "bits", "shift", "max"
        )?;
        for field in Field::ALL {
            writeln!(
                out,
                "{:<10} {:>4} {:>5} {:>20}",
                field.name(),
                layout.bits(field),
                layout.shift(field),
                layout.max(field)
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::config::CliArgs;

    fn run_args(args: &[&str]) -> anyhow::Result<String> {
        let cli = CliConfig::try_from(CliArgs::try_parse_from(args)?)?;
        let mut out = Vec::new();
        run(cli, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn generates_requested_count_in_order() {
        let out = run_args(&["flakeid", "--machine", "7", "generate", "-n", "50"]).unwrap();
        let ids: Vec<u64> = out.lines().map(|line| line.parse().unwrap()).collect();
        assert_eq!(ids.len(), 50);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn generated_public_id_decodes_to_its_kind() {
        let entities = ["--entity", "user:1:usr", "--entity", "order:2:ord"];
        let mut args = vec!["flakeid", "--encoding", "base62"];
        args.extend(entities);
        args.extend(["generate", "--strategy", "lock", "--kind", "order"]);

        let out = run_args(&args).unwrap();
        let public_id = out.trim();
        assert!(public_id.starts_with("ord_"));

        let mut args = vec!["flakeid", "--encoding", "base62"];
        args.extend(entities);
        args.extend(["decode", public_id, "--json"]);
        let decoded: serde_json::Value = serde_json::from_str(&run_args(&args).unwrap()).unwrap();
        assert_eq!(decoded["kind"], "order");
        assert_eq!(decoded["components"]["app"], 2);
    }

    #[test]
    fn decodes_raw_id() {
        // timestamp 1, region 2, app 3, machine 4, sequence 5 in the default layout
        let id = (1_u64 << 22) | (2 << 18) | (3 << 15) | (4 << 10) | 5;
        let out = run_args(&["flakeid", "--epoch-ms", "0", "decode", &id.to_string()]).unwrap();
        assert!(out.contains("timestamp  1 ms"));
        assert!(out.contains("region     2"));
        assert!(out.contains("app        3"));
        assert!(out.contains("machine    4"));
        assert!(out.contains("sequence   5"));
    }

    #[test]
    fn decode_reports_bad_input() {
        let err = run_args(&["flakeid", "--encoding", "hex", "decode", "xyz"]).unwrap_err();
        assert!(err.to_string().contains("cannot decode"));
    }

    #[test]
    fn layout_json() {
        let out = run_args(&["flakeid", "layout", "--json"]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["fields"][0]["shift"], 22);
        assert_eq!(value["fields"][4]["max"], 1023);
        assert_eq!(value["widths"]["machine"], 5);
    }
}
