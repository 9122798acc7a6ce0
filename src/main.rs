mod rsa;

use std::fs::File;
use std::io::{self, Read, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use num_bigint::BigUint;

use crate::rsa::config::{DEFAULT_PRIME_BITS, DEFAULT_ROUNDS};
use crate::rsa::{Key, KeySet, RsaConfig};

#[derive(Debug, Parser)]
#[command(about = "Textbook RSA: generate keypairs, encode and decode raw blocks")]
struct Args {
    #[arg(short, long, default_value = "generate", help = "Run mode: generate, encode, decode, roundtrip")]
    mode: String,
    #[arg(short, long, default_value = "stdin", help = "Input filename, or `stdin'")]
    input: String,
    #[arg(short, long, default_value = "stdout", help = "Output filename, or `stdout'")]
    output: String,
    #[arg(short, long, default_value_t = DEFAULT_PRIME_BITS, help = "Bit width per prime")]
    bits: u64,
    #[arg(short, long, default_value_t = DEFAULT_ROUNDS, help = "Miller-Rabin rounds per candidate")]
    rounds: u32,
    #[arg(short, long, default_value_t = 0, help = "Prime search threads, 0 = all cores")]
    threads: usize,
    #[arg(short, long, help = "Exponent as a decimal string (public for encode, private for decode)")]
    exponent: Option<String>,
    #[arg(short = 'n', long, help = "Modulus as a decimal string (encode/decode)")]
    modulus: Option<String>,
    #[arg(short, long, default_value_t = false, help = "Disable log output")]
    silent: bool,
}

#[derive(Debug, Clone, Copy)]
enum RunMode {
    Generate,
    Encode,
    Decode,
    Roundtrip,
}

impl Args {
    fn run_mode(&self) -> Result<RunMode> {
        match self.mode.as_str() {
            "generate" => Ok(RunMode::Generate),
            "encode" => Ok(RunMode::Encode),
            "decode" => Ok(RunMode::Decode),
            "roundtrip" => Ok(RunMode::Roundtrip),
            m => bail!("unknown run mode `{m}'; available: generate(default), encode, decode, roundtrip"),
        }
    }

    fn config(&self) -> RsaConfig {
        let mut cfg = RsaConfig {
            prime_bits: self.bits,
            rounds: self.rounds,
            ..RsaConfig::default()
        };
        if self.threads > 0 {
            cfg.threads = self.threads;
        }
        cfg
    }

    fn reader(&self) -> Result<Box<dyn Read>> {
        Ok(match self.input.as_str() {
            "stdin" => Box::new(io::stdin()),
            f => Box::new(File::open(f).with_context(|| format!("opening input {f}"))?),
        })
    }

    fn writer(&self) -> Result<Box<dyn Write>> {
        Ok(match self.output.as_str() {
            "stdout" => Box::new(io::stdout()),
            f => Box::new(File::create(f).with_context(|| format!("creating output {f}"))?),
        })
    }

    fn key_from_args(&self) -> Result<Key> {
        let exponent = self
            .exponent
            .as_deref()
            .context("encode/decode needs --exponent")?
            .parse::<BigUint>()
            .context("--exponent must be a decimal integer")?;
        let modulus = self
            .modulus
            .as_deref()
            .context("encode/decode needs --modulus")?
            .parse::<BigUint>()
            .context("--modulus must be a decimal integer")?;
        Ok(Key { exponent, modulus })
    }
}

fn read_data(reader: &mut dyn Read) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).context("reading input")?;
    Ok(data)
}

fn write_data(writer: &mut dyn Write, data: &[u8]) -> Result<()> {
    writer.write_all(data).context("writing output")?;
    writer.flush().context("flushing output")?;
    Ok(())
}

fn spinner(silent: bool, msg: String) -> Result<Option<ProgressBar>> {
    if silent {
        return Ok(None);
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")?);
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(Some(pb))
}

fn generate(args: &Args) -> Result<KeySet> {
    let pb = spinner(
        args.silent,
        format!("searching two {}-bit probable primes", args.bits),
    )?;
    let key_set = KeySet::generate(&args.config())?;
    if let Some(pb) = pb {
        pb.finish_with_message("keypair ready");
    }
    Ok(key_set)
}

fn run(args: &Args) -> Result<()> {
    match args.run_mode()? {
        RunMode::Generate => {
            let key_set = generate(args)?;
            let mut writer = args.writer()?;
            writeln!(writer, "e {}", key_set.public.exponent)?;
            writeln!(writer, "d {}", key_set.private.exponent)?;
            writeln!(writer, "n {}", key_set.public.modulus)?;
            writer.flush()?;
        }
        RunMode::Encode | RunMode::Decode => {
            let key = args.key_from_args()?;
            let data = read_data(&mut args.reader()?)?;
            let res = match args.run_mode()? {
                RunMode::Encode => crate::rsa::encrypt(&data, &key),
                _ => crate::rsa::decrypt(&data, &key),
            }?;
            write_data(&mut args.writer()?, &res)?;
        }
        RunMode::Roundtrip => {
            let key_set = generate(args)?;
            let data = read_data(&mut args.reader()?)?;
            let encoded = key_set.encode(&data)?;
            let decoded = key_set.decode(&encoded)?;
            if BigUint::from_bytes_be(&decoded) != BigUint::from_bytes_be(&data) {
                bail!("round trip mismatch: {} bytes in, {} bytes back", data.len(), decoded.len());
            }
            if !args.silent {
                println!(
                    "round trip ok: {} bytes -> {} byte block -> {} bytes",
                    data.len(),
                    encoded.len(),
                    decoded.len()
                );
            }
            write_data(&mut args.writer()?, &decoded)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let mut args = Args::parse();
    if args.output == "stdout" && args.mode != "generate" {
        // keep logs off the data stream
        args.silent = true;
    }
    run(&args)
}

#[cfg(test)]
mod tests {
    use crate::rsa::{KeySet, RsaConfig};

    #[test]
    fn generate_encode_decode_in_process() {
        let cfg = RsaConfig {
            prime_bits: 32,
            ..RsaConfig::default()
        };
        let key_set = KeySet::generate(&cfg).unwrap();
        let message = b"A";
        let encoded = key_set.encode(message).unwrap();
        let decoded = key_set.decode(&encoded).unwrap();
        assert_eq!(decoded, message.to_vec());
    }
}
