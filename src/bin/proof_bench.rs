//! Proof Benchmark Tool
//!
//! Usage:
//! cargo run --bin proof_bench --release -- --d 1024 --workers 4 --samples 5
//! cargo run --bin proof_bench --release -- --d 64 --b1 7 --chunk 16 --tables

extern crate clap;
extern crate rand;
extern crate tumbler_nizk;

use std::process;
use std::time::{Duration, Instant};

use clap::{App, Arg};
use rand::thread_rng;

use tumbler_nizk::curve::Secp256k1Point;
use tumbler_nizk::{lattice, puzzle};
use tumbler_nizk::{Proof, ProofError, ProofGens, ProtocolParams, Prover, Verifier, Witness, WorkerPool};

fn main() {
    let matches = App::new("Tumbler NIZK Benchmark")
        .version("0.1")
        .about("Times proof generation and verification on secp256k1")
        .arg(Arg::with_name("d")
            .short("d")
            .long("d")
            .value_name("D")
            .help("Ring dimension (default: 1024)")
            .takes_value(true))
        .arg(Arg::with_name("b1")
            .long("b1")
            .value_name("BITS")
            .help("Bit width of the quotient coefficients (default: 11)")
            .takes_value(true))
        .arg(Arg::with_name("chunk")
            .short("c")
            .long("chunk")
            .value_name("LEN")
            .help("Message coefficients per puzzle point (default: 64)")
            .takes_value(true))
        .arg(Arg::with_name("workers")
            .short("w")
            .long("workers")
            .value_name("N")
            .help("Worker threads (default: one per core)")
            .takes_value(true))
        .arg(Arg::with_name("samples")
            .short("s")
            .long("samples")
            .value_name("N")
            .help("Number of samples (default: 3)")
            .takes_value(true))
        .arg(Arg::with_name("tables")
            .short("t")
            .long("tables")
            .help("Precompute fixed-base tables before proving"))
        .get_matches();

    let defaults = ProtocolParams::default();
    let params = ProtocolParams {
        d: parse_or(&matches, "d", defaults.d),
        b1: parse_or(&matches, "b1", defaults.b1),
        chunk_len: parse_or(&matches, "chunk", defaults.chunk_len),
        ..defaults
    };
    let samples = parse_or(&matches, "samples", 3usize);
    let pool = match matches.value_of("workers").and_then(|s| s.parse().ok()) {
        Some(n) => WorkerPool::new(n),
        None => Ok(WorkerPool::default()),
    };

    let result = pool.and_then(|pool| run_benchmark(&params, &pool, samples, matches.is_present("tables")));
    if let Err(e) = result {
        println!("error: {}", e);
        process::exit(1);
    }
}

fn parse_or<T: std::str::FromStr>(matches: &clap::ArgMatches, name: &str, default: T) -> T {
    matches.value_of(name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn run_benchmark(
    params: &ProtocolParams,
    pool: &WorkerPool,
    samples: usize,
    tables: bool,
) -> Result<(), ProofError> {
    params.validate()?;

    println!("\n{}", "=".repeat(64));
    println!("Configuration:");
    println!("  D = {}, Q = {}, T = {}", params.d, params.q, params.t);
    println!("  witness bits L = {} (padded {})", params.witness_len(), params.padded_len());
    println!("  puzzle points = {}", params.puzzle_count());
    println!("  workers = {}, samples = {}", pool.workers(), samples);
    println!("{}", "=".repeat(64));

    let start = Instant::now();
    let mut gens = ProofGens::<Secp256k1Point>::new(params)?;
    println!("\nGenerators derived in {:.2?}", start.elapsed());
    if tables {
        let start = Instant::now();
        gens.precompute_tables(pool);
        println!("Fixed-base tables built in {:.2?}", start.elapsed());
    }

    let mut rng = thread_rng();
    let (_, pk) = lattice::keygen(params, &mut rng)?;
    let m = lattice::sample_message(params, &mut rng)?;
    let (ct, randomness) = lattice::encrypt(params, &pk, &m, &mut rng)?;
    let witness = Witness::new(&randomness, &m);
    let puzzles = puzzle::puzzle_points::<Secp256k1Point>(params, &m)?;

    let prover = Prover::new(params, &gens, pool)?;
    let verifier = Verifier::new(params, &gens, pool)?;

    let mut prove_time = Duration::new(0, 0);
    let mut verify_time = Duration::new(0, 0);
    let mut proof = None;
    for i in 0..samples {
        let start = Instant::now();
        let p = prover.prove(&ct, &pk, &witness, &mut rng)?;
        let t_prove = start.elapsed();

        let start = Instant::now();
        verifier.verify(&p, &ct, &pk, &puzzles)?;
        let t_verify = start.elapsed();

        println!("  sample {}: prove {:.2?}, verify {:.2?}", i + 1, t_prove, t_verify);
        prove_time += t_prove;
        verify_time += t_verify;
        proof = Some(p);
    }

    if let Some(p) = proof {
        println!("\nResults:");
        println!("  mean prove   {:.2?}", prove_time / samples as u32);
        println!("  mean verify  {:.2?}", verify_time / samples as u32);
        println!("  proof size   {} bytes ({} compressed)",
            p.to_bytes().len(),
            p.to_compressed_bytes().len());
        debug_assert_eq!(
            p.to_bytes().len(),
            Proof::<Secp256k1Point>::serialized_size(params, false)
        );
    }
    Ok(())
}
