use std::env;
use std::path::Path;

use getopts::Options;

use tld_verify::dns::protocol::Proto;
use tld_verify::verify::{TldVerifier, DEFAULT_SNAPSHOT_FILE};

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options] DOMAIN", program);
    print!("{}", opts.usage(&brief));
}

/// Main entry point for the tld-verify command line tool
fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .expect("Failed to initialize logger");

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optflag("h", "help", "print this help menu");
    opts.optflag(
        "o",
        "offline",
        "Verify against the stored registry snapshot instead of live DNS",
    );
    opts.optflag("t", "tcp", "Query over TCP instead of UDP");
    opts.optflag(
        "r",
        "refresh",
        "Refresh the registry snapshot from IANA before verifying",
    );
    opts.optopt(
        "c",
        "cache-file",
        "Location of the registry snapshot file",
        "FILE",
    );
    opts.optopt(
        "s",
        "server",
        "DNS server to query (repeatable, tried in order)",
        "SERVER",
    );

    let opt_matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            eprintln!("{}", f);
            std::process::exit(2);
        }
    };

    if opt_matches.opt_present("h") || opt_matches.free.is_empty() {
        print_usage(&program, opts);
        return;
    }

    let domain_name = opt_matches.free[0].clone();
    let snapshot_file = opt_matches
        .opt_str("c")
        .unwrap_or_else(|| DEFAULT_SNAPSHOT_FILE.to_string());

    let mut verifier = TldVerifier::new().with_snapshot_file(Path::new(&snapshot_file));
    verifier.servers = opt_matches.opt_strs("s");

    if opt_matches.opt_present("r") {
        match verifier.refresh() {
            Ok(outcome) => log::info!("Registry refresh: {:?}", outcome),
            Err(e) => {
                log::error!("Registry refresh failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    let result = if opt_matches.opt_present("o") {
        log::info!("Verifying domain {} using offline method", domain_name);
        verifier.verify_offline(&domain_name)
    } else {
        let proto = if opt_matches.opt_present("t") {
            Proto::Tcp
        } else {
            Proto::Udp
        };
        log::info!("Verifying domain {} using DNS protocol", domain_name);
        verifier.verify(&domain_name, proto)
    };

    match result {
        Ok(exists) => {
            println!("The result is {}", exists);
            if !exists {
                std::process::exit(1);
            }
        }
        Err(e) => {
            log::error!("Verification failed: {}", e);
            std::process::exit(1);
        }
    }
}
