use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::debug;

use teleporter_search::{CliArgs, RegisterSearch, SearchConfig, SearchOutcome};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = CliArgs::parse();
    debug!("{:?}", args);

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("failed to install Ctrl-C handler")?;

    let search = RegisterSearch::with_cancel(SearchConfig::from(&args), cancel)
        .context("bad arguments")?;
    let outcome = search
        .run(|r| println!("Trying: {}", r))
        .context("search could not start")?;

    match outcome {
        SearchOutcome::Found(r) => {
            println!("Found Answer: {}", r);
            if args.verify {
                if !search.verify(r).context("verification failed")? {
                    let other = search.config().evaluator.other();
                    bail!("register {} does not pass the check under the {:?} evaluator", r, other);
                }
                println!("Verified: {}", r);
            }
        }
        SearchOutcome::NotFound => println!("No answer found."),
        SearchOutcome::Cancelled { next } => {
            println!("Search cancelled before register {}.", next);
            process::exit(130);
        }
        SearchOutcome::Aborted { register, error } => {
            println!("Search aborted at register {}: {}.", register, error);
            process::exit(2);
        }
    }
    Ok(())
}
