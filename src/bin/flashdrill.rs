use anyhow::Result;
use clap::{ArgAction, Parser};
use env_logger::{Env, Target};
use flashdrill::deck::{self, DeckError};
use flashdrill::log_path;
use flashdrill::session::{Session, SessionOptions, SleepPacer};
use flashdrill::store::{CardStore, DEFAULT_BUCKETS};
use log::*;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Drill question/answer cards in the terminal")]
#[command(disable_help_flag = true)]
struct Args {
    /// deck file, one `question,answer,priority` per line
    #[arg(short, long, default_value = "cards.csv")]
    file: PathBuf,

    /// show the right answer after a wrong one
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// print every card and exit
    #[arg(short = 'L', long, default_value_t = false)]
    list: bool,

    /// print help
    #[arg(short, long, short_alias = '?', action = ArgAction::Help)]
    help: Option<bool>,
}

fn init_logger() {
    let Some(log_path) = log_path() else { return };
    let Ok(log_file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(log_file)))
        .init();
}

fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // usage, help and version all end here
            e.print()?;
            return Ok(());
        }
    };
    init_logger();

    let mut store = CardStore::with_buckets(DEFAULT_BUCKETS)?;
    match deck::load(&args.file, &mut store) {
        Ok(_) => {}
        Err(e @ DeckError::Store(_)) => return Err(e.into()),
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            return Ok(());
        }
    }

    if store.is_empty() {
        println!("No cards!");
        return Ok(());
    }

    if args.list {
        deck::dump(&store, &mut io::stdout().lock())?;
        return Ok(());
    }

    let options = SessionOptions {
        deck_path: args.file,
        show_answer: args.verbose,
    };
    let summary = Session::new(
        &mut store,
        options,
        io::stdin().lock(),
        io::stdout().lock(),
        io::stderr(),
        SleepPacer::default(),
        rand::rng(),
    )
    .run()?;
    debug!("{summary:?}");

    store.destroy();
    Ok(())
}
