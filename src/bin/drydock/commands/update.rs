//! Implementation of `drydock update`.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use drydock::checker::{
    CommandAdder, CommandResolver, DeclaredResolver, NativeResolver, TopLevelAdder,
};
use drydock::ops::{self, UpdateOptions};
use drydock::provider::LocalProvider;
use drydock::{Outcome, MANIFEST_NAME};

use crate::cli::UpdateArgs;

pub fn execute(args: UpdateArgs) -> Result<()> {
    let repo = match args.repo {
        Some(path) => path,
        None => env::current_dir().context("failed to determine current directory")?,
    };
    let provider = LocalProvider::new(repo);

    let resolver: Box<dyn NativeResolver> = match &args.checker {
        Some(program) => Box::new(CommandResolver::new(program.clone(), Vec::new())),
        None => Box::new(DeclaredResolver::new()),
    };
    let adder = args
        .add_tool
        .as_ref()
        .map(|program| CommandAdder::new(program.clone(), Vec::new()));

    let roots = if args.roots.is_empty() {
        vec![MANIFEST_NAME.to_string()]
    } else {
        args.roots
    };

    let opts = UpdateOptions {
        roots,
        dependency: args.name,
        previous: args.previous,
        new_version: args.version,
        transitive: args.transitive,
        check_timeout: Duration::from_secs(args.check_timeout),
        dry_run: args.dry_run,
    };

    let report = ops::update(
        &provider,
        resolver.as_ref(),
        adder.as_ref().map(|a| a as &dyn TopLevelAdder),
        &opts,
    )?;

    for file in &report.changed {
        if opts.dry_run {
            println!("would update {}", file.path);
        } else {
            println!("updated {}", file.path);
        }
    }

    match report.outcome {
        Outcome::Updated => println!("{}: updated to {}", opts.dependency, opts.new_version),
        Outcome::AlreadyCorrect => {
            println!("{}: already at {}", opts.dependency, opts.new_version)
        }
        Outcome::NotSupported => println!(
            "{}: not updated (unsupported declaration or failed consistency check)",
            opts.dependency
        ),
        Outcome::NotFound => println!("{}: not found in any build target", opts.dependency),
    }

    Ok(())
}
