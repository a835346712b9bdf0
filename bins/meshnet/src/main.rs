//! meshnet command - apply mesh topologies to namespace-based network emulation.

mod commands;

use clap::{Args, Parser, Subcommand};
use meshnet::ApplyOptions;

#[derive(Parser)]
#[command(name = "meshnet", version, about = "Mesh network emulation with namespaces")]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
struct GlobalOpts {
    /// Log every step.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Do not apply or update traffic shaping.
    #[arg(long, visible_alias = "ignore-tc", global = true)]
    ignore_shaping: bool,

    /// Turn ARP off on created interfaces.
    #[arg(long, global = true)]
    block_arp: bool,

    /// Turn multicast off on created interfaces.
    #[arg(long, global = true)]
    block_multicast: bool,
}

impl GlobalOpts {
    fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            ignore_shaping: self.ignore_shaping,
            block_arp: self.block_arp,
            block_multicast: self.block_multicast,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Change the emulated network from one topology to another.
    Change(commands::change::ChangeCmd),

    /// List network namespaces.
    #[command(visible_alias = "ls")]
    List(commands::list::ListCmd),

    /// Delete all network namespaces.
    Clear(commands::clear::ClearCmd),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.global.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = cli.global.apply_options();

    let result = match cli.command {
        Command::Change(cmd) => cmd.run(&options).await,
        Command::List(cmd) => cmd.run().await,
        Command::Clear(cmd) => cmd.run().await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if e
            .downcast_ref::<meshnet::Error>()
            .is_some_and(meshnet::Error::leaves_inconsistent_state)
        {
            eprintln!("Network might be in an undefined state!");
        }
        std::process::exit(1);
    }

    Ok(())
}
