mod logger;
mod syn;

const APP_NAME: &str = env!("CARGO_BIN_NAME");

type AnyResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[derive(clap::Parser)]
#[clap(name = APP_NAME, version, author, about)]
pub(crate) struct Entry {
    /// Show the sweep events, repeat to show more (`RUST_LOG` overrides)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[clap(subcommand)]
    cmd: Cmd,
}

#[derive(clap::Subcommand)]
enum Cmd {
    /// Synthesize a function generator
    Syn(syn::Syn),
    /// Synthesize a function generator from a RON job file
    Run(syn::Run),
    /// Print the precision points of a function
    Pp(syn::Pp),
}

impl Entry {
    pub(crate) fn main() {
        let entry = <Self as clap::Parser>::parse_from(wild::args());
        register_panic_hook();
        let verbose = entry.verbose;
        init_tracing(verbose);
        let res = match entry.cmd {
            Cmd::Syn(syn) => syn::syn(syn, verbose),
            Cmd::Run(run) => syn::run(run, verbose),
            Cmd::Pp(pp) => syn::pp(pp),
        };
        if let Err(e) = res {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn register_panic_hook() {
    // Print panic messages without stack trace
    std::panic::set_hook(Box::new(|info| {
        match info.payload().downcast_ref::<&str>() {
            Some(s) => eprintln!("{s}"),
            None => eprintln!("{info}"),
        }
        std::process::exit(1);
    }));
}
