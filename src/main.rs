use clap::Parser;
use formflow::cli::{Cli, Commands};
use formflow::core::{logging, Config};
use miette::Result;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior so piping the result into `head` exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    let config = Config::load();

    logging::init_tracing(config.log_filter.as_deref(), global.verbose);

    match cli.command {
        Commands::Run(args) => formflow::cli::commands::run::run(args, &global, &config),
        Commands::Check(args) => formflow::cli::commands::check::run(args, &global, &config),
        Commands::Flows(cmd) => formflow::cli::commands::flows::run(cmd, &global, &config),
        Commands::Completions(args) => formflow::cli::commands::completions::run(args),
    }
}
