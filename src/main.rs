use clap::Parser;
use fieldbook::cli::{Cli, Commands};
use miette::Result;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    // This is standard practice for CLI tools that output to stdout.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for beautiful diagnostics
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

    match cli.command {
        Commands::Init(args) => fieldbook::cli::commands::init::run(args),
        Commands::Field(cmd) => fieldbook::cli::commands::field::run(cmd, &global),
        Commands::Choice(cmd) => fieldbook::cli::commands::choice::run(cmd, &global),
        Commands::Value(cmd) => fieldbook::cli::commands::value::run(cmd, &global),
        Commands::Schema(cmd) => fieldbook::cli::commands::schema::run(cmd, &global),
        Commands::Kinds(args) => fieldbook::cli::commands::kinds::run(args, &global),
        Commands::Completions(args) => fieldbook::cli::commands::completions::run(args),
    }
}
