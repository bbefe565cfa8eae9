use anyhow::Result;
use clap::Parser;
use grow::cli::{self, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = cli.context();

    // Diagnostics go to stderr so command output stays scriptable
    let filter = EnvFilter::try_from_env("GROW_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if ctx.no_color {
        owo_colors::set_override(false);
    }

    match cli.command {
        Commands::Grow(args) => grow::core::grow::run(&args, &ctx),
        Commands::Promote(args) => grow::core::grow::promote(&args, &ctx),
        Commands::Search(args) => grow::core::maintain::search(&args, &ctx),
        Commands::Clean(args) => grow::core::maintain::clean(&args, &ctx),
        Commands::Update(args) => grow::core::maintain::update(&args, &ctx),
        Commands::Validate(args) => grow::core::maintain::validate(&args, &ctx),
        Commands::Cache(args) => grow::core::maintain::cache(&args, &ctx),
        Commands::New(args) => run_new(&args, &ctx),
        Commands::Init(args) => run_init(&args, &ctx),
        Commands::Completions(args) => grow::completion::run(args),
    }
}

fn run_new(args: &grow::cli::NewArgs, ctx: &grow::AppContext) -> Result<()> {
    let parent = match args.root.as_deref() {
        Some(root) => std::path::PathBuf::from(shellexpand::full(root)?.into_owned()),
        None => std::env::current_dir()?,
    };
    if ctx.dry_run {
        cli::note(&format!(
            "dry run: would scaffold {}",
            parent.join(&args.name).display()
        ));
        return Ok(());
    }
    let root = grow::core::scaffold::create_project(&parent, &args.name, args.force)?;
    cli::ok(&format!("scaffolded {}", root.display()));
    Ok(())
}

fn run_init(args: &grow::cli::InitArgs, ctx: &grow::AppContext) -> Result<()> {
    let root = match args.root.as_deref() {
        Some(root) => std::path::PathBuf::from(shellexpand::full(root)?.into_owned()),
        None => std::env::current_dir()?,
    };
    if ctx.dry_run {
        cli::note(&format!("dry run: would write {}", root.join("grow.toml").display()));
        return Ok(());
    }
    let path = grow::infra::config::write_default_config(&root, args.force)?;
    cli::ok(&format!("wrote {}", path.display()));
    Ok(())
}
