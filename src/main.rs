use clap::Parser;
use ghosttrace::cli::{
    handle_add, handle_backup, handle_edit, handle_export, handle_get, handle_import,
    handle_list, handle_restore, handle_search, Cli, Commands,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file = cli.file;

    let result = match cli.command {
        Commands::Add {
            title,
            description,
            platform,
            query,
            stdin,
            tags,
            references,
            json,
        } => handle_add(
            file,
            title,
            description,
            platform,
            query,
            stdin,
            tags,
            references,
            json,
        ),
        Commands::Edit {
            id,
            title,
            description,
            platform,
            query,
            stdin,
            tags,
            references,
            json,
        } => handle_edit(
            file,
            id,
            title,
            description,
            platform,
            query,
            stdin,
            tags,
            references,
            json,
        ),
        Commands::Get { id, json } => handle_get(file, id, json),
        Commands::List { sort, json } => handle_list(file, sort, json),
        Commands::Search { term, sort, json } => handle_search(file, term, sort, json),
        Commands::Export { path, query, sort } => handle_export(file, path, query, sort),
        Commands::Import {
            path,
            overwrite_all,
            skip_all,
        } => handle_import(file, path, overwrite_all, skip_all),
        Commands::Backup => handle_backup(file),
        Commands::Restore { path, yes } => handle_restore(file, path, yes),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
