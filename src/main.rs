use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use std::fs::{self, OpenOptions};
use std::io;
use std::rc::Rc;
use wayfarer::cli::{self, Cli, Commands};
use wayfarer::utils::get_data_dir;
use wayfarer::{open_entry_store, Config, Database, KeyValueStore, Localizer, Profile};

/// Log to `<data dir>/wayfarer.log` so output never lands on the TUI.
/// `RUST_LOG` overrides the default `info` filter.
fn init_logging(profile: Profile) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();

    let file = get_data_dir(profile).and_then(|dir| {
        fs::create_dir_all(&dir).ok()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("wayfarer.log"))
            .ok()
    });
    match file {
        Some(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };
    init_logging(profile);

    let config = Config::load_with_profile(profile, cli.config.as_deref())?;

    let db_path = config.get_database_path();
    let db = Rc::new(Database::new(
        db_path
            .to_str()
            .ok_or_else(|| eyre!("Database path contains invalid UTF-8"))?,
    )?);
    let prefs: Rc<dyn KeyValueStore> = db;

    let feed_path = cli.feed.clone().or_else(|| config.get_feed_path());
    let (store, feed_error) = open_entry_store(feed_path.as_deref(), prefs.clone());
    let mut localizer = Localizer::load(prefs.as_ref());

    let mut out = io::stdout().lock();
    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            drop(out);
            let app = wayfarer::tui::App::new(config, prefs, store, feed_error)?;
            wayfarer::tui::run_event_loop(app)?;
        }
        Commands::Add { title, location, desc, date, image } => {
            cli::handle_add(title, location, desc, date, image, &store, &mut out)?;
        }
        Commands::Edit { id, title, location, desc, date, image } => {
            cli::handle_edit(id, title, location, desc, date, image, &store, &mut out)?;
        }
        Commands::Delete { id } => {
            cli::handle_delete(id, &store, &mut out)?;
        }
        Commands::List { lang } => {
            cli::handle_list(lang, &store, &localizer, feed_error.as_deref(), &mut out)?;
        }
        Commands::Show { id, lang } => {
            cli::handle_show(id, lang, &store, &localizer, &mut out)?;
        }
        Commands::Lang { code, reset } => {
            cli::handle_lang(code, reset, &mut localizer, prefs.as_ref(), &mut out)?;
        }
        Commands::Export { output } => {
            cli::handle_export(output, &store, &mut out)?;
        }
        Commands::Import { path } => {
            cli::handle_import(&path, &store, &mut out)?;
        }
    }

    Ok(())
}
