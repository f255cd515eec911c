use actix_files::Files;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use dialed::args::{self, CleanArgs, StoreKind};
use dialed::bag::Bag;
use dialed::controller::{self, AppState};
use dialed::identity::{AuthError, LocalIdentity};
use dialed::storage::{AccountStore, MemoryStore, SqliteStore, WedgeStore};

fn init_tracing(verbose: u8) {
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
        .init();
}

type Stores = (Arc<dyn WedgeStore>, Arc<dyn AccountStore>);

/// Wedges and accounts live in the same backend.
async fn open_store(args: &CleanArgs) -> Result<Stores, Box<dyn std::error::Error>> {
    match args.store {
        StoreKind::Memory => {
            let store = Arc::new(MemoryStore::new());
            let wedges: Arc<dyn WedgeStore> = store.clone();
            let accounts: Arc<dyn AccountStore> = store;
            Ok((wedges, accounts))
        }
        StoreKind::Sqlite => {
            let store = Arc::new(SqliteStore::open(&args.db_name)?);
            if !args.combined_sql_script.is_empty() {
                store.execute_batch(&args.combined_sql_script).await?;
                tracing::info!(scripts = ?args.db_startup_script, "startup scripts applied");
            }
            let wedges: Arc<dyn WedgeStore> = store.clone();
            let accounts: Arc<dyn AccountStore> = store;
            Ok((wedges, accounts))
        }
    }
}

async fn seed(args: &CleanArgs, identity: &LocalIdentity, bag: &Bag) -> Result<(), Box<dyn std::error::Error>> {
    for account in &args.seed_accounts {
        let user = match identity
            .sign_up(&account.email, &account.password, &account.name)
            .await
        {
            Ok(user) => user,
            // stored from an earlier run
            Err(AuthError::EmailInUse) => match identity.sign_in(&account.email, &account.password).await {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!(email = %account.email, error = %e, "seed account exists, skipped");
                    continue;
                }
            },
            Err(e) => return Err(e.into()),
        };
        // wedges already stored under this uid are kept as they are
        if bag.list(&user.uid).await?.is_empty() {
            for input in &account.wedges {
                bag.add_wedge(&user.uid, input.clone()).await?;
            }
        }
        tracing::info!(uid = %user.uid, wedges = account.wedges.len(), "seeded account");
    }
    Ok(())
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = match args::args_checks() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(args.verbose);

    let (store, accounts) = open_store(&args).await?;
    let bag = Bag::with_write_timeout(store, args.write_timeout);
    let identity = Arc::new(LocalIdentity::new(accounts));
    seed(&args, &identity, &bag).await?;

    let state = Data::new(AppState::new(bag, identity, args.auto_advance_delay));
    let static_dir = args.static_dir.clone();
    tracing::info!(bind = %args.bind, port = args.port, store = ?args.store, "starting server");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(controller::configure)
            .service(Files::new("/static", &static_dir))
    })
    .bind((args.bind.as_str(), args.port))?
    .run()
    .await?;
    Ok(())
}
